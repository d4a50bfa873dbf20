use crate::{analyzer::SegmentAnalysis, types::AnalysisResult};

/// Merge per-segment results, already ordered by segment index, into the
/// final result. Clauses and questions keep segment order and are not
/// deduplicated.
pub fn aggregate(analyses: impl IntoIterator<Item = SegmentAnalysis>) -> AnalysisResult {
    let mut result = AnalysisResult::default();

    for analysis in analyses {
        debug_assert_eq!(
            analysis.section.section_index,
            result.simplified_sections.len(),
            "segment results must arrive in index order"
        );
        result.simplified_sections.push(analysis.section);
        result.confusing_clauses.extend(analysis.clauses);
        result.suggested_questions.extend(analysis.questions);
    }

    result
}
