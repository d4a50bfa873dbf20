use crate::types::{AnalysisResult, RiskLevel};

fn risk_badge(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "🟢 LOW",
        RiskLevel::Medium => "🟡 MEDIUM",
        RiskLevel::High => "🔴 HIGH",
    }
}

/// Quote every line of `text` as a markdown blockquote.
fn blockquote(text: &str) -> String {
    text.lines()
        .map(|line| format!("> {}", line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format an analysis result as human-readable markdown
pub fn format_analysis_readable(result: &AnalysisResult) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "**Sections:** {} | **Flagged clauses:** {} | **Questions:** {}\n\n",
        result.simplified_sections.len(),
        result.confusing_clauses.len(),
        result.suggested_questions.len()
    ));

    output.push_str("## Plain-language version\n\n");
    for section in &result.simplified_sections {
        output.push_str(&format!("### Section {}\n\n", section.section_index + 1));
        output.push_str(&blockquote(&section.original_text));
        output.push_str("\n\n");
        output.push_str(&section.simplified_text);
        output.push_str("\n\n");
    }

    if !result.confusing_clauses.is_empty() {
        output.push_str("## Clauses to watch\n\n");
        for clause in &result.confusing_clauses {
            output.push_str(&format!(
                "- **[{}]** (section {}) \"{}\"\n",
                risk_badge(clause.risk_level),
                clause.section_index + 1,
                clause.clause
            ));
            output.push_str(&format!("  - Why: {}\n", clause.why_confusing));
            if let Some(rewrite) = &clause.suggested_rewrite {
                output.push_str(&format!("  - Clearer: {}\n", rewrite));
            }
        }
        output.push('\n');
    }

    if !result.suggested_questions.is_empty() {
        output.push_str("## Questions for your lawyer\n\n");
        for (i, question) in result.suggested_questions.iter().enumerate() {
            output.push_str(&format!(
                "{}. {} _({})_\n",
                i + 1,
                question.question,
                question.context
            ));
        }
        output.push('\n');
    }

    output
}
