use crate::{generation::ChatMessage, types::TaskKind};

static SIMPLIFY_PROMPT: &str = r#"You are a legal language simplifier. Rewrite legal text in plain, friendly English without losing meaning or nuance. Be clear, helpful and neutral. Output only the rewritten text."#;

static CLAUSES_PROMPT: &str = r#"You are a legal clause analyzer. Identify clauses that may confuse non-lawyers: vague, overly broad or risky language.

OUTPUT: Return ONLY a valid JSON array, no markdown, no explanation:
[
  {
    "clause": "exact text of the clause",
    "whyConfusing": "why a non-lawyer may misread it",
    "suggestedRewrite": "optional clearer version",
    "riskLevel": "low|medium|high"
  }
]

Return [] when nothing stands out."#;

static QUESTIONS_PROMPT: &str = r#"You are a legal question generator. Suggest practical questions a non-lawyer should ask their attorney about the given text.

OUTPUT: Return ONLY a valid JSON array, no markdown, no explanation:
[
  {
    "question": "What should I ask?",
    "context": "topic of the section",
    "relatedClause": "the clause the question is about"
  }
]"#;

fn system_prompt(kind: TaskKind) -> &'static str {
    match kind {
        TaskKind::Simplify => SIMPLIFY_PROMPT,
        TaskKind::ExtractClauses => CLAUSES_PROMPT,
        TaskKind::GenerateQuestions => QUESTIONS_PROMPT,
    }
}

fn user_prompt(kind: TaskKind, segment_text: &str) -> String {
    match kind {
        TaskKind::Simplify => format!(
            "Simplify this legal text into plain English that anyone can understand:\n\n{segment_text}"
        ),
        TaskKind::ExtractClauses => format!(
            "Analyze this legal text for confusing or problematic clauses:\n\n{segment_text}"
        ),
        TaskKind::GenerateQuestions => format!(
            "Generate 2-3 practical questions someone should ask a lawyer about this text:\n\n{segment_text}"
        ),
    }
}

/// Build the `[system, user]` message pair for one task on one segment.
pub fn build_messages(kind: TaskKind, segment_text: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_prompt(kind)),
        ChatMessage::user(user_prompt(kind, segment_text)),
    ]
}
