//! Extracts the four-field diary feedback object from generated text.
//!
//! Generators wrap JSON in prose or code fences often enough that the raw
//! reply cannot be parsed directly. Candidates are tried in order:
//! a ```` ```json ```` fenced block, then the outermost `{ ... }` span.

use ironlog_core::diary::DiaryFeedback;
use ironlog_core::error::FeedbackError;
use serde_json::{Map, Value};

const FIELDS: [&str; 4] = ["grammar", "rephrase", "useful_phrases", "advice"];

/// Parse generated text into [`DiaryFeedback`].
pub fn parse_feedback(raw: &str) -> Result<DiaryFeedback, FeedbackError> {
    let object = fenced_json(raw)
        .and_then(parse_object)
        .or_else(|| brace_span(raw).and_then(parse_object))
        .ok_or_else(|| FeedbackError::Extraction {
            raw: raw.to_string(),
        })?;

    let field = |name: &'static str| -> Result<String, FeedbackError> {
        object
            .get(name)
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| FeedbackError::MissingField {
                field: name,
                raw: raw.to_string(),
            })
    };

    Ok(DiaryFeedback {
        grammar: field(FIELDS[0])?,
        rephrase: field(FIELDS[1])?,
        useful_phrases: field(FIELDS[2])?,
        advice: field(FIELDS[3])?,
    })
}

/// Interior of the first ```` ```json ```` fence, if closed.
fn fenced_json(raw: &str) -> Option<&str> {
    let start = raw.find("```json")? + "```json".len();
    let end = raw[start..].find("```")? + start;
    Some(raw[start..end].trim())
}

/// The span from the first `{` to the last `}`.
fn brace_span(raw: &str) -> Option<&str> {
    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    (end > start).then(|| &raw[start..=end])
}

fn parse_object(candidate: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

/// Render feedback as the user-facing message.
pub fn format_feedback(feedback: &DiaryFeedback) -> String {
    format!(
        "📝 フィードバック:\n\
         【文法や表現の誤り】\n{}\n\n\
         【より自然な言い換え】\n{}\n\n\
         【便利な表現やフレーズ】\n{}\n\n\
         【アドバイス】\n{}\n",
        feedback.grammar, feedback.rephrase, feedback.useful_phrases, feedback.advice
    )
}
