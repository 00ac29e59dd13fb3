use serde_json::Value;
use thiserror::Error;

use super::taxonomy::{EmotionLabel, EmotionTaxonomy, FALLBACK_LABEL};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassificationError {
    #[error("Malformed classification response: {0}")]
    Malformed(String),

    #[error("Label '{0}' is not in the emotion taxonomy")]
    UnknownLabel(String),
}

pub fn build_classification_prompt(taxonomy: &EmotionTaxonomy, persona_name: &str) -> String {
    let label_list = taxonomy
        .labels()
        .iter()
        .map(|label| format!("\"{}\"", label))
        .collect::<Vec<_>>()
        .join(", ");
    let options = taxonomy.labels().join("|");
    let examples = taxonomy
        .labels()
        .iter()
        .map(|label| {
            let description = taxonomy.description(label).unwrap_or_default();
            format!("- {} → \"{}\"", description, label)
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an emotion analysis assistant. Judge the tone of the following reply from {name} \
         as exactly one of {labels}. Respond with JSON only: {{\"emotion\": \"{options}\"}}.\n\
         Base the judgement on the tone of the reply, for example:\n{examples}\n\
         Always return valid JSON. If you cannot decide, return {{\"emotion\": \"{fallback}\"}}.",
        name = persona_name,
        labels = label_list,
        options = options,
        examples = examples,
        fallback = FALLBACK_LABEL,
    )
}

pub fn build_classification_input(reply_text: &str) -> String {
    format!("Analyse the tone of this reply: {}", reply_text)
}

/// Extracts the `emotion` value from a single-key JSON object. Markdown code
/// fences around the object are tolerated.
pub fn parse_emotion_response(raw: &str) -> Result<String, ClassificationError> {
    let body = strip_code_fence(raw.trim());
    let value: Value = serde_json::from_str(body).map_err(|e| ClassificationError::Malformed(e.to_string()))?;

    let Value::Object(map) = value else {
        return Err(ClassificationError::Malformed("expected a JSON object".to_string()));
    };

    map.get("emotion")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ClassificationError::Malformed("missing string field 'emotion'".to_string()))
}

pub fn resolve_label(taxonomy: &EmotionTaxonomy, raw: &str) -> Result<EmotionLabel, ClassificationError> {
    let emotion = parse_emotion_response(raw)?;
    taxonomy
        .validate(&emotion)
        .ok_or_else(|| ClassificationError::UnknownLabel(emotion.trim().to_lowercase()))
}

fn strip_code_fence(text: &str) -> &str {
    let Some(inner) = text.strip_prefix("```") else {
        return text;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
