use serde_json::{Value, json};

/// Shape of the JSON a task expects back from the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    VocabularyList,
    ClassicalAnalysis,
    WritingCritique,
}

fn vocabulary_item_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "word": { "type": "STRING" },
            "phonetic": { "type": "STRING" },
            "definition": { "type": "STRING" },
            "chineseTranslation": { "type": "STRING" },
            "exampleSentence": { "type": "STRING" },
            "mnemonic": { "type": "STRING" },
            "context": { "type": "STRING" },
            "tags": { "type": "ARRAY", "items": { "type": "STRING" } }
        },
        "required": ["word", "definition", "exampleSentence", "mnemonic"]
    })
}

const VOCABULARY_ITEM_HINT: &str = r#"{"word": string, "phonetic": string, "definition": string, "chineseTranslation": string, "exampleSentence": string, "mnemonic": string, "context": string, "tags": [string]}"#;

impl ResponseShape {
    /// `responseSchema` for the Gemini structured-output request.
    pub fn gemini_schema(&self) -> Value {
        match self {
            ResponseShape::VocabularyList => json!({
                "type": "ARRAY",
                "items": vocabulary_item_schema()
            }),
            ResponseShape::ClassicalAnalysis => json!({
                "type": "OBJECT",
                "properties": {
                    "translation": { "type": "STRING" },
                    "origin": { "type": "STRING" },
                    "usage": { "type": "STRING" },
                    "vocabulary": { "type": "ARRAY", "items": vocabulary_item_schema() }
                },
                "required": ["translation", "origin", "usage", "vocabulary"]
            }),
            ResponseShape::WritingCritique => json!({
                "type": "OBJECT",
                "properties": {
                    "correction": { "type": "STRING" },
                    "explanation": { "type": "STRING" },
                    "improvedVersion": { "type": "STRING" },
                    "keyVocabulary": { "type": "ARRAY", "items": vocabulary_item_schema() }
                },
                "required": ["correction", "explanation", "improvedVersion", "keyVocabulary"]
            }),
        }
    }

    /// Text returned when the backend produced no output at all.
    pub fn empty_literal(&self) -> &'static str {
        match self {
            ResponseShape::VocabularyList => "[]",
            ResponseShape::ClassicalAnalysis | ResponseShape::WritingCritique => "{}",
        }
    }

    /// Output-format instruction for backends without schema support.
    ///
    /// JSON-object mode cannot return a bare array, so lists are wrapped in `items`.
    pub fn json_hint(&self) -> String {
        match self {
            ResponseShape::VocabularyList => format!(
                "Respond with a JSON object of the form {{\"items\": [{VOCABULARY_ITEM_HINT}]}}."
            ),
            ResponseShape::ClassicalAnalysis => format!(
                "Respond with a JSON object of the form {{\"translation\": string, \"origin\": string, \"usage\": string, \"vocabulary\": [{VOCABULARY_ITEM_HINT}]}}."
            ),
            ResponseShape::WritingCritique => format!(
                "Respond with a JSON object of the form {{\"correction\": string, \"explanation\": string, \"improvedVersion\": string, \"keyVocabulary\": [{VOCABULARY_ITEM_HINT}]}}."
            ),
        }
    }
}
