//! Coerces loosely-typed model records into [`VocabularyItem`].
//!
//! Each field has an ordered list of keys the models are known to use; the
//! first non-blank value wins. Required fields that stay blank get the
//! configured placeholder. Sanitizing never fails and never drops a
//! well-formed value.

use serde_json::{Map, Value};

use crate::config::Placeholders;
use crate::models::{AnalysisResult, VocabularyItem, WritingCritique};

const WORD_KEYS: &[&str] = &["word", "term", "character", "text", "vocabulary"];
const PHONETIC_KEYS: &[&str] = &["phonetic", "pinyin", "pronunciation", "ipa"];
const DEFINITION_KEYS: &[&str] = &["definition", "meaning", "explanation", "description"];
const TRANSLATION_KEYS: &[&str] = &[
    "chineseTranslation",
    "chinese_translation",
    "translation",
    "chinese",
];
const EXAMPLE_KEYS: &[&str] = &[
    "exampleSentence",
    "example_sentence",
    "example",
    "examples",
    "sentence",
];
const MNEMONIC_KEYS: &[&str] = &["mnemonic", "memoryTip", "memory_tip", "tip"];
const CONTEXT_KEYS: &[&str] = &["context", "domain", "usageContext"];

/// String form of a scalar, if it is non-blank.
fn scalar_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    (!text.trim().is_empty()).then_some(text)
}

fn first_text(raw: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| raw.get(*k).and_then(scalar_text))
}

// Example sentences sometimes come back as a list; the first entry is used.
fn first_example(raw: &Map<String, Value>) -> Option<String> {
    EXAMPLE_KEYS.iter().find_map(|k| match raw.get(*k)? {
        Value::Array(items) => items.first().and_then(scalar_text),
        other => scalar_text(other),
    })
}

fn tags(raw: &Map<String, Value>) -> Vec<String> {
    match raw.get("tags") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|t| match t {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

/// Sanitizes one raw record.
pub fn sanitize_item(raw: &Value, placeholders: &Placeholders) -> VocabularyItem {
    let empty = Map::new();
    let bare_word;
    let fields = match raw {
        Value::Object(map) => map,
        Value::String(s) => {
            let mut map = Map::new();
            map.insert("word".to_string(), Value::String(s.clone()));
            bare_word = map;
            &bare_word
        }
        _ => &empty,
    };

    VocabularyItem {
        word: first_text(fields, WORD_KEYS).unwrap_or_else(|| placeholders.word.clone()),
        phonetic: first_text(fields, PHONETIC_KEYS),
        definition: first_text(fields, DEFINITION_KEYS)
            .unwrap_or_else(|| placeholders.definition.clone()),
        chinese_translation: first_text(fields, TRANSLATION_KEYS),
        example_sentence: first_example(fields)
            .unwrap_or_else(|| placeholders.example_sentence.clone()),
        mnemonic: first_text(fields, MNEMONIC_KEYS)
            .unwrap_or_else(|| placeholders.mnemonic.clone()),
        context: first_text(fields, CONTEXT_KEYS),
        tags: tags(fields),
        image: fields
            .get("image")
            .and_then(Value::as_str)
            .map(str::to_string),
    }
}

pub fn sanitize(raw: &[Value], placeholders: &Placeholders) -> Vec<VocabularyItem> {
    raw.iter()
        .map(|item| sanitize_item(item, placeholders))
        .collect()
}

/// Sanitizes an optional vocabulary list nested inside an analysis object.
fn nested_items(
    raw: &Map<String, Value>,
    key: &str,
    placeholders: &Placeholders,
) -> Vec<VocabularyItem> {
    match raw.get(key) {
        Some(Value::Array(items)) => sanitize(items, placeholders),
        _ => Vec::new(),
    }
}

// Prose fields are taken as-is; blank stays blank.
fn prose(raw: &Map<String, Value>, key: &str) -> String {
    raw.get(key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

pub fn analysis_from_object(raw: &Map<String, Value>, placeholders: &Placeholders) -> AnalysisResult {
    AnalysisResult {
        translation: prose(raw, "translation"),
        origin: prose(raw, "origin"),
        usage: prose(raw, "usage"),
        vocabulary: nested_items(raw, "vocabulary", placeholders),
    }
}

pub fn critique_from_object(
    raw: &Map<String, Value>,
    placeholders: &Placeholders,
) -> WritingCritique {
    WritingCritique {
        correction: prose(raw, "correction"),
        explanation: prose(raw, "explanation"),
        improved_version: prose(raw, "improvedVersion"),
        key_vocabulary: nested_items(raw, "keyVocabulary", placeholders),
    }
}
