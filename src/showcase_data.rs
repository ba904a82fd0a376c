// src/showcase_data.rs
use crate::error::ShowcaseError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Bioschemas metadata for one article, as the metadata widget produced it.
///
/// The tree is kept opaque; only `mainEntity["@id"]` is read and `hasPart`
/// is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataResult(Value);

impl MetadataResult {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// The resolved document identifier (a DOI) handed to the annotation widget.
    pub fn document_id(&self) -> Result<&str, ShowcaseError> {
        self.0
            .get("mainEntity")
            .and_then(|entity| entity.get("@id"))
            .and_then(Value::as_str)
            .ok_or(ShowcaseError::MissingDocumentId)
    }

    /// Attach the annotation list as `hasPart`, replacing any previous value.
    pub fn attach_parts(&mut self, parts: &[AnnotationRecord]) {
        if let Value::Object(map) = &mut self.0 {
            let list = parts.iter().map(|part| part.0.clone()).collect();
            map.insert("hasPart".to_string(), Value::Array(list));
        }
    }

    /// Pretty-printed with two-space indentation, source key order kept.
    pub fn to_json_ld(&self) -> Result<String, ShowcaseError> {
        Ok(serde_json::to_string_pretty(&self.0)?)
    }
}

/// One annotation, as produced by the annotation widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationRecord(Value);

impl AnnotationRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Split a widget payload into records. Anything but a list is rejected.
    pub fn list_from_value(value: Value) -> Result<Vec<Self>, ShowcaseError> {
        match value {
            Value::Array(items) => Ok(items.into_iter().map(Self).collect()),
            other => Err(ShowcaseError::MalformedAnnotations(type_name(&other).to_string())),
        }
    }

    pub fn text(&self) -> Option<&str> {
        self.0.get("text").and_then(Value::as_str)
    }

    /// `commentCount` coerced to a number; NaN when absent.
    pub fn comment_count(&self) -> f64 {
        self.0.get("commentCount").map(coerce_number).unwrap_or(f64::NAN)
    }
}

/// Word-cloud input: a single token and its weight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordTuple {
    pub text: String,
    pub size: f64,
}

/// A word once the layout engine has placed it.
///
/// `size` is the font size the engine settled on; `count` is the raw
/// tuple size, carried through so the draw stage can rescale it. d3-cloud
/// also writes `weight`, `font`, `style` and `padding` onto each word; those
/// are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedWord {
    pub text: String,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub rotate: f64,
    #[serde(default)]
    pub size: f64,
    pub count: f64,
}

/// Numeric coercion with the same results as JavaScript's unary `+`.
pub fn coerce_number(value: &Value) -> f64 {
    match value {
        Value::Null => 0.0,
        Value::Bool(b) => {
            if *b {
                1.0
            } else {
                0.0
            }
        }
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => coerce_str(s),
        // [] -> "" -> 0, [x] -> String(x), longer lists join with commas
        Value::Array(items) => match items.as_slice() {
            [] | [Value::Null] => 0.0,
            [single @ (Value::Number(_) | Value::String(_))] => coerce_number(single),
            _ => f64::NAN,
        },
        Value::Object(_) => f64::NAN,
    }
}

fn coerce_str(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }

    let radix = match s.get(..2) {
        Some("0x") | Some("0X") => Some(16),
        Some("0o") | Some("0O") => Some(8),
        Some("0b") | Some("0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        return u64::from_str_radix(&s[2..], radix)
            .map(|n| n as f64)
            .unwrap_or(f64::NAN);
    }

    match s {
        "Infinity" | "+Infinity" => return f64::INFINITY,
        "-Infinity" => return f64::NEG_INFINITY,
        _ => {}
    }

    // Rust accepts spellings like "inf" or "NaN" that JavaScript does not
    if s.chars().any(|c| c.is_ascii_alphabetic() && c != 'e' && c != 'E') {
        return f64::NAN;
    }

    s.parse::<f64>().unwrap_or(f64::NAN)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
