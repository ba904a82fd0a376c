// src/error.rs

/// Reasons a showcase run stops before reaching its last stage.
#[derive(Debug, thiserror::Error)]
pub enum ShowcaseError {
    /// A child widget could not be created, mounted or read back.
    #[error("widget error: {0}")]
    Widget(String),

    /// The metadata record has no string `mainEntity["@id"]`.
    #[error("metadata has no mainEntity[\"@id\"] document identifier")]
    MissingDocumentId,

    /// The annotation widget did not hand back a list.
    #[error("annotation payload is not a list: {0}")]
    MalformedAnnotations(String),

    /// A record kept for the cloud lacks a usable field.
    #[error("annotation record {index} has no string `{field}`")]
    MalformedAnnotation { index: usize, field: &'static str },

    #[error("layout engine error: {0}")]
    Layout(String),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dom error: {0}")]
    Dom(String),
}
