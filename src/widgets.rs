// src/widgets.rs
//
// The two Biotea child widgets: their request shapes, the async contract the
// pipeline relies on, and the custom-element bridge used in the browser.

use crate::error::ShowcaseError;
use crate::showcase_data::{AnnotationRecord, MetadataResult};
use crate::utils::js_error_message;
use gloo::events::EventListener;
use gloo::utils::format::JsValueSerdeExt;
use js_sys::{Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{CustomEvent, Element};

pub const METADATA_TAG: &str = "biotea-bioschemas-metadata";
pub const ANNOTATIONS_TAG: &str = "biotea-bioschemas-annotations";

pub const PUBLISHER: &str = "http://biotea.github.io";
pub const VERSION: &str = "201903";
pub const METADATA_ID_TEMPLATE: &str = "http://biotea.github.io/bioschemas?pmc={0}";
pub const ANNOTATOR: &str = "http://data.bioontology.org/documentation#nav_annotator";

/// Event both widgets fire once their data is in.
pub const READY_EVENT: &str = "ready";

#[derive(Debug, Clone, PartialEq)]
pub struct MetadataRequest {
    pub publisher: String,
    pub version: String,
    pub metadata_id: String,
    pub queryurl: Option<String>,
}

impl MetadataRequest {
    pub fn new(queryurl: Option<String>) -> Self {
        Self {
            publisher: PUBLISHER.to_string(),
            version: VERSION.to_string(),
            metadata_id: METADATA_ID_TEMPLATE.to_string(),
            queryurl,
        }
    }

    fn properties(&self) -> Vec<(&'static str, JsValue)> {
        vec![
            ("publisher", JsValue::from_str(&self.publisher)),
            ("version", JsValue::from_str(&self.version)),
            ("metadataId", JsValue::from_str(&self.metadata_id)),
            ("queryurl", optional(&self.queryurl)),
        ]
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AnnotationRequest {
    pub publisher: String,
    pub version: String,
    pub articleid: Option<String>,
    pub articledoi: String,
    pub annotator: String,
    pub queryurl: Option<String>,
}

impl AnnotationRequest {
    pub fn new(articledoi: &str, articleid: Option<String>, queryurl: Option<String>) -> Self {
        Self {
            publisher: PUBLISHER.to_string(),
            version: VERSION.to_string(),
            articleid,
            articledoi: articledoi.to_string(),
            annotator: ANNOTATOR.to_string(),
            queryurl,
        }
    }

    fn properties(&self) -> Vec<(&'static str, JsValue)> {
        vec![
            ("publisher", JsValue::from_str(&self.publisher)),
            ("version", JsValue::from_str(&self.version)),
            ("articleid", optional(&self.articleid)),
            ("articledoi", JsValue::from_str(&self.articledoi)),
            ("annotator", JsValue::from_str(&self.annotator)),
            ("queryurl", optional(&self.queryurl)),
        ]
    }
}

// unset attributes reach the widget as null, like getAttribute would give
fn optional(value: &Option<String>) -> JsValue {
    value.as_deref().map(JsValue::from_str).unwrap_or(JsValue::NULL)
}

#[allow(async_fn_in_trait)]
pub trait MetadataLoader {
    async fn load_metadata(&self, request: MetadataRequest) -> Result<MetadataResult, ShowcaseError>;
}

#[allow(async_fn_in_trait)]
pub trait AnnotationLoader {
    async fn load_annotations(
        &self,
        request: AnnotationRequest,
    ) -> Result<Vec<AnnotationRecord>, ShowcaseError>;
}

/// Mounts the real Biotea custom elements under `mount` and waits for each
/// one's `ready` event.
///
/// There is no timeout: a widget that never fires keeps the run suspended.
pub struct ElementWidgets {
    mount: Element,
}

impl ElementWidgets {
    pub fn new(mount: Element) -> Self {
        Self { mount }
    }

    async fn mount_and_wait(
        &self,
        tag: &str,
        properties: Vec<(&'static str, JsValue)>,
    ) -> Result<serde_json::Value, ShowcaseError> {
        let document = self
            .mount
            .owner_document()
            .ok_or_else(|| ShowcaseError::Widget(format!("<{}> mount point is detached", tag)))?;
        let widget = document
            .create_element(tag)
            .map_err(|e| ShowcaseError::Widget(js_error_message(&e)))?;

        for (name, value) in properties {
            Reflect::set(&widget, &JsValue::from_str(name), &value)
                .map_err(|e| ShowcaseError::Widget(js_error_message(&e)))?;
        }

        // subscribe before mounting so a synchronous ready is not missed
        let mut listener = None;
        let ready = Promise::new(&mut |resolve, _reject| {
            listener = Some(EventListener::once(&widget, READY_EVENT, move |event| {
                let _ = resolve.call1(&JsValue::NULL, &JsValue::from(event.clone()));
            }));
        });

        self.mount
            .append_child(&widget)
            .map_err(|e| ShowcaseError::Widget(js_error_message(&e)))?;
        log::info!("Mounted <{}>, waiting for '{}'", tag, READY_EVENT);

        let event = JsFuture::from(ready)
            .await
            .map_err(|e| ShowcaseError::Widget(js_error_message(&e)))?;
        drop(listener);

        let detail = event
            .dyn_into::<CustomEvent>()
            .map_err(|_| ShowcaseError::Widget(format!("<{}> fired a non-custom event", tag)))?
            .detail();
        let data = Reflect::get(&detail, &JsValue::from_str("data"))
            .map_err(|e| ShowcaseError::Widget(js_error_message(&e)))?;
        if data.is_undefined() || data.is_null() {
            return Err(ShowcaseError::Widget(format!(
                "<{}> ready event carried no detail.data",
                tag
            )));
        }
        Ok(data.into_serde::<serde_json::Value>()?)
    }
}

impl MetadataLoader for ElementWidgets {
    async fn load_metadata(&self, request: MetadataRequest) -> Result<MetadataResult, ShowcaseError> {
        let data = self.mount_and_wait(METADATA_TAG, request.properties()).await?;
        Ok(MetadataResult::new(data))
    }
}

impl AnnotationLoader for ElementWidgets {
    async fn load_annotations(
        &self,
        request: AnnotationRequest,
    ) -> Result<Vec<AnnotationRecord>, ShowcaseError> {
        let data = self.mount_and_wait(ANNOTATIONS_TAG, request.properties()).await?;
        AnnotationRecord::list_from_value(data)
    }
}
