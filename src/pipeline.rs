// src/pipeline.rs
//
// The showcase run: metadata -> table -> annotations -> cloud -> JSON-LD.
// Each stage is awaited before the next starts; what a stage needs from the
// previous one is in its signature.

use crate::cloud::{self, CloudDrawing, LayoutEngine, LayoutParams};
use crate::error::ShowcaseError;
use crate::showcase_config::{HostAttributes, ShowcaseConfig};
use crate::showcase_data::{AnnotationRecord, MetadataResult};
use crate::table::{json_to_table, TableNode};
use crate::widgets::{AnnotationLoader, AnnotationRequest, MetadataLoader, MetadataRequest};

/// Where a run puts its output.
pub trait RenderSink {
    /// Insert a table block. Every call adds a new block.
    fn append_table(&mut self, table: TableNode) -> Result<(), ShowcaseError>;
    fn append_cloud(&mut self, drawing: CloudDrawing) -> Result<(), ShowcaseError>;
    /// Append a JSON-LD script. Earlier scripts are left in place.
    fn append_json_ld(&mut self, json: String) -> Result<(), ShowcaseError>;
}

/// What a completed run produced.
#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    /// Metadata with `hasPart` attached.
    pub metadata: MetadataResult,
    pub cloud_words: usize,
    pub json_ld_emitted: bool,
}

pub async fn metadata_stage<H, W>(
    config: &ShowcaseConfig<H>,
    widgets: &W,
) -> Result<MetadataResult, ShowcaseError>
where
    H: HostAttributes,
    W: MetadataLoader,
{
    let request = MetadataRequest::new(config.pmcpath());
    log::info!("Loading metadata from {:?}", request.queryurl);
    widgets.load_metadata(request).await
}

pub fn table_stage<S: RenderSink>(sink: &mut S, metadata: &MetadataResult) -> Result<(), ShowcaseError> {
    sink.append_table(json_to_table(metadata.as_value()))
}

pub async fn annotation_stage<H, W>(
    config: &ShowcaseConfig<H>,
    widgets: &W,
    metadata: &MetadataResult,
) -> Result<Vec<AnnotationRecord>, ShowcaseError>
where
    H: HostAttributes,
    W: AnnotationLoader,
{
    let doi = metadata.document_id()?;
    let request = AnnotationRequest::new(doi, config.pmcid(), config.annpath());
    log::info!("Loading annotations for {} from {:?}", doi, request.queryurl);
    widgets.load_annotations(request).await
}

/// Lay out and draw the cloud. Returns how many words were placed; a list
/// with nothing above the comment threshold draws nothing.
pub async fn cloud_stage<L, S>(
    layout: &L,
    sink: &mut S,
    annotations: &[AnnotationRecord],
) -> Result<usize, ShowcaseError>
where
    L: LayoutEngine,
    S: RenderSink,
{
    let input = match cloud::prepare_cloud(annotations)? {
        Some(input) => input,
        None => {
            log::warn!("No annotation commented more than once; skipping word cloud");
            return Ok(0);
        }
    };

    let placed = layout.layout(&input, LayoutParams::default()).await?;
    log::info!("Placed {} of {} words", placed.len(), input.words.len());
    sink.append_cloud(cloud::draw(&placed, &input.scale))?;
    Ok(placed.len())
}

pub fn json_ld_stage<H, S>(
    config: &ShowcaseConfig<H>,
    sink: &mut S,
    metadata: &MetadataResult,
) -> Result<bool, ShowcaseError>
where
    H: HostAttributes,
    S: RenderSink,
{
    if !config.renders_json_ld() {
        return Ok(false);
    }
    sink.append_json_ld(metadata.to_json_ld()?)?;
    Ok(true)
}

/// Run every stage in order.
///
/// Attributes are read when each widget is built, not up front. A failing
/// stage stops the run; output from earlier stages stays where it was put.
/// Nothing reruns this on its own: changing attributes only affects the
/// next call.
pub async fn parse_data<H, W, L, S>(
    config: &ShowcaseConfig<H>,
    widgets: &W,
    layout: &L,
    sink: &mut S,
) -> Result<RunOutcome, ShowcaseError>
where
    H: HostAttributes,
    W: MetadataLoader + AnnotationLoader,
    L: LayoutEngine,
    S: RenderSink,
{
    let mut metadata = metadata_stage(config, widgets).await?;
    table_stage(sink, &metadata)?;

    let annotations = annotation_stage(config, widgets, &metadata).await?;
    metadata.attach_parts(&annotations);

    let cloud_words = cloud_stage(layout, sink, &annotations).await?;
    let json_ld_emitted = json_ld_stage(config, sink, &metadata)?;
    log::debug!("Composed metadata: {:?}", metadata.as_value());

    Ok(RunOutcome {
        metadata,
        cloud_words,
        json_ld_emitted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloud::CloudInput;
    use crate::showcase_config::{AttributeMap, ANNPATH_ATTR, PMCID_ATTR, PMCPATH_ATTR, RENDER_ATTR};
    use crate::showcase_data::PlacedWord;
    use futures::executor::block_on;
    use serde_json::{json, Value};
    use std::cell::RefCell;

    struct StubWidgets {
        metadata: Value,
        annotations: Value,
        metadata_requests: RefCell<Vec<MetadataRequest>>,
        annotation_requests: RefCell<Vec<AnnotationRequest>>,
        // runs while the metadata widget is "loading"
        during_metadata: Option<Box<dyn Fn()>>,
    }

    impl StubWidgets {
        fn new(metadata: Value, annotations: Value) -> Self {
            Self {
                metadata,
                annotations,
                metadata_requests: RefCell::new(Vec::new()),
                annotation_requests: RefCell::new(Vec::new()),
                during_metadata: None,
            }
        }
    }

    impl MetadataLoader for StubWidgets {
        async fn load_metadata(&self, request: MetadataRequest) -> Result<MetadataResult, ShowcaseError> {
            self.metadata_requests.borrow_mut().push(request);
            if let Some(hook) = &self.during_metadata {
                hook();
            }
            Ok(MetadataResult::new(self.metadata.clone()))
        }
    }

    impl AnnotationLoader for StubWidgets {
        async fn load_annotations(
            &self,
            request: AnnotationRequest,
        ) -> Result<Vec<AnnotationRecord>, ShowcaseError> {
            self.annotation_requests.borrow_mut().push(request);
            AnnotationRecord::list_from_value(self.annotations.clone())
        }
    }

    /// Places words left to right, leaving each word object the way d3-cloud
    /// does: `size` is the font size, `weight` a font weight, `count` untouched.
    #[derive(Default)]
    struct RowLayout {
        seen: RefCell<Vec<CloudInput>>,
    }

    impl LayoutEngine for RowLayout {
        async fn layout(
            &self,
            input: &CloudInput,
            params: LayoutParams,
        ) -> Result<Vec<PlacedWord>, ShowcaseError> {
            assert_eq!(params, LayoutParams::default());
            self.seen.borrow_mut().push(input.clone());
            let placed: Vec<Value> = input
                .words
                .iter()
                .enumerate()
                .map(|(i, w)| {
                    json!({
                        "text": w.text,
                        "count": w.size,
                        "size": input.scale.apply(w.size).trunc() as i64,
                        "font": "serif",
                        "style": "normal",
                        "weight": "normal",
                        "rotate": 0,
                        "padding": 1,
                        "x": i as i64 * 10,
                        "y": 0,
                    })
                })
                .collect();
            Ok(serde_json::from_value(Value::Array(placed))?)
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        tables: Vec<TableNode>,
        clouds: Vec<CloudDrawing>,
        json_ld: Vec<String>,
    }

    impl RenderSink for RecordingSink {
        fn append_table(&mut self, table: TableNode) -> Result<(), ShowcaseError> {
            self.tables.push(table);
            Ok(())
        }

        fn append_cloud(&mut self, drawing: CloudDrawing) -> Result<(), ShowcaseError> {
            self.clouds.push(drawing);
            Ok(())
        }

        fn append_json_ld(&mut self, json: String) -> Result<(), ShowcaseError> {
            self.json_ld.push(json);
            Ok(())
        }
    }

    fn scenario_host() -> AttributeMap {
        AttributeMap::new()
            .with(PMCPATH_ATTR, "/m/1")
            .with(ANNPATH_ATTR, "/a/1")
            .with(PMCID_ATTR, "PMC1")
    }

    fn scenario_annotations() -> Value {
        json!([
            {"text": "foo bar", "commentCount": "3"},
            {"text": "baz", "commentCount": "1"}
        ])
    }

    #[test]
    fn test_annotation_widget_gets_resolved_doi() {
        let config = ShowcaseConfig::new(scenario_host());
        let widgets = StubWidgets::new(
            json!({"mainEntity": {"@id": "doi:10.1/x"}}),
            scenario_annotations(),
        );
        let layout = RowLayout::default();
        let mut sink = RecordingSink::default();

        block_on(parse_data(&config, &widgets, &layout, &mut sink)).unwrap();

        let metadata_requests = widgets.metadata_requests.borrow();
        assert_eq!(metadata_requests.len(), 1);
        assert_eq!(metadata_requests[0], MetadataRequest::new(Some("/m/1".to_string())));

        let requests = widgets.annotation_requests.borrow();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].articledoi, "doi:10.1/x");
        assert_eq!(requests[0].articleid.as_deref(), Some("PMC1"));
        assert_eq!(requests[0].queryurl.as_deref(), Some("/a/1"));
    }

    #[test]
    fn test_cloud_gets_filtered_words() {
        let config = ShowcaseConfig::new(scenario_host());
        let widgets = StubWidgets::new(
            json!({"mainEntity": {"@id": "doi:10.1/x"}}),
            scenario_annotations(),
        );
        let layout = RowLayout::default();
        let mut sink = RecordingSink::default();

        let outcome = block_on(parse_data(&config, &widgets, &layout, &mut sink)).unwrap();

        let seen = layout.seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(
            serde_json::to_value(&seen[0].words).unwrap(),
            json!([{"text": "foo_bar", "size": 3.0}])
        );
        assert_eq!(outcome.cloud_words, 1);
        assert_eq!(sink.clouds.len(), 1);
        assert_eq!(sink.clouds[0].words[0].text, "foo_bar");
        assert_eq!(sink.clouds[0].words[0].font_size, "25px");
    }

    #[test]
    fn test_has_part_is_attached() {
        let config = ShowcaseConfig::new(scenario_host());
        let widgets = StubWidgets::new(
            json!({"name": "Article", "mainEntity": {"@id": "doi:10.1/x"}}),
            scenario_annotations(),
        );
        let mut sink = RecordingSink::default();

        let outcome =
            block_on(parse_data(&config, &widgets, &RowLayout::default(), &mut sink)).unwrap();

        assert_eq!(outcome.metadata.as_value()["hasPart"], scenario_annotations());
        assert_eq!(outcome.metadata.as_value()["name"], "Article");
    }

    #[test]
    fn test_no_json_ld_without_render() {
        let config = ShowcaseConfig::new(scenario_host());
        let widgets = StubWidgets::new(
            json!({"mainEntity": {"@id": "doi:10.1/x"}}),
            scenario_annotations(),
        );
        let mut sink = RecordingSink::default();

        let outcome =
            block_on(parse_data(&config, &widgets, &RowLayout::default(), &mut sink)).unwrap();

        assert!(!outcome.json_ld_emitted);
        assert!(sink.json_ld.is_empty());
    }

    #[test]
    fn test_json_ld_matches_composed_metadata() {
        let config = ShowcaseConfig::new(scenario_host().with(RENDER_ATTR, ""));
        let widgets = StubWidgets::new(
            json!({"@type": "ScholarlyArticle", "mainEntity": {"@id": "doi:10.1/x"}}),
            scenario_annotations(),
        );
        let mut sink = RecordingSink::default();

        let outcome =
            block_on(parse_data(&config, &widgets, &RowLayout::default(), &mut sink)).unwrap();

        assert!(outcome.json_ld_emitted);
        assert_eq!(sink.json_ld.len(), 1);
        let emitted: Value = serde_json::from_str(&sink.json_ld[0]).unwrap();
        assert_eq!(&emitted, outcome.metadata.as_value());
        assert_eq!(emitted["hasPart"][0]["text"], "foo bar");
    }

    #[test]
    fn test_repeated_runs_accumulate_output() {
        let config = ShowcaseConfig::new(scenario_host().with(RENDER_ATTR, "yes"));
        let widgets = StubWidgets::new(
            json!({"mainEntity": {"@id": "doi:10.1/x"}}),
            scenario_annotations(),
        );
        let layout = RowLayout::default();
        let mut sink = RecordingSink::default();

        block_on(parse_data(&config, &widgets, &layout, &mut sink)).unwrap();
        block_on(parse_data(&config, &widgets, &layout, &mut sink)).unwrap();

        assert_eq!(sink.tables.len(), 2);
        assert_eq!(sink.clouds.len(), 2);
        assert_eq!(sink.json_ld.len(), 2);
    }

    #[test]
    fn test_table_stage_inserts_once_per_call() {
        let metadata = MetadataResult::new(json!({"mainEntity": {"@id": "doi:10.1/x"}}));
        let mut sink = RecordingSink::default();

        table_stage(&mut sink, &metadata).unwrap();
        table_stage(&mut sink, &metadata).unwrap();

        assert_eq!(sink.tables.len(), 2);
        assert_eq!(sink.tables[0], sink.tables[1]);
        assert_eq!(
            sink.tables[0],
            TableNode::KeyValue(vec![(
                "mainEntity".to_string(),
                TableNode::KeyValue(vec![(
                    "@id".to_string(),
                    TableNode::Text("doi:10.1/x".to_string())
                )]),
            )])
        );
    }

    #[test]
    fn test_empty_cloud_is_skipped_but_json_ld_still_emitted() {
        let config = ShowcaseConfig::new(scenario_host().with(RENDER_ATTR, ""));
        let widgets = StubWidgets::new(
            json!({"mainEntity": {"@id": "doi:10.1/x"}}),
            json!([{"text": "baz", "commentCount": "1"}]),
        );
        let layout = RowLayout::default();
        let mut sink = RecordingSink::default();

        let outcome = block_on(parse_data(&config, &widgets, &layout, &mut sink)).unwrap();

        assert_eq!(outcome.cloud_words, 0);
        assert!(layout.seen.borrow().is_empty());
        assert!(sink.clouds.is_empty());
        assert_eq!(sink.json_ld.len(), 1);
    }

    #[test]
    fn test_missing_document_id_stops_after_table() {
        let config = ShowcaseConfig::new(scenario_host());
        let widgets = StubWidgets::new(json!({"name": "no entity"}), scenario_annotations());
        let mut sink = RecordingSink::default();

        let err = block_on(parse_data(&config, &widgets, &RowLayout::default(), &mut sink))
            .unwrap_err();

        assert!(matches!(err, ShowcaseError::MissingDocumentId));
        assert_eq!(sink.tables.len(), 1);
        assert!(widgets.annotation_requests.borrow().is_empty());
        assert!(sink.clouds.is_empty());
    }

    #[test]
    fn test_malformed_annotations_leave_table_in_place() {
        let config = ShowcaseConfig::new(scenario_host().with(RENDER_ATTR, ""));
        let widgets = StubWidgets::new(
            json!({"mainEntity": {"@id": "doi:10.1/x"}}),
            json!({"not": "a list"}),
        );
        let mut sink = RecordingSink::default();

        let err = block_on(parse_data(&config, &widgets, &RowLayout::default(), &mut sink))
            .unwrap_err();

        assert!(matches!(err, ShowcaseError::MalformedAnnotations(_)));
        assert_eq!(sink.tables.len(), 1);
        assert!(sink.clouds.is_empty());
        assert!(sink.json_ld.is_empty());
    }

    #[test]
    fn test_attributes_are_read_when_each_widget_is_built() {
        let host = std::rc::Rc::new(scenario_host());
        let config = ShowcaseConfig::new(&*host);
        let mut widgets = StubWidgets::new(
            json!({"mainEntity": {"@id": "doi:10.1/x"}}),
            scenario_annotations(),
        );
        let changed = host.clone();
        widgets.during_metadata = Some(Box::new(move || {
            changed.set_attribute(ANNPATH_ATTR, "/a/2");
        }));
        let mut sink = RecordingSink::default();

        block_on(parse_data(&config, &widgets, &RowLayout::default(), &mut sink)).unwrap();

        assert_eq!(
            widgets.annotation_requests.borrow()[0].queryurl.as_deref(),
            Some("/a/2")
        );
    }

    #[test]
    fn test_attribute_change_after_run_does_not_run_again() {
        let host = std::rc::Rc::new(scenario_host().with(RENDER_ATTR, ""));
        let config = ShowcaseConfig::new(&*host);
        let widgets = StubWidgets::new(
            json!({"mainEntity": {"@id": "doi:10.1/x"}}),
            scenario_annotations(),
        );
        let layout = RowLayout::default();
        let mut sink = RecordingSink::default();

        block_on(parse_data(&config, &widgets, &layout, &mut sink)).unwrap();
        host.set_attribute(ANNPATH_ATTR, "/a/2");

        assert_eq!(widgets.metadata_requests.borrow().len(), 1);
        assert_eq!(widgets.annotation_requests.borrow().len(), 1);
        assert_eq!(sink.tables.len(), 1);
        assert_eq!(sink.clouds.len(), 1);
        assert_eq!(sink.json_ld.len(), 1);

        block_on(parse_data(&config, &widgets, &layout, &mut sink)).unwrap();
        let requests = widgets.annotation_requests.borrow();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].queryurl.as_deref(), Some("/a/2"));
        assert_eq!(sink.tables.len(), 2);
    }

    #[test]
    fn test_cloud_font_comes_from_count_not_weight() {
        let config = ShowcaseConfig::new(scenario_host());
        let widgets = StubWidgets::new(
            json!({"mainEntity": {"@id": "doi:10.1/x"}}),
            json!([
                {"text": "gene", "commentCount": "4"},
                {"text": "cell", "commentCount": "2"}
            ]),
        );
        let mut sink = RecordingSink::default();

        block_on(parse_data(&config, &widgets, &RowLayout::default(), &mut sink)).unwrap();

        let sizes: Vec<&str> = sink.clouds[0]
            .words
            .iter()
            .map(|w| w.font_size.as_str())
            .collect();
        assert_eq!(sizes, ["25px", "15px"]);
    }

    #[test]
    fn test_unset_paths_pass_through_as_none() {
        let config = ShowcaseConfig::new(AttributeMap::new());
        let widgets = StubWidgets::new(
            json!({"mainEntity": {"@id": "doi:10.1/x"}}),
            json!([]),
        );
        let mut sink = RecordingSink::default();

        block_on(parse_data(&config, &widgets, &RowLayout::default(), &mut sink)).unwrap();

        assert_eq!(widgets.metadata_requests.borrow()[0].queryurl, None);
        let requests = widgets.annotation_requests.borrow();
        assert_eq!(requests[0].queryurl, None);
        assert_eq!(requests[0].articleid, None);
    }
}
