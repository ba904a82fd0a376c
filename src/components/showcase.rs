// src/components/showcase.rs
use crate::cloud::CloudDrawing;
use crate::d3_cloud::D3CloudLayout;
use crate::error::ShowcaseError;
use crate::pipeline::{self, RenderSink, RunOutcome};
use crate::showcase_config::ShowcaseConfig;
use crate::table::{render_table, TableNode};
use crate::utils::{append_json_ld_script, js_error_message, RUN_METHOD};
use crate::widgets::ElementWidgets;
use js_sys::{Object, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Element;
use yew::html::Scope;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct ShowcaseProps {
    /// The `<biotea-bioschemas-showcase>` element this instance is mounted on.
    pub host: Element,
}

pub enum ShowcaseMsg {
    Run,
    TableInserted(TableNode),
    CloudDrawn(CloudDrawing),
    RunFinished(Result<RunOutcome, ShowcaseError>),
}

/// Everything the runs so far have put on screen.
///
/// Only `Run` starts a run; nothing here reacts to the host's attributes.
#[derive(Debug, Default)]
pub struct ShowcaseOutput {
    pub tables: Vec<TableNode>,
    pub clouds: Vec<CloudDrawing>,
    pub errors: Vec<String>,
    pub runs_in_flight: usize,
}

impl ShowcaseOutput {
    pub fn run_started(&mut self) {
        self.runs_in_flight += 1;
    }

    pub fn table_inserted(&mut self, table: TableNode) {
        self.tables.push(table);
    }

    pub fn cloud_drawn(&mut self, drawing: CloudDrawing) {
        self.clouds.push(drawing);
    }

    pub fn run_finished(&mut self, result: Result<RunOutcome, ShowcaseError>) {
        self.runs_in_flight = self.runs_in_flight.saturating_sub(1);
        match result {
            Ok(outcome) => {
                log::info!(
                    "Showcase run finished: {} cloud words, JSON-LD {}",
                    outcome.cloud_words,
                    if outcome.json_ld_emitted { "emitted" } else { "off" }
                );
            }
            Err(e) => {
                log::error!("Showcase run failed: {}", e);
                self.errors.push(e.to_string());
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        self.runs_in_flight > 0 && self.tables.is_empty()
    }
}

pub struct Showcase {
    widgets_ref: NodeRef,
    output: ShowcaseOutput,
    run_method: Option<(Element, Closure<dyn Fn()>)>,
}

/// Forwards a run's output into the component; JSON-LD goes to the body.
struct ComponentSink {
    link: Scope<Showcase>,
}

impl RenderSink for ComponentSink {
    fn append_table(&mut self, table: TableNode) -> Result<(), ShowcaseError> {
        self.link.send_message(ShowcaseMsg::TableInserted(table));
        Ok(())
    }

    fn append_cloud(&mut self, drawing: CloudDrawing) -> Result<(), ShowcaseError> {
        self.link.send_message(ShowcaseMsg::CloudDrawn(drawing));
        Ok(())
    }

    fn append_json_ld(&mut self, json: String) -> Result<(), ShowcaseError> {
        append_json_ld_script(&json)
    }
}

impl Component for Showcase {
    type Message = ShowcaseMsg;
    type Properties = ShowcaseProps;

    fn create(_ctx: &Context<Self>) -> Self {
        Self {
            widgets_ref: NodeRef::default(),
            output: ShowcaseOutput::default(),
            run_method: None,
        }
    }

    fn changed(&mut self, ctx: &Context<Self>, old: &Self::Properties) -> bool {
        if ctx.props().host != old.host {
            self.remove_run_method();
            self.install_run_method(ctx);
        }
        false
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        // widgets need the mount div, so runs are only accepted after the first render
        if first_render {
            self.install_run_method(ctx);
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        match msg {
            ShowcaseMsg::Run => {
                let Some(mount) = self.widgets_ref.cast::<Element>() else {
                    log::warn!("Showcase mount point is not rendered; run skipped");
                    return false;
                };
                self.output.run_started();

                let host = ctx.props().host.clone();
                let link = ctx.link().clone();
                ctx.link().send_future(async move {
                    let config = ShowcaseConfig::new(host);
                    let widgets = ElementWidgets::new(mount);
                    let mut sink = ComponentSink { link };
                    let result =
                        pipeline::parse_data(&config, &widgets, &D3CloudLayout, &mut sink).await;
                    ShowcaseMsg::RunFinished(result)
                });
                true
            }
            ShowcaseMsg::TableInserted(table) => {
                self.output.table_inserted(table);
                true
            }
            ShowcaseMsg::CloudDrawn(drawing) => {
                self.output.cloud_drawn(drawing);
                true
            }
            ShowcaseMsg::RunFinished(result) => {
                self.output.run_finished(result);
                true
            }
        }
    }

    fn view(&self, _ctx: &Context<Self>) -> Html {
        html! {
            <div class="showcase">
                <div class="showcase-widgets" ref={self.widgets_ref.clone()}></div>
                { for self.output.tables.iter().map(|table| html! {
                    <div class="showcase-table">{ render_table(table) }</div>
                }) }
                { for self.output.clouds.iter().map(Self::render_cloud) }
                if self.output.is_loading() {
                    <div class="loading"><p>{"Loading..."}</p></div>
                }
                { for self.output.errors.iter().map(|err| html! {
                    <div class="error"><p>{format!("Error: {}", err)}</p></div>
                }) }
            </div>
        }
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        self.remove_run_method();
    }
}

impl Showcase {
    fn render_cloud(drawing: &CloudDrawing) -> Html {
        html! {
            <svg
                class="wordcloud"
                width={drawing.width.to_string()}
                height={drawing.height.to_string()}
            >
                <g transform={drawing.center_transform()}>
                    { for drawing.words.iter().map(|word| html! {
                        <text
                            style={format!("font-size: {}; fill: {};", word.font_size, word.fill)}
                            transform={word.transform.clone()}
                        >
                            { word.text.clone() }
                        </text>
                    }) }
                </g>
            </svg>
        }
    }

    /// Expose `host.parseData()`; each call starts one run.
    fn install_run_method(&mut self, ctx: &Context<Self>) {
        let host = ctx.props().host.clone();
        let link = ctx.link().clone();
        let run = Closure::<dyn Fn()>::new(move || link.send_message(ShowcaseMsg::Run));

        let target: &Object = host.unchecked_ref();
        if let Err(e) = Reflect::set(target, &JsValue::from_str(RUN_METHOD), run.as_ref()) {
            log::warn!("Cannot expose {}() on the showcase: {}", RUN_METHOD, js_error_message(&e));
            return;
        }
        log::debug!("Showcase ready; call {}() to run", RUN_METHOD);
        self.run_method = Some((host, run));
    }

    fn remove_run_method(&mut self) {
        if let Some((host, _run)) = self.run_method.take() {
            let target: &Object = host.unchecked_ref();
            let _ = Reflect::delete_property(target, &JsValue::from_str(RUN_METHOD));
        }
    }
}
