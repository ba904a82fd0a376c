// src/d3_cloud.rs
//
// Binding to the d3-cloud layout (`d3.layout.cloud`), loaded by the host page.

use crate::cloud::{CloudInput, LayoutEngine, LayoutParams, SizeScale};
use crate::error::ShowcaseError;
use crate::showcase_data::PlacedWord;
use crate::utils::js_error_message;
use gloo::utils::format::JsValueSerdeExt;
use js_sys::{Array, Function, Promise, Reflect};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;

#[wasm_bindgen]
extern "C" {
    type Cloud;

    #[wasm_bindgen(catch, js_namespace = ["d3", "layout"], js_name = cloud)]
    fn new_cloud() -> Result<Cloud, JsValue>;

    #[wasm_bindgen(method)]
    fn size(this: &Cloud, size: &Array) -> Cloud;

    #[wasm_bindgen(method, js_name = timeInterval)]
    fn time_interval(this: &Cloud, millis: u32) -> Cloud;

    #[wasm_bindgen(method)]
    fn words(this: &Cloud, words: &JsValue) -> Cloud;

    #[wasm_bindgen(method, js_name = fontSize)]
    fn font_size(this: &Cloud, accessor: &Function) -> Cloud;

    #[wasm_bindgen(method)]
    fn text(this: &Cloud, accessor: &Function) -> Cloud;

    #[wasm_bindgen(method)]
    fn rotate(this: &Cloud, accessor: &Function) -> Cloud;

    #[wasm_bindgen(method)]
    fn on(this: &Cloud, event: &str, listener: &Function) -> Cloud;

    #[wasm_bindgen(method, catch)]
    fn start(this: &Cloud) -> Result<Cloud, JsValue>;
}

/// Property holding the raw comment count on each word.
///
/// d3-cloud rewrites `size` (font size), `weight` (font weight), `font`,
/// `style`, `rotate` and `padding`; this one it leaves alone.
pub const COUNT_FIELD: &str = "count";

/// What the engine receives per word.
#[derive(Debug, Serialize)]
struct LayoutWord<'a> {
    text: &'a str,
    size: f64,
    count: f64,
}

fn layout_words(input: &CloudInput) -> Vec<LayoutWord<'_>> {
    input
        .words
        .iter()
        .map(|w| LayoutWord {
            text: &w.text,
            size: w.size,
            count: w.size,
        })
        .collect()
}

/// Font size for a word whose `count` property reads as `count`.
fn font_size_for(scale: &SizeScale, count: Option<f64>) -> f64 {
    scale.apply(count.unwrap_or(0.0))
}

/// [`LayoutEngine`] backed by d3-cloud.
#[derive(Debug, Clone, Copy, Default)]
pub struct D3CloudLayout;

impl LayoutEngine for D3CloudLayout {
    async fn layout(
        &self,
        input: &CloudInput,
        params: LayoutParams,
    ) -> Result<Vec<PlacedWord>, ShowcaseError> {
        let words = JsValue::from_serde(&layout_words(input))?;

        let scale = input.scale;
        let font_size = Closure::<dyn Fn(JsValue) -> f64>::new(move |word: JsValue| {
            let count = Reflect::get(&word, &JsValue::from_str(COUNT_FIELD))
                .ok()
                .and_then(|c| c.as_f64());
            font_size_for(&scale, count)
        });
        let text = Closure::<dyn Fn(JsValue) -> JsValue>::new(|word: JsValue| {
            Reflect::get(&word, &JsValue::from_str("text")).unwrap_or(JsValue::UNDEFINED)
        });
        let rotate = Closure::<dyn Fn() -> f64>::new(|| (js_sys::Math::random() * 2.0).floor() * 90.0);

        let mut started = Ok(());
        let finished = Promise::new(&mut |resolve, _reject| {
            let on_end = Closure::once_into_js(move |placed: JsValue| {
                let _ = resolve.call1(&JsValue::NULL, &placed);
            });

            let dimensions = Array::of2(
                &JsValue::from(params.width),
                &JsValue::from(params.height),
            );
            started = new_cloud()
                .and_then(|cloud| {
                    cloud
                        .size(&dimensions)
                        .time_interval(params.time_interval)
                        .words(&words)
                        .font_size(font_size.as_ref().unchecked_ref())
                        .text(text.as_ref().unchecked_ref())
                        .rotate(rotate.as_ref().unchecked_ref())
                        .on("end", on_end.unchecked_ref())
                        .start()
                })
                .map(|_| ());
        });
        started.map_err(|e| ShowcaseError::Layout(js_error_message(&e)))?;

        log::debug!("d3-cloud started with {} words", input.words.len());
        let placed = JsFuture::from(finished)
            .await
            .map_err(|e| ShowcaseError::Layout(js_error_message(&e)))?;

        // the accessors must outlive the engine's last tick
        drop((font_size, text, rotate));

        Ok(placed.into_serde::<Vec<PlacedWord>>()?)
    }
}
