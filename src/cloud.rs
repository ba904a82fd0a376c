// src/cloud.rs
use crate::error::ShowcaseError;
use crate::showcase_data::{AnnotationRecord, PlacedWord, WordTuple};

/// Canvas the layout engine packs words into.
pub const LAYOUT_WIDTH: u32 = 850;
pub const LAYOUT_HEIGHT: u32 = 450;
/// Milliseconds the engine may spend per layout tick.
pub const LAYOUT_TIME_INTERVAL: u32 = 20;

/// Size of the drawn SVG.
pub const DRAW_WIDTH: u32 = 820;
pub const DRAW_HEIGHT: u32 = 450;

pub const MIN_FONT_SIZE: f64 = 5.0;
pub const MAX_FONT_SIZE: f64 = 25.0;

/// d3 Category10.
pub const CATEGORY10: [&str; 10] = [
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#7f7f7f",
    "#bcbd22", "#17becf",
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutParams {
    pub width: u32,
    pub height: u32,
    pub time_interval: u32,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            width: LAYOUT_WIDTH,
            height: LAYOUT_HEIGHT,
            time_interval: LAYOUT_TIME_INTERVAL,
        }
    }
}

/// Linear map from `[0, max count]` onto `[MIN_FONT_SIZE, MAX_FONT_SIZE]`.
/// Not clamped: counts above the domain extrapolate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeScale {
    domain_max: f64,
}

impl SizeScale {
    /// `None` for an empty list, which has no domain to scale over.
    pub fn for_words(words: &[WordTuple]) -> Option<Self> {
        words
            .iter()
            .map(|w| w.size)
            .reduce(f64::max)
            .map(|domain_max| Self { domain_max })
    }

    pub fn domain_max(&self) -> f64 {
        self.domain_max
    }

    pub fn apply(&self, count: f64) -> f64 {
        MIN_FONT_SIZE + (count / self.domain_max) * (MAX_FONT_SIZE - MIN_FONT_SIZE)
    }
}

/// Words ready for layout together with the scale they were measured against.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudInput {
    pub words: Vec<WordTuple>,
    pub scale: SizeScale,
}

/// Keep records commented on more than once, flattened to single tokens.
///
/// The layout engine splits on whitespace, so spaces in a phrase become
/// underscores. Only records that pass the count filter need a `text`.
pub fn build_words(records: &[AnnotationRecord]) -> Result<Vec<WordTuple>, ShowcaseError> {
    let mut words = Vec::new();
    for (index, record) in records.iter().enumerate() {
        let count = record.comment_count();
        if count > 1.0 {
            let text = record.text().ok_or(ShowcaseError::MalformedAnnotation {
                index,
                field: "text",
            })?;
            words.push(WordTuple {
                text: text.replace(' ', "_"),
                size: count,
            });
        }
    }
    Ok(words)
}

/// Words plus their scale, or `None` when nothing survives the filter.
pub fn prepare_cloud(records: &[AnnotationRecord]) -> Result<Option<CloudInput>, ShowcaseError> {
    let words = build_words(records)?;
    Ok(SizeScale::for_words(&words).map(|scale| CloudInput { words, scale }))
}

/// External word-cloud packer.
///
/// Resolves once with the words it managed to place. Font sizes are
/// `scale.apply(word.size)`; rotation is the engine's choice.
#[allow(async_fn_in_trait)]
pub trait LayoutEngine {
    async fn layout(
        &self,
        input: &CloudInput,
        params: LayoutParams,
    ) -> Result<Vec<PlacedWord>, ShowcaseError>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct DrawnWord {
    pub text: String,
    pub font_size: String,
    pub fill: &'static str,
    pub transform: String,
}

/// One SVG word cloud, ready to be rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct CloudDrawing {
    pub width: u32,
    pub height: u32,
    pub words: Vec<DrawnWord>,
}

impl CloudDrawing {
    /// Transform of the group that moves the origin to the canvas centre.
    pub fn center_transform(&self) -> String {
        format!("translate({},{})", self.width >> 1, self.height >> 1)
    }
}

/// Colour for the word at `index`.
///
/// Matches a d3 ordinal scale over Category10 with domain `1..=10` that is
/// queried with indexes `0, 1, 2, ...` in order: `1..=10` hit the declared
/// domain, `0` is appended after it (slot 10) and every index past 10 is
/// appended in turn (slot `index`), with slots wrapping round the palette.
pub fn category10(index: usize) -> &'static str {
    let slot = match index {
        1..=10 => index - 1,
        0 => 10,
        _ => index,
    };
    CATEGORY10[slot % CATEGORY10.len()]
}

/// Turn placed words into styled text nodes.
///
/// Colours follow array position, not word identity.
pub fn draw(words: &[PlacedWord], scale: &SizeScale) -> CloudDrawing {
    let words = words
        .iter()
        .enumerate()
        .map(|(i, word)| DrawnWord {
            text: word.text.clone(),
            font_size: format!("{}px", scale.apply(word.count)),
            fill: category10(i),
            transform: format!(
                "translate({},{})rotate({})",
                word.x, word.y, word.rotate
            ),
        })
        .collect();

    CloudDrawing {
        width: DRAW_WIDTH,
        height: DRAW_HEIGHT,
        words,
    }
}
