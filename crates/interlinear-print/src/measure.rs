use std::sync::Arc;

use interlinear_layout::{LayoutConfig, LayoutEngine, TextMeasurer, TextStyle};

use crate::afm::Base14Font;

/// Measures with base-14 AFM widths.
///
/// Sizes and results are both layout px, so a layout measured with this
/// measurer converts to print millimeters without drift.
#[derive(Clone, Copy, Debug, Default)]
pub struct PrintTextMeasurer;

impl PrintTextMeasurer {
    pub fn new() -> Self {
        Self
    }

    /// Create a shared measurer trait object for engine wiring.
    pub fn shared() -> Arc<dyn TextMeasurer> {
        Arc::new(Self)
    }
}

impl TextMeasurer for PrintTextMeasurer {
    fn measure_text_px(&self, text: &str, style: &TextStyle) -> f32 {
        Base14Font::for_style(style).text_width(text, style.size_px)
    }
}

/// Engine whose line breaks match the print output.
pub fn print_layout_engine(cfg: LayoutConfig) -> LayoutEngine {
    LayoutEngine::new(cfg).with_text_measurer(PrintTextMeasurer::shared())
}
