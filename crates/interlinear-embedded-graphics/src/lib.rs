//! embedded-graphics preview backend for `interlinear-layout` pages.
//!
//! [`EgTextMeasurer`] and [`EgRenderer`] share one [`FontBackend`], so a
//! layout measured with the former draws without drift on the latter.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

use embedded_graphics::{
    mono_font::{
        iso_8859_1::{
            FONT_10X20, FONT_5X8, FONT_6X10, FONT_6X13_BOLD, FONT_6X13_ITALIC, FONT_7X13,
            FONT_7X13_BOLD, FONT_7X13_ITALIC, FONT_8X13_ITALIC, FONT_9X15, FONT_9X15_BOLD,
            FONT_9X18, FONT_9X18_BOLD,
        },
        MonoFont, MonoTextStyle,
    },
    pixelcolor::BinaryColor,
    prelude::*,
    text::{Baseline, Text},
};
use interlinear::{PrintSettings, Token, WordToken, MM_PER_INCH, PX_PER_INCH, PX_PER_PT};
use interlinear_layout::{
    LayoutEngine, LayoutError, Line, Page, PageGeometry, PageSide, TextMeasurer, TextRole,
    TextStyle, TypesetStyles,
};
use std::borrow::Cow;
use std::sync::Arc;

/// Backend-local font identifier used for metrics and rasterization dispatch.
pub type FontId = u8;

/// Why style-to-font mapping had to fallback to a default face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FontFallbackReason {
    UnknownFamily,
    UnknownFontId,
    UnsupportedWeightItalic,
}

/// Resolved font selection for a text style.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontSelection {
    pub font_id: FontId,
    pub fallback_reason: Option<FontFallbackReason>,
}

/// Backend-provided metrics for a specific font id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FontMetrics {
    pub char_width: i32,
    pub space_width: i32,
    /// Glyph cell height in px.
    pub line_height: i32,
}

impl FontMetrics {
    /// Advance of a run in px.
    pub fn run_width(&self, text: &str) -> i32 {
        text.chars()
            .map(|ch| {
                if ch == ' ' {
                    self.space_width
                } else {
                    self.char_width
                }
            })
            .sum()
    }
}

/// Font abstraction used by both the measurer and the renderer.
pub trait FontBackend {
    fn resolve_font(&self, style: &TextStyle) -> FontSelection;
    fn metrics(&self, font_id: FontId) -> FontMetrics;
    /// Map text onto what the font can draw. Measurement uses the same form.
    fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(text)
    }
    fn draw_text_run<D>(
        &self,
        display: &mut D,
        font_id: FontId,
        text: &str,
        origin: Point,
    ) -> Result<i32, D::Error>
    where
        D: DrawTarget<Color = BinaryColor>;
}

/// Counters for text fallback reasons observed during draw execution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextFallbackDiagnostics {
    pub unknown_family: u64,
    pub unknown_font_id: u64,
    pub unsupported_weight_italic: u64,
}

impl TextFallbackDiagnostics {
    /// Total fallback count across all reasons.
    pub fn total(&self) -> u64 {
        self.unknown_family
            .saturating_add(self.unknown_font_id)
            .saturating_add(self.unsupported_weight_italic)
    }

    fn note_reason(&mut self, reason: FontFallbackReason) {
        match reason {
            FontFallbackReason::UnknownFamily => {
                self.unknown_family = self.unknown_family.saturating_add(1)
            }
            FontFallbackReason::UnknownFontId => {
                self.unknown_font_id = self.unknown_font_id.saturating_add(1)
            }
            FontFallbackReason::UnsupportedWeightItalic => {
                self.unsupported_weight_italic = self.unsupported_weight_italic.saturating_add(1)
            }
        }
    }
}

/// Per-render diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EgRenderDiagnostics {
    pub text_runs: u64,
    pub text_fallbacks: TextFallbackDiagnostics,
    /// Lines whose occupied width exceeds the line measure.
    pub overflowing_lines: u64,
}

impl EgRenderDiagnostics {
    fn note_text_run(&mut self) {
        self.text_runs = self.text_runs.saturating_add(1);
    }

    fn note_text_fallback(&mut self, reason: FontFallbackReason) {
        self.text_fallbacks.note_reason(reason);
    }
}

/// `TextMeasurer` adapter backed by this crate's `FontBackend` metrics.
#[derive(Clone, Debug)]
pub struct EgTextMeasurer<B = MonoFontBackend> {
    backend: B,
}

impl EgTextMeasurer<MonoFontBackend> {
    /// Create a default measurer using the mono backend.
    pub fn new() -> Self {
        Self {
            backend: MonoFontBackend,
        }
    }

    /// Create a shared measurer trait object for engine wiring.
    pub fn shared() -> Arc<dyn TextMeasurer> {
        Arc::new(Self::new())
    }
}

impl Default for EgTextMeasurer<MonoFontBackend> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B> EgTextMeasurer<B>
where
    B: FontBackend,
{
    /// Create a measurer using an explicit backend.
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }
}

/// Install the mono-font measurer on an engine.
///
/// Line breaks then use the same width model the preview draws with.
pub fn with_embedded_text_measurer(engine: LayoutEngine) -> LayoutEngine {
    engine.with_text_measurer(EgTextMeasurer::shared())
}

impl<B> TextMeasurer for EgTextMeasurer<B>
where
    B: FontBackend + Send + Sync,
{
    fn measure_text_px(&self, text: &str, style: &TextStyle) -> f32 {
        let selection = self.backend.resolve_font(style);
        let metrics = self.backend.metrics(selection.font_id);
        let normalized = self.backend.normalize(text);
        metrics.run_width(normalized.as_ref()).max(0) as f32
    }
}

/// Mono-font backend over the ISO 8859-1 glyph sets, so umlauts and `ß`
/// render.
#[derive(Clone, Copy, Debug, Default)]
pub struct MonoFontBackend;

impl MonoFontBackend {
    const SIZE_TINY: FontId = 0;
    const SIZE_SMALL: FontId = 1;
    const SIZE_MEDIUM: FontId = 2;
    const SIZE_LARGE: FontId = 3;
    const SIZE_XL: FontId = 4;

    const VARIANT_REGULAR: FontId = 0;
    const VARIANT_ITALIC: FontId = 1;
    const VARIANT_BOLD: FontId = 2;
    const VARIANT_BOLD_ITALIC: FontId = 3;

    fn encode_font_id(size_bucket: FontId, variant: FontId) -> FontId {
        (size_bucket << 2) | (variant & 0x03)
    }

    fn decode_font_id(font_id: FontId) -> (FontId, FontId) {
        ((font_id >> 2) & 0x07, font_id & 0x03)
    }

    fn size_bucket_for(style: &TextStyle) -> FontId {
        if style.size_px >= 22.0 {
            Self::SIZE_XL
        } else if style.size_px >= 16.0 {
            Self::SIZE_LARGE
        } else if style.size_px >= 12.0 {
            Self::SIZE_MEDIUM
        } else if style.size_px >= 9.0 {
            Self::SIZE_SMALL
        } else {
            Self::SIZE_TINY
        }
    }

    fn style_variant_for(style: &TextStyle) -> FontId {
        let bold = style.is_bold();
        if bold && style.italic {
            Self::VARIANT_BOLD_ITALIC
        } else if bold {
            Self::VARIANT_BOLD
        } else if style.italic {
            Self::VARIANT_ITALIC
        } else {
            Self::VARIANT_REGULAR
        }
    }

    fn font_for(font_id: FontId) -> (&'static MonoFont<'static>, Option<FontFallbackReason>) {
        let (size_bucket, variant) = Self::decode_font_id(font_id);
        match (size_bucket, variant) {
            (Self::SIZE_TINY, Self::VARIANT_REGULAR) => (&FONT_5X8, None),
            (Self::SIZE_TINY, _) => (&FONT_5X8, Some(FontFallbackReason::UnsupportedWeightItalic)),
            (Self::SIZE_SMALL, Self::VARIANT_REGULAR) => (&FONT_6X10, None),
            (Self::SIZE_SMALL, Self::VARIANT_ITALIC) => (&FONT_6X13_ITALIC, None),
            (Self::SIZE_SMALL, Self::VARIANT_BOLD) => (&FONT_6X13_BOLD, None),
            (Self::SIZE_SMALL, Self::VARIANT_BOLD_ITALIC) => (
                &FONT_6X13_BOLD,
                Some(FontFallbackReason::UnsupportedWeightItalic),
            ),
            (Self::SIZE_MEDIUM, Self::VARIANT_REGULAR) => (&FONT_7X13, None),
            (Self::SIZE_MEDIUM, Self::VARIANT_ITALIC) => (&FONT_7X13_ITALIC, None),
            (Self::SIZE_MEDIUM, Self::VARIANT_BOLD) => (&FONT_7X13_BOLD, None),
            (Self::SIZE_MEDIUM, Self::VARIANT_BOLD_ITALIC) => (
                &FONT_7X13_BOLD,
                Some(FontFallbackReason::UnsupportedWeightItalic),
            ),
            (Self::SIZE_LARGE, Self::VARIANT_REGULAR) => (&FONT_9X15, None),
            (Self::SIZE_LARGE, Self::VARIANT_ITALIC) => (&FONT_8X13_ITALIC, None),
            (Self::SIZE_LARGE, Self::VARIANT_BOLD) => (&FONT_9X15_BOLD, None),
            (Self::SIZE_LARGE, Self::VARIANT_BOLD_ITALIC) => (
                &FONT_9X15_BOLD,
                Some(FontFallbackReason::UnsupportedWeightItalic),
            ),
            (Self::SIZE_XL, Self::VARIANT_REGULAR) => (&FONT_10X20, None),
            (Self::SIZE_XL, Self::VARIANT_ITALIC) => (
                &FONT_9X18,
                Some(FontFallbackReason::UnsupportedWeightItalic),
            ),
            (Self::SIZE_XL, Self::VARIANT_BOLD) => (&FONT_9X18_BOLD, None),
            (Self::SIZE_XL, Self::VARIANT_BOLD_ITALIC) => (
                &FONT_9X18_BOLD,
                Some(FontFallbackReason::UnsupportedWeightItalic),
            ),
            _ => (&FONT_7X13, Some(FontFallbackReason::UnknownFontId)),
        }
    }

    fn style_for(font_id: FontId) -> MonoTextStyle<'static, BinaryColor> {
        let (font, _) = Self::font_for(font_id);
        MonoTextStyle::new(font, BinaryColor::On)
    }
}

impl FontBackend for MonoFontBackend {
    fn resolve_font(&self, style: &TextStyle) -> FontSelection {
        // every family renders in fixed pitch; only a missing family is odd
        let mut fallback_reason = style
            .family
            .trim()
            .is_empty()
            .then_some(FontFallbackReason::UnknownFamily);

        let font_id =
            Self::encode_font_id(Self::size_bucket_for(style), Self::style_variant_for(style));
        let (_, style_fallback) = Self::font_for(font_id);
        if style_fallback.is_some() {
            fallback_reason = style_fallback;
        }

        FontSelection {
            font_id,
            fallback_reason,
        }
    }

    fn metrics(&self, font_id: FontId) -> FontMetrics {
        let style = Self::style_for(font_id);
        let size = style.font.character_size;
        let width = size.width as i32 + style.font.character_spacing as i32;
        FontMetrics {
            char_width: width,
            space_width: width,
            line_height: size.height as i32,
        }
    }

    fn normalize<'a>(&self, text: &'a str) -> Cow<'a, str> {
        normalize_text_for_mono(text)
    }

    fn draw_text_run<D>(
        &self,
        display: &mut D,
        font_id: FontId,
        text: &str,
        origin: Point,
    ) -> Result<i32, D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let style = Self::style_for(font_id);
        let normalized = normalize_text_for_mono(text);
        Text::with_baseline(normalized.as_ref(), origin, style, Baseline::Top).draw(display)?;
        Ok(self.metrics(font_id).run_width(normalized.as_ref()))
    }
}

fn normalize_text_for_mono(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|ch| {
        matches!(
            ch,
            '\u{00A0}' // nbsp
                | '\u{2010}' // hyphen
                | '\u{2011}' // non-breaking hyphen
                | '\u{2013}' // en dash
                | '\u{2014}' // em dash
                | '\u{2018}' // left single quote
                | '\u{2019}' // right single quote
                | '\u{201A}' // low single quote
                | '\u{201C}' // left double quote
                | '\u{201D}' // right double quote
                | '\u{201E}' // low double quote
                | '\u{2026}' // ellipsis
        )
    }) {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\u{00A0}' => out.push(' '),
            '\u{2010}' | '\u{2011}' | '\u{2013}' | '\u{2014}' => out.push('-'),
            '\u{2018}' | '\u{2019}' | '\u{201A}' => out.push('\''),
            '\u{201C}' | '\u{201D}' | '\u{201E}' => out.push('"'),
            '\u{2026}' => out.push_str("..."),
            other => out.push(other),
        }
    }
    Cow::Owned(out)
}

const PAGE_NUMBER_DROP_MM: f32 = 5.0;
const PAGE_NUMBER_SCALE: f32 = 0.8;

/// Everything the renderer needs from a layout pass besides the pages.
#[derive(Clone, Debug, PartialEq)]
pub struct PageFrame {
    pub geometry: PageGeometry,
    pub styles: TypesetStyles,
    /// Gap between the parts of one word in px.
    pub inter_morpheme_gap: f32,
    pub joiner: char,
    /// Verse numeral offset in px.
    pub verse_offset: (f32, f32),
}

impl PageFrame {
    /// Frame matching what `engine` lays out for `settings`.
    pub fn from_settings(
        engine: &LayoutEngine,
        settings: &PrintSettings,
    ) -> Result<Self, LayoutError> {
        let cfg = engine.config();
        let offset = &settings.typography.verse_number_offset;
        Ok(Self {
            geometry: engine.geometry(settings)?,
            styles: engine.styles(settings),
            inter_morpheme_gap: cfg.inter_morpheme_gap,
            joiner: cfg.joiner,
            verse_offset: (offset.x * PX_PER_PT, offset.y * PX_PER_PT),
        })
    }

    fn page_number_style(&self) -> TextStyle {
        let main = &self.styles.main;
        TextStyle::new(
            main.family.clone(),
            main.weight,
            main.size_px * PAGE_NUMBER_SCALE,
            TextRole::Main,
        )
    }
}

/// embedded-graphics backend configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EgRenderConfig {
    /// Clear display before drawing page.
    pub clear_first: bool,
    /// Draw the physical page number in the bottom margin.
    pub page_numbers: bool,
    /// Vertical gap between source text and gloss in px.
    pub gloss_gap: i32,
}

impl Default for EgRenderConfig {
    fn default() -> Self {
        Self {
            clear_first: true,
            page_numbers: true,
            gloss_gap: 1,
        }
    }
}

/// Page painter for embedded-graphics targets.
///
/// Tokens are drawn at the positions the layout produced; the renderer never
/// re-measures spacing or re-justifies.
#[derive(Clone, Debug)]
pub struct EgRenderer<B = MonoFontBackend> {
    cfg: EgRenderConfig,
    frame: PageFrame,
    backend: B,
}

impl EgRenderer<MonoFontBackend> {
    pub fn new(cfg: EgRenderConfig, frame: PageFrame) -> Self {
        Self::with_backend(cfg, frame, MonoFontBackend)
    }
}

impl<B> EgRenderer<B>
where
    B: FontBackend,
{
    /// Create renderer with config and backend.
    pub fn with_backend(cfg: EgRenderConfig, frame: PageFrame, backend: B) -> Self {
        Self {
            cfg,
            frame,
            backend,
        }
    }

    pub fn config(&self) -> &EgRenderConfig {
        &self.cfg
    }

    pub fn frame(&self) -> &PageFrame {
        &self.frame
    }

    /// Render a content page into a draw target.
    pub fn render_page<D>(&self, page: &Page, display: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        self.render_page_with_diagnostics(page, display).map(|_| ())
    }

    /// Render a content page and report fallback counters.
    pub fn render_page_with_diagnostics<D>(
        &self,
        page: &Page,
        display: &mut D,
    ) -> Result<EgRenderDiagnostics, D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let mut diagnostics = EgRenderDiagnostics::default();
        if self.cfg.clear_first {
            display.clear(BinaryColor::Off)?;
        }
        let geometry = &self.frame.geometry;
        let side = PageGeometry::side_of(page.page_number);
        let (left, _) = geometry.horizontal_margins(side);
        for (index, line) in page.lines.iter().enumerate() {
            let top = geometry.margin_top + index as f32 * geometry.line_height;
            self.draw_line(display, line, left, top, &mut diagnostics)?;
            if line.occupied_width() > geometry.max_width + 0.5 {
                diagnostics.overflowing_lines = diagnostics.overflowing_lines.saturating_add(1);
            }
        }
        if self.cfg.page_numbers {
            self.draw_page_number(display, page.page_number, side, &mut diagnostics)?;
        }
        if diagnostics.text_fallbacks.total() > 0 {
            log::debug!(
                "page {} drew {} runs with {} font fallbacks",
                page.page_number,
                diagnostics.text_runs,
                diagnostics.text_fallbacks.total()
            );
        }
        Ok(diagnostics)
    }

    fn draw_line<D>(
        &self,
        display: &mut D,
        line: &Line,
        left: f32,
        top: f32,
        diagnostics: &mut EgRenderDiagnostics,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let styles = &self.frame.styles;
        let mut x = left;
        for positioned in &line.tokens {
            match &positioned.token {
                Token::Word(word) => self.draw_word(display, word, x, top, diagnostics)?,
                Token::Punctuation(punct) => {
                    let font = self.select(&styles.main, diagnostics);
                    self.draw_run(display, font, &punct.value, x, top, diagnostics)?;
                }
                Token::VerseMarker(marker) => {
                    let font = self.select(&styles.verse_number, diagnostics);
                    let (dx, dy) = self.frame.verse_offset;
                    self.draw_run(display, font, &marker.value, x + dx, top + dy, diagnostics)?;
                }
                Token::ChapterMarker(marker) => {
                    let font = self.select(&styles.chapter_number, diagnostics);
                    let numeral = marker.value.to_string();
                    self.draw_run(display, font, &numeral, x, top, diagnostics)?;
                }
            }
            x += positioned.advance();
        }
        Ok(())
    }

    /// Parts stack source text over a lowercased gloss, both centered in the
    /// part's measured width.
    fn draw_word<D>(
        &self,
        display: &mut D,
        word: &WordToken,
        left: f32,
        top: f32,
        diagnostics: &mut EgRenderDiagnostics,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let main = self.select(&self.frame.styles.main, diagnostics);
        let gloss = self.select(&self.frame.styles.gloss, diagnostics);
        let gloss_top =
            top + (self.backend.metrics(main).line_height + self.cfg.gloss_gap) as f32;
        let last = word.parts.len().saturating_sub(1);
        let mut x = left;
        for (i, part) in word.parts.iter().enumerate() {
            let text: Cow<'_, str> = if word.continuation && i == last {
                Cow::Owned(format!("{}{}", part.text, self.frame.joiner))
            } else {
                Cow::Borrowed(part.text.as_str())
            };
            let gloss_text = part.gloss.to_lowercase();
            let part_width = part.width.unwrap_or_else(|| {
                self.run_width(main, &text)
                    .max(self.run_width(gloss, &gloss_text)) as f32
            });
            self.draw_centered(display, main, &text, x, part_width, top, diagnostics)?;
            self.draw_centered(display, gloss, &gloss_text, x, part_width, gloss_top, diagnostics)?;
            x += part_width + self.frame.inter_morpheme_gap;
        }
        Ok(())
    }

    /// Physical page number under the text block: flush left on verso, flush
    /// right on recto.
    fn draw_page_number<D>(
        &self,
        display: &mut D,
        content_page: usize,
        side: PageSide,
        diagnostics: &mut EgRenderDiagnostics,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let geometry = &self.frame.geometry;
        let font = self.select(&self.frame.page_number_style(), diagnostics);
        let label = PageGeometry::physical_page_number(content_page).to_string();
        let (left, right) = geometry.horizontal_margins(side);
        let x = match side {
            PageSide::Verso => left,
            PageSide::Recto => geometry.page_width - right - self.run_width(font, &label) as f32,
        };
        let y = geometry.page_height - geometry.margin_bottom
            + PAGE_NUMBER_DROP_MM * PX_PER_INCH / MM_PER_INCH;
        self.draw_run(display, font, &label, x, y, diagnostics)
    }

    fn select(&self, style: &TextStyle, diagnostics: &mut EgRenderDiagnostics) -> FontId {
        let selection = self.backend.resolve_font(style);
        if let Some(reason) = selection.fallback_reason {
            diagnostics.note_text_fallback(reason);
        }
        selection.font_id
    }

    fn run_width(&self, font_id: FontId, text: &str) -> i32 {
        let normalized = self.backend.normalize(text);
        self.backend.metrics(font_id).run_width(normalized.as_ref())
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_centered<D>(
        &self,
        display: &mut D,
        font_id: FontId,
        text: &str,
        left: f32,
        box_width: f32,
        top: f32,
        diagnostics: &mut EgRenderDiagnostics,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let offset = (box_width - self.run_width(font_id, text) as f32) / 2.0;
        self.draw_run(display, font_id, text, left + offset, top, diagnostics)
    }

    fn draw_run<D>(
        &self,
        display: &mut D,
        font_id: FontId,
        text: &str,
        x: f32,
        y: f32,
        diagnostics: &mut EgRenderDiagnostics,
    ) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        if text.is_empty() {
            return Ok(());
        }
        diagnostics.note_text_run();
        let origin = Point::new(x.round() as i32, y.round() as i32);
        self.backend
            .draw_text_run(display, font_id, text, origin)
            .map(|_| ())
    }
}
