use interlinear::{flatten_chapters, Chapter, PrintSettings, SettingsError, Token, TokenError};
use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use crate::geometry::PageGeometry;
use crate::layout_ir::{LayoutProfileId, Line, Page};
use crate::line_break::LineBreaker;
use crate::measure::{HeuristicMeasurer, TextMeasurer, TypesetStyles};
use crate::paginate::Paginator;
use crate::token_measure::TokenMeasurer;

static DEFAULT_MEASURER: HeuristicMeasurer = HeuristicMeasurer;

/// Cancellation hook for long-running layout passes.
pub trait CancelToken {
    fn is_cancelled(&self) -> bool;
}

/// Never-cancel token for default call paths.
#[derive(Clone, Copy, Debug, Default)]
pub struct NeverCancel;

impl CancelToken for NeverCancel {
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// Runtime diagnostics from a layout pass.
#[derive(Clone, Debug, PartialEq)]
pub enum LayoutDiagnostic {
    ReflowTimeMs(u32),
    Cancelled,
    /// A token wider than the line was placed anyway.
    TokenOverflow {
        line_index: usize,
        width: f32,
        max_width: f32,
    },
    /// An over-wide compound word was split at morpheme boundaries.
    CompoundSplit {
        token_index: usize,
        original: String,
        pieces: usize,
    },
    /// A justified gap fell outside the configured word-space band.
    GapOutsideBand {
        line_index: usize,
        gap: f32,
        min: f32,
        max: f32,
    },
}

type DiagnosticCallback = Arc<Mutex<Box<dyn FnMut(LayoutDiagnostic) + Send + 'static>>>;
type DiagnosticSink = Option<DiagnosticCallback>;

/// Layout tuning in layout px unless noted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayoutConfig {
    /// Minimum space between spaced tokens, used for fitting and on the final line.
    pub min_space_width: f32,
    /// Gap between morphemes of one word.
    pub inter_morpheme_gap: f32,
    /// Added to each word part's width.
    pub part_padding: f32,
    /// Added to the chapter numeral's width.
    pub chapter_padding: f32,
    /// Chapter numeral size relative to the main font.
    pub chapter_scale: f32,
    /// Subtracted from the line width, in inches.
    pub safety_buffer_in: f32,
    /// Glyph drawn after a continued word piece.
    pub joiner: char,
}

impl LayoutConfig {
    /// Defaults with a different minimum word space.
    pub fn with_min_space_width(min_space_width: f32) -> Self {
        Self {
            min_space_width,
            ..Self::default()
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            min_space_width: 6.0,
            inter_morpheme_gap: 4.0,
            part_padding: 1.0,
            chapter_padding: 8.0,
            chapter_scale: 1.5,
            safety_buffer_in: 0.15,
            joiner: '-',
        }
    }
}

/// Layout engine: tokens in, justified lines and pages out.
#[derive(Clone)]
pub struct LayoutEngine {
    cfg: LayoutConfig,
    text_measurer: Option<Arc<dyn TextMeasurer>>,
    diagnostic_sink: DiagnosticSink,
}

impl fmt::Debug for LayoutEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LayoutEngine")
            .field("cfg", &self.cfg)
            .field("has_text_measurer", &self.text_measurer.is_some())
            .finish_non_exhaustive()
    }
}

impl Default for LayoutEngine {
    fn default() -> Self {
        Self::new(LayoutConfig::default())
    }
}

impl LayoutEngine {
    /// Create a layout engine using the heuristic measurer.
    pub fn new(cfg: LayoutConfig) -> Self {
        Self {
            cfg,
            text_measurer: None,
            diagnostic_sink: None,
        }
    }

    /// Install a shared text measurer for backend-accurate widths.
    pub fn with_text_measurer(mut self, measurer: Arc<dyn TextMeasurer>) -> Self {
        self.text_measurer = Some(measurer);
        self
    }

    /// Register or replace the diagnostics sink.
    pub fn set_diagnostic_sink<F>(&mut self, sink: F)
    where
        F: FnMut(LayoutDiagnostic) + Send + 'static,
    {
        self.diagnostic_sink = Some(Arc::new(Mutex::new(Box::new(sink))));
    }

    fn emit_diagnostic(&self, diagnostic: LayoutDiagnostic) {
        let Some(sink) = &self.diagnostic_sink else {
            return;
        };
        if let Ok(mut sink) = sink.lock() {
            sink(diagnostic);
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.cfg
    }

    /// The measurer in use.
    pub fn measurer(&self) -> &dyn TextMeasurer {
        match &self.text_measurer {
            Some(measurer) => measurer.as_ref(),
            None => &DEFAULT_MEASURER,
        }
    }

    /// Stable fingerprint for all layout-affecting settings.
    pub fn profile_id(&self, settings: &PrintSettings) -> LayoutProfileId {
        let payload = format!("{:?}|{:?}", settings, self.cfg);
        LayoutProfileId::from_bytes(payload.as_bytes())
    }

    /// Page geometry for `settings` under this engine's config.
    pub fn geometry(&self, settings: &PrintSettings) -> Result<PageGeometry, LayoutError> {
        Ok(PageGeometry::from_settings(settings, &self.cfg)?)
    }

    /// Role styles for `settings` under this engine's config.
    pub fn styles(&self, settings: &PrintSettings) -> TypesetStyles {
        TypesetStyles::from_settings(settings, self.cfg.chapter_scale)
    }

    /// Break a flow into justified lines.
    pub fn break_lines(
        &self,
        tokens: &[Token],
        settings: &PrintSettings,
    ) -> Result<Vec<Line>, LayoutError> {
        self.break_lines_with_cancel(tokens, settings, &NeverCancel)
    }

    /// Break a flow into justified lines, polling `cancel` between tokens.
    pub fn break_lines_with_cancel<C>(
        &self,
        tokens: &[Token],
        settings: &PrintSettings,
        cancel: &C,
    ) -> Result<Vec<Line>, LayoutError>
    where
        C: CancelToken + ?Sized,
    {
        let geometry = self.geometry(settings)?;
        self.break_lines_in(tokens, settings, geometry.max_width, cancel)
    }

    /// Lay out one continuous flow into pages.
    pub fn layout_flow(
        &self,
        tokens: &[Token],
        settings: &PrintSettings,
    ) -> Result<Vec<Page>, LayoutError> {
        self.layout_flow_with_cancel(tokens, settings, &NeverCancel)
    }

    /// Lay out one continuous flow into pages, polling `cancel` between
    /// tokens and between lines.
    pub fn layout_flow_with_cancel<C>(
        &self,
        tokens: &[Token],
        settings: &PrintSettings,
        cancel: &C,
    ) -> Result<Vec<Page>, LayoutError>
    where
        C: CancelToken + ?Sized,
    {
        let started = Instant::now();
        let geometry = self.geometry(settings)?;
        let lines = self.break_lines_in(tokens, settings, geometry.max_width, cancel)?;
        let line_count = lines.len();
        let mut paginator = Paginator::new(geometry.line_height, geometry.content_height);
        for line in lines {
            if cancel.is_cancelled() {
                return Err(self.cancelled());
            }
            paginator.push(line);
        }
        let pages = paginator.finish();
        log::debug!(
            "Laid out {} tokens into {} lines on {} pages (max_width={:.1}px, {} lines/page)",
            tokens.len(),
            line_count,
            pages.len(),
            geometry.max_width,
            geometry.lines_per_page()
        );
        let elapsed = started.elapsed().as_millis().min(u32::MAX as u128) as u32;
        self.emit_diagnostic(LayoutDiagnostic::ReflowTimeMs(elapsed));
        Ok(pages)
    }

    /// Flatten chapters into one flow with a chapter marker at each chapter
    /// start, then lay it out.
    pub fn layout_book(
        &self,
        chapters: &[Chapter],
        settings: &PrintSettings,
    ) -> Result<Vec<Page>, LayoutError> {
        self.layout_book_with_cancel(chapters, settings, &NeverCancel)
    }

    pub fn layout_book_with_cancel<C>(
        &self,
        chapters: &[Chapter],
        settings: &PrintSettings,
        cancel: &C,
    ) -> Result<Vec<Page>, LayoutError>
    where
        C: CancelToken + ?Sized,
    {
        let flow = flatten_chapters(chapters);
        self.layout_flow_with_cancel(&flow, settings, cancel)
    }

    fn break_lines_in<C>(
        &self,
        tokens: &[Token],
        settings: &PrintSettings,
        max_width: f32,
        cancel: &C,
    ) -> Result<Vec<Line>, LayoutError>
    where
        C: CancelToken + ?Sized,
    {
        interlinear::validate_flow(tokens)
            .map_err(|(index, source)| LayoutError::MalformedToken { index, source })?;
        if cancel.is_cancelled() {
            return Err(self.cancelled());
        }
        let styles = self.styles(settings);
        let measurer = TokenMeasurer::new(self.measurer(), &styles, &self.cfg);
        let mut measured = Vec::with_capacity(tokens.len());
        for (index, token) in tokens.iter().enumerate() {
            if cancel.is_cancelled() {
                return Err(self.cancelled());
            }
            let m = measurer
                .measure(token.clone())
                .map_err(|source| LayoutError::MalformedToken { index, source })?;
            measured.push(m);
        }

        let typo = &settings.typography;
        let mut breaker = LineBreaker::new(measurer, max_width, self.cfg.min_space_width)
            .with_word_space_band(typo.min_word_space, typo.max_word_space);
        for token in measured {
            if cancel.is_cancelled() {
                return Err(self.cancelled());
            }
            breaker.push(token)?;
            breaker.drain_diagnostics(|d| self.emit_diagnostic(d));
        }
        let (lines, diagnostics) = breaker.finish_with_diagnostics();
        for d in diagnostics {
            self.emit_diagnostic(d);
        }
        Ok(lines)
    }

    fn cancelled(&self) -> LayoutError {
        self.emit_diagnostic(LayoutDiagnostic::Cancelled);
        LayoutError::Cancelled
    }
}

/// Layout failure.
#[derive(Clone, Debug, PartialEq)]
pub enum LayoutError {
    /// A token violates the data model (a word without parts).
    MalformedToken { index: usize, source: TokenError },
    /// Settings cannot produce a line width, content height or line height.
    InvalidSettings(SettingsError),
    /// The pass was cancelled or superseded.
    Cancelled,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedToken { index, source } => {
                write!(f, "malformed token at index {}: {}", index, source)
            }
            Self::InvalidSettings(err) => write!(f, "invalid layout settings: {}", err),
            Self::Cancelled => write!(f, "layout cancelled"),
        }
    }
}

impl std::error::Error for LayoutError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MalformedToken { source, .. } => Some(source),
            Self::InvalidSettings(err) => Some(err),
            Self::Cancelled => None,
        }
    }
}

impl From<SettingsError> for LayoutError {
    fn from(value: SettingsError) -> Self {
        Self::InvalidSettings(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout_ir::LineAlignment;
    use crate::measure::TextStyle;
    use interlinear::WordToken;
    use std::sync::atomic::{AtomicBool, Ordering};

    /// 8 px per char.
    struct FixedMeasurer;

    impl TextMeasurer for FixedMeasurer {
        fn measure_text_px(&self, text: &str, _style: &TextStyle) -> f32 {
            text.chars().count() as f32 * 8.0
        }
    }

    fn engine() -> LayoutEngine {
        LayoutEngine::new(LayoutConfig::default()).with_text_measurer(Arc::new(FixedMeasurer))
    }

    fn verse_flow(verses: usize) -> Vec<Token> {
        let mut flow = vec![Token::chapter(1)];
        for v in 1..=verses {
            flow.push(Token::verse(v.to_string()));
            for (text, gloss) in [
                ("Und", "AND"),
                ("Gott", "GOD"),
                ("sprach", "SPOKE"),
                ("es", "IT"),
                ("werde", "BECOME"),
                ("Licht", "LIGHT"),
            ] {
                flow.push(Token::word(text, gloss));
            }
            flow.push(Token::punctuation("."));
        }
        flow
    }

    #[test]
    fn layout_is_deterministic() {
        let settings = PrintSettings::default();
        let a = engine().layout_flow(&verse_flow(80), &settings).expect("layout");
        let b = engine().layout_flow(&verse_flow(80), &settings).expect("layout");
        assert_eq!(a, b);
        assert!(a.len() > 1);
    }

    #[test]
    fn pages_hold_every_line_once() {
        let settings = PrintSettings::default();
        let e = engine();
        let lines = e.break_lines(&verse_flow(80), &settings).expect("lines");
        let pages = e.layout_flow(&verse_flow(80), &settings).expect("pages");
        let paged: Vec<&Line> = pages.iter().flat_map(|p| p.lines.iter()).collect();
        assert_eq!(paged.len(), lines.len());
        assert_eq!(
            pages.last().and_then(|p| p.lines.last()).map(|l| l.alignment),
            Some(LineAlignment::Final)
        );
    }

    #[test]
    fn empty_word_fails_before_layout() {
        let flow = vec![
            Token::word("Am", "IN"),
            Token::Word(WordToken {
                original: "Anfang".to_string(),
                parts: Vec::new(),
                continuation: false,
            }),
        ];
        let err = engine()
            .layout_flow(&flow, &PrintSettings::default())
            .expect_err("malformed");
        assert!(matches!(err, LayoutError::MalformedToken { index: 1, .. }));
    }

    #[test]
    fn invalid_settings_are_rejected() {
        let mut settings = PrintSettings::default();
        settings.typography.line_height_multiplier = 0.0;
        let err = engine()
            .layout_flow(&verse_flow(1), &settings)
            .expect_err("invalid");
        assert!(matches!(err, LayoutError::InvalidSettings(_)));
    }

    #[test]
    fn cancel_stops_layout_and_reports() {
        struct Cancelled;
        impl CancelToken for Cancelled {
            fn is_cancelled(&self) -> bool {
                true
            }
        }
        let saw_cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&saw_cancel);
        let mut e = engine();
        e.set_diagnostic_sink(move |d| {
            if d == LayoutDiagnostic::Cancelled {
                flag.store(true, Ordering::Relaxed);
            }
        });
        let err = e
            .layout_flow_with_cancel(&verse_flow(3), &PrintSettings::default(), &Cancelled)
            .expect_err("cancelled");
        assert_eq!(err, LayoutError::Cancelled);
        assert!(saw_cancel.load(Ordering::Relaxed));
    }

    #[test]
    fn profile_id_tracks_settings() {
        let e = engine();
        let base = PrintSettings::default();
        let mut bigger = base.clone();
        bigger.typography.main_font_size = 11.0;
        assert_eq!(e.profile_id(&base), e.profile_id(&base.clone()));
        assert_ne!(e.profile_id(&base), e.profile_id(&bigger));
    }

    #[test]
    fn empty_flow_yields_no_pages() {
        let pages = engine()
            .layout_flow(&[], &PrintSettings::default())
            .expect("layout");
        assert!(pages.is_empty());
    }

    #[test]
    fn default_engine_uses_heuristic_measurer() {
        let pages = LayoutEngine::default()
            .layout_book(
                &[Chapter {
                    number: 1,
                    paragraphs: vec![verse_flow(2)[1..].to_vec()],
                }],
                &PrintSettings::default(),
            )
            .expect("layout");
        assert_eq!(pages.len(), 1);
        assert!(pages[0].lines[0].tokens[0].token.is_chapter_marker());
    }
}
