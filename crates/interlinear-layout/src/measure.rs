use interlinear::{PrintSettings, PX_PER_PT};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Semantic role of a run of text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TextRole {
    /// Source-language text of a word part, and punctuation.
    Main,
    /// Gloss line under the source text.
    Gloss,
    /// Superscript verse numeral.
    VerseNumber,
    /// Inline chapter numeral.
    ChapterNumber,
}

/// Font descriptor used for measuring and drawing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    /// Primary family name, e.g. `Georgia` or `serif`.
    pub family: String,
    pub weight: u16,
    pub italic: bool,
    /// Font size in layout px.
    pub size_px: f32,
    pub role: TextRole,
}

impl TextStyle {
    pub fn new(family: impl Into<String>, weight: u16, size_px: f32, role: TextRole) -> Self {
        Self {
            family: family.into(),
            weight,
            italic: false,
            size_px,
            role,
        }
    }

    pub fn is_bold(&self) -> bool {
        self.weight >= 700
    }

    fn key(&self) -> StyleKey {
        StyleKey {
            family: self.family.clone(),
            weight: self.weight,
            italic: self.italic,
            size_bits: self.size_px.to_bits(),
            role: self.role,
        }
    }
}

/// Text width measurement hook.
///
/// Implementations must be deterministic per `(text, style)` and return 0 for
/// empty text.
pub trait TextMeasurer: Send + Sync {
    /// Measure rendered text width in layout px.
    fn measure_text_px(&self, text: &str, style: &TextStyle) -> f32;
}

impl<T: TextMeasurer + ?Sized> TextMeasurer for Arc<T> {
    fn measure_text_px(&self, text: &str, style: &TextStyle) -> f32 {
        (**self).measure_text_px(text, style)
    }
}

/// Glyph-class width estimate used when no backend measurer is installed.
#[derive(Clone, Copy, Debug, Default)]
pub struct HeuristicMeasurer;

impl TextMeasurer for HeuristicMeasurer {
    fn measure_text_px(&self, text: &str, style: &TextStyle) -> f32 {
        heuristic_measure_text(text, style)
    }
}

fn heuristic_measure_text(text: &str, style: &TextStyle) -> f32 {
    if text.is_empty() {
        return 0.0;
    }
    let family = style.family.to_ascii_lowercase();
    let proportional = !(family.contains("mono")
        || family.contains("courier")
        || family.contains("consolas"));
    let mut em_sum = 0.0f32;
    if proportional {
        for ch in text.chars() {
            em_sum += proportional_glyph_em_width(ch);
        }
    } else {
        for ch in text.chars() {
            em_sum += if ch == ' ' { 0.52 } else { 0.60 };
        }
    }

    let mut family_scale = if family.contains("sans") {
        0.99
    } else if family.contains("serif") || family.contains("georgia") || family.contains("times")
    {
        1.03
    } else {
        1.00
    };
    if style.is_bold() {
        family_scale += 0.03;
    }
    if style.italic {
        family_scale += 0.01;
    }
    em_sum * style.size_px * family_scale
}

fn proportional_glyph_em_width(ch: char) -> f32 {
    match ch {
        ' ' | '\u{00A0}' => 0.32,
        'i' | 'l' | 'I' | '|' | '!' => 0.24,
        '.' | ',' | ':' | ';' | '\'' | '"' | '`' => 0.23,
        '-' | '\u{2010}' | '\u{2011}' | '\u{2012}' | '\u{2013}' | '\u{2014}' => 0.34,
        '(' | ')' | '[' | ']' | '{' | '}' => 0.30,
        'f' | 't' | 'j' | 'r' => 0.34,
        'm' | 'w' | 'M' | 'W' | '@' | '%' | '&' | '#' => 0.74,
        c if c.is_ascii_digit() => 0.52,
        c if c.is_ascii_uppercase() => 0.64,
        c if c.is_ascii_lowercase() => 0.52,
        c if c.is_whitespace() => 0.32,
        c if c.is_ascii_punctuation() => 0.42,
        c if c.is_uppercase() => 0.66,
        _ => 0.56,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct StyleKey {
    family: String,
    weight: u16,
    italic: bool,
    size_bits: u32,
    role: TextRole,
}

/// Memoizing wrapper around any measurer.
///
/// Entries are keyed by every field of the style, so two descriptors never
/// share a width.
pub struct CachedMeasurer<M> {
    inner: M,
    memo: Mutex<HashMap<(StyleKey, String), f32>>,
}

impl<M: TextMeasurer> CachedMeasurer<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            memo: Mutex::new(HashMap::new()),
        }
    }

    /// Number of memoized widths.
    pub fn len(&self) -> usize {
        self.memo.lock().map(|memo| memo.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every memoized width.
    pub fn clear(&self) {
        if let Ok(mut memo) = self.memo.lock() {
            memo.clear();
        }
    }

    pub fn inner(&self) -> &M {
        &self.inner
    }
}

impl<M> core::fmt::Debug for CachedMeasurer<M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let entries = self.memo.lock().map(|memo| memo.len()).unwrap_or(0);
        f.debug_struct("CachedMeasurer")
            .field("entries", &entries)
            .finish_non_exhaustive()
    }
}

impl<M: TextMeasurer> TextMeasurer for CachedMeasurer<M> {
    fn measure_text_px(&self, text: &str, style: &TextStyle) -> f32 {
        if text.is_empty() {
            return 0.0;
        }
        let key = (style.key(), text.to_string());
        // A poisoned memo only costs a re-measure.
        let Ok(mut memo) = self.memo.lock() else {
            return self.inner.measure_text_px(text, style);
        };
        if let Some(width) = memo.get(&key) {
            return *width;
        }
        let width = self.inner.measure_text_px(text, style);
        memo.insert(key, width);
        width
    }
}

/// The four text styles a layout pass measures with.
///
/// Backends draw with the same styles so measured and drawn widths agree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TypesetStyles {
    pub main: TextStyle,
    pub gloss: TextStyle,
    pub verse_number: TextStyle,
    pub chapter_number: TextStyle,
}

impl TypesetStyles {
    /// Derive role styles from print settings.
    ///
    /// Point sizes convert to px at 96 dpi. Verse and chapter numerals use the
    /// bold main family; chapter numerals at `chapter_scale` times the main size.
    pub fn from_settings(settings: &PrintSettings, chapter_scale: f32) -> Self {
        let typo = &settings.typography;
        let main_family = typo.main_font.primary_family().to_string();
        let main_px = typo.main_font_size * PX_PER_PT;
        Self {
            main: TextStyle::new(
                main_family.clone(),
                typo.main_font.weight,
                main_px,
                TextRole::Main,
            ),
            gloss: TextStyle::new(
                typo.gloss_font.primary_family(),
                typo.gloss_font.weight,
                typo.gloss_font_size * PX_PER_PT,
                TextRole::Gloss,
            ),
            verse_number: TextStyle::new(
                main_family.clone(),
                typo.main_font.bold().weight,
                typo.verse_number_font_size * PX_PER_PT,
                TextRole::VerseNumber,
            ),
            chapter_number: TextStyle::new(
                main_family,
                typo.main_font.bold().weight,
                main_px * chapter_scale,
                TextRole::ChapterNumber,
            ),
        }
    }
}
