//! Print settings: trim size, margins and typography.
//!
//! All physical dimensions are in inches and all font sizes in points, as the
//! settings UI presents them. Conversion to layout px happens in the layout
//! crate.

use serde::{Deserialize, Serialize};

use crate::error::SettingsError;

/// Layout px per inch.
pub const PX_PER_INCH: f32 = 96.0;
/// Layout px per typographic point.
pub const PX_PER_PT: f32 = PX_PER_INCH / 72.0;
/// Millimetres per inch.
pub const MM_PER_INCH: f32 = 25.4;

/// Trim size key used when none or an unknown key is given.
pub const DEFAULT_PAGE_SIZE: &str = "6x9";
/// Key selecting `custom_width` x `custom_height`.
pub const CUSTOM_PAGE_SIZE: &str = "custom";

/// Named trim size.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrimSize {
    pub key: &'static str,
    pub label: &'static str,
    pub width_in: f32,
    pub height_in: f32,
}

/// Supported trim sizes (print-on-demand sizes plus ISO A4/A5).
#[rustfmt::skip]
pub const TRIM_SIZES: &[TrimSize] = &[
    TrimSize { key: "5x8", label: "5\" x 8\" (Mass Market)", width_in: 5.0, height_in: 8.0 },
    TrimSize { key: "5.06x7.81", label: "5.06\" x 7.81\"", width_in: 5.06, height_in: 7.81 },
    TrimSize { key: "5.25x8", label: "5.25\" x 8\"", width_in: 5.25, height_in: 8.0 },
    TrimSize { key: "5.5x8.5", label: "5.5\" x 8.5\" (Digest)", width_in: 5.5, height_in: 8.5 },
    TrimSize { key: "6x9", label: "6\" x 9\" (US Trade)", width_in: 6.0, height_in: 9.0 },
    TrimSize { key: "6.14x9.21", label: "6.14\" x 9.21\" (Royal)", width_in: 6.14, height_in: 9.21 },
    TrimSize { key: "6.69x9.61", label: "6.69\" x 9.61\" (Super Royal)", width_in: 6.69, height_in: 9.61 },
    TrimSize { key: "7x10", label: "7\" x 10\" (Executive)", width_in: 7.0, height_in: 10.0 },
    TrimSize { key: "7.44x9.69", label: "7.44\" x 9.69\"", width_in: 7.44, height_in: 9.69 },
    TrimSize { key: "7.5x9.25", label: "7.5\" x 9.25\"", width_in: 7.5, height_in: 9.25 },
    TrimSize { key: "8x10", label: "8\" x 10\"", width_in: 8.0, height_in: 10.0 },
    TrimSize { key: "8.5x11", label: "8.5\" x 11\" (Letter)", width_in: 8.5, height_in: 11.0 },
    TrimSize { key: "A5", label: "A5 (148 x 210 mm)", width_in: 5.83, height_in: 8.27 },
    TrimSize { key: "A4", label: "A4 (210 x 297 mm)", width_in: 8.27, height_in: 11.69 },
];

impl TrimSize {
    /// Look up a trim size by key.
    pub fn lookup(key: &str) -> Option<&'static TrimSize> {
        TRIM_SIZES.iter().find(|size| size.key == key)
    }
}

/// Resolved physical page size in inches.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PageDimensions {
    pub width_in: f32,
    pub height_in: f32,
}

/// Page margins in inches. `inner` is the binding side.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Margins {
    pub top: f32,
    pub bottom: f32,
    pub inner: f32,
    pub outer: f32,
}

impl Default for Margins {
    fn default() -> Self {
        Self {
            top: 0.75,
            bottom: 0.75,
            inner: 0.875,
            outer: 0.5,
        }
    }
}

/// Abstract font: a CSS-like family stack plus numeric weight.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct FontDescriptor {
    pub family: String,
    pub weight: u16,
}

impl FontDescriptor {
    pub fn new(family: impl Into<String>, weight: u16) -> Self {
        Self {
            family: family.into(),
            weight,
        }
    }

    /// Same family at bold weight.
    pub fn bold(&self) -> Self {
        Self {
            family: self.family.clone(),
            weight: self.weight.max(700),
        }
    }

    /// First family of the stack, trimmed and unquoted.
    pub fn primary_family(&self) -> &str {
        self.family
            .split(',')
            .map(|f| f.trim().trim_matches(|c| c == '"' || c == '\''))
            .find(|f| !f.is_empty())
            .unwrap_or("serif")
    }
}

impl Default for FontDescriptor {
    fn default() -> Self {
        Self::new("Georgia, serif", 400)
    }
}

/// Horizontal/vertical nudge for verse numerals, in points.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerseNumberOffset {
    /// Negative moves left.
    pub x: f32,
    /// Negative moves up.
    pub y: f32,
}

impl Default for VerseNumberOffset {
    fn default() -> Self {
        Self { x: 1.0, y: -2.0 }
    }
}

/// Typography settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Typography {
    pub main_font: FontDescriptor,
    pub gloss_font: FontDescriptor,
    /// Points.
    pub main_font_size: f32,
    /// Points.
    pub gloss_font_size: f32,
    /// Points.
    pub verse_number_font_size: f32,
    /// Hex colour such as `#6b7280`.
    pub verse_number_color: String,
    pub verse_number_offset: VerseNumberOffset,
    pub line_height_multiplier: f32,
    /// Lower word-space bound in layout px.
    ///
    /// Exposed to the settings UI; see the layout crate for how it is used.
    pub min_word_space: f32,
    /// Upper word-space bound in layout px.
    pub max_word_space: f32,
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            main_font: FontDescriptor::new("Georgia, serif", 400),
            gloss_font: FontDescriptor::new("Inter, sans-serif", 400),
            main_font_size: 10.0,
            gloss_font_size: 5.0,
            verse_number_font_size: 6.0,
            verse_number_color: "#6b7280".to_string(),
            verse_number_offset: VerseNumberOffset::default(),
            line_height_multiplier: 1.8,
            min_word_space: 6.0,
            max_word_space: 30.0,
        }
    }
}

/// Complete print settings record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PrintSettings {
    /// Trim size key from [`TRIM_SIZES`] or [`CUSTOM_PAGE_SIZE`].
    pub page_size: String,
    /// Inches, used with [`CUSTOM_PAGE_SIZE`].
    pub custom_width: Option<f32>,
    /// Inches, used with [`CUSTOM_PAGE_SIZE`].
    pub custom_height: Option<f32>,
    pub margins: Margins,
    pub typography: Typography,
}

impl Default for PrintSettings {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE.to_string(),
            custom_width: None,
            custom_height: None,
            margins: Margins::default(),
            typography: Typography::default(),
        }
    }
}

impl PrintSettings {
    /// Settings for a named trim size with default margins and typography.
    pub fn for_trim(key: &str) -> Self {
        Self {
            page_size: key.to_string(),
            ..Self::default()
        }
    }

    /// Settings for a custom page size in inches.
    pub fn custom(width_in: f32, height_in: f32) -> Self {
        Self {
            page_size: CUSTOM_PAGE_SIZE.to_string(),
            custom_width: Some(width_in),
            custom_height: Some(height_in),
            ..Self::default()
        }
    }

    /// Parse a settings payload; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        serde_json::from_str(json).map_err(|err| SettingsError::Decode(err.to_string()))
    }

    /// Resolve the physical page size.
    ///
    /// Unknown trim keys fall back to [`DEFAULT_PAGE_SIZE`]; a custom size with
    /// a missing dimension uses 6 x 9 inches for that dimension.
    pub fn page_dimensions(&self) -> PageDimensions {
        if self.page_size == CUSTOM_PAGE_SIZE {
            return PageDimensions {
                width_in: self.custom_width.unwrap_or(6.0),
                height_in: self.custom_height.unwrap_or(9.0),
            };
        }
        let size = match TrimSize::lookup(&self.page_size) {
            Some(size) => size,
            None => {
                log::warn!(
                    "Unknown page size {:?}; falling back to {}",
                    self.page_size,
                    DEFAULT_PAGE_SIZE
                );
                &TRIM_SIZES[4]
            }
        };
        PageDimensions {
            width_in: size.width_in,
            height_in: size.height_in,
        }
    }

    /// Reject settings that cannot produce a layout.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let dims = self.page_dimensions();
        let typo = &self.typography;
        for (field, value) in [
            ("page width", dims.width_in),
            ("page height", dims.height_in),
            ("main font size", typo.main_font_size),
            ("gloss font size", typo.gloss_font_size),
            ("verse number font size", typo.verse_number_font_size),
            ("line height multiplier", typo.line_height_multiplier),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(SettingsError::NonPositive { field, value });
            }
        }
        let m = &self.margins;
        for (field, value) in [
            ("top margin", m.top),
            ("bottom margin", m.bottom),
            ("inner margin", m.inner),
            ("outer margin", m.outer),
        ] {
            if value < 0.0 || !value.is_finite() {
                return Err(SettingsError::NonPositive { field, value });
            }
        }
        let available_w = dims.width_in - m.inner - m.outer;
        if available_w <= 0.0 {
            return Err(SettingsError::NoContentArea {
                axis: "horizontal",
                available: available_w,
            });
        }
        let available_h = dims.height_in - m.top - m.bottom;
        if available_h <= 0.0 {
            return Err(SettingsError::NoContentArea {
                axis: "vertical",
                available: available_h,
            });
        }
        Ok(())
    }
}
