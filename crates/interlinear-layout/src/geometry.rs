use interlinear::{PrintSettings, SettingsError, PX_PER_INCH};
use serde::{Deserialize, Serialize};

use crate::engine::LayoutConfig;
use crate::layout_ir::PageSide;

/// Pages that precede content page 1 (the title page).
pub const FRONT_MATTER_PAGES: usize = 1;

/// Page box and content area in layout px.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PageGeometry {
    pub page_width: f32,
    pub page_height: f32,
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_inner: f32,
    pub margin_outer: f32,
    /// Line measure: content width minus the safety buffer.
    pub max_width: f32,
    pub content_height: f32,
    pub line_height: f32,
}

impl PageGeometry {
    /// Derive geometry from print settings at 96 px per inch.
    pub fn from_settings(
        settings: &PrintSettings,
        cfg: &LayoutConfig,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        let dims = settings.page_dimensions();
        let m = &settings.margins;
        let typo = &settings.typography;
        let geometry = Self {
            page_width: dims.width_in * PX_PER_INCH,
            page_height: dims.height_in * PX_PER_INCH,
            margin_top: m.top * PX_PER_INCH,
            margin_bottom: m.bottom * PX_PER_INCH,
            margin_inner: m.inner * PX_PER_INCH,
            margin_outer: m.outer * PX_PER_INCH,
            max_width: (dims.width_in - m.inner - m.outer - cfg.safety_buffer_in) * PX_PER_INCH,
            content_height: (dims.height_in - m.top - m.bottom) * PX_PER_INCH,
            // pt -> px last keeps common sizes exact in f32
            line_height: typo.main_font_size * typo.line_height_multiplier * PX_PER_INCH / 72.0,
        };
        geometry.check()?;
        Ok(geometry)
    }

    fn check(&self) -> Result<(), SettingsError> {
        for (field, value) in [
            ("line width", self.max_width),
            ("content height", self.content_height),
            ("line height", self.line_height),
        ] {
            if !(value > 0.0) || !value.is_finite() {
                return Err(SettingsError::NonPositive { field, value });
            }
        }
        Ok(())
    }

    /// Physical page number of a 1-based content page.
    pub fn physical_page_number(content_page: usize) -> usize {
        content_page + FRONT_MATTER_PAGES
    }

    /// Binding side of a content page.
    pub fn side_of(content_page: usize) -> PageSide {
        PageSide::for_physical_page(Self::physical_page_number(content_page))
    }

    /// Left and right margins for a side. Verso pages have the outer margin
    /// on the left.
    pub fn horizontal_margins(&self, side: PageSide) -> (f32, f32) {
        match side {
            PageSide::Recto => (self.margin_inner, self.margin_outer),
            PageSide::Verso => (self.margin_outer, self.margin_inner),
        }
    }

    /// Left edge of the text block on a content page.
    pub fn content_left(&self, content_page: usize) -> f32 {
        self.horizontal_margins(Self::side_of(content_page)).0
    }

    /// Lines that fit in the content height, at least 1.
    pub fn lines_per_page(&self) -> usize {
        ((self.content_height / self.line_height).floor() as usize).max(1)
    }
}
