//! Advance widths of the standard base-14 faces, in 1/1000 em.

use interlinear_layout::TextStyle;
use serde::{Deserialize, Serialize};

/// Built-in PDF font families every conforming reader provides.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Base14Family {
    Helvetica,
    Times,
    Courier,
}

impl Base14Family {
    /// Map a CSS-style family name onto a base-14 family.
    ///
    /// Monospace names go to Courier, serif names to Times, everything else
    /// to Helvetica. `sans-serif` is checked before `serif`.
    pub fn for_css_family(family: &str) -> Self {
        let lower = family.to_ascii_lowercase();
        let has = |needle: &str| lower.contains(needle);
        if has("courier") || has("mono") || has("consolas") {
            Self::Courier
        } else if has("sans") {
            Self::Helvetica
        } else if has("georgia")
            || has("times")
            || has("garamond")
            || has("palatino")
            || has("serif")
        {
            Self::Times
        } else {
            Self::Helvetica
        }
    }

    /// Width used for characters the tables do not cover.
    pub fn default_width(self) -> u16 {
        match self {
            Self::Helvetica => 556,
            Self::Times => 500,
            Self::Courier => 600,
        }
    }
}

/// A concrete base-14 face.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Base14Font {
    pub family: Base14Family,
    pub bold: bool,
    pub italic: bool,
}

impl Base14Font {
    pub const fn new(family: Base14Family, bold: bool, italic: bool) -> Self {
        Self {
            family,
            bold,
            italic,
        }
    }

    /// Face used to measure and draw `style`.
    pub fn for_style(style: &TextStyle) -> Self {
        Self::new(
            Base14Family::for_css_family(&style.family),
            style.is_bold(),
            style.italic,
        )
    }

    /// PostScript name as written into the print file.
    pub fn pdf_name(&self) -> &'static str {
        match (self.family, self.bold, self.italic) {
            (Base14Family::Helvetica, false, false) => "Helvetica",
            (Base14Family::Helvetica, true, false) => "Helvetica-Bold",
            (Base14Family::Helvetica, false, true) => "Helvetica-Oblique",
            (Base14Family::Helvetica, true, true) => "Helvetica-BoldOblique",
            (Base14Family::Times, false, false) => "Times-Roman",
            (Base14Family::Times, true, false) => "Times-Bold",
            (Base14Family::Times, false, true) => "Times-Italic",
            (Base14Family::Times, true, true) => "Times-BoldItalic",
            (Base14Family::Courier, false, false) => "Courier",
            (Base14Family::Courier, true, false) => "Courier-Bold",
            (Base14Family::Courier, false, true) => "Courier-Oblique",
            (Base14Family::Courier, true, true) => "Courier-BoldOblique",
        }
    }

    /// Advance width of one character in 1/1000 em.
    ///
    /// Italic faces use the upright widths. Accented Latin-1 letters take the
    /// width of their base letter.
    pub fn glyph_width(&self, ch: char) -> u16 {
        if self.family == Base14Family::Courier {
            return 600;
        }
        let table = match (self.family, self.bold) {
            (Base14Family::Times, false) => &TIMES_ROMAN,
            (Base14Family::Times, true) => &TIMES_BOLD,
            (_, false) => &HELVETICA,
            (_, true) => &HELVETICA_BOLD,
        };
        let ch = match ch {
            '\u{00A0}' => ' ',
            other => fold_latin1(other).unwrap_or(other),
        };
        if (' '..='~').contains(&ch) {
            return table.ascii[ch as usize - 0x20];
        }
        table
            .extra
            .iter()
            .find(|(c, _)| *c == ch)
            .map(|(_, w)| *w)
            .unwrap_or_else(|| self.family.default_width())
    }

    /// Sum of advance widths in 1/1000 em.
    pub fn text_units(&self, text: &str) -> u32 {
        text.chars().map(|ch| u32::from(self.glyph_width(ch))).sum()
    }

    /// Width of `text` set at `size`, in the same unit as `size`.
    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        self.text_units(text) as f32 * size / 1000.0
    }
}

fn fold_latin1(ch: char) -> Option<char> {
    let base = match ch {
        'À' | 'Á' | 'Â' | 'Ã' | 'Ä' | 'Å' => 'A',
        'Ç' => 'C',
        'È' | 'É' | 'Ê' | 'Ë' => 'E',
        'Ì' | 'Í' | 'Î' | 'Ï' => 'I',
        'Ñ' => 'N',
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ö' | 'Ø' => 'O',
        'Ù' | 'Ú' | 'Û' | 'Ü' => 'U',
        'Ý' => 'Y',
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' | 'ø' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        _ => return None,
    };
    Some(base)
}

struct WidthTable {
    /// U+0020 through U+007E.
    ascii: [u16; 95],
    extra: &'static [(char, u16)],
}

static HELVETICA: WidthTable = WidthTable {
    ascii: [
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // sp - /
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0 - 9
        278, 278, 584, 584, 584, 556, 1015, // : - @
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, // A - M
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N - Z
        278, 278, 278, 469, 556, 333, // [ - `
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, // a - m
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, // n - z
        334, 260, 334, 584, // { - ~
    ],
    extra: &[
        ('ß', 611),
        ('\u{2013}', 556),
        ('\u{2014}', 1000),
        ('\u{2018}', 222),
        ('\u{2019}', 222),
        ('\u{201A}', 222),
        ('\u{201C}', 333),
        ('\u{201D}', 333),
        ('\u{201E}', 333),
        ('\u{2026}', 1000),
        ('«', 556),
        ('»', 556),
        ('·', 278),
    ],
};

static HELVETICA_BOLD: WidthTable = WidthTable {
    ascii: [
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, // sp - /
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556, // 0 - 9
        333, 333, 584, 584, 584, 611, 975, // : - @
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, // A - M
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, // N - Z
        333, 278, 333, 584, 556, 333, // [ - `
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, // a - m
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, // n - z
        389, 280, 389, 584, // { - ~
    ],
    extra: &[
        ('ß', 611),
        ('\u{2013}', 556),
        ('\u{2014}', 1000),
        ('\u{2018}', 278),
        ('\u{2019}', 278),
        ('\u{201A}', 278),
        ('\u{201C}', 500),
        ('\u{201D}', 500),
        ('\u{201E}', 500),
        ('\u{2026}', 1000),
        ('«', 556),
        ('»', 556),
        ('·', 278),
    ],
};

static TIMES_ROMAN: WidthTable = WidthTable {
    ascii: [
        250, 333, 408, 500, 500, 833, 778, 180, 333, 333, 500, 564, 250, 333, 250, 278, // sp - /
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500, // 0 - 9
        278, 278, 564, 564, 564, 444, 921, // : - @
        722, 667, 667, 722, 611, 556, 722, 722, 333, 389, 722, 611, 889, // A - M
        722, 722, 556, 722, 667, 556, 611, 722, 722, 944, 722, 722, 611, // N - Z
        333, 278, 333, 469, 500, 333, // [ - `
        444, 500, 444, 500, 444, 333, 500, 500, 278, 278, 500, 278, 778, // a - m
        500, 500, 500, 500, 333, 389, 278, 500, 500, 722, 500, 500, 444, // n - z
        480, 200, 480, 541, // { - ~
    ],
    extra: &[
        ('ß', 500),
        ('\u{2013}', 500),
        ('\u{2014}', 1000),
        ('\u{2018}', 333),
        ('\u{2019}', 333),
        ('\u{201A}', 333),
        ('\u{201C}', 444),
        ('\u{201D}', 444),
        ('\u{201E}', 444),
        ('\u{2026}', 1000),
        ('«', 500),
        ('»', 500),
        ('·', 250),
    ],
};

static TIMES_BOLD: WidthTable = WidthTable {
    ascii: [
        250, 333, 555, 500, 500, 1000, 833, 278, 333, 333, 500, 570, 250, 333, 250, 278, // sp - /
        500, 500, 500, 500, 500, 500, 500, 500, 500, 500, // 0 - 9
        333, 333, 570, 570, 570, 500, 930, // : - @
        722, 667, 722, 722, 667, 611, 778, 778, 389, 500, 778, 667, 944, // A - M
        722, 778, 611, 778, 722, 556, 667, 722, 722, 1000, 722, 722, 667, // N - Z
        333, 278, 333, 581, 500, 333, // [ - `
        500, 556, 444, 556, 444, 333, 500, 556, 278, 333, 556, 278, 833, // a - m
        556, 500, 556, 556, 444, 389, 333, 556, 500, 722, 500, 500, 444, // n - z
        394, 220, 394, 520, // { - ~
    ],
    extra: &[
        ('ß', 556),
        ('\u{2013}', 500),
        ('\u{2014}', 1000),
        ('\u{2018}', 333),
        ('\u{2019}', 333),
        ('\u{201A}', 333),
        ('\u{201C}', 500),
        ('\u{201D}', 500),
        ('\u{201E}', 500),
        ('\u{2026}', 1000),
        ('«', 500),
        ('»', 500),
        ('·', 250),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    const HELVETICA_REGULAR: Base14Font = Base14Font::new(Base14Family::Helvetica, false, false);
    const TIMES_REGULAR: Base14Font = Base14Font::new(Base14Family::Times, false, false);

    #[test]
    fn css_families_map_to_base14_buckets() {
        assert_eq!(Base14Family::for_css_family("Georgia"), Base14Family::Times);
        assert_eq!(Base14Family::for_css_family("EB Garamond"), Base14Family::Times);
        assert_eq!(Base14Family::for_css_family("serif"), Base14Family::Times);
        assert_eq!(Base14Family::for_css_family("Inter"), Base14Family::Helvetica);
        assert_eq!(Base14Family::for_css_family("sans-serif"), Base14Family::Helvetica);
        assert_eq!(Base14Family::for_css_family("JetBrains Mono"), Base14Family::Courier);
        assert_eq!(Base14Family::for_css_family(""), Base14Family::Helvetica);
    }

    #[test]
    fn ascii_tables_cover_known_widths() {
        assert_eq!(HELVETICA_REGULAR.glyph_width(' '), 278);
        assert_eq!(HELVETICA_REGULAR.glyph_width('@'), 1015);
        assert_eq!(HELVETICA_REGULAR.glyph_width('~'), 584);
        assert_eq!(TIMES_REGULAR.glyph_width('W'), 944);
        assert_eq!(TIMES_REGULAR.glyph_width('z'), 444);
        let times_bold = Base14Font::new(Base14Family::Times, true, false);
        assert_eq!(times_bold.glyph_width('%'), 1000);
        assert_eq!(times_bold.glyph_width('W'), 1000);
    }

    #[test]
    fn umlauts_take_base_letter_widths() {
        assert_eq!(TIMES_REGULAR.glyph_width('ä'), TIMES_REGULAR.glyph_width('a'));
        assert_eq!(HELVETICA_REGULAR.glyph_width('Ü'), HELVETICA_REGULAR.glyph_width('U'));
        assert_eq!(TIMES_REGULAR.glyph_width('ß'), 500);
        assert_eq!(HELVETICA_REGULAR.glyph_width('\u{00A0}'), 278);
    }

    #[test]
    fn unknown_glyphs_use_family_default() {
        assert_eq!(TIMES_REGULAR.glyph_width('א'), 500);
        assert_eq!(HELVETICA_REGULAR.glyph_width('ש'), 556);
        let courier = Base14Font::new(Base14Family::Courier, true, true);
        assert_eq!(courier.glyph_width('M'), 600);
        assert_eq!(courier.pdf_name(), "Courier-BoldOblique");
    }

    #[test]
    fn text_width_scales_with_size() {
        // G 722 + o 500 + t 278 + t 278
        assert_eq!(TIMES_REGULAR.text_units("Gott"), 1778);
        assert!((TIMES_REGULAR.text_width("Gott", 10.0) - 17.78).abs() < 1e-4);
        assert_eq!(TIMES_REGULAR.text_width("", 10.0), 0.0);
    }
}
