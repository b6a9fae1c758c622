//! Serializable print job: pages of positioned text and rules in millimeters.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use interlinear_layout::PageSide;
use serde::{Deserialize, Serialize};

use crate::error::PrintError;

/// Media type of a serialized print job.
pub const PRINT_JOB_MIME: &str = "application/json";

/// 8-bit RGB color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Self = Self(0, 0, 0);

    /// Parse `#rrggbb` or `rrggbb`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&digits[i..i + 2], 16).ok();
        Some(Self(channel(0)?, channel(2)?, channel(4)?))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

/// Which edge of the glyph box `y` refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextBaseline {
    Top,
    Alphabetic,
}

/// One drawing operation. Coordinates are millimeters from the top-left
/// corner of the page.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PrintCommand {
    Text {
        x: f32,
        y: f32,
        text: String,
        /// Base-14 PostScript font name.
        font: String,
        size_pt: f32,
        color: Rgb,
        align: TextAlign,
        baseline: TextBaseline,
    },
    Rule {
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        width: f32,
        color: Rgb,
    },
}

impl PrintCommand {
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text { text, .. } => Some(text),
            Self::Rule { .. } => None,
        }
    }
}

/// One physical page of the job.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrintPage {
    /// 1-based physical page number; the title page is 1.
    pub number: usize,
    pub side: PageSide,
    pub commands: Vec<PrintCommand>,
}

impl PrintPage {
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(PrintCommand::text)
    }
}

/// Complete print job, handed to a print-file encoder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrintJob {
    pub title: String,
    pub width_mm: f32,
    pub height_mm: f32,
    pub pages: Vec<PrintPage>,
}

impl PrintJob {
    pub fn page(&self, number: usize) -> Option<&PrintPage> {
        self.pages.iter().find(|p| p.number == number)
    }

    /// Suggested download name, `{title}-interlinear.pdf`.
    pub fn file_name(&self) -> String {
        let title = self.title.trim();
        let stem = if title.is_empty() { "untitled" } else { title };
        format!("{stem}-interlinear.pdf")
    }

    pub fn to_json(&self) -> Result<String, PrintError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json_str(json: &str) -> Result<Self, PrintError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Job as a base64 `data:` URL for preview panes.
    pub fn to_data_url(&self) -> Result<String, PrintError> {
        let json = serde_json::to_vec(self)?;
        Ok(format!("data:{};base64,{}", PRINT_JOB_MIME, BASE64.encode(json)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_job(title: &str) -> PrintJob {
        PrintJob {
            title: title.to_string(),
            width_mm: 152.4,
            height_mm: 228.6,
            pages: vec![PrintPage {
                number: 2,
                side: PageSide::Verso,
                commands: vec![
                    PrintCommand::Text {
                        x: 12.7,
                        y: 19.05,
                        text: "Gott".to_string(),
                        font: "Times-Roman".to_string(),
                        size_pt: 10.0,
                        color: Rgb::BLACK,
                        align: TextAlign::Center,
                        baseline: TextBaseline::Top,
                    },
                    PrintCommand::Rule {
                        x1: 0.0,
                        y1: 0.0,
                        x2: 10.0,
                        y2: 0.0,
                        width: 0.3,
                        color: Rgb(180, 180, 180),
                    },
                ],
            }],
        }
    }

    #[test]
    fn hex_colors_parse_with_or_without_hash() {
        assert_eq!(Rgb::from_hex("#6b7280"), Some(Rgb(107, 114, 128)));
        assert_eq!(Rgb::from_hex("FF0000"), Some(Rgb(255, 0, 0)));
        assert_eq!(Rgb::from_hex("#fff"), None);
        assert_eq!(Rgb::from_hex("#gggggg"), None);
        assert_eq!(Rgb::from_hex("#ääää"), None);
    }

    #[test]
    fn file_name_falls_back_for_blank_titles() {
        assert_eq!(sample_job("Genesis").file_name(), "Genesis-interlinear.pdf");
        assert_eq!(sample_job("  ").file_name(), "untitled-interlinear.pdf");
    }

    #[test]
    fn json_uses_tagged_commands() {
        let job = sample_job("Genesis");
        let json = job.to_json().expect("serializes");
        assert!(json.contains(r#""kind":"text""#));
        assert!(json.contains(r#""kind":"rule""#));
        assert!(json.contains(r#""side":"Verso""#));
        assert_eq!(PrintJob::from_json_str(&json).expect("parses"), job);
    }

    #[test]
    fn data_url_wraps_base64_json() {
        let job = sample_job("Genesis");
        let url = job.to_data_url().expect("encodes");
        let payload = url
            .strip_prefix("data:application/json;base64,")
            .expect("data url prefix");
        let decoded = BASE64.decode(payload).expect("valid base64");
        let back: PrintJob = serde_json::from_slice(&decoded).expect("json");
        assert_eq!(back, job);
        assert_eq!(back.page(2).map(|p| p.texts().count()), Some(1));
    }
}
