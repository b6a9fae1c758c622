//! Turns laid-out pages into a millimeter-based print job.
//!
//! Positions come straight from the layout IR; nothing here re-measures
//! spacing or re-justifies a line.

use interlinear::{
    Chapter, PrintSettings, Token, WordToken, MM_PER_INCH, PX_PER_INCH, PX_PER_PT,
};
use interlinear_layout::{
    LayoutEngine, Line, Page, PageGeometry, PageSide, TextStyle, TypesetStyles,
};
use serde::{Deserialize, Serialize};

use crate::afm::{Base14Family, Base14Font};
use crate::error::PrintError;
use crate::job::{PrintCommand, PrintJob, PrintPage, Rgb, TextAlign, TextBaseline};

/// Millimeters per typographic point.
pub const PT_TO_MM: f32 = 0.352778;
/// Millimeters per layout px (96 px per inch).
pub const MM_PER_PX: f32 = MM_PER_INCH / PX_PER_INCH;

const TITLE_PAGE_NUMBER: usize = 1;
const TITLE_SCALE: f32 = 3.5;
const TITLE_WIDTH_FRACTION: f32 = 0.7;
const TITLE_LEADING: f32 = 1.15;
const SUBTITLE_SCALE: f32 = 1.2;
const PAGE_NUMBER_SCALE: f32 = 0.8;
const PAGE_NUMBER_DROP_MM: f32 = 5.0;
const GLOSS_DROP: f32 = 1.1;
const CHAPTER_RAISE_MM: f32 = 1.0;

const RULE_COLOR: Rgb = Rgb(180, 180, 180);
const TITLE_COLOR: Rgb = Rgb(31, 41, 55);
const SUBTITLE_COLOR: Rgb = Rgb(107, 114, 128);
const GLOSS_COLOR: Rgb = Rgb(80, 80, 80);
const CHAPTER_COLOR: Rgb = Rgb(51, 51, 51);
const PAGE_NUMBER_COLOR: Rgb = Rgb(128, 128, 128);
const DEFAULT_VERSE_COLOR: Rgb = Rgb(107, 114, 128);

/// Project metadata shown on the title page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BookMeta {
    pub title: String,
    /// Source language, e.g. `German`.
    pub language: Option<String>,
}

impl BookMeta {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            language: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    fn display_title(&self) -> &str {
        let title = self.title.trim();
        if title.is_empty() {
            "Untitled"
        } else {
            title
        }
    }

    /// `{language} Interlinear Edition`, or `Interlinear Edition`.
    pub fn subtitle(&self) -> String {
        match self.language.as_deref().map(str::trim) {
            Some(language) if !language.is_empty() => {
                format!("{language} Interlinear Edition")
            }
            _ => "Interlinear Edition".to_string(),
        }
    }
}

/// Print composition switches.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrintComposeOptions {
    pub page_numbers: bool,
    pub title_page: bool,
    /// Physical page numbers to emit; `None` emits every page.
    pub preview_pages: Option<Vec<usize>>,
}

impl Default for PrintComposeOptions {
    fn default() -> Self {
        Self {
            page_numbers: true,
            title_page: true,
            preview_pages: None,
        }
    }
}

impl PrintComposeOptions {
    /// Emit only the given physical pages.
    pub fn preview<I>(pages: I) -> Self
    where
        I: IntoIterator<Item = usize>,
    {
        Self {
            preview_pages: Some(pages.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn renders(&self, physical_page: usize) -> bool {
        self.preview_pages
            .as_ref()
            .is_none_or(|pages| pages.contains(&physical_page))
    }
}

#[derive(Clone, Copy, Debug)]
struct TextRun {
    font: Base14Font,
    size_pt: f32,
    color: Rgb,
}

impl TextRun {
    fn for_style(style: &TextStyle, color: Rgb) -> Self {
        Self {
            font: Base14Font::for_style(style),
            size_pt: style.size_px / PX_PER_PT,
            color,
        }
    }

    fn bold(mut self) -> Self {
        self.font.bold = true;
        self
    }

    fn width_mm(&self, text: &str) -> f32 {
        self.font.text_width(text, self.size_pt) * PT_TO_MM
    }

    fn at(
        &self,
        x: f32,
        y: f32,
        text: impl Into<String>,
        align: TextAlign,
        baseline: TextBaseline,
    ) -> PrintCommand {
        PrintCommand::Text {
            x,
            y,
            text: text.into(),
            font: self.font.pdf_name().to_string(),
            size_pt: self.size_pt,
            color: self.color,
            align,
            baseline,
        }
    }
}

fn mm(px: f32) -> f32 {
    px * MM_PER_PX
}

/// Builds print jobs for one settings snapshot.
#[derive(Clone, Debug)]
pub struct PrintComposer {
    geometry: PageGeometry,
    styles: TypesetStyles,
    inter_morpheme_gap: f32,
    joiner: char,
    verse_offset_mm: (f32, f32),
    verse_color: Rgb,
    options: PrintComposeOptions,
}

impl PrintComposer {
    /// Composer matching what `engine` lays out for `settings`.
    pub fn new(
        engine: &LayoutEngine,
        settings: &PrintSettings,
        options: PrintComposeOptions,
    ) -> Result<Self, PrintError> {
        let typo = &settings.typography;
        let verse_color = Rgb::from_hex(&typo.verse_number_color).unwrap_or_else(|| {
            log::warn!(
                "Unparseable verse number color {:?}; using default gray",
                typo.verse_number_color
            );
            DEFAULT_VERSE_COLOR
        });
        let cfg = engine.config();
        Ok(Self {
            geometry: engine.geometry(settings)?,
            styles: engine.styles(settings),
            inter_morpheme_gap: cfg.inter_morpheme_gap,
            joiner: cfg.joiner,
            verse_offset_mm: (
                typo.verse_number_offset.x * PT_TO_MM,
                typo.verse_number_offset.y * PT_TO_MM,
            ),
            verse_color,
            options,
        })
    }

    pub fn options(&self) -> &PrintComposeOptions {
        &self.options
    }

    /// Compose a job from content pages produced for the same settings.
    pub fn compose(&self, meta: &BookMeta, pages: &[Page]) -> PrintJob {
        let mut out = Vec::with_capacity(pages.len() + 1);
        if self.options.title_page && self.options.renders(TITLE_PAGE_NUMBER) {
            out.push(self.title_page(meta));
        }
        for page in pages {
            if self
                .options
                .renders(PageGeometry::physical_page_number(page.page_number))
            {
                out.push(self.content_page(page));
            }
        }
        log::debug!(
            "Composed {} print pages from {} content pages",
            out.len(),
            pages.len()
        );
        PrintJob {
            title: meta.display_title().to_string(),
            width_mm: mm(self.geometry.page_width),
            height_mm: mm(self.geometry.page_height),
            pages: out,
        }
    }

    fn title_page(&self, meta: &BookMeta) -> PrintPage {
        let width = mm(self.geometry.page_width);
        let height = mm(self.geometry.page_height);
        let center = width / 2.0;
        let ornament = width * 0.3;
        let mut commands = Vec::new();

        commands.push(rule(center, height * 0.25, ornament / 2.0, 0.3));

        let main = TextRun::for_style(&self.styles.main, TITLE_COLOR).bold();
        let title = TextRun {
            size_pt: main.size_pt * TITLE_SCALE,
            ..main
        };
        let title_y = height * 0.35;
        let lines = wrap_words(
            &meta.display_title().to_uppercase(),
            |s| title.width_mm(s),
            width * TITLE_WIDTH_FRACTION,
        );
        let leading = title.size_pt * PT_TO_MM * TITLE_LEADING;
        for (i, line) in lines.iter().enumerate() {
            commands.push(title.at(
                center,
                title_y + i as f32 * leading,
                line.as_str(),
                TextAlign::Center,
                TextBaseline::Alphabetic,
            ));
        }

        let divider_y = title_y + lines.len() as f32 * title.size_pt * PT_TO_MM + 15.0;
        commands.push(rule(center, divider_y, 10.0, 0.2));

        let subtitle = TextRun {
            font: Base14Font::new(
                Base14Family::for_css_family(&self.styles.gloss.family),
                false,
                true,
            ),
            size_pt: main.size_pt * SUBTITLE_SCALE,
            color: SUBTITLE_COLOR,
        };
        commands.push(subtitle.at(
            center,
            divider_y + 15.0,
            meta.subtitle(),
            TextAlign::Center,
            TextBaseline::Alphabetic,
        ));

        commands.push(rule(center, height * 0.75, ornament / 2.0, 0.3));

        PrintPage {
            number: TITLE_PAGE_NUMBER,
            side: PageSide::for_physical_page(TITLE_PAGE_NUMBER),
            commands,
        }
    }

    fn content_page(&self, page: &Page) -> PrintPage {
        let g = &self.geometry;
        let side = PageGeometry::side_of(page.page_number);
        let (left, right) = g.horizontal_margins(side);
        let mut commands = Vec::new();
        for (index, line) in page.lines.iter().enumerate() {
            let top = g.margin_top + index as f32 * g.line_height;
            self.line_commands(line, left, top, &mut commands);
        }

        let number = PageGeometry::physical_page_number(page.page_number);
        if self.options.page_numbers {
            let run = TextRun {
                size_pt: self.styles.main.size_px / PX_PER_PT * PAGE_NUMBER_SCALE,
                ..TextRun::for_style(&self.styles.main, PAGE_NUMBER_COLOR)
            };
            let y = mm(g.page_height - g.margin_bottom) + PAGE_NUMBER_DROP_MM;
            let (x, align) = match side {
                PageSide::Verso => (mm(left), TextAlign::Left),
                PageSide::Recto => (mm(g.page_width - right), TextAlign::Right),
            };
            commands.push(run.at(x, y, number.to_string(), align, TextBaseline::Alphabetic));
        }

        PrintPage {
            number,
            side,
            commands,
        }
    }

    fn line_commands(&self, line: &Line, left: f32, top: f32, out: &mut Vec<PrintCommand>) {
        let top_mm = mm(top);
        let mut x = left;
        for positioned in &line.tokens {
            match &positioned.token {
                Token::Word(word) => self.word_commands(word, x, top_mm, out),
                Token::Punctuation(punct) => {
                    let run = TextRun::for_style(&self.styles.main, Rgb::BLACK);
                    out.push(run.at(
                        mm(x),
                        top_mm,
                        punct.value.as_str(),
                        TextAlign::Left,
                        TextBaseline::Top,
                    ));
                }
                Token::VerseMarker(marker) => {
                    let run = TextRun::for_style(&self.styles.verse_number, self.verse_color);
                    let (dx, dy) = self.verse_offset_mm;
                    out.push(run.at(
                        mm(x) + dx,
                        top_mm + dy,
                        marker.value.as_str(),
                        TextAlign::Left,
                        TextBaseline::Top,
                    ));
                }
                Token::ChapterMarker(marker) => {
                    let run = TextRun::for_style(&self.styles.chapter_number, CHAPTER_COLOR);
                    out.push(run.at(
                        mm(x),
                        top_mm - CHAPTER_RAISE_MM,
                        marker.value.to_string(),
                        TextAlign::Left,
                        TextBaseline::Top,
                    ));
                }
            }
            x += positioned.advance();
        }
    }

    /// Source text over a lowercased gloss, both centered on the part.
    fn word_commands(
        &self,
        word: &WordToken,
        left: f32,
        top_mm: f32,
        out: &mut Vec<PrintCommand>,
    ) {
        let main = TextRun::for_style(&self.styles.main, Rgb::BLACK);
        let gloss = TextRun::for_style(&self.styles.gloss, GLOSS_COLOR);
        let gloss_y = top_mm + main.size_pt * PT_TO_MM * GLOSS_DROP;
        let last = word.parts.len().saturating_sub(1);
        let mut x = left;
        for (i, part) in word.parts.iter().enumerate() {
            let text = if word.continuation && i == last {
                format!("{}{}", part.text, self.joiner)
            } else {
                part.text.clone()
            };
            let gloss_text = part.gloss.to_lowercase();
            let width = part.width.unwrap_or_else(|| {
                main.width_mm(&text).max(gloss.width_mm(&gloss_text)) / MM_PER_PX
            });
            let center = mm(x + width / 2.0);
            out.push(main.at(center, top_mm, text, TextAlign::Center, TextBaseline::Top));
            out.push(gloss.at(center, gloss_y, gloss_text, TextAlign::Center, TextBaseline::Top));
            x += width + self.inter_morpheme_gap;
        }
    }
}

fn rule(center: f32, y: f32, half_width: f32, width: f32) -> PrintCommand {
    PrintCommand::Rule {
        x1: center - half_width,
        y1: y,
        x2: center + half_width,
        y2: y,
        width,
        color: RULE_COLOR,
    }
}

/// Greedy word wrap. A word wider than `max_width` keeps a line of its own.
fn wrap_words<F>(text: &str, width_of: F, max_width: f32) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current.push_str(word);
            continue;
        }
        let candidate = format!("{current} {word}");
        if width_of(&candidate) <= max_width {
            current = candidate;
        } else {
            lines.push(core::mem::replace(&mut current, word.to_string()));
        }
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

/// Lay out `chapters` with `engine` and compose the print job.
///
/// Use an engine built by [`print_layout_engine`](crate::print_layout_engine)
/// so line breaks are measured with the print metrics.
pub fn compose_book(
    engine: &LayoutEngine,
    chapters: &[Chapter],
    meta: &BookMeta,
    settings: &PrintSettings,
    options: PrintComposeOptions,
) -> Result<PrintJob, PrintError> {
    let pages = engine.layout_book(chapters, settings)?;
    let composer = PrintComposer::new(engine, settings, options)?;
    Ok(composer.compose(meta, &pages))
}
