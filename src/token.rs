//! Annotated token stream produced by the text-annotation collaborator.
//!
//! Tokens arrive as JSON with a string `type` tag. The tag only exists at the
//! serde boundary; inside the workspace tokens are matched as [`Token`].

use serde::{Deserialize, Serialize};

use crate::error::TokenError;

/// One morpheme of a word: source text plus its gloss.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordPart {
    /// Source-language text of this morpheme.
    pub text: String,
    /// Literal gloss rendered under the source text.
    pub gloss: String,
    /// Measured width in layout px, `None` until measured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f32>,
}

impl WordPart {
    /// Create an unmeasured part.
    pub fn new(text: impl Into<String>, gloss: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            gloss: gloss.into(),
            width: None,
        }
    }
}

/// Word made of one or more morphemes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WordToken {
    /// Full source word, kept on every split piece for editing continuity.
    #[serde(rename = "original_full")]
    pub original: String,
    /// Ordered, non-empty morpheme list.
    pub parts: Vec<WordPart>,
    /// Set on split pieces that are followed by another piece of the same word.
    ///
    /// Renderers draw a trailing joiner glyph for these; the glyph is never
    /// part of `text`.
    #[serde(default, skip_serializing_if = "is_false")]
    pub continuation: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl WordToken {
    /// Single-morpheme word whose only part spans the whole word.
    pub fn simple(text: impl Into<String>, gloss: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            original: text.clone(),
            parts: vec![WordPart::new(text, gloss)],
            continuation: false,
        }
    }

    /// Compound word from `(text, gloss)` pairs; `original` is their concatenation.
    pub fn compound<I, T, G>(parts: I) -> Self
    where
        I: IntoIterator<Item = (T, G)>,
        T: Into<String>,
        G: Into<String>,
    {
        let parts: Vec<WordPart> = parts
            .into_iter()
            .map(|(text, gloss)| WordPart::new(text, gloss))
            .collect();
        let original = parts.iter().map(|p| p.text.as_str()).collect();
        Self {
            original,
            parts,
            continuation: false,
        }
    }

    /// Concatenated source text of all parts.
    pub fn joined_text(&self) -> String {
        self.parts.iter().map(|p| p.text.as_str()).collect()
    }

    /// Whether the parts spell out `original` exactly.
    pub fn reconstructs_original(&self) -> bool {
        let mut rest = self.original.as_str();
        for part in &self.parts {
            match rest.strip_prefix(part.text.as_str()) {
                Some(tail) => rest = tail,
                None => return false,
            }
        }
        rest.is_empty()
    }

    /// Sum of measured part widths, ignoring inter-morpheme gaps.
    ///
    /// Unmeasured parts count as zero.
    pub fn parts_width(&self) -> f32 {
        self.parts.iter().map(|p| p.width.unwrap_or(0.0)).sum()
    }
}

/// Floating verse number.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseMarker {
    pub value: String,
}

/// Inline chapter numeral; always starts a fresh line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterMarker {
    pub value: u32,
}

/// Standalone punctuation glyph(s).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Punctuation {
    pub value: String,
}

/// Layout token.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Token {
    #[serde(rename = "verse_num")]
    VerseMarker(VerseMarker),
    #[serde(rename = "chapter_num")]
    ChapterMarker(ChapterMarker),
    #[serde(rename = "punctuation")]
    Punctuation(Punctuation),
    #[serde(rename = "word")]
    Word(WordToken),
}

impl Token {
    /// Verse marker token.
    pub fn verse(value: impl Into<String>) -> Self {
        Self::VerseMarker(VerseMarker {
            value: value.into(),
        })
    }

    /// Chapter marker token.
    pub fn chapter(value: u32) -> Self {
        Self::ChapterMarker(ChapterMarker { value })
    }

    /// Punctuation token.
    pub fn punctuation(value: impl Into<String>) -> Self {
        Self::Punctuation(Punctuation {
            value: value.into(),
        })
    }

    /// Single-part word token.
    pub fn word(text: impl Into<String>, gloss: impl Into<String>) -> Self {
        Self::Word(WordToken::simple(text, gloss))
    }

    /// Multi-part word token.
    pub fn compound<I, T, G>(parts: I) -> Self
    where
        I: IntoIterator<Item = (T, G)>,
        T: Into<String>,
        G: Into<String>,
    {
        Self::Word(WordToken::compound(parts))
    }

    pub fn is_verse_marker(&self) -> bool {
        matches!(self, Self::VerseMarker(_))
    }

    pub fn is_punctuation(&self) -> bool {
        matches!(self, Self::Punctuation(_))
    }

    pub fn is_chapter_marker(&self) -> bool {
        matches!(self, Self::ChapterMarker(_))
    }

    /// Words and chapter numerals take inter-word spacing before the next token.
    pub fn is_spaced(&self) -> bool {
        matches!(self, Self::Word(_) | Self::ChapterMarker(_))
    }

    /// Tokens that never receive justified space in front of them.
    pub fn attaches_to_previous(&self) -> bool {
        matches!(self, Self::Punctuation(_) | Self::VerseMarker(_))
    }

    /// Borrow the word payload, if any.
    pub fn as_word(&self) -> Option<&WordToken> {
        match self {
            Self::Word(word) => Some(word),
            _ => None,
        }
    }

    /// Check structural invariants the layout pass relies on.
    pub fn validate(&self) -> Result<(), TokenError> {
        match self {
            Self::Word(word) if word.parts.is_empty() => Err(TokenError::EmptyWord {
                original: word.original.clone(),
            }),
            _ => Ok(()),
        }
    }
}

/// One paragraph of tokens.
pub type Paragraph = Vec<Token>;

/// Chapter as delivered by the annotation collaborator.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub number: u32,
    #[serde(default)]
    pub paragraphs: Vec<Paragraph>,
}

impl Chapter {
    /// Parse a chapter payload.
    pub fn from_json_str(json: &str) -> Result<Self, TokenError> {
        serde_json::from_str(json).map_err(|err| TokenError::Decode(err.to_string()))
    }

    /// Number of tokens across all paragraphs.
    pub fn token_count(&self) -> usize {
        self.paragraphs.iter().map(Vec::len).sum()
    }
}

/// Flatten chapters into one continuous flow.
///
/// Every chapter contributes a synthesized [`ChapterMarker`] followed by its
/// paragraphs' tokens in order. Paragraph boundaries do not survive: the whole
/// book is laid out as a single run with forced breaks at chapter starts.
pub fn flatten_chapters(chapters: &[Chapter]) -> Vec<Token> {
    let total = chapters
        .iter()
        .map(|c| c.token_count() + 1)
        .sum::<usize>();
    let mut flow = Vec::with_capacity(total);
    for chapter in chapters {
        flow.push(Token::chapter(chapter.number));
        for paragraph in &chapter.paragraphs {
            flow.extend(paragraph.iter().cloned());
        }
    }
    flow
}

/// Validate every token of a flow, reporting the first offending index.
pub fn validate_flow(tokens: &[Token]) -> Result<(), (usize, TokenError)> {
    for (index, token) in tokens.iter().enumerate() {
        token.validate().map_err(|err| (index, err))?;
    }
    Ok(())
}
