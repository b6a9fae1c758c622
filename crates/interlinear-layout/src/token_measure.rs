//! Width annotation for raw tokens.

use interlinear::{Token, TokenError, WordToken};

use crate::engine::{LayoutConfig, LayoutError};
use crate::measure::{TextMeasurer, TextStyle, TypesetStyles};

/// Token with its layout width resolved.
///
/// Word tokens also carry per-part widths in `parts[i].width`.
#[derive(Clone, Debug, PartialEq)]
pub struct MeasuredToken {
    pub token: Token,
    /// Layout width in px. Always 0 for verse markers.
    pub width: f32,
}

/// Computes token widths with one measurer and one set of role styles.
#[derive(Clone, Copy)]
pub struct TokenMeasurer<'a> {
    measurer: &'a dyn TextMeasurer,
    styles: &'a TypesetStyles,
    cfg: &'a LayoutConfig,
}

impl<'a> TokenMeasurer<'a> {
    pub fn new(
        measurer: &'a dyn TextMeasurer,
        styles: &'a TypesetStyles,
        cfg: &'a LayoutConfig,
    ) -> Self {
        Self {
            measurer,
            styles,
            cfg,
        }
    }

    /// Measure one token, consuming it.
    pub fn measure(&self, token: Token) -> Result<MeasuredToken, TokenError> {
        match token {
            Token::Word(word) => {
                let word = self.measure_word(word)?;
                let width = self.word_width(&word);
                Ok(MeasuredToken {
                    token: Token::Word(word),
                    width,
                })
            }
            atom => {
                let width = self.atom_width(&atom);
                Ok(MeasuredToken { token: atom, width })
            }
        }
    }

    /// Measure a batch of tokens in order.
    ///
    /// The error carries the index of the first malformed token.
    pub fn measure_all<I>(&self, tokens: I) -> Result<Vec<MeasuredToken>, LayoutError>
    where
        I: IntoIterator<Item = Token>,
    {
        tokens
            .into_iter()
            .enumerate()
            .map(|(index, token)| {
                self.measure(token)
                    .map_err(|source| LayoutError::MalformedToken { index, source })
            })
            .collect()
    }

    fn measure_word(&self, mut word: WordToken) -> Result<WordToken, TokenError> {
        if word.parts.is_empty() {
            return Err(TokenError::EmptyWord {
                original: word.original,
            });
        }
        let last = word.parts.len() - 1;
        let continuation = word.continuation;
        for (i, part) in word.parts.iter_mut().enumerate() {
            let text_px = if continuation && i == last {
                let mut with_joiner = String::with_capacity(part.text.len() + 1);
                with_joiner.push_str(&part.text);
                with_joiner.push(self.cfg.joiner);
                self.measure_ceil(&with_joiner, &self.styles.main)
            } else {
                self.measure_ceil(&part.text, &self.styles.main)
            };
            let gloss_px = self.measure_ceil(&part.gloss, &self.styles.gloss);
            part.width = Some(text_px.max(gloss_px) + self.cfg.part_padding);
        }
        Ok(word)
    }

    fn atom_width(&self, token: &Token) -> f32 {
        match token {
            Token::VerseMarker(_) => 0.0,
            Token::ChapterMarker(marker) => {
                let numeral = marker.value.to_string();
                self.measurer
                    .measure_text_px(&numeral, &self.styles.chapter_number)
                    + self.cfg.chapter_padding
            }
            Token::Punctuation(punct) => self
                .measurer
                .measure_text_px(&punct.value, &self.styles.main),
            // parts already carry widths after measure_word
            Token::Word(word) => self.word_width(word),
        }
    }

    fn measure_ceil(&self, text: &str, style: &TextStyle) -> f32 {
        self.measurer.measure_text_px(text, style).ceil()
    }

    fn word_width(&self, word: &WordToken) -> f32 {
        let gaps = word.parts.len().saturating_sub(1) as f32;
        word.parts_width() + gaps * self.cfg.inter_morpheme_gap
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use interlinear::PrintSettings;

    /// 10 px per char regardless of style.
    struct FixedMeasurer;

    impl TextMeasurer for FixedMeasurer {
        fn measure_text_px(&self, text: &str, _style: &TextStyle) -> f32 {
            text.chars().count() as f32 * 10.0
        }
    }

    fn with_measurer<R>(f: impl FnOnce(&TokenMeasurer<'_>) -> R) -> R {
        let styles = TypesetStyles::from_settings(&PrintSettings::default(), 1.5);
        let cfg = LayoutConfig::default();
        let tm = TokenMeasurer::new(&FixedMeasurer, &styles, &cfg);
        f(&tm)
    }

    #[test]
    fn verse_markers_are_zero_width() {
        let m = with_measurer(|tm| tm.measure(Token::verse("12")).expect("measure"));
        assert_eq!(m.width, 0.0);
    }

    #[test]
    fn word_part_takes_wider_of_text_and_gloss_plus_padding() {
        let m = with_measurer(|tm| tm.measure(Token::word("Gott", "GOD-NOM")).expect("measure"));
        assert_eq!(m.width, 71.0);
        let word = m.token.as_word().expect("word");
        assert_eq!(word.parts[0].width, Some(71.0));
    }

    #[test]
    fn compound_word_adds_inter_morpheme_gaps() {
        let m = with_measurer(|tm| {
            tm.measure(Token::compound([("Licht", "LIGHT"), ("er", "S")]))
                .expect("measure")
        });
        // 51 + 21 + 4
        assert_eq!(m.width, 76.0);
    }

    #[test]
    fn continuation_reserves_joiner_room() {
        let mut word = WordToken::simple("Finster", "DARK");
        word.continuation = true;
        let m = with_measurer(|tm| tm.measure(Token::Word(word)).expect("measure"));
        assert_eq!(m.width, 81.0);
        let word = m.token.as_word().expect("word");
        assert_eq!(word.parts[0].text, "Finster");
    }

    #[test]
    fn chapter_marker_adds_padding() {
        let m = with_measurer(|tm| tm.measure(Token::chapter(12)).expect("measure"));
        assert_eq!(m.width, 28.0);
    }

    #[test]
    fn empty_word_reports_index() {
        let bad = Token::Word(WordToken {
            original: "x".to_string(),
            parts: Vec::new(),
            continuation: false,
        });
        let err = with_measurer(|tm| {
            tm.measure_all(vec![Token::word("a", "A"), bad])
                .expect_err("must fail")
        });
        assert!(matches!(err, LayoutError::MalformedToken { index: 1, .. }));
    }
}
