//! Greedy line breaking and equal-gap justification.

use interlinear::Token;
use smallvec::SmallVec;

use crate::engine::{LayoutDiagnostic, LayoutError};
use crate::layout_ir::{Line, LineAlignment, PositionedToken};
use crate::split::split_compound;
use crate::token_measure::{MeasuredToken, TokenMeasurer};

/// Expandable gap positions of one line.
pub type GapIndices = SmallVec<[usize; 16]>;

type Carried = SmallVec<[MeasuredToken; 2]>;

/// Streaming greedy line breaker.
///
/// Tokens are pushed in flow order; each completed line is justified to
/// `max_width` when it is emitted. [`finish`](Self::finish) emits the last line
/// flush left with minimum spacing.
pub struct LineBreaker<'a> {
    measurer: TokenMeasurer<'a>,
    max_width: f32,
    min_space: f32,
    word_space_band: Option<(f32, f32)>,
    current: Vec<MeasuredToken>,
    /// Token widths plus minimum spacing committed on the current line.
    current_width: f32,
    lines: Vec<Line>,
    diagnostics: Vec<LayoutDiagnostic>,
    pushed: usize,
}

impl<'a> LineBreaker<'a> {
    /// Create a breaker for lines of `max_width` px.
    ///
    /// `measurer` re-measures split compound pieces.
    pub fn new(measurer: TokenMeasurer<'a>, max_width: f32, min_space: f32) -> Self {
        Self {
            measurer,
            max_width,
            min_space,
            word_space_band: None,
            current: Vec::new(),
            current_width: 0.0,
            lines: Vec::new(),
            diagnostics: Vec::new(),
            pushed: 0,
        }
    }

    /// Report justified gaps outside `[min, max]` as diagnostics.
    pub fn with_word_space_band(mut self, min: f32, max: f32) -> Self {
        self.word_space_band = Some((min, max));
        self
    }

    /// Lines completed so far.
    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Hand accumulated diagnostics to `f` and forget them.
    pub fn drain_diagnostics<F>(&mut self, mut f: F)
    where
        F: FnMut(LayoutDiagnostic),
    {
        for diagnostic in self.diagnostics.drain(..) {
            f(diagnostic);
        }
    }

    /// Feed the next measured token.
    pub fn push(&mut self, token: MeasuredToken) -> Result<(), LayoutError> {
        let index = self.pushed;
        self.pushed += 1;
        // Stack of tokens still to place; split pieces go on top in reverse.
        let mut pending: SmallVec<[MeasuredToken; 4]> = SmallVec::new();
        pending.push(token);
        while let Some(next) = pending.pop() {
            self.place(next, index, &mut pending)?;
        }
        Ok(())
    }

    /// Emit the final line and return every line.
    ///
    /// A flow that ends in a verse marker keeps it at the end of the final
    /// line: there is no following token to carry it to.
    pub fn finish(mut self) -> Vec<Line> {
        if !self.current.is_empty() {
            let tokens = core::mem::take(&mut self.current);
            self.lines.push(apply_minimum_spacing(tokens, self.min_space));
        }
        self.lines
    }

    /// Like [`finish`](Self::finish), also returning undrained diagnostics.
    pub fn finish_with_diagnostics(mut self) -> (Vec<Line>, Vec<LayoutDiagnostic>) {
        let diagnostics = core::mem::take(&mut self.diagnostics);
        (self.finish(), diagnostics)
    }

    fn place(
        &mut self,
        token: MeasuredToken,
        index: usize,
        pending: &mut SmallVec<[MeasuredToken; 4]>,
    ) -> Result<(), LayoutError> {
        let forced_break = token.token.is_chapter_marker() && !self.current.is_empty();
        let spacing = self.spacing_before(&token.token);
        let fits = self.current_width + spacing + token.width <= self.max_width;

        // An empty line takes anything, so an over-wide word there overflows
        // instead of splitting.
        if !forced_break && (fits || self.current.is_empty()) {
            self.append(token, spacing);
            return Ok(());
        }

        let carried = self.take_trailing_verse_markers();
        self.emit_justified();
        self.restart(carried);
        if token.width > self.max_width && self.split_into(&token, index, pending)? {
            return Ok(());
        }
        let spacing = self.spacing_before(&token.token);
        self.append(token, spacing);
        Ok(())
    }

    /// Replace an over-wide compound word by its re-measured pieces.
    fn split_into(
        &mut self,
        token: &MeasuredToken,
        index: usize,
        pending: &mut SmallVec<[MeasuredToken; 4]>,
    ) -> Result<bool, LayoutError> {
        let Some(pieces) = token.token.as_word().and_then(split_compound) else {
            return Ok(false);
        };
        log::debug!(
            "Splitting {:?} ({:.1}px > {:.1}px) into {} pieces",
            token.token.as_word().map(|w| w.original.as_str()).unwrap_or(""),
            token.width,
            self.max_width,
            pieces.len()
        );
        let mut measured: SmallVec<[MeasuredToken; 4]> = SmallVec::with_capacity(pieces.len());
        let original = token
            .token
            .as_word()
            .map(|w| w.original.clone())
            .unwrap_or_default();
        for piece in pieces {
            let m = self
                .measurer
                .measure(Token::Word(piece))
                .map_err(|source| LayoutError::MalformedToken { index, source })?;
            measured.push(m);
        }
        self.diagnostics.push(LayoutDiagnostic::CompoundSplit {
            token_index: index,
            original,
            pieces: measured.len(),
        });
        while let Some(m) = measured.pop() {
            pending.push(m);
        }
        Ok(true)
    }

    fn spacing_before(&self, token: &Token) -> f32 {
        if token.attaches_to_previous() {
            return 0.0;
        }
        if self.current.iter().any(|t| t.token.is_spaced()) {
            self.min_space
        } else {
            0.0
        }
    }

    fn append(&mut self, token: MeasuredToken, spacing: f32) {
        if token.width > self.max_width {
            log::debug!(
                "Token overflows line: {:.1}px > {:.1}px",
                token.width,
                self.max_width
            );
            self.diagnostics.push(LayoutDiagnostic::TokenOverflow {
                line_index: self.lines.len(),
                width: token.width,
                max_width: self.max_width,
            });
        }
        self.current_width += spacing + token.width;
        self.current.push(token);
    }

    fn take_trailing_verse_markers(&mut self) -> Carried {
        let mut carried = Carried::new();
        while self
            .current
            .last()
            .is_some_and(|t| t.token.is_verse_marker())
        {
            if let Some(marker) = self.current.pop() {
                carried.insert(0, marker);
            }
        }
        carried
    }

    fn emit_justified(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let tokens = core::mem::take(&mut self.current);
        let line = justify_line_equal(tokens, self.max_width);
        if let (Some((min, max)), LineAlignment::Justified) = (self.word_space_band, line.alignment)
        {
            let gap = line
                .tokens
                .iter()
                .map(|t| t.margin_right)
                .find(|m| *m != 0.0)
                .unwrap_or(0.0);
            if gap < min || gap > max {
                log::debug!(
                    "Line {} gap {:.2}px outside word-space band [{:.1}, {:.1}]",
                    self.lines.len(),
                    gap,
                    min,
                    max
                );
                self.diagnostics.push(LayoutDiagnostic::GapOutsideBand {
                    line_index: self.lines.len(),
                    gap,
                    min,
                    max,
                });
            }
        }
        self.lines.push(line);
    }

    fn restart(&mut self, carried: Carried) {
        self.current.clear();
        self.current.extend(carried);
        // Verse markers are zero width and never spaced.
        self.current_width = self.current.iter().map(|t| t.width).sum();
    }
}

/// Indices that receive justified space: every token but the last, skipping
/// verse markers and tokens followed by punctuation or a verse marker.
pub fn expandable_gaps(tokens: &[MeasuredToken]) -> GapIndices {
    let mut gaps = GapIndices::new();
    for (index, pair) in tokens.windows(2).enumerate() {
        let (t, next) = (&pair[0], &pair[1]);
        if t.token.is_verse_marker() || next.token.attaches_to_previous() {
            continue;
        }
        gaps.push(index);
    }
    gaps
}

/// Justify a line so its gaps are exactly equal and the line spans
/// `target_width`.
///
/// Lines with fewer than two tokens or without an expandable gap keep their
/// natural width. Gaps are not clamped: a sparse line gets wide gaps and an
/// overfull line gets negative ones.
pub fn justify_line_equal(tokens: Vec<MeasuredToken>, target_width: f32) -> Line {
    let content_width: f32 = tokens.iter().map(|t| t.width).sum();
    let gaps = if tokens.len() < 2 {
        GapIndices::new()
    } else {
        expandable_gaps(&tokens)
    };
    if gaps.is_empty() {
        return Line {
            tokens: tokens.into_iter().map(|t| positioned(t, 0.0)).collect(),
            width: content_width,
            alignment: LineAlignment::Left,
        };
    }
    let space_per_gap = (target_width - content_width) / gaps.len() as f32;
    let mut next_gap = gaps.iter().copied().peekable();
    let tokens = tokens
        .into_iter()
        .enumerate()
        .map(|(index, t)| {
            if next_gap.peek() == Some(&index) {
                next_gap.next();
                positioned(t, space_per_gap)
            } else {
                positioned(t, 0.0)
            }
        })
        .collect();
    Line {
        tokens,
        width: target_width,
        alignment: LineAlignment::Justified,
    }
}

/// Flush-left final line: `min_space` after each token except verse markers,
/// the last token, and tokens followed by punctuation or a verse marker.
pub fn apply_minimum_spacing(tokens: Vec<MeasuredToken>, min_space: f32) -> Line {
    let gaps = expandable_gaps(&tokens);
    let mut width = 0.0f32;
    let tokens = tokens
        .into_iter()
        .enumerate()
        .map(|(index, t)| {
            let margin = if gaps.contains(&index) { min_space } else { 0.0 };
            width += t.width + margin;
            positioned(t, margin)
        })
        .collect();
    Line {
        tokens,
        width,
        alignment: LineAlignment::Final,
    }
}

fn positioned(t: MeasuredToken, margin_right: f32) -> PositionedToken {
    PositionedToken {
        token: t.token,
        width: t.width,
        margin_right,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(token: Token, width: f32) -> MeasuredToken {
        MeasuredToken { token, width }
    }

    #[test]
    fn gaps_skip_verse_markers_and_attached_punctuation() {
        let tokens = vec![
            m(Token::word("a", "A"), 10.0),
            m(Token::punctuation(","), 3.0),
            m(Token::word("b", "B"), 10.0),
            m(Token::verse("2"), 0.0),
            m(Token::word("c", "C"), 10.0),
            m(Token::word("d", "D"), 10.0),
        ];
        assert_eq!(expandable_gaps(&tokens).as_slice(), &[1, 4]);
    }

    #[test]
    fn justified_line_spans_target() {
        let tokens = vec![
            m(Token::word("a", "A"), 30.0),
            m(Token::word("b", "B"), 40.0),
            m(Token::punctuation(";"), 5.0),
            m(Token::word("c", "C"), 25.0),
        ];
        let line = justify_line_equal(tokens, 200.0);
        assert_eq!(line.alignment, LineAlignment::Justified);
        assert!((line.occupied_width() - 200.0).abs() < 1e-3);
        assert_eq!(line.tokens[0].margin_right, 50.0);
        assert_eq!(line.tokens[1].margin_right, 0.0);
        assert_eq!(line.tokens[2].margin_right, 50.0);
        assert_eq!(line.tokens[3].margin_right, 0.0);
    }

    #[test]
    fn single_token_line_keeps_natural_width() {
        let line = justify_line_equal(vec![m(Token::word("a", "A"), 30.0)], 200.0);
        assert_eq!(line.alignment, LineAlignment::Left);
        assert_eq!(line.width, 30.0);
        assert_eq!(line.tokens[0].margin_right, 0.0);
    }

    #[test]
    fn line_without_gaps_is_not_justified() {
        let line = justify_line_equal(
            vec![m(Token::verse("3"), 0.0), m(Token::word("a", "A"), 30.0)],
            200.0,
        );
        assert_eq!(line.alignment, LineAlignment::Left);
        assert_eq!(line.width, 30.0);
    }

    #[test]
    fn trailing_verse_marker_stays_on_final_line() {
        let line = apply_minimum_spacing(
            vec![m(Token::word("a", "A"), 10.0), m(Token::verse("5"), 0.0)],
            6.0,
        );
        assert!(line.ends_with_verse_marker());
        assert_eq!(line.width, 10.0);
    }

    #[test]
    fn final_line_uses_minimum_spacing() {
        let line = apply_minimum_spacing(
            vec![
                m(Token::word("a", "A"), 10.0),
                m(Token::punctuation("."), 3.0),
                m(Token::verse("4"), 0.0),
                m(Token::word("b", "B"), 10.0),
                m(Token::word("c", "C"), 10.0),
            ],
            6.0,
        );
        let margins: Vec<f32> = line.tokens.iter().map(|t| t.margin_right).collect();
        assert_eq!(margins, vec![0.0, 0.0, 0.0, 6.0, 0.0]);
        assert_eq!(line.width, 39.0);
        assert_eq!(line.alignment, LineAlignment::Final);
    }
}
