//! Morpheme-boundary splitting of over-wide compound words.

use interlinear::{WordPart, WordToken};
use smallvec::SmallVec;

/// Split pieces of one word; compounds rarely exceed four morphemes.
pub type SplitPieces = SmallVec<[WordToken; 4]>;

/// Only multi-part words have morpheme boundaries to split at.
pub fn is_splittable(word: &WordToken) -> bool {
    word.parts.len() >= 2
}

/// Decompose a compound word into one single-part word per morpheme.
///
/// Every piece keeps the full `original` text. All pieces but the last are
/// marked `continuation`. Widths are reset so the pieces get re-measured.
/// Returns `None` for words with fewer than two parts.
pub fn split_compound(word: &WordToken) -> Option<SplitPieces> {
    if !is_splittable(word) {
        return None;
    }
    let last = word.parts.len() - 1;
    let pieces = word
        .parts
        .iter()
        .enumerate()
        .map(|(i, part)| WordToken {
            original: word.original.clone(),
            parts: vec![WordPart::new(part.text.clone(), part.gloss.clone())],
            // An already-continued word keeps its joiner on the final piece.
            continuation: i < last || word.continuation,
        })
        .collect();
    Some(pieces)
}
