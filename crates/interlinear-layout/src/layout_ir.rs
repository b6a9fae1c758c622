use interlinear::Token;
use serde::{Deserialize, Serialize};

/// Token placed on a line with its measured width and trailing space.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionedToken {
    pub token: Token,
    /// Measured width in layout px.
    pub width: f32,
    /// Space after the token in layout px.
    pub margin_right: f32,
}

impl PositionedToken {
    /// Horizontal advance: width plus trailing space.
    pub fn advance(&self) -> f32 {
        self.width + self.margin_right
    }
}

/// How a line's trailing spaces were computed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineAlignment {
    /// Equal gaps stretched to the target width.
    Justified,
    /// Natural width: fewer than two tokens or no expandable gap.
    Left,
    /// Last line of the flow: minimum spacing, flush left.
    Final,
}

/// One laid-out line.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub tokens: Vec<PositionedToken>,
    /// Occupied width in layout px. Equals the target width when justified.
    pub width: f32,
    pub alignment: LineAlignment,
}

impl Line {
    /// Sum of token widths without spacing.
    pub fn content_width(&self) -> f32 {
        self.tokens.iter().map(|t| t.width).sum()
    }

    /// Sum of token widths and trailing spaces.
    pub fn occupied_width(&self) -> f32 {
        self.tokens.iter().map(PositionedToken::advance).sum()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn ends_with_verse_marker(&self) -> bool {
        self.tokens
            .last()
            .is_some_and(|t| t.token.is_verse_marker())
    }
}

/// Binding side of a physical page.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSide {
    /// Right-hand page, odd physical number. Binding on the left.
    Recto,
    /// Left-hand page, even physical number. Binding on the right.
    Verso,
}

impl PageSide {
    /// Side for a 1-based physical page number.
    pub fn for_physical_page(physical_page: usize) -> Self {
        if physical_page % 2 == 1 {
            Self::Recto
        } else {
            Self::Verso
        }
    }
}

/// One page of content lines.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Page {
    /// 1-based content page number.
    pub page_number: usize,
    pub lines: Vec<Line>,
}

impl Page {
    pub fn new(page_number: usize) -> Self {
        Self {
            page_number,
            lines: Vec::new(),
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }
}

/// Stable fingerprint of everything that affects line and page breaks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayoutProfileId(pub [u8; 32]);

impl LayoutProfileId {
    /// Build a deterministic profile id from arbitrary payload bytes.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        fn fnv64(seed: u64, payload: &[u8]) -> u64 {
            let mut hash = seed;
            for b in payload {
                hash ^= *b as u64;
                hash = hash.wrapping_mul(0x100000001b3);
            }
            hash
        }
        let mut out = [0u8; 32];
        let seeds = [
            0xcbf29ce484222325,
            0x9e3779b97f4a7c15,
            0xd6e8feb86659fd93,
            0xa0761d6478bd642f,
        ];
        for (chunk, seed) in out.chunks_exact_mut(8).zip(seeds) {
            chunk.copy_from_slice(&fnv64(seed, bytes).to_le_bytes());
        }
        Self(out)
    }

    /// Lowercase hex rendering, 64 characters.
    pub fn to_hex(&self) -> String {
        use core::fmt::Write;
        let mut out = String::with_capacity(64);
        for b in self.0 {
            let _ = write!(out, "{:02x}", b);
        }
        out
    }
}
