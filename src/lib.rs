//! Input data model for interlinear (source/gloss) typesetting.
//!
//! This crate owns what the layout pass consumes: annotated tokens as the
//! annotation service delivers them, chapter flattening, and print settings
//! (trim size, margins, typography).
//!
//! Layout itself lives in `interlinear-layout`; drawing lives in the backend
//! crates.

#![cfg_attr(
    not(test),
    deny(
        clippy::disallowed_methods,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::panic_in_result_fn,
        clippy::todo,
        clippy::unimplemented
    )
)]

pub mod error;
pub mod settings;
pub mod token;

pub use error::{SettingsError, TokenError};
pub use settings::{
    FontDescriptor, Margins, PageDimensions, PrintSettings, TrimSize, Typography,
    VerseNumberOffset, CUSTOM_PAGE_SIZE, DEFAULT_PAGE_SIZE, MM_PER_INCH, PX_PER_INCH, PX_PER_PT,
    TRIM_SIZES,
};
pub use token::{
    flatten_chapters, validate_flow, Chapter, ChapterMarker, Paragraph, Punctuation, Token,
    VerseMarker, WordPart, WordToken,
};
