//! Line breaking, justification and pagination for interlinear text.
//!
//! The pass is a pure function of tokens, settings, [`LayoutConfig`] and the
//! installed [`TextMeasurer`]. Rendering backends consume the resulting
//! [`Page`]s and never re-justify.

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

mod engine;
mod generation;
mod geometry;
mod layout_ir;
mod line_break;
mod measure;
mod paginate;
mod split;
mod token_measure;

pub use engine::{
    CancelToken, LayoutConfig, LayoutDiagnostic, LayoutEngine, LayoutError, NeverCancel,
};
pub use generation::{GenerationToken, LayoutGeneration};
pub use geometry::{PageGeometry, FRONT_MATTER_PAGES};
pub use layout_ir::{LayoutProfileId, Line, LineAlignment, Page, PageSide, PositionedToken};
pub use line_break::{
    apply_minimum_spacing, expandable_gaps, justify_line_equal, GapIndices, LineBreaker,
};
pub use measure::{
    CachedMeasurer, HeuristicMeasurer, TextMeasurer, TextRole, TextStyle, TypesetStyles,
};
pub use paginate::{paginate, Paginator};
pub use split::{is_splittable, split_compound, SplitPieces};
pub use token_measure::{MeasuredToken, TokenMeasurer};
