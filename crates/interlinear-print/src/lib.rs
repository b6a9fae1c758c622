//! Print backend for `interlinear-layout` pages.
//!
//! Maps abstract font families onto the PDF base-14 faces, measures with
//! their AFM widths, and composes laid-out pages into a [`PrintJob`]: a title
//! page followed by content pages with mirrored margins and page numbers, in
//! millimeters, ready for a print-file encoder.

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

mod afm;
mod compose;
mod error;
mod job;
mod measure;

pub use afm::{Base14Family, Base14Font};
pub use compose::{
    compose_book, BookMeta, PrintComposeOptions, PrintComposer, MM_PER_PX, PT_TO_MM,
};
pub use error::PrintError;
pub use job::{PrintCommand, PrintJob, PrintPage, Rgb, TextAlign, TextBaseline, PRINT_JOB_MIME};
pub use measure::{print_layout_engine, PrintTextMeasurer};
