//! Page-stream transforms.
//!
//! Each transform takes decoded [`PageDocument`](crate::PageDocument) values
//! (or, for compress and embed, the raw inputs) and produces a new document.
//! Inputs are never modified.

mod compress;
mod embed;
mod extract;
mod merge;
mod options;
mod split;

pub use compress::compress;
pub use embed::embed_images;
pub use extract::{extract_text, PAGE_SEPARATOR};
pub use merge::{merge, MIN_MERGE_INPUTS};
pub use options::{
    CompressOptions, ErrorMode, TextOptions, MAX_QUALITY, MAX_SCALE, MIN_QUALITY, MIN_SCALE,
};
pub use split::split;
