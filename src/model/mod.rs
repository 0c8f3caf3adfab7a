//! Document model types.
//!
//! This module defines the in-memory page model that every transform works
//! on. Codecs turn source bytes into a [`PageDocument`] and back; transforms
//! only ever reshape `PageDocument` values.

mod artifact;
mod document;
mod page;
mod range;
mod raster;
mod source;

pub use artifact::OutputArtifact;
pub use document::{Metadata, PageDocument};
pub(crate) use page::normalize_rotation;
pub use page::{Page, PageContent, VectorPage};
pub use range::{PageRange, MAX_PAGE_INDEX};
pub use raster::{ColorSpace, RasterEncoding, RasterImage};
pub use source::{mime_from_extension, SourceFile};
