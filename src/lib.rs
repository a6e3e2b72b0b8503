//! Library for building and reading Windows icon (.ico) files
//!
//! See https://en.wikipedia.org/wiki/ICO_(file_format) for more information
//! about the file format.
//!
//! The [`builder`] module turns a single source image into a multi-resolution
//! icon:
//!
//! ```no_run
//! use ico_builder::{create_ico, BuildConfig};
//! use std::path::Path;
//!
//! let report = create_ico(Path::new("app.png"),
//!                         Path::new("app.ico"),
//!                         &BuildConfig::default())?;
//! println!("sizes: {}", report.size_summary());
//! # Ok::<(), ico_builder::BuildError>(())
//! ```
//!
//! The lower-level [`IconDir`] type reads and writes the container itself.

#![warn(missing_docs)]

mod bmpio;
pub mod builder;
mod entry;
mod icondir;
mod icontype;
mod image;
mod pngio;

pub use crate::builder::{create_ico, BuildConfig, BuildError, BuildErrorKind,
                         BuildReport, IconBuilder, RenderedIcon, DEFAULT_SIZES};
pub use crate::entry::IconDirEntry;
pub use crate::icondir::IconDir;
pub use crate::icontype::{decode_dimension, encode_dimension,
                          is_valid_dimension, Encoding, ResourceType,
                          MAX_DIMENSION};
pub use crate::image::{Image, PixelFormat};
