//! Builds a multi-resolution icon from a single source image.

use ::image::imageops::{self, FilterType};
use ::image::{ImageError, ImageReader};
use log::{debug, info, warn};
use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::icondir::IconDir;
use crate::icontype::{is_valid_dimension, ResourceType, MAX_DIMENSION};
use crate::image::{Image, PixelFormat};

/// The sizes produced when none are given: large, medium and small shell
/// icons.
pub const DEFAULT_SIZES: [u32; 4] = [256, 48, 32, 16];

/// Settings for an icon build.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildConfig {
    /// Side lengths of the square images to produce, in output order.
    pub sizes: Vec<u32>,
    /// Resampling filter used for every resize.
    pub filter: FilterType,
}

impl Default for BuildConfig {
    fn default() -> BuildConfig {
        BuildConfig {
            sizes: DEFAULT_SIZES.to_vec(),
            filter: FilterType::Lanczos3,
        }
    }
}

impl BuildConfig {
    /// Creates a config producing the given sizes with the default filter.
    pub fn with_sizes(sizes: Vec<u32>) -> BuildConfig {
        BuildConfig {
            sizes,
            ..BuildConfig::default()
        }
    }

    /// Checks that the size list is non-empty and that every size fits in
    /// an ICO entry.
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.sizes.is_empty() {
            return Err(BuildError::InvalidSizes("no sizes requested".to_string()));
        }
        if let Some(&size) = self.sizes.iter().find(|&&size| !is_valid_dimension(size)) {
            return Err(BuildError::InvalidSizes(format!(
                "{} is outside 1..={}",
                size, MAX_DIMENSION
            )));
        }
        Ok(())
    }

    /// Returns the largest requested size.
    pub fn max_size(&self) -> u32 {
        self.sizes.iter().copied().max().unwrap_or(0)
    }
}

/// Errors that end an icon build.
#[derive(Debug, Error)]
pub enum BuildError {
    /// The source path does not exist.
    #[error("source file not found: {}", path.display())]
    NotFound {
        /// The missing source path.
        path: PathBuf,
    },

    /// The source exists but could not be decoded as a raster image.
    #[error("failed to open image {}: {source}", path.display())]
    Decode {
        /// The source path.
        path: PathBuf,
        /// The decoder's error.
        #[source]
        source: ImageError,
    },

    /// The encoded icon could not be written to the destination.
    #[error("failed to save ICO file {}: {source}", path.display())]
    Write {
        /// The destination path.
        path: PathBuf,
        /// The underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A resized image could not be encoded as an icon entry.
    #[error("failed to encode icon: {0}")]
    Encode(#[source] io::Error),

    /// The configured size list is empty or out of range.
    #[error("invalid icon sizes: {0}")]
    InvalidSizes(String),
}

/// The category of a `BuildError`, for callers that only need to branch.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildErrorKind {
    /// The source path does not exist.
    NotFound,
    /// The source exists but is not a decodable raster image.
    Decode,
    /// The destination could not be written.
    Write,
    /// A resized image could not be encoded.
    Encode,
    /// The configured size list is unusable.
    InvalidSizes,
}

impl BuildError {
    /// Returns the category of this error.
    pub fn kind(&self) -> BuildErrorKind {
        match self {
            BuildError::NotFound { .. } => BuildErrorKind::NotFound,
            BuildError::Decode { .. } => BuildErrorKind::Decode,
            BuildError::Write { .. } => BuildErrorKind::Write,
            BuildError::Encode(_) => BuildErrorKind::Encode,
            BuildError::InvalidSizes(_) => BuildErrorKind::InvalidSizes,
        }
    }
}

/// An icon that has been decoded, resized and encoded in memory, but not yet
/// written anywhere.
#[derive(Clone, Debug)]
pub struct RenderedIcon {
    /// The encoded icon directory, one entry per requested size.
    pub icon_dir: IconDir,
    /// The requested sizes, in entry order.
    pub sizes: Vec<u32>,
    /// Width of the decoded source image.
    pub source_width: u32,
    /// Height of the decoded source image.
    pub source_height: u32,
}

impl RenderedIcon {
    /// Returns true if the source was smaller than the largest requested
    /// size in either dimension, so that some entries were upsampled.
    pub fn is_undersized(&self) -> bool {
        let max_size = self.sizes.iter().copied().max().unwrap_or(0);
        self.source_width < max_size || self.source_height < max_size
    }

    /// Returns a warning describing an undersized source, if there is one.
    pub fn warning(&self) -> Option<String> {
        if !self.is_undersized() {
            return None;
        }
        let max_size = self.sizes.iter().copied().max().unwrap_or(0);
        Some(format!(
            "Source image ({}x{}) is smaller than {}x{}",
            self.source_width, self.source_height, max_size, max_size
        ))
    }

    /// Serializes the icon and writes it to `destination`, replacing any
    /// existing file.
    pub fn write_to(&self, destination: &Path) -> Result<BuildReport, BuildError> {
        let mut bytes = Vec::with_capacity(self.icon_dir.total_length() as usize);
        self.icon_dir.write(&mut bytes).map_err(BuildError::Encode)?;
        fs::write(destination, &bytes).map_err(|source| BuildError::Write {
            path: destination.to_path_buf(),
            source,
        })?;
        info!(
            "wrote {} ({} entries, {} bytes)",
            destination.display(),
            self.sizes.len(),
            bytes.len()
        );
        Ok(BuildReport {
            destination: destination.to_path_buf(),
            sizes: self.sizes.clone(),
            source_width: self.source_width,
            source_height: self.source_height,
            bytes_written: bytes.len() as u64,
        })
    }
}

/// Summary of a finished build.
#[derive(Clone, Debug, PartialEq)]
pub struct BuildReport {
    /// Where the icon was written.
    pub destination: PathBuf,
    /// The sizes produced, in entry order.
    pub sizes: Vec<u32>,
    /// Width of the decoded source image.
    pub source_width: u32,
    /// Height of the decoded source image.
    pub source_height: u32,
    /// Length of the written file, in bytes.
    pub bytes_written: u64,
}

impl BuildReport {
    /// Formats the produced sizes as `"256x256, 48x48, ..."`.
    pub fn size_summary(&self) -> String {
        self.sizes
            .iter()
            .map(|size| format!("{}x{}", size, size))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Converts source images into multi-resolution icons.
#[derive(Clone, Debug, Default)]
pub struct IconBuilder {
    config: BuildConfig,
}

impl IconBuilder {
    /// Creates a builder with the given settings.
    pub fn new(config: BuildConfig) -> IconBuilder {
        IconBuilder { config }
    }

    /// Returns the builder's settings.
    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Decodes `source`, converts it to RGBA, and encodes one square entry
    /// per configured size.  Nothing is written to disk.
    pub fn render(&self, source: &Path) -> Result<RenderedIcon, BuildError> {
        self.config.validate()?;
        let rgba = load_rgba(source)?;
        let (source_width, source_height) = rgba.dimensions();

        let max_size = self.config.max_size();
        if source_width < max_size || source_height < max_size {
            warn!(
                "source image {} ({}x{}) is smaller than {}x{}; upsampling",
                source.display(),
                source_width,
                source_height,
                max_size,
                max_size
            );
        }

        let mut icon_dir = IconDir::new(ResourceType::Icon);
        for &size in &self.config.sizes {
            let resized = imageops::resize(&rgba, size, size, self.config.filter);
            let image = Image::from_data(PixelFormat::RGBA, size, size, resized.into_raw())
                .map_err(BuildError::Encode)?;
            icon_dir.add_icon(&image).map_err(BuildError::Encode)?;
            if let Some(entry) = icon_dir.entries().last() {
                debug!(
                    "encoded {}x{} entry as {} ({} bytes)",
                    size,
                    size,
                    entry.encoding(),
                    entry.data().len()
                );
            }
        }

        Ok(RenderedIcon {
            icon_dir,
            sizes: self.config.sizes.clone(),
            source_width,
            source_height,
        })
    }

    /// Renders `source` and writes the icon to `destination`.  The
    /// destination is only touched once every entry has been encoded.
    pub fn build(&self, source: &Path, destination: &Path) -> Result<BuildReport, BuildError> {
        self.render(source)?.write_to(destination)
    }
}

/// Converts the image at `source` into an icon at `destination`.
pub fn create_ico(
    source: &Path,
    destination: &Path,
    config: &BuildConfig,
) -> Result<BuildReport, BuildError> {
    IconBuilder::new(config.clone()).build(source, destination)
}

/// Opens and decodes `path`, normalizing it to 8-bit RGBA.  The file handle
/// is dropped before returning on every path.
fn load_rgba(path: &Path) -> Result<::image::RgbaImage, BuildError> {
    if !path.exists() {
        return Err(BuildError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let decode_error = |source: ImageError| BuildError::Decode {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(|err| match err.kind() {
        io::ErrorKind::NotFound => BuildError::NotFound {
            path: path.to_path_buf(),
        },
        _ => decode_error(ImageError::IoError(err)),
    })?;
    let decoded = ImageReader::new(BufReader::new(file))
        .with_guessed_format()
        .map_err(|err| decode_error(ImageError::IoError(err)))?
        .decode()
        .map_err(decode_error)?;
    debug!(
        "decoded {} as {:?} ({}x{})",
        path.display(),
        decoded.color(),
        decoded.width(),
        decoded.height()
    );
    Ok(decoded.into_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = BuildConfig::default();
        assert_eq!(config.sizes, vec![256, 48, 32, 16]);
        assert_eq!(config.filter, FilterType::Lanczos3);
        assert_eq!(config.max_size(), 256);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_sizes() {
        let empty = BuildConfig::with_sizes(vec![]);
        assert_eq!(empty.validate().unwrap_err().kind(), BuildErrorKind::InvalidSizes);
        let zero = BuildConfig::with_sizes(vec![32, 0]);
        assert_eq!(zero.validate().unwrap_err().kind(), BuildErrorKind::InvalidSizes);
        let huge = BuildConfig::with_sizes(vec![512]);
        let error = huge.validate().unwrap_err();
        assert_eq!(error.to_string(), "invalid icon sizes: 512 is outside 1..=256");
    }

    #[test]
    fn size_summary_keeps_order() {
        let report = BuildReport {
            destination: PathBuf::from("app.ico"),
            sizes: vec![256, 48, 32, 16],
            source_width: 512,
            source_height: 512,
            bytes_written: 0,
        };
        assert_eq!(report.size_summary(), "256x256, 48x48, 32x32, 16x16");
    }

    #[test]
    fn undersized_warning() {
        let rendered = RenderedIcon {
            icon_dir: IconDir::new(ResourceType::Icon),
            sizes: vec![16, 256],
            source_width: 300,
            source_height: 10,
        };
        assert!(rendered.is_undersized());
        assert_eq!(
            rendered.warning().as_deref(),
            Some("Source image (300x10) is smaller than 256x256")
        );
    }

    #[test]
    fn missing_source_is_not_found() {
        let builder = IconBuilder::default();
        let error = builder.render(Path::new("no/such/file.png")).unwrap_err();
        assert_eq!(error.kind(), BuildErrorKind::NotFound);
        assert_eq!(error.to_string(), "source file not found: no/such/file.png");
    }
}
