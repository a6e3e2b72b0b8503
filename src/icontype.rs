use std::fmt;
use std::str::FromStr;

/// The largest width or height an ICO directory entry can describe.
pub const MAX_DIMENSION: u32 = 256;

/// The eight bytes every PNG file starts with.
const PNG_SIGNATURE: &[u8; 8] = b"\x89PNG\r\n\x1a\n";

/// The kind of resource stored in an ICO-family file.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ResourceType {
    /// A Windows icon (`.ico`).
    Icon,
    /// A Windows cursor (`.cur`).
    Cursor,
}

impl ResourceType {
    /// Get the resource type stored under the given header number, if any.
    pub fn from_number(number: u16) -> Option<ResourceType> {
        match number {
            1 => Some(ResourceType::Icon),
            2 => Some(ResourceType::Cursor),
            _ => None,
        }
    }

    /// Returns the number that identifies this resource type in the file
    /// header.
    ///
    /// # Examples
    /// ```
    /// use ico_builder::ResourceType;
    /// assert_eq!(ResourceType::Icon.number(), 1);
    /// assert_eq!(ResourceType::Cursor.number(), 2);
    /// ```
    pub fn number(self) -> u16 {
        match self {
            ResourceType::Icon => 1,
            ResourceType::Cursor => 2,
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ResourceType::Icon => out.write_str("icon"),
            ResourceType::Cursor => out.write_str("cursor"),
        }
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(input: &str) -> Result<ResourceType, String> {
        match input {
            "icon" => Ok(ResourceType::Icon),
            "cursor" => Ok(ResourceType::Cursor),
            _ => Err(format!("unknown resource type: {:?}", input)),
        }
    }
}

/// Method of encoding an image within an icon directory entry.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Encoding {
    /// Entry payload is a complete PNG file.
    Png,
    /// Entry payload is a headerless BMP (DIB) with a trailing AND mask.
    Bmp,
}

impl Encoding {
    /// Classifies an entry payload by looking for the PNG signature.
    pub fn detect(data: &[u8]) -> Encoding {
        if data.starts_with(PNG_SIGNATURE) {
            Encoding::Png
        } else {
            Encoding::Bmp
        }
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, out: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Encoding::Png => out.write_str("PNG"),
            Encoding::Bmp => out.write_str("BMP"),
        }
    }
}

/// Returns true if an entry can have the given width or height.
pub fn is_valid_dimension(pixels: u32) -> bool {
    pixels >= 1 && pixels <= MAX_DIMENSION
}

/// Converts a width or height into its one-byte directory form, where 256 is
/// stored as zero.  The caller must check `is_valid_dimension` first.
///
/// # Examples
/// ```
/// use ico_builder::encode_dimension;
/// assert_eq!(encode_dimension(48), 48);
/// assert_eq!(encode_dimension(256), 0);
/// ```
pub fn encode_dimension(pixels: u32) -> u8 {
    debug_assert!(is_valid_dimension(pixels));
    if pixels == MAX_DIMENSION {
        0
    } else {
        pixels as u8
    }
}

/// Inverse of `encode_dimension`.
pub fn decode_dimension(raw: u8) -> u32 {
    if raw == 0 {
        MAX_DIMENSION
    } else {
        u32::from(raw)
    }
}
