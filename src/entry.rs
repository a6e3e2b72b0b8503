use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Cursor, Error, ErrorKind, Read, Write};

use crate::icontype::{decode_dimension, encode_dimension, is_valid_dimension,
                      Encoding};
use crate::image::Image;

/// The length of an icon directory entry record, in bytes:
pub(crate) const ICON_DIR_ENTRY_LENGTH: u32 = 16;

/// One image in an ICO file: the directory record describing it, plus its
/// encoded payload (either a PNG file or headerless BMP data).
#[derive(Clone, Debug)]
pub struct IconDirEntry {
    width: u32,
    height: u32,
    color_count: u8,
    planes: u16,
    bits_per_pixel: u16,
    data: Vec<u8>,
}

/// The fields of a directory record that locate an entry's payload.
pub(crate) struct EntryRecord {
    pub(crate) entry: IconDirEntry,
    pub(crate) data_length: u32,
    pub(crate) data_offset: u32,
}

impl IconDirEntry {
    /// Encodes the image as both PNG and BMP, keeping whichever payload is
    /// smaller (BMP on a tie).  Returns an error if the image dimensions are
    /// not between 1 and 256.
    pub fn encode(image: &Image) -> io::Result<IconDirEntry> {
        let png = IconDirEntry::encode_with(image, Encoding::Png)?;
        let bmp = IconDirEntry::encode_with(image, Encoding::Bmp)?;
        if png.data.len() < bmp.data.len() {
            Ok(png)
        } else {
            Ok(bmp)
        }
    }

    /// Encodes the image using the given encoding.  The image is always
    /// stored as 32-bit RGBA.  Returns an error if the image dimensions are
    /// not between 1 and 256.
    pub fn encode_with(image: &Image,
                       encoding: Encoding)
                       -> io::Result<IconDirEntry> {
        let (width, height) = (image.width(), image.height());
        if !is_valid_dimension(width) || !is_valid_dimension(height) {
            let msg = format!("icon entries must be between 1x1 and \
                               256x256 (was {}x{})",
                              width,
                              height);
            return Err(Error::new(ErrorKind::InvalidInput, msg));
        }
        let mut data = Vec::new();
        match encoding {
            Encoding::Png => image.to_rgba().write_png(&mut data)?,
            Encoding::Bmp => image.write_bmp_icon(&mut data)?,
        }
        Ok(IconDirEntry {
            width,
            height,
            color_count: 0,
            planes: 1,
            bits_per_pixel: 32,
            data,
        })
    }

    /// Decodes the entry payload into an RGBA image (PNG payloads keep their
    /// stored pixel format).  Returns an error if the data is malformed, or if
    /// its dimensions disagree with the directory record.
    pub fn decode_image(&self) -> io::Result<Image> {
        let image = match self.encoding() {
            Encoding::Png => Image::read_png(Cursor::new(&self.data))?,
            Encoding::Bmp => Image::read_bmp_icon(&self.data)?,
        };
        if image.width() != self.width || image.height() != self.height {
            let msg = format!("decoded {} has wrong dimensions \
                               ({}x{} instead of {}x{})",
                              self.encoding(),
                              image.width(),
                              image.height(),
                              self.width,
                              self.height);
            return Err(Error::new(ErrorKind::InvalidData, msg));
        }
        Ok(image)
    }

    /// Returns the encoding of this entry's payload.
    pub fn encoding(&self) -> Encoding {
        Encoding::detect(&self.data)
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the bits-per-pixel recorded in the directory (for cursors,
    /// this field holds the hotspot's y coordinate instead).
    pub fn bits_per_pixel(&self) -> u16 {
        self.bits_per_pixel
    }

    /// Returns the encoded payload for this entry.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn data_length(&self) -> u32 {
        self.data.len() as u32
    }

    /// Reads a directory record.  The payload is left empty; the caller
    /// fills it in from the returned offset and length.
    pub(crate) fn read_record<R: Read>(mut reader: R) -> io::Result<EntryRecord> {
        let width = decode_dimension(reader.read_u8()?);
        let height = decode_dimension(reader.read_u8()?);
        let color_count = reader.read_u8()?;
        let _reserved = reader.read_u8()?;
        let planes = reader.read_u16::<LittleEndian>()?;
        let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
        let data_length = reader.read_u32::<LittleEndian>()?;
        let data_offset = reader.read_u32::<LittleEndian>()?;
        let entry = IconDirEntry {
            width,
            height,
            color_count,
            planes,
            bits_per_pixel,
            data: Vec::new(),
        };
        Ok(EntryRecord {
            entry,
            data_length,
            data_offset,
        })
    }

    pub(crate) fn set_data(&mut self, data: Vec<u8>) {
        self.data = data;
    }

    /// Writes the directory record for this entry, pointing at a payload
    /// stored at the given file offset.
    pub(crate) fn write_record<W: Write>(&self,
                                         mut writer: W,
                                         data_offset: u32)
                                         -> io::Result<()> {
        writer.write_u8(encode_dimension(self.width))?;
        writer.write_u8(encode_dimension(self.height))?;
        writer.write_u8(self.color_count)?;
        writer.write_u8(0)?;
        writer.write_u16::<LittleEndian>(self.planes)?;
        writer.write_u16::<LittleEndian>(self.bits_per_pixel)?;
        writer.write_u32::<LittleEndian>(self.data_length())?;
        writer.write_u32::<LittleEndian>(data_offset)?;
        Ok(())
    }
}
