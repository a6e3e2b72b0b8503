use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Cursor, Error, ErrorKind, Read, Write};

use crate::entry::{IconDirEntry, ICON_DIR_ENTRY_LENGTH};
use crate::icontype::ResourceType;
use crate::image::Image;

/// The length of an icon directory header, in bytes:
const ICON_DIR_HEADER_LENGTH: u32 = 6;

/// A set of images stored in a single ICO (or CUR) file.
#[derive(Clone, Debug)]
pub struct IconDir {
    restype: ResourceType,
    entries: Vec<IconDirEntry>,
}

impl IconDir {
    /// Creates a new, empty icon directory.
    pub fn new(restype: ResourceType) -> IconDir {
        IconDir {
            restype,
            entries: Vec::new(),
        }
    }

    /// Returns the type of resource stored in this directory.
    pub fn resource_type(&self) -> ResourceType {
        self.restype
    }

    /// Returns the entries in the directory, in file order.
    pub fn entries(&self) -> &[IconDirEntry] {
        &self.entries
    }

    /// Returns true if the directory contains no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends an already-encoded entry to the directory.
    pub fn add_entry(&mut self, entry: IconDirEntry) {
        self.entries.push(entry);
    }

    /// Encodes the image into the directory, choosing the smaller of the PNG
    /// and BMP encodings.  Returns an error if the image is not between 1x1
    /// and 256x256.
    pub fn add_icon(&mut self, image: &Image) -> io::Result<()> {
        self.entries.push(IconDirEntry::encode(image)?);
        Ok(())
    }

    /// Returns the (width, height) of every entry, in file order.
    pub fn available_sizes(&self) -> Vec<(u32, u32)> {
        self.entries.iter().map(|entry| (entry.width(), entry.height())).collect()
    }

    /// Returns the first entry with the given dimensions.
    pub fn find_entry(&self, width: u32, height: u32) -> io::Result<&IconDirEntry> {
        self.entries
            .iter()
            .find(|entry| entry.width() == width && entry.height() == height)
            .ok_or_else(|| {
                let msg = format!("the icon directory does not contain a \
                                   {}x{} entry",
                                  width,
                                  height);
                Error::new(ErrorKind::NotFound, msg)
            })
    }

    /// Decodes the entry with the given dimensions.  Returns an error if no
    /// such entry exists, or if its payload is malformed.
    pub fn get_icon_with_size(&self, width: u32, height: u32) -> io::Result<Image> {
        self.find_entry(width, height)?.decode_image()
    }

    /// Reads an icon directory from an ICO or CUR file.
    pub fn read<R: Read>(mut reader: R) -> io::Result<IconDir> {
        let mut contents = Vec::new();
        reader.read_to_end(&mut contents)?;
        let mut cursor = Cursor::new(&contents[..]);
        let reserved = cursor.read_u16::<LittleEndian>()?;
        let restype_number = cursor.read_u16::<LittleEndian>()?;
        let restype = match ResourceType::from_number(restype_number) {
            Some(restype) if reserved == 0 => restype,
            _ => {
                let msg = "not an ico file (invalid header)";
                return Err(Error::new(ErrorKind::InvalidData, msg));
            }
        };
        let num_entries = cursor.read_u16::<LittleEndian>()?;
        let mut icon_dir = IconDir::new(restype);
        for _ in 0..num_entries {
            let record = IconDirEntry::read_record(cursor.by_ref())?;
            let start = record.data_offset as usize;
            let end = start.checked_add(record.data_length as usize);
            let data = match end {
                Some(end) if end <= contents.len() => &contents[start..end],
                _ => {
                    let msg = format!("entry payload at offset {} (length \
                                       {}) lies outside the file",
                                      record.data_offset,
                                      record.data_length);
                    return Err(Error::new(ErrorKind::InvalidData, msg));
                }
            };
            let mut entry = record.entry;
            entry.set_data(data.to_vec());
            icon_dir.entries.push(entry);
        }
        Ok(icon_dir)
    }

    /// Writes the icon directory to an ICO or CUR file.  Payloads follow the
    /// directory records, in entry order.
    pub fn write<W: Write>(&self, mut writer: W) -> io::Result<()> {
        if self.entries.len() > u16::MAX as usize {
            let msg = format!("too many entries for one file ({})",
                              self.entries.len());
            return Err(Error::new(ErrorKind::InvalidInput, msg));
        }
        writer.write_u16::<LittleEndian>(0)?;
        writer.write_u16::<LittleEndian>(self.restype.number())?;
        writer.write_u16::<LittleEndian>(self.entries.len() as u16)?;
        let mut data_offset = ICON_DIR_HEADER_LENGTH +
                              ICON_DIR_ENTRY_LENGTH * self.entries.len() as u32;
        for entry in &self.entries {
            entry.write_record(writer.by_ref(), data_offset)?;
            data_offset += entry.data_length();
        }
        for entry in &self.entries {
            writer.write_all(entry.data())?;
        }
        Ok(())
    }

    /// Returns the encoded length of the file, in bytes, including the
    /// header and directory records.
    pub fn total_length(&self) -> u32 {
        let mut length = ICON_DIR_HEADER_LENGTH;
        for entry in &self.entries {
            length += ICON_DIR_ENTRY_LENGTH + entry.data_length();
        }
        length
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icontype::Encoding;
    use crate::image::PixelFormat;

    #[test]
    fn write_empty_icon_dir() {
        let icon_dir = IconDir::new(ResourceType::Icon);
        assert!(icon_dir.is_empty());
        let mut output: Vec<u8> = vec![];
        icon_dir.write(&mut output).expect("write failed");
        assert_eq!(b"\0\0\x01\0\0\0", &output as &[u8]);
        assert_eq!(icon_dir.total_length(), 6);
    }

    #[test]
    fn read_empty_cursor_dir() {
        let icon_dir = IconDir::read(Cursor::new(b"\0\0\x02\0\0\0"))
            .expect("read failed");
        assert_eq!(icon_dir.resource_type(), ResourceType::Cursor);
        assert!(icon_dir.is_empty());
    }

    #[test]
    fn reject_bad_header() {
        let error = IconDir::read(Cursor::new(b"icns\0\0\0\x08")).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn reject_payload_past_end() {
        let input: &[u8] = b"\0\0\x01\0\x01\0\
                             \x10\x10\0\0\x01\0\x20\0\xff\0\0\0\x16\0\0\0";
        let error = IconDir::read(Cursor::new(input)).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn oversized_bmp_header_is_an_error() {
        let mut input: Vec<u8> = b"\0\0\x01\0\x01\0\
                                  \x01\x01\0\0\x01\0\x20\0\x30\0\0\0\x16\0\0\0"
            .to_vec();
        input.write_u32::<LittleEndian>(40).unwrap();
        input.write_i32::<LittleEndian>(0x4000_0000).unwrap();
        input.write_i32::<LittleEndian>(2).unwrap();
        input.write_u16::<LittleEndian>(1).unwrap();
        input.write_u16::<LittleEndian>(32).unwrap();
        input.extend_from_slice(&[0u8; 24]);
        input.extend_from_slice(&[0u8; 8]);
        assert_eq!(input.len(), 22 + 0x30);
        let icon_dir = IconDir::read(Cursor::new(&input)).expect("read failed");
        let error = icon_dir.get_icon_with_size(1, 1).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn write_then_read_entries() {
        let mut icon_dir = IconDir::new(ResourceType::Icon);
        for &size in &[48, 16] {
            let image = Image::new(PixelFormat::RGBA, size, size);
            icon_dir.add_entry(IconDirEntry::encode_with(&image, Encoding::Bmp)
                .unwrap());
        }
        let mut output = Vec::new();
        icon_dir.write(&mut output).expect("write failed");
        assert_eq!(output.len() as u32, icon_dir.total_length());
        // First payload starts right after the two directory records.
        assert_eq!(&output[18..22], b"\x26\0\0\0");

        let decoded = IconDir::read(Cursor::new(&output)).expect("read failed");
        assert_eq!(decoded.available_sizes(), vec![(48, 48), (16, 16)]);
        let image = decoded.get_icon_with_size(16, 16).expect("decode failed");
        assert_eq!((image.width(), image.height()), (16, 16));
        assert!(decoded.find_entry(32, 32).is_err());
    }
}
