use crate::icontype::is_valid_dimension;
use crate::image::{Image, PixelFormat};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use std::io::{self, Cursor, Error, ErrorKind, Read, Write};

/// The length of a BITMAPINFOHEADER, in bytes:
const BMP_INFO_HEADER_LENGTH: u32 = 40;

/// BI_RGB, i.e. no compression:
const BMP_COMPRESSION_NONE: u32 = 0;

impl Image {
    /// Reads an image from the headerless BMP data stored inside an ICO
    /// entry.  Supports uncompressed 32-bit and 24-bit color; the AND mask
    /// supplies transparency for 24-bit data, and for 32-bit data whose
    /// alpha channel is entirely zero.
    pub fn read_bmp_icon(input: &[u8]) -> io::Result<Image> {
        let mut reader = Cursor::new(input);
        let header_length = reader.read_u32::<LittleEndian>()?;
        if header_length < BMP_INFO_HEADER_LENGTH {
            let msg = format!("unsupported BMP header length: {}",
                              header_length);
            return Err(Error::new(ErrorKind::InvalidData, msg));
        }
        let width = reader.read_i32::<LittleEndian>()?;
        let double_height = reader.read_i32::<LittleEndian>()?;
        let _planes = reader.read_u16::<LittleEndian>()?;
        let bits_per_pixel = reader.read_u16::<LittleEndian>()?;
        let compression = reader.read_u32::<LittleEndian>()?;
        let _image_size = reader.read_u32::<LittleEndian>()?;
        let _x_pixels_per_meter = reader.read_i32::<LittleEndian>()?;
        let _y_pixels_per_meter = reader.read_i32::<LittleEndian>()?;
        let colors_used = reader.read_u32::<LittleEndian>()?;
        if width <= 0 || double_height <= 0 || double_height % 2 != 0 {
            let msg = format!("invalid BMP dimensions ({}x{})",
                              width,
                              double_height);
            return Err(Error::new(ErrorKind::InvalidData, msg));
        }
        if compression != BMP_COMPRESSION_NONE {
            return Err(Error::new(ErrorKind::InvalidData,
                                  "compressed BMP icon data not supported"));
        }
        let bytes_per_pixel = match bits_per_pixel {
            32 => 4,
            24 => 3,
            _ => {
                let msg = format!("unsupported BMP bit depth: {}",
                                  bits_per_pixel);
                return Err(Error::new(ErrorKind::InvalidData, msg));
            }
        };
        let width = width as u32;
        let height = (double_height / 2) as u32;
        if !is_valid_dimension(width) || !is_valid_dimension(height) {
            let msg = format!("BMP icon dimensions out of range ({}x{})",
                              width,
                              height);
            return Err(Error::new(ErrorKind::InvalidData, msg));
        }

        // Skip the rest of the header and any (unused) color table.
        let skip = u64::from(header_length - BMP_INFO_HEADER_LENGTH) +
                   4 * u64::from(colors_used);
        reader.set_position(reader.position() + skip);

        let color_row_length = row_length(width, u32::from(bits_per_pixel));
        let mut image = Image::new(PixelFormat::RGBA, width, height);
        let mut row = vec![0u8; color_row_length];
        let mut has_alpha = false;
        for y in (0..height).rev() {
            reader.read_exact(&mut row).map_err(truncated_error)?;
            let start = (y * width * 4) as usize;
            let out = &mut image.data_mut()[start..(start + 4 * width as usize)];
            for x in 0..(width as usize) {
                let px = &row[(bytes_per_pixel * x)..];
                out[4 * x] = px[2];
                out[4 * x + 1] = px[1];
                out[4 * x + 2] = px[0];
                out[4 * x + 3] = if bytes_per_pixel == 4 {
                    has_alpha |= px[3] != 0;
                    px[3]
                } else {
                    u8::MAX
                };
            }
        }

        if !has_alpha {
            let mask_row_length = row_length(width, 1);
            let mut mask_row = vec![0u8; mask_row_length];
            for y in (0..height).rev() {
                reader.read_exact(&mut mask_row).map_err(truncated_error)?;
                for x in 0..width {
                    let transparent =
                        mask_row[(x / 8) as usize] & (0x80 >> (x % 8)) != 0;
                    let index = (4 * (y * width + x) + 3) as usize;
                    image.data_mut()[index] =
                        if transparent { 0 } else { u8::MAX };
                }
            }
        }
        Ok(image)
    }

    /// Writes the image as the headerless 32-bit BMP data used inside an ICO
    /// entry: a BITMAPINFOHEADER with doubled height, bottom-up BGRA rows,
    /// then a 1-bit AND mask marking fully transparent pixels.
    pub fn write_bmp_icon<W: Write>(&self, mut output: W) -> io::Result<()> {
        let rgba = self.to_rgba();
        let (width, height) = (self.width(), self.height());
        let mask_row_length = row_length(width, 1);
        let image_size = 4 * width * height + (mask_row_length as u32) * height;

        output.write_u32::<LittleEndian>(BMP_INFO_HEADER_LENGTH)?;
        output.write_i32::<LittleEndian>(width as i32)?;
        output.write_i32::<LittleEndian>(2 * height as i32)?;
        output.write_u16::<LittleEndian>(1)?;
        output.write_u16::<LittleEndian>(32)?;
        output.write_u32::<LittleEndian>(BMP_COMPRESSION_NONE)?;
        output.write_u32::<LittleEndian>(image_size)?;
        output.write_i32::<LittleEndian>(0)?;
        output.write_i32::<LittleEndian>(0)?;
        output.write_u32::<LittleEndian>(0)?;
        output.write_u32::<LittleEndian>(0)?;

        let row_bytes = 4 * width as usize;
        for row in rgba.data().chunks(row_bytes).rev() {
            for px in row.chunks(4) {
                output.write_all(&[px[2], px[1], px[0], px[3]])?;
            }
        }

        let mut mask_row = vec![0u8; mask_row_length];
        for row in rgba.data().chunks(row_bytes).rev() {
            for byte in mask_row.iter_mut() {
                *byte = 0;
            }
            for (x, px) in row.chunks(4).enumerate() {
                if px[3] == 0 {
                    mask_row[x / 8] |= 0x80 >> (x % 8);
                }
            }
            output.write_all(&mask_row)?;
        }
        Ok(())
    }
}

/// Returns the length of one BMP row, padded to a four-byte boundary.
fn row_length(width: u32, bits_per_pixel: u32) -> usize {
    (((width * bits_per_pixel + 31) / 32) * 4) as usize
}

fn truncated_error(_: Error) -> Error {
    Error::new(ErrorKind::UnexpectedEof, "truncated BMP icon data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_single_pixel() {
        let image = Image::from_data(PixelFormat::RGBA, 1, 1, vec![1, 2, 3, 0])
            .unwrap();
        let mut output = Vec::new();
        image.write_bmp_icon(&mut output).expect("write failed");
        assert_eq!(output.len(), 40 + 4 + 4);
        assert_eq!(&output[0..12],
                   b"\x28\0\0\0\x01\0\0\0\x02\0\0\0" as &[u8]);
        assert_eq!(&output[40..44], &[3, 2, 1, 0]);
        assert_eq!(&output[44..48], &[0x80, 0, 0, 0]);
    }

    #[test]
    fn rows_are_bottom_up() {
        let image = Image::from_data(PixelFormat::RGB,
                                     1,
                                     2,
                                     vec![255, 0, 0, 0, 0, 255])
            .unwrap();
        let mut output = Vec::new();
        image.write_bmp_icon(&mut output).expect("write failed");
        // The bottom (blue) row comes first, in BGRA order.
        assert_eq!(&output[40..44], &[255, 0, 0, 255]);
        assert_eq!(&output[44..48], &[0, 0, 255, 255]);
    }

    #[test]
    fn read_back_written_image() {
        let mut image = Image::new(PixelFormat::RGBA, 5, 3);
        for (index, byte) in image.data_mut().iter_mut().enumerate() {
            *byte = (index * 7 % 256) as u8;
        }
        let mut output = Vec::new();
        image.write_bmp_icon(&mut output).expect("write failed");
        let decoded = Image::read_bmp_icon(&output).expect("read failed");
        assert_eq!((decoded.width(), decoded.height()), (5, 3));
        assert_eq!(decoded.data(), image.data());
    }

    #[test]
    fn read_24_bit_with_mask() {
        let mut data = Vec::new();
        data.write_u32::<LittleEndian>(40).unwrap();
        data.write_i32::<LittleEndian>(2).unwrap();
        data.write_i32::<LittleEndian>(2).unwrap();
        data.write_u16::<LittleEndian>(1).unwrap();
        data.write_u16::<LittleEndian>(24).unwrap();
        data.extend_from_slice(&[0u8; 24]);
        // One row of two BGR pixels, padded to eight bytes.
        data.extend_from_slice(&[10, 20, 30, 40, 50, 60, 0, 0]);
        // The second pixel is masked out.
        data.extend_from_slice(&[0x40, 0, 0, 0]);
        let image = Image::read_bmp_icon(&data).expect("read failed");
        assert_eq!(image.data(), &[30, 20, 10, 255, 60, 50, 40, 0]);
    }

    #[test]
    fn reject_huge_dimensions() {
        let mut data = Vec::new();
        data.write_u32::<LittleEndian>(40).unwrap();
        data.write_i32::<LittleEndian>(0x4000_0000).unwrap();
        data.write_i32::<LittleEndian>(2).unwrap();
        data.write_u16::<LittleEndian>(1).unwrap();
        data.write_u16::<LittleEndian>(32).unwrap();
        data.extend_from_slice(&[0u8; 24]);
        data.extend_from_slice(&[0u8; 8]);
        let error = Image::read_bmp_icon(&data).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidData);

        // Too tall, with a width that would otherwise be fine.
        let mut data = Vec::new();
        data.write_u32::<LittleEndian>(40).unwrap();
        data.write_i32::<LittleEndian>(1).unwrap();
        data.write_i32::<LittleEndian>(2 * 300).unwrap();
        data.write_u16::<LittleEndian>(1).unwrap();
        data.write_u16::<LittleEndian>(32).unwrap();
        data.extend_from_slice(&[0u8; 24]);
        let error = Image::read_bmp_icon(&data).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::InvalidData);
    }

    #[test]
    fn reject_truncated_data() {
        let image = Image::new(PixelFormat::RGBA, 4, 4);
        let mut output = Vec::new();
        image.write_bmp_icon(&mut output).expect("write failed");
        output.truncate(60);
        let error = Image::read_bmp_icon(&output).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::UnexpectedEof);
    }
}
