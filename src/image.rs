use std::io::{self, Error, ErrorKind};

/// A decoded icon image.
#[derive(Clone, Debug)]
pub struct Image {
    pub(crate) format: PixelFormat,
    width: u32,
    height: u32,
    pub(crate) data: Box<[u8]>,
}

impl Image {
    /// Creates a new image with all pixel data set to zero.
    pub fn new(format: PixelFormat, width: u32, height: u32) -> Image {
        let data_bytes = format.data_len(width, height);
        Image {
            format,
            width,
            height,
            data: vec![0u8; data_bytes].into_boxed_slice(),
        }
    }

    /// Creates a new image using the given pixel data.  Returns an error if
    /// the data array is not the correct length for the given format and
    /// dimensions.
    pub fn from_data(format: PixelFormat,
                     width: u32,
                     height: u32,
                     data: Vec<u8>)
                     -> io::Result<Image> {
        let expected = format.data_len(width, height);
        if data.len() != expected {
            let msg = format!("incorrect pixel data array length for the \
                               given dimensions and format ({} instead of \
                               {})",
                              data.len(),
                              expected);
            return Err(Error::new(ErrorKind::InvalidInput, msg));
        }
        Ok(Image {
            format,
            width,
            height,
            data: data.into_boxed_slice(),
        })
    }

    /// Creates a copy of this image using the RGBA pixel format (that is,
    /// `foo.to_rgba().pixel_format()` will always return `PixelFormat::RGBA`).
    /// Formats without an alpha channel become fully opaque; existing alpha
    /// is kept as-is.
    pub fn to_rgba(&self) -> Image {
        self.convert_to(PixelFormat::RGBA)
    }

    /// Creates a copy of this image converted to the given pixel format.
    /// Converting to a format without color collapses RGB to luma; converting
    /// to a format without alpha drops it.
    pub fn convert_to(&self, format: PixelFormat) -> Image {
        if format == self.format {
            return self.clone();
        }
        let num_pixels = (self.width as usize) * (self.height as usize);
        let mut data = Vec::with_capacity(format.data_len(self.width,
                                                          self.height));
        for index in 0..num_pixels {
            let pixel = self.format.rgba_at(&self.data, index);
            format.push_rgba(&mut data, pixel);
        }
        Image {
            format,
            width: self.width,
            height: self.height,
            data: data.into_boxed_slice(),
        }
    }

    /// Returns true if every pixel of the image is fully opaque.  Formats
    /// without an alpha channel are always opaque.
    pub fn is_opaque(&self) -> bool {
        match self.format.alpha_offset() {
            None => true,
            Some(offset) => {
                let stride = self.format.bytes_per_pixel();
                self.data
                    .chunks(stride)
                    .all(|pixel| pixel[offset] == u8::MAX)
            }
        }
    }

    /// Returns the format in which this image's pixel data is stored.
    pub fn pixel_format(&self) -> PixelFormat {
        self.format
    }

    /// Returns the width of the image, in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the image, in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns a reference to the image's pixel data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns a mutable reference to the image's pixel data.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Consumes the image, returning the pixel data.
    pub fn into_data(self) -> Box<[u8]> {
        self.data
    }
}

/// A format for storing pixel data in an image.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PixelFormat {
    /// 32-bit color with alpha channel.
    RGBA,
    /// 24-bit color with no alpha.
    RGB,
    /// 16-bit grayscale-with-alpha.
    GrayAlpha,
    /// 8-bit grayscale with no alpha.
    Gray,
    /// 8-bit alpha mask with no color.
    Alpha,
}

impl PixelFormat {
    /// Returns the number of bits needed to store a single pixel in this
    /// format.
    pub fn bits_per_pixel(self) -> u32 {
        self.bytes_per_pixel() as u32 * 8
    }

    fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::RGBA => 4,
            PixelFormat::RGB => 3,
            PixelFormat::GrayAlpha => 2,
            PixelFormat::Gray => 1,
            PixelFormat::Alpha => 1,
        }
    }

    fn data_len(self, width: u32, height: u32) -> usize {
        self.bytes_per_pixel() * (width as usize) * (height as usize)
    }

    fn alpha_offset(self) -> Option<usize> {
        match self {
            PixelFormat::RGBA => Some(3),
            PixelFormat::GrayAlpha => Some(1),
            PixelFormat::Alpha => Some(0),
            PixelFormat::RGB | PixelFormat::Gray => None,
        }
    }

    /// Reads the pixel at `index` as RGBA.
    fn rgba_at(self, data: &[u8], index: usize) -> [u8; 4] {
        let start = index * self.bytes_per_pixel();
        let px = &data[start..(start + self.bytes_per_pixel())];
        match self {
            PixelFormat::RGBA => [px[0], px[1], px[2], px[3]],
            PixelFormat::RGB => [px[0], px[1], px[2], u8::MAX],
            PixelFormat::GrayAlpha => [px[0], px[0], px[0], px[1]],
            PixelFormat::Gray => [px[0], px[0], px[0], u8::MAX],
            PixelFormat::Alpha => [0, 0, 0, px[0]],
        }
    }

    fn push_rgba(self, data: &mut Vec<u8>, pixel: [u8; 4]) {
        match self {
            PixelFormat::RGBA => data.extend_from_slice(&pixel),
            PixelFormat::RGB => data.extend_from_slice(&pixel[0..3]),
            PixelFormat::GrayAlpha => {
                data.push(luma(pixel));
                data.push(pixel[3]);
            }
            PixelFormat::Gray => data.push(luma(pixel)),
            PixelFormat::Alpha => data.push(pixel[3]),
        }
    }
}

/// Rec. 601 luma, rounded.
fn luma(pixel: [u8; 4]) -> u8 {
    let sum = 299 * u32::from(pixel[0]) + 587 * u32::from(pixel[1]) +
              114 * u32::from(pixel[2]);
    ((sum + 500) / 1000) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_to_rgba_is_opaque() {
        let image = Image::from_data(PixelFormat::RGB,
                                     2,
                                     1,
                                     vec![10, 20, 30, 40, 50, 60])
            .unwrap();
        let rgba = image.to_rgba();
        assert_eq!(rgba.pixel_format(), PixelFormat::RGBA);
        assert_eq!(rgba.data(), &[10, 20, 30, 255, 40, 50, 60, 255]);
        assert!(rgba.is_opaque());
    }

    #[test]
    fn gray_alpha_to_rgba_keeps_alpha() {
        let image = Image::from_data(PixelFormat::GrayAlpha,
                                     2,
                                     1,
                                     vec![100, 0, 200, 128])
            .unwrap();
        let rgba = image.to_rgba();
        assert_eq!(rgba.data(), &[100, 100, 100, 0, 200, 200, 200, 128]);
        assert!(!rgba.is_opaque());
    }

    #[test]
    fn alpha_to_gray_alpha() {
        let image = Image::from_data(PixelFormat::Alpha, 1, 1, vec![77])
            .unwrap();
        let converted = image.convert_to(PixelFormat::GrayAlpha);
        assert_eq!(converted.data(), &[0, 77]);
    }

    #[test]
    fn rgba_to_gray() {
        let image = Image::from_data(PixelFormat::RGBA,
                                     1,
                                     1,
                                     vec![255, 255, 255, 0])
            .unwrap();
        assert_eq!(image.convert_to(PixelFormat::Gray).data(), &[255]);
    }

    #[test]
    fn from_data_wrong_length() {
        let result = Image::from_data(PixelFormat::RGBA, 2, 2, vec![0; 15]);
        assert_eq!(result.unwrap_err().kind(), ErrorKind::InvalidInput);
    }

    #[test]
    fn new_image_is_zeroed() {
        let image = Image::new(PixelFormat::GrayAlpha, 3, 2);
        assert_eq!(image.data().len(), 12);
        assert!(image.data().iter().all(|&byte| byte == 0));
        assert_eq!(image.pixel_format().bits_per_pixel(), 16);
    }
}
