use std::sync::Arc;

use image::RgbImage;

use crate::error::Error;

/// pixel layout of a single frame, 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Gray8,
    Rgb8,
}

impl PixelFormat {
    pub fn channels(&self) -> usize {
        match self {
            PixelFormat::Gray8 => 1,
            PixelFormat::Rgb8 => 3,
        }
    }
}

/// a single decoded image sample with known dimensions and channel count
///
/// the pixel bytes are shared, so cloning a frame never copies pixel data
#[derive(Debug, Clone)]
pub struct Frame {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Arc<[u8]>,
}

impl Frame {
    /// create a new frame over the given pixel buffer
    ///
    /// the buffer length must be exactly `width * height * channels` bytes
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self, Error> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidFrame(format!("dimensions {width}x{height} must be non-zero")));
        }
        let expected = width as usize * height as usize * format.channels();
        if data.len() != expected {
            return Err(Error::InvalidFrame(format!("buffer holds {} bytes, expected {expected}", data.len())));
        }

        Ok(Self { width, height, format, data: data.into() })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// return a 3-channel version of the frame
    ///
    /// grayscale frames get their single channel replicated, rgb frames are returned as a cheap clone
    pub fn to_rgb8(&self) -> Frame {
        match self.format {
            PixelFormat::Rgb8 => self.clone(),
            PixelFormat::Gray8 => {
                let mut data = Vec::with_capacity(self.data.len() * 3);
                for &value in self.data.iter() {
                    data.extend_from_slice(&[value, value, value]);
                }
                Self { width: self.width, height: self.height, format: PixelFormat::Rgb8, data: data.into() }
            }
        }
    }
}

impl From<RgbImage> for Frame {
    fn from(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self { width, height, format: PixelFormat::Rgb8, data: image.into_raw().into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_buffer_length() {
        let result = Frame::new(4, 4, PixelFormat::Rgb8, vec![0; 10]);
        assert!(matches!(result, Err(Error::InvalidFrame(_))));
    }

    #[test]
    fn rejects_empty_buffer() {
        let result = Frame::new(4, 4, PixelFormat::Gray8, Vec::new());
        assert!(matches!(result, Err(Error::InvalidFrame(_))));
    }

    #[test]
    fn rejects_zero_dimensions() {
        let result = Frame::new(0, 4, PixelFormat::Gray8, Vec::new());
        assert!(matches!(result, Err(Error::InvalidFrame(_))));
    }

    #[test]
    fn accepts_matching_buffer_length() {
        let frame = Frame::new(4, 2, PixelFormat::Rgb8, vec![7; 24]).expect("frame should be valid");
        assert_eq!(frame.width(), 4);
        assert_eq!(frame.height(), 2);
        assert_eq!(frame.format(), PixelFormat::Rgb8);
        assert_eq!(frame.data().len(), 24);
    }

    #[test]
    fn replicates_gray_channel_to_rgb() {
        let frame = Frame::new(2, 2, PixelFormat::Gray8, vec![10, 20, 30, 40]).expect("frame should be valid");
        let rgb = frame.to_rgb8();
        assert_eq!(rgb.format(), PixelFormat::Rgb8);
        assert_eq!(rgb.width(), 2);
        assert_eq!(rgb.height(), 2);
        assert_eq!(rgb.data(), &[10, 10, 10, 20, 20, 20, 30, 30, 30, 40, 40, 40]);
    }

    #[test]
    fn rgb_conversion_is_identity_for_rgb_frames() {
        let frame = Frame::new(2, 1, PixelFormat::Rgb8, vec![1, 2, 3, 4, 5, 6]).expect("frame should be valid");
        let rgb = frame.to_rgb8();
        assert_eq!(rgb.format(), PixelFormat::Rgb8);
        assert_eq!(rgb.data(), frame.data());
    }

    #[test]
    fn frame_from_rgb_image_keeps_dimensions() {
        let image = RgbImage::from_pixel(6, 3, image::Rgb([9, 8, 7]));
        let frame = Frame::from(image);
        assert_eq!(frame.width(), 6);
        assert_eq!(frame.height(), 3);
        assert_eq!(frame.format(), PixelFormat::Rgb8);
        assert_eq!(frame.data().len(), 6 * 3 * 3);
    }
}
