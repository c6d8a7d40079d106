//! Image-to-tensor transforms applied when a sample is materialized.

use image::RgbImage;

/// Per-channel mean of the ImageNet training set.
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
/// Per-channel standard deviation of the ImageNet training set.
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Dense image tensor in CHW layout.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTensor {
    pub channels: usize,
    pub height: usize,
    pub width: usize,
    pub data: Vec<f32>,
}

impl ImageTensor {
    pub fn new(channels: usize, height: usize, width: usize, data: Vec<f32>) -> Self {
        debug_assert_eq!(data.len(), channels * height * width);
        Self {
            channels,
            height,
            width,
            data,
        }
    }

    /// `(channels, height, width)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.channels, self.height, self.width)
    }

    pub fn get(&self, channel: usize, y: usize, x: usize) -> Option<f32> {
        if channel >= self.channels || y >= self.height || x >= self.width {
            return None;
        }
        self.data
            .get(channel * self.height * self.width + y * self.width + x)
            .copied()
    }

    fn plane_mut(&mut self, channel: usize) -> &mut [f32] {
        let plane = self.height * self.width;
        &mut self.data[channel * plane..(channel + 1) * plane]
    }
}

/// Converts a decoded RGB image into the tensor handed to consumers.
///
/// Transforms may resize or re-layout the image, but never see the bounding
/// box: boxes stay in source pixel coordinates.
pub trait Transform: Send + Sync {
    fn apply(&self, image: RgbImage) -> ImageTensor;
}

impl<F> Transform for F
where
    F: Fn(RgbImage) -> ImageTensor + Send + Sync,
{
    fn apply(&self, image: RgbImage) -> ImageTensor {
        self(image)
    }
}

/// HWC `u8` to CHW `f32` scaled to `[0, 1]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ToTensor;

impl Transform for ToTensor {
    fn apply(&self, image: RgbImage) -> ImageTensor {
        let (width, height) = (image.width() as usize, image.height() as usize);
        let plane = width * height;
        let mut data = vec![0.0f32; 3 * plane];
        for (x, y, pixel) in image.enumerate_pixels() {
            let base = y as usize * width + x as usize;
            data[base] = pixel[0] as f32 / 255.0;
            data[plane + base] = pixel[1] as f32 / 255.0;
            data[2 * plane + base] = pixel[2] as f32 / 255.0;
        }
        ImageTensor::new(3, height, width, data)
    }
}

/// [`ToTensor`] followed by `(value - mean) / std` per channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalize {
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

impl Normalize {
    pub fn new(mean: [f32; 3], std: [f32; 3]) -> Self {
        Self { mean, std }
    }

    pub fn imagenet() -> Self {
        Self::new(IMAGENET_MEAN, IMAGENET_STD)
    }

    /// Undo the normalization, mapping values back to `[0, 1]` (clamped).
    pub fn denormalize(&self, mut tensor: ImageTensor) -> ImageTensor {
        for channel in 0..tensor.channels.min(3) {
            let (mean, std) = (self.mean[channel], self.std[channel]);
            for value in tensor.plane_mut(channel) {
                *value = (*value * std + mean).clamp(0.0, 1.0);
            }
        }
        tensor
    }
}

impl Transform for Normalize {
    fn apply(&self, image: RgbImage) -> ImageTensor {
        let mut tensor = ToTensor.apply(image);
        for channel in 0..3 {
            let (mean, std) = (self.mean[channel], self.std[channel]);
            for value in tensor.plane_mut(channel) {
                *value = (*value - mean) / std;
            }
        }
        tensor
    }
}
