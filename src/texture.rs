//! Texture storage and sampling

use thiserror::Error;

/// How texture coordinates outside [0, 1] are folded back in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WrappingMode {
    /// Keep only the fractional part, tiling the texture.
    Repeat,
    /// Clamp to the edge texel.
    ClampToEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilteringMode {
    Nearest,
}

#[derive(Debug, Error)]
pub enum TextureError {
    #[error("unsupported channel count {0}, expected 3 or 4")]
    UnsupportedChannels(usize),
    #[error("pixel data is {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
    #[cfg(feature = "image_compat")]
    #[error("failed to decode image")]
    Decode(#[from] image::ImageError),
}

/// A 2D RGB or RGBA image sampled in normalized UV coordinates, with the V
/// axis pointing up.
pub struct Texture {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
    wrapping_mode_x: WrappingMode,
    wrapping_mode_y: WrappingMode,
    filtering_mode_magnifying: FilteringMode,
    filtering_mode_minifying: FilteringMode,
}

impl Texture {
    /// Build a texture from a row-major byte buffer with 3 or 4 channels
    /// per pixel, top row first.
    pub fn from_parts(
        width: usize,
        height: usize,
        channels: usize,
        data: Vec<u8>,
    ) -> Result<Texture, TextureError> {
        if channels != 3 && channels != 4 {
            return Err(TextureError::UnsupportedChannels(channels));
        }
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(TextureError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }

        Ok(Texture {
            width,
            height,
            channels,
            data,
            wrapping_mode_x: WrappingMode::Repeat,
            wrapping_mode_y: WrappingMode::Repeat,
            filtering_mode_magnifying: FilteringMode::Nearest,
            filtering_mode_minifying: FilteringMode::Nearest,
        })
    }

    /// Decode an image file into an RGBA texture.
    #[cfg(feature = "image_compat")]
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Texture, TextureError> {
        let image = image::open(path)?.to_rgba8();
        let (width, height) = image.dimensions();
        Texture::from_parts(width as usize, height as usize, 4, image.into_raw())
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn wrapping_mode_x(&self) -> WrappingMode {
        self.wrapping_mode_x
    }

    pub fn set_wrapping_mode_x(&mut self, mode: WrappingMode) {
        self.wrapping_mode_x = mode;
    }

    pub fn wrapping_mode_y(&self) -> WrappingMode {
        self.wrapping_mode_y
    }

    pub fn set_wrapping_mode_y(&mut self, mode: WrappingMode) {
        self.wrapping_mode_y = mode;
    }

    pub fn filtering_mode_magnifying(&self) -> FilteringMode {
        self.filtering_mode_magnifying
    }

    pub fn set_filtering_mode_magnifying(&mut self, mode: FilteringMode) {
        self.filtering_mode_magnifying = mode;
    }

    pub fn filtering_mode_minifying(&self) -> FilteringMode {
        self.filtering_mode_minifying
    }

    pub fn set_filtering_mode_minifying(&mut self, mode: FilteringMode) {
        self.filtering_mode_minifying = mode;
    }

    /// Sample the nearest texel at `(u, v)`, returning normalized RGBA.
    ///
    /// Coordinates outside [0, 1] are folded through the wrapping modes
    /// first. Textures without an alpha channel sample as fully opaque.
    pub fn sample(&self, u: f64, v: f64) -> [f64; 4] {
        let u = fold(u, self.wrapping_mode_x);
        let v = fold(v, self.wrapping_mode_y);

        // V points up but rows are stored top-down, hence (1 - v).
        let x = ((self.width - 1) as f64 * u + 0.5) as usize;
        let y = ((self.height - 1) as f64 * (1.0 - v) + 0.5) as usize;

        let start = (y * self.width + x) * self.channels;
        let texel = &self.data[start..start + self.channels];

        const INV_255: f64 = 1.0 / 255.0;
        [
            f64::from(texel[0]) * INV_255,
            f64::from(texel[1]) * INV_255,
            f64::from(texel[2]) * INV_255,
            if self.channels == 4 {
                f64::from(texel[3]) * INV_255
            } else {
                1.0
            },
        ]
    }
}

fn fold(coordinate: f64, mode: WrappingMode) -> f64 {
    if (0.0..=1.0).contains(&coordinate) {
        return coordinate;
    }

    match mode {
        WrappingMode::Repeat => coordinate - coordinate.floor(),
        WrappingMode::ClampToEdge => coordinate.clamp(0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2x2 RGB texture: red, green / blue, white.
    fn checker() -> Texture {
        #[rustfmt::skip]
        let data = vec![
            255, 0, 0,   0, 255, 0,
            0, 0, 255,   255, 255, 255,
        ];
        Texture::from_parts(2, 2, 3, data).unwrap()
    }

    #[test]
    fn nearest_lookup_flips_v() {
        let texture = checker();

        // v = 1 is the top row.
        assert_eq!(texture.sample(0.0, 1.0), [1.0, 0.0, 0.0, 1.0]);
        assert_eq!(texture.sample(1.0, 1.0), [0.0, 1.0, 0.0, 1.0]);
        assert_eq!(texture.sample(0.0, 0.0), [0.0, 0.0, 1.0, 1.0]);
        assert_eq!(texture.sample(1.0, 0.0), [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn wrapping_folds_out_of_range_coordinates() {
        let mut texture = checker();

        // Repeat keeps the fractional part: u = 2.25 samples like 0.25.
        assert_eq!(texture.sample(2.25, 1.0), texture.sample(0.25, 1.0));

        texture.set_wrapping_mode_x(WrappingMode::ClampToEdge);
        assert_eq!(texture.sample(7.0, 1.0), texture.sample(1.0, 1.0));
        assert_eq!(texture.sample(-3.0, 0.0), texture.sample(0.0, 0.0));
    }

    #[test]
    fn creation_validates_dimensions() {
        assert!(matches!(
            Texture::from_parts(2, 2, 5, vec![0; 20]),
            Err(TextureError::UnsupportedChannels(5))
        ));
        assert!(matches!(
            Texture::from_parts(2, 2, 3, vec![0; 11]),
            Err(TextureError::SizeMismatch { .. })
        ));
    }
}
