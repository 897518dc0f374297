//! Color and depth attachments
//!
//! The framebuffer owns an RGBA8888 color plane and an `f64` depth plane in
//! NDC depth space. Larger depth values are nearer: clearing writes the far
//! value `-1.0` and the depth test passes for strictly greater depths.

use nalgebra::Vector3;

use crate::color::Color;

pub struct Framebuffer {
    width: usize,
    height: usize,
    color: Vec<u32>,
    depth: Vec<f64>,
}

impl Framebuffer {
    pub fn new(width: usize, height: usize) -> Framebuffer {
        assert!(width > 0, "framebuffer must have a non-zero width");
        assert!(height > 0, "framebuffer must have a non-zero height");

        let size = width * height;
        Framebuffer {
            width,
            height,
            color: vec![0; size],
            depth: vec![-1.0; size],
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Fill the color plane with transparent black and the depth plane with
    /// the far value `-1.0`.
    pub fn clear(&mut self) {
        self.color.fill(0);
        self.depth.fill(-1.0);
    }

    #[inline]
    fn offset(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    /// The packed color word at `(x, y)`.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        self.color[self.offset(x, y)]
    }

    /// The stored depth at `(x, y)`.
    #[inline]
    pub fn depth_at(&self, x: usize, y: usize) -> f64 {
        self.depth[self.offset(x, y)]
    }

    /// Store a color and depth. `depth` must already be inside [-1, 1].
    #[inline]
    pub fn draw_pixel(&mut self, x: usize, y: usize, depth: f64, color: Color) {
        debug_assert!((-1.0..=1.0).contains(&depth));

        let offset = self.offset(x, y);
        self.color[offset] = color.to_u32();
        self.depth[offset] = depth;
    }

    /// Whether a fragment at `depth` wins against the stored value.
    /// Strictly greater: equal depths keep the earlier write.
    #[inline]
    pub fn depth_test(&self, x: usize, y: usize, depth: f64) -> bool {
        depth > self.depth[self.offset(x, y)]
    }

    /// Map an NDC position onto this framebuffer's pixel grid.
    ///
    /// The y axis is flipped so that the image origin is the top-left
    /// corner; z passes through unchanged.
    #[inline]
    pub fn ndc_to_screen(&self, ndc: Vector3<f64>) -> Vector3<f64> {
        Vector3::new(
            (self.width as f64 - 1.0) / 2.0 * (ndc.x + 1.0),
            -(self.height as f64 - 1.0) / 2.0 * (ndc.y - 1.0),
            ndc.z,
        )
    }

    /// The whole color plane, row-major from the top-left pixel.
    pub fn color(&self) -> &[u32] {
        &self.color
    }

    /// The whole depth plane, row-major from the top-left pixel.
    pub fn depth(&self) -> &[f64] {
        &self.depth
    }

    /// Serialize the color plane to bytes, big-endian per pixel, so the
    /// first byte of every pixel is its red channel.
    pub fn to_rgba_bytes(&self) -> Vec<u8> {
        self.color
            .iter()
            .flat_map(|word| word.to_be_bytes())
            .collect()
    }

    /// Copy the color plane into an [`image::RgbaImage`].
    #[cfg(feature = "image_compat")]
    pub fn to_image(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width as u32, self.height as u32, |x, y| {
            image::Rgba(self.pixel(x as usize, y as usize).to_be_bytes())
        })
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn clear_resets_both_planes() {
        let mut framebuffer = Framebuffer::new(4, 3);
        framebuffer.draw_pixel(1, 2, 0.25, Color::WHITE);

        framebuffer.clear();

        assert!(framebuffer.color().iter().all(|&word| word == 0));
        assert!(framebuffer.depth().iter().all(|&depth| depth == -1.0));
    }

    #[test]
    fn depth_test_is_strictly_greater() {
        let mut framebuffer = Framebuffer::new(2, 2);
        framebuffer.draw_pixel(0, 0, 0.5, Color::RED);

        assert!(!framebuffer.depth_test(0, 0, 0.5));
        assert!(!framebuffer.depth_test(0, 0, 0.25));
        assert!(framebuffer.depth_test(0, 0, 0.75));
    }

    #[test]
    fn ndc_mapping_hits_the_pixel_grid_corners() {
        let framebuffer = Framebuffer::new(512, 256);

        let top_left = framebuffer.ndc_to_screen(Vector3::new(-1.0, 1.0, 0.0));
        assert_relative_eq!(top_left.x, 0.0);
        assert_relative_eq!(top_left.y, 0.0);

        let bottom_right = framebuffer.ndc_to_screen(Vector3::new(1.0, -1.0, 0.5));
        assert_relative_eq!(bottom_right.x, 511.0);
        assert_relative_eq!(bottom_right.y, 255.0);
        assert_relative_eq!(bottom_right.z, 0.5);

        let center = framebuffer.ndc_to_screen(Vector3::new(0.0, 0.0, -1.0));
        assert_relative_eq!(center.x, 255.5);
        assert_relative_eq!(center.y, 127.5);
    }

    #[test]
    fn rgba_bytes_lead_with_red() {
        let mut framebuffer = Framebuffer::new(1, 1);
        framebuffer.draw_pixel(0, 0, 0.0, Color::new(0xAB, 0xCD, 0xEF, 0x01));

        assert_eq!(framebuffer.to_rgba_bytes(), vec![0xAB, 0xCD, 0xEF, 0x01]);
    }
}
