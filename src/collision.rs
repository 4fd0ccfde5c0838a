//! Per-pixel collision mask over the tile atlas
//!
//! The mask is a flattened solidity bitmap covering the entire atlas image,
//! sampled once at startup from a reference image: every pixel that is not
//! opaque white is solid. Queries address the mask by atlas cell plus an
//! intra-cell pixel offset; anything outside the bitmap reads as non-solid.

use image::RgbaImage;

use crate::tile::TILE_SIZE;

#[derive(Clone, Debug, Default)]
pub struct CollisionMask {
    solid: Vec<bool>,
    width: i32,
}

impl CollisionMask {
    /// Empty mask: every query reads non-solid.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from a finished bitmap and its row width in pixels.
    pub fn from_parts(solid: Vec<bool>, width: i32) -> Self {
        Self { solid, width }
    }

    /// Sample a reference image: solid wherever the pixel is not opaque white.
    pub fn from_image(image: &RgbaImage) -> Self {
        let width = image.width() as i32;
        let mut solid = Vec::with_capacity((image.width() * image.height()) as usize);
        for y in 0..image.height() {
            for x in 0..image.width() {
                solid.push(image.get_pixel(x, y).0 != [255, 255, 255, 255]);
            }
        }
        Self { solid, width }
    }

    /// Load and sample a reference image from disk.
    pub fn load(path: &str) -> Result<Self, image::ImageError> {
        let image = image::open(path)?.to_rgba8();
        Ok(Self::from_image(&image))
    }

    /// Solidity of one pixel, addressed by atlas cell and intra-cell offset.
    /// Offsets that land outside the bitmap read as non-solid.
    pub fn is_solid(&self, cell_x: i32, cell_y: i32, local_x: i32, local_y: i32) -> bool {
        if self.width <= 0 {
            return false;
        }
        let pixel_x = cell_x * TILE_SIZE + local_x;
        let pixel_y = cell_y * TILE_SIZE + local_y;
        if pixel_x < 0 || pixel_y < 0 || pixel_x >= self.width {
            return false;
        }
        let index = (pixel_y * self.width + pixel_x) as usize;
        self.solid.get(index).copied().unwrap_or(false)
    }
}
