//! Tile material and corner-blend types
//!
//! A tile does not store a single material. It stores one material per corner,
//! so that the boundary between two materials can be drawn with smooth
//! transition pieces. The four corners pack into a single integer key used by
//! the autotiler.

/// Pixels per tile, both in the world grid and in the texture atlas.
pub const TILE_SIZE: i32 = 32;

/// The closed set of tile materials.
///
/// The discriminant doubles as the column of the material's uniform atlas
/// cell, so the order here is part of the atlas layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Material {
    Wall = 0,
    Floor = 1,
}

impl Material {
    pub fn all() -> &'static [Material] {
        &[Material::Wall, Material::Floor]
    }

    /// Column of this material's uniform cell in the atlas.
    pub fn index(&self) -> u8 {
        *self as u8
    }
}

/// Corner-blend descriptor of one grid cell.
///
/// Corners are ordered top-left, top-right, bottom-left, bottom-right.
/// A freshly allocated tile is uniform wall; the generator carves floor
/// into it and the corner-propagation pass mixes the corners afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tile {
    corners: [Material; 4],
}

impl Default for Tile {
    fn default() -> Self {
        Tile::uniform(Material::Wall)
    }
}

impl Tile {
    pub fn uniform(material: Material) -> Self {
        Self {
            corners: [material; 4],
        }
    }

    /// True when all four corners are the given material.
    pub fn is_only(&self, material: Material) -> bool {
        self.corners.iter().all(|c| *c == material)
    }

    /// Pack the four corner materials into one lookup key.
    /// Layout: TL << 24 | TR << 16 | BL << 8 | BR.
    pub fn blend_key(&self) -> u32 {
        ((self.corners[0].index() as u32) << 24)
            | ((self.corners[1].index() as u32) << 16)
            | ((self.corners[2].index() as u32) << 8)
            | (self.corners[3].index() as u32)
    }

    pub fn top_left(&self) -> Material {
        self.corners[0]
    }

    pub fn top_right(&self) -> Material {
        self.corners[1]
    }

    pub fn bottom_left(&self) -> Material {
        self.corners[2]
    }

    pub fn bottom_right(&self) -> Material {
        self.corners[3]
    }

    pub fn set_top_left(&mut self, material: Material) {
        self.corners[0] = material;
    }

    pub fn set_top_right(&mut self, material: Material) {
        self.corners[1] = material;
    }

    pub fn set_bottom_left(&mut self, material: Material) {
        self.corners[2] = material;
    }

    pub fn set_bottom_right(&mut self, material: Material) {
        self.corners[3] = material;
    }
}
