//! Blend-key to atlas-cell mapping
//!
//! The autotiler is a static lookup table built once at startup. Uniform
//! tiles map to row 0 of the atlas, one column per material. The sixteen
//! wall/floor transition configurations map into a fixed block below that,
//! in the conventional marching-squares layout. Every blend the corner
//! propagation pass can produce resolves to a registered cell; anything
//! else falls back to (0, 0) so rendering and collision stay total.

use std::collections::HashMap;

use crate::tile::{Material, Tile};

pub struct Autotiler {
    cells: HashMap<u32, (i32, i32)>,
}

impl Default for Autotiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Autotiler {
    pub fn new() -> Self {
        let mut autotiler = Self {
            cells: HashMap::new(),
        };
        autotiler.register_uniform_tiles();
        autotiler.register_group(Material::Wall, Material::Floor, 0, 1);
        autotiler
    }

    /// Atlas cell for a tile, in cell units. Unregistered blends resolve
    /// to (0, 0) rather than an error.
    pub fn lookup(&self, tile: &Tile) -> (i32, i32) {
        self.cells.get(&tile.blend_key()).copied().unwrap_or((0, 0))
    }

    /// True when the blend has an explicit atlas entry. The fallback cell
    /// makes `lookup` total, so tests use this to tell a registered uniform
    /// wall apart from a fallthrough.
    pub fn is_registered(&self, tile: &Tile) -> bool {
        self.cells.contains_key(&tile.blend_key())
    }

    fn register_uniform_tiles(&mut self) {
        for material in Material::all() {
            let tile = Tile::uniform(*material);
            self.cells
                .insert(tile.blend_key(), (material.index() as i32, 0));
        }
    }

    fn register(
        &mut self,
        top_left: Material,
        top_right: Material,
        bottom_left: Material,
        bottom_right: Material,
        x: i32,
        y: i32,
    ) {
        let mut tile = Tile::uniform(top_left);
        tile.set_top_right(top_right);
        tile.set_bottom_left(bottom_left);
        tile.set_bottom_right(bottom_right);
        self.cells.insert(tile.blend_key(), (x, y));
    }

    /// Register the sixteen transition configurations between two materials
    /// in a fixed block with its top-left corner at (x, y).
    fn register_group(&mut self, primary: Material, sub: Material, x: i32, mut y: i32) {
        let p = primary;
        let s = sub;
        // Outer corners and straight edges.
        self.register(p, p, p, s, x, y);
        self.register(p, p, s, s, x + 1, y);
        self.register(p, p, s, p, x + 2, y);
        self.register(p, s, p, p, x, y + 1);
        self.register(s, s, p, p, x + 1, y + 1);
        self.register(s, p, p, p, x + 2, y + 1);
        y += 2;
        // Inner corners.
        self.register(s, s, s, p, x, y);
        self.register(s, s, p, p, x + 1, y);
        self.register(s, s, p, s, x + 2, y);
        self.register(s, p, s, s, x, y + 1);
        self.register(p, p, s, s, x + 1, y + 1);
        self.register(p, s, s, s, x + 2, y + 1);
        y += 2;
        // Diagonals and single-corner islands.
        self.register(s, p, p, s, x, y);
        self.register(p, s, p, s, x + 2, y);
        self.register(p, s, s, p, x, y + 1);
        self.register(s, p, s, p, x + 2, y + 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_lookups() {
        let autotiler = Autotiler::new();
        assert_eq!(autotiler.lookup(&Tile::uniform(Material::Wall)), (0, 0));
        assert_eq!(autotiler.lookup(&Tile::uniform(Material::Floor)), (1, 0));
    }

    #[test]
    fn test_every_corner_combination_is_registered() {
        let autotiler = Autotiler::new();
        // All 16 wall/floor corner combinations must resolve without
        // hitting the fallback: 14 mixed entries plus the 2 uniforms.
        for bits in 0..16u8 {
            let pick = |bit: u8| {
                if bits & (1 << bit) != 0 {
                    Material::Floor
                } else {
                    Material::Wall
                }
            };
            let mut tile = Tile::uniform(pick(0));
            tile.set_top_right(pick(1));
            tile.set_bottom_left(pick(2));
            tile.set_bottom_right(pick(3));
            assert!(
                autotiler.is_registered(&tile),
                "blend {:#010x} missing",
                tile.blend_key()
            );
        }
    }

    #[test]
    fn test_unregistered_blend_falls_back() {
        let autotiler = Autotiler::new();
        let mut cells = Autotiler {
            cells: HashMap::new(),
        };
        cells.register_uniform_tiles();
        // A mixed blend with no group registered resolves to the default.
        let mut tile = Tile::uniform(Material::Wall);
        tile.set_top_right(Material::Floor);
        assert_eq!(cells.lookup(&tile), (0, 0));
        assert!(!cells.is_registered(&tile));
        assert!(autotiler.is_registered(&tile));
    }

    #[test]
    fn test_transition_cells_sit_below_uniform_row() {
        let autotiler = Autotiler::new();
        let mut tile = Tile::uniform(Material::Wall);
        tile.set_bottom_right(Material::Floor);
        let (x, y) = autotiler.lookup(&tile);
        assert!(y >= 1, "transition cell ({}, {}) overlaps uniform row", x, y);
    }
}
