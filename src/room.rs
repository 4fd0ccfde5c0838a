//! Rooms and door links
//!
//! A room owns a rectangular grid of corner-blend tiles at some origin in the
//! unbounded world grid, plus the doors leading out of it. Rooms are built by
//! the generator in a single pass and never mutated afterwards. Doors refer
//! to other rooms by index into the world's room list, so the list can grow
//! without invalidating links.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::tile::{Material, Tile, TILE_SIZE};

/// What a door leads to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoorTarget {
    /// A door into another room, by stable index and local tile.
    Room { room: usize, tile: (i32, i32) },
    /// A lobby portal into a fresh dungeon of the given floor kind.
    Portal(FloorKind),
}

/// One direction of a door opening. Doors between two rooms are represented
/// symmetrically by a pair of links, one in each room.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DoorLink {
    /// Local tile of the opening in the owning room.
    pub at: (i32, i32),
    pub target: DoorTarget,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoomKind {
    Ordinary,
    Lobby,
    Boss,
}

impl RoomKind {
    pub fn name(&self) -> &'static str {
        match self {
            RoomKind::Ordinary => "ordinary",
            RoomKind::Lobby => "lobby",
            RoomKind::Boss => "boss",
        }
    }
}

/// Dungeon floor flavour. Drives carving visuals and spawn tables; also the
/// payload of the lobby's portal doors.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FloorKind {
    Fire,
    Lush,
    Water,
}

impl FloorKind {
    pub fn all() -> &'static [FloorKind] {
        &[FloorKind::Fire, FloorKind::Lush, FloorKind::Water]
    }

    pub fn as_char(&self) -> char {
        match self {
            FloorKind::Fire => 'f',
            FloorKind::Lush => 'l',
            FloorKind::Water => 'w',
        }
    }

    pub fn from_char(c: char) -> Option<FloorKind> {
        match c {
            'f' => Some(FloorKind::Fire),
            'l' => Some(FloorKind::Lush),
            'w' => Some(FloorKind::Water),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FloorKind::Fire => "Fire",
            FloorKind::Lush => "Lush",
            FloorKind::Water => "Water",
        }
    }
}

pub struct Room {
    /// World-grid origin, in tiles.
    pub origin: (i32, i32),
    size: (i32, i32),
    tiles: Vec<Tile>,
    pub doors: Vec<DoorLink>,
    pub kind: RoomKind,
    pub floor: FloorKind,
}

impl Room {
    /// Allocate a room of uniform wall tiles at the given origin.
    pub fn new(origin: (i32, i32), width: i32, height: i32, kind: RoomKind, floor: FloorKind) -> Self {
        Self {
            origin,
            size: (width, height),
            tiles: vec![Tile::default(); (width * height) as usize],
            doors: Vec::new(),
            kind,
            floor,
        }
    }

    pub fn width(&self) -> i32 {
        self.size.0
    }

    pub fn height(&self) -> i32 {
        self.size.1
    }

    pub fn left(&self) -> i32 {
        self.origin.0
    }

    pub fn top(&self) -> i32 {
        self.origin.1
    }

    pub fn right(&self) -> i32 {
        self.origin.0 + self.size.0
    }

    pub fn bottom(&self) -> i32 {
        self.origin.1 + self.size.1
    }

    fn index(&self, x: i32, y: i32) -> usize {
        (y * self.size.0 + x) as usize
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Tile {
        self.tiles[self.index(x, y)]
    }

    pub fn tile_mut(&mut self, x: i32, y: i32) -> &mut Tile {
        let index = self.index(x, y);
        &mut self.tiles[index]
    }

    pub fn set_tile(&mut self, x: i32, y: i32, tile: Tile) {
        let index = self.index(x, y);
        self.tiles[index] = tile;
    }

    /// True when a world pixel position falls inside this room's rectangle.
    pub fn contains(&self, position: (f32, f32)) -> bool {
        let tile_x = (position.0.floor() as i32).div_euclid(TILE_SIZE);
        let tile_y = (position.1.floor() as i32).div_euclid(TILE_SIZE);
        tile_x >= self.left() && tile_x < self.right() && tile_y >= self.top() && tile_y < self.bottom()
    }

    /// True when this room already has a door into the room at `room_index`.
    pub fn is_connected_to(&self, room_index: usize) -> bool {
        self.doors
            .iter()
            .any(|door| matches!(door.target, DoorTarget::Room { room, .. } if room == room_index))
    }

    pub fn add_door(&mut self, at: (i32, i32), target: DoorTarget) {
        self.doors.push(DoorLink { at, target });
    }

    /// Find a door whose tile rectangle overlaps the given actor box.
    pub fn find_colliding_door(&self, position: (f32, f32), size: (f32, f32)) -> Option<&DoorLink> {
        self.doors.iter().find(|door| {
            let door_x = ((self.left() + door.at.0) * TILE_SIZE) as f32;
            let door_y = ((self.top() + door.at.1) * TILE_SIZE) as f32;
            let tile = TILE_SIZE as f32;
            position.0 < door_x + tile
                && door_x < position.0 + size.0
                && position.1 < door_y + tile
                && door_y < position.1 + size.1
        })
    }

    /// Pick a random interior tile whose plus-shaped neighbourhood is pure
    /// floor and return its world pixel position. Used for spawn placement
    /// after a floor transition. Bounded at 100 attempts; a room carved
    /// mostly to wall may legitimately have no such position.
    pub fn find_empty_position(&self, rng: &mut ChaCha8Rng) -> Option<(f32, f32)> {
        for _ in 0..100 {
            let x = rng.gen_range(2..=self.width() - 2);
            let y = rng.gen_range(2..=self.height() - 2);
            let clear = self.tile_at(x, y).is_only(Material::Floor)
                && self.tile_at(x + 1, y).is_only(Material::Floor)
                && self.tile_at(x - 1, y).is_only(Material::Floor)
                && self.tile_at(x, y + 1).is_only(Material::Floor)
                && self.tile_at(x, y - 1).is_only(Material::Floor);
            if clear {
                return Some((
                    ((x + self.left()) * TILE_SIZE) as f32,
                    ((y + self.top()) * TILE_SIZE) as f32,
                ));
            }
        }
        None
    }

    /// Carve every tile to the given uniform material.
    pub fn fill(&mut self, material: Material) {
        self.tiles.fill(Tile::uniform(material));
    }

    /// Force the outer ring of tiles to the given uniform material.
    pub fn carve_border(&mut self, material: Material) {
        let tile = Tile::uniform(material);
        for x in 0..self.width() {
            self.set_tile(x, 0, tile);
            self.set_tile(x, self.height() - 1, tile);
        }
        for y in 0..self.height() {
            self.set_tile(0, y, tile);
            self.set_tile(self.width() - 1, y, tile);
        }
    }
}
