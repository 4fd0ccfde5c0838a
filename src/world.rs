//! World container and movement resolution
//!
//! Bundles the generated rooms with the shared autotiler and collision mask,
//! and resolves actor movement against them. The generator fills the room
//! list once per floor transition; after that everything here is read-only
//! per simulation tick.
//!
//! Movement is axis-separated: a requested delta is split into a horizontal
//! and a vertical part, each permitted or denied whole. An axis is permitted
//! only when two probe points on the leading edge of the actor box read
//! non-solid in the tile mask. There is no clipping; a blocked axis
//! contributes zero.

use crate::autotile::Autotiler;
use crate::collision::CollisionMask;
use crate::room::Room;
use crate::tile::TILE_SIZE;

/// A live actor box. The world only cares about its rectangle; stats,
/// animation and AI live with the caller.
#[derive(Clone, Copy, Debug)]
pub struct Actor {
    /// Top-left of the collision box, in world pixels.
    pub position: (f32, f32),
    /// Box size in pixels.
    pub size: (f32, f32),
}

impl Actor {
    fn overlaps(&self, position: (f32, f32), size: (f32, f32)) -> bool {
        position.0 < self.position.0 + self.size.0
            && self.position.0 < position.0 + size.0
            && position.1 < self.position.1 + self.size.1
            && self.position.1 < position.1 + size.1
    }
}

pub struct World {
    /// Rooms in generation order. Door links index into this list, so it
    /// only ever grows during a generation pass.
    pub rooms: Vec<Room>,
    pub autotiler: Autotiler,
    pub collision: CollisionMask,
    pub actors: Vec<Actor>,
}

impl World {
    pub fn new(collision: CollisionMask) -> Self {
        Self {
            rooms: Vec::new(),
            autotiler: Autotiler::new(),
            collision,
            actors: Vec::new(),
        }
    }

    /// Discard all rooms ahead of a fresh generation pass.
    pub fn clear_rooms(&mut self) {
        self.rooms.clear();
    }

    pub fn add_actor(&mut self, actor: Actor) -> usize {
        self.actors.push(actor);
        self.actors.len() - 1
    }

    /// Index of the room whose rectangle contains a world pixel position.
    pub fn find_room(&self, position: (f32, f32)) -> Option<usize> {
        self.rooms.iter().position(|room| room.contains(position))
    }

    /// Point-in-solid test against the collision mask of the tile under a
    /// world pixel position. Positions outside the room read as open.
    pub fn test_tile_mask(&self, room_index: usize, position: (f32, f32)) -> bool {
        self.probe_mask(&self.rooms[room_index], position)
    }

    fn probe_mask(&self, room: &Room, position: (f32, f32)) -> bool {
        let rel_x = position.0.floor() as i32 - room.left() * TILE_SIZE;
        let rel_y = position.1.floor() as i32 - room.top() * TILE_SIZE;
        let tile_x = rel_x.div_euclid(TILE_SIZE);
        let tile_y = rel_y.div_euclid(TILE_SIZE);
        if tile_x < 0 || tile_y < 0 || tile_x >= room.width() || tile_y >= room.height() {
            return false;
        }
        let (cell_x, cell_y) = self.autotiler.lookup(&room.tile_at(tile_x, tile_y));
        let local_x = rel_x - tile_x * TILE_SIZE;
        let local_y = rel_y - tile_y * TILE_SIZE;
        self.collision.is_solid(cell_x, cell_y, local_x, local_y)
    }

    /// Resolve a movement request against the tile mask only.
    ///
    /// Opposing requests on an axis cancel before probing. When both axes
    /// are requested the speed is halved before any probe, so diagonal
    /// movement is never faster than axis-aligned movement. Each axis is
    /// all-or-nothing; vertical probes run at the already-resolved
    /// horizontal position.
    #[allow(clippy::too_many_arguments)]
    pub fn get_allowed_movement_delta(
        &self,
        room: Option<usize>,
        left: bool,
        right: bool,
        up: bool,
        down: bool,
        speed: f32,
        position: (f32, f32),
        size: (f32, f32),
    ) -> (f32, f32) {
        self.resolve_delta(room, None, left, right, up, down, speed, position, size)
    }

    /// Actor-aware variant: additionally denies an axis whose moved box
    /// would overlap any other live actor's box.
    #[allow(clippy::too_many_arguments)]
    pub fn get_allowed_movement_delta_for(
        &self,
        actor_index: usize,
        room: Option<usize>,
        left: bool,
        right: bool,
        up: bool,
        down: bool,
        speed: f32,
        position: (f32, f32),
        size: (f32, f32),
    ) -> (f32, f32) {
        self.resolve_delta(room, Some(actor_index), left, right, up, down, speed, position, size)
    }

    #[allow(clippy::too_many_arguments)]
    fn resolve_delta(
        &self,
        room: Option<usize>,
        actor: Option<usize>,
        mut left: bool,
        mut right: bool,
        mut up: bool,
        mut down: bool,
        mut speed: f32,
        position: (f32, f32),
        size: (f32, f32),
    ) -> (f32, f32) {
        if left && right {
            left = false;
            right = false;
        }
        if up && down {
            up = false;
            down = false;
        }
        if (left || right) && (up || down) {
            speed /= 2.0;
        }
        let mut position = position;
        let mut delta = (0.0, 0.0);
        if left && self.is_x_empty(room, actor, position, size, -1.0, -speed) {
            position.0 -= speed;
            delta.0 = -speed;
        } else if right && self.is_x_empty(room, actor, position, size, 1.0, speed) {
            position.0 += speed;
            delta.0 = speed;
        }
        if up && self.is_y_empty(room, actor, position, size, -1.0, -speed) {
            delta.1 = -speed;
        } else if down && self.is_y_empty(room, actor, position, size, 1.0, speed) {
            delta.1 = speed;
        }
        delta
    }

    fn is_x_empty(
        &self,
        room: Option<usize>,
        actor: Option<usize>,
        position: (f32, f32),
        size: (f32, f32),
        x_direction: f32,
        speed: f32,
    ) -> bool {
        let Some(room) = room.or_else(|| self.find_room(position)) else {
            return false;
        };
        let room = &self.rooms[room];
        let mut edge = x_direction;
        if edge > 0.0 {
            edge += size.0;
        }
        let mut probe = (position.0 + edge + speed, position.1);
        if self.probe_mask(room, probe) {
            return false;
        }
        probe.1 += size.1;
        if self.probe_mask(room, probe) {
            return false;
        }
        match actor {
            Some(index) => !self.box_hits_other_actor(index, (position.0 + speed, position.1), size),
            None => true,
        }
    }

    fn is_y_empty(
        &self,
        room: Option<usize>,
        actor: Option<usize>,
        position: (f32, f32),
        size: (f32, f32),
        y_direction: f32,
        speed: f32,
    ) -> bool {
        let Some(room) = room.or_else(|| self.find_room(position)) else {
            return false;
        };
        let room = &self.rooms[room];
        let mut edge = y_direction;
        if edge > 0.0 {
            edge += size.1;
        }
        let mut probe = (position.0, position.1 + edge + speed);
        if self.probe_mask(room, probe) {
            return false;
        }
        probe.0 += size.0;
        if self.probe_mask(room, probe) {
            return false;
        }
        match actor {
            Some(index) => !self.box_hits_other_actor(index, (position.0, position.1 + speed), size),
            None => true,
        }
    }

    fn box_hits_other_actor(&self, actor_index: usize, position: (f32, f32), size: (f32, f32)) -> bool {
        self.actors
            .iter()
            .enumerate()
            .any(|(index, other)| index != actor_index && other.overlaps(position, size))
    }

    /// Nearest room to the left whose vertical band overlaps this one.
    /// `allow` filters candidates; door placement passes "not already
    /// connected".
    pub fn find_left_neighbour(
        &self,
        room_index: usize,
        allow: impl Fn(usize) -> bool,
    ) -> Option<usize> {
        let room = &self.rooms[room_index];
        let mut closest: Option<usize> = None;
        for (index, candidate) in self.rooms.iter().enumerate() {
            if index == room_index
                || candidate.left() > room.left()
                || candidate.top() > room.bottom()
                || room.top() > candidate.bottom()
                || !allow(index)
            {
                continue;
            }
            match closest {
                Some(best) if candidate.left() <= self.rooms[best].left() => {}
                _ => closest = Some(index),
            }
        }
        closest
    }

    pub fn find_right_neighbour(
        &self,
        room_index: usize,
        allow: impl Fn(usize) -> bool,
    ) -> Option<usize> {
        let room = &self.rooms[room_index];
        let mut closest: Option<usize> = None;
        for (index, candidate) in self.rooms.iter().enumerate() {
            if index == room_index
                || room.left() > candidate.left()
                || candidate.top() > room.bottom()
                || room.top() > candidate.bottom()
                || !allow(index)
            {
                continue;
            }
            match closest {
                Some(best) if candidate.left() >= self.rooms[best].left() => {}
                _ => closest = Some(index),
            }
        }
        closest
    }

    /// Vertical placement keeps the column's left edge, so the top search
    /// only accepts candidates sharing this room's left edge.
    pub fn find_top_neighbour(
        &self,
        room_index: usize,
        allow: impl Fn(usize) -> bool,
    ) -> Option<usize> {
        let room = &self.rooms[room_index];
        let mut closest: Option<usize> = None;
        for (index, candidate) in self.rooms.iter().enumerate() {
            if index == room_index
                || candidate.left() != room.left()
                || candidate.top() > room.bottom()
                || !allow(index)
            {
                continue;
            }
            match closest {
                Some(best) if candidate.top() <= self.rooms[best].top() => {}
                _ => closest = Some(index),
            }
        }
        closest
    }

    pub fn find_bottom_neighbour(
        &self,
        room_index: usize,
        allow: impl Fn(usize) -> bool,
    ) -> Option<usize> {
        let room = &self.rooms[room_index];
        let mut closest: Option<usize> = None;
        for (index, candidate) in self.rooms.iter().enumerate() {
            if index == room_index
                || room.left() > candidate.left()
                || candidate.left() > room.right()
                || room.top() > candidate.bottom()
                || !allow(index)
            {
                continue;
            }
            match closest {
                Some(best) if candidate.top() >= self.rooms[best].top() => {}
                _ => closest = Some(index),
            }
        }
        closest
    }
}
