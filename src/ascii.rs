//! ASCII rendering of generated worlds
//!
//! One character per tile over the bounding box of all rooms. Used by the
//! binary and handy when eyeballing a layout in a test failure.

use crate::room::Room;
use crate::tile::Material;
use crate::world::World;

/// Render every room into one character grid: '#' for any wall-touched
/// blend, '.' for pure floor, '+' for door openings, space outside rooms.
pub fn render_world(world: &World) -> String {
    if world.rooms.is_empty() {
        return String::new();
    }
    let min_x = world.rooms.iter().map(Room::left).min().unwrap_or(0);
    let min_y = world.rooms.iter().map(Room::top).min().unwrap_or(0);
    let max_x = world.rooms.iter().map(Room::right).max().unwrap_or(0);
    let max_y = world.rooms.iter().map(Room::bottom).max().unwrap_or(0);
    let width = (max_x - min_x) as usize;
    let height = (max_y - min_y) as usize;

    let mut grid = vec![vec![' '; width]; height];
    for room in &world.rooms {
        for x in 0..room.width() {
            for y in 0..room.height() {
                let row = (room.top() + y - min_y) as usize;
                let column = (room.left() + x - min_x) as usize;
                grid[row][column] = if room.tile_at(x, y).is_only(Material::Floor) {
                    '.'
                } else {
                    '#'
                };
            }
        }
        for door in &room.doors {
            let row = (room.top() + door.at.1 - min_y) as usize;
            let column = (room.left() + door.at.0 - min_x) as usize;
            grid[row][column] = '+';
        }
    }

    let mut out = String::with_capacity((width + 1) * height);
    for row in grid {
        out.extend(row);
        out.push('\n');
    }
    out
}

/// One line of stats per room, in generation order.
pub fn room_summary(world: &World) -> String {
    let mut out = String::new();
    for (index, room) in world.rooms.iter().enumerate() {
        out.push_str(&format!(
            "room {:2}: {:8} [{}] {:2}x{:2} at ({:3}, {:3}), {} doors\n",
            index,
            room.kind.name(),
            room.floor.as_char(),
            room.width(),
            room.height(),
            room.left(),
            room.top(),
            room.doors.len()
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::CollisionMask;
    use crate::generator::Generator;
    use crate::room::FloorKind;

    #[test]
    fn test_render_covers_bounding_box() {
        let mut world = World::new(CollisionMask::empty());
        Generator::new(11).generate_dungeon(&mut world, FloorKind::Fire);
        let rendered = render_world(&world);
        let lines: Vec<&str> = rendered.lines().collect();
        let expected_height = world.rooms.iter().map(Room::bottom).max().unwrap()
            - world.rooms.iter().map(Room::top).min().unwrap();
        assert_eq!(lines.len(), expected_height as usize);
        assert!(rendered.contains('#'));
        assert!(rendered.contains('.'));
    }

    #[test]
    fn test_summary_lists_every_room() {
        let mut world = World::new(CollisionMask::empty());
        Generator::new(11).generate_dungeon(&mut world, FloorKind::Lush);
        let summary = room_summary(&world);
        assert_eq!(summary.lines().count(), world.rooms.len());
        assert!(summary.contains("boss"));
        assert!(summary.contains("[l]"));
    }

    #[test]
    fn test_empty_world_renders_empty() {
        let world = World::new(CollisionMask::empty());
        assert!(render_world(&world).is_empty());
        assert!(room_summary(&world).is_empty());
    }
}
