//! Procedural dungeon-layout engine
//!
//! Lays out non-overlapping rooms on an unbounded tile grid, carves wall and
//! floor material from a coherent-noise field, derives per-tile corner blends
//! for autotiling, wires rooms together with doors, and resolves actor
//! movement against a per-pixel collision mask built over the same atlas.

pub mod ascii;
pub mod autotile;
pub mod collision;
pub mod generator;
pub mod room;
pub mod tile;
pub mod world;
