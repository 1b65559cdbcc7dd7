//! burrow-core: BSP dungeon generation for grid-based roguelikes
//!
//! This crate carves rooms, corridors, and doors into a generic 2D cell
//! grid. It is pure CPU-bound logic with no I/O: an orchestrator builds a
//! [`gen::BspTree`] over the map bounds, attaches one [`gen::Room`] per
//! leaf through a [`gen::RoomFactory`], and runs one of the
//! [`gen::Digger`] strategies. All randomness flows through a single
//! seeded [`GameRng`], so the same seed reproduces the same map.
//!
//! The carving logic never names a concrete cell type. A
//! [`gen::CellConfig`] maps symbolic roles ("room:floor", "diggable",
//! "room:wall:top-left", ...) to values of the grid's cell type, and the
//! digger works entirely through that mapping.

pub mod errors;
pub mod r#gen;
pub mod grid;

mod rng;

pub use errors::GenError;
pub use grid::Grid;
pub use rng::GameRng;
