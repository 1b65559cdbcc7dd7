//! Map generation
//!
//! Contains the BSP partition, rooms and their containers, the cell-role
//! configuration, the digger, and object placement.

mod bsp;
mod cell;
mod container;
mod digger;
mod factory;
mod placement;
mod region;
mod room;

pub use bsp::{BspNode, BspTree, NodeId};
pub use cell::{CellConfig, CellRole};
pub use container::{TypedContainer, Verifier};
pub use digger::{CarveState, Digger};
pub use factory::{MIN_ROOM_SIDE, PER_SCALE, RoomFactory};
pub use placement::{RANDOM_TRIES, find_location, place_it, place_thing};
pub use region::{EdgeRun, InsideIter, Region, Side};
pub use room::Room;
