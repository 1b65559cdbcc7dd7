//! Symbolic cell roles and the role-to-value configuration.
//!
//! Carving never touches a concrete cell type directly: it asks the config
//! what value plays a given role ("room:floor", "diggable", ...) and
//! compares grid contents against those values. A config only needs to map
//! the roles it cares about; unmapped roles resolve through a fixed
//! fallback chain (e.g. "room:wall:top-left" falls back through
//! "room:wall:corner" and "room:wall" to "wall").

use crate::errors::GenError;
use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// The closed set of symbolic keys the digger understands.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
pub enum CellRole {
    #[strum(serialize = "floor")]
    Floor,
    #[strum(serialize = "room:floor")]
    RoomFloor,
    #[strum(serialize = "hall:floor")]
    HallFloor,
    #[strum(serialize = "diggable")]
    Diggable,
    #[strum(serialize = "wall")]
    Wall,
    #[strum(serialize = "room:wall")]
    RoomWall,
    #[strum(serialize = "hall:wall")]
    HallWall,
    #[strum(serialize = "room:wall:top")]
    RoomWallTop,
    #[strum(serialize = "room:wall:bottom")]
    RoomWallBottom,
    #[strum(serialize = "room:wall:left")]
    RoomWallLeft,
    #[strum(serialize = "room:wall:right")]
    RoomWallRight,
    #[strum(serialize = "room:wall:top-left")]
    RoomWallTopLeft,
    #[strum(serialize = "room:wall:top-right")]
    RoomWallTopRight,
    #[strum(serialize = "room:wall:bottom-left")]
    RoomWallBottomLeft,
    #[strum(serialize = "room:wall:bottom-right")]
    RoomWallBottomRight,
    #[strum(serialize = "room:wall:corner")]
    RoomWallCorner,
    #[strum(serialize = "room:door")]
    RoomDoor,
    #[strum(serialize = "hall:door")]
    HallDoor,
}

impl CellRole {
    /// The role consulted next when this one is not mapped.
    pub const fn fallback(self) -> Option<CellRole> {
        match self {
            CellRole::Floor | CellRole::Wall | CellRole::Diggable => None,
            CellRole::RoomFloor | CellRole::HallFloor => Some(CellRole::Floor),
            CellRole::RoomWall | CellRole::HallWall => Some(CellRole::Wall),
            CellRole::RoomWallTop
            | CellRole::RoomWallBottom
            | CellRole::RoomWallLeft
            | CellRole::RoomWallRight => Some(CellRole::RoomWall),
            CellRole::RoomWallTopLeft
            | CellRole::RoomWallTopRight
            | CellRole::RoomWallBottomLeft
            | CellRole::RoomWallBottomRight => Some(CellRole::RoomWallCorner),
            CellRole::RoomWallCorner => Some(CellRole::RoomWall),
            CellRole::RoomDoor => Some(CellRole::RoomFloor),
            CellRole::HallDoor => Some(CellRole::HallFloor),
        }
    }
}

/// Role-to-value mapping for one concrete cell type.
#[derive(Debug, Clone)]
pub struct CellConfig<T> {
    roles: HashMap<CellRole, T>,
}

impl<T> Default for CellConfig<T> {
    fn default() -> Self {
        Self {
            roles: HashMap::new(),
        }
    }
}

impl<T: Clone + PartialEq> CellConfig<T> {
    pub fn new() -> Self {
        Self {
            roles: HashMap::new(),
        }
    }

    /// Map a role to a value, replacing any previous mapping.
    pub fn assign(&mut self, role: CellRole, value: T) -> &mut Self {
        self.roles.insert(role, value);
        self
    }

    /// Builder-style [`assign`](Self::assign).
    pub fn with(mut self, role: CellRole, value: T) -> Self {
        self.roles.insert(role, value);
        self
    }

    /// Look a role up, walking the fallback chain on misses.
    pub fn resolve(&self, role: CellRole) -> Option<&T> {
        let mut cursor = role;
        loop {
            if let Some(value) = self.roles.get(&cursor) {
                return Some(value);
            }
            cursor = cursor.fallback()?;
        }
    }

    /// [`resolve`](Self::resolve), reporting a dead chain as an error.
    pub fn require(&self, role: CellRole) -> Result<&T, GenError> {
        self.resolve(role).ok_or(GenError::UnmappedRole(role))
    }

    /// Value equality between a concrete cell and a role's resolved value.
    ///
    /// Unresolvable roles match nothing.
    pub fn is_role(&self, value: &T, role: CellRole) -> bool {
        self.resolve(role) == Some(value)
    }

    /// Whether `value` matches any of the given roles.
    pub fn is_any_role(&self, value: &T, roles: &[CellRole]) -> bool {
        roles.iter().any(|&role| self.is_role(value, role))
    }

    /// Whether two roles resolve to the same concrete value.
    ///
    /// The digger uses this to skip flank normalization when "hall:wall"
    /// and "diggable" are indistinguishable on the grid.
    pub fn roles_coincide(&self, a: CellRole, b: CellRole) -> bool {
        match (self.resolve(a), self.resolve(b)) {
            (Some(va), Some(vb)) => va == vb,
            _ => false,
        }
    }
}
