//! Rooms: regions with content containers, doors, and floor-space
//! accounting.
//!
//! A room's region is fixed once its BSP leaf is finalized. The digger
//! mutates the dug flag and the door list while carving; placement callers
//! route items into the owned containers.

use crate::errors::GenError;
use crate::r#gen::container::TypedContainer;
use crate::r#gen::region::Region;

/// A rectangular room.
///
/// Containers are kept in insertion order; `assign_to_container` honors
/// that order as a priority list.
#[derive(Debug, Clone)]
pub struct Room<I> {
    region: Region,
    floor_space: usize,
    containers: Vec<(String, TypedContainer<I>)>,
    doors: Vec<(usize, usize)>,
    dug: bool,
}

impl<I> Room<I> {
    /// Create a room covering `region` exactly. Floor space starts at the
    /// region's full area.
    pub fn new(region: Region) -> Self {
        Self {
            region,
            floor_space: region.area(),
            containers: Vec::new(),
            doors: Vec::new(),
            dug: false,
        }
    }

    pub fn region(&self) -> Region {
        self.region
    }

    pub fn floor_space(&self) -> usize {
        self.floor_space
    }

    pub fn dug(&self) -> bool {
        self.dug
    }

    pub fn doors(&self) -> &[(usize, usize)] {
        &self.doors
    }

    pub(crate) fn mark_dug(&mut self) {
        self.dug = true;
    }

    pub(crate) fn add_door(&mut self, y: usize, x: usize) {
        if !self.doors.contains(&(y, x)) {
            self.doors.push((y, x));
        }
    }

    /// Look a container up by role name.
    pub fn container(&self, role: &str) -> Option<&TypedContainer<I>> {
        self.containers
            .iter()
            .find(|(name, _)| name == role)
            .map(|(_, c)| c)
    }

    /// Attach a container under a role name.
    ///
    /// A size-limited container is immediately rescaled to the room's
    /// current floor space rather than keeping its construction-time limit.
    pub fn assign_container(
        &mut self,
        role: &str,
        mut container: TypedContainer<I>,
    ) -> Result<(), GenError> {
        if container.has_size_limit() {
            container
                .set_size_limit(Some(self.floor_space))
                .map_err(|_| GenError::FloorSpaceTooSmall {
                    role: role.to_string(),
                    requested: self.floor_space,
                })?;
        }
        self.containers.push((role.to_string(), container));
        Ok(())
    }

    /// Add an item to the first container whose `can_fit` accepts it.
    ///
    /// The chosen container's `add` failure (a capacity violation) is
    /// propagated rather than trying later containers: `can_fit` encodes
    /// which role an item belongs to, and spilling into another role would
    /// misfile it.
    pub fn assign_to_container(&mut self, item: I) -> Result<(), GenError> {
        for (_, container) in &mut self.containers {
            if container.can_fit(&item) {
                return container.add(item);
            }
        }
        Err(GenError::NoContainerFit)
    }

    /// Set the floor space and cascade the new capacity to every
    /// size-limited container.
    ///
    /// Fails (before touching anything) if a container already holds more
    /// items than the new capacity.
    pub fn set_floor_space(&mut self, floor_space: usize) -> Result<(), GenError> {
        for (role, container) in &self.containers {
            if container.has_size_limit() && container.len() > floor_space {
                return Err(GenError::FloorSpaceTooSmall {
                    role: role.clone(),
                    requested: floor_space,
                });
            }
        }
        self.floor_space = floor_space;
        for (_, container) in &mut self.containers {
            if container.has_size_limit() {
                // Cannot fail: occupancy was checked above.
                let _ = container.set_size_limit(Some(floor_space));
            }
        }
        Ok(())
    }

    /// Recompute floor space from the region's area and cascade it.
    pub fn recompute_floor_space(&mut self) -> Result<(), GenError> {
        self.set_floor_space(self.region.area())
    }

    /// The perimeter cell a corridor should enter through when heading
    /// toward `toward`.
    ///
    /// Picks the wall facing the target (by the larger center offset) and
    /// the non-corner wall cell closest to the target's row or column.
    /// Deterministic, so hall layouts reproduce from the seed alone.
    pub fn find_best_door_position(&self, toward: (usize, usize)) -> (usize, usize) {
        let region = self.region;
        let (cy, cx) = region.center();
        let (ty, tx) = toward;

        let dy = ty as isize - cy as isize;
        let dx = tx as isize - cx as isize;

        // Clamp a coordinate to the wall run excluding its corners.
        let clamp = |v: usize, lo: usize, hi: usize| -> usize {
            if hi <= lo + 1 {
                // Degenerate wall: no non-corner cells, settle for the middle.
                (lo + hi) / 2
            } else {
                v.clamp(lo + 1, hi - 1)
            }
        };

        if dx.abs() > dy.abs() {
            let x = if dx > 0 { region.right() } else { region.x };
            (clamp(ty, region.y, region.bottom()), x)
        } else {
            let y = if dy > 0 { region.bottom() } else { region.y };
            (y, clamp(tx, region.x, region.right()))
        }
    }
}
