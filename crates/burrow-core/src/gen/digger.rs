//! Carving rooms, corridors, and doors into the grid.
//!
//! All carving goes through the cell config: the digger reads a cell,
//! decides what role it currently plays, and writes the value of the role
//! it should play next. Overlaps with already-built structure are not
//! errors; they are reported as "intrusions" and double as the
//! connectivity signal between independently dug rooms and halls.

use crate::GameRng;
use crate::errors::GenError;
use crate::r#gen::bsp::{BspTree, NodeId};
use crate::r#gen::cell::{CellConfig, CellRole};
use crate::r#gen::factory::RoomFactory;
use crate::r#gen::region::{EdgeRun, Region, Side};
use crate::r#gen::room::Room;
use crate::grid::Grid;

/// Transient cursor state for one carve pass. Discarded after each call.
#[derive(Debug, Clone, Copy, Default)]
pub struct CarveState {
    pub y: usize,
    pub x: usize,
    pub dy: isize,
    pub dx: isize,
    /// The previous cell ended as a door or open floor.
    pub last_was_opening: bool,
    /// Door created at the previous cell, if it is still a door.
    pub last_door: Option<(usize, usize)>,
}

/// What kind of floor the cell ahead holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FloorKind {
    Room,
    Hall,
}

/// Carves map structure using a fixed cell configuration.
#[derive(Debug, Clone)]
pub struct Digger<T> {
    config: CellConfig<T>,
}

impl<T: Clone + PartialEq> Digger<T> {
    pub fn new(config: CellConfig<T>) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CellConfig<T> {
        &self.config
    }

    /// Attach one room per BSP leaf.
    ///
    /// With `approximate` set, rooms shrink toward that parts-per-1000
    /// fraction of their leaf; otherwise they fill the leaf exactly.
    pub fn create_rooms<I>(
        &self,
        bsp: &mut BspTree<I>,
        factory: &RoomFactory<I>,
        approximate: Option<usize>,
        rng: &mut GameRng,
    ) -> Result<(), GenError> {
        for id in bsp.leaves() {
            let region = bsp.node(id).region;
            let room = match approximate {
                Some(per) => factory.create_approximate_room(region, per, rng)?,
                None => factory.create_room(region)?,
            };
            bsp.attach_room(id, room);
        }
        Ok(())
    }

    /// Carve a room: floor (or patterned floor/wall) on the interior,
    /// walls with corner pieces on the perimeter, doors where pre-existing
    /// structure crosses the perimeter.
    ///
    /// Marks the room dug, records discovered doors, and returns whether
    /// the carve intruded on already-built cells.
    pub fn dig_room<I>(
        &self,
        grid: &mut Grid<T>,
        room: &mut Room<I>,
        pattern: Option<&[bool]>,
    ) -> Result<bool, GenError> {
        let (intrusion, doors) = self.dig_room_region(grid, room.region(), pattern)?;
        for (y, x) in doors {
            room.add_door(y, x);
        }
        room.mark_dug();
        Ok(intrusion)
    }

    /// Carve a region like a room but without any room bookkeeping.
    /// Used for BSP leaves that act as plain junction boxes.
    pub fn dig_box(&self, grid: &mut Grid<T>, region: Region) -> Result<bool, GenError> {
        self.dig_room_region(grid, region, None)
            .map(|(intrusion, _)| intrusion)
    }

    fn dig_room_region(
        &self,
        grid: &mut Grid<T>,
        region: Region,
        pattern: Option<&[bool]>,
    ) -> Result<(bool, Vec<(usize, usize)>), GenError> {
        let mut intrusion = false;
        let room_floor = self.config.require(CellRole::RoomFloor)?.clone();

        for (y, x, inside) in region.inside(pattern) {
            let cur = grid.get(y, x).clone();
            if self
                .config
                .is_any_role(&cur, &[CellRole::Diggable, CellRole::HallWall])
            {
                let role = if inside {
                    CellRole::RoomFloor
                } else {
                    CellRole::RoomWall
                };
                let value = self.config.require(role)?.clone();
                grid.set(y, x, value);
            } else if self
                .config
                .is_any_role(&cur, &[CellRole::RoomWall, CellRole::HallFloor])
            {
                // Something was built here before this room existed.
                grid.set(y, x, room_floor.clone());
                intrusion = true;
            }
            // Cells already carved as this room's floor stay untouched,
            // which makes a repeat pass a no-op on the interior.
        }

        let mut doors: Vec<(usize, usize)> = Vec::new();
        let mut state = CarveState::default();

        for run in region.edge_runs() {
            let count = run.cells.len();
            for (i, &(y, x)) in run.cells.iter().enumerate() {
                let cur = grid.get(y, x).clone();
                let opening = self.config.is_any_role(
                    &cur,
                    &[
                        CellRole::RoomFloor,
                        CellRole::HallFloor,
                        CellRole::RoomDoor,
                        CellRole::HallDoor,
                    ],
                );
                if opening {
                    // A corridor (or earlier room) crossed this wall line.
                    intrusion = true;
                    if state.last_was_opening {
                        // Adjacent openings collapse to plain floor; the
                        // door discovered one step earlier is demoted too,
                        // so a single crossing never yields double doors.
                        grid.set(y, x, room_floor.clone());
                        if let Some((py, px)) = state.last_door.take() {
                            grid.set(py, px, room_floor.clone());
                            doors.retain(|&d| d != (py, px));
                        }
                    } else {
                        let door = self.config.require(CellRole::RoomDoor)?.clone();
                        grid.set(y, x, door);
                        doors.push((y, x));
                        state.last_door = Some((y, x));
                    }
                    state.last_was_opening = true;
                } else {
                    let value = self.config.require(wall_role(&run, i, count))?.clone();
                    grid.set(y, x, value);
                    state.last_was_opening = false;
                    state.last_door = None;
                }
                state.y = y;
                state.x = x;
            }
        }

        Ok((intrusion, doors))
    }

    /// Carve one straight hall segment, cell by cell along the dominant
    /// axis.
    ///
    /// A floor cell just ahead promotes the current cell to the matching
    /// door type. Carving across an existing hall wall opens it as a hall
    /// door, except at the segment endpoints, which are assumed to sit
    /// inside rooms and open as plain room floor. The two cells flanking
    /// the carved cell are normalized from raw rock into hall walls so
    /// corridors never run naked; that cleanup is skipped entirely when
    /// "hall:wall" and "diggable" map to the same concrete value.
    ///
    /// Returns whether the segment merged with pre-existing structure.
    /// `cursor`, if given, is updated to the final cell reached.
    pub fn dig_line(
        &self,
        grid: &mut Grid<T>,
        ya: usize,
        xa: usize,
        yb: usize,
        xb: usize,
        mut cursor: Option<&mut CarveState>,
    ) -> Result<bool, GenError> {
        let dy_total = yb as isize - ya as isize;
        let dx_total = xb as isize - xa as isize;
        let (sy, sx, steps) = if dy_total.abs() >= dx_total.abs() {
            (dy_total.signum(), 0isize, dy_total.unsigned_abs())
        } else {
            (0isize, dx_total.signum(), dx_total.unsigned_abs())
        };

        let hall_floor = self.config.require(CellRole::HallFloor)?.clone();
        let normalize_flanks = !self
            .config
            .roles_coincide(CellRole::HallWall, CellRole::Diggable);

        let mut intrusion = false;
        let mut door_here = false;
        let mut y = ya as isize;
        let mut x = xa as isize;

        for i in 0..=steps {
            let endpoint = i == 0 || i == steps;
            let (uy, ux) = (y as usize, x as usize);
            let cur = grid.get(uy, ux).clone();
            let ahead = self.floor_kind_at(grid, y + sy, x + sx);
            door_here = false;

            if self.config.is_role(&cur, CellRole::Diggable) {
                match ahead {
                    Some(kind) => {
                        let role = match kind {
                            FloorKind::Room => CellRole::RoomDoor,
                            FloorKind::Hall => CellRole::HallDoor,
                        };
                        let value = self.config.require(role)?.clone();
                        grid.set(uy, ux, value);
                        intrusion = true;
                        door_here = true;
                    }
                    None => grid.set(uy, ux, hall_floor.clone()),
                }
            } else if self.config.is_role(&cur, CellRole::HallWall) {
                match ahead {
                    Some(_) if endpoint => {
                        // The corridor mouth is already inside a room; no
                        // door at the very start or end.
                        let value = self.config.require(CellRole::RoomFloor)?.clone();
                        grid.set(uy, ux, value);
                        intrusion = true;
                    }
                    Some(_) => {
                        let value = self.config.require(CellRole::HallDoor)?.clone();
                        grid.set(uy, ux, value);
                        intrusion = true;
                        door_here = true;
                    }
                    None => grid.set(uy, ux, hall_floor.clone()),
                }
            } else {
                // Unexpected pre-existing structure: leave it alone but
                // report the merge.
                intrusion = true;
            }

            if normalize_flanks {
                for (oy, ox) in [(sx, sy), (-sx, -sy)] {
                    let (ay, ax) = (y + oy, x + ox);
                    let Some(side) = grid.try_get(ay, ax) else {
                        continue;
                    };
                    let side = side.clone();
                    if self
                        .config
                        .is_any_role(&side, &[CellRole::Diggable, CellRole::HallWall])
                    {
                        let forward_is_room = grid
                            .try_get(ay + sy, ax + sx)
                            .is_some_and(|v| self.config.is_role(v, CellRole::RoomFloor));
                        let role = if forward_is_room {
                            // The flank brushes a room mouth: open it, as a
                            // door unless the main cell already became one.
                            if door_here {
                                CellRole::RoomFloor
                            } else {
                                CellRole::RoomDoor
                            }
                        } else {
                            CellRole::HallWall
                        };
                        let value = self.config.require(role)?.clone();
                        grid.set(ay as usize, ax as usize, value);
                    }
                }
            }

            y += sy;
            x += sx;
        }

        if let Some(state) = cursor.as_deref_mut() {
            state.y = (ya as isize + sy * steps as isize) as usize;
            state.x = (xa as isize + sx * steps as isize) as usize;
            state.dy = sy;
            state.dx = sx;
            state.last_was_opening = door_here;
            state.last_door = if door_here {
                Some((state.y, state.x))
            } else {
                None
            };
        }

        Ok(intrusion)
    }

    /// Connect two points with a straight or Z-shaped hall.
    ///
    /// With `interruptable` set, a crossing segment that merges into
    /// existing floor is re-carved in reverse (cleaning the partial
    /// overlap from the far side) and the corridor is not finished: the
    /// structure it merged with already provides the connection.
    pub fn tunnel(
        &self,
        grid: &mut Grid<T>,
        a: (usize, usize),
        b: (usize, usize),
        interruptable: bool,
        rng: &mut GameRng,
    ) -> Result<bool, GenError> {
        let (ya, xa) = a;
        let (yb, xb) = b;
        if ya == yb || xa == xb {
            return self.dig_line(grid, ya, xa, yb, xb, None);
        }

        // Each segment starts one cell past the junction the previous
        // segment ended on, so a tunnel never reads its own fresh floor as
        // a merge.
        let mut intrusion = false;
        if rng.one_in(2) {
            // Bisect on the Y offset: vertical half-step, horizontal full
            // step, remaining vertical half-step.
            let ym = (ya + yb) / 2;
            let x1 = step_toward(xa, xb);
            intrusion |= self.dig_line(grid, ya, xa, ym, xa, None)?;
            let merged = self.dig_line(grid, ym, x1, ym, xb, None)?;
            if merged && interruptable {
                self.dig_line(grid, ym, xb, ym, x1, None)?;
                return Ok(true);
            }
            intrusion |= merged;
            if ym != yb {
                let y2 = step_toward(ym, yb);
                intrusion |= self.dig_line(grid, y2, xb, yb, xb, None)?;
            }
        } else {
            // Bisect on the X offset.
            let xm = (xa + xb) / 2;
            let y1 = step_toward(ya, yb);
            intrusion |= self.dig_line(grid, ya, xa, ya, xm, None)?;
            let merged = self.dig_line(grid, y1, xm, yb, xm, None)?;
            if merged && interruptable {
                self.dig_line(grid, yb, xm, y1, xm, None)?;
                return Ok(true);
            }
            intrusion |= merged;
            if xm != xb {
                let x2 = step_toward(xm, xb);
                intrusion |= self.dig_line(grid, yb, x2, yb, xb, None)?;
            }
        }
        Ok(intrusion)
    }

    /// Z-shaped hall that never merges with existing floor.
    ///
    /// Only raw rock and hall walls are carved; room cells are never
    /// touched. Used after rooms are already dug, where corridors are
    /// expected to run through blank rock.
    pub fn avoidance_hall(
        &self,
        grid: &mut Grid<T>,
        a: (usize, usize),
        b: (usize, usize),
        rng: &mut GameRng,
    ) -> Result<(), GenError> {
        let (ya, xa) = a;
        let (yb, xb) = b;
        if ya == yb || xa == xb {
            return self.avoidance_line(grid, ya, xa, yb, xb);
        }
        if rng.one_in(2) {
            let ym = (ya + yb) / 2;
            self.avoidance_line(grid, ya, xa, ym, xa)?;
            self.avoidance_line(grid, ym, xa, ym, xb)?;
            self.avoidance_line(grid, ym, xb, yb, xb)?;
        } else {
            let xm = (xa + xb) / 2;
            self.avoidance_line(grid, ya, xa, ya, xm)?;
            self.avoidance_line(grid, ya, xm, yb, xm)?;
            self.avoidance_line(grid, yb, xm, yb, xb)?;
        }
        Ok(())
    }

    fn avoidance_line(
        &self,
        grid: &mut Grid<T>,
        ya: usize,
        xa: usize,
        yb: usize,
        xb: usize,
    ) -> Result<(), GenError> {
        let dy_total = yb as isize - ya as isize;
        let dx_total = xb as isize - xa as isize;
        let (sy, sx, steps) = if dy_total.abs() >= dx_total.abs() {
            (dy_total.signum(), 0isize, dy_total.unsigned_abs())
        } else {
            (0isize, dx_total.signum(), dx_total.unsigned_abs())
        };

        let hall_floor = self.config.require(CellRole::HallFloor)?.clone();
        let hall_wall = self.config.require(CellRole::HallWall)?.clone();

        let mut y = ya as isize;
        let mut x = xa as isize;
        for _ in 0..=steps {
            let (uy, ux) = (y as usize, x as usize);
            let cur = grid.get(uy, ux).clone();
            if self
                .config
                .is_any_role(&cur, &[CellRole::Diggable, CellRole::HallWall])
            {
                grid.set(uy, ux, hall_floor.clone());
            }
            for (oy, ox) in [(sx, sy), (-sx, -sy)] {
                let (ay, ax) = (y + oy, x + ox);
                if let Some(side) = grid.try_get(ay, ax)
                    && self.config.is_role(side, CellRole::Diggable)
                {
                    grid.set(ay as usize, ax as usize, hall_wall.clone());
                }
            }
            y += sy;
            x += sx;
        }
        Ok(())
    }

    /// Hall-first generation: chain every leaf center with tunnels in
    /// traversal order, close the loop through the root center, then dig
    /// the leaves on top — rooms where attached, plain boxes for un-roomed
    /// junction leaves. Carving over the existing halls is what grows the
    /// doors: every crossing of a leaf boundary becomes one.
    pub fn dig_hall_first<I>(
        &self,
        bsp: &mut BspTree<I>,
        grid: &mut Grid<T>,
        interruptable: bool,
        rng: &mut GameRng,
    ) -> Result<(), GenError> {
        let leaves = bsp.leaves();
        let mut prev: Option<(usize, usize)> = None;

        for &id in &leaves {
            let center = bsp.node(id).region.center();
            if let Some(p) = prev {
                self.tunnel(grid, p, center, interruptable, rng)?;
            }
            prev = Some(center);
        }

        if let Some(p) = prev {
            self.tunnel(grid, p, bsp.root_region().center(), interruptable, rng)?;
        }

        for &id in &leaves {
            let region = bsp.node(id).region;
            match bsp.room_mut(id) {
                Some(room) => {
                    self.dig_room(grid, room, None)?;
                }
                None => {
                    self.dig_box(grid, region)?;
                }
            }
        }
        Ok(())
    }

    /// Room-first generation: dig every room, then connect each room's
    /// best door position to the previous room's with avoidance halls,
    /// closing the loop from the last room back to the first.
    pub fn dig_room_avoidance_halls<I>(
        &self,
        bsp: &mut BspTree<I>,
        grid: &mut Grid<T>,
        rng: &mut GameRng,
    ) -> Result<(), GenError> {
        let roomed: Vec<NodeId> = bsp
            .leaves()
            .into_iter()
            .filter(|&id| bsp.room(id).is_some())
            .collect();

        for &id in &roomed {
            if let Some(room) = bsp.room_mut(id) {
                self.dig_room(grid, room, None)?;
            }
        }

        if roomed.len() < 2 {
            return Ok(());
        }
        for i in 1..roomed.len() {
            self.connect_rooms(bsp, grid, roomed[i], roomed[i - 1], rng)?;
        }
        self.connect_rooms(bsp, grid, roomed[roomed.len() - 1], roomed[0], rng)?;
        Ok(())
    }

    /// Open a door in each room facing the other and run an avoidance
    /// hall between the cells just outside the two doors.
    fn connect_rooms<I>(
        &self,
        bsp: &mut BspTree<I>,
        grid: &mut Grid<T>,
        a: NodeId,
        b: NodeId,
        rng: &mut GameRng,
    ) -> Result<(), GenError> {
        let region_a = bsp.node(a).region;
        let region_b = bsp.node(b).region;

        let door_a = match bsp.room(a) {
            Some(room) => room.find_best_door_position(region_b.center()),
            None => return Ok(()),
        };
        let door_b = match bsp.room(b) {
            Some(room) => room.find_best_door_position(region_a.center()),
            None => return Ok(()),
        };

        let door = self.config.require(CellRole::RoomDoor)?.clone();
        for (id, (y, x)) in [(a, door_a), (b, door_b)] {
            grid.set(y, x, door.clone());
            if let Some(room) = bsp.room_mut(id) {
                room.add_door(y, x);
            }
        }

        let start = door_exit(grid, bsp.room(a).map(|r| r.region()), door_a).unwrap_or(door_a);
        let end = door_exit(grid, bsp.room(b).map(|r| r.region()), door_b).unwrap_or(door_b);
        self.avoidance_hall(grid, start, end, rng)
    }

    fn floor_kind_at(&self, grid: &Grid<T>, y: isize, x: isize) -> Option<FloorKind> {
        let value = grid.try_get(y, x)?;
        if self.config.is_role(value, CellRole::RoomFloor) {
            Some(FloorKind::Room)
        } else if self.config.is_role(value, CellRole::HallFloor) {
            Some(FloorKind::Hall)
        } else {
            None
        }
    }
}

/// Wall role for one perimeter cell: corner pieces at run endpoints that
/// coincide with rectangle corners, side pieces everywhere else.
fn wall_role(run: &EdgeRun, i: usize, count: usize) -> CellRole {
    let first = i == 0 && run.corner_start;
    let last = i + 1 == count && run.corner_end;
    if first && last {
        // Single-cell degenerate run.
        return CellRole::RoomWallCorner;
    }
    match run.side {
        Side::Top => {
            if first {
                CellRole::RoomWallTopLeft
            } else if last {
                CellRole::RoomWallTopRight
            } else {
                CellRole::RoomWallTop
            }
        }
        // Walked right to left.
        Side::Bottom => {
            if first {
                CellRole::RoomWallBottomRight
            } else if last {
                CellRole::RoomWallBottomLeft
            } else {
                CellRole::RoomWallBottom
            }
        }
        Side::Right => CellRole::RoomWallRight,
        // A full rectangle's left run carries no corner flags; a 1-wide
        // region collapses to one top-to-bottom Left run that does.
        Side::Left => {
            if first {
                CellRole::RoomWallTopLeft
            } else if last {
                CellRole::RoomWallBottomLeft
            } else {
                CellRole::RoomWallLeft
            }
        }
    }
}

/// One grid step from `from` toward `to`.
fn step_toward(from: usize, to: usize) -> usize {
    match to.cmp(&from) {
        std::cmp::Ordering::Greater => from + 1,
        std::cmp::Ordering::Less => from - 1,
        std::cmp::Ordering::Equal => from,
    }
}

/// The cell just outside a door, stepping through the wall it sits on.
/// None when the door faces the edge of the grid.
fn door_exit<T: Clone>(
    grid: &Grid<T>,
    region: Option<Region>,
    door: (usize, usize),
) -> Option<(usize, usize)> {
    let region = region?;
    let (y, x) = door;
    let (dy, dx) = if x == region.right() {
        (0isize, 1isize)
    } else if x == region.x {
        (0, -1)
    } else if y == region.y {
        (-1, 0)
    } else {
        (1, 0)
    };
    let (ey, ex) = (y as isize + dy, x as isize + dx);
    grid.contains(ey, ex).then(|| (ey as usize, ex as usize))
}
