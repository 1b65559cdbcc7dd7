//! Dropping game objects onto empty cells.
//!
//! The search is two-phase: a handful of independent random probes, then a
//! deterministic toroidal scan of the whole region. The scan advances the
//! column every step and the row only when the column wraps, so it visits
//! every cell exactly once before returning to its starting point; a full
//! region terminates instead of spinning.

use crate::GameRng;
use crate::errors::GenError;
use crate::r#gen::region::Region;
use crate::r#gen::room::Room;
use crate::grid::Grid;

/// Independent random probes before the exhaustive scan takes over.
pub const RANDOM_TRIES: usize = 10;

/// Find a cell inside `region` whose value is one of `empty`.
///
/// Consumes a fixed number of RNG draws when the random phase misses: the
/// probes, one draw for the scan orientation, and two for the scan start.
pub fn find_location<T: Clone + PartialEq>(
    grid: &Grid<T>,
    region: Region,
    empty: &[T],
    rng: &mut GameRng,
) -> Option<(usize, usize)> {
    if region.height == 0 || region.width == 0 {
        return None;
    }

    for _ in 0..RANDOM_TRIES {
        let y = region.y + rng.rn2(region.height as u32) as usize;
        let x = region.x + rng.rn2(region.width as u32) as usize;
        if empty.contains(grid.get(y, x)) {
            return Some((y, x));
        }
    }

    // Fix one of the four diagonal step/row-advance orientations, then
    // walk the region toroidally from one more random cell.
    let (dy, dx): (isize, isize) = match rng.rn2(4) {
        0 => (1, 1),
        1 => (1, -1),
        2 => (-1, 1),
        _ => (-1, -1),
    };
    let sy = region.y + rng.rn2(region.height as u32) as usize;
    let sx = region.x + rng.rn2(region.width as u32) as usize;

    let (mut y, mut x) = (sy, sx);
    loop {
        if empty.contains(grid.get(y, x)) {
            return Some((y, x));
        }
        (y, x) = advance(region, y, x, dy, dx);
        if (y, x) == (sy, sx) {
            return None;
        }
    }
}

/// One toroidal step: move the column, wrap into the next row on overflow.
fn advance(region: Region, y: usize, x: usize, dy: isize, dx: isize) -> (usize, usize) {
    let (x, wrapped) = if dx > 0 {
        if x == region.right() {
            (region.x, true)
        } else {
            (x + 1, false)
        }
    } else if x == region.x {
        (region.right(), true)
    } else {
        (x - 1, false)
    };

    let y = if !wrapped {
        y
    } else if dy > 0 {
        if y == region.bottom() { region.y } else { y + 1 }
    } else if y == region.y {
        region.bottom()
    } else {
        y - 1
    };

    (y, x)
}

/// Find an empty cell and write `value` there.
///
/// Exhaustion is a hard failure: leaving the object unplaced would corrupt
/// whatever bookkeeping the caller has already done for it.
pub fn place_it<T: Clone + PartialEq>(
    grid: &mut Grid<T>,
    region: Region,
    empty: &[T],
    value: T,
    rng: &mut GameRng,
) -> Result<(usize, usize), GenError> {
    let (y, x) = find_location(grid, region, empty, rng).ok_or(GenError::RegionExhausted {
        y: region.y,
        x: region.x,
        height: region.height,
        width: region.width,
    })?;
    grid.set(y, x, value);
    Ok((y, x))
}

/// Register `item` in the room's containers and write `cell` at a found
/// empty location.
///
/// The room must already be dug; the item is registered before the grid
/// write, and the written value is defensively copied.
pub fn place_thing<T: Clone + PartialEq, I>(
    grid: &mut Grid<T>,
    room: &mut Room<I>,
    empty: &[T],
    item: I,
    cell: &T,
    rng: &mut GameRng,
) -> Result<(usize, usize), GenError> {
    let region = room.region();
    if !room.dug() {
        return Err(GenError::RoomNotDug {
            y: region.y,
            x: region.x,
        });
    }
    let (y, x) = find_location(grid, region, empty, rng).ok_or(GenError::RegionExhausted {
        y: region.y,
        x: region.x,
        height: region.height,
        width: region.width,
    })?;
    room.assign_to_container(item)?;
    grid.set_copy(y, x, cell);
    Ok((y, x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_find_location_random_hit() {
        let grid = Grid::new(10, 10, '.');
        let region = Region::new(0, 0, 10, 10);
        let mut rng = GameRng::new(1);
        // Everything is empty: the first probe hits.
        let (y, x) = find_location(&grid, region, &['.'], &mut rng).unwrap();
        assert!(region.contains(y, x));
    }

    #[test]
    fn test_find_location_full_region() {
        let grid = Grid::new(6, 7, '#');
        let region = Region::new(1, 1, 4, 5);
        for seed in 0..20 {
            let mut rng = GameRng::new(seed);
            assert_eq!(find_location(&grid, region, &['.'], &mut rng), None);
        }
    }

    #[test]
    fn test_find_location_single_empty_cell() {
        let mut grid = Grid::new(8, 8, '#');
        grid.set(5, 2, '.');
        let region = Region::new(0, 0, 8, 8);
        // The scan must find the lone empty cell whatever its orientation
        // and starting point.
        for seed in 0..20 {
            let mut rng = GameRng::new(seed);
            assert_eq!(
                find_location(&grid, region, &['.'], &mut rng),
                Some((5, 2))
            );
        }
    }

    #[test]
    fn test_find_location_subregion_only() {
        let mut grid = Grid::new(10, 10, '#');
        grid.set(0, 0, '.'); // outside the searched region
        let region = Region::new(4, 4, 3, 3);
        let mut rng = GameRng::new(9);
        assert_eq!(find_location(&grid, region, &['.'], &mut rng), None);
    }

    #[test]
    fn test_place_it_writes() {
        let mut grid = Grid::new(4, 4, '.');
        let region = Region::new(0, 0, 4, 4);
        let mut rng = GameRng::new(2);
        let (y, x) = place_it(&mut grid, region, &['.'], '$', &mut rng).unwrap();
        assert_eq!(*grid.get(y, x), '$');
    }

    #[test]
    fn test_place_it_exhausted_is_hard_failure() {
        let mut grid = Grid::new(3, 3, '#');
        let region = Region::new(0, 0, 3, 3);
        let mut rng = GameRng::new(2);
        let err = place_it(&mut grid, region, &['.'], '$', &mut rng).unwrap_err();
        assert!(matches!(err, GenError::RegionExhausted { .. }));
    }

    #[test]
    fn test_place_thing_requires_dug_room() {
        let mut grid = Grid::new(8, 8, '.');
        let mut room: Room<u32> = Room::new(Region::new(1, 1, 5, 5));
        let mut rng = GameRng::new(3);

        let err = place_thing(&mut grid, &mut room, &['.'], 7u32, &'M', &mut rng).unwrap_err();
        assert_eq!(err, GenError::RoomNotDug { y: 1, x: 1 });
    }

    #[test]
    fn test_place_thing_registers_and_writes() {
        use crate::r#gen::container::TypedContainer;

        let mut grid = Grid::new(8, 8, '.');
        let mut room: Room<u32> = Room::new(Region::new(1, 1, 5, 5));
        room.assign_container("simple", TypedContainer::new(None, None))
            .unwrap();
        room.mark_dug();
        let mut rng = GameRng::new(3);

        let (y, x) = place_thing(&mut grid, &mut room, &['.'], 7u32, &'M', &mut rng).unwrap();
        assert_eq!(*grid.get(y, x), 'M');
        assert_eq!(room.container("simple").unwrap().items(), &[7]);
    }

    #[test]
    fn test_place_thing_propagates_container_rejection() {
        use crate::r#gen::container::{TypedContainer, Verifier};

        fn nothing(_: &u32) -> bool {
            false
        }

        let mut grid = Grid::new(8, 8, '.');
        let mut room: Room<u32> = Room::new(Region::new(1, 1, 5, 5));
        room.assign_container(
            "simple",
            TypedContainer::new(Some(nothing as Verifier<u32>), None),
        )
        .unwrap();
        room.mark_dug();
        let mut rng = GameRng::new(3);

        let err = place_thing(&mut grid, &mut room, &['.'], 7u32, &'M', &mut rng).unwrap_err();
        assert_eq!(err, GenError::NoContainerFit);
    }

    proptest! {
        #[test]
        fn prop_full_region_terminates_with_not_found(
            height in 1usize..12,
            width in 1usize..12,
            seed in any::<u64>(),
        ) {
            let grid = Grid::new(height, width, '#');
            let region = Region::new(0, 0, height, width);
            let mut rng = GameRng::new(seed);
            prop_assert_eq!(find_location(&grid, region, &['.'], &mut rng), None);
        }

        #[test]
        fn prop_lone_empty_cell_is_always_found(
            height in 2usize..10,
            width in 2usize..10,
            ey in 0usize..10,
            ex in 0usize..10,
            seed in any::<u64>(),
        ) {
            let (ey, ex) = (ey % height, ex % width);
            let mut grid = Grid::new(height, width, '#');
            grid.set(ey, ex, '.');
            let region = Region::new(0, 0, height, width);
            let mut rng = GameRng::new(seed);
            prop_assert_eq!(
                find_location(&grid, region, &['.'], &mut rng),
                Some((ey, ex))
            );
        }
    }
}
