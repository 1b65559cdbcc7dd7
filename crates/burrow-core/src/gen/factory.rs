//! Room construction for BSP leaves.
//!
//! A factory is configured once with the content roles its rooms carry and
//! then stamps out one room per leaf, either at the leaf's exact bounds or
//! shrunk-and-jittered inside them.

use crate::GameRng;
use crate::errors::GenError;
use crate::r#gen::container::{TypedContainer, Verifier};
use crate::r#gen::region::Region;
use crate::r#gen::room::Room;

/// Rooms never shrink below this side length (walls included).
pub const MIN_ROOM_SIDE: usize = 3;

/// `per` arguments to [`RoomFactory::create_approximate_room`] are
/// parts-per-1000 of the original dimensions.
pub const PER_SCALE: usize = 1000;

#[derive(Debug, Clone)]
struct RoleSpec<I> {
    name: &'static str,
    verifier: Option<Verifier<I>>,
    unlimited: bool,
}

/// Builds rooms with a fixed set of content roles.
#[derive(Debug, Clone)]
pub struct RoomFactory<I> {
    roles: Vec<RoleSpec<I>>,
}

impl<I> RoomFactory<I> {
    /// Rooms with a single "simple" content container.
    pub fn simple(verifier: Option<Verifier<I>>) -> Self {
        Self {
            roles: vec![RoleSpec {
                name: "simple",
                verifier,
                unlimited: false,
            }],
        }
    }

    /// Rooms with "large" and "small" containers.
    ///
    /// With `piles` set, the "small" container is left uncapped so several
    /// small items may share a cell.
    pub fn large_small(
        large: Option<Verifier<I>>,
        small: Option<Verifier<I>>,
        piles: bool,
    ) -> Self {
        Self {
            roles: vec![
                RoleSpec {
                    name: "large",
                    verifier: large,
                    unlimited: false,
                },
                RoleSpec {
                    name: "small",
                    verifier: small,
                    unlimited: piles,
                },
            ],
        }
    }

    /// Rooms with "terrain", "large" and "small" containers.
    pub fn terrain_large_small(
        terrain: Option<Verifier<I>>,
        large: Option<Verifier<I>>,
        small: Option<Verifier<I>>,
    ) -> Self {
        Self {
            roles: vec![
                RoleSpec {
                    name: "terrain",
                    verifier: terrain,
                    unlimited: false,
                },
                RoleSpec {
                    name: "large",
                    verifier: large,
                    unlimited: false,
                },
                RoleSpec {
                    name: "small",
                    verifier: small,
                    unlimited: false,
                },
            ],
        }
    }

    /// Build a room at `region`'s exact bounds with the configured roles.
    ///
    /// Limited roles start with a capacity of 1, which `assign_container`
    /// immediately rescales to the room's floor space.
    pub fn create_room(&self, region: Region) -> Result<Room<I>, GenError> {
        let mut room = Room::new(region);
        for role in &self.roles {
            let limit = if role.unlimited { None } else { Some(1) };
            room.assign_container(role.name, TypedContainer::new(role.verifier, limit))?;
        }
        Ok(room)
    }

    /// Build a room shrunk toward `per` parts-per-1000 of `region` and
    /// repositioned randomly inside the freed space.
    ///
    /// Each axis is handled independently: when the target size for an
    /// axis would drop below 3 cells, that axis keeps its full size and no
    /// randomness is drawn for it, so the other axis's draws are
    /// unaffected. Draw order is fixed: height shrink, height offset,
    /// width shrink, width offset.
    pub fn create_approximate_room(
        &self,
        region: Region,
        per: usize,
        rng: &mut GameRng,
    ) -> Result<Room<I>, GenError> {
        let (shrink_h, off_y) = shrink_axis(region.height, per, rng);
        let (shrink_w, off_x) = shrink_axis(region.width, per, rng);

        self.create_room(Region::new(
            region.y + off_y,
            region.x + off_x,
            region.height - shrink_h,
            region.width - shrink_w,
        ))
    }
}

/// Random (shrink, offset) for one axis, or (0, 0) without consuming the
/// RNG when the target size would violate the 3-cell floor.
fn shrink_axis(len: usize, per: usize, rng: &mut GameRng) -> (usize, usize) {
    let target = len * per / PER_SCALE;
    if target < MIN_ROOM_SIDE {
        return (0, 0);
    }
    let shrink = rng.rn2((len - target + 1) as u32) as usize;
    let offset = rng.rn2((shrink + 1) as u32) as usize;
    (shrink, offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn anything(_: &u32) -> bool {
        true
    }

    #[test]
    fn test_simple_wiring() {
        let factory: RoomFactory<u32> = RoomFactory::simple(None);
        let room = factory.create_room(Region::new(0, 0, 5, 5)).unwrap();
        let c = room.container("simple").unwrap();
        // Rescaled from the default capacity of 1.
        assert_eq!(c.size_limit(), Some(25));
        assert!(room.container("large").is_none());
    }

    #[test]
    fn test_large_small_wiring() {
        let factory: RoomFactory<u32> =
            RoomFactory::large_small(Some(anything as Verifier<u32>), None, true);
        let room = factory.create_room(Region::new(0, 0, 4, 4)).unwrap();
        assert_eq!(room.container("large").unwrap().size_limit(), Some(16));
        // Piles: small stays uncapped.
        assert_eq!(room.container("small").unwrap().size_limit(), None);
    }

    #[test]
    fn test_terrain_large_small_wiring() {
        let factory: RoomFactory<u32> = RoomFactory::terrain_large_small(None, None, None);
        let room = factory.create_room(Region::new(0, 0, 3, 3)).unwrap();
        for role in ["terrain", "large", "small"] {
            assert_eq!(room.container(role).unwrap().size_limit(), Some(9));
        }
    }

    #[test]
    fn test_exact_bounds() {
        let factory: RoomFactory<u32> = RoomFactory::simple(None);
        let region = Region::new(3, 7, 6, 9);
        let room = factory.create_room(region).unwrap();
        assert_eq!(room.region(), region);
    }

    #[test]
    fn test_approximate_room_small_per_keeps_full_size() {
        // A 10x10 leaf at per=100 targets 1x1, below the 3-cell floor on
        // both axes: no shrink, no RNG consumption.
        let factory: RoomFactory<u32> = RoomFactory::simple(None);
        let mut rng = GameRng::new(1);
        let room = factory
            .create_approximate_room(Region::new(0, 0, 10, 10), 100, &mut rng)
            .unwrap();
        assert_eq!(room.region(), Region::new(0, 0, 10, 10));

        let mut fresh = GameRng::new(1);
        assert_eq!(rng.rn2(1000), fresh.rn2(1000));
    }

    #[test]
    fn test_approximate_room_axes_independent() {
        // Height 3 cannot shrink (target below 3); width 20 can. The width
        // draws must be the first RNG calls.
        let factory: RoomFactory<u32> = RoomFactory::simple(None);
        let region = Region::new(0, 0, 3, 20);

        let mut rng_a = GameRng::new(99);
        let room = factory
            .create_approximate_room(region, 500, &mut rng_a)
            .unwrap();
        assert_eq!(room.region().height, 3);

        let mut rng_b = GameRng::new(99);
        let shrink = rng_b.rn2(11) as usize;
        let offset = rng_b.rn2(shrink as u32 + 1) as usize;
        assert_eq!(room.region().width, 20 - shrink);
        assert_eq!(room.region().x, offset);
    }

    proptest! {
        #[test]
        fn prop_approximate_room_contained_and_at_least_3x3(
            y in 0usize..50,
            x in 0usize..50,
            height in 3usize..30,
            width in 3usize..30,
            per in 1usize..=1000,
            seed in any::<u64>(),
        ) {
            let factory: RoomFactory<u32> = RoomFactory::simple(None);
            let region = Region::new(y, x, height, width);
            let mut rng = GameRng::new(seed);
            let room = factory.create_approximate_room(region, per, &mut rng).unwrap();

            prop_assert!(region.encloses(&room.region()));
            prop_assert!(room.region().height >= 3);
            prop_assert!(room.region().width >= 3);
        }
    }
}
