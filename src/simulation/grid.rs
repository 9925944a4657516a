//! Builders for test and demo networks.

use rand::Rng;

use super::error::SimResult;
use super::world::SimWorld;

/// First id handed out to grid roads
pub const GRID_ROAD_ID_BASE: u32 = 1000;

/// Padding added to every grid coordinate
const GRID_OFFSET: f64 = 50.0;

/// A rows x cols lattice of intersections joined by two-way streets
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub rows: u32,
    pub cols: u32,
    pub block_size: f64,
    pub speed_limit: f64,
    pub capacity: u32,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            rows: 4,
            cols: 4,
            block_size: 200.0,
            speed_limit: 15.0,
            capacity: 10,
        }
    }
}

impl GridLayout {
    pub fn intersection_count(&self) -> u32 {
        self.rows * self.cols
    }

    /// Intersection `r * cols + c` sits at column `c`, row `r`. Each
    /// neighbouring pair gets one road in each direction, east and south
    /// links first, numbered from [`GRID_ROAD_ID_BASE`].
    pub fn build(&self, world: &mut SimWorld) -> SimResult<()> {
        for row in 0..self.rows {
            for col in 0..self.cols {
                world.add_intersection(
                    row * self.cols + col,
                    col as f64 * self.block_size + GRID_OFFSET,
                    row as f64 * self.block_size + GRID_OFFSET,
                )?;
            }
        }

        let mut next_road = GRID_ROAD_ID_BASE;
        let mut two_way = |world: &mut SimWorld, a: u32, b: u32| -> SimResult<()> {
            world.add_road_with_capacity(
                next_road,
                a,
                b,
                self.block_size,
                self.speed_limit,
                self.capacity,
            )?;
            world.add_road_with_capacity(
                next_road + 1,
                b,
                a,
                self.block_size,
                self.speed_limit,
                self.capacity,
            )?;
            next_road += 2;
            Ok(())
        };

        for row in 0..self.rows {
            for col in 0..self.cols {
                let current = row * self.cols + col;
                if col + 1 < self.cols {
                    two_way(world, current, current + 1)?;
                }
                if row + 1 < self.rows {
                    two_way(world, current, current + self.cols)?;
                }
            }
        }
        Ok(())
    }
}

/// Spawn vehicles `1..=count` between random distinct intersections `0..nodes`.
///
/// Each vehicle is an emergency vehicle with probability `emergency_ratio` and
/// enters at a whole second drawn from `[0, spawn_window)`.
pub fn spawn_random_fleet<R: Rng>(
    world: &mut SimWorld,
    rng: &mut R,
    nodes: u32,
    count: u32,
    emergency_ratio: f64,
    spawn_window: u32,
) -> SimResult<()> {
    if nodes < 2 {
        return Ok(());
    }

    for id in 1..=count {
        let start = rng.random_range(0..nodes);
        let mut destination = rng.random_range(0..nodes);
        while destination == start {
            destination = rng.random_range(0..nodes);
        }
        let is_emergency = rng.random_bool(emergency_ratio.clamp(0.0, 1.0));
        let spawn_time = if spawn_window > 0 {
            rng.random_range(0..spawn_window) as f64
        } else {
            0.0
        };
        world.spawn_vehicle(id, start, destination, is_emergency, spawn_time)?;
    }
    Ok(())
}
