// 7.0 scoring.rs: where gameweek points come from.
//
// The gameweek trigger is agnostic to whether points are random placeholders or
// come from a real scoring feed. Anything implementing PointsSource can drive it.

use crate::player::Player;
use crate::types::{PeriodId, PlayerId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;

/// Points earned by each player in one period. Players left out score zero.
pub type GameweekPoints = HashMap<PlayerId, u32>;

pub trait PointsSource {
    fn name(&self) -> &str;

    fn points_for(&mut self, period: PeriodId, players: &[&Player]) -> GameweekPoints;
}

/** 7.1: uniform random points, 0..=max per player. placeholder for a real feed */
#[derive(Debug, Clone)]
pub struct RandomPoints {
    rng: StdRng,
    max_points: u32,
}

impl RandomPoints {
    pub const DEFAULT_MAX: u32 = 15;

    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            max_points: Self::DEFAULT_MAX,
        }
    }

    // deterministic runs for tests and the demo binary
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            max_points: Self::DEFAULT_MAX,
        }
    }

    pub fn with_max(mut self, max_points: u32) -> Self {
        self.max_points = max_points;
        self
    }
}

impl Default for RandomPoints {
    fn default() -> Self {
        Self::new()
    }
}

impl PointsSource for RandomPoints {
    fn name(&self) -> &str {
        "random"
    }

    fn points_for(&mut self, _period: PeriodId, players: &[&Player]) -> GameweekPoints {
        players
            .iter()
            .map(|p| (p.id, self.rng.gen_range(0..=self.max_points)))
            .collect()
    }
}

/** 7.2: points supplied up front per period, e.g. parsed from an external feed */
#[derive(Debug, Clone, Default)]
pub struct FixedPoints {
    by_period: HashMap<PeriodId, GameweekPoints>,
}

impl FixedPoints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_period(mut self, period: PeriodId, points: GameweekPoints) -> Self {
        self.by_period.insert(period, points);
        self
    }

    pub fn set(&mut self, period: PeriodId, player: PlayerId, points: u32) {
        self.by_period.entry(period).or_default().insert(player, points);
    }
}

impl PointsSource for FixedPoints {
    fn name(&self) -> &str {
        "fixed"
    }

    fn points_for(&mut self, period: PeriodId, players: &[&Player]) -> GameweekPoints {
        let Some(table) = self.by_period.get(&period) else {
            return GameweekPoints::new();
        };
        players
            .iter()
            .filter_map(|p| table.get(&p.id).map(|pts| (p.id, *pts)))
            .collect()
    }
}
