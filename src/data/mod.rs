pub mod items;
pub mod monsters;

use bracket_random::prelude::RandomNumberGenerator;
use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use crate::error::GameError;

/// Builtin tables carry explicit rows down to this depth; spawning clamps
/// its lookups here so the abyss keeps using the deepest row.
pub const TABLE_MAX_DEPTH: i32 = 30;

/// Kind -> depth -> raw weight (0-100). Only depths with an entry are
/// eligible; the BTreeMap gives `random_choice` its fixed walk order.
#[derive(Clone, Debug, Default)]
pub struct SpawnTable {
    entries: BTreeMap<String, BTreeMap<i32, u32>>,
}

impl SpawnTable {
    pub fn set(&mut self, kind: &str, depth: i32, weight: u32) {
        self.entries
            .entry(kind.to_string())
            .or_default()
            .insert(depth, weight);
    }

    pub fn set_range(&mut self, kind: &str, depths: RangeInclusive<i32>, weight: u32) {
        for depth in depths {
            self.set(kind, depth, weight);
        }
    }

    /// Weights rescaled to sum to roughly 100. Each weight rounds
    /// independently, so the total can drift a point or two; that drift is
    /// accepted, not corrected.
    pub fn depth_chances(&self, depth: i32) -> Vec<(&str, u32)> {
        let raw: Vec<(&str, u32)> = self
            .entries
            .iter()
            .filter_map(|(kind, by_depth)| by_depth.get(&depth).map(|w| (kind.as_str(), *w)))
            .collect();
        let total: u32 = raw.iter().map(|(_, weight)| weight).sum();
        if total == 0 {
            return raw;
        }
        raw.into_iter()
            .map(|(kind, weight)| {
                let scaled = (weight as f32 * 100.0 / total as f32).round() as u32;
                (kind, scaled)
            })
            .collect()
    }

    /// Weighted draw over the kinds eligible at `depth`: a uniform roll in
    /// [0, 100] against the running cumulative total, in enumeration order.
    pub fn random_choice(
        &self,
        depth: i32,
        rng: &mut RandomNumberGenerator,
    ) -> Result<String, GameError> {
        let chances = self.depth_chances(depth);
        if chances.is_empty() {
            return Err(GameError::EmptyCandidateSet { depth });
        }
        let roll = rng.range(0, 101) as u32;
        let mut running = 0;
        for (kind, weight) in &chances {
            running += weight;
            if running >= roll {
                return Ok((*kind).to_string());
            }
        }
        // Rounding drift can leave the total just under the roll; the last
        // kind absorbs it.
        Ok(chances[chances.len() - 1].0.to_string())
    }
}

/// Step table lookup: the value of the deepest row at or above `depth`.
/// Rows are `(value, minimum depth)` in ascending depth order.
pub fn from_depth(table: &[(i32, i32)], depth: i32) -> i32 {
    table
        .iter()
        .rev()
        .find(|(_, min_depth)| depth >= *min_depth)
        .map(|(value, _)| *value)
        .unwrap_or(0)
}
