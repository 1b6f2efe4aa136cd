use bracket_geometry::prelude::{Point, Rect};
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap};
use bracket_random::prelude::RandomNumberGenerator;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_MAP_WIDTH: i32 = 80;
pub const DEFAULT_MAP_HEIGHT: i32 = 43;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Tile {
    pub blocked: bool,
    pub block_sight: bool,
    pub explored: bool,
}

impl Tile {
    /// Opacity follows passability unless overridden later.
    pub fn new(blocked: bool) -> Self {
        Self {
            blocked,
            block_sight: blocked,
            explored: false,
        }
    }

    pub fn wall() -> Self {
        Self::new(true)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Map {
    pub width: i32,
    pub height: i32,
    pub tiles: Vec<Tile>,
}

impl Map {
    pub fn filled(width: i32, height: i32) -> Self {
        let size = (width * height) as usize;
        Self {
            width,
            height,
            tiles: vec![Tile::wall(); size],
        }
    }

    pub fn in_bounds(&self, x: i32, y: i32) -> bool {
        x >= 0 && x < self.width && y >= 0 && y < self.height
    }

    fn idx(&self, x: i32, y: i32) -> Option<usize> {
        if self.in_bounds(x, y) {
            Some((y * self.width + x) as usize)
        } else {
            None
        }
    }

    pub fn tile_at(&self, x: i32, y: i32) -> Option<&Tile> {
        self.idx(x, y).map(|idx| &self.tiles[idx])
    }

    pub fn tile_at_mut(&mut self, x: i32, y: i32) -> Option<&mut Tile> {
        self.idx(x, y).map(move |idx| &mut self.tiles[idx])
    }

    /// True for out-of-bounds cells as well, so callers never step off the grid.
    pub fn is_blocked_tile(&self, x: i32, y: i32) -> bool {
        self.tile_at(x, y).map_or(true, |tile| tile.blocked)
    }

    pub fn is_walkable(&self, x: i32, y: i32) -> bool {
        !self.is_blocked_tile(x, y)
    }

    fn open(&mut self, x: i32, y: i32) {
        if let Some(tile) = self.tile_at_mut(x, y) {
            tile.blocked = false;
            tile.block_sight = false;
        }
    }

    /// Carves the interior of `room`, exclusive of its border.
    pub fn carve_room(&mut self, room: &Rect) {
        for x in (room.x1 + 1)..room.x2 {
            for y in (room.y1 + 1)..room.y2 {
                self.open(x, y);
            }
        }
    }

    pub fn carve_h_tunnel(&mut self, x1: i32, x2: i32, y: i32) {
        let (lo, hi) = (x1.min(x2), x1.max(x2));
        for x in lo..=hi {
            self.open(x, y);
        }
    }

    pub fn carve_v_tunnel(&mut self, x: i32, y1: i32, y2: i32) {
        let (lo, hi) = (y1.min(y2), y1.max(y2));
        for y in lo..=hi {
            self.open(x, y);
        }
    }
}

impl BaseMap for Map {
    fn is_opaque(&self, idx: usize) -> bool {
        self.tiles[idx].block_sight
    }
}

impl Algorithm2D for Map {
    fn dimensions(&self) -> Point {
        Point::new(self.width, self.height)
    }
}

#[derive(Clone, Debug)]
pub struct GenConfig {
    pub width: i32,
    pub height: i32,
    pub max_rooms: i32,
    pub room_min: i32,
    pub room_max: i32,
    pub up_stairs: (i32, i32),
    pub down_stairs: (i32, i32),
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_MAP_WIDTH,
            height: DEFAULT_MAP_HEIGHT,
            max_rooms: 26,
            room_min: 6,
            room_max: 10,
            up_stairs: (0, 1),
            down_stairs: (1, 2),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Blueprint {
    pub map: Map,
    pub rooms: Vec<Rect>,
    pub player_start: Point,
    pub stairs_up: Vec<Point>,
    pub stairs_down: Vec<Point>,
}

/// Room-and-corridor generation. A rejected room consumes its attempt rather
/// than being retried, so a tight configuration can legitimately come out
/// sparse; the iteration budget is `max_rooms` and nothing else.
pub fn generate(config: &GenConfig, rng: &mut RandomNumberGenerator) -> Blueprint {
    let mut map = Map::filled(config.width, config.height);
    let mut rooms: Vec<Rect> = Vec::new();
    let mut player_start = Point::new(config.width / 2, config.height / 2);

    for _ in 0..config.max_rooms {
        let w = rng.range(config.room_min, config.room_max + 1);
        let h = rng.range(config.room_min, config.room_max + 1);
        let x = rng.range(0, config.width - w);
        let y = rng.range(0, config.height - h);
        let candidate = Rect::with_size(x, y, w, h);

        if !map.in_bounds(candidate.x1, candidate.y1) || !map.in_bounds(candidate.x2, candidate.y2)
        {
            continue;
        }
        if rooms.iter().any(|room| room.intersect(&candidate)) {
            continue;
        }

        map.carve_room(&candidate);
        let center = candidate.center();
        if let Some(prev) = rooms.last().map(|room| room.center()) {
            // L-shaped connection to the immediately preceding room.
            if rng.range(0, 2) == 1 {
                map.carve_h_tunnel(prev.x, center.x, prev.y);
                map.carve_v_tunnel(center.x, prev.y, center.y);
            } else {
                map.carve_v_tunnel(prev.x, prev.y, center.y);
                map.carve_h_tunnel(prev.x, center.x, center.y);
            }
        } else {
            player_start = center;
        }
        rooms.push(candidate);
    }

    if rooms.is_empty() {
        // Degenerate draw: carve one room in the middle so the level is playable.
        let fallback = Rect::with_size(config.width / 2 - 4, config.height / 2 - 3, 8, 6);
        map.carve_room(&fallback);
        player_start = fallback.center();
        rooms.push(fallback);
    }

    let mut taken: HashSet<(i32, i32)> = HashSet::new();
    let up_count = rng.range(config.up_stairs.0, config.up_stairs.1 + 1);
    let down_count = rng.range(config.down_stairs.0, config.down_stairs.1 + 1);
    let stairs_up = place_stairs(up_count, &rooms, &map, rng, &mut taken);
    let stairs_down = place_stairs(down_count, &rooms, &map, rng, &mut taken);

    Blueprint {
        map,
        rooms,
        player_start,
        stairs_up,
        stairs_down,
    }
}

fn place_stairs(
    count: i32,
    rooms: &[Rect],
    map: &Map,
    rng: &mut RandomNumberGenerator,
    taken: &mut HashSet<(i32, i32)>,
) -> Vec<Point> {
    let mut placed = Vec::new();
    while (placed.len() as i32) < count {
        let room = &rooms[rng.range(0, rooms.len() as i32) as usize];
        let x = rng.range(room.x1 + 1, room.x2);
        let y = rng.range(room.y1 + 1, room.y2);
        if map.is_blocked_tile(x, y) || taken.contains(&(x, y)) {
            continue;
        }
        taken.insert((x, y));
        placed.push(Point::new(x, y));
    }
    placed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    fn config() -> GenConfig {
        GenConfig::default()
    }

    #[test]
    fn rooms_never_overlap() {
        for seed in 0..8u64 {
            let mut rng = RandomNumberGenerator::seeded(seed);
            let blueprint = generate(&config(), &mut rng);
            for (i, a) in blueprint.rooms.iter().enumerate() {
                for b in blueprint.rooms.iter().skip(i + 1) {
                    assert!(!a.intersect(b), "rooms {a:?} and {b:?} overlap (seed {seed})");
                }
            }
        }
    }

    #[test]
    fn every_room_reachable_from_first() {
        for seed in 0..8u64 {
            let mut rng = RandomNumberGenerator::seeded(seed);
            let blueprint = generate(&config(), &mut rng);
            let map = &blueprint.map;
            let start = blueprint.rooms[0].center();

            let mut seen = vec![false; (map.width * map.height) as usize];
            let mut queue = VecDeque::new();
            seen[(start.y * map.width + start.x) as usize] = true;
            queue.push_back(start);
            while let Some(point) = queue.pop_front() {
                for (dx, dy) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
                    let (nx, ny) = (point.x + dx, point.y + dy);
                    if map.is_walkable(nx, ny) && !seen[(ny * map.width + nx) as usize] {
                        seen[(ny * map.width + nx) as usize] = true;
                        queue.push_back(Point::new(nx, ny));
                    }
                }
            }

            for room in &blueprint.rooms {
                let center = room.center();
                assert!(
                    seen[(center.y * map.width + center.x) as usize],
                    "room at {center:?} unreachable (seed {seed})"
                );
            }
        }
    }

    #[test]
    fn carving_opens_passage_and_sight() {
        let mut map = Map::filled(20, 20);
        map.carve_room(&Rect::with_size(2, 2, 6, 6));
        let tile = map.tile_at(4, 4).unwrap();
        assert!(!tile.blocked);
        assert!(!tile.block_sight);
        // Border stays solid.
        assert!(map.is_blocked_tile(2, 2));
        assert!(map.is_blocked_tile(8, 4));
    }

    #[test]
    fn block_sight_defaults_to_blocked() {
        assert!(Tile::new(true).block_sight);
        assert!(!Tile::new(false).block_sight);
    }

    #[test]
    fn stairs_land_on_open_unique_cells() {
        for seed in 0..8u64 {
            let mut rng = RandomNumberGenerator::seeded(seed);
            let cfg = config();
            let blueprint = generate(&cfg, &mut rng);

            let up = blueprint.stairs_up.len() as i32;
            let down = blueprint.stairs_down.len() as i32;
            assert!(up >= cfg.up_stairs.0 && up <= cfg.up_stairs.1);
            assert!(down >= cfg.down_stairs.0 && down <= cfg.down_stairs.1);

            let mut cells = HashSet::new();
            for stair in blueprint.stairs_up.iter().chain(&blueprint.stairs_down) {
                assert!(blueprint.map.is_walkable(stair.x, stair.y));
                assert!(cells.insert((stair.x, stair.y)), "stairs share a cell");
            }
        }
    }

    #[test]
    fn off_grid_cells_count_as_blocked() {
        let map = Map::filled(10, 10);
        assert!(map.is_blocked_tile(-1, 0));
        assert!(map.is_blocked_tile(0, 10));
    }
}
