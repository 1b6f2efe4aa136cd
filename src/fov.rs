use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::field_of_view_set;
use std::collections::HashSet;

use crate::map::Map;

pub const TORCH_RADIUS: i32 = 10;

/// Thin wrapper around the external field-of-view algorithm. The game core
/// only ever asks `is_visible`; the shadow casting itself is not ours.
pub struct Fov {
    pub radius: i32,
    visible: HashSet<Point>,
}

impl Default for Fov {
    fn default() -> Self {
        Self {
            radius: TORCH_RADIUS,
            visible: HashSet::new(),
        }
    }
}

impl Fov {
    /// Forget everything computed against a previous grid.
    pub fn rebuild(&mut self) {
        self.visible.clear();
    }

    /// Recompute visibility from `origin` and mark what the player now sees
    /// as explored.
    pub fn compute(&mut self, map: &mut Map, origin: Point) {
        self.visible = field_of_view_set(origin, self.radius, map)
            .into_iter()
            .filter(|point| map.in_bounds(point.x, point.y))
            .collect();
        for point in &self.visible {
            if let Some(tile) = map.tile_at_mut(point.x, point.y) {
                tile.explored = true;
            }
        }
    }

    pub fn is_visible(&self, x: i32, y: i32) -> bool {
        self.visible.contains(&Point::new(x, y))
    }

    #[cfg(test)]
    pub fn force_visible<I: IntoIterator<Item = Point>>(&mut self, points: I) {
        self.visible = points.into_iter().collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bracket_geometry::prelude::Rect;

    #[test]
    fn open_room_is_visible_and_explored() {
        let mut map = Map::filled(20, 20);
        map.carve_room(&Rect::with_size(2, 2, 10, 10));
        let mut fov = Fov::default();
        fov.compute(&mut map, Point::new(6, 6));

        assert!(fov.is_visible(6, 6));
        assert!(fov.is_visible(7, 7));
        assert!(map.tile_at(7, 7).unwrap().explored);
        // A cell sealed behind walls stays dark.
        assert!(!fov.is_visible(18, 18));
        assert!(!map.tile_at(18, 18).unwrap().explored);
    }

    #[test]
    fn rebuild_clears_previous_grid_results() {
        let mut map = Map::filled(20, 20);
        map.carve_room(&Rect::with_size(2, 2, 10, 10));
        let mut fov = Fov::default();
        fov.compute(&mut map, Point::new(6, 6));
        fov.rebuild();
        assert!(!fov.is_visible(6, 6));
    }
}
