use bracket_geometry::prelude::{Point, Rect};
use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::{GREEN, RED, VIOLET, WHITE, YELLOW, RGB};
use serde::{Deserialize, Serialize};

use crate::combat;
use crate::data;
use crate::entities::{DeathBehavior, Entity, Fighter};
use crate::error::GameError;
use crate::map::{self, GenConfig, Map};

pub const INVENTORY_CAP: usize = 26;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Phase {
    Playing,
    Dead,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Messages {
    pub entries: Vec<(String, RGB)>,
}

impl Messages {
    pub fn add<S: Into<String>>(&mut self, text: S, color: RGB) {
        self.entries.push((text.into(), color));
    }

    pub fn recent(&self, count: usize) -> &[(String, RGB)] {
        let skip = self.entries.len().saturating_sub(count);
        &self.entries[skip..]
    }
}

/// The whole mutable game state, threaded explicitly through every system
/// and serialized wholesale on save. `player` is an index into `entities`;
/// draw order is list order, so reordering operations must keep it in sync.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct World {
    pub map: Map,
    pub entities: Vec<Entity>,
    pub player: usize,
    pub inventory: Vec<Entity>,
    pub depth: i32,
    pub log: Messages,
    pub phase: Phase,
}

impl World {
    pub fn new_game(rng: &mut RandomNumberGenerator) -> Result<Self, GameError> {
        let config = GenConfig::default();
        let blueprint = map::generate(&config, rng);

        let player = Entity::new(
            blueprint.player_start.x,
            blueprint.player_start.y,
            '@',
            RGB::named(WHITE),
            "player",
        )
        .blocking()
        .with_fighter(Fighter::new(30, 2, 5, DeathBehavior::Player));

        let mut world = Self {
            map: blueprint.map,
            entities: vec![player],
            player: 0,
            inventory: Vec::new(),
            depth: 0,
            log: Messages::default(),
            phase: Phase::Playing,
        };

        world.spawn_stairs(&blueprint.stairs_up, &blueprint.stairs_down, None);
        world.populate(&blueprint.rooms, rng)?;
        world.log.add(
            "You slip into the ember depths. Tread carefully.",
            RGB::named(YELLOW),
        );
        Ok(world)
    }

    pub fn player(&self) -> &Entity {
        &self.entities[self.player]
    }

    pub fn player_mut(&mut self) -> &mut Entity {
        &mut self.entities[self.player]
    }

    /// Blocked by terrain or by any entity that occupies its cell.
    pub fn is_blocked(&self, x: i32, y: i32) -> bool {
        if self.map.is_blocked_tile(x, y) {
            return true;
        }
        self.entities
            .iter()
            .any(|entity| entity.blocks && entity.x == x && entity.y == y)
    }

    /// No-op on blocked or out-of-grid destinations; otherwise unconditional.
    pub fn move_entity(&mut self, idx: usize, dx: i32, dy: i32) {
        let (nx, ny) = (self.entities[idx].x + dx, self.entities[idx].y + dy);
        if !self.map.in_bounds(nx, ny) || self.is_blocked(nx, ny) {
            return;
        }
        self.entities[idx].set_pos(nx, ny);
    }

    /// One step along the direction vector, each axis rounded independently.
    pub fn move_towards(&mut self, idx: usize, tx: i32, ty: i32) {
        let dx = tx - self.entities[idx].x;
        let dy = ty - self.entities[idx].y;
        let distance = ((dx * dx + dy * dy) as f32).sqrt();
        if distance == 0.0 {
            return;
        }
        let step_x = (dx as f32 / distance).round() as i32;
        let step_y = (dy as f32 / distance).round() as i32;
        self.move_entity(idx, step_x, step_y);
    }

    /// Re-splice to the front of the draw order (drawn first, under everything
    /// else). Indices of entities after `idx` are unaffected; indices before
    /// it shift up by one, including the player's.
    pub fn send_to_back(&mut self, idx: usize) {
        let entity = self.entities.remove(idx);
        self.entities.insert(0, entity);
        if self.player == idx {
            self.player = 0;
        } else if self.player < idx {
            self.player += 1;
        }
    }

    fn remove_entity(&mut self, idx: usize) -> Entity {
        debug_assert!(idx != self.player, "the player is never removed");
        if self.player > idx {
            self.player -= 1;
        }
        self.entities.remove(idx)
    }

    fn push_background(&mut self, entity: Entity) {
        self.entities.push(entity);
        self.send_to_back(self.entities.len() - 1);
    }

    /// Resolve one turn-consuming step: attack a blocking fighter on the
    /// target cell, otherwise try to move there.
    pub fn player_move_or_attack(&mut self, dx: i32, dy: i32) {
        let x = self.player().x + dx;
        let y = self.player().y + dy;
        let target = self
            .entities
            .iter()
            .position(|entity| entity.blocks && entity.fighter.is_some() && entity.x == x && entity.y == y);
        match target {
            Some(idx) if idx != self.player => combat::attack(self, self.player, idx),
            _ => self.move_entity(self.player, dx, dy),
        }
    }

    /// `Some(+1)` on a down staircase, `Some(-1)` on an up staircase.
    pub fn stairs_under_player(&self) -> Option<i32> {
        let (x, y) = (self.player().x, self.player().y);
        self.entities.iter().find_map(|entity| {
            if entity.x != x || entity.y != y {
                return None;
            }
            match entity.name.as_str() {
                "stairs down" => Some(1),
                "stairs up" => Some(-1),
                _ => None,
            }
        })
    }

    /// Regenerate the floor at `depth + delta` (clamped at 0). Only the
    /// player survives the transition; the old layout is discarded.
    pub fn change_depth(
        &mut self,
        delta: i32,
        rng: &mut RandomNumberGenerator,
    ) -> Result<(), GameError> {
        self.depth = (self.depth + delta).max(0);
        let blueprint = map::generate(&GenConfig::default(), rng);

        let mut player = self.entities.remove(self.player);
        player.set_pos(blueprint.player_start.x, blueprint.player_start.y);
        if let Some(fighter) = player.fighter.as_mut() {
            let rest = fighter.max_hp / 2;
            fighter.heal(rest);
        }

        self.map = blueprint.map;
        self.entities = vec![player];
        self.player = 0;

        let arrival = blueprint.player_start;
        self.spawn_stairs(&blueprint.stairs_up, &blueprint.stairs_down, Some(arrival));
        let return_stair = if delta > 0 {
            stairs_entity(arrival, -1)
        } else {
            stairs_entity(arrival, 1)
        };
        self.push_background(return_stair);

        self.populate(&blueprint.rooms, rng)?;
        self.log.add(
            "You take a moment to rest and recover your strength.",
            RGB::named(VIOLET),
        );
        self.log.add(
            format!("You continue onward to depth {}...", self.depth),
            RGB::named(RED),
        );
        log::info!("generated floor at depth {}", self.depth);
        Ok(())
    }

    fn spawn_stairs(&mut self, up: &[Point], down: &[Point], skip: Option<Point>) {
        for &point in up {
            if Some(point) != skip {
                self.push_background(stairs_entity(point, -1));
            }
        }
        for &point in down {
            if Some(point) != skip {
                self.push_background(stairs_entity(point, 1));
            }
        }
    }

    /// Roll monsters and items into each room from the depth-indexed tables.
    fn populate(&mut self, rooms: &[Rect], rng: &mut RandomNumberGenerator) -> Result<(), GameError> {
        let monster_table = data::monsters::spawn_table();
        let item_table = data::items::spawn_table();
        // Past the deepest table row the abyss keeps that row's mix.
        let depth = self.depth.min(data::TABLE_MAX_DEPTH);

        for room in rooms {
            let monsters = rng.range(0, data::monsters::max_per_room(depth) + 1);
            for _ in 0..monsters {
                let x = rng.range(room.x1 + 1, room.x2);
                let y = rng.range(room.y1 + 1, room.y2);
                if self.is_blocked(x, y) {
                    continue;
                }
                let kind = monster_table.random_choice(depth, rng)?;
                if let Some(monster) = data::monsters::spawn(&kind, x, y) {
                    self.entities.push(monster);
                }
            }

            let items = rng.range(0, data::items::max_per_room(depth) + 1);
            for _ in 0..items {
                let x = rng.range(room.x1 + 1, room.x2);
                let y = rng.range(room.y1 + 1, room.y2);
                if self.is_blocked(x, y) {
                    continue;
                }
                let kind = item_table.random_choice(depth, rng)?;
                if let Some(item) = data::items::spawn(&kind, x, y) {
                    self.push_background(item);
                }
            }
        }
        Ok(())
    }

    /// Pick up the item entity at `item_idx`. Same-name stacks merge instead
    /// of occupying a second slot; a full pack leaves the item on the floor.
    pub fn pick_item_up(&mut self, item_idx: usize) {
        let name = self.entities[item_idx].name.clone();
        let quantity = self.entities[item_idx]
            .item
            .as_ref()
            .map(|item| item.quantity)
            .unwrap_or(1);

        if let Some(slot) = self
            .inventory
            .iter_mut()
            .find(|entity| entity.item.is_some() && entity.name == name)
        {
            if let Some(item) = slot.item.as_mut() {
                item.quantity += quantity;
            }
            self.remove_entity(item_idx);
            self.log
                .add(format!("You picked up a {name}!"), RGB::named(GREEN));
        } else if self.inventory.len() >= INVENTORY_CAP {
            self.log.add(
                format!("Your inventory is full, cannot pick up {name}."),
                RGB::named(RED),
            );
        } else {
            let entity = self.remove_entity(item_idx);
            self.inventory.push(entity);
            self.log
                .add(format!("You picked up a {name}!"), RGB::named(GREEN));
        }
    }

    /// Drop one stack at the player's feet, merging into a same-name floor
    /// stack on that cell.
    pub fn drop_item(&mut self, inv_index: usize) {
        if inv_index >= self.inventory.len() {
            return;
        }
        let mut entity = self.inventory.remove(inv_index);
        let (x, y) = (self.player().x, self.player().y);
        entity.set_pos(x, y);
        self.log
            .add(format!("You dropped a {}.", entity.name), RGB::named(YELLOW));

        let floor_stack = self.entities.iter().position(|other| {
            other.item.is_some() && other.name == entity.name && other.x == x && other.y == y
        });
        if let Some(idx) = floor_stack {
            let quantity = entity.item.as_ref().map(|item| item.quantity).unwrap_or(1);
            if let Some(item) = self.entities[idx].item.as_mut() {
                item.quantity += quantity;
            }
        } else {
            self.push_background(entity);
        }
    }

    /// Index of the item entity under the player, if any.
    pub fn item_under_player(&self) -> Option<usize> {
        let (x, y) = (self.player().x, self.player().y);
        self.entities
            .iter()
            .position(|entity| entity.item.is_some() && entity.x == x && entity.y == y)
    }
}

fn stairs_entity(at: Point, direction: i32) -> Entity {
    let (glyph, name) = if direction > 0 {
        ('>', "stairs down")
    } else {
        ('<', "stairs up")
    };
    Entity::new(at.x, at.y, glyph, RGB::named(WHITE), name).always_visible()
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// An open arena with the player at (5, 5); walls only at the rim.
    pub fn arena() -> World {
        let mut map = Map::filled(20, 20);
        map.carve_room(&Rect::with_size(0, 0, 19, 19));
        let player = Entity::new(5, 5, '@', RGB::named(WHITE), "player")
            .blocking()
            .with_fighter(Fighter::new(30, 2, 5, DeathBehavior::Player));
        World {
            map,
            entities: vec![player],
            player: 0,
            inventory: Vec::new(),
            depth: 0,
            log: Messages::default(),
            phase: Phase::Playing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::arena;
    use super::*;
    use crate::entities::{Item, UseEffect};

    fn potion(x: i32, y: i32) -> Entity {
        Entity::new(x, y, '!', RGB::named(VIOLET), "healing potion")
            .with_item(Item::new(UseEffect::Heal))
    }

    #[test]
    fn movement_into_walls_is_silently_ignored() {
        let mut world = arena();
        world.player_mut().set_pos(1, 1);
        world.move_entity(0, -1, 0);
        assert_eq!(world.player().pos(), Point::new(1, 1));
        world.move_entity(0, 0, 1);
        assert_eq!(world.player().pos(), Point::new(1, 2));
    }

    #[test]
    fn movement_into_blocking_entity_is_ignored() {
        let mut world = arena();
        world
            .entities
            .push(Entity::new(6, 5, 'o', RGB::named(GREEN), "orc").blocking());
        world.move_entity(0, 1, 0);
        assert_eq!(world.player().pos(), Point::new(5, 5));
    }

    #[test]
    fn move_towards_takes_a_single_rounded_step() {
        let mut world = arena();
        world.move_towards(0, 12, 5);
        assert_eq!(world.player().pos(), Point::new(6, 5));
        world.move_towards(0, 12, 12);
        assert_eq!(world.player().pos(), Point::new(7, 6));
    }

    #[test]
    fn send_to_back_keeps_player_index_in_sync() {
        let mut world = arena();
        world
            .entities
            .push(Entity::new(2, 2, 'o', RGB::named(GREEN), "orc"));
        world
            .entities
            .push(Entity::new(3, 3, 't', RGB::named(GREEN), "troll"));
        assert_eq!(world.player, 0);

        world.send_to_back(2);
        assert_eq!(world.entities[0].name, "troll");
        assert_eq!(world.player, 1);
        assert_eq!(world.player().name, "player");
    }

    #[test]
    fn pickup_merges_same_name_stacks() {
        let mut world = arena();
        world.entities.push(potion(5, 5));
        world.pick_item_up(1);
        assert_eq!(world.inventory.len(), 1);

        world.entities.push(potion(5, 5));
        world.pick_item_up(1);
        assert_eq!(world.inventory.len(), 1);
        assert_eq!(world.inventory[0].item.as_ref().unwrap().quantity, 2);
    }

    #[test]
    fn full_inventory_leaves_item_on_floor() {
        let mut world = arena();
        for i in 0..INVENTORY_CAP {
            world.inventory.push(
                Entity::new(0, 0, '!', RGB::named(VIOLET), format!("oddment {i}"))
                    .with_item(Item::new(UseEffect::Heal)),
            );
        }
        world.entities.push(potion(5, 5));
        world.pick_item_up(1);
        assert_eq!(world.inventory.len(), INVENTORY_CAP);
        assert_eq!(world.entities.len(), 2, "item stays on the floor");
    }

    #[test]
    fn drop_merges_into_floor_stack() {
        let mut world = arena();
        world.entities.push(potion(5, 5));
        world
            .inventory
            .push(potion(0, 0));
        world.drop_item(0);
        assert!(world.inventory.is_empty());
        let stacks: Vec<_> = world
            .entities
            .iter()
            .filter(|entity| entity.item.is_some())
            .collect();
        assert_eq!(stacks.len(), 1);
        assert_eq!(stacks[0].item.as_ref().unwrap().quantity, 2);
    }

    #[test]
    fn change_depth_preserves_player_and_replaces_the_rest() {
        let mut rng = RandomNumberGenerator::seeded(7);
        let mut world = World::new_game(&mut rng).unwrap();
        world.inventory.push(potion(0, 0));
        world.player_mut().fighter.as_mut().unwrap().hp = 9;
        let old_monsters: Vec<String> = world
            .entities
            .iter()
            .filter(|entity| entity.behavior.is_some())
            .map(|entity| format!("{},{},{}", entity.name, entity.x, entity.y))
            .collect();

        world.change_depth(1, &mut rng).unwrap();

        assert_eq!(world.depth, 1);
        assert_eq!(world.inventory.len(), 1);
        let fighter = world.player().fighter.as_ref().unwrap();
        assert_eq!(fighter.hp, 9 + fighter.max_hp / 2);
        let new_monsters: Vec<String> = world
            .entities
            .iter()
            .filter(|entity| entity.behavior.is_some())
            .map(|entity| format!("{},{},{}", entity.name, entity.x, entity.y))
            .collect();
        assert_ne!(old_monsters, new_monsters);
    }

    #[test]
    fn depth_clamps_at_zero_and_places_return_stairs() {
        let mut rng = RandomNumberGenerator::seeded(3);
        let mut world = World::new_game(&mut rng).unwrap();
        world.change_depth(-1, &mut rng).unwrap();
        assert_eq!(world.depth, 0);

        world.change_depth(1, &mut rng).unwrap();
        assert_eq!(world.depth, 1);
        // Arrival cell carries a staircase of the opposite polarity.
        assert_eq!(world.stairs_under_player(), Some(-1));
    }
}
