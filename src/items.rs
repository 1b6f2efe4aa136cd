use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::{CYAN, GREEN, LIGHT_BLUE, LIGHT_GREEN, ORANGE, RED, VIOLET, RGB};

use crate::combat;
use crate::entities::{Behavior, UseEffect};
use crate::fov::Fov;
use crate::game::World;

pub const HEAL_AMOUNT: i32 = 4;
pub const LIGHTNING_DAMAGE: i32 = 20;
pub const LIGHTNING_RANGE: i32 = 5;
pub const CONFUSE_RANGE: i32 = 8;
pub const CONFUSE_NUM_TURNS: i32 = 10;
pub const FIREBALL_RADIUS: i32 = 3;
pub const FIREBALL_DAMAGE: i32 = 12;
pub const PHASE_DOOR_DISTANCE: i32 = 6;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UseResult {
    /// The effect fired; one charge was consumed.
    UsedUp,
    /// The effect needs an interactive tile target before it can fire.
    NeedsTarget { range: Option<i32> },
    /// The effect aborted; the item was not consumed.
    Cancelled,
}

/// Apply the inventory item at `inv_index`. An out-of-range index counts as
/// "no selection" and cancels quietly.
pub fn use_item(
    world: &mut World,
    fov: &Fov,
    rng: &mut RandomNumberGenerator,
    inv_index: usize,
) -> UseResult {
    let Some(effect) = world
        .inventory
        .get(inv_index)
        .and_then(|entity| entity.item.as_ref())
        .map(|item| item.effect)
    else {
        return UseResult::Cancelled;
    };

    let result = match effect {
        UseEffect::Heal => cast_heal(world),
        UseEffect::Lightning => cast_lightning(world, fov),
        UseEffect::Confuse => cast_confuse(world, fov),
        UseEffect::Fireball => UseResult::NeedsTarget { range: None },
        UseEffect::MagicMapping => cast_magic_mapping(world),
        UseEffect::PhaseDoor => cast_phase_door(world, rng),
    };

    if result == UseResult::UsedUp {
        consume(world, inv_index);
    }
    result
}

/// Second half of a targeted use: the runner has already collected a
/// visible, in-range tile.
pub fn use_item_at(world: &mut World, inv_index: usize, target: Point) -> UseResult {
    let Some(effect) = world
        .inventory
        .get(inv_index)
        .and_then(|entity| entity.item.as_ref())
        .map(|item| item.effect)
    else {
        return UseResult::Cancelled;
    };

    let result = match effect {
        UseEffect::Fireball => cast_fireball(world, target),
        _ => UseResult::Cancelled,
    };

    if result == UseResult::UsedUp {
        consume(world, inv_index);
    }
    result
}

fn consume(world: &mut World, inv_index: usize) {
    let emptied = match world.inventory[inv_index].item.as_mut() {
        Some(item) => {
            item.quantity -= 1;
            item.quantity == 0
        }
        None => false,
    };
    if emptied {
        world.inventory.remove(inv_index);
    }
}

/// Nearest Behavior-carrying Fighter inside the player's FOV and `max_range`.
pub fn closest_monster(world: &World, fov: &Fov, max_range: i32) -> Option<usize> {
    let mut closest = None;
    let mut best = max_range as f32 + 1.0;
    for (idx, entity) in world.entities.iter().enumerate() {
        if idx == world.player || entity.fighter.is_none() || entity.behavior.is_none() {
            continue;
        }
        if !fov.is_visible(entity.x, entity.y) {
            continue;
        }
        let distance = world.player().distance_to(entity);
        if distance < best {
            best = distance;
            closest = Some(idx);
        }
    }
    closest
}

fn cast_heal(world: &mut World) -> UseResult {
    let full = match world.player().fighter.as_ref() {
        Some(fighter) => fighter.hp >= fighter.max_hp,
        None => return UseResult::Cancelled,
    };
    if full {
        world
            .log
            .add("You are already at full health.", RGB::named(RED));
        return UseResult::Cancelled;
    }
    if let Some(fighter) = world.player_mut().fighter.as_mut() {
        fighter.heal(HEAL_AMOUNT);
    }
    world
        .log
        .add("Your wounds start to feel better!", RGB::named(VIOLET));
    UseResult::UsedUp
}

fn cast_lightning(world: &mut World, fov: &Fov) -> UseResult {
    let Some(target) = closest_monster(world, fov, LIGHTNING_RANGE) else {
        world
            .log
            .add("No enemy is close enough to strike.", RGB::named(RED));
        return UseResult::Cancelled;
    };
    world.log.add(
        format!(
            "A lightning bolt strikes the {} with a loud thunder! \
             The damage is {LIGHTNING_DAMAGE} hit points.",
            world.entities[target].name
        ),
        RGB::named(LIGHT_BLUE),
    );
    combat::take_damage(world, target, LIGHTNING_DAMAGE);
    UseResult::UsedUp
}

fn cast_confuse(world: &mut World, fov: &Fov) -> UseResult {
    let Some(target) = closest_monster(world, fov, CONFUSE_RANGE) else {
        world
            .log
            .add("No enemy is close enough to confuse.", RGB::named(RED));
        return UseResult::Cancelled;
    };
    let previous = world.entities[target]
        .behavior
        .take()
        .unwrap_or(Behavior::Basic);
    world.entities[target].behavior = Some(Behavior::Confused {
        previous: Box::new(previous),
        turns_remaining: CONFUSE_NUM_TURNS,
    });
    world.log.add(
        format!(
            "The eyes of the {} look vacant as it starts to stumble around!",
            world.entities[target].name
        ),
        RGB::named(LIGHT_GREEN),
    );
    UseResult::UsedUp
}

/// Burns every Fighter within the blast radius, the player included. Targets
/// are processed in ascending index order: a death re-splices the corpse to
/// the front, which leaves the not-yet-processed higher indices stable.
fn cast_fireball(world: &mut World, target: Point) -> UseResult {
    world.log.add(
        format!("The fireball explodes, burning everything within {FIREBALL_RADIUS} tiles!"),
        RGB::named(ORANGE),
    );
    let burned: Vec<(usize, String)> = world
        .entities
        .iter()
        .enumerate()
        .filter(|(_, entity)| {
            entity.fighter.is_some() && entity.distance(target.x, target.y) <= FIREBALL_RADIUS as f32
        })
        .map(|(idx, entity)| (idx, entity.name.clone()))
        .collect();

    for (idx, name) in burned {
        world.log.add(
            format!("The {name} gets burned for {FIREBALL_DAMAGE} hit points."),
            RGB::named(ORANGE),
        );
        combat::take_damage(world, idx, FIREBALL_DAMAGE);
    }
    UseResult::UsedUp
}

/// Marks every walkable tile and its eight neighbors as explored. No live
/// visibility is granted; the oracle still decides what is lit.
fn cast_magic_mapping(world: &mut World) -> UseResult {
    for y in 0..world.map.height {
        for x in 0..world.map.width {
            if !world.map.is_walkable(x, y) {
                continue;
            }
            for dy in -1..=1 {
                for dx in -1..=1 {
                    if let Some(tile) = world.map.tile_at_mut(x + dx, y + dy) {
                        tile.explored = true;
                    }
                }
            }
        }
    }
    world.log.add(
        "The layout of this level flashes before your eyes!",
        RGB::named(CYAN),
    );
    UseResult::UsedUp
}

/// Resamples a displacement whose axis magnitudes sum to the fixed distance
/// until it lands somewhere unblocked, then teleports the player. On a map
/// with no opening at that distance this never terminates; every generated
/// floor has far more open cells than that.
fn cast_phase_door(world: &mut World, rng: &mut RandomNumberGenerator) -> UseResult {
    let (px, py) = (world.player().x, world.player().y);
    loop {
        let a = rng.range(0, PHASE_DOOR_DISTANCE + 1);
        let b = PHASE_DOOR_DISTANCE - a;
        let dx = if rng.range(0, 2) == 0 { a } else { -a };
        let dy = if rng.range(0, 2) == 0 { b } else { -b };
        let (nx, ny) = (px + dx, py + dy);
        if !world.is_blocked(nx, ny) {
            world.player_mut().set_pos(nx, ny);
            break;
        }
    }
    world
        .log
        .add("You step through a fold in space.", RGB::named(GREEN));
    UseResult::UsedUp
}
