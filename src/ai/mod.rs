use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::{RED, RGB};

use crate::combat;
use crate::entities::Behavior;
use crate::fov::Fov;
use crate::game::{Phase, World};

/// One AI tick for every behavior-bearing entity, in the entity list's
/// current order. The order is whatever pickups, deaths and spawns have left
/// it as; that list order is the contract, not a sorted one.
pub fn monsters_turn(world: &mut World, fov: &Fov, rng: &mut RandomNumberGenerator) {
    let mut idx = 0;
    while idx < world.entities.len() {
        if world.phase != Phase::Playing {
            break;
        }
        if idx != world.player && world.entities[idx].behavior.is_some() {
            take_turn(world, fov, rng, idx);
        }
        idx += 1;
    }
}

fn take_turn(world: &mut World, fov: &Fov, rng: &mut RandomNumberGenerator, idx: usize) {
    let Some(behavior) = world.entities[idx].behavior.take() else {
        return;
    };
    let player_before = world.player;

    let next = match behavior {
        Behavior::Basic => basic_turn(world, fov, idx),
        Behavior::Confused {
            previous,
            turns_remaining,
        } => confused_turn(world, rng, idx, previous, turns_remaining),
    };

    // The only reorder a monster's own turn can cause is the player's death,
    // which re-splices the corpse to the front. Entities behind the old
    // player index shift up by one; reattach accordingly.
    let mut idx = idx;
    if world.phase == Phase::Dead && idx < player_before {
        idx += 1;
    }
    world.entities[idx].behavior = Some(next);
}

/// Chase-and-attack, gated on the player's field of view: a monster the
/// player cannot see does nothing.
fn basic_turn(world: &mut World, fov: &Fov, idx: usize) -> Behavior {
    let (x, y) = (world.entities[idx].x, world.entities[idx].y);
    if fov.is_visible(x, y) {
        let target = world.player().pos();
        if world.entities[idx].distance(target.x, target.y) >= 2.0 {
            world.move_towards(idx, target.x, target.y);
        } else if world.player().fighter.is_some() {
            combat::attack(world, idx, world.player);
        }
    }
    Behavior::Basic
}

/// Stagger one random step per tick (per-axis offsets in {-1, 0, 1}); the
/// wrapped behavior comes back by value when the counter runs out.
fn confused_turn(
    world: &mut World,
    rng: &mut RandomNumberGenerator,
    idx: usize,
    previous: Box<Behavior>,
    turns_remaining: i32,
) -> Behavior {
    if turns_remaining > 0 {
        let dx = rng.range(-1, 2);
        let dy = rng.range(-1, 2);
        world.move_entity(idx, dx, dy);
        let remaining = turns_remaining - 1;
        if remaining == 0 {
            world.log.add(
                format!("The {} is no longer confused!", world.entities[idx].name),
                RGB::named(RED),
            );
            return *previous;
        }
        return Behavior::Confused {
            previous,
            turns_remaining: remaining,
        };
    }
    *previous
}
