use bracket_terminal::prelude::{DARK_RED, ORANGE, RED, WHITE, RGB};

use crate::entities::DeathBehavior;
use crate::game::{Phase, World};

/// `power - defense`, floored at a harmless swing. Damage is applied to the
/// defender's Fighter; the attacker only needs to exist.
pub fn attack(world: &mut World, attacker: usize, defender: usize) {
    let (power, attacker_name) = {
        let entity = &world.entities[attacker];
        (
            entity.fighter.as_ref().map(|f| f.power).unwrap_or(0),
            entity.name.clone(),
        )
    };
    let (defense, defender_name) = {
        let entity = &world.entities[defender];
        (
            entity.fighter.as_ref().map(|f| f.defense).unwrap_or(0),
            entity.name.clone(),
        )
    };

    let damage = power - defense;
    if damage > 0 {
        world.log.add(
            format!("{attacker_name} attacks {defender_name} for {damage} hit points."),
            RGB::named(WHITE),
        );
        take_damage(world, defender, damage);
    } else {
        world.log.add(
            format!("{attacker_name} attacks {defender_name} but it has no effect!"),
            RGB::named(WHITE),
        );
    }
}

/// Applies raw damage and runs the death transition when hp drops to zero or
/// below. A corpse has no Fighter, so this is a no-op for one.
pub fn take_damage(world: &mut World, target: usize, amount: i32) {
    let dead = match world.entities[target].fighter.as_mut() {
        Some(fighter) => {
            fighter.hp -= amount;
            fighter.hp <= 0
        }
        None => false,
    };
    if dead {
        kill(world, target);
    }
}

/// The one-shot corpse transition: components detach, the cell unblocks, the
/// body drops to the back of the draw order. A player death also flips the
/// world phase so the scheduler stops running monster turns.
fn kill(world: &mut World, target: usize) {
    let Some(fighter) = world.entities[target].fighter.take() else {
        return;
    };
    world.entities[target].behavior = None;
    world.entities[target].blocks = false;
    world.entities[target].always_visible = true;

    let name = world.entities[target].name.clone();
    match fighter.death {
        DeathBehavior::Player => {
            world.log.add("You died!", RGB::named(RED));
            world.phase = Phase::Dead;
            world.entities[target].glyph = '%';
            world.entities[target].color = RGB::named(DARK_RED);
        }
        DeathBehavior::Monster => {
            world.log.add(format!("{name} is dead!"), RGB::named(ORANGE));
            world.entities[target].glyph = '%';
            world.entities[target].color = RGB::named(DARK_RED);
        }
    }
    world.entities[target].name = format!("remains of {name}");
    world.send_to_back(target);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Behavior, Entity, Fighter};
    use crate::game::test_support::arena;
    use bracket_terminal::prelude::GREEN;

    fn add_fighter(world: &mut World, power: i32, defense: i32, hp: i32) -> usize {
        let mut fighter = Fighter::new(hp, defense, power, DeathBehavior::Monster);
        fighter.hp = hp;
        world.entities.push(
            Entity::new(6, 5, 'o', RGB::named(GREEN), "orc")
                .blocking()
                .with_fighter(fighter)
                .with_behavior(Behavior::Basic),
        );
        world.entities.len() - 1
    }

    #[test]
    fn damage_is_power_minus_defense() {
        let mut world = arena();
        world.player_mut().fighter = Some(Fighter::new(10, 2, 5, DeathBehavior::Player));
        let orc = add_fighter(&mut world, 3, 2, 10);

        let player = world.player;
        attack(&mut world, player, orc);
        // power 5 against defense 2: 3 damage.
        assert_eq!(world.entities[orc].fighter.as_ref().unwrap().hp, 7);
    }

    #[test]
    fn no_damage_when_defense_holds() {
        let mut world = arena();
        world.player_mut().fighter = Some(Fighter::new(10, 0, 3, DeathBehavior::Player));
        let orc = add_fighter(&mut world, 3, 5, 10);

        let player = world.player;
        attack(&mut world, player, orc);
        assert_eq!(world.entities[orc].fighter.as_ref().unwrap().hp, 10);
        let (last, _) = world.log.entries.last().unwrap();
        assert!(last.contains("no effect"));
    }

    #[test]
    fn death_fires_exactly_once() {
        let mut world = arena();
        let orc = add_fighter(&mut world, 3, 0, 2);

        take_damage(&mut world, orc, 5);
        // The corpse re-spliced to the front of the list.
        let corpse = &world.entities[0];
        assert_eq!(corpse.name, "remains of orc");
        assert!(corpse.fighter.is_none());
        assert!(corpse.behavior.is_none());
        assert!(!corpse.blocks);
        assert!(corpse.always_visible);

        // Further damage has no Fighter to target.
        take_damage(&mut world, 0, 99);
        assert_eq!(world.entities[0].name, "remains of orc");
    }

    #[test]
    fn player_death_flips_the_phase() {
        let mut world = arena();
        world.player_mut().fighter = Some(Fighter::new(5, 0, 5, DeathBehavior::Player));
        let player = world.player;
        take_damage(&mut world, player, 6);
        assert_eq!(world.phase, Phase::Dead);
        assert!(world.player().fighter.is_none());
        assert!(world.player().name.starts_with("remains of"));
    }
}
