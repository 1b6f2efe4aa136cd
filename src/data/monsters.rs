use bracket_terminal::prelude::{DARK_GREEN, GRAY, GREEN, RGB};

use super::{from_depth, SpawnTable, TABLE_MAX_DEPTH};
use crate::entities::{Behavior, DeathBehavior, Entity, Fighter};

#[derive(Clone, Debug)]
pub struct MonsterTemplate {
    pub name: &'static str,
    pub glyph: char,
    pub color: RGB,
    pub hp: i32,
    pub defense: i32,
    pub power: i32,
}

fn roster() -> Vec<MonsterTemplate> {
    vec![
        MonsterTemplate {
            name: "orc",
            glyph: 'o',
            color: RGB::named(GREEN),
            hp: 10,
            defense: 0,
            power: 3,
        },
        MonsterTemplate {
            name: "troll",
            glyph: 'T',
            color: RGB::named(DARK_GREEN),
            hp: 16,
            defense: 1,
            power: 4,
        },
        MonsterTemplate {
            name: "wraith",
            glyph: 'W',
            color: RGB::named(GRAY),
            hp: 12,
            defense: 2,
            power: 6,
        },
    ]
}

/// Depth-indexed weights; trolls thin out the orc-only shallows from depth 2
/// and wraiths join past depth 7.
pub fn spawn_table() -> SpawnTable {
    let mut table = SpawnTable::default();
    table.set_range("orc", 0..=TABLE_MAX_DEPTH, 80);
    table.set_range("troll", 2..=3, 15);
    table.set_range("troll", 4..=5, 30);
    table.set_range("troll", 6..=TABLE_MAX_DEPTH, 60);
    table.set_range("wraith", 7..=TABLE_MAX_DEPTH, 20);
    table
}

pub fn max_per_room(depth: i32) -> i32 {
    from_depth(&[(2, 0), (3, 3), (5, 5)], depth)
}

pub fn spawn(kind: &str, x: i32, y: i32) -> Option<Entity> {
    let template = roster().into_iter().find(|t| t.name == kind)?;
    Some(
        Entity::new(x, y, template.glyph, template.color, template.name)
            .blocking()
            .with_fighter(Fighter::new(
                template.hp,
                template.defense,
                template.power,
                DeathBehavior::Monster,
            ))
            .with_behavior(Behavior::Basic),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_kind_has_a_template() {
        let table = spawn_table();
        for depth in [0, 5, 10, TABLE_MAX_DEPTH] {
            for (kind, _) in table.depth_chances(depth) {
                assert!(spawn(kind, 0, 0).is_some(), "missing template for {kind}");
            }
        }
    }

    #[test]
    fn spawned_monsters_fight_and_think() {
        let orc = spawn("orc", 3, 4).unwrap();
        assert!(orc.blocks);
        assert!(orc.fighter.is_some());
        assert_eq!(orc.behavior, Some(Behavior::Basic));
        assert_eq!(orc.fighter.unwrap().death, DeathBehavior::Monster);
        assert!(spawn("beholder", 0, 0).is_none());
    }
}
