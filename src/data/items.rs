use bracket_terminal::prelude::{CYAN, LIGHT_BLUE, LIGHT_GREEN, LIGHT_YELLOW, ORANGE, VIOLET, RGB};

use super::{from_depth, SpawnTable, TABLE_MAX_DEPTH};
use crate::entities::{Entity, Item, UseEffect};

#[derive(Clone, Debug)]
pub struct ItemTemplate {
    pub name: &'static str,
    pub glyph: char,
    pub color: RGB,
    pub effect: UseEffect,
}

fn catalog() -> Vec<ItemTemplate> {
    vec![
        ItemTemplate {
            name: "healing potion",
            glyph: '!',
            color: RGB::named(VIOLET),
            effect: UseEffect::Heal,
        },
        ItemTemplate {
            name: "scroll of lightning bolt",
            glyph: '#',
            color: RGB::named(LIGHT_YELLOW),
            effect: UseEffect::Lightning,
        },
        ItemTemplate {
            name: "scroll of confusion",
            glyph: '#',
            color: RGB::named(LIGHT_GREEN),
            effect: UseEffect::Confuse,
        },
        ItemTemplate {
            name: "scroll of fireball",
            glyph: '#',
            color: RGB::named(ORANGE),
            effect: UseEffect::Fireball,
        },
        ItemTemplate {
            name: "scroll of magic mapping",
            glyph: '#',
            color: RGB::named(CYAN),
            effect: UseEffect::MagicMapping,
        },
        ItemTemplate {
            name: "scroll of phase door",
            glyph: '#',
            color: RGB::named(LIGHT_BLUE),
            effect: UseEffect::PhaseDoor,
        },
    ]
}

pub fn spawn_table() -> SpawnTable {
    let mut table = SpawnTable::default();
    table.set_range("healing potion", 0..=TABLE_MAX_DEPTH, 35);
    table.set_range("scroll of phase door", 1..=TABLE_MAX_DEPTH, 15);
    table.set_range("scroll of confusion", 1..=TABLE_MAX_DEPTH, 10);
    table.set_range("scroll of magic mapping", 2..=TABLE_MAX_DEPTH, 10);
    table.set_range("scroll of lightning bolt", 3..=TABLE_MAX_DEPTH, 25);
    table.set_range("scroll of fireball", 5..=TABLE_MAX_DEPTH, 25);
    table
}

pub fn max_per_room(depth: i32) -> i32 {
    from_depth(&[(1, 0), (2, 3)], depth)
}

pub fn spawn(kind: &str, x: i32, y: i32) -> Option<Entity> {
    let template = catalog().into_iter().find(|t| t.name == kind)?;
    Some(
        Entity::new(x, y, template.glyph, template.color, template.name)
            .with_item(Item::new(template.effect)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_kind_has_a_template() {
        let table = spawn_table();
        for depth in [0, 3, 8, TABLE_MAX_DEPTH] {
            for (kind, _) in table.depth_chances(depth) {
                assert!(spawn(kind, 0, 0).is_some(), "missing template for {kind}");
            }
        }
    }

    #[test]
    fn shallow_floors_only_see_the_basics() {
        let table = spawn_table();
        let kinds: Vec<&str> = table.depth_chances(0).iter().map(|(k, _)| *k).collect();
        assert_eq!(kinds, vec!["healing potion"]);
    }

    #[test]
    fn spawned_items_start_as_single_stacks() {
        let potion = spawn("healing potion", 2, 2).unwrap();
        assert!(!potion.blocks);
        let item = potion.item.unwrap();
        assert_eq!(item.quantity, 1);
        assert_eq!(item.effect, UseEffect::Heal);
    }
}
