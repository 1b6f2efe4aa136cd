use bracket_geometry::prelude::Point;
use bracket_pathfinding::prelude::DistanceAlg;
use bracket_terminal::prelude::RGB;
use serde::{Deserialize, Serialize};

/// Resolved by the combat module when hp reaches zero. A closed enum keeps
/// the death reaction serializable, unlike an attached callable.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathBehavior {
    Player,
    Monster,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Fighter {
    pub max_hp: i32,
    pub hp: i32,
    pub defense: i32,
    pub power: i32,
    pub death: DeathBehavior,
}

impl Fighter {
    pub fn new(max_hp: i32, defense: i32, power: i32, death: DeathBehavior) -> Self {
        Self {
            max_hp,
            hp: max_hp,
            defense,
            power,
            death,
        }
    }

    /// Healing clamps at `max_hp`; damage elsewhere deliberately does not
    /// clamp, hp may sit below zero until the death transition runs.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.hp;
        self.hp = (self.hp + amount).min(self.max_hp);
        self.hp - before
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Behavior {
    Basic,
    Confused {
        previous: Box<Behavior>,
        turns_remaining: i32,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum UseEffect {
    Heal,
    Lightning,
    Confuse,
    Fireball,
    MagicMapping,
    PhaseDoor,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub effect: UseEffect,
    pub quantity: u32,
}

impl Item {
    pub fn new(effect: UseEffect) -> Self {
        Self {
            effect,
            quantity: 1,
        }
    }
}

/// A generic positioned object: the player, a monster, an item, the stairs.
/// Capabilities are optional components rather than subtypes.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entity {
    pub x: i32,
    pub y: i32,
    pub glyph: char,
    pub color: RGB,
    pub name: String,
    pub blocks: bool,
    pub always_visible: bool,
    pub fighter: Option<Fighter>,
    pub behavior: Option<Behavior>,
    pub item: Option<Item>,
}

impl Entity {
    pub fn new<S: Into<String>>(x: i32, y: i32, glyph: char, color: RGB, name: S) -> Self {
        Self {
            x,
            y,
            glyph,
            color,
            name: name.into(),
            blocks: false,
            always_visible: false,
            fighter: None,
            behavior: None,
            item: None,
        }
    }

    pub fn blocking(mut self) -> Self {
        self.blocks = true;
        self
    }

    pub fn always_visible(mut self) -> Self {
        self.always_visible = true;
        self
    }

    pub fn with_fighter(mut self, fighter: Fighter) -> Self {
        self.fighter = Some(fighter);
        self
    }

    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = Some(behavior);
        self
    }

    pub fn with_item(mut self, item: Item) -> Self {
        self.item = Some(item);
        self
    }

    pub fn pos(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn set_pos(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
    }

    pub fn distance(&self, x: i32, y: i32) -> f32 {
        DistanceAlg::Pythagoras.distance2d(self.pos(), Point::new(x, y))
    }

    pub fn distance_to(&self, other: &Entity) -> f32 {
        self.distance(other.x, other.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bracket_terminal::prelude::WHITE;

    #[test]
    fn heal_clamps_at_max() {
        let mut fighter = Fighter::new(10, 0, 3, DeathBehavior::Monster);
        fighter.hp = 8;
        assert_eq!(fighter.heal(5), 2);
        assert_eq!(fighter.hp, 10);
    }

    #[test]
    fn distance_is_euclidean() {
        let a = Entity::new(0, 0, '@', RGB::named(WHITE), "a");
        let b = Entity::new(3, 4, 'b', RGB::named(WHITE), "b");
        assert!((a.distance_to(&b) - 5.0).abs() < f32::EPSILON);
    }

    #[test]
    fn components_attach_through_builders() {
        let orc = Entity::new(1, 1, 'o', RGB::named(WHITE), "orc")
            .blocking()
            .with_fighter(Fighter::new(10, 0, 3, DeathBehavior::Monster))
            .with_behavior(Behavior::Basic);
        assert!(orc.blocks);
        assert!(orc.fighter.is_some());
        assert!(orc.behavior.is_some());
        assert!(orc.item.is_none());
    }
}
