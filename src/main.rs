mod ai;
mod combat;
mod data;
mod entities;
mod error;
mod fov;
mod game;
mod items;
mod map;
mod render;
mod save;

use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;
use bracket_terminal::prelude::*;

use fov::Fov;
use game::{Phase, World};
use items::UseResult;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum MenuPurpose {
    Use,
    Drop,
}

#[derive(Clone, Debug)]
enum RunMode {
    MainMenu { notice: Option<String> },
    Playing,
    Inventory { purpose: MenuPurpose },
    Targeting { inv_index: usize, range: Option<i32> },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum PlayerAction {
    TookTurn,
    DidNotTakeTurn,
}

struct EmbercrawlState {
    world: Option<World>,
    fov: Fov,
    rng: RandomNumberGenerator,
    mode: RunMode,
}

impl Default for EmbercrawlState {
    fn default() -> Self {
        Self {
            world: None,
            fov: Fov::default(),
            rng: RandomNumberGenerator::new(),
            mode: RunMode::MainMenu { notice: None },
        }
    }
}

impl GameState for EmbercrawlState {
    fn tick(&mut self, ctx: &mut BTerm) {
        ctx.cls();
        match &self.mode {
            RunMode::MainMenu { .. } => self.main_menu_tick(ctx),
            _ => self.game_tick(ctx),
        }
    }
}

impl EmbercrawlState {
    fn main_menu_tick(&mut self, ctx: &mut BTerm) {
        let notice = match &self.mode {
            RunMode::MainMenu { notice } => notice.clone(),
            _ => None,
        };
        render::main_menu(ctx, notice.as_deref());

        let Some(key) = ctx.key else { return };
        match key {
            VirtualKeyCode::N => match World::new_game(&mut self.rng) {
                Ok(world) => self.enter_game(world),
                Err(err) => {
                    log::error!("could not start a new game: {err}");
                    self.mode = RunMode::MainMenu {
                        notice: Some("Failed to generate a dungeon.".to_string()),
                    };
                }
            },
            VirtualKeyCode::C => match save::load_game() {
                Ok(world) => self.enter_game(world),
                Err(err) => {
                    log::warn!("could not load the save slot: {err}");
                    self.mode = RunMode::MainMenu {
                        notice: Some("No saved game to load.".to_string()),
                    };
                }
            },
            VirtualKeyCode::Q => ctx.quitting = true,
            _ => {}
        }
    }

    fn enter_game(&mut self, world: World) {
        self.world = Some(world);
        self.fov.rebuild();
        self.mode = RunMode::Playing;
    }

    fn game_tick(&mut self, ctx: &mut BTerm) {
        let Some(world) = self.world.as_mut() else {
            self.mode = RunMode::MainMenu { notice: None };
            return;
        };

        let origin = world.player().pos();
        self.fov.compute(&mut world.map, origin);
        render::draw_world(ctx, world, &self.fov);

        let (action, next_mode) = match &self.mode {
            RunMode::Playing => playing_input(ctx, world, &mut self.rng),
            RunMode::Inventory { purpose } => {
                inventory_input(ctx, world, &self.fov, &mut self.rng, *purpose)
            }
            RunMode::Targeting { inv_index, range } => {
                targeting_input(ctx, world, &self.fov, *inv_index, *range)
            }
            RunMode::MainMenu { .. } => (PlayerAction::DidNotTakeTurn, None),
        };

        if action == PlayerAction::TookTurn && world.phase == Phase::Playing {
            // Monsters see the board as it stands after the player acted.
            let origin = world.player().pos();
            self.fov.compute(&mut world.map, origin);
            ai::monsters_turn(world, &self.fov, &mut self.rng);
        }
        if let Some(mode) = next_mode {
            self.mode = mode;
        }
    }
}

fn playing_input(
    ctx: &mut BTerm,
    world: &mut World,
    rng: &mut RandomNumberGenerator,
) -> (PlayerAction, Option<RunMode>) {
    let Some(key) = ctx.key else {
        return (PlayerAction::DidNotTakeTurn, None);
    };

    if world.phase == Phase::Dead {
        // Only the menu remains; the save slot is left as it was.
        return match key {
            VirtualKeyCode::Escape => (
                PlayerAction::DidNotTakeTurn,
                Some(RunMode::MainMenu { notice: None }),
            ),
            _ => (PlayerAction::DidNotTakeTurn, None),
        };
    }

    match key {
        VirtualKeyCode::Left | VirtualKeyCode::H => step(world, -1, 0),
        VirtualKeyCode::Right | VirtualKeyCode::L => step(world, 1, 0),
        VirtualKeyCode::Up | VirtualKeyCode::K => step(world, 0, -1),
        VirtualKeyCode::Down | VirtualKeyCode::J => step(world, 0, 1),
        VirtualKeyCode::G => {
            if let Some(idx) = world.item_under_player() {
                world.pick_item_up(idx);
            } else {
                world
                    .log
                    .add("There is nothing here to pick up.", RGB::named(GRAY));
            }
            (PlayerAction::DidNotTakeTurn, None)
        }
        VirtualKeyCode::I => (
            PlayerAction::DidNotTakeTurn,
            Some(RunMode::Inventory {
                purpose: MenuPurpose::Use,
            }),
        ),
        VirtualKeyCode::D => (
            PlayerAction::DidNotTakeTurn,
            Some(RunMode::Inventory {
                purpose: MenuPurpose::Drop,
            }),
        ),
        VirtualKeyCode::Period => take_stairs(world, rng, 1),
        VirtualKeyCode::Comma => take_stairs(world, rng, -1),
        VirtualKeyCode::Escape => {
            if let Err(err) = save::save_game(world) {
                log::error!("could not save the game: {err}");
            }
            (
                PlayerAction::DidNotTakeTurn,
                Some(RunMode::MainMenu { notice: None }),
            )
        }
        _ => (PlayerAction::DidNotTakeTurn, None),
    }
}

fn step(world: &mut World, dx: i32, dy: i32) -> (PlayerAction, Option<RunMode>) {
    world.player_move_or_attack(dx, dy);
    (PlayerAction::TookTurn, None)
}

fn take_stairs(
    world: &mut World,
    rng: &mut RandomNumberGenerator,
    delta: i32,
) -> (PlayerAction, Option<RunMode>) {
    if world.stairs_under_player() == Some(delta) {
        if let Err(err) = world.change_depth(delta, rng) {
            log::error!("failed to generate the next floor: {err}");
        }
    } else {
        world
            .log
            .add("There are no stairs here.", RGB::named(GRAY));
    }
    (PlayerAction::DidNotTakeTurn, None)
}

fn inventory_input(
    ctx: &mut BTerm,
    world: &mut World,
    fov: &Fov,
    rng: &mut RandomNumberGenerator,
    purpose: MenuPurpose,
) -> (PlayerAction, Option<RunMode>) {
    let title = match purpose {
        MenuPurpose::Use => "Use which item?",
        MenuPurpose::Drop => "Drop which item?",
    };
    render::inventory_menu(ctx, world, title);

    let Some(key) = ctx.key else {
        return (PlayerAction::DidNotTakeTurn, None);
    };
    if key == VirtualKeyCode::Escape {
        return (PlayerAction::DidNotTakeTurn, Some(RunMode::Playing));
    }
    let selection = letter_to_option(key);
    if selection < 0 || selection as usize >= world.inventory.len() {
        return (PlayerAction::DidNotTakeTurn, None);
    }
    let slot = selection as usize;

    match purpose {
        MenuPurpose::Use => match items::use_item(world, fov, rng, slot) {
            UseResult::UsedUp => (PlayerAction::TookTurn, Some(RunMode::Playing)),
            UseResult::NeedsTarget { range } => (
                PlayerAction::DidNotTakeTurn,
                Some(RunMode::Targeting {
                    inv_index: slot,
                    range,
                }),
            ),
            UseResult::Cancelled => (PlayerAction::DidNotTakeTurn, Some(RunMode::Playing)),
        },
        MenuPurpose::Drop => {
            world.drop_item(slot);
            (PlayerAction::TookTurn, Some(RunMode::Playing))
        }
    }
}

fn targeting_input(
    ctx: &mut BTerm,
    world: &mut World,
    fov: &Fov,
    inv_index: usize,
    range: Option<i32>,
) -> (PlayerAction, Option<RunMode>) {
    render::targeting_overlay(ctx, fov, range, world.player().pos());

    if ctx.key == Some(VirtualKeyCode::Escape) {
        return (PlayerAction::DidNotTakeTurn, Some(RunMode::Playing));
    }
    if ctx.left_click {
        let (mx, my) = ctx.mouse_pos();
        let in_range = range.map_or(true, |r| world.player().distance(mx, my) <= r as f32);
        if fov.is_visible(mx, my) && in_range {
            return match items::use_item_at(world, inv_index, Point::new(mx, my)) {
                UseResult::UsedUp => (PlayerAction::TookTurn, Some(RunMode::Playing)),
                _ => (PlayerAction::DidNotTakeTurn, Some(RunMode::Playing)),
            };
        }
    }
    (PlayerAction::DidNotTakeTurn, None)
}

fn main() -> BError {
    env_logger::init();
    let context = BTermBuilder::simple80x50()
        .with_title("Embercrawl")
        .build()?;
    main_loop(context, EmbercrawlState::default())
}
