use bracket_geometry::prelude::{DistanceAlg, Point};
use bracket_terminal::prelude::*;

use crate::fov::Fov;
use crate::game::World;

pub const SCREEN_WIDTH: i32 = 80;
pub const SCREEN_HEIGHT: i32 = 50;
pub const PANEL_Y: i32 = 43;

const BAR_WIDTH: i32 = 20;
const MSG_X: i32 = BAR_WIDTH + 2;
const MSG_COUNT: usize = 5;

const COLOR_LIGHT_WALL: (u8, u8, u8) = (130, 110, 50);
const COLOR_LIGHT_GROUND: (u8, u8, u8) = (200, 180, 50);
const COLOR_DARK_WALL: (u8, u8, u8) = (0, 0, 100);
const COLOR_DARK_GROUND: (u8, u8, u8) = (50, 50, 150);

/// Map, entities in list order, then the status panel.
pub fn draw_world(ctx: &mut BTerm, world: &World, fov: &Fov) {
    draw_map(ctx, world, fov);
    draw_entities(ctx, world, fov);
    draw_panel(ctx, world, fov);
}

fn draw_map(ctx: &mut BTerm, world: &World, fov: &Fov) {
    for y in 0..world.map.height {
        for x in 0..world.map.width {
            let Some(tile) = world.map.tile_at(x, y) else {
                continue;
            };
            let bg = match (fov.is_visible(x, y), tile.block_sight) {
                (true, true) => COLOR_LIGHT_WALL,
                (true, false) => COLOR_LIGHT_GROUND,
                (false, true) => COLOR_DARK_WALL,
                (false, false) => COLOR_DARK_GROUND,
            };
            if fov.is_visible(x, y) || tile.explored {
                ctx.set(
                    x,
                    y,
                    RGB::named(BLACK),
                    RGB::from_u8(bg.0, bg.1, bg.2),
                    to_cp437(' '),
                );
            }
        }
    }
}

/// List order is draw order; corpses and items sit at the front and get
/// painted over by whatever stands on them.
fn draw_entities(ctx: &mut BTerm, world: &World, fov: &Fov) {
    for entity in &world.entities {
        let lit = fov.is_visible(entity.x, entity.y);
        let remembered = entity.always_visible
            && world
                .map
                .tile_at(entity.x, entity.y)
                .map_or(false, |tile| tile.explored);
        if !lit && !remembered {
            continue;
        }
        let bg = if lit {
            RGB::from_u8(COLOR_LIGHT_GROUND.0, COLOR_LIGHT_GROUND.1, COLOR_LIGHT_GROUND.2)
        } else {
            RGB::from_u8(COLOR_DARK_GROUND.0, COLOR_DARK_GROUND.1, COLOR_DARK_GROUND.2)
        };
        ctx.set(entity.x, entity.y, entity.color, bg, to_cp437(entity.glyph));
    }
}

fn draw_panel(ctx: &mut BTerm, world: &World, fov: &Fov) {
    ctx.draw_box(
        0,
        PANEL_Y,
        SCREEN_WIDTH - 1,
        SCREEN_HEIGHT - PANEL_Y - 1,
        RGB::named(GRAY),
        RGB::named(BLACK),
    );

    if let Some(fighter) = world.player().fighter.as_ref() {
        ctx.print_color(
            1,
            PANEL_Y + 1,
            RGB::named(WHITE),
            RGB::named(BLACK),
            format!("HP {}/{}", fighter.hp, fighter.max_hp),
        );
        ctx.draw_bar_horizontal(
            1,
            PANEL_Y + 2,
            BAR_WIDTH,
            fighter.hp.max(0),
            fighter.max_hp,
            RGB::named(RED),
            RGB::named(DARK_RED),
        );
    }
    ctx.print_color(
        1,
        PANEL_Y + 4,
        RGB::named(LIGHT_GRAY),
        RGB::named(BLACK),
        format!("Depth {}", world.depth),
    );

    for (row, (text, color)) in world.log.recent(MSG_COUNT).iter().enumerate() {
        ctx.print_color(MSG_X, PANEL_Y + 1 + row as i32, *color, RGB::named(BLACK), text);
    }

    let under_mouse = names_under_mouse(world, fov, ctx.mouse_pos());
    if !under_mouse.is_empty() {
        ctx.print_color(
            MSG_X,
            PANEL_Y,
            RGB::named(LIGHT_GRAY),
            RGB::named(BLACK),
            under_mouse,
        );
    }
}

/// Comma-joined names of visible entities on the hovered cell.
pub fn names_under_mouse(world: &World, fov: &Fov, mouse: (i32, i32)) -> String {
    let (mx, my) = mouse;
    if !fov.is_visible(mx, my) {
        return String::new();
    }
    world
        .entities
        .iter()
        .filter(|entity| entity.x == mx && entity.y == my)
        .map(|entity| entity.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Lettered inventory menu; selection is read back by the caller through
/// `letter_to_option`.
pub fn inventory_menu(ctx: &mut BTerm, world: &World, title: &str) {
    let count = world.inventory.len() as i32;
    let height = count.max(1) + 3;
    let width = 40;
    let x = (SCREEN_WIDTH - width) / 2;
    let y = (PANEL_Y - height) / 2;

    ctx.draw_box(x, y, width, height, RGB::named(WHITE), RGB::named(BLACK));
    ctx.print_color(x + 2, y, RGB::named(YELLOW), RGB::named(BLACK), title);

    if world.inventory.is_empty() {
        ctx.print_color(
            x + 2,
            y + 2,
            RGB::named(GRAY),
            RGB::named(BLACK),
            "Inventory is empty.",
        );
        return;
    }
    for (slot, entity) in world.inventory.iter().enumerate() {
        let letter = (b'a' + slot as u8) as char;
        let quantity = entity.item.as_ref().map(|item| item.quantity).unwrap_or(1);
        let label = if quantity > 1 {
            format!("({letter}) {} (x{quantity})", entity.name)
        } else {
            format!("({letter}) {}", entity.name)
        };
        ctx.print_color(x + 2, y + 2 + slot as i32, entity.color, RGB::named(BLACK), label);
    }
    ctx.print_color(
        x + 2,
        y + height,
        RGB::named(GRAY),
        RGB::named(BLACK),
        "a-z select, Esc cancel",
    );
}

/// Instruction strip plus a highlight of the hovered cell while the player
/// picks a tile.
pub fn targeting_overlay(ctx: &mut BTerm, fov: &Fov, range: Option<i32>, origin: Point) {
    ctx.print_color(
        1,
        0,
        RGB::named(CYAN),
        RGB::named(BLACK),
        "Left-click a target tile, or Esc to cancel",
    );
    let (mx, my) = ctx.mouse_pos();
    let in_range = range.map_or(true, |r| {
        DistanceAlg::Pythagoras.distance2d(origin, Point::new(mx, my)) <= r as f32
    });
    let color = if fov.is_visible(mx, my) && in_range {
        RGB::named(CYAN)
    } else {
        RGB::named(RED)
    };
    ctx.set_bg(mx, my, color);
}

pub fn main_menu(ctx: &mut BTerm, notice: Option<&str>) {
    ctx.print_color_centered(
        SCREEN_HEIGHT / 2 - 6,
        RGB::named(YELLOW),
        RGB::named(BLACK),
        "EMBERCRAWL",
    );
    ctx.print_color_centered(
        SCREEN_HEIGHT / 2,
        RGB::named(WHITE),
        RGB::named(BLACK),
        "(N) New game",
    );
    ctx.print_color_centered(
        SCREEN_HEIGHT / 2 + 1,
        RGB::named(WHITE),
        RGB::named(BLACK),
        "(C) Continue last game",
    );
    ctx.print_color_centered(
        SCREEN_HEIGHT / 2 + 2,
        RGB::named(WHITE),
        RGB::named(BLACK),
        "(Q) Quit",
    );
    if let Some(notice) = notice {
        ctx.print_color_centered(
            SCREEN_HEIGHT / 2 + 5,
            RGB::named(RED),
            RGB::named(BLACK),
            notice,
        );
    }
}
