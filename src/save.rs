use chrono::{DateTime, Local};
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::GameError;
use crate::game::World;

/// One named slot, overwritten on every save. No versioning.
pub const SAVE_SLOT: &str = "savegame.json";

#[derive(Deserialize)]
struct SaveFile {
    #[allow(dead_code)]
    saved_at: DateTime<Local>,
    world: World,
}

pub fn save_game(world: &World) -> Result<(), GameError> {
    save_to(world, Path::new(SAVE_SLOT))
}

pub fn save_to(world: &World, path: &Path) -> Result<(), GameError> {
    let record = serde_json::json!({
        "saved_at": Local::now(),
        "world": world,
    });
    fs::write(path, serde_json::to_string(&record)?)?;
    log::info!("world saved to {}", path.display());
    Ok(())
}

pub fn load_game() -> Result<World, GameError> {
    load_from(Path::new(SAVE_SLOT))
}

pub fn load_from(path: &Path) -> Result<World, GameError> {
    if !path.exists() {
        return Err(GameError::SaveMissing);
    }
    let blob = fs::read_to_string(path)?;
    let save: SaveFile = serde_json::from_str(&blob)?;
    let world = save.world;
    // The player back-reference is an index into the entity list; a slot
    // that does not resolve is structurally unusable.
    if world.player >= world.entities.len() {
        return Err(GameError::SaveInvalid {
            reason: "player index out of range",
        });
    }
    log::info!("world loaded from {}", path.display());
    Ok(world)
}
