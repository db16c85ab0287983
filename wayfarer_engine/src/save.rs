//! Save-game discovery and serialization helpers.
//!
//! Sessions are snapshotted to RON under `saved_games/`, one file per slot,
//! with the engine version baked into the file name and the payload. Listing
//! is tolerant: a save that fails to parse is shown as corrupted instead of
//! breaking the whole list, and a version mismatch is a warning, not an
//! error. Fights and temporary menus are not part of a snapshot.

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use anyhow::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc2822;

use crate::WAYFARER_VERSION;
use crate::actor::Player;
use crate::event::VarValue;
use crate::state::{GameData, GameState};

pub const SAVE_DIR: &str = "saved_games";

/// The serialized form of a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveData {
    pub version: String,
    pub player: Player,
    pub state: GameState,
    pub location: Option<String>,
    pub dialogs: Vec<String>,
    pub variables: HashMap<String, VarValue>,
    pub clock_minutes: u64,
}

impl SaveData {
    pub fn from_game(game: &GameData) -> SaveData {
        SaveData {
            version: WAYFARER_VERSION.to_string(),
            player: game.player.clone(),
            state: if game.state == GameState::Fight {
                // fights don't survive a snapshot; resume where it started
                GameState::Location
            } else {
                game.state
            },
            location: game.location.clone(),
            dialogs: game.dialogs.clone(),
            variables: game.variables.clone(),
            clock_minutes: game.clock_minutes,
        }
    }

    pub fn into_game(self) -> GameData {
        let mut game = GameData::new(self.player);
        game.state = self.state;
        game.location = self.location;
        game.dialogs = self.dialogs;
        game.variables = self.variables;
        game.clock_minutes = self.clock_minutes;
        game
    }
}

/// Serialize the session to `<dir>/<slot>-wayfarer-<version>.ron`.
pub fn save_game_in(game: &GameData, slot: &str, dir: &Path) -> Result<PathBuf> {
    let data = SaveData::from_game(game);
    let ron = ron::ser::to_string(&data).context("serializing save data to RON")?;

    fs::create_dir_all(dir).with_context(|| format!("creating save folder '{}'", dir.display()))?;
    let path = dir.join(format!("{slot}-wayfarer-{WAYFARER_VERSION}.ron"));
    let mut file = fs::File::create(&path).with_context(|| format!("creating file '{}'", path.display()))?;
    file.write_all(ron.as_bytes())
        .with_context(|| format!("writing save file '{}'", path.display()))?;

    info!("saved game to slot '{slot}' ({})", path.display());
    Ok(path)
}

/// Read a save file back into a session.
pub fn load_game(path: &Path) -> Result<GameData> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading save file {}", path.display()))?;
    let data: SaveData = ron::from_str(&raw).with_context(|| format!("parsing save file {}", path.display()))?;
    if data.version != WAYFARER_VERSION {
        warn!(
            "save '{}' was written by v{}, engine is v{WAYFARER_VERSION}",
            path.display(),
            data.version
        );
    }
    Ok(data.into_game())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSlot {
    pub slot: String,
    pub version: String,
    pub path: PathBuf,
    pub file_name: String,
    pub modified: Option<SystemTime>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveFileStatus {
    Ready,
    VersionMismatch { save_version: String, current_version: String },
    Corrupted { message: String },
}

/// What the player sees in a save listing.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveFileEntry {
    pub slot: String,
    pub version: String,
    pub path: PathBuf,
    pub file_name: String,
    pub modified: Option<SystemTime>,
    pub summary: Option<SaveSummary>,
    pub status: SaveFileStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaveSummary {
    pub player_name: String,
    pub location: Option<String>,
    pub clock_minutes: u64,
}

/// Discover save slot files stored in `dir`.
pub fn collect_save_slots(dir: &Path) -> Result<Vec<SaveSlot>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut slots = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading {}", dir.display()))? {
        let entry = entry.with_context(|| format!("enumerating {}", dir.display()))?;
        if let Some(slot) = slot_from_entry(&entry) {
            slots.push(slot);
        }
    }
    slots.sort_by(|a, b| a.slot.cmp(&b.slot).then(a.version.cmp(&b.version)));
    Ok(slots)
}

/// Build descriptive entries for save files located in `dir`, newest first.
pub fn build_save_entries(dir: &Path) -> Result<Vec<SaveFileEntry>> {
    let slots = collect_save_slots(dir)?;
    let mut entries: Vec<_> = slots.into_iter().map(entry_for_slot).collect();
    entries.sort_by(|a, b| b.modified.cmp(&a.modified).then(a.slot.cmp(&b.slot)));
    Ok(entries)
}

/// Format a file's modified time as a local timestamp.
pub fn format_modified(modified: SystemTime) -> String {
    let timestamp = OffsetDateTime::from(modified);
    let local = time::UtcOffset::current_local_offset()
        .map_or(timestamp, |offset| timestamp.to_offset(offset));
    local.format(&Rfc2822).unwrap_or_else(|_| "unknown time".to_string())
}

fn entry_for_slot(slot: SaveSlot) -> SaveFileEntry {
    let mut version = slot.version.clone();
    let (summary, status) = match fs::read_to_string(&slot.path) {
        Ok(raw) => match ron::from_str::<SaveData>(&raw) {
            Ok(data) => {
                version.clone_from(&data.version);
                let status = if data.version == WAYFARER_VERSION {
                    SaveFileStatus::Ready
                } else {
                    SaveFileStatus::VersionMismatch {
                        save_version: data.version.clone(),
                        current_version: WAYFARER_VERSION.to_string(),
                    }
                };
                let summary = SaveSummary {
                    player_name: data.player.name.clone(),
                    location: data.location.clone(),
                    clock_minutes: data.clock_minutes,
                };
                (Some(summary), status)
            },
            Err(err) => {
                warn!("failed to parse save '{}' ({}): {err}", slot.slot, slot.path.display());
                (
                    None,
                    SaveFileStatus::Corrupted {
                        message: format!("parse error: {err}"),
                    },
                )
            },
        },
        Err(err) => {
            warn!("failed to read save '{}' ({}): {err}", slot.slot, slot.path.display());
            (
                None,
                SaveFileStatus::Corrupted {
                    message: format!("read error: {err}"),
                },
            )
        },
    };

    SaveFileEntry {
        slot: slot.slot,
        version,
        path: slot.path,
        file_name: slot.file_name,
        modified: slot.modified,
        summary,
        status,
    }
}

fn slot_from_entry(entry: &fs::DirEntry) -> Option<SaveSlot> {
    let path = entry.path();
    if !path.is_file() {
        return None;
    }
    if path.extension().and_then(|ext| ext.to_str()) != Some("ron") {
        return None;
    }
    let file_name = path.file_name().and_then(|name| name.to_str())?.to_string();
    let stem = path.file_stem().and_then(|stem| stem.to_str())?;
    let (slot, version) = stem.rsplit_once("-wayfarer-")?;
    if slot.is_empty() {
        return None;
    }
    let modified = entry.metadata().ok().and_then(|meta| meta.modified().ok());
    Some(SaveSlot {
        slot: slot.to_string(),
        version: version.to_string(),
        path,
        file_name,
        modified,
    })
}
