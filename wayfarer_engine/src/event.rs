//! Game events.
//!
//! Every selectable menu option resolves to a [`GameEvent`], as do location
//! `on_enter` hooks and start callbacks. Events are plain data here; the
//! state machine applies them (see [`crate::state`]).

use crate::item::ConsumeEffect;
use crate::options::OptionList;
use crate::view::ScreenId;
use serde::{Deserialize, Serialize};
use std::fmt;
use wayfarer_data::{EventDef, VarDef};

/// Value types storable in the game's variables map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarValue {
    Bool(bool),
    Int(i64),
    Text(String),
}

impl VarValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            VarValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            VarValue::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for VarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VarValue::Bool(b) => write!(f, "{b}"),
            VarValue::Int(n) => write!(f, "{n}"),
            VarValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl From<&VarDef> for VarValue {
    fn from(def: &VarDef) -> Self {
        match def {
            VarDef::Bool(b) => VarValue::Bool(*b),
            VarDef::Int(n) => VarValue::Int(*n),
            VarDef::Text(s) => VarValue::Text(s.clone()),
        }
    }
}

/// An action applied against the running game.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// Travel to a location, spending in-game minutes.
    GoTo { dest: String, minutes: u32 },
    OpenDialog { dialog: String },
    /// Leave the current dialog, returning to the current location.
    EndDialog,
    StartFight { monster: String },
    StopFight,
    GiveItem { item: String, count: u32 },
    TakeItem { item: String, count: u32 },
    SetVar { name: String, value: VarValue },
    /// Apply a consumable-style effect directly to the player.
    ApplyEffect(ConsumeEffect),
    PushScreen(ScreenId),
    PopScreen,
    SwapScreen(ScreenId),
    /// Temporarily replace the displayed options (paged sub-menus).
    SetOptions(OptionList),
    /// Drop the option override, restoring the displayable's own options.
    ClearOptions,
    Compound(Vec<GameEvent>),
    Quit,
}

impl GameEvent {
    /// Short action name, used in debug logging.
    pub fn action(&self) -> &'static str {
        match self {
            GameEvent::GoTo { .. } => "GoTo",
            GameEvent::OpenDialog { .. } => "OpenDialog",
            GameEvent::EndDialog => "EndDialog",
            GameEvent::StartFight { .. } => "StartFight",
            GameEvent::StopFight => "StopFight",
            GameEvent::GiveItem { .. } => "GiveItem",
            GameEvent::TakeItem { .. } => "TakeItem",
            GameEvent::SetVar { .. } => "SetVar",
            GameEvent::ApplyEffect(_) => "ApplyEffect",
            GameEvent::PushScreen(_) => "PushScreen",
            GameEvent::PopScreen => "PopScreen",
            GameEvent::SwapScreen(_) => "SwapScreen",
            GameEvent::SetOptions(_) => "SetOptions",
            GameEvent::ClearOptions => "ClearOptions",
            GameEvent::Compound(_) => "Compound",
            GameEvent::Quit => "Quit",
        }
    }
}

impl From<&EventDef> for GameEvent {
    fn from(def: &EventDef) -> Self {
        match def {
            EventDef::GoTo { dest, minutes } => GameEvent::GoTo {
                dest: dest.clone(),
                minutes: *minutes,
            },
            EventDef::OpenDialog { dialog } => GameEvent::OpenDialog { dialog: dialog.clone() },
            EventDef::EndDialog => GameEvent::EndDialog,
            EventDef::StartFight { monster } => GameEvent::StartFight { monster: monster.clone() },
            EventDef::GiveItem { item, count } => GameEvent::GiveItem {
                item: item.clone(),
                count: *count,
            },
            EventDef::TakeItem { item, count } => GameEvent::TakeItem {
                item: item.clone(),
                count: *count,
            },
            EventDef::SetVar { name, value } => GameEvent::SetVar {
                name: name.clone(),
                value: value.into(),
            },
            EventDef::Quit => GameEvent::Quit,
        }
    }
}

/// Convert a slice of defs into runtime events.
pub fn events_from_defs(defs: &[EventDef]) -> Vec<GameEvent> {
    defs.iter().map(GameEvent::from).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_defs_convert() {
        let defs = vec![
            EventDef::GoTo {
                dest: "prologue.town_square".into(),
                minutes: 5,
            },
            EventDef::SetVar {
                name: "prologue.done".into(),
                value: VarDef::Bool(true),
            },
            EventDef::Quit,
        ];
        let events = events_from_defs(&defs);
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].action(), "GoTo");
        assert_eq!(
            events[1],
            GameEvent::SetVar {
                name: "prologue.done".into(),
                value: VarValue::Bool(true),
            }
        );
        assert_eq!(events[2], GameEvent::Quit);
    }

    #[test]
    fn var_value_accessors() {
        assert_eq!(VarValue::Bool(true).as_bool(), Some(true));
        assert_eq!(VarValue::Int(3).as_bool(), None);
        assert_eq!(VarValue::Int(3).as_int(), Some(3));
        assert_eq!(VarValue::Text("hi".into()).to_string(), "hi");
    }
}
