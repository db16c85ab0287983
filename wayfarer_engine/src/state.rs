//! Game state machine.
//!
//! A running game is always in one of four states: stopped, at a location,
//! inside a dialog, or in a fight. [`GameData`] holds everything a session
//! owns (the player, variables, the in-game clock, the current state) and is
//! driven entirely by [`GameEvent`]s. Screen changes and program exit can't
//! be performed here; they come back to the shell as [`StateSignal`]s.

use std::collections::HashMap;

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::actor::Player;
use crate::event::{GameEvent, VarValue};
use crate::fight::{Fight, FightOutcome};
use crate::options::OptionList;
use crate::resources::ResourceSet;
use crate::view::ScreenId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GameState {
    #[default]
    Stopped,
    Location,
    Dialog,
    Fight,
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("no start callback set a location")]
    NoStartLocation,
    #[error("unknown location '{0}'")]
    UnknownLocation(String),
    #[error("unknown dialog '{0}'")]
    UnknownDialog(String),
    #[error("unknown monster '{0}'")]
    UnknownMonster(String),
    #[error("unknown item '{0}'")]
    UnknownItem(String),
    #[error("game is not running")]
    NotRunning,
}

/// Effects the state machine cannot apply itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateSignal {
    Quit,
    Push(ScreenId),
    Pop,
    Swap(ScreenId),
}

/// Narration plus deferred screen effects from a batch of events.
#[derive(Debug, Clone, Default)]
pub struct Outcome {
    pub lines: Vec<String>,
    pub signals: Vec<StateSignal>,
}

impl Outcome {
    pub fn merge(&mut self, other: Outcome) {
        self.lines.extend(other.lines);
        self.signals.extend(other.signals);
    }
}

/// One game session.
#[derive(Debug, Clone)]
pub struct GameData {
    pub state: GameState,
    pub player: Player,
    pub variables: HashMap<String, VarValue>,
    pub location: Option<String>,
    pub dialogs: Vec<String>,
    pub fight: Option<Fight>,
    pub option_override: Option<OptionList>,
    /// In-game minutes elapsed, advanced by travel.
    pub clock_minutes: u64,
}

impl GameData {
    pub fn new(player: Player) -> GameData {
        GameData {
            state: GameState::Stopped,
            player,
            variables: HashMap::new(),
            location: None,
            dialogs: Vec::new(),
            fight: None,
            option_override: None,
            clock_minutes: 0,
        }
    }

    /// Begin a new game: run every registered start callback, in id order so
    /// runs are repeatable. At least one of them must move the player to a
    /// location.
    pub fn start(&mut self, resources: &ResourceSet) -> Result<Outcome, StateError> {
        let mut callbacks: Vec<_> = resources
            .iter(crate::resource::ResourceKind::Callback)
            .filter_map(crate::resource::Resource::callback_ref)
            .collect();
        callbacks.sort_by(|a, b| a.id.cmp(&b.id));

        let mut outcome = Outcome::default();
        for callback in callbacks {
            debug!("running start callback '{}'", callback.id);
            for event in callback.events.clone() {
                outcome.merge(self.apply(&event, resources)?);
            }
        }
        if self.location.is_none() {
            return Err(StateError::NoStartLocation);
        }
        info!("game started for player '{}'", self.player.name);
        Ok(outcome)
    }

    pub fn is_running(&self) -> bool {
        self.state != GameState::Stopped
    }

    /// Move to a location and run its arrival events. An arrival event may
    /// itself travel elsewhere; the last move wins and is what gets shown.
    pub fn set_location(
        &mut self,
        id: &str,
        resources: &ResourceSet,
    ) -> Result<Outcome, StateError> {
        let location = resources
            .location(id)
            .ok_or_else(|| StateError::UnknownLocation(id.to_string()))?;
        let on_enter = location.on_enter.clone();

        debug!("entering location '{id}'");
        self.location = Some(id.to_string());
        self.dialogs.clear();
        self.option_override = None;
        self.state = GameState::Location;

        let mut outcome = Outcome::default();
        for event in &on_enter {
            outcome.merge(self.apply(event, resources)?);
        }
        Ok(outcome)
    }

    pub fn open_dialog(&mut self, id: &str, resources: &ResourceSet) -> Result<(), StateError> {
        if resources.dialog(id).is_none() {
            return Err(StateError::UnknownDialog(id.to_string()));
        }
        debug!("opening dialog '{id}'");
        self.dialogs.push(id.to_string());
        self.option_override = None;
        self.state = GameState::Dialog;
        Ok(())
    }

    /// Close the innermost dialog, falling back to the one below it or to
    /// the current location.
    pub fn end_dialog(&mut self) {
        self.dialogs.pop();
        self.option_override = None;
        self.state = if self.dialogs.is_empty() {
            GameState::Location
        } else {
            GameState::Dialog
        };
    }

    pub fn start_fight(&mut self, monster: &str, resources: &ResourceSet) -> Result<Outcome, StateError> {
        let template = resources
            .monster(monster)
            .ok_or_else(|| StateError::UnknownMonster(monster.to_string()))?;
        let fight = Fight::new(template.generate(&mut rand::rng()));
        info!("fight started against '{monster}'");

        let mut outcome = Outcome::default();
        outcome.lines.push(fight.intro());
        self.fight = Some(fight);
        self.option_override = None;
        self.state = GameState::Fight;
        Ok(outcome)
    }

    pub fn stop_fight(&mut self) {
        self.fight = None;
        self.option_override = None;
        self.state = if self.dialogs.is_empty() {
            GameState::Location
        } else {
            GameState::Dialog
        };
    }

    /// Resolve a finished fight. Victory banks an attribute point and, like
    /// flight, returns play to where it was; defeat stops the game and pops
    /// back out of the game screen.
    pub fn settle_fight(&mut self) -> Option<Outcome> {
        let outcome_kind = self.fight.as_ref().and_then(|f| f.outcome)?;
        let mut outcome = Outcome::default();
        match outcome_kind {
            FightOutcome::Victory => {
                self.player.attribute_points += 1;
                outcome
                    .lines
                    .push("You gain an attribute point. Spend it with 'train'.".to_string());
                self.stop_fight();
            },
            FightOutcome::Fled => self.stop_fight(),
            FightOutcome::Defeat => {
                self.state = GameState::Stopped;
                self.fight = None;
                self.option_override = None;
                outcome.lines.push("Your journey ends here.".to_string());
                outcome.signals.push(StateSignal::Pop);
            },
        }
        Some(outcome)
    }

    /// Apply one event against the session.
    pub fn apply(&mut self, event: &GameEvent, resources: &ResourceSet) -> Result<Outcome, StateError> {
        debug!("applying event {}", event.action());
        let mut outcome = Outcome::default();
        match event {
            GameEvent::GoTo { dest, minutes } => {
                self.clock_minutes += u64::from(*minutes);
                outcome.merge(self.set_location(dest, resources)?);
            },
            GameEvent::OpenDialog { dialog } => self.open_dialog(dialog, resources)?,
            GameEvent::EndDialog => self.end_dialog(),
            GameEvent::StartFight { monster } => {
                outcome.merge(self.start_fight(monster, resources)?);
            },
            GameEvent::StopFight => self.stop_fight(),
            GameEvent::GiveItem { item, count } => {
                let def = resources
                    .item(item)
                    .ok_or_else(|| StateError::UnknownItem(item.to_string()))?;
                let added = self.player.inventory.add(def, *count);
                if added > 0 {
                    outcome.lines.push(format!("You receive {added}x {}.", def.name));
                }
                if added < *count {
                    warn!("inventory full, dropped {} of '{item}'", count - added);
                    outcome.lines.push("Your pack is full.".to_string());
                }
            },
            GameEvent::TakeItem { item, count } => {
                let def = resources
                    .item(item)
                    .ok_or_else(|| StateError::UnknownItem(item.to_string()))?;
                let removed = self.player.inventory.remove(item, *count);
                if removed > 0 {
                    outcome.lines.push(format!("You lose {removed}x {}.", def.name));
                }
            },
            GameEvent::SetVar { name, value } => {
                debug!("variable '{name}' = {value}");
                self.variables.insert(name.clone(), value.clone());
            },
            GameEvent::ApplyEffect(effect) => {
                effect.apply(&mut self.player.stats);
            },
            GameEvent::PushScreen(id) => outcome.signals.push(StateSignal::Push(*id)),
            GameEvent::PopScreen => outcome.signals.push(StateSignal::Pop),
            GameEvent::SwapScreen(id) => outcome.signals.push(StateSignal::Swap(*id)),
            GameEvent::SetOptions(list) => self.option_override = Some(list.clone()),
            GameEvent::ClearOptions => self.option_override = None,
            GameEvent::Compound(events) => {
                for inner in events {
                    outcome.merge(self.apply(inner, resources)?);
                }
            },
            GameEvent::Quit => outcome.signals.push(StateSignal::Quit),
        }
        Ok(outcome)
    }

    /// The menu to offer right now: a temporary override if one is set,
    /// otherwise whatever the current displayable provides. Fights build
    /// their menus in the shell, as their actions are not events.
    pub fn current_options(&self, resources: &ResourceSet) -> Option<OptionList> {
        if let Some(list) = &self.option_override {
            return Some(list.clone());
        }
        match self.state {
            GameState::Location => {
                let id = self.location.as_deref()?;
                resources.location(id).map(crate::resource::Location::options)
            },
            GameState::Dialog => {
                let id = self.dialogs.last()?;
                resources.dialog(id).map(crate::resource::Dialog::options)
            },
            GameState::Fight | GameState::Stopped => None,
        }
    }

    /// Title and body text of the current displayable.
    pub fn display(&self, resources: &ResourceSet) -> Option<(String, String)> {
        match self.state {
            GameState::Location => {
                let loc = resources.location(self.location.as_deref()?)?;
                Some((loc.title.clone(), loc.text.clone()))
            },
            GameState::Dialog => {
                let dialog = resources.dialog(self.dialogs.last()?)?;
                Some((dialog.title.clone(), dialog.text.clone()))
            },
            GameState::Fight => {
                let fight = self.fight.as_ref()?;
                Some((format!("Fight: {}", fight.monster.name), String::new()))
            },
            GameState::Stopped => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Item, ItemPayload};
    use crate::resource::{Callback, Dialog, DialogOption, Location, Resource};
    use crate::resources::ResourceSet;

    fn location(id: &str, on_enter: Vec<GameEvent>) -> Resource {
        Resource::Location(Location {
            id: id.into(),
            title: id.into(),
            text: format!("You are at {id}."),
            travel: Vec::new(),
            features: Vec::new(),
            npcs: Vec::new(),
            on_enter,
        })
    }

    fn world() -> ResourceSet {
        let mut set = ResourceSet::new();
        set.add(location("town", Vec::new())).unwrap();
        set.add(location("market", Vec::new())).unwrap();
        set.add(Resource::Dialog(Dialog {
            id: "old_man".into(),
            title: "Old Man".into(),
            text: "\"Hello.\"".into(),
            options: vec![DialogOption {
                label: "Goodbye".into(),
                events: Vec::new(),
            }],
        }))
        .unwrap();
        set.add(Resource::Item(Item {
            id: "misc.ore.copper".into(),
            name: "Copper Ore".into(),
            value: 2,
            weight: 3.0,
            stackable: true,
            payload: ItemPayload::Misc,
        }))
        .unwrap();
        set.add(Resource::Callback(Callback {
            id: "start".into(),
            events: vec![GameEvent::GoTo {
                dest: "town".into(),
                minutes: 0,
            }],
        }))
        .unwrap();
        set
    }

    fn session() -> GameData {
        GameData::new(Player::new("tester"))
    }

    #[test]
    fn start_runs_callbacks_and_lands_at_a_location() {
        let resources = world();
        let mut game = session();
        game.start(&resources).unwrap();
        assert_eq!(game.state, GameState::Location);
        assert_eq!(game.location.as_deref(), Some("town"));
        assert!(game.is_running());
    }

    #[test]
    fn start_without_a_location_callback_fails() {
        let mut resources = world();
        resources.clear();
        resources.add(location("town", Vec::new())).unwrap();
        let mut game = session();
        assert!(matches!(game.start(&resources), Err(StateError::NoStartLocation)));
    }

    #[test]
    fn on_enter_redirect_wins() {
        let mut resources = world();
        resources
            .add(location(
                "trap",
                vec![GameEvent::GoTo {
                    dest: "market".into(),
                    minutes: 1,
                }],
            ))
            .unwrap();
        let mut game = session();
        game.start(&resources).unwrap();
        game.apply(
            &GameEvent::GoTo {
                dest: "trap".into(),
                minutes: 5,
            },
            &resources,
        )
        .unwrap();
        assert_eq!(game.location.as_deref(), Some("market"));
        assert_eq!(game.clock_minutes, 6);
    }

    #[test]
    fn dialogs_stack_and_unwind() {
        let resources = world();
        let mut game = session();
        game.start(&resources).unwrap();

        game.apply(&GameEvent::OpenDialog { dialog: "old_man".into() }, &resources)
            .unwrap();
        assert_eq!(game.state, GameState::Dialog);
        assert_eq!(game.display(&resources).unwrap().0, "Old Man");

        game.apply(&GameEvent::EndDialog, &resources).unwrap();
        assert_eq!(game.state, GameState::Location);
        assert_eq!(game.display(&resources).unwrap().0, "town");
    }

    #[test]
    fn give_and_take_items_report_lines() {
        let resources = world();
        let mut game = session();
        game.start(&resources).unwrap();

        let outcome = game
            .apply(
                &GameEvent::GiveItem {
                    item: "misc.ore.copper".into(),
                    count: 3,
                },
                &resources,
            )
            .unwrap();
        assert_eq!(outcome.lines, vec!["You receive 3x Copper Ore."]);
        assert_eq!(game.player.inventory.count_of("misc.ore.copper"), 3);

        let outcome = game
            .apply(
                &GameEvent::TakeItem {
                    item: "misc.ore.copper".into(),
                    count: 2,
                },
                &resources,
            )
            .unwrap();
        assert_eq!(outcome.lines, vec!["You lose 2x Copper Ore."]);
        assert_eq!(game.player.inventory.count_of("misc.ore.copper"), 1);
    }

    #[test]
    fn unknown_references_error() {
        let resources = world();
        let mut game = session();
        game.start(&resources).unwrap();
        assert!(matches!(
            game.apply(&GameEvent::GoTo { dest: "mars".into(), minutes: 1 }, &resources),
            Err(StateError::UnknownLocation(_))
        ));
        assert!(matches!(
            game.apply(&GameEvent::OpenDialog { dialog: "nobody".into() }, &resources),
            Err(StateError::UnknownDialog(_))
        ));
    }

    #[test]
    fn option_override_takes_precedence_and_clears() {
        let resources = world();
        let mut game = session();
        game.start(&resources).unwrap();

        let submenu = OptionList::new(vec![crate::options::MenuOption::new(
            "Somewhere",
            GameEvent::Quit,
        )]);
        game.apply(&GameEvent::SetOptions(submenu.clone()), &resources)
            .unwrap();
        assert_eq!(game.current_options(&resources), Some(submenu));

        game.apply(&GameEvent::ClearOptions, &resources).unwrap();
        let opts = game.current_options(&resources).unwrap();
        assert!(opts.is_empty()); // the test town has no links
    }

    #[test]
    fn variables_are_set_and_typed() {
        let resources = world();
        let mut game = session();
        game.apply(
            &GameEvent::SetVar {
                name: "prologue.done".into(),
                value: VarValue::Bool(true),
            },
            &resources,
        )
        .unwrap();
        assert_eq!(
            game.variables.get("prologue.done").and_then(VarValue::as_bool),
            Some(true)
        );
    }

    #[test]
    fn winning_a_fight_banks_an_attribute_point() {
        use crate::actor::Monster;
        use crate::attributes::AttributeSet;

        let resources = world();
        let mut game = session();
        game.start(&resources).unwrap();

        let mut fight = Fight::new(Monster {
            template_id: "mob.rat".into(),
            name: "Rat".into(),
            stats: AttributeSet::new(),
            attacks: Vec::new(),
            intro_lines: Vec::new(),
        });
        fight.outcome = Some(FightOutcome::Victory);
        game.fight = Some(fight);
        game.state = GameState::Fight;

        let outcome = game.settle_fight().unwrap();
        assert_eq!(game.player.attribute_points, 1);
        assert_eq!(game.state, GameState::Location);
        assert!(outcome.lines.iter().any(|l| l.contains("attribute point")));
    }

    #[test]
    fn fleeing_banks_nothing() {
        use crate::actor::Monster;
        use crate::attributes::AttributeSet;

        let resources = world();
        let mut game = session();
        game.start(&resources).unwrap();

        let mut fight = Fight::new(Monster {
            template_id: "mob.rat".into(),
            name: "Rat".into(),
            stats: AttributeSet::new(),
            attacks: Vec::new(),
            intro_lines: Vec::new(),
        });
        fight.outcome = Some(FightOutcome::Fled);
        game.fight = Some(fight);
        game.state = GameState::Fight;

        game.settle_fight().unwrap();
        assert_eq!(game.player.attribute_points, 0);
        assert_eq!(game.state, GameState::Location);
    }

    #[test]
    fn screen_events_become_signals() {
        let resources = world();
        let mut game = session();
        let outcome = game
            .apply(
                &GameEvent::Compound(vec![
                    GameEvent::PushScreen(ScreenId::OptionsMenu),
                    GameEvent::Quit,
                ]),
                &resources,
            )
            .unwrap();
        assert_eq!(
            outcome.signals,
            vec![StateSignal::Push(ScreenId::OptionsMenu), StateSignal::Quit]
        );
    }
}
