//! Interactive shell.
//!
//! Runs the read-eval-print loop that drives the whole program: renders the
//! top screen of the [`ViewStack`], offers its numbered menu, and feeds the
//! resulting [`GameEvent`]s into the running [`GameData`]. Alongside numbered
//! selections the game screen understands a handful of typed commands
//! (`inventory`, `equip`, `use`, `craft`, `train`, `save`, `quit`), and fights get a
//! dedicated action menu since combat actions are not events.

use std::fs;
use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use colored::Colorize;
use log::{info, warn};
use rustyline::error::ReadlineError;

use crate::actor::Player;
use crate::config::GameConfig;
use crate::event::GameEvent;
#[cfg(feature = "dev-mode")]
use crate::event::VarValue;
use crate::fight::FightAction;
use crate::options::OptionList;
use crate::attributes::{Derived, Primary};
use crate::package::{Package, build_resources};
use crate::resource::ResourceKind;
use crate::resources::ResourceSet;
use crate::save::{SaveFileStatus, build_save_entries, format_modified, load_game, save_game_in};
use crate::state::{GameData, StateError, StateSignal};
use crate::style::GameStyle;
use crate::view::{Frame, ScreenId, ViewStack};

/// Outcome of reading a line from the shell input.
pub enum InputEvent {
    Line(String),
    Eof,
    Interrupted,
}

/// Control flow signal for one pass through the loop.
enum ShellControl {
    Continue,
    Quit,
}

pub struct Shell {
    resources: ResourceSet,
    packages: Vec<Package>,
    config: GameConfig,
    view: ViewStack,
    input: InputManager,
    game: Option<GameData>,
}

impl Shell {
    pub fn new(resources: ResourceSet, packages: Vec<Package>, config: GameConfig) -> Shell {
        let mut view = ViewStack::new();
        view.push(ScreenId::MainMenu);
        Shell {
            resources,
            packages,
            config,
            view,
            input: InputManager::new(),
            game: None,
        }
    }

    /// Run until the player quits or the screen stack empties out.
    ///
    /// # Errors
    /// Propagates input failures the fallback backend could not recover from.
    pub fn run(&mut self) -> Result<()> {
        loop {
            let Some(screen) = self.view.current() else {
                break;
            };
            let control = match screen {
                ScreenId::MainMenu => self.main_menu_pass()?,
                ScreenId::NewGame => self.new_game_pass()?,
                ScreenId::GameScreen => self.game_pass()?,
                ScreenId::OptionsMenu => self.options_pass()?,
                ScreenId::PackageManager => self.packages_pass()?,
            };
            if let ShellControl::Quit = control {
                break;
            }
        }
        info!("shell loop ended");
        Ok(())
    }

    // ---- main menu ----

    fn main_menu_pass(&mut self) -> Result<ShellControl> {
        let frame = self.frame();
        frame.title_bar(ScreenId::MainMenu.title());
        println!();

        let list = ScreenId::MainMenu.options().unwrap_or_else(|| OptionList::new(Vec::new()));
        let events = frame.menu(&list, false);
        let saves = self.list_saves(&frame);

        let line = match self.read_input("> ")? {
            InputEvent::Line(line) => line,
            InputEvent::Eof => return Ok(ShellControl::Quit),
            InputEvent::Interrupted => return Ok(ShellControl::Continue),
        };
        let line = line.trim();

        if let Some(rest) = line.strip_prefix("load") {
            return self.handle_load(rest.trim(), &saves);
        }
        if let Some(index) = parse_selection(line, events.len()) {
            return Ok(self.apply_ui_event(&events[index]));
        }
        self.frame().error("Pick a number from the menu, or 'load <slot>'.");
        Ok(ShellControl::Continue)
    }

    fn list_saves(&self, frame: &Frame) -> Vec<(String, PathBuf)> {
        let dir = PathBuf::from(&self.config.save_dir);
        let entries = match build_save_entries(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("could not read save directory '{}': {e}", dir.display());
                return Vec::new();
            },
        };
        if entries.is_empty() {
            return Vec::new();
        }
        frame.section("saved games");
        let mut usable = Vec::new();
        for entry in &entries {
            let when = entry.modified.map_or_else(|| "unknown time".to_string(), format_modified);
            match &entry.status {
                SaveFileStatus::Ready => {
                    let who = entry.summary.as_ref().map_or("?", |s| s.player_name.as_str());
                    frame.line(&format!("  {} - {who}, {when}", entry.slot.option_label_style()));
                    usable.push((entry.slot.clone(), entry.path.clone()));
                },
                SaveFileStatus::VersionMismatch { save_version, .. } => {
                    frame.line(&format!(
                        "  {} - from v{save_version}, may not load cleanly",
                        entry.slot.option_label_style()
                    ));
                    usable.push((entry.slot.clone(), entry.path.clone()));
                },
                SaveFileStatus::Corrupted { message } => {
                    frame.line(&format!("  {} - unreadable ({message})", entry.slot.dimmed()));
                },
            }
        }
        println!();
        usable
    }

    fn handle_load(&mut self, slot: &str, saves: &[(String, PathBuf)]) -> Result<ShellControl> {
        if slot.is_empty() {
            self.frame().error("Usage: load <slot>");
            return Ok(ShellControl::Continue);
        }
        let Some((_, path)) = saves.iter().find(|(name, _)| name == slot) else {
            self.frame().error(&format!("No usable save in slot '{slot}'."));
            return Ok(ShellControl::Continue);
        };
        match load_game(path) {
            Ok(game) => {
                info!("loaded save slot '{slot}'");
                self.game = Some(game);
                self.view.push(ScreenId::GameScreen);
            },
            Err(e) => self.frame().error(&format!("Could not load '{slot}': {e:#}")),
        }
        Ok(ShellControl::Continue)
    }

    // ---- new game ----

    fn new_game_pass(&mut self) -> Result<ShellControl> {
        let frame = self.frame();
        frame.title_bar(ScreenId::NewGame.title());
        frame.body("Every road has to start somewhere. Leave the name blank to go back.");

        let name = match self.read_input("Name your wayfarer: ")? {
            InputEvent::Line(line) => line.trim().to_string(),
            InputEvent::Eof | InputEvent::Interrupted => String::new(),
        };
        if name.is_empty() {
            self.view.pop();
            return Ok(ShellControl::Continue);
        }

        let mut game = GameData::new(Player::new(name));
        match game.start(&self.resources) {
            Ok(outcome) => {
                self.game = Some(game);
                self.view.swap(ScreenId::GameScreen);
                let frame = self.frame();
                for line in &outcome.lines {
                    frame.line(line);
                }
            },
            Err(StateError::NoStartLocation) => {
                self.frame()
                    .error("The loaded packages never placed you anywhere. Check the package list.");
                self.view.pop();
            },
            Err(e) => {
                self.frame().error(&format!("Could not start the game: {e}"));
                self.view.pop();
            },
        }
        Ok(ShellControl::Continue)
    }

    // ---- game screen ----

    fn game_pass(&mut self) -> Result<ShellControl> {
        let running = self.game.as_ref().is_some_and(GameData::is_running);
        if !running {
            self.game = None;
            self.view.pop();
            return Ok(ShellControl::Continue);
        }

        if self.game.as_ref().is_some_and(|g| g.fight.is_some()) {
            return self.fight_pass();
        }

        let frame = self.frame();
        let game = self.game.as_ref().unwrap();
        if let Some((title, body)) = game.display(&self.resources) {
            frame.title_bar(&title);
            frame.body(&body);
        }
        frame.status_bar(&game.player);

        let list = game
            .current_options(&self.resources)
            .unwrap_or_else(|| OptionList::new(Vec::new()));
        let is_override = game.option_override.is_some();
        let events = frame.menu(&list, is_override);

        let prompt = format!("[{}] ", format_clock(game.clock_minutes))
            .prompt_style()
            .to_string();
        let line = match self.read_input(&prompt)? {
            InputEvent::Line(line) => line,
            InputEvent::Eof => return Ok(ShellControl::Quit),
            InputEvent::Interrupted => return Ok(ShellControl::Continue),
        };
        let line = line.trim();

        if let Some(index) = parse_selection(line, events.len()) {
            let event = events[index].clone();
            return Ok(self.apply_game_event(&event));
        }
        self.game_command(line)
    }

    /// Typed commands available on the game screen alongside the menu.
    fn game_command(&mut self, line: &str) -> Result<ShellControl> {
        let mut words = line.split_whitespace();
        let verb = words.next().unwrap_or("").to_lowercase();
        let rest = words.collect::<Vec<_>>().join(" ");

        #[cfg(feature = "dev-mode")]
        if verb.starts_with(':') {
            self.dev_command(&verb, &rest);
            return Ok(ShellControl::Continue);
        }

        match verb.as_str() {
            "inventory" | "i" => self.show_inventory(),
            "character" | "stats" => self.show_character(),
            "equip" => self.equip_item(&rest),
            "use" => self.use_item(&rest),
            "craft" => self.craft_command(&rest),
            "train" => self.train_command(&rest),
            "save" => self.save_command(&rest),
            "quit" | "menu" => {
                self.game = None;
                self.view.pop();
            },
            "help" | "?" => self.show_help(),
            "" => {},
            _ => self
                .frame()
                .error("That means nothing here. Try a menu number, or 'help'."),
        }
        Ok(ShellControl::Continue)
    }

    fn show_help(&self) {
        let frame = self.frame();
        frame.section("commands");
        for (cmd, what) in [
            ("1..n", "choose a menu option"),
            ("inventory (i)", "list what you carry"),
            ("character", "attributes and pools"),
            ("equip <item>", "hold a weapon or shield"),
            ("use <item>", "consume an item"),
            ("craft [recipe]", "list recipes, or craft one"),
            ("train <attribute>", "spend an attribute point"),
            ("save <slot>", "snapshot the session"),
            ("quit", "back to the main menu"),
        ] {
            frame.line(&format!("  {:<16} {what}", cmd.option_key_style()));
        }
        println!();
    }

    fn show_inventory(&self) {
        let frame = self.frame();
        let game = self.game.as_ref().unwrap();
        frame.section("inventory");
        if game.player.inventory.is_empty() {
            frame.line("You carry nothing but your own thoughts.");
            println!();
            return;
        }
        let lookup = |id: &str| self.resources.item(id);
        for stack in game.player.inventory.slots() {
            let name = lookup(&stack.item_id).map_or(stack.item_id.as_str(), |item| item.name.as_str());
            let held = if game.player.inventory.held() == Some(stack.item_id.as_str()) {
                " (held)"
            } else {
                ""
            };
            frame.line(&format!("  {}x {name}{held}", stack.count));
        }
        frame.line(&format!(
            "  weight {:.1}, worth {}",
            game.player.inventory.total_weight(lookup),
            game.player.inventory.total_value(lookup)
        ));
        println!();
    }

    fn show_character(&self) {
        let frame = self.frame();
        let game = self.game.as_ref().unwrap();
        frame.section(&game.player.name);
        for line in character_sheet(&game.player) {
            frame.line(&line);
        }
        println!();
    }

    fn train_command(&mut self, attribute: &str) {
        let frame = self.frame();
        if attribute.is_empty() {
            frame.error("Usage: train <attribute>");
            return;
        }
        let Some(primary) = Primary::ALL
            .into_iter()
            .find(|p| p.label().eq_ignore_ascii_case(attribute))
        else {
            frame.error(&format!("No attribute called '{attribute}'."));
            return;
        };
        let game = self.game.as_mut().unwrap();
        if game.player.spend_attribute_point(primary) {
            let level = game.player.stats.primary(primary).level();
            frame.line(&format!("Your {} rises to {level}.", primary.label()));
        } else {
            frame.denied("You have no attribute points to spend.");
        }
    }

    fn equip_item(&mut self, name: &str) {
        let frame = self.frame();
        if name.is_empty() {
            frame.error("Usage: equip <item>");
            return;
        }
        let game = self.game.as_mut().unwrap();
        let Some(id) = find_carried(game, &self.resources, name) else {
            frame.error(&format!("You are not carrying '{name}'."));
            return;
        };
        let holdable = self
            .resources
            .item(&id)
            .is_some_and(|item| item.attacks().is_some() || item.equip_slot().is_some());
        if !holdable {
            frame.denied(&format!("'{name}' is not something you can wield."));
            return;
        }
        if game.player.inventory.equip_held(&id) {
            frame.line(&format!("You ready the {name}."));
        }
    }

    fn use_item(&mut self, name: &str) {
        let frame = self.frame();
        if name.is_empty() {
            frame.error("Usage: use <item>");
            return;
        }
        let game = self.game.as_mut().unwrap();
        let Some(id) = find_carried(game, &self.resources, name) else {
            frame.error(&format!("You are not carrying '{name}'."));
            return;
        };
        let Some(item) = self.resources.item(&id) else {
            frame.error(&format!("'{name}' is beyond understanding."));
            return;
        };
        if !item.is_consumable() {
            frame.denied(&format!("The {} is not something you can use up.", item.name));
            return;
        }
        game.player.inventory.remove(&id, 1);
        if let crate::item::ItemPayload::Consumable { effects } = &item.payload {
            for effect in effects {
                effect.clone().apply(&mut game.player.stats);
            }
        }
        frame.line(&format!("You use the {}.", item.name));
    }

    fn craft_command(&mut self, recipe_name: &str) {
        let frame = self.frame();
        if recipe_name.is_empty() {
            frame.section("recipes");
            let mut recipes: Vec<_> = self
                .resources
                .iter(ResourceKind::Recipe)
                .filter_map(crate::resource::Resource::recipe_ref)
                .collect();
            recipes.sort_by(|a, b| a.id.cmp(&b.id));
            if recipes.is_empty() {
                frame.line("You know no recipes.");
            }
            for recipe in recipes {
                frame.line(&format!("  {} ({})", recipe.name, recipe.id.option_key_style()));
            }
            println!();
            return;
        }

        let found = self
            .resources
            .iter(ResourceKind::Recipe)
            .filter_map(crate::resource::Resource::recipe_ref)
            .find(|r| r.id == recipe_name || r.name.eq_ignore_ascii_case(recipe_name))
            .cloned();
        let Some(recipe) = found else {
            frame.error(&format!("You know no recipe called '{recipe_name}'."));
            return;
        };

        let game = self.game.as_mut().unwrap();
        match crate::recipe::craft(&recipe, &mut game.player, |id| self.resources.item(id)) {
            Ok(()) => {
                let made = recipe
                    .outputs
                    .iter()
                    .map(|out| format!("{}x {}", out.count, out.item))
                    .collect::<Vec<_>>()
                    .join(", ");
                frame.line(&format!("You craft {made}."));
            },
            Err(failures) => {
                for failure in failures {
                    frame.denied(&failure.to_string());
                }
            },
        }
    }

    fn save_command(&mut self, slot: &str) {
        let frame = self.frame();
        if slot.is_empty() || !slot.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            frame.error("Usage: save <slot> (letters, digits and underscores)");
            return;
        }
        let game = self.game.as_ref().unwrap();
        match save_game_in(game, slot, Path::new(&self.config.save_dir)) {
            Ok(path) => frame.engine_message(&format!("Saved to {}.", path.display())),
            Err(e) => frame.error(&format!("Save failed: {e:#}")),
        }
    }

    // ---- fights ----

    fn fight_pass(&mut self) -> Result<ShellControl> {
        let frame = self.frame();
        let game = self.game.as_ref().unwrap();
        if let Some((title, _)) = game.display(&self.resources) {
            frame.title_bar(&title);
        }
        let fight = game.fight.as_ref().unwrap();
        let monster_hp = fight.monster.stats.derived(crate::attributes::Derived::Health);
        frame.line(&format!(
            "{}   HP {}",
            fight.monster.name.monster_style(),
            monster_hp.to_string().band_style(monster_hp.band())
        ));
        frame.status_bar(&game.player);

        let attacks = fight.player_attacks(&game.player, |id| self.resources.item(id));
        let mut actions: Vec<(String, FightAction)> = attacks
            .iter()
            .enumerate()
            .map(|(i, a)| (format!("{} ({} dmg)", a.name, a.damage), FightAction::Attack(i)))
            .collect();
        actions.push(("Flee".to_string(), FightAction::Flee));
        for (index, (label, _)) in actions.iter().enumerate() {
            println!(
                "  {} {}",
                format!("{})", index + 1).option_key_style(),
                label.option_label_style()
            );
        }
        println!();

        let line = match self.read_input("fight> ")? {
            InputEvent::Line(line) => line,
            InputEvent::Eof => return Ok(ShellControl::Quit),
            InputEvent::Interrupted => return Ok(ShellControl::Continue),
        };
        let Some(index) = parse_selection(line.trim(), actions.len()) else {
            self.frame().error("Pick an action by number.");
            return Ok(ShellControl::Continue);
        };
        let action = actions[index].1.clone();

        let game = self.game.as_mut().unwrap();
        let lines = if let Some(fight) = game.fight.as_mut() {
            fight.take_turn(&mut game.player, &action, |id| self.resources.item(id), &mut rand::rng())
        } else {
            Vec::new()
        };
        let settled = game.settle_fight();

        let frame = self.frame();
        for line in &lines {
            frame.line(line);
        }
        println!();

        if let Some(outcome) = settled {
            for line in &outcome.lines {
                frame.line(line);
            }
            return Ok(self.handle_signals(&outcome.signals));
        }
        Ok(ShellControl::Continue)
    }

    // ---- side screens ----

    fn options_pass(&mut self) -> Result<ShellControl> {
        let frame = self.frame();
        frame.title_bar(ScreenId::OptionsMenu.title());
        frame.section("settings");
        frame.line(&format!("  log level: {}", self.config.log_level));
        frame.line(&format!("  save dir:  {}", self.config.save_dir));
        let width = if self.config.max_width == 0 {
            "terminal width".to_string()
        } else {
            self.config.max_width.to_string()
        };
        frame.line(&format!("  max width: {width}"));
        if let Some(path) = crate::config::config_file_path() {
            frame.line(&format!("  edit {} to change these.", path.display()));
        }
        println!();
        self.fixed_menu_pass(ScreenId::OptionsMenu)
    }

    fn packages_pass(&mut self) -> Result<ShellControl> {
        let frame = self.frame();
        frame.title_bar(ScreenId::PackageManager.title());
        frame.section("loaded packages");
        if self.packages.is_empty() {
            frame.line("No packages loaded. The world is an empty road.");
        }
        for package in &self.packages {
            let version = package.version.as_deref().unwrap_or("?");
            let author = package.author.as_deref().unwrap_or("unknown");
            let state = if package.include { "" } else { " (excluded)" };
            frame.line(&format!(
                "  {} v{version} by {author}: {} resources{state}",
                package.name.option_label_style(),
                package.resources.total()
            ));
            if !package.dependencies.is_empty() {
                frame.line(&format!("    needs {}", package.dependencies.join(", ")));
            }
        }
        frame.line(&format!(
            "  {} locations, {} dialogs, {} items, {} monsters, {} recipes in play",
            self.resources.count(ResourceKind::Location),
            self.resources.count(ResourceKind::Dialog),
            self.resources.count(ResourceKind::Item),
            self.resources.count(ResourceKind::Monster),
            self.resources.count(ResourceKind::Recipe),
        ));
        frame.line("  'toggle <package>' includes or excludes a package.");
        println!();

        let list = ScreenId::PackageManager
            .options()
            .unwrap_or_else(|| OptionList::new(Vec::new()));
        let events = self.frame().menu(&list, false);
        let line = match self.read_input("> ")? {
            InputEvent::Line(line) => line,
            InputEvent::Eof => return Ok(ShellControl::Quit),
            InputEvent::Interrupted => return Ok(ShellControl::Continue),
        };
        let line = line.trim();
        if let Some(name) = line.strip_prefix("toggle") {
            self.toggle_package(name.trim());
            return Ok(ShellControl::Continue);
        }
        if let Some(index) = parse_selection(line, events.len()) {
            return Ok(self.apply_ui_event(&events[index]));
        }
        self.frame().error("Pick a number from the menu, or 'toggle <package>'.");
        Ok(ShellControl::Continue)
    }

    /// Flip a package in or out of the world and rebuild the registry.
    fn toggle_package(&mut self, name: &str) {
        if name.is_empty() {
            self.frame().error("Usage: toggle <package>");
            return;
        }
        let Some(package) = self.packages.iter_mut().find(|p| p.name == name) else {
            self.frame().error(&format!("No loaded package called '{name}'."));
            return;
        };
        package.include = !package.include;
        let now = if package.include { "included" } else { "excluded" };
        info!("package '{name}' toggled, now {now}");

        let (resources, _) = build_resources(&self.packages);
        self.resources = resources;
        self.frame().engine_message(&format!("Package '{name}' is now {now}."));
    }

    fn fixed_menu_pass(&mut self, screen: ScreenId) -> Result<ShellControl> {
        let list = screen.options().unwrap_or_else(|| OptionList::new(Vec::new()));
        let events = self.frame().menu(&list, false);
        let line = match self.read_input("> ")? {
            InputEvent::Line(line) => line,
            InputEvent::Eof => return Ok(ShellControl::Quit),
            InputEvent::Interrupted => return Ok(ShellControl::Continue),
        };
        if let Some(index) = parse_selection(line.trim(), events.len()) {
            return Ok(self.apply_ui_event(&events[index]));
        }
        self.frame().error("Pick a number from the menu.");
        Ok(ShellControl::Continue)
    }

    // ---- plumbing ----

    fn frame(&self) -> Frame {
        let mut frame = Frame::new();
        if self.config.max_width > 0 {
            frame.width = frame.width.min(self.config.max_width);
        }
        frame
    }

    fn read_input(&mut self, prompt: &str) -> Result<InputEvent> {
        Ok(self.input.read_line(prompt)?)
    }

    /// Handle an event on a screen with no running game. Only screen
    /// navigation makes sense here.
    fn apply_ui_event(&mut self, event: &GameEvent) -> ShellControl {
        let signal = match event {
            GameEvent::PushScreen(id) => StateSignal::Push(*id),
            GameEvent::PopScreen => StateSignal::Pop,
            GameEvent::SwapScreen(id) => StateSignal::Swap(*id),
            GameEvent::Quit => StateSignal::Quit,
            other => {
                warn!("ignoring event {} outside a running game", other.action());
                return ShellControl::Continue;
            },
        };
        self.handle_signals(&[signal])
    }

    fn apply_game_event(&mut self, event: &GameEvent) -> ShellControl {
        let game = self.game.as_mut().unwrap();
        match game.apply(event, &self.resources) {
            Ok(outcome) => {
                let frame = self.frame();
                for line in &outcome.lines {
                    frame.line(line);
                }
                if !outcome.lines.is_empty() {
                    println!();
                }
                self.handle_signals(&outcome.signals)
            },
            Err(e) => {
                warn!("event failed: {e}");
                self.frame().error(&format!("That didn't work: {e}"));
                ShellControl::Continue
            },
        }
    }

    fn handle_signals(&mut self, signals: &[StateSignal]) -> ShellControl {
        for signal in signals {
            match signal {
                StateSignal::Quit => return ShellControl::Quit,
                StateSignal::Push(id) => self.view.push(*id),
                StateSignal::Swap(id) => self.view.swap(*id),
                StateSignal::Pop => {
                    if self.view.pop() {
                        return ShellControl::Quit;
                    }
                },
            }
        }
        ShellControl::Continue
    }

    #[cfg(feature = "dev-mode")]
    fn dev_command(&mut self, verb: &str, rest: &str) {
        let frame = self.frame();
        let game = self.game.as_mut().unwrap();
        match verb {
            ":state" => {
                frame.engine_message(&format!(
                    "state={:?} location={:?} dialogs={:?} clock={}m",
                    game.state, game.location, game.dialogs, game.clock_minutes
                ));
            },
            ":vars" => {
                let mut vars: Vec<_> = game.variables.iter().collect();
                vars.sort_by_key(|(name, _)| name.clone());
                for (name, value) in vars {
                    frame.engine_message(&format!("{name} = {value}"));
                }
            },
            ":set" => {
                let Some((name, raw)) = rest.split_once(char::is_whitespace) else {
                    frame.error("Usage: :set <name> <value>");
                    return;
                };
                let value = parse_var_value(raw.trim());
                frame.engine_message(&format!("{name} = {value}"));
                game.variables.insert(name.to_string(), value);
            },
            ":goto" => match game.set_location(rest, &self.resources) {
                Ok(outcome) => {
                    for line in &outcome.lines {
                        frame.line(line);
                    }
                },
                Err(e) => frame.error(&e.to_string()),
            },
            ":give" => {
                let mut parts = rest.split_whitespace();
                let id = parts.next().unwrap_or("");
                let count = parts.next().and_then(|n| n.parse().ok()).unwrap_or(1);
                match game.apply(&GameEvent::GiveItem { item: id.to_string(), count }, &self.resources) {
                    Ok(outcome) => {
                        for line in &outcome.lines {
                            frame.line(line);
                        }
                    },
                    Err(e) => frame.error(&e.to_string()),
                }
            },
            ":stats" => {
                frame.section(&game.player.name);
                for line in character_sheet(&game.player) {
                    frame.line(&line);
                }
            },
            ":heal" => {
                for derived in crate::attributes::Derived::ALL {
                    let stat = game.player.stats.derived_mut(derived);
                    stat.restore(stat.effective());
                }
                frame.engine_message("All pools restored.");
            },
            _ => frame.error(&format!("Unknown dev command '{verb}'.")),
        }
    }
}

/// Character-sheet lines: primaries, pools, skills, unspent points.
fn character_sheet(player: &Player) -> Vec<String> {
    let mut lines = Vec::new();
    for primary in Primary::ALL {
        let attr = player.stats.primary(primary);
        lines.push(format!(
            "  {:<14} {}",
            primary.label().stat_label_style(),
            attr.display(false)
        ));
    }
    for derived in Derived::ALL {
        let stat = player.stats.derived(derived);
        lines.push(format!(
            "  {:<14} {}",
            derived.label().stat_label_style(),
            stat.to_string().band_style(stat.band())
        ));
    }
    let mut skills: Vec<_> = player.skills.iter().collect();
    skills.sort();
    for (skill, level) in skills {
        lines.push(format!("  {:<14} {level}", skill.stat_label_style()));
    }
    if player.attribute_points > 0 {
        lines.push(format!(
            "  {} to spend with 'train <attribute>'",
            format!("{} point(s)", player.attribute_points).option_key_style()
        ));
    }
    lines
}

/// Parse a 1-based menu selection into a 0-based index.
fn parse_selection(input: &str, len: usize) -> Option<usize> {
    let number: usize = input.parse().ok()?;
    if number >= 1 && number <= len {
        Some(number - 1)
    } else {
        None
    }
}

/// Try to match what the player typed against carried items, by id first,
/// then by name, case-insensitively.
fn find_carried(game: &GameData, resources: &ResourceSet, name: &str) -> Option<String> {
    let slots = game.player.inventory.slots();
    if let Some(stack) = slots.iter().find(|s| s.item_id == name) {
        return Some(stack.item_id.clone());
    }
    slots
        .iter()
        .find(|s| {
            resources
                .item(&s.item_id)
                .is_some_and(|item| item.name.eq_ignore_ascii_case(name))
        })
        .map(|s| s.item_id.clone())
}

#[cfg(feature = "dev-mode")]
fn parse_var_value(raw: &str) -> VarValue {
    if let Ok(flag) = raw.parse::<bool>() {
        VarValue::Bool(flag)
    } else if let Ok(number) = raw.parse::<i64>() {
        VarValue::Int(number)
    } else {
        VarValue::Text(raw.to_string())
    }
}

/// In-game clock, starting the adventure at 08:00 on day one.
fn format_clock(minutes: u64) -> String {
    let total = 8 * 60 + minutes;
    let day = total / (24 * 60) + 1;
    let hour = total / 60 % 24;
    let minute = total % 60;
    format!("Day {day}, {hour:02}:{minute:02}")
}

/// Manages the interactive input backend. Prefers rustyline when a terminal
/// is attached, falling back to a plain stdin reader otherwise.
pub struct InputManager {
    backend: Backend,
}

impl Default for InputManager {
    fn default() -> Self {
        Self::new()
    }
}

impl InputManager {
    pub fn new() -> Self {
        let backend = if io::stdin().is_terminal() {
            match RustylineInput::new() {
                Ok(editor) => {
                    info!("using rustyline-backed shell input");
                    Backend::Rustyline(editor)
                },
                Err(err) => {
                    warn!("failed to initialize rustyline ({err}), falling back to basic stdin");
                    Backend::plain()
                },
            }
        } else {
            info!("stdin is not a TTY; using basic input mode");
            Backend::plain()
        };
        Self { backend }
    }

    /// Read a line from the current backend. If the interactive backend fails
    /// unrecoverably, switch to plain stdin and retry once.
    pub fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        match self.backend.read_line(prompt) {
            Ok(event) => Ok(event),
            Err(err) => {
                if self.backend.is_rustyline() {
                    warn!("rustyline input failed: {err} -- switching to basic stdin");
                    self.backend = Backend::plain();
                    self.backend.read_line(prompt)
                } else {
                    Err(err)
                }
            },
        }
    }
}

enum Backend {
    Rustyline(RustylineInput),
    Plain(StdinInput),
}

impl Backend {
    fn plain() -> Self {
        Backend::Plain(StdinInput::default())
    }

    fn is_rustyline(&self) -> bool {
        matches!(self, Backend::Rustyline(_))
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        match self {
            Backend::Rustyline(editor) => editor.read_line(prompt),
            Backend::Plain(stdin) => stdin.read_line(prompt),
        }
    }
}

struct RustylineInput {
    editor: rustyline::DefaultEditor,
    history_path: Option<PathBuf>,
}

impl RustylineInput {
    fn new() -> io::Result<Self> {
        let mut editor = rustyline::DefaultEditor::new().map_err(map_io_err)?;
        let history_path = history_file_path();

        if let Some(path) = history_path.as_ref() {
            if let Some(dir) = path.parent() {
                if let Err(err) = fs::create_dir_all(dir) {
                    warn!("failed to create history directory {}: {err}", dir.display());
                }
            }
            if let Err(err) = editor.load_history(path) {
                match err {
                    ReadlineError::Io(ref io_err) if io_err.kind() == io::ErrorKind::NotFound => {
                        info!("no prior history found at {}, starting fresh", path.display());
                    },
                    other => {
                        warn!("failed to load history from {}: {other}", path.display());
                    },
                }
            }
        }

        Ok(Self { editor, history_path })
    }

    fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        match self.editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    if let Err(err) = self.editor.add_history_entry(line.as_str()) {
                        warn!("failed to append to history: {err}");
                    }
                    if let Some(path) = self.history_path.as_ref() {
                        if let Err(err) = self.editor.save_history(path) {
                            warn!("failed to persist history to {}: {err}", path.display());
                        }
                    }
                }
                Ok(InputEvent::Line(line))
            },
            Err(err) => convert_readline_error(err),
        }
    }
}

#[derive(Default)]
struct StdinInput {
    buffer: String,
}

impl StdinInput {
    fn read_line(&mut self, prompt: &str) -> io::Result<InputEvent> {
        print!("{prompt}");
        io::stdout().flush()?;

        self.buffer.clear();
        let bytes = io::stdin().read_line(&mut self.buffer)?;
        if bytes == 0 {
            return Ok(InputEvent::Eof);
        }
        if self.buffer.ends_with('\n') {
            self.buffer.pop();
            if self.buffer.ends_with('\r') {
                self.buffer.pop();
            }
        }
        Ok(InputEvent::Line(self.buffer.clone()))
    }
}

fn convert_readline_error(err: ReadlineError) -> io::Result<InputEvent> {
    match err {
        ReadlineError::Interrupted => Ok(InputEvent::Interrupted),
        ReadlineError::Eof => Ok(InputEvent::Eof),
        ReadlineError::Io(io_err) => Err(io_err),
        other => Err(io::Error::other(other)),
    }
}

fn map_io_err(err: ReadlineError) -> io::Error {
    match err {
        ReadlineError::Io(io_err) => io_err,
        other => io::Error::other(other),
    }
}

fn history_file_path() -> Option<PathBuf> {
    dirs::data_dir()
        .or_else(dirs::data_local_dir)
        .map(|base| base.join("wayfarer").join("history.txt"))
}
