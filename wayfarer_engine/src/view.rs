//! View module.
//!
//! Screens live on a [`ViewStack`]; the top screen decides what the shell
//! renders and which menu it offers. Pushing pauses the screen below,
//! popping resumes it, and popping the last screen ends the program.
//! [`Frame`] holds the rendering helpers (title bars, wrapped body text,
//! the status bar, numbered option menus).

use colored::Colorize;
use log::debug;
use serde::{Deserialize, Serialize};
use textwrap::{fill, termwidth};

use crate::actor::Player;
use crate::attributes::Derived;
use crate::event::GameEvent;
use crate::options::OptionList;
use crate::style::GameStyle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreenId {
    MainMenu,
    NewGame,
    GameScreen,
    OptionsMenu,
    PackageManager,
}

impl ScreenId {
    pub fn title(self) -> &'static str {
        match self {
            ScreenId::MainMenu => "Wayfarer",
            ScreenId::NewGame => "New Game",
            ScreenId::GameScreen => "Adventure",
            ScreenId::OptionsMenu => "Options",
            ScreenId::PackageManager => "Packages",
        }
    }

    /// Fixed menu for screens that carry one. The game screen's menu comes
    /// from the running game instead.
    pub fn options(self) -> Option<OptionList> {
        use crate::options::MenuOption;
        match self {
            ScreenId::MainMenu => Some(OptionList::new(vec![
                MenuOption::new("New Game", GameEvent::PushScreen(ScreenId::NewGame)),
                MenuOption::new("Options", GameEvent::PushScreen(ScreenId::OptionsMenu)),
                MenuOption::new("Packages", GameEvent::PushScreen(ScreenId::PackageManager)),
                MenuOption::new("Quit", GameEvent::Quit),
            ])),
            ScreenId::OptionsMenu | ScreenId::PackageManager => {
                Some(OptionList::new(vec![MenuOption::new("Back", GameEvent::PopScreen)]))
            },
            ScreenId::NewGame | ScreenId::GameScreen => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScenePhase {
    Active,
    Paused,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    pub id: ScreenId,
    pub phase: ScenePhase,
}

/// Stack of live screens, top is what the player sees.
#[derive(Debug, Clone, Default)]
pub struct ViewStack {
    scenes: Vec<Scene>,
}

impl ViewStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> Option<ScreenId> {
        self.scenes.last().map(|s| s.id)
    }

    pub fn depth(&self) -> usize {
        self.scenes.len()
    }

    pub fn push(&mut self, id: ScreenId) {
        if let Some(top) = self.scenes.last_mut() {
            top.phase = ScenePhase::Paused;
            debug!("screen {:?} paused", top.id);
        }
        debug!("screen {id:?} started");
        self.scenes.push(Scene {
            id,
            phase: ScenePhase::Active,
        });
    }

    /// Remove the top screen and resume the one below. Returns `true` when
    /// the stack is empty afterward, which means the program should end.
    pub fn pop(&mut self) -> bool {
        if let Some(top) = self.scenes.pop() {
            debug!("screen {:?} stopped", top.id);
        }
        match self.scenes.last_mut() {
            Some(next) => {
                next.phase = ScenePhase::Active;
                debug!("screen {:?} resumed", next.id);
                false
            },
            None => true,
        }
    }

    /// Replace the top screen without touching the one below.
    pub fn swap(&mut self, id: ScreenId) {
        if let Some(top) = self.scenes.pop() {
            debug!("screen {:?} stopped", top.id);
        }
        debug!("screen {id:?} started");
        self.scenes.push(Scene {
            id,
            phase: ScenePhase::Active,
        });
    }

    pub fn clear(&mut self) {
        for scene in self.scenes.drain(..).rev() {
            debug!("screen {:?} stopped", scene.id);
        }
    }

    pub fn scenes(&self) -> &[Scene] {
        &self.scenes
    }
}

/// One numbered menu rendered for the player. Selection indexes map into the
/// returned event vector.
pub fn menu_entries(list: &OptionList, is_override: bool) -> Vec<(String, GameEvent)> {
    let mut entries: Vec<(String, GameEvent)> = list
        .selectable()
        .into_iter()
        .map(|opt| (opt.label.clone(), opt.event.clone()))
        .collect();
    if list.has_prev_page() {
        entries.push((
            "Previous page".to_string(),
            GameEvent::SetOptions(list.with_page(list.page() - 1)),
        ));
    }
    if list.has_next_page() {
        entries.push((
            "Next page".to_string(),
            GameEvent::SetOptions(list.with_page(list.page() + 1)),
        ));
    }
    if is_override {
        entries.push(("Back".to_string(), GameEvent::ClearOptions));
    }
    entries
}

/// Per-frame rendering helpers. Width is re-read each frame in case the
/// terminal was resized.
#[derive(Debug, Clone)]
pub struct Frame {
    pub width: usize,
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Frame {
    pub fn new() -> Self {
        Self { width: termwidth() }
    }

    pub fn title_bar(&self, title: &str) {
        println!("{:^width$}", title.title_style(), width = self.width);
    }

    pub fn section(&self, label: &str) {
        println!("{:.>width$}", label.section_style(), width = self.width);
    }

    pub fn body(&self, text: &str) {
        if !text.is_empty() {
            println!("{}\n", fill(text, self.width.min(100)).description_style());
        }
    }

    pub fn line(&self, text: &str) {
        println!("{}", fill(text, self.width.min(100)));
    }

    pub fn error(&self, msg: &str) {
        println!("{}", msg.error_style());
    }

    pub fn denied(&self, msg: &str) {
        println!("{}", msg.denied_style());
    }

    pub fn engine_message(&self, msg: &str) {
        println!("{}", msg.engine_style());
    }

    /// HP/MP/SP bar, each pool tinted by how depleted it is.
    pub fn status_bar(&self, player: &Player) {
        let mut parts = Vec::new();
        for (label, derived) in [
            ("HP", Derived::Health),
            ("MP", Derived::Mana),
            ("SP", Derived::Stamina),
        ] {
            let stat = player.stats.derived(derived);
            parts.push(format!(
                "{} {}",
                label.stat_label_style(),
                stat.to_string().band_style(stat.band())
            ));
        }
        println!("{}   {}", player.name.npc_style(), parts.join("   "));
        println!();
    }

    /// Print the numbered menu and return the selection map.
    pub fn menu(&self, list: &OptionList, is_override: bool) -> Vec<GameEvent> {
        let entries = menu_entries(list, is_override);
        for (index, (label, _)) in entries.iter().enumerate() {
            println!(
                "  {} {}",
                format!("{})", index + 1).option_key_style(),
                label.option_label_style()
            );
        }
        if list.page_count() > 1 {
            println!("{}", format!("  (page {}/{})", list.page() + 1, list.page_count()).dimmed());
        }
        println!();
        entries.into_iter().map(|(_, event)| event).collect()
    }
}
