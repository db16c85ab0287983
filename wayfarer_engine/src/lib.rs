#![warn(clippy::pedantic)]
#![allow(clippy::must_use_candidate)]

pub const WAYFARER_VERSION: &str = env!("CARGO_PKG_VERSION");

// Core modules
pub mod actor;
pub mod attributes;
pub mod config;
pub mod data_paths;
pub mod event;
pub mod fight;
pub mod inventory;
pub mod item;
pub mod options;
pub mod package;
pub mod recipe;
pub mod resource;
pub mod resources;
pub mod save;
pub mod shell;
pub mod state;
pub mod style;
pub mod view;

// Re-exports for convenience
pub use actor::{Monster, MonsterTemplate, Player};
pub use attributes::{AttributeSet, Derived, Primary};
pub use event::GameEvent;
pub use fight::Fight;
pub use inventory::Inventory;
pub use item::Item;
pub use package::{Package, build_resources, load_packages};
pub use resource::Resource;
pub use resources::ResourceSet;
pub use shell::Shell;
pub use state::{GameData, GameState};
pub use view::{ScreenId, ViewStack};
