use std::fs;
use std::path::Path;

use wayfarer_engine as we;
use we::event::GameEvent;
use we::resource::ResourceKind;
use we::state::GameState;
use we::{GameData, Player, build_resources, load_packages};

const BASE_PKG: &str = r#"(
    meta: (version: Some("1.0.0")),
    items: [
        (id: "flask", name: "Flask", value: 2, weight: 0.3,
         kind: Consumable(effects: [Heal(5)])),
        (id: "stick", name: "Stick", value: 1, weight: 0.5),
        (id: "torch", name: "Torch", value: 3, weight: 0.8),
    ],
    monsters: [
        (id: "rat", name: "Giant Rat",
         attacks: [(name: "Bite", damage: 2, accuracy: 6)]),
    ],
    recipes: [
        (id: "bind-torch", name: "Bind a Torch",
         inputs: [(item: "stick", count: 2)],
         outputs: [(item: "torch", count: 1)]),
    ],
)"#;

const CAMPAIGN_PKG: &str = r#"(
    meta: (dependencies: ["base"]),
    locations: [
        (id: "cellar", title: "The Cellar", text: "Dark and damp.",
         travel: [(label: "Up the stairs", dest: "kitchen", minutes: 1)]),
        (id: "kitchen", title: "The Kitchen", text: "Cold hearth, colder soup.",
         travel: [(label: "Down to the cellar", dest: "cellar", minutes: 1)],
         npcs: [(label: "The cook", dialog: "cook-chat")]),
    ],
    dialogs: [
        (id: "cook-chat", title: "The Cook", text: "\"Out of my kitchen.\"",
         options: [
            (label: "Apologize", events: [
                SetVar(name: "cook.met", value: Bool(true)),
                EndDialog,
            ]),
            (label: "Just leave"),
         ]),
    ],
    items: [
        // overrides the base flask; allowed because base is a dependency
        (id: "flask", name: "Cracked Flask", value: 1, weight: 0.3,
         kind: Consumable(effects: [Heal(3)])),
    ],
    callbacks: [
        (id: "00-start", events: [
            GiveItem(item: "stick", count: 4),
            GoTo(dest: "cellar"),
        ]),
    ],
)"#;

fn world() -> (we::ResourceSet, Vec<we::Package>) {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("base.ron"), BASE_PKG).unwrap();
    fs::write(dir.path().join("campaign.ron"), CAMPAIGN_PKG).unwrap();
    let packages = load_packages(dir.path());
    assert_eq!(packages.len(), 2);
    let (resources, conflicts) = build_resources(&packages);
    assert!(conflicts.is_empty(), "unexpected conflicts: {conflicts:?}");
    (resources, packages)
}

#[test]
fn test_lib_version() {
    assert!(!we::WAYFARER_VERSION.is_empty());
}

#[test]
fn test_dependency_merge_lets_campaign_override_base() {
    let (resources, _) = world();
    let flask = resources.item("flask").unwrap();
    assert_eq!(flask.name, "Cracked Flask");
    assert_eq!(resources.owner(ResourceKind::Item, "flask"), Some("campaign"));
    // untouched base resources survive the merge
    assert!(resources.item("stick").is_some());
    assert!(resources.monster("rat").is_some());
}

#[test]
fn test_new_game_walkthrough() {
    let (resources, _) = world();
    let mut game = GameData::new(Player::new("Rook"));
    game.start(&resources).unwrap();

    assert_eq!(game.state, GameState::Location);
    assert_eq!(game.location.as_deref(), Some("cellar"));
    assert_eq!(game.player.inventory.count_of("stick"), 4);

    // travel advances the clock
    let to_kitchen = GameEvent::GoTo {
        dest: "kitchen".to_string(),
        minutes: 1,
    };
    game.apply(&to_kitchen, &resources).unwrap();
    assert_eq!(game.location.as_deref(), Some("kitchen"));
    assert_eq!(game.clock_minutes, 1);

    // talk to the cook, pick the first option, end up back at the location
    game.apply(
        &GameEvent::OpenDialog {
            dialog: "cook-chat".to_string(),
        },
        &resources,
    )
    .unwrap();
    assert_eq!(game.state, GameState::Dialog);
    let list = game.current_options(&resources).unwrap();
    let entries = we::view::menu_entries(&list, false);
    assert_eq!(entries[0].0, "Apologize");
    game.apply(&entries[0].1, &resources).unwrap();
    assert_eq!(game.state, GameState::Location);
    assert_eq!(
        game.variables.get("cook.met").and_then(we::event::VarValue::as_bool),
        Some(true)
    );
}

#[test]
fn test_crafting_consumes_inputs() {
    let (resources, _) = world();
    let mut game = GameData::new(Player::new("Rook"));
    game.start(&resources).unwrap();

    let recipe = resources.recipe("bind-torch").unwrap().clone();
    we::recipe::craft(&recipe, &mut game.player, |id| resources.item(id)).unwrap();
    assert_eq!(game.player.inventory.count_of("stick"), 2);
    assert_eq!(game.player.inventory.count_of("torch"), 1);
}

#[test]
fn test_save_round_trip_through_files() {
    let (resources, _) = world();
    let mut game = GameData::new(Player::new("Rook"));
    game.start(&resources).unwrap();
    game.apply(
        &GameEvent::GoTo {
            dest: "kitchen".to_string(),
            minutes: 1,
        },
        &resources,
    )
    .unwrap();

    let saves = tempfile::tempdir().unwrap();
    let path = we::save::save_game_in(&game, "walk", saves.path()).unwrap();
    let loaded = we::save::load_game(&path).unwrap();
    assert_eq!(loaded.location.as_deref(), Some("kitchen"));
    assert_eq!(loaded.player.inventory.count_of("stick"), 4);
    assert_eq!(loaded.clock_minutes, 1);
}

#[test]
fn test_bundled_packages_load_cleanly() {
    // integration tests run from the package root, where data/ lives
    let root = Path::new("data/packages");
    assert!(root.is_dir(), "bundled package directory is missing");
    let packages = load_packages(root);
    assert_eq!(packages.len(), 2);

    let (resources, conflicts) = build_resources(&packages);
    assert!(conflicts.is_empty());
    assert!(resources.dangling_references().is_empty());

    let mut game = GameData::new(Player::new("Rook"));
    game.start(&resources).unwrap();
    assert_eq!(game.location.as_deref(), Some("players-house"));
    assert_eq!(game.player.inventory.count_of("minor-healing-draught"), 2);
}
