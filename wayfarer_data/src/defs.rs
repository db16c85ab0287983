use serde::{Deserialize, Serialize};

/// Stable identifier used across package references.
pub type Id = String;

/// Top-level content package loaded by the engine.
///
/// A package is one RON file (or a directory of RON files merged into one
/// `PackageDef` by the loader). Every resource it contributes is keyed by a
/// unique string id within its kind.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PackageDef {
    #[serde(default)]
    pub meta: PackageMeta,
    #[serde(default)]
    pub locations: Vec<LocationDef>,
    #[serde(default)]
    pub dialogs: Vec<DialogDef>,
    #[serde(default)]
    pub items: Vec<ItemDef>,
    #[serde(default)]
    pub monsters: Vec<MonsterDef>,
    #[serde(default)]
    pub callbacks: Vec<CallbackDef>,
    #[serde(default)]
    pub recipes: Vec<RecipeDef>,
}

/// Optional package identification and ordering metadata.
///
/// `dependencies` double as the merge "masters" list: a package may only
/// replace a resource whose current owner appears in its dependencies.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct PackageMeta {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub dependencies: Vec<String>,
}

/// A place the player can be, with menu links out of it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationDef {
    pub id: Id,
    pub title: String,
    pub text: String,
    /// Travel destinations, each costing in-game minutes.
    #[serde(default)]
    pub travel: Vec<LinkDef>,
    /// Sub-locations reachable at little or no time cost (shops, alleys).
    #[serde(default)]
    pub features: Vec<LinkDef>,
    /// NPCs present here, each opening a dialog.
    #[serde(default)]
    pub npcs: Vec<NpcLinkDef>,
    /// Events applied every time the player arrives, before display.
    #[serde(default)]
    pub on_enter: Vec<EventDef>,
}

/// A labeled link to another location.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LinkDef {
    pub label: String,
    pub dest: Id,
    #[serde(default)]
    pub minutes: u32,
}

/// A labeled link from a location to an NPC dialog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NpcLinkDef {
    pub label: String,
    pub dialog: Id,
}

/// Narration or conversation displayed in place of a location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogDef {
    pub id: Id,
    pub title: String,
    pub text: String,
    pub options: Vec<DialogOptionDef>,
}

/// One selectable choice within a dialog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogOptionDef {
    pub label: String,
    #[serde(default)]
    pub events: Vec<EventDef>,
}

/// Declarative game events attached to menu options and hooks.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum EventDef {
    GoTo {
        dest: Id,
        #[serde(default)]
        minutes: u32,
    },
    OpenDialog { dialog: Id },
    EndDialog,
    StartFight { monster: Id },
    GiveItem {
        item: Id,
        #[serde(default = "one")]
        count: u32,
    },
    TakeItem {
        item: Id,
        #[serde(default = "one")]
        count: u32,
    },
    SetVar { name: String, value: VarDef },
    Quit,
}

fn one() -> u32 {
    1
}

/// Value types storable in the game's variables map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum VarDef {
    Bool(bool),
    Int(i64),
    Text(String),
}

/// An item definition; the payload varies by kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: Id,
    pub name: String,
    /// Base value: the buy price at charisma 10.
    pub value: u32,
    /// Weight in kg.
    pub weight: f32,
    #[serde(default = "default_true")]
    pub stackable: bool,
    #[serde(default)]
    pub kind: ItemKindDef,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub enum ItemKindDef {
    #[default]
    Misc,
    Consumable {
        effects: Vec<ConsumeEffectDef>,
    },
    Weapon {
        weapon_type: WeaponTypeDef,
        #[serde(default = "one")]
        hand_slots: u32,
        attacks: Vec<AttackDef>,
        #[serde(default)]
        parry: u32,
    },
    Shield {
        #[serde(default = "one")]
        hand_slots: u32,
        block: u32,
        #[serde(default)]
        attacks: Vec<AttackDef>,
    },
    Armor {
        slot: EquipSlotDef,
        damage_reduce: u32,
    },
}

/// Effects applied to the consumer of a consumable item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ConsumeEffectDef {
    Heal(u32),
    RestoreMana(u32),
    RestoreStamina(u32),
    Damage(u32),
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum WeaponTypeDef {
    Dagger,
    ShortSword,
    LongSword,
    GreatSword,
    Scimitar,
    LongBow,
    ShortBow,
    Spear,
    Halberd,
    Whip,
    Staff,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum EquipSlotDef {
    Helmet,
    Eyes,
    Neck,
    Chest,
    Coat,
    Undershirt,
    Waist,
    Legs,
    Pants,
    Skirt,
    Feet,
    Hands,
    Back,
    Quiver,
    Ring,
    Held,
}

/// A single attack offered by a weapon, shield, or monster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AttackDef {
    pub name: String,
    pub damage: u32,
    pub accuracy: u32,
}

/// Template from which the engine generates monster instances.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonsterDef {
    pub id: Id,
    pub name: String,
    #[serde(default)]
    pub stats: StatBlockDef,
    /// Overrides for derived stats; when absent the attribute formulas apply.
    #[serde(default)]
    pub health: Option<StatSpecDef>,
    #[serde(default)]
    pub mana: Option<StatSpecDef>,
    #[serde(default)]
    pub stamina: Option<StatSpecDef>,
    #[serde(default)]
    pub attacks: Vec<AttackDef>,
    /// Flavor lines spun for the fight introduction.
    #[serde(default)]
    pub intro_lines: Vec<String>,
}

/// A flat attribute level or an inclusive range rolled at generation time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum StatSpecDef {
    Flat(i32),
    Range(i32, i32),
}

/// Primary attribute specs for a monster template. Absent = default (10).
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StatBlockDef {
    #[serde(default)]
    pub strength: Option<StatSpecDef>,
    #[serde(default)]
    pub dexterity: Option<StatSpecDef>,
    #[serde(default)]
    pub constitution: Option<StatSpecDef>,
    #[serde(default)]
    pub agility: Option<StatSpecDef>,
    #[serde(default)]
    pub intelligence: Option<StatSpecDef>,
    #[serde(default)]
    pub wisdom: Option<StatSpecDef>,
    #[serde(default)]
    pub charisma: Option<StatSpecDef>,
    #[serde(default)]
    pub luck: Option<StatSpecDef>,
}

/// Events applied when a new game starts. Some callback in some package must
/// set the initial location.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallbackDef {
    pub id: Id,
    pub events: Vec<EventDef>,
}

/// A crafting recipe consuming inputs for outputs, gated on skills.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecipeDef {
    pub id: Id,
    pub name: String,
    pub inputs: Vec<ItemCountDef>,
    pub outputs: Vec<ItemCountDef>,
    #[serde(default)]
    pub skills: Vec<SkillReqDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItemCountDef {
    pub item: Id,
    pub count: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkillReqDef {
    pub skill: String,
    pub level: u32,
}
