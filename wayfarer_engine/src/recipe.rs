//! Recipe Module
//!
//! Crafting recipes consume input items for output items, gated on skill
//! levels. Crafting checks everything up front and only then commits, so a
//! failed craft never consumes anything.

use crate::actor::Player;
use crate::item::Item;
use std::fmt;
use wayfarer_data::RecipeDef;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemCount {
    pub item: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillReq {
    pub skill: String,
    pub level: u32,
}

/// A crafting recipe resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    pub inputs: Vec<ItemCount>,
    pub outputs: Vec<ItemCount>,
    pub skills: Vec<SkillReq>,
}

impl Recipe {
    pub fn from_def(def: &RecipeDef) -> Recipe {
        Recipe {
            id: def.id.clone(),
            name: def.name.clone(),
            inputs: def
                .inputs
                .iter()
                .map(|ic| ItemCount {
                    item: ic.item.clone(),
                    count: ic.count,
                })
                .collect(),
            outputs: def
                .outputs
                .iter()
                .map(|ic| ItemCount {
                    item: ic.item.clone(),
                    count: ic.count,
                })
                .collect(),
            skills: def
                .skills
                .iter()
                .map(|sr| SkillReq {
                    skill: sr.skill.clone(),
                    level: sr.level,
                })
                .collect(),
        }
    }
}

/// Why a craft attempt was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CraftFailure {
    MissingSkill { skill: String, need: u32, have: u32 },
    MissingInput { item: String, need: u32, have: u32 },
    UnknownItem { item: String },
}

impl fmt::Display for CraftFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CraftFailure::MissingSkill { skill, need, have } => {
                write!(f, "requires {skill} {need} (you have {have})")
            },
            CraftFailure::MissingInput { item, need, have } => {
                write!(f, "requires {need}x {item} (you have {have})")
            },
            CraftFailure::UnknownItem { item } => {
                write!(f, "no such item '{item}'")
            },
        }
    }
}

/// Attempt the recipe against the player's skills and inventory.
///
/// All failures are collected and returned together; inputs are consumed and
/// outputs granted only when every check passes.
pub fn craft<'a>(
    recipe: &Recipe,
    player: &mut Player,
    lookup: impl Fn(&str) -> Option<&'a Item>,
) -> Result<(), Vec<CraftFailure>> {
    let mut failures = Vec::new();

    for req in &recipe.skills {
        let have = player.skill_level(&req.skill);
        if have < req.level {
            failures.push(CraftFailure::MissingSkill {
                skill: req.skill.clone(),
                need: req.level,
                have,
            });
        }
    }

    for input in &recipe.inputs {
        let have = player.inventory.count_of(&input.item);
        if have < input.count {
            failures.push(CraftFailure::MissingInput {
                item: input.item.clone(),
                need: input.count,
                have,
            });
        }
    }

    // outputs must resolve before anything is consumed
    for output in &recipe.outputs {
        if lookup(&output.item).is_none() {
            failures.push(CraftFailure::UnknownItem {
                item: output.item.clone(),
            });
        }
    }

    if !failures.is_empty() {
        return Err(failures);
    }

    for input in &recipe.inputs {
        player.inventory.remove(&input.item, input.count);
    }
    for output in &recipe.outputs {
        if let Some(item) = lookup(&output.item) {
            player.inventory.add(item, output.count);
        }
    }
    Ok(())
}
