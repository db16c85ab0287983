use std::collections::HashSet;
use std::fmt;

use crate::*;

/// Validation error for malformed entries in a PackageDef.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    DuplicateId { kind: &'static str, id: String },
    EmptyId { kind: &'static str },
    InvalidValue { context: String },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateId { kind, id } => {
                write!(f, "duplicate {kind} id '{id}'")
            },
            ValidationError::EmptyId { kind } => {
                write!(f, "empty {kind} id")
            },
            ValidationError::InvalidValue { context } => {
                write!(f, "invalid value ({context})")
            },
        }
    }
}

impl std::error::Error for ValidationError {}

/// Validate ids and basic invariants within a single package.
///
/// Cross-package references (travel destinations, recipe items, dialog ids)
/// are intentionally not checked here: a package may refer to resources its
/// dependencies provide. The engine checks references after merging.
pub fn validate_package(def: &PackageDef) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    check_ids("location", def.locations.iter().map(|l| l.id.as_str()), &mut errors);
    check_ids("dialog", def.dialogs.iter().map(|d| d.id.as_str()), &mut errors);
    check_ids("item", def.items.iter().map(|i| i.id.as_str()), &mut errors);
    check_ids("monster", def.monsters.iter().map(|m| m.id.as_str()), &mut errors);
    check_ids("callback", def.callbacks.iter().map(|c| c.id.as_str()), &mut errors);
    check_ids("recipe", def.recipes.iter().map(|r| r.id.as_str()), &mut errors);

    for dialog in &def.dialogs {
        if dialog.options.is_empty() {
            errors.push(ValidationError::InvalidValue {
                context: format!("dialog '{}' has no options", dialog.id),
            });
        }
    }

    for item in &def.items {
        if item.weight < 0.0 {
            errors.push(ValidationError::InvalidValue {
                context: format!("item '{}' has negative weight", item.id),
            });
        }
        if let ItemKindDef::Weapon { attacks, .. } = &item.kind
            && attacks.is_empty()
        {
            errors.push(ValidationError::InvalidValue {
                context: format!("weapon '{}' defines no attacks", item.id),
            });
        }
    }

    for monster in &def.monsters {
        for (label, spec) in stat_specs(monster) {
            if let Some(StatSpecDef::Range(lo, hi)) = spec
                && lo > hi
            {
                errors.push(ValidationError::InvalidValue {
                    context: format!("monster '{}' {label} range is inverted", monster.id),
                });
            }
        }
    }

    for recipe in &def.recipes {
        if recipe.inputs.is_empty() || recipe.outputs.is_empty() {
            errors.push(ValidationError::InvalidValue {
                context: format!("recipe '{}' must have inputs and outputs", recipe.id),
            });
        }
        for ic in recipe.inputs.iter().chain(recipe.outputs.iter()) {
            if ic.count == 0 {
                errors.push(ValidationError::InvalidValue {
                    context: format!("recipe '{}' uses a zero count for '{}'", recipe.id, ic.item),
                });
            }
        }
    }

    errors
}

fn check_ids<'a>(
    kind: &'static str,
    ids: impl Iterator<Item = &'a str>,
    errors: &mut Vec<ValidationError>,
) {
    let mut seen = HashSet::new();
    for id in ids {
        if id.trim().is_empty() {
            errors.push(ValidationError::EmptyId { kind });
        } else if !seen.insert(id) {
            errors.push(ValidationError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
}

fn stat_specs(def: &MonsterDef) -> [(&'static str, Option<StatSpecDef>); 11] {
    [
        ("strength", def.stats.strength),
        ("dexterity", def.stats.dexterity),
        ("constitution", def.stats.constitution),
        ("agility", def.stats.agility),
        ("intelligence", def.stats.intelligence),
        ("wisdom", def.stats.wisdom),
        ("charisma", def.stats.charisma),
        ("luck", def.stats.luck),
        ("health", def.health),
        ("mana", def.mana),
        ("stamina", def.stamina),
    ]
}
