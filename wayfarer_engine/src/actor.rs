//! Actor Module
//!
//! Actors are bundles of stats useful for combat and contested checks: the
//! player, and monsters generated from templates. Monster templates specify
//! each primary attribute as a flat level or a range rolled at generation
//! time.

use crate::attributes::{AttributeSet, Derived, Primary};
use crate::inventory::Inventory;
use crate::item::Attack;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use wayfarer_data::{MonsterDef, StatSpecDef};

/// The player character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub stats: AttributeSet,
    pub inventory: Inventory,
    pub attribute_points: u32,
    /// Crafting and trade skills, by name.
    pub skills: HashMap<String, u32>,
}

impl Default for Player {
    fn default() -> Player {
        Player {
            name: String::new(),
            stats: AttributeSet::new(),
            inventory: Inventory::new(),
            attribute_points: 0,
            skills: HashMap::new(),
        }
    }
}

impl Player {
    pub fn new(name: impl Into<String>) -> Player {
        Player {
            name: name.into(),
            ..Player::default()
        }
    }

    pub fn skill_level(&self, skill: &str) -> u32 {
        self.skills.get(skill).copied().unwrap_or(0)
    }

    /// Spend one unspent attribute point to raise a primary by a level.
    /// Returns false when no points are banked.
    pub fn spend_attribute_point(&mut self, which: Primary) -> bool {
        if self.attribute_points == 0 {
            return false;
        }
        self.attribute_points -= 1;
        let level = self.stats.primary(which).level();
        self.stats.set_primary_level(which, level + 1);
        true
    }
}

/// A flat attribute level or an inclusive range rolled per monster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatSpec {
    Flat(i32),
    Range(i32, i32),
}

impl StatSpec {
    pub fn roll(self, rng: &mut impl Rng) -> i32 {
        match self {
            StatSpec::Flat(level) => level,
            StatSpec::Range(lo, hi) if lo < hi => rng.random_range(lo..=hi),
            StatSpec::Range(lo, _) => lo,
        }
    }
}

impl From<StatSpecDef> for StatSpec {
    fn from(def: StatSpecDef) -> Self {
        match def {
            StatSpecDef::Flat(level) => StatSpec::Flat(level),
            StatSpecDef::Range(lo, hi) => StatSpec::Range(lo, hi),
        }
    }
}

/// Template from which monster instances are generated for fights.
#[derive(Debug, Clone, PartialEq)]
pub struct MonsterTemplate {
    pub id: String,
    pub name: String,
    pub primaries: Vec<(Primary, StatSpec)>,
    /// Derived-stat overrides; when absent the attribute formulas apply.
    pub overrides: Vec<(Derived, StatSpec)>,
    pub attacks: Vec<Attack>,
    pub intro_lines: Vec<String>,
}

impl MonsterTemplate {
    pub fn from_def(def: &MonsterDef) -> MonsterTemplate {
        let specs = [
            (Primary::Strength, def.stats.strength),
            (Primary::Dexterity, def.stats.dexterity),
            (Primary::Constitution, def.stats.constitution),
            (Primary::Agility, def.stats.agility),
            (Primary::Intelligence, def.stats.intelligence),
            (Primary::Wisdom, def.stats.wisdom),
            (Primary::Charisma, def.stats.charisma),
            (Primary::Luck, def.stats.luck),
        ];
        let primaries = specs
            .into_iter()
            .filter_map(|(primary, spec)| spec.map(|s| (primary, s.into())))
            .collect();

        let derived = [
            (Derived::Health, def.health),
            (Derived::Mana, def.mana),
            (Derived::Stamina, def.stamina),
        ];
        let overrides = derived
            .into_iter()
            .filter_map(|(stat, spec)| spec.map(|s| (stat, s.into())))
            .collect();

        let attacks = def
            .attacks
            .iter()
            .map(|a| Attack {
                name: a.name.clone(),
                damage: a.damage,
                accuracy: a.accuracy,
            })
            .collect();

        MonsterTemplate {
            id: def.id.clone(),
            name: def.name.clone(),
            primaries,
            overrides,
            attacks,
            intro_lines: def.intro_lines.clone(),
        }
    }

    /// Generate a monster instance: primaries are rolled, then derived-stat
    /// overrides are applied on top. A template with no attacks gets an
    /// unarmed strike so every monster can fight.
    pub fn generate(&self, rng: &mut impl Rng) -> Monster {
        let mut stats = AttributeSet::new();
        for (primary, spec) in &self.primaries {
            stats.set_primary_level(*primary, spec.roll(rng));
        }
        for (stat, spec) in &self.overrides {
            stats.set_derived_effective(*stat, spec.roll(rng));
        }

        let attacks = if self.attacks.is_empty() {
            vec![Attack {
                name: "Strike".into(),
                damage: 3,
                accuracy: 5,
            }]
        } else {
            self.attacks.clone()
        };

        Monster {
            template_id: self.id.clone(),
            name: self.name.clone(),
            stats,
            attacks,
            intro_lines: self.intro_lines.clone(),
        }
    }
}

/// A generated monster, ready for a fight.
#[derive(Debug, Clone, PartialEq)]
pub struct Monster {
    pub template_id: String,
    pub name: String,
    pub stats: AttributeSet,
    pub attacks: Vec<Attack>,
    pub intro_lines: Vec<String>,
}

impl Monster {
    pub fn is_dead(&self) -> bool {
        self.stats.health().is_depleted()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wayfarer_data::StatBlockDef;

    fn goblin_def() -> MonsterDef {
        MonsterDef {
            id: "mob.goblin".into(),
            name: "Goblin".into(),
            stats: StatBlockDef {
                strength: Some(StatSpecDef::Flat(8)),
                dexterity: Some(StatSpecDef::Flat(6)),
                constitution: Some(StatSpecDef::Flat(8)),
                agility: Some(StatSpecDef::Flat(7)),
                intelligence: Some(StatSpecDef::Flat(5)),
                wisdom: Some(StatSpecDef::Flat(5)),
                charisma: Some(StatSpecDef::Flat(3)),
                luck: Some(StatSpecDef::Flat(5)),
            },
            health: None,
            mana: None,
            stamina: None,
            attacks: Vec::new(),
            intro_lines: vec!["The goblin sneers at you".into()],
        }
    }

    #[test]
    fn flat_specs_generate_exact_levels() {
        let template = MonsterTemplate::from_def(&goblin_def());
        let mut rng = rand::rng();
        let goblin = template.generate(&mut rng);

        assert_eq!(goblin.stats.primary(Primary::Strength).level(), 8);
        assert_eq!(goblin.stats.primary(Primary::Charisma).level(), 3);
        // health = 3*str + 7*con = 24 + 56
        assert_eq!(goblin.stats.health().effective(), 80);
        assert!(!goblin.is_dead());
    }

    #[test]
    fn ranged_specs_roll_within_bounds() {
        let mut def = goblin_def();
        def.stats.strength = Some(StatSpecDef::Range(6, 12));
        let template = MonsterTemplate::from_def(&def);
        let mut rng = rand::rng();
        for _ in 0..50 {
            let level = template.generate(&mut rng).stats.primary(Primary::Strength).level();
            assert!((6..=12).contains(&level), "rolled {level}");
        }
    }

    #[test]
    fn derived_override_beats_formula() {
        let mut def = goblin_def();
        def.health = Some(StatSpecDef::Flat(120));
        let template = MonsterTemplate::from_def(&def);
        let goblin = template.generate(&mut rand::rng());
        assert_eq!(goblin.stats.health().effective(), 120);
    }

    #[test]
    fn template_without_attacks_gets_unarmed_strike() {
        let template = MonsterTemplate::from_def(&goblin_def());
        let goblin = template.generate(&mut rand::rng());
        assert_eq!(goblin.attacks.len(), 1);
        assert_eq!(goblin.attacks[0].name, "Strike");
    }

    #[test]
    fn unspecified_primaries_stay_at_default() {
        let def = MonsterDef {
            id: "mob.blob".into(),
            name: "Blob".into(),
            stats: StatBlockDef::default(),
            health: None,
            mana: None,
            stamina: None,
            attacks: Vec::new(),
            intro_lines: Vec::new(),
        };
        let blob = MonsterTemplate::from_def(&def).generate(&mut rand::rng());
        assert_eq!(blob.stats.primary(Primary::Strength).level(), 10);
        assert_eq!(blob.stats.health().effective(), 100);
    }

    #[test]
    fn attribute_points_spend_down_and_raise_the_stat() {
        let mut player = Player::new("grinder");
        assert!(!player.spend_attribute_point(Primary::Strength));

        player.attribute_points = 2;
        assert!(player.spend_attribute_point(Primary::Strength));
        assert!(player.spend_attribute_point(Primary::Luck));
        assert_eq!(player.stats.primary(Primary::Strength).level(), 11);
        assert_eq!(player.stats.primary(Primary::Luck).level(), 11);
        assert_eq!(player.attribute_points, 0);
        assert!(!player.spend_attribute_point(Primary::Strength));
    }

    #[test]
    fn player_skill_lookup_defaults_to_zero() {
        let mut player = Player::new("Test Player");
        assert_eq!(player.skill_level("smelting"), 0);
        player.skills.insert("smelting".into(), 12);
        assert_eq!(player.skill_level("smelting"), 12);
    }
}
