//! Attributes Module
//!
//! Primary attributes (strength through luck) and the derived stats that
//! track them (health, mana, stamina). Derived stats recompute whenever a
//! tracked primary's level changes; the [`AttributeSet`] owns every attribute
//! and performs that push-based update itself, so callers must route level
//! changes through it rather than mutating a primary directly.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Baseline level for primary attributes: the human average.
pub const DEFAULT_PRIMARY_LEVEL: i32 = 10;

/// The eight primary attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Primary {
    Strength,
    Dexterity,
    Constitution,
    Agility,
    Intelligence,
    Wisdom,
    Charisma,
    Luck,
}

impl Primary {
    pub const ALL: [Primary; 8] = [
        Primary::Strength,
        Primary::Dexterity,
        Primary::Constitution,
        Primary::Agility,
        Primary::Intelligence,
        Primary::Wisdom,
        Primary::Charisma,
        Primary::Luck,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Primary::Strength => "Strength",
            Primary::Dexterity => "Dexterity",
            Primary::Constitution => "Constitution",
            Primary::Agility => "Agility",
            Primary::Intelligence => "Intelligence",
            Primary::Wisdom => "Wisdom",
            Primary::Charisma => "Charisma",
            Primary::Luck => "Luck",
        }
    }
}

/// The derived stats. Each tracks a weighted pair of primaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Derived {
    Health,
    Mana,
    Stamina,
}

impl Derived {
    pub const ALL: [Derived; 3] = [Derived::Health, Derived::Mana, Derived::Stamina];

    pub fn label(self) -> &'static str {
        match self {
            Derived::Health => "Health",
            Derived::Mana => "Mana",
            Derived::Stamina => "Stamina",
        }
    }

    /// The primaries this stat tracks and their weights.
    pub fn tracked(self) -> [(Primary, i32); 2] {
        match self {
            Derived::Health => [(Primary::Strength, 3), (Primary::Constitution, 7)],
            Derived::Mana => [(Primary::Wisdom, 3), (Primary::Intelligence, 7)],
            Derived::Stamina => [(Primary::Constitution, 6), (Primary::Agility, 4)],
        }
    }
}

/// Coarse condition of a derived stat, used for display coloring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusBand {
    Buffed,
    Good,
    Okay,
    Poor,
    Hurt,
}

/// A primary attribute: a base `level` and a current `value`.
///
/// Shifting the level shifts the value by the same delta, so temporary
/// modifiers riding on `value` survive level changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    level: i32,
    value: i32,
}

impl Default for Attribute {
    fn default() -> Self {
        Attribute::new(DEFAULT_PRIMARY_LEVEL)
    }
}

impl Attribute {
    pub fn new(level: i32) -> Attribute {
        Attribute { level, value: level }
    }

    pub fn with_value(level: i32, value: i32) -> Attribute {
        Attribute { level, value }
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    /// Set the base level. Decreases saturate at zero; the current value
    /// moves by the same delta either way. Returns the applied delta.
    pub fn set_level(&mut self, new_level: i32) -> i32 {
        let mut difference = new_level - self.level;
        if difference < 0 {
            difference = difference.max(-self.level);
        }
        self.level += difference;
        self.value += difference;
        difference
    }

    pub fn set_value(&mut self, new_value: i32) {
        self.value = new_value;
    }

    /// `"12"` when unmodified, `"9 [-1]"` when value differs from level.
    pub fn display(&self, short: bool) -> String {
        if short || self.level == self.value {
            self.value.to_string()
        } else {
            format!("{} [{:+}]", self.value, self.value - self.level)
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display(false))
    }
}

/// A derived stat: its own `base` plus the weighted levels of its tracked
/// primaries form the `effective` level the current `value` is measured
/// against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DerivedStat {
    base: i32,
    effective: i32,
    value: i32,
}

impl DerivedStat {
    fn new(effective: i32) -> DerivedStat {
        DerivedStat {
            base: 0,
            effective,
            value: effective,
        }
    }

    pub fn effective(&self) -> i32 {
        self.effective
    }

    pub fn value(&self) -> i32 {
        self.value
    }

    /// React to a tracked primary's level change. A rise carries the current
    /// value with it; a fall only clamps the value down when it exceeds the
    /// new effective level.
    fn retrack(&mut self, new_effective: i32) {
        let difference = new_effective - self.effective;
        self.effective = new_effective;
        if difference > 0 {
            self.value += difference;
        } else if self.value > self.effective {
            self.value = self.effective;
        }
    }

    /// Move the effective level to `target` by adjusting the stat's own base.
    /// The base saturates at zero on decreases.
    fn set_effective(&mut self, target: i32) {
        let mut difference = target - self.effective;
        if difference < 0 {
            difference = difference.max(-self.base);
        }
        self.base += difference;
        self.effective += difference;
        if difference > 0 || self.value > self.effective {
            self.value += difference;
        }
    }

    /// Reduce the current value, saturating at zero.
    pub fn damage(&mut self, amount: i32) {
        self.value = (self.value - amount.max(0)).max(0);
    }

    /// Raise the current value, saturating at the effective level.
    pub fn restore(&mut self, amount: i32) {
        self.value = (self.value + amount.max(0)).min(self.effective);
    }

    /// Spend from the current value; returns false (and spends nothing) when
    /// there is not enough left.
    pub fn spend(&mut self, amount: i32) -> bool {
        if amount > self.value {
            return false;
        }
        self.value -= amount;
        true
    }

    pub fn is_depleted(&self) -> bool {
        self.value <= 0
    }

    pub fn band(&self) -> StatusBand {
        if self.effective <= 0 {
            return StatusBand::Hurt;
        }
        let ratio = f64::from(self.value) / f64::from(self.effective);
        if ratio > 1.0 {
            StatusBand::Buffed
        } else if ratio > 0.75 {
            StatusBand::Good
        } else if ratio > 0.5 {
            StatusBand::Okay
        } else if ratio > 0.25 {
            StatusBand::Poor
        } else {
            StatusBand::Hurt
        }
    }
}

impl fmt::Display for DerivedStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.value, self.effective)
    }
}

/// Every attribute an actor carries, primary and derived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeSet {
    strength: Attribute,
    dexterity: Attribute,
    constitution: Attribute,
    agility: Attribute,
    intelligence: Attribute,
    wisdom: Attribute,
    charisma: Attribute,
    luck: Attribute,
    health: DerivedStat,
    mana: DerivedStat,
    stamina: DerivedStat,
}

impl Default for AttributeSet {
    fn default() -> Self {
        AttributeSet::new()
    }
}

impl AttributeSet {
    /// All primaries at the default level; derived stats start full.
    pub fn new() -> AttributeSet {
        let mut set = AttributeSet {
            strength: Attribute::default(),
            dexterity: Attribute::default(),
            constitution: Attribute::default(),
            agility: Attribute::default(),
            intelligence: Attribute::default(),
            wisdom: Attribute::default(),
            charisma: Attribute::default(),
            luck: Attribute::default(),
            health: DerivedStat::new(0),
            mana: DerivedStat::new(0),
            stamina: DerivedStat::new(0),
        };
        for derived in Derived::ALL {
            let effective = set.computed_effective(derived);
            *set.derived_mut(derived) = DerivedStat::new(effective);
        }
        set
    }

    pub fn primary(&self, which: Primary) -> &Attribute {
        match which {
            Primary::Strength => &self.strength,
            Primary::Dexterity => &self.dexterity,
            Primary::Constitution => &self.constitution,
            Primary::Agility => &self.agility,
            Primary::Intelligence => &self.intelligence,
            Primary::Wisdom => &self.wisdom,
            Primary::Charisma => &self.charisma,
            Primary::Luck => &self.luck,
        }
    }

    fn primary_mut(&mut self, which: Primary) -> &mut Attribute {
        match which {
            Primary::Strength => &mut self.strength,
            Primary::Dexterity => &mut self.dexterity,
            Primary::Constitution => &mut self.constitution,
            Primary::Agility => &mut self.agility,
            Primary::Intelligence => &mut self.intelligence,
            Primary::Wisdom => &mut self.wisdom,
            Primary::Charisma => &mut self.charisma,
            Primary::Luck => &mut self.luck,
        }
    }

    pub fn derived(&self, which: Derived) -> &DerivedStat {
        match which {
            Derived::Health => &self.health,
            Derived::Mana => &self.mana,
            Derived::Stamina => &self.stamina,
        }
    }

    pub fn derived_mut(&mut self, which: Derived) -> &mut DerivedStat {
        match which {
            Derived::Health => &mut self.health,
            Derived::Mana => &mut self.mana,
            Derived::Stamina => &mut self.stamina,
        }
    }

    /// Set a primary's base level and push the change into every derived
    /// stat that tracks it.
    pub fn set_primary_level(&mut self, which: Primary, level: i32) {
        let difference = self.primary_mut(which).set_level(level);
        if difference == 0 {
            return;
        }
        for derived in Derived::ALL {
            if derived.tracked().iter().any(|(p, _)| *p == which) {
                let effective = self.computed_effective(derived);
                self.derived_mut(derived).retrack(effective);
            }
        }
    }

    /// Set a primary's current value. Derived stats only follow levels, so
    /// no recompute happens here.
    pub fn set_primary_value(&mut self, which: Primary, value: i32) {
        self.primary_mut(which).set_value(value);
    }

    /// Override a derived stat's effective level (monster templates with
    /// explicit health/mana/stamina use this).
    pub fn set_derived_effective(&mut self, which: Derived, target: i32) {
        self.derived_mut(which).set_effective(target);
    }

    fn computed_effective(&self, which: Derived) -> i32 {
        let mut effective = self.derived(which).base;
        for (primary, weight) in which.tracked() {
            effective += self.primary(primary).level() * weight;
        }
        effective
    }

    /// Load `(level, value)` pairs or flat levels into a primary, in the
    /// package data format.
    pub fn load_primary(&mut self, which: Primary, level: i32, value: Option<i32>) {
        self.set_primary_level(which, level);
        if let Some(value) = value {
            self.set_primary_value(which, value);
        }
    }

    pub fn health(&self) -> &DerivedStat {
        &self.health
    }

    pub fn mana(&self) -> &DerivedStat {
        &self.mana
    }

    pub fn stamina(&self) -> &DerivedStat {
        &self.stamina
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attribute_display_short_and_long() {
        let mut attr = Attribute::new(10);
        assert_eq!(attr.display(true), "10");
        assert_eq!(attr.display(false), "10");

        attr.set_value(11);
        assert_eq!(attr.display(true), "11");
        assert_eq!(attr.display(false), "11 [+1]");

        attr.set_value(9);
        assert_eq!(attr.display(false), "9 [-1]");
    }

    #[test]
    fn attribute_level_changes_carry_value() {
        let mut attr = Attribute::new(10);

        attr.set_level(11);
        assert_eq!(attr.level(), 11);
        assert_eq!(attr.value(), 11);

        attr.set_level(10);
        assert_eq!(attr.level(), 10);
        assert_eq!(attr.value(), 10);

        attr.set_level(12);
        assert_eq!((attr.level(), attr.value()), (12, 12));

        // decreases saturate at zero
        attr.set_level(-100);
        assert_eq!((attr.level(), attr.value()), (0, 0));
    }

    #[test]
    fn attribute_level_shift_preserves_modifier() {
        let mut attr = Attribute::new(10);
        attr.set_value(12);

        attr.set_level(9);
        assert_eq!((attr.level(), attr.value()), (9, 11));

        attr.set_level(11);
        assert_eq!((attr.level(), attr.value()), (11, 13));
    }

    #[test]
    fn new_set_has_full_derived_stats() {
        let set = AttributeSet::new();
        // 3*10 + 7*10
        assert_eq!(set.health().effective(), 100);
        assert_eq!(set.health().value(), 100);
        assert_eq!(set.mana().effective(), 100);
        // 6*10 + 4*10
        assert_eq!(set.stamina().effective(), 100);
    }

    #[test]
    fn raising_tracked_primary_raises_derived() {
        let mut set = AttributeSet::new();
        set.set_primary_level(Primary::Constitution, 11);
        // +7 health, +6 stamina, mana untouched
        assert_eq!(set.health().effective(), 107);
        assert_eq!(set.health().value(), 107);
        assert_eq!(set.stamina().effective(), 106);
        assert_eq!(set.mana().effective(), 100);
    }

    #[test]
    fn lowering_tracked_primary_clamps_derived_value() {
        let mut set = AttributeSet::new();
        set.derived_mut(Derived::Health).damage(2);
        assert_eq!(set.health().value(), 98);

        set.set_primary_level(Primary::Strength, 9);
        // effective drops to 97, value clamps from 98 to 97
        assert_eq!(set.health().effective(), 97);
        assert_eq!(set.health().value(), 97);
    }

    #[test]
    fn lowering_tracked_primary_leaves_damaged_value_alone() {
        let mut set = AttributeSet::new();
        set.derived_mut(Derived::Health).damage(50);
        set.set_primary_level(Primary::Strength, 9);
        assert_eq!(set.health().effective(), 97);
        assert_eq!(set.health().value(), 50);
    }

    #[test]
    fn primary_value_change_does_not_touch_derived() {
        let mut set = AttributeSet::new();
        set.set_primary_value(Primary::Constitution, 20);
        assert_eq!(set.health().effective(), 100);
        assert_eq!(set.stamina().effective(), 100);
    }

    #[test]
    fn derived_effective_override_adjusts_base() {
        let mut set = AttributeSet::new();
        set.set_derived_effective(Derived::Health, 140);
        assert_eq!(set.health().effective(), 140);
        assert_eq!(set.health().value(), 140);

        // a later primary change still applies on top of the override
        set.set_primary_level(Primary::Constitution, 11);
        assert_eq!(set.health().effective(), 147);
    }

    #[test]
    fn derived_effective_decrease_saturates_at_tracked_floor() {
        let mut set = AttributeSet::new();
        // base is 0, so the override can't push effective below the tracked sum
        set.set_derived_effective(Derived::Health, 0);
        assert_eq!(set.health().effective(), 100);
    }

    #[test]
    fn damage_restore_and_spend() {
        let mut set = AttributeSet::new();
        set.derived_mut(Derived::Health).damage(130);
        assert_eq!(set.health().value(), 0);
        assert!(set.health().is_depleted());

        set.derived_mut(Derived::Health).restore(250);
        assert_eq!(set.health().value(), 100);

        assert!(set.derived_mut(Derived::Mana).spend(40));
        assert_eq!(set.mana().value(), 60);
        assert!(!set.derived_mut(Derived::Mana).spend(61));
        assert_eq!(set.mana().value(), 60);
    }

    #[test]
    fn status_bands_follow_ratio() {
        let mut set = AttributeSet::new();
        assert_eq!(set.health().band(), StatusBand::Good);

        set.derived_mut(Derived::Health).restore(10); // saturated, still 100
        assert_eq!(set.health().band(), StatusBand::Good);

        set.derived_mut(Derived::Health).damage(30);
        assert_eq!(set.health().band(), StatusBand::Okay);
        set.derived_mut(Derived::Health).damage(25);
        assert_eq!(set.health().band(), StatusBand::Poor);
        set.derived_mut(Derived::Health).damage(25);
        assert_eq!(set.health().band(), StatusBand::Hurt);
    }

    #[test]
    fn derived_stat_displays_value_over_effective() {
        let mut set = AttributeSet::new();
        set.derived_mut(Derived::Stamina).damage(15);
        assert_eq!(set.stamina().to_string(), "85/100");
    }
}
