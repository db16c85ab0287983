//! Item Module
//!
//! Runtime item model. Items are resources contributed by packages; the base
//! value of an item is its buy price at charisma 10, weight is in kg.

use crate::attributes::{AttributeSet, Derived};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Categories the game recognizes for items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Misc,
    Consumable,
    Weapon,
    Shield,
    Armor,
}

impl ItemKind {
    pub fn label(self) -> &'static str {
        match self {
            ItemKind::Misc => "Misc",
            ItemKind::Consumable => "Consumable",
            ItemKind::Weapon => "Weapon",
            ItemKind::Shield => "Shield",
            ItemKind::Armor => "Armor",
        }
    }
}

/// Weapon families, each with different speed/damage trade-offs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeaponType {
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

/// Body slots wearable items occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EquipSlot {
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

/// An attack offered by a weapon, shield, or unarmed monster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attack {
    pub name: String,
    pub damage: u32,
    pub accuracy: u32,
}

impl fmt::Display for Attack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: dmg={}, accuracy={}", self.name, self.damage, self.accuracy)
    }
}

/// Effect applied to whoever consumes a consumable item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConsumeEffect {
    Heal(u32),
    RestoreMana(u32),
    RestoreStamina(u32),
    Damage(u32),
}

impl ConsumeEffect {
    /// Apply this effect to the target's stats.
    pub fn apply(self, stats: &mut AttributeSet) {
        match self {
            ConsumeEffect::Heal(amount) => {
                stats.derived_mut(Derived::Health).restore(amount as i32);
            },
            ConsumeEffect::RestoreMana(amount) => {
                stats.derived_mut(Derived::Mana).restore(amount as i32);
            },
            ConsumeEffect::RestoreStamina(amount) => {
                stats.derived_mut(Derived::Stamina).restore(amount as i32);
            },
            ConsumeEffect::Damage(amount) => {
                stats.derived_mut(Derived::Health).damage(amount as i32);
            },
        }
    }
}

/// Kind-specific payload for an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ItemPayload {
    Misc,
    Consumable {
        effects: Vec<ConsumeEffect>,
    },
    Weapon {
        weapon_type: WeaponType,
        hand_slots: u32,
        attacks: Vec<Attack>,
        parry: u32,
    },
    Shield {
        hand_slots: u32,
        block: u32,
        attacks: Vec<Attack>,
    },
    Armor {
        slot: EquipSlot,
        damage_reduce: u32,
    },
}

/// A loadable item resource.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub id: String,
    pub name: String,
    pub value: u32,
    pub weight: f32,
    pub stackable: bool,
    pub payload: ItemPayload,
}

impl Item {
    pub fn kind(&self) -> ItemKind {
        match self.payload {
            ItemPayload::Misc => ItemKind::Misc,
            ItemPayload::Consumable { .. } => ItemKind::Consumable,
            ItemPayload::Weapon { .. } => ItemKind::Weapon,
            ItemPayload::Shield { .. } => ItemKind::Shield,
            ItemPayload::Armor { .. } => ItemKind::Armor,
        }
    }

    /// Attacks this item offers in combat, if any. A weapon or shield with an
    /// empty attack list offers none.
    pub fn attacks(&self) -> Option<&[Attack]> {
        match &self.payload {
            ItemPayload::Weapon { attacks, .. } | ItemPayload::Shield { attacks, .. } if !attacks.is_empty() => {
                Some(attacks.as_slice())
            },
            _ => None,
        }
    }

    /// The slot a wearable occupies; weapons and shields are always `Held`.
    pub fn equip_slot(&self) -> Option<EquipSlot> {
        match &self.payload {
            ItemPayload::Weapon { .. } | ItemPayload::Shield { .. } => Some(EquipSlot::Held),
            ItemPayload::Armor { slot, .. } => Some(*slot),
            _ => None,
        }
    }

    pub fn is_consumable(&self) -> bool {
        matches!(self.payload, ItemPayload::Consumable { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::AttributeSet;

    fn sword() -> Item {
        Item {
            id: "weapon.short_sword_bronze".into(),
            name: "Bronze Short Sword".into(),
            value: 10,
            weight: 1.0,
            stackable: false,
            payload: ItemPayload::Weapon {
                weapon_type: WeaponType::ShortSword,
                hand_slots: 1,
                attacks: vec![
                    Attack {
                        name: "Slash".into(),
                        damage: 10,
                        accuracy: 10,
                    },
                    Attack {
                        name: "Stab".into(),
                        damage: 5,
                        accuracy: 10,
                    },
                ],
                parry: 5,
            },
        }
    }

    #[test]
    fn kind_follows_payload() {
        assert_eq!(sword().kind(), ItemKind::Weapon);
        let ore = Item {
            id: "misc.ore.copper".into(),
            name: "Copper Ore".into(),
            value: 2,
            weight: 3.0,
            stackable: true,
            payload: ItemPayload::Misc,
        };
        assert_eq!(ore.kind(), ItemKind::Misc);
        assert!(ore.attacks().is_none());
        assert!(ore.equip_slot().is_none());
    }

    #[test]
    fn weapons_expose_attacks_and_held_slot() {
        let sword = sword();
        assert_eq!(sword.attacks().unwrap().len(), 2);
        assert_eq!(sword.equip_slot(), Some(EquipSlot::Held));
    }

    #[test]
    fn shield_without_attacks_offers_none() {
        let shield = Item {
            id: "shield.buckler".into(),
            name: "Buckler".into(),
            value: 8,
            weight: 2.0,
            stackable: false,
            payload: ItemPayload::Shield {
                hand_slots: 1,
                block: 6,
                attacks: Vec::new(),
            },
        };
        assert!(shield.attacks().is_none());
    }

    #[test]
    fn consume_effects_apply_to_stats() {
        let mut stats = AttributeSet::new();
        stats.derived_mut(Derived::Health).damage(30);
        stats.derived_mut(Derived::Mana).damage(50);

        ConsumeEffect::Heal(20).apply(&mut stats);
        ConsumeEffect::RestoreMana(100).apply(&mut stats);
        ConsumeEffect::Damage(5).apply(&mut stats);

        assert_eq!(stats.health().value(), 85);
        assert_eq!(stats.mana().value(), 100);
    }
}
