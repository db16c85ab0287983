//! Round-based combat.
//!
//! A fight pits the player against a single generated [`Monster`]. Each round
//! the player attacks or tries to flee, then the monster strikes back if it
//! still stands. Attack resolution is an opposed roll: accuracy plus the
//! attacker's dexterity and a luck bonus against the defender's agility, each
//! side adding a d10. Landed hits lose damage to the defender's protection
//! but always deal at least one point.

use crate::actor::{Monster, Player};
use crate::attributes::{Derived, Primary};
use crate::item::{Attack, Item, ItemPayload};
use gametools::spinners::{Spinner, Wedge};
use log::info;
use rand::Rng;
use rand::seq::IndexedRandom;

/// Fallback attack when nothing usable is held.
pub fn unarmed() -> Attack {
    Attack {
        name: "Strike".to_string(),
        damage: 3,
        accuracy: 5,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FightAction {
    /// Index into the player's current attack list.
    Attack(usize),
    Flee,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FightOutcome {
    Victory,
    Defeat,
    Fled,
}

#[derive(Debug, Clone)]
pub struct Fight {
    pub monster: Monster,
    pub round: u32,
    pub outcome: Option<FightOutcome>,
}

impl Fight {
    pub fn new(monster: Monster) -> Self {
        Fight {
            monster,
            round: 0,
            outcome: None,
        }
    }

    pub fn is_over(&self) -> bool {
        self.outcome.is_some()
    }

    /// Random opening line from the monster's intro pool.
    pub fn intro(&self) -> String {
        let wedges = self
            .monster
            .intro_lines
            .iter()
            .map(|line| Wedge::new(line.clone()))
            .collect::<Vec<_>>();
        Spinner::new(wedges)
            .spin()
            .unwrap_or_else(|| format!("A {} attacks!", self.monster.name))
    }

    /// Attacks currently available to the player: the held weapon's (or
    /// shield's) list, or bare hands.
    pub fn player_attacks<'a>(
        &self,
        player: &Player,
        lookup: impl Fn(&str) -> Option<&'a Item>,
    ) -> Vec<Attack> {
        player
            .inventory
            .held()
            .and_then(&lookup)
            .and_then(|item| item.attacks().map(<[Attack]>::to_vec))
            .unwrap_or_else(|| vec![unarmed()])
    }

    /// Run one combat round. Returns the narration lines for the shell to
    /// print; when the fight ends, `outcome` is set.
    pub fn take_turn<'a>(
        &mut self,
        player: &mut Player,
        action: &FightAction,
        lookup: impl Fn(&str) -> Option<&'a Item>,
        rng: &mut impl Rng,
    ) -> Vec<String> {
        let mut lines = Vec::new();
        if self.is_over() {
            return lines;
        }
        self.round += 1;

        match action {
            FightAction::Flee => {
                let player_agl = player.stats.primary(Primary::Agility).level();
                let monster_agl = self.monster.stats.primary(Primary::Agility).level();
                let escape = player_agl + rng.random_range(1..=10)
                    >= monster_agl + rng.random_range(1..=10);
                if escape {
                    lines.push("You slip away from the fight.".to_string());
                    self.outcome = Some(FightOutcome::Fled);
                    info!("player fled from '{}' on round {}", self.monster.template_id, self.round);
                    return lines;
                }
                lines.push(format!("The {} cuts off your escape!", self.monster.name));
            },
            FightAction::Attack(index) => {
                let attacks = self.player_attacks(player, &lookup);
                let attack = attacks.get(*index).cloned().unwrap_or_else(unarmed);
                let dex = player.stats.primary(Primary::Dexterity).level();
                let luck = player.stats.primary(Primary::Luck).level();
                let agl = self.monster.stats.primary(Primary::Agility).level();
                match resolve_attack(&attack, dex, luck, agl, 0, rng) {
                    Some(damage) => {
                        self.monster
                            .stats
                            .derived_mut(Derived::Health)
                            .damage(damage);
                        lines.push(format!(
                            "Your {} hits the {} for {damage} damage.",
                            attack.name, self.monster.name
                        ));
                    },
                    None => {
                        lines.push(format!("Your {} misses the {}.", attack.name, self.monster.name));
                    },
                }
                if self.monster.is_dead() {
                    lines.push(format!("The {} collapses. Victory!", self.monster.name));
                    self.outcome = Some(FightOutcome::Victory);
                    info!("player defeated '{}' on round {}", self.monster.template_id, self.round);
                    return lines;
                }
            },
        }

        // monster's reply
        if let Some(attack) = self.monster.attacks.choose(rng).cloned() {
            let dex = self.monster.stats.primary(Primary::Dexterity).level();
            let luck = self.monster.stats.primary(Primary::Luck).level();
            let agl = player.stats.primary(Primary::Agility).level();
            let protection = held_protection(player, &lookup);
            match resolve_attack(&attack, dex, luck, agl, protection, rng) {
                Some(damage) => {
                    player.stats.derived_mut(Derived::Health).damage(damage);
                    lines.push(format!(
                        "The {}'s {} hits you for {damage} damage.",
                        self.monster.name, attack.name
                    ));
                },
                None => {
                    lines.push(format!("The {}'s {} misses you.", self.monster.name, attack.name));
                },
            }
        }

        if player.stats.health().is_depleted() {
            lines.push("Everything goes dark...".to_string());
            self.outcome = Some(FightOutcome::Defeat);
            info!("player died fighting '{}' on round {}", self.monster.template_id, self.round);
        }
        lines
    }
}

/// Opposed roll: `Some(damage)` on a hit, `None` on a miss. The attacker's
/// luck tilts the roll, half a point per point away from the baseline of 10.
fn resolve_attack(
    attack: &Attack,
    attacker_dex: i32,
    attacker_luck: i32,
    defender_agl: i32,
    protection: u32,
    rng: &mut impl Rng,
) -> Option<i32> {
    let offense = i64::from(attack.accuracy)
        + i64::from(attacker_dex)
        + i64::from(luck_modifier(attacker_luck))
        + rng.random_range(1..=10);
    let defense = i64::from(defender_agl) + rng.random_range(1..=10);
    if offense > defense {
        let dealt = attack.damage.saturating_sub(protection).max(1);
        Some(i32::try_from(dealt).unwrap_or(i32::MAX))
    } else {
        None
    }
}

fn luck_modifier(luck: i32) -> i32 {
    (luck - 10) / 2
}

/// Damage reduction from the held item (shield block or worn-in-hand armor).
fn held_protection<'a>(player: &Player, lookup: impl Fn(&str) -> Option<&'a Item>) -> u32 {
    let Some(item) = player.inventory.held().and_then(lookup) else {
        return 0;
    };
    match &item.payload {
        ItemPayload::Shield { block, .. } => *block,
        ItemPayload::Armor { damage_reduce, .. } => *damage_reduce,
        _ => 0,
    }
}
