//! Card definitions and ability effects.
//!
//! This module contains:
//! - The `CardDefinition` tagged-variant model (units, gear, spells)
//! - Unit affinities used by the terrain bonus table
//! - Evolution info and condition checks
//! - The ability-effect lookup table (structural hook for card effects)

use serde::{Deserialize, Serialize};

/// Numeric card identifier, stable across catalog and decks.
pub type CardId = u32;

/// What kind of card this is.
///
/// Category-specific behavior (placeable vs equip-target vs castable) is a
/// pure function of this value; there is no card subtype hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardCategory {
    /// Deployable to a board space as a defender
    Unit,
    /// Attachable to a friendly unit
    Gear,
    /// One-shot effect
    Spell,
}

impl CardCategory {
    /// Can this card be deployed onto a space?
    pub fn is_placeable(&self) -> bool {
        matches!(self, CardCategory::Unit)
    }

    /// Can this card be equipped to a unit?
    pub fn is_equippable(&self) -> bool {
        matches!(self, CardCategory::Gear)
    }

    /// Can this card be cast as a spell?
    pub fn is_castable(&self) -> bool {
        matches!(self, CardCategory::Spell)
    }
}

/// Unit affinity, matched against terrain for defensive bonuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Affinity {
    Military,
    Occult,
    Civilian,
    Neutral,
}

impl Default for Affinity {
    fn default() -> Self {
        Affinity::Neutral
    }
}

/// Evolution info for cards that can transform into a stronger form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvolutionInfo {
    pub can_evolve: bool,
    /// Card id of the evolved form
    pub evolves_to: Option<CardId>,
    /// Free-text conditions, e.g. "Survive 2 turns" or "Defeat 1 enemy"
    pub conditions: Vec<String>,
}

impl EvolutionInfo {
    /// Check the evolution conditions against a unit's track record.
    ///
    /// `turns_survived` is how many full turns the unit has been on the
    /// board; `defeats` how many enemy units it has destroyed. Unknown
    /// condition text never passes.
    pub fn conditions_met(&self, turns_survived: u32, defeats: u32) -> bool {
        if !self.can_evolve || self.conditions.is_empty() {
            return false;
        }

        self.conditions.iter().all(|condition| {
            let needed = first_number(condition).unwrap_or(0);
            if condition.contains("Survive") {
                turns_survived >= needed
            } else if condition.contains("Defeat") {
                defeats >= needed
            } else {
                false
            }
        })
    }
}

/// Extract the first unsigned integer embedded in a string.
fn first_number(text: &str) -> Option<u32> {
    let start = text.find(|c: char| c.is_ascii_digit())?;
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// An immutable card definition owned by the catalog.
///
/// One struct covers all categories; stat fields that don't apply to a
/// category are simply zero. Never mutated after catalog construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDefinition {
    pub id: CardId,
    pub name: String,
    pub category: CardCategory,
    pub affinity: Affinity,
    pub base_damage: i32,
    pub base_health: i32,
    pub base_defense: i32,
    /// DP cost to deploy; `None` means the default cost of 1
    pub deployment_cost: Option<u32>,
    /// Ordered ability tags / free text, possibly empty
    pub abilities: Vec<String>,
    pub evolution: Option<EvolutionInfo>,
    pub description: String,
}

impl CardDefinition {
    /// Whether this card strikes before the defender can counterattack.
    pub fn has_first_strike(&self) -> bool {
        has_first_strike(&self.abilities)
    }
}

/// Check an ability list for an ambush / first-strike style tag.
pub fn has_first_strike(abilities: &[String]) -> bool {
    abilities.iter().any(|a| {
        let a = a.to_ascii_lowercase();
        a.contains("ambush") || a.contains("first strike")
    })
}

/// A concrete, serializable card effect.
///
/// Effects are data, not stored closures, so they can be persisted and
/// tested in isolation. Only a handful of named effects are implemented;
/// everything else resolves to no effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AbilityEffect {
    /// Additive stat change
    StatBuff { damage: i32, defense: i32 },
    /// Restore health up to the unit's maximum
    Heal { amount: i32 },
    /// Convert defense into damage
    DefenseSwap { damage_gain: i32, defense_loss: i32 },
}

/// Look up the effect for a named ability, if one is implemented.
pub fn effect_for(name: &str) -> Option<AbilityEffect> {
    match name {
        "BUFF_DEFENSE" => Some(AbilityEffect::StatBuff {
            damage: 0,
            defense: 10,
        }),
        "BUFF_DAMAGE" => Some(AbilityEffect::StatBuff {
            damage: 2,
            defense: 0,
        }),
        "HEAL" => Some(AbilityEffect::Heal { amount: 20 }),
        "TRADE_DEFENSE_FOR_DAMAGE" => Some(AbilityEffect::DefenseSwap {
            damage_gain: 10,
            defense_loss: 5,
        }),
        _ => None,
    }
}
