//! Gear attachment: stat application, modifier text parsing, and the
//! full recompute used when gear comes off.
//!
//! Gear changes a unit snapshot two ways: its base stat fields apply
//! directly, and each ability string is either a parsed stat modifier
//! ("+2 Health", "-1 Defense") or a tag granted verbatim ("Ambush").
//! Removal never tries to subtract; it rebuilds the snapshot from the base
//! card and re-applies the remaining gear in its original order, so stacked
//! modifiers always resolve the same way.

use crate::board::UnitSnapshot;
use crate::cards::{CardDefinition, CardId};

/// A stat delta parsed from gear ability text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatModifier {
    pub damage: i32,
    pub health: i32,
    pub defense: i32,
}

/// Parse a stat modifier like "+2 Health", "-1 Def" or "+1 Damage".
///
/// Case-insensitive; keyword prefixes are enough ("Dam", "Def", "HP").
/// Returns `None` for anything that doesn't fit the shape, which callers
/// treat as a plain ability tag.
pub fn parse_stat_modifier(text: &str) -> Option<StatModifier> {
    let trimmed = text.trim();
    let mut chars = trimmed.chars();

    let sign = match chars.next()? {
        '+' => 1,
        '-' => -1,
        _ => return None,
    };

    let rest = chars.as_str();
    let digits: String = rest.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let amount: i32 = digits.parse().ok()?;
    let value = sign * amount;

    let keyword = rest[digits.len()..].trim().to_ascii_lowercase();
    let mut modifier = StatModifier::default();
    if keyword.starts_with("health") || keyword.starts_with("hp") {
        modifier.health = value;
    } else if keyword.starts_with("dam") {
        modifier.damage = value;
    } else if keyword.starts_with("def") {
        modifier.defense = value;
    } else {
        return None;
    }
    Some(modifier)
}

/// Attach a gear card to a unit, applying its stats in place.
///
/// Base stat fields apply first, then each ability string: parsed stat
/// modifiers change stats, anything else lands in the unit's ability list.
/// The caller is responsible for checking that `gear` is actually gear and
/// that the unit belongs to the right player.
pub fn equip(unit: &mut UnitSnapshot, gear: &CardDefinition) {
    unit.damage += gear.base_damage;
    unit.defense += gear.base_defense;
    unit.max_health += gear.base_health;
    unit.current_health += gear.base_health;

    for ability in &gear.abilities {
        match parse_stat_modifier(ability) {
            Some(modifier) => {
                unit.damage += modifier.damage;
                unit.defense += modifier.defense;
                unit.max_health += modifier.health;
                unit.current_health += modifier.health;
            }
            None => unit.abilities.push(ability.clone()),
        }
    }

    unit.equipped_gear_ids.push(gear.id);
}

/// Rebuild a unit's stats and abilities from its base card plus a gear list.
///
/// Damage already taken is preserved as a delta against max health, so a
/// wounded unit stays wounded through the rebuild (floored at 1 health).
/// Combat bookkeeping (exhaustion, placement turn, defeats) is untouched.
pub fn recompute_from_base(
    unit: &mut UnitSnapshot,
    base: &CardDefinition,
    gear_cards: &[&CardDefinition],
) {
    let damage_taken = unit.max_health - unit.current_health;

    unit.damage = base.base_damage;
    unit.defense = base.base_defense;
    unit.max_health = base.base_health.max(1);
    unit.abilities = base.abilities.clone();
    unit.equipped_gear_ids.clear();

    // Re-apply in original equip order so stacked modifiers resolve the
    // same way they did the first time.
    unit.current_health = unit.max_health;
    for gear in gear_cards {
        equip(unit, gear);
    }

    unit.current_health = (unit.max_health - damage_taken).max(1);
}

/// Ids of the gear a unit would keep after removing one piece.
///
/// Returns `None` if the piece isn't equipped; callers treat removal of an
/// absent piece as a no-op.
pub fn remaining_after_removal(unit: &UnitSnapshot, gear_id: CardId) -> Option<Vec<CardId>> {
    let pos = unit.equipped_gear_ids.iter().position(|&id| id == gear_id)?;
    let mut remaining = unit.equipped_gear_ids.clone();
    remaining.remove(pos);
    Some(remaining)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::{Affinity, CardCategory};

    fn unit_card() -> CardDefinition {
        CardDefinition {
            id: 1,
            name: "Line Rifleman".to_string(),
            category: CardCategory::Unit,
            affinity: Affinity::Military,
            base_damage: 2,
            base_health: 4,
            base_defense: 0,
            deployment_cost: Some(1),
            abilities: vec!["Endurance".to_string()],
            evolution: None,
            description: String::new(),
        }
    }

    fn gear_card(id: CardId, damage: i32, defense: i32, abilities: &[&str]) -> CardDefinition {
        CardDefinition {
            id,
            name: format!("Gear {}", id),
            category: CardCategory::Gear,
            affinity: Affinity::Neutral,
            base_damage: damage,
            base_health: 0,
            base_defense: defense,
            deployment_cost: Some(1),
            abilities: abilities.iter().map(|a| a.to_string()).collect(),
            evolution: None,
            description: String::new(),
        }
    }

    #[test]
    fn test_parse_stat_modifier_shapes() {
        assert_eq!(
            parse_stat_modifier("+2 Health"),
            Some(StatModifier {
                health: 2,
                ..Default::default()
            })
        );
        assert_eq!(
            parse_stat_modifier("-1 Defense"),
            Some(StatModifier {
                defense: -1,
                ..Default::default()
            })
        );
        assert_eq!(
            parse_stat_modifier("+3 dam"),
            Some(StatModifier {
                damage: 3,
                ..Default::default()
            })
        );
        // Tags, not modifiers
        assert_eq!(parse_stat_modifier("Ambush"), None);
        assert_eq!(parse_stat_modifier("+fast"), None);
        assert_eq!(parse_stat_modifier("+2 Morale"), None);
    }

    #[test]
    fn test_equip_applies_base_stats_and_modifiers() {
        let base = unit_card();
        let mut unit = UnitSnapshot::from_card(&base, "alice", 1);

        let blade = gear_card(21, 2, 0, &[]);
        equip(&mut unit, &blade);
        assert_eq!(unit.damage, 4);
        assert_eq!(unit.equipped_gear_ids, vec![21]);

        let talisman = gear_card(22, 0, 0, &["+2 Health"]);
        equip(&mut unit, &talisman);
        assert_eq!(unit.max_health, 6);
        assert_eq!(unit.current_health, 6);
    }

    #[test]
    fn test_equip_grants_non_stat_abilities_verbatim() {
        let base = unit_card();
        let mut unit = UnitSnapshot::from_card(&base, "alice", 1);

        let sidearm = gear_card(23, 0, 0, &["+1 Damage", "Ambush"]);
        equip(&mut unit, &sidearm);

        assert_eq!(unit.damage, 3);
        assert!(unit.abilities.contains(&"Ambush".to_string()));
        assert!(unit.has_first_strike());
    }

    #[test]
    fn test_recompute_restores_base_exactly() {
        let base = unit_card();
        let mut unit = UnitSnapshot::from_card(&base, "alice", 1);
        let original = unit.clone();

        let blade = gear_card(21, 2, 0, &[]);
        let sidearm = gear_card(23, 0, 0, &["+1 Damage", "Ambush"]);
        equip(&mut unit, &blade);
        equip(&mut unit, &sidearm);

        recompute_from_base(&mut unit, &base, &[]);
        assert_eq!(unit, original);
    }

    #[test]
    fn test_recompute_keeps_remaining_gear() {
        let base = unit_card();
        let mut unit = UnitSnapshot::from_card(&base, "alice", 1);

        let blade = gear_card(21, 2, 0, &[]);
        let plating = gear_card(20, 0, 2, &[]);
        equip(&mut unit, &blade);
        equip(&mut unit, &plating);

        recompute_from_base(&mut unit, &base, &[&plating]);
        assert_eq!(unit.damage, 2, "blade bonus gone");
        assert_eq!(unit.defense, 2, "plating bonus kept");
        assert_eq!(unit.equipped_gear_ids, vec![20]);
    }

    #[test]
    fn test_recompute_preserves_damage_taken() {
        let base = unit_card();
        let mut unit = UnitSnapshot::from_card(&base, "alice", 1);

        let talisman = gear_card(22, 0, 0, &["+2 Health"]);
        equip(&mut unit, &talisman);
        unit.current_health -= 3;

        recompute_from_base(&mut unit, &base, &[]);
        assert_eq!(unit.max_health, 4);
        assert_eq!(unit.current_health, 1, "3 damage carried over");
    }

    #[test]
    fn test_recompute_floors_health_at_one() {
        let base = unit_card();
        let mut unit = UnitSnapshot::from_card(&base, "alice", 1);

        let talisman = gear_card(22, 0, 0, &["+5 Health"]);
        equip(&mut unit, &talisman);
        unit.current_health = 1; // 8 damage taken

        recompute_from_base(&mut unit, &base, &[]);
        assert_eq!(unit.current_health, 1);
    }

    #[test]
    fn test_remaining_after_removal() {
        let base = unit_card();
        let mut unit = UnitSnapshot::from_card(&base, "alice", 1);
        equip(&mut unit, &gear_card(21, 2, 0, &[]));
        equip(&mut unit, &gear_card(20, 0, 2, &[]));

        assert_eq!(remaining_after_removal(&unit, 21), Some(vec![20]));
        assert_eq!(remaining_after_removal(&unit, 99), None);
    }
}
