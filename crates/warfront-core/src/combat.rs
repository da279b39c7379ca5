//! Combat resolution.
//!
//! Two distinct modes, deliberately not unified:
//! - Territory combat: a hand card challenges the garrison of an enemy
//!   space. Pure power comparison with a terrain bonus table; ties favor
//!   the defender; the loser's side pays/collects a toll.
//! - Duel combat: card-vs-card on the board, with health, defense, a
//!   damage floor of 1, and a symmetric counterattack.

use crate::board::{BoardSpace, TerrainKind, UnitSnapshot};
use crate::cards::{Affinity, CardDefinition};
use crate::economy;
use serde::{Deserialize, Serialize};

/// Defensive bonus granted by terrain to a garrison of matching affinity.
///
/// A pure function of `(terrain, affinity)`; the table itself is game
/// configuration, not an engine invariant.
pub fn terrain_bonus(terrain: TerrainKind, affinity: Affinity) -> i32 {
    match (terrain, affinity) {
        (TerrainKind::Battlefield, Affinity::Military) => 2,
        (TerrainKind::RitualSite, Affinity::Occult) => 3,
        _ => 0,
    }
}

/// Result of a territory battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerritoryOutcome {
    pub attacker_wins: bool,
    /// Toll owed by the attacker on a loss; always computed for reporting
    pub toll_amount: u32,
    pub log: Vec<String>,
}

/// Resolve a territory battle: `attacker` (a hand card) challenges the
/// garrison of `space`.
///
/// Higher damage wins; the defender gets the terrain bonus and wins ties.
pub fn resolve_territory(
    attacker: &CardDefinition,
    defender: &UnitSnapshot,
    space: &BoardSpace,
) -> TerritoryOutcome {
    let mut log = Vec::new();

    let bonus = terrain_bonus(space.terrain, defender.affinity);
    if bonus > 0 {
        log.push(format!(
            "{} gets +{} from {} terrain!",
            defender.name,
            bonus,
            space.terrain.name()
        ));
    }

    let attacker_power = attacker.base_damage;
    let defender_power = defender.damage + bonus;

    log.push(format!(
        "Battle for {} (Level {}):",
        space.terrain.name(),
        space.level
    ));
    log.push(format!(
        "{} ({}) vs {} ({})",
        attacker.name, attacker_power, defender.name, defender_power
    ));

    // Ties go to the defender
    let attacker_wins = attacker_power > defender_power;
    let toll_amount = economy::toll_for_space(space);

    if attacker_wins {
        log.push(format!(
            "{} won the battle and claims the territory!",
            attacker.name
        ));
    } else {
        log.push(format!("{} defended the territory!", defender.name));
        log.push(format!("{} DP toll must be paid.", toll_amount));
    }

    TerritoryOutcome {
        attacker_wins,
        toll_amount,
        log,
    }
}

/// Result of a card-vs-card duel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuelOutcome {
    pub damage_to_defender: i32,
    pub damage_to_attacker: i32,
    pub defender_defeated: bool,
    pub attacker_defeated: bool,
    pub log: Vec<String>,
}

/// Damage one strike deals through defense. Always at least 1.
fn strike_damage(damage: i32, defense: i32) -> i32 {
    (damage - defense).max(1)
}

/// Resolve a duel between two on-board units.
///
/// The attacker strikes first; if the defender survives and the attacker
/// has no first-strike style ability, the defender counterattacks with the
/// same damage rule. Neither snapshot is mutated here; the caller applies
/// the reported damage.
pub fn resolve_duel(attacker: &UnitSnapshot, defender: &UnitSnapshot) -> DuelOutcome {
    let mut log = Vec::new();

    let damage_to_defender = strike_damage(attacker.damage, defender.defense);
    let defender_health_after = defender.current_health - damage_to_defender;
    let defender_defeated = defender_health_after <= 0;

    log.push(format!(
        "{} attacks {} for {} damage.",
        attacker.name, defender.name, damage_to_defender
    ));
    log.push(format!(
        "{}'s health: {} -> {}",
        defender.name,
        defender.current_health,
        defender_health_after.max(0)
    ));

    if defender_defeated {
        log.push(format!("{} is defeated!", defender.name));
        return DuelOutcome {
            damage_to_defender,
            damage_to_attacker: 0,
            defender_defeated: true,
            attacker_defeated: false,
            log,
        };
    }

    if attacker.has_first_strike() {
        log.push(format!(
            "{} ambushed its target and escapes the counterattack.",
            attacker.name
        ));
        return DuelOutcome {
            damage_to_defender,
            damage_to_attacker: 0,
            defender_defeated: false,
            attacker_defeated: false,
            log,
        };
    }

    let damage_to_attacker = strike_damage(defender.damage, attacker.defense);
    let attacker_health_after = attacker.current_health - damage_to_attacker;
    let attacker_defeated = attacker_health_after <= 0;

    log.push(format!(
        "{} counterattacks for {} damage.",
        defender.name, damage_to_attacker
    ));
    log.push(format!(
        "{}'s health: {} -> {}",
        attacker.name,
        attacker.current_health,
        attacker_health_after.max(0)
    ));
    if attacker_defeated {
        log.push(format!("{} is defeated!", attacker.name));
    }

    DuelOutcome {
        damage_to_defender,
        damage_to_attacker,
        defender_defeated: false,
        attacker_defeated,
        log,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Position;
    use crate::cards::CardCategory;

    fn card(name: &str, damage: i32, health: i32) -> CardDefinition {
        CardDefinition {
            id: 1,
            name: name.to_string(),
            category: CardCategory::Unit,
            affinity: Affinity::Neutral,
            base_damage: damage,
            base_health: health,
            base_defense: 0,
            deployment_cost: None,
            abilities: vec![],
            evolution: None,
            description: String::new(),
        }
    }

    fn unit(name: &str, damage: i32, health: i32, defense: i32) -> UnitSnapshot {
        let mut snapshot = UnitSnapshot::from_card(&card(name, damage, health), "bob", 1);
        snapshot.defense = defense;
        snapshot
    }

    fn space(terrain: TerrainKind, value: u32, level: u32) -> BoardSpace {
        BoardSpace {
            id: 3,
            terrain,
            position: Position { x: 0.0, y: 0.0 },
            owner: Some("bob".to_string()),
            unit: None,
            value,
            level,
        }
    }

    #[test]
    fn test_terrain_bonus_table() {
        assert_eq!(terrain_bonus(TerrainKind::Battlefield, Affinity::Military), 2);
        assert_eq!(terrain_bonus(TerrainKind::RitualSite, Affinity::Occult), 3);
        assert_eq!(terrain_bonus(TerrainKind::Battlefield, Affinity::Occult), 0);
        assert_eq!(terrain_bonus(TerrainKind::Outpost, Affinity::Military), 0);
    }

    #[test]
    fn test_tie_goes_to_defender() {
        let attacker = card("Attacker", 10, 3);
        let defender = unit("Defender", 10, 3, 0);
        let outcome = resolve_territory(&attacker, &defender, &space(TerrainKind::Outpost, 3, 0));

        assert!(!outcome.attacker_wins);
        assert_eq!(outcome.toll_amount, 15);
    }

    #[test]
    fn test_attacker_wins_on_strictly_greater_power() {
        let attacker = card("Attacker", 11, 3);
        let defender = unit("Defender", 10, 3, 0);
        let outcome = resolve_territory(&attacker, &defender, &space(TerrainKind::Outpost, 3, 0));

        assert!(outcome.attacker_wins);
    }

    #[test]
    fn test_terrain_bonus_swings_a_battle() {
        let attacker = card("Attacker", 11, 3);
        let mut defender = unit("Defender", 10, 3, 0);
        defender.affinity = Affinity::Occult;

        // +3 on a ritual site pushes the defender to 13
        let outcome =
            resolve_territory(&attacker, &defender, &space(TerrainKind::RitualSite, 3, 0));
        assert!(!outcome.attacker_wins);
    }

    #[test]
    fn test_territory_log_is_always_produced() {
        let attacker = card("Attacker", 5, 3);
        let defender = unit("Defender", 2, 3, 0);
        let outcome = resolve_territory(&attacker, &defender, &space(TerrainKind::Bunker, 2, 1));

        // Header, comparison, result at minimum
        assert!(outcome.log.len() >= 3);
        assert!(outcome.log.iter().any(|l| l.contains("Battle for")));
    }

    #[test]
    fn test_duel_damage_floor() {
        let attacker = unit("Weakling", 1, 5, 0);
        let defender = unit("Fortress", 1, 10, 99);

        let outcome = resolve_duel(&attacker, &defender);
        assert_eq!(outcome.damage_to_defender, 1);
        // Counterattack also floored at 1
        assert_eq!(outcome.damage_to_attacker, 1);
    }

    #[test]
    fn test_duel_defeat_skips_counterattack() {
        let attacker = unit("Bruiser", 10, 5, 0);
        let defender = unit("Scout", 3, 2, 0);

        let outcome = resolve_duel(&attacker, &defender);
        assert!(outcome.defender_defeated);
        assert_eq!(outcome.damage_to_attacker, 0);
    }

    #[test]
    fn test_duel_first_strike_prevents_counterattack() {
        let mut attacker = unit("Raider", 2, 3, 0);
        attacker.abilities.push("Ambush".to_string());
        let defender = unit("Guard", 5, 10, 0);

        let outcome = resolve_duel(&attacker, &defender);
        assert!(!outcome.defender_defeated);
        assert_eq!(outcome.damage_to_attacker, 0);
        assert!(!outcome.attacker_defeated);
    }

    #[test]
    fn test_duel_counterattack_can_defeat_attacker() {
        let attacker = unit("Reckless", 2, 1, 0);
        let defender = unit("Veteran", 6, 10, 0);

        let outcome = resolve_duel(&attacker, &defender);
        assert!(!outcome.defender_defeated);
        assert!(outcome.attacker_defeated);
    }

    #[test]
    fn test_toll_matches_economy_calculator() {
        let attacker = card("Attacker", 1, 1);
        let defender = unit("Defender", 9, 9, 0);
        let s = space(TerrainKind::RitualSite, 4, 2);

        let outcome = resolve_territory(&attacker, &defender, &s);
        assert_eq!(outcome.toll_amount, crate::economy::toll_for_space(&s));
    }
}
