//! Deployment-point economy: pure calculators over cards, spaces, and boards.
//!
//! Every DP figure in the game comes from the functions here, so there is a
//! single source of truth for the toll formula and the income components.
//! The callers in `game` treat DP as derived state: they can always recompute
//! a player's income from the board.

use crate::board::{Board, BoardSpace};
use crate::cards::CardDefinition;

/// Cost of a card with no explicit deployment cost.
pub const DEFAULT_DEPLOYMENT_COST: u32 = 1;

/// Flat DP income granted at the start of each of a player's turns,
/// before the territory component.
pub const BASE_TURN_INCOME: u32 = 1;

/// DP cost to deploy a card.
pub fn deployment_cost(card: &CardDefinition) -> u32 {
    card.deployment_cost.unwrap_or(DEFAULT_DEPLOYMENT_COST)
}

/// Whether `current_dp` covers the card's deployment cost.
pub fn can_afford(card: &CardDefinition, current_dp: u32) -> bool {
    deployment_cost(card) <= current_dp
}

/// DP remaining after deploying a card. Never goes negative.
pub fn deduct(current_dp: u32, card: &CardDefinition) -> u32 {
    current_dp.saturating_sub(deployment_cost(card))
}

/// Toll owed for losing a battle on a space; also the cost of upgrading it.
///
/// floor(value * 5 * (1 + level * 0.5)), computed in integer halves so it is
/// exact. The combat resolver uses this same function.
pub fn toll_for_space(space: &BoardSpace) -> u32 {
    space.value * 5 * (2 + space.level) / 2
}

/// DP awarded for completing a full circuit of the track.
///
/// Lap 0 gives 1, lap 1 gives 2, and so on.
pub fn dp_from_lap(lap_number: u32) -> u32 {
    1 + lap_number
}

/// DP awarded once, at the moment a space is upgraded to `new_level`.
pub fn dp_from_upgrade(new_level: u32) -> u32 {
    new_level
}

/// Recurring per-turn income from a player's territory.
///
/// floor of the sum of `value * (1 + level * 0.5)` over owned spaces; the
/// halving happens after summing so the result matches the real-valued sum.
pub fn territory_income(board: &Board, player_id: &str) -> u32 {
    let halves: u32 = board
        .spaces_owned_by(player_id)
        .map(|space| space.value * (2 + space.level))
        .sum();
    halves / 2
}

/// Total income granted to a player at the start of their turn.
pub fn turn_income(board: &Board, player_id: &str) -> u32 {
    BASE_TURN_INCOME + territory_income(board, player_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{Position, TerrainKind, UnitSnapshot};
    use crate::cards::{Affinity, CardCategory};

    fn card(cost: Option<u32>) -> CardDefinition {
        CardDefinition {
            id: 1,
            name: "Test Unit".to_string(),
            category: CardCategory::Unit,
            affinity: Affinity::Neutral,
            base_damage: 2,
            base_health: 2,
            base_defense: 0,
            deployment_cost: cost,
            abilities: vec![],
            evolution: None,
            description: String::new(),
        }
    }

    fn space(value: u32, level: u32) -> BoardSpace {
        BoardSpace {
            id: 0,
            terrain: TerrainKind::Outpost,
            position: Position { x: 0.0, y: 0.0 },
            owner: None,
            unit: None,
            value,
            level,
        }
    }

    #[test]
    fn test_deployment_cost_default() {
        assert_eq!(deployment_cost(&card(None)), 1);
        assert_eq!(deployment_cost(&card(Some(3))), 3);
    }

    #[test]
    fn test_can_afford() {
        assert!(can_afford(&card(Some(2)), 2));
        assert!(!can_afford(&card(Some(2)), 1));
    }

    #[test]
    fn test_deduct_never_negative() {
        assert_eq!(deduct(5, &card(Some(2))), 3);
        assert_eq!(deduct(1, &card(Some(3))), 0);
        assert_eq!(deduct(0, &card(None)), 0);
    }

    #[test]
    fn test_toll_formula() {
        // value 3, level 0: 3 * 5 = 15
        assert_eq!(toll_for_space(&space(3, 0)), 15);
        // value 3, level 1: floor(15 * 1.5) = 22
        assert_eq!(toll_for_space(&space(3, 1)), 22);
        // value 2, level 2: 10 * 2 = 20
        assert_eq!(toll_for_space(&space(2, 2)), 20);
    }

    #[test]
    fn test_lap_and_upgrade_awards() {
        assert_eq!(dp_from_lap(0), 1);
        assert_eq!(dp_from_lap(1), 2);
        assert_eq!(dp_from_lap(4), 5);

        assert_eq!(dp_from_upgrade(1), 1);
        assert_eq!(dp_from_upgrade(3), 3);
    }

    #[test]
    fn test_territory_income_floors_after_summing() {
        let mut board = crate::board::Board::circular(&crate::board::BoardLayout {
            space_count: 4,
            ..Default::default()
        });

        // Two level-1 spaces of value 1: each worth 1.5, together exactly 3.
        for id in [0, 1] {
            let s = board.space_mut(id).unwrap();
            s.owner = Some("alice".to_string());
            s.value = 1;
            s.level = 1;
        }

        assert_eq!(territory_income(&board, "alice"), 3);
        assert_eq!(territory_income(&board, "bob"), 0);
        assert_eq!(turn_income(&board, "alice"), BASE_TURN_INCOME + 3);
    }

    #[test]
    fn test_unit_snapshot_has_no_bearing_on_income() {
        // Income depends on ownership, not garrison presence.
        let mut board = crate::board::Board::circular(&crate::board::BoardLayout {
            space_count: 4,
            ..Default::default()
        });
        let s = board.space_mut(0).unwrap();
        s.owner = Some("alice".to_string());
        s.value = 2;
        let with_unit = territory_income(&board, "alice");

        let c = card(None);
        board.space_mut(0).unwrap().unit = Some(UnitSnapshot::from_card(&c, "alice", 1));
        assert_eq!(territory_income(&board, "alice"), with_unit);
    }
}
