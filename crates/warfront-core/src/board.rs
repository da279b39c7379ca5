//! Game board representation and the circular board generator.
//!
//! This module contains:
//! - Terrain kinds and their base economic weights
//! - Board spaces with ownership, garrison units, and upgrade levels
//! - Unit snapshots (the mutable on-space copy of a deployed card)
//! - The generator that lays spaces out on a circle and wires up the
//!   connections map

use crate::cards::{Affinity, CardDefinition, CardId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::f32::consts::TAU;

/// Space identifier, unique and stable within a session.
pub type SpaceId = u32;

/// Player identifier. Sessions always hold exactly two.
pub type PlayerId = String;

/// Terrain of a board space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    Battlefield,
    Bunker,
    RitualSite,
    Outpost,
}

impl TerrainKind {
    /// All terrain kinds, in generator rotation order.
    pub const ALL: [TerrainKind; 4] = [
        TerrainKind::Battlefield,
        TerrainKind::Bunker,
        TerrainKind::RitualSite,
        TerrainKind::Outpost,
    ];

    /// Base economic weight of a space with this terrain.
    pub fn base_value(&self) -> u32 {
        match self {
            TerrainKind::Battlefield => 3,
            TerrainKind::Bunker => 2,
            TerrainKind::RitualSite => 4,
            TerrainKind::Outpost => 1,
        }
    }

    /// Display name used in log lines.
    pub fn name(&self) -> &'static str {
        match self {
            TerrainKind::Battlefield => "Battlefield",
            TerrainKind::Bunker => "Bunker",
            TerrainKind::RitualSite => "Ritual Site",
            TerrainKind::Outpost => "Outpost",
        }
    }
}

/// Display coordinates of a space. Opaque to all game logic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// The mutable snapshot of a deployed card garrisoning a space.
///
/// Stats start from the card definition and drift with gear, buffs, and
/// damage taken; the definition itself is never touched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub card_id: CardId,
    pub player_id: PlayerId,
    pub name: String,
    pub damage: i32,
    pub defense: i32,
    pub current_health: i32,
    pub max_health: i32,
    pub affinity: Affinity,
    pub abilities: Vec<String>,
    /// Gear attached to this unit, in equip order
    pub equipped_gear_ids: Vec<CardId>,
    /// Set after attacking; cleared when the owner's turn comes back around
    pub exhausted: bool,
    /// Turn number the unit entered the board
    pub placed_on_turn: u32,
    /// Enemy units this unit has destroyed
    pub defeats: u32,
}

impl UnitSnapshot {
    /// Snapshot a card definition for deployment.
    pub fn from_card(card: &CardDefinition, player_id: &str, turn: u32) -> Self {
        let health = card.base_health.max(1);
        Self {
            card_id: card.id,
            player_id: player_id.to_string(),
            name: card.name.clone(),
            damage: card.base_damage,
            defense: card.base_defense,
            current_health: health,
            max_health: health,
            affinity: card.affinity,
            abilities: card.abilities.clone(),
            equipped_gear_ids: Vec::new(),
            exhausted: false,
            placed_on_turn: turn,
            defeats: 0,
        }
    }

    /// Whether this unit strikes before its target can counterattack.
    pub fn has_first_strike(&self) -> bool {
        crate::cards::has_first_strike(&self.abilities)
    }

    /// Full turns this unit has been on the board as of `current_turn`.
    pub fn turns_survived(&self, current_turn: u32) -> u32 {
        current_turn.saturating_sub(self.placed_on_turn)
    }
}

/// A single space on the track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoardSpace {
    pub id: SpaceId,
    pub terrain: TerrainKind,
    pub position: Position,
    pub owner: Option<PlayerId>,
    pub unit: Option<UnitSnapshot>,
    /// Base economic weight, terrain-derived
    pub value: u32,
    /// Upgrade tier, starts at 0
    pub level: u32,
}

/// Layout configuration for the board generator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardLayout {
    pub space_count: u32,
    pub radius: f32,
    pub center_x: f32,
    pub center_y: f32,
}

impl Default for BoardLayout {
    fn default() -> Self {
        Self {
            space_count: 24,
            radius: 200.0,
            center_x: 250.0,
            center_y: 250.0,
        }
    }
}

/// The full board: ordered spaces plus the connections map.
///
/// Connections are immutable after generation and deterministic for a given
/// layout; movement follows them to resolve "roll N, advance N steps".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub spaces: Vec<BoardSpace>,
    pub connections: HashMap<SpaceId, Vec<SpaceId>>,
}

impl Board {
    /// Generate a circular track from a layout config.
    ///
    /// Terrain rotates through the four kinds; each space connects to the
    /// next one around the circle. Fully deterministic.
    pub fn circular(layout: &BoardLayout) -> Self {
        assert!(layout.space_count >= 2, "board needs at least two spaces");

        let count = layout.space_count;
        let mut spaces = Vec::with_capacity(count as usize);
        let mut connections = HashMap::with_capacity(count as usize);

        for i in 0..count {
            let angle = (i as f32 / count as f32) * TAU;
            let terrain = TerrainKind::ALL[(i as usize) % TerrainKind::ALL.len()];

            spaces.push(BoardSpace {
                id: i,
                terrain,
                position: Position {
                    x: layout.center_x + layout.radius * angle.cos(),
                    y: layout.center_y + layout.radius * angle.sin(),
                },
                owner: None,
                unit: None,
                value: terrain.base_value(),
                level: 0,
            });

            connections.insert(i, vec![(i + 1) % count]);
        }

        Self {
            spaces,
            connections,
        }
    }

    /// Total number of spaces on the track.
    pub fn total_spaces(&self) -> u32 {
        self.spaces.len() as u32
    }

    /// Get a space by id.
    pub fn space(&self, id: SpaceId) -> Option<&BoardSpace> {
        self.spaces.iter().find(|s| s.id == id)
    }

    /// Get a mutable space by id.
    pub fn space_mut(&mut self, id: SpaceId) -> Option<&mut BoardSpace> {
        self.spaces.iter_mut().find(|s| s.id == id)
    }

    /// Neighbors of a space, per the connections map.
    ///
    /// Every space must have an entry; a missing one is a generator bug.
    pub fn neighbors(&self, id: SpaceId) -> &[SpaceId] {
        self.connections
            .get(&id)
            .map(Vec::as_slice)
            .expect("space missing from connections map")
    }

    /// Step `steps` spaces forward from `from` along the track.
    pub fn advance(&self, from: SpaceId, steps: u32) -> SpaceId {
        (from + steps) % self.total_spaces()
    }

    /// All spaces owned by a player.
    pub fn spaces_owned_by<'a>(
        &'a self,
        player_id: &'a str,
    ) -> impl Iterator<Item = &'a BoardSpace> {
        self.spaces
            .iter()
            .filter(move |s| s.owner.as_deref() == Some(player_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_circular_board_layout() {
        let board = Board::circular(&BoardLayout::default());

        assert_eq!(board.total_spaces(), 24);
        assert_eq!(board.spaces[0].id, 0);
        assert_eq!(board.spaces[23].id, 23);

        // Terrain rotates through all four kinds
        assert_eq!(board.spaces[0].terrain, TerrainKind::Battlefield);
        assert_eq!(board.spaces[1].terrain, TerrainKind::Bunker);
        assert_eq!(board.spaces[4].terrain, TerrainKind::Battlefield);
    }

    #[test]
    fn test_connections_form_a_single_cycle() {
        let board = Board::circular(&BoardLayout::default());

        let mut current = 0;
        for _ in 0..board.total_spaces() {
            let next = board.neighbors(current);
            assert_eq!(next.len(), 1);
            current = next[0];
        }
        assert_eq!(current, 0, "walking the whole track returns to start");
    }

    #[test]
    fn test_generator_is_deterministic() {
        let layout = BoardLayout::default();
        assert_eq!(Board::circular(&layout), Board::circular(&layout));
    }

    #[test]
    fn test_advance_wraps_around() {
        let board = Board::circular(&BoardLayout::default());
        assert_eq!(board.advance(20, 6), 2);
        assert_eq!(board.advance(0, 24), 0);
        assert_eq!(board.advance(5, 3), 8);
    }

    #[test]
    fn test_values_are_terrain_derived() {
        let board = Board::circular(&BoardLayout::default());
        for space in &board.spaces {
            assert_eq!(space.value, space.terrain.base_value());
        }
    }
}
