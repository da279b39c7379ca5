//! Warfront - a territory card game engine
//!
//! This crate provides the core game logic for Warfront, including:
//! - The circular track board with terrain, ownership, and garrisons
//! - Card definitions, the built-in catalog, and deck templates
//! - Player state, the deployment-point economy, and turn flow
//! - Territory and duel combat resolution
//! - Gear attachment with full stat recomputation on removal
//!
//! # Architecture
//!
//! The engine is pure state-in, state-out: every operation on
//! [`game::GameState`] validates, mutates in place, and returns a
//! serializable error on rejection. Nothing here does I/O; session
//! storage and persistence live in the companion service crate.
//!
//! # Modules
//!
//! - [`board`]: Track generation, spaces, and unit snapshots
//! - [`cards`]: Card definitions, abilities, and evolution
//! - [`catalog`]: The built-in card set and deck registry
//! - [`combat`]: Territory battles and unit duels
//! - [`economy`]: Tolls, income, and deployment costs
//! - [`game`]: The session state machine
//! - [`gear`]: Gear stat application and recomputation
//! - [`player`]: Per-player state

pub mod board;
pub mod cards;
pub mod catalog;
pub mod combat;
pub mod economy;
pub mod game;
pub mod gear;
pub mod player;

// Re-export commonly used types
pub use board::{Board, BoardLayout, BoardSpace, PlayerId, Position, SpaceId, TerrainKind, UnitSnapshot};
pub use cards::{AbilityEffect, Affinity, CardCategory, CardDefinition, CardId, EvolutionInfo};
pub use catalog::{CardCatalog, Deck, DeckRegistry};
pub use combat::{DuelOutcome, TerritoryOutcome};
pub use game::{DeckMode, GameError, GamePhase, GameState};
pub use player::{PlayerState, OPENING_HAND_SIZE, STARTING_DP, STARTING_HEALTH};
