//! Static card catalog and named deck registry.
//!
//! Both are read-only lookup tables: the engine only ever needs
//! `find_card(id)` and `deck(id)`. The built-in data is a small wartime set;
//! a real deployment would load a larger database through the same types.

use crate::cards::{Affinity, CardCategory, CardDefinition, CardId, EvolutionInfo};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Read-only card database keyed by card id.
#[derive(Debug, Clone)]
pub struct CardCatalog {
    cards: HashMap<CardId, CardDefinition>,
}

impl CardCatalog {
    /// Build a catalog from a list of definitions.
    ///
    /// Duplicate ids are a data bug, not a user error.
    pub fn new(definitions: Vec<CardDefinition>) -> Self {
        let mut cards = HashMap::with_capacity(definitions.len());
        for card in definitions {
            let previous = cards.insert(card.id, card);
            assert!(previous.is_none(), "duplicate card id in catalog");
        }
        Self { cards }
    }

    /// The built-in card set.
    pub fn builtin() -> Self {
        Self::new(builtin_cards())
    }

    /// Find a card by id.
    pub fn find_card(&self, id: CardId) -> Option<&CardDefinition> {
        self.cards.get(&id)
    }

    /// Number of cards in the catalog.
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// All cards of a given category.
    pub fn cards_by_category(&self, category: CardCategory) -> Vec<&CardDefinition> {
        let mut cards: Vec<&CardDefinition> = self
            .cards
            .values()
            .filter(|c| c.category == category)
            .collect();
        cards.sort_by_key(|c| c.id);
        cards
    }
}

/// A named deck template: an ordered list of card ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deck {
    pub id: String,
    pub name: String,
    pub description: String,
    pub cards: Vec<CardId>,
}

/// Read-only registry of named deck templates.
#[derive(Debug, Clone)]
pub struct DeckRegistry {
    decks: Vec<Deck>,
}

impl DeckRegistry {
    /// The built-in deck templates.
    pub fn builtin() -> Self {
        Self {
            decks: builtin_decks(),
        }
    }

    /// Find a deck template by id.
    pub fn deck(&self, id: &str) -> Option<&Deck> {
        self.decks.iter().find(|d| d.id == id)
    }

    /// All available deck templates.
    pub fn all(&self) -> &[Deck] {
        &self.decks
    }
}

fn unit(
    id: CardId,
    name: &str,
    affinity: Affinity,
    damage: i32,
    health: i32,
    cost: u32,
    abilities: &[&str],
    description: &str,
) -> CardDefinition {
    CardDefinition {
        id,
        name: name.to_string(),
        category: CardCategory::Unit,
        affinity,
        base_damage: damage,
        base_health: health,
        base_defense: 0,
        deployment_cost: Some(cost),
        abilities: abilities.iter().map(|a| a.to_string()).collect(),
        evolution: None,
        description: description.to_string(),
    }
}

fn gear(
    id: CardId,
    name: &str,
    damage: i32,
    health: i32,
    defense: i32,
    abilities: &[&str],
    description: &str,
) -> CardDefinition {
    CardDefinition {
        id,
        name: name.to_string(),
        category: CardCategory::Gear,
        affinity: Affinity::Neutral,
        base_damage: damage,
        base_health: health,
        base_defense: defense,
        deployment_cost: Some(1),
        abilities: abilities.iter().map(|a| a.to_string()).collect(),
        evolution: None,
        description: description.to_string(),
    }
}

fn builtin_cards() -> Vec<CardDefinition> {
    let mut cards = vec![
        unit(
            1,
            "Shock Trooper",
            Affinity::Military,
            3,
            3,
            1,
            &["Quick Deploy"],
            "Frontline assault infantry",
        ),
        unit(
            2,
            "Line Rifleman",
            Affinity::Military,
            2,
            4,
            1,
            &["Endurance"],
            "Holds ground under sustained fire",
        ),
        unit(
            3,
            "Occult Adept",
            Affinity::Occult,
            4,
            2,
            2,
            &["Dark Ritual"],
            "Channels power from ritual sites",
        ),
        unit(
            4,
            "Trench Raider",
            Affinity::Military,
            3,
            2,
            1,
            &["Ambush"],
            "Strikes before the enemy can react",
        ),
        unit(
            5,
            "Ritual Warden",
            Affinity::Occult,
            2,
            5,
            2,
            &[],
            "Guardian bound to consecrated ground",
        ),
        unit(
            8,
            "Field Saboteur",
            Affinity::Civilian,
            2,
            2,
            1,
            &[],
            "Irregular fighter behind enemy lines",
        ),
        unit(
            7,
            "Veteran Sergeant",
            Affinity::Military,
            4,
            4,
            2,
            &["Endurance"],
            "Hardened survivor of many campaigns",
        ),
        gear(
            20,
            "Reinforced Plating",
            0,
            0,
            2,
            &[],
            "Bolted armor sheets",
        ),
        gear(21, "Trench Blade", 2, 0, 0, &[], "Brutal close-quarters weapon"),
        gear(
            22,
            "Blessed Talisman",
            0,
            0,
            0,
            &["+2 Health"],
            "Wards the bearer against harm",
        ),
        gear(
            23,
            "Officer's Sidearm",
            0,
            0,
            0,
            &["+1 Damage", "Ambush"],
            "Quick on the draw",
        ),
        CardDefinition {
            id: 30,
            name: "Artillery Barrage".to_string(),
            category: CardCategory::Spell,
            affinity: Affinity::Military,
            base_damage: 3,
            base_health: 0,
            base_defense: 0,
            deployment_cost: Some(2),
            abilities: vec![],
            evolution: None,
            description: "Saturation bombardment of one space".to_string(),
        },
        CardDefinition {
            id: 31,
            name: "Field Triage".to_string(),
            category: CardCategory::Spell,
            affinity: Affinity::Civilian,
            base_damage: 0,
            base_health: 0,
            base_defense: 0,
            deployment_cost: Some(1),
            abilities: vec!["HEAL".to_string()],
            evolution: None,
            description: "Patch up a wounded unit".to_string(),
        },
    ];

    // Conscripts evolve into veterans after surviving long enough.
    let mut conscript = unit(
        6,
        "Raw Conscript",
        Affinity::Civilian,
        1,
        2,
        1,
        &[],
        "Green recruit with room to grow",
    );
    conscript.evolution = Some(EvolutionInfo {
        can_evolve: true,
        evolves_to: Some(7),
        conditions: vec!["Survive 2 turns".to_string()],
    });
    cards.push(conscript);

    cards
}

fn builtin_decks() -> Vec<Deck> {
    vec![
        Deck {
            id: "standard".to_string(),
            name: "Standard Deck".to_string(),
            description: "A balanced mix of military and occult forces".to_string(),
            cards: vec![1, 2, 3, 4, 5, 6, 8, 20, 21, 22, 23, 30],
        },
        Deck {
            id: "military".to_string(),
            name: "Military Might".to_string(),
            description: "Strong conventional units and weaponry".to_string(),
            cards: vec![1, 2, 4, 7, 20, 21],
        },
        Deck {
            id: "occult".to_string(),
            name: "Occult Powers".to_string(),
            description: "Ritual units and protective charms".to_string(),
            cards: vec![3, 5, 22, 31],
        },
    ]
}
