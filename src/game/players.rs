use std::fmt;

use im::{OrdSet, Vector};
use serde::{Deserialize, Serialize};

use crate::board::{EdgeId, NodeId};
use crate::game::resources::ResourceBundle;
use crate::types::{Color, DevelopmentCard, PieceKind};

pub const MAX_ROADS: usize = 15;
pub const MAX_SETTLEMENTS: usize = 5;
pub const MAX_CITIES: usize = 4;

/// Caller-chosen player identifier. Seat order is the order players were seated in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct PlayerId(pub u32);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P{}", self.0)
    }
}

/// A development card in hand, tagged with the turn it was bought on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldCard {
    pub kind: DevelopmentCard,
    pub bought_turn: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub color: Color,
    pub resources: ResourceBundle,
    pub settlements: OrdSet<NodeId>,
    pub cities: OrdSet<NodeId>,
    pub roads: OrdSet<EdgeId>,
    pub dev_cards: Vector<HeldCard>,
    pub knights_played: u8,
}

impl Player {
    pub fn new(id: PlayerId, name: impl Into<String>, color: Color) -> Self {
        Self {
            id,
            name: name.into(),
            color,
            resources: ResourceBundle::zero(),
            settlements: OrdSet::new(),
            cities: OrdSet::new(),
            roads: OrdSet::new(),
            dev_cards: Vector::new(),
            knights_played: 0,
        }
    }

    pub fn pieces_left(&self, piece: PieceKind) -> usize {
        match piece {
            PieceKind::Road => MAX_ROADS.saturating_sub(self.roads.len()),
            PieceKind::Settlement => MAX_SETTLEMENTS.saturating_sub(self.settlements.len()),
            PieceKind::City => MAX_CITIES.saturating_sub(self.cities.len()),
        }
    }

    /// Nodes holding one of this player's settlements or cities.
    pub fn buildings(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.settlements.iter().chain(self.cities.iter()).copied()
    }

    pub fn owns_card(&self, kind: DevelopmentCard) -> bool {
        self.dev_cards.iter().any(|card| card.kind == kind)
    }

    /// Owns a copy of `kind` bought before `turn`.
    pub fn has_playable_card(&self, kind: DevelopmentCard, turn: u32) -> bool {
        self.dev_cards
            .iter()
            .any(|card| card.kind == kind && card.bought_turn < turn)
    }

    /// Removes the oldest playable copy of `kind`.
    pub fn take_playable_card(&mut self, kind: DevelopmentCard, turn: u32) -> bool {
        match self
            .dev_cards
            .iter()
            .position(|card| card.kind == kind && card.bought_turn < turn)
        {
            Some(pos) => {
                self.dev_cards.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn victory_point_cards(&self) -> u8 {
        self.dev_cards
            .iter()
            .filter(|card| card.kind == DevelopmentCard::VictoryPoint)
            .count() as u8
    }

    /// Points visible to everyone: buildings only, awards excluded.
    pub fn building_points(&self) -> u8 {
        self.settlements.len() as u8 + 2 * self.cities.len() as u8
    }
}
