//! Domain events: the authoritative, ordered record of everything that changed.
//!
//! Every event carries enough data to be applied without randomness or re-validation, so
//! a snapshot plus the events after it always reproduces the current state.

use serde::{Deserialize, Serialize};

use crate::board::{EdgeId, HexId, NodeId};
use crate::game::players::PlayerId;
use crate::game::resources::ResourceBundle;
use crate::game::state::{TradeId, TradeOffer};
use crate::types::{DevelopmentCard, PieceKind, Resource};

/// Where a setup piece went.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "camelCase")]
pub enum Placement {
    Node(NodeId),
    Edge(EdgeId),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DomainEvent {
    DiceRolled {
        player: PlayerId,
        die1: u8,
        die2: u8,
    },
    TurnStarted {
        player: PlayerId,
        turn_number: u32,
    },
    TurnEnded {
        player: PlayerId,
    },
    RoadBuilt {
        player: PlayerId,
        edge: EdgeId,
        resources_spent: ResourceBundle,
        was_free: bool,
    },
    SettlementBuilt {
        player: PlayerId,
        node: NodeId,
        resources_spent: ResourceBundle,
        was_free: bool,
    },
    CityBuilt {
        player: PlayerId,
        node: NodeId,
        resources_spent: ResourceBundle,
        was_free: bool,
    },
    /// One entry per player that received anything, in seat order.
    ResourcesProduced {
        roll: u8,
        production: Vec<(PlayerId, ResourceBundle)>,
    },
    RobberMoved {
        player: PlayerId,
        hex: HexId,
    },
    ResourceStolen {
        thief: PlayerId,
        victim: PlayerId,
        resource: Resource,
    },
    DevelopmentCardBought {
        player: PlayerId,
        kind: DevelopmentCard,
    },
    DevelopmentCardPlayed {
        player: PlayerId,
        kind: DevelopmentCard,
    },
    YearOfPlentyTaken {
        player: PlayerId,
        resources: ResourceBundle,
    },
    MonopolyCollected {
        player: PlayerId,
        resource: Resource,
        collected: Vec<(PlayerId, u8)>,
    },
    MaritimeTradeExecuted {
        player: PlayerId,
        giving: Resource,
        giving_amount: u8,
        receiving: Resource,
    },
    ResourcesDiscarded {
        player: PlayerId,
        resources: ResourceBundle,
    },
    StartingResourcesGranted {
        player: PlayerId,
        resources: ResourceBundle,
    },
    TradeProposed {
        offer: TradeOffer,
    },
    TradeAccepted {
        trade_id: TradeId,
        accepter: PlayerId,
    },
    TradeRejected {
        trade_id: TradeId,
        rejecter: PlayerId,
    },
    TradeCancelled {
        trade_id: TradeId,
    },
    PlayerWon {
        player: PlayerId,
        points: u8,
    },
    LongestRoadAwarded {
        new_holder: PlayerId,
        length: u8,
    },
    LargestArmyAwarded {
        new_holder: PlayerId,
        knights: u8,
    },
    SetupPiecePlaced {
        player: PlayerId,
        piece: PieceKind,
        location: Placement,
    },
    SetupTurnAdvanced {
        next_player: PlayerId,
        setup_round: u8,
        setup_player_index: u8,
        setup_forward: bool,
    },
    SetupPhaseEnded,
    /// Players over the hand limit and how many cards each must give up.
    MustDiscard {
        requirements: Vec<(PlayerId, u8)>,
    },
}

impl DomainEvent {
    pub fn name(&self) -> &'static str {
        match self {
            DomainEvent::DiceRolled { .. } => "diceRolled",
            DomainEvent::TurnStarted { .. } => "turnStarted",
            DomainEvent::TurnEnded { .. } => "turnEnded",
            DomainEvent::RoadBuilt { .. } => "roadBuilt",
            DomainEvent::SettlementBuilt { .. } => "settlementBuilt",
            DomainEvent::CityBuilt { .. } => "cityBuilt",
            DomainEvent::ResourcesProduced { .. } => "resourcesProduced",
            DomainEvent::RobberMoved { .. } => "robberMoved",
            DomainEvent::ResourceStolen { .. } => "resourceStolen",
            DomainEvent::DevelopmentCardBought { .. } => "developmentCardBought",
            DomainEvent::DevelopmentCardPlayed { .. } => "developmentCardPlayed",
            DomainEvent::YearOfPlentyTaken { .. } => "yearOfPlentyTaken",
            DomainEvent::MonopolyCollected { .. } => "monopolyCollected",
            DomainEvent::MaritimeTradeExecuted { .. } => "maritimeTradeExecuted",
            DomainEvent::ResourcesDiscarded { .. } => "resourcesDiscarded",
            DomainEvent::StartingResourcesGranted { .. } => "startingResourcesGranted",
            DomainEvent::TradeProposed { .. } => "tradeProposed",
            DomainEvent::TradeAccepted { .. } => "tradeAccepted",
            DomainEvent::TradeRejected { .. } => "tradeRejected",
            DomainEvent::TradeCancelled { .. } => "tradeCancelled",
            DomainEvent::PlayerWon { .. } => "playerWon",
            DomainEvent::LongestRoadAwarded { .. } => "longestRoadAwarded",
            DomainEvent::LargestArmyAwarded { .. } => "largestArmyAwarded",
            DomainEvent::SetupPiecePlaced { .. } => "setupPiecePlaced",
            DomainEvent::SetupTurnAdvanced { .. } => "setupTurnAdvanced",
            DomainEvent::SetupPhaseEnded => "setupPhaseEnded",
            DomainEvent::MustDiscard { .. } => "mustDiscard",
        }
    }
}

/// An event stamped with its position in the game's event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencedEvent {
    pub index: u64,
    pub event: DomainEvent,
}
