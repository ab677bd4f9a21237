use serde::{Deserialize, Serialize};

use crate::board::{EdgeId, HexId, NodeId};
use crate::game::players::PlayerId;
use crate::game::resources::ResourceBundle;
use crate::game::state::TradeId;
use crate::types::{ActionKind, Resource};

/// A player intent. The acting player is supplied alongside the action, never inside it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum GameAction {
    RollDice,
    BuildRoad {
        edge: EdgeId,
        is_free: bool,
    },
    BuildSettlement {
        node: NodeId,
        is_free: bool,
    },
    BuildCity {
        node: NodeId,
    },
    BuyDevelopmentCard,
    PlayKnight {
        move_robber_to: HexId,
        steal_from: Option<PlayerId>,
    },
    PlayRoadBuilding,
    PlaceRoadBuildingRoad {
        edge: EdgeId,
    },
    PlayYearOfPlenty {
        first: Resource,
        second: Resource,
    },
    PlayMonopoly {
        resource: Resource,
    },
    MoveRobber {
        hex: HexId,
    },
    StealResource {
        target: PlayerId,
    },
    DiscardResources {
        bundle: ResourceBundle,
    },
    ProposeTrade {
        offering: ResourceBundle,
        requesting: ResourceBundle,
        /// `None` offers the trade to every other player.
        targets: Option<Vec<PlayerId>>,
    },
    AcceptTrade {
        trade_id: TradeId,
    },
    RejectTrade {
        trade_id: TradeId,
    },
    CancelTrade {
        trade_id: TradeId,
    },
    MaritimeTrade {
        giving: Resource,
        giving_amount: u8,
        receiving: Resource,
    },
    EndTurn,
}

impl GameAction {
    pub fn kind(&self) -> ActionKind {
        match self {
            GameAction::RollDice => ActionKind::RollDice,
            GameAction::BuildRoad { .. } => ActionKind::BuildRoad,
            GameAction::BuildSettlement { .. } => ActionKind::BuildSettlement,
            GameAction::BuildCity { .. } => ActionKind::BuildCity,
            GameAction::BuyDevelopmentCard => ActionKind::BuyDevelopmentCard,
            GameAction::PlayKnight { .. } => ActionKind::PlayKnight,
            GameAction::PlayRoadBuilding => ActionKind::PlayRoadBuilding,
            GameAction::PlaceRoadBuildingRoad { .. } => ActionKind::PlaceRoadBuildingRoad,
            GameAction::PlayYearOfPlenty { .. } => ActionKind::PlayYearOfPlenty,
            GameAction::PlayMonopoly { .. } => ActionKind::PlayMonopoly,
            GameAction::MoveRobber { .. } => ActionKind::MoveRobber,
            GameAction::StealResource { .. } => ActionKind::StealResource,
            GameAction::DiscardResources { .. } => ActionKind::DiscardResources,
            GameAction::ProposeTrade { .. } => ActionKind::ProposeTrade,
            GameAction::AcceptTrade { .. } => ActionKind::AcceptTrade,
            GameAction::RejectTrade { .. } => ActionKind::RejectTrade,
            GameAction::CancelTrade { .. } => ActionKind::CancelTrade,
            GameAction::MaritimeTrade { .. } => ActionKind::MaritimeTrade,
            GameAction::EndTurn => ActionKind::EndTurn,
        }
    }

    /// Actions a non-active player may take.
    pub fn is_turn_exempt(&self) -> bool {
        matches!(
            self,
            GameAction::AcceptTrade { .. }
                | GameAction::RejectTrade { .. }
                | GameAction::DiscardResources { .. }
        )
    }
}
