//! Action validation.
//!
//! [`validate`] is a pure predicate over `(state, actor, action)`. Gate checks (actor, game
//! over, turn, phase) short-circuit in that order; after them every applicable rule is
//! checked and all failures are reported together.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::board::{EdgeId, HexId, NodeId};
use crate::game::action::GameAction;
use crate::game::players::{Player, PlayerId};
use crate::game::resources::{
    COST_CITY, COST_DEVELOPMENT, COST_ROAD, COST_SETTLEMENT, ResourceBundle,
};
use crate::game::state::{BuildingKind, GameState, Phase, TradeId, TradeOffer};
use crate::types::{ActionKind, DevelopmentCard, PieceKind, Resource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum PlacementRule {
    #[error("too close to another building")]
    DistanceRule,
    #[error("not connected to your roads or buildings")]
    NotConnected,
    #[error("location already occupied")]
    AlreadyOccupied,
    #[error("no settlement of yours to upgrade")]
    NoSettlementToUpgrade,
    #[error("location is not on the board")]
    OffBoard,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
pub enum Violation {
    #[error("actor is not seated in this game")]
    UnknownActor,
    #[error("the game is over")]
    GameOver,
    #[error("not your turn")]
    NotYourTurn,
    #[error("action not allowed in the current phase")]
    WrongPhase,
    #[error("a different setup piece is expected")]
    SetupPieceExpected,
    #[error("free roads from Road Building must be placed first")]
    FreeRoadsPending,
    #[error("no free roads to place")]
    NoFreeRoads,
    #[error("free building is only available during setup")]
    FreeBuildUnavailable,
    #[error("insufficient resources")]
    InsufficientResources,
    #[error("must discard exactly {required} cards, offered {provided}")]
    DiscardAmountMismatch { required: u8, provided: u32 },
    #[error("illegal placement: {0}")]
    IllegalPlacement(PlacementRule),
    #[error("no {0} pieces left")]
    SupplyExhausted(PieceKind),
    #[error("development deck is empty")]
    DeckEmpty,
    #[error("you do not hold that development card")]
    CardNotOwned,
    #[error("development card was bought this turn")]
    CardBoughtThisTurn,
    #[error("a development card was already played this turn")]
    CardAlreadyPlayedThisTurn,
    #[error("robber must move to a different hex on the board")]
    InvalidRobberHex,
    #[error("invalid steal target")]
    InvalidStealTarget,
    #[error("you do not owe a discard")]
    NoDiscardOwed,
    #[error("malformed trade")]
    InvalidTrade,
    #[error("trade not found or no longer open")]
    TradeNotFound,
    #[error("trade is not addressed to you")]
    TradeNotTargetingYou,
    #[error("only the proposer may cancel a trade")]
    NotTradeProposer,
    #[error("no port grants that exchange ratio")]
    PortRatioUnavailable,
    #[error("the bank cannot supply that")]
    BankInsufficient,
}

impl Violation {
    /// Member of the insufficient-resources class.
    pub fn is_insufficient_resources(&self) -> bool {
        matches!(
            self,
            Violation::InsufficientResources | Violation::DiscardAmountMismatch { .. }
        )
    }
}

/// A non-empty, ordered list of violations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(try_from = "RawRejection")]
#[error("action rejected: {}", .violations.iter().join("; "))]
pub struct Rejection {
    violations: Vec<Violation>,
}

#[derive(Deserialize)]
struct RawRejection {
    violations: Vec<Violation>,
}

impl TryFrom<RawRejection> for Rejection {
    type Error = &'static str;

    fn try_from(raw: RawRejection) -> Result<Self, Self::Error> {
        Self::from_violations(raw.violations).ok_or("a rejection needs at least one violation")
    }
}

impl Rejection {
    pub fn single(violation: Violation) -> Self {
        Self {
            violations: vec![violation],
        }
    }

    /// `None` when `violations` is empty.
    pub fn from_violations(violations: Vec<Violation>) -> Option<Self> {
        if violations.is_empty() {
            None
        } else {
            Some(Self { violations })
        }
    }

    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    pub fn first(&self) -> &Violation {
        &self.violations[0]
    }

    pub fn contains(&self, violation: &Violation) -> bool {
        self.violations.contains(violation)
    }
}

pub fn validate(state: &GameState, actor: PlayerId, action: &GameAction) -> Result<(), Rejection> {
    let Some(player) = state.player(actor) else {
        return Err(Rejection::single(Violation::UnknownActor));
    };
    if state.is_over() {
        return Err(Rejection::single(Violation::GameOver));
    }
    if !action.is_turn_exempt() && actor != state.turn.active {
        return Err(Rejection::single(Violation::NotYourTurn));
    }
    if let Some(violation) = phase_gate(state, action) {
        return Err(Rejection::single(violation));
    }

    let check = Check { state, player };
    let violations = check.action(action);
    match Rejection::from_violations(violations) {
        Some(rejection) => Err(rejection),
        None => Ok(()),
    }
}

fn phase_gate(state: &GameState, action: &GameAction) -> Option<Violation> {
    let phase = state.turn.phase;
    match phase {
        Phase::Setup => {
            let needs_road = state.turn.setup.as_ref().is_some_and(|s| s.needs_road);
            match action {
                GameAction::BuildSettlement { .. } if !needs_road => None,
                GameAction::BuildRoad { .. } if needs_road => None,
                GameAction::BuildSettlement { .. } | GameAction::BuildRoad { .. } => {
                    Some(Violation::SetupPieceExpected)
                }
                _ => Some(Violation::WrongPhase),
            }
        }
        Phase::Main if state.turn.free_roads > 0 => match action {
            GameAction::PlaceRoadBuildingRoad { .. } | GameAction::EndTurn => None,
            _ => Some(Violation::FreeRoadsPending),
        },
        _ if phase_allows(phase, action.kind()) => None,
        _ => Some(Violation::WrongPhase),
    }
}

fn phase_allows(phase: Phase, kind: ActionKind) -> bool {
    use ActionKind::*;
    match phase {
        Phase::Setup | Phase::Ended => false,
        Phase::PreRoll => matches!(kind, RollDice | PlayKnight),
        Phase::Main => !matches!(
            kind,
            RollDice | MoveRobber | StealResource | DiscardResources
        ),
        Phase::MovingRobber => kind == MoveRobber,
        Phase::Stealing => kind == StealResource,
        Phase::Discarding => kind == DiscardResources,
    }
}

struct Check<'a> {
    state: &'a GameState,
    player: &'a Player,
}

impl Check<'_> {
    fn action(&self, action: &GameAction) -> Vec<Violation> {
        let mut out = Vec::new();
        let in_setup = self.state.turn.phase == Phase::Setup;
        match action {
            GameAction::RollDice | GameAction::EndTurn => {}
            GameAction::BuildRoad { edge, is_free } => {
                if in_setup {
                    let anchor = self.state.turn.setup.as_ref().and_then(|s| s.last_settlement);
                    self.road_site(*edge, anchor, &mut out);
                } else {
                    if *is_free {
                        out.push(Violation::FreeBuildUnavailable);
                    }
                    self.road_site(*edge, None, &mut out);
                    self.supply(PieceKind::Road, &mut out);
                    self.afford(&COST_ROAD, &mut out);
                }
            }
            GameAction::PlaceRoadBuildingRoad { edge } => {
                if self.state.turn.free_roads == 0 {
                    out.push(Violation::NoFreeRoads);
                }
                self.road_site(*edge, None, &mut out);
                self.supply(PieceKind::Road, &mut out);
            }
            GameAction::BuildSettlement { node, is_free } => {
                if !in_setup && *is_free {
                    out.push(Violation::FreeBuildUnavailable);
                }
                self.settlement_site(*node, !in_setup, &mut out);
                self.supply(PieceKind::Settlement, &mut out);
                if !in_setup {
                    self.afford(&COST_SETTLEMENT, &mut out);
                }
            }
            GameAction::BuildCity { node } => {
                self.city_site(*node, &mut out);
                self.supply(PieceKind::City, &mut out);
                self.afford(&COST_CITY, &mut out);
            }
            GameAction::BuyDevelopmentCard => {
                if self.state.bank.development_deck_len() == 0 {
                    out.push(Violation::DeckEmpty);
                }
                self.afford(&COST_DEVELOPMENT, &mut out);
            }
            GameAction::PlayKnight {
                move_robber_to,
                steal_from,
            } => {
                self.card(DevelopmentCard::Knight, &mut out);
                self.robber_target(*move_robber_to, *steal_from, &mut out);
            }
            GameAction::PlayRoadBuilding => {
                self.card(DevelopmentCard::RoadBuilding, &mut out);
                self.supply(PieceKind::Road, &mut out);
            }
            GameAction::PlayYearOfPlenty { first, second } => {
                self.card(DevelopmentCard::YearOfPlenty, &mut out);
                let mut wanted = ResourceBundle::single(*first, 1);
                wanted.add_resource(*second, 1);
                if !self.state.bank.resources().contains(&wanted) {
                    out.push(Violation::BankInsufficient);
                }
            }
            GameAction::PlayMonopoly { .. } => {
                self.card(DevelopmentCard::Monopoly, &mut out);
            }
            GameAction::MoveRobber { hex } => {
                if !self.robber_hex_ok(*hex) {
                    out.push(Violation::InvalidRobberHex);
                }
            }
            GameAction::StealResource { target } => {
                let victims = self.state.robber_victims(self.state.robber, self.player.id);
                if !victims.contains(target) {
                    out.push(Violation::InvalidStealTarget);
                }
            }
            GameAction::DiscardResources { bundle } => self.discard(bundle, &mut out),
            GameAction::ProposeTrade {
                offering,
                requesting,
                targets,
            } => self.proposal(offering, requesting, targets.as_deref(), &mut out),
            GameAction::AcceptTrade { trade_id } => {
                if let Some(offer) = self.addressed_offer(*trade_id, &mut out) {
                    let proposer_holds = self
                        .state
                        .player(offer.proposer)
                        .is_some_and(|p| p.resources.contains(&offer.offering));
                    if !self.player.resources.contains(&offer.requesting) || !proposer_holds {
                        out.push(Violation::InsufficientResources);
                    }
                }
            }
            GameAction::RejectTrade { trade_id } => {
                self.addressed_offer(*trade_id, &mut out);
            }
            GameAction::CancelTrade { trade_id } => match self.open_offer(*trade_id) {
                None => out.push(Violation::TradeNotFound),
                Some(offer) if offer.proposer != self.player.id => {
                    out.push(Violation::NotTradeProposer)
                }
                Some(_) => {}
            },
            GameAction::MaritimeTrade {
                giving,
                giving_amount,
                receiving,
            } => self.maritime(*giving, *giving_amount, *receiving, &mut out),
        }
        out
    }

    fn afford(&self, cost: &ResourceBundle, out: &mut Vec<Violation>) {
        if !self.player.resources.contains(cost) {
            out.push(Violation::InsufficientResources);
        }
    }

    fn supply(&self, piece: PieceKind, out: &mut Vec<Violation>) {
        if self.player.pieces_left(piece) == 0 {
            out.push(Violation::SupplyExhausted(piece));
        }
    }

    fn road_site(&self, edge: EdgeId, anchor: Option<NodeId>, out: &mut Vec<Violation>) {
        let rule = road_site_rule(self.state, self.player.id, edge, anchor);
        if let Some(rule) = rule {
            out.push(Violation::IllegalPlacement(rule));
        }
    }

    fn settlement_site(&self, node: NodeId, require_road: bool, out: &mut Vec<Violation>) {
        let rule = settlement_site_rule(self.state, self.player.id, node, require_road);
        if let Some(rule) = rule {
            out.push(Violation::IllegalPlacement(rule));
        }
    }

    fn city_site(&self, node: NodeId, out: &mut Vec<Violation>) {
        let rule = if self.state.board.node(node).is_none() {
            Some(PlacementRule::OffBoard)
        } else {
            match self.state.building_at(node) {
                Some(building)
                    if building.owner == self.player.id
                        && building.kind == BuildingKind::Settlement =>
                {
                    None
                }
                _ => Some(PlacementRule::NoSettlementToUpgrade),
            }
        };
        if let Some(rule) = rule {
            out.push(Violation::IllegalPlacement(rule));
        }
    }

    fn card(&self, kind: DevelopmentCard, out: &mut Vec<Violation>) {
        let already = if kind == DevelopmentCard::Knight {
            self.state.turn.knight_played
        } else {
            self.state.turn.dev_card_played
        };
        if already {
            out.push(Violation::CardAlreadyPlayedThisTurn);
        }
        if !self.player.owns_card(kind) {
            out.push(Violation::CardNotOwned);
        } else if !self
            .player
            .has_playable_card(kind, self.state.turn.turn_number)
        {
            out.push(Violation::CardBoughtThisTurn);
        }
    }

    fn robber_hex_ok(&self, hex: HexId) -> bool {
        self.state.board.hex(hex).is_some() && hex != self.state.robber
    }

    fn robber_target(&self, hex: HexId, steal_from: Option<PlayerId>, out: &mut Vec<Violation>) {
        if !self.robber_hex_ok(hex) {
            out.push(Violation::InvalidRobberHex);
            return;
        }
        let victims = self.state.robber_victims(hex, self.player.id);
        let target_ok = match steal_from {
            None => victims.is_empty(),
            Some(target) => victims.contains(&target),
        };
        if !target_ok {
            out.push(Violation::InvalidStealTarget);
        }
    }

    fn discard(&self, bundle: &ResourceBundle, out: &mut Vec<Violation>) {
        let Some(required) = self.state.turn.pending_discards.get(&self.player.id).copied() else {
            out.push(Violation::NoDiscardOwed);
            return;
        };
        if bundle.total() != u32::from(required) {
            out.push(Violation::DiscardAmountMismatch {
                required,
                provided: bundle.total(),
            });
        }
        self.afford(bundle, out);
    }

    fn proposal(
        &self,
        offering: &ResourceBundle,
        requesting: &ResourceBundle,
        targets: Option<&[PlayerId]>,
        out: &mut Vec<Violation>,
    ) {
        let malformed_bundles =
            offering.is_empty() || requesting.is_empty() || offering.overlaps(requesting);
        let malformed_targets = targets.is_some_and(|targets| {
            targets.is_empty()
                || targets.iter().any(|target| {
                    *target == self.player.id || self.state.player(*target).is_none()
                })
        });
        if malformed_bundles || malformed_targets {
            out.push(Violation::InvalidTrade);
        }
        self.afford(offering, out);
    }

    fn open_offer(&self, trade_id: TradeId) -> Option<&TradeOffer> {
        self.state
            .trades
            .get(&trade_id)
            .filter(|offer| offer.is_open())
    }

    fn addressed_offer(&self, trade_id: TradeId, out: &mut Vec<Violation>) -> Option<&TradeOffer> {
        let Some(offer) = self.open_offer(trade_id) else {
            out.push(Violation::TradeNotFound);
            return None;
        };
        if !offer.addresses(self.player.id) {
            out.push(Violation::TradeNotTargetingYou);
            return None;
        }
        Some(offer)
    }

    fn maritime(&self, giving: Resource, amount: u8, receiving: Resource, out: &mut Vec<Violation>) {
        if giving == receiving {
            out.push(Violation::InvalidTrade);
        }
        if self.state.maritime_ratio(self.player.id, giving) != Some(amount) {
            out.push(Violation::PortRatioUnavailable);
        }
        if self.player.resources.get(giving) < amount {
            out.push(Violation::InsufficientResources);
        }
        if self.state.bank.available(receiving) == 0 {
            out.push(Violation::BankInsufficient);
        }
    }
}

/// First rule broken by placing `player`'s road on `edge`. With an `anchor` the road must
/// touch that node; otherwise it must touch the player's network.
pub fn road_site_rule(
    state: &GameState,
    player: PlayerId,
    edge: EdgeId,
    anchor: Option<NodeId>,
) -> Option<PlacementRule> {
    let Some(target) = state.board.edge(edge) else {
        return Some(PlacementRule::OffBoard);
    };
    if state.road_owner(edge).is_some() {
        return Some(PlacementRule::AlreadyOccupied);
    }
    let connected = match anchor {
        Some(node) => target.touches(node),
        None => target.nodes.iter().any(|node| {
            state
                .building_at(*node)
                .is_some_and(|building| building.owner == player)
                || state
                    .board
                    .node_edges(*node)
                    .iter()
                    .any(|other| *other != edge && state.road_owner(*other) == Some(player))
        }),
    };
    if !connected {
        return Some(PlacementRule::NotConnected);
    }
    None
}

/// First rule broken by placing `player`'s settlement on `node`.
pub fn settlement_site_rule(
    state: &GameState,
    player: PlayerId,
    node: NodeId,
    require_road: bool,
) -> Option<PlacementRule> {
    if state.board.node(node).is_none() {
        return Some(PlacementRule::OffBoard);
    }
    if state.building_at(node).is_some() {
        return Some(PlacementRule::AlreadyOccupied);
    }
    if state
        .board
        .neighbors(node)
        .iter()
        .any(|neighbor| state.building_at(*neighbor).is_some())
    {
        return Some(PlacementRule::DistanceRule);
    }
    if require_road
        && !state
            .board
            .node_edges(node)
            .iter()
            .any(|edge| state.road_owner(*edge) == Some(player))
    {
        return Some(PlacementRule::NotConnected);
    }
    None
}
