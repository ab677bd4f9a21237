use std::fmt;
use std::sync::Arc;

use im::{OrdMap, Vector};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::board::{Board, EdgeId, HexId, LayoutMode, NodeId, PlayerMode};
use crate::game::bank::Bank;
use crate::game::players::{Player, PlayerId};
use crate::game::resources::ResourceBundle;
use crate::rng::GameRng;
use crate::types::{Color, Resource};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameConfig {
    pub game_id: Uuid,
    pub player_mode: PlayerMode,
    pub layout: LayoutMode,
    pub vps_to_win: u8,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            game_id: Uuid::new_v4(),
            player_mode: PlayerMode::Standard,
            layout: LayoutMode::Random,
            vps_to_win: 10,
        }
    }
}

/// A player as seated by the lobby, before the game starts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatedPlayer {
    pub id: PlayerId,
    pub name: String,
    pub color: Color,
}

impl SeatedPlayer {
    pub fn new(id: PlayerId, name: impl Into<String>, color: Color) -> Self {
        Self {
            id,
            name: name.into(),
            color,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("{mode} games seat {min}-{max} players, got {count}")]
    UnsupportedSeatCount {
        mode: PlayerMode,
        count: usize,
        min: usize,
        max: usize,
    },
    #[error("player {0} seated twice")]
    DuplicatePlayer(PlayerId),
    #[error("color {0} taken by more than one player")]
    DuplicateColor(Color),
    #[error("victory target must be positive")]
    InvalidVictoryTarget,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    Setup,
    PreRoll,
    Main,
    MovingRobber,
    Stealing,
    Discarding,
    Ended,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Setup => "setup",
            Phase::PreRoll => "preRoll",
            Phase::Main => "main",
            Phase::MovingRobber => "movingRobber",
            Phase::Stealing => "stealing",
            Phase::Discarding => "discarding",
            Phase::Ended => "ended",
        };
        write!(f, "{label}")
    }
}

/// Snake-order placement cursor: round 0 runs forward through the seats, round 1 backward.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetupProgress {
    pub round: u8,
    pub player_index: u8,
    pub forward: bool,
    pub needs_road: bool,
    /// Settlement placed this setup turn; the road must touch it.
    pub last_settlement: Option<NodeId>,
}

impl SetupProgress {
    pub fn start() -> Self {
        Self {
            round: 0,
            player_index: 0,
            forward: true,
            needs_road: false,
            last_settlement: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnState {
    pub phase: Phase,
    pub active: PlayerId,
    pub turn_number: u32,
    pub last_roll: Option<(u8, u8)>,
    pub setup: Option<SetupProgress>,
    /// Players still owing a discard and how many cards each owes.
    pub pending_discards: OrdMap<PlayerId, u8>,
    /// Roads left to place from a Road Building card.
    pub free_roads: u8,
    /// A non-knight development card was played this turn.
    pub dev_card_played: bool,
    pub knight_played: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BuildingKind {
    Settlement,
    City,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Building {
    pub owner: PlayerId,
    pub kind: BuildingKind,
}

impl Building {
    pub fn yield_multiplier(&self) -> u8 {
        match self.kind {
            BuildingKind::Settlement => 1,
            BuildingKind::City => 2,
        }
    }
}

/// Board occupancy. Node and edge maps are the authority; player sets mirror them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Buildings {
    pub nodes: OrdMap<NodeId, Building>,
    pub roads: OrdMap<EdgeId, PlayerId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Awards {
    /// Holder and the length that won or last extended the title.
    pub longest_road: Option<(PlayerId, u8)>,
    pub largest_army: Option<(PlayerId, u8)>,
}

impl Awards {
    pub fn bonus_points(&self, player: PlayerId) -> u8 {
        let road = matches!(self.longest_road, Some((holder, _)) if holder == player);
        let army = matches!(self.largest_army, Some((holder, _)) if holder == player);
        2 * road as u8 + 2 * army as u8
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TradeId(pub u32);

impl fmt::Display for TradeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trade#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TradeStatus {
    Open,
    Accepted,
    Rejected,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOffer {
    pub id: TradeId,
    pub proposer: PlayerId,
    pub offering: ResourceBundle,
    pub requesting: ResourceBundle,
    pub targets: Option<Vec<PlayerId>>,
    pub status: TradeStatus,
}

impl TradeOffer {
    pub fn is_open(&self) -> bool {
        self.status == TradeStatus::Open
    }

    /// `player` may accept or reject this offer.
    pub fn addresses(&self, player: PlayerId) -> bool {
        player != self.proposer
            && self
                .targets
                .as_ref()
                .is_none_or(|targets| targets.contains(&player))
    }
}

/// The full game aggregate. Every reduction produces a new value; collections are persistent
/// so clones share structure with their predecessor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub config: GameConfig,
    pub board: Arc<Board>,
    /// In seat order.
    pub players: Vector<Player>,
    pub buildings: Buildings,
    pub turn: TurnState,
    pub awards: Awards,
    pub trades: OrdMap<TradeId, TradeOffer>,
    pub next_trade_id: u32,
    pub robber: HexId,
    pub bank: Bank,
    pub winner: Option<PlayerId>,
    /// Index the next event will carry.
    pub event_index: u64,
}

impl GameState {
    /// Seats the players, generates the board and shuffles the development deck.
    pub fn new(
        config: GameConfig,
        seated: Vec<SeatedPlayer>,
        rng: &mut GameRng,
    ) -> Result<Self, ConfigError> {
        let seats = config.player_mode.seats();
        if !seats.contains(&seated.len()) {
            return Err(ConfigError::UnsupportedSeatCount {
                mode: config.player_mode,
                count: seated.len(),
                min: *seats.start(),
                max: *seats.end(),
            });
        }
        if config.vps_to_win == 0 {
            return Err(ConfigError::InvalidVictoryTarget);
        }
        for (idx, seat) in seated.iter().enumerate() {
            if seated[..idx].iter().any(|other| other.id == seat.id) {
                return Err(ConfigError::DuplicatePlayer(seat.id));
            }
            if seated[..idx].iter().any(|other| other.color == seat.color) {
                return Err(ConfigError::DuplicateColor(seat.color));
            }
        }

        let board = Board::generate(config.player_mode, config.layout, rng);
        let bank = Bank::new(config.player_mode, rng);
        let robber = board.desert().unwrap_or(HexId(0));
        let first = seated[0].id;
        let players = seated
            .into_iter()
            .map(|seat| Player::new(seat.id, seat.name, seat.color))
            .collect();

        Ok(Self {
            config,
            board: Arc::new(board),
            players,
            buildings: Buildings::default(),
            turn: TurnState {
                phase: Phase::Setup,
                active: first,
                turn_number: 0,
                last_roll: None,
                setup: Some(SetupProgress::start()),
                pending_discards: OrdMap::new(),
                free_roads: 0,
                dev_card_played: false,
                knight_played: false,
            },
            awards: Awards::default(),
            trades: OrdMap::new(),
            next_trade_id: 0,
            robber,
            bank,
            winner: None,
            event_index: 0,
        })
    }

    pub fn phase(&self) -> Phase {
        self.turn.phase
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|player| player.id == id)
    }

    pub fn player_mut(&mut self, id: PlayerId) -> Option<&mut Player> {
        self.players.iter_mut().find(|player| player.id == id)
    }

    pub fn seat_of(&self, id: PlayerId) -> Option<usize> {
        self.players.iter().position(|player| player.id == id)
    }

    pub fn player_ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().map(|player| player.id)
    }

    /// The seat after `id`, wrapping around the table.
    pub fn next_player(&self, id: PlayerId) -> PlayerId {
        let seat = self.seat_of(id).unwrap_or(0);
        let next = (seat + 1) % self.players.len().max(1);
        self.players.get(next).map_or(id, |player| player.id)
    }

    pub fn building_at(&self, node: NodeId) -> Option<Building> {
        self.buildings.nodes.get(&node).copied()
    }

    pub fn road_owner(&self, edge: EdgeId) -> Option<PlayerId> {
        self.buildings.roads.get(&edge).copied()
    }

    pub fn victory_points(&self, id: PlayerId) -> u8 {
        self.player(id).map_or(0, |player| {
            player.building_points() + player.victory_point_cards() + self.awards.bonus_points(id)
        })
    }

    /// Points everyone can see: hidden victory-point cards excluded.
    pub fn public_victory_points(&self, id: PlayerId) -> u8 {
        self.player(id).map_or(0, |player| {
            player.building_points() + self.awards.bonus_points(id)
        })
    }

    /// Opponents of `thief` with a building on `hex` and at least one card, in seat order.
    pub fn robber_victims(&self, hex: HexId, thief: PlayerId) -> Vec<PlayerId> {
        let owners: Vec<PlayerId> = self
            .board
            .hex_nodes(hex)
            .iter()
            .filter_map(|node| self.building_at(*node))
            .map(|building| building.owner)
            .collect();
        self.players
            .iter()
            .filter(|player| player.id != thief)
            .filter(|player| owners.contains(&player.id))
            .filter(|player| player.resources.total() > 0)
            .map(|player| player.id)
            .collect()
    }

    /// Phase to resume once robber handling finishes: main after a roll, otherwise pre-roll
    /// (a knight played before rolling).
    pub fn resume_phase(&self) -> Phase {
        if self.turn.last_roll.is_some() {
            Phase::Main
        } else {
            Phase::PreRoll
        }
    }

    /// Bank ratio `id` trades `resource` at: the best port among their buildings, else 4.
    pub fn maritime_ratio(&self, id: PlayerId, resource: Resource) -> Option<u8> {
        let player = self.player(id)?;
        Some(self.board.port_ratio(player.buildings(), resource))
    }

    pub fn open_trades(&self) -> impl Iterator<Item = &TradeOffer> + '_ {
        self.trades.values().filter(|offer| offer.is_open())
    }

    /// Resources held by players and bank together.
    pub fn total_resources(&self) -> ResourceBundle {
        self.players
            .iter()
            .fold(*self.bank.resources(), |acc, player| acc + player.resources)
    }

    pub fn is_over(&self) -> bool {
        self.turn.phase == Phase::Ended || self.winner.is_some()
    }
}
