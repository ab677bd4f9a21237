use serde::{Deserialize, Serialize};
use tracing::info;

use crate::game::action::GameAction;
use crate::game::apply::{ReplayError, apply_events};
use crate::game::event::SequencedEvent;
use crate::game::players::PlayerId;
use crate::game::reduce::process;
use crate::game::state::{ConfigError, GameConfig, GameState, SeatedPlayer};
use crate::game::validate::Rejection;
use crate::rng::{GameRng, GameRngState};

/// Full checkpoint of a session: state plus the RNG position that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub state: GameState,
    pub rng: GameRngState,
}

/// One authoritative game: current state, its RNG stream and the event log since creation
/// (or since the snapshot it was restored from).
#[derive(Debug, Clone)]
pub struct Game {
    state: GameState,
    rng: GameRng,
    log: Vec<SequencedEvent>,
    log_start: u64,
}

impl Game {
    pub fn new(
        config: GameConfig,
        players: Vec<SeatedPlayer>,
        seed: u64,
    ) -> Result<Self, ConfigError> {
        let mut rng = GameRng::new(seed);
        let state = GameState::new(config, players, &mut rng)?;
        info!(
            game_id = %state.config.game_id,
            seed,
            players = state.players.len(),
            mode = %state.config.player_mode,
            layout = %state.config.layout,
            "game created"
        );
        Ok(Self {
            state,
            rng,
            log: Vec::new(),
            log_start: 0,
        })
    }

    /// Resumes the session a snapshot was taken from.
    pub fn restore(snapshot: Snapshot) -> Self {
        let log_start = snapshot.state.event_index;
        Self {
            state: snapshot.state,
            rng: GameRng::from_state(&snapshot.rng),
            log: Vec::new(),
            log_start,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Validates and applies `action`. On rejection nothing changes.
    pub fn submit(
        &mut self,
        actor: PlayerId,
        action: &GameAction,
    ) -> Result<Vec<SequencedEvent>, Rejection> {
        let reduction = process(&self.state, actor, action, &mut self.rng)?;
        self.state = reduction.state;
        self.log.extend(reduction.events.iter().cloned());
        Ok(reduction.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            state: self.state.clone(),
            rng: self.rng.state(),
        }
    }

    /// Events with index `from` onwards. `None` when `from` predates the retained log.
    pub fn events_since(&self, from: u64) -> Option<&[SequencedEvent]> {
        let offset = from.checked_sub(self.log_start)?;
        let offset = usize::try_from(offset).ok()?;
        Some(self.log.get(offset..).unwrap_or(&[]))
    }

    pub fn event_index(&self) -> u64 {
        self.state.event_index
    }
}

/// Rebuilds the current state from a snapshot and the events that followed it.
pub fn replay<'a>(
    snapshot: &GameState,
    events: impl IntoIterator<Item = &'a SequencedEvent>,
) -> Result<GameState, ReplayError> {
    apply_events(snapshot, events)
}
