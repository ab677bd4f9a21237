pub mod action;
pub mod apply;
pub mod awards;
pub mod bank;
pub mod event;
pub mod game;
pub mod legal;
pub mod players;
pub mod reduce;
pub mod resources;
pub mod state;
pub mod validate;

pub use action::GameAction;
pub use apply::{ReplayError, apply_event, apply_events};
pub use bank::Bank;
pub use event::{DomainEvent, Placement, SequencedEvent};
pub use game::{Game, Snapshot, replay};
pub use legal::{legal_actions, pending_actors};
pub use players::{Player, PlayerId};
pub use reduce::{Reduction, process, reduce};
pub use resources::{
    COST_CITY, COST_DEVELOPMENT, COST_ROAD, COST_SETTLEMENT, ResourceBundle, ResourceError,
};
pub use state::{ConfigError, GameConfig, GameState, Phase, SeatedPlayer, TradeId, TradeOffer};
pub use validate::{PlacementRule, Rejection, Violation, validate};
