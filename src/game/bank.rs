use im::Vector;
use serde::{Deserialize, Serialize};

use crate::board::PlayerMode;
use crate::game::resources::{ResourceBundle, ResourceError};
use crate::rng::GameRng;
use crate::types::{DevelopmentCard, Resource};

/// Resource supply and the face-down development deck. The deck is shuffled once at game
/// creation; purchases take the card at the back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bank {
    resources: ResourceBundle,
    development_deck: Vector<DevelopmentCard>,
}

impl Bank {
    pub fn new(mode: PlayerMode, rng: &mut GameRng) -> Self {
        let mut deck = build_development_deck(mode);
        rng.shuffle(&mut deck);
        Self::with_deck(starting_supply(mode), deck)
    }

    /// Bank with an explicit deck order. The last card is drawn first.
    pub fn with_deck(resources: ResourceBundle, deck: Vec<DevelopmentCard>) -> Self {
        Self {
            resources,
            development_deck: deck.into_iter().collect(),
        }
    }

    pub fn resources(&self) -> &ResourceBundle {
        &self.resources
    }

    pub fn receive(&mut self, bundle: &ResourceBundle) {
        self.resources += *bundle;
    }

    pub fn dispense(&mut self, bundle: &ResourceBundle) -> Result<(), ResourceError> {
        self.resources = self.resources.checked_sub(bundle)?;
        Ok(())
    }

    pub fn available(&self, resource: Resource) -> u8 {
        self.resources.get(resource)
    }

    /// The card the next purchase will draw.
    pub fn next_development_card(&self) -> Option<DevelopmentCard> {
        self.development_deck.back().copied()
    }

    pub fn draw_development_card(&mut self) -> Option<DevelopmentCard> {
        self.development_deck.pop_back()
    }

    pub fn development_deck_len(&self) -> usize {
        self.development_deck.len()
    }
}

pub fn starting_supply(mode: PlayerMode) -> ResourceBundle {
    match mode {
        PlayerMode::Standard => ResourceBundle::uniform(19),
        PlayerMode::Extended => ResourceBundle::uniform(24),
    }
}

fn build_development_deck(mode: PlayerMode) -> Vec<DevelopmentCard> {
    use DevelopmentCard::*;
    const STANDARD: &[(DevelopmentCard, usize)] = &[
        (Knight, 14),
        (VictoryPoint, 5),
        (RoadBuilding, 2),
        (YearOfPlenty, 2),
        (Monopoly, 2),
    ];
    const EXTENDED: &[(DevelopmentCard, usize)] = &[
        (Knight, 20),
        (VictoryPoint, 5),
        (RoadBuilding, 3),
        (YearOfPlenty, 3),
        (Monopoly, 3),
    ];

    let distribution = match mode {
        PlayerMode::Standard => STANDARD,
        PlayerMode::Extended => EXTENDED,
    };
    distribution
        .iter()
        .flat_map(|(card, count)| std::iter::repeat(*card).take(*count))
        .collect()
}
