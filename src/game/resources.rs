use std::fmt;
use std::ops::{Add, AddAssign, Sub};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::types::Resource;

/// Five non-negative card counts, in [`Resource::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceBundle {
    counts: [u8; Resource::ALL.len()],
}

impl Default for ResourceBundle {
    fn default() -> Self {
        Self::zero()
    }
}

impl ResourceBundle {
    pub const fn new(brick: u8, lumber: u8, ore: u8, grain: u8, wool: u8) -> Self {
        Self {
            counts: [brick, lumber, ore, grain, wool],
        }
    }

    pub const fn zero() -> Self {
        Self {
            counts: [0; Resource::ALL.len()],
        }
    }

    pub const fn single(resource: Resource, amount: u8) -> Self {
        let mut counts = [0; Resource::ALL.len()];
        counts[resource.index()] = amount;
        Self { counts }
    }

    pub const fn uniform(amount: u8) -> Self {
        Self {
            counts: [amount; Resource::ALL.len()],
        }
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().map(|&v| v as u32).sum()
    }

    pub fn get(&self, resource: Resource) -> u8 {
        self.counts[resource.index()]
    }

    pub fn set(&mut self, resource: Resource, amount: u8) {
        self.counts[resource.index()] = amount;
    }

    pub fn add_resource(&mut self, resource: Resource, amount: u8) {
        let idx = resource.index();
        self.counts[idx] = self.counts[idx].saturating_add(amount);
    }

    pub fn subtract(&mut self, resource: Resource, amount: u8) -> Result<(), ResourceError> {
        let idx = resource.index();
        if self.counts[idx] < amount {
            return Err(ResourceError::InsufficientResource {
                resource,
                available: self.counts[idx],
                requested: amount,
            });
        }
        self.counts[idx] -= amount;
        Ok(())
    }

    /// Exact subtraction; fails instead of clamping when any count would go negative.
    pub fn checked_sub(&self, other: &ResourceBundle) -> Result<ResourceBundle, ResourceError> {
        let mut result = *self;
        for (resource, amount) in other.iter() {
            result.subtract(resource, amount)?;
        }
        Ok(result)
    }

    /// Superset test: every count in `self` is at least the count in `other`.
    pub fn contains(&self, other: &ResourceBundle) -> bool {
        self.counts
            .iter()
            .zip(other.counts.iter())
            .all(|(have, need)| have >= need)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&value| value == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Resource, u8)> + '_ {
        Resource::ALL.into_iter().zip(self.counts.iter().copied())
    }

    /// One entry per card, in resource order.
    pub fn cards(&self) -> impl Iterator<Item = Resource> + '_ {
        self.iter()
            .flat_map(|(resource, amount)| std::iter::repeat(resource).take(amount as usize))
    }

    /// True when some resource is non-zero in both bundles.
    pub fn overlaps(&self, other: &ResourceBundle) -> bool {
        self.counts
            .iter()
            .zip(other.counts.iter())
            .any(|(a, b)| *a > 0 && *b > 0)
    }
}

impl Add for ResourceBundle {
    type Output = ResourceBundle;

    fn add(self, rhs: ResourceBundle) -> ResourceBundle {
        let mut counts = self.counts;
        for (slot, value) in counts.iter_mut().zip(rhs.counts) {
            *slot = slot.saturating_add(value);
        }
        ResourceBundle { counts }
    }
}

impl AddAssign for ResourceBundle {
    fn add_assign(&mut self, rhs: ResourceBundle) {
        *self = *self + rhs;
    }
}

/// Clamps each count at zero.
impl Sub for ResourceBundle {
    type Output = ResourceBundle;

    fn sub(self, rhs: ResourceBundle) -> ResourceBundle {
        let mut counts = self.counts;
        for (slot, value) in counts.iter_mut().zip(rhs.counts) {
            *slot = slot.saturating_sub(value);
        }
        ResourceBundle { counts }
    }
}

impl fmt::Display for ResourceBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "nothing");
        }
        let parts = self
            .iter()
            .filter(|(_, amount)| *amount > 0)
            .map(|(resource, amount)| format!("{amount}x{resource}"))
            .join(", ");
        write!(f, "{parts}")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResourceError {
    #[error("insufficient {resource}: have {available}, need {requested}")]
    InsufficientResource {
        resource: Resource,
        available: u8,
        requested: u8,
    },
}

pub const COST_ROAD: ResourceBundle = ResourceBundle::new(1, 1, 0, 0, 0);
pub const COST_SETTLEMENT: ResourceBundle = ResourceBundle::new(1, 1, 0, 1, 1);
pub const COST_CITY: ResourceBundle = ResourceBundle::new(0, 0, 3, 2, 0);
pub const COST_DEVELOPMENT: ResourceBundle = ResourceBundle::new(0, 0, 1, 1, 1);
