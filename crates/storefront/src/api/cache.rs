//! Cache types for delivery reference data.

use jhytermax_core::StateId;

use super::types::{Location, State};

/// Cache key for states and locations.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
pub enum CacheKey {
    States,
    Locations { state_id: Option<StateId> },
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    States(Vec<State>),
    Locations(Vec<Location>),
}
