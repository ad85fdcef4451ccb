#![deny(warnings)]

//! Economy engine for the idle farm simulation.
//!
//! Owns the mutable game state and implements every player command plus
//! day advancement. Commands validate all preconditions before touching
//! state, so a failed command never leaves a partial mutation behind; the
//! failure is returned and also pushed onto the notification channel.

mod day;
mod engine;
mod error;
mod notify;
mod state;

pub use day::{advance_day_with, DayReport, Production};
pub use engine::{Economy, IngredientStatus, MarketEntry};
pub use error::ActionError;
pub use notify::{Notification, NotificationKind, Notifications};
pub use state::{GameState, Inventory, OwnedAnimal, PlantedCrop, Stack};

/// Number of field slots.
pub const FIELD_COUNT: usize = 6;
/// Maximum number of owned animals.
pub const MAX_ANIMALS: usize = 5;
/// Base energy cost of harvesting one field.
pub const HARVEST_ENERGY_COST: u32 = 5;
/// Chance of a double harvest on a sunny day.
pub const SUNNY_BONUS_CHANCE: f64 = 0.3;
/// Energy restored by resting.
pub const REST_ENERGY: u32 = 50;
/// Energy restored overnight by each day advance.
pub const OVERNIGHT_ENERGY: u32 = 20;
