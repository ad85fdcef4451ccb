#![deny(warnings)]

//! Runtime for the farm simulation: a serialized handle around the economy
//! engine, the read-only snapshot consumed by presentation layers, and the
//! clock driver that advances days on a timer.

mod clock;
mod snapshot;

pub use clock::{ClockDriver, ClockError};
pub use snapshot::{InventoryLine, Snapshot};

use farm_core::{AnimalId, Catalog, ConfigError, FarmConfig, ItemCategory, ItemId};
use farm_econ::{ActionError, DayReport, Economy, Notification};
use std::sync::{Arc, Mutex, PoisonError};

/// Shared, mutex-guarded economy. Every command runs to completion under the
/// lock, so commands from the UI and day advances from the clock never
/// interleave.
#[derive(Clone)]
pub struct SharedEconomy {
    inner: Arc<Mutex<Economy>>,
}

impl SharedEconomy {
    pub fn new(economy: Economy) -> Self {
        Self {
            inner: Arc::new(Mutex::new(economy)),
        }
    }

    /// Build a fresh session from configuration, loading a custom catalog
    /// when one is configured.
    pub fn from_config(cfg: &FarmConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let catalog = Catalog::for_config(cfg)?;
        Ok(Self::new(Economy::new(catalog, cfg)))
    }

    /// Run `f` with exclusive access to the engine.
    pub fn with<R>(&self, f: impl FnOnce(&mut Economy) -> R) -> R {
        // Commands never panic halfway through a mutation, so a poisoned
        // lock still guards consistent state.
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut *guard)
    }

    pub fn snapshot(&self) -> Snapshot {
        self.with(|eco| Snapshot::capture(eco))
    }

    pub fn plant_crop(&self, crop: &str, slot: usize) -> Result<(), ActionError> {
        self.with(|eco| eco.plant_crop(&ItemId::new(crop), slot))
    }

    pub fn harvest_crop(&self, slot: usize) -> Result<u32, ActionError> {
        self.with(|eco| eco.harvest_crop(slot))
    }

    pub fn buy_animal(&self, animal: &str) -> Result<usize, ActionError> {
        self.with(|eco| eco.buy_animal(&AnimalId::new(animal)))
    }

    pub fn care_for_animal(&self, index: usize) -> Result<u32, ActionError> {
        self.with(|eco| eco.care_for_animal(index))
    }

    pub fn craft_item(&self, recipe: &str) -> Result<(), ActionError> {
        self.with(|eco| eco.craft_item(&ItemId::new(recipe)))
    }

    pub fn sell_item(&self, item: &str, category: ItemCategory) -> Result<u64, ActionError> {
        self.with(|eco| eco.sell_item(&ItemId::new(item), category))
    }

    pub fn rest(&self) -> u32 {
        self.with(Economy::rest)
    }

    pub fn advance_day(&self) -> DayReport {
        self.with(Economy::advance_day)
    }

    /// Retire the notification currently on display.
    pub fn dismiss_notification(&self) -> Option<Notification> {
        self.with(|eco| eco.notifications_mut().dismiss())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_core::Weather;

    fn shared() -> SharedEconomy {
        SharedEconomy::from_config(&FarmConfig::default()).unwrap()
    }

    #[test]
    fn commands_take_primitive_ids() {
        let eco = shared();
        eco.plant_crop("wheat", 0).unwrap();
        eco.buy_animal("chicken").unwrap();
        let snap = eco.snapshot();
        assert_eq!(snap.day, 1);
        assert_eq!(snap.currency, 940);
        assert_eq!(snap.energy, 95);
        assert_eq!(snap.weather, Weather::Sunny);
        assert_eq!(snap.fields[0].as_ref().unwrap().days_remaining, 3);
        assert_eq!(snap.animals.len(), 1);
        assert_eq!(snap.notification.unwrap().message, "Planted Wheat in field 1");
    }

    #[test]
    fn failures_surface_as_notifications() {
        let eco = shared();
        assert_eq!(
            eco.sell_item("wheat", ItemCategory::Crop),
            Err(ActionError::InsufficientInventory("wheat".into()))
        );
        let note = eco.dismiss_notification().unwrap();
        assert_eq!(note.message, "no wheat left to sell");
        assert!(eco.snapshot().notification.is_none());
    }

    #[test]
    fn missing_catalog_file_is_a_config_error() {
        let cfg = FarmConfig {
            catalog: Some("/nonexistent/catalog.yaml".into()),
            ..FarmConfig::default()
        };
        assert!(matches!(
            SharedEconomy::from_config(&cfg),
            Err(ConfigError::Io(_))
        ));
    }

    #[test]
    fn handles_share_one_engine() {
        let a = shared();
        let b = a.clone();
        a.advance_day();
        b.advance_day();
        assert_eq!(a.snapshot().day, 3);
        assert_eq!(a.rest(), 100);
    }
}
