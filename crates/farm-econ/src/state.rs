use crate::FIELD_COUNT;
use farm_core::{AnimalId, FarmConfig, ItemId, ItemKind, Weather, MAX_ENERGY};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A crop growing in a field slot.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlantedCrop {
    pub crop: ItemId,
    /// Days until harvestable; 0 means ready.
    pub days_remaining: u32,
    pub planted_on_day: u32,
}

impl PlantedCrop {
    pub fn is_ready(&self) -> bool {
        self.days_remaining == 0
    }
}

/// An animal owned by the player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedAnimal {
    pub animal: AnimalId,
    pub purchased_on_day: u32,
    /// Days until the next product; 0 means it produces on the next advance.
    pub days_until_production: u32,
}

/// Count of one item together with its classification.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    pub kind: ItemKind,
    pub count: u32,
}

/// Item counts keyed by id. The kind of each entry is fixed when the entry
/// is first created, so sales never re-derive it.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Inventory {
    items: BTreeMap<ItemId, Stack>,
}

impl Inventory {
    pub fn count(&self, id: &ItemId) -> u32 {
        self.items.get(id).map_or(0, |s| s.count)
    }

    pub fn kind(&self, id: &ItemId) -> Option<&ItemKind> {
        self.items.get(id).map(|s| &s.kind)
    }

    pub fn add(&mut self, id: ItemId, kind: ItemKind, amount: u32) {
        let stack = self.items.entry(id).or_insert(Stack { kind, count: 0 });
        stack.count = stack.count.saturating_add(amount);
    }

    /// Take `amount` units; returns false and leaves the entry untouched if
    /// fewer are held.
    pub fn remove(&mut self, id: &ItemId, amount: u32) -> bool {
        match self.items.get_mut(id) {
            Some(stack) if stack.count >= amount => {
                stack.count -= amount;
                true
            }
            _ => false,
        }
    }

    /// All entries, including exhausted ones.
    pub fn iter(&self) -> impl Iterator<Item = (&ItemId, &Stack)> {
        self.items.iter()
    }

    /// Entries with a positive count.
    pub fn held(&self) -> impl Iterator<Item = (&ItemId, &Stack)> {
        self.items.iter().filter(|(_, s)| s.count > 0)
    }

    pub fn total_units(&self) -> u64 {
        self.items.values().map(|s| u64::from(s.count)).sum()
    }
}

/// All mutable state of one play session.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub day: u32,
    pub currency: u64,
    /// Always within [0, MAX_ENERGY].
    pub energy: u32,
    pub weather: Weather,
    pub fields: [Option<PlantedCrop>; FIELD_COUNT],
    pub animals: Vec<OwnedAnimal>,
    pub inventory: Inventory,
}

impl GameState {
    pub fn new(cfg: &FarmConfig) -> Self {
        Self {
            day: 1,
            currency: cfg.starting_currency,
            energy: cfg.starting_energy.min(MAX_ENERGY),
            weather: cfg.starting_weather,
            fields: Default::default(),
            animals: Vec::new(),
            inventory: Inventory::default(),
        }
    }

    pub fn restore_energy(&mut self, amount: u32) {
        self.energy = self.energy.saturating_add(amount).min(MAX_ENERGY);
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(&FarmConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_defaults() {
        let s = GameState::default();
        assert_eq!(s.day, 1);
        assert_eq!(s.currency, 1000);
        assert_eq!(s.energy, 100);
        assert_eq!(s.weather, Weather::Sunny);
        assert_eq!(s.fields.len(), FIELD_COUNT);
        assert!(s.fields.iter().all(Option::is_none));
        assert!(s.animals.is_empty());
    }

    #[test]
    fn inventory_never_goes_negative() {
        let mut inv = Inventory::default();
        let wheat = ItemId::new("wheat");
        inv.add(wheat.clone(), ItemKind::Crop, 2);
        assert!(!inv.remove(&wheat, 3));
        assert_eq!(inv.count(&wheat), 2);
        assert!(inv.remove(&wheat, 2));
        assert_eq!(inv.count(&wheat), 0);
        assert!(!inv.remove(&wheat, 1));
        assert_eq!(inv.held().count(), 0);
        assert_eq!(inv.kind(&wheat), Some(&ItemKind::Crop));
    }

    #[test]
    fn first_kind_sticks() {
        let mut inv = Inventory::default();
        let egg = ItemId::new("egg");
        let hen = ItemKind::AnimalProduct {
            animal: AnimalId::new("chicken"),
        };
        inv.add(egg.clone(), hen.clone(), 1);
        inv.add(egg.clone(), ItemKind::Crafted, 1);
        assert_eq!(inv.kind(&egg), Some(&hen));
        assert_eq!(inv.count(&egg), 2);
    }

    #[test]
    fn state_json_roundtrip() {
        let mut s = GameState::default();
        s.fields[3] = Some(PlantedCrop {
            crop: ItemId::new("corn"),
            days_remaining: 2,
            planted_on_day: 1,
        });
        s.inventory.add(ItemId::new("bread"), ItemKind::Crafted, 1);
        let text = serde_json::to_string(&s).unwrap();
        let back: GameState = serde_json::from_str(&text).unwrap();
        assert_eq!(back, s);
    }

    #[test]
    fn energy_restore_caps() {
        let mut s = GameState::default();
        s.energy = 90;
        s.restore_energy(50);
        assert_eq!(s.energy, MAX_ENERGY);
    }
}
