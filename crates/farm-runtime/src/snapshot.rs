use farm_core::{ItemCategory, ItemId, Weather};
use farm_econ::{Economy, Notification, OwnedAnimal, PlantedCrop};
use serde::{Deserialize, Serialize};

/// One held inventory entry as shown to the player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryLine {
    pub item: ItemId,
    pub name: String,
    pub category: ItemCategory,
    pub count: u32,
}

/// Read-only view of everything a presentation layer renders.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub day: u32,
    pub currency: u64,
    pub energy: u32,
    pub weather: Weather,
    pub fields: Vec<Option<PlantedCrop>>,
    pub animals: Vec<OwnedAnimal>,
    pub inventory: Vec<InventoryLine>,
    pub notification: Option<Notification>,
}

impl Snapshot {
    pub fn capture(eco: &Economy) -> Self {
        let state = eco.state();
        let catalog = eco.catalog();
        Self {
            day: state.day,
            currency: state.currency,
            energy: state.energy,
            weather: state.weather,
            fields: state.fields.to_vec(),
            animals: state.animals.clone(),
            inventory: state
                .inventory
                .held()
                .map(|(item, stack)| InventoryLine {
                    item: item.clone(),
                    name: catalog.item_name(item).to_string(),
                    category: stack.kind.category(),
                    count: stack.count,
                })
                .collect(),
            notification: eco.notifications().current().cloned(),
        }
    }
}
