//! A simple scripted player used to exercise the engine headlessly.

use farm_core::{AnimalId, ItemCategory, ItemId};
use farm_econ::{Economy, MAX_ANIMALS};
use std::collections::BTreeSet;
use tracing::debug;

/// Crop planted in each field slot.
const ROTATION: [&str; 6] = ["wheat", "wheat", "tomato", "tomato", "corn", "carrot"];
/// Energy kept in hand before resting.
const ENERGY_FLOOR: u32 = 20;
/// Money kept in hand after buying animals.
const CASH_RESERVE: u64 = 150;

/// Play one day's worth of actions before the clock moves on.
pub fn play_turn(eco: &mut Economy) {
    for slot in eco.ready_slots() {
        let _ = eco.harvest_crop(slot);
    }

    let recipes: Vec<ItemId> = eco.catalog().recipes.iter().map(|r| r.id.clone()).collect();
    for recipe in &recipes {
        while eco.can_craft(recipe) {
            if eco.craft_item(recipe).is_err() {
                break;
            }
        }
    }

    // Keep raw ingredients for crafting, sell everything else.
    let ingredients: BTreeSet<ItemId> = eco
        .catalog()
        .recipes
        .iter()
        .flat_map(|r| r.ingredients.keys().cloned())
        .collect();
    for entry in eco.market_listing() {
        if entry.category != ItemCategory::RecipeOutput && ingredients.contains(&entry.item) {
            continue;
        }
        for _ in 0..entry.count {
            let _ = eco.sell_item(&entry.item, entry.category);
        }
    }

    for index in 0..eco.state().animals.len() {
        if eco.state().animals[index].days_until_production == 0 {
            continue;
        }
        if eco.state().energy <= ENERGY_FLOOR * 2 {
            break;
        }
        let _ = eco.care_for_animal(index);
    }

    if eco.state().animals.len() < MAX_ANIMALS {
        if let Some(animal) = pick_animal(eco) {
            let _ = eco.buy_animal(&animal);
        }
    }

    for slot in eco.empty_slots() {
        if eco.state().energy <= ENERGY_FLOOR {
            eco.rest();
        }
        let _ = eco.plant_crop(&ItemId::new(ROTATION[slot % ROTATION.len()]), slot);
    }

    if eco.state().energy <= ENERGY_FLOOR {
        eco.rest();
    }
    debug!(
        day = eco.state().day,
        currency = eco.state().currency,
        energy = eco.state().energy,
        "turn played"
    );
}

/// The priciest animal affordable while keeping the cash reserve.
fn pick_animal(eco: &Economy) -> Option<AnimalId> {
    let budget = eco.state().currency.saturating_sub(CASH_RESERVE);
    eco.catalog()
        .animals
        .iter()
        .filter(|a| a.purchase_cost <= budget)
        .max_by_key(|a| a.purchase_cost)
        .map(|a| a.id.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use farm_core::{FarmConfig, MAX_ENERGY};
    use farm_econ::FIELD_COUNT;

    #[test]
    fn first_turn_fills_fields_and_pen() {
        let mut eco = Economy::with_standard_catalog(&FarmConfig::default());
        play_turn(&mut eco);
        let state = eco.state();
        assert!(state.fields.iter().all(Option::is_some));
        assert_eq!(state.animals.len(), 1);
        assert_eq!(state.animals[0].animal, AnimalId::new("cow"));
        assert!(state.energy <= MAX_ENERGY);
    }

    #[test]
    fn long_session_keeps_invariants() {
        let mut eco = Economy::with_standard_catalog(&FarmConfig::default());
        for _ in 0..60 {
            play_turn(&mut eco);
            eco.advance_day();
            let state = eco.state();
            assert!(state.energy <= MAX_ENERGY);
            assert!(state.animals.len() <= MAX_ANIMALS);
            assert_eq!(state.fields.len(), FIELD_COUNT);
        }
        assert_eq!(eco.state().day, 61);
        assert!(eco.state().currency > 0);
    }
}
