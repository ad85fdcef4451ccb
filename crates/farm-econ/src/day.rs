use crate::{GameState, OVERNIGHT_ENERGY};
use farm_core::{progresses, AnimalId, Catalog, ItemId, ItemKind, Weather};
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One animal product added to the inventory during a day advance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Production {
    /// Index of the producing animal.
    pub index: usize,
    pub animal: AnimalId,
    pub item: ItemId,
}

/// What happened during one day advance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DayReport {
    /// Day number after the advance.
    pub day: u32,
    pub weather: Weather,
    /// Fields whose countdown moved this day.
    pub crops_advanced: usize,
    /// Fields that became ready this day.
    pub crops_ready: Vec<usize>,
    /// Growing fields held back by the weather.
    pub crops_held: usize,
    pub produced: Vec<Production>,
}

/// Advance `state` by one day under `weather`.
///
/// The weather passed in is the one drawn for this day: it is stored on the
/// state and its multipliers drive this advance's growth and production.
/// Only `rng` introduces randomness, so a seeded rng makes this deterministic.
pub fn advance_day_with<R: Rng + ?Sized>(
    state: &mut GameState,
    catalog: &Catalog,
    weather: Weather,
    rng: &mut R,
) -> DayReport {
    state.weather = weather;
    let (growth, production) = catalog
        .weather
        .get(weather)
        .map_or((1.0, 1.0), |w| (w.growth_multiplier, w.production_multiplier));

    let mut report = DayReport {
        day: state.day,
        weather,
        crops_advanced: 0,
        crops_ready: Vec::new(),
        crops_held: 0,
        produced: Vec::new(),
    };

    for (slot, field) in state.fields.iter_mut().enumerate() {
        let Some(crop) = field.as_mut() else {
            continue;
        };
        if crop.days_remaining == 0 {
            continue;
        }
        if progresses(growth, rng) {
            crop.days_remaining -= 1;
            report.crops_advanced += 1;
            if crop.days_remaining == 0 {
                report.crops_ready.push(slot);
            }
        } else {
            report.crops_held += 1;
        }
    }

    for (index, owned) in state.animals.iter_mut().enumerate() {
        if owned.days_until_production > 0 {
            if progresses(production, rng) {
                owned.days_until_production -= 1;
            }
            continue;
        }
        let Some(def) = catalog.animal(&owned.animal) else {
            warn!(animal = %owned.animal, "animal missing from catalog; skipping production");
            continue;
        };
        state.inventory.add(
            def.produces.clone(),
            ItemKind::AnimalProduct {
                animal: def.id.clone(),
            },
            1,
        );
        owned.days_until_production = def.production_time;
        report.produced.push(Production {
            index,
            animal: def.id.clone(),
            item: def.produces.clone(),
        });
    }

    state.day = state.day.saturating_add(1);
    state.restore_energy(OVERNIGHT_ENERGY);
    report.day = state.day;
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{OwnedAnimal, PlantedCrop};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn wheat_field() -> Option<PlantedCrop> {
        Some(PlantedCrop {
            crop: ItemId::new("wheat"),
            days_remaining: 3,
            planted_on_day: 1,
        })
    }

    #[test]
    fn wheat_ready_on_day_four_in_sun() {
        let catalog = Catalog::standard();
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let mut state = GameState::default();
        state.fields[0] = wheat_field();
        for _ in 0..3 {
            advance_day_with(&mut state, &catalog, Weather::Sunny, &mut rng);
        }
        assert_eq!(state.day, 4);
        assert!(state.fields[0].as_ref().unwrap().is_ready());
    }

    #[test]
    fn ready_crop_stays_at_zero() {
        let catalog = Catalog::standard();
        let mut rng = ChaCha8Rng::seed_from_u64(2);
        let mut state = GameState::default();
        state.fields[2] = wheat_field();
        let mut ready_on = Vec::new();
        for _ in 0..6 {
            let report = advance_day_with(&mut state, &catalog, Weather::Rainy, &mut rng);
            if !report.crops_ready.is_empty() {
                ready_on.push(report.day);
            }
        }
        assert_eq!(ready_on, vec![4]);
        assert_eq!(state.fields[2].as_ref().unwrap().days_remaining, 0);
    }

    #[test]
    fn animal_produces_after_countdown_and_resets() {
        let catalog = Catalog::standard();
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut state = GameState::default();
        state.animals.push(OwnedAnimal {
            animal: AnimalId::new("chicken"),
            purchased_on_day: 1,
            days_until_production: 2,
        });
        let egg = ItemId::new("egg");
        advance_day_with(&mut state, &catalog, Weather::Sunny, &mut rng);
        advance_day_with(&mut state, &catalog, Weather::Sunny, &mut rng);
        assert_eq!(state.animals[0].days_until_production, 0);
        assert_eq!(state.inventory.count(&egg), 0);
        let report = advance_day_with(&mut state, &catalog, Weather::Sunny, &mut rng);
        assert_eq!(report.produced.len(), 1);
        assert_eq!(report.produced[0].item, egg);
        assert_eq!(state.inventory.count(&egg), 1);
        assert_eq!(state.animals[0].days_until_production, 2);
    }

    #[test]
    fn stormy_weather_holds_some_growth() {
        let catalog = Catalog::standard();
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let mut held = 0;
        for _ in 0..200 {
            let mut state = GameState::default();
            state.fields[0] = wheat_field();
            let report = advance_day_with(&mut state, &catalog, Weather::Stormy, &mut rng);
            held += report.crops_held;
            assert!(state.fields[0].as_ref().unwrap().days_remaining >= 2);
        }
        assert!(held > 40 && held < 120, "held {held}");
    }

    #[test]
    fn day_and_energy_roll_over() {
        let catalog = Catalog::standard();
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut state = GameState::default();
        state.energy = 30;
        let report = advance_day_with(&mut state, &catalog, Weather::Drought, &mut rng);
        assert_eq!(report.day, 2);
        assert_eq!(state.weather, Weather::Drought);
        assert_eq!(state.energy, 50);
        state.energy = 95;
        advance_day_with(&mut state, &catalog, Weather::Sunny, &mut rng);
        assert_eq!(state.energy, 100);
    }
}
