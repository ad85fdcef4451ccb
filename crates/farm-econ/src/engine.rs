use crate::{
    advance_day_with, ActionError, DayReport, GameState, NotificationKind, Notifications,
    OwnedAnimal, PlantedCrop, FIELD_COUNT, HARVEST_ENERGY_COST, MAX_ANIMALS, REST_ENERGY,
    SUNNY_BONUS_CHANCE,
};
use farm_core::{
    adjusted_energy_cost, AnimalId, Catalog, FarmConfig, ItemCategory, ItemId, ItemKind, Weather,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// One sellable line of the market screen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketEntry {
    pub item: ItemId,
    pub name: String,
    pub category: ItemCategory,
    pub count: u32,
    pub price: u64,
}

/// Held versus required amount of one recipe ingredient.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientStatus {
    pub item: ItemId,
    pub have: u32,
    pub need: u32,
}

/// The economy engine: sole owner of the game state.
pub struct Economy {
    catalog: Arc<Catalog>,
    state: GameState,
    rng: ChaCha8Rng,
    notifications: Notifications,
}

impl Economy {
    pub fn new(catalog: Arc<Catalog>, cfg: &FarmConfig) -> Self {
        Self {
            catalog,
            state: GameState::new(cfg),
            rng: ChaCha8Rng::seed_from_u64(cfg.rng_seed),
            notifications: Notifications::new(
                cfg.notification_capacity,
                cfg.notification_display(),
            ),
        }
    }

    /// Engine over the built-in catalog.
    pub fn with_standard_catalog(cfg: &FarmConfig) -> Self {
        Self::new(Catalog::standard(), cfg)
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn notifications(&self) -> &Notifications {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut Notifications {
        &mut self.notifications
    }

    /// Energy an action with base cost `base` takes under today's weather.
    pub fn energy_cost(&self, base: u32) -> u32 {
        adjusted_energy_cost(
            base,
            self.catalog.weather.energy_multiplier(self.state.weather),
        )
    }

    fn fail<T>(&mut self, err: ActionError) -> Result<T, ActionError> {
        debug!(error = %err, "action rejected");
        self.notifications
            .emit(NotificationKind::Failure, err.to_string());
        Err(err)
    }

    fn succeed(&mut self, message: String) {
        debug!(day = self.state.day, "{message}");
        self.notifications.emit(NotificationKind::Success, message);
    }

    fn check_energy(&self, needed: u32) -> Result<(), ActionError> {
        if self.state.energy < needed {
            return Err(ActionError::InsufficientEnergy {
                needed,
                available: self.state.energy,
            });
        }
        Ok(())
    }

    fn check_funds(&self, needed: u64) -> Result<(), ActionError> {
        if self.state.currency < needed {
            return Err(ActionError::InsufficientFunds {
                needed,
                available: self.state.currency,
            });
        }
        Ok(())
    }

    /// Plant `crop` into an empty field slot.
    pub fn plant_crop(&mut self, crop: &ItemId, slot: usize) -> Result<(), ActionError> {
        match self.validate_plant(crop, slot) {
            Ok((cost, energy)) => {
                let growth_time = self.catalog.crop(crop).map_or(0, |c| c.growth_time);
                self.state.fields[slot] = Some(PlantedCrop {
                    crop: crop.clone(),
                    days_remaining: growth_time,
                    planted_on_day: self.state.day,
                });
                self.state.currency -= cost;
                self.state.energy -= energy;
                let name = self.catalog.item_name(crop).to_string();
                self.succeed(format!("Planted {name} in field {}", slot + 1));
                Ok(())
            }
            Err(e) => self.fail(e),
        }
    }

    fn validate_plant(&self, crop: &ItemId, slot: usize) -> Result<(u64, u32), ActionError> {
        let def = self
            .catalog
            .crop(crop)
            .ok_or_else(|| ActionError::UnknownCrop(crop.clone()))?;
        let field = self
            .state
            .fields
            .get(slot)
            .ok_or(ActionError::InvalidSlot(slot))?;
        if field.is_some() {
            return Err(ActionError::SlotOccupied(slot));
        }
        self.check_funds(def.plant_cost)?;
        let energy = self.energy_cost(def.energy_cost);
        self.check_energy(energy)?;
        Ok((def.plant_cost, energy))
    }

    /// Harvest a ready field. Returns the number of units gathered: two on a
    /// lucky sunny day, otherwise one.
    pub fn harvest_crop(&mut self, slot: usize) -> Result<u32, ActionError> {
        let (crop, energy) = match self.validate_harvest(slot) {
            Ok(v) => v,
            Err(e) => return self.fail(e),
        };
        let units = if self.state.weather == Weather::Sunny && self.rng.gen_bool(SUNNY_BONUS_CHANCE)
        {
            2
        } else {
            1
        };
        self.state.fields[slot] = None;
        self.state.energy -= energy;
        self.state.inventory.add(crop.clone(), ItemKind::Crop, units);
        let name = self.catalog.item_name(&crop).to_string();
        if units > 1 {
            self.succeed(format!("Bumper crop! Harvested {units} {name}"));
        } else {
            self.succeed(format!("Harvested {name}"));
        }
        Ok(units)
    }

    fn validate_harvest(&self, slot: usize) -> Result<(ItemId, u32), ActionError> {
        let field = self
            .state
            .fields
            .get(slot)
            .ok_or(ActionError::InvalidSlot(slot))?;
        let planted = field.as_ref().ok_or(ActionError::SlotEmpty(slot))?;
        if !planted.is_ready() {
            return Err(ActionError::SlotNotReady {
                slot,
                crop: planted.crop.clone(),
                days_remaining: planted.days_remaining,
            });
        }
        let energy = self.energy_cost(HARVEST_ENERGY_COST);
        self.check_energy(energy)?;
        Ok((planted.crop.clone(), energy))
    }

    /// Buy an animal. Returns its index in the pen.
    pub fn buy_animal(&mut self, animal: &AnimalId) -> Result<usize, ActionError> {
        let Some(def) = self.catalog.animal(animal) else {
            return self.fail(ActionError::UnknownAnimal(animal.clone()));
        };
        let (cost, production_time) = (def.purchase_cost, def.production_time);
        let name = def.name.clone();
        if let Err(e) = self.check_funds(cost) {
            return self.fail(e);
        }
        if self.state.animals.len() >= MAX_ANIMALS {
            return self.fail(ActionError::AnimalCapacityReached(MAX_ANIMALS));
        }
        self.state.animals.push(OwnedAnimal {
            animal: animal.clone(),
            purchased_on_day: self.state.day,
            days_until_production: production_time,
        });
        self.state.currency -= cost;
        self.succeed(format!("Bought a {name}"));
        Ok(self.state.animals.len() - 1)
    }

    /// Tend an animal, shortening its production countdown by one day (two
    /// when sunny). Returns the remaining days.
    pub fn care_for_animal(&mut self, index: usize) -> Result<u32, ActionError> {
        let Some(owned) = self.state.animals.get(index) else {
            return self.fail(ActionError::InvalidAnimal(index));
        };
        let Some(def) = self.catalog.animal(&owned.animal) else {
            let unknown = owned.animal.clone();
            return self.fail(ActionError::UnknownAnimal(unknown));
        };
        let name = def.name.clone();
        let energy = self.energy_cost(def.energy_cost);
        if let Err(e) = self.check_energy(energy) {
            return self.fail(e);
        }
        let care = if self.state.weather == Weather::Sunny { 2 } else { 1 };
        let owned = &mut self.state.animals[index];
        owned.days_until_production = owned.days_until_production.saturating_sub(care);
        let remaining = owned.days_until_production;
        self.state.energy -= energy;
        self.succeed(format!("Cared for the {name}"));
        Ok(remaining)
    }

    /// Craft one unit of `recipe`, consuming all its ingredients.
    pub fn craft_item(&mut self, recipe: &ItemId) -> Result<(), ActionError> {
        let Some(def) = self.catalog.recipe(recipe) else {
            return self.fail(ActionError::UnknownRecipe(recipe.clone()));
        };
        let missing = def.ingredients.iter().find_map(|(item, &needed)| {
            let available = self.state.inventory.count(item);
            (available < needed).then(|| ActionError::InsufficientIngredients {
                item: item.clone(),
                needed,
                available,
            })
        });
        let ingredients = def.ingredients.clone();
        let name = def.name.clone();
        // Recipe energy is flat, unlike field and animal work.
        let energy = def.energy_cost;
        if let Some(e) = missing {
            return self.fail(e);
        }
        if let Err(e) = self.check_energy(energy) {
            return self.fail(e);
        }
        for (item, needed) in &ingredients {
            // Counts were checked above, so every removal succeeds.
            self.state.inventory.remove(item, *needed);
        }
        self.state
            .inventory
            .add(recipe.clone(), ItemKind::Crafted, 1);
        self.state.energy -= energy;
        self.succeed(format!("Crafted {name}"));
        Ok(())
    }

    /// Sell one unit of `item`. The price comes from the classification the
    /// item received when it entered the inventory; `category` must agree
    /// with it. Returns the price earned.
    pub fn sell_item(&mut self, item: &ItemId, category: ItemCategory) -> Result<u64, ActionError> {
        match self.validate_sale(item, category) {
            Ok(price) => {
                self.state.inventory.remove(item, 1);
                self.state.currency = self.state.currency.saturating_add(price);
                let name = self.catalog.item_name(item).to_string();
                self.succeed(format!("Sold one {name} for ${price}"));
                Ok(price)
            }
            Err(e) => self.fail(e),
        }
    }

    fn validate_sale(&self, item: &ItemId, category: ItemCategory) -> Result<u64, ActionError> {
        if self.state.inventory.count(item) == 0 {
            return Err(ActionError::InsufficientInventory(item.clone()));
        }
        let unknown = || ActionError::UnknownPrice {
            item: item.clone(),
            category,
        };
        let kind = self.state.inventory.kind(item).ok_or_else(unknown)?;
        if kind.category() != category {
            return Err(unknown());
        }
        self.catalog.sell_price(item, kind).ok_or_else(unknown)
    }

    /// Recover energy. Always succeeds; returns the new energy level.
    pub fn rest(&mut self) -> u32 {
        self.state.restore_energy(REST_ENERGY);
        self.succeed("Rested and recovered energy".to_string());
        self.state.energy
    }

    /// Draw today's weather and advance the simulation by one day.
    pub fn advance_day(&mut self) -> DayReport {
        let weather = self.catalog.weather.draw(&mut self.rng);
        self.advance_day_under(weather)
    }

    /// Advance one day with a fixed weather instead of a random draw.
    pub fn advance_day_under(&mut self, weather: Weather) -> DayReport {
        self.notifications.emit(
            NotificationKind::Weather,
            format!("Day {}: the weather is {weather}", self.state.day + 1),
        );
        let report = advance_day_with(&mut self.state, &self.catalog, weather, &mut self.rng);
        for p in &report.produced {
            let (animal, product) = self
                .catalog
                .animal(&p.animal)
                .map(|a| (a.name.as_str(), a.product_name.as_str()))
                .unwrap_or((p.animal.as_str(), p.item.as_str()));
            let message = format!("The {animal} produced {product}!");
            self.notifications
                .emit(NotificationKind::Production, message);
        }
        info!(
            day = report.day,
            weather = %report.weather,
            grown = report.crops_advanced,
            ready = report.crops_ready.len(),
            produced = report.produced.len(),
            currency = self.state.currency,
            energy = self.state.energy,
            "day advanced"
        );
        report
    }

    /// Every held item that can be sold, with its unit price.
    pub fn market_listing(&self) -> Vec<MarketEntry> {
        self.state
            .inventory
            .held()
            .filter_map(|(item, stack)| {
                let price = self.catalog.sell_price(item, &stack.kind)?;
                Some(MarketEntry {
                    item: item.clone(),
                    name: self.catalog.item_name(item).to_string(),
                    category: stack.kind.category(),
                    count: stack.count,
                    price,
                })
            })
            .collect()
    }

    /// Ingredient readiness for `recipe`, or `None` if it is unknown.
    pub fn recipe_status(&self, recipe: &ItemId) -> Option<Vec<IngredientStatus>> {
        let def = self.catalog.recipe(recipe)?;
        Some(
            def.ingredients
                .iter()
                .map(|(item, &need)| IngredientStatus {
                    item: item.clone(),
                    have: self.state.inventory.count(item),
                    need,
                })
                .collect(),
        )
    }

    /// Whether `recipe` could be crafted right now.
    pub fn can_craft(&self, recipe: &ItemId) -> bool {
        let Some(def) = self.catalog.recipe(recipe) else {
            return false;
        };
        let stocked = def
            .ingredients
            .iter()
            .all(|(item, &need)| self.state.inventory.count(item) >= need);
        stocked && self.state.energy >= def.energy_cost
    }

    /// Indices of empty field slots.
    pub fn empty_slots(&self) -> Vec<usize> {
        (0..FIELD_COUNT)
            .filter(|&i| self.state.fields[i].is_none())
            .collect()
    }

    /// Indices of fields ready to harvest.
    pub fn ready_slots(&self) -> Vec<usize> {
        self.state
            .fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.as_ref().is_some_and(PlantedCrop::is_ready))
            .map(|(i, _)| i)
            .collect()
    }
}
