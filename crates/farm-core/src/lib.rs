#![deny(warnings)]

//! Core catalog models and invariants for the idle farm simulation.
//!
//! This crate defines the immutable lookup tables (crops, animals, recipes,
//! weather) shared by the engine, together with validation helpers that
//! guarantee the invariants the engine relies on.

pub mod config;
pub mod weather;

pub use config::{ClockConfig, ConfigError, FarmConfig, GameSpeed};
pub use weather::{adjusted_energy_cost, progresses, Weather, WeatherDef, WeatherTable};

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Upper bound of the player's energy pool.
pub const MAX_ENERGY: u32 = 100;

/// Identifier in the shared item namespace: crop ids, animal product ids and
/// recipe output ids all live here.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ItemId(pub String);

impl ItemId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identifier of an animal type, e.g. "chicken".
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AnimalId(pub String);

impl AnimalId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AnimalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AnimalId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// A plantable crop.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CropDef {
    /// Crop id; harvested units are stored under the same item id.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Days from planting until ready (> 0).
    pub growth_time: u32,
    /// Seed cost paid when planting.
    pub plant_cost: u64,
    /// Market price per harvested unit.
    pub sell_price: u64,
    /// Base energy spent to plant.
    pub energy_cost: u32,
}

/// A purchasable animal that periodically yields a product.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AnimalDef {
    pub id: AnimalId,
    pub name: String,
    pub purchase_cost: u64,
    /// Days between two products (> 0).
    pub production_time: u32,
    /// Item id of the product.
    pub produces: ItemId,
    pub product_name: String,
    /// Market price per product unit.
    pub sell_price: u64,
    /// Base energy spent per care action.
    pub energy_cost: u32,
}

/// A crafting recipe producing one unit of the item named by `id`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RecipeDef {
    pub id: ItemId,
    pub name: String,
    /// Required quantity (> 0) per ingredient.
    pub ingredients: BTreeMap<ItemId, u32>,
    pub sell_price: u64,
    pub energy_cost: u32,
}

/// Sale category as chosen by the caller of a sell command.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemCategory {
    Crop,
    AnimalProduct,
    RecipeOutput,
}

impl fmt::Display for ItemCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ItemCategory::Crop => "crop",
            ItemCategory::AnimalProduct => "animal product",
            ItemCategory::RecipeOutput => "recipe output",
        };
        f.write_str(s)
    }
}

/// Classification of an item, resolved once from the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ItemKind {
    Crop,
    AnimalProduct { animal: AnimalId },
    Crafted,
}

impl ItemKind {
    pub fn category(&self) -> ItemCategory {
        match self {
            ItemKind::Crop => ItemCategory::Crop,
            ItemKind::AnimalProduct { .. } => ItemCategory::AnimalProduct,
            ItemKind::Crafted => ItemCategory::RecipeOutput,
        }
    }
}

/// Static lookup tables. Entry order is the presentation order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Catalog {
    pub crops: Vec<CropDef>,
    pub animals: Vec<AnimalDef>,
    pub recipes: Vec<RecipeDef>,
    #[serde(default = "WeatherTable::standard")]
    pub weather: WeatherTable,
}

static STANDARD: Lazy<Arc<Catalog>> = Lazy::new(|| Arc::new(Catalog::build_standard()));

impl Catalog {
    /// The built-in catalog, built once per process.
    pub fn standard() -> Arc<Catalog> {
        Arc::clone(&STANDARD)
    }

    /// Parse a catalog from YAML (or JSON, which YAML accepts) and validate it.
    pub fn from_yaml_str(text: &str) -> Result<Catalog, ConfigError> {
        let catalog: Catalog = serde_yaml::from_str(text)?;
        validate_catalog(&catalog)?;
        debug!(
            crops = catalog.crops.len(),
            animals = catalog.animals.len(),
            recipes = catalog.recipes.len(),
            "catalog loaded"
        );
        Ok(catalog)
    }

    /// Read and validate a catalog file.
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Catalog, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }

    /// The catalog named by `cfg`, or the built-in one.
    pub fn for_config(cfg: &FarmConfig) -> Result<Arc<Catalog>, ConfigError> {
        match &cfg.catalog {
            Some(path) => Ok(Arc::new(Self::load(path)?)),
            None => Ok(Self::standard()),
        }
    }

    pub fn crop(&self, id: &ItemId) -> Option<&CropDef> {
        self.crops.iter().find(|c| &c.id == id)
    }

    pub fn animal(&self, id: &AnimalId) -> Option<&AnimalDef> {
        self.animals.iter().find(|a| &a.id == id)
    }

    pub fn recipe(&self, id: &ItemId) -> Option<&RecipeDef> {
        self.recipes.iter().find(|r| &r.id == id)
    }

    /// Reverse lookup from a product id to the animal producing it.
    pub fn animal_by_product(&self, product: &ItemId) -> Option<&AnimalDef> {
        self.animals.iter().find(|a| &a.produces == product)
    }

    /// Resolve which kind of item `id` is. Crops win over products, products
    /// over recipes; `validate_catalog` rejects overlaps anyway.
    pub fn classify(&self, id: &ItemId) -> Option<ItemKind> {
        if self.crop(id).is_some() {
            return Some(ItemKind::Crop);
        }
        if let Some(animal) = self.animal_by_product(id) {
            return Some(ItemKind::AnimalProduct {
                animal: animal.id.clone(),
            });
        }
        if self.recipe(id).is_some() {
            return Some(ItemKind::Crafted);
        }
        None
    }

    /// Market price of an item already classified as `kind`.
    pub fn sell_price(&self, id: &ItemId, kind: &ItemKind) -> Option<u64> {
        match kind {
            ItemKind::Crop => self.crop(id).map(|c| c.sell_price),
            ItemKind::AnimalProduct { animal } => self.animal(animal).map(|a| a.sell_price),
            ItemKind::Crafted => self.recipe(id).map(|r| r.sell_price),
        }
    }

    /// Human readable name for any item in the shared namespace.
    pub fn item_name<'a>(&'a self, id: &'a ItemId) -> &'a str {
        if let Some(c) = self.crop(id) {
            return &c.name;
        }
        if let Some(a) = self.animal_by_product(id) {
            return &a.product_name;
        }
        if let Some(r) = self.recipe(id) {
            return &r.name;
        }
        id.as_str()
    }

    fn build_standard() -> Catalog {
        let crop = |id: &str, name: &str, growth_time, plant_cost, sell_price, energy_cost| CropDef {
            id: ItemId::new(id),
            name: name.to_string(),
            growth_time,
            plant_cost,
            sell_price,
            energy_cost,
        };
        let animal = |id: &str,
                      name: &str,
                      purchase_cost,
                      production_time,
                      product: &str,
                      product_name: &str,
                      sell_price,
                      energy_cost| AnimalDef {
            id: AnimalId::new(id),
            name: name.to_string(),
            purchase_cost,
            production_time,
            produces: ItemId::new(product),
            product_name: product_name.to_string(),
            sell_price,
            energy_cost,
        };
        let recipe = |id: &str, name: &str, ingredient: &str, qty, sell_price, energy_cost| RecipeDef {
            id: ItemId::new(id),
            name: name.to_string(),
            ingredients: BTreeMap::from([(ItemId::new(ingredient), qty)]),
            sell_price,
            energy_cost,
        };
        Catalog {
            crops: vec![
                crop("wheat", "Wheat", 3, 10, 25, 5),
                crop("carrot", "Carrot", 2, 5, 15, 3),
                crop("corn", "Corn", 4, 15, 40, 6),
                crop("tomato", "Tomato", 5, 20, 50, 7),
            ],
            animals: vec![
                animal("chicken", "Chicken", 50, 2, "egg", "Egg", 15, 4),
                animal("cow", "Cow", 200, 3, "milk", "Milk", 50, 8),
                animal("sheep", "Sheep", 150, 4, "wool", "Wool", 40, 6),
            ],
            recipes: vec![
                recipe("bread", "Bread", "wheat", 3, 100, 10),
                recipe("cheese", "Cheese", "milk", 2, 120, 8),
                recipe("yarn", "Yarn", "wool", 3, 150, 12),
                recipe("tomato_soup", "Tomato Soup", "tomato", 4, 200, 15),
            ],
            weather: WeatherTable::standard(),
        }
    }
}

/// Validation errors for catalog invariants.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    /// Ids and names must not be blank.
    #[error("blank id or name")]
    BlankId,
    /// Every id in the item namespace (and every animal id) is unique.
    #[error("duplicate id: {0}")]
    DuplicateId(String),
    /// Growth and production times must be > 0.
    #[error("{0} must have a positive duration")]
    NonPositiveDuration(String),
    /// Recipes need at least one ingredient, each with quantity > 0.
    #[error("recipe {0} has an empty or zero-quantity ingredient list")]
    InvalidIngredients(String),
    /// Ingredient does not resolve to any known item.
    #[error("recipe {recipe} uses unknown ingredient {item}")]
    UnknownIngredient { recipe: String, item: String },
    /// Weather table has no entries.
    #[error("weather table is empty")]
    EmptyWeatherTable,
    /// Same weather listed twice.
    #[error("weather {0} listed more than once")]
    DuplicateWeather(Weather),
    /// Weights must be non-negative and sum to 1.0.
    #[error("weather weights sum to {0}, expected 1.0")]
    WeightSum(f64),
    /// Multipliers must be finite and > 0.
    #[error("invalid multiplier on weather {0}")]
    InvalidMultiplier(Weather),
}

/// Validate the weather distribution and multipliers.
pub fn validate_weather(table: &WeatherTable) -> Result<(), ValidationError> {
    if table.entries.is_empty() {
        return Err(ValidationError::EmptyWeatherTable);
    }
    let mut seen = BTreeSet::new();
    let mut sum = 0.0;
    for w in &table.entries {
        if !seen.insert(w.id) {
            return Err(ValidationError::DuplicateWeather(w.id));
        }
        if !w.weight.is_finite() || w.weight < 0.0 {
            return Err(ValidationError::WeightSum(w.weight));
        }
        sum += w.weight;
        let multipliers_ok = [w.growth_multiplier, w.production_multiplier]
            .iter()
            .all(|m| m.is_finite() && *m > 0.0)
            && w.energy_multiplier > rust_decimal::Decimal::ZERO;
        if !multipliers_ok {
            return Err(ValidationError::InvalidMultiplier(w.id));
        }
    }
    if (sum - 1.0).abs() > 1e-6 {
        return Err(ValidationError::WeightSum(sum));
    }
    Ok(())
}

/// Validate the whole catalog, including cross-references between recipes
/// and the item namespace.
pub fn validate_catalog(catalog: &Catalog) -> Result<(), ValidationError> {
    let mut items: BTreeSet<&ItemId> = BTreeSet::new();
    let mut animals: BTreeSet<&AnimalId> = BTreeSet::new();

    for c in &catalog.crops {
        if c.id.0.trim().is_empty() || c.name.trim().is_empty() {
            return Err(ValidationError::BlankId);
        }
        if c.growth_time == 0 {
            return Err(ValidationError::NonPositiveDuration(c.id.0.clone()));
        }
        if !items.insert(&c.id) {
            return Err(ValidationError::DuplicateId(c.id.0.clone()));
        }
    }
    for a in &catalog.animals {
        if a.id.0.trim().is_empty() || a.produces.0.trim().is_empty() {
            return Err(ValidationError::BlankId);
        }
        if a.production_time == 0 {
            return Err(ValidationError::NonPositiveDuration(a.id.0.clone()));
        }
        if !animals.insert(&a.id) {
            return Err(ValidationError::DuplicateId(a.id.0.clone()));
        }
        if !items.insert(&a.produces) {
            return Err(ValidationError::DuplicateId(a.produces.0.clone()));
        }
    }
    for r in &catalog.recipes {
        if r.id.0.trim().is_empty() || r.name.trim().is_empty() {
            return Err(ValidationError::BlankId);
        }
        if !items.insert(&r.id) {
            return Err(ValidationError::DuplicateId(r.id.0.clone()));
        }
    }
    for r in &catalog.recipes {
        if r.ingredients.is_empty() || r.ingredients.values().any(|q| *q == 0) {
            return Err(ValidationError::InvalidIngredients(r.id.0.clone()));
        }
        for item in r.ingredients.keys() {
            if !items.contains(item) {
                return Err(ValidationError::UnknownIngredient {
                    recipe: r.id.0.clone(),
                    item: item.0.clone(),
                });
            }
        }
    }
    validate_weather(&catalog.weather)
}
