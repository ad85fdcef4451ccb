use farm_core::{AnimalId, ItemCategory, ItemId};
use thiserror::Error;

/// Why a player command was rejected. Every variant is recoverable and
/// leaves the game state untouched.
///
/// Slot indexes are 0-based in the API; messages number fields from 1.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ActionError {
    /// The purchase costs more than the player holds.
    #[error("not enough money: need ${needed}, have ${available}")]
    InsufficientFunds { needed: u64, available: u64 },
    /// The action's energy cost exceeds current energy.
    #[error("not enough energy: need {needed}, have {available}")]
    InsufficientEnergy { needed: u32, available: u32 },
    /// Planting into a field that already holds a crop.
    #[error("field {} is already planted", .0 + 1)]
    SlotOccupied(usize),
    /// Harvesting a field with nothing in it.
    #[error("field {} is empty", .0 + 1)]
    SlotEmpty(usize),
    /// Harvesting a crop whose countdown has not reached zero.
    #[error("{crop} in field {} needs {days_remaining} more day(s)", .slot + 1)]
    SlotNotReady {
        slot: usize,
        crop: ItemId,
        days_remaining: u32,
    },
    /// Buying an animal while the pen is at capacity.
    #[error("the pen is full ({0} animals)")]
    AnimalCapacityReached(usize),
    /// Crafting without enough of one ingredient. Names the first short one.
    #[error("missing ingredients: need {needed} {item}, have {available}")]
    InsufficientIngredients {
        item: ItemId,
        needed: u32,
        available: u32,
    },
    /// Selling an item the inventory holds none of.
    #[error("no {0} left to sell")]
    InsufficientInventory(ItemId),
    /// The crop id is not in the catalog.
    #[error("unknown crop {0}")]
    UnknownCrop(ItemId),
    /// The animal id is not in the catalog.
    #[error("unknown animal {0}")]
    UnknownAnimal(AnimalId),
    /// The recipe id is not in the catalog.
    #[error("unknown recipe {0}")]
    UnknownRecipe(ItemId),
    /// The slot index is past the last field.
    #[error("there is no field {}", .0 + 1)]
    InvalidSlot(usize),
    /// The animal index is past the last owned animal.
    #[error("there is no animal {}", .0 + 1)]
    InvalidAnimal(usize),
    /// The item's recorded kind does not match the requested sale category.
    #[error("{item} has no {category} price")]
    UnknownPrice { item: ItemId, category: ItemCategory },
}
