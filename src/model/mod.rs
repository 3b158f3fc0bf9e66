//! Record types for a recipe collection.

mod recipe;

pub use recipe::{Ingredient, Recipe};
