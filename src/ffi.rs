//! UniFFI bindings for cross-platform support (iOS, Android).
//!
//! This module provides FFI-safe types and functions for use with UniFFI.
//! The repository is wrapped in a mutex so it can be shared with the host
//! as a reference-counted object.

use crate::codec::{self, CodecError};
use crate::model::{Ingredient, Recipe};
use crate::repository::{RecipeRepository, RepositoryError, RepositoryEvent};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// FFI-safe error type that wraps all possible errors.
#[derive(Debug, uniffi::Error, thiserror::Error)]
pub enum RecipeBoxError {
    #[error("IO error: {message}")]
    IoError { message: String },

    #[error("Malformed recipe file: {message}")]
    MalformedFormat { message: String },

    #[error("Index out of range: {message}")]
    IndexOutOfRange { message: String },

    #[error("Recipe not found: {message}")]
    NotFound { message: String },

    #[error("Serialization error: {message}")]
    SerializationError { message: String },
}

impl From<RepositoryError> for RecipeBoxError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::Io(e) => RecipeBoxError::IoError {
                message: e.to_string(),
            },
            RepositoryError::Format(e) => e.into(),
            e @ RepositoryError::IndexOutOfRange { .. } => RecipeBoxError::IndexOutOfRange {
                message: e.to_string(),
            },
            RepositoryError::NotFound(name) => RecipeBoxError::NotFound { message: name },
        }
    }
}

impl From<CodecError> for RecipeBoxError {
    fn from(e: CodecError) -> Self {
        RecipeBoxError::MalformedFormat {
            message: e.to_string(),
        }
    }
}

/// FFI-safe representation of an ingredient.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiIngredient {
    pub amount: String,
    pub measure: String,
    pub name: String,
}

/// FFI-safe representation of a recipe.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiRecipe {
    pub name: String,
    pub ingredients: Vec<FfiIngredient>,
    pub instructions: Vec<String>,
}

impl From<&Recipe> for FfiRecipe {
    fn from(r: &Recipe) -> Self {
        FfiRecipe {
            name: r.name().to_string(),
            ingredients: r
                .ingredients()
                .iter()
                .map(|i| FfiIngredient {
                    amount: i.amount.clone(),
                    measure: i.measure.clone(),
                    name: i.name.clone(),
                })
                .collect(),
            instructions: r.instructions().to_vec(),
        }
    }
}

impl From<FfiRecipe> for Recipe {
    fn from(r: FfiRecipe) -> Self {
        let mut recipe = Recipe::new(r.name);
        for i in r.ingredients {
            recipe.add_ingredient(Ingredient::new(i.amount, i.measure, i.name));
        }
        for line in r.instructions {
            recipe.add_instruction_line(line);
        }
        recipe
    }
}

/// FFI-safe representation of a repository change.
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum FfiRepositoryEvent {
    Loaded { count: u32 },
    Saved { count: u32 },
    Added { name: String },
    Deleted { name: String },
}

impl From<&RepositoryEvent> for FfiRepositoryEvent {
    fn from(e: &RepositoryEvent) -> Self {
        match e {
            RepositoryEvent::Loaded { count } => FfiRepositoryEvent::Loaded {
                count: saturating_u32(*count),
            },
            RepositoryEvent::Saved { count } => FfiRepositoryEvent::Saved {
                count: saturating_u32(*count),
            },
            RepositoryEvent::Added { name } => FfiRepositoryEvent::Added { name: name.clone() },
            RepositoryEvent::Deleted { name } => FfiRepositoryEvent::Deleted { name: name.clone() },
        }
    }
}

/// Listener implemented by the host to refresh its views.
#[uniffi::export(callback_interface)]
pub trait RecipeBoxListener: Send + Sync {
    fn on_change(&self, event: FfiRepositoryEvent);
}

/// FFI-safe handle to a recipe repository bound to one file.
///
/// Events raised while the repository is locked are queued and delivered
/// to host listeners after the lock is released, so a listener may call
/// back into the repository from `on_change`.
#[derive(uniffi::Object)]
pub struct FfiRecipeRepository {
    inner: Mutex<RecipeRepository>,
    pending: Arc<Mutex<Vec<RepositoryEvent>>>,
    listeners: Mutex<Vec<(u64, Arc<dyn RecipeBoxListener>)>>,
    next_listener_id: AtomicU64,
}

#[uniffi::export]
impl FfiRecipeRepository {
    /// Creates an empty repository bound to `path`.
    #[uniffi::constructor]
    pub fn new(path: String) -> Arc<Self> {
        let pending = Arc::new(Mutex::new(Vec::new()));
        let queue = Arc::clone(&pending);

        let mut repository = RecipeRepository::new(path);
        repository.subscribe(move |event| lock_or_recover(&queue).push(event.clone()));

        Arc::new(FfiRecipeRepository {
            inner: Mutex::new(repository),
            pending,
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(0),
        })
    }

    /// Returns the bound file path.
    pub fn path(&self) -> String {
        self.lock().path().to_string()
    }

    /// Returns all recipes in collection order.
    pub fn get_all(&self) -> Vec<FfiRecipe> {
        self.lock().get_all().iter().map(FfiRecipe::from).collect()
    }

    /// Returns the recipe at `index`.
    pub fn get_at(&self, index: u32) -> Result<FfiRecipe, RecipeBoxError> {
        let recipe = self.lock().get_at(index as usize)?;
        Ok(FfiRecipe::from(&recipe))
    }

    /// Returns the number of recipes in the collection.
    pub fn count(&self) -> u32 {
        saturating_u32(self.lock().len())
    }

    pub fn is_modified(&self) -> bool {
        self.lock().is_modified()
    }

    /// Appends a recipe to the collection.
    pub fn add(&self, recipe: FfiRecipe) {
        self.mutate(|repository| repository.add(recipe.into()));
    }

    /// Deletes the stored recipe equal to `recipe`.
    pub fn delete(&self, recipe: FfiRecipe) -> Result<(), RecipeBoxError> {
        Ok(self.mutate(|repository| repository.delete(&recipe.into()))?)
    }

    /// Deletes the recipe at `index`.
    pub fn delete_at(&self, index: u32) -> Result<(), RecipeBoxError> {
        Ok(self.mutate(|repository| repository.delete_at(index as usize))?)
    }

    /// Replaces the collection with the content of the bound file.
    pub fn load(&self) -> Result<(), RecipeBoxError> {
        Ok(self.mutate(RecipeRepository::load)?)
    }

    /// Writes the collection to the bound file.
    pub fn save(&self) -> Result<(), RecipeBoxError> {
        Ok(self.mutate(RecipeRepository::save)?)
    }

    /// Returns the recipes matching `query`, best match first.
    pub fn search(&self, query: String) -> Vec<FfiRecipe> {
        self.lock()
            .search(&query)
            .iter()
            .map(FfiRecipe::from)
            .collect()
    }

    /// Returns the whole collection as a JSON array.
    pub fn to_json(&self) -> Result<String, RecipeBoxError> {
        serde_json::to_string(&self.lock().get_all()).map_err(|e| {
            RecipeBoxError::SerializationError {
                message: e.to_string(),
            }
        })
    }

    /// Registers a listener and returns its id.
    pub fn subscribe(&self, listener: Box<dyn RecipeBoxListener>) -> u64 {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        lock_or_recover(&self.listeners).push((id, Arc::from(listener)));
        id
    }

    /// Removes a listener. Returns false if the id is unknown.
    pub fn unsubscribe(&self, id: u64) -> bool {
        let mut listeners = lock_or_recover(&self.listeners);
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }
}

impl FfiRecipeRepository {
    fn lock(&self) -> MutexGuard<'_, RecipeRepository> {
        lock_or_recover(&self.inner)
    }

    /// Runs a mutation under the lock, then delivers its events unlocked.
    fn mutate<T>(&self, f: impl FnOnce(&mut RecipeRepository) -> T) -> T {
        let result = {
            let mut repository = self.lock();
            f(&mut *repository)
        };
        self.dispatch();
        result
    }

    fn dispatch(&self) {
        let events = std::mem::take(&mut *lock_or_recover(&self.pending));
        if events.is_empty() {
            return;
        }

        let listeners: Vec<Arc<dyn RecipeBoxListener>> = lock_or_recover(&self.listeners)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for event in &events {
            for listener in &listeners {
                listener.on_change(FfiRepositoryEvent::from(event));
            }
        }
    }
}

// A panicking listener leaves the guarded data itself consistent
fn lock_or_recover<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn saturating_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

// ============================================================================
// Exported FFI Functions
// ============================================================================

/// Decodes recipe file content, keeping the on-disk order.
#[uniffi::export]
pub fn decode_recipes(content: String) -> Result<Vec<FfiRecipe>, RecipeBoxError> {
    let recipes = codec::decode(&content)?;
    Ok(recipes.iter().map(FfiRecipe::from).collect())
}

/// Encodes recipes into recipe file content.
#[uniffi::export]
pub fn encode_recipes(recipes: Vec<FfiRecipe>) -> String {
    let recipes: Vec<Recipe> = recipes.into_iter().map(Recipe::from).collect();
    codec::encode(&recipes)
}

/// Returns the library version.
#[uniffi::export]
pub fn library_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
