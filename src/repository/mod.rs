//! The working recipe collection and its backing file.
//!
//! A `RecipeRepository` is bound to one file path. `load` replaces the
//! collection with the file's content, `save` writes the collection back.
//! Every accessor hands out owned copies, so callers can never change the
//! stored recipes except through `add` and `delete`.

use crate::codec::{self, CodecError};
use crate::model::Recipe;
use crate::search::search;
use camino::{Utf8Path, Utf8PathBuf};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use thiserror::Error;
use tracing::{debug, warn};

mod model;

pub use model::{ChangeListener, ListenerId, RepositoryEvent};

/// File name used by `RecipeRepository::in_dir`.
pub const DEFAULT_FILE_NAME: &str = "recept.txt";

/// Errors that can occur when working with the recipe repository.
#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("Failed to access recipe file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed recipe file: {0}")]
    Format(#[from] CodecError),

    #[error("Recipe index {index} is out of range for {len} recipes")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Recipe not found: {0}")]
    NotFound(String),
}

impl RepositoryError {
    /// Returns true if the recipe file content was rejected.
    pub fn is_malformed(&self) -> bool {
        matches!(self, RepositoryError::Format(_))
    }
}

/// In-memory recipe collection bound to a recipe file.
///
/// # Examples
///
/// ```no_run
/// use recipe_box::RecipeRepository;
///
/// let mut repository = RecipeRepository::new("recipes/recept.txt");
/// repository.load()?;
///
/// for recipe in repository.get_all() {
///     println!("{}", recipe.name());
/// }
///
/// repository.delete_at(0)?;
/// assert!(repository.is_modified());
/// repository.save()?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RecipeRepository {
    path: Utf8PathBuf,
    recipes: Vec<Recipe>,
    modified: bool,
    listeners: Vec<(ListenerId, ChangeListener)>,
    next_listener_id: usize,
}

impl fmt::Debug for RecipeRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecipeRepository")
            .field("path", &self.path)
            .field("recipes", &self.recipes)
            .field("modified", &self.modified)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl RecipeRepository {
    /// Creates an empty repository bound to `path`.
    ///
    /// Nothing is read until `load` is called.
    pub fn new(path: impl Into<Utf8PathBuf>) -> Self {
        RecipeRepository {
            path: path.into(),
            recipes: Vec::new(),
            modified: false,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Creates an empty repository bound to `DEFAULT_FILE_NAME` inside `dir`.
    pub fn in_dir(dir: impl AsRef<Utf8Path>) -> Self {
        Self::new(dir.as_ref().join(DEFAULT_FILE_NAME))
    }

    pub fn path(&self) -> &Utf8Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Returns true if the collection changed since the last load or save.
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Returns copies of all recipes in collection order.
    pub fn get_all(&self) -> Vec<Recipe> {
        self.recipes.clone()
    }

    /// Returns a copy of the recipe at `index`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::IndexOutOfRange` if `index >= len()`.
    pub fn get_at(&self, index: usize) -> Result<Recipe, RepositoryError> {
        self.recipes
            .get(index)
            .cloned()
            .ok_or(RepositoryError::IndexOutOfRange {
                index,
                len: self.recipes.len(),
            })
    }

    /// Returns copies of the recipes matching `query`, best match first.
    pub fn search(&self, query: &str) -> Vec<Recipe> {
        search(&self.recipes, query).into_iter().cloned().collect()
    }

    /// Appends `recipe` to the end of the collection.
    ///
    /// The collection is only sorted again by the next `load`.
    pub fn add(&mut self, recipe: Recipe) {
        let name = recipe.name().to_string();
        self.recipes.push(recipe);
        self.modified = true;
        self.notify(RepositoryEvent::Added { name });
    }

    /// Deletes the stored recipe equal to `recipe`.
    ///
    /// `recipe` is usually a copy obtained from `get_all` or `get_at`; the
    /// first stored recipe with the same name, ingredients and instructions
    /// is removed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no stored recipe is equal.
    pub fn delete(&mut self, recipe: &Recipe) -> Result<(), RepositoryError> {
        let index = self
            .recipes
            .iter()
            .position(|stored| stored == recipe)
            .ok_or_else(|| RepositoryError::NotFound(recipe.name().to_string()))?;
        self.remove(index);
        Ok(())
    }

    /// Deletes the recipe at `index`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::IndexOutOfRange` if `index >= len()`.
    pub fn delete_at(&mut self, index: usize) -> Result<(), RepositoryError> {
        if index >= self.recipes.len() {
            return Err(RepositoryError::IndexOutOfRange {
                index,
                len: self.recipes.len(),
            });
        }
        self.remove(index);
        Ok(())
    }

    fn remove(&mut self, index: usize) {
        let removed = self.recipes.remove(index);
        self.modified = true;
        self.notify(RepositoryEvent::Deleted {
            name: removed.name().to_string(),
        });
    }

    /// Writes the collection to the bound file, replacing its content.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Io` if the file cannot be written. The
    /// modified flag is left as it was.
    pub fn save(&mut self) -> Result<(), RepositoryError> {
        fs::write(&self.path, codec::encode(&self.recipes))?;
        debug!(path = %self.path, count = self.recipes.len(), "saved recipes");

        self.modified = false;
        self.notify(RepositoryEvent::Saved {
            count: self.recipes.len(),
        });
        Ok(())
    }

    /// Replaces the collection with the recipes in the bound file.
    ///
    /// Loaded recipes are sorted by name. On any error the current
    /// collection is kept unchanged.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Io` if the file cannot be read, or
    /// `RepositoryError::Format` if its content is malformed.
    pub fn load(&mut self) -> Result<(), RepositoryError> {
        let file = File::open(&self.path)?;
        let reader = BufReader::new(file);

        let mut recipes = codec::decode_lines(
            reader.lines().map(|line| line.map_err(RepositoryError::Io)),
        )
        .inspect_err(|e| warn!(path = %self.path, error = %e, "failed to load recipes"))?;
        // Stable, so recipes sharing a name keep their file order
        recipes.sort_by(Recipe::cmp_by_name);
        debug!(path = %self.path, count = recipes.len(), "loaded recipes");

        self.recipes = recipes;
        self.modified = false;
        self.notify(RepositoryEvent::Loaded {
            count: self.recipes.len(),
        });
        Ok(())
    }

    /// Registers a listener called after every change to the collection.
    pub fn subscribe(
        &mut self,
        listener: impl Fn(&RepositoryEvent) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener_id, _)| *listener_id != id);
        self.listeners.len() != before
    }

    fn notify(&self, event: RepositoryEvent) {
        for (_, listener) in &self.listeners {
            listener(&event);
        }
    }
}
