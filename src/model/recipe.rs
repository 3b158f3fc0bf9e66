use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// A single ingredient line of a recipe.
///
/// All three fields are free text and may be empty. On disk an ingredient
/// is written as `amount;measure;name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Ingredient {
    pub amount: String,
    pub measure: String,
    pub name: String,
}

impl Ingredient {
    /// Field separator used by the on-disk ingredient line.
    pub const SEPARATOR: char = ';';

    pub fn new(
        amount: impl Into<String>,
        measure: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Ingredient {
            amount: amount.into(),
            measure: measure.into(),
            name: name.into(),
        }
    }

    /// Parses an `amount;measure;name` line.
    ///
    /// Returns the number of fields found when the line does not split into
    /// exactly three. Fields are kept as written, without trimming.
    pub fn from_line(line: &str) -> Result<Self, usize> {
        let fields: Vec<&str> = line.split(Self::SEPARATOR).collect();
        match fields.as_slice() {
            [amount, measure, name] => Ok(Ingredient::new(*amount, *measure, *name)),
            _ => Err(fields.len()),
        }
    }

    /// Formats the ingredient as its on-disk line.
    pub fn to_line(&self) -> String {
        format!(
            "{}{sep}{}{sep}{}",
            self.amount,
            self.measure,
            self.name,
            sep = Self::SEPARATOR
        )
    }
}

/// A named recipe with ordered ingredients and instruction lines.
///
/// Cloning produces a deep copy: the clone owns its own ingredient and
/// instruction lists.
///
/// # Examples
///
/// ```
/// use recipe_box::{Ingredient, Recipe};
///
/// let mut tea = Recipe::new("Tea");
/// tea.add_ingredient(Ingredient::new("1", "cup", "water"));
/// tea.add_instruction_line("Boil water.");
///
/// assert_eq!(tea.name(), "Tea");
/// assert_eq!(tea.ingredients().len(), 1);
/// assert_eq!(tea.instructions(), ["Boil water."]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Recipe {
    name: String,
    ingredients: Vec<Ingredient>,
    instructions: Vec<String>,
}

impl Recipe {
    /// Creates an empty recipe with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Recipe {
            name: name.into(),
            ingredients: Vec::new(),
            instructions: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }

    /// Appends an ingredient after the existing ones.
    pub fn add_ingredient(&mut self, ingredient: Ingredient) {
        self.ingredients.push(ingredient);
    }

    /// Appends an instruction line after the existing ones.
    pub fn add_instruction_line(&mut self, line: impl Into<String>) {
        self.instructions.push(line.into());
    }

    /// Ordinal comparison by name, the order a loaded collection is kept in.
    pub fn cmp_by_name(&self, other: &Recipe) -> Ordering {
        self.name.cmp(&other.name)
    }
}
