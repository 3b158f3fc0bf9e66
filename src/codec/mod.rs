//! Codec for the section-delimited recipe file format.
//!
//! A file is a sequence of recipes written back to back:
//!
//! ```text
//! [Recept]
//! Tea
//! [Ingredienser]
//! 1;cup;water
//! [Instruktioner]
//! Boil water.
//! ```
//!
//! Ingredient lines hold exactly three `;`-separated fields in the order
//! amount, measure, name. There is no escaping, so a `;` inside a field
//! cannot be represented. Blank lines are ignored when decoding.
//!
//! Some recipes are accepted by the model but do not survive a round trip:
//! - a `;` in an ingredient field splits it into extra fields
//! - an empty or whitespace-only name is skipped as a blank line, and the
//!   next marker is read as the name instead
//! - a whitespace-only instruction line is dropped
//! - an instruction line equal to a marker switches the section

use crate::model::{Ingredient, Recipe};
use thiserror::Error;
use tracing::trace;

mod model;

use model::*;

/// Errors raised while decoding a recipe file.
///
/// Line numbers are one-indexed and count blank lines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("Line {line}: expected 3 ingredient fields separated by ';', found {fields}")]
    MalformedIngredient { line: usize, fields: usize },

    #[error("Line {line}: content outside of a recipe section")]
    ContentOutsideSection { line: usize },

    #[error("Line {line}: [Recept] is not followed by a recipe name")]
    MissingRecipeName { line: usize },
}

/// Encodes recipes in the given order.
///
/// Lines are joined with `\n` and no newline follows the last line, so a
/// decoded file without a trailing newline encodes back byte for byte.
pub fn encode<'a>(recipes: impl IntoIterator<Item = &'a Recipe>) -> String {
    let mut lines: Vec<String> = Vec::new();

    for recipe in recipes {
        lines.push(Section::Recipe.marker().to_string());
        lines.push(recipe.name().to_string());
        lines.push(Section::Ingredients.marker().to_string());
        lines.extend(recipe.ingredients().iter().map(Ingredient::to_line));
        lines.push(Section::Instructions.marker().to_string());
        lines.extend(recipe.instructions().iter().cloned());
    }

    lines.join("\n")
}

/// Decodes recipe file content, keeping the on-disk recipe order.
///
/// # Examples
///
/// ```
/// let recipes = recipe_box::decode("[Recept]\nTea\n[Ingredienser]\n1;cup;water").unwrap();
/// assert_eq!(recipes[0].name(), "Tea");
/// assert_eq!(recipes[0].ingredients()[0].measure, "cup");
/// ```
pub fn decode(content: &str) -> Result<Vec<Recipe>, CodecError> {
    decode_lines(content.lines().map(|line| Ok::<_, CodecError>(line.to_string())))
}

/// Decodes recipes from a fallible line iterator (for file reading).
///
/// The first error from the iterator or from the format aborts decoding.
pub fn decode_lines<I, E>(lines: I) -> Result<Vec<Recipe>, E>
where
    I: IntoIterator<Item = Result<String, E>>,
    E: From<CodecError>,
{
    let mut decoder = Decoder::default();
    for line in lines {
        decoder.feed(&line?)?;
    }
    Ok(decoder.finish()?)
}

#[derive(Debug, Default)]
struct Decoder {
    state: ReadState,
    /// Recipes decoded so far; the last one is the recipe being filled
    recipes: Vec<Recipe>,
    line_number: usize,
}

impl Decoder {
    fn feed(&mut self, line: &str) -> Result<(), CodecError> {
        self.line_number += 1;

        if line.trim().is_empty() {
            return Ok(());
        }

        // The name line is taken as-is, even if it looks like a marker
        if self.state == ReadState::ExpectingRecipeName {
            self.recipes.push(Recipe::new(line));
            self.transition(ReadState::ExpectingIngredientOrSectionMarker);
            return Ok(());
        }

        if let Some(section) = Section::from_marker(line) {
            self.transition(ReadState::after(section));
            return Ok(());
        }

        let line_number = self.line_number;
        let state = self.state;
        let recipe = match self.recipes.last_mut() {
            Some(recipe) if state != ReadState::Indefinite => recipe,
            _ => return Err(CodecError::ContentOutsideSection { line: line_number }),
        };

        match state {
            ReadState::ExpectingIngredientOrSectionMarker => {
                let ingredient = Ingredient::from_line(line).map_err(|fields| {
                    CodecError::MalformedIngredient {
                        line: line_number,
                        fields,
                    }
                })?;
                recipe.add_ingredient(ingredient);
            }
            ReadState::ExpectingInstructionOrSectionMarker => {
                recipe.add_instruction_line(line);
            }
            ReadState::Indefinite | ReadState::ExpectingRecipeName => {
                return Err(CodecError::ContentOutsideSection { line: line_number });
            }
        }

        Ok(())
    }

    fn transition(&mut self, next: ReadState) {
        trace!(line = self.line_number, from = ?self.state, to = ?next, "recipe file state");
        self.state = next;
    }

    fn finish(self) -> Result<Vec<Recipe>, CodecError> {
        if self.state == ReadState::ExpectingRecipeName {
            return Err(CodecError::MissingRecipeName {
                line: self.line_number,
            });
        }
        Ok(self.recipes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;

    fn create_test_recipes() -> Vec<Recipe> {
        let mut pancakes = Recipe::new("Pancakes");
        pancakes.add_ingredient(Ingredient::new("3", "dl", "flour"));
        pancakes.add_ingredient(Ingredient::new("6", "dl", "milk"));
        pancakes.add_ingredient(Ingredient::new("3", "", "eggs"));
        pancakes.add_instruction_line("Whisk everything together.");
        pancakes.add_instruction_line("  Let rest for 10 minutes.");

        let mut apple_pie = Recipe::new("Apple Pie");
        apple_pie.add_ingredient(Ingredient::new("4", "st", "apples"));
        apple_pie.add_instruction_line("Bake at 200 degrees.");

        vec![pancakes, apple_pie]
    }

    #[test]
    fn test_decode_single_recipe() {
        let content = "[Recept]\nTea\n[Ingredienser]\n1;cup;water\n[Instruktioner]\nBoil water.";
        let recipes = decode(content).unwrap();

        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].name(), "Tea");
        assert_eq!(
            recipes[0].ingredients(),
            [Ingredient::new("1", "cup", "water")]
        );
        assert_eq!(recipes[0].instructions(), ["Boil water."]);
    }

    #[test]
    fn test_encode_is_byte_identical_to_decoded_input() {
        let content = "[Recept]\nTea\n[Ingredienser]\n1;cup;water\n[Instruktioner]\nBoil water.";
        let recipes = decode(content).unwrap();
        assert_eq!(encode(&recipes), content);
    }

    #[test]
    fn test_encode_layout() {
        let recipes = create_test_recipes();
        let expected = indoc! {"
            [Recept]
            Pancakes
            [Ingredienser]
            3;dl;flour
            6;dl;milk
            3;;eggs
            [Instruktioner]
            Whisk everything together.
              Let rest for 10 minutes.
            [Recept]
            Apple Pie
            [Ingredienser]
            4;st;apples
            [Instruktioner]
            Bake at 200 degrees."};

        assert_eq!(encode(&recipes), expected);
    }

    #[test]
    fn test_encode_empty_collection() {
        assert_eq!(encode(&Vec::<Recipe>::new()), "");
        assert!(decode("").unwrap().is_empty());
    }

    #[test]
    fn test_round_trip_keeps_file_order() {
        let recipes = create_test_recipes();
        let decoded = decode(&encode(&recipes)).unwrap();
        assert_eq!(decoded, recipes);
    }

    #[test]
    fn test_decode_skips_blank_lines() {
        let content = indoc! {"

            [Recept]

            Tea
               
            [Ingredienser]
            1;cup;water

            [Instruktioner]

            Boil water.
            Steep.
        "};
        let recipes = decode(content).unwrap();

        assert_eq!(recipes.len(), 1);
        assert_eq!(recipes[0].name(), "Tea");
        assert_eq!(recipes[0].instructions(), ["Boil water.", "Steep."]);
    }

    #[test]
    fn test_decode_ingredients_after_recipe_name_without_marker() {
        let content = indoc! {"
            [Recept]
            Toast
            1;slice;bread
            [Instruktioner]
            Toast the bread."};
        let recipes = decode(content).unwrap();
        assert_eq!(
            recipes[0].ingredients(),
            [Ingredient::new("1", "slice", "bread")]
        );
    }

    #[test]
    fn test_decode_sections_can_repeat() {
        let content = indoc! {"
            [Recept]
            Soup
            [Ingredienser]
            1;l;water
            [Instruktioner]
            Boil.
            [Ingredienser]
            1;tsp;salt
            [Instruktioner]
            Season."};
        let recipes = decode(content).unwrap();

        assert_eq!(recipes[0].ingredients().len(), 2);
        assert_eq!(recipes[0].ingredients()[1].name, "salt");
        assert_eq!(recipes[0].instructions(), ["Boil.", "Season."]);
    }

    #[test]
    fn test_decode_keeps_instruction_lines_verbatim() {
        let content = "[Recept]\nTea\n[Instruktioner]\n  Boil; then pour.  \n[Ingredienser]";
        let recipes = decode(content).unwrap();
        assert_eq!(recipes[0].instructions(), ["  Boil; then pour.  "]);
        assert!(recipes[0].ingredients().is_empty());
    }

    #[test]
    fn test_indented_marker_lines_are_content() {
        let mut notes = Recipe::new("Notes");
        notes.add_ingredient(Ingredient::new("1", "", " [Ingredienser]"));
        notes.add_instruction_line("  [Recept]");
        notes.add_instruction_line("[Instruktioner] ");
        notes.add_instruction_line("Done.");

        let decoded = decode(&encode([&notes])).unwrap();
        assert_eq!(decoded, vec![notes]);
    }

    #[test]
    fn test_decode_indented_marker_before_any_section() {
        let content = "  [Recept]\nTea";
        assert_eq!(
            decode(content),
            Err(CodecError::ContentOutsideSection { line: 1 })
        );
    }

    #[test]
    fn test_decode_crlf_line_endings() {
        let content = "[Recept]\r\nTea\r\n[Ingredienser]\r\n1;cup;water\r\n[Instruktioner]\r\nBoil water.\r\n";
        let recipes = decode(content).unwrap();
        assert_eq!(recipes[0].name(), "Tea");
        assert_eq!(recipes[0].ingredients()[0].name, "water");
        assert_eq!(recipes[0].instructions(), ["Boil water."]);
    }

    #[test]
    fn test_decode_name_line_is_not_a_marker() {
        let content = "[Recept]\n[Instruktioner]\n[Ingredienser]\n1;cup;water";
        let recipes = decode(content).unwrap();
        assert_eq!(recipes[0].name(), "[Instruktioner]");
        assert_eq!(recipes[0].ingredients().len(), 1);
    }

    #[test]
    fn test_decode_ingredient_with_two_fields() {
        let content = indoc! {"
            [Recept]
            Pancakes
            [Ingredienser]
            2;dl"};
        assert_eq!(
            decode(content),
            Err(CodecError::MalformedIngredient { line: 4, fields: 2 })
        );
    }

    #[test]
    fn test_decode_ingredient_with_four_fields() {
        let content = "[Recept]\nPancakes\n[Ingredienser]\n2;dl;milk;cold";
        assert_eq!(
            decode(content),
            Err(CodecError::MalformedIngredient { line: 4, fields: 4 })
        );
    }

    #[test]
    fn test_decode_content_before_any_marker() {
        let content = "Tea\n[Recept]\nTea";
        assert_eq!(
            decode(content),
            Err(CodecError::ContentOutsideSection { line: 1 })
        );
    }

    #[test]
    fn test_decode_content_without_open_recipe() {
        let content = "\n[Ingredienser]\n1;cup;water";
        assert_eq!(
            decode(content),
            Err(CodecError::ContentOutsideSection { line: 3 })
        );

        let content = "[Instruktioner]\nBoil water.";
        assert_eq!(
            decode(content),
            Err(CodecError::ContentOutsideSection { line: 2 })
        );
    }

    #[test]
    fn test_decode_missing_recipe_name() {
        let content = "[Recept]\nTea\n[Recept]\n\n";
        assert_eq!(
            decode(content),
            Err(CodecError::MissingRecipeName { line: 4 })
        );
    }

    #[test]
    fn test_decode_lines_propagates_source_error() {
        #[derive(Debug, PartialEq)]
        enum TestError {
            Source,
            Codec(CodecError),
        }

        impl From<CodecError> for TestError {
            fn from(e: CodecError) -> Self {
                TestError::Codec(e)
            }
        }

        let lines = vec![
            Ok("[Recept]".to_string()),
            Ok("Tea".to_string()),
            Err(TestError::Source),
        ];
        assert_eq!(decode_lines(lines), Err(TestError::Source));

        let lines = vec![Ok::<_, TestError>("orphan".to_string())];
        assert_eq!(
            decode_lines(lines),
            Err(TestError::Codec(CodecError::ContentOutsideSection { line: 1 }))
        );
    }

    #[test]
    fn test_section_markers() {
        assert_eq!(Section::from_marker("[Recept]"), Some(Section::Recipe));
        assert_eq!(
            Section::from_marker("[Ingredienser]"),
            Some(Section::Ingredients)
        );
        assert_eq!(
            Section::from_marker("[Instruktioner]"),
            Some(Section::Instructions)
        );
        assert_eq!(Section::from_marker("[recept]"), None);
        assert_eq!(Section::from_marker("Recept"), None);
        assert_eq!(Section::from_marker(" [Recept]"), None);
        assert_eq!(Section::from_marker("[Recept]\t"), None);
    }
}
