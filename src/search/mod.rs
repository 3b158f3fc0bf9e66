use crate::Recipe;

mod model;

use model::*;

/// Search recipes by name, ingredient names and instruction text.
///
/// Returns the matching recipes, best match first. A blank query matches
/// nothing.
pub fn search<'a>(recipes: &'a [Recipe], query: &str) -> Vec<&'a Recipe> {
    let query_lower = query.trim().to_lowercase();
    if query_lower.is_empty() {
        return Vec::new();
    }
    let terms: Vec<String> = query_lower.split_whitespace().map(String::from).collect();

    let mut scored_results = vec![];
    for recipe in recipes {
        let mut result = SearchResult::new(recipe);

        // Score based on name match (using full query)
        result.add_score(score_name_match(recipe, &query_lower));

        // Score based on content matches (using individual terms)
        result.add_score(score_content_matches(recipe, &terms));

        if result.score > 0.0 {
            scored_results.push(result);
        }
    }

    sort_results(&mut scored_results);
    scored_results.into_iter().map(|r| r.recipe).collect()
}

/// Calculate score for name matches
fn score_name_match(recipe: &Recipe, query: &str) -> f64 {
    let name = recipe.name().to_lowercase();
    if name == query {
        20.0 // Highest score for exact match
    } else if name.contains(query) {
        10.0
    } else {
        0.0
    }
}

/// Calculate score for ingredient and instruction matches
fn score_content_matches(recipe: &Recipe, terms: &[String]) -> f64 {
    let matches = count_matches(recipe, terms);
    if matches > 0 {
        // Base score plus a capped bonus for repeated matches
        1.0 + (0.1 * matches as f64).min(5.0)
    } else {
        0.0
    }
}

/// Count how many times the terms appear in ingredient names and instructions
fn count_matches(recipe: &Recipe, terms: &[String]) -> usize {
    let ingredient_names = recipe.ingredients().iter().map(|i| i.name.as_str());
    let instructions = recipe.instructions().iter().map(String::as_str);

    ingredient_names
        .chain(instructions)
        .map(|text| {
            let text = text.to_lowercase();
            terms
                .iter()
                .map(|term| text.matches(term.as_str()).count())
                .sum::<usize>()
        })
        .sum()
}

/// Sort search results by score in descending order
fn sort_results(results: &mut [SearchResult<'_>]) {
    results.sort_unstable_by(|a, b| {
        let score_cmp = b
            .score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal);

        if score_cmp != std::cmp::Ordering::Equal {
            return score_cmp;
        }

        // If scores are equal, sort by name
        let a_name = a.recipe.name().to_lowercase();
        let b_name = b.recipe.name().to_lowercase();

        a_name.cmp(&b_name)
    });
}
