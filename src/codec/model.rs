/// A section marker line of the recipe file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Section {
    Recipe,
    Ingredients,
    Instructions,
}

impl Section {
    pub(crate) const ALL: [Section; 3] =
        [Section::Recipe, Section::Ingredients, Section::Instructions];

    pub(crate) fn marker(self) -> &'static str {
        match self {
            Section::Recipe => "[Recept]",
            Section::Ingredients => "[Ingredienser]",
            Section::Instructions => "[Instruktioner]",
        }
    }

    /// Matches a line against the markers. Only an exact match counts, so
    /// an indented `  [Recept]` stays ordinary content.
    pub(crate) fn from_marker(line: &str) -> Option<Section> {
        Section::ALL.into_iter().find(|s| s.marker() == line)
    }
}

/// What the decoder expects from the next content line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum ReadState {
    /// No section marker seen yet
    #[default]
    Indefinite,
    ExpectingRecipeName,
    ExpectingIngredientOrSectionMarker,
    ExpectingInstructionOrSectionMarker,
}

impl ReadState {
    pub(crate) fn after(section: Section) -> ReadState {
        match section {
            Section::Recipe => ReadState::ExpectingRecipeName,
            Section::Ingredients => ReadState::ExpectingIngredientOrSectionMarker,
            Section::Instructions => ReadState::ExpectingInstructionOrSectionMarker,
        }
    }
}
