use super::dataset::Sex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

pub const MAX_TOTAL_SCORE: f32 = 100.0;

/// Food groups offered by the intake questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FoodCategory {
    Fruits,
    Vegetables,
    Grains,
    Wholegrain,
    Meat,
    Dairy,
    AlcoholicBeverages,
    Sweets,
}

impl FoodCategory {
    pub const fn ordered() -> [Self; 8] {
        [
            Self::Fruits,
            Self::Vegetables,
            Self::Grains,
            Self::Meat,
            Self::Dairy,
            Self::Sweets,
            Self::AlcoholicBeverages,
            Self::Wholegrain,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Fruits => "Fruits",
            Self::Vegetables => "Vegetables",
            Self::Grains => "Grains",
            Self::Wholegrain => "Wholegrain",
            Self::Meat => "Meat",
            Self::Dairy => "Dairy",
            Self::AlcoholicBeverages => "Alcoholic beverages",
            Self::Sweets => "Sweets",
        }
    }

    /// Resolves a questionnaire label, ignoring case and surrounding whitespace.
    pub fn from_label(value: &str) -> Option<Self> {
        let wanted = value.trim();
        Self::ordered()
            .into_iter()
            .find(|category| category.label().eq_ignore_ascii_case(wanted))
    }

    /// (male column, female column) holding this group's sub-score.
    pub const fn columns(self) -> (&'static str, &'static str) {
        match self {
            Self::Vegetables => ("VegetablesHEIFAscoreMale", "VegetablesHEIFAscoreFemale"),
            Self::Fruits => ("FruitHEIFAscoreMale", "FruitHEIFAscoreFemale"),
            Self::Grains => (
                "GrainsandcerealsHEIFAscoreMale",
                "GrainsandcerealsHEIFAscoreFemale",
            ),
            Self::Wholegrain => ("WholegrainsHEIFAscoreMale", "WholegrainsHEIFAscoreFemale"),
            Self::Meat => (
                "MeatandalternativesHEIFAscoreMale",
                "MeatandalternativesHEIFAscoreFemale",
            ),
            Self::Dairy => (
                "DairyandalternativesHEIFAscoreMale",
                "DairyandalternativesHEIFAscoreFemale",
            ),
            Self::AlcoholicBeverages => ("AlcoholHEIFAscoreMale", "AlcoholHEIFAscoreFemale"),
            Self::Sweets => ("SugarHEIFAscoreMale", "SugarHEIFAscoreFemale"),
        }
    }

    pub const fn column_for(self, sex: Sex) -> &'static str {
        let (male, female) = self.columns();
        match sex {
            Sex::Male => male,
            Sex::Female => female,
        }
    }
}

impl fmt::Display for FoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Categories shown on the insights breakdown. Each name is matched as a
/// case-insensitive substring of the dataset headers, so one category can pick
/// up several columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NutritionCategory {
    Discretionary,
    MeatAndAlternatives,
    DairyAndAlternatives,
    Sodium,
    Sugar,
    Alcohol,
    Fats,
    Water,
    GrainsAndCereals,
    Wholegrains,
    Fruits,
    Vegetables,
}

impl NutritionCategory {
    pub const fn ordered() -> [Self; 12] {
        [
            Self::Discretionary,
            Self::MeatAndAlternatives,
            Self::DairyAndAlternatives,
            Self::Sodium,
            Self::Sugar,
            Self::Alcohol,
            Self::Fats,
            Self::Water,
            Self::GrainsAndCereals,
            Self::Wholegrains,
            Self::Fruits,
            Self::Vegetables,
        ]
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Discretionary => "Discretionary",
            Self::MeatAndAlternatives => "Meatandalternatives",
            Self::DairyAndAlternatives => "Dairyandalternatives",
            Self::Sodium => "Sodium",
            Self::Sugar => "Sugar",
            Self::Alcohol => "Alcohol",
            Self::Fats => "Fats",
            Self::Water => "Water",
            Self::GrainsAndCereals => "Grainsandcereals",
            Self::Wholegrains => "Wholegrains",
            Self::Fruits => "Fruits",
            Self::Vegetables => "Vegetables",
        }
    }

    pub fn max_score(self) -> u8 {
        max_score_for(self.name())
    }

    pub fn matches_header(self, header: &str) -> bool {
        header
            .to_ascii_lowercase()
            .contains(&self.name().to_ascii_lowercase())
    }
}

/// Category maxima: five categories cap at 10, every other name at 5.
pub fn max_score_for(category: &str) -> u8 {
    const CAPPED_AT_TEN: [&str; 5] = [
        "Discretionary",
        "Meatandalternatives",
        "Dairyandalternatives",
        "Sodium",
        "Sugar",
    ];

    if CAPPED_AT_TEN.contains(&category) {
        10
    } else {
        5
    }
}

/// Food groups a user said they eat, as entered. Names outside the
/// questionnaire vocabulary are kept but never contribute to a score.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserSelection {
    names: BTreeSet<String>,
}

impl UserSelection {
    pub fn new<I, T>(names: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<str>,
    {
        let names = names
            .into_iter()
            .map(|name| name.as_ref().trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        Self { names }
    }

    /// Parses the comma-joined form kept in the preference store.
    pub fn parse(joined: &str) -> Self {
        Self::new(joined.split(','))
    }

    pub fn joined(&self) -> String {
        self.names.iter().cloned().collect::<Vec<_>>().join(",")
    }

    pub fn insert(&mut self, name: &str) -> bool {
        let name = name.trim();
        !name.is_empty() && self.names.insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name.trim())
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    /// Recognised food groups, each at most once.
    pub fn categories(&self) -> BTreeSet<FoodCategory> {
        self.names()
            .filter_map(FoodCategory::from_label)
            .collect()
    }
}

impl FromIterator<FoodCategory> for UserSelection {
    fn from_iter<I: IntoIterator<Item = FoodCategory>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(FoodCategory::label))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryScore {
    pub category: String,
    pub score: f32,
    pub max: u8,
}

/// Insertion-ordered category -> (score, max) map.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct CategoryScoreMap {
    entries: Vec<CategoryScore>,
}

impl CategoryScoreMap {
    /// Sets a category's score, replacing any earlier value in place.
    pub fn insert(&mut self, category: &str, score: f32) {
        let max = max_score_for(category);
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.category == category)
        {
            Some(entry) => entry.score = score,
            None => self.entries.push(CategoryScore {
                category: category.to_string(),
                score,
                max,
            }),
        }
    }

    pub fn get(&self, category: &str) -> Option<f32> {
        self.entries
            .iter()
            .find(|entry| entry.category == category)
            .map(|entry| entry.score)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CategoryScore> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f32 {
        self.entries.iter().map(|entry| entry.score).sum()
    }

    pub fn to_map(&self) -> BTreeMap<String, f32> {
        self.entries
            .iter()
            .map(|entry| (entry.category.clone(), entry.score))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capped_categories_allow_ten_points() {
        let capped: Vec<&str> = NutritionCategory::ordered()
            .into_iter()
            .filter(|category| category.max_score() == 10)
            .map(NutritionCategory::name)
            .collect();
        assert_eq!(
            capped,
            vec![
                "Discretionary",
                "Meatandalternatives",
                "Dairyandalternatives",
                "Sodium",
                "Sugar"
            ]
        );
        assert_eq!(NutritionCategory::Water.max_score(), 5);
        assert_eq!(max_score_for("Something else"), 5);
    }

    #[test]
    fn food_category_labels_resolve_loosely() {
        assert_eq!(
            FoodCategory::from_label(" alcoholic BEVERAGES "),
            Some(FoodCategory::AlcoholicBeverages)
        );
        assert_eq!(FoodCategory::from_label("sweets"), Some(FoodCategory::Sweets));
        assert_eq!(FoodCategory::from_label("Legumes"), None);
    }

    #[test]
    fn food_category_picks_sex_specific_column() {
        assert_eq!(
            FoodCategory::Sweets.column_for(Sex::Female),
            "SugarHEIFAscoreFemale"
        );
        assert_eq!(
            FoodCategory::Grains.column_for(Sex::Male),
            "GrainsandcerealsHEIFAscoreMale"
        );
    }

    #[test]
    fn substring_matching_is_case_insensitive_and_loose() {
        assert!(NutritionCategory::Fats.matches_header("SaturatedFatsHEIFAscoreMale"));
        assert!(NutritionCategory::Fats.matches_header("UNSATURATEDFATSHEIFASCOREFEMALE"));
        assert!(!NutritionCategory::Fruits.matches_header("FruitHEIFAscoreMale"));
    }

    #[test]
    fn selection_parses_comma_joined_form() {
        let selection = UserSelection::parse("Fruits, Vegetables,,Fruits , Legumes");
        assert_eq!(selection.len(), 3);
        assert!(selection.contains("Legumes"));
        assert_eq!(selection.joined(), "Fruits,Legumes,Vegetables");
        assert_eq!(
            selection.categories().into_iter().collect::<Vec<_>>(),
            vec![FoodCategory::Fruits, FoodCategory::Vegetables]
        );
    }

    #[test]
    fn selection_collapses_spellings_of_one_category() {
        let selection = UserSelection::new(["Sweets", "sweets"]);
        assert_eq!(selection.len(), 2);
        assert_eq!(selection.categories().len(), 1);
    }

    #[test]
    fn score_map_replaces_and_keeps_order() {
        let mut scores = CategoryScoreMap::default();
        scores.insert("Sodium", 4.0);
        scores.insert("Water", 2.0);
        scores.insert("Sodium", 6.0);

        let names: Vec<&str> = scores.iter().map(|entry| entry.category.as_str()).collect();
        assert_eq!(names, vec!["Sodium", "Water"]);
        assert_eq!(scores.get("Sodium"), Some(6.0));
        assert_eq!(scores.iter().next().map(|entry| entry.max), Some(10));
        assert_eq!(scores.total(), 8.0);
    }
}
