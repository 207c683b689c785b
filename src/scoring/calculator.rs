use super::categories::{CategoryScoreMap, NutritionCategory, UserSelection};
use super::dataset::{parse_score, Dataset, DatasetError, DatasetRow, DatasetSource, Sex};
use tracing::debug;

/// Sums HEIFA sub-scores for one user out of the dataset.
#[derive(Debug, Clone)]
pub struct ScoreCalculator<S> {
    source: S,
}

impl<S: DatasetSource> ScoreCalculator<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Food quality score for the questionnaire selection: the `sex`-specific
    /// sub-score of every recognised food group, summed. Unknown users score 0.
    pub fn total_score(
        &self,
        user_id: &str,
        sex: Sex,
        selection: &UserSelection,
    ) -> Result<f32, DatasetError> {
        let dataset = self.source.load()?;
        let Some(row) = dataset.find_row(user_id) else {
            debug!(user_id, "no dataset row for user");
            return Ok(0.0);
        };

        let total: f32 = selection
            .categories()
            .into_iter()
            .filter_map(|category| dataset.column_index(category.column_for(sex)))
            .map(|index| row.score_at(index))
            .sum();

        debug!(user_id, %sex, selected = selection.len(), total, "total score computed");
        Ok(total)
    }

    /// Per-category scores for the insights screen, independent of the
    /// questionnaire. Sex comes from the user's own row. Every header that
    /// contains a category name and carries the row's sex suffix is summed
    /// into that category, so overlapping headers add up.
    pub fn category_breakdown(&self, user_id: &str) -> Result<CategoryScoreMap, DatasetError> {
        let dataset = self.source.load()?;
        let Some(row) = dataset.find_row_in_column(dataset.user_id_column(), user_id) else {
            debug!(user_id, "no dataset row for user");
            return Ok(CategoryScoreMap::default());
        };

        let sex = dataset.sex_of(&row);
        let mut scores = CategoryScoreMap::default();
        for category in NutritionCategory::ordered() {
            let score = match sex {
                Some(sex) => category_score(&dataset, &row, category, sex),
                None => 0.0,
            };
            scores.insert(category.name(), score);
        }

        Ok(scores)
    }
}

fn category_score(
    dataset: &Dataset,
    row: &DatasetRow<'_>,
    category: NutritionCategory,
    sex: Sex,
) -> f32 {
    dataset
        .header()
        .iter()
        .enumerate()
        .filter(|(_, column)| {
            category.matches_header(column) && column.ends_with(sex.column_suffix())
        })
        .filter_map(|(index, _)| row.cell(index))
        .map(parse_score)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::categories::FoodCategory;
    use crate::scoring::dataset::InMemoryDataset;

    const TABLE: &str = "phone number,User_ID,Sex,VegetablesHEIFAscoreMale,VegetablesHEIFAscoreFemale,FruitHEIFAscoreMale,FruitHEIFAscoreFemale,SugarHEIFAscoreMale,SugarHEIFAscoreFemale\n\
0400000000,U1,Male,5,3,4,2,7,9\n\
0400000009,U2,Female,abc,2.5,,4,1,2\n\
0400000008,U3,Male,1\n\
0400000007,U1,Female,0,0,0,0,0,0\n";

    fn calculator() -> ScoreCalculator<InMemoryDataset> {
        ScoreCalculator::new(InMemoryDataset::new(TABLE))
    }

    fn select(categories: &[FoodCategory]) -> UserSelection {
        categories.iter().copied().collect()
    }

    #[test]
    fn total_score_uses_sex_specific_columns() {
        let calculator = calculator();
        let vegetables = select(&[FoodCategory::Vegetables]);
        assert_eq!(
            calculator
                .total_score("U1", Sex::Male, &vegetables)
                .expect("score"),
            5.0
        );
        assert_eq!(
            calculator
                .total_score("U1", Sex::Female, &vegetables)
                .expect("score"),
            3.0
        );
    }

    #[test]
    fn total_score_sums_selection_and_skips_unknown_names() {
        let mut selection = select(&[FoodCategory::Fruits, FoodCategory::Sweets]);
        selection.insert("Legumes");
        let total = calculator()
            .total_score("U1", Sex::Male, &selection)
            .expect("score");
        assert_eq!(total, 11.0);
    }

    #[test]
    fn malformed_and_missing_cells_count_as_zero() {
        let selection = select(&[
            FoodCategory::Vegetables,
            FoodCategory::Fruits,
            FoodCategory::Sweets,
        ]);
        let male = calculator()
            .total_score("U2", Sex::Male, &selection)
            .expect("score");
        assert_eq!(male, 1.0);

        let short_row = calculator()
            .total_score("U3", Sex::Male, &selection)
            .expect("score");
        assert_eq!(short_row, 1.0);
    }

    #[test]
    fn empty_selection_and_unknown_user_score_zero() {
        let calculator = calculator();
        assert_eq!(
            calculator
                .total_score("U1", Sex::Male, &UserSelection::default())
                .expect("score"),
            0.0
        );
        assert_eq!(
            calculator
                .total_score("nobody", Sex::Male, &select(&[FoodCategory::Fruits]))
                .expect("score"),
            0.0
        );
    }

    #[test]
    fn breakdown_reads_sex_from_the_row() {
        let scores = calculator().category_breakdown("U2").expect("breakdown");
        assert_eq!(scores.len(), NutritionCategory::ordered().len());
        assert_eq!(scores.get("Vegetables"), Some(2.5));
        assert_eq!(scores.get("Sugar"), Some(2.0));
        assert_eq!(scores.get("Fruits"), Some(0.0));
        assert_eq!(scores.get("Sodium"), Some(0.0));
    }

    #[test]
    fn breakdown_uses_first_row_for_duplicate_ids() {
        let scores = calculator().category_breakdown("U1").expect("breakdown");
        assert_eq!(scores.get("Vegetables"), Some(5.0));
        assert_eq!(scores.get("Sugar"), Some(7.0));
    }

    #[test]
    fn breakdown_for_unknown_user_is_empty() {
        assert!(calculator()
            .category_breakdown("nobody")
            .expect("breakdown")
            .is_empty());
    }

    #[test]
    fn breakdown_without_recognised_sex_scores_zero() {
        let calculator = ScoreCalculator::new(InMemoryDataset::new(
            "phone,User_ID,Sex,WaterHEIFAscoreMale\n1,X,unknown,4\n",
        ));
        let scores = calculator.category_breakdown("X").expect("breakdown");
        assert_eq!(scores.get("Water"), Some(0.0));
    }

    #[test]
    fn breakdown_adds_every_overlapping_column() {
        let calculator = ScoreCalculator::new(InMemoryDataset::new(
            "phone,User_ID,Sex,SaturatedFatsHEIFAscoreMale,UnsaturatedFatsHEIFAscoreMale,Fatsservesize\n1,X,Male,4,5,9\n",
        ));
        let scores = calculator.category_breakdown("X").expect("breakdown");
        assert_eq!(scores.get("Fats"), Some(9.0));
        assert!(scores.get("Fats").unwrap_or_default() > f32::from(NutritionCategory::Fats.max_score()));
    }
}
