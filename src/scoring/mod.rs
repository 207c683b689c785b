mod calculator;
pub mod categories;
pub mod dataset;
mod directory;
pub mod report;

pub use calculator::ScoreCalculator;
pub use categories::{
    CategoryScore, CategoryScoreMap, FoodCategory, NutritionCategory, UserSelection,
    MAX_TOTAL_SCORE,
};
pub use dataset::{Dataset, DatasetError, DatasetSource, FileDataset, InMemoryDataset, Sex};
pub use directory::{UserDirectory, UserProfile};
pub use report::{build_report, InsightsView, ScoreBand};
