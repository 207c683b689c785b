pub mod history;
mod preferences;
mod questionnaire;

pub use history::{append_score, score_history};
pub use preferences::{PreferenceError, PreferenceStore, TIME_FORMAT};
pub use questionnaire::{parse_clock_time, Persona, QuestionnaireAnswers};
