use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{info, warn};

use crate::profile::{
    append_score, score_history, PreferenceError, PreferenceStore, QuestionnaireAnswers,
};
use crate::scoring::{
    build_report, CategoryScoreMap, DatasetError, DatasetSource, ScoreBand, ScoreCalculator,
    UserDirectory, UserProfile,
};

/// Session flow composing the roster, the score calculator, and the
/// preference store: login, questionnaire, dashboard, insights.
pub struct NutriSession<S> {
    directory: UserDirectory<S>,
    calculator: ScoreCalculator<S>,
    store: PreferenceStore,
}

/// What the home dashboard shows after a refresh.
#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub user_id: Option<String>,
    pub display_name: Option<String>,
    pub total_score: f32,
    pub band: ScoreBand,
}

#[derive(Debug, Clone)]
pub struct Insights {
    pub scores: CategoryScoreMap,
    pub total_score: f32,
}

impl<S: DatasetSource + Clone> NutriSession<S> {
    pub fn new(source: S, store: PreferenceStore) -> Self {
        Self {
            directory: UserDirectory::new(source.clone()),
            calculator: ScoreCalculator::new(source),
            store,
        }
    }
}

impl<S: DatasetSource> NutriSession<S> {
    pub fn store(&self) -> &PreferenceStore {
        &self.store
    }

    pub fn into_store(self) -> PreferenceStore {
        self.store
    }

    pub fn current_user(&self) -> Option<&str> {
        self.store.user_id()
    }

    /// Ids offered on the login screen.
    pub fn user_ids(&self) -> Result<BTreeSet<String>, SessionError> {
        Ok(self.directory.list_user_ids()?)
    }

    /// Checks the credentials against the roster and records the user, their
    /// phone number and their sex for later scoring.
    pub fn login(&mut self, user_id: &str, phone_number: &str) -> Result<UserProfile, SessionError> {
        if !self.directory.validate(user_id, phone_number)? {
            warn!(user_id, "login rejected");
            return Err(SessionError::InvalidCredentials);
        }

        let sex = self
            .directory
            .find_profile(user_id)?
            .and_then(|profile| profile.sex);
        let profile = UserProfile {
            user_id: user_id.to_string(),
            phone_number: phone_number.to_string(),
            sex,
        };

        self.store.set_user_id(&profile.user_id);
        self.store.set_phone_number(&profile.phone_number);
        self.store.set_sex(profile.sex);
        self.store.save()?;

        info!(user_id, sex = ?profile.sex, "user logged in");
        Ok(profile)
    }

    pub fn logout(&mut self) -> Result<(), SessionError> {
        self.store.clear_session();
        self.store.save()?;
        Ok(())
    }

    pub fn questionnaire(&self) -> QuestionnaireAnswers {
        QuestionnaireAnswers::load(&self.store)
    }

    pub fn save_questionnaire(&mut self, answers: &QuestionnaireAnswers) -> Result<(), SessionError> {
        answers.apply(&mut self.store);
        self.store.save()?;
        Ok(())
    }

    /// Recomputes the food quality score from the stored selection, stores it
    /// as the current total, and logs it to the user's history.
    pub fn load_dashboard(&mut self) -> Result<Dashboard, SessionError> {
        let user_id = self.store.user_id().map(str::to_string);
        let total_score = match user_id.as_deref() {
            Some(user_id) => {
                let sex = self.store.sex().unwrap_or_default();
                let selection = self.store.selection();
                self.calculator.total_score(user_id, sex, &selection)?
            }
            None => 0.0,
        };

        self.store.set_total_score(total_score);
        append_score(&mut self.store, total_score);
        self.store.save()?;

        info!(user_id = ?user_id, total_score, "dashboard refreshed");
        Ok(Dashboard {
            display_name: user_id
                .as_deref()
                .and_then(|id| self.store.display_name(id))
                .map(str::to_string),
            user_id,
            total_score,
            band: ScoreBand::for_total(total_score),
        })
    }

    /// Full category breakdown next to the last stored total.
    pub fn insights(&self) -> Result<Insights, SessionError> {
        let scores = match self.store.user_id() {
            Some(user_id) => self.calculator.category_breakdown(user_id)?,
            None => CategoryScoreMap::default(),
        };
        Ok(Insights {
            scores,
            total_score: self.store.total_score().unwrap_or(0.0),
        })
    }

    pub fn share_report(&self) -> Result<String, SessionError> {
        let insights = self.insights()?;
        Ok(build_report(&insights.scores, insights.total_score))
    }

    pub fn history(&self) -> Vec<f32> {
        score_history(&self.store)
    }

    pub fn display_name(&self) -> Option<&str> {
        self.store
            .user_id()
            .and_then(|user_id| self.store.display_name(user_id))
    }

    pub fn set_display_name(&mut self, name: &str) -> Result<(), SessionError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }
        let user_id = self
            .store
            .user_id()
            .map(str::to_string)
            .ok_or(SessionError::NotLoggedIn)?;

        self.store.set_display_name(&user_id, name);
        self.store.save()?;
        Ok(())
    }
}

/// Error raised by the session flow.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid ID or Phone Number. Please try again.")]
    InvalidCredentials,
    #[error("no user is logged in")]
    NotLoggedIn,
    #[error("name can't be empty")]
    EmptyName,
    #[error("'{0}' is not a HH:MM time")]
    InvalidTime(String),
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error(transparent)]
    Preferences(#[from] PreferenceError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{InMemoryDataset, Sex, UserSelection};

    const TABLE: &str = "PhoneNumber,User_ID,Sex,VegetablesHEIFAscoreMale,VegetablesHEIFAscoreFemale,WaterHEIFAscoreMale,WaterHEIFAscoreFemale\n\
0400000000,U1,Male,5,3,2,1\n\
0400000001,U2,Female,4,3.5,5,4\n";

    fn session() -> NutriSession<InMemoryDataset> {
        NutriSession::new(InMemoryDataset::new(TABLE), PreferenceStore::in_memory())
    }

    fn vegetables() -> QuestionnaireAnswers {
        QuestionnaireAnswers {
            selection: UserSelection::parse("Vegetables"),
            ..QuestionnaireAnswers::default()
        }
    }

    #[test]
    fn login_rejects_mismatched_phone() {
        let mut session = session();
        let error = session
            .login("U1", "0400000001")
            .expect_err("wrong phone rejected");
        assert!(matches!(error, SessionError::InvalidCredentials));
        assert_eq!(session.current_user(), None);
    }

    #[test]
    fn login_records_sex_from_the_roster() {
        let mut session = session();
        let profile = session.login("U2", "0400000001").expect("login");
        assert_eq!(profile.sex, Some(Sex::Female));
        assert_eq!(session.store().sex(), Some(Sex::Female));
        assert_eq!(session.store().phone_number(), Some("0400000001"));
    }

    #[test]
    fn dashboard_scores_selection_with_stored_sex() {
        let mut session = session();
        session.login("U2", "0400000001").expect("login");
        session
            .save_questionnaire(&vegetables())
            .expect("questionnaire saved");

        let dashboard = session.load_dashboard().expect("dashboard");
        assert_eq!(dashboard.total_score, 3.5);
        assert_eq!(dashboard.band, ScoreBand::NeedsImprovement);
        assert_eq!(session.store().total_score(), Some(3.5));
        assert_eq!(session.history(), vec![3.5]);
    }

    #[test]
    fn dashboard_without_login_scores_zero_and_logs_nothing() {
        let mut session = session();
        let dashboard = session.load_dashboard().expect("dashboard");
        assert_eq!(dashboard.total_score, 0.0);
        assert!(dashboard.user_id.is_none());
        assert!(session.history().is_empty());
    }

    #[test]
    fn insights_cover_every_category_regardless_of_selection() {
        let mut session = session();
        session.login("U1", "0400000000").expect("login");
        session
            .save_questionnaire(&vegetables())
            .expect("questionnaire saved");
        session.load_dashboard().expect("dashboard");

        let insights = session.insights().expect("insights");
        assert_eq!(insights.scores.len(), 12);
        assert_eq!(insights.scores.get("Water"), Some(2.0));
        assert_eq!(insights.total_score, 5.0);

        let report = session.share_report().expect("report");
        assert!(report.contains("Vegetables: 5 / 5"));
        assert!(report.contains("Total Food Quality Score: 5 / 100"));
    }

    #[test]
    fn display_name_requires_login_and_text() {
        let mut session = session();
        assert!(matches!(
            session.set_display_name("Ada"),
            Err(SessionError::NotLoggedIn)
        ));

        session.login("U1", "0400000000").expect("login");
        assert!(matches!(
            session.set_display_name("   "),
            Err(SessionError::EmptyName)
        ));
        session.set_display_name(" Ada ").expect("name stored");
        assert_eq!(session.display_name(), Some("Ada"));
    }

    #[test]
    fn logout_forgets_the_user_but_keeps_answers() {
        let mut session = session();
        session.login("U1", "0400000000").expect("login");
        session
            .save_questionnaire(&vegetables())
            .expect("questionnaire saved");
        session.logout().expect("logout");

        assert_eq!(session.current_user(), None);
        assert!(session.questionnaire().selection.contains("Vegetables"));
        assert!(session.insights().expect("insights").scores.is_empty());
    }
}
