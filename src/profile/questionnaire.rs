use super::preferences::{PreferenceStore, TIME_FORMAT};
use crate::scoring::UserSelection;
use chrono::NaiveTime;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Eating-behaviour profiles offered by the intake questionnaire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    HealthDevotee,
    MindfulEater,
    WellnessStriver,
    BalanceSeeker,
    HealthProcrastinator,
    FoodCarefree,
}

impl Persona {
    pub const fn ordered() -> [Self; 6] {
        [
            Self::HealthDevotee,
            Self::MindfulEater,
            Self::WellnessStriver,
            Self::BalanceSeeker,
            Self::HealthProcrastinator,
            Self::FoodCarefree,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::HealthDevotee => "Health Devotee",
            Self::MindfulEater => "Mindful Eater",
            Self::WellnessStriver => "Wellness Striver",
            Self::BalanceSeeker => "Balance Seeker",
            Self::HealthProcrastinator => "Health Procrastinator",
            Self::FoodCarefree => "Food Carefree",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            Self::HealthDevotee => {
                "I'm passionate about healthy eating & health plays a big part in my life. \
I use social media to follow active lifestyle personalities or get new recipes/exercise ideas. \
I may even buy superfoods or follow a particular type of diet. I like to think I am super healthy."
            }
            Self::MindfulEater => {
                "I'm health-conscious and being healthy and eating healthy is important to me. \
Although health means different things to different people, I make conscious lifestyle decisions \
about eating based on what I believe healthy means. I look for new recipes and healthy eating \
information on social media."
            }
            Self::WellnessStriver => {
                "I aspire to be healthy (but struggle sometimes). Healthy eating is hard work! \
I've tried to improve my diet, but always find things that make it difficult to stick with the \
changes. Sometimes I notice recipe ideas or healthy eating hacks, and if it seems easy enough, \
I'll give it a go."
            }
            Self::BalanceSeeker => {
                "I try and live a balanced lifestyle, and I think that all foods are okay in \
moderation. I shouldn't have to feel guilty about eating a piece of cake now and again. I get all \
sorts of inspiration from social media like finding out about new restaurants, fun recipes and \
sometimes healthy eating tips."
            }
            Self::HealthProcrastinator => {
                "I'm contemplating healthy eating but it's not a priority for me right now. \
I know the basics about what it means to be healthy, but it doesn't seem relevant to me right \
now. I have taken a few steps to be healthier but I am not motivated to make it a high priority \
because I have too many other things going on in my life."
            }
            Self::FoodCarefree => {
                "I'm not bothered about healthy eating. I don't really see the point and I don't \
think about it. I don't really notice healthy eating tips or recipes and I don't care what I eat."
            }
        }
    }

    pub fn from_label(value: &str) -> Option<Self> {
        let wanted = value.trim();
        Self::ordered()
            .into_iter()
            .find(|persona| persona.label().eq_ignore_ascii_case(wanted))
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Parses a 24-hour `HH:MM` clock time.
pub fn parse_clock_time(raw: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(raw.trim(), TIME_FORMAT).ok()
}

/// Everything the food-intake questionnaire records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QuestionnaireAnswers {
    pub selection: UserSelection,
    pub persona: Option<Persona>,
    pub meal_time: Option<NaiveTime>,
    pub sleep_time: Option<NaiveTime>,
    pub wake_up_time: Option<NaiveTime>,
}

impl QuestionnaireAnswers {
    pub fn load(store: &PreferenceStore) -> Self {
        Self {
            selection: store.selection(),
            persona: store.persona(),
            meal_time: store.meal_time(),
            sleep_time: store.sleep_time(),
            wake_up_time: store.wake_up_time(),
        }
    }

    /// Overwrites every questionnaire key; unset answers are cleared.
    pub fn apply(&self, store: &mut PreferenceStore) {
        store.set_selection(&self.selection);
        store.set_persona(self.persona);
        store.set_meal_time(self.meal_time);
        store.set_sleep_time(self.sleep_time);
        store.set_wake_up_time(self.wake_up_time);

        debug!(
            categories = %self.selection.joined(),
            persona = self.persona.map(Persona::label),
            "questionnaire answers stored"
        );
    }
}
