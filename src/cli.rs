use chrono::NaiveTime;
use clap::{Args, Parser, Subcommand};
use nutritrack::config::AppConfig;
use nutritrack::error::AppError;
use nutritrack::profile::{
    parse_clock_time, Persona, PreferenceStore, QuestionnaireAnswers, TIME_FORMAT,
};
use nutritrack::scoring::{FileDataset, FoodCategory, InsightsView, UserSelection};
use nutritrack::session::{Dashboard, Insights, NutriSession, SessionError};
use nutritrack::telemetry;
use std::path::PathBuf;
use tracing::{debug, warn};

#[derive(Parser, Debug)]
#[command(
    name = "nutritrack",
    about = "Log in, answer the food intake questionnaire and check your food quality score",
    version
)]
struct Cli {
    /// Override the configured roster dataset (CSV)
    #[arg(long, global = true)]
    dataset: Option<PathBuf>,
    /// Override the configured preference file
    #[arg(long, global = true)]
    preferences: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the user ids available for login
    Users,
    /// Log in with a user id and the phone number on record
    Login(LoginArgs),
    /// Forget the logged-in user
    Logout,
    /// Record or show food intake questionnaire answers
    Questionnaire(QuestionnaireArgs),
    /// Recompute and record the food quality score
    Score,
    /// Show the per-category score breakdown
    Insights(InsightsArgs),
    /// Print the shareable food quality report
    Report,
    /// List previously recorded scores
    History,
    /// Show or set your display name
    Name(NameArgs),
}

#[derive(Args, Debug)]
struct LoginArgs {
    #[arg(long)]
    user_id: String,
    #[arg(long)]
    phone: String,
}

#[derive(Args, Debug, Default)]
struct QuestionnaireArgs {
    /// Food categories you eat, comma separated (e.g. "Fruits,Vegetables")
    #[arg(long, value_delimiter = ',')]
    categories: Vec<String>,
    /// Persona that best describes you
    #[arg(long, value_parser = parse_persona)]
    persona: Option<Persona>,
    /// Time of your biggest meal (HH:MM)
    #[arg(long, value_parser = parse_time)]
    meal_time: Option<NaiveTime>,
    /// Usual sleep time (HH:MM)
    #[arg(long, value_parser = parse_time)]
    sleep_time: Option<NaiveTime>,
    /// Usual wake up time (HH:MM)
    #[arg(long, value_parser = parse_time)]
    wake_up_time: Option<NaiveTime>,
    /// Print the stored answers without changing them
    #[arg(long)]
    show: bool,
}

impl QuestionnaireArgs {
    fn has_answers(&self) -> bool {
        !self.categories.is_empty()
            || self.persona.is_some()
            || self.meal_time.is_some()
            || self.sleep_time.is_some()
            || self.wake_up_time.is_some()
    }

    /// Answers given on the command line replace the stored ones; the rest stay.
    fn merge_into(self, mut answers: QuestionnaireAnswers) -> QuestionnaireAnswers {
        if !self.categories.is_empty() {
            answers.selection = UserSelection::new(&self.categories);
        }
        answers.persona = self.persona.or(answers.persona);
        answers.meal_time = self.meal_time.or(answers.meal_time);
        answers.sleep_time = self.sleep_time.or(answers.sleep_time);
        answers.wake_up_time = self.wake_up_time.or(answers.wake_up_time);
        answers
    }
}

#[derive(Args, Debug)]
struct InsightsArgs {
    /// Print the breakdown as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
struct NameArgs {
    /// New display name; omit to print the current one
    name: Option<String>,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let mut config = AppConfig::load()?;

    if let Some(path) = cli.dataset {
        config.storage.dataset_path = path;
    }
    if let Some(path) = cli.preferences {
        config.storage.preferences_path = path;
    }

    telemetry::init(&config.telemetry)?;
    debug!(
        environment = ?config.environment,
        dataset = %config.storage.dataset_path.display(),
        preferences = %config.storage.preferences_path.display(),
        "configuration loaded"
    );

    let store = PreferenceStore::open(&config.storage.preferences_path)?;
    let mut session = NutriSession::new(FileDataset::new(&config.storage.dataset_path), store);

    match cli.command {
        Command::Users => {
            for user_id in session.user_ids()? {
                println!("{user_id}");
            }
        }
        Command::Login(args) => {
            let profile = session.login(args.user_id.trim(), args.phone.trim())?;
            println!("Logged in as user {}", profile.user_id);
            if session.display_name().is_none() {
                println!("Tip: set a display name with `nutritrack name <NAME>`");
            }
        }
        Command::Logout => {
            session.logout()?;
            println!("Logged out");
        }
        Command::Questionnaire(args) => run_questionnaire(&mut session, args)?,
        Command::Score => {
            let dashboard = session.load_dashboard()?;
            println!("{}", render_dashboard(&dashboard));
        }
        Command::Insights(args) => {
            let insights = session.insights()?;
            if args.json {
                let view = InsightsView::new(&insights.scores, insights.total_score);
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                println!("{}", render_insights(&insights));
            }
        }
        Command::Report => println!("{}", session.share_report()?),
        Command::History => println!("{}", render_history(&session.history())),
        Command::Name(args) => match args.name {
            Some(name) => {
                session.set_display_name(&name)?;
                println!("Display name saved");
            }
            None => match session.display_name() {
                Some(name) => println!("{name}"),
                None => println!("No display name set"),
            },
        },
    }

    Ok(())
}

fn run_questionnaire(
    session: &mut NutriSession<FileDataset>,
    args: QuestionnaireArgs,
) -> Result<(), AppError> {
    if args.show || !args.has_answers() {
        println!("{}", render_questionnaire(&session.questionnaire()));
        return Ok(());
    }

    for name in &args.categories {
        if FoodCategory::from_label(name).is_none() {
            warn!(category = %name, "category is not part of the questionnaire and will not be scored");
        }
    }

    let answers = args.merge_into(session.questionnaire());
    session.save_questionnaire(&answers)?;
    println!("{}", render_questionnaire(&answers));
    Ok(())
}

fn parse_persona(raw: &str) -> Result<Persona, String> {
    Persona::from_label(raw).ok_or_else(|| {
        let known: Vec<&str> = Persona::ordered().iter().map(|p| p.label()).collect();
        format!("unknown persona '{raw}' (expected one of: {})", known.join(", "))
    })
}

fn parse_time(raw: &str) -> Result<NaiveTime, SessionError> {
    parse_clock_time(raw).ok_or_else(|| SessionError::InvalidTime(raw.to_string()))
}

fn render_dashboard(dashboard: &Dashboard) -> String {
    let greeting = match (&dashboard.display_name, &dashboard.user_id) {
        (Some(name), _) => format!("Hello, {name}!"),
        (None, Some(user_id)) => format!("Hello, user {user_id}!"),
        (None, None) => "Not logged in; run `nutritrack login` first.".to_string(),
    };

    format!(
        "{greeting}\nFood Quality Score: {}/100 ({})",
        dashboard.total_score,
        dashboard.band.label()
    )
}

fn render_insights(insights: &Insights) -> String {
    let mut lines = vec!["Insights: Food Score".to_string()];
    if insights.scores.is_empty() {
        lines.push("No breakdown available for this user".to_string());
    }
    for entry in insights.scores.iter() {
        lines.push(format!(
            "- {}: {}/{}",
            entry.category, entry.score, entry.max
        ));
    }
    lines.push(format!(
        "Total Food Quality Score: {}/100",
        insights.total_score
    ));
    lines.join("\n")
}

fn render_history(scores: &[f32]) -> String {
    if scores.is_empty() {
        return "No scores recorded yet".to_string();
    }

    scores
        .iter()
        .enumerate()
        .map(|(index, score)| format!("Score {}: {}", index + 1, score))
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_questionnaire(answers: &QuestionnaireAnswers) -> String {
    let time = |value: Option<NaiveTime>| match value {
        Some(time) => time.format(TIME_FORMAT).to_string(),
        None => "not set".to_string(),
    };
    let categories = if answers.selection.is_empty() {
        "none".to_string()
    } else {
        answers.selection.names().collect::<Vec<_>>().join(", ")
    };
    let persona = answers
        .persona
        .map(Persona::label)
        .unwrap_or("not set");

    format!(
        "Food categories: {categories}\nPersona: {persona}\nBiggest meal time: {}\nSleep time: {}\nWake up time: {}",
        time(answers.meal_time),
        time(answers.sleep_time),
        time(answers.wake_up_time)
    )
}
