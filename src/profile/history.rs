use super::preferences::PreferenceStore;
use tracing::debug;

/// Appends `score` to the logged-in user's comma-joined history. Returns
/// `false` without touching the store when nobody is logged in.
pub fn append_score(store: &mut PreferenceStore, score: f32) -> bool {
    let Some(user_id) = store.user_id().map(str::to_string) else {
        return false;
    };

    let updated = match store.history_log(&user_id) {
        Some(existing) if !existing.is_empty() => format!("{existing},{score}"),
        _ => score.to_string(),
    };
    store.set_history_log(&user_id, updated);

    debug!(user_id, score, "score appended to history");
    true
}

/// Logged-in user's past scores, oldest first. Unreadable entries are dropped.
pub fn score_history(store: &PreferenceStore) -> Vec<f32> {
    store
        .user_id()
        .and_then(|user_id| store.history_log(user_id))
        .map(parse_log)
        .unwrap_or_default()
}

fn parse_log(log: &str) -> Vec<f32> {
    log.split(',')
        .filter_map(|entry| entry.trim().parse::<f32>().ok())
        .collect()
}
