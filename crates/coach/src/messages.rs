//! Fixed user-facing strings.

use ironlog_core::interaction::Room;
use ironlog_core::training::{Category, NewLogEntry};

pub const GENERIC_ERROR: &str = "エラーが発生しました。";
pub const NO_HISTORY: &str = "まだ記録がありません。";
pub const NO_HISTORY_FOR_RECOMMENDATION: &str = "まだ記録がないので、まずは記録してください！";
pub const HISTORY_HEADER: &str = "最近の記録:\n";
pub const UNKNOWN_DATE: &str = "日付不明";
pub const UNKNOWN_CATEGORY: &str = "不明";
pub const RECOMMENDATION_PREFIX: &str = "💡 今日のおすすめメニュー:\n";

/// Private notice for a command issued outside its channel.
pub fn rejection_notice(room: Room) -> String {
    let name = match room {
        Room::Workout => "筋トレ",
        Room::Diary => "日記",
    };
    format!("このコマンドは指定の{name}チャンネルでのみ利用できます。")
}

/// Confirmation for a stored training entry, using the Japanese label.
pub fn logged(entry: &NewLogEntry) -> String {
    format!(
        "{} - {} {}kg x {}回 記録しました！",
        entry.category.label(),
        entry.exercise,
        entry.weight,
        entry.reps
    )
}

/// One history line; placeholders stand in for missing fields.
pub fn history_line(
    date: Option<String>,
    category: Option<Category>,
    exercise: &str,
    weight: i64,
    reps: i64,
) -> String {
    crate::recency::format_line(
        date.as_deref().unwrap_or(UNKNOWN_DATE),
        category.map_or(UNKNOWN_CATEGORY, |c| c.as_str()),
        exercise,
        weight,
        reps,
    )
}
