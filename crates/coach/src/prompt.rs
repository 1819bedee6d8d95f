//! Prompt composition.
//!
//! Both builders are pure: identical inputs give byte-identical prompts.

use ironlog_core::training::Category;

/// System persona for workout recommendations.
pub const TRAINER_PERSONA: &str = "あなたは筋トレ専門のAIトレーナーです。";
pub const TRAINER_TEMPERATURE: f32 = 0.7;

/// System persona for diary feedback.
pub const COACH_PERSONA: &str = "あなたはプロの英語学習AIコーチです。";
pub const COACH_TEMPERATURE: f32 = 0.5;

/// Stands in for the digest when nothing was logged in the trailing window.
pub const NO_RECENT_TRAINING: &str = "直近3日間にトレーニング記録はありません。";

/// Build the recommendation prompt.
pub fn workout_prompt(recent_lines: &[String], least_trained: Option<Category>) -> String {
    let summary = if recent_lines.is_empty() {
        NO_RECENT_TRAINING.to_string()
    } else {
        recent_lines.join("\n")
    };

    let mut prompt = format!("以下は直近3日間のトレーニング記録です：\n{summary}\n\n");
    if let Some(category) = least_trained {
        prompt.push_str(&format!(
            "最も長くトレーニングしていない部位は {category} です。\n\n"
        ));
    }
    prompt.push_str(
        "筋肉のバランス、疲労を考慮して今日のダンベルトレーニングメニューを提案してください。\n",
    );
    prompt
}

/// Build the diary feedback prompt asking for the four-field JSON object.
pub fn diary_prompt(diary_text: &str) -> String {
    format!(
        r#"以下はユーザーが書いた英語日記です：

"{diary_text}"

あなたは英語学習のAIコーチです。
以下のJSON形式で出力してください。

{{
  "grammar": "...文法ミスや不自然な表現...",
  "rephrase": "...より自然な言い換え...",
  "useful_phrases": "...便利な表現やフレーズ...",
  "advice": "...簡単なアドバイス..."
}}

すべて日本語で出力してください。
余計な説明や前置きは不要です。JSONのみ返答してください。
"#
    )
}
