//! Application command definitions sent by `ironlog register`.

use ironlog_core::training::Category;
use serde_json::{Value, json};

/// Option types from the Discord API.
mod option_type {
    pub const STRING: u8 = 3;
    pub const INTEGER: u8 = 4;
}

/// Paragraph-style text input inside a modal.
const TEXT_INPUT: u8 = 4;
const ACTION_ROW: u8 = 1;
const PARAGRAPH: u8 = 2;

pub const DIARY_MODAL_ID: &str = "diary_modal";
pub const DIARY_TEXT_ID: &str = "diary_text";

/// All four slash commands, ready for bulk overwrite.
pub fn command_definitions() -> Value {
    let choices: Vec<Value> = Category::ALL
        .iter()
        .map(|c| json!({ "name": c.label(), "value": c.as_str() }))
        .collect();

    json!([
        {
            "name": "workout_log",
            "description": "筋トレ記録を登録します",
            "options": [
                {
                    "name": "category",
                    "description": "部位カテゴリーを選択してください",
                    "type": option_type::STRING,
                    "required": true,
                    "choices": choices,
                },
                {
                    "name": "exercise",
                    "description": "種目名",
                    "type": option_type::STRING,
                    "required": true,
                },
                {
                    "name": "weight",
                    "description": "重量 (kg)",
                    "type": option_type::INTEGER,
                    "required": true,
                    "min_value": 0,
                },
                {
                    "name": "reps",
                    "description": "回数",
                    "type": option_type::INTEGER,
                    "required": true,
                    "min_value": 1,
                },
            ],
        },
        {
            "name": "workout_history",
            "description": "最近の筋トレ履歴を表示します",
        },
        {
            "name": "workout_recommend",
            "description": "筋トレメニューをAIが提案します",
        },
        {
            "name": "diary",
            "description": "英語日記を書いてAIにフィードバックしてもらいます",
            "options": [
                {
                    "name": DIARY_TEXT_ID,
                    "description": "英語日記の本文（省略するとフォームが開きます）",
                    "type": option_type::STRING,
                    "required": false,
                },
            ],
        },
    ])
}

/// The form shown when `/diary` is invoked without text.
pub fn diary_modal() -> Value {
    json!({
        "custom_id": DIARY_MODAL_ID,
        "title": "英語日記",
        "components": [
            {
                "type": ACTION_ROW,
                "components": [
                    {
                        "type": TEXT_INPUT,
                        "custom_id": DIARY_TEXT_ID,
                        "label": "今日の日記 (English)",
                        "style": PARAGRAPH,
                        "min_length": 1,
                        "max_length": 4000,
                        "required": true,
                    }
                ],
            }
        ],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn four_commands_with_expected_names() {
        let defs = command_definitions();
        let names: Vec<_> = defs
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["workout_log", "workout_history", "workout_recommend", "diary"]);
    }

    #[test]
    fn category_choices_pair_label_and_value() {
        let defs = command_definitions();
        let choices = defs[0]["options"][0]["choices"].as_array().unwrap();
        assert_eq!(choices.len(), 6);
        assert_eq!(choices[0], json!({"name": "胸", "value": "Chest"}));
        assert_eq!(choices[5], json!({"name": "腹筋", "value": "Abs"}));
    }

    #[test]
    fn diary_text_is_optional() {
        let defs = command_definitions();
        assert_eq!(defs[3]["options"][0]["required"], false);
    }

    #[test]
    fn modal_has_paragraph_input() {
        let modal = diary_modal();
        assert_eq!(modal["custom_id"], DIARY_MODAL_ID);
        let input = &modal["components"][0]["components"][0];
        assert_eq!(input["custom_id"], DIARY_TEXT_ID);
        assert_eq!(input["style"], 2);
    }
}
