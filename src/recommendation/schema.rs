use super::prompt::RECOMMENDATION_COUNT;
use serde_json::{Value, json};

/// Field names every recommendation object must carry
pub const RECOMMENDATION_FIELDS: [&str; 7] = [
    "title",
    "artist",
    "genre",
    "mood",
    "reason",
    "detailedDescription",
    "streamingPlatforms",
];

/// Structured output schema in the Gemini `responseSchema` dialect
pub fn response_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "userTasteProfile": {
                "type": "STRING",
                "description": "ユーザーの音楽的好みの要約（2-3文）。日本語で。"
            },
            "recommendations": {
                "type": "ARRAY",
                "minItems": RECOMMENDATION_COUNT,
                "maxItems": RECOMMENDATION_COUNT,
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "title": { "type": "STRING", "description": "曲名" },
                        "artist": { "type": "STRING", "description": "アーティスト名" },
                        "genre": { "type": "STRING", "description": "主要なジャンル（日本語で）" },
                        "mood": {
                            "type": "STRING",
                            "description": "ムードを一言二言で（例：メランコリック、エネルギッシュ）。日本語で。"
                        },
                        "reason": {
                            "type": "STRING",
                            "description": "なぜこの曲がユーザーに選ばれたのかの推薦理由（短め）。日本語で。"
                        },
                        "detailedDescription": {
                            "type": "STRING",
                            "description": "楽曲の詳細な解説（サウンド、歌詞、背景など）。150文字程度。日本語で。"
                        },
                        "streamingPlatforms": {
                            "type": "ARRAY",
                            "items": { "type": "STRING" },
                            "description": "この曲が配信されている主なストリーミングサービス名のリスト"
                        }
                    },
                    "required": RECOMMENDATION_FIELDS
                }
            }
        },
        "required": ["userTasteProfile", "recommendations"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_level_fields_are_required() {
        let schema = response_schema();
        assert_eq!(schema["type"], "OBJECT");
        assert_eq!(
            schema["required"],
            json!(["userTasteProfile", "recommendations"])
        );
    }

    #[test]
    fn test_recommendations_are_pinned_to_five() {
        let schema = response_schema();
        let recommendations = &schema["properties"]["recommendations"];
        assert_eq!(recommendations["minItems"], 5);
        assert_eq!(recommendations["maxItems"], 5);
    }

    #[test]
    fn test_every_item_field_is_declared_and_required() {
        let schema = response_schema();
        let items = &schema["properties"]["recommendations"]["items"];
        let required: Vec<&str> = items["required"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(required, RECOMMENDATION_FIELDS);
        for field in RECOMMENDATION_FIELDS {
            assert!(items["properties"].get(field).is_some(), "{field} missing");
        }
        assert_eq!(items["properties"]["streamingPlatforms"]["items"]["type"], "STRING");
    }
}
