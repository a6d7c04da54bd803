#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::error::GenerationError;
    use crate::fixtures::{recommended, response_json, valid_response};
    use crate::models::{Feedback, SongRef};
    use std::collections::HashSet;

    fn seeds() -> Vec<SongRef> {
        vec![SongRef::new("群青", "YOASOBI")]
    }

    #[test]
    fn test_generate_returns_five_fresh_cards() {
        let mut service = MockGenerationService::new();
        service
            .expect_generate_structured()
            .times(1)
            .returning(|_, _, _| Ok(valid_response()));

        let client = RecommendationClient::new(service);
        let result = client.generate(&seeds(), &[], &[], None).unwrap();

        assert_eq!(result.recommendations.len(), 5);
        assert!(!result.taste_profile.is_empty());
        assert!(
            result
                .recommendations
                .iter()
                .all(|r| r.feedback == Feedback::None)
        );
        let ids: HashSet<_> = result.recommendations.iter().map(|r| &r.id).collect();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn test_generate_sends_prompt_schema_and_system_instruction() {
        let mut service = MockGenerationService::new();
        service
            .expect_generate_structured()
            .withf(|prompt, schema, system| {
                prompt.contains("\"群青\" by YOASOBI")
                    && prompt.contains(AVOID_SEED_ARTISTS)
                    && *schema == response_schema()
                    && system == SYSTEM_INSTRUCTION
            })
            .times(1)
            .returning(|_, _, _| Ok(valid_response()));

        let client = RecommendationClient::new(service);
        assert!(client.generate(&seeds(), &[], &[], None).is_ok());
    }

    #[test]
    fn test_generate_passes_history_into_prompt() {
        let liked = vec![recommended("Pretender", "Official髭男dism", Feedback::Like)];
        let skipped = vec![recommended("Lemon", "米津玄師", Feedback::Skip)];

        let mut service = MockGenerationService::new();
        service
            .expect_generate_structured()
            .withf(|prompt, _, _| {
                prompt.contains(LIKED_HEADER)
                    && prompt.contains("Pretender")
                    && prompt.contains(SKIPPED_HEADER)
                    && prompt.contains("Lemon")
            })
            .times(1)
            .returning(|_, _, _| Ok(valid_response()));

        let client = RecommendationClient::new(service);
        assert!(client.generate(&seeds(), &liked, &skipped, None).is_ok());
    }

    #[test]
    fn test_service_failure_is_returned() {
        let mut service = MockGenerationService::new();
        service
            .expect_generate_structured()
            .returning(|_, _, _| Err(GenerationError::MissingApiKey));

        let client = RecommendationClient::new(service);
        let err = client.generate(&seeds(), &[], &[], None).unwrap_err();
        assert!(matches!(err, GenerationError::MissingApiKey));
    }

    #[test]
    fn test_parse_rejects_empty_text() {
        assert!(matches!(
            parse_response("   "),
            Err(GenerationError::EmptyResponse)
        ));
    }

    #[test]
    fn test_parse_rejects_malformed_json() {
        assert!(matches!(
            parse_response("{\"userTasteProfile\": "),
            Err(GenerationError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        let raw = r#"{"userTasteProfile":"x","recommendations":[{"title":"a","artist":"b"}]}"#;
        assert!(matches!(parse_response(raw), Err(GenerationError::Schema(_))));
    }

    #[test]
    fn test_parse_rejects_wrong_count() {
        assert!(matches!(
            parse_response(&response_json(4)),
            Err(GenerationError::Schema(_))
        ));
        assert!(matches!(
            parse_response(&response_json(6)),
            Err(GenerationError::Schema(_))
        ));
    }

    #[test]
    fn test_parse_accepts_fenced_json() {
        let fenced = format!("```json\n{}\n```", valid_response());
        let result = parse_response(&fenced).unwrap();
        assert_eq!(result.recommendations.len(), 5);
    }

    #[test]
    fn test_parse_keeps_service_order_and_fields() {
        let result = parse_response(&valid_response()).unwrap();
        let titles: Vec<_> = result
            .recommendations
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(titles, ["Song 1", "Song 2", "Song 3", "Song 4", "Song 5"]);
        assert_eq!(
            result.recommendations[0].streaming_platforms,
            ["Spotify", "Apple Music"]
        );
    }

    #[test]
    fn test_recommendation_ids_are_lowercase_alphanumeric() {
        let id = new_recommendation_id();
        assert_eq!(id.len(), 13);
        assert!(
            id.chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        );
    }
}
