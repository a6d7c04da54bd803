use super::prompt::{PromptInput, RECOMMENDATION_COUNT, SYSTEM_INSTRUCTION, build_prompt};
use super::schema::response_schema;
use crate::error::GenerationError;
use crate::models::{GeneratedResponse, RecommendationResult, RecommendedSong, SongRef};
use rand::{Rng, distributions::Alphanumeric};
use serde_json::Value;
use tracing::{debug, info, warn};

/// A structured-text generation capability: prompt and schema in, JSON text out
#[cfg_attr(test, mockall::automock)]
pub trait GenerationService {
    fn generate_structured(
        &self,
        prompt: &str,
        schema: &Value,
        system_instruction: &str,
    ) -> Result<String, GenerationError>;
}

/// Fresh identifier for a recommendation card
pub fn new_recommendation_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(13)
        .map(|c| char::from(c).to_ascii_lowercase())
        .collect()
}

/// Turns seed songs and feedback history into typed recommendations
pub struct RecommendationClient<S> {
    service: S,
}

impl<S: GenerationService> RecommendationClient<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }

    /// Ask the service for a new set of recommendations
    pub fn generate(
        &self,
        seeds: &[SongRef],
        liked: &[RecommendedSong],
        skipped: &[RecommendedSong],
        target_artist: Option<&str>,
    ) -> Result<RecommendationResult, GenerationError> {
        let input = PromptInput {
            seeds,
            liked,
            skipped,
            target_artist,
        };
        let prompt = build_prompt(&input);
        debug!(
            seeds = seeds.len(),
            liked = liked.len(),
            skipped = skipped.len(),
            target_artist = input.target_artist().unwrap_or(""),
            "requesting recommendations"
        );

        let result = self
            .service
            .generate_structured(&prompt, &response_schema(), SYSTEM_INSTRUCTION)
            .and_then(|text| parse_response(&text));

        match &result {
            Ok(parsed) => info!(
                count = parsed.recommendations.len(),
                "received recommendations"
            ),
            Err(e) => warn!(error = %e, "error fetching recommendations"),
        }
        result
    }
}

/// Drop a surrounding Markdown code fence, if the model added one
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(body) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // Skip a language tag such as `json` on the opening line
    match body.find('\n') {
        Some(newline) => body[newline + 1..].trim(),
        None => body.trim(),
    }
}

/// Parse and validate raw service text. All-or-nothing: any defect rejects the whole response.
pub fn parse_response(text: &str) -> Result<RecommendationResult, GenerationError> {
    let json_text = strip_code_fence(text);
    if json_text.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }

    let parsed: GeneratedResponse = serde_json::from_str(json_text).map_err(|e| {
        if e.is_data() {
            GenerationError::Schema(e.to_string())
        } else {
            GenerationError::Malformed(e)
        }
    })?;

    if parsed.recommendations.len() != RECOMMENDATION_COUNT {
        return Err(GenerationError::Schema(format!(
            "expected {RECOMMENDATION_COUNT} recommendations, got {}",
            parsed.recommendations.len()
        )));
    }

    Ok(RecommendationResult {
        taste_profile: parsed.user_taste_profile,
        recommendations: parsed
            .recommendations
            .into_iter()
            .map(|song| RecommendedSong::from_generated(song, new_recommendation_id()))
            .collect(),
    })
}
