use serde::{Deserialize, Serialize};
use std::fmt;

/// A seed song typed in by the user. Either field may still be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SongRef {
    pub title: String,
    pub artist: String,
}

impl SongRef {
    pub fn new(title: impl Into<String>, artist: impl Into<String>) -> Self {
        SongRef {
            title: title.into(),
            artist: artist.into(),
        }
    }

    /// Both title and artist are non-empty after trimming
    pub fn is_filled(&self) -> bool {
        !self.title.trim().is_empty() && !self.artist.trim().is_empty()
    }
}

/// Per-card user signal
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Feedback {
    #[default]
    None,
    Like,
    Skip,
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Feedback::None => write!(f, "none"),
            Feedback::Like => write!(f, "like"),
            Feedback::Skip => write!(f, "skip"),
        }
    }
}

/// A recommendation as it lives inside a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendedSong {
    pub id: String,
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub mood: String,
    pub reason: String,
    pub detailed_description: String,
    pub streaming_platforms: Vec<String>,
    pub feedback: Feedback,
}

impl RecommendedSong {
    /// Stamp a freshly generated record with its id and a cleared feedback
    pub fn from_generated(generated: GeneratedSong, id: String) -> Self {
        RecommendedSong {
            id,
            title: generated.title,
            artist: generated.artist,
            genre: generated.genre,
            mood: generated.mood,
            reason: generated.reason,
            detailed_description: generated.detailed_description,
            streaming_platforms: generated.streaming_platforms,
            feedback: Feedback::None,
        }
    }
}

/// One generation's output as held by the session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationResult {
    pub taste_profile: String,
    pub recommendations: Vec<RecommendedSong>,
}

/// Response body the generation service is bound to return
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedResponse {
    #[serde(rename = "userTasteProfile")]
    pub user_taste_profile: String,
    pub recommendations: Vec<GeneratedSong>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedSong {
    pub title: String,
    pub artist: String,
    pub genre: String,
    pub mood: String,
    pub reason: String,
    #[serde(rename = "detailedDescription")]
    pub detailed_description: String,
    #[serde(rename = "streamingPlatforms")]
    pub streaming_platforms: Vec<String>,
}

/// Request body for the Gemini generateContent call
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    pub system_instruction: Content,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    pub response_mime_type: String,
    #[serde(rename = "responseSchema")]
    pub response_schema: serde_json::Value,
}

/// Response structure for generateContent
#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<Content>,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if it has any
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|part| part.text.as_deref())
            .collect();
        if text.is_empty() { None } else { Some(text) }
    }
}

/// Which catalog entity an autocomplete lookup targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    Song,
    Artist,
}

impl SearchKind {
    /// iTunes `entity` parameter
    pub fn entity(&self) -> &'static str {
        match self {
            SearchKind::Song => "song",
            SearchKind::Artist => "musicArtist",
        }
    }
}

/// One autocomplete suggestion. Songs carry the artist as `secondary`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub primary: String,
    pub secondary: Option<String>,
}

/// Response structure for the iTunes Search API
#[derive(Debug, Deserialize)]
pub struct CatalogSearchResponse {
    #[serde(default)]
    pub results: Vec<CatalogItem>,
}

#[derive(Debug, Deserialize)]
pub struct CatalogItem {
    #[serde(rename = "trackName")]
    pub track_name: Option<String>,
    #[serde(rename = "artistName")]
    pub artist_name: Option<String>,
}
