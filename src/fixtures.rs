// Shared builders for tests

use crate::models::{Feedback, RecommendedSong};
use serde_json::json;

/// A generation response body with `count` recommendations
pub fn response_json(count: usize) -> String {
    let recommendations: Vec<_> = (1..=count)
        .map(|i| {
            json!({
                "title": format!("Song {i}"),
                "artist": format!("Artist {i}"),
                "genre": "J-Pop",
                "mood": "エネルギッシュ",
                "reason": "テンポとボーカルの質感が近い",
                "detailedDescription": "疾走感のあるビートと透明感のある歌声が印象的な一曲。",
                "streamingPlatforms": ["Spotify", "Apple Music"]
            })
        })
        .collect();
    json!({
        "userTasteProfile": "疾走感のあるJ-Popを好む傾向があります。",
        "recommendations": recommendations
    })
    .to_string()
}

/// A valid five-song response body
pub fn valid_response() -> String {
    response_json(5)
}

pub fn recommended(title: &str, artist: &str, feedback: Feedback) -> RecommendedSong {
    RecommendedSong {
        id: format!("{title}/{artist}"),
        title: title.to_string(),
        artist: artist.to_string(),
        genre: "J-Pop".to_string(),
        mood: "明るい".to_string(),
        reason: "reason".to_string(),
        detailed_description: "description".to_string(),
        streaming_platforms: vec!["Spotify".to_string()],
        feedback,
    }
}
