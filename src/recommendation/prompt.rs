use crate::models::{RecommendedSong, SongRef};

/// Number of songs the service must return per generation
pub const RECOMMENDATION_COUNT: usize = 5;

pub const SYSTEM_INSTRUCTION: &str = "あなたは、インディーからメジャーまで幅広い知識を持つプロの音楽キュレーターです。\
提案は高品質で、よく考えられたものにしてください。すべての出力は日本語で行ってください。";

pub const TARGET_ARTIST_HEADER: &str = "【重要】";
pub const AVOID_SEED_ARTISTS: &str = "入力された曲と同じアーティストの曲は避けてください";
pub const FEEDBACK_HEADER: &str = "過去の提案に対するフィードバックがあります";
pub const LIKED_HEADER: &str = "【気に入った曲（これらに似た曲を提案してください）】";
pub const SKIPPED_HEADER: &str = "【スキップした曲（これらに似た曲は避けてください）】";

/// Everything the prompt is built from
#[derive(Debug, Clone, Copy)]
pub struct PromptInput<'a> {
    pub seeds: &'a [SongRef],
    pub liked: &'a [RecommendedSong],
    pub skipped: &'a [RecommendedSong],
    pub target_artist: Option<&'a str>,
}

impl<'a> PromptInput<'a> {
    /// Target artist with surrounding whitespace removed, if any is left
    pub fn target_artist(&self) -> Option<&'a str> {
        self.target_artist
            .map(str::trim)
            .filter(|artist| !artist.is_empty())
    }
}

/// Format songs as `"title" by artist`, comma separated
fn describe_songs<'s>(songs: impl Iterator<Item = (&'s str, &'s str)>) -> String {
    songs
        .map(|(title, artist)| format!("\"{}\" by {}", title.trim(), artist.trim()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Distinct seed artists in first-seen order
fn seed_artists(seeds: &[SongRef]) -> Vec<&str> {
    let mut artists: Vec<&str> = Vec::new();
    for seed in seeds {
        let artist = seed.artist.trim();
        if !artist.is_empty() && !artists.contains(&artist) {
            artists.push(artist);
        }
    }
    artists
}

/// Build the natural-language instruction for one generation
pub fn build_prompt(input: &PromptInput<'_>) -> String {
    let seed_list = describe_songs(
        input
            .seeds
            .iter()
            .map(|s| (s.title.as_str(), s.artist.as_str())),
    );

    let mut prompt = format!(
        "私は以下の曲が大好きです: {seed_list}。\n\n\
         これらの曲の音楽的要素（ジャンル、テンポ、ムード、楽器構成）を分析し、私の好みを理解してください。\n\
         その分析に基づき、まだリストにない、雰囲気が合う{RECOMMENDATION_COUNT}曲を推薦してください。\n"
    );

    match input.target_artist() {
        Some(artist) => {
            prompt.push_str(&format!(
                "\n{TARGET_ARTIST_HEADER}: 推薦する{RECOMMENDATION_COUNT}曲は、すべてアーティスト「{artist}」の楽曲に限定してください。\
                 入力された好みの曲の雰囲気に近い、このアーティストの名曲や隠れた名曲（B面やアルバム曲など含む）を選んでください。\n"
            ));
        }
        None => {
            prompt.push_str(&format!(
                "{AVOID_SEED_ARTISTS}（対象: {}）。新しいアーティストとの出会いを求めています。\n",
                seed_artists(input.seeds).join(", ")
            ));
        }
    }

    if !input.liked.is_empty() || !input.skipped.is_empty() {
        prompt.push_str(&format!("\n{FEEDBACK_HEADER}:\n"));

        if !input.liked.is_empty() {
            let liked = describe_songs(
                input
                    .liked
                    .iter()
                    .map(|s| (s.title.as_str(), s.artist.as_str())),
            );
            prompt.push_str(&format!("{LIKED_HEADER}: {liked}\n"));
        }

        if !input.skipped.is_empty() {
            let skipped = describe_songs(
                input
                    .skipped
                    .iter()
                    .map(|s| (s.title.as_str(), s.artist.as_str())),
            );
            prompt.push_str(&format!("{SKIPPED_HEADER}: {skipped}\n"));
        }
    }

    prompt.push_str(&format!(
        "\n私の好みの分析（「userTasteProfile」、2〜3文）と、ちょうど{RECOMMENDATION_COUNT}曲の推薦について、\
         各曲の曲名、アーティスト名、ジャンル、ムードに加えて以下の情報を日本語で提供してください：\n\
         1. なぜそれが私に合うのか具体的な理由（「reason」）\n\
         2. 楽曲の深掘りした詳細な解説（「detailedDescription」）。歌詞のテーマやサウンドの特徴、聴きどころなどを含めて150文字程度で。\n\
         3. その曲が配信されている主要なストリーミングサービス（「streamingPlatforms」）。\
         例: Spotify, Apple Music, YouTube Music, Amazon Music, LINE MUSIC など。\n"
    ));

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::recommended;
    use crate::models::Feedback;

    #[test]
    fn test_seed_songs_are_quoted_with_artist() {
        let seeds = vec![
            SongRef::new(" 群青 ", "YOASOBI"),
            SongRef::new("恋", "星野源"),
        ];
        let prompt = build_prompt(&PromptInput {
            seeds: &seeds,
            liked: &[],
            skipped: &[],
            target_artist: None,
        });
        assert!(prompt.contains("\"群青\" by YOASOBI, \"恋\" by 星野源"));
        assert!(prompt.contains("5曲を推薦"));
    }

    #[test]
    fn test_without_target_artist_avoids_seed_artists() {
        let seeds = vec![SongRef::new("群青", "YOASOBI"), SongRef::new("夜に駆ける", "YOASOBI")];
        let prompt = build_prompt(&PromptInput {
            seeds: &seeds,
            liked: &[],
            skipped: &[],
            target_artist: None,
        });
        assert!(prompt.contains(AVOID_SEED_ARTISTS));
        assert!(prompt.contains("（対象: YOASOBI）"));
        assert!(!prompt.contains(TARGET_ARTIST_HEADER));
    }

    #[test]
    fn test_target_artist_replaces_avoid_rule() {
        let seeds = vec![SongRef::new("群青", "YOASOBI")];
        let prompt = build_prompt(&PromptInput {
            seeds: &seeds,
            liked: &[],
            skipped: &[],
            target_artist: Some("星野源"),
        });
        assert!(prompt.contains("アーティスト「星野源」の楽曲に限定"));
        assert!(prompt.contains("B面"));
        assert!(!prompt.contains(AVOID_SEED_ARTISTS));
    }

    #[test]
    fn test_blank_target_artist_is_ignored() {
        let seeds = vec![SongRef::new("群青", "YOASOBI")];
        let prompt = build_prompt(&PromptInput {
            seeds: &seeds,
            liked: &[],
            skipped: &[],
            target_artist: Some("   "),
        });
        assert!(prompt.contains(AVOID_SEED_ARTISTS));
        assert!(!prompt.contains(TARGET_ARTIST_HEADER));
    }

    #[test]
    fn test_feedback_sections_only_when_present() {
        let seeds = vec![SongRef::new("群青", "YOASOBI")];
        let liked = vec![recommended("Pretender", "Official髭男dism", Feedback::Like)];
        let skipped = vec![recommended("Lemon", "米津玄師", Feedback::Skip)];

        let none = build_prompt(&PromptInput {
            seeds: &seeds,
            liked: &[],
            skipped: &[],
            target_artist: None,
        });
        assert!(!none.contains(FEEDBACK_HEADER));

        let only_liked = build_prompt(&PromptInput {
            seeds: &seeds,
            liked: &liked,
            skipped: &[],
            target_artist: None,
        });
        assert!(only_liked.contains(&format!("{LIKED_HEADER}: \"Pretender\" by Official髭男dism")));
        assert!(!only_liked.contains(SKIPPED_HEADER));

        let both = build_prompt(&PromptInput {
            seeds: &seeds,
            liked: &liked,
            skipped: &skipped,
            target_artist: None,
        });
        assert!(both.contains(FEEDBACK_HEADER));
        assert!(both.contains(&format!("{SKIPPED_HEADER}: \"Lemon\" by 米津玄師")));
    }

    #[test]
    fn test_repeated_likes_are_listed_twice() {
        let seeds = vec![SongRef::new("群青", "YOASOBI")];
        let liked = vec![
            recommended("Pretender", "Official髭男dism", Feedback::Like),
            recommended("Pretender", "Official髭男dism", Feedback::Like),
        ];
        let prompt = build_prompt(&PromptInput {
            seeds: &seeds,
            liked: &liked,
            skipped: &[],
            target_artist: None,
        });
        assert_eq!(prompt.matches("\"Pretender\" by Official髭男dism").count(), 2);
    }
}
