use crate::models::{Feedback, RecommendedSong, Suggestion};
use crate::session::{MAX_SEED_ROWS, SessionObserver, TasteSession, ViewPhase};
use urlencoding::encode;

/// Redraws the current phase on stdout whenever the session changes
pub struct TerminalView;

impl SessionObserver for TerminalView {
    fn session_changed(&self, session: &TasteSession) {
        println!("\n{}", render(session));
    }
}

/// Text for whichever phase the session is in
pub fn render(session: &TasteSession) -> String {
    match session.phase() {
        ViewPhase::Input => render_input(session),
        ViewPhase::Loading => render_loading(session),
        ViewPhase::Results => render_results(session),
        ViewPhase::Error => render_error(session),
    }
}

fn render_input(session: &TasteSession) -> String {
    let mut out = format!(
        "=== 最近のお気に入りは？ ({}/{}曲) ===\n",
        session.seed_songs().len(),
        MAX_SEED_ROWS
    );
    for (i, song) in session.seed_songs().iter().enumerate() {
        let title = if song.title.trim().is_empty() { "(曲名)" } else { song.title.as_str() };
        let artist = if song.artist.trim().is_empty() { "(アーティスト)" } else { song.artist.as_str() };
        out.push_str(&format!("  {}. {} / {}\n", i + 1, title, artist));
    }

    match session.target_artist() {
        Some(artist) => out.push_str(&format!("特定のアーティストから探す: {artist}\n")),
        None => out.push_str("特定のアーティストから探す: (空欄なら全アーティストから提案)\n"),
    }

    if let Some(message) = session.message() {
        out.push_str(&format!("! {message}\n"));
    }

    let action = match session.target_artist() {
        Some(artist) => format!("{artist}の曲を発見"),
        None => "新しい音楽を発見".to_string(),
    };
    out.push_str(&format!("`submit` で{action}"));
    out
}

fn render_loading(session: &TasteSession) -> String {
    let detail = match session.target_artist() {
        Some(artist) => format!("お気に入りの傾向から、{artist}の最適な楽曲を選出しています。"),
        None => "ジャンルを解体し、テンポを検出し、あなたのための完璧なプレイリストを合成しています。"
            .to_string(),
    };
    format!("バイブスを分析中...\n{detail}")
}

fn feedback_marker(feedback: Feedback) -> &'static str {
    match feedback {
        Feedback::None => "",
        Feedback::Like => " [♥ いいね]",
        Feedback::Skip => " [× 興味なし]",
    }
}

fn render_results(session: &TasteSession) -> String {
    let Some(result) = session.current_result() else {
        return String::new();
    };

    let mut out = String::from("=== あなたのサウンド・プロフィール ===\n");
    out.push_str(&format!("{}\n", result.taste_profile));
    let seeds: Vec<String> = session
        .active_seeds()
        .iter()
        .map(|song| format!("{} / {}", song.title, song.artist))
        .collect();
    out.push_str(&format!("入力: {}\n", seeds.join(", ")));
    if let Some(artist) = session.target_artist() {
        out.push_str(&format!("フィルター適用中: {artist}\n"));
    }

    out.push_str(&format!(
        "\n=== ベストマッチ・ランキング (Generation #{}) ===\n",
        session.generation_count()
    ));
    for (i, song) in result.recommendations.iter().enumerate() {
        out.push_str(&format!(
            "  #{} \"{}\" by {} [{} / {}]{}\n",
            i + 1,
            song.title,
            song.artist,
            song.genre,
            song.mood,
            feedback_marker(song.feedback)
        ));
        out.push_str(&format!("     {}\n", song.reason));
    }

    let liked = session.liked_history();
    if !liked.is_empty() {
        out.push_str(&format!("\nコレクション ({})\n", liked.len()));
        for song in liked {
            out.push_str(&format!("  - {} / {}\n", song.title, song.artist));
        }
    }

    out.push_str("\n`like <n>` / `skip <n>` で評価、`refine` でフィードバックを反映して更新、`reset` で最初から");
    out
}

fn render_error(session: &TasteSession) -> String {
    format!(
        "=== エラーが発生しました ===\n{}\n`retry` でもう一度試す",
        session
            .message()
            .unwrap_or("音楽の神様との接続に失敗しました。")
    )
}

/// Search page for a song on a named streaming service, or a web search when the service is unknown
pub fn platform_search_url(service: &str, song: &RecommendedSong) -> String {
    let query = encode(&format!("{} {}", song.title, song.artist)).into_owned();
    let name = service.to_lowercase();
    if name.contains("spotify") {
        format!("https://open.spotify.com/search/{query}")
    } else if name.contains("apple") {
        format!("https://music.apple.com/us/search?term={query}")
    } else if name.contains("amazon") {
        format!("https://music.amazon.co.jp/search/{query}")
    } else if name.contains("line") {
        format!("https://music.line.me/webapp/search?query={query}")
    } else if name.contains("youtube music") {
        format!("https://music.youtube.com/search?q={query}")
    } else {
        format!(
            "https://www.google.com/search?q={}",
            encode(&format!("{} {} {}", service, song.title, song.artist))
        )
    }
}

pub fn youtube_search_url(song: &RecommendedSong) -> String {
    format!(
        "https://www.youtube.com/results?search_query={}",
        encode(&format!("{} {}", song.title, song.artist))
    )
}

/// Detail panel for one card
pub fn render_detail(rank: usize, song: &RecommendedSong) -> String {
    let mut out = format!(
        "#{rank} {}\n   {}\n   ジャンル: {} | ムード: {}\n\n   {}\n\n   おすすめの理由: {}\n",
        song.title, song.artist, song.genre, song.mood, song.detailed_description, song.reason
    );
    out.push_str(&format!("   YouTube: {}\n", youtube_search_url(song)));
    if song.streaming_platforms.is_empty() {
        out.push_str("   配信: -");
    } else {
        out.push_str("   配信:");
        for service in &song.streaming_platforms {
            out.push_str(&format!("\n     {service}: {}", platform_search_url(service, song)));
        }
    }
    out
}

/// Numbered suggestion list for the autocomplete command
pub fn render_suggestions(suggestions: &[Suggestion]) -> String {
    if suggestions.is_empty() {
        return "候補が見つかりませんでした".to_string();
    }
    suggestions
        .iter()
        .enumerate()
        .map(|(i, s)| match &s.secondary {
            Some(secondary) => format!("  [{}] {} - {}", i + 1, s.primary, secondary),
            None => format!("  [{}] {}", i + 1, s.primary),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
