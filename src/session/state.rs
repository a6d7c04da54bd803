use super::FeedbackHistory;
use crate::error::{GenerationError, SessionError, SessionResult};
use crate::models::{Feedback, RecommendationResult, RecommendedSong, SongRef};
use crate::recommendation::{GenerationService, RecommendationClient};
use std::fmt;
use tracing::{debug, info};

pub const MAX_SEED_ROWS: usize = 10;
pub const INITIAL_SEED_ROWS: usize = 3;

pub const VALIDATION_MESSAGE: &str = "少なくとも1曲は入力してください。";
pub const SUBMIT_FAILED_MESSAGE: &str =
    "提案の生成に失敗しました。入力内容を確認してもう一度お試しください。";
pub const REFINE_FAILED_MESSAGE: &str = "更新に失敗しました。";

/// Which of the four views is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewPhase {
    Input,
    Loading,
    Results,
    Error,
}

impl fmt::Display for ViewPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewPhase::Input => write!(f, "input"),
            ViewPhase::Loading => write!(f, "loading"),
            ViewPhase::Results => write!(f, "results"),
            ViewPhase::Error => write!(f, "error"),
        }
    }
}

/// Which half of a seed row an edit targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedField {
    Title,
    Artist,
}

/// Everything one discovery session knows
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TasteSession {
    seed_songs: Vec<SongRef>,
    target_artist: String,
    active_seeds: Vec<SongRef>,
    current_result: Option<RecommendationResult>,
    history: FeedbackHistory,
    generation_count: u32,
    phase: ViewPhase,
    message: Option<String>,
}

impl Default for TasteSession {
    fn default() -> Self {
        TasteSession {
            seed_songs: vec![SongRef::default(); INITIAL_SEED_ROWS],
            target_artist: String::new(),
            active_seeds: Vec::new(),
            current_result: None,
            history: FeedbackHistory::default(),
            generation_count: 0,
            phase: ViewPhase::Input,
            message: None,
        }
    }
}

impl TasteSession {
    pub fn seed_songs(&self) -> &[SongRef] {
        &self.seed_songs
    }

    /// Target artist, if one is set
    pub fn target_artist(&self) -> Option<&str> {
        let artist = self.target_artist.trim();
        if artist.is_empty() { None } else { Some(artist) }
    }

    /// Seeds that went into the last submit
    pub fn active_seeds(&self) -> &[SongRef] {
        &self.active_seeds
    }

    pub fn current_result(&self) -> Option<&RecommendationResult> {
        self.current_result.as_ref()
    }

    pub fn liked_history(&self) -> &[RecommendedSong] {
        &self.history.liked
    }

    pub fn skipped_history(&self) -> &[RecommendedSong] {
        &self.history.skipped
    }

    pub fn generation_count(&self) -> u32 {
        self.generation_count
    }

    pub fn phase(&self) -> ViewPhase {
        self.phase
    }

    /// Validation text in `Input`, failure text in `Error`
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Card at a 1-based rank in the current result
    pub fn recommendation_at(&self, rank: usize) -> Option<&RecommendedSong> {
        let index = rank.checked_sub(1)?;
        self.current_result.as_ref()?.recommendations.get(index)
    }

    #[cfg(test)]
    pub fn recommendation(&self, id: &str) -> Option<&RecommendedSong> {
        self.current_result
            .as_ref()?
            .recommendations
            .iter()
            .find(|r| r.id == id)
    }
}

/// Notified after every change to the session
pub trait SessionObserver {
    fn session_changed(&self, session: &TasteSession);
}

/// Owns the session and applies user intents to it, one at a time
pub struct SessionMachine<S> {
    client: RecommendationClient<S>,
    session: TasteSession,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl<S: GenerationService> SessionMachine<S> {
    pub fn new(client: RecommendationClient<S>) -> Self {
        Self {
            client,
            session: TasteSession::default(),
            observers: Vec::new(),
        }
    }

    pub fn session(&self) -> &TasteSession {
        &self.session
    }

    pub fn subscribe(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    fn notify(&self) {
        for observer in &self.observers {
            observer.session_changed(&self.session);
        }
    }

    fn require(&self, allowed: &[ViewPhase], action: &'static str) -> SessionResult<()> {
        if allowed.contains(&self.session.phase) {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                action,
                phase: self.session.phase,
            })
        }
    }

    /// Append an empty row; does nothing once 10 rows exist
    pub fn add_seed_row(&mut self) -> SessionResult<()> {
        self.require(&[ViewPhase::Input], "add")?;
        if self.session.seed_songs.len() < MAX_SEED_ROWS {
            self.session.seed_songs.push(SongRef::default());
            self.notify();
        }
        Ok(())
    }

    /// Remove a row; the last remaining row is never removed
    pub fn remove_seed_row(&mut self, index: usize) -> SessionResult<()> {
        self.require(&[ViewPhase::Input], "remove")?;
        if index >= self.session.seed_songs.len() {
            return Err(SessionError::UnknownRow(index));
        }
        if self.session.seed_songs.len() > 1 {
            self.session.seed_songs.remove(index);
            self.notify();
        }
        Ok(())
    }

    pub fn update_seed(&mut self, index: usize, field: SeedField, value: &str) -> SessionResult<()> {
        self.require(&[ViewPhase::Input], "edit")?;
        let row = self
            .session
            .seed_songs
            .get_mut(index)
            .ok_or(SessionError::UnknownRow(index))?;
        match field {
            SeedField::Title => row.title = value.to_string(),
            SeedField::Artist => row.artist = value.to_string(),
        }
        self.notify();
        Ok(())
    }

    /// Replace both fields of a row, as picking a song suggestion does
    pub fn set_seed(&mut self, index: usize, song: SongRef) -> SessionResult<()> {
        self.require(&[ViewPhase::Input], "edit")?;
        let row = self
            .session
            .seed_songs
            .get_mut(index)
            .ok_or(SessionError::UnknownRow(index))?;
        *row = song;
        self.notify();
        Ok(())
    }

    pub fn set_target_artist(&mut self, artist: &str) -> SessionResult<()> {
        self.require(&[ViewPhase::Input], "edit")?;
        self.session.target_artist = artist.to_string();
        self.notify();
        Ok(())
    }

    /// Start a new round from the filled seed rows, ignoring any history
    pub fn submit(&mut self) -> SessionResult<()> {
        self.require(&[ViewPhase::Input], "submit")?;

        let seeds: Vec<SongRef> = self
            .session
            .seed_songs
            .iter()
            .filter(|song| song.is_filled())
            .cloned()
            .collect();
        if seeds.is_empty() {
            self.session.message = Some(VALIDATION_MESSAGE.to_string());
            self.notify();
            return Err(SessionError::Validation(VALIDATION_MESSAGE.to_string()));
        }

        info!(seeds = seeds.len(), "submitting seed songs");
        self.session.message = None;
        self.session.active_seeds = seeds;
        self.enter_loading();

        let outcome = self.client.generate(
            &self.session.active_seeds,
            &[],
            &[],
            self.session.target_artist(),
        );
        self.finish(outcome, SUBMIT_FAILED_MESSAGE)
    }

    /// Toggle feedback on a card. Re-applying the active kind clears it.
    pub fn give_feedback(&mut self, id: &str, kind: Feedback) -> SessionResult<Feedback> {
        self.require(&[ViewPhase::Results], "feedback")?;
        let card = self
            .session
            .current_result
            .as_mut()
            .and_then(|result| result.recommendations.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| SessionError::UnknownRecommendation(id.to_string()))?;

        card.feedback = if card.feedback == kind {
            Feedback::None
        } else {
            kind
        };
        let updated = card.feedback;
        debug!(id, feedback = %updated, "feedback updated");
        self.notify();
        Ok(updated)
    }

    /// Fold this round's feedback into history and ask for a new round
    pub fn refine(&mut self) -> SessionResult<()> {
        self.require(&[ViewPhase::Results], "refine")?;
        let Some(current) = self.session.current_result.as_ref() else {
            return Err(SessionError::InvalidTransition {
                action: "refine",
                phase: self.session.phase,
            });
        };

        self.session.history = self.session.history.accumulate(&current.recommendations);
        if self.session.history.is_empty() {
            debug!("refining without any feedback yet");
        }
        info!(
            liked = self.session.history.liked.len(),
            skipped = self.session.history.skipped.len(),
            "refining with feedback history"
        );
        self.enter_loading();

        let outcome = self.client.generate(
            &self.session.active_seeds,
            &self.session.history.liked,
            &self.session.history.skipped,
            self.session.target_artist(),
        );
        self.finish(outcome, REFINE_FAILED_MESSAGE)
    }

    /// Back to `Input`, keeping the seed rows and target artist
    pub fn reset(&mut self) -> SessionResult<()> {
        self.require(&[ViewPhase::Results, ViewPhase::Error], "reset")?;
        self.session.current_result = None;
        self.session.history = FeedbackHistory::default();
        self.session.generation_count = 0;
        self.session.active_seeds.clear();
        self.session.message = None;
        self.session.phase = ViewPhase::Input;
        self.notify();
        Ok(())
    }

    fn enter_loading(&mut self) {
        self.session.phase = ViewPhase::Loading;
        self.notify();
    }

    fn finish(
        &mut self,
        outcome: Result<RecommendationResult, GenerationError>,
        failure_message: &'static str,
    ) -> SessionResult<()> {
        let status = match outcome {
            Ok(result) => {
                self.session.current_result = Some(result);
                self.session.generation_count += 1;
                self.session.phase = ViewPhase::Results;
                info!(generation = self.session.generation_count, "recommendations ready");
                Ok(())
            }
            Err(_) => {
                self.session.message = Some(failure_message.to_string());
                self.session.phase = ViewPhase::Error;
                Err(SessionError::Generation(failure_message.to_string()))
            }
        };
        self.notify();
        status
    }
}
