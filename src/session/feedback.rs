use crate::models::{Feedback, RecommendedSong};

/// Liked and skipped recommendations collected across refinement rounds
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackHistory {
    pub liked: Vec<RecommendedSong>,
    pub skipped: Vec<RecommendedSong>,
}

impl FeedbackHistory {
    pub fn is_empty(&self) -> bool {
        self.liked.is_empty() && self.skipped.is_empty()
    }

    /// Append this round's liked and skipped cards. No deduplication:
    /// a song liked twice weighs twice in the next prompt.
    pub fn accumulate(&self, recommendations: &[RecommendedSong]) -> FeedbackHistory {
        let (new_liked, new_skipped) = partition_feedback(recommendations);
        let mut next = self.clone();
        next.liked.extend(new_liked);
        next.skipped.extend(new_skipped);
        next
    }
}

/// Split a round into (liked, skipped); untouched cards go nowhere
pub fn partition_feedback(
    recommendations: &[RecommendedSong],
) -> (Vec<RecommendedSong>, Vec<RecommendedSong>) {
    let liked = recommendations
        .iter()
        .filter(|r| r.feedback == Feedback::Like)
        .cloned()
        .collect();
    let skipped = recommendations
        .iter()
        .filter(|r| r.feedback == Feedback::Skip)
        .cloned()
        .collect();
    (liked, skipped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::recommended;

    #[test]
    fn test_accumulate_appends_by_feedback() {
        let history = FeedbackHistory {
            liked: vec![recommended("A", "a", Feedback::Like)],
            skipped: vec![recommended("B", "b", Feedback::Skip)],
        };
        let round = vec![
            recommended("C", "c", Feedback::Like),
            recommended("D", "d", Feedback::None),
            recommended("E", "e", Feedback::Skip),
            recommended("F", "f", Feedback::Like),
        ];

        let next = history.accumulate(&round);

        let liked: Vec<_> = next.liked.iter().map(|r| r.title.as_str()).collect();
        let skipped: Vec<_> = next.skipped.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(liked, ["A", "C", "F"]);
        assert_eq!(skipped, ["B", "E"]);
    }

    #[test]
    fn test_accumulate_leaves_input_untouched() {
        let history = FeedbackHistory::default();
        let round = vec![recommended("C", "c", Feedback::Like)];
        let next = history.accumulate(&round);
        assert!(history.is_empty());
        assert_eq!(next.liked.len(), 1);
    }

    #[test]
    fn test_accumulate_does_not_deduplicate() {
        let round = vec![recommended("Pretender", "Official髭男dism", Feedback::Like)];
        let once = FeedbackHistory::default().accumulate(&round);
        let twice = once.accumulate(&round);
        assert_eq!(twice.liked.len(), 2);
        assert_eq!(twice.liked[0].title, twice.liked[1].title);
    }

    #[test]
    fn test_untouched_round_changes_nothing() {
        let round = vec![
            recommended("C", "c", Feedback::None),
            recommended("D", "d", Feedback::None),
        ];
        assert!(FeedbackHistory::default().accumulate(&round).is_empty());
    }
}
