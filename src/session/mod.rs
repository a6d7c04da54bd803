pub mod feedback;
pub mod state;

pub use feedback::FeedbackHistory;
pub use state::*;
