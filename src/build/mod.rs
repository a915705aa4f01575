mod feedback;
mod lifecycle;
mod state;

pub use feedback::FeedbackAnalyzer;
pub use lifecycle::{BuildState, Lifecycle, Phase};
pub use state::ToolchainState;
