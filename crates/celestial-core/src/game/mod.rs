pub mod score_state;
pub mod snapshot;
pub mod state;
pub mod strategy;
