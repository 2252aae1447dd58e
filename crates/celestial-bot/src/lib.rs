pub mod bot;
pub mod policy;

pub use bot::{BotDifficulty, BotParams, CardMemory, HardStrategy, ModerateStrategy, RoundStakes};
pub use policy::{play_player_hand, spawn_from_env, spawn_strategy};
