// Simulated trade execution
pub mod engine;
pub mod monitor;

pub use engine::TradeEngine;
pub use monitor::{stop_hit, tightened_stop};
