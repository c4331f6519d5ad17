// Breakout strategy: range detection + entry state machine
pub mod breakout;
pub mod range;

pub use breakout::{BreakoutState, Entry, Transition};
pub use range::detect_band;
