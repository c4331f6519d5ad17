use crate::models::{Band, Direction, EntryKind};

/// Where the signal engine is within one monitoring cycle.
///
/// One band cycle maps to at most one trade: once a transition yields an
/// `Entry`, the cycle belongs to the position monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BreakoutState {
    /// Waiting for price to leave the band
    Watching,
    /// Price broke out; waiting for an entry condition
    Signaled(Direction),
}

/// Entry decision produced by the state machine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Entry {
    pub direction: Direction,
    pub kind: EntryKind,
    pub price: f64,
    /// Initial stop: the band edge opposite the trade direction
    pub stop_loss: f64,
}

/// Result of evaluating one price tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transition {
    Stay(BreakoutState),
    Enter(Entry),
}

impl BreakoutState {
    /// Evaluate the current price against the band.
    ///
    /// Watching: price above the band signals LONG, below signals SHORT.
    /// Signaled: a pullback inside the band enters on retracement; price
    /// still beyond the breakout edge enters by chasing. Price sitting on
    /// the wrong side of the band holds the signal.
    pub fn advance(self, band: Band, price: f64) -> Transition {
        match self {
            BreakoutState::Watching => {
                if price > band.high {
                    Transition::Stay(BreakoutState::Signaled(Direction::Long))
                } else if price < band.low {
                    Transition::Stay(BreakoutState::Signaled(Direction::Short))
                } else {
                    Transition::Stay(self)
                }
            }
            BreakoutState::Signaled(direction) => {
                let inside = band.low < price && price < band.high;
                let kind = if inside {
                    Some(EntryKind::Retracement)
                } else {
                    match direction {
                        Direction::Long if price > band.high => Some(EntryKind::Chase),
                        Direction::Short if price < band.low => Some(EntryKind::Chase),
                        _ => None,
                    }
                };

                match kind {
                    Some(kind) => Transition::Enter(Entry {
                        direction,
                        kind,
                        price,
                        stop_loss: match direction {
                            Direction::Long => band.low,
                            Direction::Short => band.high,
                        },
                    }),
                    None => Transition::Stay(self),
                }
            }
        }
    }
}
