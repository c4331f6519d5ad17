use crate::models::Direction;

/// Ratchet the trailing stop for the current price.
///
/// LONG: once price clears entry +1%, the stop tightens to entry +0.5%;
/// once it clears +2%, to +1%. SHORT mirrors at -1%/-0.5% and -2%/-1%.
/// Tightening takes max (LONG) or min (SHORT) with the existing stop, so
/// the stop only ever moves in the favorable direction.
pub fn tightened_stop(direction: Direction, entry_price: f64, stop_loss: f64, price: f64) -> f64 {
    let mut stop = stop_loss;
    match direction {
        Direction::Long => {
            if price > entry_price * 1.01 {
                stop = stop.max(entry_price * 1.005);
            }
            if price > entry_price * 1.02 {
                stop = stop.max(entry_price * 1.01);
            }
        }
        Direction::Short => {
            if price < entry_price * 0.99 {
                stop = stop.min(entry_price * 0.995);
            }
            if price < entry_price * 0.98 {
                stop = stop.min(entry_price * 0.99);
            }
        }
    }
    stop
}

/// Exit condition: price crossed the stop against the position.
pub fn stop_hit(direction: Direction, stop_loss: f64, price: f64) -> bool {
    match direction {
        Direction::Long => price < stop_loss,
        Direction::Short => price > stop_loss,
    }
}
