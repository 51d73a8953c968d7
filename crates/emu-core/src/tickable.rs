//! Components advanced one clock at a time.

use crate::Ticks;

/// A component driven by its own clock: a colour clock for the video chip,
/// a processor cycle for a timer or a sound channel mixer.
pub trait Tickable {
    /// Advance one tick.
    fn tick(&mut self);

    /// Advance `count` ticks. Overrides must match repeated [`tick`](Tickable::tick).
    fn tick_n(&mut self, count: Ticks) {
        for _ in 0..count.get() {
            self.tick();
        }
    }
}
