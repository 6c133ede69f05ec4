// Hardware wait primitive.
// Every wait on a controller status bit goes through `poll_until`, one call
// per condition, so each wait shows up at its call site and in the trace
// log. The default budget spins forever; a bounded budget turns a silent
// controller into `PollTimeout`, which callers treat as fatal.

use core::fmt;

use crate::drivers::lcdc::{DisplayController, Signals};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Set,
    Clear,
}

impl Level {
    pub const fn opposite(self) -> Self {
        match self {
            Level::Set => Level::Clear,
            Level::Clear => Level::Set,
        }
    }
}

/// Status bits to wait for, and the level they must all reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Condition {
    pub signals: Signals,
    pub level: Level,
}

impl Condition {
    pub const fn set(signals: Signals) -> Self {
        Self {
            signals,
            level: Level::Set,
        }
    }

    pub const fn clear(signals: Signals) -> Self {
        Self {
            signals,
            level: Level::Clear,
        }
    }

    pub fn holds(&self, status: Signals) -> bool {
        match self.level {
            Level::Set => status.contains(self.signals),
            Level::Clear => !status.intersects(self.signals),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            Level::Set => "set",
            Level::Clear => "clear",
        };
        write!(f, "{:?} {}", self.signals, level)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PollBudget {
    /// spin until the controller answers
    #[default]
    Unbounded,
    /// give up after this many status reads
    Spins(u32),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PollTimeout {
    pub condition: Condition,
    pub spins: u32,
}

impl fmt::Display for PollTimeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no {} after {} reads", self.condition, self.spins)
    }
}

/// Reads the status register until `cond` holds. Returns the number of
/// reads it took.
pub fn poll_until<C>(ctrl: &mut C, cond: Condition, budget: PollBudget) -> Result<u32, PollTimeout>
where
    C: DisplayController + ?Sized,
{
    log::trace!("lcdc: wait {}", cond);

    let mut spins: u32 = 0;
    loop {
        let status = ctrl.read_status();
        spins = spins.saturating_add(1);
        if cond.holds(status) {
            return Ok(spins);
        }
        if let PollBudget::Spins(max) = budget {
            if spins >= max {
                return Err(PollTimeout {
                    condition: cond,
                    spins,
                });
            }
        }
        core::hint::spin_loop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drivers::lcdc::SAMA5D2_LCDC;
    use crate::drivers::lcdc::fake::FakeLcdc;

    #[test]
    fn condition_levels() {
        let s = Signals::CLOCK | Signals::SYNC;
        assert!(Condition::set(Signals::CLOCK).holds(s));
        assert!(!Condition::set(Signals::CLOCK | Signals::DISPLAY).holds(s));
        assert!(Condition::clear(Signals::DISPLAY).holds(s));
        assert!(!Condition::clear(Signals::SYNC | Signals::DISPLAY).holds(s));
        assert_eq!(Level::Set.opposite(), Level::Clear);
    }

    #[test]
    fn waits_out_busy_reads() {
        let mut ctrl = FakeLcdc::new(&SAMA5D2_LCDC);
        ctrl.busy_reads = 3;
        ctrl.write_config(crate::drivers::lcdc::Reg::Cfg(0), 0);
        let n = poll_until(&mut ctrl, Condition::clear(Signals::SYNC_BUSY), PollBudget::Unbounded);
        assert_eq!(n, Ok(4));
    }

    #[test]
    fn bounded_budget_times_out() {
        let mut ctrl = FakeLcdc::new(&SAMA5D2_LCDC);
        let cond = Condition::set(Signals::CLOCK);
        assert_eq!(
            poll_until(&mut ctrl, cond, PollBudget::Spins(5)),
            Err(PollTimeout {
                condition: cond,
                spins: 5
            })
        );
    }
}
