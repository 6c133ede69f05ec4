// Boot-time primitives
// Runs before any scheduler exists: single core, no interrupts, every
// hardware wait is an explicit status poll.

pub mod poll;

pub use poll::{Condition, Level, PollBudget, PollTimeout, poll_until};
