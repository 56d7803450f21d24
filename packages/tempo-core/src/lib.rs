pub mod clock;
pub mod error;
pub mod future;
pub mod outcome;
pub mod timeout;

pub use clock::{Clock, FnClock, ManualClock, SystemClock};
pub use error::{Error, TIMEOUT_MESSAGE};
pub use future::{Future, PollFn};
pub use outcome::{Outcome, State};
pub use timeout::{
    DEFAULT_TIMEOUT_MS, after_delay, after_delay_on, with_default_timeout, with_timeout,
    with_timeout_on,
};
