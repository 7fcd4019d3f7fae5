pub mod clock;
pub mod time;

pub use clock::{Clock, ManualClock, SystemClock};
pub use time::parse_naive;
