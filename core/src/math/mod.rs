pub mod interp;
pub mod round;
pub mod stats;

pub use interp::{linspace, LinearInterpolant};
pub use round::RoundTo;
pub use stats::{LineFit, StatsHelper};
