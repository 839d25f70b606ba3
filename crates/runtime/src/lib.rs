pub mod clock;
pub mod throttle;

pub use clock::*;
pub use throttle::*;
