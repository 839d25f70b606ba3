pub mod error;
pub mod geodesy;
pub mod two_point;
pub mod vec;
pub mod versor;

pub use error::*;
pub use geodesy::*;
pub use two_point::*;
pub use vec::*;
pub use versor::*;
