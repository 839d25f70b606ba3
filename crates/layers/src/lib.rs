pub mod layer;
pub mod routes;

pub use layer::*;
pub use routes::*;
