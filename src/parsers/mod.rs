pub mod normalize;
pub mod query;

pub use normalize::*;
pub use query::*;
