pub use order::*;

pub mod order;
