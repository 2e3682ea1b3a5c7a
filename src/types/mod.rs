mod detection;

pub use detection::*;
