pub mod base;
pub mod configs;
pub mod gemini;
pub mod utils;

#[cfg(any(test, feature = "testing"))]
pub mod mock;
