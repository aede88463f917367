pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod paths;
pub mod quiz;
pub mod srs;
pub mod stats;
pub mod store;

#[cfg(test)]
mod testing;

pub use error::{QuizError, Result};
pub use quiz::QuizEngine;
