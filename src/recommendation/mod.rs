pub mod generator;
pub mod prompt;
pub mod schema;

#[cfg(test)]
mod generator_tests;

pub use generator::*;
pub use prompt::*;
pub use schema::*;
