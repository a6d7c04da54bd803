pub mod debounce;
pub mod search;

pub use debounce::*;
pub use search::*;
