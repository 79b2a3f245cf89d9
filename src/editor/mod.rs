mod history;
pub mod scanner;
mod snapshot;
pub mod transform;

pub use history::*;
pub use snapshot::*;
pub use transform::transform;
