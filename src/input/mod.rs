mod keys;
mod resolver;

pub use keys::*;
pub use resolver::*;
