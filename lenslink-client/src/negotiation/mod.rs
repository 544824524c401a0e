mod negotiator;
mod state;

pub use negotiator::*;
pub use state::*;
