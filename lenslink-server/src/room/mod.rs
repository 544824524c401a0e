mod allocator;
mod registry;

pub use allocator::*;
pub use registry::*;
