mod relay;
mod service;
mod ws_handler;

pub use service::*;
pub use ws_handler::*;
