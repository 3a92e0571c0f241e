mod config;
mod constants;

pub use config::*;
pub use constants::*;
