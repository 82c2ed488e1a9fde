mod config;
mod constants;
mod outcome;
mod prize;
mod source;
mod ticket;

pub use config::*;
pub use constants::*;
pub use outcome::*;
pub use prize::*;
pub use source::*;
pub use ticket::*;
