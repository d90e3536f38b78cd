//! Request handlers.

pub mod health;
pub mod info;
pub mod transcript;

pub use health::*;
pub use info::*;
pub use transcript::*;
