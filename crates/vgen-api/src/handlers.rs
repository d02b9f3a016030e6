//! Request handlers.

pub mod catalog;
pub mod generate;
pub mod health;
pub mod media;

pub use catalog::*;
pub use generate::*;
pub use health::*;
pub use media::*;
