pub mod catalog;
pub mod client;
pub mod extract;
pub mod install;
pub mod local;
pub mod pattern;
pub mod resolve;

pub use catalog::*;
pub use client::*;
pub use extract::*;
pub use install::*;
pub use local::*;
pub use pattern::*;
pub use resolve::*;
