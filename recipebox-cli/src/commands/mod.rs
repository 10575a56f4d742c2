pub mod completion;
pub mod config;
pub mod recipes;
pub mod session;
