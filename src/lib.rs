pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod identity;
pub mod model;
pub mod report;
pub mod util;
pub mod week;
