pub mod archive;
pub mod cli;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod report;
pub mod util;
