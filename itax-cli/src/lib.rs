pub mod app;
pub mod batch;
pub mod cli;
pub mod commands;
pub mod config;
pub mod format;
pub mod logging;
pub mod output;
pub mod report;
