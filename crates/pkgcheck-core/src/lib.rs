pub mod config;
pub mod logging;

pub mod container;
pub mod control;
pub mod fetch;
pub mod manifest;
pub mod pipeline;
pub mod report;
pub mod resolver;
pub mod retry;
pub mod validate;
