//! Data types shared across the acquisition pipeline.

pub mod config;
pub mod content;
pub mod crawl;
pub mod page;
