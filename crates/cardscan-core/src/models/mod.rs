//! Data models for the cardscan pipeline.

pub mod config;
pub mod record;
