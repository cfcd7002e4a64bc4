//! Command handlers

pub mod config;
pub mod export;
pub mod favorite;
pub mod recent;
pub mod search;
