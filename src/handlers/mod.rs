// src/handlers/mod.rs

pub mod analytics;
pub mod result;
