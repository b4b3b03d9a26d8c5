// src/handlers/mod.rs

pub mod questions;
pub mod stats;
pub mod submissions;
