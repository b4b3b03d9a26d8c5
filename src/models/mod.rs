// src/models/mod.rs

pub mod question;
pub mod response;
pub mod session;
pub mod submission;
