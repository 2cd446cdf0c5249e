//! Application services

pub mod identity;
pub mod quiz;
pub mod sessions;
