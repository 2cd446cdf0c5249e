//! HTTP route handlers

pub mod auth;
pub mod notes;
pub mod quizzes;
pub mod sessions;
