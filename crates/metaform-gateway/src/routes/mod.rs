//! HTTP route handlers.

pub mod data;
pub mod forms;
pub mod health;
pub mod schemas;
