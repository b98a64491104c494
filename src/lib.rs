//! Backend for a personal portfolio site: a thin axum API serving portfolio
//! content and a contact form, with a sliding-window submission rate limiter
//! (spam protection) as its core.

pub mod api;
pub mod config;
pub mod content;
pub mod messages;
pub mod metrics;
pub mod spam;
