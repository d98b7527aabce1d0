//! HTTP request handlers
//!
//! - `api` - Health check endpoint
//! - `dialin` - Twilio dial-in webhook and per-call transport events
//! - `speak` - Text-to-speech REST API

pub mod api;
pub mod dialin;
pub mod speak;
