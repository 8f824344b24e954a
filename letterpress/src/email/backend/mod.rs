//! Delivery backends
//!
//! - **Console**: log messages (development)
//! - **SMTP**: relay through an SMTP server (production)

pub mod console;
pub mod smtp;
