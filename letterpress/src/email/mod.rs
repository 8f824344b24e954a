//! Outgoing email and delivery backends
//!
//! [`Email`] is the transport-neutral message built from a compiled
//! template; an [`EmailSender`] delivers it. Two backends ship with the
//! crate:
//! - [`ConsoleBackend`] logs messages instead of sending them (development)
//! - [`SmtpBackend`] relays through an SMTP server using `lettre`
//!
//! ```rust,no_run
//! use letterpress::email::{ConsoleBackend, Email, EmailSender};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let email = Email::new()
//!     .to("Ada Lovelace <ada@example.com>")
//!     .from("noreply@example.com")
//!     .subject("Test: Welcome")
//!     .html("<p>Hello</p>");
//!
//! ConsoleBackend::new().send(email).await?;
//! # Ok(())
//! # }
//! ```

mod backend;
mod builder;
mod error;
mod sender;

pub use backend::{console::ConsoleBackend, smtp::SmtpBackend};
pub use builder::Email;
pub use error::EmailError;
pub use sender::EmailSender;

#[cfg(test)]
pub use sender::MockEmailSender;
