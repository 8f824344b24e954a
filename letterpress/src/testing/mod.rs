//! Test helpers
//!
//! - [`RecordingSender`] captures emails instead of delivering them
//! - [`test_state`] builds an in-memory service around the stock templates
//!
//! ```rust
//! use letterpress::email::{Email, EmailSender};
//! use letterpress::testing::RecordingSender;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sender = RecordingSender::new();
//! sender
//!     .send(
//!         Email::new()
//!             .to("ada@example.com")
//!             .from("noreply@example.com")
//!             .subject("Hi")
//!             .html("<p>Hi</p>"),
//!     )
//!     .await?;
//! assert!(sender.was_sent_to("ada@example.com"));
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::config::LetterpressConfig;
use crate::email::{Email, EmailError, EmailSender};
use crate::state::LetterpressState;
use crate::store::MemoryStore;
use crate::template::builtin;

/// Sender that keeps every email it is given
///
/// Clones share the same mailbox, so a test can keep one handle while the
/// service owns another.
#[derive(Debug, Clone, Default)]
pub struct RecordingSender {
    sent: Arc<Mutex<Vec<Email>>>,
}

impl RecordingSender {
    /// Create an empty mailbox
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of emails sent
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.sent.lock().len()
    }

    /// All emails in send order
    #[must_use]
    pub fn sent_emails(&self) -> Vec<Email> {
        self.sent.lock().clone()
    }

    /// Most recent email
    #[must_use]
    pub fn last_sent(&self) -> Option<Email> {
        self.sent.lock().last().cloned()
    }

    /// Whether any email went to exactly `address`
    #[must_use]
    pub fn was_sent_to(&self, address: &str) -> bool {
        self.sent
            .lock()
            .iter()
            .any(|email| email.to.iter().any(|to| to == address))
    }

    /// Forget every recorded email
    pub fn clear(&self) {
        self.sent.lock().clear();
    }
}

#[async_trait]
impl EmailSender for RecordingSender {
    async fn send(&self, email: Email) -> Result<(), EmailError> {
        email.validate()?;
        self.sent.lock().push(email);
        Ok(())
    }
}

/// Service state with the stock templates, an empty memory store and a
/// [`RecordingSender`]
///
/// Records are synced before returning, so every stock template exists in
/// the store, disabled.
///
/// # Panics
///
/// Panics if the stock registry is inconsistent.
pub async fn test_state() -> (LetterpressState, RecordingSender) {
    let sender = RecordingSender::new();
    let registry = builtin::registry_builder()
        .build()
        .expect("stock registry is valid");
    let state = LetterpressState::new(
        LetterpressConfig::default(),
        registry,
        Arc::new(MemoryStore::new()),
        Arc::new(sender.clone()),
    );
    state
        .registry()
        .sync(state.store().as_ref())
        .await
        .expect("memory store never fails");
    (state, sender)
}
