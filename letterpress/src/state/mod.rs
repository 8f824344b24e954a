//! Shared handler state

use std::sync::Arc;

use crate::config::{LetterpressConfig, MailBackend, StoreBackend};
use crate::email::{ConsoleBackend, EmailSender, SmtpBackend};
use crate::mailer::Mailer;
use crate::store::{FileStore, MemoryStore, TemplateStore};
use crate::template::{Compiler, Registry};

/// Everything the admin handlers need
///
/// Cheap to clone; all parts are behind `Arc`s. The registry is fixed at
/// startup while the store is locked internally.
///
/// # Example
///
/// ```rust,no_run
/// use letterpress::config::LetterpressConfig;
/// use letterpress::state::LetterpressState;
/// use letterpress::template::builtin;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = LetterpressConfig::load()?;
/// let state = LetterpressState::from_config(config, builtin::registry_builder().build()?).await?;
/// let app = letterpress::handlers::router(state);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct LetterpressState {
    config: Arc<LetterpressConfig>,
    registry: Arc<Registry>,
    store: Arc<dyn TemplateStore>,
    compiler: Arc<Compiler>,
    mailer: Mailer,
}

impl std::fmt::Debug for LetterpressState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LetterpressState")
            .field("config", &self.config)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}

impl LetterpressState {
    /// Assemble state from explicit parts
    #[must_use]
    pub fn new(
        config: LetterpressConfig,
        registry: Registry,
        store: Arc<dyn TemplateStore>,
        sender: Arc<dyn EmailSender>,
    ) -> Self {
        let registry = Arc::new(registry);
        let compiler = Arc::new(Compiler::new());
        let mailer = Mailer::new(
            sender,
            Arc::clone(&store),
            Arc::clone(&registry),
            Arc::clone(&compiler),
            config.mail.from_address.clone(),
        );

        Self {
            config: Arc::new(config),
            registry,
            store,
            compiler,
            mailer,
        }
    }

    /// Open the configured store and email backend, then sync the registry
    /// into the store
    ///
    /// # Errors
    ///
    /// Returns an error if the store file is unreadable or the SMTP backend
    /// cannot be configured.
    pub async fn from_config(config: LetterpressConfig, registry: Registry) -> anyhow::Result<Self> {
        let store: Arc<dyn TemplateStore> = match config.store.backend {
            StoreBackend::Memory => Arc::new(MemoryStore::new()),
            StoreBackend::File => Arc::new(FileStore::open(&config.store.path).await?),
        };
        let sender: Arc<dyn EmailSender> = match config.mail.backend {
            MailBackend::Console => Arc::new(ConsoleBackend::verbose()),
            MailBackend::Smtp => Arc::new(SmtpBackend::new(&config.mail.smtp)?),
        };

        let state = Self::new(config, registry, store, sender);
        let created = state.registry.sync(state.store.as_ref()).await?;
        tracing::info!(created, "Template records synced");
        Ok(state)
    }

    /// Loaded configuration
    #[must_use]
    pub fn config(&self) -> &LetterpressConfig {
        &self.config
    }

    /// Registered templates and layouts
    #[must_use]
    pub const fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Record store
    #[must_use]
    pub const fn store(&self) -> &Arc<dyn TemplateStore> {
        &self.store
    }

    /// Template compiler
    #[must_use]
    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    /// Mailer sending through the configured backend
    #[must_use]
    pub const fn mailer(&self) -> &Mailer {
        &self.mailer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::builtin;

    #[tokio::test]
    async fn test_from_config_syncs_memory_store() {
        let registry = builtin::registry_builder().build().unwrap();
        let state = LetterpressState::from_config(LetterpressConfig::default(), registry)
            .await
            .unwrap();
        assert_eq!(state.store().list().await.unwrap().len(), 3);
        assert_eq!(state.mailer().from_address(), "noreply@example.com");
    }

    #[tokio::test]
    async fn test_from_config_with_file_store() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = LetterpressConfig::default();
        config.store.backend = StoreBackend::File;
        config.store.path = dir.path().join("templates.json");

        let registry = builtin::registry_builder().build().unwrap();
        LetterpressState::from_config(config.clone(), registry)
            .await
            .unwrap();
        assert!(config.store.path.exists());
    }
}
