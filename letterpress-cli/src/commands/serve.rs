//! Admin server

use anyhow::{Context, Result};
use console::style;
use letterpress::config::LetterpressConfig;
use letterpress::handlers::{router, AdminUrls};
use letterpress::observability;
use letterpress::state::LetterpressState;
use letterpress::template::builtin;
use tracing::info;

/// Run the admin HTTP server until interrupted
pub struct ServeCommand {
    config: LetterpressConfig,
}

impl ServeCommand {
    /// Serve with `config`
    pub const fn new(config: LetterpressConfig) -> Self {
        Self { config }
    }

    /// Execute the command
    pub async fn execute(self) -> Result<()> {
        observability::init()?;

        let address = self.config.server.bind_address();
        let changelist = AdminUrls::new(&self.config.admin.prefix).changelist();
        let registry = builtin::registry_builder().build()?;
        let state = LetterpressState::from_config(self.config, registry).await?;

        let listener = tokio::net::TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind {address}"))?;

        println!(
            "{} {}",
            style("Serving").green().bold(),
            style(format!("http://{address}{changelist}")).cyan()
        );
        info!(%address, "Admin server listening");

        axum::serve(listener, router(state))
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Admin server stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
