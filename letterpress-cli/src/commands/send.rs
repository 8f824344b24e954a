//! Production send from the command line

use anyhow::Result;
use console::style;
use letterpress::config::LetterpressConfig;
use letterpress::mailer::SendOutcome;
use letterpress::state::LetterpressState;
use letterpress::template::builtin;

use super::parse_object;

/// Send a stored template, honouring its enabled flag
pub struct SendCommand {
    name: String,
    recipient: String,
    kwargs: String,
}

impl SendCommand {
    /// Send template `name` to `recipient`
    pub const fn new(name: String, recipient: String, kwargs: String) -> Self {
        Self {
            name,
            recipient,
            kwargs,
        }
    }

    /// Execute the command
    pub async fn execute(self, config: LetterpressConfig) -> Result<()> {
        let kwargs = parse_object(&self.kwargs, "kwargs")?;
        let state = LetterpressState::from_config(config, builtin::registry_builder().build()?).await?;

        match state
            .mailer()
            .send_template(&self.name, &self.recipient, kwargs)
            .await?
        {
            SendOutcome::Sent { recipient, subject } => println!(
                "{} {} to {}",
                style("Sent").green().bold(),
                style(subject).bold(),
                recipient
            ),
            SendOutcome::Skipped { reason } => {
                println!("{} {}", style("Skipped:").yellow().bold(), reason);
            }
        }
        Ok(())
    }
}
