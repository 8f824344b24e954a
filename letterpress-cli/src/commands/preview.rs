//! Render a stored template

use anyhow::{Context, Result};
use console::style;
use letterpress::config::LetterpressConfig;
use letterpress::fake;
use letterpress::state::LetterpressState;
use letterpress::template::{builtin, TemplateInstance};

use super::parse_object;

/// Compile the stored version of a template with sample arguments
pub struct PreviewCommand {
    name: String,
    layout: Option<String>,
    variables: Option<String>,
}

impl PreviewCommand {
    /// Preview template `name`
    pub const fn new(name: String, layout: Option<String>, variables: Option<String>) -> Self {
        Self {
            name,
            layout,
            variables,
        }
    }

    /// Execute the command
    pub async fn execute(self, config: LetterpressConfig) -> Result<()> {
        let state = LetterpressState::from_config(config, builtin::registry_builder().build()?).await?;
        let registry = state.registry();

        let class = registry.get_template(&self.name)?;
        let mut record = state
            .store()
            .get(&self.name)
            .await?
            .with_context(|| format!("No stored record for `{}`", self.name))?;
        if let Some(layout) = self.layout {
            record.layout = layout;
        }

        let variables = parse_object(self.variables.as_deref().unwrap_or_default(), "variables")?;
        let kwargs = fake::fake_kwargs(class.as_ref());
        let instance = TemplateInstance::from_record(registry, class, &record, "preview@example.com")?
            .kwargs(kwargs)
            .force_variables(variables);

        let compiled = state.compiler().compile(&instance)?;
        eprintln!("{} {}", style("Subject:").bold(), compiled.subject);
        println!("{}", compiled.html);
        Ok(())
    }
}
