//! Registered template listing

use anyhow::Result;
use console::style;
use letterpress::template::builtin;

/// Print every registered template with its arguments and variables
pub struct TemplatesCommand;

impl TemplatesCommand {
    /// Execute the command
    pub fn execute() -> Result<()> {
        let registry = builtin::registry_builder().build()?;

        for class in registry.templates() {
            println!("{}", style(class.name()).green().bold());
            if let Some(description) = class.description() {
                println!("  {}", style(description).dim());
            }
            println!("  {} {}", style("kwargs").bold(), class.kwargs());
            for variable in class.variables() {
                println!("  {} {}", style(&variable.name).cyan(), variable.schema);
            }
            println!();
        }

        println!("{}", style("Layouts").bold());
        for layout in registry.layouts() {
            println!("  {} {}", style(layout.name()).cyan(), style(layout.label()).dim());
        }
        Ok(())
    }
}
