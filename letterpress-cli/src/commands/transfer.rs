//! Export and import against the configured store

use std::path::PathBuf;

use anyhow::{Context, Result};
use console::style;
use letterpress::config::LetterpressConfig;
use letterpress::state::LetterpressState;
use letterpress::store::transfer::{self, ExportDocument};
use letterpress::template::builtin;

/// Move template records in or out of the store
pub enum TransferCommand {
    /// Write records to a file or stdout
    Export {
        /// Destination, stdout when `None`
        output: Option<PathBuf>,
    },
    /// Read records from a file
    Import {
        /// Export document
        file: PathBuf,
    },
}

impl TransferCommand {
    /// Execute the command
    pub async fn execute(self, config: LetterpressConfig) -> Result<()> {
        let state = LetterpressState::from_config(config, builtin::registry_builder().build()?).await?;

        match self {
            Self::Export { output } => {
                let document = transfer::export(state.store().as_ref()).await?;
                let json = serde_json::to_string_pretty(&document)?;
                match output {
                    Some(path) => {
                        tokio::fs::write(&path, json)
                            .await
                            .with_context(|| format!("Failed to write {}", path.display()))?;
                        eprintln!(
                            "{} {} templates to {}",
                            style("Exported").green().bold(),
                            document.templates.len(),
                            path.display()
                        );
                    }
                    None => println!("{json}"),
                }
            }
            Self::Import { file } => {
                let raw = tokio::fs::read_to_string(&file)
                    .await
                    .with_context(|| format!("Failed to read {}", file.display()))?;
                let document: ExportDocument = serde_json::from_str(&raw)
                    .with_context(|| format!("{} is not an export document", file.display()))?;

                let report =
                    transfer::import(state.store().as_ref(), state.registry(), document).await?;
                println!(
                    "{} {} templates",
                    style("Imported").green().bold(),
                    report.imported.len()
                );
                for name in &report.skipped {
                    println!("  {} {name}", style("skipped").yellow());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use letterpress::config::StoreBackend;
    use letterpress::store::{FileStore, TemplateStore};

    fn file_config(dir: &tempfile::TempDir) -> LetterpressConfig {
        let mut config = LetterpressConfig::default();
        config.store.backend = StoreBackend::File;
        config.store.path = dir.path().join("templates.json");
        config
    }

    #[tokio::test]
    async fn test_export_then_import_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let config = file_config(&dir);
        let export_path = dir.path().join("export.json");

        TransferCommand::Export {
            output: Some(export_path.clone()),
        }
        .execute(config.clone())
        .await
        .unwrap();

        let raw = std::fs::read_to_string(&export_path).unwrap();
        let edited = raw.replace("\"enabled\": false", "\"enabled\": true");
        std::fs::write(&export_path, edited).unwrap();

        TransferCommand::Import { file: export_path }
            .execute(config.clone())
            .await
            .unwrap();

        let store = FileStore::open(&config.store.path).await.unwrap();
        let records = store.list().await.unwrap();
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.enabled));
    }

    #[tokio::test]
    async fn test_import_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = TransferCommand::Import {
            file: dir.path().join("absent.json"),
        }
        .execute(file_config(&dir))
        .await;
        assert!(result.is_err());
    }
}
