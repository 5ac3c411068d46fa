// conflux/src/commands/mod.rs

pub mod edit;
pub mod inspect;
pub mod reconcile;
pub mod validate;

use anyhow::Context;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use std::path::Path;
use tracing::info;

use conflux_core::application::Notice;
use conflux_core::domain::{DomainError, ValidationReport};
use conflux_core::domain::policy::ModePolicy;
use conflux_core::domain::resolver::{Choices, FormView};
use conflux_core::infrastructure::{
    ConsoleConfig, YamlCatalog, YamlRecordStore, load_console_config,
};

const MAX_LISTED_CHOICES: usize = 6;

/// Everything a command needs from the project directory.
pub struct Project {
    pub config: ConsoleConfig,
    pub catalog: YamlCatalog,
    pub store: YamlRecordStore,
}

impl Project {
    pub fn open(dir: &Path) -> anyhow::Result<Self> {
        let config = load_console_config(dir)
            .with_context(|| format!("Failed to load configuration from {}", dir.display()))?;
        let catalog = YamlCatalog::open(&config.catalog_path(dir), &config.date_types)
            .context("Failed to open the metadata catalog")?;
        let store = YamlRecordStore::new(config.store_path(dir));

        info!("⚙️  Console: {}", config.name);
        Ok(Self {
            config,
            catalog,
            store,
        })
    }

    pub fn policy(&self) -> ModePolicy {
        self.config.mode_policy()
    }
}

/// Relevant fields only; a field hidden by the current modes is not part of the form.
pub fn render_view(view: &FormView) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Field", "Value", "Req", "Choices"]);

    for status in view.fields.iter().filter(|s| s.relevant) {
        let value = status
            .value
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "-".to_string());
        let choices = if status.enabled {
            describe_choices(&status.choices)
        } else {
            "🔒 waiting for parent".to_string()
        };
        table.add_row(vec![
            status.field.to_string(),
            value,
            if status.required { "*" } else { "" }.to_string(),
            choices,
        ]);
    }
    table
}

fn describe_choices(choices: &Choices) -> String {
    match choices {
        Choices::Free => "(free input)".to_string(),
        Choices::Loading => "⏳ loading".to_string(),
        Choices::Unavailable(reason) => format!("⚠️  unavailable: {}", reason),
        Choices::Options(options) if options.is_empty() => "(none)".to_string(),
        Choices::Options(options) => {
            let labels: Vec<&str> = options
                .iter()
                .take(MAX_LISTED_CHOICES)
                .map(|c| c.label.as_str())
                .collect();
            let more = options.len().saturating_sub(MAX_LISTED_CHOICES);
            if more > 0 {
                format!("{}, +{} more", labels.join(", "), more)
            } else {
                labels.join(", ")
            }
        }
    }
}

pub fn print_notices(notices: &[Notice]) {
    for notice in notices {
        match notice {
            Notice::SchemaDrift { .. } => println!("   🔧 {}", notice),
            Notice::Rejected(_) => eprintln!("   ⛔ {}", notice),
            Notice::ColumnsMissing { .. } | Notice::MetadataUnavailable { .. } => {
                eprintln!("   ⚠️  {}", notice)
            }
        }
    }
}

pub fn print_report(report: &ValidationReport) {
    let diagnostic = miette::Report::new(DomainError::Validation(report.clone()));
    eprintln!("\n{:?}", diagnostic);
    for error in report.errors() {
        eprintln!("   ➜ {}", error);
    }
}
