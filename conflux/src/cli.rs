// conflux/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use conflux_core::domain::form::FormKind;

#[derive(Parser)]
#[command(name = "conflux")]
#[command(about = "Cascading configuration engine for data-pipeline metadata consoles", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Project directory (holds conflux.yaml)
    #[arg(long, global = true, default_value = ".", env = "CONFLUX_PROJECT_DIR")]
    pub project_dir: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormArg {
    Pipeline,
    Reconciliation,
    DataQuality,
}

impl From<FormArg> for FormKind {
    fn from(arg: FormArg) -> Self {
        match arg {
            FormArg::Pipeline => FormKind::Pipeline,
            FormArg::Reconciliation => FormKind::Reconciliation,
            FormArg::DataQuality => FormKind::DataQuality,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// ✏️  Replays a script of field edits against a form
    Edit {
        /// Form to open when no record is given
        #[arg(long, value_enum, default_value = "pipeline")]
        form: FormArg,

        /// YAML list of edits ({ field, value } or { refresh })
        #[arg(long, short)]
        script: PathBuf,

        /// Start from a stored record instead of a blank form
        #[arg(long, short)]
        record: Option<i64>,

        /// Save the record once the script has run
        #[arg(long)]
        submit: bool,
    },

    /// 🔧 Checks a stored pipeline against the live columns of its target table
    Reconcile {
        #[arg(long, short)]
        record: i64,

        /// Persist the repaired column selection
        #[arg(long)]
        write: bool,

        /// Output format
        #[arg(long, value_enum, default_value = "text")]
        format: ReportFormat,
    },

    /// 🔍 Browses the metadata catalog
    Inspect {
        #[arg(long, short)]
        connection: Option<i64>,

        #[arg(long, short, requires = "connection")]
        schema: Option<String>,

        #[arg(long, short, requires = "schema")]
        table: Option<String>,
    },

    /// ✅ Re-validates stored records against the current catalog
    Validate {
        /// Only this record (default: every stored record)
        #[arg(long, short)]
        record: Option<i64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Result, bail};
    use clap::Parser;

    #[test]
    fn test_cli_parse_edit_defaults() -> Result<()> {
        let args = Cli::parse_from(["conflux", "edit", "--script", "edits.yaml"]);
        assert_eq!(args.project_dir.to_string_lossy(), ".");
        match args.command {
            Commands::Edit {
                form,
                script,
                record,
                submit,
            } => {
                assert_eq!(form, FormArg::Pipeline);
                assert_eq!(script.to_string_lossy(), "edits.yaml");
                assert_eq!(record, None);
                assert!(!submit);
                Ok(())
            }
            _ => bail!("Expected Edit command"),
        }
    }

    #[test]
    fn test_cli_parse_edit_data_quality() -> Result<()> {
        let args = Cli::parse_from([
            "conflux",
            "edit",
            "--form",
            "data-quality",
            "-s",
            "dq.yaml",
            "--submit",
            "--project-dir",
            "/tmp",
        ]);
        assert_eq!(args.project_dir.to_string_lossy(), "/tmp");
        match args.command {
            Commands::Edit { form, submit, .. } => {
                assert_eq!(FormKind::from(form), FormKind::DataQuality);
                assert!(submit);
                Ok(())
            }
            _ => bail!("Expected Edit command"),
        }
    }

    #[test]
    fn test_cli_parse_reconcile() -> Result<()> {
        let args = Cli::parse_from(["conflux", "reconcile", "--record", "3", "--write"]);
        match args.command {
            Commands::Reconcile {
                record,
                write,
                format,
            } => {
                assert_eq!(record, 3);
                assert!(write);
                assert_eq!(format, ReportFormat::Text);
                Ok(())
            }
            _ => bail!("Expected Reconcile command"),
        }
    }

    #[test]
    fn test_cli_reconcile_format_is_checked() -> Result<()> {
        let args = Cli::try_parse_from(["conflux", "reconcile", "-r", "1", "--format", "json"])?;
        match args.command {
            Commands::Reconcile { format, .. } => assert_eq!(format, ReportFormat::Json),
            _ => bail!("Expected Reconcile command"),
        }
        assert!(
            Cli::try_parse_from(["conflux", "reconcile", "-r", "1", "--format", "xml"]).is_err()
        );
        Ok(())
    }

    #[test]
    fn test_cli_validate_record_is_optional() -> Result<()> {
        match Cli::parse_from(["conflux", "validate"]).command {
            Commands::Validate { record } => assert_eq!(record, None),
            _ => bail!("Expected Validate command"),
        }
        Ok(())
    }

    #[test]
    fn test_cli_inspect_table_needs_schema() {
        assert!(Cli::try_parse_from(["conflux", "inspect", "--connection", "1"]).is_ok());
        assert!(
            Cli::try_parse_from(["conflux", "inspect", "--connection", "1", "--table", "t"])
                .is_err()
        );
    }
}
