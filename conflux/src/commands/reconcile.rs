// conflux/src/commands/reconcile.rs
//
// USE CASE: drift check of one stored pipeline against the live target table.

use std::path::PathBuf;

use conflux_core::application::reconcile_record;

use crate::cli::ReportFormat;

use super::{Project, print_notices};

pub async fn execute(
    project_dir: PathBuf,
    record: i64,
    write: bool,
    format: ReportFormat,
) -> anyhow::Result<()> {
    let project = Project::open(&project_dir)?;

    let report = reconcile_record(
        record,
        project.policy(),
        &project.catalog,
        &project.store,
        write,
    )
    .await?;

    if format == ReportFormat::Json {
        println!("{}", report.to_json()?);
        return Ok(());
    }

    println!("🔧 Reconciled record {}", record);
    println!(
        "   Target table: {}",
        report.table.as_deref().unwrap_or("(not set)")
    );
    println!("   Before: [{}]", report.before.join(", "));
    println!("   After:  [{}]", report.after.join(", "));
    print_notices(&report.notices);

    if !report.changed() {
        println!("✅ Column selection matches the live schema.");
    } else if report.written {
        println!("✨ Record {} updated.", record);
    } else {
        println!("👉 Re-run with --write to save the repaired selection.");
    }
    Ok(())
}
