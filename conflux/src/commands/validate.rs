// conflux/src/commands/validate.rs
//
// USE CASE: re-run submission checks on stored records against today's catalog.

use anyhow::Context;
use std::path::PathBuf;

use conflux_core::application::EditingSession;
use conflux_core::domain::ConfigurationRecord;
use conflux_core::ports::RecordStore;

use super::{Project, print_notices, print_report};

pub async fn execute(project_dir: PathBuf, record: Option<i64>) -> anyhow::Result<()> {
    let project = Project::open(&project_dir)?;

    // 1. Une seule fiche, ou toutes
    let records: Vec<(i64, ConfigurationRecord)> = match record {
        Some(id) => {
            let stored = project
                .store
                .fetch(id)
                .await
                .with_context(|| format!("Failed to load record {}", id))?;
            vec![(id, stored)]
        }
        None => project
            .store
            .list()
            .await
            .context("Failed to list stored records")?
            .into_iter()
            .map(|stored| (stored.id, stored.record))
            .collect(),
    };

    if records.is_empty() {
        println!("📭 No stored records.");
        return Ok(());
    }

    // 2. Each record gets its own session against the live catalog
    let mut invalid = Vec::new();
    for (id, stored) in &records {
        println!("🔎 Validating {} record {} '{}'", stored.kind(), id, stored.name());

        let mut session = EditingSession::load(stored, project.policy());
        session.sync(&project.catalog).await;
        print_notices(&session.drain_notices());

        match session.record() {
            Ok(_) => println!("✅ Record {} is valid.", id),
            Err(report) => {
                print_report(&report);
                invalid.push(*id);
            }
        }
    }

    // 3. Summary
    if invalid.is_empty() {
        return Ok(());
    }
    if records.len() > 1 {
        eprintln!(
            "❌ {} of {} records need attention: {:?}",
            invalid.len(),
            records.len(),
            invalid
        );
    }
    std::process::exit(1);
}
