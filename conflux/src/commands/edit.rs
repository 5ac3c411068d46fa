// conflux/src/commands/edit.rs
//
// USE CASE: replay a script of field edits through an editing session.
//
// Script format (YAML list):
//   - { field: source_system, value: MySQL }
//   - { field: md5_columns, value: [id, amount] }
//   - { field: source_table, value: ~ }      # clears the field
//   - { refresh: md5_columns }               # re-fetches the metadata behind a field

use anyhow::{Context, bail};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use conflux_core::ConsoleError;
use conflux_core::application::EditingSession;
use conflux_core::domain::DomainError;
use conflux_core::domain::form::{Field, FieldValue, FormKind, join_list};
use conflux_core::ports::RecordStore;

use super::{Project, print_notices, print_report, render_view};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScriptValue {
    List(Vec<String>),
    Single(FieldValue),
}

impl From<ScriptValue> for FieldValue {
    fn from(value: ScriptValue) -> Self {
        match value {
            ScriptValue::List(items) => FieldValue::Text(join_list(&items)),
            ScriptValue::Single(v) => v,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EditStep {
    field: Option<Field>,
    #[serde(default)]
    value: Option<ScriptValue>,
    refresh: Option<Field>,
}

fn load_script(path: &Path) -> anyhow::Result<Vec<EditStep>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read edit script {}", path.display()))?;
    let steps: Vec<EditStep> = serde_yaml::from_str(&content)
        .with_context(|| format!("Invalid edit script {}", path.display()))?;
    Ok(steps)
}

pub async fn execute(
    project_dir: PathBuf,
    form: FormKind,
    script: PathBuf,
    record: Option<i64>,
    submit: bool,
) -> anyhow::Result<()> {
    // 1. Projet + script
    let project = Project::open(&project_dir)?;
    let steps = load_script(&script)?;

    // 2. Session (new form or stored record)
    let mut session = match record {
        Some(id) => {
            let stored = project
                .store
                .fetch(id)
                .await
                .with_context(|| format!("Failed to load record {}", id))?;
            println!("📂 Editing {} record {} '{}'", stored.kind(), id, stored.name());
            EditingSession::load(&stored, project.policy())
        }
        None => {
            println!("📝 New {} form", form);
            EditingSession::create(form, project.policy())
        }
    };
    session.sync(&project.catalog).await;
    print_notices(&session.drain_notices());

    // 3. Replay
    for (i, step) in steps.into_iter().enumerate() {
        match step {
            EditStep {
                refresh: Some(field),
                field: None,
                ..
            } => {
                if session.refresh(field) {
                    println!("🔄 [{}] refresh {}", i + 1, field);
                } else {
                    println!("🔄 [{}] refresh {} (nothing to reload)", i + 1, field);
                }
            }
            EditStep {
                field: Some(field),
                value,
                refresh: None,
            } => {
                let value: Option<FieldValue> = value.map(FieldValue::from);
                let shown = value
                    .as_ref()
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "∅".to_string());
                let outcome = session.set(field, value);
                if outcome.rejection.is_none() {
                    println!("✏️  [{}] {} = {}", i + 1, field, shown);
                }
                if !outcome.cleared.is_empty() {
                    let cleared: Vec<&str> = outcome.cleared.iter().map(|f| f.as_str()).collect();
                    println!("   🧹 cleared: {}", cleared.join(", "));
                }
            }
            _ => bail!(
                "Edit step {} must have either 'field' (with an optional 'value') or 'refresh'",
                i + 1
            ),
        }
        session.sync(&project.catalog).await;
        print_notices(&session.drain_notices());
    }

    // 4. Vue résolue
    println!("\n{}", render_view(&session.view()));

    // 5. Submit
    if !submit {
        match session.record() {
            Ok(_) => println!("✅ Form is complete (use --submit to save it)"),
            Err(report) => println!("📋 Not submittable yet: {}", report),
        }
        return Ok(());
    }

    match session.submit(&project.store).await {
        Ok(id) => {
            println!("✨ Saved as record {}", id);
            Ok(())
        }
        Err(ConsoleError::Domain(DomainError::Validation(report))) => {
            print_report(&report);
            std::process::exit(1);
        }
        Err(e) => Err(e.into()),
    }
}
