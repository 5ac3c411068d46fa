// conflux-core/src/domain/reconciler.rs
//
// Keeps the change-detection (md5) column set in line with the live columns of the
// resolved target table.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ReconcileOutcome {
    /// No prior selection: take every live column.
    Defaulted { selection: Vec<String> },
    /// Drift repaired.
    Repaired {
        selection: Vec<String>,
        added: Vec<String>,
        removed: Vec<String>,
    },
    Unchanged,
    /// Dynamic schema is off. `invalid` lists the columns gone from the table; they
    /// are left for submission to reject.
    Skipped { invalid: Vec<String> },
}

impl ReconcileOutcome {
    /// New selection to write, if any.
    pub fn selection(&self) -> Option<&[String]> {
        match self {
            Self::Defaulted { selection } | Self::Repaired { selection, .. } => Some(selection),
            Self::Unchanged | Self::Skipped { .. } => None,
        }
    }

    /// Human-readable drift report.
    pub fn notice(&self, table: &str) -> Option<String> {
        match self {
            Self::Repaired { added, removed, .. } => {
                let mut parts = Vec::new();
                if !added.is_empty() {
                    parts.push(format!("added {}", added.join(", ")));
                }
                if !removed.is_empty() {
                    parts.push(format!("removed {}", removed.join(", ")));
                }
                Some(format!(
                    "Schema drift on '{}': {}",
                    table,
                    parts.join("; ")
                ))
            }
            Self::Skipped { invalid } if !invalid.is_empty() => Some(format!(
                "Columns no longer in '{}': {} (dynamic schema is off)",
                table,
                invalid.join(", ")
            )),
            _ => None,
        }
    }
}

pub struct ColumnSetReconciler;

impl ColumnSetReconciler {
    /// `current` is `None` (or empty) when nothing has been selected for this table yet.
    pub fn reconcile(current: Option<&[String]>, live: &[String], dynamic: bool) -> ReconcileOutcome {
        let live = dedup(live);

        let current = match current {
            Some(selection) if !selection.is_empty() => dedup(selection),
            _ => return ReconcileOutcome::Defaulted { selection: live },
        };

        let removed: Vec<String> = current
            .iter()
            .filter(|c| !live.contains(c))
            .cloned()
            .collect();

        if !dynamic {
            return ReconcileOutcome::Skipped { invalid: removed };
        }

        let added: Vec<String> = live
            .iter()
            .filter(|c| !current.contains(c))
            .cloned()
            .collect();

        if added.is_empty() && removed.is_empty() {
            return ReconcileOutcome::Unchanged;
        }

        // (current ∩ live) ∪ (live − current), in live order.
        let selection = live
            .iter()
            .filter(|c| current.contains(c) || added.contains(c))
            .cloned()
            .collect();

        ReconcileOutcome::Repaired {
            selection,
            added,
            removed,
        }
    }
}

fn dedup(columns: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(columns.len());
    for c in columns {
        if !out.contains(c) {
            out.push(c.clone());
        }
    }
    out
}
