// conflux-core/src/domain/policy/alias.rs

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::metadata::Connection;

/// Central System Alias table.
///
/// A connection is eligible for a "system" label when its stored connection type equals
/// the label, or is listed as an alias of it. Comparison is case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemAliases {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl Default for SystemAliases {
    fn default() -> Self {
        Self::empty()
            .with("BigQuery", ["GCP"])
            .with("Salesforce", ["API"])
            .with("PostgreSQL", ["Postgres"])
            .with("SQL Server", ["MSSQL"])
    }
}

impl SystemAliases {
    pub fn empty() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    pub fn with<I, S>(mut self, system: &str, connection_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.insert(system, connection_types);
        self
    }

    pub fn insert<I, S>(&mut self, system: &str, connection_types: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entry = self.entries.entry(system.trim().to_lowercase()).or_default();
        for t in connection_types {
            entry.insert(t.as_ref().trim().to_lowercase());
        }
    }

    pub fn matches(&self, system: &str, connection_type: &str) -> bool {
        let system = system.trim().to_lowercase();
        let connection_type = connection_type.trim().to_lowercase();
        if system == connection_type {
            return true;
        }
        self.entries
            .get(&system)
            .is_some_and(|aliases| aliases.contains(&connection_type))
    }

    pub fn eligible<'a>(
        &self,
        system: &str,
        connections: &'a [Connection],
    ) -> impl Iterator<Item = &'a Connection> {
        let aliases = self.clone();
        let system = system.to_string();
        connections
            .iter()
            .filter(move |c| aliases.matches(&system, &c.connection_type))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(id: i64, connection_type: &str) -> Connection {
        Connection {
            id,
            name: format!("conn_{}", id),
            connection_type: connection_type.to_string(),
        }
    }

    #[test]
    fn test_exact_match_is_case_insensitive() {
        let aliases = SystemAliases::default();
        assert!(aliases.matches("MySQL", "mysql"));
        assert!(!aliases.matches("MySQL", "PostgreSQL"));
    }

    #[test]
    fn test_builtin_aliases() {
        let aliases = SystemAliases::default();
        assert!(aliases.matches("BigQuery", "GCP"));
        assert!(aliases.matches("salesforce", "api"));
        // Aliases are directional: a GCP system does not accept BigQuery-typed connections.
        assert!(!aliases.matches("GCP", "BigQuery"));
    }

    #[test]
    fn test_eligible_filters_connections() {
        let aliases = SystemAliases::empty().with("Snowflake", ["SNOW"]);
        let connections = vec![conn(1, "snow"), conn(2, "MySQL"), conn(3, "Snowflake")];
        let ids: Vec<i64> = aliases
            .eligible("Snowflake", &connections)
            .map(|c| c.id)
            .collect();
        assert_eq!(ids, vec![1, 3]);
    }
}
