// conflux-core/src/domain/metadata.rs
//
// Vocabulary shared with the Metadata Provider: what can be asked (MetadataKey)
// and what comes back (MetadataValue). The provider itself lives in `ports`.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub connection_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedColumn {
    pub name: String,
    pub data_type: String,
}

/// Data-type class used to narrow a column listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeFilter {
    /// date / datetime / timestamp columns
    DateLike,
}

/// Named value lists served by `listEnumValues`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnumKind {
    ExecutionLayers,
    LoadTypes,
    SourceSystems,
    TargetSystems,
    SourceTypes,
    TargetTypes,
    Delimiters,
    ValidationTypes,
    ReconTypes,
    ActiveFlags,
    ExecutionSequences,
}

impl EnumKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExecutionLayers => "execution_layers",
            Self::LoadTypes => "load_types",
            Self::SourceSystems => "source_systems",
            Self::TargetSystems => "target_systems",
            Self::SourceTypes => "source_types",
            Self::TargetTypes => "target_types",
            Self::Delimiters => "delimiters",
            Self::ValidationTypes => "validation_types",
            Self::ReconTypes => "recon_types",
            Self::ActiveFlags => "active_flags",
            Self::ExecutionSequences => "execution_sequences",
        }
    }
}

impl fmt::Display for EnumKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The exact tuple of inputs a metadata call depends on.
///
/// Two calls with equal keys are interchangeable; a response whose key no longer
/// matches the current selection is stale by definition.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MetadataKey {
    Connections,
    Enum(EnumKind),
    Schemas {
        connection: i64,
    },
    Tables {
        connection: i64,
        schema: String,
    },
    Columns {
        connection: i64,
        schema: String,
        table: String,
    },
    TypedColumns {
        connection: i64,
        schema: String,
        table: String,
        filter: TypeFilter,
    },
}

impl fmt::Display for MetadataKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Connections => f.write_str("connections"),
            Self::Enum(kind) => write!(f, "enum:{}", kind),
            Self::Schemas { connection } => write!(f, "schemas({})", connection),
            Self::Tables { connection, schema } => write!(f, "tables({}/{})", connection, schema),
            Self::Columns {
                connection,
                schema,
                table,
            } => write!(f, "columns({}/{}.{})", connection, schema, table),
            Self::TypedColumns {
                connection,
                schema,
                table,
                filter,
            } => write!(
                f,
                "columns({}/{}.{}, {:?})",
                connection, schema, table, filter
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataValue {
    Connections(Vec<Connection>),
    Names(Vec<String>),
    Columns(Vec<TypedColumn>),
}

impl MetadataValue {
    /// Plain names, whatever the payload shape.
    pub fn names(&self) -> Vec<String> {
        match self {
            Self::Connections(list) => list.iter().map(|c| c.name.clone()).collect(),
            Self::Names(list) => list.clone(),
            Self::Columns(list) => list.iter().map(|c| c.name.clone()).collect(),
        }
    }
}

/// Read access to already-fetched metadata, as seen by the pure resolver code.
pub trait MetadataLookup {
    fn lookup(&self, key: &MetadataKey) -> Lookup<'_>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup<'a> {
    Missing,
    Pending,
    Ready(&'a MetadataValue),
    Unavailable(&'a str),
}

/// A lookup that knows nothing. Used when normalizing without live metadata.
pub struct NoMetadata;

impl MetadataLookup for NoMetadata {
    fn lookup(&self, _key: &MetadataKey) -> Lookup<'_> {
        Lookup::Missing
    }
}
