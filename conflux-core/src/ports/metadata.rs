// conflux-core/src/ports/metadata.rs

// Read-only view of the metadata service: which connections exist, what they contain,
// and the enumerated lists the console offers. The core never knows where it comes from.

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

use crate::domain::metadata::{
    Connection, EnumKind, MetadataKey, MetadataValue, TypeFilter, TypedColumn,
};

#[derive(Error, Debug, Clone, PartialEq, Eq, Diagnostic)]
pub enum MetadataError {
    #[error("Metadata unavailable: {0}")]
    #[diagnostic(
        code(conflux::metadata::unavailable),
        help("Refresh the field or re-select its parent to retry.")
    )]
    Unavailable(String),

    #[error("Not found in catalog: {0}")]
    #[diagnostic(code(conflux::metadata::not_found))]
    NotFound(String),
}

#[async_trait]
pub trait MetadataProvider: Send + Sync {
    async fn list_connections(&self) -> Result<Vec<Connection>, MetadataError>;

    async fn list_schemas(&self, connection_id: i64) -> Result<Vec<String>, MetadataError>;

    async fn list_tables(&self, connection_id: i64, schema: &str)
    -> Result<Vec<String>, MetadataError>;

    async fn list_columns(
        &self,
        connection_id: i64,
        schema: &str,
        table: &str,
    ) -> Result<Vec<String>, MetadataError>;

    async fn list_columns_with_types(
        &self,
        connection_id: i64,
        schema: &str,
        table: &str,
        filter: Option<TypeFilter>,
    ) -> Result<Vec<TypedColumn>, MetadataError>;

    async fn list_enum_values(&self, kind: EnumKind) -> Result<Vec<String>, MetadataError>;
}

/// Runs the provider call a cache key stands for.
pub async fn fetch_key(
    provider: &dyn MetadataProvider,
    key: &MetadataKey,
) -> Result<MetadataValue, MetadataError> {
    match key {
        MetadataKey::Connections => provider
            .list_connections()
            .await
            .map(MetadataValue::Connections),
        MetadataKey::Enum(kind) => provider
            .list_enum_values(*kind)
            .await
            .map(MetadataValue::Names),
        MetadataKey::Schemas { connection } => provider
            .list_schemas(*connection)
            .await
            .map(MetadataValue::Names),
        MetadataKey::Tables { connection, schema } => provider
            .list_tables(*connection, schema)
            .await
            .map(MetadataValue::Names),
        MetadataKey::Columns {
            connection,
            schema,
            table,
        } => provider
            .list_columns(*connection, schema, table)
            .await
            .map(MetadataValue::Names),
        MetadataKey::TypedColumns {
            connection,
            schema,
            table,
            filter,
        } => provider
            .list_columns_with_types(*connection, schema, table, Some(*filter))
            .await
            .map(MetadataValue::Columns),
    }
}
