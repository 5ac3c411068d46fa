// conflux-core/src/infrastructure/adapters/catalog.rs
//
// Metadata Provider backed by a YAML catalog file: connections with their schemas,
// tables and typed columns, plus the enumerated lists the console offers.

use async_trait::async_trait;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, instrument};

use crate::domain::metadata::{Connection, EnumKind, TypeFilter, TypedColumn};
use crate::domain::policy::{
    EndpointKind, ExecutionLayer, Flag, LoadType, ModeValue, ReconType, ValidationType,
};
use crate::infrastructure::error::InfrastructureError;
use crate::infrastructure::fs::read_yaml;
use crate::ports::metadata::{MetadataError, MetadataProvider};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogFile {
    #[serde(default)]
    pub connections: Vec<CatalogConnection>,
    #[serde(default)]
    pub enums: BTreeMap<EnumKind, Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConnection {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub connection_type: String,
    /// Simulates an unreachable source: every listing below it fails.
    #[serde(default)]
    pub offline: bool,
    #[serde(default)]
    pub schemas: Vec<CatalogSchema>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogSchema {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<CatalogTable>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogTable {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<CatalogColumn>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogColumn {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
}

pub struct YamlCatalog {
    catalog: CatalogFile,
    date_types: Vec<Regex>,
}

impl YamlCatalog {
    #[instrument(skip(date_types))]
    pub fn open(path: &Path, date_types: &[String]) -> Result<Self, InfrastructureError> {
        if !path.exists() {
            return Err(InfrastructureError::ConfigNotFound(format!(
                "Metadata catalog {:?} does not exist",
                path
            )));
        }
        let catalog: CatalogFile = read_yaml(path)?;
        info!(
            connections = catalog.connections.len(),
            "📚 Metadata catalog loaded"
        );
        Self::new(catalog, date_types)
    }

    pub fn new(catalog: CatalogFile, date_types: &[String]) -> Result<Self, InfrastructureError> {
        let date_types = date_types
            .iter()
            .map(|p| {
                RegexBuilder::new(p)
                    .case_insensitive(true)
                    .build()
                    .map_err(|e| InfrastructureError::ConfigError(format!("date_types: {}", e)))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            catalog,
            date_types,
        })
    }

    fn connection(&self, id: i64) -> Result<&CatalogConnection, MetadataError> {
        let conn = self
            .catalog
            .connections
            .iter()
            .find(|c| c.id == id)
            .ok_or_else(|| MetadataError::NotFound(format!("connection {}", id)))?;
        if conn.offline {
            return Err(MetadataError::Unavailable(format!(
                "connection {} ({}) is offline",
                id, conn.name
            )));
        }
        Ok(conn)
    }

    fn schema(&self, id: i64, schema: &str) -> Result<&CatalogSchema, MetadataError> {
        self.connection(id)?
            .schemas
            .iter()
            .find(|s| s.name == schema)
            .ok_or_else(|| MetadataError::NotFound(format!("schema {} on connection {}", schema, id)))
    }

    fn table(&self, id: i64, schema: &str, table: &str) -> Result<&CatalogTable, MetadataError> {
        self.schema(id, schema)?
            .tables
            .iter()
            .find(|t| t.name == table)
            .ok_or_else(|| MetadataError::NotFound(format!("table {}.{}", schema, table)))
    }

    fn is_date_like(&self, data_type: &str) -> bool {
        self.date_types.iter().any(|r| r.is_match(data_type.trim()))
    }

    /// Lists served when the catalog does not declare one.
    fn default_enum(&self, kind: EnumKind) -> Vec<String> {
        fn displays<T: ModeValue>() -> Vec<String> {
            T::ALL.iter().map(|v| v.display().to_string()).collect()
        }

        match kind {
            EnumKind::ExecutionLayers => displays::<ExecutionLayer>(),
            EnumKind::LoadTypes => displays::<LoadType>(),
            EnumKind::SourceTypes | EnumKind::TargetTypes => displays::<EndpointKind>(),
            EnumKind::ValidationTypes => displays::<ValidationType>(),
            EnumKind::ReconTypes => displays::<ReconType>(),
            EnumKind::ActiveFlags => displays::<Flag>(),
            EnumKind::SourceSystems | EnumKind::TargetSystems => {
                let mut systems: Vec<String> = Vec::new();
                for c in &self.catalog.connections {
                    if !systems.contains(&c.connection_type) {
                        systems.push(c.connection_type.clone());
                    }
                }
                systems
            }
            EnumKind::Delimiters => [",", ";", "|", "\\t"].map(String::from).to_vec(),
            EnumKind::ExecutionSequences => ["Before Load", "After Load"].map(String::from).to_vec(),
        }
    }
}

#[async_trait]
impl MetadataProvider for YamlCatalog {
    async fn list_connections(&self) -> Result<Vec<Connection>, MetadataError> {
        Ok(self
            .catalog
            .connections
            .iter()
            .map(|c| Connection {
                id: c.id,
                name: c.name.clone(),
                connection_type: c.connection_type.clone(),
            })
            .collect())
    }

    async fn list_schemas(&self, connection_id: i64) -> Result<Vec<String>, MetadataError> {
        Ok(self
            .connection(connection_id)?
            .schemas
            .iter()
            .map(|s| s.name.clone())
            .collect())
    }

    async fn list_tables(
        &self,
        connection_id: i64,
        schema: &str,
    ) -> Result<Vec<String>, MetadataError> {
        Ok(self
            .schema(connection_id, schema)?
            .tables
            .iter()
            .map(|t| t.name.clone())
            .collect())
    }

    async fn list_columns(
        &self,
        connection_id: i64,
        schema: &str,
        table: &str,
    ) -> Result<Vec<String>, MetadataError> {
        Ok(self
            .table(connection_id, schema, table)?
            .columns
            .iter()
            .map(|c| c.name.clone())
            .collect())
    }

    async fn list_columns_with_types(
        &self,
        connection_id: i64,
        schema: &str,
        table: &str,
        filter: Option<TypeFilter>,
    ) -> Result<Vec<TypedColumn>, MetadataError> {
        let columns = &self.table(connection_id, schema, table)?.columns;
        let typed: Vec<TypedColumn> = columns
            .iter()
            .filter(|c| match filter {
                Some(TypeFilter::DateLike) => self.is_date_like(&c.data_type),
                None => true,
            })
            .map(|c| TypedColumn {
                name: c.name.clone(),
                data_type: c.data_type.clone(),
            })
            .collect();
        debug!(
            "{}.{}: {} of {} column(s) kept by filter {:?}",
            schema,
            table,
            typed.len(),
            columns.len(),
            filter
        );
        Ok(typed)
    }

    async fn list_enum_values(&self, kind: EnumKind) -> Result<Vec<String>, MetadataError> {
        Ok(self
            .catalog
            .enums
            .get(&kind)
            .cloned()
            .unwrap_or_else(|| self.default_enum(kind)))
    }
}
