// conflux/src/commands/inspect.rs
//
// USE CASE: browse the metadata catalog, one level at a time.

use comfy_table::{Table, presets::UTF8_FULL};
use std::path::PathBuf;

use conflux_core::domain::metadata::EnumKind;
use conflux_core::ports::MetadataProvider;

use super::Project;

pub async fn execute(
    project_dir: PathBuf,
    connection: Option<i64>,
    schema: Option<String>,
    table: Option<String>,
) -> anyhow::Result<()> {
    let project = Project::open(&project_dir)?;
    let catalog = &project.catalog;

    match (connection, schema, table) {
        (Some(id), Some(schema), Some(table)) => {
            println!("\n🔍 Columns of {}.{} (connection {})", schema, table, id);
            let columns = catalog.list_columns_with_types(id, &schema, &table, None).await?;
            let mut out = Table::new();
            out.load_preset(UTF8_FULL).set_header(vec!["Column", "Type"]);
            for c in columns {
                out.add_row(vec![c.name, c.data_type]);
            }
            println!("{}", out);
        }
        (Some(id), Some(schema), None) => {
            println!("\n🔍 Tables in {} (connection {})", schema, id);
            for t in catalog.list_tables(id, &schema).await? {
                println!("   ➜ {}", t);
            }
        }
        (Some(id), None, _) => {
            println!("\n🔍 Schemas on connection {}", id);
            for s in catalog.list_schemas(id).await? {
                println!("   ➜ {}", s);
            }
        }
        (None, _, _) => {
            let mut out = Table::new();
            out.load_preset(UTF8_FULL)
                .set_header(vec!["Id", "Name", "Type"]);
            for c in catalog.list_connections().await? {
                out.add_row(vec![c.id.to_string(), c.name, c.connection_type]);
            }
            println!("\n🔌 Connections\n{}", out);

            let systems = catalog.list_enum_values(EnumKind::SourceSystems).await?;
            println!("   Systems: {}", systems.join(", "));
        }
    }
    Ok(())
}
