//! Schema discovery: build a [`SchemaCatalog`] from a live host.
//!
//! Discovery is a best-effort sweep. Only the top-level database listing is
//! fatal; a database whose tables cannot be listed is skipped, and a table
//! whose columns cannot be described is kept with no columns.

use askdb_core::catalog::is_system_schema;
use askdb_core::{DatabaseEntry, SchemaCatalog, TableEntry};

use crate::error::CatalogError;
use crate::introspect::DbIntrospector;

/// A catalog plus everything that was degraded while building it.
#[derive(Debug)]
pub struct DiscoveryReport {
    pub catalog: SchemaCatalog,
    /// [`CatalogError::PartialDiscovery`] entries, in the order they happened.
    pub skipped: Vec<CatalogError>,
}

/// Discover all user databases on `host`.
///
/// # Errors
///
/// Returns [`CatalogError::Connectivity`] if the database listing fails.
pub async fn refresh(
    introspector: &dyn DbIntrospector,
    host: &str,
) -> Result<SchemaCatalog, CatalogError> {
    discover(introspector, host).await.map(|r| r.catalog)
}

/// Like [`refresh`], also returning the partial failures.
///
/// # Errors
///
/// Returns [`CatalogError::Connectivity`] if the database listing fails.
pub async fn discover(
    introspector: &dyn DbIntrospector,
    host: &str,
) -> Result<DiscoveryReport, CatalogError> {
    let databases = introspector
        .list_databases(host)
        .await
        .map_err(|e| match e {
            CatalogError::Connectivity { .. } => e,
            other => CatalogError::Connectivity {
                target: host.to_string(),
                message: other.to_string(),
            },
        })?;

    let mut catalog = SchemaCatalog::new(host);
    let mut skipped = Vec::new();

    for db in databases.iter().filter(|db| !is_system_schema(db)) {
        let tables = match introspector.list_tables(host, db).await {
            Ok(tables) => tables,
            Err(error) => {
                tracing::warn!(database = %db, %error, "failed to list tables; skipping database");
                skipped.push(CatalogError::partial(db.as_str(), &error));
                continue;
            }
        };

        if tables.is_empty() {
            continue;
        }

        let mut entry = DatabaseEntry::new(db.as_str());
        for table in tables {
            let columns = match introspector.describe_columns(host, db, &table).await {
                Ok(pairs) => TableEntry::from_pairs(pairs),
                Err(error) => {
                    tracing::warn!(
                        database = %db,
                        table = %table,
                        %error,
                        "failed to describe table"
                    );
                    skipped.push(CatalogError::partial(format!("{db}.{table}"), &error));
                    TableEntry::empty()
                }
            };
            entry.insert_table(table, columns);
        }
        catalog.insert_database(entry)?;
    }

    tracing::info!(
        host,
        databases = catalog.total_databases(),
        tables = catalog.total_tables(),
        skipped = skipped.len(),
        "schema discovery finished"
    );

    Ok(DiscoveryReport { catalog, skipped })
}
