//! [`DbIntrospector`] over cached driver connections using MySQL statements.
//!
//! Host-level calls (`SHOW DATABASES`) use a connection without a default
//! database; everything else uses the connection cached for that database.

use askdb_core::{qualified_name, quote_ident};
use async_trait::async_trait;

use crate::connection::{ConnectionCache, Connector};
use crate::error::CatalogError;
use crate::introspect::{DbIntrospector, RowSet, cell_text};

/// Introspection through `SHOW` / `DESCRIBE` statements.
pub struct CommandIntrospector<C: Connector> {
    cache: ConnectionCache<C>,
}

impl<C: Connector> CommandIntrospector<C> {
    #[must_use]
    pub const fn new(cache: ConnectionCache<C>) -> Self {
        Self { cache }
    }

    #[must_use]
    pub const fn cache(&self) -> &ConnectionCache<C> {
        &self.cache
    }
}

#[async_trait]
impl<C: Connector> DbIntrospector for CommandIntrospector<C>
where
    C::Conn: 'static,
{
    async fn list_databases(&self, host: &str) -> Result<Vec<String>, CatalogError> {
        let rows = self.cache.query(host, None, "SHOW DATABASES").await?;
        Ok(rows.text_column(0))
    }

    async fn list_tables(&self, host: &str, database: &str) -> Result<Vec<String>, CatalogError> {
        let rows = self.cache.query(host, Some(database), "SHOW TABLES").await?;
        Ok(rows.text_column(0))
    }

    async fn describe_columns(
        &self,
        host: &str,
        database: &str,
        table: &str,
    ) -> Result<Vec<(String, String)>, CatalogError> {
        let sql = format!("DESCRIBE {}", quote_ident(table));
        let rows = self.cache.query(host, Some(database), &sql).await?;
        Ok(rows
            .text_column(0)
            .into_iter()
            .zip(rows.text_column(1))
            .collect())
    }

    async fn get_ddl(&self, host: &str, database: &str, table: &str) -> Option<String> {
        let sql = format!("SHOW CREATE TABLE {}", qualified_name(database, table));
        match self.cache.query(host, Some(database), &sql).await {
            Ok(rows) => create_statement(&rows),
            Err(error) => {
                tracing::warn!(database, table, %error, "failed to fetch DDL");
                None
            }
        }
    }

    async fn run_query(
        &self,
        host: &str,
        database: &str,
        sql: &str,
    ) -> Result<RowSet, CatalogError> {
        self.cache.query(host, Some(database), sql).await
    }
}

/// `SHOW CREATE TABLE` returns `(Table, Create Table)`; take the second cell.
fn create_statement(rows: &RowSet) -> Option<String> {
    rows.rows
        .first()
        .and_then(|row| row.get(1))
        .map(cell_text)
        .filter(|ddl| !ddl.is_empty())
}
