//! In-memory schema catalog for one database host.
//!
//! A [`SchemaCatalog`] is a snapshot of the databases, tables, and columns
//! discovered on a host. Database order is discovery order and is the order
//! every consumer (trainer, router, executor) walks. System schemas are never
//! part of a catalog.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::priority::PrioritySet;

/// Schemas excluded from every catalog.
pub const SYSTEM_SCHEMAS: &[&str] = &["information_schema", "mysql", "performance_schema", "sys"];

/// Placeholder rendered when a column has no recorded type.
const UNKNOWN_TYPE: &str = "未知类型";

/// Returns `true` if `name` is one of the excluded system schemas.
#[must_use]
pub fn is_system_schema(name: &str) -> bool {
    SYSTEM_SCHEMAS.contains(&name)
}

/// Backtick-quote an identifier, doubling embedded backticks.
#[must_use]
pub fn quote_ident(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Quoted `` `database`.`table` `` reference.
#[must_use]
pub fn qualified_name(database: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(database), quote_ident(table))
}

// ---------------------------------------------------------------------------
// TableEntry
// ---------------------------------------------------------------------------

/// Column layout of one table.
///
/// `columns` and `column_types` are index-aligned; the constructors keep
/// their lengths equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTableEntry")]
pub struct TableEntry {
    columns: Vec<String>,
    column_types: Vec<String>,
}

impl TableEntry {
    /// Build a table entry from `(name, type)` pairs in column order.
    #[must_use]
    pub fn from_pairs<I, N, T>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, T)>,
        N: Into<String>,
        T: Into<String>,
    {
        let (columns, column_types) = pairs
            .into_iter()
            .map(|(name, ty)| (name.into(), ty.into()))
            .unzip();
        Self {
            columns,
            column_types,
        }
    }

    /// Build a table entry from parallel name and type lists.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::ColumnMismatch`] if the lists differ in length.
    pub fn from_parallel(
        table: &str,
        columns: Vec<String>,
        column_types: Vec<String>,
    ) -> Result<Self, CoreError> {
        if columns.len() != column_types.len() {
            return Err(CoreError::ColumnMismatch {
                table: table.to_string(),
                columns: columns.len(),
                types: column_types.len(),
            });
        }
        Ok(Self {
            columns,
            column_types,
        })
    }

    /// An entry with no columns. Used when describing a table failed.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub fn column_types(&self) -> &[String] {
        &self.column_types
    }

    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn has_columns(&self) -> bool {
        !self.columns.is_empty()
    }

    /// Iterate `(name, type)` pairs in column order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .zip(&self.column_types)
            .map(|(c, t)| (c.as_str(), t.as_str()))
    }

    /// Render each column as `name (type)`.
    ///
    /// Missing types render as a placeholder rather than shifting alignment.
    #[must_use]
    pub fn described_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .enumerate()
            .map(|(i, col)| {
                let ty = self.column_types.get(i).map_or(UNKNOWN_TYPE, String::as_str);
                format!("{col} ({ty})")
            })
            .collect()
    }
}

/// Wire form of [`TableEntry`], checked before it becomes one.
#[derive(Deserialize)]
struct RawTableEntry {
    #[serde(default)]
    columns: Vec<String>,
    #[serde(default)]
    column_types: Vec<String>,
}

impl RawTableEntry {
    fn into_entry(self, table: &str) -> Result<TableEntry, CoreError> {
        TableEntry::from_parallel(table, self.columns, self.column_types)
    }
}

impl TryFrom<RawTableEntry> for TableEntry {
    type Error = CoreError;

    fn try_from(raw: RawTableEntry) -> Result<Self, Self::Error> {
        raw.into_entry("(unnamed)")
    }
}

// ---------------------------------------------------------------------------
// DatabaseEntry
// ---------------------------------------------------------------------------

/// Tables of one database, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawDatabaseEntry")]
pub struct DatabaseEntry {
    pub name: String,
    tables: Vec<String>,
    table_info: HashMap<String, TableEntry>,
}

impl DatabaseEntry {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tables: Vec::new(),
            table_info: HashMap::new(),
        }
    }

    /// Add a table, or replace the columns of an existing one.
    ///
    /// Replacement keeps the table's original position.
    pub fn insert_table(&mut self, table: impl Into<String>, entry: TableEntry) {
        let table = table.into();
        if !self.table_info.contains_key(&table) {
            self.tables.push(table.clone());
        }
        self.table_info.insert(table, entry);
    }

    /// Builder-style [`Self::insert_table`].
    #[must_use]
    pub fn with_table(mut self, table: impl Into<String>, entry: TableEntry) -> Self {
        self.insert_table(table, entry);
        self
    }

    /// Table names in discovery order.
    #[must_use]
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableEntry> {
        self.table_info.get(name)
    }

    #[must_use]
    pub fn table_count(&self) -> usize {
        self.tables.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// Wire form of [`DatabaseEntry`]. `tables` and `table_info` must name the
/// same tables, each once.
#[derive(Deserialize)]
struct RawDatabaseEntry {
    name: String,
    #[serde(default)]
    tables: Vec<String>,
    #[serde(default)]
    table_info: HashMap<String, RawTableEntry>,
}

impl TryFrom<RawDatabaseEntry> for DatabaseEntry {
    type Error = CoreError;

    fn try_from(raw: RawDatabaseEntry) -> Result<Self, Self::Error> {
        let RawDatabaseEntry {
            name,
            tables,
            mut table_info,
        } = raw;
        let mut entry = Self::new(name);
        for table in tables {
            let Some(columns) = table_info.remove(&table) else {
                return Err(CoreError::Validation(format!(
                    "table '{}.{table}' is listed twice or has no column info",
                    entry.name
                )));
            };
            let columns = columns.into_entry(&table)?;
            entry.insert_table(table, columns);
        }
        if let Some(extra) = table_info.keys().next() {
            return Err(CoreError::Validation(format!(
                "table '{}.{extra}' has column info but is not listed",
                entry.name
            )));
        }
        Ok(entry)
    }
}

// ---------------------------------------------------------------------------
// SchemaCatalog
// ---------------------------------------------------------------------------

/// Discovered structure of one host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSchemaCatalog")]
pub struct SchemaCatalog {
    pub host: String,
    pub discovered_at: DateTime<Utc>,
    databases: Vec<DatabaseEntry>,
}

impl SchemaCatalog {
    /// An empty catalog stamped with the current time.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            discovered_at: Utc::now(),
            databases: Vec::new(),
        }
    }

    /// Add a database, replacing any existing entry with the same name.
    ///
    /// System schemas are rejected so the exclusion policy holds no matter
    /// how the catalog was assembled.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::Validation`] for a system schema name.
    pub fn insert_database(&mut self, entry: DatabaseEntry) -> Result<(), CoreError> {
        if is_system_schema(&entry.name) {
            return Err(CoreError::Validation(format!(
                "system schema '{}' cannot be catalogued",
                entry.name
            )));
        }
        if let Some(existing) = self.databases.iter_mut().find(|d| d.name == entry.name) {
            *existing = entry;
        } else {
            self.databases.push(entry);
        }
        Ok(())
    }

    /// Builder-style [`Self::insert_database`].
    ///
    /// # Errors
    ///
    /// Same as [`Self::insert_database`].
    pub fn with_database(mut self, entry: DatabaseEntry) -> Result<Self, CoreError> {
        self.insert_database(entry)?;
        Ok(self)
    }

    /// Databases in discovery order.
    #[must_use]
    pub fn databases(&self) -> &[DatabaseEntry] {
        &self.databases
    }

    /// Database names in discovery order.
    pub fn database_names(&self) -> impl Iterator<Item = &str> {
        self.databases.iter().map(|d| d.name.as_str())
    }

    #[must_use]
    pub fn database(&self, name: &str) -> Option<&DatabaseEntry> {
        self.databases.iter().find(|d| d.name == name)
    }

    #[must_use]
    pub fn contains_database(&self, name: &str) -> bool {
        self.database(name).is_some()
    }

    /// Look up one table's columns.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if the database or table is unknown.
    pub fn table(&self, database: &str, table: &str) -> Result<&TableEntry, CoreError> {
        self.database(database)
            .ok_or_else(|| CoreError::unknown_database(database))?
            .table(table)
            .ok_or_else(|| CoreError::unknown_table(database, table))
    }

    #[must_use]
    pub fn total_databases(&self) -> usize {
        self.databases.len()
    }

    #[must_use]
    pub fn total_tables(&self) -> usize {
        self.databases.iter().map(DatabaseEntry::table_count).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.databases.is_empty()
    }

    /// Every table as a `database.table` identifier, in catalog order.
    #[must_use]
    pub fn qualified_tables(&self) -> Vec<String> {
        self.databases
            .iter()
            .flat_map(|db| db.tables().iter().map(move |t| format!("{}.{t}", db.name)))
            .collect()
    }

    /// Split databases into `(priority, other)`, each keeping catalog order.
    #[must_use]
    pub fn partition_by_priority<'a>(
        &'a self,
        priority: &PrioritySet,
    ) -> (Vec<&'a DatabaseEntry>, Vec<&'a DatabaseEntry>) {
        self.databases
            .iter()
            .partition(|db| priority.contains(&db.name))
    }

    /// Databases with priority ones first, each group in catalog order.
    #[must_use]
    pub fn priority_order<'a>(&'a self, priority: &PrioritySet) -> Vec<&'a DatabaseEntry> {
        let (mut first, rest) = self.partition_by_priority(priority);
        first.extend(rest);
        first
    }
}

/// Wire form of [`SchemaCatalog`]. Every database goes through
/// [`SchemaCatalog::insert_database`], and names must be unique.
#[derive(Deserialize)]
struct RawSchemaCatalog {
    host: String,
    discovered_at: DateTime<Utc>,
    #[serde(default)]
    databases: Vec<DatabaseEntry>,
}

impl TryFrom<RawSchemaCatalog> for SchemaCatalog {
    type Error = CoreError;

    fn try_from(raw: RawSchemaCatalog) -> Result<Self, Self::Error> {
        let mut catalog = Self {
            host: raw.host,
            discovered_at: raw.discovered_at,
            databases: Vec::with_capacity(raw.databases.len()),
        };
        for entry in raw.databases {
            if catalog.contains_database(&entry.name) {
                return Err(CoreError::Validation(format!(
                    "database '{}' appears more than once",
                    entry.name
                )));
            }
            catalog.insert_database(entry)?;
        }
        Ok(catalog)
    }
}
