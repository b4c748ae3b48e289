//! DuckDB-backed column catalog
//!
//! Redshift and PostgreSQL are reached through DuckDB's postgres extension,
//! attached read-only. DuckDB database files are attached natively.

use super::types::{CatalogBackend, CatalogColumn, ColumnCatalog};
use crate::error::{Error, Result};
use duckdb::Connection;
use url::Url;

const ATTACHED_DB: &str = "source_db";

const COLUMN_PROJECTION: &str = "column_name::text, data_type::text, \
     numeric_precision::int, numeric_scale::int, datetime_precision::int";

/// Column catalog served by a DuckDB connection
pub struct DuckDbCatalog {
    conn: Connection,
    backend: CatalogBackend,
    /// Whether the target database is attached as `source_db`
    attached: bool,
}

impl DuckDbCatalog {
    /// Connect to a warehouse catalog
    ///
    /// `uri` is a `postgresql://` (or `redshift://`) URI for the remote
    /// backends, and a file path or `:memory:` for DuckDB.
    pub fn connect(backend: CatalogBackend, uri: &str) -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| Error::config(format!("Failed to create DuckDB connection: {e}")))?;

        tracing::debug!(%backend, uri = %redact_uri(uri), "Connecting to catalog");

        let attached = match backend {
            CatalogBackend::Redshift | CatalogBackend::Postgres => {
                conn.execute_batch("INSTALL postgres; LOAD postgres;")
                    .map_err(|e| {
                        Error::config(format!("Failed to load postgres extension: {e}"))
                    })?;

                let attach_sql = format!(
                    "ATTACH {} AS {ATTACHED_DB} (TYPE POSTGRES, READ_ONLY);",
                    quote_literal(&postgres_uri(uri))
                );
                conn.execute_batch(&attach_sql).map_err(|e| {
                    Error::config(format!("Failed to attach {backend} catalog: {e}"))
                })?;
                true
            }
            CatalogBackend::Duckdb if uri == ":memory:" => false,
            CatalogBackend::Duckdb => {
                let attach_sql =
                    format!("ATTACH {} AS {ATTACHED_DB} (READ_ONLY);", quote_literal(uri));
                conn.execute_batch(&attach_sql)
                    .map_err(|e| Error::config(format!("Failed to attach DuckDB: {e}")))?;
                true
            }
        };

        Ok(Self {
            conn,
            backend,
            attached,
        })
    }

    /// Use an existing DuckDB connection as the catalog
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn,
            backend: CatalogBackend::Duckdb,
            attached: false,
        }
    }

    /// Backend this catalog queries
    pub fn backend(&self) -> CatalogBackend {
        self.backend
    }

    fn build_query(&self, schema: &str, table: &str) -> String {
        let filter = format!(
            "table_schema = {} AND table_name = {}",
            quote_literal(schema),
            quote_literal(table)
        );

        match self.backend {
            CatalogBackend::Redshift | CatalogBackend::Postgres => {
                // svv_columns also covers Spectrum tables
                let view = if self.backend == CatalogBackend::Redshift {
                    "svv_columns"
                } else {
                    "information_schema.columns"
                };
                let remote = format!(
                    "SELECT {COLUMN_PROJECTION} FROM {view} WHERE {filter} ORDER BY column_name"
                );
                format!(
                    "SELECT * FROM postgres_query('{ATTACHED_DB}', {})",
                    quote_literal(&remote)
                )
            }
            CatalogBackend::Duckdb => {
                let catalog = if self.attached {
                    quote_literal(ATTACHED_DB)
                } else {
                    "current_database()".to_string()
                };
                format!(
                    "SELECT {COLUMN_PROJECTION} FROM information_schema.columns \
                     WHERE table_catalog = {catalog} AND {filter} ORDER BY column_name"
                )
            }
        }
    }
}

impl ColumnCatalog for DuckDbCatalog {
    fn fetch_columns(&self, schema: &str, table: &str) -> Result<Vec<CatalogColumn>> {
        let query = self.build_query(schema, table);
        tracing::debug!(backend = %self.backend, "Running catalog query: {}", query);

        let mut stmt = self.conn.prepare(&query)?;
        let columns = stmt
            .query_map([], |row| {
                Ok(CatalogColumn {
                    name: row.get(0)?,
                    data_type: row.get(1)?,
                    numeric_precision: row.get(2)?,
                    numeric_scale: row.get(3)?,
                    datetime_precision: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(columns)
    }
}

/// Quote a SQL string literal
fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Redshift speaks the PostgreSQL wire protocol
fn postgres_uri(uri: &str) -> String {
    match uri.strip_prefix("redshift://") {
        Some(rest) => format!("postgresql://{rest}"),
        None => uri.to_string(),
    }
}

/// Connection URI with any password masked, for logging
pub fn redact_uri(uri: &str) -> String {
    match Url::parse(uri) {
        Ok(mut url) if url.password().is_some() => {
            if url.set_password(Some("***")).is_err() {
                return "<redacted>".to_string();
            }
            url.to_string()
        }
        _ => uri.to_string(),
    }
}
