//! CLI runner - executes commands

use crate::catalog::{schema_from_catalog, DuckDbCatalog};
use crate::cli::commands::{Cli, Commands, OutputFormat};
use crate::config::{CatalogSource, ConvertConfig};
use crate::decode::{read_records, DecoderFormat};
use crate::error::{Error, Result};
use crate::ingest::{ingest_data, IngestOptions, TimestampFallback};
use crate::output::{read_parquet, CompressionCodec};
use crate::pipeline::convert_file;
use crate::schema::ColumnPlanSource;
use crate::types::{FieldAliases, TypeDescriptor, TypedSchema};
use arrow::record_batch::RecordBatch;
use serde_json::{json, Value};
use std::path::Path;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

/// Convert flags that override config file values
struct ConvertOverrides<'a> {
    input_format: Option<DecoderFormat>,
    schema: Option<&'a str>,
    aliases: &'a [(String, String)],
    date_format: Option<&'a str>,
    timestamp_fallback: Option<TimestampFallback>,
    compression: Option<CompressionCodec>,
    row_group_size: Option<usize>,
    partition_cols: &'a [String],
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Convert {
                input,
                output,
                input_format,
                schema,
                aliases,
                date_format,
                timestamp_fallback,
                compression,
                row_group_size,
                partition_cols,
            } => {
                let overrides = ConvertOverrides {
                    input_format: *input_format,
                    schema: schema.as_deref(),
                    aliases,
                    date_format: date_format.as_deref(),
                    timestamp_fallback: *timestamp_fallback,
                    compression: *compression,
                    row_group_size: *row_group_size,
                    partition_cols,
                };
                self.convert(input, output, &overrides)
            }
            Commands::Discover {
                input,
                input_format,
                backend,
                uri,
                db_schema,
                table,
                partition_columns,
            } => match (input, backend, uri, table) {
                (Some(input), ..) => {
                    self.discover_from_file(input, input_format.unwrap_or_default())
                }
                (None, Some(backend), Some(uri), Some(table)) => {
                    let source = CatalogSource {
                        backend: *backend,
                        uri: uri.clone(),
                        schema: db_schema.clone(),
                        table: table.clone(),
                        partition_columns: partition_columns.clone(),
                    };
                    self.discover_from_catalog(&source)
                }
                _ => Err(Error::config(
                    "discover needs --input, or --backend, --uri and --table",
                )),
            },
            Commands::Inspect { path, limit } => self.inspect(path, *limit),
        }
    }

    /// Load the config file, or defaults when none was given
    fn load_config(&self) -> Result<ConvertConfig> {
        match &self.cli.config {
            Some(path) => ConvertConfig::load(path),
            None => Ok(ConvertConfig::default()),
        }
    }

    /// Apply command-line flags on top of the config file
    fn merge_overrides(
        mut config: ConvertConfig,
        overrides: &ConvertOverrides<'_>,
    ) -> Result<ConvertConfig> {
        if let Some(format) = overrides.input_format {
            config.format = format;
        }
        if let Some(schema) = overrides.schema {
            config.schema = serde_json::from_str(schema)
                .map_err(|e| Error::config(format!("Invalid --schema JSON: {e}")))?;
            config.catalog = None;
        }
        if !overrides.aliases.is_empty() {
            let mut aliases = config.field_aliases.take().unwrap_or_default();
            for (source, output) in overrides.aliases {
                aliases.insert(source.clone(), output.clone());
            }
            config.field_aliases = Some(aliases);
        }
        if let Some(format) = overrides.date_format {
            config.date_format = Some(format.to_string());
        }
        if let Some(fallback) = overrides.timestamp_fallback {
            config.timestamp_fallback = fallback;
        }
        if let Some(compression) = overrides.compression {
            config.output.compression = compression;
        }
        if let Some(size) = overrides.row_group_size {
            config.output.row_group_size = Some(size);
        }
        if !overrides.partition_cols.is_empty() {
            config.output.partition_cols = overrides.partition_cols.to_vec();
        }

        config.validate()?;
        Ok(config)
    }

    /// Convert a file
    fn convert(
        &self,
        input: &Path,
        output: &Path,
        overrides: &ConvertOverrides<'_>,
    ) -> Result<()> {
        let config = Self::merge_overrides(self.load_config()?, overrides)?;

        let source = match &config.catalog {
            Some(catalog) => ColumnPlanSource::TypedSchema(Self::catalog_schema(catalog)?),
            None => config.column_source()?,
        };
        tracing::debug!(source = source.kind(), "Resolved column source");

        let report = convert_file(
            input,
            output,
            config.format,
            &source,
            &config.ingest_options(),
            &config.output,
        )?;

        for warning in &report.warnings {
            self.output_message(&json!({
                "type": "LOG",
                "log": {
                    "level": "WARN",
                    "message": warning.to_string()
                }
            }));
        }

        self.output_message(&json!({
            "type": "CONVERT_RESULT",
            "result": {
                "input": input.display().to_string(),
                "rows": report.rows,
                "columns": report.columns,
                "files": report
                    .files
                    .iter()
                    .map(|f| f.display().to_string())
                    .collect::<Vec<_>>(),
                "warnings": report.warnings.len()
            }
        }));

        Ok(())
    }

    /// Fetch a typed schema from a warehouse catalog
    fn catalog_schema(source: &CatalogSource) -> Result<TypedSchema> {
        let catalog = DuckDbCatalog::connect(source.backend, &source.uri)?;
        schema_from_catalog(
            &catalog,
            &source.schema,
            &source.table,
            &source.partition_columns,
        )
    }

    /// Print the typed schema of a warehouse table
    fn discover_from_catalog(&self, source: &CatalogSource) -> Result<()> {
        let schema = Self::catalog_schema(source)?;
        self.output_message(&json!({
            "type": "SCHEMA",
            "table": format!("{}.{}", source.schema, source.table),
            "schema": serde_json::to_value(&schema)?
        }));
        Ok(())
    }

    /// Print the inferred schema of an input file
    fn discover_from_file(&self, input: &Path, format: DecoderFormat) -> Result<()> {
        let records = read_records(input, format)?;
        let batch = ingest_data(&records, &ColumnPlanSource::None, &IngestOptions::default())?;

        let fields: Vec<Value> = batch
            .schema()
            .fields()
            .iter()
            .map(|field| {
                // Nested and all-null columns have no descriptor
                let type_name = TypeDescriptor::from_arrow(field.data_type())
                    .map_or_else(|| field.data_type().to_string(), |t| t.to_string());
                json!({ "name": field.name(), "type": type_name })
            })
            .collect();

        self.output_message(&json!({
            "type": "SCHEMA",
            "input": input.display().to_string(),
            "records": records.len(),
            "schema": { "fields": fields }
        }));
        Ok(())
    }

    /// Print schema and leading rows of a Parquet file
    fn inspect(&self, path: &Path, limit: usize) -> Result<()> {
        let table = read_parquet(path)?;

        let fields: Vec<Value> = table
            .schema()
            .fields()
            .iter()
            .map(|field| {
                json!({
                    "name": field.name(),
                    "type": field.data_type().to_string(),
                    "nullable": field.is_nullable()
                })
            })
            .collect();

        let head = table.slice(0, limit.min(table.num_rows()));
        self.output_message(&json!({
            "type": "PARQUET_FILE",
            "path": path.display().to_string(),
            "rows": table.num_rows(),
            "fields": fields,
            "head": batch_to_json(&head)?
        }));
        Ok(())
    }

    /// Output a message
    fn output_message(&self, msg: &Value) {
        match self.cli.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string(msg).unwrap_or_default());
            }
            OutputFormat::Pretty => {
                println!("{}", serde_json::to_string_pretty(msg).unwrap_or_default());
            }
        }
    }
}

/// Render batch rows as JSON objects
fn batch_to_json(batch: &RecordBatch) -> Result<Vec<Value>> {
    if batch.num_rows() == 0 {
        return Ok(Vec::new());
    }

    let mut writer = arrow::json::ArrayWriter::new(Vec::new());
    writer.write(batch)?;
    writer.finish()?;
    let rows: Vec<Value> = serde_json::from_slice(&writer.into_inner())?;
    Ok(rows)
}
