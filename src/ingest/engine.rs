//! Row-to-column conversion
//!
//! Transposes records into per-column value buffers and builds one typed
//! array per column plan entry.

use super::coerce::coerce_column;
use super::infer::build_inferred;
use super::types::{IngestOptions, Ingested};
use crate::error::Result;
use crate::schema::{resolve, ColumnPlan, ColumnPlanSource};
use crate::types::Record;
use arrow::array::ArrayRef;
use arrow::datatypes::{Field, Schema};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use serde_json::Value;
use std::sync::Arc;

/// Convert records into a batch following a resolved plan
///
/// Missing fields become nulls. Fails on the first value that cannot be
/// coerced to its declared type, except timestamps handled by the fallback
/// policy, which are reported in [`Ingested::warnings`].
pub fn convert(records: &[Record], plan: &ColumnPlan, options: &IngestOptions) -> Result<Ingested> {
    let mut warnings = Vec::new();
    let mut fields: Vec<Field> = Vec::with_capacity(plan.len());
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(plan.len());

    for entry in plan.entries() {
        let values: Vec<Option<&Value>> = records
            .iter()
            .map(|record| record.get(&entry.source_field))
            .collect();

        let array = match &entry.target_type {
            Some(target) => {
                coerce_column(&entry.output_name, &values, target, options, &mut warnings)?
            }
            None => build_inferred(&values)?,
        };

        fields.push(Field::new(&entry.output_name, array.data_type().clone(), true));
        columns.push(array);
    }

    // Row count is explicit so that a plan with no columns still yields a valid batch
    let batch = RecordBatch::try_new_with_options(
        Arc::new(Schema::new(fields)),
        columns,
        &RecordBatchOptions::new().with_row_count(Some(records.len())),
    )?;

    if !warnings.is_empty() {
        tracing::warn!(
            count = warnings.len(),
            "Replaced unconvertible timestamps with the maximum timestamp"
        );
    }
    tracing::debug!(
        rows = batch.num_rows(),
        columns = batch.num_columns(),
        "Converted records"
    );

    Ok(Ingested { batch, warnings })
}

/// Resolve a plan for the records and convert them
pub fn ingest(
    records: &[Record],
    source: &ColumnPlanSource,
    options: &IngestOptions,
) -> Result<Ingested> {
    let plan = resolve(records, source, options.field_aliases.as_ref())?;
    convert(records, &plan, options)
}

/// Resolve and convert, keeping only the batch
pub fn ingest_data(
    records: &[Record],
    source: &ColumnPlanSource,
    options: &IngestOptions,
) -> Result<RecordBatch> {
    ingest(records, source, options).map(Ingested::into_batch)
}
