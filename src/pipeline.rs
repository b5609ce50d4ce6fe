use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::{
    assemble::assemble,
    catalog::SourceCatalog,
    error::AppResult,
    joins::SourceBatch,
    models::Movie,
    store::MovieWriter,
    validate::{clear_out_of_range, validate},
    writer::{FailedWrite, UpsertReport, upsert_batch},
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PipelineConfig {
    pub batch_size: u64,
    pub max_concurrent_writes: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct PipelineSummary {
    pub titles_read: usize,
    pub assembled: usize,
    pub rejected: usize,
    pub written: usize,
    pub failed: Vec<FailedWrite>,
}

/// Joins, assembles and validates every title of a batch. Fields that break a
/// record constraint are cleared rather than dropping the title. Returns the
/// writable records and the number still rejected after clearing.
pub fn build_documents(batch: &SourceBatch) -> (Vec<Movie>, usize) {
    let mut movies = Vec::with_capacity(batch.titles.len());
    let mut rejected = 0;

    for mut movie in batch.join_all().filter_map(assemble) {
        let cleared = clear_out_of_range(&mut movie);
        if !cleared.is_empty() {
            let cleared: Vec<String> = cleared.iter().map(ToString::to_string).collect();
            debug!(tconst = %movie.tconst, ?cleared, "cleared out-of-range fields");
        }

        let issues = validate(&movie);
        if issues.is_empty() {
            movies.push(movie);
            continue;
        }

        rejected += 1;
        let issues: Vec<String> = issues.iter().map(ToString::to_string).collect();
        warn!(tconst = %movie.tconst, ?issues, "skipping invalid movie");
    }

    (movies, rejected)
}

/// One full pass over the source catalog. Safe to rerun: every record is
/// upserted by id and the index set is only created when missing.
pub async fn run<W>(catalog: &SourceCatalog, writer: &W, config: PipelineConfig) -> AppResult<PipelineSummary>
where
    W: MovieWriter + ?Sized,
{
    let started = Instant::now();
    let mut summary = PipelineSummary::default();
    let mut report = UpsertReport::default();
    let mut cursor: Option<String> = None;

    while let Some(batch) = catalog.next_batch(cursor.as_deref(), config.batch_size.max(1)).await? {
        cursor = batch.titles.last().map(|t| t.tconst.clone());
        summary.titles_read += batch.titles.len();

        let (movies, rejected) = build_documents(&batch);
        summary.assembled += movies.len() + rejected;
        summary.rejected += rejected;

        report.merge(upsert_batch(writer, movies, config.max_concurrent_writes).await);

        debug!(
            titles_read = summary.titles_read,
            written = report.written,
            cursor = cursor.as_deref().unwrap_or_default(),
            "batch complete"
        );
    }

    writer.ensure_indexes().await?;

    summary.written = report.written;
    summary.failed = report.failed;

    info!(
        titles_read = summary.titles_read,
        assembled = summary.assembled,
        rejected = summary.rejected,
        written = summary.written,
        failed = summary.failed.len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "pipeline finished"
    );

    Ok(summary)
}
