use futures::{StreamExt, stream};
use serde::Serialize;
use tracing::{debug, warn};

use crate::{models::Movie, store::MovieWriter};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FailedWrite {
    pub tconst: String,
    pub reason: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UpsertReport {
    pub written: usize,
    pub failed: Vec<FailedWrite>,
}

impl UpsertReport {
    pub fn merge(&mut self, other: UpsertReport) {
        self.written += other.written;
        self.failed.extend(other.failed);
    }
}

/// Upserts every record, at most `max_concurrent` at a time. A failed record
/// is reported and does not stop or undo the others.
pub async fn upsert_batch<W>(writer: &W, movies: Vec<Movie>, max_concurrent: usize) -> UpsertReport
where
    W: MovieWriter + ?Sized,
{
    let total = movies.len();

    let outcomes: Vec<(String, Option<String>)> = stream::iter(movies)
        .map(|movie| async move {
            match writer.upsert_movie(&movie).await {
                Ok(()) => (movie.tconst, None),
                Err(err) => {
                    warn!(tconst = %movie.tconst, error = %err, "failed to upsert movie");
                    (movie.tconst, Some(err.to_string()))
                },
            }
        })
        .buffer_unordered(max_concurrent.max(1))
        .collect()
        .await;

    let mut report = UpsertReport::default();
    for (tconst, failure) in outcomes {
        match failure {
            None => report.written += 1,
            Some(reason) => report.failed.push(FailedWrite { tconst, reason }),
        }
    }
    report.failed.sort_by(|a, b| a.tconst.cmp(&b.tconst));

    debug!(total, written = report.written, failed = report.failed.len(), "batch upserted");

    report
}
