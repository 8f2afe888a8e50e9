//! One-call backup and restore
//!
//! `DatabaseHelper` owns a configured `DatabaseDump` and exposes the two
//! operations applications usually need, with restore progress reported
//! through `tracing` in 10% steps.

use tracing::info;

use crate::database::DatabaseBackend;
use crate::dump::{BackupReport, DatabaseDump, DumpResult, ProgressFn, RestoreReport, TableMasks};
use crate::storage::StorageBackend;

/// Backup/restore facade over a backend and a storage
pub struct DatabaseHelper<B: DatabaseBackend, S: StorageBackend> {
    dump: DatabaseDump<B, S>,
}

impl<B: DatabaseBackend, S: StorageBackend> DatabaseHelper<B, S> {
    /// Create a helper for the backend's dialect
    pub fn new(backend: B, storage: S) -> Self {
        Self {
            dump: DatabaseDump::new(backend, storage),
        }
    }

    /// Underlying dump engine
    pub fn dump(&self) -> &DatabaseDump<B, S> {
        &self.dump
    }

    /// Back up the database to `filename`
    ///
    /// `tables` replaces any masks from a previous call.
    pub async fn backup(
        &mut self,
        filename: &str,
        compress: bool,
        tables: TableMasks,
    ) -> DumpResult<BackupReport> {
        self.dump.set_compress(compress)?.set_tables(tables);
        self.dump.backup(filename).await
    }

    /// Restore the database from `filename`
    pub async fn restore(&mut self, filename: &str, compress: bool) -> DumpResult<RestoreReport> {
        self.dump
            .set_compress(compress)?
            .set_on_progress(Some(progress_logger(filename)));
        let report = self.dump.restore(filename).await;
        self.dump.set_on_progress(None);
        report
    }
}

/// Progress callback that logs once per 10% step
fn progress_logger(filename: &str) -> Box<ProgressFn<'static>> {
    let filename = filename.to_string();
    let mut last_step = 0u32;
    Box::new(move |count: usize, percent: f64| {
        let step = (percent / 10.0).floor().clamp(0.0, 10.0) as u32;
        if step > last_step {
            last_step = step;
            info!(
                "Restoring {}: {} statements executed ({}%)",
                filename,
                count,
                step * 10
            );
        }
    })
}
