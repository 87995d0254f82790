//! Attempt store abstraction.

#![allow(async_fn_in_trait)]

use safecode_core::SecurityCode;

use crate::error::StorageResult;
use crate::tried::TriedSet;

/// Durable, append-only record of attempted codes.
///
/// The store is the only source of truth across restarts: [`record`] must
/// not return until the attempt is durable, and [`load`] must return every
/// recorded code.
///
/// [`record`]: AttemptStore::record
/// [`load`]: AttemptStore::load
pub trait AttemptStore: Send + Sync {
    /// Read every recorded attempt.
    ///
    /// Loading twice without recording in between yields equal sets.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be read. Individual unparseable
    /// entries are skipped, not reported as errors.
    async fn load(&mut self) -> StorageResult<TriedSet>;

    /// Append one attempt durably.
    ///
    /// # Errors
    ///
    /// Returns an error if the attempt could not be made durable.
    async fn record(&mut self, code: SecurityCode) -> StorageResult<()>;
}
