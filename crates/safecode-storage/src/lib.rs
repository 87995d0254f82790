//! Attempt persistence for the safecode controller.
//!
//! Every attempted code is appended to a durable log before the search
//! treats it as tried. On restart the log is loaded into a [`TriedSet`] and
//! the search resumes where it stopped.
//!
//! - [`AttemptStore`] - load/record contract
//! - [`FileAttemptStore`] - newline-separated decimal log on disk
//! - [`MemoryAttemptStore`] - shared in-memory log for tests and dry runs
//! - [`log`] - the text format and its tolerant parser

pub mod error;
pub mod file;
pub mod log;
pub mod memory;
pub mod store;
pub mod tried;

pub use error::{StorageError, StorageResult};
pub use file::FileAttemptStore;
pub use log::{MalformedRecord, ParsedLog, parse_attempt_log};
pub use memory::MemoryAttemptStore;
pub use store::AttemptStore;
pub use tried::TriedSet;
