//! `coopkeeper` - Poultry farm record keeping
//!
//! This library provides the core functionality for logging daily husbandry
//! observations per flock, deriving trends, evaluating rule-based alerts,
//! and exporting records to a spreadsheet.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod alerts;
pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod record;
pub mod storage;
pub mod trend;

pub use alerts::{evaluate, AlertContext, FarmAlert, Severity};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::{FlockRecord, PoultryType};
pub use storage::{RecordFilter, Storage, StorageStats};
pub use trend::{TrendMetric, TrendPoint};
