//! # CaskDB
//!
//! An embedded key-value store built on a log-structured hash table:
//! - Append-only data file, one record per write
//! - In-memory key directory pointing at each key's latest record
//! - Single-seek reads
//! - Startup recovery that tolerates a torn record at the tail
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       DiskStore                             │
//! │              (get / set / close, one Mutex)                 │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │  DataFile   │          │   KeyDir    │
//!   │  (Append)   │          │  (HashMap)  │
//!   └──────┬──────┘          └──────▲──────┘
//!          │                        │
//!          ▼                        │
//!   ┌─────────────┐          ┌──────┴──────┐
//!   │   Record    │─────────▶│  Recovery   │
//!   │   Codec     │          │  (on open)  │
//!   └─────────────┘          └─────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use caskdb::DiskStore;
//!
//! # fn main() -> caskdb::Result<()> {
//! let store = DiskStore::open_path("books.db")?;
//! store.set("othello", "shakespeare")?;
//! assert_eq!(store.get("othello")?, Some("shakespeare".to_string()));
//! store.close()?;
//! # Ok(())
//! # }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod keydir;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{CaskError, Result};
pub use config::{Config, SyncStrategy};
pub use engine::{DiskStore, StoreStats};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of CaskDB
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
