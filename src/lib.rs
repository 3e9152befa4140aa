pub mod config;
pub mod error;
pub mod db;
pub mod model;
pub mod index;
pub mod cache;
pub mod qa;
pub mod ingest;
pub mod server;
pub mod eval;

pub use config::Config;
pub use error::{QaError, Result};
pub use index::{MemoryIndex, SqliteIndex, TripleIndex};
pub use qa::{Engine, PredicateCatalog};
pub use server::QaServer;
