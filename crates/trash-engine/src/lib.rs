pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod pagination;
pub mod store;
pub mod tree;

pub use config::{Config, EngineConfig};
pub use db::DbPool;
pub use engine::TrashEngine;
pub use error::{TrashError, TrashResult};
pub use store::{MemoryTreeStore, PgTreeStore, StoreError, TreeStore, TreeTransaction};
