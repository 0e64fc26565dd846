use std::env;

use anyhow::Context;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub max_connections: u32,
    pub engine: EngineConfig,
}

/// Traversal bounds handed to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    pub max_tree_depth: usize,
    pub max_subtree_size: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_tree_depth: 1024,
            max_subtree_size: 100_000,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a number")?,
            engine: EngineConfig::from_env()?,
        })
    }
}

impl EngineConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Unset variables fall back to the defaults; set ones must parse.
    fn from_vars(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            max_tree_depth: match var("TRASH_MAX_TREE_DEPTH") {
                Some(value) => value
                    .parse()
                    .context("TRASH_MAX_TREE_DEPTH must be a number")?,
                None => defaults.max_tree_depth,
            },
            max_subtree_size: match var("TRASH_MAX_SUBTREE_SIZE") {
                Some(value) => value
                    .parse()
                    .context("TRASH_MAX_SUBTREE_SIZE must be a number")?,
                None => defaults.max_subtree_size,
            },
        })
    }
}
