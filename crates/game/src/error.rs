//! Startup errors. Anything here aborts the server before the first tick.

use std::path::PathBuf;

use thiserror::Error;

use crate::enemy::EnemyType;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config {path:?}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },

    #[error("no properties defined for enemy type {0:?}")]
    MissingEnemyType(EnemyType),

    #[error("enemy type {0:?} is defined more than once")]
    DuplicateEnemyType(EnemyType),

    #[error("enemy type {kind:?} has invalid {field}: {value}")]
    InvalidEnemyStat {
        kind: EnemyType,
        field: &'static str,
        value: f32,
    },

    #[error("enemy type index {0} is out of range")]
    InvalidEnemyIndex(usize),

    #[error("invalid {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}
