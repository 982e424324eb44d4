use std::io;

use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("semaphore mutex poisoned")]
    Poisoned,

    #[error("semaphore posted without a matching wait")]
    Unheld,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("need between {min} and {max} philosophers, got {got}")]
    Philosophers { got: usize, min: usize, max: usize },

    #[error("cycles must be between 1 and {max}, got {got}")]
    Cycles { got: u32, max: u32 },
}

#[derive(Error, Debug)]
pub enum SimError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("fork {fork}: {source}")]
    Fork { fork: usize, source: SyncError },

    #[error("failed to start philosopher {id}: {source}")]
    Spawn { id: usize, source: io::Error },

    #[error("philosopher {0} panicked")]
    Join(usize),

    #[error("status output: {0}")]
    Report(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;

// 資源管理の一貫性が保てなくなったので、プロセスごと終了する
// 1 人だけ止めても他の哲学者が永久に待つことになる
pub fn fatal(err: &SimError) -> ! {
    error!(%err, "fatal synchronization failure");
    std::process::exit(1);
}
