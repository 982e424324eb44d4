//! OS スレッドで動かす食事する哲学者問題
//!
//! フォークは値 1 のセマフォ。偶数番は右、奇数番は左のフォークから取るので
//! 循環待ちが起きない。状態が変わるたびに状態表を 1 行出力する。

pub mod config;
pub mod error;
pub mod fork;
pub mod philosopher;
pub mod report;
pub mod semaphore;
pub mod signal;
pub mod simulation;
pub mod state;

pub use config::SimConfig;
pub use error::{ConfigError, SimError, SyncError};
pub use fork::{ForkGuard, ForkSet};
pub use philosopher::{acquisition_order, Philosopher};
pub use report::{Reporter, TableReporter};
pub use simulation::{Simulation, Summary};
pub use state::{ActorState, Phase, Seat, Side, StateStore};
