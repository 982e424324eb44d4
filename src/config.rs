use std::time::Duration;

use crate::error::ConfigError;

pub const DEFAULT_PHILOSOPHERS: usize = 5;
pub const MIN_PHILOSOPHERS: usize = 2;
// 表示名が 'A'..='Z' に収まる範囲
pub const MAX_PHILOSOPHERS: usize = 26;
pub const MAX_CYCLES: u32 = i32::MAX as u32;
pub const DEFAULT_DAWDLE_MS: u64 = 1000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimConfig {
    pub philosophers: usize,
    /// 席を立つまでに各自が繰り返す食事/思索のサイクル数
    pub cycles: u32,
    /// 食事中・思索中のランダムな待ち時間の上限
    pub max_dawdle: Duration,
    /// 哲学者 `i` の乱数の種は `seed + i`。`None` ならエントロピーから
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            philosophers: DEFAULT_PHILOSOPHERS,
            cycles: 1,
            max_dawdle: Duration::from_millis(DEFAULT_DAWDLE_MS),
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_PHILOSOPHERS..=MAX_PHILOSOPHERS).contains(&self.philosophers) {
            return Err(ConfigError::Philosophers {
                got: self.philosophers,
                min: MIN_PHILOSOPHERS,
                max: MAX_PHILOSOPHERS,
            });
        }
        if self.cycles == 0 || self.cycles > MAX_CYCLES {
            return Err(ConfigError::Cycles {
                got: self.cycles,
                max: MAX_CYCLES,
            });
        }
        Ok(())
    }
}
