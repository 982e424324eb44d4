use std::sync::{Condvar, Mutex};

use crate::error::SyncError;

// 汎用のカウンティングセマフォ
// max 個までのスレッドが同時に wait を抜けられる
pub struct Semaphore {
    mutex: Mutex<isize>, // 現在 wait を抜けているスレッドの数
    cond: Condvar,
    max: isize,
}

impl Semaphore {
    pub fn new(max: isize) -> Self {
        assert!(max > 0);
        Semaphore {
            mutex: Mutex::new(0),
            cond: Condvar::new(),
            max,
        }
    }

    // 空きができるまでブロックする
    // Condvar の偽の起床 (spurious wakeup) はループで吸収するので呼び出し側には見えない
    pub fn wait(&self) -> Result<(), SyncError> {
        let mut cnt = self.mutex.lock().map_err(|_| SyncError::Poisoned)?;
        while *cnt >= self.max {
            cnt = self.cond.wait(cnt).map_err(|_| SyncError::Poisoned)?;
        }
        *cnt += 1;
        Ok(())
    }

    pub fn post(&self) -> Result<(), SyncError> {
        let mut cnt = self.mutex.lock().map_err(|_| SyncError::Poisoned)?;
        if *cnt <= 0 {
            return Err(SyncError::Unheld);
        }
        *cnt -= 1;
        // 待っているスレッドのうち 1 つだけを起こす
        self.cond.notify_one();
        Ok(())
    }

    // いま wait を抜けているスレッドの数
    pub fn in_use(&self) -> Result<isize, SyncError> {
        let cnt = self.mutex.lock().map_err(|_| SyncError::Poisoned)?;
        Ok(*cnt)
    }
}
