use crate::error::{fatal, Result, SimError};
use crate::semaphore::Semaphore;

// 哲学者の間に置かれたフォーク N 本
// 1 本ごとに値 1 のセマフォを持つ
pub struct ForkSet {
    forks: Vec<Semaphore>,
}

// 取得したフォークの所有権
// 解放はこの型を drop したときにだけ起きるので、持っていないフォークは返せない
#[must_use = "dropping the guard puts the fork back immediately"]
pub struct ForkGuard<'a> {
    set: &'a ForkSet,
    idx: usize,
}

impl ForkSet {
    pub fn new(n: usize) -> Self {
        ForkSet {
            forks: (0..n).map(|_| Semaphore::new(1)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.forks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forks.is_empty()
    }

    // フォークが空くまでブロックする
    pub fn acquire(&self, idx: usize) -> Result<ForkGuard<'_>> {
        assert!(idx < self.forks.len());
        self.forks[idx]
            .wait()
            .map_err(|source| SimError::Fork { fork: idx, source })?;
        Ok(ForkGuard { set: self, idx })
    }

    // いま誰かに握られているフォークの本数
    pub fn in_use(&self) -> Result<usize> {
        let mut n = 0;
        for (fork, sem) in self.forks.iter().enumerate() {
            let cnt = sem
                .in_use()
                .map_err(|source| SimError::Fork { fork, source })?;
            n += cnt as usize;
        }
        Ok(n)
    }
}

impl ForkGuard<'_> {
    pub fn index(&self) -> usize {
        self.idx
    }

    pub fn release(self) {
        drop(self)
    }
}

impl Drop for ForkGuard<'_> {
    fn drop(&mut self) {
        // 返却に失敗したら「同時に 1 人まで」が保証できない
        if let Err(source) = self.set.forks[self.idx].post() {
            fatal(&SimError::Fork {
                fork: self.idx,
                source,
            });
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::sync::{mpsc, Arc};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_acquire_and_release() {
        let forks = ForkSet::new(3);
        let g0 = forks.acquire(0).unwrap();
        let g2 = forks.acquire(2).unwrap();
        assert_eq!(g0.index(), 0);
        assert_eq!(forks.in_use().unwrap(), 2);

        g0.release();
        assert_eq!(forks.in_use().unwrap(), 1);
        drop(g2);
        assert_eq!(forks.in_use().unwrap(), 0);
    }

    #[test]
    fn test_acquire_blocks_until_released() {
        let forks = Arc::new(ForkSet::new(2));
        let held = forks.acquire(1).unwrap();

        let (tx, rx) = mpsc::channel();
        let forks0 = forks.clone();
        let t = thread::spawn(move || {
            let g = forks0.acquire(1).unwrap();
            tx.send(g.index()).unwrap();
        });

        // 持ち主が返すまでは取れない
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        held.release();
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 1);
        t.join().unwrap();
        assert_eq!(forks.in_use().unwrap(), 0);
    }

    #[test]
    #[should_panic]
    fn test_acquire_out_of_range() {
        let forks = ForkSet::new(2);
        let _g = forks.acquire(2);
    }
}
