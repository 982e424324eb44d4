use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use crate::error::Result;
use crate::report::{label, Reporter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Changing,
    Eating,
    Thinking,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

// 表示用に記録する 1 人分の状態
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActorState {
    pub phase: Phase,
    pub holds_left: bool,
    pub holds_right: bool,
}

impl ActorState {
    pub fn holds(&self, side: Side) -> bool {
        match side {
            Side::Left => self.holds_left,
            Side::Right => self.holds_right,
        }
    }

    pub fn held_count(&self) -> usize {
        self.holds_left as usize + self.holds_right as usize
    }
}

pub fn left_fork(id: usize) -> usize {
    id
}

pub fn right_fork(id: usize, n: usize) -> usize {
    (id + 1) % n
}

struct Table {
    slots: Vec<ActorState>,
    reporter: Box<dyn Reporter>,
}

/// 観測用に共有する哲学者ごとの状態
///
/// スロットと Reporter を 1 つの Mutex で守るので、出力される行は常に
/// 一貫したスナップショットになり、行どうしが混ざらない。
pub struct StateStore {
    table: Mutex<Table>,
}

/// [`StateStore`] の 1 スロットだけを書き換える権限
///
/// [`StateStore::new`] が哲学者 1 人につき 1 つだけ作るので、
/// 他人のスロットには触れない。
pub struct Seat {
    id: usize,
    n: usize,
    store: Arc<StateStore>,
}

impl StateStore {
    pub fn new(n: usize, reporter: Box<dyn Reporter>) -> (Arc<Self>, Vec<Seat>) {
        let store = Arc::new(StateStore {
            table: Mutex::new(Table {
                slots: vec![ActorState::default(); n],
                reporter,
            }),
        });
        let seats = (0..n)
            .map(|id| Seat {
                id,
                n,
                store: store.clone(),
            })
            .collect();
        (store, seats)
    }

    // 表示専用なので、他スレッドの panic で poison されても中身はそのまま使う
    fn lock(&self) -> MutexGuard<'_, Table> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.lock().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn snapshot(&self) -> Vec<ActorState> {
        self.lock().slots.clone()
    }

    pub fn header(&self) -> Result<()> {
        let mut table = self.lock();
        let Table { slots, reporter } = &mut *table;
        reporter.header(slots)?;
        Ok(())
    }

    pub fn footer(&self) -> Result<()> {
        let mut table = self.lock();
        let Table { slots, reporter } = &mut *table;
        reporter.footer(slots)?;
        Ok(())
    }

    // 状態の書き換えと 1 行の出力を同じロックの中で行う
    fn update(&self, id: usize, f: impl FnOnce(&mut ActorState)) {
        let mut table = self.lock();
        let Table { slots, reporter } = &mut *table;
        f(&mut slots[id]);
        debug_assert!(
            slots[id].phase != Phase::Eating || slots[id].held_count() == 2,
            "philosopher {id} eating without both forks"
        );
        if let Err(err) = reporter.row(slots) {
            warn!(%err, philosopher = id, "failed to write status row");
        }
    }

    pub fn log_status(&self) {
        let slots = self.snapshot();
        let n = slots.len();
        for (id, s) in slots.iter().enumerate() {
            info!(
                target: "dine::status",
                philosopher = %label(id),
                phase = ?s.phase,
                left = ?s.holds_left.then_some(left_fork(id)),
                right = ?s.holds_right.then_some(right_fork(id, n)),
                "status"
            );
        }
    }
}

impl Seat {
    pub fn id(&self) -> usize {
        self.id
    }

    pub fn ring_size(&self) -> usize {
        self.n
    }

    pub fn set_phase(&self, phase: Phase) {
        self.store.update(self.id, |s| s.phase = phase);
    }

    pub fn set_held(&self, side: Side, held: bool) {
        self.store.update(self.id, |s| match side {
            Side::Left => s.holds_left = held,
            Side::Right => s.holds_right = held,
        });
    }

    pub fn state(&self) -> ActorState {
        self.store.lock().slots[self.id]
    }
}
