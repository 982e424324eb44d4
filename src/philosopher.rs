use std::sync::Arc;
use std::thread;
use std::time::Duration;

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use crate::error::Result;
use crate::fork::{ForkGuard, ForkSet};
use crate::state::{left_fork, right_fork, Phase, Seat, Side};

// 循環待ちを防ぐための取得順
// 偶数番は右から、奇数番は左から取る
// 隣り合う 2 人の向きが逆になるので、全員が 1 本目を握ったまま 2 本目を待つ輪ができない
pub fn acquisition_order(id: usize) -> [Side; 2] {
    if id % 2 == 0 {
        [Side::Right, Side::Left]
    } else {
        [Side::Left, Side::Right]
    }
}

pub struct Philosopher {
    seat: Seat,
    forks: Arc<ForkSet>,
    cycles: u32,
    max_dawdle: Duration,
    rng: StdRng,
}

impl Philosopher {
    pub fn new(
        seat: Seat,
        forks: Arc<ForkSet>,
        cycles: u32,
        max_dawdle: Duration,
        seed: Option<u64>,
    ) -> Self {
        assert_eq!(seat.ring_size(), forks.len());
        let rng = match seed {
            Some(s) => StdRng::seed_from_u64(s.wrapping_add(seat.id() as u64)),
            None => StdRng::from_entropy(),
        };
        Philosopher {
            seat,
            forks,
            cycles,
            max_dawdle,
            rng,
        }
    }

    pub fn id(&self) -> usize {
        self.seat.id()
    }

    fn fork_index(&self, side: Side) -> usize {
        match side {
            Side::Left => left_fork(self.id()),
            Side::Right => right_fork(self.id(), self.forks.len()),
        }
    }

    // 0..=max_dawdle ミリ秒の間ランダムに眠る
    fn dawdle(&mut self) {
        let max = self.max_dawdle.as_millis() as u64;
        let ms = self.rng.gen_range(0..=max);
        thread::sleep(Duration::from_millis(ms));
    }

    fn pick_up<'f>(&self, forks: &'f ForkSet, side: Side) -> Result<ForkGuard<'f>> {
        let guard = forks.acquire(self.fork_index(side))?;
        // 取れた直後にだけ true にする
        self.seat.set_held(side, true);
        Ok(guard)
    }

    fn put_down(&self, side: Side, guard: ForkGuard<'_>) {
        // 返す直前に false にする
        self.seat.set_held(side, false);
        guard.release();
    }

    /// 全サイクルを実行し、終えたサイクル数を返す
    pub fn run(mut self) -> Result<u32> {
        let forks = self.forks.clone();
        let [first, second] = acquisition_order(self.id());
        debug!(philosopher = self.id(), ?first, "seated");

        self.seat.set_phase(Phase::Changing);

        let mut remaining = self.cycles;
        let mut done = 0;
        while remaining > 0 {
            self.seat.set_phase(Phase::Changing);

            let g1 = self.pick_up(&forks, first)?;
            let g2 = self.pick_up(&forks, second)?;

            self.seat.set_phase(Phase::Eating);
            self.dawdle();

            self.seat.set_phase(Phase::Changing);
            // 先に取った方から置く
            self.put_down(first, g1);
            self.put_down(second, g2);

            self.seat.set_phase(Phase::Thinking);
            self.dawdle();

            remaining -= 1;
            done += 1;
            debug!(philosopher = self.id(), done, remaining, "cycle finished");
        }

        // Thinking から抜けるのも Changing 扱い
        self.seat.set_phase(Phase::Changing);
        Ok(done)
    }
}
