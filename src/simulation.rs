use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, info};

use crate::config::SimConfig;
use crate::error::{fatal, Result, SimError};
use crate::fork::ForkSet;
use crate::philosopher::Philosopher;
use crate::report::{label, Reporter};
use crate::state::{Seat, StateStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// 哲学者ごとに終えた食事/思索のサイクル数
    pub meals: Vec<u32>,
    /// 全員が席を立った後にまだ握られているフォークの本数。正常終了なら 0
    pub forks_in_use: usize,
}

pub struct Simulation {
    config: SimConfig,
    forks: Arc<ForkSet>,
    store: Arc<StateStore>,
    seats: Vec<Seat>,
}

impl Simulation {
    pub fn new(config: SimConfig, reporter: Box<dyn Reporter>) -> Result<Self> {
        config.validate()?;
        let n = config.philosophers;
        let forks = Arc::new(ForkSet::new(n));
        let (store, seats) = StateStore::new(n, reporter);
        Ok(Simulation {
            config,
            forks,
            store,
            seats,
        })
    }

    pub fn store(&self) -> Arc<StateStore> {
        self.store.clone()
    }

    // 全員を同時に走らせ、全員の終了を待ってから表を閉じる
    pub fn run(self) -> Result<Summary> {
        let Simulation {
            config,
            forks,
            store,
            seats,
        } = self;

        info!(
            philosophers = config.philosophers,
            cycles = config.cycles,
            max_dawdle_ms = config.max_dawdle.as_millis() as u64,
            "starting"
        );
        store.header()?;

        let mut v: Vec<(usize, JoinHandle<u32>)> = Vec::new();
        for seat in seats {
            let id = seat.id();
            let p = Philosopher::new(
                seat,
                forks.clone(),
                config.cycles,
                config.max_dawdle,
                config.seed,
            );
            let t = thread::Builder::new()
                .name(format!("philosopher-{}", label(id)))
                .spawn(move || match p.run() {
                    Ok(done) => done,
                    Err(err) => fatal(&err),
                })
                .map_err(|source| SimError::Spawn { id, source })?;
            v.push((id, t));
        }

        let mut meals = Vec::with_capacity(v.len());
        for (id, t) in v {
            let done = t.join().map_err(|_| SimError::Join(id))?;
            debug!(philosopher = id, done, "joined");
            meals.push(done);
        }

        store.footer()?;
        let forks_in_use = forks.in_use()?;
        info!(forks_in_use, "all philosophers finished");

        Ok(Summary {
            meals,
            forks_in_use,
        })
    }
}
