use std::io;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, OnceLock,
};
use std::thread::{self, JoinHandle};

use libc::SIGUSR1;
use signal_hook::iterator::{Handle, Signals};
use tracing::debug;

use crate::state::StateStore;

// SIGUSR1 を受けるたびに全員の状態をログに出す
// 受信は専用スレッドで行うので、フォーク待ちのスレッドには割り込まない
// 表ができる前に届いたものは読み捨てる (既定動作でプロセスが落ちないよう先に登録しておく)
pub struct StatusWatcher {
    handle: Handle,
    thread: JoinHandle<()>,
    store: Arc<OnceLock<Arc<StateStore>>>,
    received: Arc<AtomicUsize>,
}

impl StatusWatcher {
    pub fn spawn() -> io::Result<Self> {
        let mut signals = Signals::new([SIGUSR1])?;
        let handle = signals.handle();
        let store: Arc<OnceLock<Arc<StateStore>>> = Arc::new(OnceLock::new());
        let received = Arc::new(AtomicUsize::new(0));

        let store0 = store.clone();
        let received0 = received.clone();
        let thread = thread::Builder::new()
            .name("status-signal".into())
            .spawn(move || {
                for sig in signals.forever() {
                    debug!(sig, "received signal");
                    match store0.get() {
                        Some(store) => store.log_status(),
                        None => debug!("no table yet"),
                    }
                    received0.fetch_add(1, Ordering::SeqCst);
                }
            })?;

        Ok(StatusWatcher {
            handle,
            thread,
            store,
            received,
        })
    }

    // 2 回目以降の attach は無視する
    pub fn attach(&self, store: Arc<StateStore>) {
        if self.store.set(store).is_err() {
            debug!("status watcher already attached");
        }
    }

    // これまでに処理した SIGUSR1 の数
    pub fn received(&self) -> usize {
        self.received.load(Ordering::SeqCst)
    }

    pub fn stop(self) {
        self.handle.close();
        if self.thread.join().is_err() {
            debug!("status watcher panicked");
        }
    }
}
