//! Times a few workloads on [`SmallVector`] and reports them through `log`.
//!
//! Logging lives entirely on the caller's side; the container never logs.

use log::info;
use small_vector::SmallVector;
use std::time::Instant;

/// Logs the time spent between its creation and the end of the scope.
struct ScopedTimer {
    name: &'static str,
    start: Instant,
}

impl ScopedTimer {
    fn new(name: &'static str) -> Self {
        Self {
            name,
            start: Instant::now(),
        }
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        info!(
            "{} took {:.6} seconds",
            self.name,
            self.start.elapsed().as_secs_f64()
        );
    }
}

fn main() {
    // RUST_LOG overrides the default level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    info!("logger ready");

    {
        let _timer = ScopedTimer::new("inline pushes");
        let mut v = SmallVector::<u64, 16>::new();
        for i in 0..16 {
            v.push(i);
        }
        log::debug!("len {} capacity {} inline {}", v.len(), v.capacity(), v.is_inline());
    }

    {
        let _timer = ScopedTimer::new("spilling pushes");
        let mut v = SmallVector::<u64, 16>::new();
        for i in 0..100_000 {
            v.push(i);
        }
        log::debug!("len {} capacity {} inline {}", v.len(), v.capacity(), v.is_inline());
    }

    {
        let _timer = ScopedTimer::new("insert and erase at the front");
        let mut v = SmallVector::<u32, 8>::new();
        for i in 0..1_000 {
            v.insert(0, i);
        }
        while v.len() > 8 {
            v.erase(0);
        }
        v.shrink_to_inline();
        log::debug!("remaining {:?} inline {}", v, v.is_inline());
    }
}
