use crossbeam_utils::sync::WaitGroup;
use kvsrv::{RayonThreadPool, Result, SharedQueueThreadPool, ThreadPool};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const JOBS: usize = 1000;

fn spawn_counter<P: ThreadPool>(pool: P) -> Result<()> {
    let wg = WaitGroup::new();
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..JOBS {
        let counter = Arc::clone(&counter);
        let wg = wg.clone();
        pool.spawn(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            drop(wg);
        })
    }

    wg.wait();
    assert_eq!(counter.load(Ordering::SeqCst), JOBS);
    Ok(())
}

fn spawn_panic_job<P: ThreadPool>() -> Result<()> {
    let pool = P::new(4)?;
    for _ in 0..8 {
        pool.spawn(move || {
            // a panicking job must not take a worker out of the pool
            panic!("job panicked on purpose");
        });
    }
    spawn_counter(pool)
}

#[test]
fn shared_queue_thread_pool_spawn_counter() -> Result<()> {
    let pool = SharedQueueThreadPool::new(4)?;
    spawn_counter(pool)
}

#[test]
fn rayon_thread_pool_spawn_counter() -> Result<()> {
    let pool = RayonThreadPool::new(4)?;
    spawn_counter(pool)
}

#[test]
fn shared_queue_thread_pool_panic_task() -> Result<()> {
    spawn_panic_job::<SharedQueueThreadPool>()
}

#[test]
fn rayon_thread_pool_panic_task() -> Result<()> {
    spawn_panic_job::<RayonThreadPool>()
}
