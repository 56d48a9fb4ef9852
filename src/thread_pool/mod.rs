//! This module contains the thread pools that a [`KvsServer`](crate::KvsServer) can use to
//! run client requests. Every decoded request is executed as one job on the pool.

use crate::Result;

mod rayon_pool;
mod shared_queue;

pub use self::rayon_pool::RayonThreadPool;
pub use self::shared_queue::SharedQueueThreadPool;

/// A pool of threads that runs jobs
pub trait ThreadPool {
    /// Creates a new thread pool, immediately spawning the specified number of `threads`.
    ///
    /// # Errors
    /// returns an error if any thread fails to spawn. All previously-spawned threads are
    /// terminated.
    fn new(threads: u32) -> Result<Self>
    where
        Self: Sized;

    /// Spawns a function into the thread pool.
    ///
    /// Spawning always succeeds, but if the function panics the thread pool continues to
    /// operate with the same number of threads.
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static;
}
