use super::ThreadPool;
use crate::{KvsError, Result};
use tracing::debug;

/// A thread pool that uses a work stealing strategy as implemented by the [`Rayon`] library.
///
/// A job that panics is caught by rayon's panic handler, which logs it and keeps the worker
/// thread alive.
///
/// [`Rayon`]: https://docs.rs/rayon/latest/rayon/index.html
pub struct RayonThreadPool {
    pool: rayon::ThreadPool,
}

impl ThreadPool for RayonThreadPool {
    fn new(threads: u32) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads as usize)
            .thread_name(|i| format!("kvsrv-rayon-{}", i))
            .panic_handler(|_| debug!("a job panicked on a rayon worker"))
            .build()
            .map_err(|e| KvsError::StringErr(format!("could not build thread pool: {:?}", &e)))?;
        debug!("created rayon thread pool with {} threads", &threads);

        Ok(Self { pool })
    }

    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.pool.spawn(job);
    }
}
