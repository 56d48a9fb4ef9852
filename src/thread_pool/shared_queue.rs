use super::ThreadPool;
use crate::Result;
use crossbeam::channel::{self, Receiver, Sender};
use std::thread;
use tracing::{debug, error};

type Job = Box<dyn FnOnce() + Send + 'static>;

/// A thread pool implemented with a shared job queue (i.e. channel).
///
/// This implementation uses the MPMC [`channel`] provided by the crossbeam crate as a single
/// producer, multiple consumer queue. The pool itself is the producer, and its worker threads
/// are the consumers.
///
/// If a job panics, the worker thread that ran it dies and a replacement worker is spawned in
/// its place. A failure to spawn the replacement is only logged, so the number of workers can
/// shrink to zero, in which case `spawn` panics.
///
/// [`channel`]: https://docs.rs/crossbeam/0.8.1/crossbeam/channel/index.html
pub struct SharedQueueThreadPool {
    tx: Sender<Job>,
}

impl ThreadPool for SharedQueueThreadPool {
    /// create a new thread pool with the given number of `threads`.
    /// Every thread created will have a handle to the receiving end of the channel
    fn new(threads: u32) -> Result<Self> {
        let (tx, rx) = channel::unbounded::<Job>();
        for id in 0..threads {
            let worker = Worker { id, rx: rx.clone() };
            thread::Builder::new()
                .name(format!("kvsrv-worker-{}", id))
                .spawn(move || run_jobs(worker))?;
        }
        debug!("created shared queue thread pool with {} threads", threads);
        Ok(SharedQueueThreadPool { tx })
    }

    /// Spawns a function into the thread pool.
    ///
    /// # Panics
    ///
    /// Panics if the thread pool has no thread.
    fn spawn<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.tx
            .send(Box::new(job))
            .expect("There are no threads in the pool");
    }
}

/// The receiving side of the job queue owned by one worker thread.
/// Dropping it while the thread is panicking starts a replacement worker.
#[derive(Clone, Debug)]
struct Worker {
    id: u32,
    rx: Receiver<Job>,
}

impl Drop for Worker {
    fn drop(&mut self) {
        if thread::panicking() {
            debug!("worker {} panicked, starting a new thread", self.id);
            let worker = self.clone();
            if let Err(e) = thread::Builder::new()
                .name(format!("kvsrv-worker-{}", self.id))
                .spawn(move || run_jobs(worker))
            {
                error!("Failed to spawn a thread: {}", e);
            }
        }
    }
}

/// waits for jobs to arrive on the worker's queue and runs them, until the pool is dropped
fn run_jobs(worker: Worker) {
    while let Ok(job) = worker.rx.recv() {
        job();
    }
    debug!("worker {} exited because the thread pool was destroyed", worker.id);
}
