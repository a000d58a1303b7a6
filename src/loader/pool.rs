//! Worker pool for the enqueue side of the pipeline.
//!
//! A reusable set of reader threads that stream records into one shared
//! bounded output channel. The pool owns the only shutdown signal: dropping
//! it flips a shared flag, closes the channel, and joins the workers, so no
//! external coordinator is needed.
//!
//! Workers are source-driven (each streams its own shard of the file list),
//! so there is no task channel; the only communication is worker -> consumer.

use anyhow::{ensure, Context, Result};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Thread pool producing `Output` values into a shared bounded channel.
///
/// - Output channel: Workers -> consumer (bounded, provides backpressure)
/// - Shutdown flag: checked by workers between records
///
/// On drop the receiver is closed first so workers blocked on a full channel
/// observe the disconnect and exit, then every thread is joined.
pub(crate) struct WorkerPool<Output> {
    workers: Vec<thread::JoinHandle<()>>,
    output_rx: Option<Receiver<Output>>,
    shutdown: Arc<AtomicBool>,
}

impl<Output> WorkerPool<Output>
where
    Output: Send + 'static,
{
    /// Spawns `num_workers` named threads running `worker_fn`.
    ///
    /// `worker_fn` receives its worker id, a clone of the output sender, and
    /// the shared shutdown flag. The pool keeps no sender of its own, so the
    /// channel disconnects exactly when the last worker finishes.
    pub(crate) fn new<F>(
        name: &str,
        num_workers: usize,
        buffer_size: usize,
        worker_fn: F,
    ) -> Result<Self>
    where
        F: Fn(usize, Sender<Output>, Arc<AtomicBool>) + Send + Sync + 'static,
    {
        ensure!(num_workers > 0, "Cannot create a worker pool with 0 workers");
        ensure!(
            buffer_size > 0,
            "Worker output buffer size must be > 0 to prevent deadlocks"
        );

        let (output_tx, output_rx) = bounded(buffer_size);
        let shutdown = Arc::new(AtomicBool::new(false));
        let worker_fn = Arc::new(worker_fn);
        let mut workers = Vec::with_capacity(num_workers);

        for worker_id in 0..num_workers {
            let output_tx = output_tx.clone();
            let shutdown_clone = shutdown.clone();
            let worker_fn_clone = worker_fn.clone();

            let handle = thread::Builder::new()
                .name(format!("{}-worker-{}", name, worker_id))
                .spawn(move || {
                    worker_fn_clone(worker_id, output_tx, shutdown_clone);
                })
                .with_context(|| format!("Failed to spawn worker thread {}", worker_id))?;

            workers.push(handle);
        }

        Ok(Self {
            workers,
            output_rx: Some(output_rx),
            shutdown,
        })
    }

    /// Receives the next output without blocking.
    pub(crate) fn try_recv(&self) -> Result<Output, TryRecvError> {
        match &self.output_rx {
            Some(rx) => rx.try_recv(),
            None => Err(TryRecvError::Disconnected),
        }
    }

    /// Receives the next output, waiting up to `timeout`.
    pub(crate) fn recv_timeout(&self, timeout: Duration) -> Result<Output, RecvTimeoutError> {
        match &self.output_rx {
            Some(rx) => rx.recv_timeout(timeout),
            None => Err(RecvTimeoutError::Disconnected),
        }
    }
}

impl<Output> Drop for WorkerPool<Output> {
    fn drop(&mut self) {
        // Signal shutdown to all workers
        self.shutdown.store(true, Ordering::Relaxed);

        // Close the channel so workers blocked on a full buffer wake up
        self.output_rx.take();

        // Wait for workers to finish
        for worker in self.workers.drain(..) {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod pool_tests {
    use super::*;

    #[test]
    fn validates_parameters() {
        assert!(WorkerPool::<u32>::new("t", 0, 4, |_, _, _| {}).is_err());
        assert!(WorkerPool::<u32>::new("t", 1, 0, |_, _, _| {}).is_err());
    }

    #[test]
    fn workers_stream_until_done() -> Result<()> {
        let pool = WorkerPool::new("t", 2, 8, |worker_id, tx, _shutdown| {
            for i in 0..5u32 {
                if tx.send((worker_id, i)).is_err() {
                    return;
                }
            }
        })?;

        let mut received = Vec::new();
        loop {
            match pool.recv_timeout(Duration::from_secs(1)) {
                Ok(item) => received.push(item),
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => panic!("workers stalled"),
            }
        }
        assert_eq!(received.len(), 10);
        Ok(())
    }

    #[test]
    fn drop_unblocks_full_channel() -> Result<()> {
        // Buffer of 1 with an endless producer: the worker will block on
        // send, and only the receiver drop in WorkerPool::drop frees it.
        let pool = WorkerPool::new("t", 1, 1, |_, tx, shutdown| {
            let mut i = 0u64;
            loop {
                if shutdown.load(Ordering::Relaxed) {
                    break;
                }
                if tx.send(i).is_err() {
                    break;
                }
                i += 1;
            }
        })?;

        let first = pool.recv_timeout(Duration::from_secs(1))?;
        assert_eq!(first, 0);
        drop(pool); // must not hang
        Ok(())
    }
}
