//! Bounded worker pool implementing [`TaskProcessor`].
//!
//! The pool owns a fixed set of worker loops draining a bounded FIFO queue.
//! Producers wait for queue space instead of dropping work. Shutdown stops
//! intake, lets every worker finish the task it is running, and then
//! abandons whatever is still queued.

mod scratch;
mod work;

pub use scratch::{DEFAULT_MAX_IDLE, ScratchBuffer, ScratchPool};
pub use work::{SimulatedWork, TaskWork};

use crate::config::{ConfigError, ProcessorConfig};
use crate::task::{
    domain::{Task, TaskStatus},
    ports::{
        ProcessingError, ProcessingReply, ProcessingResult, ProcessingTicket, ProcessorError,
        TaskProcessor,
    },
};
use async_trait::async_trait;
use mockable::Clock;
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// A queued unit of work.
#[derive(Debug)]
struct Job {
    task: Task,
    reply: ProcessingReply,
}

type SharedQueue = Arc<Mutex<mpsc::Receiver<Job>>>;

/// Fixed-size pool of workers fed by a bounded queue.
#[derive(Debug)]
pub struct WorkerPool {
    sender: mpsc::Sender<Job>,
    queue: SharedQueue,
    shutdown: CancellationToken,
    workers: TaskTracker,
}

impl WorkerPool {
    /// Starts `config.workers` worker loops on the current tokio runtime.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the worker count or queue
    /// capacity is zero.
    pub fn start<W, C>(
        config: &ProcessorConfig,
        work: Arc<W>,
        clock: Arc<C>,
    ) -> Result<Self, ConfigError>
    where
        W: TaskWork,
        C: Clock + Send + Sync + 'static,
    {
        config.validate()?;
        let (sender, receiver) = mpsc::channel(config.queue_capacity);
        let queue: SharedQueue = Arc::new(Mutex::new(receiver));
        let shutdown = CancellationToken::new();
        let workers = TaskTracker::new();
        let scratch = ScratchPool::new(config.workers);

        for worker_id in 0..config.workers {
            workers.spawn(run_worker(
                worker_id,
                Arc::clone(&queue),
                shutdown.clone(),
                Arc::clone(&work),
                Arc::clone(&clock),
                scratch.clone(),
            ));
        }
        workers.close();

        tracing::info!(
            workers = config.workers,
            queue_capacity = config.queue_capacity,
            "worker pool started"
        );

        Ok(Self {
            sender,
            queue,
            shutdown,
            workers,
        })
    }
}

#[async_trait]
impl TaskProcessor for WorkerPool {
    async fn submit(&self, task: Task) -> Result<ProcessingTicket, ProcessorError> {
        if self.shutdown.is_cancelled() {
            return Err(ProcessorError::ShutDown);
        }

        let task_id = task.id();
        let (reply, ticket) = ProcessingTicket::channel(task_id);
        let job = Job { task, reply };

        tokio::select! {
            biased;
            () = self.shutdown.cancelled() => Err(ProcessorError::ShutDown),
            sent = self.sender.send(job) => match sent {
                Ok(()) => {
                    tracing::debug!(%task_id, "task queued");
                    Ok(ticket)
                }
                Err(_) => Err(ProcessorError::ShutDown),
            },
        }
    }

    async fn shutdown(&self) {
        if !self.shutdown.is_cancelled() {
            tracing::info!("worker pool shutting down");
        }
        self.shutdown.cancel();
        self.workers.wait().await;

        let mut queue = self.queue.lock().await;
        queue.close();
        let mut abandoned = 0_usize;
        while let Ok(job) = queue.try_recv() {
            tracing::warn!(task_id = %job.reply.task_id(), "abandoning queued task at shutdown");
            job.reply.abandon();
            abandoned += 1;
        }
        tracing::info!(abandoned, "worker pool stopped");
    }

    fn is_shut_down(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

async fn run_worker<W, C>(
    worker_id: usize,
    queue: SharedQueue,
    shutdown: CancellationToken,
    work: Arc<W>,
    clock: Arc<C>,
    scratch: ScratchPool,
) where
    W: TaskWork,
    C: Clock + Send + Sync + 'static,
{
    tracing::debug!(worker_id, "worker started");
    loop {
        let next = tokio::select! {
            biased;
            () = shutdown.cancelled() => None,
            job = next_job(&queue) => job,
        };
        let Some(Job { task, reply }) = next else {
            break;
        };

        let task_id = task.id();
        tracing::debug!(worker_id, %task_id, "processing task");
        let result = process(
            task,
            Arc::clone(&work),
            Arc::clone(&clock),
            scratch.clone(),
        )
        .await;
        if let Err(err) = &result {
            tracing::warn!(worker_id, %task_id, error = %err, "task processing failed");
        }
        reply.send(result);
    }
    tracing::debug!(worker_id, "worker stopped");
}

async fn next_job(queue: &Mutex<mpsc::Receiver<Job>>) -> Option<Job> {
    queue.lock().await.recv().await
}

/// Runs the work in its own task so a panic cannot take the worker down.
async fn process<W, C>(
    task: Task,
    work: Arc<W>,
    clock: Arc<C>,
    scratch: ScratchPool,
) -> ProcessingResult
where
    W: TaskWork,
    C: Clock + Send + Sync + 'static,
{
    let task_id = task.id();
    let handle = tokio::spawn(async move {
        let mut buffer = scratch.acquire();
        let outcome = work.run(&task, &mut buffer).await;
        tracing::trace!(%task_id, summary = %buffer.as_str(), "work finished");
        outcome.map(|()| task)
    });

    let mut finished = match handle.await {
        Ok(outcome) => outcome?,
        Err(err) if err.is_panic() => return Err(ProcessingError::Panicked(task_id)),
        Err(_) => return Err(ProcessingError::Abandoned(task_id)),
    };
    finished.transition_to(TaskStatus::Completed, &*clock)?;
    Ok(finished)
}
