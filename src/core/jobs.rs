//! Background jobs.
//!
//! Blocking work (directory listings, file loads) runs on tokio's blocking
//! pool. The result travels back to the dispatcher as a `ThreadSync` event
//! addressed to the area that asked for it; jobs never touch shell state.

use super::event::{AreaId, SystemEvent};
use super::queue::EventSender;
use anyhow::{Context, Result};
use std::any::Any;
use tokio::runtime::{Builder, Runtime};

pub struct BackgroundJobs {
    sender: EventSender,
    runtime: Option<Runtime>,
}

impl BackgroundJobs {
    pub fn new(sender: EventSender) -> Self {
        Self {
            sender,
            runtime: None,
        }
    }

    fn runtime(&mut self) -> Result<&Runtime> {
        if self.runtime.is_none() {
            let runtime = Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name("talkshell-job")
                .enable_all()
                .build()
                .context("Failed to start background job runtime")?;
            tracing::debug!("Background job runtime started");
            self.runtime = Some(runtime);
        }
        self.runtime
            .as_ref()
            .context("Background job runtime missing")
    }

    /// Run `job` off the dispatch thread and deliver its result to `dest`
    pub fn spawn<T, F>(&mut self, dest: AreaId, job: F) -> Result<()>
    where
        T: Any + Send,
        F: FnOnce() -> T + Send + 'static,
    {
        let sender = self.sender.clone();
        self.runtime()?.spawn_blocking(move || {
            let result = job();
            if !sender.enqueue(SystemEvent::thread_sync(dest, Box::new(result))) {
                tracing::debug!("Job result for {} dropped, shell is shutting down", dest);
            }
        });
        Ok(())
    }

    /// Stop accepting work; running jobs are not waited for
    pub fn shutdown(&mut self) {
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
    }
}

impl Drop for BackgroundJobs {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::event::Event;
    use crate::core::queue::EventQueue;

    #[test]
    fn test_result_comes_back_as_thread_sync() {
        let queue = EventQueue::new();
        let mut jobs = BackgroundJobs::new(queue.sender());
        let dest = AreaId::next();
        jobs.spawn(dest, || 6 * 7).unwrap();

        match queue.take_next() {
            Some(Event::System(SystemEvent::ThreadSync { dest: got, payload })) => {
                assert_eq!(got, dest);
                assert_eq!(payload.downcast_ref::<i32>(), Some(&42));
            }
            other => panic!("unexpected {:?}", other),
        }
        jobs.shutdown();
    }
}
