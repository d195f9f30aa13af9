//! FIFO queue for a rate-limited image provider.
//!
//! One worker task dispatches requests one at a time, keeping at least
//! `spacing` between dispatches. Requests for a slug that is already waiting
//! share its entry. Dropping a [`QueueTicket`] before its turn removes it from
//! the queue; a request already in flight runs to completion.

use super::ImageProvider;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{Notify, oneshot};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

type Waiter = (u64, oneshot::Sender<Option<String>>);

struct Job {
    slug: String,
    waiters: Vec<Waiter>,
}

#[derive(Default)]
struct QueueState {
    next_ticket: u64,
    pending: VecDeque<Job>,
}

#[derive(Default)]
struct Shared {
    state: Mutex<QueueState>,
    notify: Notify,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn pop_front(&self) -> Option<Job> {
        self.lock().pending.pop_front()
    }

    /// Removes one waiter; a job nobody waits for leaves the queue.
    fn withdraw(&self, ticket: u64) {
        let mut state = self.lock();
        let Some(index) = state
            .pending
            .iter()
            .position(|job| job.waiters.iter().any(|(id, _)| *id == ticket))
        else {
            return;
        };

        let job = &mut state.pending[index];
        job.waiters.retain(|(id, _)| *id != ticket);
        if job.waiters.is_empty() {
            debug!(slug = %job.slug, "Withdrawing queued image request");
            state.pending.remove(index);
        }
    }
}

pub struct ImageQueue {
    shared: Arc<Shared>,
    worker: JoinHandle<()>,
}

impl ImageQueue {
    /// Starts the dispatch worker. Must be called within a tokio runtime.
    pub fn new(provider: Arc<dyn ImageProvider>, spacing: Duration) -> Self {
        let shared = Arc::new(Shared::default());
        let worker = tokio::spawn(run_worker(Arc::clone(&shared), provider, spacing));
        Self { shared, worker }
    }

    pub fn enqueue(&self, slug: &str) -> QueueTicket {
        let (sender, receiver) = oneshot::channel();
        let id = {
            let mut state = self.shared.lock();
            let id = state.next_ticket;
            state.next_ticket += 1;

            match state.pending.iter_mut().find(|job| job.slug == slug) {
                Some(job) => job.waiters.push((id, sender)),
                None => state.pending.push_back(Job {
                    slug: slug.to_string(),
                    waiters: vec![(id, sender)],
                }),
            }
            debug!(slug, queued = state.pending.len(), "Queued image request");
            id
        };
        self.shared.notify.notify_one();

        QueueTicket {
            id,
            shared: Arc::clone(&self.shared),
            receiver,
        }
    }

    /// Number of distinct slugs waiting for dispatch.
    pub fn pending(&self) -> usize {
        self.shared.lock().pending.len()
    }
}

impl Drop for ImageQueue {
    fn drop(&mut self) {
        self.worker.abort();
    }
}

/// A place in the queue. Await it with [`QueueTicket::wait`]; drop it to withdraw.
pub struct QueueTicket {
    id: u64,
    shared: Arc<Shared>,
    receiver: oneshot::Receiver<Option<String>>,
}

impl QueueTicket {
    /// Resolves to the image URL, or `None` when the fetch failed or found nothing.
    pub async fn wait(mut self) -> Option<String> {
        (&mut self.receiver).await.ok().flatten()
    }
}

impl Drop for QueueTicket {
    fn drop(&mut self) {
        self.shared.withdraw(self.id);
    }
}

async fn run_worker(shared: Arc<Shared>, provider: Arc<dyn ImageProvider>, spacing: Duration) {
    loop {
        let job = loop {
            if let Some(job) = shared.pop_front() {
                break job;
            }
            shared.notify.notified().await;
        };

        let dispatched_at = Instant::now();
        debug!(slug = %job.slug, waiters = job.waiters.len(), "Dispatching image request");
        let url = match provider.fetch_image_url(&job.slug).await {
            Ok(url) => url,
            Err(e) => {
                warn!(slug = %job.slug, error = %e, "Image request failed");
                None
            }
        };

        for (_, sender) in job.waiters {
            // The waiter may have gone away while the request was in flight
            let _ = sender.send(url.clone());
        }

        tokio::time::sleep_until(dispatched_at + spacing).await;
    }
}
