use super::consolidation::{ConsolidationJob, Consolidator};
use crate::config::ConsolidationConfig;
use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::task::TaskTracker;

/// Jobs parked behind a namespace that a worker is already consolidating.
///
/// A namespace present in `active` is owned by exactly one worker, which
/// drains its parked jobs before taking new work. Other workers never wait
/// on a busy namespace.
struct Lanes {
    active: Mutex<HashMap<String, VecDeque<ConsolidationJob>>>,
    max_parked: usize,
}

enum Claim {
    Run(ConsolidationJob),
    Parked,
    Dropped(ConsolidationJob),
}

impl Lanes {
    fn new(max_parked: usize) -> Self {
        Self {
            active: Mutex::new(HashMap::new()),
            max_parked,
        }
    }

    fn claim(&self, job: ConsolidationJob) -> Claim {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        let parked: usize = active.values().map(VecDeque::len).sum();
        match active.entry(job.namespace().as_str().to_owned()) {
            Entry::Vacant(lane) => {
                lane.insert(VecDeque::new());
                Claim::Run(job)
            }
            Entry::Occupied(_) if parked >= self.max_parked => Claim::Dropped(job),
            Entry::Occupied(mut lane) => {
                lane.get_mut().push_back(job);
                Claim::Parked
            }
        }
    }

    /// Next parked job for `namespace`, releasing the lane when none is left.
    fn next(&self, namespace: &str) -> Option<ConsolidationJob> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        let next = active.get_mut(namespace).and_then(VecDeque::pop_front);
        if next.is_none() {
            active.remove(namespace);
        }
        next
    }
}

/// Bounded background queue in front of a [`Consolidator`].
///
/// `workers` tasks share one receiver. Scheduling never waits: a full queue
/// drops the job. A namespace occupies at most one worker at a time.
pub struct ConsolidationPool {
    sender: Mutex<Option<mpsc::Sender<ConsolidationJob>>>,
    tracker: TaskTracker,
}

impl ConsolidationPool {
    /// Must be called inside a Tokio runtime.
    pub fn start(consolidator: Arc<Consolidator>, config: &ConsolidationConfig) -> Self {
        let capacity = config.queue_capacity.max(1);
        let (sender, receiver) = mpsc::channel(capacity);
        let receiver = Arc::new(tokio::sync::Mutex::new(receiver));
        let lanes = Arc::new(Lanes::new(capacity));
        let tracker = TaskTracker::new();

        for worker in 0..config.workers.max(1) {
            let receiver = Arc::clone(&receiver);
            let consolidator = Arc::clone(&consolidator);
            let lanes = Arc::clone(&lanes);
            tracker.spawn(async move {
                loop {
                    let next = receiver.lock().await.recv().await;
                    let Some(job) = next else {
                        break;
                    };
                    let job = match lanes.claim(job) {
                        Claim::Run(job) => job,
                        Claim::Parked => continue,
                        Claim::Dropped(job) => {
                            tracing::warn!(project = %job.project_name, "consolidation backlog full; job dropped");
                            continue;
                        }
                    };

                    let namespace = job.namespace().as_str().to_owned();
                    let mut current = Some(job);
                    while let Some(job) = current {
                        if let Err(error) = consolidator.run(&job).await {
                            tracing::warn!(
                                worker,
                                project = %job.project_name,
                                error = %error,
                                "consolidation aborted"
                            );
                        }
                        current = lanes.next(&namespace);
                    }
                }
                tracing::debug!(worker, "consolidation worker stopped");
            });
        }

        Self {
            sender: Mutex::new(Some(sender)),
            tracker,
        }
    }

    /// Queue a job; `false` if it was dropped.
    pub fn schedule(&self, job: ConsolidationJob) -> bool {
        let sender = self.sender.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(sender) = sender.as_ref() else {
            tracing::warn!(project = %job.project_name, "consolidation pool is shut down; job dropped");
            return false;
        };

        match sender.try_send(job) {
            Ok(()) => true,
            Err(TrySendError::Full(job)) => {
                tracing::warn!(project = %job.project_name, "consolidation queue full; job dropped");
                false
            }
            Err(TrySendError::Closed(job)) => {
                tracing::warn!(project = %job.project_name, "consolidation queue closed; job dropped");
                false
            }
        }
    }

    /// Close the queue and wait for already queued jobs to finish.
    pub async fn shutdown(&self) {
        let sender = self
            .sender
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(sender);
        self.tracker.close();
        self.tracker.wait().await;
    }
}
