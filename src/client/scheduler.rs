//! Scheduler for the request queue and per-host rate limiting
//!
//! This module handles:
//! - A bounded FIFO queue shared by every worker
//! - Remembering which URLs were already accepted during a run
//! - Tracking in-flight requests so workers know when the queue has drained
//! - Spacing requests to the same host by `delay + uniform(0, random_delay)`

use super::request::Request;
use super::ClientError;
use rand::Rng;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<Request>,
    visited: HashSet<String>,
    in_flight: usize,
}

/// How an enqueue attempt was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Queued,
    /// The URL was accepted earlier in this run
    AlreadyVisited,
}

/// Bounded FIFO of pending requests
///
/// The queue has drained once nothing is pending and no worker holds a
/// request; [`RequestQueue::next`] then returns `None` to every waiter.
#[derive(Debug)]
pub struct RequestQueue {
    state: Mutex<QueueState>,
    capacity: usize,
    changed: Notify,
}

impl RequestQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(QueueState::default()),
            capacity,
            changed: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a first-attempt request, skipping URLs already seen this run
    ///
    /// # Returns
    ///
    /// * `Ok(Admission::Queued)` - The request is pending
    /// * `Ok(Admission::AlreadyVisited)` - The URL was seen before; nothing queued
    /// * `Err(ClientError::QueueFull)` - The queue is at capacity
    pub fn push(&self, request: Request) -> Result<Admission, ClientError> {
        {
            let mut state = self.lock();
            if state.visited.contains(request.url.as_str()) {
                return Ok(Admission::AlreadyVisited);
            }
            if state.pending.len() >= self.capacity {
                return Err(ClientError::QueueFull {
                    capacity: self.capacity,
                });
            }
            state.visited.insert(request.url.to_string());
            state.pending.push_back(request);
        }
        self.changed.notify_waiters();
        Ok(Admission::Queued)
    }

    /// Puts a retried request back, bypassing the visited check
    pub fn push_retry(&self, request: Request) -> Result<(), ClientError> {
        {
            let mut state = self.lock();
            if state.pending.len() >= self.capacity {
                return Err(ClientError::QueueFull {
                    capacity: self.capacity,
                });
            }
            state.pending.push_back(request);
        }
        self.changed.notify_waiters();
        Ok(())
    }

    /// Takes the next request, waiting while other workers may still add more
    ///
    /// Every request returned must be handed back through [`RequestQueue::complete`].
    pub async fn next(&self) -> Option<Request> {
        loop {
            // Registered before inspecting the state so no wakeup is lost
            let changed = self.changed.notified();
            {
                let mut state = self.lock();
                if let Some(request) = state.pending.pop_front() {
                    state.in_flight += 1;
                    return Some(request);
                }
                if state.in_flight == 0 {
                    return None;
                }
            }
            changed.await;
        }
    }

    /// Marks a request taken with [`RequestQueue::next`] as finished
    pub fn complete(&self) {
        {
            let mut state = self.lock();
            state.in_flight = state.in_flight.saturating_sub(1);
        }
        self.changed.notify_waiters();
    }

    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn visited(&self) -> usize {
        self.lock().visited.len()
    }
}

/// Rate limiting state for one host
#[derive(Debug, Clone, Default)]
struct HostState {
    request_count: u64,
    /// Earliest instant the next request may start
    next_slot: Option<Instant>,
}

/// Per-host spacing of requests
///
/// Each call reserves the next free slot for the host, so concurrent workers
/// queue up behind each other instead of firing together.
#[derive(Debug)]
pub struct HostLimiter {
    delay: Duration,
    random_delay: Duration,
    hosts: Mutex<HashMap<String, HostState>>,
}

impl HostLimiter {
    pub fn new(delay: Duration, random_delay: Duration) -> Self {
        Self {
            delay,
            random_delay,
            hosts: Mutex::new(HashMap::new()),
        }
    }

    fn jitter(&self) -> Duration {
        let max = self.random_delay.as_millis() as u64;
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(0..=max))
    }

    /// Reserves a request slot for `host` and returns how long to wait for it
    ///
    /// # Arguments
    ///
    /// * `host` - The lowercase host of the URL about to be fetched
    /// * `now` - The current time instant
    pub fn reserve(&self, host: &str, now: Instant) -> Duration {
        let gap = self.delay + self.jitter();
        let mut hosts = self.hosts.lock().unwrap_or_else(PoisonError::into_inner);
        let state = hosts.entry(host.to_string()).or_default();

        let start = match state.next_slot {
            Some(slot) if slot > now => slot,
            _ => now,
        };
        state.next_slot = Some(start + gap);
        state.request_count += 1;

        start - now
    }

    /// Number of slots reserved for `host` so far
    pub fn request_count(&self, host: &str) -> u64 {
        self.hosts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(host)
            .map_or(0, |s| s.request_count)
    }
}
