//! Delayed tasks with optional cancellation tokens.
//!
//! The scheduler owns a virtual clock. Native hosts and tests advance it
//! explicitly; the browser adapter arms one `gloo-timers` timeout per task and
//! fires tasks by id. A task whose token was cancelled before it fires is
//! dropped without running.

use std::collections::BTreeMap;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u64);

#[derive(Debug, Default)]
pub struct TaskSeq {
    next: u64,
}

impl TaskSeq {
    pub fn next_id(&mut self) -> TaskId {
        let id = TaskId(self.next);
        self.next = self.next.wrapping_add(1);
        id
    }
}

/// A timer the host must arm: fire `id` after `delay_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerRequest {
    pub id: TaskId,
    pub delay_ms: u32,
}

#[derive(Debug)]
struct Scheduled<T> {
    due_ms: u64,
    cancel: Option<CancellationToken>,
    task: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    now_ms: u64,
    seq: TaskSeq,
    pending: BTreeMap<TaskId, Scheduled<T>>,
    armed: Vec<TimerRequest>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            now_ms: 0,
            seq: TaskSeq::default(),
            pending: BTreeMap::new(),
            armed: Vec::new(),
        }
    }
}

impl<T> Scheduler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// Queues `task` to run `delay_ms` from now. A cancelled `cancel` token makes it inert.
    pub fn schedule(
        &mut self,
        delay_ms: u32,
        cancel: Option<CancellationToken>,
        task: T,
    ) -> TaskId {
        let id = self.seq.next_id();
        self.pending.insert(
            id,
            Scheduled {
                due_ms: self.now_ms + u64::from(delay_ms),
                cancel,
                task,
            },
        );
        self.armed.push(TimerRequest { id, delay_ms });
        id
    }

    /// Timers scheduled since the last call.
    pub fn take_armed(&mut self) -> Vec<TimerRequest> {
        std::mem::take(&mut self.armed)
    }

    /// Removes the task and returns it unless its token was cancelled.
    pub fn take(&mut self, id: TaskId) -> Option<T> {
        let scheduled = self.pending.remove(&id)?;
        self.now_ms = self.now_ms.max(scheduled.due_ms);

        if scheduled
            .cancel
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
        {
            return None;
        }
        Some(scheduled.task)
    }

    /// Earliest task due at or before `until_ms`; ties run in scheduling order.
    pub fn next_due(&self, until_ms: u64) -> Option<TaskId> {
        self.pending
            .iter()
            .filter(|(_, scheduled)| scheduled.due_ms <= until_ms)
            .min_by_key(|(id, scheduled)| (scheduled.due_ms, **id))
            .map(|(id, _)| *id)
    }

    /// Moves the clock forward without running anything.
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    /// Number of queued tasks, cancelled ones included.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Number of queued tasks that would still run.
    pub fn live_len(&self) -> usize {
        self.pending
            .values()
            .filter(|scheduled| {
                !scheduled
                    .cancel
                    .as_ref()
                    .is_some_and(CancellationToken::is_cancelled)
            })
            .count()
    }
}
