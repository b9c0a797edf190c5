// Scheduler - Repeating timers with synchronous cancellation
//
// Timers do not own callbacks. The owner of a scheduler asks it for the next
// due timer and dispatches on the returned handle itself, which keeps all
// state mutation on one thread of control and makes `cancel` take effect
// immediately: a cancelled handle is never returned again.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::{Duration, Instant};

/// Identifies one repeating timer
///
/// Handles are never reused within a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

/// Source of repeating timer events
///
/// Times are offsets from the scheduler's own origin.
pub trait Scheduler {
    /// Current time on this scheduler's clock
    fn now(&self) -> Duration;

    /// Start a timer firing every `interval`, first at `start + interval`
    ///
    /// `start` may lie in the past; occurrences already due come back from
    /// the next `next_due` call.
    fn schedule_repeating_at(&mut self, start: Duration, interval: Duration) -> TimerHandle;

    /// Start a timer firing every `interval`, first at `now() + interval`
    fn schedule_repeating(&mut self, interval: Duration) -> TimerHandle {
        let now = self.now();
        self.schedule_repeating_at(now, interval)
    }

    /// Stop a timer. Unknown or already cancelled handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);

    /// Return the earliest timer due at or before `deadline`, with its due time
    ///
    /// Advances the scheduler's clock to at least the due time of the returned
    /// timer, or to `deadline` when nothing is due. Timers sharing a due time
    /// come back in the order they were scheduled.
    fn next_due(&mut self, deadline: Duration) -> Option<(Duration, TimerHandle)>;

    /// Number of live timers
    fn active_timers(&self) -> usize;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct QueueEntry {
    due: Duration,
    seq: u64,
    handle: TimerHandle,
}

/// Priority queue of repeating timers shared by the scheduler implementations
///
/// Cancellation is lazy on the heap side: the handle is dropped from the live
/// table and its stale heap entries are skipped when they surface.
#[derive(Debug, Default)]
pub struct TimerQueue {
    heap: BinaryHeap<Reverse<QueueEntry>>,
    intervals: HashMap<TimerHandle, Duration>,
    next_handle: u64,
    next_seq: u64,
}

impl TimerQueue {
    const MIN_INTERVAL: Duration = Duration::from_nanos(1);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, start: Duration, interval: Duration) -> TimerHandle {
        debug_assert!(!interval.is_zero(), "timer interval must be positive");
        let interval = interval.max(Self::MIN_INTERVAL);

        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.intervals.insert(handle, interval);
        self.push(start + interval, handle);
        handle
    }

    pub fn cancel(&mut self, handle: TimerHandle) {
        self.intervals.remove(&handle);
        if self.intervals.is_empty() {
            self.heap.clear();
        }
    }

    /// Due time of the next live timer
    pub fn peek_due(&mut self) -> Option<Duration> {
        self.discard_cancelled();
        self.heap.peek().map(|Reverse(entry)| entry.due)
    }

    /// Pop the next live timer if it is due at or before `deadline`
    ///
    /// The timer's next occurrence is queued at `due + interval`, so a
    /// repeating timer never drifts regardless of how late it was serviced.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<(Duration, TimerHandle)> {
        self.discard_cancelled();

        let Reverse(entry) = *self.heap.peek()?;
        if entry.due > deadline {
            return None;
        }
        self.heap.pop();

        if let Some(&interval) = self.intervals.get(&entry.handle) {
            self.push(entry.due + interval, entry.handle);
        }
        Some((entry.due, entry.handle))
    }

    pub fn live_timers(&self) -> usize {
        self.intervals.len()
    }

    fn push(&mut self, due: Duration, handle: TimerHandle) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(Reverse(QueueEntry { due, seq, handle }));
    }

    fn discard_cancelled(&mut self) {
        while let Some(Reverse(entry)) = self.heap.peek() {
            if self.intervals.contains_key(&entry.handle) {
                break;
            }
            self.heap.pop();
        }
    }
}

/// Deterministic scheduler driven by a virtual clock
///
/// Time only moves when `next_due` is called, which makes timing behaviour
/// exactly reproducible in tests.
#[derive(Debug, Default)]
pub struct VirtualScheduler {
    now: Duration,
    queue: TimerQueue,
}

impl VirtualScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for VirtualScheduler {
    fn now(&self) -> Duration {
        self.now
    }

    fn schedule_repeating_at(&mut self, start: Duration, interval: Duration) -> TimerHandle {
        self.queue.insert(start, interval)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.queue.cancel(handle);
    }

    fn next_due(&mut self, deadline: Duration) -> Option<(Duration, TimerHandle)> {
        match self.queue.pop_due(deadline) {
            Some((due, handle)) => {
                self.now = self.now.max(due);
                Some((due, handle))
            }
            None => {
                self.now = self.now.max(deadline);
                None
            }
        }
    }

    fn active_timers(&self) -> usize {
        self.queue.live_timers()
    }
}

/// Wall-clock scheduler: `next_due` sleeps the calling thread until the
/// next timer (or the deadline) comes around
#[derive(Debug)]
pub struct RealtimeScheduler {
    origin: Instant,
    queue: TimerQueue,
}

impl RealtimeScheduler {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
            queue: TimerQueue::new(),
        }
    }
}

impl Default for RealtimeScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for RealtimeScheduler {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn schedule_repeating_at(&mut self, start: Duration, interval: Duration) -> TimerHandle {
        self.queue.insert(start, interval)
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.queue.cancel(handle);
    }

    fn next_due(&mut self, deadline: Duration) -> Option<(Duration, TimerHandle)> {
        let target = match self.queue.peek_due() {
            Some(due) if due <= deadline => due,
            _ => deadline,
        };

        let now = self.now();
        if target > now {
            std::thread::sleep(target - now);
        }

        self.queue.pop_due(target)
    }

    fn active_timers(&self) -> usize {
        self.queue.live_timers()
    }
}
