//! Frame scheduler: Debounce-to-next-frame keyed by operation kind.

use std::fmt;

/// Coalesces scheduled tasks per kind until the next frame.
///
/// Scheduling a kind that already has a pending task replaces it; the
/// previous task never runs. Tasks are handed out in the order their kind
/// was (last) scheduled.
pub struct FrameScheduler<K, T> {
    /// Pending tasks, at most one per kind.
    slots: Vec<(K, T)>,
    /// Frames handed out so far.
    frame: u64,
}

impl<K, T> Default for FrameScheduler<K, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> fmt::Debug for FrameScheduler<K, T>
where
    K: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FrameScheduler")
            .field("pending", &self.slots.iter().map(|(k, _)| k).collect::<Vec<_>>())
            .field("frame", &self.frame)
            .finish()
    }
}

impl<K, T> FrameScheduler<K, T> {
    /// Create an empty scheduler.
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            frame: 0,
        }
    }

    /// Number of kinds with a pending task.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Check if nothing is pending.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of frames run so far.
    pub const fn frame(&self) -> u64 {
        self.frame
    }

    /// Cancel every pending task.
    pub fn cancel_all(&mut self) {
        self.slots.clear();
    }

    /// Take every task scheduled before this tick.
    ///
    /// Slots are cleared before the tasks are returned, so anything the
    /// caller schedules while running them lands in the next frame.
    pub fn take_frame(&mut self) -> Vec<(K, T)> {
        self.frame += 1;
        std::mem::take(&mut self.slots)
    }
}

impl<K: PartialEq, T> FrameScheduler<K, T> {
    /// Schedule `task` under `kind` for the next frame.
    ///
    /// Returns `true` if a pending task of the same kind was replaced.
    pub fn schedule(&mut self, kind: K, task: T) -> bool {
        let replaced = self.cancel(&kind);
        self.slots.push((kind, task));
        replaced
    }

    /// Cancel the pending task for `kind`, if any.
    ///
    /// Returns `true` if something was cancelled. Cancelling an idle kind is
    /// a no-op.
    pub fn cancel(&mut self, kind: &K) -> bool {
        let before = self.slots.len();
        self.slots.retain(|(k, _)| k != kind);
        self.slots.len() != before
    }

    /// Check if `kind` has a pending task.
    pub fn is_pending(&self, kind: &K) -> bool {
        self.slots.iter().any(|(k, _)| k == kind)
    }

    /// Peek at the pending task for `kind`.
    pub fn pending(&self, kind: &K) -> Option<&T> {
        self.slots.iter().find(|(k, _)| k == kind).map(|(_, t)| t)
    }

    /// Mutable access to the pending task for `kind`.
    pub fn pending_mut(&mut self, kind: &K) -> Option<&mut T> {
        self.slots.iter_mut().find(|(k, _)| k == kind).map(|(_, t)| t)
    }
}

impl<K> FrameScheduler<K, Box<dyn FnOnce()>> {
    /// Run one frame of boxed callbacks. Returns how many ran.
    pub fn run_frame(&mut self) -> usize {
        let tasks = self.take_frame();
        let count = tasks.len();
        for (_, task) in tasks {
            task();
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn recorder() -> (Rc<RefCell<Vec<&'static str>>>, impl Fn(&'static str) -> Box<dyn FnOnce()>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        let sink = log.clone();
        let make = move |label: &'static str| -> Box<dyn FnOnce()> {
            let sink = sink.clone();
            Box::new(move || sink.borrow_mut().push(label))
        };
        (log, make)
    }

    #[test]
    fn test_last_schedule_per_kind_wins() {
        let (log, make) = recorder();
        let mut scheduler = FrameScheduler::new();

        assert!(!scheduler.schedule("update", make("first")));
        assert!(scheduler.schedule("update", make("second")));
        assert_eq!(scheduler.len(), 1);

        assert_eq!(scheduler.run_frame(), 1);
        assert_eq!(*log.borrow(), vec!["second"]);
    }

    #[test]
    fn test_cancel_before_frame() {
        let (log, make) = recorder();
        let mut scheduler = FrameScheduler::new();

        scheduler.schedule("reveal", make("reveal"));
        assert!(scheduler.cancel(&"reveal"));
        assert!(!scheduler.cancel(&"reveal"));
        assert!(!scheduler.cancel(&"never"));

        assert_eq!(scheduler.run_frame(), 0);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_kinds_are_independent() {
        let (log, make) = recorder();
        let mut scheduler = FrameScheduler::new();

        scheduler.schedule("update", make("update"));
        scheduler.schedule("append", make("append"));
        assert!(scheduler.is_pending(&"append"));

        scheduler.run_frame();
        assert_eq!(*log.borrow(), vec!["update", "append"]);
        assert!(scheduler.is_empty());

        // Slot is fresh after firing.
        assert!(!scheduler.schedule("update", make("again")));
        scheduler.run_frame();
        assert_eq!(log.borrow().len(), 3);
        assert_eq!(scheduler.frame(), 2);
    }

    #[test]
    fn test_take_frame_defers_rescheduled_work() {
        let mut scheduler: FrameScheduler<&str, u32> = FrameScheduler::new();
        scheduler.schedule("reveal", 1);

        let tasks = scheduler.take_frame();
        assert_eq!(tasks, vec![("reveal", 1)]);

        // Rescheduled while "running" lands in the next frame.
        scheduler.schedule("reveal", 2);
        assert_eq!(scheduler.pending(&"reveal"), Some(&2));
        assert_eq!(scheduler.take_frame(), vec![("reveal", 2)]);
    }
}
