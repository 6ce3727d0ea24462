//! Frame clock: Paces `on_frame` for hosts without a render loop.
//!
//! Built on [`crossbeam_channel::tick`], so no thread is spawned and a slow
//! consumer never sees a backlog: late frames are reported as skipped and
//! the next frame is delivered with the time it was observed.

use crossbeam_channel::{tick, Receiver, RecvError};
use std::time::{Duration, Instant};
use tracing::trace;

const TARGET: &str = "stream_editor::schedule";

/// One frame, ready to hand to a manager's `on_frame(tick.at)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    /// Frame number since the clock started, counting skipped frames.
    pub frame: u64,
    /// Time the frame was delivered.
    pub at: Instant,
    /// Time elapsed since the clock was started.
    pub elapsed: Duration,
    /// Frames missed since the previous tick because the host was busy.
    pub skipped: u64,
}

/// Fixed-rate frame source.
#[derive(Debug)]
pub struct FrameClock {
    ticks: Receiver<Instant>,
    interval: Duration,
    started: Instant,
    /// Number of the last delivered frame.
    last_frame: Option<u64>,
}

impl FrameClock {
    /// Start a clock with the given interval (e.g. 16ms for ~60 FPS).
    ///
    /// A zero interval is raised to one millisecond.
    pub fn new(interval: Duration) -> Self {
        let interval = interval.max(Duration::from_millis(1));
        trace!(target: TARGET, ?interval, "frame_clock_started");
        Self {
            ticks: tick(interval),
            interval,
            started: Instant::now(),
            last_frame: None,
        }
    }

    /// Frame interval.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Raw tick channel, for `select!` alongside host channels. Instants
    /// received there can be passed to [`FrameClock::frame_at`].
    pub const fn receiver(&self) -> &Receiver<Instant> {
        &self.ticks
    }

    /// Block until the next frame.
    pub fn wait(&mut self) -> Result<Tick, RecvError> {
        let at = self.ticks.recv()?;
        Ok(self.frame_at(at))
    }

    /// The next frame if one is already due.
    pub fn try_tick(&mut self) -> Option<Tick> {
        let at = self.ticks.try_recv().ok()?;
        Some(self.frame_at(at))
    }

    /// Number a tick observed at `at`.
    #[allow(clippy::cast_possible_truncation)]
    pub fn frame_at(&mut self, at: Instant) -> Tick {
        let elapsed = at.saturating_duration_since(self.started);
        let mut frame = (elapsed.as_nanos() / self.interval.as_nanos()) as u64;
        let skipped = match self.last_frame {
            Some(last) => {
                frame = frame.max(last + 1);
                frame - last - 1
            }
            None => 0,
        };
        self.last_frame = Some(frame);
        if skipped > 0 {
            trace!(target: TARGET, frame, skipped, "frames_skipped");
        }
        Tick {
            frame,
            at,
            elapsed,
            skipped,
        }
    }

    /// Deliver frames to `on_tick` until it returns `false`.
    ///
    /// Returns the number of frames delivered.
    pub fn run(&mut self, mut on_tick: impl FnMut(Tick) -> bool) -> Result<u64, RecvError> {
        let mut delivered = 0;
        loop {
            let tick = self.wait()?;
            delivered += 1;
            if !on_tick(tick) {
                return Ok(delivered);
            }
        }
    }
}
