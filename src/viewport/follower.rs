//! Viewport follower: Auto-scroll state machine and debounced reveals.

use crate::surface::{RevealStrategy, ScrollMetrics, SurfaceEvent};
use std::time::{Duration, Instant};

const SCROLLBAR_EPSILON: f64 = 0.5;

/// Auto-scroll configuration of one follower.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowOptions {
    /// Reveal new content as it arrives.
    pub auto_scroll_on_update: bool,
    /// Start in the following state.
    pub auto_scroll_initial: bool,
    /// Pixel distance from the bottom that still counts as "at the bottom".
    pub threshold_px: f64,
    /// Same as `threshold_px`, in lines; the larger of the two applies.
    pub threshold_lines: u32,
    /// Coalescing window for reveal requests, anchored at the first request.
    pub reveal_debounce: Duration,
    /// Quiet period required after the last request, if set.
    pub reveal_batch_on_idle: Option<Duration>,
    /// How the target line is scrolled into sight.
    pub strategy: RevealStrategy,
    /// Upper bound of the fitted view height.
    pub max_height: f64,
    /// Extra pixels added to the fitted height.
    pub height_padding: f64,
}

impl Default for FollowOptions {
    fn default() -> Self {
        Self {
            auto_scroll_on_update: true,
            auto_scroll_initial: true,
            threshold_px: 32.0,
            threshold_lines: 2,
            reveal_debounce: Duration::from_millis(75),
            reveal_batch_on_idle: None,
            strategy: RevealStrategy::default(),
            max_height: 500.0,
            height_padding: 2.0,
        }
    }
}

/// Follow state of a buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FollowState {
    /// New content is revealed automatically.
    Following,
    /// The user scrolled away; reveals are suppressed.
    Paused,
}

/// Scroll bookkeeping reset whenever a buffer is (re)created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollState {
    /// Scroll offset seen by the last scroll event.
    pub last_scroll_top: f64,
    /// Whether auto-follow is currently enabled.
    pub auto_follow_enabled: bool,
}

/// Cached view measurements.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewMetrics {
    /// Current scroll offset.
    pub scroll_top: f64,
    /// Scrollable (content) height.
    pub scroll_height: f64,
    /// Visible height reported by the view.
    pub viewport_height: f64,
    /// Line height.
    pub line_height: f64,
    /// Line count of the followed buffer.
    pub line_count: usize,
}

/// A reveal that is due now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealRequest {
    /// 1-based target line.
    pub line: usize,
    /// How to scroll it into sight.
    pub strategy: RevealStrategy,
}

#[derive(Debug, Clone, Copy)]
struct PendingReveal {
    line: usize,
    first_at: Option<Instant>,
    last_at: Option<Instant>,
    /// A request arrived since the last poll.
    fresh: bool,
}

/// `(line, line_count, has_scrollbar)` of the last performed reveal.
type RevealKey = (usize, usize, bool);

/// Tracks scroll position and decides when to reveal new content.
#[derive(Debug, Clone)]
pub struct ViewportFollower {
    options: FollowOptions,
    state: ScrollState,
    metrics: ViewMetrics,
    pending: Option<PendingReveal>,
    last_reveal: Option<RevealKey>,
}

#[allow(clippy::cast_precision_loss)]
impl ViewportFollower {
    /// Create a follower in its initial state.
    pub fn new(options: FollowOptions) -> Self {
        let state = ScrollState {
            last_scroll_top: 0.0,
            auto_follow_enabled: options.auto_scroll_initial,
        };
        Self {
            options,
            state,
            metrics: ViewMetrics::default(),
            pending: None,
            last_reveal: None,
        }
    }

    /// The follower's configuration.
    pub const fn options(&self) -> &FollowOptions {
        &self.options
    }

    /// Reset scroll state to its configured initial value and drop any
    /// pending reveal. Cached metrics are kept.
    pub fn reset(&mut self) {
        self.state = ScrollState {
            last_scroll_top: 0.0,
            auto_follow_enabled: self.options.auto_scroll_initial,
        };
        self.pending = None;
        self.last_reveal = None;
    }

    /// Reset state and forget all cached metrics.
    pub fn clear(&mut self) {
        self.reset();
        self.metrics = ViewMetrics::default();
    }

    /// Current follow state.
    pub const fn state(&self) -> FollowState {
        if self.state.auto_follow_enabled {
            FollowState::Following
        } else {
            FollowState::Paused
        }
    }

    /// Check if new content is followed.
    pub const fn is_following(&self) -> bool {
        self.state.auto_follow_enabled
    }

    /// Raw scroll state.
    pub const fn scroll_state(&self) -> ScrollState {
        self.state
    }

    /// Cached metrics.
    pub const fn metrics(&self) -> &ViewMetrics {
        &self.metrics
    }

    /// Replace cached metrics with a fresh read of the view.
    pub fn sync_metrics(&mut self, metrics: ScrollMetrics, line_count: usize) {
        self.metrics = ViewMetrics {
            scroll_top: metrics.scroll_top,
            scroll_height: metrics.scroll_height,
            viewport_height: metrics.viewport_height,
            line_height: metrics.line_height,
            line_count,
        };
        self.state.last_scroll_top = metrics.scroll_top;
    }

    /// Record the followed buffer's line count.
    pub fn set_line_count(&mut self, line_count: usize) {
        self.metrics.line_count = line_count;
    }

    /// Record a view resize.
    pub fn set_viewport_height(&mut self, height: f64) {
        self.metrics.viewport_height = height;
    }

    /// Height the view should be fitted to.
    pub fn computed_height(&self) -> f64 {
        let content = self.metrics.line_count as f64 * self.metrics.line_height;
        (content + self.options.height_padding).min(self.options.max_height)
    }

    /// Apply a surface event to the cached metrics and follow state.
    pub fn on_event(&mut self, event: SurfaceEvent) {
        match event {
            SurfaceEvent::Scroll {
                scroll_top,
                scroll_height,
            } => {
                self.metrics.scroll_height = scroll_height;
                self.on_scroll(scroll_top);
            }
            SurfaceEvent::ContentSize { content_height } => {
                self.metrics.scroll_height = content_height;
            }
            SurfaceEvent::Layout { viewport_height } => {
                self.metrics.viewport_height = viewport_height;
            }
        }
    }

    /// Handle a scroll position change and return the resulting state.
    ///
    /// Any upward movement pauses following immediately. Downward movement
    /// resumes it only within the bottom threshold.
    pub fn on_scroll(&mut self, scroll_top: f64) -> FollowState {
        let delta = scroll_top - self.state.last_scroll_top;
        self.state.last_scroll_top = scroll_top;
        self.metrics.scroll_top = scroll_top;

        let before = self.state.auto_follow_enabled;
        if delta < 0.0 {
            self.state.auto_follow_enabled = false;
        } else if self.is_near_bottom() {
            self.state.auto_follow_enabled = true;
        }
        if before != self.state.auto_follow_enabled {
            tracing::debug!(
                target: "stream_editor::viewport",
                scroll_top,
                delta,
                following = self.state.auto_follow_enabled,
                "follow_state_changed"
            );
        }
        self.state()
    }

    /// Distance from the bottom that still counts as "at the bottom".
    pub fn threshold(&self) -> f64 {
        let lines = f64::from(self.options.threshold_lines) * self.metrics.line_height;
        self.options.threshold_px.max(lines)
    }

    fn content_height(&self) -> f64 {
        let lines = self.metrics.line_count as f64 * self.metrics.line_height;
        self.metrics.scroll_height.max(lines)
    }

    fn visible_height(&self) -> f64 {
        let visible = if self.metrics.viewport_height > 0.0 {
            self.metrics.viewport_height
        } else {
            self.computed_height()
        };
        visible.min(self.options.max_height)
    }

    /// Whether the content overflows the visible height.
    pub fn has_vertical_scrollbar(&self) -> bool {
        self.content_height() > self.visible_height() + SCROLLBAR_EPSILON
    }

    /// Whether the scroll position is within the bottom threshold.
    pub fn is_near_bottom(&self) -> bool {
        let bottom = self.metrics.scroll_top + self.visible_height();
        self.content_height() - bottom <= self.threshold()
    }

    /// Request a reveal of `target` (default: the last line).
    ///
    /// Ignored unless following, auto-scroll on update is enabled and the
    /// view actually scrolls. Repeating the last performed reveal with an
    /// unchanged line count is suppressed. Returns `true` if a reveal is now
    /// pending.
    pub fn maybe_reveal_line(&mut self, target: Option<usize>) -> bool {
        if !self.state.auto_follow_enabled
            || !self.options.auto_scroll_on_update
            || !self.has_vertical_scrollbar()
        {
            return false;
        }

        let line = target.unwrap_or(self.metrics.line_count).max(1);
        if self.pending.is_none() && self.last_reveal == Some((line, self.metrics.line_count, true)) {
            tracing::trace!(target: "stream_editor::viewport", line, "reveal_deduped");
            return false;
        }

        match &mut self.pending {
            Some(pending) => {
                pending.line = line;
                pending.fresh = true;
            }
            None => {
                self.pending = Some(PendingReveal {
                    line,
                    first_at: None,
                    last_at: None,
                    fresh: true,
                });
            }
        }
        true
    }

    /// Check if a reveal is waiting for its timers.
    pub const fn has_pending_reveal(&self) -> bool {
        self.pending.is_some()
    }

    /// Drop a pending reveal.
    pub fn cancel_reveal(&mut self) {
        self.pending = None;
    }

    /// Advance the reveal timers to `now`.
    ///
    /// Requests are stamped at the first poll that sees them. A reveal is
    /// due once the debounce window since the first request has elapsed and,
    /// when an idle window is configured, no request arrived within it.
    pub fn poll_reveal(&mut self, now: Instant) -> Option<RevealRequest> {
        let pending = self.pending.as_mut()?;
        let first_at = *pending.first_at.get_or_insert(now);
        if pending.fresh || pending.last_at.is_none() {
            pending.last_at = Some(now);
            pending.fresh = false;
        }
        let last_at = pending.last_at.unwrap_or(now);

        if !self.state.auto_follow_enabled {
            self.pending = None;
            return None;
        }

        let debounced = now.saturating_duration_since(first_at) >= self.options.reveal_debounce;
        let idle = self
            .options
            .reveal_batch_on_idle
            .is_none_or(|window| now.saturating_duration_since(last_at) >= window);
        if !(debounced && idle) {
            return None;
        }

        let line = pending.line;
        self.pending = None;
        self.last_reveal = Some((line, self.metrics.line_count, self.has_vertical_scrollbar()));
        Some(RevealRequest {
            line,
            strategy: self.options.strategy,
        })
    }
}
