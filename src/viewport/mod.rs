//! Viewport following: Decide when streamed content should auto-scroll.
//!
//! Each buffer that receives streamed content carries a [`ViewportFollower`].
//! It caches the view's scroll metrics (fed by surface events, so nothing is
//! re-measured per call), tracks whether the user has scrolled away, and
//! turns reveal requests into at most one debounced reveal.
//!
//! ```text
//!            scroll delta < 0
//!   ┌───────────┐ ─────────────▶ ┌──────────┐
//!   │ Following │                │  Paused  │
//!   └───────────┘ ◀───────────── └──────────┘
//!            within threshold of bottom
//! ```

mod follower;

pub use follower::{FollowOptions, FollowState, RevealRequest, ScrollState, ViewMetrics, ViewportFollower};
