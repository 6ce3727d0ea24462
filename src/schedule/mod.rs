//! Scheduling: Frame-coalesced work and an optional frame source.
//!
//! Streamed updates can arrive many times per frame. The [`FrameScheduler`]
//! keeps at most one task per kind and hands them out on the next frame
//! tick, so only the last request of each kind within a frame survives.
//!
//! Hosts that already run a render loop drive frames themselves. Hosts that
//! don't can pace frames with a [`FrameClock`]:
//!
//! ```text
//! ┌──────────────┐    Tick { at }    ┌──────────────┐   on_frame(at)   ┌──────────────┐
//! │  FrameClock  │ ────────────────▶ │  Host Loop   │ ───────────────▶ │   Managers   │
//! └──────────────┘                   └──────────────┘                  └──────────────┘
//! ```

mod clock;
mod frame;

pub use clock::{FrameClock, Tick};
pub use frame::FrameScheduler;
