//! Platform abstraction layer
//!
//! The simulation never reads the OS clock; hosts pick a `Clock` here and pass
//! its readings into each step.

pub mod clock;

pub use clock::{Clock, FrameClock, ManualClock, SystemClock};
