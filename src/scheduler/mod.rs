//! Capture Scheduler: the background tick loop and its control surface.
//!
//! [`CaptureScheduler`] owns the Stopped / Running / Paused state machine. It
//! spawns one worker task per session; the worker captures on a fixed cadence,
//! parks on the [`TickGate`] while paused, and runs the master bundle step when
//! it exits after a stop.
//!
//! Exclusivity: the batch and the archive list live behind one async mutex.
//! The worker holds it for a whole tick; pause/stop hold it for the whole of
//! their archiving step. Pause closes the gate before taking the lock, so no
//! tick can begin after a pause request and an in-flight tick is drained into
//! the batch being archived.

mod control;
mod error;
mod gate;
mod settings;
mod status;
mod timing;
mod worker;

pub use control::{CaptureScheduler, SchedulerPaths, SessionOutcome};
pub use error::SessionError;
pub use gate::TickGate;
pub use settings::{Annotation, SessionSettings, DEFAULT_INTERVAL_SECS};
pub use status::{StatusIndicator, StatusLevel, StatusMessage};
pub use timing::sleep_duration;
