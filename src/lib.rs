//! Periodic screen capture with rolling archives and a per-session master bundle.

pub mod archive;
pub mod capture;
pub mod config;
pub mod scheduler;
pub mod session;
pub mod ui;
pub mod util;

pub use archive::{ArchiveContainer, ArchiveError, MasterBundleBuilder, RollingArchiver};
pub use capture::{CaptureArtifact, CaptureError, CaptureUnit, Quality, ScreenSource};
pub use config::Config;
pub use scheduler::{
    Annotation, CaptureScheduler, SchedulerPaths, SessionError, SessionOutcome, SessionSettings,
};
pub use session::{SessionMetadata, SessionState, SessionTimeline};
pub use ui::App;
