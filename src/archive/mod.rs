//! Compressed containers: per-batch rolling archives and the master bundle

mod container;
mod error;
mod master;
mod rolling;

pub use container::{write_container, ArchiveContainer, ContainerEntry, CONTAINER_EXTENSION};
pub use error::ArchiveError;
pub use master::{MasterBundleBuilder, REPORT_ENTRY_NAME};
pub use rolling::RollingArchiver;
