//! Background work for projectfs.
//!
//! This crate provides:
//! - A cron scheduler for recycle bin cleanup and the watcher sweep
//! - A job executor that dispatches scheduled runs to their handlers
//! - The worker that drains the watcher's deletion queue into the recycle bin

pub mod deletion;
pub mod executor;
pub mod jobs;
pub mod scheduler;

pub use deletion::{DeletionWorker, deletion_queue};
pub use executor::{JobExecutor, JobHandler};
pub use scheduler::CronScheduler;
