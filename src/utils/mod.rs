pub mod config;
pub mod fd_limit;
pub mod logger;

pub use config::*;
pub use fd_limit::{FDS_PER_JOB, cap_jobs_by_fd_limit, max_jobs_by_fd_limit, max_open_fds};
pub use logger::setup_logging;
