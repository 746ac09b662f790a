//! File descriptor limit detection for capping concurrent converter processes (Unix).

use log::debug;

/// Estimated number of file descriptors held per running conversion (null stdio, exec pipe, child handles).
pub const FDS_PER_JOB: usize = 4;

/// Fraction of the process FD limit to use (leave headroom for other code).
const FD_LIMIT_FRACTION: f64 = 0.8;

/// Returns the soft limit for max open file descriptors, or `None` if unavailable (e.g. Windows).
#[cfg(unix)]
pub fn max_open_fds() -> Option<u64> {
    use std::mem::MaybeUninit;
    let mut rlim = MaybeUninit::<libc::rlimit>::uninit();
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, rlim.as_mut_ptr()) } != 0 {
        return None;
    }
    let rlim = unsafe { rlim.assume_init() };
    let cur = rlim.rlim_cur;
    // RLIM_INFINITY is typically !0 or u64::MAX; treat as "no practical limit"
    if cur == libc::RLIM_INFINITY || cur > i64::MAX as u64 {
        return None;
    }
    Some(cur)
}

#[cfg(not(unix))]
pub fn max_open_fds() -> Option<u64> {
    None
}

/// Max concurrent jobs that stay under ~80% of the FD limit. `None` if no limit is available.
pub fn max_jobs_by_fd_limit() -> Option<usize> {
    let limit = max_open_fds()?;
    let usable = (limit as f64 * FD_LIMIT_FRACTION) as usize;
    if usable < FDS_PER_JOB {
        return Some(1);
    }
    Some(usable / FDS_PER_JOB)
}

/// Cap `requested` by the FD limit.
pub fn cap_jobs_by_fd_limit(requested: usize) -> usize {
    match max_jobs_by_fd_limit() {
        Some(fd_cap) if fd_cap < requested => {
            debug!("Capping jobs {} -> {} (FD limit ~80%)", requested, fd_cap);
            fd_cap
        }
        _ => requested,
    }
}
