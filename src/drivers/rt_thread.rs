//! Real-time thread spawning for the monitor tasks.
//!
//! Wraps `std::thread::Builder` so that each task runs on its own named OS
//! thread with an explicit stack size and, on Linux, a `SCHED_FIFO`
//! priority taken from the configured [`PriorityMap`].
//!
//! # Linux scheduling model
//!
//! The policy is applied by the new thread to itself (`pthread_self()`)
//! before it enters the task body, so there is no window where the task
//! runs at the wrong priority after `spawn` returns.  Without
//! `CAP_SYS_NICE` the kernel answers `EPERM`; the thread then logs a
//! warning and continues under the default policy.  Priorities are
//! advisory and no task logic depends on them.
//!
//! On non-Linux targets the priority is ignored.

use std::io;
use std::thread::JoinHandle;

use crate::config::{PriorityMap, PriorityTier};

/// How a task thread should be scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadSpec {
    pub name: &'static str,
    pub tier: PriorityTier,
    pub stack_kb: usize,
    /// `false` skips the real-time policy entirely.
    pub realtime: bool,
}

/// Spawn a task thread with the scheduling described by `spec`.
///
/// Only thread creation can fail here; a refused priority is logged by
/// the new thread and is not an error.
pub fn spawn_with_priority<T, F>(
    spec: ThreadSpec,
    priorities: PriorityMap,
    f: F,
) -> io::Result<JoinHandle<T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    let priority = priorities.value(spec.tier);
    log::info!(
        "Spawning '{}' (tier={:?}, pri={}, rt={}, stack={}KB)",
        spec.name,
        spec.tier,
        priority,
        spec.realtime,
        spec.stack_kb
    );

    let stack_bytes = spec
        .stack_kb
        .checked_mul(1024)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "task stack size overflows usize"))?;

    std::thread::Builder::new()
        .name(spec.name.into())
        .stack_size(stack_bytes)
        .spawn(move || {
            if spec.realtime {
                apply_fifo_priority(spec.name, priority);
            }
            f()
        })
}

#[cfg(target_os = "linux")]
fn apply_fifo_priority(name: &str, priority: u8) {
    let param = libc::sched_param {
        sched_priority: i32::from(priority),
    };
    // SAFETY: `pthread_self()` is always a valid handle for the calling
    // thread and `param` outlives the call.
    let rc = unsafe { libc::pthread_setschedparam(libc::pthread_self(), libc::SCHED_FIFO, &param) };
    if rc == 0 {
        log::info!("'{}': SCHED_FIFO priority {}", name, priority);
    } else {
        log::warn!(
            "'{}': SCHED_FIFO priority {} refused ({}), running with default policy",
            name,
            priority,
            io::Error::from_raw_os_error(rc)
        );
    }
}

#[cfg(not(target_os = "linux"))]
fn apply_fifo_priority(name: &str, priority: u8) {
    log::info!("'{}': real-time priority {} ignored on this target", name, priority);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawned_thread_carries_name_and_result() {
        let spec = ThreadSpec {
            name: "rt-test",
            tier: PriorityTier::Low,
            stack_kb: 64,
            realtime: false,
        };
        let handle = spawn_with_priority(spec, PriorityMap::default(), || {
            std::thread::current().name().map(str::to_owned)
        })
        .unwrap();
        assert_eq!(handle.join().unwrap().as_deref(), Some("rt-test"));
    }

    #[test]
    fn overflowing_stack_size_is_an_error() {
        let spec = ThreadSpec {
            name: "rt-huge",
            tier: PriorityTier::Low,
            stack_kb: usize::MAX,
            realtime: false,
        };
        let err = spawn_with_priority(spec, PriorityMap::default(), || ()).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }

    #[test]
    fn refused_priority_is_not_fatal() {
        // Unprivileged test runners get EPERM; the body must still run.
        let spec = ThreadSpec {
            name: "rt-fifo",
            tier: PriorityTier::High,
            stack_kb: 64,
            realtime: true,
        };
        let handle = spawn_with_priority(spec, PriorityMap::default(), || 7).unwrap();
        assert_eq!(handle.join().unwrap(), 7);
    }
}
