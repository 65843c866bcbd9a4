//! Signal-deferred critical section. SIGINT and SIGTERM delivered while
//! the guard is live are buffered, not delivered; on drop, any buffered
//! signal is re-raised so the default (terminating) disposition runs
//! exactly once, after the filesystem is back in a consistent state.
//!
//! `signal-hook` is the standard crate for this flag-and-defer pattern.

use signal_hook::consts::{SIGINT, SIGTERM};
use signal_hook::flag;
use signal_hook::low_level;
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// RAII guard: while alive, SIGINT/SIGTERM are captured into flags instead
/// of running their default disposition. Dropping the guard re-raises
/// whichever signal (if any) arrived, restoring default handling first.
pub struct CriticalSection {
    sigint: Arc<AtomicBool>,
    sigterm: Arc<AtomicBool>,
    sigint_id: signal_hook::SigId,
    sigterm_id: signal_hook::SigId,
}

impl CriticalSection {
    /// # Errors
    /// Returns an error if the signal handlers cannot be installed.
    pub fn enter() -> io::Result<Self> {
        let sigint = Arc::new(AtomicBool::new(false));
        let sigterm = Arc::new(AtomicBool::new(false));
        let sigint_id = flag::register(SIGINT, Arc::clone(&sigint))?;
        let sigterm_id = flag::register(SIGTERM, Arc::clone(&sigterm))?;
        Ok(CriticalSection { sigint, sigterm, sigint_id, sigterm_id })
    }
}

impl Drop for CriticalSection {
    fn drop(&mut self) {
        low_level::unregister(self.sigint_id);
        low_level::unregister(self.sigterm_id);
        if self.sigint.load(Ordering::SeqCst) {
            let _ = low_level::raise(SIGINT);
        } else if self.sigterm.load(Ordering::SeqCst) {
            let _ = low_level::raise(SIGTERM);
        }
    }
}
