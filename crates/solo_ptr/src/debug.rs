//! Owner accounting, only active with the `debug` feature.
//!
//! Every transition of an [`ExclusiveOwner`](crate::ExclusiveOwner) from
//! empty to owning increments a process-wide counter, and every transition
//! back (drop, reset, release) decrements it. Moving an owner does not
//! change the count.
//!
//! Without the feature the hooks compile to nothing.

#[cfg(feature = "debug")]
use core::sync::atomic::{AtomicUsize, Ordering};

#[cfg(feature = "debug")]
static LIVE_OWNERS: AtomicUsize = AtomicUsize::new(0);

/// Number of owners currently holding an instance.
///
/// # Examples
///
/// ```
/// use solo_ptr::{ExclusiveOwner, debug};
///
/// let before = debug::live_owners();
/// let owner = ExclusiveOwner::new(5);
/// assert!(debug::live_owners() >= before);
/// drop(owner);
/// ```
#[cfg(feature = "debug")]
#[cfg_attr(docsrs, doc(cfg(feature = "debug")))]
pub fn live_owners() -> usize {
    LIVE_OWNERS.load(Ordering::Relaxed)
}

#[inline(always)]
pub(crate) fn acquired() {
    #[cfg(feature = "debug")]
    LIVE_OWNERS.fetch_add(1, Ordering::Relaxed);
}

#[inline(always)]
pub(crate) fn relinquished() {
    #[cfg(feature = "debug")]
    {
        let prev = LIVE_OWNERS.fetch_sub(1, Ordering::Relaxed);
        if prev == 0 {
            log::error!("owner accounting underflow, an instance was relinquished twice");
        }
    }
}
