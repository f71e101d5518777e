//! Consistent snapshots of a region written by another process.
//!
//! The writer takes no lock, so a plain copy of the region can mix fields from
//! two updates. [`read_consistent`] copies the frame twice and only accepts the
//! result when both copies agree byte for byte. Each copy is a volatile read,
//! so the second one always goes back to the shared memory.

use tracing::trace;

use crate::layout::SharedFrame;
use crate::region::RegionView;

/// Default number of double-copy attempts per read.
pub const DEFAULT_READ_ATTEMPTS: usize = 4;

/// Copy the frame out of `view`, retrying up to `attempts` times while the
/// writer is mid-update. Returns `None` if no two consecutive copies matched.
pub fn read_consistent<V>(view: &V, attempts: usize) -> Option<Box<SharedFrame>>
where
    V: RegionView + ?Sized,
{
    let mut first = SharedFrame::boxed_zeroed();
    let mut second = SharedFrame::boxed_zeroed();

    for attempt in 1..=attempts {
        copy_frame(view, &mut first);
        copy_frame(view, &mut second);
        if first.as_bytes() == second.as_bytes() {
            return Some(first);
        }
        trace!(attempt, attempts, "Torn frame, copying again");
    }

    None
}

fn copy_frame<V>(view: &V, target: &mut SharedFrame)
where
    V: RegionView + ?Sized,
{
    // SAFETY: `frame_ptr` is valid for reads of the whole frame while `view`
    // is borrowed, SharedFrame has alignment 1 and every bit pattern is valid.
    *target = unsafe { view.frame_ptr().read_volatile() };
}
