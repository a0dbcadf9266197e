//! Bringing an arbitrary window to the foreground.
//!
//! Windows only lets the thread that owns the foreground change it. Merging
//! our input queue with the target window's thread for the duration of the
//! call lifts that restriction. The merge is held by [`InputAttachment`],
//! whose `Drop` always splits the queues again, whatever the steps in
//! between returned.
//!
//! [`force_to_front`] is synchronous: there is no await point between attach
//! and detach, so two calls on the event loop can never interleave.

use tracing::debug;

use crate::error::{GopherError, Result};
use crate::platform::{ThreadId, WindowControl, WindowHandle};

/// Temporary input-queue merge between the caller and a window's thread.
struct InputAttachment<'a> {
    control: &'a dyn WindowControl,
    from: ThreadId,
    to: ThreadId,
}

impl<'a> InputAttachment<'a> {
    /// Returns `None` when there is nothing to merge: the window is gone or
    /// already belongs to the calling thread.
    fn attach(control: &'a dyn WindowControl, handle: WindowHandle) -> Option<Self> {
        let from = control.current_thread_id();
        let to = control.window_thread_id(handle)?;
        if to == from {
            return None;
        }

        if let Err(err) = control.attach_thread_input(from, to, true) {
            debug!(
                event = "foreground.attach_failed",
                handle = %handle,
                from,
                to,
                error = %err
            );
        }

        Some(Self { control, from, to })
    }
}

impl Drop for InputAttachment<'_> {
    fn drop(&mut self) {
        if let Err(err) = self.control.attach_thread_input(self.from, self.to, false) {
            debug!(
                event = "foreground.detach_failed",
                from = self.from,
                to = self.to,
                error = %err
            );
        }
    }
}

/// Restore, raise and activate `handle`.
///
/// Every step runs even if an earlier one failed; the first failure is
/// returned. The OS may still refuse activation, which callers treat as
/// transient.
pub fn force_to_front(control: &dyn WindowControl, handle: WindowHandle) -> Result<()> {
    if !control.is_window(handle) {
        return Err(GopherError::stale_window(handle));
    }

    let _attachment = InputAttachment::attach(control, handle);

    let mut first_error = None;
    let mut check = |step: &'static str, result: Result<()>| {
        if let Err(err) = result {
            debug!(event = "foreground.step_failed", handle = %handle, step, error = %err);
            first_error.get_or_insert(err);
        }
    };

    if control.is_iconic(handle) {
        check("restore", control.restore(handle));
    }

    // Bouncing through the topmost band refreshes the Z-order so the
    // foreground request sticks.
    check("raise", control.set_topmost(handle, true));
    check("lower", control.set_topmost(handle, false));
    check("foreground", control.set_foreground(handle));
    check("show", control.show(handle));

    match first_error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
