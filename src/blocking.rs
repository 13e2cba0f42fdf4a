//! Blocking calls that stay usable from inside a tokio runtime.

use std::thread;

use color_eyre::eyre::{eyre, Result};
use tokio::runtime::Handle;

/// Run `f` on the calling thread, or on a scoped helper thread when the caller is a runtime task.
///
/// Building or dropping a runtime (and `reqwest::blocking`) panics on a runtime thread.
pub(crate) fn outside_runtime<T, F>(f: F) -> Result<T>
where
    T: Send,
    F: FnOnce() -> Result<T> + Send,
{
    if Handle::try_current().is_err() {
        return f();
    }
    tracing::debug!(target: "assistant", "called from async context, moving blocking call to a helper thread");
    thread::scope(|s| {
        s.spawn(f)
            .join()
            .map_err(|_| eyre!("blocking helper thread panicked"))?
    })
}
