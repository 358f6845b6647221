use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Run `f`, turning both a returned error and a panic into a rendered cause.
///
/// Used at every boundary where a failure must stay local: rule
/// construction, rule visits, front-end calls and extension hooks.
pub(crate) fn isolate<T>(f: impl FnOnce() -> anyhow::Result<T>) -> Result<T, String> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(format!("{err:#}")),
        Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "unknown panic payload"
    }
}
