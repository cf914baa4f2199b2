//! Process-wide one-time setup.

use std::panic;
use std::sync::Once;
use std::thread;

static INIT: Once = Once::new();

/// Installs the panic hook. Call once at process start, before the first
/// coordinator is created.
///
/// The hook reports every panic (thread, location, message) through
/// `tracing::error!`, then chains to the previously installed hook.
/// Idempotent: returns `true` only for the call that did the setup.
pub fn initialize() -> bool {
    let mut first = false;
    INIT.call_once(|| {
        install_panic_hook();
        first = true;
    });
    first
}

/// Whether [`initialize`] already ran.
#[must_use]
pub fn is_initialized() -> bool {
    INIT.is_completed()
}

fn install_panic_hook() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let payload = info.payload();
        let message = payload
            .downcast_ref::<&str>()
            .copied()
            .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
            .unwrap_or("<non-string panic payload>");
        let location = info
            .location()
            .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
            .unwrap_or_else(|| "<unknown>".to_string());
        let current = thread::current();
        let thread = current.name().unwrap_or("<unnamed>");

        tracing::error!(thread, location = %location, "internal error: {message}");
        previous(info);
    }));
}
