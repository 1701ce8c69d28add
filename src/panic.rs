//! Panic capture for user-supplied bodies.
//!
//! Step, hook, transform, and world-factory bodies are plugin code. A panic
//! inside one of them (typically a failed `assert!`) must fail only the
//! current step, so every call into plugin code goes through
//! [`catch_body_panic`].

use std::{
    any::Any,
    borrow::Cow,
    panic::{AssertUnwindSafe, catch_unwind},
};

/// Render a panic payload as text.
///
/// `panic!` and `assert!` produce `String` or `&'static str` payloads, which
/// render unchanged. Other payloads fall back to their `Debug` form.
///
/// ```
/// use lucid::panic::format_panic;
///
/// assert_eq!(format_panic(&"boom"), "boom");
/// assert_eq!(format_panic(&String::from("boom")), "boom");
/// assert!(format_panic(&5_u32).contains("Any"));
/// ```
#[must_use]
pub fn format_panic(payload: &(dyn Any + Send)) -> Cow<'_, str> {
    if let Some(message) = payload.downcast_ref::<String>() {
        Cow::Borrowed(message)
    } else if let Some(message) = payload.downcast_ref::<&'static str>() {
        Cow::Borrowed(message)
    } else {
        Cow::Owned(format!("{payload:?}"))
    }
}

/// Run `body`, turning a panic into its rendered message.
///
/// # Errors
///
/// Returns the rendered panic payload if `body` panicked.
pub fn catch_body_panic<T>(body: impl FnOnce() -> T) -> Result<T, String> {
    catch_unwind(AssertUnwindSafe(body)).map_err(|payload| format_panic(payload.as_ref()).into_owned())
}
