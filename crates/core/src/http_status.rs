//! User-facing sentences for HTTP error statuses.

/// Map an HTTP status to a fixed user-facing sentence.
///
/// Unmapped statuses fall back to `"{fallback} (HTTP {status})"`.
pub fn error_message(status: u16, fallback: &str) -> String {
    let fixed = match status {
        400 => "The request was invalid. Please check your input and try again.",
        401 => "Your session has expired. Please sign in again.",
        403 => "You do not have permission to perform this action.",
        404 => "The requested resource could not be found.",
        409 => "This action conflicts with the current state. Please refresh and try again.",
        422 => "Some of the submitted information is invalid.",
        429 => "Too many requests. Please wait a moment and try again.",
        500 => "Something went wrong on our end. Please try again later.",
        502..=504 => "The service is temporarily unavailable. Please try again shortly.",
        _ => return format!("{fallback} (HTTP {status})"),
    };
    fixed.to_string()
}
