use serde::Serialize;

/// Logs `value` as pretty JSON at debug level. Serialization is skipped when debug is off.
pub(crate) fn debug_pretty_json<T>(message: &str, value: &T)
where
    T: Serialize,
{
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    match serde_json::to_string_pretty(value) {
        Ok(body) => tracing::debug!(body = %body, "{message}"),
        Err(error) => tracing::debug!(%error, "{message} (body not serializable)"),
    }
}
