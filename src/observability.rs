// In: src/observability.rs

//! Structured diagnostics for the extraction engine.
//!
//! The chunk scheduler makes memory/time trade-offs that are invisible in the
//! final report; the `log_metric!` macro makes them observable during
//! development. It is a zero-cost abstraction: the `#[cfg(debug_assertions)]`
//! attribute ensures the macro body is completely compiled out of release
//! builds, imposing no performance penalty in production.

/// Logs a structured key-value metric string to stdout, only in debug builds.
///
/// # Example
/// ```
/// use batchex::log_metric;
/// let chunk = 4;
/// log_metric!("event" = "chunk_extracted", "chunk" = &chunk);
/// ```
#[macro_export]
macro_rules! log_metric {
    ($($key:literal = $value:expr),+ $(,)?) => {
        #[cfg(debug_assertions)]
        {
            // Collect each pair as a JSON string fragment
            let mut parts = Vec::new();
            $(
                parts.push(format!("\"{}\": \"{}\"", $key, $value));
            )+

            let output = format!("BATCHEX_METRIC: {{ {} }}", parts.join(", "));
            println!("{}", output);
        }
    };
}
