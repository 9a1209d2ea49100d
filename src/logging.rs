/// Conditional logging module for development builds
///
/// The `log!` macro provides informational logging that is compiled out in
/// production (release) builds by default. Warnings about recoverable input
/// problems should continue using `log::warn!` directly.
///
/// Logging is enabled when either:
/// - Building in debug mode (`cfg(debug_assertions)`)
/// - The `console_logging` feature is explicitly enabled
///
/// # Examples
///
/// ```rust
/// rail_topology::log!("Loaded {} track nodes", 12);
/// ```
/// Conditionally log a debug record in development builds
///
/// This macro expands to `log::debug!` in debug builds or when the
/// `console_logging` feature is enabled. In production release builds, it
/// compiles to nothing (zero overhead).
#[macro_export]
macro_rules! log {
    ($($arg:expr),+ $(,)?) => {
        #[cfg(any(debug_assertions, feature = "console_logging"))]
        {
            $crate::__log::debug!($($arg),+);
        }
    };
}
