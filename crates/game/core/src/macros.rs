/// Warning for degenerate gameplay inputs (unset templates, dangling
/// references). Emitted in debug builds only; release builds stay silent.
macro_rules! dev_warn {
    ($($arg:tt)*) => {
        if cfg!(debug_assertions) {
            ::tracing::warn!($($arg)*);
        }
    };
}
