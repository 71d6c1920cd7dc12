pub fn set_panic_hook() {
    // When the `console_error_panic_hook` feature is enabled, we can call the
    // `set_panic_hook` function at least once during initialization, and then
    // we will get better error messages if our code ever panics.
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Routes `log` records to the browser console. Later calls keep the first logger.
pub fn init_logger() {
    #[cfg(target_arch = "wasm32")]
    if console_log::init_with_level(log::Level::Debug).is_ok() {
        log::debug!("console logger installed");
    }
}
