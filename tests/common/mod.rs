use std::sync::Once;

static INIT: Once = Once::new();

/// Initialize test logging once per test binary, at RUST_LOG=warn unless the
/// caller already set a level.
pub fn init_test_env() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_err() {
            std::env::set_var("RUST_LOG", "warn");
        }
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}
