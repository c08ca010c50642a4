use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

/// `APP_CORE_ENGINE_QUIET=1` silences decorative CLI output; logs are unaffected.
pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("APP_CORE_ENGINE_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}
