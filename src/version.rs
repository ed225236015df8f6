// Build-time identity from Cargo.toml, reported at startup and by `--version`

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const NAME: &str = env!("CARGO_PKG_NAME");

/// `noc-watch 0.1.0`
pub fn banner() -> String {
    format!("{NAME} {VERSION}")
}
