use std::process::ExitCode;

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn short_target() -> String {
    format!("{}-{}", std::env::consts::OS, std::env::consts::ARCH)
}

fn make_version_string() -> String {
    let profile = if cfg!(debug_assertions) { "debug" } else { "release" };
    format!("{VERSION} ({profile} {})", short_target())
}

pub fn version_string() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(make_version_string)
}

pub fn print_version() -> ExitCode {
    println!("wren {}", version_string());
    ExitCode::SUCCESS
}
