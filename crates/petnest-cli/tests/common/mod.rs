use std::path::{Path, PathBuf};
use std::process::{Command, Output};

/// Run the CLI with a custom HOME directory for isolated credential storage.
///
/// `api_base` of `None` runs without any backend configured.
pub fn run_cli_with_env(args: &[&str], home: &Path, api_base: Option<&str>) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_petnest"));
    cmd.args(args);
    cmd.env("HOME", home);
    cmd.env("XDG_DATA_HOME", home.join("data"));
    cmd.env_remove("PETNEST_PASSWORD");
    cmd.env_remove("PETNEST_HTTP_TIMEOUT_SECS");
    match api_base {
        Some(url) => cmd.env("PETNEST_API_BASE", url),
        None => cmd.env_remove("PETNEST_API_BASE"),
    };
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI off the async runtime so a mock server can answer it.
pub async fn run_cli(args: &[&str], home: &Path, api_base: Option<&str>) -> Output {
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    let home = home.to_path_buf();
    let api_base = api_base.map(str::to_string);

    tokio::task::spawn_blocking(move || {
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        run_cli_with_env(&args, &home, api_base.as_deref())
    })
    .await
    .expect("CLI task panicked")
}

/// Run the CLI and expect success, returning stdout.
pub async fn run_cli_success(args: &[&str], home: &Path, api_base: Option<&str>) -> String {
    let output = run_cli(args, home, api_base).await;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Where the CLI caches the access token under `home`.
pub fn credentials_file(home: &Path) -> PathBuf {
    home.join("data").join("petnest").join("credentials.json")
}
