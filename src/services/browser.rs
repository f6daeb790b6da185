//! Opening files in the system browser

use std::path::Path;

use tokio::process::Command;
use tracing::{debug, info};

#[cfg(target_os = "macos")]
fn opener() -> (&'static str, &'static [&'static str]) {
    ("open", &[])
}

#[cfg(target_os = "windows")]
fn opener() -> (&'static str, &'static [&'static str]) {
    ("cmd", &["/C", "start", ""])
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn opener() -> (&'static str, &'static [&'static str]) {
    ("xdg-open", &[])
}

/// Open `path` with the platform's default handler
pub async fn open_in_browser(path: &Path) -> Result<(), String> {
    let (program, args) = opener();
    debug!("Opening {} with {}", path.display(), program);

    let output = Command::new(program)
        .args(args)
        .arg(path)
        .output()
        .await
        .map_err(|e| format!("Failed to execute {}: {}", program, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!("{} failed: {}", program, stderr));
    }

    info!("Opened {} in browser", path.display());
    Ok(())
}
