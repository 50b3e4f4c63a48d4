use anyhow::{Context, Result, bail};
use std::process::{Command, Stdio};
use tracing::info;

/// Open `url` in the system's default browser without blocking the UI.
pub fn open_url(url: &str) -> Result<()> {
  if url.trim().is_empty() {
    bail!("Nothing to open: item has no URL");
  }

  #[cfg(target_os = "macos")]
  let cmd = "open";
  #[cfg(target_os = "windows")]
  let cmd = "explorer";
  #[cfg(not(any(target_os = "macos", target_os = "windows")))]
  let cmd = "xdg-open";

  let mut child = Command::new(cmd)
    .arg(url)
    .stdin(Stdio::null())
    .stdout(Stdio::null())
    .stderr(Stdio::null())
    .spawn()
    .with_context(|| format!("Failed to launch {} for {}", cmd, url))?;

  info!(url, "browser: opened");
  // Reap in the background so no zombie is left behind.
  std::thread::spawn(move || {
    let _ = child.wait();
  });
  Ok(())
}
