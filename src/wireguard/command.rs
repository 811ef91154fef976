//! Command-line WireGuard backend
//!
//! Runs `wg` and `wg-quick` as child processes. Nothing goes through a
//! shell: arguments are passed as-is and secrets travel over stdin.

use super::dump::parse_public_key;
use super::{KeyMaterial, WireGuardTool};
use crate::error::{PanelError, Result};
use crate::roster::Client;
use async_trait::async_trait;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, instrument, trace};

/// WireGuard tool driven through the `wg` / `wg-quick` binaries
#[derive(Debug, Clone)]
pub struct WgCommand {
    /// Path to wg command (default: "wg")
    wg_path: String,
    /// Path to wg-quick command (default: "wg-quick")
    wg_quick_path: String,
    /// Server interface
    interface: String,
}

impl WgCommand {
    /// Create a backend for `interface` using the binaries on `PATH`
    pub fn new(interface: impl Into<String>) -> Self {
        Self::with_paths(interface, "wg", "wg-quick")
    }

    /// Create with custom command paths
    pub fn with_paths(
        interface: impl Into<String>,
        wg_path: impl Into<String>,
        wg_quick_path: impl Into<String>,
    ) -> Self {
        Self {
            wg_path: wg_path.into(),
            wg_quick_path: wg_quick_path.into(),
            interface: interface.into(),
        }
    }

    /// Check if the wg command can be executed
    pub async fn is_available(&self) -> bool {
        Command::new(&self.wg_path)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }

    /// Execute a command, optionally feeding `stdin`, and return stdout
    async fn exec(&self, program: &str, args: &[&str], stdin: Option<&str>) -> Result<String> {
        trace!(program = program, args = ?args, "Executing command");

        let mut child = Command::new(program)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                PanelError::Command(format!(
                    "Failed to execute {} {}: {}",
                    program,
                    args.join(" "),
                    e
                ))
            })?;

        let mut written: std::io::Result<()> = Ok(());
        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            written = async {
                pipe.write_all(input.as_bytes()).await?;
                pipe.write_all(b"\n").await
            }
            .await;
            // Closing stdin lets the child see EOF
            drop(pipe);
        }

        // A child that exits early breaks the pipe; its stderr says why
        let output = child.wait_with_output().await.map_err(|e| {
            PanelError::Command(format!("Failed to wait for {}: {}", program, e))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PanelError::Command(format!(
                "{} {}: {}",
                program,
                args.join(" "),
                stderr.trim()
            )));
        }

        if let Err(e) = written {
            return Err(PanelError::Command(format!(
                "{} {}: failed to write stdin: {}",
                program,
                args.join(" "),
                e
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }

    async fn wg(&self, args: &[&str]) -> Result<String> {
        self.exec(&self.wg_path, args, None).await
    }

    /// Persist the running peer table to the interface config file
    async fn save(&self) -> Result<()> {
        self.exec(&self.wg_quick_path, &["save", &self.interface], None)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl WireGuardTool for WgCommand {
    async fn generate_keys(&self) -> Result<KeyMaterial> {
        let private_key = self.wg(&["genkey"]).await?;
        let public_key = self
            .exec(&self.wg_path, &["pubkey"], Some(private_key.trim()))
            .await?;
        let preshared_key = self.wg(&["genpsk"]).await?;

        KeyMaterial::new(&private_key, &public_key, &preshared_key)
    }

    async fn server_public_key(&self) -> Result<String> {
        let output = self.wg(&["show", &self.interface]).await?;
        Ok(parse_public_key(&output).unwrap_or_default())
    }

    async fn dump(&self) -> Result<String> {
        self.wg(&["show", &self.interface, "dump"]).await
    }

    #[instrument(skip(self, client), fields(interface = %self.interface, public_key = %client.public_key))]
    async fn add_peer(&self, client: &Client) -> Result<()> {
        debug!("Adding peer");
        self.exec(
            &self.wg_path,
            &[
                "set",
                &self.interface,
                "peer",
                &client.public_key,
                "preshared-key",
                "/dev/stdin",
                "allowed-ips",
                &client.address,
            ],
            Some(&client.preshared_key),
        )
        .await?;
        self.save().await?;

        info!("Peer {} registered with {}", client.name, client.address);
        Ok(())
    }

    #[instrument(skip(self), fields(interface = %self.interface))]
    async fn remove_peer(&self, public_key: &str) -> Result<()> {
        debug!("Removing peer");
        self.wg(&["set", &self.interface, "peer", public_key, "remove"])
            .await?;
        self.save().await?;
        Ok(())
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary_is_command_error() {
        let backend = WgCommand::with_paths("wg0", "/nonexistent/wg", "/nonexistent/wg-quick");
        assert!(!backend.is_available().await);

        let err = backend.dump().await.unwrap_err();
        assert!(matches!(err, PanelError::Command(_)));
        assert!(err.to_string().contains("show wg0 dump"));
    }

    #[tokio::test]
    async fn test_exec_feeds_stdin() {
        let backend = WgCommand::new("wg0");
        let out = backend.exec("cat", &[], Some("hello")).await.unwrap();
        assert_eq!(out, "hello\n");
    }

    #[tokio::test]
    async fn test_exec_reports_stderr() {
        let backend = WgCommand::new("wg0");
        let err = backend
            .exec("sh", &["-c", "echo boom >&2; exit 3"], None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[tokio::test]
    async fn test_exec_reports_stderr_when_stdin_is_closed_early() {
        let backend = WgCommand::new("wg0");
        let input = "x".repeat(1 << 20);
        let err = backend
            .exec(
                "sh",
                &["-c", "exec 0<&-; echo early >&2; exit 4"],
                Some(&input),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, PanelError::Command(_)));
        let message = err.to_string();
        assert!(message.contains("early"), "{}", message);
        assert!(message.contains("-c"), "{}", message);
    }
}
