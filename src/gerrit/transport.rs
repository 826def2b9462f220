use crate::config::GerritConfig;
use anyhow::{bail, Context, Result};
use tracing::{debug, warn};

/// Issues one page of a Gerrit search and returns the raw newline-delimited
/// JSON output.
pub trait ReviewTransport {
    async fn query(&self, query: &str, start: usize) -> Result<String>;
}

/// Runs `gerrit query` over the Gerrit ssh command interface.
pub struct SshTransport {
    ssh_command: String,
    port: u16,
    destination: String,
}

impl SshTransport {
    pub fn new(config: &GerritConfig, destination: String) -> Self {
        Self {
            ssh_command: config.ssh_command.clone(),
            port: config.port,
            destination,
        }
    }

    fn command_args(&self, query: &str, start: usize) -> Vec<String> {
        vec![
            "-p".to_string(),
            self.port.to_string(),
            self.destination.clone(),
            "gerrit".to_string(),
            "query".to_string(),
            "--current-patch-set".to_string(),
            "--start".to_string(),
            start.to_string(),
            // Gerrit re-splits the remote command line, keep the query one word
            format!("\"{}\"", query.trim().replace('"', "\\\"")),
            "--format=json".to_string(),
        ]
    }
}

impl ReviewTransport for SshTransport {
    async fn query(&self, query: &str, start: usize) -> Result<String> {
        let args = self.command_args(query, start);
        debug!("{} {}", self.ssh_command, args.join(" "));

        let mut cmd = tokio::process::Command::new(&self.ssh_command);
        cmd.args(&args);
        cmd.kill_on_drop(true);

        let output = cmd
            .output()
            .await
            .with_context(|| format!("Failed to run {} against {}", self.ssh_command, self.destination))?;

        let stderr = String::from_utf8_lossy(&output.stderr);
        if !output.status.success() {
            bail!(
                "gerrit query on {} failed ({}): {}",
                self.destination,
                output.status,
                stderr.trim()
            );
        }
        if !stderr.trim().is_empty() {
            warn!("{}", stderr.trim());
        }

        String::from_utf8(output.stdout).context("gerrit query returned non UTF-8 output")
    }
}
