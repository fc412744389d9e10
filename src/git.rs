//! Thin wrappers around the system `git` command
//!
//! Every invocation runs with a time limit. Output pipes are drained on
//! background threads so a chatty subprocess cannot block on a full pipe
//! while we wait for it.

use std::fs;
use std::io::Read;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::defaults::GIT_HOST;
use crate::error::{Error, Result};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Canonical SSH clone address for `namespace/name`.
pub fn clone_url(full_name: &str) -> String {
    format!("git@{}:{}", GIT_HOST, full_name)
}

/// Whether `candidate` is a full 40-character commit id.
pub fn is_commit_sha(candidate: &str) -> bool {
    candidate.len() == 40 && candidate.chars().all(|c| c.is_ascii_hexdigit())
}

/// Clone `url` into the working directory `parent/name`.
///
/// This uses the system git command, which automatically handles:
/// - SSH keys from ~/.ssh/ and the SSH agent
/// - `GIT_SSH` / `GIT_SSH_COMMAND` overrides
/// - Any authentication configured in ~/.gitconfig
pub fn clone(url: &str, name: &str, parent: &Path, timeout: Duration) -> Result<()> {
    fs::create_dir_all(parent)?;

    run(&["clone", "--", url, name], parent, url, timeout)?;
    Ok(())
}

/// Check out `reference` inside an existing working copy.
///
/// A reference starting with `-` is refused, since git would read it as an
/// option.
pub fn checkout(repo_dir: &Path, reference: &str, timeout: Duration) -> Result<()> {
    if reference.starts_with('-') {
        return Err(Error::GitCommand {
            command: format!("checkout {}", reference),
            url: repo_dir.display().to_string(),
            stderr: format!("refusing to check out '{}': not a valid ref", reference),
        });
    }

    run(
        &["checkout", reference],
        repo_dir,
        &repo_dir.display().to_string(),
        timeout,
    )?;
    Ok(())
}

/// Fast-forward an existing working copy from its upstream.
pub fn pull(repo_dir: &Path, timeout: Duration) -> Result<()> {
    run(&["pull"], repo_dir, &repo_dir.display().to_string(), timeout)?;
    Ok(())
}

/// Run one git command in `cwd` and return its stdout.
///
/// `label` names the repository in error messages.
fn run(args: &[&str], cwd: &Path, label: &str, timeout: Duration) -> Result<String> {
    let command = args.join(" ");

    let mut child = Command::new("git")
        .args(args)
        .current_dir(cwd)
        // Never block on an interactive credential prompt
        .env("GIT_TERMINAL_PROMPT", "0")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| Error::GitCommand {
            command: command.clone(),
            url: label.to_string(),
            stderr: e.to_string(),
        })?;

    let stdout = drain(child.stdout.take());
    let stderr = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            let _ = child.kill();
            let _ = child.wait();
            return Err(Error::Timeout {
                operation: format!("git {} ({})", command, label),
                limit: timeout,
            });
        }
        thread::sleep(POLL_INTERVAL);
    };

    let stdout = stdout.join().unwrap_or_default();
    let stderr = stderr.join().unwrap_or_default();

    if !status.success() {
        return Err(Error::GitCommand {
            command,
            url: label.to_string(),
            stderr: stderr.trim().to_string(),
        });
    }

    log::debug!("git {} in {} succeeded", command, cwd.display());
    Ok(stdout)
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> thread::JoinHandle<String> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}
