//! External concatenation of slot artifacts
//!
//! Runs the concat tool over the ordering manifest in stream-copy mode
//! (no re-encoding) and captures its combined output to a log file. A
//! non-zero exit is reported back, never raised: after the expensive
//! synthesis work, a possibly imperfect output file is more useful than
//! a hard failure.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tokio::process::Command;

/// Result of one concat run.
#[derive(Debug)]
pub struct MuxOutcome {
    /// Exit code of the tool, if it exited normally.
    pub status: Option<i32>,
    /// Captured stdout+stderr of the tool.
    pub log_path: PathBuf,
}

impl MuxOutcome {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

/// Concatenate the manifest's entries into `output` without re-encoding.
///
/// Only spawn failures (missing binary) are errors; the tool's own exit
/// status is recorded in the outcome for the caller to log.
pub async fn concat_audio(
    ffmpeg_bin: &str,
    manifest: &Path,
    output: &Path,
    log_dir: &Path,
) -> std::io::Result<MuxOutcome> {
    tracing::debug!(
        tool = ffmpeg_bin,
        manifest = %manifest.display(),
        output = %output.display(),
        "starting concat"
    );

    let result = Command::new(ffmpeg_bin)
        .arg("-f")
        .arg("concat")
        .arg("-safe")
        .arg("0")
        .arg("-i")
        .arg(manifest)
        .arg("-c")
        .arg("copy")
        .arg("-y")
        .arg(output)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .output()
        .await?;

    let log_path = log_dir.join("ffmpeg.log");
    let mut log = Vec::with_capacity(result.stdout.len() + result.stderr.len());
    log.extend_from_slice(&result.stdout);
    log.extend_from_slice(&result.stderr);
    tokio::fs::write(&log_path, &log).await?;

    tracing::debug!(
        status = ?result.status.code(),
        log = %log_path.display(),
        "concat tool finished"
    );
    Ok(MuxOutcome {
        status: result.status.code(),
        log_path,
    })
}
