//! External text-to-speech command execution.
//!
//! Cues are spoken by running a platform speech command with the text as its
//! single argument:
//!
//! - `say` on macOS
//! - `espeak` elsewhere
//!
//! The command runs under a timeout. A synthesizer still running when the
//! timeout fires is killed, so no process outlives its cue.

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::process::Command;
use tokio::time::timeout;
use tracing::{debug, warn};

use super::error::SpeechError;

/// Default timeout for one utterance in seconds.
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 5;

/// Returns the platform default speech command.
#[must_use]
pub fn default_command() -> &'static str {
    if cfg!(target_os = "macos") {
        "say"
    } else {
        "espeak"
    }
}

/// Resolves a command name to an executable path.
///
/// Names containing a path separator are checked as-is; bare names are looked
/// up in `PATH`.
#[must_use]
pub fn resolve_command(command: &str) -> Option<PathBuf> {
    if command.contains(std::path::MAIN_SEPARATOR) {
        let path = Path::new(command);
        return path.is_file().then(|| path.to_path_buf());
    }

    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(command))
        .find(|candidate| candidate.is_file())
}

/// Speaks `text` with `command`, giving up after `timeout_seconds`.
///
/// # Errors
///
/// Returns an error if:
/// - The command cannot be found (`SpeechError::CommandNotFound`)
/// - Execution times out (`SpeechError::Timeout`)
/// - The command exits unsuccessfully (`SpeechError::ExecutionFailed`)
pub async fn speak_with_command(
    command: &str,
    text: &str,
    timeout_seconds: u64,
) -> Result<(), SpeechError> {
    let Some(program) = resolve_command(command) else {
        warn!("読み上げコマンドが見つかりません: {}", command);
        return Err(SpeechError::CommandNotFound(command.to_string()));
    };

    debug!(command, text, "Speaking");

    match timeout(
        Duration::from_secs(timeout_seconds),
        execute(program, command, text),
    )
    .await
    {
        Ok(result) => result,
        Err(_) => Err(SpeechError::Timeout(timeout_seconds)),
    }
}

async fn execute(program: PathBuf, command: &str, text: &str) -> Result<(), SpeechError> {
    // Dropping the output future on timeout kills the child
    let output = Command::new(program)
        .arg(text)
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| SpeechError::Other(format!("コマンド実行エラー: {}", e)))?;

    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(SpeechError::ExecutionFailed(
            command.to_string(),
            stderr.trim().to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command() {
        #[cfg(target_os = "macos")]
        assert_eq!(default_command(), "say");

        #[cfg(not(target_os = "macos"))]
        assert_eq!(default_command(), "espeak");
    }

    #[test]
    fn test_resolve_missing_command() {
        assert!(resolve_command("hiit-no-such-speech-command").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_absolute_path() {
        assert_eq!(resolve_command("/bin/sh"), Some(PathBuf::from("/bin/sh")));
        assert!(resolve_command("/no/such/binary").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_from_path() {
        assert!(resolve_command("sh").is_some());
    }

    #[tokio::test]
    async fn test_speak_missing_command() {
        let result = speak_with_command("hiit-no-such-speech-command", "Work", 1).await;

        assert_eq!(
            result,
            Err(SpeechError::CommandNotFound(
                "hiit-no-such-speech-command".to_string()
            ))
        );
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_speak_successful_command() {
        // `true` ignores its argument and exits 0
        let result = speak_with_command("true", "Prepare", 5).await;
        assert!(result.is_ok());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_speak_failing_command() {
        let result = speak_with_command("false", "Rest", 5).await;
        assert!(matches!(result, Err(SpeechError::ExecutionFailed(_, _))));
    }

    /// True while `pid` exists and is not a zombie.
    #[cfg(target_os = "linux")]
    fn is_alive(pid: &str) -> bool {
        match std::fs::read_to_string(format!("/proc/{}/stat", pid)) {
            // The state letter follows the parenthesised command name
            Ok(stat) => stat
                .rsplit(") ")
                .next()
                .is_some_and(|rest| !rest.starts_with('Z')),
            Err(_) => false,
        }
    }

    #[cfg(target_os = "linux")]
    #[tokio::test]
    async fn test_timed_out_command_is_killed() {
        let dir = tempfile::tempdir().unwrap();
        let pid_file = dir.path().join("pid");
        let script = dir.path().join("hang.sh");
        std::fs::write(
            &script,
            format!("echo $$ > '{}'\nexec sleep 30\n", pid_file.display()),
        )
        .unwrap();

        // `sh <script>` stands in for a synthesizer that never returns
        let result = speak_with_command("sh", script.to_str().unwrap(), 1).await;
        assert_eq!(result, Err(SpeechError::Timeout(1)));

        let pid = std::fs::read_to_string(&pid_file).unwrap();
        let pid = pid.trim();
        for _ in 0..50 {
            if !is_alive(pid) {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("speech process {} still running after timeout", pid);
    }
}
