//! External pattern-match engine invocation
//!
//! Shells out to grep, but never through a shell: the pattern is bound as
//! a single argv entry behind `-e`, and the file path sits behind an
//! explicit `--` end-of-options marker. A pattern containing shell
//! metacharacters or starting with `-` is inert.

use crate::common::{Error, Result};
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

/// Hard cap on a single engine run, independent of the request.
const ENGINE_DEADLINE: Duration = Duration::from_secs(30);

/// grep's "no matches found" exit code.
const NO_MATCH_EXIT: i32 = 1;

pub struct GrepEngine {
    program: String,
}

impl Default for GrepEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl GrepEngine {
    pub fn new() -> Self {
        Self {
            program: "grep".to_string(),
        }
    }

    /// Run the engine against one file. `Ok` covers both the match and
    /// no-match outcomes; `Err` means the engine itself failed.
    pub async fn run(&self, pattern: &str, options: &str, file: &Path) -> Result<Vec<String>> {
        let mut cmd = Command::new(&self.program);
        cmd.args(options.split_whitespace());
        cmd.arg("-e").arg(pattern).arg("--").arg(file);
        cmd.stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        let output = tokio::time::timeout(ENGINE_DEADLINE, cmd.output())
            .await
            .map_err(|_| Error::Engine(format!("timed out after {:?}", ENGINE_DEADLINE)))?
            .map_err(|e| Error::Engine(format!("failed to spawn {}: {}", self.program, e)))?;

        if output.status.success() {
            return Ok(split_lines(&output.stdout));
        }

        if output.status.code() == Some(NO_MATCH_EXIT) {
            return Ok(Vec::new());
        }

        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(Error::Engine(format!(
            "exited with {}: {}",
            output.status,
            stderr.trim()
        )))
    }
}

/// Split engine output into lines, dropping the single trailing newline
/// grep emits after the last match.
fn split_lines(stdout: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(stdout);
    if text.is_empty() {
        return Vec::new();
    }

    let trimmed = text.strip_suffix('\n').unwrap_or(&text);
    trimmed.split('\n').map(|l| l.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fixture(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[tokio::test]
    async fn finds_matching_lines_in_file_order() {
        let file = fixture("INFO start\nERROR one\nINFO mid\nERROR two\n");
        let lines = GrepEngine::new()
            .run("ERROR", "", file.path())
            .await
            .unwrap();
        assert_eq!(lines, vec!["ERROR one", "ERROR two"]);
    }

    #[tokio::test]
    async fn no_match_is_empty_success() {
        let file = fixture("INFO only\n");
        let lines = GrepEngine::new()
            .run("ERROR", "", file.path())
            .await
            .unwrap();
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn options_are_tokenized_on_whitespace() {
        let file = fixture("error lower\nERROR upper\n");
        let lines = GrepEngine::new()
            .run("error", "-i", file.path())
            .await
            .unwrap();
        assert_eq!(lines.len(), 2);
    }

    #[tokio::test]
    async fn leading_dash_pattern_is_literal() {
        let file = fixture("-rf flag line\nplain line\n");
        let lines = GrepEngine::new()
            .run("-rf", "", file.path())
            .await
            .unwrap();
        assert_eq!(lines, vec!["-rf flag line"]);
    }

    #[tokio::test]
    async fn shell_metacharacters_are_inert() {
        let file = fixture("harmless line\n");
        // Must be treated as a literal pattern, not executed
        let lines = GrepEngine::new()
            .run("; rm -rf /", "", file.path())
            .await
            .unwrap();
        assert!(lines.is_empty());
        assert!(file.path().exists());
    }

    #[tokio::test]
    async fn missing_file_is_an_engine_error() {
        let err = GrepEngine::new()
            .run("x", "", Path::new("/nonexistent/machine.1.log"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Engine(_)));
    }

    #[tokio::test]
    async fn bad_option_is_an_engine_error() {
        let file = fixture("line\n");
        let err = GrepEngine::new()
            .run("line", "--definitely-not-a-grep-flag", file.path())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Engine(_)));
    }
}
