//! External splitter process (`shnsplit`).

use std::ffi::OsString;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::time::{Duration, Instant};

use crate::error::SplitError;
use crate::models::TrackMetadata;

/// Output naming template: zero-padded track number, a dot, the track title.
pub const NAME_TEMPLATE: &str = "%n. %t";
pub const DEFAULT_PROGRAM: &str = "shnsplit";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(600);

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// One split job: cut `audio_path` along `cue_path` into flac files under `output_dir`.
#[derive(Clone, Copy, Debug)]
pub struct SplitRequest<'a> {
    pub audio_path: &'a Path,
    pub cue_path: &'a Path,
    pub output_dir: &'a Path,
    /// Tracks in cue order; the produced files are named after these.
    pub tracks: &'a [TrackMetadata],
}

pub trait Splitter {
    fn split(&self, request: &SplitRequest<'_>) -> Result<(), SplitError>;
}

/// Runs `shnsplit` and waits for it, killing it once `timeout` elapses.
#[derive(Clone, Debug)]
pub struct ShnSplit {
    pub program: PathBuf,
    pub timeout: Duration,
}

impl Default for ShnSplit {
    fn default() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_PROGRAM),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ShnSplit {
    pub fn new(program: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }

    fn args(request: &SplitRequest<'_>) -> Vec<OsString> {
        vec![
            "-f".into(),
            request.cue_path.into(),
            "-t".into(),
            NAME_TEMPLATE.into(),
            "-o".into(),
            "flac".into(),
            "-O".into(),
            "always".into(),
            "-d".into(),
            request.output_dir.into(),
            request.audio_path.into(),
        ]
    }
}

impl Splitter for ShnSplit {
    fn split(&self, request: &SplitRequest<'_>) -> Result<(), SplitError> {
        let program = self.program.display().to_string();
        tracing::info!(
            program = %program,
            audio = %request.audio_path.display(),
            output = %request.output_dir.display(),
            tracks = request.tracks.len(),
            "splitting album"
        );

        let mut child = Command::new(&self.program)
            .args(Self::args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SplitError::Spawn {
                program: program.clone(),
                source,
            })?;

        // Drained on its own thread so a chatty splitter cannot fill the pipe and stall.
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            std::thread::spawn(move || {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf);
                buf
            })
        });

        let started = Instant::now();
        let status = wait_with_timeout(&mut child, self.timeout)?;

        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();
        if !status.success() {
            return Err(SplitError::Failed {
                status,
                stderr: stderr.trim().to_string(),
            });
        }

        tracing::debug!(elapsed_ms = started.elapsed().as_millis() as u64, "splitter finished");
        Ok(())
    }
}

fn wait_with_timeout(child: &mut Child, timeout: Duration) -> Result<ExitStatus, SplitError> {
    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait().map_err(SplitError::Wait)? {
            return Ok(status);
        }
        if started.elapsed() >= timeout {
            tracing::warn!(
                timeout_secs = timeout.as_secs(),
                pid = child.id(),
                "splitter timed out; killing"
            );
            let _ = child.kill();
            let _ = child.wait();
            return Err(SplitError::Timeout(timeout));
        }
        std::thread::sleep(POLL_INTERVAL);
    }
}

/// File name the splitter produces for a track numbered `number` titled `title`.
pub fn expected_file_name(number: u32, title: &str) -> String {
    format!("{number:02}. {title}.flac")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request<'a>(tracks: &'a [TrackMetadata]) -> SplitRequest<'a> {
        SplitRequest {
            audio_path: Path::new("/src/it's a \"test\" $(rm -rf).flac"),
            cue_path: Path::new("/src/album; echo.cue"),
            output_dir: Path::new("/dst/Artist/Album"),
            tracks,
        }
    }

    #[test]
    fn args_are_passed_verbatim_without_a_shell() {
        let args = ShnSplit::args(&request(&[]));
        let args: Vec<String> = args
            .iter()
            .map(|arg| arg.to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            args,
            vec![
                "-f",
                "/src/album; echo.cue",
                "-t",
                "%n. %t",
                "-o",
                "flac",
                "-O",
                "always",
                "-d",
                "/dst/Artist/Album",
                "/src/it's a \"test\" $(rm -rf).flac",
            ]
        );
    }

    #[test]
    fn expected_file_name_pads_number() {
        assert_eq!(expected_file_name(3, "Time"), "03. Time.flac");
        assert_eq!(expected_file_name(12, "Eclipse"), "12. Eclipse.flac");
    }

    #[test]
    fn missing_program_is_a_spawn_error() {
        let splitter = ShnSplit::new("/nonexistent/shnsplit-for-tests", Duration::from_secs(1));
        let err = splitter.split(&request(&[])).expect_err("spawn should fail");
        assert!(matches!(err, SplitError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_is_reported() {
        let splitter = ShnSplit::new("false", Duration::from_secs(10));
        let err = splitter.split(&request(&[])).expect_err("false exits 1");
        assert!(matches!(err, SplitError::Failed { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn hung_process_is_killed_after_timeout() {
        let mut child = Command::new("sleep").arg("30").spawn().expect("spawn sleep");
        let started = Instant::now();
        let err = wait_with_timeout(&mut child, Duration::from_millis(300))
            .expect_err("should time out");
        assert!(matches!(err, SplitError::Timeout(_)));
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(child.try_wait().expect("try_wait").is_some());
    }

    #[cfg(unix)]
    #[test]
    fn finished_process_returns_its_status() {
        let mut child = Command::new("true").spawn().expect("spawn true");
        let status = wait_with_timeout(&mut child, Duration::from_secs(10)).expect("status");
        assert!(status.success());
    }
}
