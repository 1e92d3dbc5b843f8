use std::io::{Read, Write as _};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crate::foundation::error::{CaptureError, CaptureResult};
use crate::protocol::mode::InvocationMode;

const TIMEOUT_POLL: Duration = Duration::from_millis(10);
const STDOUT_EXCERPT_BYTES: usize = 4096;

/// How to launch the engine binary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineCommand {
    /// Engine executable.
    pub program: PathBuf,
    /// Arguments placed before the mode-specific arguments.
    pub leading_args: Vec<String>,
    /// Kill the engine and fail if it runs longer than this.
    pub timeout: Option<Duration>,
}

impl EngineCommand {
    /// Launch `program` with no extra arguments and no timeout.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            leading_args: Vec::new(),
            timeout: None,
        }
    }

    /// Append arguments that precede the mode-specific ones.
    pub fn with_leading_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.leading_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set a wall-clock limit for one invocation.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Runs the engine once and returns everything it wrote to stdout.
///
/// One call is one engine run. Implementations never retry.
pub trait EngineRunner {
    /// Run the engine for `mode` at `width` x `height` and return the captured output buffer.
    fn run(&mut self, mode: &InvocationMode, width: u32, height: u32) -> CaptureResult<Vec<u8>>;
}

/// Runs the engine as a child process.
#[derive(Clone, Debug)]
pub struct ProcessRunner {
    command: EngineCommand,
}

impl ProcessRunner {
    /// Create a runner for `command`.
    pub fn new(command: EngineCommand) -> Self {
        Self { command }
    }
}

impl EngineRunner for ProcessRunner {
    #[tracing::instrument(
        skip(self, mode),
        fields(mode = mode.name(), program = %self.command.program.display())
    )]
    fn run(&mut self, mode: &InvocationMode, width: u32, height: u32) -> CaptureResult<Vec<u8>> {
        let mut cmd = Command::new(&self.command.program);
        cmd.args(&self.command.leading_args)
            .args(mode.engine_args(width, height))
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if mode.stdin_payload().is_some() {
            cmd.stdin(Stdio::piped());
        } else {
            cmd.stdin(Stdio::null());
        }

        let mut child = cmd.spawn().map_err(|e| {
            CaptureError::invocation(format!(
                "failed to spawn engine '{}': {e}",
                self.command.program.display()
            ))
        })?;

        // Both pipes are drained concurrently with the stdin write so neither side can stall
        // on a full pipe buffer.
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| CaptureError::invocation("failed to open engine stdout (unexpected)"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| CaptureError::invocation("failed to open engine stderr (unexpected)"))?;
        let stdout_drain = spawn_drain(stdout);
        let stderr_drain = spawn_drain(stderr);

        let stdin_feed = match mode.stdin_payload() {
            Some(scene) => {
                let mut stdin = child.stdin.take().ok_or_else(|| {
                    CaptureError::invocation("failed to open engine stdin (unexpected)")
                })?;
                let scene = scene.to_vec();
                Some(std::thread::spawn(move || stdin.write_all(&scene)))
            }
            None => None,
        };

        let status = wait_with_timeout(&mut child, self.command.timeout)?;

        if let Some(feed) = stdin_feed {
            match feed.join() {
                Ok(Ok(())) => {}
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::BrokenPipe => {
                    tracing::warn!("engine closed stdin before the whole scene was written");
                }
                Ok(Err(e)) => {
                    return Err(CaptureError::invocation(format!(
                        "failed to write scene to engine stdin: {e}"
                    )));
                }
                Err(_) => {
                    return Err(CaptureError::invocation(
                        "engine stdin writer thread panicked",
                    ));
                }
            }
        }

        let stdout_bytes = join_drain(stdout_drain, "stdout")?;
        let stderr_bytes = join_drain(stderr_drain, "stderr")?;

        let stderr_text = String::from_utf8_lossy(&stderr_bytes);
        if !stderr_text.trim().is_empty() {
            tracing::debug!(stderr = %stderr_text.trim(), "engine stderr");
        }

        if !status.success() {
            let detail = if stderr_text.trim().is_empty() {
                stdout_excerpt(&stdout_bytes)
            } else {
                stderr_text.trim().to_string()
            };
            return Err(CaptureError::invocation(format!(
                "engine exited with status {status}: {detail}"
            )));
        }

        tracing::debug!(stdout_len = stdout_bytes.len(), "engine finished");
        Ok(stdout_bytes)
    }
}

fn spawn_drain<R>(mut pipe: R) -> JoinHandle<std::io::Result<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    std::thread::spawn(move || {
        let mut bytes = Vec::new();
        pipe.read_to_end(&mut bytes)?;
        Ok(bytes)
    })
}

fn join_drain(
    handle: JoinHandle<std::io::Result<Vec<u8>>>,
    name: &str,
) -> CaptureResult<Vec<u8>> {
    handle
        .join()
        .map_err(|_| CaptureError::invocation(format!("engine {name} drain thread panicked")))?
        .map_err(|e| CaptureError::invocation(format!("engine {name} read failed: {e}")))
}

fn wait_with_timeout(child: &mut Child, timeout: Option<Duration>) -> CaptureResult<ExitStatus> {
    let wait_err =
        |e: std::io::Error| CaptureError::invocation(format!("failed to wait for engine: {e}"));

    let Some(timeout) = timeout else {
        return child.wait().map_err(wait_err);
    };

    let started = Instant::now();
    loop {
        if let Some(status) = child.try_wait().map_err(wait_err)? {
            return Ok(status);
        }
        if started.elapsed() >= timeout {
            // Drain threads are left detached: a grandchild may still hold the pipes open.
            let _ = child.kill();
            let _ = child.wait();
            return Err(CaptureError::invocation(format!(
                "engine timed out after {} ms and was killed",
                timeout.as_millis()
            )));
        }
        std::thread::sleep(TIMEOUT_POLL);
    }
}

fn stdout_excerpt(stdout: &[u8]) -> String {
    let text = String::from_utf8_lossy(&stdout[..stdout.len().min(STDOUT_EXCERPT_BYTES)]);
    let text = text.trim();
    if text.is_empty() {
        "(no output)".to_string()
    } else {
        text.to_string()
    }
}

/// One call observed by [`CannedRunner`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedInvocation {
    /// Arguments the engine would have received.
    pub args: Vec<String>,
    /// Bytes that would have been written to stdin.
    pub stdin: Option<Vec<u8>>,
}

/// In-memory runner that replays a fixed output buffer, for tests and offline decoding.
#[derive(Clone, Debug, Default)]
pub struct CannedRunner {
    output: Vec<u8>,
    invocations: Vec<RecordedInvocation>,
}

impl CannedRunner {
    /// Replay `output` on every call.
    pub fn new(output: impl Into<Vec<u8>>) -> Self {
        Self {
            output: output.into(),
            invocations: Vec::new(),
        }
    }

    /// Calls observed so far.
    pub fn invocations(&self) -> &[RecordedInvocation] {
        &self.invocations
    }
}

impl EngineRunner for CannedRunner {
    fn run(&mut self, mode: &InvocationMode, width: u32, height: u32) -> CaptureResult<Vec<u8>> {
        self.invocations.push(RecordedInvocation {
            args: mode.engine_args(width, height),
            stdin: mode.stdin_payload().map(<[u8]>::to_vec),
        });
        Ok(self.output.clone())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/engine/invoke.rs"]
mod tests;
