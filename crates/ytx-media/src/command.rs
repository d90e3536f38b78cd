//! yt-dlp command builder and runner.

use std::path::PathBuf;
use std::process::{ExitStatus, Stdio};
use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{MediaError, MediaResult};

/// Default executable name.
pub const DEFAULT_YTDLP_PROGRAM: &str = "yt-dlp";

/// Builder for yt-dlp commands.
#[derive(Debug, Clone)]
pub struct YtDlpCommand {
    /// Executable to run
    program: String,
    /// Arguments placed before the generated flags (cookies, proxy, ...)
    extra_args: Vec<String>,
    /// Generated flags
    args: Vec<String>,
    /// Target URL (always last)
    url: String,
}

impl YtDlpCommand {
    /// Create a new command targeting `url`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            program: DEFAULT_YTDLP_PROGRAM.to_string(),
            extra_args: Vec::new(),
            args: Vec::new(),
            url: url.into(),
        }
    }

    /// Metadata-only invocation: one JSON document plus manual and automatic
    /// subtitle references for `lang`, without downloading media.
    pub fn metadata(url: impl Into<String>, lang: impl Into<String>) -> Self {
        Self::new(url)
            .dump_json()
            .write_subs()
            .write_auto_subs()
            .sub_lang(lang)
            .skip_download()
    }

    /// Override the executable.
    pub fn program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Add arguments placed before the generated flags.
    pub fn extra_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add a single flag.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Print the info JSON to stdout.
    pub fn dump_json(self) -> Self {
        self.arg("--dump-json")
    }

    /// Request manual subtitles.
    pub fn write_subs(self) -> Self {
        self.arg("--write-subs")
    }

    /// Request automatic captions.
    pub fn write_auto_subs(self) -> Self {
        self.arg("--write-auto-subs")
    }

    /// Set subtitle language.
    pub fn sub_lang(self, lang: impl Into<String>) -> Self {
        self.arg("--sub-lang").arg(lang)
    }

    /// Do not download media.
    pub fn skip_download(self) -> Self {
        self.arg("--skip-download")
    }

    /// Executable name.
    pub fn program_name(&self) -> &str {
        &self.program
    }

    /// Build the command arguments.
    pub fn build_args(&self) -> Vec<String> {
        let mut args = self.extra_args.clone();
        args.extend(self.args.iter().cloned());
        args.push(self.url.clone());
        args
    }
}

/// Captured output of a successful run.
#[derive(Debug, Clone)]
pub struct YtDlpOutput {
    pub stdout: String,
    pub stderr: String,
}

/// Runner for yt-dlp commands with timeout and process cleanup.
#[derive(Debug, Clone, Default)]
pub struct YtDlpRunner {
    /// Timeout in seconds
    timeout_secs: Option<u64>,
}

impl YtDlpRunner {
    /// Create a new runner without a timeout.
    pub fn new() -> Self {
        Self { timeout_secs: None }
    }

    /// Set timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Run a command once and capture its output.
    ///
    /// The timeout covers the whole run: process exit plus draining both
    /// pipes, so a descendant holding a pipe open cannot stretch it. The child
    /// runs in its own process group, which is killed on timeout and when the
    /// returned future is dropped early.
    pub async fn run(&self, cmd: &YtDlpCommand) -> MediaResult<YtDlpOutput> {
        let args = cmd.build_args();
        debug!("Running yt-dlp: {} {}", cmd.program_name(), args.join(" "));

        let mut command = Command::new(cmd.program_name());
        command
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let mut child = command.spawn().map_err(|source| MediaError::Spawn {
            program: cmd.program_name().to_string(),
            source,
        })?;
        let mut group = ProcessGroupGuard::new(child.id());

        // Drain both pipes concurrently so a chatty child cannot block on a full pipe.
        let mut stdout_task = spawn_reader(child.stdout.take());
        let mut stderr_task = spawn_reader(child.stderr.take());

        let collected = collect(&mut child, &mut stdout_task, &mut stderr_task);
        let result = match self.timeout_secs {
            None => collected.await,
            Some(timeout_secs) => {
                let outcome = tokio::time::timeout(Duration::from_secs(timeout_secs), collected).await;
                match outcome {
                    Ok(result) => result,
                    Err(_) => {
                        warn!("yt-dlp timed out after {} seconds, killing process group", timeout_secs);
                        stdout_task.abort();
                        stderr_task.abort();
                        group.kill();
                        // kill() also waits, so the direct child is reaped here.
                        if let Err(e) = child.kill().await {
                            warn!(error = %e, "Failed to kill timed out yt-dlp process");
                        }
                        return Err(MediaError::timeout("yt-dlp", timeout_secs));
                    }
                }
            }
        };

        let (status, stdout, stderr) = result?;
        group.disarm();

        if status.success() {
            Ok(YtDlpOutput { stdout, stderr })
        } else {
            Err(MediaError::extraction_failed(stderr, status.code()))
        }
    }
}

type ReaderTask = JoinHandle<std::io::Result<Vec<u8>>>;

/// Wait for exit, then for both pipes to reach EOF.
async fn collect(
    child: &mut Child,
    stdout_task: &mut ReaderTask,
    stderr_task: &mut ReaderTask,
) -> MediaResult<(ExitStatus, String, String)> {
    let status = child.wait().await?;
    let stdout = join_reader(stdout_task).await?;
    let stderr = join_reader(stderr_task).await?;
    Ok((status, stdout, stderr))
}

/// Kills the child's process group when dropped, unless disarmed.
struct ProcessGroupGuard {
    pgid: Option<i32>,
}

impl ProcessGroupGuard {
    fn new(pid: Option<u32>) -> Self {
        Self {
            pgid: pid.and_then(|pid| i32::try_from(pid).ok()),
        }
    }

    fn disarm(&mut self) {
        self.pgid = None;
    }

    fn kill(&mut self) {
        if let Some(pgid) = self.pgid.take() {
            kill_process_group(pgid);
        }
    }
}

impl Drop for ProcessGroupGuard {
    fn drop(&mut self) {
        self.kill();
    }
}

#[cfg(unix)]
fn kill_process_group(pgid: i32) {
    use nix::errno::Errno;
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    match killpg(Pid::from_raw(pgid), Signal::SIGKILL) {
        Ok(()) | Err(Errno::ESRCH) => {}
        Err(e) => warn!(pgid, error = %e, "Failed to kill yt-dlp process group"),
    }
}

#[cfg(not(unix))]
fn kill_process_group(_pgid: i32) {}

fn spawn_reader<R>(pipe: Option<R>) -> ReaderTask
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf).await?;
        }
        Ok(buf)
    })
}

async fn join_reader(task: &mut ReaderTask) -> MediaResult<String> {
    let bytes = task
        .await
        .map_err(|e| MediaError::Io(std::io::Error::other(e)))??;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Check if yt-dlp (or a replacement program) is available.
pub fn check_ytdlp(program: &str) -> MediaResult<PathBuf> {
    which::which(program).map_err(|_| MediaError::YtDlpNotFound)
}
