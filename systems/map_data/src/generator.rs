//! Child-process driver for the external map generator.

use std::{
    io::{self, Read},
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Stdio},
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use thiserror::Error;
use tracing::{debug, info};
use waypoint_core::Difficulty;

use crate::{MapData, StaticMapProvider};

/// Time the generator may run before it is killed.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Fatal failures of a generator invocation.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The generator binary could not be started.
    #[error("failed to launch map generator {}", binary.display())]
    Launch {
        /// Binary that was invoked.
        binary: PathBuf,
        /// Underlying launch failure.
        #[source]
        source: io::Error,
    },
    /// Communicating with the running generator failed.
    #[error("i/o error while reading map generator output")]
    Io(#[from] io::Error),
    /// The generator exited unsuccessfully.
    #[error("map generator exited with {status}: {stderr}")]
    Failed {
        /// Exit status reported by the operating system.
        status: ExitStatus,
        /// Captured standard error, trimmed.
        stderr: String,
    },
    /// The generator did not finish in time and was killed.
    #[error("map generator did not finish within {timeout:?}")]
    TimedOut {
        /// Timeout that expired.
        timeout: Duration,
    },
}

/// Runs the external map generator as `<binary> <install_path> -s <seed> -d <code>`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapGenerator {
    binary: PathBuf,
    install_path: PathBuf,
    timeout: Duration,
}

impl MapGenerator {
    /// Creates a generator driver with the default timeout.
    #[must_use]
    pub fn new(binary: impl Into<PathBuf>, install_path: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            install_path: install_path.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Overrides the time the generator may run.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Binary invoked by the driver.
    #[must_use]
    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Time the generator may run.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs the generator and returns its complete standard output.
    ///
    /// The timeout covers both the process exit and the end of its output,
    /// so a descendant that keeps the pipes open cannot stall the call.
    pub fn run(&self, seed: &str, difficulty: Difficulty) -> Result<String, GeneratorError> {
        let code = difficulty.generator_code().to_string();
        debug!(
            binary = %self.binary.display(),
            seed,
            difficulty = %code,
            "invoking map generator"
        );

        let mut child = Command::new(&self.binary)
            .arg(&self.install_path)
            .args(["-s", seed, "-d", code.as_str()])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| GeneratorError::Launch {
                binary: self.binary.clone(),
                source,
            })?;

        let deadline = Instant::now() + self.timeout;
        let stdout = drain(child.stdout.take());
        let stderr = drain(child.stderr.take());
        let status = self.wait(&mut child, deadline)?;
        let stdout = self.collect(&stdout, deadline)?;
        let stderr = self.collect(&stderr, deadline)?;

        if !status.success() {
            return Err(GeneratorError::Failed {
                status,
                stderr: String::from_utf8_lossy(&stderr).trim().to_owned(),
            });
        }

        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }

    fn wait(&self, child: &mut Child, deadline: Instant) -> Result<ExitStatus, GeneratorError> {
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(self.timed_out());
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(error) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(GeneratorError::Io(error));
                }
            }
        }
    }

    fn collect(
        &self,
        output: &Receiver<io::Result<Vec<u8>>>,
        deadline: Instant,
    ) -> Result<Vec<u8>, GeneratorError> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match output.recv_timeout(remaining) {
            Ok(bytes) => bytes.map_err(GeneratorError::Io),
            Err(RecvTimeoutError::Timeout) => Err(self.timed_out()),
            Err(RecvTimeoutError::Disconnected) => Err(GeneratorError::Io(io::Error::new(
                io::ErrorKind::Other,
                "pipe reader stopped",
            ))),
        }
    }

    fn timed_out(&self) -> GeneratorError {
        GeneratorError::TimedOut {
            timeout: self.timeout,
        }
    }
}

impl StaticMapProvider for MapGenerator {
    fn decode(&self, seed: &str, difficulty: Difficulty) -> Result<MapData, GeneratorError> {
        let output = self.run(seed, difficulty)?;
        let map_data = MapData::parse(&output);
        info!(seed, levels = map_data.len(), "decoded static map data");
        Ok(map_data)
    }
}

// Pipes are drained on detached threads so a chatty child never blocks on a
// full pipe while the caller polls for its exit. A reader still blocked after
// the deadline is abandoned and exits once the last writer closes the pipe.
fn drain<R>(pipe: Option<R>) -> Receiver<io::Result<Vec<u8>>>
where
    R: Read + Send + 'static,
{
    let (sender, receiver) = mpsc::channel();
    let _ = thread::spawn(move || {
        let mut buffer = Vec::new();
        let result = match pipe {
            Some(mut pipe) => pipe.read_to_end(&mut buffer).map(|_| buffer),
            None => Ok(buffer),
        };
        let _ = sender.send(result);
    });
    receiver
}
