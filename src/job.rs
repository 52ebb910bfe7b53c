use std::{
    fmt,
    fs::File,
    io::{self, Write},
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use log::{debug, warn};

use crate::{fetcher::Fetcher, path};

/// One URL's fetch-and-save unit of work
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchJob {
    pub url: String,
    pub output_dir: Option<PathBuf>,
    pub folder_name: String,
}

impl FetchJob {
    pub fn new(url: impl Into<String>, output_dir: Option<&Path>, folder_name: &str) -> Self {
        Self {
            url: url.into(),
            output_dir: output_dir.map(Path::to_path_buf),
            folder_name: folder_name.to_string(),
        }
    }
}

/// Why a job did not produce a file
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Response status other than 200
    BadStatus(u16),
    ConnectionFailure,
    Timeout,
    /// The client could not build a request for the URL
    InvalidUrl,
    /// Local filesystem error while preparing or writing the file
    Io(io::ErrorKind),
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::BadStatus(status) => write!(f, "bad status {status}"),
            FailureKind::ConnectionFailure => f.write_str("connection failure"),
            FailureKind::Timeout => f.write_str("timeout"),
            FailureKind::InvalidUrl => f.write_str("invalid url"),
            FailureKind::Io(kind) => write!(f, "io error ({kind})"),
        }
    }
}

impl From<io::Error> for FailureKind {
    fn from(err: io::Error) -> Self {
        FailureKind::Io(err.kind())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Success { path: PathBuf, bytes_written: u64 },
    Failure(FailureKind),
}

#[derive(Clone, Debug)]
pub struct FetchResult {
    pub job: FetchJob,
    pub outcome: Outcome,
    pub elapsed: Duration,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Success { .. })
    }
}

/// Output file that is removed on drop unless the body was fully written
struct PageFile {
    path: PathBuf,
    file: Option<File>,
    persisted: bool,
}

impl PageFile {
    fn create(path: PathBuf) -> io::Result<Self> {
        let file = File::create(&path)?;
        Ok(Self {
            path,
            file: Some(file),
            persisted: false,
        })
    }

    fn write_body(&mut self, body: &[u8]) -> io::Result<u64> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| io::Error::other("page file already closed"))?;
        file.write_all(body)?;
        file.flush()?;
        Ok(body.len() as u64)
    }

    fn persist(mut self) -> PathBuf {
        self.persisted = true;
        std::mem::take(&mut self.path)
    }
}

impl Drop for PageFile {
    fn drop(&mut self) {
        // Close before removing.
        drop(self.file.take());
        if self.persisted {
            return;
        }
        match std::fs::remove_file(&self.path) {
            Ok(()) => debug!("Removed partial file {:?}", self.path),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {}
            Err(err) => warn!("Failed to remove partial file {:?}: {err}", self.path),
        }
    }
}

/// Fetch one page and save it; the same body runs under every strategy.
///
/// Never fails: any problem becomes a `Failure` outcome after the output file is removed.
///
/// File operations are plain blocking `std::fs` calls, also when the future runs on the
/// cooperative event loop; each write is one small local file and stalls the loop only briefly.
pub async fn save_page(fetcher: &dyn Fetcher, job: FetchJob) -> FetchResult {
    let started = Instant::now();
    let outcome = match fetch_to_file(fetcher, &job).await {
        Ok((path, bytes_written)) => {
            debug!(
                "Saved {bytes_written} bytes from '{}' to {path:?} in {:?}",
                job.url,
                started.elapsed()
            );
            Outcome::Success {
                path,
                bytes_written,
            }
        }
        Err(kind) => {
            warn!("Failed to save '{}': {kind}. File removed", job.url);
            Outcome::Failure(kind)
        }
    };
    FetchResult {
        job,
        outcome,
        elapsed: started.elapsed(),
    }
}

async fn fetch_to_file(
    fetcher: &dyn Fetcher,
    job: &FetchJob,
) -> Result<(PathBuf, u64), FailureKind> {
    let path = path::resolve_output_path(job.output_dir.as_deref(), &job.url, &job.folder_name)?;
    let mut page = PageFile::create(path)?;
    let body = fetcher.fetch(&job.url).await?;
    let bytes_written = page.write_body(&body)?;
    Ok((page.persist(), bytes_written))
}
