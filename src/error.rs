use thiserror::Error;

/// Failures that end a counting run. Nothing is retried: I/O errors and
/// worker-pool start failures both abort the run immediately.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
