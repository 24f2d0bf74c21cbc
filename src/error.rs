use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrapezeError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("run aborted by worker {rank} with status {status}")]
    RunAborted { rank: usize, status: i32 },

    #[error("communication error: {0}")]
    Comm(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TrapezeError>;
