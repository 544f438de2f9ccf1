use crate::archive::ArchiveError;
use crate::loader::LoadError;
use crate::pipeline::sink::SinkError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FireWeatherError {
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("Failed to determine checkpoint directory")]
    CheckpointDirResolution(#[source] std::io::Error),
}
