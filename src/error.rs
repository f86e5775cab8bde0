use std::collections::TryReserveError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("failed to allocate a tree node")]
    AllocationFailure,

    #[error("key not found")]
    KeyNotFound,

    #[error("child position already occupied")]
    InvalidPosition,

    #[error("node handle does not belong to this tree")]
    InvalidNode,
}

impl From<TryReserveError> for TreeError {
    fn from(_: TryReserveError) -> Self {
        TreeError::AllocationFailure
    }
}

pub type TreeResult<T> = Result<T, TreeError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MorseError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("character {0:?} has no code")]
    Unencodable(char),

    #[error("invalid code {0:?}")]
    InvalidCode(String),
}

pub type MorseResult<T> = Result<T, MorseError>;
