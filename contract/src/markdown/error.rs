use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IoError: {0}")]
    IoError(#[from] io::Error),
    #[error("Markdown format is invalid")]
    InvalidMarkdownFormat,
    #[error("Couldn't parse interaction number from the markdown file")]
    InvalidInteractionNumber,
    #[error("The status code is invalid")]
    InvalidStatusCode,
    #[error("Interaction {found} is out of order, expected interaction {expected}")]
    InteractionOutOfOrder { expected: usize, found: usize },
}
