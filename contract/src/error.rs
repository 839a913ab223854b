use crate::{markdown, verifier::VerificationFailure};
use hyper::http;
use std::{io, sync};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("Verification failed: {0}")]
    Verification(#[from] VerificationFailure),
    #[error("Invalid field path `{path}`: {reason}")]
    InvalidFieldPath { path: String, reason: String },
    #[error("Invalid URL `{0}`")]
    InvalidUrl(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Scenario `{scenario}` can't {action} while {state}")]
    ScenarioState {
        scenario: String,
        action: &'static str,
        state: String,
    },
    #[error("Playback error: {0}")]
    Playback(String),
    #[error("Markdown error: {0}")]
    Markdown(#[from] markdown::error::Error),
    #[error("IoError: {0}")]
    Io(#[from] io::Error),
    #[error("Hyper error: {0}")]
    Hyper(#[from] hyper::Error),
    #[error("Http Error: {0}")]
    Http(#[from] http::Error),
    #[error("Invalid header name")]
    InvalidHeaderName,
    #[error("Invalid header value")]
    InvalidHeaderValue,
    #[error("The lock was poisoned")]
    PoisonedLock,
}

impl Error {
    /// The call never produced a response.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport(_))
    }

    pub fn is_verification(&self) -> bool {
        matches!(self, Error::Verification(_))
    }

    pub fn verification_failure(&self) -> Option<&VerificationFailure> {
        match self {
            Error::Verification(failure) => Some(failure),
            _ => None,
        }
    }
}

impl<T> From<sync::PoisonError<T>> for Error {
    fn from(_: sync::PoisonError<T>) -> Self {
        Error::PoisonedLock
    }
}

impl From<hyper::header::InvalidHeaderName> for Error {
    fn from(_: hyper::header::InvalidHeaderName) -> Self {
        Error::InvalidHeaderName
    }
}

impl From<hyper::header::InvalidHeaderValue> for Error {
    fn from(_: hyper::header::InvalidHeaderValue) -> Self {
        Error::InvalidHeaderValue
    }
}
