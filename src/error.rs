use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("start URL is empty")]
    EmptyStartUrl,

    #[error("invalid URL \"{url}\": {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid selector \"{selector}\": {reason}")]
    InvalidSelector { selector: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("forbidden by robots.txt: {url}")]
    ForbiddenByRobots { url: String },

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("sender credentials are not set ({0} and {1} are required)")]
    MissingCredentials(&'static str, &'static str),

    #[error("attachment not found at {}", .0.display())]
    AttachmentNotFound(PathBuf),

    #[error("could not read attachment {}: {source}", path.display())]
    AttachmentUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid email address \"{address}\": {source}")]
    InvalidAddress {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("failed to build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),
}
