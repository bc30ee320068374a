pub mod app;
pub mod config;
pub mod error;
pub mod mailer;
pub mod models;
pub mod parsers;
pub mod scrapers;
pub mod storage;
pub mod utils;

pub use error::{InputError, MailError, ScrapeError};
