//! Digest composition.
//!
//! Turns the selected entries and the LLM summary into the email subject,
//! plain-text body and HTML body.

mod generator;
pub mod text;

pub use generator::{DigestContext, DigestGenerator};

/// The email for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    /// Identifiers of the entries this digest covers.
    pub identifiers: Vec<String>,
}
