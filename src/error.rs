use thiserror::Error;

/// Main error type for FactQA
///
/// The first group of variants are the question-level failures a client can
/// trigger; the rest come from the storage, configuration and transport layers.
#[derive(Error, Debug)]
pub enum QaError {
    /// Question has fewer tokens than its template needs
    #[error("Malformed question")]
    MalformedQuestion,

    /// Question matches none of the supported templates
    #[error("Unrecognized question form")]
    UnrecognizedQuestionForm,

    /// Identifier rejected by the Topic/Type validity rules
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// Lookup returned nothing
    #[error("Not found")]
    NotFound,

    /// Anchors exist but all were rejected by the person filter
    #[error("Wrong input type: {0}")]
    WrongInputType(String),

    /// Quantity token is not a positive integer
    #[error("Non-numeric quantity: {0}")]
    NonNumericQuantity(String),

    /// Singular/plural form does not agree with the requested quantity
    #[error("Grammar mismatch: {0}")]
    GrammarMismatch(String),

    /// Raw label lacks the `@` language delimiter
    #[error("Label without language tag: {0}")]
    LanguageFormat(String),

    /// Term has no predicate registered in the catalog
    #[error("Unknown predicate term: {0}")]
    UnknownPredicateTerm(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// File system I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Named index does not exist or cannot be opened
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    /// Question did not finish within the lookup budget
    #[error("Timed out after {0} ms")]
    Timeout(u64),

    /// Line protocol violations
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl QaError {
    /// Fixed message sent to transport clients for this kind of failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            QaError::MalformedQuestion | QaError::UnrecognizedQuestionForm => "Request not processable!",
            QaError::InvalidIdentifier(_) => "Invalid identifier!",
            QaError::NotFound | QaError::UnknownPredicateTerm(_) => "Data not found!",
            QaError::WrongInputType(_) => "Invalid type!",
            QaError::NonNumericQuantity(_) => "Error in data formulation!",
            QaError::GrammarMismatch(_) => "Grammar mistake!",
            QaError::LanguageFormat(_) => "Language not supported!",
            QaError::Timeout(_) => "Request timed out!",
            QaError::Database(_)
            | QaError::Io(_)
            | QaError::Config(_)
            | QaError::IndexUnavailable(_)
            | QaError::Protocol(_) => "I was unable to process your request!",
        }
    }

    /// True for the plain "nothing matched" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, QaError::NotFound)
    }
}

/// Convenient Result type using QaError
pub type Result<T> = std::result::Result<T, QaError>;
