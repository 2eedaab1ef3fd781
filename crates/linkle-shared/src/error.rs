use thiserror::Error;

/// Form-level validation failures.  These are shown inline next to the
/// offending field and are never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Title is required")]
    MissingTitle,

    #[error("Place is required")]
    MissingPlace,

    #[error("Capacity must be at least 1")]
    InvalidCapacity,

    #[error("Nickname is required")]
    MissingNickname,

    #[error("Prefecture and city are required")]
    MissingLocation,

    #[error("Name is required")]
    MissingName,

    #[error("Message is required")]
    MissingMessage,

    #[error("Comment is required")]
    MissingComment,

    #[error("Rating must be between {min} and {max}, got {got}")]
    InvalidRating { got: u8, min: u8, max: u8 },
}

/// Failure to parse one of the closed vocabularies (category, fee type, ...)
/// from its string form.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Unknown category: {0}")]
    Category(String),

    #[error("Unknown fee type: {0}")]
    FeeType(String),

    #[error("Unknown notification status: {0}")]
    NotificationStatus(String),

    #[error("Unknown notification kind: {0}")]
    NotificationKind(String),
}
