use thiserror::Error;

#[derive(Error, Debug)]
pub enum HydrationError {
    #[error("Entity '{0}' is not registered")]
    UnknownEntity(String),

    #[error("Entity '{0}' is already registered")]
    DuplicateEntity(String),

    #[error("Relation '{relation}' is not declared on entity '{entity}'")]
    UnknownRelation { entity: String, relation: String },

    #[error("Type mismatch: {0}")]
    TypeMismatch(String),

    #[error("Invalid row: {0}")]
    InvalidRow(String),
}

pub type Result<T> = std::result::Result<T, HydrationError>;
