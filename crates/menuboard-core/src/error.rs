//! Error types for the menu service.
//!
//! Reads never surface these: a failed read degrades to the bundled menu.
//! Writes always return them to the caller.

use thiserror::Error;

use crate::api::ApiError;

#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Menu store is not configured - the menu is read-only")]
    NotConfigured,

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Could not reach the menu store: {0}")]
    Network(#[source] ApiError),

    #[error("Menu store rejected the operation: {0}")]
    Store(#[source] ApiError),

    /// A multi-step operation failed after some steps reached the store.
    /// Completed steps are not rolled back.
    #[error("{operation} partially applied ({completed} step(s) completed): {source}")]
    PartiallyApplied {
        operation: &'static str,
        completed: usize,
        #[source]
        source: Box<MenuError>,
    },
}

impl From<ApiError> for MenuError {
    fn from(err: ApiError) -> Self {
        if err.is_transport() {
            MenuError::Network(err)
        } else {
            MenuError::Store(err)
        }
    }
}

impl MenuError {
    /// Short user-facing explanation for admin screens.
    pub fn hint(&self) -> &'static str {
        match self {
            MenuError::NotConfigured => "Set the store URL and key, then try again.",
            MenuError::Validation(_) => "Check the entered values.",
            MenuError::Network(_) => "Check the network connection.",
            MenuError::Store(ApiError::AccessDenied(_)) => {
                "The store denied access. Check row-level security policies."
            }
            MenuError::Store(ApiError::NotFound(_)) => {
                "A table or row is missing. Check that the schema is installed."
            }
            MenuError::Store(_) => "Check the store connection and schema.",
            MenuError::PartiallyApplied { .. } => {
                "Some changes were saved. Reload the menu and review the result."
            }
        }
    }
}

/// Input rejected before any request is made.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    EmptyField { field: &'static str },

    #[error("price must be a non-negative number, got {0}")]
    InvalidPrice(f64),

    #[error("order index must be non-negative, got {0}")]
    NegativeIndex(i32),

    #[error("{entity} {id} does not exist")]
    UnknownId { entity: &'static str, id: String },

    #[error("{entity} {id} is already at the {edge} of its list")]
    OutOfBounds {
        entity: &'static str,
        id: String,
        edge: &'static str,
    },
}
