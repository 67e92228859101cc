//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Map domain errors to a string for CLI output. Uses the same wording as the
/// notice the command shows inside a host.
pub fn map_error(e: &ApiError) -> String {
    crate::command::failure_message(e)
}
