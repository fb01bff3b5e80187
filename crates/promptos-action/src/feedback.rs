//! Result formatter: renders a `CommandResult` for the user.

use promptos_core::types::{CommandResult, Presentation, STATUS_DONE, STATUS_FAILED};

/// Map a result to its status line and message. Pure and total.
pub fn present(result: &CommandResult) -> Presentation {
    let status = if result.success {
        STATUS_DONE
    } else {
        STATUS_FAILED
    };
    Presentation {
        status: status.to_string(),
        message: result.message.clone(),
    }
}
