// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// Errors from the coroutine registry and its yield/resume handshake.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoroutineError {
    /// The coroutine does not exist or has already returned.
    #[error("coroutine '{0}' is dead")]
    IsDead(String),

    /// `try_resume` found the coroutine outside of a yield.
    #[error("coroutine '{0}' is not suspended")]
    NotSuspended(String),

    /// The peer did not answer within the coroutine timeout.
    #[error("coroutine '{0}' timed out")]
    Timeout(String),

    /// `call` was issued for a coroutine that already started.
    #[error("coroutine '{0}' already started")]
    AlreadyStarted(String),
}
