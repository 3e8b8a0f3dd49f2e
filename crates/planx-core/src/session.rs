//! # Session Context
//!
//! The slice of session state enumeration reads. Kept deliberately thin: the
//! enumeration core is purely functional and only consults tuning variables.

#[derive(Debug, Clone)]
pub struct SessionVars {
    /// Worker count recorded on hash-join candidates.
    pub hash_join_concurrency: usize,
}

impl Default for SessionVars {
    fn default() -> Self {
        Self {
            hash_join_concurrency: 5,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SessionCtx {
    pub vars: SessionVars,
}
