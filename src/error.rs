use thiserror::Error;

/// Error produced by a single [`EntityStore`](crate::EntityStore) lookup.
///
/// A missing entity is *not* an error — the store returns `Ok(None)` for
/// an unknown id. `StoreError` covers the cases where the lookup itself
/// could not be carried out. The graph builder treats both outcomes the
/// same way: the affected branch of the traversal is abandoned and the
/// walk continues elsewhere.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport or backend failure while performing the lookup.
    #[error("store backend error: {0}")]
    Backend(#[from] anyhow::Error),

    /// The store answered, but the record payload could not be decoded.
    #[error("malformed record '{0}': {1}")]
    Malformed(Box<str>, #[source] serde_json::Error),
}

impl StoreError {
    /// Shorthand for a backend failure with a plain message.
    pub fn backend(msg: impl Into<String>) -> Self {
        StoreError::Backend(anyhow::anyhow!(msg.into()))
    }
}
