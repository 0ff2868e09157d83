//! Persistence seam for the serialized cart.

/// A single named slot holding the serialized cart.
///
/// Implementations decide where the blob lives (a browser cookie, memory in
/// tests) and how long it is kept. `store` always replaces the whole blob.
pub trait CartStorage {
    /// The current blob, if any.
    fn load(&self) -> Option<String>;

    /// Replace the blob.
    fn store(&mut self, blob: String);

    /// Drop the blob entirely.
    fn forget(&mut self);
}

/// In-memory [`CartStorage`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCartStorage {
    blob: Option<String>,
}

impl MemoryCartStorage {
    /// Start with an existing blob.
    #[must_use]
    pub fn with_blob(blob: impl Into<String>) -> Self {
        Self {
            blob: Some(blob.into()),
        }
    }

    /// The raw blob, for inspection.
    #[must_use]
    pub fn blob(&self) -> Option<&str> {
        self.blob.as_deref()
    }
}

impl CartStorage for MemoryCartStorage {
    fn load(&self) -> Option<String> {
        self.blob.clone()
    }

    fn store(&mut self, blob: String) {
        self.blob = Some(blob);
    }

    fn forget(&mut self) {
        self.blob = None;
    }
}
