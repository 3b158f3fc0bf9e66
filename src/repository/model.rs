/// Notification sent to listeners after the working collection changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryEvent {
    /// The collection was replaced from the recipe file
    Loaded { count: usize },
    /// The collection was written to the recipe file
    Saved { count: usize },
    Added { name: String },
    Deleted { name: String },
}

/// Handle returned by `subscribe`, used to remove the listener again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub(crate) usize);

/// Callback invoked synchronously for every `RepositoryEvent`
pub type ChangeListener = Box<dyn Fn(&RepositoryEvent) + Send + Sync>;
