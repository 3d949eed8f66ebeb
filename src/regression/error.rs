//! Harness Errors
//!
//! Setup errors abort the harness before any case is generated. Engine errors
//! are per-case and end up in the suite report as errored outcomes.

/// Fatal harness setup error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HarnessError {
    /// A registered factory failed to produce its descriptor.
    DescriptorInstantiation {
        identity: String,
        source: DescriptorError,
    },
    /// A factory returned a descriptor with a different identity than it was registered under.
    IdentityMismatch { registered: String, declared: String },
    /// Two registrations share one identity.
    DuplicateIdentity(String),
    /// A descriptor declares fields the harness cannot use.
    InvalidDescriptor { identity: String, reason: String },
    /// A language name in the allow-list is not recognised.
    UnknownLanguage(String),
    /// The allow-list was configured but names no language.
    EmptyAllowList,
    /// Two generated cases ended up with the same identifier.
    DuplicateCase(String),
    /// Settings file could not be read or parsed.
    Settings(String),
}

impl std::fmt::Display for HarnessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DescriptorInstantiation { identity, source } => {
                write!(f, "Failed to instantiate descriptor '{}': {}", identity, source)
            }
            Self::IdentityMismatch { registered, declared } => {
                write!(
                    f,
                    "Descriptor registered as '{}' declares identity '{}'",
                    registered, declared
                )
            }
            Self::DuplicateIdentity(identity) => {
                write!(f, "Descriptor identity '{}' is registered more than once", identity)
            }
            Self::InvalidDescriptor { identity, reason } => {
                write!(f, "Invalid descriptor '{}': {}", identity, reason)
            }
            Self::UnknownLanguage(name) => write!(f, "Unknown language: '{}'", name),
            Self::EmptyAllowList => write!(f, "Language allow-list names no language"),
            Self::DuplicateCase(id) => write!(f, "Duplicate test case identifier '{}'", id),
            Self::Settings(msg) => write!(f, "Settings error: {}", msg),
        }
    }
}

impl std::error::Error for HarnessError {}

/// Error returned by a descriptor factory function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorError {
    pub message: String,
}

impl DescriptorError {
    pub fn new(message: impl Into<String>) -> Self {
        Self { message: message.into() }
    }
}

impl std::fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for DescriptorError {}

/// Execution engine failure for a single run.
#[derive(Debug)]
pub enum EngineError {
    /// The engine process could not be started.
    Spawn(std::io::Error),
    /// Writing the request or reading the result failed.
    Io(std::io::Error),
    /// The engine exited unsuccessfully.
    Exited { code: Option<i32>, stderr: String },
    /// The engine produced output that is not a valid result.
    Protocol(String),
    /// Engine-specific failure reported in-process.
    Failed(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(err) => write!(f, "Failed to start engine: {}", err),
            Self::Io(err) => write!(f, "Engine I/O error: {}", err),
            Self::Exited { code: Some(code), stderr } => {
                write!(f, "Engine exited with code {}: {}", code, stderr)
            }
            Self::Exited { code: None, stderr } => {
                write!(f, "Engine terminated by signal: {}", stderr)
            }
            Self::Protocol(msg) => write!(f, "Engine protocol error: {}", msg),
            Self::Failed(msg) => write!(f, "Engine failure: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Spawn(err) | Self::Io(err) => Some(err),
            _ => None,
        }
    }
}
