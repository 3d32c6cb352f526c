use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum CapabilityError {
    /// The platform camera-characteristics API failed or returned garbage.
    HardwareQuery(String),
    /// A stored preference no longer matches any valid option.
    InvalidPersistedValue { key: String, value: String },
    /// Every source produced zero options for a required field.
    EmptyCapabilitySet(String),
    /// A caller asked for a value that is not currently offered.
    UnsupportedSelection(String),
    PreferenceStore(String),
    Configuration(String),
    Io(String),
}

impl fmt::Display for CapabilityError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CapabilityError::HardwareQuery(msg) => write!(f, "Hardware query failed: {}", msg),
            CapabilityError::InvalidPersistedValue { key, value } => {
                write!(f, "Invalid persisted value for {}: {}", key, value)
            }
            CapabilityError::EmptyCapabilitySet(msg) => write!(f, "Empty capability set: {}", msg),
            CapabilityError::UnsupportedSelection(msg) => {
                write!(f, "Unsupported selection: {}", msg)
            }
            CapabilityError::PreferenceStore(msg) => write!(f, "Preference store error: {}", msg),
            CapabilityError::Configuration(msg) => write!(f, "Configuration error: {}", msg),
            CapabilityError::Io(msg) => write!(f, "IO error: {}", msg),
        }
    }
}

impl std::error::Error for CapabilityError {}

impl From<std::io::Error> for CapabilityError {
    fn from(err: std::io::Error) -> Self {
        CapabilityError::Io(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CapabilityError>;
