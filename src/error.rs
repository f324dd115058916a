use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("Not logged in. Run: fintrack login --name <name> --email <email>")]
    NotLoggedIn,

    #[error("{kind} '{name}' not found")]
    NotFound { kind: &'static str, name: String },

    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: &'static str, name: String },
}

impl TrackerError {
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        TrackerError::NotFound {
            kind,
            name: name.into(),
        }
    }

    pub fn already_exists(kind: &'static str, name: impl Into<String>) -> Self {
        TrackerError::AlreadyExists {
            kind,
            name: name.into(),
        }
    }
}
