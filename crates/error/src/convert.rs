use crate::{ErrorCode, ErrorContext, OverlapError};

impl From<std::io::Error> for OverlapError {
    fn from(err: std::io::Error) -> Self {
        OverlapError::new(ErrorCode::Io, err.to_string())
    }
}

impl From<serde_json::Error> for OverlapError {
    fn from(err: serde_json::Error) -> Self {
        OverlapError::new(ErrorCode::SerializationFailed, err.to_string())
    }
}

impl From<serde_yaml::Error> for OverlapError {
    fn from(err: serde_yaml::Error) -> Self {
        let mut error = OverlapError::new(ErrorCode::InvalidYaml, err.to_string());
        if let Some(location) = err.location() {
            error = error
                .with_context(ErrorContext::Config {
                    file_path: None,
                    field: None,
                })
                .with_hint(format!(
                    "Check line {}, column {}",
                    location.line(),
                    location.column()
                ));
        }
        error
    }
}
