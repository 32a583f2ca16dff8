use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    InvalidDisplay(String),
    InvalidConfig(String),
    UnknownStimulus(String),
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::InvalidDisplay(msg) => write!(f, "invalid display: {msg}"),
            ModelError::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            ModelError::UnknownStimulus(msg) => write!(f, "unknown stimulus: {msg}"),
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = ModelError::InvalidDisplay("two targets".to_string());
        assert_eq!(e.to_string(), "invalid display: two targets");

        let e = ModelError::InvalidConfig("seed missing".to_string());
        assert_eq!(e.to_string(), "invalid config: seed missing");

        let e = ModelError::UnknownStimulus("color 'teal'".to_string());
        assert_eq!(e.to_string(), "unknown stimulus: color 'teal'");
    }
}
