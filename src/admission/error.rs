use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionErrorKind {
    InvalidSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdmissionError {
    pub kind: AdmissionErrorKind,
    pub message: String,
}

impl AdmissionError {
    pub fn new(kind: AdmissionErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for AdmissionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AdmissionError {}

pub fn invalid_snapshot(message: impl Into<String>) -> AdmissionError {
    AdmissionError::new(AdmissionErrorKind::InvalidSnapshot, message)
}
