use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    #[error("no global window available")]
    MissingWindow,
    #[error("window has no document")]
    MissingDocument,
    #[error("document has no head element")]
    MissingHead,
    #[error("element is not an HTML element")]
    NotHtmlElement,
    #[error("invalid selector `{0}`")]
    InvalidSelector(String),
    #[error("javascript error: {0}")]
    Js(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    #[error("could not construct recognizer: {0}")]
    Construct(String),
    #[error("could not start recognizer: {0}")]
    Start(String),
}

impl SpeechError {
    /// Code shown in the status line when the recognizer never got going.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Construct(_) | Self::Start(_) => "start-failed",
        }
    }
}
