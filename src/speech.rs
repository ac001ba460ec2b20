//! Speech-recognition demo: capability detection, the recognizer seam and the
//! status/output state machine the widget renders.

use std::rc::Rc;

use crate::{error::SpeechError, logging::Logger};

pub const UNSUPPORTED_MESSAGE: &str = "Speech recognition not supported in this browser";
pub const LISTENING_MESSAGE: &str = "Listening... please speak";
pub const STOPPED_MESSAGE: &str = "Stopped listening";
const LISTENING_COLOR: &str = "#667eea";
const STOPPED_COLOR: &str = "#4a5568";
const ERROR_COLOR: &str = "#e53e3e";
const GREETING_WORDS: [&str; 2] = ["hello", "hi"];

/// Whether the platform exposes a recognizer, resolved once at startup.
#[derive(Clone, Debug, PartialEq)]
pub enum SpeechCapability<F> {
    Supported(F),
    Unsupported,
}

impl<F> SpeechCapability<F> {
    pub fn is_supported(&self) -> bool {
        matches!(self, Self::Supported(_))
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct RecognizerSettings {
    pub lang: String,
    pub continuous: bool,
    pub interim_results: bool,
}

impl RecognizerSettings {
    /// One utterance, final results only.
    pub fn single_shot(lang: &str) -> Self {
        Self {
            lang: lang.to_string(),
            continuous: false,
            interim_results: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SpeechEvent {
    Unsupported,
    Started,
    Recognized { transcript: String, confidence: f64 },
    Ended,
    Failed(String),
}

pub type SpeechEventSink = Rc<dyn Fn(SpeechEvent)>;

pub trait RecognizerFactory {
    type Recognizer: Recognizer;

    /// Builds a recognizer that reports result, end and error events to `events`.
    fn create(
        &self,
        settings: &RecognizerSettings,
        events: SpeechEventSink,
    ) -> Result<Self::Recognizer, SpeechError>;
}

pub trait Recognizer {
    fn start(&self) -> Result<(), SpeechError>;
}

/// Entry point of the demo. Returns the live recognizer, which the caller
/// must keep alive until recognition ends.
pub fn start_listening<F: RecognizerFactory>(
    capability: &SpeechCapability<F>,
    settings: &RecognizerSettings,
    events: SpeechEventSink,
    logger: &Logger,
) -> Option<F::Recognizer> {
    let SpeechCapability::Supported(factory) = capability else {
        logger.info("speech_unsupported", serde_json::json!({}));
        events(SpeechEvent::Unsupported);
        return None;
    };

    let started = factory
        .create(settings, Rc::clone(&events))
        .and_then(|recognizer| recognizer.start().map(|()| recognizer));

    match started {
        Ok(recognizer) => {
            logger.debug("speech_listening", serde_json::json!({ "lang": settings.lang }));
            events(SpeechEvent::Started);
            Some(recognizer)
        }
        Err(error) => {
            logger.error("speech_start_failed", serde_json::json!({ "message": error.to_string() }));
            events(SpeechEvent::Failed(error.code().to_string()));
            None
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum SpeechStatus {
    #[default]
    Idle,
    Unsupported,
    Listening,
    Stopped,
    Error(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transcript {
    /// Lower-cased top alternative.
    pub text: String,
    pub confidence: f64,
}

impl Transcript {
    pub fn new(raw: &str, confidence: f64) -> Self {
        Self {
            text: raw.to_lowercase(),
            confidence,
        }
    }

    /// Plain substring match, so "this" counts as containing "hi".
    pub fn is_greeting(&self) -> bool {
        GREETING_WORDS.iter().any(|word| self.text.contains(word))
    }

    pub fn response(&self) -> String {
        let confidence = format!("(confidence: {:.2})", self.confidence);
        if self.is_greeting() {
            format!("Hello! You said: \"{}\" {confidence}", self.text)
        } else {
            format!("You said: \"{}\" - Try saying \"hello\"! {confidence}", self.text)
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatusLine {
    pub text: String,
    pub color: Option<&'static str>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpeechDemoState {
    pub status: SpeechStatus,
    pub output: Option<Transcript>,
}

impl SpeechDemoState {
    pub fn apply(mut self, event: SpeechEvent) -> Self {
        match event {
            SpeechEvent::Unsupported => self.status = SpeechStatus::Unsupported,
            SpeechEvent::Started => self.status = SpeechStatus::Listening,
            SpeechEvent::Recognized { transcript, confidence } => {
                self.output = Some(Transcript::new(&transcript, confidence));
            }
            // Browsers fire `end` right after `error`; keep the error visible.
            SpeechEvent::Ended => {
                if !matches!(self.status, SpeechStatus::Error(_) | SpeechStatus::Unsupported) {
                    self.status = SpeechStatus::Stopped;
                }
            }
            SpeechEvent::Failed(code) => self.status = SpeechStatus::Error(code),
        }
        self
    }

    pub fn status_line(&self) -> Option<StatusLine> {
        let (text, color) = match &self.status {
            SpeechStatus::Idle => return None,
            SpeechStatus::Unsupported => (UNSUPPORTED_MESSAGE.to_string(), None),
            SpeechStatus::Listening => (LISTENING_MESSAGE.to_string(), Some(LISTENING_COLOR)),
            SpeechStatus::Stopped => (STOPPED_MESSAGE.to_string(), Some(STOPPED_COLOR)),
            SpeechStatus::Error(code) => (format!("Error: {code}"), Some(ERROR_COLOR)),
        };
        Some(StatusLine { text, color })
    }

    pub fn output_text(&self) -> Option<String> {
        self.output.as_ref().map(Transcript::response)
    }
}
