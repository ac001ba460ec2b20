use js_sys::{Array, Function, Reflect};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use web_sys::Window;

use super::dom::js_message;
use crate::{
    error::SpeechError,
    speech::{Recognizer, RecognizerFactory, RecognizerSettings, SpeechCapability, SpeechEvent, SpeechEventSink},
};

const CONSTRUCTOR_NAMES: [&str; 2] = ["SpeechRecognition", "webkitSpeechRecognition"];
const HANDLER_NAMES: [&str; 3] = ["onresult", "onend", "onerror"];

/// Looks up the standard constructor first, then the prefixed one.
pub fn detect(window: &Window) -> SpeechCapability<WebSpeechFactory> {
    CONSTRUCTOR_NAMES
        .iter()
        .find_map(|name| {
            Reflect::get(window, &JsValue::from_str(name))
                .ok()
                .and_then(|value| value.dyn_into::<Function>().ok())
        })
        .map(|constructor| SpeechCapability::Supported(WebSpeechFactory { constructor }))
        .unwrap_or(SpeechCapability::Unsupported)
}

#[derive(Clone, Debug, PartialEq)]
pub struct WebSpeechFactory {
    constructor: Function,
}

impl RecognizerFactory for WebSpeechFactory {
    type Recognizer = WebRecognizer;

    fn create(
        &self,
        settings: &RecognizerSettings,
        events: SpeechEventSink,
    ) -> Result<WebRecognizer, SpeechError> {
        let recognition = Reflect::construct(&self.constructor, &Array::new())
            .map_err(|error| SpeechError::Construct(js_message(&error)))?;

        set_property(&recognition, "continuous", &JsValue::from_bool(settings.continuous))?;
        set_property(&recognition, "interimResults", &JsValue::from_bool(settings.interim_results))?;
        set_property(&recognition, "lang", &JsValue::from_str(&settings.lang))?;

        let on_result = {
            let events = events.clone();
            Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
                if let Some((transcript, confidence)) = top_alternative(&event) {
                    events(SpeechEvent::Recognized { transcript, confidence });
                }
            })
        };
        let on_end = {
            let events = events.clone();
            Closure::<dyn FnMut(JsValue)>::new(move |_event: JsValue| events(SpeechEvent::Ended))
        };
        let on_error = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            let code = Reflect::get(&event, &JsValue::from_str("error"))
                .ok()
                .and_then(|value| value.as_string())
                .unwrap_or_else(|| "unknown".to_string());
            events(SpeechEvent::Failed(code));
        });

        let handlers = [on_result, on_end, on_error];
        for (name, handler) in HANDLER_NAMES.iter().zip(&handlers) {
            set_property(&recognition, name, handler.as_ref())?;
        }

        Ok(WebRecognizer {
            recognition,
            _handlers: handlers,
        })
    }
}

/// A live `SpeechRecognition` object and the closures it calls back into.
pub struct WebRecognizer {
    recognition: JsValue,
    _handlers: [Closure<dyn FnMut(JsValue)>; 3],
}

impl Recognizer for WebRecognizer {
    fn start(&self) -> Result<(), SpeechError> {
        let start = Reflect::get(&self.recognition, &JsValue::from_str("start"))
            .ok()
            .and_then(|value| value.dyn_into::<Function>().ok())
            .ok_or_else(|| SpeechError::Start("recognizer has no start method".to_string()))?;

        start
            .call0(&self.recognition)
            .map(|_| ())
            .map_err(|error| SpeechError::Start(js_message(&error)))
    }
}

impl Drop for WebRecognizer {
    fn drop(&mut self) {
        // Detach before the closures are freed so late events hit nothing.
        for name in HANDLER_NAMES {
            let _ = Reflect::set(&self.recognition, &JsValue::from_str(name), &JsValue::NULL);
        }
    }
}

fn set_property(target: &JsValue, name: &str, value: &JsValue) -> Result<(), SpeechError> {
    Reflect::set(target, &JsValue::from_str(name), value)
        .map(|_| ())
        .map_err(|error| SpeechError::Construct(js_message(&error)))
}

/// `event.results[0][0]` as (transcript, confidence).
fn top_alternative(event: &JsValue) -> Option<(String, f64)> {
    let results = Reflect::get(event, &JsValue::from_str("results")).ok()?;
    let result = Reflect::get_u32(&results, 0).ok()?;
    let alternative = Reflect::get_u32(&result, 0).ok()?;
    if alternative.is_undefined() {
        return None;
    }

    let transcript = Reflect::get(&alternative, &JsValue::from_str("transcript"))
        .ok()?
        .as_string()?;
    let confidence = Reflect::get(&alternative, &JsValue::from_str("confidence"))
        .ok()
        .and_then(|value| value.as_f64())
        .unwrap_or(0.0);

    Some((transcript, confidence))
}
