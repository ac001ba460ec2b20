use std::rc::Rc;
use web_sys::MouseEvent;
use yew::prelude::*;

use super::{
    dom::BrowserDom,
    speech::{detect, WebRecognizer, WebSpeechFactory},
};
use crate::{
    config::EffectsConfig,
    dom::{Dom, SPEECH_DEMO_ROOT},
    logging::Logger,
    speech::{start_listening, RecognizerSettings, SpeechCapability, SpeechDemoState, SpeechEvent, SpeechEventSink},
};

const OUTPUT_SHOWN_STYLE: &str = "opacity: 1; transform: translateY(0);";
const OUTPUT_HIDDEN_STYLE: &str = "opacity: 0; transform: translateY(10px);";

impl Reducible for SpeechDemoState {
    type Action = SpeechEvent;

    fn reduce(self: Rc<Self>, action: SpeechEvent) -> Rc<Self> {
        Rc::new((*self).clone().apply(action))
    }
}

#[derive(Properties)]
pub struct SpeechDemoProps {
    pub capability: Rc<SpeechCapability<WebSpeechFactory>>,
    pub lang: AttrValue,
    pub logger: Logger,
}

impl PartialEq for SpeechDemoProps {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.capability, &other.capability) && self.lang == other.lang
    }
}

#[function_component(SpeechDemo)]
fn speech_demo(props: &SpeechDemoProps) -> Html {
    let state = use_reducer(SpeechDemoState::default);
    let recognizer = use_mut_ref(|| None::<WebRecognizer>);

    let onclick = {
        let dispatcher = state.dispatcher();
        let capability = Rc::clone(&props.capability);
        let lang = props.lang.clone();
        let logger = props.logger.clone();
        let recognizer = recognizer.clone();
        Callback::from(move |_: MouseEvent| {
            let dispatcher = dispatcher.clone();
            let events: SpeechEventSink = Rc::new(move |event| dispatcher.dispatch(event));
            let settings = RecognizerSettings::single_shot(&lang);
            // Replacing the previous recognizer detaches its handlers.
            *recognizer.borrow_mut() = start_listening(&*capability, &settings, events, &logger);
        })
    };

    let status = state.status_line();
    let action_style = status
        .as_ref()
        .and_then(|line| line.color)
        .map(|color| AttrValue::from(format!("color: {color};")));
    let output = state.output_text();
    let output_style = if output.is_some() {
        OUTPUT_SHOWN_STYLE
    } else {
        OUTPUT_HIDDEN_STYLE
    };

    html! {
        <div class="speech-demo">
            <button class="speech-demo-start" type="button" {onclick}>{"Start listening"}</button>
            <p id="action" style={action_style} aria-live="polite">
                if let Some(line) = status {
                    <small>{line.text}</small>
                }
            </p>
            <div
                id="output"
                class={classes!("speech-output", output.is_none().then_some("hide"))}
                style={output_style}
            >
                {output.unwrap_or_default()}
            </div>
        </div>
    }
}

/// Renders the demo into `#speech-demo`; pages without it skip the demo.
pub fn mount(dom: &BrowserDom, config: &EffectsConfig, logger: &Logger) {
    let root = match dom.query_selector(SPEECH_DEMO_ROOT) {
        Ok(Some(root)) => root,
        Ok(None) => {
            logger.debug("speech_demo_skipped", serde_json::json!({ "reason": "no mount point" }));
            return;
        }
        Err(error) => {
            logger.warn("speech_demo_skipped", serde_json::json!({ "message": error.to_string() }));
            return;
        }
    };

    let capability = detect(dom.window());
    logger.info(
        "speech_capability",
        serde_json::json!({ "supported": capability.is_supported() }),
    );

    let props = SpeechDemoProps {
        capability: Rc::new(capability),
        lang: AttrValue::from(config.speech_lang.clone()),
        logger: logger.clone(),
    };
    yew::Renderer::<SpeechDemo>::with_root_and_props(root, props).render();
}
