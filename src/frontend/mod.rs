mod demo;
mod dom;
mod speech;

use gloo_events::EventListener;
use std::rc::Rc;

use crate::{
    config::{EffectsConfig, DEFAULT_LOG_LEVEL},
    effects::PageEffects,
    logging::Logger,
};

pub use dom::BrowserDom;

/// Wires every effect once the document is parsed.
pub fn run() {
    let dom = match BrowserDom::from_window() {
        Ok(dom) => Rc::new(dom),
        Err(error) => {
            Logger::new(DEFAULT_LOG_LEVEL).error(
                "page_effects_unavailable",
                serde_json::json!({ "message": error.to_string() }),
            );
            return;
        }
    };

    if dom.is_loading() {
        let document = dom.document().clone();
        EventListener::once(&document, "DOMContentLoaded", move |_| start(dom)).forget();
    } else {
        start(dom);
    }
}

fn start(dom: Rc<BrowserDom>) {
    let (config, config_error) = match EffectsConfig::from_dom(&*dom) {
        Ok(config) => (config, None),
        Err(error) => (EffectsConfig::default(), Some(error)),
    };
    let logger = Logger::new(config.log_level);

    if let Some(error) = config_error {
        logger.warn(
            "config_invalid",
            serde_json::json!({ "message": error.to_string(), "fallback": "defaults" }),
        );
    }

    PageEffects::new(Rc::clone(&dom), config.clone(), logger.clone()).init();
    demo::mount(&dom, &config, &logger);
}
