use std::rc::Rc;

use super::PageEffects;
use crate::{
    config::css_number,
    dom::{Dom, Intersection, ObserverOptions, ANIMATED_ELEMENTS},
};

const REVEALED_OPACITY: &str = "1";
const REVEALED_TRANSFORM: &str = "translateY(0)";

impl<D: Dom> PageEffects<D> {
    /// Hides every card and social link, then reveals each one the first time
    /// it scrolls into view. Safe to call again: elements are re-hidden and
    /// observed with the threshold for the current viewport width.
    pub fn init_scroll_reveal(&self) -> usize {
        let viewport_width = self.dom.viewport_width();
        let options = ObserverOptions {
            threshold: self.config.reveal_threshold(viewport_width),
            root_margin: Some(self.config.reveal_root_margin()),
        };
        let hidden_transform = format!("translateY({}px)", css_number(self.config.reveal_offset_px));
        let transition = format!(
            "opacity {ms}ms ease, transform {ms}ms ease",
            ms = self.config.reveal_transition_ms
        );

        let elements = self.dom.query_selector_all(ANIMATED_ELEMENTS);
        for element in &elements {
            let _ = self.dom.set_style(element, "opacity", "0");
            let _ = self.dom.set_style(element, "transform", &hidden_transform);
            let _ = self.dom.set_style(element, "transition", &transition);
        }

        let dom = Rc::clone(&self.dom);
        let on_intersect = Box::new(move |entries: Vec<Intersection<D::Element>>| {
            for entry in entries.iter().filter(|entry| entry.is_intersecting) {
                reveal(&*dom, &entry.target);
            }
        });

        if let Err(error) = self.dom.observe_intersections(&elements, &options, on_intersect) {
            self.logger.error(
                "scroll_reveal_observer_failed",
                serde_json::json!({ "message": error.to_string() }),
            );
            for element in &elements {
                reveal(&*self.dom, element);
            }
        }

        self.logger.debug(
            "scroll_reveal_initialized",
            serde_json::json!({
                "elements": elements.len(),
                "threshold": options.threshold,
                "viewport_width": viewport_width,
            }),
        );
        elements.len()
    }
}

fn reveal<D: Dom>(dom: &D, element: &D::Element) {
    let _ = dom.set_style(element, "opacity", REVEALED_OPACITY);
    let _ = dom.set_style(element, "transform", REVEALED_TRANSFORM);
}
