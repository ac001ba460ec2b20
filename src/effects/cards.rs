use std::rc::Rc;

use super::PageEffects;
use crate::{
    config::css_number,
    dom::{Dom, EventKind, ListenTarget, Point, Propagation, Rect, Timer, PROJECT_CARD},
    error::DomError,
};

const RIPPLE_KEYFRAMES: &str = "@keyframes ripple {
    to {
        transform: scale(4);
        opacity: 0;
    }
}";

const RIPPLE_BASE_STYLES: [(&str, &str); 5] = [
    ("position", "absolute"),
    ("border-radius", "50%"),
    ("background", "rgba(255, 255, 255, 0.6)"),
    ("transform", "scale(0)"),
    ("pointer-events", "none"),
];

const RESTING_TRANSFORM: &str = "translateY(0) scale(1)";

/// Square ripple box centered on the click, relative to the card.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RippleGeometry {
    pub size: f64,
    pub left: f64,
    pub top: f64,
}

impl RippleGeometry {
    pub fn centered_on(card: Rect, click: Point) -> Self {
        let size = card.width.max(card.height);
        Self {
            size,
            left: click.x - card.left - size / 2.0,
            top: click.y - card.top - size / 2.0,
        }
    }
}

impl<D: Dom> PageEffects<D> {
    pub(crate) fn install_ripple_keyframes(&self) {
        if let Err(error) = self.dom.append_style_sheet(RIPPLE_KEYFRAMES) {
            self.logger.warn(
                "ripple_keyframes_failed",
                serde_json::json!({ "message": error.to_string() }),
            );
        }
    }

    /// Hover lift on pointer devices and a click ripple everywhere.
    pub fn init_project_cards(&self) -> usize {
        let cards = self.dom.query_selector_all(PROJECT_CARD);
        let hover_enabled = !self.dom.supports_touch();
        let lifted_transform = format!(
            "translateY(-{}px) scale({})",
            css_number(self.config.hover_lift_px),
            css_number(self.config.hover_scale)
        );

        for card in &cards {
            if hover_enabled {
                let dom = Rc::clone(&self.dom);
                let target = card.clone();
                let lifted = lifted_transform.clone();
                self.dom.listen(
                    ListenTarget::Element(card),
                    EventKind::MouseEnter,
                    Box::new(move |_| {
                        let _ = dom.set_style(&target, "transform", &lifted);
                        Propagation::Default
                    }),
                );

                let dom = Rc::clone(&self.dom);
                let target = card.clone();
                self.dom.listen(
                    ListenTarget::Element(card),
                    EventKind::MouseLeave,
                    Box::new(move |_| {
                        let _ = dom.set_style(&target, "transform", RESTING_TRANSFORM);
                        Propagation::Default
                    }),
                );
            }

            let dom = Rc::clone(&self.dom);
            let logger = self.logger.clone();
            let target = card.clone();
            let duration_ms = self.config.ripple_duration_ms;
            self.dom.listen(
                ListenTarget::Element(card),
                EventKind::Click,
                Box::new(move |event| {
                    if let Some(click) = event.pointer {
                        if let Err(error) = spawn_ripple(&dom, &target, click, duration_ms) {
                            logger.warn("ripple_failed", serde_json::json!({ "message": error.to_string() }));
                        }
                    }
                    Propagation::Default
                }),
            );
        }

        self.logger.debug(
            "project_cards_initialized",
            serde_json::json!({ "cards": cards.len(), "hover": hover_enabled }),
        );
        cards.len()
    }
}

fn spawn_ripple<D: Dom>(
    dom: &Rc<D>,
    card: &D::Element,
    click: Point,
    duration_ms: u32,
) -> Result<D::Element, DomError> {
    let geometry = RippleGeometry::centered_on(dom.bounding_rect(card), click);
    let ripple = dom.create_element("div")?;

    for (property, value) in RIPPLE_BASE_STYLES {
        dom.set_style(&ripple, property, value)?;
    }
    dom.set_style(&ripple, "animation", &format!("ripple {duration_ms}ms linear"))?;
    let size = format!("{}px", css_number(geometry.size));
    dom.set_style(&ripple, "width", &size)?;
    dom.set_style(&ripple, "height", &size)?;
    dom.set_style(&ripple, "left", &format!("{}px", css_number(geometry.left)))?;
    dom.set_style(&ripple, "top", &format!("{}px", css_number(geometry.top)))?;
    dom.append_child(card, &ripple)?;

    let removal_dom = Rc::clone(dom);
    let expired = ripple.clone();
    dom.set_timeout(duration_ms, Box::new(move || removal_dom.remove(&expired)))
        .detach();

    Ok(ripple)
}
