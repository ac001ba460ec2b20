use std::rc::Rc;

use super::PageEffects;
use crate::{
    config::css_number,
    dom::{Dom, EventKind, ListenTarget, Propagation, HERO_VIDEO},
};

/// Keeps the hero centered horizontally while shifting it by `rate × scroll`.
pub fn parallax_transform(scroll_y: f64, rate: f64) -> String {
    format!(
        "translateX(-50%) translateY(calc(-50% + {}px))",
        css_number(scroll_y * rate)
    )
}

impl<D: Dom> PageEffects<D> {
    pub fn init_parallax(self: &Rc<Self>) {
        let effects = Rc::clone(self);
        self.dom.listen(
            ListenTarget::Window,
            EventKind::Scroll,
            Box::new(move |_| {
                effects.request_parallax_tick();
                Propagation::Default
            }),
        );
    }

    /// At most one frame is pending; scrolls before it runs are coalesced.
    fn request_parallax_tick(self: &Rc<Self>) {
        if self.parallax_ticking.replace(true) {
            return;
        }

        let effects = Rc::clone(self);
        if let Err(error) = self
            .dom
            .request_animation_frame(Box::new(move || effects.update_parallax()))
        {
            self.parallax_ticking.set(false);
            self.logger.warn(
                "parallax_frame_failed",
                serde_json::json!({ "message": error.to_string() }),
            );
        }
    }

    fn update_parallax(&self) {
        if let Ok(Some(hero)) = self.dom.query_selector(HERO_VIDEO) {
            let transform = parallax_transform(self.dom.scroll_y(), self.config.parallax_rate);
            let _ = self.dom.set_style(&hero, "transform", &transform);
        }
        self.parallax_ticking.set(false);
    }
}
