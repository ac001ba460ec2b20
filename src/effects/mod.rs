//! `PageEffects`: every behavior group wired against a [`Dom`].

mod cards;
mod parallax;
mod responsive;
mod reveal;
mod scrolling;
mod video;

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use crate::{config::EffectsConfig, dom::Dom, logging::Logger};

pub use cards::RippleGeometry;
pub use parallax::parallax_transform;
pub use responsive::crossed_breakpoint;

/// The page's single effects component. Handlers registered by [`init`]
/// hold an `Rc` to it, so it lives as long as the page does.
///
/// [`init`]: PageEffects::init
pub struct PageEffects<D: Dom> {
    dom: Rc<D>,
    config: EffectsConfig,
    logger: Logger,
    parallax_ticking: Cell<bool>,
    resize_timer: RefCell<Option<D::Timer>>,
    previous_width: Cell<f64>,
}

impl<D: Dom> PageEffects<D> {
    pub fn new(dom: Rc<D>, config: EffectsConfig, logger: Logger) -> Rc<Self> {
        let previous_width = dom.viewport_width();
        Rc::new(Self {
            dom,
            config,
            logger,
            parallax_ticking: Cell::new(false),
            resize_timer: RefCell::new(None),
            previous_width: Cell::new(previous_width),
        })
    }

    pub fn config(&self) -> &EffectsConfig {
        &self.config
    }

    pub fn init(self: &Rc<Self>) {
        self.install_ripple_keyframes();
        let animated = self.init_scroll_reveal();
        let cards = self.init_project_cards();
        self.init_smooth_scrolling();
        self.init_parallax();
        let has_video = self.init_video_background();
        self.init_responsive_reinit();

        self.logger.info(
            "page_effects_initialized",
            serde_json::json!({
                "viewport_width": self.dom.viewport_width(),
                "animated_elements": animated,
                "project_cards": cards,
                "hero_video": has_video,
            }),
        );
    }
}
