use std::rc::Rc;

use super::PageEffects;
use crate::{
    dom::{Dom, EventKind, Intersection, ListenTarget, ObserverOptions, Propagation, HERO_VIDEO},
    logging::Logger,
};

impl<D: Dom> PageEffects<D> {
    /// Hides the hero on load failure, autoplays when it can, and pauses it
    /// while it is off screen. Returns whether a hero video was found.
    pub fn init_video_background(&self) -> bool {
        let Ok(Some(video)) = self.dom.query_selector(HERO_VIDEO) else {
            return false;
        };

        let logger = self.logger.clone();
        self.dom.listen(
            ListenTarget::Element(&video),
            EventKind::LoadedMetadata,
            Box::new(move |_| {
                logger.info("video_metadata_loaded", serde_json::json!({}));
                Propagation::Default
            }),
        );

        let dom = Rc::clone(&self.dom);
        let logger = self.logger.clone();
        let failed = video.clone();
        self.dom.listen(
            ListenTarget::Element(&video),
            EventKind::Error,
            Box::new(move |_| {
                logger.error("video_load_failed", serde_json::json!({ "fallback": "hidden" }));
                let _ = dom.set_style(&failed, "display", "none");
                Propagation::Default
            }),
        );

        let dom = Rc::clone(&self.dom);
        let logger = self.logger.clone();
        let playable = video.clone();
        self.dom.listen(
            ListenTarget::Element(&video),
            EventKind::CanPlayThrough,
            Box::new(move |_| {
                play_and_log(&*dom, &playable, &logger, "autoplay");
                Propagation::Default
            }),
        );

        let dom = Rc::clone(&self.dom);
        let logger = self.logger.clone();
        let options = ObserverOptions {
            threshold: self.config.video_visibility_threshold,
            root_margin: None,
        };
        let on_visibility = Box::new(move |entries: Vec<Intersection<D::Element>>| {
            for entry in entries {
                if entry.is_intersecting {
                    play_and_log(&*dom, &entry.target, &logger, "visible");
                } else if let Err(error) = dom.pause(&entry.target) {
                    logger.debug("video_pause_failed", serde_json::json!({ "message": error.to_string() }));
                }
            }
        });
        if let Err(error) = self
            .dom
            .observe_intersections(std::slice::from_ref(&video), &options, on_visibility)
        {
            self.logger.warn(
                "video_visibility_observer_failed",
                serde_json::json!({ "message": error.to_string() }),
            );
        }

        true
    }
}

/// Rejected playback (autoplay policy, interrupted load) is expected and
/// never reaches the user: the outcome is logged and dropped here.
fn play_and_log<D: Dom>(dom: &D, media: &D::Element, logger: &Logger, trigger: &'static str) {
    let logger = logger.clone();
    dom.play(
        media,
        Box::new(move |outcome| {
            if let Err(error) = outcome {
                logger.info(
                    "video_play_rejected",
                    serde_json::json!({ "trigger": trigger, "message": error.to_string() }),
                );
            }
        }),
    );
}
