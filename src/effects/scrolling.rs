use std::rc::Rc;

use super::PageEffects;
use crate::{
    dom::{Dom, EventKind, ListenTarget, Propagation, IN_PAGE_ANCHORS, PORTFOLIO_GRID, SCROLL_INDICATOR},
    logging::Logger,
};

impl<D: Dom> PageEffects<D> {
    pub fn init_smooth_scrolling(&self) {
        if let Ok(Some(indicator)) = self.dom.query_selector(SCROLL_INDICATOR) {
            let dom = Rc::clone(&self.dom);
            self.dom.listen(
                ListenTarget::Element(&indicator),
                EventKind::Click,
                Box::new(move |_| {
                    if let Ok(Some(grid)) = dom.query_selector(PORTFOLIO_GRID) {
                        dom.scroll_into_view(&grid);
                    }
                    Propagation::Default
                }),
            );
        }

        for anchor in self.dom.query_selector_all(IN_PAGE_ANCHORS) {
            let dom = Rc::clone(&self.dom);
            let logger = self.logger.clone();
            let source = anchor.clone();
            self.dom.listen(
                ListenTarget::Element(&anchor),
                EventKind::Click,
                Box::new(move |_| {
                    let destination = dom
                        .attribute(&source, "href")
                        .and_then(|href| resolve_anchor(&*dom, &href, &logger));
                    if let Some(destination) = destination {
                        dom.scroll_into_view(&destination);
                    }
                    Propagation::PreventDefault
                }),
            );
        }
    }
}

/// Unresolvable or malformed targets (a bare `#`) leave the page where it is.
fn resolve_anchor<D: Dom>(dom: &D, href: &str, logger: &Logger) -> Option<D::Element> {
    match dom.query_selector(href) {
        Ok(target) => target,
        Err(error) => {
            logger.debug(
                "anchor_target_invalid",
                serde_json::json!({ "href": href, "message": error.to_string() }),
            );
            None
        }
    }
}
