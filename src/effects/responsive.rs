use std::rc::Rc;

use super::PageEffects;
use crate::dom::{Dom, EventKind, ListenTarget, Propagation};

/// True when `previous` and `current` lie on different sides of `breakpoint`.
pub fn crossed_breakpoint(previous: f64, current: f64, breakpoint: f64) -> bool {
    (previous < breakpoint) != (current < breakpoint)
}

impl<D: Dom> PageEffects<D> {
    /// Re-runs the reveal setup once resizing settles on the other side of
    /// the desktop breakpoint. Touch-dependent hover bindings are not redone.
    pub fn init_responsive_reinit(self: &Rc<Self>) {
        let effects = Rc::clone(self);
        self.dom.listen(
            ListenTarget::Window,
            EventKind::Resize,
            Box::new(move |_| {
                effects.schedule_resize_check();
                Propagation::Default
            }),
        );
    }

    fn schedule_resize_check(self: &Rc<Self>) {
        let effects = Rc::clone(self);
        let timer = self.dom.set_timeout(
            self.config.resize_debounce_ms,
            Box::new(move || effects.handle_resize_settled()),
        );
        // dropping the previous handle cancels it
        *self.resize_timer.borrow_mut() = Some(timer);
    }

    fn handle_resize_settled(&self) {
        let current = self.dom.viewport_width();
        let previous = self.previous_width.replace(current);

        if crossed_breakpoint(previous, current, self.config.desktop_breakpoint_px) {
            self.logger.info(
                "breakpoint_crossed",
                serde_json::json!({ "previous_width": previous, "current_width": current }),
            );
            self.init_scroll_reveal();
        }
    }
}
