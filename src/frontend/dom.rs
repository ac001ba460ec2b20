use gloo_events::{EventListener, EventListenerOptions};
use gloo_timers::callback::Timeout;
use js_sys::{Array, Reflect};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    window, Document, Element, EventTarget, HtmlElement, HtmlMediaElement, IntersectionObserver,
    IntersectionObserverEntry, IntersectionObserverInit, MouseEvent, ScrollBehavior,
    ScrollIntoViewOptions, ScrollLogicalPosition, Window,
};

use crate::{
    dom::{
        Dom, DomEvent, EventHandler, EventKind, Intersection, IntersectionCallback, ListenTarget,
        ObserverOptions, PlaybackCallback, Point, Propagation, Rect, Timer,
    },
    error::DomError,
};

const FALLBACK_VIEWPORT_WIDTH: f64 = 1280.0;

impl Timer for Timeout {
    fn detach(self) {
        let _ = self.forget();
    }
}

pub(crate) fn js_message(value: &JsValue) -> String {
    value
        .as_string()
        .or_else(|| value.dyn_ref::<js_sys::Error>().map(|error| String::from(error.message())))
        .unwrap_or_else(|| format!("{value:?}"))
}

fn js_error(value: JsValue) -> DomError {
    DomError::Js(js_message(&value))
}

/// [`Dom`] backed by the live page.
pub struct BrowserDom {
    window: Window,
    document: Document,
}

impl BrowserDom {
    pub fn from_window() -> Result<Self, DomError> {
        let window = window().ok_or(DomError::MissingWindow)?;
        let document = window.document().ok_or(DomError::MissingDocument)?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn is_loading(&self) -> bool {
        self.document.ready_state() == "loading"
    }

    fn html_element<'a>(&self, element: &'a Element) -> Result<&'a HtmlElement, DomError> {
        element.dyn_ref::<HtmlElement>().ok_or(DomError::NotHtmlElement)
    }
}

impl Dom for BrowserDom {
    type Element = Element;
    type Timer = Timeout;

    fn query_selector(&self, selector: &str) -> Result<Option<Element>, DomError> {
        self.document
            .query_selector(selector)
            .map_err(|_| DomError::InvalidSelector(selector.to_string()))
    }

    fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        let Ok(nodes) = self.document.query_selector_all(selector) else {
            return Vec::new();
        };

        (0..nodes.length())
            .filter_map(|index| nodes.get(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn viewport_width(&self) -> f64 {
        self.window
            .inner_width()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(FALLBACK_VIEWPORT_WIDTH)
    }

    fn scroll_y(&self) -> f64 {
        self.window.scroll_y().unwrap_or(0.0)
    }

    fn supports_touch(&self) -> bool {
        let has_touch_start =
            Reflect::has(&self.window, &JsValue::from_str("ontouchstart")).unwrap_or(false);
        let max_touch_points = Reflect::get(&self.window.navigator(), &JsValue::from_str("maxTouchPoints"))
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0);

        has_touch_start || max_touch_points > 0.0
    }

    fn set_style(&self, element: &Element, property: &str, value: &str) -> Result<(), DomError> {
        self.html_element(element)?
            .style()
            .set_property(property, value)
            .map_err(js_error)
    }

    fn attribute(&self, element: &Element, name: &str) -> Option<String> {
        element.get_attribute(name)
    }

    fn text_content(&self, element: &Element) -> Option<String> {
        element.text_content()
    }

    fn bounding_rect(&self, element: &Element) -> Rect {
        let rect = element.get_bounding_client_rect();
        Rect {
            left: rect.left(),
            top: rect.top(),
            width: rect.width(),
            height: rect.height(),
        }
    }

    fn create_element(&self, tag: &str) -> Result<Element, DomError> {
        self.document.create_element(tag).map_err(js_error)
    }

    fn append_child(&self, parent: &Element, child: &Element) -> Result<(), DomError> {
        parent.append_child(child).map(|_| ()).map_err(js_error)
    }

    fn remove(&self, element: &Element) {
        element.remove();
    }

    fn append_style_sheet(&self, css: &str) -> Result<(), DomError> {
        let head = self.document.head().ok_or(DomError::MissingHead)?;
        let style = self.document.create_element("style").map_err(js_error)?;
        style.set_text_content(Some(css));
        head.append_child(&style).map(|_| ()).map_err(js_error)
    }

    fn scroll_into_view(&self, element: &Element) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        options.set_block(ScrollLogicalPosition::Start);
        element.scroll_into_view_with_scroll_into_view_options(&options);
    }

    fn listen(&self, target: ListenTarget<'_, Element>, kind: EventKind, mut handler: EventHandler) {
        let event_target: &EventTarget = match target {
            ListenTarget::Window => self.window.as_ref(),
            ListenTarget::Element(element) => element.as_ref(),
        };
        let options = if kind.may_prevent_default() {
            EventListenerOptions::enable_prevent_default()
        } else {
            EventListenerOptions::default()
        };

        EventListener::new_with_options(event_target, kind.as_str(), options, move |event| {
            let pointer = event.dyn_ref::<MouseEvent>().map(|mouse| Point {
                x: f64::from(mouse.client_x()),
                y: f64::from(mouse.client_y()),
            });
            if handler(&DomEvent { kind, pointer }) == Propagation::PreventDefault {
                event.prevent_default();
            }
        })
        .forget();
    }

    fn observe_intersections(
        &self,
        targets: &[Element],
        options: &ObserverOptions,
        mut callback: IntersectionCallback<Element>,
    ) -> Result<(), DomError> {
        let on_entries = Closure::<dyn FnMut(Array, IntersectionObserver)>::new(
            move |entries: Array, _observer: IntersectionObserver| {
                let intersections = entries
                    .iter()
                    .filter_map(|entry| entry.dyn_into::<IntersectionObserverEntry>().ok())
                    .map(|entry| Intersection {
                        target: entry.target(),
                        is_intersecting: entry.is_intersecting(),
                        ratio: entry.intersection_ratio(),
                    })
                    .collect();
                callback(intersections);
            },
        );

        let init = IntersectionObserverInit::new();
        init.set_threshold(&JsValue::from_f64(options.threshold));
        if let Some(root_margin) = options.root_margin.as_deref() {
            init.set_root_margin(root_margin);
        }

        let observer = IntersectionObserver::new_with_options(on_entries.as_ref().unchecked_ref(), &init)
            .map_err(js_error)?;
        for target in targets {
            observer.observe(target);
        }
        on_entries.forget();
        Ok(())
    }

    fn request_animation_frame(&self, callback: Box<dyn FnOnce()>) -> Result<(), DomError> {
        let frame = Closure::once_into_js(move || callback());
        self.window
            .request_animation_frame(frame.unchecked_ref())
            .map(|_| ())
            .map_err(js_error)
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Timeout {
        Timeout::new(delay_ms, callback)
    }

    fn play(&self, media: &Element, on_settled: PlaybackCallback) {
        let Some(media) = media.dyn_ref::<HtmlMediaElement>() else {
            on_settled(Err(DomError::NotHtmlElement));
            return;
        };

        match media.play() {
            Ok(promise) => spawn_local(async move {
                let outcome = JsFuture::from(promise).await.map(|_| ()).map_err(js_error);
                on_settled(outcome);
            }),
            Err(error) => on_settled(Err(js_error(error))),
        }
    }

    fn pause(&self, media: &Element) -> Result<(), DomError> {
        media
            .dyn_ref::<HtmlMediaElement>()
            .ok_or(DomError::NotHtmlElement)?
            .pause()
            .map_err(js_error)
    }
}
