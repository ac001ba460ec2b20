//! The slice of the browser every behavior group is written against.
//!
//! `frontend::BrowserDom` implements it with `web-sys`; tests use an in-memory
//! fake that synthesizes events, intersections, timers and frames.

use crate::error::DomError;

pub const PROJECT_CARD: &str = ".project-card";
pub const ANIMATED_ELEMENTS: &str = ".project-card, .social-link";
pub const SCROLL_INDICATOR: &str = ".scroll-indicator";
pub const PORTFOLIO_GRID: &str = ".portfolio-grid";
pub const HERO_VIDEO: &str = ".hero-video";
pub const IN_PAGE_ANCHORS: &str = "a[href^=\"#\"]";
pub const CONFIG_SCRIPT: &str = "#page-effects-config";
pub const SPEECH_DEMO_ROOT: &str = "#speech-demo";

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    MouseEnter,
    MouseLeave,
    Scroll,
    Resize,
    LoadedMetadata,
    Error,
    CanPlayThrough,
}

impl EventKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Click => "click",
            Self::MouseEnter => "mouseenter",
            Self::MouseLeave => "mouseleave",
            Self::Scroll => "scroll",
            Self::Resize => "resize",
            Self::LoadedMetadata => "loadedmetadata",
            Self::Error => "error",
            Self::CanPlayThrough => "canplaythrough",
        }
    }

    /// Passive listeners cannot cancel the default action; only clicks need to.
    pub fn may_prevent_default(self) -> bool {
        matches!(self, Self::Click)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DomEvent {
    pub kind: EventKind,
    /// Viewport coordinates for mouse events.
    pub pointer: Option<Point>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Propagation {
    Default,
    PreventDefault,
}

pub enum ListenTarget<'a, E> {
    Window,
    Element(&'a E),
}

#[derive(Clone, Debug, PartialEq)]
pub struct ObserverOptions {
    pub threshold: f64,
    pub root_margin: Option<String>,
}

#[derive(Clone, Debug)]
pub struct Intersection<E> {
    pub target: E,
    pub is_intersecting: bool,
    pub ratio: f64,
}

pub type EventHandler = Box<dyn FnMut(&DomEvent) -> Propagation>;
pub type IntersectionCallback<E> = Box<dyn FnMut(Vec<Intersection<E>>)>;
pub type PlaybackCallback = Box<dyn FnOnce(Result<(), DomError>)>;

/// A pending timeout. Dropping it cancels the callback; `detach` lets it fire
/// without keeping the handle.
pub trait Timer: 'static {
    fn detach(self);
}

pub trait Dom: 'static {
    type Element: Clone + 'static;
    type Timer: Timer;

    /// `Ok(None)` when nothing matches; `Err` when the selector is invalid.
    fn query_selector(&self, selector: &str) -> Result<Option<Self::Element>, DomError>;
    fn query_selector_all(&self, selector: &str) -> Vec<Self::Element>;

    fn viewport_width(&self) -> f64;
    fn scroll_y(&self) -> f64;
    fn supports_touch(&self) -> bool;

    fn set_style(&self, element: &Self::Element, property: &str, value: &str) -> Result<(), DomError>;
    fn attribute(&self, element: &Self::Element, name: &str) -> Option<String>;
    fn text_content(&self, element: &Self::Element) -> Option<String>;
    fn bounding_rect(&self, element: &Self::Element) -> Rect;

    fn create_element(&self, tag: &str) -> Result<Self::Element, DomError>;
    fn append_child(&self, parent: &Self::Element, child: &Self::Element) -> Result<(), DomError>;
    fn remove(&self, element: &Self::Element);
    /// Appends a `<style>` element holding `css` to the document head.
    fn append_style_sheet(&self, css: &str) -> Result<(), DomError>;
    /// Smooth-scrolls `element` so its top aligns with the viewport top.
    fn scroll_into_view(&self, element: &Self::Element);

    /// Registers `handler` for the page's lifetime.
    fn listen(&self, target: ListenTarget<'_, Self::Element>, kind: EventKind, handler: EventHandler);
    /// Creates one observer watching every element in `targets`.
    fn observe_intersections(
        &self,
        targets: &[Self::Element],
        options: &ObserverOptions,
        callback: IntersectionCallback<Self::Element>,
    ) -> Result<(), DomError>;
    fn request_animation_frame(&self, callback: Box<dyn FnOnce()>) -> Result<(), DomError>;
    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> Self::Timer;

    /// Starts playback; `on_settled` receives the outcome of the play promise.
    fn play(&self, media: &Self::Element, on_settled: PlaybackCallback);
    fn pause(&self, media: &Self::Element) -> Result<(), DomError>;
}
