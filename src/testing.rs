//! In-memory stand-ins for the browser used by unit tests.

use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::Rc,
};

use crate::{
    dom::{
        Dom, DomEvent, EventHandler, EventKind, Intersection, IntersectionCallback, ListenTarget,
        ObserverOptions, PlaybackCallback, Point, Propagation, Rect, Timer,
    },
    error::{DomError, SpeechError},
    speech::{Recognizer, RecognizerFactory, RecognizerSettings, SpeechEvent, SpeechEventSink},
};

pub type ElementId = usize;

#[derive(Default)]
struct Node {
    tag: String,
    classes: Vec<String>,
    attributes: HashMap<String, String>,
    styles: HashMap<String, String>,
    text: Option<String>,
    children: Vec<ElementId>,
    parent: Option<ElementId>,
    attached: bool,
    rect: Rect,
}

struct Listener {
    target: Option<ElementId>,
    kind: EventKind,
    handler: Rc<RefCell<EventHandler>>,
}

struct Observer {
    targets: Vec<ElementId>,
    options: ObserverOptions,
    callback: Rc<RefCell<IntersectionCallback<ElementId>>>,
    visible: HashMap<ElementId, bool>,
}

struct PendingTimer {
    due_ms: u64,
    seq: u64,
    cancelled: Rc<Cell<bool>>,
    callback: Box<dyn FnOnce()>,
}

pub struct FakeTimer {
    cancelled: Rc<Cell<bool>>,
    detached: bool,
}

impl Timer for FakeTimer {
    fn detach(mut self) {
        self.detached = true;
    }
}

impl Drop for FakeTimer {
    fn drop(&mut self) {
        if !self.detached {
            self.cancelled.set(true);
        }
    }
}

struct State {
    nodes: Vec<Node>,
    head_styles: Vec<String>,
    viewport_width: f64,
    scroll_y: f64,
    touch: bool,
    listeners: Vec<Listener>,
    observers: Vec<Observer>,
    frames: Vec<Box<dyn FnOnce()>>,
    frame_requests: usize,
    timers: Vec<PendingTimer>,
    now_ms: u64,
    timer_seq: u64,
    scrolled_into_view: Vec<ElementId>,
    play_calls: Vec<ElementId>,
    pause_calls: Vec<ElementId>,
    play_outcome: Result<(), DomError>,
}

pub struct FakeDom {
    state: RefCell<State>,
}

enum SimpleSelector {
    Class(String),
    Id(String),
    Tag(String),
    AttributePrefix { tag: String, name: String, prefix: String },
}

impl SimpleSelector {
    fn parse_list(selector: &str) -> Result<Vec<Self>, DomError> {
        selector.split(',').map(|part| Self::parse(part.trim(), selector)).collect()
    }

    fn parse(part: &str, full: &str) -> Result<Self, DomError> {
        let invalid = || DomError::InvalidSelector(full.to_string());

        if let Some(class) = part.strip_prefix('.') {
            return if class.is_empty() { Err(invalid()) } else { Ok(Self::Class(class.to_string())) };
        }

        if let Some(id) = part.strip_prefix('#') {
            let starts_validly = id
                .chars()
                .next()
                .is_some_and(|first| first.is_alphabetic() || first == '_' || first == '-');
            return if starts_validly && !id.contains(' ') { Ok(Self::Id(id.to_string())) } else { Err(invalid()) };
        }

        if let Some((tag, rest)) = part.split_once('[') {
            let inner = rest.strip_suffix(']').ok_or_else(invalid)?;
            let (name, prefix) = inner.split_once("^=").ok_or_else(invalid)?;
            return Ok(Self::AttributePrefix {
                tag: tag.to_string(),
                name: name.to_string(),
                prefix: prefix.trim_matches('"').to_string(),
            });
        }

        if part.is_empty() || !part.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(invalid());
        }
        Ok(Self::Tag(part.to_string()))
    }

    fn matches(&self, node: &Node) -> bool {
        match self {
            Self::Class(class) => node.classes.iter().any(|candidate| candidate == class),
            Self::Id(id) => node.attributes.get("id") == Some(id),
            Self::Tag(tag) => &node.tag == tag,
            Self::AttributePrefix { tag, name, prefix } => {
                &node.tag == tag
                    && node
                        .attributes
                        .get(name)
                        .is_some_and(|value| value.starts_with(prefix.as_str()))
            }
        }
    }
}

impl FakeDom {
    pub fn new(viewport_width: f64) -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(State {
                nodes: Vec::new(),
                head_styles: Vec::new(),
                viewport_width,
                scroll_y: 0.0,
                touch: false,
                listeners: Vec::new(),
                observers: Vec::new(),
                frames: Vec::new(),
                frame_requests: 0,
                timers: Vec::new(),
                now_ms: 0,
                timer_seq: 0,
                scrolled_into_view: Vec::new(),
                play_calls: Vec::new(),
                pause_calls: Vec::new(),
                play_outcome: Ok(()),
            }),
        })
    }

    pub fn add_element(&self, tag: &str, classes: &[&str]) -> ElementId {
        let mut state = self.state.borrow_mut();
        state.nodes.push(Node {
            tag: tag.to_string(),
            classes: classes.iter().map(ToString::to_string).collect(),
            attached: true,
            ..Node::default()
        });
        state.nodes.len() - 1
    }

    pub fn add_anchor(&self, href: &str) -> ElementId {
        let anchor = self.add_element("a", &[]);
        self.set_attribute(anchor, "href", href);
        anchor
    }

    pub fn set_attribute(&self, element: ElementId, name: &str, value: &str) {
        self.state.borrow_mut().nodes[element]
            .attributes
            .insert(name.to_string(), value.to_string());
    }

    pub fn set_text(&self, element: ElementId, text: &str) {
        self.state.borrow_mut().nodes[element].text = Some(text.to_string());
    }

    pub fn set_rect(&self, element: ElementId, rect: Rect) {
        self.state.borrow_mut().nodes[element].rect = rect;
    }

    pub fn set_touch(&self, touch: bool) {
        self.state.borrow_mut().touch = touch;
    }

    pub fn set_viewport_width(&self, width: f64) {
        self.state.borrow_mut().viewport_width = width;
    }

    pub fn set_scroll_y(&self, scroll_y: f64) {
        self.state.borrow_mut().scroll_y = scroll_y;
    }

    pub fn set_play_outcome(&self, outcome: Result<(), DomError>) {
        self.state.borrow_mut().play_outcome = outcome;
    }

    pub fn style(&self, element: ElementId, property: &str) -> Option<String> {
        self.state.borrow().nodes[element].styles.get(property).cloned()
    }

    pub fn children(&self, element: ElementId) -> Vec<ElementId> {
        self.state.borrow().nodes[element].children.clone()
    }

    pub fn head_styles(&self) -> Vec<String> {
        self.state.borrow().head_styles.clone()
    }

    pub fn scrolled_into_view(&self) -> Vec<ElementId> {
        self.state.borrow().scrolled_into_view.clone()
    }

    pub fn play_calls(&self) -> usize {
        self.state.borrow().play_calls.len()
    }

    pub fn pause_calls(&self) -> usize {
        self.state.borrow().pause_calls.len()
    }

    pub fn observer_count(&self) -> usize {
        self.state.borrow().observers.len()
    }

    pub fn observer_options(&self, index: usize) -> ObserverOptions {
        self.state.borrow().observers[index].options.clone()
    }

    pub fn listener_count(&self, element: ElementId, kind: EventKind) -> usize {
        self.state
            .borrow()
            .listeners
            .iter()
            .filter(|listener| listener.target == Some(element) && listener.kind == kind)
            .count()
    }

    pub fn pending_frames(&self) -> usize {
        self.state.borrow().frames.len()
    }

    pub fn frame_requests(&self) -> usize {
        self.state.borrow().frame_requests
    }

    pub fn click(&self, element: ElementId, x: f64, y: f64) -> Propagation {
        self.dispatch(
            Some(element),
            DomEvent {
                kind: EventKind::Click,
                pointer: Some(Point { x, y }),
            },
        )
    }

    pub fn fire(&self, element: ElementId, kind: EventKind) -> Propagation {
        self.dispatch(Some(element), DomEvent { kind, pointer: None })
    }

    pub fn fire_window(&self, kind: EventKind) -> Propagation {
        self.dispatch(None, DomEvent { kind, pointer: None })
    }

    fn dispatch(&self, target: Option<ElementId>, event: DomEvent) -> Propagation {
        let handlers: Vec<_> = self
            .state
            .borrow()
            .listeners
            .iter()
            .filter(|listener| listener.target == target && listener.kind == event.kind)
            .map(|listener| Rc::clone(&listener.handler))
            .collect();

        let mut outcome = Propagation::Default;
        for handler in handlers {
            if (&mut *handler.borrow_mut())(&event) == Propagation::PreventDefault {
                outcome = Propagation::PreventDefault;
            }
        }
        outcome
    }

    /// Moves `element` to the given visible ratio. Observers are notified only
    /// when the ratio crosses their threshold, the way browsers deliver entries.
    pub fn set_intersection(&self, element: ElementId, ratio: f64) {
        let mut deliveries = Vec::new();
        {
            let mut state = self.state.borrow_mut();
            for observer in state.observers.iter_mut() {
                if !observer.targets.contains(&element) {
                    continue;
                }
                let visible = ratio > 0.0 && ratio >= observer.options.threshold;
                if observer.visible.insert(element, visible) != Some(visible) {
                    deliveries.push((
                        Rc::clone(&observer.callback),
                        Intersection {
                            target: element,
                            is_intersecting: visible,
                            ratio,
                        },
                    ));
                }
            }
        }

        for (callback, entry) in deliveries {
            (&mut *callback.borrow_mut())(vec![entry]);
        }
    }

    pub fn run_frames(&self) -> usize {
        let frames = std::mem::take(&mut self.state.borrow_mut().frames);
        let count = frames.len();
        for frame in frames {
            frame();
        }
        count
    }

    pub fn advance(&self, elapsed_ms: u64) {
        let target = self.state.borrow().now_ms + elapsed_ms;

        loop {
            let next = {
                let mut state = self.state.borrow_mut();
                state.timers.retain(|timer| !timer.cancelled.get());
                let position = state
                    .timers
                    .iter()
                    .enumerate()
                    .filter(|(_, timer)| timer.due_ms <= target)
                    .min_by_key(|(_, timer)| (timer.due_ms, timer.seq))
                    .map(|(index, _)| index);
                position.map(|index| {
                    let timer = state.timers.remove(index);
                    state.now_ms = timer.due_ms;
                    timer.callback
                })
            };

            match next {
                Some(callback) => callback(),
                None => break,
            }
        }

        self.state.borrow_mut().now_ms = target;
    }
}

impl Dom for FakeDom {
    type Element = ElementId;
    type Timer = FakeTimer;

    fn query_selector(&self, selector: &str) -> Result<Option<ElementId>, DomError> {
        let selectors = SimpleSelector::parse_list(selector)?;
        let state = self.state.borrow();
        Ok(state
            .nodes
            .iter()
            .position(|node| node.attached && selectors.iter().any(|simple| simple.matches(node))))
    }

    fn query_selector_all(&self, selector: &str) -> Vec<ElementId> {
        let Ok(selectors) = SimpleSelector::parse_list(selector) else {
            return Vec::new();
        };
        let state = self.state.borrow();
        state
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.attached && selectors.iter().any(|simple| simple.matches(node)))
            .map(|(index, _)| index)
            .collect()
    }

    fn viewport_width(&self) -> f64 {
        self.state.borrow().viewport_width
    }

    fn scroll_y(&self) -> f64 {
        self.state.borrow().scroll_y
    }

    fn supports_touch(&self) -> bool {
        self.state.borrow().touch
    }

    fn set_style(&self, element: &ElementId, property: &str, value: &str) -> Result<(), DomError> {
        self.state.borrow_mut().nodes[*element]
            .styles
            .insert(property.to_string(), value.to_string());
        Ok(())
    }

    fn attribute(&self, element: &ElementId, name: &str) -> Option<String> {
        self.state.borrow().nodes[*element].attributes.get(name).cloned()
    }

    fn text_content(&self, element: &ElementId) -> Option<String> {
        self.state.borrow().nodes[*element].text.clone()
    }

    fn bounding_rect(&self, element: &ElementId) -> Rect {
        self.state.borrow().nodes[*element].rect
    }

    fn create_element(&self, tag: &str) -> Result<ElementId, DomError> {
        let mut state = self.state.borrow_mut();
        state.nodes.push(Node {
            tag: tag.to_string(),
            ..Node::default()
        });
        Ok(state.nodes.len() - 1)
    }

    fn append_child(&self, parent: &ElementId, child: &ElementId) -> Result<(), DomError> {
        let mut state = self.state.borrow_mut();
        state.nodes[*child].parent = Some(*parent);
        state.nodes[*child].attached = true;
        state.nodes[*parent].children.push(*child);
        Ok(())
    }

    fn remove(&self, element: &ElementId) {
        let mut state = self.state.borrow_mut();
        state.nodes[*element].attached = false;
        if let Some(parent) = state.nodes[*element].parent.take() {
            state.nodes[parent].children.retain(|child| child != element);
        }
    }

    fn append_style_sheet(&self, css: &str) -> Result<(), DomError> {
        self.state.borrow_mut().head_styles.push(css.to_string());
        Ok(())
    }

    fn scroll_into_view(&self, element: &ElementId) {
        self.state.borrow_mut().scrolled_into_view.push(*element);
    }

    fn listen(&self, target: ListenTarget<'_, ElementId>, kind: EventKind, handler: EventHandler) {
        let target = match target {
            ListenTarget::Window => None,
            ListenTarget::Element(element) => Some(*element),
        };
        self.state.borrow_mut().listeners.push(Listener {
            target,
            kind,
            handler: Rc::new(RefCell::new(handler)),
        });
    }

    fn observe_intersections(
        &self,
        targets: &[ElementId],
        options: &ObserverOptions,
        callback: IntersectionCallback<ElementId>,
    ) -> Result<(), DomError> {
        self.state.borrow_mut().observers.push(Observer {
            targets: targets.to_vec(),
            options: options.clone(),
            callback: Rc::new(RefCell::new(callback)),
            visible: HashMap::new(),
        });
        Ok(())
    }

    fn request_animation_frame(&self, callback: Box<dyn FnOnce()>) -> Result<(), DomError> {
        let mut state = self.state.borrow_mut();
        state.frames.push(callback);
        state.frame_requests += 1;
        Ok(())
    }

    fn set_timeout(&self, delay_ms: u32, callback: Box<dyn FnOnce()>) -> FakeTimer {
        let cancelled = Rc::new(Cell::new(false));
        let mut state = self.state.borrow_mut();
        state.timer_seq += 1;
        let timer = PendingTimer {
            due_ms: state.now_ms + u64::from(delay_ms),
            seq: state.timer_seq,
            cancelled: Rc::clone(&cancelled),
            callback,
        };
        state.timers.push(timer);
        FakeTimer {
            cancelled,
            detached: false,
        }
    }

    fn play(&self, media: &ElementId, on_settled: PlaybackCallback) {
        let outcome = {
            let mut state = self.state.borrow_mut();
            state.play_calls.push(*media);
            state.play_outcome.clone()
        };
        on_settled(outcome);
    }

    fn pause(&self, media: &ElementId) -> Result<(), DomError> {
        self.state.borrow_mut().pause_calls.push(*media);
        Ok(())
    }
}

/// Records what the speech demo does with its recognizer and lets tests
/// deliver recognition events.
#[derive(Default)]
pub struct FakeSpeech {
    pub constructed: Cell<usize>,
    pub started: Cell<usize>,
    pub fail_start: Cell<bool>,
    pub settings: RefCell<Option<RecognizerSettings>>,
    sink: RefCell<Option<SpeechEventSink>>,
}

impl FakeSpeech {
    pub fn emit(&self, event: SpeechEvent) {
        let sink = self.sink.borrow().clone();
        if let Some(sink) = sink {
            sink(event);
        }
    }
}

pub struct FakeRecognizerFactory(pub Rc<FakeSpeech>);

pub struct FakeRecognizer(Rc<FakeSpeech>);

impl RecognizerFactory for FakeRecognizerFactory {
    type Recognizer = FakeRecognizer;

    fn create(
        &self,
        settings: &RecognizerSettings,
        events: SpeechEventSink,
    ) -> Result<FakeRecognizer, SpeechError> {
        self.0.constructed.set(self.0.constructed.get() + 1);
        *self.0.settings.borrow_mut() = Some(settings.clone());
        *self.0.sink.borrow_mut() = Some(events);
        Ok(FakeRecognizer(Rc::clone(&self.0)))
    }
}

impl Recognizer for FakeRecognizer {
    fn start(&self) -> Result<(), SpeechError> {
        if self.0.fail_start.get() {
            return Err(SpeechError::Start("not-allowed".to_string()));
        }
        self.0.started.set(self.0.started.get() + 1);
        Ok(())
    }
}
