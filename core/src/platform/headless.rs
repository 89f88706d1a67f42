//! In-memory host
//!
//! A document made of named anchor boxes, a scrollable viewport and a tiny
//! class-keyed stylesheet. Elements record every mutation so callers can
//! inspect what the engine did. Used by the command line frontend and tests.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use perch_types::{Rect, Size};

use super::{ClassList, Host, OverlayElement};
use crate::error::PerchError;

/// Text metrics used to size elements without a fixed size
const CHAR_WIDTH: f64 = 8.0;
const LINE_HEIGHT: f64 = 18.0;
const PADDING: f64 = 4.0;

#[derive(Debug, Default)]
struct Document {
    anchors: HashMap<String, Rect>,
    scroll_x: f64,
    scroll_y: f64,
    width: f64,
    height: f64,
    /// (class, property) -> value
    stylesheet: HashMap<(String, String), String>,
}

/// Headless document acting as an overlay host
#[derive(Debug, Clone)]
pub struct HeadlessHost {
    doc: Rc<RefCell<Document>>,
}

impl HeadlessHost {
    /// Create a document with a viewport of the given size, scrolled to the origin
    pub fn new(width: f64, height: f64) -> Self {
        let doc = Document {
            width,
            height,
            ..Default::default()
        };
        Self {
            doc: Rc::new(RefCell::new(doc)),
        }
    }

    /// Add an anchor, replacing any existing anchor with the same name
    pub fn add_anchor(&self, name: impl Into<String>, rect: Rect) {
        self.doc.borrow_mut().anchors.insert(name.into(), rect);
    }

    /// Move an existing anchor
    pub fn move_anchor(&self, name: &str, rect: Rect) -> Result<(), PerchError> {
        let mut doc = self.doc.borrow_mut();
        let slot = doc
            .anchors
            .get_mut(name)
            .ok_or_else(|| PerchError::UnknownAnchor {
                name: name.to_string(),
            })?;
        *slot = rect;
        Ok(())
    }

    /// Take an anchor out of the document
    pub fn remove_anchor(&self, name: &str) -> Result<Rect, PerchError> {
        self.doc
            .borrow_mut()
            .anchors
            .remove(name)
            .ok_or_else(|| PerchError::UnknownAnchor {
                name: name.to_string(),
            })
    }

    pub fn anchor(&self, name: &str) -> Option<Rect> {
        self.doc.borrow().anchors.get(name).copied()
    }

    /// Anchor names in sorted order
    pub fn anchor_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.doc.borrow().anchors.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn scroll_to(&self, x: f64, y: f64) {
        let mut doc = self.doc.borrow_mut();
        doc.scroll_x = x;
        doc.scroll_y = y;
    }

    pub fn scroll_by(&self, dx: f64, dy: f64) {
        let mut doc = self.doc.borrow_mut();
        doc.scroll_x += dx;
        doc.scroll_y += dy;
    }

    pub fn resize(&self, width: f64, height: f64) {
        let mut doc = self.doc.borrow_mut();
        doc.width = width;
        doc.height = height;
    }

    /// Declare a style rule: elements with `class` get `property: value`
    pub fn set_class_style(&self, class: &str, property: &str, value: &str) {
        self.doc
            .borrow_mut()
            .stylesheet
            .insert((class.to_string(), property.to_string()), value.to_string());
    }
}

impl Host for HeadlessHost {
    type Element = HeadlessElement;
    type Anchor = String;

    fn create_element(&self) -> HeadlessElement {
        HeadlessElement {
            state: Rc::new(RefCell::new(ElementState::default())),
            doc: Rc::clone(&self.doc),
        }
    }

    fn measure(&self, anchor: &String) -> Option<Rect> {
        self.anchor(anchor)
    }

    fn viewport(&self) -> Rect {
        let doc = self.doc.borrow();
        Rect::new(doc.scroll_y, doc.scroll_x, doc.width, doc.height)
    }
}

#[derive(Debug, Default)]
struct ElementState {
    classes: Vec<String>,
    content: String,
    fixed_size: Option<Size>,
    inline_styles: HashMap<String, String>,
    mounted: bool,
    measuring: bool,
    pointer_events: bool,
    position: Option<(i32, i32)>,
    position_writes: usize,
    mounts: usize,
    unmounts: usize,
    layout_flushes: usize,
}

/// Shared handle to a headless element. Clones observe the same element.
#[derive(Debug, Clone)]
pub struct HeadlessElement {
    state: Rc<RefCell<ElementState>>,
    doc: Rc<RefCell<Document>>,
}

impl HeadlessElement {
    /// Pin the rendered size instead of deriving it from the content
    pub fn set_fixed_size(&self, size: Size) {
        self.state.borrow_mut().fixed_size = Some(size);
    }

    pub fn set_inline_style(&self, property: &str, value: &str) {
        self.state
            .borrow_mut()
            .inline_styles
            .insert(property.to_string(), value.to_string());
    }

    pub fn classes(&self) -> Vec<String> {
        self.state.borrow().classes.clone()
    }

    pub fn content(&self) -> String {
        self.state.borrow().content.clone()
    }

    /// Last written `(top, left)`
    pub fn position(&self) -> Option<(i32, i32)> {
        self.state.borrow().position
    }

    pub fn position_writes(&self) -> usize {
        self.state.borrow().position_writes
    }

    pub fn mounts(&self) -> usize {
        self.state.borrow().mounts
    }

    pub fn unmounts(&self) -> usize {
        self.state.borrow().unmounts
    }

    pub fn layout_flushes(&self) -> usize {
        self.state.borrow().layout_flushes
    }

    pub fn pointer_events(&self) -> bool {
        self.state.borrow().pointer_events
    }

    pub fn is_measuring(&self) -> bool {
        self.state.borrow().measuring
    }
}

impl ClassList for HeadlessElement {
    fn add(&mut self, class: &str) {
        let mut state = self.state.borrow_mut();
        if !class.is_empty() && !state.classes.iter().any(|c| c == class) {
            state.classes.push(class.to_string());
        }
    }

    fn remove(&mut self, class: &str) {
        self.state.borrow_mut().classes.retain(|c| c != class);
    }

    fn has(&self, class: &str) -> bool {
        self.state.borrow().classes.iter().any(|c| c == class)
    }
}

impl OverlayElement for HeadlessElement {
    type Content = String;

    fn set_content(&mut self, content: String) {
        self.state.borrow_mut().content = content;
    }

    fn mount(&mut self) {
        let mut state = self.state.borrow_mut();
        if !state.mounted {
            state.mounted = true;
            state.mounts += 1;
        }
    }

    fn unmount(&mut self) {
        let mut state = self.state.borrow_mut();
        if state.mounted {
            state.mounted = false;
            state.unmounts += 1;
        }
    }

    fn is_mounted(&self) -> bool {
        self.state.borrow().mounted
    }

    fn set_measuring(&mut self, measuring: bool) {
        self.state.borrow_mut().measuring = measuring;
    }

    fn offset_size(&self) -> Size {
        let state = self.state.borrow();
        if !state.mounted {
            return Size::default();
        }
        if let Some(size) = state.fixed_size {
            return size;
        }

        let lines = state.content.lines().count().max(1);
        let longest = state
            .content
            .lines()
            .map(|line| line.chars().count())
            .max()
            .unwrap_or(0);
        Size::new(
            longest as f64 * CHAR_WIDTH + PADDING * 2.0,
            lines as f64 * LINE_HEIGHT + PADDING * 2.0,
        )
    }

    fn computed_style(&self, property: &str) -> Option<String> {
        let state = self.state.borrow();
        if let Some(value) = state.inline_styles.get(property) {
            return Some(value.clone());
        }

        // later classes win, like later rules in a stylesheet
        let doc = self.doc.borrow();
        state.classes.iter().rev().find_map(|class| {
            doc.stylesheet
                .get(&(class.clone(), property.to_string()))
                .cloned()
        })
    }

    fn set_position(&mut self, top: i32, left: i32) {
        let mut state = self.state.borrow_mut();
        state.position = Some((top, left));
        state.position_writes += 1;
    }

    fn set_pointer_events(&mut self, enabled: bool) {
        self.state.borrow_mut().pointer_events = enabled;
    }

    fn flush_layout(&mut self) {
        self.state.borrow_mut().layout_flushes += 1;
    }
}
