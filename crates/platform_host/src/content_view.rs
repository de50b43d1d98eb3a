//! Embedded content view contracts.

use std::{cell::RefCell, rc::Rc};

/// Host primitives for driving the embedded content view.
pub trait ContentView {
    /// Navigates the view to `url`.
    fn load_url(&self, url: &str);

    /// Replaces the current document with an inline HTML page.
    fn load_data(&self, html: &str);

    /// Evaluates script in the current document's context. Results are not observed.
    fn evaluate_script(&self, script: &str);
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// One recorded [`ContentView`] call.
pub enum ContentViewOp {
    /// [`ContentView::load_url`].
    LoadUrl(String),
    /// [`ContentView::load_data`].
    LoadData(String),
    /// [`ContentView::evaluate_script`].
    EvaluateScript(String),
}

#[derive(Debug, Clone, Default)]
/// Content view that records every call, for tests and headless hosts.
pub struct MemoryContentView {
    ops: Rc<RefCell<Vec<ContentViewOp>>>,
}

impl MemoryContentView {
    /// Recorded calls in order.
    pub fn ops(&self) -> Vec<ContentViewOp> {
        self.ops.borrow().clone()
    }

    /// Most recent URL passed to [`ContentView::load_url`].
    pub fn last_loaded_url(&self) -> Option<String> {
        self.ops.borrow().iter().rev().find_map(|op| match op {
            ContentViewOp::LoadUrl(url) => Some(url.clone()),
            _ => None,
        })
    }
}

impl ContentView for MemoryContentView {
    fn load_url(&self, url: &str) {
        self.ops
            .borrow_mut()
            .push(ContentViewOp::LoadUrl(url.to_string()));
    }

    fn load_data(&self, html: &str) {
        self.ops
            .borrow_mut()
            .push(ContentViewOp::LoadData(html.to_string()));
    }

    fn evaluate_script(&self, script: &str) {
        self.ops
            .borrow_mut()
            .push(ContentViewOp::EvaluateScript(script.to_string()));
    }
}
