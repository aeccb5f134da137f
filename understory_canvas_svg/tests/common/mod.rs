// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared helpers for device integration tests.

#![allow(
    missing_docs,
    reason = "Integration-test helper module; not part of the public API."
)]

use understory_canvas_svg::XmlWriter;

/// One call made on an [`XmlWriter`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Event {
    Header,
    Start(String),
    Attr(String, String),
    Text(String),
    End,
}

/// An [`XmlWriter`] that records calls instead of producing text.
#[derive(Debug, Default)]
pub(crate) struct RecordingWriter {
    pub(crate) events: Vec<Event>,
}

impl XmlWriter for RecordingWriter {
    fn write_header(&mut self) {
        self.events.push(Event::Header);
    }

    fn start_element(&mut self, name: &str) {
        self.events.push(Event::Start(name.to_owned()));
    }

    fn end_element(&mut self) {
        self.events.push(Event::End);
    }

    fn add_attribute(&mut self, name: &str, value: &str) {
        self.events
            .push(Event::Attr(name.to_owned(), value.to_owned()));
    }

    fn add_text(&mut self, text: &str) {
        self.events.push(Event::Text(text.to_owned()));
    }
}

/// A recorded element with its attributes, in document order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Element {
    pub(crate) name: String,
    pub(crate) depth: usize,
    pub(crate) attrs: Vec<(String, String)>,
}

impl Element {
    pub(crate) fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

impl RecordingWriter {
    /// Returns `true` if every start has a matching end and nothing follows
    /// the root.
    pub(crate) fn is_balanced(&self) -> bool {
        let mut depth = 0_usize;
        let mut closed_root = false;
        for event in &self.events {
            match event {
                Event::Start(_) => {
                    if closed_root {
                        return false;
                    }
                    depth += 1;
                }
                Event::End => {
                    let Some(d) = depth.checked_sub(1) else {
                        return false;
                    };
                    depth = d;
                    closed_root = depth == 0;
                }
                Event::Attr(..) | Event::Text(_) => {
                    if depth == 0 {
                        return false;
                    }
                }
                Event::Header => {}
            }
        }
        depth == 0
    }

    /// Every element in document order.
    pub(crate) fn elements(&self) -> Vec<Element> {
        let mut elements = Vec::new();
        let mut open: Vec<usize> = Vec::new();
        for event in &self.events {
            match event {
                Event::Start(name) => {
                    elements.push(Element {
                        name: name.clone(),
                        depth: open.len(),
                        attrs: Vec::new(),
                    });
                    open.push(elements.len() - 1);
                }
                Event::Attr(name, value) => {
                    let index = *open.last().expect("attribute outside of an element");
                    elements[index].attrs.push((name.clone(), value.clone()));
                }
                Event::End => {
                    open.pop();
                }
                Event::Header | Event::Text(_) => {}
            }
        }
        elements
    }

    /// Elements named `name`, in document order.
    pub(crate) fn named(&self, name: &str) -> Vec<Element> {
        self.elements()
            .into_iter()
            .filter(|e| e.name == name)
            .collect()
    }

    /// All text written, concatenated.
    pub(crate) fn text(&self) -> String {
        self.events
            .iter()
            .filter_map(|e| match e {
                Event::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}
