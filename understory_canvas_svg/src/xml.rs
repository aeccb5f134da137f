// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The XML sink the device writes into.

use std::fmt::Write as _;

/// A streaming XML writer.
///
/// Calls arrive in strictly nested order: every [`XmlWriter::start_element`]
/// is matched by exactly one [`XmlWriter::end_element`], and attributes are
/// only added to the most recently started element before any content is
/// written into it.
///
/// Implementations escape attribute values. Text passed to
/// [`XmlWriter::add_text`] is already escaped character data.
pub trait XmlWriter {
    /// Write the document prologue, if any.
    fn write_header(&mut self);

    /// Open a new element as a child of the current one.
    fn start_element(&mut self, name: &str);

    /// Close the current element.
    fn end_element(&mut self);

    /// Add an attribute to the current element.
    fn add_attribute(&mut self, name: &str, value: &str);

    /// Append escaped character data to the current element.
    fn add_text(&mut self, text: &str);
}

/// Options for [`SvgStringWriter`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct XmlOptions {
    /// Emit `<?xml version="1.0" encoding="utf-8" ?>` from
    /// [`XmlWriter::write_header`].
    pub declaration: bool,
    /// Put each element on its own line, indented by this many spaces per
    /// nesting level. `None` writes everything on one line.
    pub indent: Option<usize>,
}

impl Default for XmlOptions {
    fn default() -> Self {
        Self {
            declaration: true,
            indent: None,
        }
    }
}

impl XmlOptions {
    /// Pretty printing with `width` spaces per level.
    pub fn pretty(width: usize) -> Self {
        Self {
            indent: Some(width),
            ..Self::default()
        }
    }
}

#[derive(Debug)]
struct OpenElement {
    name: String,
    // `>` of the start tag has been written.
    has_content: bool,
    has_child_elements: bool,
}

/// An [`XmlWriter`] that builds the document in a `String`.
///
/// Elements without content are closed with `/>`.
#[derive(Debug, Default)]
pub struct SvgStringWriter {
    out: String,
    options: XmlOptions,
    stack: Vec<OpenElement>,
}

impl SvgStringWriter {
    /// A writer with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// A writer with the given options.
    pub fn with_options(options: XmlOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    /// The document written so far.
    pub fn as_str(&self) -> &str {
        &self.out
    }

    /// Consume the writer, returning the document.
    pub fn into_string(self) -> String {
        self.out
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    fn close_start_tag(&mut self) {
        if let Some(top) = self.stack.last_mut()
            && !top.has_content
        {
            self.out.push('>');
            top.has_content = true;
        }
    }

    /// Start a new indented line, unless the output already ends with one.
    fn newline(&mut self, depth: usize) {
        let Some(width) = self.options.indent else {
            return;
        };
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        for _ in 0..depth * width {
            self.out.push(' ');
        }
    }
}

impl XmlWriter for SvgStringWriter {
    fn write_header(&mut self) {
        if self.options.declaration {
            self.out
                .push_str("<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n");
        }
    }

    fn start_element(&mut self, name: &str) {
        self.close_start_tag();
        if let Some(parent) = self.stack.last_mut() {
            parent.has_child_elements = true;
        }
        let depth = self.stack.len();
        self.newline(depth);
        let _ = write!(self.out, "<{name}");
        self.stack.push(OpenElement {
            name: name.to_owned(),
            has_content: false,
            has_child_elements: false,
        });
    }

    fn end_element(&mut self) {
        let element = self
            .stack
            .pop()
            .unwrap_or_else(|| panic!("end_element called with no open element"));
        if !element.has_content {
            self.out.push_str("/>");
            return;
        }
        if element.has_child_elements {
            self.newline(self.stack.len());
        }
        let _ = write!(self.out, "</{}>", element.name);
    }

    fn add_attribute(&mut self, name: &str, value: &str) {
        let top = self
            .stack
            .last()
            .unwrap_or_else(|| panic!("attribute `{name}` added outside of an element"));
        assert!(
            !top.has_content,
            "attribute `{name}` added to <{}> after its content",
            top.name
        );
        let _ = write!(self.out, " {name}=\"");
        escape_into(&mut self.out, value);
        self.out.push('"');
    }

    fn add_text(&mut self, text: &str) {
        assert!(!self.stack.is_empty(), "text added outside of an element");
        self.close_start_tag();
        self.out.push_str(text);
    }
}

/// Append `value` with the XML special characters replaced by entities.
fn escape_into(out: &mut String, value: &str) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
}
