//! A minimal HTML builder that escapes everything it is given.
//!
//! Text and attribute values always go through [escape]. The only way to
//! insert markup verbatim is [Html::markup], which accepts a [Markup]
//! value, and [Markup] can only be produced by [Html::finish].

use std::fmt;

/// A finished, well-formed HTML fragment.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Markup {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Append `s` to `out` with the HTML special characters replaced.
pub fn escape_into(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(&mut out, s);
    out
}

pub type Attrs<'a> = &'a [(&'a str, &'a str)];

#[derive(Default)]
pub struct Html {
    buf: String,
    stack: Vec<&'static str>,
}

impl Html {
    pub fn new() -> Self {
        Self::default()
    }

    fn start_tag(&mut self, tag: &'static str, attrs: Attrs) {
        self.buf.push('<');
        self.buf.push_str(tag);
        for (name, value) in attrs {
            self.buf.push(' ');
            escape_into(&mut self.buf, name);
            self.buf.push_str("=\"");
            escape_into(&mut self.buf, value);
            self.buf.push('"');
        }
        self.buf.push('>');
    }

    /// Open an element; it stays open until [Html::close].
    pub fn open(&mut self, tag: &'static str, attrs: Attrs) -> &mut Self {
        self.start_tag(tag, attrs);
        self.stack.push(tag);
        self
    }

    /// Close the innermost open element.
    pub fn close(&mut self) -> &mut Self {
        if let Some(tag) = self.stack.pop() {
            self.buf.push_str("</");
            self.buf.push_str(tag);
            self.buf.push('>');
        }
        self
    }

    /// An element without content, e.g. `<br>`.
    pub fn void(&mut self, tag: &'static str, attrs: Attrs) -> &mut Self {
        self.start_tag(tag, attrs);
        self
    }

    pub fn text(&mut self, s: &str) -> &mut Self {
        escape_into(&mut self.buf, s);
        self
    }

    /// An element containing only text.
    pub fn element(&mut self, tag: &'static str, attrs: Attrs, text: &str) -> &mut Self {
        self.open(tag, attrs).text(text).close()
    }

    pub fn markup(&mut self, m: &Markup) -> &mut Self {
        self.buf.push_str(&m.0);
        self
    }

    pub fn doctype(&mut self) -> &mut Self {
        self.buf.push_str("<!DOCTYPE html>\n");
        self
    }

    /// Close all elements that are still open.
    pub fn finish(mut self) -> Markup {
        while !self.stack.is_empty() {
            self.close();
        }
        Markup(self.buf)
    }
}
