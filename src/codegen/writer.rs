//! Block/indentation renderer
//!
//! Generated code is assembled as [`Fragment`]s: ordered lines, each tagged
//! with a nesting depth relative to the fragment's own origin. A construct
//! renders its body into a child fragment and nests it under its header, so
//! depth is decided when the tree is built and never recovered from the
//! text afterwards. Indentation width is applied once, in [`Fragment::render`].

/// One line of generated code at a relative depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub depth: usize,
    pub text: String,
}

/// An owned run of generated lines
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fragment {
    lines: Vec<Line>,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    /// A fragment holding a single line
    pub fn line(text: impl Into<String>) -> Self {
        let mut fragment = Self::new();
        fragment.push(text);
        fragment
    }

    pub fn push(&mut self, text: impl Into<String>) {
        self.lines.push(Line {
            depth: 0,
            text: text.into(),
        });
    }

    pub fn blank(&mut self) {
        self.push("");
    }

    /// Move `other`'s lines onto the end of this fragment
    pub fn append(&mut self, other: Fragment) {
        self.lines.extend(other.lines);
    }

    /// Emit `header` followed by `body` one level deeper. An empty body
    /// becomes `pass` so the block stays syntactically valid.
    pub fn nest(&mut self, header: impl Into<String>, body: Fragment) {
        self.push(header);
        if body.is_empty() {
            self.lines.push(Line {
                depth: 1,
                text: "pass".to_string(),
            });
            return;
        }
        self.lines.extend(body.lines.into_iter().map(|line| Line {
            depth: line.depth + 1,
            text: line.text,
        }));
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    /// Render with `indent_width` spaces per level. Blank lines carry no
    /// indentation, and the result ends with a newline unless empty.
    pub fn render(&self, indent_width: usize) -> String {
        let mut out = String::new();
        for line in &self.lines {
            if !line.text.is_empty() {
                out.push_str(&" ".repeat(line.depth * indent_width));
                out.push_str(&line.text);
            }
            out.push('\n');
        }
        out
    }
}
