//! Release feed parsing.
//!
//! A feed is an XML document whose root holds repeated release elements
//! (`<r>`), each optionally carrying a version element (`<v>`):
//!
//! ```xml
//! <releases>
//!   <r><v>1.0.0</v><s>stable</s></r>
//!   <r><v>1.0.1</v><s>stable</s></r>
//! </releases>
//! ```
//!
//! Well-formedness is checked by walking the whole document and recording
//! every structural problem, so a broken feed reports all of its
//! diagnostics at once instead of only the first.

use quick_xml::Reader;
use quick_xml::events::Event;
use std::borrow::Cow;

/// Tag of a release element, a direct child of the document root.
pub const RELEASE_TAG: &[u8] = b"r";

/// Tag of the version element inside a release.
pub const VERSION_TAG: &[u8] = b"v";

/// Parsed release listing for one extension key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistryFeed {
    versions: Vec<String>,
}

impl RegistryFeed {
    /// Parses a feed body.
    ///
    /// Releases without a version element are skipped. Version text is kept
    /// verbatim, whitespace included.
    ///
    /// # Errors
    ///
    /// Returns every collected diagnostic, trimmed, when the body is not
    /// well-formed XML.
    ///
    /// # Examples
    ///
    /// ```
    /// use deps_connect::RegistryFeed;
    ///
    /// let feed = RegistryFeed::parse(b"<releases><r><v>1.2.3</v></r><r></r></releases>").unwrap();
    /// assert_eq!(feed.versions(), ["1.2.3"]);
    ///
    /// let diagnostics = RegistryFeed::parse(b"<releases><r></releases>").unwrap_err();
    /// assert!(!diagnostics.is_empty());
    /// ```
    pub fn parse(body: &[u8]) -> std::result::Result<Self, Vec<String>> {
        FeedWalker::new(body).run()
    }

    /// Versions in document order.
    pub fn versions(&self) -> &[String] {
        &self.versions
    }

    pub fn into_versions(self) -> Vec<String> {
        self.versions
    }
}

struct OpenElement {
    name: String,
    line: usize,
}

/// Release currently being read.
struct ReleaseState {
    version: Option<String>,
    capturing: bool,
}

/// Maps byte offsets to 1-based line numbers.
///
/// Offsets are expected to mostly move forward, so only the bytes between
/// the previous and the current offset are scanned.
struct LineCursor<'a> {
    body: &'a [u8],
    pos: usize,
    line: usize,
}

impl<'a> LineCursor<'a> {
    fn new(body: &'a [u8]) -> Self {
        Self {
            body,
            pos: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, position: impl TryInto<usize>) -> usize {
        let target = position
            .try_into()
            .unwrap_or(usize::MAX)
            .min(self.body.len());

        if target >= self.pos {
            self.line += count_newlines(&self.body[self.pos..target]);
        } else {
            self.line -= count_newlines(&self.body[target..self.pos]);
        }
        self.pos = target;
        self.line
    }
}

fn count_newlines(bytes: &[u8]) -> usize {
    bytes.iter().filter(|&&b| b == b'\n').count()
}

struct FeedWalker<'a> {
    body: &'a [u8],
    lines: LineCursor<'a>,
    stack: Vec<OpenElement>,
    root_seen: bool,
    root_closed: bool,
    extra_reported: bool,
    release: Option<ReleaseState>,
    versions: Vec<String>,
    diagnostics: Vec<String>,
}

impl<'a> FeedWalker<'a> {
    fn new(body: &'a [u8]) -> Self {
        Self {
            body,
            lines: LineCursor::new(body),
            stack: Vec::new(),
            root_seen: false,
            root_closed: false,
            extra_reported: false,
            release: None,
            versions: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn run(mut self) -> std::result::Result<RegistryFeed, Vec<String>> {
        let mut reader = Reader::from_reader(self.body);
        {
            let config = reader.config_mut();
            config.check_end_names = false;
            config.allow_unmatched_ends = true;
        }

        let mut buf = Vec::new();
        loop {
            let event = reader.read_event_into(&mut buf);
            let line = self.lines.line_at(reader.buffer_position());

            match event {
                Ok(Event::Start(e)) => {
                    let name = e.name().as_ref().to_vec();
                    self.open(&name, line);
                }
                Ok(Event::Empty(e)) => {
                    let name = e.name().as_ref().to_vec();
                    self.open(&name, line);
                    self.close_top();
                }
                Ok(Event::End(e)) => {
                    let name = e.name().as_ref().to_vec();
                    self.end(&name, line);
                }
                Ok(Event::Text(e)) => match e.unescape() {
                    Ok(text) => self.text(text, line),
                    Err(err) => self.diagnose(format!("{err} at line {line}")),
                },
                Ok(Event::CData(e)) => {
                    let text = String::from_utf8_lossy(&e).into_owned();
                    self.text(Cow::Owned(text), line);
                }
                Ok(Event::Eof) => {
                    self.finish();
                    break;
                }
                Ok(_) => {}
                Err(err) => {
                    let line = self.lines.line_at(reader.error_position());
                    self.diagnose(format!("{err} at line {line}"));
                    break;
                }
            }
            buf.clear();
        }

        if self.diagnostics.is_empty() {
            Ok(RegistryFeed {
                versions: self.versions,
            })
        } else {
            Err(self.diagnostics)
        }
    }

    fn open(&mut self, name: &[u8], line: usize) {
        if self.stack.is_empty() {
            if self.root_closed {
                self.extra_content(line);
            }
            self.root_seen = true;
        }

        self.stack.push(OpenElement {
            name: String::from_utf8_lossy(name).into_owned(),
            line,
        });

        if self.extra_reported {
            return;
        }

        match self.stack.len() {
            2 if name == RELEASE_TAG => {
                self.release = Some(ReleaseState {
                    version: None,
                    capturing: false,
                });
            }
            3 if name == VERSION_TAG => {
                if let Some(release) = self.release.as_mut().filter(|r| r.version.is_none()) {
                    release.version = Some(String::new());
                    release.capturing = true;
                }
            }
            _ => {}
        }
    }

    fn close_top(&mut self) {
        let depth = self.stack.len();
        if self.stack.pop().is_none() {
            return;
        }

        match depth {
            3 => {
                if let Some(release) = self.release.as_mut() {
                    release.capturing = false;
                }
            }
            2 => {
                if let Some(version) = self.release.take().and_then(|r| r.version) {
                    self.versions.push(version);
                }
            }
            1 => self.root_closed = true,
            _ => {}
        }
    }

    fn end(&mut self, name: &[u8], line: usize) {
        let name = String::from_utf8_lossy(name);

        let Some(top) = self.stack.last() else {
            self.diagnose(format!("Unexpected end tag : {name} at line {line}"));
            return;
        };

        if top.name == name {
            self.close_top();
            return;
        }

        match self.stack.iter().rposition(|open| open.name == name) {
            Some(index) => {
                while self.stack.len() > index + 1 {
                    if let Some(open) = self.stack.last() {
                        let message = format!(
                            "Opening and ending tag mismatch: {} line {} and {}",
                            open.name, open.line, name
                        );
                        self.diagnose(message);
                    }
                    self.close_top();
                }
                self.close_top();
            }
            None => {
                let message = format!(
                    "Opening and ending tag mismatch: {} line {} and {}",
                    top.name, top.line, name
                );
                self.diagnose(message);
            }
        }
    }

    fn text(&mut self, text: Cow<'_, str>, line: usize) {
        if self.stack.is_empty() {
            if !text.trim().is_empty() {
                if self.root_seen {
                    self.extra_content(line);
                } else {
                    self.diagnose(format!("Start tag expected, '<' not found at line {line}"));
                }
            }
            return;
        }

        if self.stack.len() != 3 {
            return;
        }
        if let Some(release) = self.release.as_mut().filter(|r| r.capturing) {
            if let Some(version) = release.version.as_mut() {
                version.push_str(&text);
            }
        }
    }

    fn finish(&mut self) {
        while let Some(open) = self.stack.pop() {
            let message = format!(
                "Premature end of data in tag {} line {}",
                open.name, open.line
            );
            self.diagnose(message);
        }
        if !self.root_seen {
            self.diagnose("Document is empty".to_string());
        }
    }

    fn extra_content(&mut self, line: usize) {
        if !self.extra_reported {
            self.extra_reported = true;
            self.diagnose(format!(
                "Extra content at the end of the document at line {line}"
            ));
        }
    }

    fn diagnose(&mut self, message: String) {
        self.diagnostics.push(message.trim().to_string());
    }
}
