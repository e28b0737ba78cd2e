//! Streaming XODE parser.
//!
//! The tokenizer produces start and end tag events in document order. Each
//! event goes to exactly one handler: the top of a handler stack. A handler
//! that sees the start of a child element it owns may push a new handler,
//! which then receives every event of that child's subtree until it pops
//! itself on the child's end tag. Below the stack sits a sentinel that only
//! accepts the root element.

mod attrs;

use std::io::BufRead;

use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

pub use attrs::Attributes;

use crate::builder::RootHandler;
use crate::config::ParserConfig;
use crate::engine::Engine;
use crate::error::{Result, XodeError};
use crate::tree::SceneTree;

/// Receives the events of one element's subtree.
///
/// Both callbacks default to doing nothing.
pub(crate) trait ElementHandler {
    fn start(&mut self, ctx: &mut Context<'_>, tag: &str, attrs: &Attributes) -> Result<()> {
        let _ = (ctx, tag, attrs);
        Ok(())
    }

    fn end(&mut self, ctx: &mut Context<'_>, tag: &str) -> Result<()> {
        let _ = (ctx, tag);
        Ok(())
    }
}

/// What a handler can reach while processing one event.
pub(crate) struct Context<'a> {
    pub(crate) tree: &'a mut SceneTree,
    pub(crate) engine: &'a mut dyn Engine,
    pushed: Vec<Box<dyn ElementHandler>>,
    popped: bool,
}

impl<'a> Context<'a> {
    fn new(tree: &'a mut SceneTree, engine: &'a mut dyn Engine) -> Self {
        Self {
            tree,
            engine,
            pushed: Vec::new(),
            popped: false,
        }
    }

    /// Hand the rest of the current element's subtree to `handler`.
    pub(crate) fn push(&mut self, handler: impl ElementHandler + 'static) {
        self.pushed.push(Box::new(handler));
    }

    /// Remove the active handler and reactivate the one beneath it.
    pub(crate) fn pop(&mut self) {
        self.popped = true;
    }

    /// Ignore the subtree of the element that just started.
    pub(crate) fn skip(&mut self) {
        self.push(SkipHandler::default());
    }
}

/// Swallows an element's subtree and pops on its end tag.
#[derive(Debug, Default)]
pub(crate) struct SkipHandler {
    depth: usize,
}

impl ElementHandler for SkipHandler {
    fn start(&mut self, _ctx: &mut Context<'_>, _tag: &str, _attrs: &Attributes) -> Result<()> {
        self.depth += 1;
        Ok(())
    }

    fn end(&mut self, ctx: &mut Context<'_>, _tag: &str) -> Result<()> {
        if self.depth == 0 {
            ctx.pop();
        } else {
            self.depth -= 1;
        }
        Ok(())
    }
}

/// The bottom of the stack: accepts the root element once.
struct DocumentHandler {
    root_tag: String,
    opened: bool,
}

impl ElementHandler for DocumentHandler {
    fn start(&mut self, ctx: &mut Context<'_>, tag: &str, _attrs: &Attributes) -> Result<()> {
        if tag != self.root_tag {
            return Err(XodeError::InvalidRoot {
                expected: self.root_tag.clone(),
                found: tag.to_string(),
            });
        }
        if self.opened {
            return Err(XodeError::XmlParse(format!(
                "unexpected second root element <{tag}>"
            )));
        }
        self.opened = true;
        let root = ctx.tree.root();
        ctx.push(RootHandler::new(root, tag));
        Ok(())
    }
}

enum TagEvent<'t> {
    Start(&'t str, &'t Attributes),
    End(&'t str),
}

/// An XODE parser.
///
/// A parser can be reused for any number of documents, one at a time.
pub struct Parser {
    config: ParserConfig,
    stack: Vec<Box<dyn ElementHandler>>,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("config", &self.config)
            .field("depth", &self.stack.len())
            .finish()
    }
}

impl Parser {
    /// Create a parser with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ParserConfig::default())
    }

    /// Create a parser with the given settings.
    #[must_use]
    pub fn with_config(config: ParserConfig) -> Self {
        Self {
            config,
            stack: Vec::new(),
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a document held in memory.
    ///
    /// The text is always read as UTF-8; an `encoding` in the XML
    /// declaration is ignored.
    ///
    /// # Errors
    ///
    /// Returns the first validation or XML error; no tree is produced.
    pub fn parse_str(&mut self, engine: &mut dyn Engine, xml: &str) -> Result<SceneTree> {
        self.parse_with(engine, Reader::from_str(xml))
    }

    /// Parse a document from a buffered byte source.
    ///
    /// The encoding is taken from the XML declaration, defaulting to UTF-8.
    ///
    /// # Errors
    ///
    /// Returns the first validation or XML error; no tree is produced.
    pub fn parse_reader<R: BufRead>(
        &mut self,
        engine: &mut dyn Engine,
        source: R,
    ) -> Result<SceneTree> {
        self.parse_with(engine, Reader::from_reader(source))
    }

    fn parse_with<R: BufRead>(
        &mut self,
        engine: &mut dyn Engine,
        reader: Reader<R>,
    ) -> Result<SceneTree> {
        self.stack.clear();
        let result = self.run(engine, reader);
        self.stack.clear();
        result
    }

    fn run<R: BufRead>(
        &mut self,
        engine: &mut dyn Engine,
        mut reader: Reader<R>,
    ) -> Result<SceneTree> {
        let mut tree = SceneTree::new(None);
        let mut document = DocumentHandler {
            root_tag: self.config.root_tag.clone(),
            opened: false,
        };

        reader.config_mut().trim_text(true);
        let mut buf = Vec::new();
        let mut depth = 0usize;

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) => {
                    let (tag, attrs) = decode_start(&reader, e)?;
                    depth += 1;
                    self.check_depth(depth)?;
                    self.dispatch(
                        &mut tree,
                        engine,
                        &mut document,
                        TagEvent::Start(&tag, &attrs),
                    )?;
                }
                Ok(Event::Empty(ref e)) => {
                    let (tag, attrs) = decode_start(&reader, e)?;
                    self.check_depth(depth + 1)?;
                    self.dispatch(
                        &mut tree,
                        engine,
                        &mut document,
                        TagEvent::Start(&tag, &attrs),
                    )?;
                    self.dispatch(&mut tree, engine, &mut document, TagEvent::End(&tag))?;
                }
                Ok(Event::End(ref e)) => {
                    let tag = decode_name(&reader, e.name().as_ref())?;
                    depth = depth.saturating_sub(1);
                    self.dispatch(&mut tree, engine, &mut document, TagEvent::End(&tag))?;
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(e) => return Err(XodeError::XmlParse(e.to_string())),
            }
            buf.clear();
        }

        if !document.opened {
            return Err(XodeError::MissingRoot(self.config.root_tag.clone()));
        }
        if depth > 0 || !self.stack.is_empty() {
            return Err(XodeError::XmlParse("unexpected end of document".into()));
        }

        debug!(nodes = tree.len(), "parsed XODE document");
        Ok(tree)
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.config.max_depth {
            return Err(XodeError::DepthExceeded(self.config.max_depth));
        }
        Ok(())
    }

    /// Deliver one event to the active handler, then apply the pushes and
    /// pop it requested.
    fn dispatch(
        &mut self,
        tree: &mut SceneTree,
        engine: &mut dyn Engine,
        document: &mut DocumentHandler,
        event: TagEvent<'_>,
    ) -> Result<()> {
        let mut ctx = Context::new(tree, engine);

        match self.stack.pop() {
            Some(mut handler) => {
                deliver(handler.as_mut(), &mut ctx, &event)?;
                if !ctx.popped {
                    self.stack.push(handler);
                }
            }
            None => {
                deliver(document, &mut ctx, &event)?;
                if ctx.popped {
                    return Err(XodeError::StackUnderflow);
                }
            }
        }

        self.stack.append(&mut ctx.pushed);
        Ok(())
    }
}

fn deliver(
    handler: &mut dyn ElementHandler,
    ctx: &mut Context<'_>,
    event: &TagEvent<'_>,
) -> Result<()> {
    match event {
        TagEvent::Start(tag, attrs) => handler.start(ctx, tag, attrs),
        TagEvent::End(tag) => handler.end(ctx, tag),
    }
}

fn decode_name<R>(reader: &Reader<R>, raw: &[u8]) -> Result<String> {
    reader
        .decoder()
        .decode(raw)
        .map(|name| name.into_owned())
        .map_err(|e| XodeError::XmlParse(e.to_string()))
}

fn decode_start<R>(reader: &Reader<R>, start: &BytesStart) -> Result<(String, Attributes)> {
    let tag = decode_name(reader, start.name().as_ref())?;
    let mut attrs = Attributes::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| XodeError::XmlParse(e.to_string()))?;
        let key = decode_name(reader, attr.key.as_ref())?;
        let value = attr
            .decode_and_unescape_value(reader.decoder())
            .map_err(|e| XodeError::XmlParse(e.to_string()))?;
        attrs.insert(key, value.into_owned());
    }
    Ok((tag, attrs))
}

/// Parse an XODE string into a scene tree using `engine`.
///
/// # Errors
///
/// Returns an error if the document is malformed or invalid.
pub fn parse_xode_str(engine: &mut dyn Engine, xml: &str) -> Result<SceneTree> {
    Parser::new().parse_str(engine, xml)
}
