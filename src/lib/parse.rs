use std::{borrow::Cow, iter::Peekable, ops::Range};

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

#[cfg(feature = "tracing")]
use tracing::{debug, trace};

const ATX_MARKER: char = '#';

type Children<'a> = Vec<(Cow<'a, str>, MarkdownNode<'a>)>;

/// A Markdown document split along its heading hierarchy.
///
/// Each heading becomes a keyed node nested under the closest preceding heading of a
/// lower level. Keys and bodies borrow from the parsed text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MarkdownTree<'a> {
  /// Text before the first heading.
  pub preamble: Cow<'a, str>,
  pub roots: Children<'a>,
}

impl<'a> MarkdownTree<'a> {
  /// First top-level heading titled `key`.
  pub fn get(&self, key: &str) -> Option<&MarkdownNode<'a>> {
    find_child(&self.roots, key)
  }
}

impl<'a> From<&'a str> for MarkdownTree<'a> {
  fn from(s: &'a str) -> Self {
    let spans = heading_spans(s);

    #[cfg(feature = "tracing")]
    debug!("Found {} headings", spans.len());

    let preamble_end = spans.first().map_or(s.len(), |(_, range)| range.start);
    let body_ends = spans
      .iter()
      .skip(1)
      .map(|(_, range)| range.start)
      .chain(std::iter::once(s.len()));

    let mut headings = spans
      .iter()
      .zip(body_ends)
      .map(|((level, range), body_end)| Heading::new(s, *level, range, body_end))
      .peekable();

    Self {
      preamble: Cow::Borrowed(&s[..preamble_end]),
      roots: nest(&mut headings, 0),
    }
  }
}

/// A heading's body, either plain text or text followed by sub-headings.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkdownNode<'a> {
  Leaf { raw: Cow<'a, str> },
  Branch { raw: Cow<'a, str>, children: Children<'a> },
}

impl<'a> MarkdownNode<'a> {
  /// Text between the heading line and the next heading of any level.
  pub fn raw(&self) -> &str {
    match self {
      MarkdownNode::Leaf { raw } | MarkdownNode::Branch { raw, .. } => raw,
    }
  }

  /// Sub-headings in document order; empty for a leaf.
  pub fn children(&self) -> &[(Cow<'a, str>, MarkdownNode<'a>)] {
    match self {
      MarkdownNode::Leaf { .. } => &[],
      MarkdownNode::Branch { children, .. } => children,
    }
  }

  /// First sub-heading titled `key`.
  pub fn get(&self, key: &str) -> Option<&MarkdownNode<'a>> {
    find_child(self.children(), key)
  }
}

struct Heading<'a> {
  level: usize,
  title: Cow<'a, str>,
  raw: Cow<'a, str>,
}

impl<'a> Heading<'a> {
  fn new(s: &'a str, level: usize, range: &Range<usize>, body_end: usize) -> Self {
    let source = &s[range.clone()];
    let body_start = if source.ends_with('\n') {
      range.end
    } else {
      s[range.end..]
        .find('\n')
        .map_or(s.len(), |offset| range.end + offset + 1)
    };

    let title = heading_title(source);

    #[cfg(feature = "tracing")]
    trace!("Heading h{} {:?} at {:?}", level, title, range);

    Heading {
      level,
      title: Cow::Borrowed(title),
      raw: Cow::Borrowed(s.get(body_start..body_end).unwrap_or_default()),
    }
  }
}

/// Byte ranges of top-level headings.
///
/// Headings nested in list items or block quotes (`- # of retries`) belong to the
/// surrounding text and are skipped.
fn heading_spans(s: &str) -> Vec<(usize, Range<usize>)> {
  let mut spans = Vec::new();
  let mut container_depth = 0usize;

  for (event, range) in Parser::new_ext(s, Options::empty()).into_offset_iter() {
    match event {
      Event::Start(Tag::List(_) | Tag::Item | Tag::BlockQuote(_)) => container_depth += 1,
      Event::End(TagEnd::List(_) | TagEnd::Item | TagEnd::BlockQuote(_)) => {
        container_depth = container_depth.saturating_sub(1)
      }
      Event::Start(Tag::Heading { level, .. }) if container_depth == 0 => {
        spans.push((level as usize, range))
      }
      _ => {}
    }
  }

  spans
}

/// Heading text as written in the source, without ATX markers.
///
/// Reading the source instead of the rendered inline text keeps `[Unreleased]` intact
/// when a link reference definition turns it into a link.
fn heading_title(source: &str) -> &str {
  let line = source.lines().next().unwrap_or_default().trim();

  let Some(content) = line.strip_prefix(ATX_MARKER) else {
    return line;
  };
  let content = content.trim_start_matches(ATX_MARKER).trim();

  let without_closing = content.trim_end_matches(ATX_MARKER);
  if without_closing.is_empty() || without_closing.ends_with(char::is_whitespace) {
    without_closing.trim_end()
  } else {
    content
  }
}

fn nest<'a, I>(headings: &mut Peekable<I>, parent_level: usize) -> Children<'a>
where
  I: Iterator<Item = Heading<'a>>,
{
  let mut nodes = Vec::new();

  while let Some(heading) = headings.next_if(|h| h.level > parent_level) {
    let children = nest(headings, heading.level);
    let node = if children.is_empty() {
      MarkdownNode::Leaf { raw: heading.raw }
    } else {
      MarkdownNode::Branch {
        raw: heading.raw,
        children,
      }
    };
    nodes.push((heading.title, node));
  }

  nodes
}

fn find_child<'n, 'a>(children: &'n [(Cow<'a, str>, MarkdownNode<'a>)], key: &str) -> Option<&'n MarkdownNode<'a>> {
  children
    .iter()
    .find_map(|(k, node)| (k.as_ref() == key).then_some(node))
}
