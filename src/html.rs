use super::*;
use crate::dom::{Dom, NodeId};

/// Builds a DOM from TV page markup.
///
/// Covers what fixture pages use: elements, quoted/unquoted/bare attributes,
/// comments, doctype, void tags, raw text in `script`/`style`/`title`, and
/// the common character references. Unknown end tags are ignored.
pub(crate) fn parse_html(html: &str) -> Result<Dom> {
    let mut dom = Dom::new();
    let mut open = vec![dom.root];
    let mut reader = MarkupReader::new(html);

    while !reader.at_end() {
        if reader.eat("<!--") {
            reader.skip_past("-->", "unclosed HTML comment")?;
        } else if reader.eat("</") {
            let tag = reader.read_end_tag()?;
            if let Some(depth) = open
                .iter()
                .rposition(|node| dom.tag_name(*node) == Some(tag.as_str()))
                .filter(|depth| *depth > 0)
            {
                open.truncate(depth);
            }
        } else if reader.eat("<!") {
            reader.skip_past(">", "unclosed declaration tag")?;
        } else if reader.peek() == Some(b'<') {
            let tag = reader.read_start_tag()?;
            // <li> implicitly closes a still-open sibling <li>.
            if tag.name == "li" && open.len() > 1 {
                if let Some(top) = open.last() {
                    if dom.tag_name(*top) == Some("li") {
                        open.pop();
                    }
                }
            }
            let parent = current(&open)?;
            let node = dom.create_element(parent, tag.name.clone(), tag.attrs);
            if tag.self_closing || is_void_tag(&tag.name) {
                continue;
            }
            if is_raw_text_tag(&tag.name) {
                let body = reader.read_raw_text(&tag.name)?;
                if !body.is_empty() {
                    dom.create_text(node, body.to_string());
                }
                continue;
            }
            open.push(node);
        } else {
            let text = reader.read_text();
            dom.create_text(current(&open)?, decode_entities(text));
        }
    }

    Ok(dom)
}

fn current(open: &[NodeId]) -> Result<NodeId> {
    open.last()
        .copied()
        .ok_or_else(|| Error::HtmlParse("missing parent element".into()))
}

struct StartTag {
    name: String,
    attrs: HashMap<String, String>,
    self_closing: bool,
}

struct MarkupReader<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> MarkupReader<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn rest(&self) -> &'a str {
        self.src.get(self.pos..).unwrap_or_default()
    }

    fn peek(&self) -> Option<u8> {
        self.src.as_bytes().get(self.pos).copied()
    }

    fn eat(&mut self, prefix: &str) -> bool {
        if self.rest().starts_with(prefix) {
            self.pos += prefix.len();
            true
        } else {
            false
        }
    }

    fn skip_past(&mut self, terminator: &str, error: &str) -> Result<()> {
        match self.rest().find(terminator) {
            Some(offset) => {
                self.pos += offset + terminator.len();
                Ok(())
            }
            None => Err(Error::HtmlParse(error.into())),
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }

    fn take_while(&mut self, keep: impl Fn(u8) -> bool) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(&keep) {
            self.pos += 1;
        }
        self.src.get(start..self.pos).unwrap_or_default()
    }

    fn read_text(&mut self) -> &'a str {
        self.take_while(|b| b != b'<')
    }

    fn read_start_tag(&mut self) -> Result<StartTag> {
        self.eat("<");
        self.skip_ws();
        let name = self.take_while(is_name_byte).to_ascii_lowercase();
        if name.is_empty() {
            return Err(Error::HtmlParse("empty tag name".into()));
        }

        let mut attrs = HashMap::new();
        loop {
            self.skip_ws();
            if self.eat(">") {
                return Ok(StartTag {
                    name,
                    attrs,
                    self_closing: false,
                });
            }
            if self.eat("/>") {
                return Ok(StartTag {
                    name,
                    attrs,
                    self_closing: true,
                });
            }
            let Some(next) = self.peek() else {
                return Err(Error::HtmlParse(format!("unclosed <{name}> start tag")));
            };
            if !is_attr_byte(next) {
                // Junk inside a tag is skipped up to the next separator.
                self.take_while(|b| !b.is_ascii_whitespace() && b != b'>' && b != b'/');
                self.eat("/");
                continue;
            }

            let attr = self.take_while(is_attr_byte).to_ascii_lowercase();
            self.skip_ws();
            let value = if self.eat("=") {
                self.skip_ws();
                self.read_attr_value()?
            } else {
                String::new()
            };
            attrs.insert(attr, value);
        }
    }

    fn read_attr_value(&mut self) -> Result<String> {
        match self.peek() {
            Some(quote @ (b'"' | b'\'')) => {
                self.pos += 1;
                let raw = self.take_while(|b| b != quote);
                if !self.eat(if quote == b'"' { "\"" } else { "'" }) {
                    return Err(Error::HtmlParse("unclosed quoted attribute value".into()));
                }
                Ok(decode_entities(raw))
            }
            Some(_) => {
                let raw = self.take_while(|b| !b.is_ascii_whitespace() && b != b'>');
                let raw = match raw.strip_suffix('/') {
                    Some(trimmed) if self.peek() == Some(b'>') => {
                        self.pos -= 1;
                        trimmed
                    }
                    _ => raw,
                };
                Ok(decode_entities(raw))
            }
            None => Err(Error::HtmlParse("missing attribute value".into())),
        }
    }

    fn read_end_tag(&mut self) -> Result<String> {
        self.skip_ws();
        let name = self.take_while(is_name_byte).to_ascii_lowercase();
        self.skip_past(">", "unclosed end tag")?;
        Ok(name)
    }

    /// Body of a raw text element up to its (case-insensitive) end tag.
    fn read_raw_text(&mut self, tag: &str) -> Result<&'a str> {
        let closing = format!("</{tag}");
        let rest = self.rest();
        let offset = rest
            .as_bytes()
            .windows(closing.len())
            .position(|window| window.eq_ignore_ascii_case(closing.as_bytes()))
            .ok_or_else(|| Error::HtmlParse(format!("unclosed <{tag}>")))?;
        let body = rest.get(..offset).unwrap_or_default();
        self.pos += offset + 2;
        self.read_end_tag()?;
        Ok(body)
    }
}

fn decode_entities(src: &str) -> String {
    if !src.contains('&') {
        return src.to_string();
    }

    let mut out = String::with_capacity(src.len());
    let mut rest = src;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp + 1..];
        let decoded = tail
            .find(';')
            .and_then(|semi| Some((decode_reference(&tail[..semi])?, semi + 1)));
        match decoded {
            Some((ch, consumed)) => {
                out.push(ch);
                rest = &tail[consumed..];
            }
            None => {
                out.push('&');
                rest = tail;
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_reference(name: &str) -> Option<char> {
    if let Some(numeric) = name.strip_prefix('#') {
        let codepoint = match numeric.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => numeric.parse::<u32>().ok()?,
        };
        return char::from_u32(codepoint);
    }
    Some(match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{00A0}',
        "hellip" => '…',
        "middot" => '·',
        "rsquo" => '’',
        "lsquo" => '‘',
        "ndash" => '–',
        _ => return None,
    })
}

fn is_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

fn is_attr_byte(b: u8) -> bool {
    is_name_byte(b) || b == b':'
}

fn is_raw_text_tag(tag: &str) -> bool {
    matches!(tag, "script" | "style" | "title")
}

pub(crate) fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag,
        "area" | "base" | "br" | "col" | "embed" | "hr" | "img" | "input" | "link" | "meta"
            | "source" | "track" | "wbr"
    )
}
