use super::*;

/// Attribute test inside `[...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttrFilter {
    pub(crate) name: String,
    pub(crate) op: AttrOp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AttrOp {
    Present,
    Equals(String),
    Prefix(String),
    Suffix(String),
    Substring(String),
    Word(String),
}

impl AttrFilter {
    pub(crate) fn accepts(&self, attrs: &HashMap<String, String>) -> bool {
        let Some(actual) = attrs.get(&self.name) else {
            return false;
        };
        match &self.op {
            AttrOp::Present => true,
            AttrOp::Equals(expected) => actual == expected,
            AttrOp::Prefix(expected) => actual.starts_with(expected.as_str()),
            AttrOp::Suffix(expected) => actual.ends_with(expected.as_str()),
            AttrOp::Substring(expected) => actual.contains(expected.as_str()),
            AttrOp::Word(expected) => actual.split_whitespace().any(|word| word == expected),
        }
    }
}

/// One compound selector such as `li.tile[data-goto=details]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Compound {
    pub(crate) tag: Option<String>,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) filters: Vec<AttrFilter>,
}

impl Compound {
    fn is_empty(&self) -> bool {
        self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.filters.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    Descendant,
    Child,
}

/// A complex selector stored right to left: `subject` is the element being
/// matched, `ancestors[0]` is the compound immediately left of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorChain {
    pub(crate) subject: Compound,
    pub(crate) ancestors: Vec<(Combinator, Compound)>,
}

/// Parses a comma separated selector list.
pub(crate) fn parse_selector_list(src: &str) -> Result<Vec<SelectorChain>> {
    let unsupported = || Error::UnsupportedSelector(src.to_string());
    let mut cursor = SelectorCursor {
        bytes: src.as_bytes(),
        src,
        pos: 0,
    };

    let mut chains = Vec::new();
    let mut compounds: Vec<Compound> = Vec::new();
    let mut combinators: Vec<Combinator> = Vec::new();
    let mut pending: Option<Combinator> = None;

    loop {
        let had_space = cursor.skip_ws();
        match cursor.peek() {
            None | Some(b',') => {
                if compounds.is_empty() || pending.is_some() {
                    return Err(unsupported());
                }
                let mut compounds = std::mem::take(&mut compounds);
                let mut combinators = std::mem::take(&mut combinators);
                let subject = compounds.pop().ok_or_else(unsupported)?;
                let ancestors = combinators.drain(..).rev().zip(compounds.into_iter().rev());
                chains.push(SelectorChain {
                    subject,
                    ancestors: ancestors.collect(),
                });
                if cursor.peek().is_none() {
                    return Ok(chains);
                }
                cursor.pos += 1;
            }
            Some(b'>') => {
                if compounds.is_empty() || pending == Some(Combinator::Child) {
                    return Err(unsupported());
                }
                pending = Some(Combinator::Child);
                cursor.pos += 1;
            }
            Some(_) => {
                if !compounds.is_empty() {
                    let combinator = match pending.take() {
                        Some(combinator) => combinator,
                        None if had_space => Combinator::Descendant,
                        None => return Err(unsupported()),
                    };
                    combinators.push(combinator);
                }
                compounds.push(cursor.compound().ok_or_else(unsupported)?);
            }
        }
    }
}

struct SelectorCursor<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> SelectorCursor<'a> {
    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_whitespace()) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn span(&mut self, keep: impl Fn(u8) -> bool) -> Option<&'a str> {
        let start = self.pos;
        while self.peek().is_some_and(&keep) {
            self.pos += 1;
        }
        (self.pos > start).then(|| self.src.get(start..self.pos)).flatten()
    }

    fn ident(&mut self) -> Option<String> {
        self.span(is_ident_byte).map(str::to_string)
    }

    fn compound(&mut self) -> Option<Compound> {
        let mut compound = Compound::default();
        let mut universal = false;
        while let Some(b) = self.peek() {
            match b {
                b'*' if !universal && compound.is_empty() => {
                    universal = true;
                    self.pos += 1;
                }
                b'#' if compound.id.is_none() => {
                    self.pos += 1;
                    compound.id = Some(self.ident()?);
                }
                b'.' => {
                    self.pos += 1;
                    compound.classes.push(self.ident()?);
                }
                b'[' => {
                    self.pos += 1;
                    compound.filters.push(self.attr_filter()?);
                }
                b if is_ident_byte(b) && !universal && compound.is_empty() => {
                    compound.tag = Some(self.ident()?.to_ascii_lowercase());
                }
                b if b.is_ascii_whitespace() || b == b'>' || b == b',' => break,
                _ => return None,
            }
        }
        (universal || !compound.is_empty()).then_some(compound)
    }

    fn attr_filter(&mut self) -> Option<AttrFilter> {
        self.skip_ws();
        let name = self
            .span(|b| is_ident_byte(b) || b == b':')?
            .to_ascii_lowercase();
        self.skip_ws();

        let make: fn(String) -> AttrOp = match self.peek()? {
            b']' => {
                self.pos += 1;
                return Some(AttrFilter {
                    name,
                    op: AttrOp::Present,
                });
            }
            b'=' => AttrOp::Equals,
            b'^' => AttrOp::Prefix,
            b'$' => AttrOp::Suffix,
            b'*' => AttrOp::Substring,
            b'~' => AttrOp::Word,
            _ => return None,
        };
        if self.peek() != Some(b'=') {
            self.pos += 1;
            if self.peek() != Some(b'=') {
                return None;
            }
        }
        self.pos += 1;
        self.skip_ws();

        let value = match self.peek()? {
            quote @ (b'"' | b'\'') => {
                self.pos += 1;
                let start = self.pos;
                while self.peek()? != quote {
                    self.pos += 1;
                }
                let value = self.src.get(start..self.pos)?.to_string();
                self.pos += 1;
                value
            }
            _ => self
                .span(|b| b != b']' && !b.is_ascii_whitespace())?
                .to_string(),
        };
        self.skip_ws();
        if self.peek()? != b']' {
            return None;
        }
        self.pos += 1;
        Some(AttrFilter {
            name,
            op: make(value),
        })
    }
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}
