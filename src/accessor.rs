use super::*;

/// Copy of one element as seen by a page query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementSnapshot {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub text: String,
}

impl ElementSnapshot {
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }
}

/// Read-only selector queries against the rendered page.
pub trait PageQuery {
    fn query_all(&self, selector: &str) -> Result<Vec<ElementSnapshot>>;

    fn query(&self, selector: &str) -> Result<Option<ElementSnapshot>> {
        Ok(self.query_all(selector)?.into_iter().next())
    }

    fn exists(&self, selector: &str) -> Result<bool> {
        Ok(!self.query_all(selector)?.is_empty())
    }
}

/// Where a focused element's token comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// Named attribute, falling back to trimmed text when it is absent.
    Attr(String),
    /// Trimmed text content.
    Text,
    /// Label extracted from the text content.
    TextPattern(LabelPattern),
}

/// Focus accessor for one collection: finds the item carrying the focused
/// marker inside `container` and reports its identifying token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomFocusAccessor {
    container: String,
    item: String,
    focused_attr: String,
    source: TokenSource,
}

impl DomFocusAccessor {
    pub fn new(container: &str) -> Self {
        Self {
            container: container.trim().to_string(),
            item: "[role=listitem]".into(),
            focused_attr: "data-focused".into(),
            source: TokenSource::Attr("data-testid".into()),
        }
    }

    pub fn with_item(mut self, item: &str) -> Self {
        self.item = item.trim().to_string();
        self
    }

    pub fn with_focused_attr(mut self, name: &str) -> Self {
        self.focused_attr = name.trim().to_ascii_lowercase();
        self
    }

    pub fn with_source(mut self, source: TokenSource) -> Self {
        self.source = source;
        self
    }

    pub fn container(&self) -> &str {
        &self.container
    }

    /// Item selector scoped to the container. Selector lists on either side
    /// are expanded so every container alternative gets every item
    /// alternative.
    pub fn item_selector(&self) -> String {
        self.scoped("")
    }

    pub fn focused_selector(&self) -> String {
        self.scoped(&format!("[{}]", self.focused_attr))
    }

    fn scoped(&self, suffix: &str) -> String {
        let items = alternatives(&self.item);
        alternatives(&self.container)
            .into_iter()
            .flat_map(|container| {
                items
                    .iter()
                    .map(move |item| format!("{container} {item}{suffix}"))
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn token_of(&self, element: &ElementSnapshot) -> Result<FocusToken> {
        let text = element.text.trim();
        match &self.source {
            TokenSource::Attr(name) => Ok(match element.attr(name) {
                Some(value) => FocusToken::new(value),
                None => FocusToken::new(text),
            }),
            TokenSource::Text => Ok(FocusToken::new(text)),
            TokenSource::TextPattern(pattern) => Ok(pattern.extract(text)?.into()),
        }
    }

    /// Tokens of every item in the collection, in document order.
    pub fn items<S: PageQuery + ?Sized>(&self, session: &S) -> Result<Vec<FocusToken>> {
        session
            .query_all(&self.item_selector())?
            .iter()
            .map(|element| self.token_of(element))
            .collect()
    }
}

impl<S: PageQuery + ?Sized> FocusAccessor<S> for DomFocusAccessor {
    fn read(&self, session: &S) -> Result<FocusToken> {
        match session.query(&self.focused_selector())? {
            Some(element) => self.token_of(&element),
            None => Ok(FocusToken::none()),
        }
    }

    fn describe(&self) -> String {
        self.focused_selector()
    }
}

/// Splits a selector list on top-level commas, leaving commas inside
/// attribute brackets and quotes alone.
fn alternatives(selector: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote = None;
    let mut start = 0usize;
    for (idx, ch) in selector.char_indices() {
        match (quote, ch) {
            (Some(open), _) if ch == open => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(ch),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(selector[start..idx].trim());
                start = idx + 1;
            }
            _ => {}
        }
    }
    parts.push(selector[start..].trim());
    parts
}
