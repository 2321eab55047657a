use super::*;
use unicode_normalization::UnicodeNormalization;

/// Identifier of whatever the UI currently reports as focused.
///
/// `None` stands for "nothing focused". Tokens are compared, never parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FocusToken(Option<String>);

impl FocusToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(Some(value.into()))
    }

    pub fn none() -> Self {
        Self(None)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    pub fn is_some(&self) -> bool {
        self.0.is_some()
    }

    /// Label comparison used by searches: NFKC, trimmed, case-insensitive.
    /// A null token only matches another null token.
    pub fn matches_label(&self, other: &FocusToken) -> bool {
        match (&self.0, &other.0) {
            (None, None) => true,
            (Some(left), Some(right)) => normalize_label(left) == normalize_label(right),
            _ => false,
        }
    }
}

impl fmt::Display for FocusToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => write!(f, "{value:?}"),
            None => f.write_str("<none>"),
        }
    }
}

impl From<&str> for FocusToken {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for FocusToken {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<Option<String>> for FocusToken {
    fn from(value: Option<String>) -> Self {
        Self(value)
    }
}

impl From<Option<&str>> for FocusToken {
    fn from(value: Option<&str>) -> Self {
        Self(value.map(str::to_string))
    }
}

pub fn normalize_label(value: &str) -> String {
    value.nfkc().collect::<String>().trim().to_lowercase()
}

/// Read-only view of "what is focused" in one navigable collection.
///
/// Implementations receive a shared borrow of the session, so they can query
/// the page but never dispatch input.
pub trait FocusAccessor<S: ?Sized> {
    fn read(&self, session: &S) -> Result<FocusToken>;

    fn describe(&self) -> String {
        "focus accessor".into()
    }
}

impl<S, F> FocusAccessor<S> for F
where
    S: ?Sized,
    F: Fn(&S) -> Result<FocusToken>,
{
    fn read(&self, session: &S) -> Result<FocusToken> {
        self(session)
    }
}
