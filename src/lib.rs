use std::collections::{BTreeMap, HashMap, VecDeque};
use std::error::Error as StdError;
use std::fmt;

mod accessor;
mod clock;
mod command;
mod dom;
mod focus;
mod html;
mod input;
mod label_pattern;
mod menu;
mod navigator;
mod observer;
mod pages;
mod search;
mod selector;
mod trace;
mod tv_session;

pub use accessor::{DomFocusAccessor, ElementSnapshot, PageQuery, TokenSource};
pub use clock::{Clock, LiveSession, SystemClock};
pub use command::{
    Command, Direction, KEY_BACK, KEY_DOWN, KEY_LEFT, KEY_RIGHT, KEY_SELECT, KEY_UP, parse_sequence,
};
pub use focus::{FocusAccessor, FocusToken, normalize_label};
pub use input::{KeyDispatch, RemoteSession};
pub use label_pattern::LabelPattern;
pub use menu::MenuTable;
pub use navigator::{Navigator, NavigatorConfig};
pub use pages::{DetailsPage, Favorites, MenuBar, Rail, TvPage, goto, wait_for_load};
pub use search::{NotFoundReason, SearchOutcome};
pub use tv_session::{PendingTask, TvSession};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    UnsupportedSelector(String),
    SelectorNotFound(String),
    UnknownKey(String),
    UnknownTarget(String),
    InvalidConfig(String),
    Session(String),
    Pattern(String),
    AssertionFailed {
        target: String,
        expected: String,
        actual: String,
        context: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnknownKey(name) => write!(f, "unknown remote key: {name}"),
            Self::UnknownTarget(name) => write!(f, "unknown navigation target: {name}"),
            Self::InvalidConfig(msg) => write!(f, "invalid configuration: {msg}"),
            Self::Session(msg) => write!(f, "session error: {msg}"),
            Self::Pattern(msg) => write!(f, "label pattern error: {msg}"),
            Self::AssertionFailed {
                target,
                expected,
                actual,
                context,
            } => write!(
                f,
                "assertion failed for {target}: expected {expected}, actual {actual}, context {context}"
            ),
        }
    }
}

impl StdError for Error {}

pub(crate) fn truncate_chars(value: &str, max_chars: usize) -> String {
    let mut it = value.chars();
    let mut out = String::new();
    for _ in 0..max_chars {
        let Some(ch) = it.next() else {
            return out;
        };
        out.push(ch);
    }
    if it.next().is_some() {
        out.push_str("...");
    }
    out
}
