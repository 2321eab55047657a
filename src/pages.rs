use super::*;

mod details;
mod favorites;
mod menu_bar;
mod rail;

pub use details::DetailsPage;
pub use favorites::Favorites;
pub use menu_bar::MenuBar;
pub use rail::Rail;

/// A session that takes remote keys and answers selector queries.
pub trait TvPage: RemoteSession + PageQuery {}

impl<T: RemoteSession + PageQuery + ?Sized> TvPage for T {}

/// Focuses `item` in the menu bar, selects it and waits for its screen.
pub fn goto<S: TvPage>(navigator: &mut Navigator<S>, menu: &MenuBar, item: &str) -> Result<()> {
    menu.select(navigator, item)?;
    if let Some(selector) = menu.screen_selector(item) {
        let timeout_ms = navigator.config().focus_timeout_ms;
        wait_for_load(navigator, selector, timeout_ms)?;
    }
    Ok(())
}

/// Polls until `selector` matches something on the page.
pub fn wait_for_load<S: TvPage>(
    navigator: &mut Navigator<S>,
    selector: &str,
    timeout_ms: i64,
) -> Result<()> {
    let started = navigator.now_ms();
    let loaded = navigator.wait_until(timeout_ms, |session| session.exists(selector))?;
    let waited = navigator.now_ms().saturating_sub(started);
    navigator.trace_search_line(format!(
        "[page] wait_for_load selector={selector} loaded={loaded} waited_ms={waited}"
    ));
    if !loaded {
        return Err(Error::AssertionFailed {
            target: selector.to_string(),
            expected: "present".into(),
            actual: "missing".into(),
            context: format!("waited {waited} ms"),
        });
    }
    Ok(())
}

pub(crate) fn not_found_error(
    target: String,
    expected: &str,
    outcome: &SearchOutcome,
) -> Error {
    let actual = match outcome {
        SearchOutcome::Found(token) => token.to_string(),
        SearchOutcome::NotFound { last_seen, .. } => last_seen.to_string(),
    };
    Error::AssertionFailed {
        target,
        expected: expected.to_string(),
        actual,
        context: outcome.to_string(),
    }
}
