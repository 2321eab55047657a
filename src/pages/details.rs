use super::*;

/// Item details screen with a favorite toggle button.
#[derive(Debug, Clone)]
pub struct DetailsPage {
    screen: String,
    buttons: DomFocusAccessor,
    favorite: String,
    title: String,
}

impl DetailsPage {
    pub fn new(screen: &str) -> Self {
        let screen = screen.trim().to_string();
        Self {
            buttons: DomFocusAccessor::new(&screen)
                .with_item("[data-action]")
                .with_source(TokenSource::Attr("data-action".into())),
            favorite: format!("{screen} [data-action=favorite]"),
            title: format!("{screen} [data-bind=context]"),
            screen,
        }
    }

    pub fn screen(&self) -> &str {
        &self.screen
    }

    pub fn wait<S: TvPage>(&self, navigator: &mut Navigator<S>) -> Result<()> {
        let timeout_ms = navigator.config().focus_timeout_ms;
        wait_for_load(navigator, &self.screen, timeout_ms)
    }

    pub fn title<S: TvPage>(&self, navigator: &Navigator<S>) -> Result<Option<String>> {
        Ok(navigator
            .session()
            .query(&self.title)?
            .map(|element| element.text.trim().to_string()))
    }

    pub fn is_favorite<S: TvPage>(&self, navigator: &Navigator<S>) -> Result<bool> {
        let button = navigator
            .session()
            .query(&self.favorite)?
            .ok_or_else(|| Error::SelectorNotFound(self.favorite.clone()))?;
        Ok(button.attr("aria-pressed") == Some("true"))
    }

    /// Focuses the favorite button, presses it and waits for the new state.
    pub fn toggle_favorite<S: TvPage>(&self, navigator: &mut Navigator<S>) -> Result<bool> {
        let before = self.is_favorite(navigator)?;
        let target = FocusToken::new("favorite");
        let mut outcome = navigator.search_for(&self.buttons, &target, Direction::Right, 10)?;
        if !outcome.is_found() {
            outcome = navigator.search_for(&self.buttons, &target, Direction::Left, 10)?;
        }
        if !outcome.is_found() {
            return Err(not_found_error(self.buttons.focused_selector(), "favorite", &outcome));
        }
        navigator.send(Command::Select)?;

        let timeout_ms = navigator.config().focus_timeout_ms;
        let selector = self.favorite.clone();
        let changed = navigator.wait_until(timeout_ms, |session| {
            let pressed = session
                .query(&selector)?
                .is_some_and(|button| button.attr("aria-pressed") == Some("true"));
            Ok(pressed != before)
        })?;
        if !changed {
            return Err(Error::AssertionFailed {
                target: self.favorite.clone(),
                expected: (!before).to_string(),
                actual: before.to_string(),
                context: "favorite state did not change".into(),
            });
        }
        Ok(!before)
    }

    pub fn back<S: TvPage>(&self, navigator: &mut Navigator<S>) -> Result<()> {
        navigator.send(Command::Back)
    }
}
