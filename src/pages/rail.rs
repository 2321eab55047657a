use super::*;

/// Horizontal collection of items searched by moving focus through it.
#[derive(Debug, Clone)]
pub struct Rail {
    accessor: DomFocusAccessor,
    step_budget: usize,
}

impl Rail {
    pub fn new(container: &str) -> Self {
        Self {
            accessor: DomFocusAccessor::new(container),
            step_budget: 50,
        }
    }

    pub fn with_accessor(mut self, accessor: DomFocusAccessor) -> Self {
        self.accessor = accessor;
        self
    }

    pub fn with_step_budget(mut self, step_budget: usize) -> Self {
        self.step_budget = step_budget;
        self
    }

    pub fn accessor(&self) -> &DomFocusAccessor {
        &self.accessor
    }

    pub fn container(&self) -> &str {
        self.accessor.container()
    }

    pub fn items<S: TvPage>(&self, navigator: &Navigator<S>) -> Result<Vec<FocusToken>> {
        self.accessor.items(navigator.session())
    }

    pub fn contains<S: TvPage>(&self, navigator: &Navigator<S>, item: &str) -> Result<bool> {
        let wanted = FocusToken::new(item);
        Ok(self
            .items(navigator)?
            .iter()
            .any(|token| token.matches_label(&wanted)))
    }

    pub fn has_focus<S: TvPage>(&self, navigator: &Navigator<S>) -> Result<bool> {
        Ok(navigator.focused(&self.accessor)?.is_some())
    }

    /// Presses down until one of the rail's items is focused.
    pub fn enter<S: TvPage>(&self, navigator: &mut Navigator<S>) -> Result<()> {
        for _ in 0..self.step_budget {
            if self.has_focus(navigator)? {
                return Ok(());
            }
            navigator.send(Command::MoveDown)?;
        }
        if self.has_focus(navigator)? {
            return Ok(());
        }
        Err(Error::AssertionFailed {
            target: self.accessor.focused_selector(),
            expected: "focused".into(),
            actual: "unfocused".into(),
            context: format!("pressed down {} time(s)", self.step_budget),
        })
    }

    /// Searches right from the current item, then left if the right end was
    /// reached first.
    pub fn locate<S: TvPage>(&self, navigator: &mut Navigator<S>, item: &str) -> Result<SearchOutcome> {
        self.enter(navigator)?;
        let target = FocusToken::new(item);
        let outcome = navigator.search_for(&self.accessor, &target, Direction::Right, self.step_budget)?;
        match outcome.reason() {
            Some(NotFoundReason::EndOfCollection) => {
                navigator.search_for(&self.accessor, &target, Direction::Left, self.step_budget)
            }
            _ => Ok(outcome),
        }
    }

    /// Focuses `item` and selects it.
    pub fn open<S: TvPage>(&self, navigator: &mut Navigator<S>, item: &str) -> Result<FocusToken> {
        let outcome = self.locate(navigator, item)?;
        match outcome {
            SearchOutcome::Found(token) => {
                navigator.send(Command::Select)?;
                Ok(token)
            }
            SearchOutcome::NotFound { .. } => {
                Err(not_found_error(self.accessor.focused_selector(), item, &outcome))
            }
        }
    }
}
