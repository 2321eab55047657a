use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotFoundReason {
    /// A move produced no focus change within the timeout. The UI clamps at
    /// collection boundaries, so this is read as "end of list"; a UI that
    /// silently ignores input looks the same.
    EndOfCollection,
    /// The caller's step budget ran out before the target showed up.
    StepLimitExceeded,
    /// Focus kept cycling without progress. [`Navigator::search_for`] never
    /// reports it: a revisited token cannot be told apart from a repeated
    /// label, so wrap-around is bounded by the step budget instead.
    StalledNoProgress,
}

impl NotFoundReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::EndOfCollection => "end_of_collection",
            Self::StepLimitExceeded => "step_limit_exceeded",
            Self::StalledNoProgress => "stalled_no_progress",
        }
    }
}

impl fmt::Display for NotFoundReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(FocusToken),
    NotFound {
        reason: NotFoundReason,
        last_seen: FocusToken,
        moves: usize,
    },
}

impl SearchOutcome {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn reason(&self) -> Option<NotFoundReason> {
        match self {
            Self::Found(_) => None,
            Self::NotFound { reason, .. } => Some(*reason),
        }
    }

    pub fn found_token(&self) -> Option<&FocusToken> {
        match self {
            Self::Found(token) => Some(token),
            Self::NotFound { .. } => None,
        }
    }
}

impl fmt::Display for SearchOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Found(token) => write!(f, "found {token}"),
            Self::NotFound {
                reason,
                last_seen,
                moves,
            } => write!(f, "not found ({reason}) last_seen={last_seen} moves={moves}"),
        }
    }
}

impl<S: RemoteSession> Navigator<S> {
    /// Walks `direction` one step at a time until `target` is focused.
    ///
    /// At most `step_budget` moves are issued. Running out of budget or
    /// hitting the end of the collection is returned as
    /// [`SearchOutcome::NotFound`] rather than an error. Repeated tokens are
    /// walked past like any other item.
    pub fn search_for<A>(
        &mut self,
        accessor: &A,
        target: &FocusToken,
        direction: Direction,
        step_budget: usize,
    ) -> Result<SearchOutcome>
    where
        A: FocusAccessor<S> + ?Sized,
    {
        let mut remaining = step_budget;
        let mut moves = 0usize;

        loop {
            let current = accessor.read(&self.session)?;
            if current.matches_label(target) {
                self.trace_search_line(format!(
                    "[search] found target={target} direction={direction} moves={moves}"
                ));
                return Ok(SearchOutcome::Found(current));
            }

            if remaining == 0 {
                return Ok(self.not_found(
                    target,
                    direction,
                    NotFoundReason::StepLimitExceeded,
                    current,
                    moves,
                ));
            }

            self.send(direction.into())?;
            moves += 1;
            let next = self.await_focus_change(accessor, &current)?;

            if next == current {
                return Ok(self.not_found(
                    target,
                    direction,
                    NotFoundReason::EndOfCollection,
                    current,
                    moves,
                ));
            }

            remaining -= 1;
        }
    }

    fn not_found(
        &mut self,
        target: &FocusToken,
        direction: Direction,
        reason: NotFoundReason,
        last_seen: FocusToken,
        moves: usize,
    ) -> SearchOutcome {
        self.trace_search_line(format!(
            "[search] not_found target={target} direction={direction} reason={reason} last={last_seen} moves={moves}"
        ));
        SearchOutcome::NotFound {
            reason,
            last_seen,
            moves,
        }
    }
}
