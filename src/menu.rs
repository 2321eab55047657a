use super::*;

/// Static positions of a fixed menu bar, plus the moves that bring focus to
/// its anchor item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuTable {
    entries: Vec<(String, usize)>,
    anchor_moves: Vec<Command>,
}

impl MenuTable {
    pub fn new<I, N>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, usize)>,
        N: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(name, index)| (name.into(), index))
                .collect(),
            anchor_moves: vec![Command::MoveUp, Command::MoveUp],
        }
    }

    /// Replaces the default anchor moves (two presses of up).
    pub fn with_anchor_moves(mut self, moves: Vec<Command>) -> Self {
        self.anchor_moves = moves;
        self
    }

    pub fn anchor_moves(&self) -> &[Command] {
        &self.anchor_moves
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        let wanted = normalize_label(name);
        self.entries
            .iter()
            .find(|(entry, _)| normalize_label(entry) == wanted)
            .map(|(_, index)| *index)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn require(&self, name: &str) -> Result<usize> {
        self.index_of(name)
            .ok_or_else(|| Error::UnknownTarget(name.to_string()))
    }
}

impl<S: RemoteSession> Navigator<S> {
    /// Moves menu focus from the anchor to `target` by table offset.
    ///
    /// Unknown names are rejected before any key is sent. Only the anchor is
    /// awaited; the target is read once after the last settled move, and not
    /// ending on it is an [`Error::AssertionFailed`], not a search outcome.
    pub fn resolve_menu<A>(
        &mut self,
        accessor: &A,
        target: &str,
        anchor: &str,
        table: &MenuTable,
        step_budget: usize,
    ) -> Result<FocusToken>
    where
        A: FocusAccessor<S> + ?Sized,
    {
        let target_index = table.require(target)?;
        let anchor_index = table.require(anchor)?;

        for command in table.anchor_moves().to_vec() {
            self.send(command)?;
        }
        let anchor_token = FocusToken::new(anchor);
        let at_anchor =
            self.await_token(accessor, &anchor_token, self.config.focus_timeout_ms)?;
        if !at_anchor.matches_label(&anchor_token) {
            self.trace_search_line(format!(
                "[menu] anchor_missing anchor={anchor_token} actual={at_anchor}"
            ));
            return Err(Error::AssertionFailed {
                target: accessor.describe(),
                expected: anchor_token.to_string(),
                actual: at_anchor.to_string(),
                context: "menu anchor not focused".into(),
            });
        }

        let direction = if target_index > anchor_index {
            Direction::Right
        } else {
            Direction::Left
        };
        let steps = target_index.abs_diff(anchor_index).min(step_budget);
        let target_token = FocusToken::new(target);

        for _ in 0..steps {
            if accessor.read(&self.session)?.matches_label(&target_token) {
                break;
            }
            self.send(direction.into())?;
        }

        let last = accessor.read(&self.session)?;
        if !last.matches_label(&target_token) {
            self.trace_search_line(format!(
                "[menu] unresolved target={target_token} direction={direction} steps={steps} last={last}"
            ));
            return Err(Error::AssertionFailed {
                target: accessor.describe(),
                expected: target_token.to_string(),
                actual: last.to_string(),
                context: format!("menu moved {direction} {steps} step(s) from {anchor:?}"),
            });
        }

        self.trace_search_line(format!(
            "[menu] resolved target={target_token} direction={direction} steps={steps}"
        ));
        Ok(last)
    }
}
