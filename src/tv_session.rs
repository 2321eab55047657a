use super::*;
use crate::dom::{Dom, NodeId};
use crate::html::parse_html;
use crate::trace::TraceLog;

const FOCUSED_ATTR: &str = "data-focused";
const ACTIVE_ATTR: &str = "data-active";
const EDITING_ATTR: &str = "data-editing";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTask {
    pub due_at: i64,
    pub order: i64,
    pub action: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UiAction {
    Move(Direction),
    Select,
    LongSelect,
    Back,
}

impl fmt::Display for UiAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Move(direction) => write!(f, "move_{direction}"),
            Self::Select => f.write_str("select"),
            Self::LongSelect => f.write_str("long_select"),
            Self::Back => f.write_str("back"),
        }
    }
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    due_at: i64,
    order: i64,
    action: UiAction,
}

/// Deterministic in-process TV page.
///
/// The page is plain HTML. Screens are `[data-screen]` elements (one carries
/// `data-active`), navigable rows and columns are `[data-nav=horizontal]` /
/// `[data-nav=vertical]` containers whose element children are the focusable
/// items, and the focused item carries `data-focused`. Key presses take
/// effect `transition_ms` later on a virtual clock that only moves through
/// [`Clock::sleep`] or [`TvSession::advance_time`].
#[derive(Debug)]
pub struct TvSession {
    dom: Dom,
    now_ms: i64,
    tasks: Vec<ScheduledTask>,
    next_task_order: i64,
    timer_step_limit: usize,
    transition_ms: i64,
    long_press_ms: i64,
    frozen: bool,
    held_keys: HashMap<String, i64>,
    key_log: Vec<String>,
    history: Vec<String>,
    screen_focus: HashMap<String, NodeId>,
    remembered_index: HashMap<NodeId, usize>,
    context_item: Option<String>,
    trace: TraceLog,
    trace_keys: bool,
    trace_timers: bool,
}

impl TvSession {
    pub fn from_html(html: &str) -> Result<Self> {
        let dom = parse_html(html)?;
        let mut session = Self {
            dom,
            now_ms: 0,
            tasks: Vec::new(),
            next_task_order: 0,
            timer_step_limit: 10_000,
            transition_ms: 40,
            long_press_ms: 800,
            frozen: false,
            held_keys: HashMap::new(),
            key_log: Vec::new(),
            history: Vec::new(),
            screen_focus: HashMap::new(),
            remembered_index: HashMap::new(),
            context_item: None,
            trace: TraceLog::default(),
            trace_keys: true,
            trace_timers: true,
        };
        session.initialize()?;
        Ok(session)
    }

    fn initialize(&mut self) -> Result<()> {
        let screens = self.dom.query_selector_all("[data-screen]")?;
        let active = screens
            .iter()
            .copied()
            .find(|screen| self.dom.has_attr(*screen, ACTIVE_ATTR))
            .or_else(|| screens.first().copied());
        for screen in screens {
            if Some(screen) == active {
                self.dom.set_attr(screen, ACTIVE_ATTR, "");
            } else {
                self.dom.remove_attr(screen, ACTIVE_ATTR);
            }
        }

        let focused = self
            .dom
            .query_selector_all("[data-focused]")?
            .into_iter()
            .find(|node| self.is_in_view(*node));
        match focused {
            Some(node) => self.set_focus(node)?,
            None => {
                if let Some(entry) = self.first_entry(None)? {
                    self.set_focus(entry)?;
                }
            }
        }
        Ok(())
    }

    pub fn set_transition_ms(&mut self, transition_ms: i64) -> Result<()> {
        if transition_ms < 0 {
            return Err(Error::InvalidConfig(
                "set_transition_ms requires non-negative milliseconds".into(),
            ));
        }
        self.transition_ms = transition_ms;
        Ok(())
    }

    pub fn set_long_press_ms(&mut self, long_press_ms: i64) -> Result<()> {
        if long_press_ms < 1 {
            return Err(Error::InvalidConfig(
                "set_long_press_ms requires at least 1 millisecond".into(),
            ));
        }
        self.long_press_ms = long_press_ms;
        Ok(())
    }

    pub fn set_timer_step_limit(&mut self, max_steps: usize) -> Result<()> {
        if max_steps == 0 {
            return Err(Error::InvalidConfig(
                "set_timer_step_limit requires at least 1 step".into(),
            ));
        }
        self.timer_step_limit = max_steps;
        Ok(())
    }

    /// While frozen, key presses are accepted but never move focus.
    pub fn freeze_focus(&mut self, frozen: bool) {
        self.frozen = frozen;
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace.enabled = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        self.trace.take()
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace.to_stderr = enabled;
    }

    pub fn set_trace_keys(&mut self, enabled: bool) {
        self.trace_keys = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.trace_timers = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        self.trace.set_limit(max_entries)
    }

    /// Keys released so far, in order.
    pub fn pressed_keys(&self) -> &[String] {
        &self.key_log
    }

    pub fn active_screen(&self) -> Result<Option<String>> {
        let screen = self.dom.query_selector("[data-screen][data-active]")?;
        Ok(screen.and_then(|node| self.dom.attr(node, "data-screen").map(str::to_string)))
    }

    /// Item the current screen was opened for, if any.
    pub fn context_item(&self) -> Option<&str> {
        self.context_item.as_deref()
    }

    pub fn focused_token(&self) -> Result<Option<String>> {
        Ok(self
            .dom
            .query_selector("[data-focused]")?
            .map(|node| self.token_of(node)))
    }

    pub fn text(&self, selector: &str) -> Result<String> {
        let node = self.select_one(selector)?;
        Ok(self.dom.text_content(node))
    }

    pub fn attr(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let node = self.select_one(selector)?;
        Ok(self.dom.attr(node, name).map(str::to_string))
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let node = self.select_one(selector)?;
        Ok(self.dom.dump_node(node))
    }

    pub fn assert_focused(&self, expected: &str) -> Result<()> {
        let actual = self.focused_token()?;
        if actual.as_deref().map(normalize_label) != Some(normalize_label(expected)) {
            let context = match self.dom.query_selector("[data-focused]")? {
                Some(node) => truncate_chars(&self.dom.dump_node(node), 200),
                None => "nothing focused".into(),
            };
            return Err(Error::AssertionFailed {
                target: "[data-focused]".into(),
                expected: expected.to_string(),
                actual: actual.unwrap_or_else(|| "<none>".into()),
                context,
            });
        }
        Ok(())
    }

    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }

    pub fn pending_tasks(&self) -> Vec<PendingTask> {
        let mut tasks = self
            .tasks
            .iter()
            .map(|task| PendingTask {
                due_at: task.due_at,
                order: task.order,
                action: task.action.to_string(),
            })
            .collect::<Vec<_>>();
        tasks.sort_by_key(|task| (task.due_at, task.order));
        tasks
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::InvalidConfig(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let from = self.now_ms;
        self.now_ms = self.now_ms.saturating_add(delta_ms);
        let ran = self.run_task_queue(Some(self.now_ms), false)?;
        self.trace_timer_line(format!(
            "[timer] advance delta_ms={} from={} to={} ran_due={}",
            delta_ms, from, self.now_ms, ran
        ));
        Ok(())
    }

    /// Runs every pending transition, moving the clock to each due time.
    pub fn flush(&mut self) -> Result<()> {
        let from = self.now_ms;
        let ran = self.run_task_queue(None, true)?;
        self.trace_timer_line(format!(
            "[timer] flush from={} to={} ran={}",
            from, self.now_ms, ran
        ));
        Ok(())
    }

    fn run_task_queue(&mut self, due_limit: Option<i64>, advance_clock: bool) -> Result<usize> {
        let mut steps = 0usize;
        while let Some(next_idx) = self.next_task_index(due_limit) {
            steps += 1;
            if steps > self.timer_step_limit {
                return Err(Error::Session(format!(
                    "task queue exceeded max steps: limit={}, now_ms={}, pending_tasks={}",
                    self.timer_step_limit,
                    self.now_ms,
                    self.tasks.len()
                )));
            }
            let task = self.tasks.remove(next_idx);
            if advance_clock && task.due_at > self.now_ms {
                self.now_ms = task.due_at;
            }
            self.execute_task(task)?;
        }
        Ok(steps)
    }

    fn next_task_index(&self, due_limit: Option<i64>) -> Option<usize> {
        self.tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| due_limit.is_none_or(|limit| task.due_at <= limit))
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }

    fn schedule(&mut self, action: UiAction) {
        let due_at = self.now_ms.saturating_add(self.transition_ms);
        let order = self.next_task_order;
        self.next_task_order += 1;
        self.tasks.push(ScheduledTask {
            due_at,
            order,
            action,
        });
        self.trace_timer_line(format!(
            "[timer] schedule action={action} due_at={due_at} delay_ms={}",
            self.transition_ms
        ));
    }

    fn execute_task(&mut self, task: ScheduledTask) -> Result<()> {
        self.trace_timer_line(format!(
            "[timer] run action={} due_at={} now_ms={}",
            task.action, task.due_at, self.now_ms
        ));
        if self.frozen {
            self.trace_key_line(format!("[key] frozen action={} dropped", task.action));
            return Ok(());
        }
        match task.action {
            UiAction::Move(direction) => self.apply_move(direction),
            UiAction::Select => self.apply_select(),
            UiAction::LongSelect => self.apply_long_select(),
            UiAction::Back => self.apply_back(),
        }
    }

    fn apply_move(&mut self, direction: Direction) -> Result<()> {
        let Some(focused) = self.focused_node()? else {
            if let Some(entry) = self.first_entry(None)? {
                self.set_focus(entry)?;
            }
            return Ok(());
        };
        let Some(container) = self.container_of(focused) else {
            return Ok(());
        };

        let horizontal = self.dom.attr(container, "data-nav") != Some("vertical");
        if direction.is_horizontal() == horizontal {
            let items = self.dom.element_children(container);
            let Some(pos) = items.iter().position(|item| *item == focused) else {
                return Ok(());
            };
            let next = if direction.is_forward() {
                pos.checked_add(1).filter(|next| *next < items.len())
            } else {
                pos.checked_sub(1)
            };
            match next {
                Some(next) => self.set_focus(items[next])?,
                None => self.trace_key_line(format!(
                    "[key] clamp direction={direction} token={:?}",
                    self.token_of(focused)
                )),
            }
            return Ok(());
        }

        let containers = self.containers_in_view(None)?;
        let Some(mut idx) = containers.iter().position(|node| *node == container) else {
            return Ok(());
        };
        loop {
            let next = if direction.is_forward() {
                idx.checked_add(1).filter(|next| *next < containers.len())
            } else {
                idx.checked_sub(1)
            };
            let Some(next) = next else {
                self.trace_key_line(format!(
                    "[key] clamp direction={direction} token={:?}",
                    self.token_of(focused)
                ));
                return Ok(());
            };
            if let Some(entry) = self.entry_item(containers[next]) {
                return self.set_focus(entry);
            }
            idx = next;
        }
    }

    fn apply_select(&mut self) -> Result<()> {
        let Some(focused) = self.focused_node()? else {
            return Ok(());
        };
        let container = self.container_of(focused);

        if let Some(container) = container.filter(|node| self.dom.has_attr(*node, EDITING_ATTR)) {
            return self.remove_item(container, focused);
        }

        if let Some(screen) = self.dom.attr(focused, "data-goto").map(str::to_string) {
            let context = self.token_of(focused);
            return self.navigate(&screen, context);
        }

        if self.dom.attr(focused, "data-action") == Some("favorite") {
            return self.toggle_favorite();
        }

        self.trace_key_line(format!(
            "[key] select token={:?} no_action",
            self.token_of(focused)
        ));
        Ok(())
    }

    fn apply_long_select(&mut self) -> Result<()> {
        let Some(focused) = self.focused_node()? else {
            return Ok(());
        };
        let Some(container) = self
            .container_of(focused)
            .filter(|node| self.dom.has_attr(*node, "data-editable"))
        else {
            self.trace_key_line("[key] long_select not_editable".into());
            return Ok(());
        };
        if self.dom.has_attr(container, EDITING_ATTR) {
            self.dom.remove_attr(container, EDITING_ATTR);
            self.trace_key_line("[key] edit_mode off".into());
        } else {
            self.dom.set_attr(container, EDITING_ATTR, "");
            self.trace_key_line("[key] edit_mode on".into());
        }
        Ok(())
    }

    fn apply_back(&mut self) -> Result<()> {
        if let Some(container) = self
            .focused_node()?
            .and_then(|node| self.container_of(node))
            .filter(|node| self.dom.has_attr(*node, EDITING_ATTR))
        {
            self.dom.remove_attr(container, EDITING_ATTR);
            self.trace_key_line("[key] edit_mode off".into());
            return Ok(());
        }

        let Some(previous) = self.history.pop() else {
            self.trace_key_line("[key] back at_root".into());
            return Ok(());
        };
        let Some(screen) = self.screen_node(&previous) else {
            return Ok(());
        };
        self.activate_screen(screen)?;
        let restored = self
            .screen_focus
            .get(&previous)
            .copied()
            .filter(|node| self.dom.is_connected(*node) && self.is_in_view(*node));
        let target = match restored {
            Some(node) => Some(node),
            None => self.first_entry(Some(screen))?,
        };
        if let Some(node) = target {
            self.set_focus(node)?;
        }
        self.trace_key_line(format!("[key] back screen={previous}"));
        Ok(())
    }

    fn navigate(&mut self, name: &str, context: String) -> Result<()> {
        let Some(target) = self.screen_node(name) else {
            self.trace_key_line(format!("[key] goto unknown_screen={name}"));
            return Ok(());
        };

        if let Some(current) = self.active_screen()? {
            if current != name {
                if let Some(focused) = self.focused_node()? {
                    self.screen_focus.insert(current.clone(), focused);
                }
                self.history.push(current);
            }
        }
        self.activate_screen(target)?;

        self.dom.set_attr(target, "data-context", &context);
        for bound in self
            .dom
            .query_selector_all_from(target, "[data-bind=context]")?
        {
            self.dom.set_text_content(bound, &context);
        }
        self.context_item = Some(context);
        self.sync_favorite_buttons()?;

        if let Some(entry) = self.first_entry(Some(target))? {
            self.set_focus(entry)?;
        }
        self.trace_key_line(format!("[key] goto screen={name}"));
        Ok(())
    }

    fn toggle_favorite(&mut self) -> Result<()> {
        let Some(item) = self.context_item.clone() else {
            return Ok(());
        };
        let Some(favorites) = self
            .dom
            .query_selector("[data-collection=favorites]")?
        else {
            return Ok(());
        };

        let existing = self
            .dom
            .element_children(favorites)
            .into_iter()
            .find(|node| self.token_of(*node) == item);
        match existing {
            Some(node) => {
                self.dom.detach(node);
                self.remembered_index.remove(&favorites);
                self.trace_key_line(format!("[key] favorite removed={item}"));
            }
            None => {
                let source = self.find_item_outside(&item, favorites);
                let (tag, mut attrs, text) = match source {
                    Some(node) => (
                        self.dom.tag_name(node).unwrap_or("li").to_string(),
                        self.dom
                            .element(node)
                            .map(|element| element.attrs.clone())
                            .unwrap_or_default(),
                        self.dom.text_content(node),
                    ),
                    None => {
                        let mut attrs = HashMap::new();
                        attrs.insert("role".to_string(), "listitem".to_string());
                        attrs.insert("data-testid".to_string(), item.clone());
                        ("li".to_string(), attrs, item.clone())
                    }
                };
                attrs.remove(FOCUSED_ATTR);
                attrs.remove("id");
                let node = self.dom.create_element(favorites, tag, attrs);
                self.dom.create_text(node, text);
                self.trace_key_line(format!("[key] favorite added={item}"));
            }
        }
        self.sync_favorite_buttons()
    }

    fn remove_item(&mut self, container: NodeId, item: NodeId) -> Result<()> {
        let items = self.dom.element_children(container);
        let pos = items.iter().position(|node| *node == item).unwrap_or(0);
        let token = self.token_of(item);
        self.dom.detach(item);
        self.trace_key_line(format!("[key] removed token={token:?}"));

        let remaining = self.dom.element_children(container);
        if let Some(next) = remaining.get(pos.min(remaining.len().saturating_sub(1))) {
            return self.set_focus(*next);
        }
        self.dom.remove_attr(container, EDITING_ATTR);
        match self.first_entry(None)? {
            Some(entry) => self.set_focus(entry),
            None => Ok(()),
        }
    }

    fn sync_favorite_buttons(&mut self) -> Result<()> {
        let is_favorite = match (&self.context_item, self.dom.query_selector("[data-collection=favorites]")?) {
            (Some(item), Some(favorites)) => self
                .dom
                .element_children(favorites)
                .into_iter()
                .any(|node| self.token_of(node) == *item),
            _ => false,
        };
        for button in self.dom.query_selector_all("[data-action=favorite]")? {
            self.dom
                .set_attr(button, "aria-pressed", if is_favorite { "true" } else { "false" });
        }
        Ok(())
    }

    fn find_item_outside(&self, token: &str, excluded: NodeId) -> Option<NodeId> {
        self.dom.all_elements().find(|node| {
            self.dom.attr(*node, "data-testid") == Some(token)
                && self.dom.is_connected(*node)
                && !self.is_descendant_of(*node, excluded)
        })
    }

    fn is_descendant_of(&self, node: NodeId, ancestor: NodeId) -> bool {
        self.dom
            .ancestors_inclusive(node)
            .skip(1)
            .any(|current| current == ancestor)
    }

    fn screen_node(&self, name: &str) -> Option<NodeId> {
        self.dom
            .all_elements()
            .find(|node| self.dom.attr(*node, "data-screen") == Some(name) && self.dom.is_connected(*node))
    }

    fn activate_screen(&mut self, screen: NodeId) -> Result<()> {
        for other in self.dom.query_selector_all("[data-screen][data-active]")? {
            self.dom.remove_attr(other, ACTIVE_ATTR);
        }
        self.dom.set_attr(screen, ACTIVE_ATTR, "");
        Ok(())
    }

    fn focused_node(&self) -> Result<Option<NodeId>> {
        self.dom.query_selector("[data-focused]")
    }

    fn set_focus(&mut self, node: NodeId) -> Result<()> {
        for previous in self.dom.query_selector_all("[data-focused]")? {
            self.dom.remove_attr(previous, FOCUSED_ATTR);
        }
        self.dom.set_attr(node, FOCUSED_ATTR, "");
        if let Some(container) = self.container_of(node) {
            if let Some(pos) = self
                .dom
                .element_children(container)
                .iter()
                .position(|item| *item == node)
            {
                self.remembered_index.insert(container, pos);
            }
        }
        self.trace_key_line(format!(
            "[key] focus token={:?} now_ms={}",
            self.token_of(node),
            self.now_ms
        ));
        Ok(())
    }

    fn container_of(&self, item: NodeId) -> Option<NodeId> {
        self.dom
            .parent(item)
            .filter(|parent| self.dom.has_attr(*parent, "data-nav"))
    }

    fn is_in_view(&self, node: NodeId) -> bool {
        if !self.dom.is_connected(node) {
            return false;
        }
        self.dom
            .closest_with_attr(node, "data-screen")
            .is_none_or(|screen| self.dom.has_attr(screen, ACTIVE_ATTR))
    }

    fn containers_in_view(&self, within: Option<NodeId>) -> Result<Vec<NodeId>> {
        let candidates = match within {
            Some(root) => self.dom.query_selector_all_from(root, "[data-nav]")?,
            None => self.dom.query_selector_all("[data-nav]")?,
        };
        Ok(candidates
            .into_iter()
            .filter(|node| self.is_in_view(*node))
            .collect())
    }

    fn first_entry(&self, within: Option<NodeId>) -> Result<Option<NodeId>> {
        Ok(self
            .containers_in_view(within)?
            .into_iter()
            .find_map(|container| self.entry_item(container)))
    }

    fn entry_item(&self, container: NodeId) -> Option<NodeId> {
        let items = self.dom.element_children(container);
        if items.is_empty() {
            return None;
        }
        let idx = self
            .dom
            .attr(container, "data-entry-index")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .or_else(|| self.remembered_index.get(&container).copied())
            .unwrap_or(0);
        items.get(idx.min(items.len() - 1)).copied()
    }

    fn token_of(&self, node: NodeId) -> String {
        match self.dom.attr(node, "data-testid") {
            Some(value) => value.to_string(),
            None => self.dom.text_content(node).trim().to_string(),
        }
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn trace_key_line(&mut self, line: String) {
        if self.trace_keys {
            self.trace.line(line);
        }
    }

    fn trace_timer_line(&mut self, line: String) {
        if self.trace_timers {
            self.trace.line(line);
        }
    }
}

impl KeyDispatch for TvSession {
    fn press_key(&mut self, key: &str) -> Result<()> {
        self.key_down(key)?;
        self.key_up(key)
    }

    fn key_down(&mut self, key: &str) -> Result<()> {
        if key.trim().is_empty() {
            return Err(Error::UnknownKey(key.to_string()));
        }
        self.held_keys.entry(key.to_string()).or_insert(self.now_ms);
        self.trace_key_line(format!("[key] down key={key} now_ms={}", self.now_ms));
        Ok(())
    }

    fn key_up(&mut self, key: &str) -> Result<()> {
        if key.trim().is_empty() {
            return Err(Error::UnknownKey(key.to_string()));
        }
        let held_ms = self
            .held_keys
            .remove(key)
            .map(|down_at| self.now_ms.saturating_sub(down_at))
            .unwrap_or(0);
        self.key_log.push(key.to_string());
        self.trace_key_line(format!(
            "[key] up key={key} held_ms={held_ms} now_ms={}",
            self.now_ms
        ));

        let action = if let Some(direction) = Direction::from_key(key) {
            UiAction::Move(direction)
        } else if key == KEY_SELECT {
            if held_ms >= self.long_press_ms {
                UiAction::LongSelect
            } else {
                UiAction::Select
            }
        } else if key == KEY_BACK {
            UiAction::Back
        } else {
            self.trace_key_line(format!("[key] ignored key={key}"));
            return Ok(());
        };
        self.schedule(action);
        Ok(())
    }
}

impl Clock for TvSession {
    fn now_ms(&self) -> i64 {
        self.now_ms
    }

    fn sleep(&mut self, delta_ms: i64) -> Result<()> {
        self.advance_time(delta_ms)
    }
}

impl PageQuery for TvSession {
    fn query_all(&self, selector: &str) -> Result<Vec<ElementSnapshot>> {
        Ok(self
            .dom
            .query_selector_all(selector)?
            .into_iter()
            .filter_map(|node| {
                let element = self.dom.element(node)?;
                Some(ElementSnapshot {
                    tag: element.tag_name.clone(),
                    attrs: element
                        .attrs
                        .iter()
                        .map(|(key, value)| (key.clone(), value.clone()))
                        .collect(),
                    text: self.dom.text_content(node),
                })
            })
            .collect())
    }
}
