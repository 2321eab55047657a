use super::*;

/// Fixed top menu, driven by table offsets from its anchor item.
#[derive(Debug, Clone)]
pub struct MenuBar {
    accessor: DomFocusAccessor,
    table: MenuTable,
    anchor: String,
    step_budget: usize,
    screens: BTreeMap<String, String>,
}

impl MenuBar {
    pub fn new(container: &str, table: MenuTable, anchor: &str) -> Self {
        let step_budget = table.len().max(1);
        Self {
            accessor: DomFocusAccessor::new(container).with_item("[role=menuitem]"),
            table,
            anchor: anchor.to_string(),
            step_budget,
            screens: BTreeMap::new(),
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

    /// Selector that shows up once the screen behind `item` has loaded.
    pub fn with_screen(mut self, item: &str, selector: &str) -> Self {
        self.screens
            .insert(normalize_label(item), selector.to_string());
        self
    }

    pub fn accessor(&self) -> &DomFocusAccessor {
        &self.accessor
    }

    pub fn table(&self) -> &MenuTable {
        &self.table
    }

    pub fn screen_selector(&self, item: &str) -> Option<&str> {
        self.screens.get(&normalize_label(item)).map(String::as_str)
    }

    pub fn focus<S: TvPage>(&self, navigator: &mut Navigator<S>, item: &str) -> Result<FocusToken> {
        navigator.resolve_menu(
            &self.accessor,
            item,
            &self.anchor,
            &self.table,
            self.step_budget,
        )
    }

    pub fn select<S: TvPage>(&self, navigator: &mut Navigator<S>, item: &str) -> Result<()> {
        self.focus(navigator, item)?;
        navigator.send(Command::Select)
    }
}
