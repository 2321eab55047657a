use super::*;

/// Favorites screen, filled from a catalog rail through the details page.
#[derive(Debug, Clone)]
pub struct Favorites {
    menu_item: String,
    rail: Rail,
    catalog_menu_item: String,
    catalog: Rail,
    details: DetailsPage,
}

impl Favorites {
    pub fn new(
        menu_item: &str,
        rail: Rail,
        catalog_menu_item: &str,
        catalog: Rail,
        details: DetailsPage,
    ) -> Self {
        Self {
            menu_item: menu_item.to_string(),
            rail,
            catalog_menu_item: catalog_menu_item.to_string(),
            catalog,
            details,
        }
    }

    pub fn rail(&self) -> &Rail {
        &self.rail
    }

    pub fn open<S: TvPage>(&self, navigator: &mut Navigator<S>, menu: &MenuBar) -> Result<()> {
        goto(navigator, menu, &self.menu_item)
    }

    /// Makes sure `item` is a favorite. Returns `true` when it had to be added.
    pub fn ensure_contains<S: TvPage>(
        &self,
        navigator: &mut Navigator<S>,
        menu: &MenuBar,
        item: &str,
    ) -> Result<bool> {
        self.open(navigator, menu)?;
        if self.rail.contains(navigator, item)? {
            return Ok(false);
        }

        goto(navigator, menu, &self.catalog_menu_item)?;
        self.catalog.open(navigator, item)?;
        self.details.wait(navigator)?;
        if !self.details.is_favorite(navigator)? {
            self.details.toggle_favorite(navigator)?;
        }
        self.details.back(navigator)?;

        self.open(navigator, menu)?;
        if !self.rail.contains(navigator, item)? {
            return Err(Error::AssertionFailed {
                target: self.rail.accessor().item_selector(),
                expected: item.to_string(),
                actual: "missing".into(),
                context: "favorite toggled but item not listed".into(),
            });
        }
        Ok(true)
    }

    /// Deletes `item` through long-press edit mode.
    pub fn remove<S: TvPage>(
        &self,
        navigator: &mut Navigator<S>,
        menu: &MenuBar,
        item: &str,
    ) -> Result<()> {
        self.open(navigator, menu)?;
        let outcome = self.rail.locate(navigator, item)?;
        if !outcome.is_found() {
            return Err(not_found_error(
                self.rail.accessor().focused_selector(),
                item,
                &outcome,
            ));
        }

        navigator.long_press(Command::Select)?;
        navigator.send(Command::Select)?;
        let editing = format!("{}[data-editing]", self.rail.container());
        if navigator.session().exists(&editing)? {
            navigator.send(Command::Back)?;
        }

        let timeout_ms = navigator.config().focus_timeout_ms;
        let rail = self.rail.clone();
        let wanted = FocusToken::new(item);
        let gone = navigator.wait_until(timeout_ms, |session| {
            Ok(!rail
                .accessor()
                .items(session)?
                .iter()
                .any(|token| token.matches_label(&wanted)))
        })?;
        if !gone {
            return Err(Error::AssertionFailed {
                target: self.rail.accessor().item_selector(),
                expected: format!("{item} removed"),
                actual: "still listed".into(),
                context: "long-press edit mode did not delete the item".into(),
            });
        }
        Ok(())
    }
}
