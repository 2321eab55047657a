use super::*;

fn menu() -> MenuBar {
    let table = MenuTable::new([("Home", 0), ("Favorites", 1), ("Settings", 2)]).with_anchor_moves(
        vec![
            Command::MoveUp,
            Command::MoveUp,
            Command::MoveLeft,
            Command::MoveLeft,
        ],
    );
    MenuBar::new("nav[data-menu]", table, "Home")
        .with_screen("Home", "[data-screen=home][data-active]")
        .with_screen("Favorites", "[data-screen=favorites][data-active]")
}

fn catalog() -> Rail {
    Rail::new("[data-rail=trending]")
}

fn favorites() -> Favorites {
    Favorites::new(
        "Favorites",
        Rail::new("[data-collection=favorites]"),
        "Home",
        catalog(),
        DetailsPage::new("[data-screen=details][data-active]"),
    )
}

fn tokens(rail: &Rail, nav: &Navigator<TvSession>) -> Result<Vec<String>> {
    Ok(rail
        .items(nav)?
        .into_iter()
        .filter_map(|token| token.as_str().map(str::to_string))
        .collect())
}

#[test]
fn goto_resolves_menu_item_and_waits_for_screen() -> Result<()> {
    let mut nav = tv_navigator()?;
    goto(&mut nav, &menu(), "Favorites")?;
    assert_eq!(nav.session().active_screen()?, Some("favorites".to_string()));
    assert_eq!(nav.session().focused_token()?, Some("Ozark".to_string()));

    goto(&mut nav, &menu(), "home")?;
    assert_eq!(nav.session().active_screen()?, Some("home".to_string()));
    assert_eq!(nav.session().focused_token()?, Some("Dark".to_string()));
    Ok(())
}

#[test]
fn goto_unknown_menu_item_sends_nothing() -> Result<()> {
    let mut nav = tv_navigator()?;
    let err = goto(&mut nav, &menu(), "Sports").expect_err("Sports is not a menu item");
    assert_eq!(err, Error::UnknownTarget("Sports".into()));
    assert!(nav.session().pressed_keys().is_empty());
    Ok(())
}

#[test]
fn wait_for_load_fails_on_missing_screen() -> Result<()> {
    let mut nav = tv_navigator()?;
    wait_for_load(&mut nav, "[data-screen=home][data-active]", 0)?;
    let err = wait_for_load(&mut nav, "[data-screen=search]", 300)
        .expect_err("no search screen in markup");
    assert!(matches!(err, Error::AssertionFailed { .. }));
    assert_eq!(nav.now_ms(), 300);
    Ok(())
}

#[test]
fn rail_open_selects_item_found_to_the_left() -> Result<()> {
    let mut nav = tv_navigator()?;
    nav.press_sequence("right*2")?;
    let rail = catalog();
    assert!(rail.contains(&nav, "ozark")?);
    assert!(!rail.contains(&nav, "Narcos")?);

    let token = rail.open(&mut nav, "Dark")?;
    assert_eq!(token, FocusToken::new("Dark"));
    nav.session_mut().flush()?;
    assert_eq!(nav.session().active_screen()?, Some("details".to_string()));
    assert_eq!(
        DetailsPage::new("[data-screen=details][data-active]").title(&nav)?,
        Some("Dark".to_string())
    );
    Ok(())
}

#[test]
fn rail_open_missing_item_reports_search_outcome() -> Result<()> {
    let mut nav = tv_navigator()?;
    match catalog().open(&mut nav, "Narcos") {
        Err(Error::AssertionFailed {
            expected,
            actual,
            context,
            ..
        }) => {
            assert_eq!(expected, "Narcos");
            assert_eq!(actual, "\"Dark\"");
            assert!(context.contains("end_of_collection"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert_eq!(nav.session().active_screen()?, Some("home".to_string()));
    Ok(())
}

#[test]
fn rail_enter_moves_down_into_collection() -> Result<()> {
    let mut nav = tv_navigator()?;
    let kids = Rail::new("[data-rail=kids]");
    assert!(!kids.has_focus(&nav)?);
    kids.enter(&mut nav)?;
    assert!(kids.has_focus(&nav)?);
    assert_eq!(nav.focused(kids.accessor())?, FocusToken::new("Bluey"));
    Ok(())
}

#[test]
fn details_page_toggles_favorite_state() -> Result<()> {
    let mut nav = tv_navigator()?;
    catalog().open(&mut nav, "Lupin")?;
    let details = DetailsPage::new("[data-screen=details][data-active]");
    details.wait(&mut nav)?;
    assert!(!details.is_favorite(&nav)?);

    assert!(details.toggle_favorite(&mut nav)?);
    assert!(details.is_favorite(&nav)?);
    assert!(!details.toggle_favorite(&mut nav)?);

    details.back(&mut nav)?;
    assert_eq!(nav.session().active_screen()?, Some("home".to_string()));
    Ok(())
}

#[test]
fn ensure_contains_adds_missing_favorite_once() -> Result<()> {
    let mut nav = tv_navigator()?;
    let menu = menu();
    let favorites = favorites();

    assert!(favorites.ensure_contains(&mut nav, &menu, "Dark")?);
    assert_eq!(tokens(favorites.rail(), &nav)?, vec!["Ozark", "Dark"]);

    assert!(!favorites.ensure_contains(&mut nav, &menu, "dark")?);
    assert!(!favorites.ensure_contains(&mut nav, &menu, "Ozark")?);
    assert_eq!(tokens(favorites.rail(), &nav)?, vec!["Ozark", "Dark"]);
    Ok(())
}

#[test]
fn remove_deletes_favorites_through_edit_mode() -> Result<()> {
    let mut nav = tv_navigator()?;
    let menu = menu();
    let favorites = favorites();
    favorites.ensure_contains(&mut nav, &menu, "Lupin")?;

    favorites.remove(&mut nav, &menu, "Ozark")?;
    assert_eq!(tokens(favorites.rail(), &nav)?, vec!["Lupin"]);
    assert!(!nav.session().exists("[data-editing]")?);

    favorites.remove(&mut nav, &menu, "Lupin")?;
    assert!(tokens(favorites.rail(), &nav)?.is_empty());
    assert_eq!(nav.session().focused_token()?, Some("Home".to_string()));

    let err = favorites
        .remove(&mut nav, &menu, "Lupin")
        .expect_err("nothing left to remove");
    assert!(matches!(err, Error::AssertionFailed { .. }));
    Ok(())
}
