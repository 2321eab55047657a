use remote_tester::{
    Command, DetailsPage, DomFocusAccessor, Error, Favorites, FocusToken, MenuBar, MenuTable,
    Navigator, NavigatorConfig, PageQuery, Rail, Result, TvSession, goto,
};

const APP_HTML: &str = r#"
<!DOCTYPE html>
<html>
<body>
  <nav data-nav="horizontal" data-menu data-entry-index="0">
    <a role="menuitem" data-goto="home">Home</a>
    <a role="menuitem" data-goto="library">Library</a>
    <a role="menuitem" data-goto="favorites">My List</a>
  </nav>
  <main data-screen="home" data-active>
    <div data-nav="horizontal" data-rail="continue">
      <div role="listitem" data-testid="show-dark" data-goto="details" data-focused>Dark</div>
      <div role="listitem" data-testid="show-ozark" data-goto="details">Ozark</div>
    </div>
    <div data-nav="horizontal" data-rail="popular">
      <div role="listitem" data-testid="show-lupin" data-goto="details">Lupin</div>
      <div role="listitem" data-testid="show-narcos" data-goto="details">Narcos</div>
      <div role="listitem" data-testid="show-elite" data-goto="details">Elite</div>
      <div role="listitem" data-testid="show-money-heist" data-goto="details">Money Heist</div>
    </div>
  </main>
  <main data-screen="library">
    <p>Nothing here yet</p>
  </main>
  <main data-screen="details">
    <h2 data-bind="context"></h2>
    <div data-nav="horizontal">
      <button data-action="play">Play</button>
      <button data-action="trailer">Trailer</button>
      <button data-action="favorite" aria-pressed="false">Add to My List</button>
    </div>
  </main>
  <main data-screen="favorites">
    <div data-nav="horizontal" data-collection="favorites" data-editable></div>
  </main>
</body>
</html>
"#;

fn navigator() -> Result<Navigator<TvSession>> {
    let mut session = TvSession::from_html(APP_HTML)?;
    session.set_trace_stderr(false);
    let config = NavigatorConfig {
        settle_ms: 60,
        poll_interval_ms: 20,
        focus_timeout_ms: 400,
        long_press_ms: 1_200,
    };
    let mut navigator = Navigator::with_config(session, config)?;
    navigator.set_trace_stderr(false);
    Ok(navigator)
}

fn menu() -> MenuBar {
    let table = MenuTable::new([("Home", 0), ("Library", 1), ("My List", 2)]).with_anchor_moves(
        vec![
            Command::MoveUp,
            Command::MoveUp,
            Command::MoveUp,
            Command::MoveLeft,
            Command::MoveLeft,
        ],
    );
    MenuBar::new("nav[data-menu]", table, "Home")
        .with_accessor(
            DomFocusAccessor::new("nav[data-menu]")
                .with_item("[role=menuitem]")
                .with_source(remote_tester::TokenSource::Text),
        )
        .with_screen("Home", "[data-screen=home][data-active]")
        .with_screen("Library", "[data-screen=library][data-active]")
        .with_screen("My List", "[data-screen=favorites][data-active]")
}

fn my_list() -> Favorites {
    Favorites::new(
        "My List",
        Rail::new("[data-collection=favorites]").with_step_budget(10),
        "Home",
        Rail::new("[data-rail=popular]").with_step_budget(10),
        DetailsPage::new("[data-screen=details][data-active]"),
    )
}

#[test]
fn favorites_round_trip_through_remote_keys() -> Result<()> {
    let mut nav = navigator()?;
    let menu = menu();
    let favorites = my_list();

    assert!(favorites.ensure_contains(&mut nav, &menu, "show-elite")?);
    assert!(favorites.ensure_contains(&mut nav, &menu, "show-money-heist")?);
    assert!(!favorites.ensure_contains(&mut nav, &menu, "SHOW-ELITE")?);
    assert_eq!(
        favorites.rail().items(&nav)?,
        vec![
            FocusToken::new("show-elite"),
            FocusToken::new("show-money-heist"),
        ]
    );

    favorites.remove(&mut nav, &menu, "show-money-heist")?;
    assert_eq!(
        favorites.rail().items(&nav)?,
        vec![FocusToken::new("show-elite")]
    );
    assert!(!nav.session().exists("[data-editing]")?);
    Ok(())
}

#[test]
fn screen_without_focusable_items_keeps_menu_focus() -> Result<()> {
    let mut nav = navigator()?;
    let menu = menu();
    goto(&mut nav, &menu, "Library")?;
    assert_eq!(nav.focused(menu.accessor())?, FocusToken::new("Library"));
    goto(&mut nav, &menu, "Home")?;
    assert_eq!(
        nav.session().focused_token()?,
        Some("show-dark".to_string())
    );
    Ok(())
}

#[test]
fn missing_catalog_item_fails_with_context() -> Result<()> {
    let mut nav = navigator()?;
    let err = my_list()
        .ensure_contains(&mut nav, &menu(), "show-you")
        .expect_err("show-you is not in the catalog");
    match err {
        Error::AssertionFailed { context, .. } => {
            assert!(context.contains("not found"), "context={context}");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    Ok(())
}

#[test]
fn virtual_clock_only_advances_through_navigator_waits() -> Result<()> {
    let mut nav = navigator()?;
    assert_eq!(nav.now_ms(), 0);
    nav.press_sequence("right, down")?;
    assert_eq!(nav.now_ms(), 120);
    assert_eq!(
        nav.session().focused_token()?,
        Some("show-lupin".to_string())
    );
    Ok(())
}
