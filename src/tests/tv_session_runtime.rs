use super::*;

fn focused(session: &TvSession) -> Result<String> {
    Ok(session.focused_token()?.unwrap_or_default())
}

#[test]
fn arrow_key_takes_effect_after_transition_delay() -> Result<()> {
    let mut s = tv_session()?;
    s.press_key(KEY_RIGHT)?;
    assert_eq!(focused(&s)?, "Dark");
    assert_eq!(
        s.pending_tasks(),
        vec![PendingTask {
            due_at: 40,
            order: 0,
            action: "move_right".into(),
        }]
    );

    s.advance_time(39)?;
    assert_eq!(focused(&s)?, "Dark");
    s.advance_time(1)?;
    assert_eq!(focused(&s)?, "Ozark");
    assert!(s.pending_tasks().is_empty());
    Ok(())
}

#[test]
fn focus_clamps_at_collection_ends() -> Result<()> {
    let mut s = tv_session()?;
    for _ in 0..4 {
        s.press_key(KEY_RIGHT)?;
    }
    s.flush()?;
    assert_eq!(focused(&s)?, "Lupin");
    assert_eq!(s.now_ms(), 40);

    s.press_key(KEY_LEFT)?;
    s.press_key(KEY_LEFT)?;
    s.press_key(KEY_LEFT)?;
    s.flush()?;
    assert_eq!(focused(&s)?, "Dark");
    Ok(())
}

#[test]
fn cross_axis_moves_restore_remembered_index() -> Result<()> {
    let mut s = tv_session()?;
    for key in [KEY_RIGHT, KEY_DOWN, KEY_RIGHT] {
        s.press_key(key)?;
        s.advance_time(50)?;
    }
    assert_eq!(focused(&s)?, "Peppa");

    s.press_key(KEY_UP)?;
    s.advance_time(50)?;
    assert_eq!(focused(&s)?, "Ozark");

    s.press_key(KEY_DOWN)?;
    s.advance_time(50)?;
    assert_eq!(focused(&s)?, "Peppa");

    s.press_key(KEY_UP)?;
    s.press_key(KEY_UP)?;
    s.press_key(KEY_UP)?;
    s.flush()?;
    assert_eq!(focused(&s)?, "Home");
    Ok(())
}

#[test]
fn select_opens_details_and_back_restores_focus() -> Result<()> {
    let mut s = tv_session()?;
    s.press_key(KEY_RIGHT)?;
    s.press_key(KEY_SELECT)?;
    s.flush()?;

    assert_eq!(s.active_screen()?, Some("details".to_string()));
    assert_eq!(s.context_item(), Some("Ozark"));
    assert_eq!(s.text("[data-screen=details] [data-bind=context]")?, "Ozark");
    assert_eq!(focused(&s)?, "Play");

    s.press_key(KEY_BACK)?;
    s.flush()?;
    assert_eq!(s.active_screen()?, Some("home".to_string()));
    s.assert_focused("ozark")?;
    Ok(())
}

#[test]
fn back_at_root_keeps_screen() -> Result<()> {
    let mut s = tv_session()?;
    s.press_key(KEY_BACK)?;
    s.flush()?;
    assert_eq!(s.active_screen()?, Some("home".to_string()));
    assert_eq!(focused(&s)?, "Dark");
    Ok(())
}

#[test]
fn only_escape_acts_as_back() -> Result<()> {
    let mut s = tv_session()?;
    s.press_key(KEY_SELECT)?;
    s.flush()?;
    assert_eq!(s.active_screen()?, Some("details".to_string()));

    s.press_key("Backspace")?;
    assert!(s.pending_tasks().is_empty());
    s.flush()?;
    assert_eq!(s.active_screen()?, Some("details".to_string()));

    s.press_key(KEY_BACK)?;
    s.flush()?;
    assert_eq!(s.active_screen()?, Some("home".to_string()));
    Ok(())
}

#[test]
fn favorite_button_toggles_context_item() -> Result<()> {
    let mut s = tv_session()?;
    s.press_key(KEY_SELECT)?;
    s.flush()?;
    assert_eq!(
        s.attr("[data-action=favorite]", "aria-pressed")?,
        Some("false".to_string())
    );

    s.press_key(KEY_RIGHT)?;
    s.press_key(KEY_SELECT)?;
    s.flush()?;
    assert_eq!(
        s.attr("[data-action=favorite]", "aria-pressed")?,
        Some("true".to_string())
    );
    let favorites = s.query_all("[data-collection=favorites] [role=listitem]")?;
    let tokens = favorites
        .iter()
        .filter_map(|item| item.attr("data-testid"))
        .collect::<Vec<_>>();
    assert_eq!(tokens, vec!["Ozark", "Dark"]);
    assert!(!favorites[1].has_attr("data-focused"));
    assert_eq!(favorites[1].text.trim(), "Dark, 3 seasons");

    s.press_key(KEY_SELECT)?;
    s.flush()?;
    assert_eq!(
        s.attr("[data-action=favorite]", "aria-pressed")?,
        Some("false".to_string())
    );
    assert_eq!(
        s.query_all("[data-collection=favorites] [role=listitem]")?
            .len(),
        1
    );
    Ok(())
}

fn open_favorites(s: &mut TvSession) -> Result<()> {
    for key in [KEY_UP, KEY_RIGHT, KEY_SELECT] {
        s.press_key(key)?;
        s.flush()?;
    }
    assert_eq!(s.active_screen()?, Some("favorites".to_string()));
    Ok(())
}

fn long_press_select(s: &mut TvSession) -> Result<()> {
    s.key_down(KEY_SELECT)?;
    s.advance_time(900)?;
    s.key_up(KEY_SELECT)?;
    s.flush()
}

#[test]
fn long_press_enters_edit_mode_and_select_deletes() -> Result<()> {
    let mut s = tv_session()?;
    open_favorites(&mut s)?;
    assert_eq!(focused(&s)?, "Ozark");

    long_press_select(&mut s)?;
    assert!(s.exists("[data-collection=favorites][data-editing]")?);

    s.press_key(KEY_SELECT)?;
    s.flush()?;
    assert!(!s.exists("[data-collection=favorites] [role=listitem]")?);
    assert!(!s.exists("[data-collection=favorites][data-editing]")?);
    assert_eq!(focused(&s)?, "Home");
    Ok(())
}

#[test]
fn back_leaves_edit_mode_before_history() -> Result<()> {
    let mut s = tv_session()?;
    open_favorites(&mut s)?;
    long_press_select(&mut s)?;

    s.press_key(KEY_BACK)?;
    s.flush()?;
    assert!(!s.exists("[data-editing]")?);
    assert_eq!(s.active_screen()?, Some("favorites".to_string()));

    s.press_key(KEY_BACK)?;
    s.flush()?;
    assert_eq!(s.active_screen()?, Some("home".to_string()));
    Ok(())
}

#[test]
fn short_press_or_non_editable_container_ignores_edit_mode() -> Result<()> {
    let mut s = tv_session()?;
    long_press_select(&mut s)?;
    assert!(!s.exists("[data-editing]")?);
    assert_eq!(s.active_screen()?, Some("home".to_string()));

    s.set_long_press_ms(2_000)?;
    open_favorites(&mut s)?;
    long_press_select(&mut s)?;
    assert!(!s.exists("[data-editing]")?);
    assert_eq!(s.active_screen()?, Some("details".to_string()));
    Ok(())
}

#[test]
fn frozen_focus_accepts_keys_without_moving() -> Result<()> {
    let mut s = tv_session()?;
    s.freeze_focus(true);
    s.press_key(KEY_RIGHT)?;
    s.flush()?;
    assert_eq!(focused(&s)?, "Dark");
    assert_eq!(s.pressed_keys(), &[KEY_RIGHT.to_string()]);

    s.freeze_focus(false);
    s.press_key(KEY_RIGHT)?;
    s.flush()?;
    assert_eq!(focused(&s)?, "Ozark");
    Ok(())
}

#[test]
fn unmapped_keys_schedule_nothing() -> Result<()> {
    let mut s = tv_session()?;
    s.press_key("KeyA")?;
    assert!(s.pending_tasks().is_empty());
    assert_eq!(s.pressed_keys(), &["KeyA".to_string()]);
    assert!(matches!(s.press_key(" "), Err(Error::UnknownKey(_))));
    Ok(())
}

#[test]
fn transitions_run_in_due_order() -> Result<()> {
    let mut s = tv_session()?;
    s.set_transition_ms(100)?;
    s.press_key(KEY_RIGHT)?;
    s.set_transition_ms(10)?;
    s.press_key(KEY_DOWN)?;
    let due = s
        .pending_tasks()
        .into_iter()
        .map(|task| (task.due_at, task.action))
        .collect::<Vec<_>>();
    assert_eq!(
        due,
        vec![(10, "move_down".to_string()), (100, "move_right".to_string())]
    );

    s.flush()?;
    assert_eq!(focused(&s)?, "Peppa");
    assert_eq!(s.now_ms(), 100);
    Ok(())
}

#[test]
fn timer_step_limit_stops_runaway_queues() -> Result<()> {
    let mut s = tv_session()?;
    s.set_timer_step_limit(2)?;
    for _ in 0..3 {
        s.press_key(KEY_RIGHT)?;
    }
    match s.flush() {
        Err(Error::Session(msg)) => assert!(msg.contains("task queue exceeded max steps")),
        other => panic!("unexpected flush result: {other:?}"),
    }
    Ok(())
}

#[test]
fn invalid_session_settings_are_rejected() -> Result<()> {
    let mut s = tv_session()?;
    assert!(matches!(s.advance_time(-1), Err(Error::InvalidConfig(_))));
    assert!(matches!(s.sleep(-5), Err(Error::InvalidConfig(_))));
    assert!(s.set_transition_ms(-1).is_err());
    assert!(s.set_long_press_ms(0).is_err());
    assert!(s.set_timer_step_limit(0).is_err());
    assert!(s.set_trace_log_limit(0).is_err());
    Ok(())
}

#[test]
fn markup_without_markers_gets_default_screen_and_focus() -> Result<()> {
    let s = TvSession::from_html(
        r#"
        <section data-screen="a"><ul data-nav="vertical"><li>One</li><li>Two</li></ul></section>
        <section data-screen="b"><ul data-nav="vertical"><li>Three</li></ul></section>
        "#,
    )?;
    assert_eq!(s.active_screen()?, Some("a".to_string()));
    assert_eq!(s.focused_token()?, Some("One".to_string()));
    Ok(())
}

#[test]
fn vertical_container_moves_on_up_and_down() -> Result<()> {
    let mut s = TvSession::from_html(
        r#"
        <ul data-nav="vertical"><li>One</li><li>Two</li><li>Three</li></ul>
        <ul data-nav="vertical" data-entry-index="1"><li>Four</li><li>Five</li></ul>
        "#,
    )?;
    s.press_key(KEY_DOWN)?;
    s.press_key(KEY_DOWN)?;
    s.press_key(KEY_RIGHT)?;
    s.flush()?;
    assert_eq!(s.focused_token()?, Some("Five".to_string()));
    Ok(())
}

#[test]
fn assert_focused_reports_actual_token() -> Result<()> {
    let s = tv_session()?;
    s.assert_focused(" dark ")?;
    match s.assert_focused("Lupin") {
        Err(Error::AssertionFailed {
            expected,
            actual,
            context,
            ..
        }) => {
            assert_eq!(expected, "Lupin");
            assert_eq!(actual, "Dark");
            assert!(context.contains("data-testid=\"Dark\""));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    Ok(())
}

#[test]
fn session_trace_records_keys_and_timers() -> Result<()> {
    let mut s = tv_session()?;
    s.enable_trace(true);
    s.press_key(KEY_RIGHT)?;
    s.advance_time(40)?;
    let logs = s.take_trace_logs();
    assert!(logs.iter().any(|line| line.starts_with("[key] up key=ArrowRight")));
    assert!(
        logs.iter()
            .any(|line| line.contains("[timer] schedule action=move_right due_at=40"))
    );
    assert!(logs.iter().any(|line| line.contains("[key] focus token=\"Ozark\"")));
    assert!(s.take_trace_logs().is_empty());

    s.set_trace_timers(false);
    s.set_trace_keys(false);
    s.press_key(KEY_RIGHT)?;
    s.flush()?;
    assert!(s.take_trace_logs().is_empty());
    Ok(())
}
