//! Integration tests for dry-run mode
//!
//! These tests verify that dry runs never reach the configured backend while
//! the screen still behaves normally.

use dosebook::adapters::store::create_store;
use dosebook::config::parse_config;
use dosebook::domain::PatientKey;
use dosebook::screen::{ActionOutcome, DrugsScreen, LoadOutcome, SaveOutcome, ToolbarAction};
use mockito::Matcher;

#[tokio::test]
async fn test_dry_run_makes_no_http_calls() {
    let mut server = mockito::Server::new_async().await;
    let any = server
        .mock(Matcher::Any, Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let config = parse_config(&format!(
        "[application]\ndry_run = true\n\n[store]\nbase_url = \"{}\"\n",
        server.url()
    ))
    .unwrap();
    let store = create_store(&config).unwrap();
    let mut screen = DrugsScreen::new(store, &config.screen);

    let patient = PatientKey::new("P1").unwrap();
    assert_eq!(screen.load_patient(Some(patient)).await, LoadOutcome::Loaded(0));
    screen.dispatch(ToolbarAction::Add).await;
    screen.edit_form(|form| form.set_name("Insulin"));
    let outcome = screen.dispatch(ToolbarAction::Save).await;

    assert!(matches!(
        outcome,
        ActionOutcome::Save(SaveOutcome::Inserted(_))
    ));
    any.assert_async().await;
}

#[test]
fn test_dry_run_default_is_off() {
    let config = parse_config("[store]\nbase_url = \"https://abc.supabase.co\"\n").unwrap();
    assert!(!config.application.dry_run);
}
