use startup_wizard::shared::clock::ManualClock;
use startup_wizard::shared::logging::WizardLog;
use startup_wizard::storage::{KeyValueStore, MemoryStore};
use startup_wizard::submit::{
    SubmissionPayload, SubmitTransport, TransportError, TransportResponse,
};
use startup_wizard::validation::REQUIRED_MESSAGE;
use startup_wizard::wizard::{
    FormInputs, InMemoryForm, StepDefinition, StepStatus, WizardController, WizardDefinition,
    WizardError, SNAPSHOT_KEY,
};
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use tempfile::tempdir;

const NOW: i64 = 1_700_000_000_000;
const HOUR_SECS: i64 = 60 * 60;
const DESCRIPTION: &str =
    "We build payment terminals for neighbourhood shops across Latin America.";

type TestWizard = WizardController<MemoryStore, InMemoryForm>;

fn step_one_values() -> Vec<(&'static str, &'static str)> {
    vec![
        ("company_name", "Acme Labs"),
        ("tagline", "Payments for small shops"),
        ("description", DESCRIPTION),
    ]
}

fn all_required_values() -> Vec<(&'static str, &'static str)> {
    let mut values = step_one_values();
    values.push(("industry", "Fintech"));
    values.push(("business_model", "SaaS subscriptions"));
    values
}

fn wizard_with(values: &[(&'static str, &'static str)]) -> (TestWizard, ManualClock) {
    wizard_with_store(values, MemoryStore::new())
}

fn wizard_with_store(
    values: &[(&'static str, &'static str)],
    store: MemoryStore,
) -> (TestWizard, ManualClock) {
    let clock = ManualClock::starting_at(NOW);
    let controller = WizardController::new(
        WizardDefinition::startup(),
        store,
        InMemoryForm::with_values(values.iter().copied()),
    )
    .expect("valid definition")
    .with_clock(clock.clone());
    (controller, clock)
}

struct FakeTransport {
    response: Result<TransportResponse, String>,
    calls: RefCell<Vec<SubmissionPayload>>,
}

impl FakeTransport {
    fn responding(status: u16, redirect: Option<&str>) -> Self {
        Self {
            response: Ok(TransportResponse {
                status,
                redirect: redirect.map(str::to_string),
            }),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn failing(message: &str) -> Self {
        Self {
            response: Err(message.to_string()),
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl SubmitTransport for FakeTransport {
    fn post(&self, payload: &SubmissionPayload) -> Result<TransportResponse, TransportError> {
        self.calls.borrow_mut().push(payload.clone());
        match &self.response {
            Ok(response) => Ok(response.clone()),
            Err(message) => Err(TransportError::Request {
                url: "http://wizard.test/create/".to_string(),
                message: message.clone(),
            }),
        }
    }
}

#[test]
fn advance_requires_every_required_field_of_the_step() {
    let (mut wizard, _clock) = wizard_with(&[]);

    assert!(!wizard.advance());
    assert_eq!(wizard.current_step(), 1);
    assert_eq!(
        wizard.errors().get("company_name").map(String::as_str),
        Some(REQUIRED_MESSAGE)
    );
    assert!(wizard.errors().contains_key("tagline"));
    assert!(wizard.errors().contains_key("description"));
    assert!(!wizard.errors().contains_key("founded_date"));
    assert_eq!(wizard.store().get(SNAPSHOT_KEY).expect("get"), None);

    for (name, value) in step_one_values() {
        wizard.input(name, value);
    }
    assert!(wizard.advance());
    assert_eq!(wizard.current_step(), 2);
    assert!(wizard.errors().is_empty());
    assert!(wizard.store().get(SNAPSHOT_KEY).expect("get").is_some());
    assert_eq!(
        wizard.fields().get("company_name").map(String::as_str),
        Some("Acme Labs")
    );
}

#[test]
fn advance_is_blocked_by_a_field_rule_failure() {
    let (mut wizard, _clock) = wizard_with(&[
        ("company_name", "Acme Labs"),
        ("tagline", "short"),
        ("description", DESCRIPTION),
    ]);

    assert!(!wizard.advance());
    assert_eq!(wizard.current_step(), 1);
    assert_eq!(
        wizard.errors().get("tagline").map(String::as_str),
        Some("Tagline must be at least 10 characters")
    );
    assert_eq!(wizard.errors().len(), 1);
}

#[test]
fn optional_fields_with_bad_values_also_block_their_step() {
    let (mut wizard, _clock) = wizard_with(&step_one_values());
    assert!(wizard.advance());

    wizard.input("website", "not a url");
    assert!(!wizard.advance());
    assert_eq!(wizard.current_step(), 2);

    wizard.input("website", "https://acme.example");
    assert!(wizard.advance());
    assert_eq!(wizard.current_step(), 3);
}

#[test]
fn validate_field_reports_short_tagline_but_accepts_two_letter_name() {
    let (mut wizard, _clock) = wizard_with(&[("company_name", "AB"), ("tagline", "short")]);

    assert!(wizard.validate_field("tagline").is_some());
    assert_eq!(wizard.validate_field("company_name"), None);
    assert!(wizard.errors().contains_key("tagline"));
    assert!(!wizard.errors().contains_key("company_name"));
    assert_eq!(
        wizard.inputs().displayed_error("tagline"),
        Some("Tagline must be at least 10 characters")
    );
}

#[test]
fn validate_field_bounds_employee_count() {
    let (mut wizard, _clock) = wizard_with(&[("employees_count", "50000")]);

    assert!(wizard.validate_field("employees_count").is_some());
    assert!(wizard.errors().contains_key("employees_count"));

    wizard.inputs_mut().set_value("employees_count", "25");
    assert_eq!(wizard.validate_field("employees_count"), None);
    assert!(!wizard.errors().contains_key("employees_count"));
    assert_eq!(wizard.inputs().displayed_error("employees_count"), None);
}

#[test]
fn validate_field_replaces_one_message_with_another() {
    let (mut wizard, _clock) = wizard_with(&[]);

    assert_eq!(
        wizard.validate_field("company_name").as_deref(),
        Some(REQUIRED_MESSAGE)
    );
    wizard.input("company_name", "Acme!");
    assert_eq!(
        wizard.errors().get("company_name").map(String::as_str),
        Some("Name contains invalid characters")
    );
    wizard.input("company_name", "Acme");
    assert!(wizard.errors().is_empty());
}

#[test]
fn empty_optional_fields_never_error() {
    let (mut wizard, _clock) = wizard_with(&[]);
    assert_eq!(wizard.validate_field("website"), None);
    assert_eq!(wizard.validate_field("monthly_revenue"), None);
    assert!(wizard.errors().is_empty());
}

#[test]
fn retreat_at_first_step_and_advance_at_last_step_do_not_move() {
    let (mut wizard, _clock) = wizard_with(&all_required_values());

    assert!(!wizard.retreat());
    assert_eq!(wizard.current_step(), 1);
    assert!(wizard.is_first_step());

    for expected in 2..=5 {
        assert!(wizard.advance());
        assert_eq!(wizard.current_step(), expected);
    }
    assert!(wizard.is_last_step());
    assert!(wizard.advance());
    assert_eq!(wizard.current_step(), 5);

    assert!(wizard.retreat());
    assert_eq!(wizard.current_step(), 4);
}

#[test]
fn retreat_needs_no_validation() {
    let (mut wizard, _clock) = wizard_with(&step_one_values());
    assert!(wizard.advance());
    assert!(wizard.advance());
    assert_eq!(wizard.current_step(), 3);

    wizard.inputs_mut().clear("company_name");
    assert!(wizard.retreat());
    assert!(wizard.retreat());
    assert_eq!(wizard.current_step(), 1);
}

#[test]
fn jump_to_succeeds_exactly_when_all_earlier_steps_are_valid() {
    let (mut wizard, _clock) = wizard_with(&step_one_values());

    assert!(wizard.is_step_valid(1));
    assert!(wizard.is_step_valid(2));
    assert!(!wizard.is_step_valid(3));
    assert_eq!(wizard.max_accessible_step(), 3);

    for target in 0..=6 {
        let expected = target >= 1
            && target <= wizard.total_steps()
            && (1..target).all(|step| wizard.is_step_valid(step));
        assert_eq!(wizard.jump_to(target), expected, "target {target}");
    }

    assert!(wizard.jump_to(3));
    assert_eq!(wizard.current_step(), 3);
    assert!(!wizard.jump_to(4));
    assert_eq!(wizard.current_step(), 3);
}

#[test]
fn jump_gate_stops_at_an_invalid_optional_field() {
    let (mut wizard, _clock) = wizard_with(&step_one_values());
    wizard.inputs_mut().set_value("website", "acme");

    assert_eq!(wizard.max_accessible_step(), 2);
    assert!(!wizard.jump_to(3));
    assert!(wizard.errors().is_empty(), "gate checks must not record errors");
}

#[test]
fn jump_gate_opens_every_step_when_all_fields_pass() {
    let (mut wizard, _clock) = wizard_with(&all_required_values());
    assert_eq!(wizard.max_accessible_step(), 5);
    assert!(wizard.jump_to(5));
    assert!(wizard.jump_to(1));
}

#[test]
fn persist_then_restore_reproduces_fields_and_step() {
    let (mut wizard, clock) = wizard_with(&step_one_values());
    assert!(wizard.advance());
    wizard.input("website", "https://acme.example");
    assert!(wizard.advance());
    wizard.persist().expect("persist");
    let saved_fields = wizard.fields().clone();
    let saved_step = wizard.current_step();

    let (store, _) = wizard.into_parts();
    clock.advance_secs(HOUR_SECS);
    let mut resumed = WizardController::new(
        WizardDefinition::startup(),
        store,
        InMemoryForm::new(),
    )
    .expect("valid definition")
    .with_clock(clock.clone());

    assert!(resumed.restore());
    assert_eq!(resumed.current_step(), saved_step);
    assert_eq!(resumed.fields(), &saved_fields);
    assert_eq!(
        resumed.inputs().value("company_name").as_deref(),
        Some("Acme Labs")
    );
    assert_eq!(resumed.state().timestamp, Some(NOW));
}

#[test]
fn advance_saves_the_step_it_validated() {
    let (mut wizard, _clock) = wizard_with(&step_one_values());
    assert!(wizard.advance());

    let raw = wizard
        .store()
        .get(SNAPSHOT_KEY)
        .expect("get")
        .expect("snapshot saved");
    assert!(raw.contains("\"currentStep\":1"));
    assert!(raw.contains("Acme Labs"));
}

#[test]
fn snapshots_older_than_a_day_are_ignored() {
    let (mut wizard, _clock) = wizard_with(&step_one_values());
    assert!(wizard.advance());
    wizard.persist().expect("persist");
    let (store, _) = wizard.into_parts();

    let (mut fresh, fresh_clock) = wizard_with_store(&[], store.clone());
    fresh_clock.set(NOW + 24 * HOUR_SECS * 1000 - 1);
    assert!(fresh.restore());

    let (mut stale, stale_clock) = wizard_with_store(&[], store);
    stale_clock.set(NOW + 24 * HOUR_SECS * 1000);
    assert!(!stale.restore());
    assert_eq!(stale.current_step(), 1);
    assert!(stale.fields().is_empty());
    assert_eq!(stale.inputs().value("company_name"), None);
}

#[test]
fn snapshot_age_limit_is_configurable() {
    let (mut wizard, clock) = wizard_with(&step_one_values());
    wizard.persist().expect("persist");
    let (store, _) = wizard.into_parts();

    let mut short_lived = WizardController::new(
        WizardDefinition::startup(),
        store,
        InMemoryForm::new(),
    )
    .expect("valid definition")
    .with_clock(clock.clone())
    .with_snapshot_max_age(std::time::Duration::from_secs(60));
    clock.advance_secs(61);
    assert!(!short_lived.restore());
}

#[test]
fn malformed_snapshots_fall_back_to_defaults() {
    let mut store = MemoryStore::new();
    store.set(SNAPSHOT_KEY, "{broken").expect("set");
    let (mut wizard, _clock) = wizard_with_store(&[], store);
    assert!(!wizard.restore());
    assert_eq!(wizard.current_step(), 1);

    let mut store = MemoryStore::new();
    store
        .set(SNAPSHOT_KEY, r#"{"currentStep":3,"form":{}}"#)
        .expect("set");
    let (mut wizard, _clock) = wizard_with_store(&[], store);
    assert!(!wizard.restore(), "snapshot without timestamp is discarded");
}

#[test]
fn restore_clamps_out_of_range_steps_and_shows_saved_errors() {
    let mut store = MemoryStore::new();
    store
        .set(
            SNAPSHOT_KEY,
            &format!(
                r#"{{"currentStep":12,"form":{{"tagline":"short"}},"errors":{{"tagline":"too short"}},"timestamp":{NOW}}}"#
            ),
        )
        .expect("set");
    let (mut wizard, _clock) = wizard_with_store(&[], store);

    assert!(wizard.restore());
    assert_eq!(wizard.current_step(), 5);
    assert_eq!(wizard.inputs().displayed_error("tagline"), Some("too short"));
}

#[test]
fn successful_submit_clears_the_saved_draft() {
    let (mut wizard, clock) = wizard_with(&step_one_values());
    wizard.input("website", "https://acme.example");
    let transport = FakeTransport::responding(200, Some("http://wizard.test/startups/42/"));

    let outcome = wizard.submit(&transport).expect("submit succeeds");
    assert_eq!(
        outcome.redirect.as_deref(),
        Some("http://wizard.test/startups/42/")
    );
    assert_eq!(wizard.store().get(SNAPSHOT_KEY).expect("get"), None);
    assert!(!wizard.is_submitting());

    let calls = transport.calls.borrow();
    assert_eq!(calls.len(), 1);
    assert_eq!(
        calls[0].fields.get("company_name").map(String::as_str),
        Some("Acme Labs")
    );
    assert_eq!(
        calls[0].fields.get("website").map(String::as_str),
        Some("https://acme.example")
    );

    clock.advance_secs(120);
    assert!(!wizard.tick(), "autosave must stop after submission");
    assert_eq!(wizard.store().get(SNAPSHOT_KEY).expect("get"), None);
}

#[test]
fn server_rejection_keeps_state_for_a_retry() {
    let (mut wizard, _clock) = wizard_with(&step_one_values());
    let transport = FakeTransport::responding(500, None);

    let err = wizard.submit(&transport).expect_err("server error");
    assert!(matches!(err, WizardError::Server { status: 500 }));
    assert!(err.is_retryable());
    assert!(wizard.store().get(SNAPSHOT_KEY).expect("get").is_some());
    assert_eq!(
        wizard.fields().get("tagline").map(String::as_str),
        Some("Payments for small shops")
    );

    let retry = FakeTransport::responding(201, None);
    let outcome = wizard.submit(&retry).expect("retry succeeds");
    assert_eq!(outcome.redirect, None);
}

#[test]
fn transport_failure_is_reported_as_retryable() {
    let (mut wizard, _clock) = wizard_with(&step_one_values());
    let transport = FakeTransport::failing("connection refused");

    match wizard.submit(&transport) {
        Err(err @ WizardError::Transport(_)) => {
            assert!(err.is_retryable());
            assert!(err.to_string().contains("connection refused"));
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(wizard.store().get(SNAPSHOT_KEY).expect("get").is_some());
    assert_eq!(wizard.current_step(), 1);
}

fn assert_send<T: Send>() {}

#[test]
fn controller_can_move_to_a_worker_thread_for_submission() {
    assert_send::<TestWizard>();
    let (wizard, _clock) = wizard_with(&step_one_values());

    let worker = std::thread::spawn(move || {
        let mut wizard = wizard;
        let transport = FakeTransport::responding(200, Some("/startups/3/"));
        let outcome = wizard.submit(&transport);
        (wizard, outcome)
    });
    let (wizard, outcome) = worker.join().expect("join worker");

    assert_eq!(
        outcome.expect("submit succeeds").redirect.as_deref(),
        Some("/startups/3/")
    );
    assert_eq!(wizard.store().get(SNAPSHOT_KEY).expect("get"), None);
}

#[test]
fn pending_submission_is_visible_while_the_post_runs_elsewhere() {
    let (mut wizard, clock) = wizard_with(&step_one_values());

    let payload = wizard.begin_submit().expect("begin submit");
    assert!(wizard.is_submitting());
    assert!(matches!(
        wizard.begin_submit(),
        Err(WizardError::SubmitInProgress)
    ));
    let idle = FakeTransport::responding(200, None);
    assert!(matches!(
        wizard.submit(&idle),
        Err(WizardError::SubmitInProgress)
    ));
    assert!(idle.calls.borrow().is_empty());

    let worker = std::thread::spawn(move || {
        FakeTransport::responding(201, Some("/startups/9/")).post(&payload)
    });
    assert_eq!(wizard.input("stage", "seed"), None);
    clock.advance_secs(30);
    assert!(wizard.tick(), "autosave keeps running while the post is pending");
    let result = worker.join().expect("join worker");

    let outcome = wizard.finish_submit(result).expect("finish submit");
    assert!(!wizard.is_submitting());
    assert_eq!(outcome.redirect.as_deref(), Some("/startups/9/"));
    assert_eq!(wizard.store().get(SNAPSHOT_KEY).expect("get"), None);
}

#[test]
fn failed_finish_allows_a_new_submission() {
    let (mut wizard, _clock) = wizard_with(&step_one_values());

    wizard.begin_submit().expect("begin submit");
    let err = wizard
        .finish_submit(Ok(TransportResponse {
            status: 502,
            redirect: None,
        }))
        .expect_err("bad gateway");
    assert!(matches!(err, WizardError::Server { status: 502 }));
    assert!(!wizard.is_submitting());

    let payload = wizard.begin_submit().expect("second attempt");
    assert_eq!(
        payload.fields.get("company_name").map(String::as_str),
        Some("Acme Labs")
    );
}

#[test]
fn submit_with_invalid_step_never_reaches_the_transport() {
    let (mut wizard, _clock) = wizard_with(&[("company_name", "Acme Labs")]);
    let transport = FakeTransport::responding(200, None);

    match wizard.submit(&transport) {
        Err(WizardError::Validation { fields }) => {
            assert_eq!(fields, vec!["tagline".to_string(), "description".to_string()]);
        }
        other => panic!("unexpected result: {other:?}"),
    }
    assert!(transport.calls.borrow().is_empty());
}

#[test]
fn autosave_ticks_every_interval_until_teardown() {
    let (mut wizard, clock) = wizard_with(&[]);

    clock.advance_secs(29);
    assert!(!wizard.tick());
    assert_eq!(wizard.store().get(SNAPSHOT_KEY).expect("get"), None);

    clock.advance_secs(1);
    assert!(wizard.tick());
    assert!(wizard.store().get(SNAPSHOT_KEY).expect("get").is_some());
    assert!(!wizard.tick());

    wizard.teardown();
    clock.advance_secs(3600);
    assert!(!wizard.tick());
}

#[test]
fn explicit_saves_push_back_the_autosave() {
    let (mut wizard, clock) = wizard_with(&[]);
    clock.advance_secs(20);
    wizard.persist().expect("persist");
    clock.advance_secs(20);
    assert!(!wizard.tick());
    clock.advance_secs(10);
    assert!(wizard.tick());
}

#[test]
fn progress_reflects_filled_and_error_free_fields() {
    let (mut wizard, _clock) = wizard_with(&[
        ("company_name", "Acme Labs"),
        ("tagline", "Payments for small shops"),
    ]);

    assert_eq!(wizard.step_progress(), 50);
    assert_eq!(wizard.overall_progress(), 40);
    assert_eq!(wizard.position_progress(), 20);

    wizard.input("tagline", "short");
    assert_eq!(wizard.step_progress(), 25);
    assert_eq!(wizard.overall_progress(), 20);
}

#[test]
fn review_step_counts_as_complete() {
    let (mut wizard, _clock) = wizard_with(&all_required_values());
    assert!(wizard.jump_to(5));
    assert_eq!(wizard.step_progress(), 100);
    assert_eq!(wizard.overall_progress(), 100);
    assert_eq!(wizard.position_progress(), 100);
}

#[test]
fn step_status_marks_earlier_steps_by_validity() {
    let (mut wizard, _clock) = wizard_with(&step_one_values());
    assert!(wizard.jump_to(3));

    assert_eq!(wizard.step_status(1), StepStatus::Completed);
    assert_eq!(wizard.step_status(2), StepStatus::Completed);
    assert_eq!(wizard.step_status(3), StepStatus::Current);
    assert_eq!(wizard.step_status(4), StepStatus::Pending);

    wizard.inputs_mut().clear("tagline");
    assert_eq!(wizard.step_status(1), StepStatus::Error);
}

#[test]
fn uploads_must_be_small_images() {
    let (mut wizard, _clock) = wizard_with(&[]);

    assert!(wizard.check_upload("logo", "logo.png", "image/png", 512 * 1024));
    assert_eq!(
        wizard.fields().get("logo").map(String::as_str),
        Some("logo.png")
    );

    assert!(!wizard.check_upload("cover_image", "deck.pdf", "application/pdf", 10));
    assert_eq!(
        wizard.errors().get("cover_image").map(String::as_str),
        Some("Please select a valid image")
    );

    assert!(!wizard.check_upload("cover_image", "cover.jpg", "image/jpeg", 3 * 1024 * 1024));
    assert_eq!(
        wizard.errors().get("cover_image").map(String::as_str),
        Some("The image must be smaller than 2MB")
    );

    assert!(wizard.check_upload("cover_image", "cover.jpg", "image/jpeg", 1024));
    assert!(!wizard.errors().contains_key("cover_image"));
}

#[test]
fn custom_definitions_and_rules_drive_the_same_machine() {
    let definition = WizardDefinition {
        steps: vec![
            StepDefinition {
                index: 1,
                title: "Basics".to_string(),
                subtitle: String::new(),
                fields: vec!["company_name".to_string(), "tagline".to_string()],
                required: BTreeSet::from(["company_name".to_string(), "tagline".to_string()]),
            },
            StepDefinition {
                index: 2,
                title: "Industry".to_string(),
                subtitle: String::new(),
                fields: vec!["industry".to_string()],
                required: BTreeSet::from(["industry".to_string()]),
            },
            StepDefinition {
                index: 3,
                title: "Done".to_string(),
                subtitle: String::new(),
                fields: Vec::new(),
                required: BTreeSet::new(),
            },
        ],
        rules: BTreeMap::new(),
    };
    let mut wizard = WizardController::new(
        definition,
        MemoryStore::new(),
        InMemoryForm::with_values([("company_name", "X"), ("tagline", "ok")]),
    )
    .expect("valid definition")
    .with_rule("industry", |_: &str, value: &str| {
        (value != "Fintech" && value != "Health").then(|| "Pick a listed industry".to_string())
    });

    assert_eq!(wizard.total_steps(), 3);
    assert!(wizard.advance(), "no rules beyond required-ness for step 1");
    wizard.input("industry", "Mining");
    assert!(!wizard.advance());
    wizard.input("industry", "Health");
    assert!(wizard.advance());
    assert!(wizard.is_last_step());
}

#[test]
fn invalid_definitions_are_rejected_at_construction() {
    let mut definition = WizardDefinition::startup();
    definition.steps.clear();
    let result = WizardController::new(definition, MemoryStore::new(), InMemoryForm::new());
    assert!(matches!(result, Err(WizardError::Definition(_))));
}

#[test]
fn controller_events_are_logged_as_json_lines() {
    let temp = tempdir().expect("tempdir");
    let log_path = temp.path().join("logs/wizard.log");
    let (wizard, _clock) = wizard_with(&step_one_values());
    let mut wizard = wizard.with_log(WizardLog::new(&log_path));

    assert!(wizard.advance());
    wizard.retreat();
    wizard.inputs_mut().clear("company_name");
    assert!(!wizard.advance());

    let log = fs::read_to_string(&log_path).expect("read log");
    assert!(log.contains("\"event\":\"wizard.persist\""));
    assert!(log.contains("\"event\":\"wizard.advance\""));
    assert!(log.contains("\"message\":\"step 2 of 5\""));
    assert!(log.contains("\"event\":\"wizard.validation_failed\""));
    assert!(log
        .lines()
        .all(|line| serde_json::from_str::<serde_json::Value>(line).is_ok()));
}
