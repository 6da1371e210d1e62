use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use form_flow::{
    CountryContext, FlowError, FormSession, Phase, SubmitGate, SubmitOutcome, SubmitReceipt,
    SubmitTransport, Transition, TransportError,
};
use form_spec::{FileDescriptor, StepKind, catalog};
use serde_json::{Value, json};

#[derive(Default)]
struct RecordingTransport {
    calls: Mutex<Vec<(String, Value)>>,
    fail: bool,
}

impl RecordingTransport {
    fn failing() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl SubmitTransport for RecordingTransport {
    async fn submit(&self, form_id: &str, record: &Value) -> Result<SubmitReceipt, TransportError> {
        self.calls
            .lock()
            .expect("lock")
            .push((form_id.to_string(), record.clone()));
        if self.fail {
            return Err(TransportError::Unavailable("gateway timeout".into()));
        }
        Ok(SubmitReceipt {
            reference: "ORD-1".into(),
            message: None,
        })
    }
}

/// Never answers.
struct StalledTransport;

#[async_trait]
impl SubmitTransport for StalledTransport {
    async fn submit(&self, _form_id: &str, _record: &Value) -> Result<SubmitReceipt, TransportError> {
        std::future::pending().await
    }
}

fn checkout_session() -> FormSession<'static> {
    FormSession::new(catalog::checkout(), CountryContext::default()).expect("checkout is valid")
}

fn fill_personal(session: &mut FormSession<'_>) {
    session.set_text("name", "Jane").expect("name");
    session.set_text("email", "jane@example.com").expect("email");
    session.set_text("phone", "0772123456").expect("phone");
}

fn fill_shipping(session: &mut FormSession<'_>) {
    session.set_text("address", "Plot 12 Kampala Road").expect("address");
    session.set_text("city", "Kampala").expect("city");
    session.set_text("zip", "256").expect("zip");
    session.set_text("state", "Central").expect("state");
}

fn walk_to_review(session: &mut FormSession<'_>) {
    assert!(matches!(session.advance().expect("advance"), Transition::Moved { from: 1, to: 2 }));
    fill_personal(session);
    assert!(matches!(session.advance().expect("advance"), Transition::Moved { from: 2, to: 3 }));
    fill_shipping(session);
    assert!(matches!(session.advance().expect("advance"), Transition::Moved { from: 3, to: 4 }));
    session.set_text("method", "cod").expect("method");
    assert!(matches!(session.advance().expect("advance"), Transition::Moved { from: 4, to: 5 }));
}

#[test]
fn product_step_advances_without_validation() {
    let mut session = checkout_session();
    let view = session.view();
    assert_eq!(view.kind, StepKind::Display);
    assert_eq!(
        view.content.as_ref().map(|content| content.heading.as_str()),
        Some("Pure Glow Cream")
    );
    assert!(!view.can_retreat);

    let transition = session.advance().expect("advance");
    assert_eq!(transition, Transition::Moved { from: 1, to: 2 });
    assert!(!session.record().has_errors());
}

#[test]
fn personal_step_gates_on_its_own_fields() {
    let mut session = checkout_session();
    session.advance().expect("advance");

    let transition = session.advance().expect("advance");
    let Transition::Blocked { step, errors } = transition else {
        panic!("expected a blocked transition, got {transition:?}");
    };
    assert_eq!(step, 2);
    assert_eq!(session.current_step(), 2);
    let paths: Vec<&str> = errors.iter().map(|error| error.path.as_str()).collect();
    assert_eq!(paths, vec!["name", "email", "phone"]);
    assert_eq!(
        session.record().error("name").map(|error| error.message.as_str()),
        Some("Name is required")
    );
    assert!(session.record().error("address").is_none());

    fill_personal(&mut session);
    assert!(!session.record().has_errors());
    assert_eq!(
        session.advance().expect("advance"),
        Transition::Moved { from: 2, to: 3 }
    );
}

#[test]
fn fixing_one_field_clears_only_its_error() {
    let mut session = checkout_session();
    session.advance().expect("advance");
    session.advance().expect("advance");

    session.set_text("name", "Jane").expect("name");
    assert!(session.record().error("name").is_none());
    assert!(session.record().error("email").is_some());
    assert!(session.record().error("phone").is_some());

    session.set_text("name", "J").expect("name");
    assert_eq!(
        session.record().error("name").map(|error| error.message.as_str()),
        Some("Name is required")
    );
}

#[test]
fn untouched_fields_do_not_validate_on_change() {
    let mut session = checkout_session();
    session.advance().expect("advance");
    session.set_text("email", "not-an-email").expect("email");
    assert!(session.record().error("email").is_none());
}

#[test]
fn retreat_keeps_values_and_errors() {
    let mut session = checkout_session();
    session.advance().expect("advance");
    session.advance().expect("advance");
    session.set_text("name", "Jane").expect("name");

    assert_eq!(
        session.retreat().expect("retreat"),
        Transition::Moved { from: 2, to: 1 }
    );
    assert_eq!(session.retreat().expect("retreat"), Transition::Stayed);
    assert_eq!(session.record().text("name"), "Jane");
    assert!(session.record().error("email").is_some());
}

#[test]
fn phone_uses_selected_country_code() {
    let country = CountryContext::default();
    let mut session =
        FormSession::new(catalog::checkout(), country.clone()).expect("checkout is valid");
    session.set_text("phone", "0772 123 456").expect("phone");
    assert_eq!(session.record().text("phone"), "+256772123456");

    country.select("ke").expect("known country");
    session.set_text("phone", "0712345678").expect("phone");
    assert_eq!(session.record().text("phone"), "+254712345678");

    assert!(matches!(
        country.select("XX"),
        Err(FlowError::UnknownCountry(_))
    ));
    assert_eq!(country.selected(), "KE");
}

#[test]
fn card_details_are_required_only_for_card_payments() {
    let mut session = checkout_session();
    walk_to_review(&mut session);
    session.retreat().expect("retreat");

    session.set_text("method", "card").expect("method");
    assert_eq!(
        session.record().error("cvc").map(|error| error.message.as_str()),
        Some("All card details are required for card payment")
    );
    let view = session.view();
    let card = view
        .fields
        .iter()
        .find(|field| field.id == "cardNumber")
        .expect("card number is owned by the payment step");
    assert!(card.active);

    let transition = session.advance().expect("advance");
    assert!(matches!(transition, Transition::Blocked { step: 4, .. }));

    session.set_text("cardNumber", "4242424242424242").expect("card");
    assert_eq!(session.record().text("cardNumber"), "4242 4242 4242 4242");
    session.set_text("expiry", "1230").expect("expiry");
    session.blur("expiry").expect("blur");
    session.set_text("cvc", "123").expect("cvc");
    assert!(!session.record().has_errors());
    assert_eq!(
        session.advance().expect("advance"),
        Transition::Moved { from: 4, to: 5 }
    );

    session.retreat().expect("retreat");
    session.set_text("method", "cod").expect("method");
    session.set_text("cvc", "").expect("cvc");
    assert!(!session.record().has_errors());
}

#[test]
fn expiry_waits_for_blur() {
    let mut session = checkout_session();
    walk_to_review(&mut session);
    session.retreat().expect("retreat");
    session.set_text("method", "card").expect("method");

    session.set_text("expiry", "13").expect("expiry");
    session.set_text("expiry", "133").expect("expiry");
    assert_eq!(session.record().text("expiry"), "13 / 3");
    assert!(session.record().field_errors().get("expiry").is_none());

    session.blur("expiry").expect("blur");
    assert_eq!(
        session
            .record()
            .field_errors()
            .get("expiry")
            .map(|error| error.message.as_str()),
        Some("Use MM/YY format")
    );
}

#[test]
fn separate_billing_needs_an_address() {
    let mut session = checkout_session();
    walk_to_review(&mut session);
    session.retreat().expect("retreat");

    session.set_text("sameBillingShipping", "false").expect("flag");
    assert_eq!(
        session
            .record()
            .error("billingAddress")
            .map(|error| error.message.as_str()),
        Some("Please enter separate billing address information")
    );
    session.set_text("billingAddress", "PO Box 1").expect("address");
    session.set_text("billingState", "Central").expect("state");
    assert!(session.record().error("billingAddress").is_none());
}

#[test]
fn review_shows_snapshot_and_summary() {
    let mut session = checkout_session();
    walk_to_review(&mut session);

    let view = session.view();
    assert!(view.terminal);
    assert!(view.can_submit);
    assert!(!view.can_advance);
    let snapshot = view.snapshot.expect("terminal step carries a snapshot");
    assert_eq!(snapshot["name"], "Jane");
    assert_eq!(snapshot["zip"], 256);

    let method = view
        .summary
        .iter()
        .find(|line| line.field == "method")
        .expect("payment method line");
    assert_eq!(method.value, "Cash on Delivery");
    assert!(view.summary.iter().all(|line| line.field != "cardNumber"));
    assert!(view.outstanding_errors.is_empty());
}

#[test]
fn submit_is_refused_before_the_last_step() {
    let mut session = checkout_session();
    let err = session.begin_submit().expect_err("not terminal");
    assert!(matches!(
        err,
        FlowError::NotAtTerminalStep {
            current: 1,
            total: 5
        }
    ));
}

#[tokio::test]
async fn checkout_submits_exactly_once() {
    let mut session = checkout_session();
    walk_to_review(&mut session);
    let transport = RecordingTransport::default();

    let outcome = session.submit(&transport).await.expect("submit");
    let SubmitOutcome::Accepted(receipt) = outcome else {
        panic!("expected acceptance, got {outcome:?}");
    };
    assert_eq!(receipt.reference, "ORD-1");
    assert_eq!(session.phase(), Phase::Submitted);

    let calls = transport.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "checkout");
    assert_eq!(calls[0].1["phone"], "+256772123456");
    assert_eq!(calls[0].1["method"], "cod");

    let err = session.submit(&transport).await.expect_err("already submitted");
    assert!(matches!(err, FlowError::AlreadySubmitted));
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn invalid_record_never_reaches_the_transport() {
    let mut session = checkout_session();
    walk_to_review(&mut session);
    session.retreat().expect("retreat");
    session.retreat().expect("retreat");
    session.set_text("city", "").expect("city");
    session.retreat().expect("retreat");
    session.retreat().expect("retreat");
    assert_eq!(session.current_step(), 1);
    for _ in 0..4 {
        session.advance().expect("advance");
    }
    assert_eq!(session.current_step(), 3, "shipping step blocks");

    session.set_text("city", "Kampala").expect("city");
    session.advance().expect("advance");
    session.advance().expect("advance");
    session.set_text("email", "broken").expect("email");

    let transport = RecordingTransport::default();
    let outcome = session.submit(&transport).await.expect("submit");
    let SubmitOutcome::Rejected(report) = outcome else {
        panic!("expected rejection, got {outcome:?}");
    };
    assert!(!report.valid);
    assert_eq!(report.errors[0].path, "email");
    assert!(transport.calls().is_empty());
    assert_eq!(session.phase(), Phase::Editing);
    assert_eq!(session.current_step(), 5);
}

#[tokio::test]
async fn transport_failure_is_surfaced_and_editing_resumes() {
    let mut session = checkout_session();
    walk_to_review(&mut session);
    let before = session.record().snapshot();
    let transport = RecordingTransport::failing();

    let err = session.submit(&transport).await.expect_err("transport fails");
    assert!(matches!(
        err,
        FlowError::Transport(TransportError::Unavailable(_))
    ));
    assert_eq!(session.phase(), Phase::Editing);
    assert_eq!(session.record().snapshot(), before);
    assert!(!session.record().has_errors());
    assert_eq!(transport.calls().len(), 1);
}

#[tokio::test]
async fn abandoned_submission_returns_to_editing() {
    let mut session = checkout_session();
    walk_to_review(&mut session);

    let attempt =
        tokio::time::timeout(Duration::from_millis(20), session.submit(&StalledTransport)).await;
    assert!(attempt.is_err(), "stalled transport cannot answer");
    assert_eq!(session.phase(), Phase::Editing);
    assert!(session.can_submit());

    let transport = RecordingTransport::default();
    let outcome = session.submit(&transport).await.expect("retry");
    assert!(matches!(outcome, SubmitOutcome::Accepted(_)));
    assert_eq!(transport.calls().len(), 1);
}

#[test]
fn choice_and_flag_values_are_stored_canonically() {
    let mut session = checkout_session();
    session.set_text("method", "  card ").expect("method");
    assert_eq!(session.record().value("method"), Some(&json!("card")));
    session.set_value("method", json!(" cod")).expect("method");
    assert_eq!(session.record().value("method"), Some(&json!("cod")));

    session
        .set_value("sameBillingShipping", json!("false"))
        .expect("flag");
    assert_eq!(
        session.record().value("sameBillingShipping"),
        Some(&json!(false))
    );
    session.set_text("sameBillingShipping", "Yes").expect("flag");
    assert_eq!(
        session.record().value("sameBillingShipping"),
        Some(&json!(true))
    );

    session.set_value("method", json!("cheque")).expect("method");
    assert_eq!(session.record().value("method"), Some(&json!("cheque")));
}

#[test]
fn pending_submission_blocks_edits_and_navigation() {
    let mut session = checkout_session();
    walk_to_review(&mut session);

    let gate = session.begin_submit().expect("gate");
    assert!(matches!(gate, SubmitGate::Ready(_)));
    assert_eq!(session.phase(), Phase::Pending);
    assert!(!session.can_submit());

    assert!(matches!(
        session.set_text("name", "Other"),
        Err(FlowError::SubmitPending)
    ));
    assert!(matches!(session.retreat(), Err(FlowError::SubmitPending)));
    assert!(matches!(
        session.begin_submit(),
        Err(FlowError::SubmitPending)
    ));

    let receipt = session
        .finish_submit(Ok(SubmitReceipt {
            reference: "ORD-2".into(),
            message: Some("queued".into()),
        }))
        .expect("finish");
    assert_eq!(receipt.reference, "ORD-2");
    assert!(matches!(
        session.finish_submit(Err(TransportError::Rejected("late".into()))),
        Err(FlowError::NotPending)
    ));
}

#[test]
fn clearing_the_bank_statement_reports_required() {
    let mut session =
        FormSession::new(catalog::loan(), CountryContext::default()).expect("loan is valid");
    session
        .set_file(
            "bankStatement",
            Some(FileDescriptor::new("statement.pdf", "application/pdf", 2048)),
        )
        .expect("select");
    assert!(session.record().error("bankStatement").is_none());

    session.set_file("bankStatement", None).expect("clear");
    assert_eq!(
        session
            .record()
            .error("bankStatement")
            .map(|error| error.message.as_str()),
        Some("Bank statement is required")
    );

    session
        .set_file(
            "bankStatement",
            Some(FileDescriptor::new("statement.docx", "application/msword", 10)),
        )
        .expect("select");
    assert_eq!(
        session
            .record()
            .error("bankStatement")
            .map(|error| error.message.as_str()),
        Some("Only PDF, PNG, or JPEG formats are allowed")
    );
}

#[test]
fn bank_references_renumber_on_removal() {
    let mut session =
        FormSession::new(catalog::loan(), CountryContext::default()).expect("loan is valid");
    assert_eq!(session.record().entries("bankReferences").len(), 1);

    assert_eq!(session.append_entry("bankReferences").expect("append"), 1);
    assert_eq!(session.append_entry("bankReferences").expect("append"), 2);
    session
        .set_entry_text("bankReferences", 2, "phone", "abc")
        .expect("phone");
    session
        .set_entry_text("bankReferences", 2, "institution", "Stanbic")
        .expect("institution");

    let gate = session.begin_submit().expect("gate");
    assert!(matches!(gate, SubmitGate::Rejected(_)));
    assert_eq!(session.phase(), Phase::Editing);
    assert!(session.record().error("bankReferences.2.phone").is_some());

    session.remove_entry("bankReferences", 0).expect("remove");
    assert_eq!(session.record().entries("bankReferences").len(), 2);
    assert_eq!(session.record().text("bankReferences.1.institution"), "Stanbic");
    assert!(session.record().error("bankReferences.2.phone").is_none());
    assert_eq!(
        session
            .record()
            .error("bankReferences.1.phone")
            .map(|error| error.message.as_str()),
        Some("Please enter a valid phone number including country code")
    );
}

#[test]
fn years_of_experience_is_floored_on_blur() {
    let mut session =
        FormSession::new(catalog::loan(), CountryContext::default()).expect("loan is valid");
    session.set_text("yearsExperience", "4.8").expect("years");
    assert_eq!(session.record().value("yearsExperience"), Some(&json!(4.8)));
    session.blur("yearsExperience").expect("blur");
    assert_eq!(session.record().value("yearsExperience"), Some(&json!(4)));
}

#[test]
fn other_purpose_is_disclosed_by_loan_purpose() {
    let mut session =
        FormSession::new(catalog::loan(), CountryContext::default()).expect("loan is valid");
    let active = |session: &FormSession<'_>| {
        session
            .view()
            .fields
            .iter()
            .find(|field| field.id == "otherPurpose")
            .map(|field| field.active)
    };
    assert_eq!(active(&session), Some(false));
    session.set_text("loanPurpose", "Other").expect("purpose");
    assert_eq!(active(&session), Some(true));
}
