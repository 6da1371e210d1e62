use form_spec::{
    FormRecord, RecordError, ScopedValidation, catalog, validate_all, validate_field,
};
use serde_json::json;

fn loan_record() -> FormRecord {
    FormRecord::new(catalog::loan())
}

#[test]
fn defaults_are_seeded() {
    let record = loan_record();
    assert_eq!(record.form_id(), "loan");
    assert_eq!(record.entries("bankReferences").len(), 1);
    assert_eq!(record.text("bankReferences.0.phone"), "");

    let checkout = FormRecord::new(catalog::checkout());
    assert_eq!(checkout.value("sameBillingShipping"), Some(&json!(true)));
}

#[test]
fn removing_an_entry_renumbers_later_errors() {
    let spec = catalog::loan();
    let references = spec.field("bankReferences").expect("bank references");
    let mut record = loan_record();
    assert_eq!(record.append_entry(references).expect("append"), 1);
    assert_eq!(record.append_entry(references).expect("append"), 2);
    record
        .set_entry_value("bankReferences", 1, "phone", json!("bad!"))
        .expect("set");
    record
        .set_entry_value("bankReferences", 2, "phone", json!("worse!"))
        .expect("set");
    record
        .set_entry_value("bankReferences", 2, "institution", json!("Centenary"))
        .expect("set");

    let mut scoped = ScopedValidation::default();
    scoped.fields.insert(
        "bankReferences".into(),
        validate_field(spec, "bankReferences", &record),
    );
    record.apply(&scoped);
    assert!(record.error("bankReferences.1.phone").is_some());
    assert!(record.error("bankReferences.2.phone").is_some());

    let removed = record.remove_entry("bankReferences", 1).expect("remove");
    assert_eq!(removed["phone"], "bad!");
    assert_eq!(record.entries("bankReferences").len(), 2);
    assert_eq!(record.text("bankReferences.1.institution"), "Centenary");

    let moved = record
        .error("bankReferences.1.phone")
        .expect("error follows its entry");
    assert_eq!(moved.path, "bankReferences.1.phone");
    assert!(record.error("bankReferences.2.phone").is_none());
}

#[test]
fn entry_operations_report_bad_targets() {
    let spec = catalog::loan();
    let mut record = loan_record();
    assert_eq!(
        record.remove_entry("bankReferences", 3),
        Err(RecordError::IndexOutOfRange {
            field: "bankReferences".into(),
            index: 3,
            len: 1,
        })
    );

    let email = spec.field("email").expect("email");
    assert_eq!(
        record.append_entry(email),
        Err(RecordError::NotAList("email".into()))
    );
}

#[test]
fn apply_replaces_only_evaluated_state() {
    let spec = catalog::checkout();
    let mut record = FormRecord::new(spec);
    record.set_value("method", json!("card"));
    record.apply(&validate_all(spec, &record));
    assert!(record.error("name").is_some());
    assert!(record.error("cvc").is_some());

    record.set_value("name", json!("Jane"));
    let mut scoped = ScopedValidation::default();
    scoped
        .fields
        .insert("name".into(), validate_field(spec, "name", &record));
    record.apply(&scoped);
    assert!(record.error("name").is_none());
    assert!(record.error("email").is_some());
    assert!(record.error("cvc").is_some());
}
