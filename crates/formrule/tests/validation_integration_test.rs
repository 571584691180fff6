//! End-to-end validation behaviour

use formrule::{
    Constraints, FieldValue, FileEntry, FileList, FormValues, Message, MessageArgs, Ref,
    RuleResult, ValidationResult, Validator,
};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

fn files(count: usize) -> FieldValue {
    (0..count)
        .map(|i| FileEntry::new(format!("file{i}.txt"), 10, "text/plain"))
        .collect::<FileList>()
        .into()
}

#[tokio::test]
async fn test_optional_string_accepts_empty_text() {
    let validate = Validator::new().string().compile();
    let result = validate.validate(&FieldValue::from(""), &FormValues::new()).await;
    assert_eq!(result, ValidationResult::Valid);
}

#[tokio::test]
async fn test_async_rules_keep_registration_order() {
    let calls = Arc::new(Mutex::new(Vec::new()));

    let slow = Arc::clone(&calls);
    let fast = Arc::clone(&calls);
    let validate = Validator::new()
        .by_async(move |_, _| {
            let calls = Arc::clone(&slow);
            async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                calls.lock().unwrap().push("slow");
                RuleResult::from("slow failed")
            }
        })
        .by(move |_: &FieldValue, _: &FormValues| {
            fast.lock().unwrap().push("fast");
            "fast failed"
        })
        .compile();

    let result = validate.validate(&FieldValue::from("x"), &FormValues::new()).await;
    assert_eq!(result, ValidationResult::Error("slow failed".into()));
    assert_eq!(*calls.lock().unwrap(), vec!["slow"]);
}

#[tokio::test]
async fn test_async_pass_continues_to_next_rule() {
    let validate = Validator::new()
        .by_async(|value: FieldValue, _| async move {
            tokio::task::yield_now().await;
            value.as_str().is_some()
        })
        .min_length(3)
        .compile();

    let form = FormValues::new();
    assert!(validate.validate(&FieldValue::from("abc"), &form).await.is_valid());
    assert_eq!(
        validate.validate(&FieldValue::from("ab"), &form).await,
        ValidationResult::Error("At least 3 characters must be entered.".into())
    );
    assert_eq!(
        validate.validate(&FieldValue::from(12), &form).await,
        ValidationResult::Error("rule.by1".into())
    );
}

#[tokio::test]
async fn test_overlapping_evaluations() {
    let validate = Validator::new()
        .by_async(|value: FieldValue, _| async move {
            tokio::time::sleep(Duration::from_millis(5)).await;
            value.as_f64().is_some_and(|n| n > 0.0)
        })
        .compile();

    let form = FormValues::new();
    let positive = FieldValue::from(1);
    let negative = FieldValue::from(-1);

    let (a, b) = tokio::join!(
        validate.validate(&positive, &form),
        validate.validate(&negative, &form)
    );
    assert!(a.is_valid());
    assert!(!b.is_valid());
}

#[tokio::test]
async fn test_reference_all_and_any() -> anyhow::Result<()> {
    let all = Validator::new()
        .gt(Ref::fields(["field1", "field2"])?)
        .compile();
    let form = FormValues::from(json!({ "field1": 5, "field2": 4 }));
    assert!(all.validate(&FieldValue::from(6), &form).await.is_valid());
    assert_eq!(
        all.validate(&FieldValue::from(5), &form).await,
        ValidationResult::Error(
            "The value must be greater than the field named field1,field2.".into()
        )
    );

    let any = Validator::new()
        .lt(Ref::fields(["field1", "field2"])?.any())
        .compile();
    let form = FormValues::from(json!({ "field1": 10, "field2": 3 }));
    assert!(any.validate(&FieldValue::from(4), &form).await.is_valid());
    Ok(())
}

#[tokio::test]
async fn test_reference_tracks_live_form_values() {
    let validate = Validator::new().eq(Ref::field("password")).compile();
    let mut form = FormValues::new().with("password", "secret");

    let confirm = FieldValue::from("secret");
    assert!(validate.validate(&confirm, &form).await.is_valid());

    form.insert("password", "changed");
    assert_eq!(
        validate.validate(&confirm, &form).await,
        ValidationResult::Error("This field must be equal to password named field.".into())
    );
}

#[tokio::test]
async fn test_date_range() {
    let validate = Validator::new()
        .gte(Ref::field("from"))
        .lte("2023-12-31")
        .compile();
    let form = FormValues::from(json!({ "from": "2023-03-01" }));

    assert!(validate.validate(&FieldValue::from("2023-03-01T10:00"), &form).await.is_valid());
    assert!(!validate.validate(&FieldValue::from("2023-02-28"), &form).await.is_valid());
    assert_eq!(
        validate.validate(&FieldValue::from("2024-01-01"), &form).await,
        ValidationResult::Error("The value must be less than or equal to 2023-12-31.".into())
    );
}

#[tokio::test]
async fn test_length_message_follows_value_shape() {
    let validate = Validator::new().min_length(2).compile();
    let form = FormValues::new();

    assert_eq!(
        validate.validate(&FieldValue::from(vec!["a"]), &form).await,
        ValidationResult::Error("At least 2 items must be selected.".into())
    );
    assert_eq!(
        validate.validate(&FieldValue::from("a"), &form).await,
        ValidationResult::Error("At least 2 characters must be entered.".into())
    );
    assert_eq!(
        validate.validate(&files(1), &form).await,
        ValidationResult::Error("At least 2 files must be selected.".into())
    );
}

#[tokio::test]
async fn test_pattern_exactness() {
    let validate = Validator::new().pattern("###").compile();
    let form = FormValues::new();

    assert!(validate.validate(&FieldValue::from("546"), &form).await.is_valid());
    for value in ["22", "5467", "abc", "54a"] {
        assert_eq!(
            validate.validate(&FieldValue::from(value), &form).await,
            ValidationResult::Error("The value must match the format ###.".into()),
            "{value}"
        );
    }
}

#[tokio::test]
async fn test_repeated_single_use_rule_is_ignored() {
    let validator = Validator::new().string_with("first").string_with("second");
    assert_eq!(validator.rules().collect::<Vec<_>>(), vec!["rule.string"]);

    let result = validator
        .compile()
        .validate(&FieldValue::from(1), &FormValues::new())
        .await;
    assert_eq!(result, ValidationResult::Error("first".into()));
}

#[tokio::test]
async fn test_message_context_shapes() {
    let seen: Arc<Mutex<Vec<MessageArgs>>> = Arc::new(Mutex::new(Vec::new()));
    let recorder = {
        let seen = Arc::clone(&seen);
        Message::from_fn(move |_, args| {
            seen.lock().unwrap().push(args.clone());
            "recorded".to_string()
        })
    };

    let form = FormValues::from(json!({ "a": 1, "b": 2 }));
    let by_ref = Validator::new()
        .eq_with(Ref::fields(["a", "b"]).unwrap(), recorder.clone())
        .compile();
    let by_literal = Validator::new().eq_with(vec![1, 2], recorder).compile();

    let value = FieldValue::from(3);
    assert_eq!(
        by_ref.validate(&value, &form).await,
        ValidationResult::Error("recorded".into())
    );
    assert_eq!(
        by_literal.validate(&value, &form).await,
        ValidationResult::Error("recorded".into())
    );

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);

    let reference = seen[0].reference.as_ref().unwrap();
    assert_eq!(reference.paths(), ["a", "b"]);
    match &seen[0].constraints {
        Some(Constraints::Resolved { fields, resolved }) => {
            assert_eq!(fields, &vec!["a".to_string(), "b".to_string()]);
            assert_eq!(resolved, &vec![FieldValue::from(1), FieldValue::from(2)]);
        }
        other => panic!("unexpected constraints: {other:?}"),
    }

    assert!(seen[1].reference.is_none());
    match &seen[1].constraints {
        Some(Constraints::Values(values)) => {
            assert_eq!(values, &vec![FieldValue::from(1), FieldValue::from(2)]);
        }
        other => panic!("unexpected constraints: {other:?}"),
    }
}

#[tokio::test]
async fn test_file_rules_fail_closed() {
    let validate = Validator::new()
        .file_type(vec!["text/plain"])
        .file_size(100)
        .compile();
    let form = FormValues::new();

    assert!(validate.validate(&files(2), &form).await.is_valid());
    assert_eq!(
        validate.validate(&FieldValue::from("file.txt"), &form).await,
        ValidationResult::Error("Invalid file type must be file type text/plain".into())
    );
}

#[tokio::test]
async fn test_nested_pipeline() {
    let inner = Validator::new().number().gt(0).compile();
    let validate = Validator::new().by_validate(inner).lt(10).compile();
    let form = FormValues::new();

    assert!(validate.validate(&FieldValue::from(5), &form).await.is_valid());
    assert_eq!(
        validate.validate(&FieldValue::from(-5), &form).await,
        ValidationResult::Error("The value must be greater than 0.".into())
    );
    assert_eq!(
        validate.validate(&FieldValue::from(50), &form).await,
        ValidationResult::Error("The value must be less than 10.".into())
    );
}

#[test]
fn test_signup_form() {
    let form = FormValues::from(json!({
        "email": "ada@example.com",
        "password": "correct horse",
        "confirm": "correct horse",
        "age": 36
    }));

    let email = Validator::new().required().email().compile();
    let password = Validator::new().required().min_length(8).compile();
    let confirm = Validator::new()
        .required()
        .eq_with(Ref::field("password"), "Passwords do not match.")
        .compile();
    let age = Validator::new().number().gte(18).compile();

    for (field, validate) in [
        ("email", &email),
        ("password", &password),
        ("confirm", &confirm),
        ("age", &age),
    ] {
        let result = validate.validate_blocking(&form.resolve(field), &form);
        assert!(result.is_valid(), "{field}: {result:?}");
    }

    assert_eq!(
        confirm.validate_blocking(&FieldValue::from("wrong"), &form),
        ValidationResult::Error("Passwords do not match.".into())
    );
    assert_eq!(
        email.validate_blocking(&FieldValue::Undefined, &form),
        ValidationResult::Error("This field is required.".into())
    );
}

#[test]
fn test_spy_never_runs_after_failure() {
    let second = Arc::new(AtomicUsize::new(0));
    let spy = Arc::clone(&second);

    let validate = Validator::new()
        .by(|_: &FieldValue, _: &FormValues| "A")
        .by(move |_: &FieldValue, _: &FormValues| {
            spy.fetch_add(1, Ordering::SeqCst);
            "B"
        })
        .compile();

    assert_eq!(
        validate.validate_blocking(&FieldValue::from(1), &FormValues::new()),
        ValidationResult::Error("A".into())
    );
    assert_eq!(second.load(Ordering::SeqCst), 0);
}
