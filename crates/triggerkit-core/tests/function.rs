use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::{json, Value};
use triggerkit_core::{
    legacy, BoxError, CloudFunction, CoreError, Event, EventContext, FunctionError,
    HandlerReturn, TriggerDescriptor, TriggerResource,
};

fn document_trigger() -> TriggerDescriptor {
    TriggerDescriptor::new(
        "google.firestore",
        "document.write",
        legacy::DOCUMENT_SERVICE,
        TriggerResource::fixed("projects/p/databases/(default)/documents/users/{uid}"),
    )
}

fn legacy_envelope() -> Value {
    json!({
        "data": {"value": {"fields": {}}},
        "eventId": "evt-1",
        "timestamp": "2017-06-13T00:58:40.349Z",
        "eventType": "providers/cloud.firestore/eventTypes/document.write",
        "resource": "projects/p/databases/(default)/documents/users/alice"
    })
}

fn passthrough(event: &Event) -> Result<Value, BoxError> {
    Ok(event.data.clone())
}

#[derive(Debug, thiserror::Error)]
#[error("boom")]
struct Boom;

#[tokio::test]
async fn handler_receives_normalized_context() {
    let seen: Arc<Mutex<Option<EventContext>>> = Arc::new(Mutex::new(None));
    let sink = seen.clone();
    let function = CloudFunction::new(
        "onUserWrite",
        document_trigger(),
        passthrough,
        move |data: Value, context: EventContext| {
            *sink.lock().unwrap() = Some(context);
            Ok(HandlerReturn::Value(data["value"].is_object()))
        },
    );

    let result = function.call(legacy_envelope()).await.unwrap();
    assert_eq!(result, Some(true));

    let context = seen.lock().unwrap().clone().unwrap();
    assert_eq!(context.event_id, "evt-1");
    assert_eq!(context.event_type, "google.firestore.document.write");
    assert_eq!(context.params["uid"], "alice");
    assert_eq!(context.resource.unwrap().service, "firestore.googleapis.com");
}

#[tokio::test]
async fn hooks_run_once_in_order_around_success() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (before_log, handler_log, after_log) = (log.clone(), log.clone(), log.clone());
    let function = CloudFunction::new(
        "ordered",
        document_trigger(),
        passthrough,
        move |_data: Value, _context: EventContext| {
            handler_log.lock().unwrap().push("handler");
            Ok(HandlerReturn::deferred(async { Ok(7) }))
        },
    )
    .with_before(move |_event: &Event| before_log.lock().unwrap().push("before"))
    .with_after(move |_event: &Event| after_log.lock().unwrap().push("after"));

    assert_eq!(function.call(legacy_envelope()).await.unwrap(), Some(7));
    assert_eq!(*log.lock().unwrap(), vec!["before", "handler", "after"]);
}

#[tokio::test]
async fn rejection_runs_after_then_propagates() {
    let after_calls = Arc::new(AtomicUsize::new(0));
    let counter = after_calls.clone();
    let function: CloudFunction<Value, ()> = CloudFunction::new(
        "failing",
        document_trigger(),
        passthrough,
        |_data: Value, _context: EventContext| {
            Ok(HandlerReturn::deferred(async { Err(Box::new(Boom) as BoxError) }))
        },
    )
    .with_after(move |_event: &Event| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let err = function.call(legacy_envelope()).await.unwrap_err();
    assert!(matches!(err, FunctionError::Handler(_)));
    assert!(!err.is_data_error());
    assert_eq!(err.to_string(), "handler failed: boom");
    assert_eq!(after_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn synchronous_failure_also_runs_after() {
    let after_calls = Arc::new(AtomicUsize::new(0));
    let counter = after_calls.clone();
    let function: CloudFunction<Value, ()> = CloudFunction::new(
        "throws",
        document_trigger(),
        passthrough,
        |_data: Value, _context: EventContext| Err(Box::new(Boom) as BoxError),
    )
    .with_after(move |_event: &Event| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert!(function.call(legacy_envelope()).await.is_err());
    assert_eq!(after_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn returning_nothing_is_not_an_error() {
    let function: CloudFunction<Value, ()> = CloudFunction::new(
        "silent",
        document_trigger(),
        passthrough,
        |_data: Value, _context: EventContext| Ok(HandlerReturn::Nothing),
    );
    assert_eq!(function.call(legacy_envelope()).await.unwrap(), None);
}

#[tokio::test]
async fn data_construction_failure_is_its_own_kind() {
    let handler_calls = Arc::new(AtomicUsize::new(0));
    let counter = handler_calls.clone();
    let function: CloudFunction<Value, ()> = CloudFunction::new(
        "bad-data",
        document_trigger(),
        |_event: &Event| Err(Box::new(Boom) as BoxError),
        move |_data: Value, _context: EventContext| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(HandlerReturn::Value(()))
        },
    );

    let err = function.call(legacy_envelope()).await.unwrap_err();
    assert!(err.is_data_error());
    assert_eq!(handler_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn run_bypasses_normalization() {
    let function = CloudFunction::new(
        "direct",
        TriggerDescriptor::new(
            "google.pubsub",
            "topic.publish",
            legacy::PUBSUB_SERVICE,
            TriggerResource::lazy(|| Err(CoreError::MissingEnvironment("GCLOUD_PROJECT"))),
        ),
        passthrough,
        |data: Value, context: EventContext| {
            Ok(HandlerReturn::Value(format!("{}:{}", context.event_id, data["n"])))
        },
    );

    let context = EventContext {
        event_id: "manual".into(),
        ..Default::default()
    };
    let result = function.run(json!({"n": 3}), context).await.unwrap();
    assert_eq!(result.as_deref(), Some("manual:3"));
    assert!(function.trigger().is_err());
}

#[derive(Debug, thiserror::Error)]
#[error("unreadable field")]
struct Unreadable;

#[derive(Debug, thiserror::Error)]
#[error("lookup failed")]
struct Lookup(#[source] Unreadable);

fn unreadable(err: &(dyn std::error::Error + 'static)) -> bool {
    err.is::<Unreadable>()
}

#[tokio::test]
async fn classified_handler_error_is_a_data_error() {
    let function: CloudFunction<Value, ()> = CloudFunction::new(
        "lazyDecode",
        document_trigger(),
        passthrough,
        |_data: Value, _context: EventContext| Err(Box::new(Lookup(Unreadable)) as BoxError),
    )
    .with_data_errors(unreadable);

    let err = function.call(legacy_envelope()).await.unwrap_err();
    assert!(matches!(err, FunctionError::Data(_)));
    assert!(err.is_data_error());
    assert_eq!(err.to_string(), "invalid payload data: lookup failed");
}

#[tokio::test]
async fn unclassified_handler_error_stays_a_handler_error() {
    let function: CloudFunction<Value, ()> = CloudFunction::new(
        "buggy",
        document_trigger(),
        passthrough,
        |_data: Value, _context: EventContext| {
            Ok(HandlerReturn::deferred(async { Err(Box::new(Boom) as BoxError) }))
        },
    )
    .with_data_errors(unreadable);

    let err = function.call(legacy_envelope()).await.unwrap_err();
    assert!(matches!(err, FunctionError::Handler(_)));
    assert!(!err.is_data_error());
}
