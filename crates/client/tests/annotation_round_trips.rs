//! Round-trip tests for host-entity annotation operations.
//!
//! Uses an in-memory transport that records every request and replays
//! canned replies, so the add/remove flows run without a server.

use std::collections::VecDeque;
use std::sync::Mutex;

use assert_matches::assert_matches;
use async_trait::async_trait;
use biobank_client::{
    ApiError, ClientError, CollectionEvent, HasAnnotations, Participant, RestTransport, Study,
};
use biobank_core::CoreError;
use serde_json::json;

// ---------------------------------------------------------------------------
// Mock transport
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
struct RecordedCall {
    method: &'static str,
    path: String,
    body: Option<serde_json::Value>,
}

#[derive(Default)]
struct MockTransport {
    replies: Mutex<VecDeque<serde_json::Value>>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl MockTransport {
    fn with_replies(replies: impl IntoIterator<Item = serde_json::Value>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn record(&self, method: &'static str, path: &str, body: Option<&serde_json::Value>) {
        self.calls.lock().unwrap().push(RecordedCall {
            method,
            path: path.to_string(),
            body: body.cloned(),
        });
    }

    fn next_reply(&self) -> Result<serde_json::Value, ApiError> {
        self.replies.lock().unwrap().pop_front().ok_or(ApiError::Api {
            status: 500,
            body: "no reply queued".to_string(),
        })
    }

    fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RestTransport for MockTransport {
    async fn get(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        self.record("GET", path, None);
        self.next_reply()
    }

    async fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, ApiError> {
        self.record("POST", path, Some(body));
        self.next_reply()
    }

    async fn delete(&self, path: &str) -> Result<serde_json::Value, ApiError> {
        self.record("DELETE", path, None);
        self.next_reply()
    }
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn study() -> Study {
    Study::from_json(&study_json()).unwrap()
}

fn study_json() -> serde_json::Value {
    json!({
        "id": "s1",
        "slug": "heart-study",
        "version": 1,
        "name": "Heart Study",
        "annotationTypes": [
            {
                "id": "at-1",
                "slug": "consent-notes",
                "name": "Consent notes",
                "valueType": "Text",
                "required": false
            },
            {
                "id": "at-2",
                "slug": "size",
                "name": "Size",
                "valueType": "Select",
                "maxValueCount": 1,
                "options": ["Small", "Large"],
                "required": true
            }
        ]
    })
}

fn participant_json(version: i64) -> serde_json::Value {
    json!({
        "id": "p1",
        "slug": "p1",
        "version": version,
        "uniqueId": "ABC-123",
        "studyId": "s1",
        "annotations": [
            {"annotationTypeId": "at-2", "stringValue": "", "selectedValues": ["Large"]}
        ]
    })
}

fn typed_participant() -> Participant {
    let mut participant = Participant::from_json(&participant_json(4)).unwrap();
    participant
        .set_annotation_types(&study().annotation_types)
        .unwrap();
    participant
}

// ---------------------------------------------------------------------------
// Test: Study::get hydrates from the reply
// ---------------------------------------------------------------------------

#[tokio::test]
async fn study_get_hydrates_from_reply() {
    let api = MockTransport::with_replies([study_json()]);
    let study = Study::get(&api, "heart-study").await.unwrap();
    assert_eq!(study.id, "s1");
    assert_eq!(study.annotation_types.len(), 2);
    assert_eq!(
        api.calls(),
        vec![RecordedCall {
            method: "GET",
            path: "studies/heart-study".to_string(),
            body: None,
        }]
    );
}

// ---------------------------------------------------------------------------
// Test: add_annotation posts the wire format and rebuilds the entity
// ---------------------------------------------------------------------------

#[tokio::test]
async fn add_annotation_posts_and_rebuilds() {
    let mut participant = typed_participant();
    participant
        .annotation_mut("at-1")
        .unwrap()
        .set_text("spoke with coordinator")
        .unwrap();
    let annotation = participant.annotation("at-1").unwrap().clone();

    let api = MockTransport::with_replies([participant_json(5)]);
    let updated = participant.add_annotation(&api, &annotation).await.unwrap();

    assert_eq!(updated.version, 5);
    let calls = api.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].method, "POST");
    assert_eq!(calls[0].path, "participants/annot/p1");
    let body = calls[0].body.as_ref().unwrap();
    assert_eq!(body["expectedVersion"], json!(4));
    assert_eq!(body["annotationTypeId"], json!("at-1"));
    assert_eq!(body["stringValue"], json!("spoke with coordinator"));
    assert_eq!(body["selectedValues"], json!([]));
}

// ---------------------------------------------------------------------------
// Test: remove_annotation deletes at the versioned path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_annotation_deletes_at_versioned_path() {
    let participant = typed_participant();
    let annotation = participant.annotation("at-2").unwrap().clone();

    let api = MockTransport::with_replies([participant_json(5)]);
    let updated = participant
        .remove_annotation(&api, &annotation)
        .await
        .unwrap();

    assert_eq!(updated.version, 5);
    assert_eq!(
        api.calls(),
        vec![RecordedCall {
            method: "DELETE",
            path: "participants/annot/p1/4/at-2".to_string(),
            body: None,
        }]
    );
}

// ---------------------------------------------------------------------------
// Test: remove precondition fails before any network call
// ---------------------------------------------------------------------------

#[tokio::test]
async fn remove_annotation_unknown_type_fails_without_network() {
    let participant = typed_participant();

    let foreign_type = biobank_core::AnnotationType::from_json(&json!({
        "id": "at-99",
        "slug": "other",
        "name": "Other",
        "valueType": "Text",
        "required": false
    }))
    .unwrap();
    let foreign = biobank_core::Annotation::empty(&foreign_type);

    let api = MockTransport::default();
    let result = participant.remove_annotation(&api, &foreign).await;

    assert_matches!(result, Err(ClientError::Core(CoreError::Domain(_))));
    assert!(api.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Test: Participant::add rejects a missing required value locally
// ---------------------------------------------------------------------------

#[tokio::test]
async fn participant_add_rejects_missing_required_value_without_network() {
    // The study's Size annotation is required and starts unanswered.
    let participant = Participant::new(&study(), "XYZ-9").unwrap();

    let api = MockTransport::default();
    let result = participant.add(&api).await;

    assert_matches!(result, Err(ClientError::Core(CoreError::Domain(_))));
    assert!(api.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Test: Participant::add sends uniqueId plus serialized annotations
// ---------------------------------------------------------------------------

#[tokio::test]
async fn participant_add_sends_unique_id_and_annotations() {
    let mut participant = Participant::new(&study(), "XYZ-9").unwrap();
    participant
        .annotation_mut("at-2")
        .unwrap()
        .select("Large")
        .unwrap();

    let api = MockTransport::with_replies([participant_json(0)]);
    participant.add(&api).await.unwrap();

    let calls = api.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].path, "participants/s1");
    let body = calls[0].body.as_ref().unwrap();
    assert_eq!(body["uniqueId"], json!("XYZ-9"));
    let annotations = body["annotations"].as_array().unwrap();
    assert_eq!(annotations.len(), 2);
    assert!(annotations
        .iter()
        .any(|a| a["selectedValues"] == json!(["Large"])));
}

// ---------------------------------------------------------------------------
// Test: update_unique_id carries the expected version
// ---------------------------------------------------------------------------

#[tokio::test]
async fn update_unique_id_carries_expected_version() {
    let participant = typed_participant();

    let api = MockTransport::with_replies([participant_json(5)]);
    participant.update_unique_id(&api, "NEW-1").await.unwrap();

    let calls = api.calls();
    assert_eq!(calls[0].path, "participants/uniqueId/p1");
    let body = calls[0].body.as_ref().unwrap();
    assert_eq!(body["expectedVersion"], json!(4));
    assert_eq!(body["uniqueId"], json!("NEW-1"));
}

// ---------------------------------------------------------------------------
// Test: collection events share the same annotation round-trips
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collection_event_remove_annotation_uses_cevents_path() {
    let mut event = CollectionEvent::from_json(&json!({
        "id": "ce1",
        "slug": "visit-1",
        "version": 2,
        "participantId": "p1",
        "collectionEventTypeId": "cet1",
        "visitNumber": 1,
        "annotations": [
            {"annotationTypeId": "at-7", "stringValue": "", "selectedValues": ["Yes"]}
        ]
    }))
    .unwrap();
    let event_type = biobank_core::AnnotationType::from_json(&json!({
        "id": "at-7",
        "slug": "fasting",
        "name": "Fasting",
        "valueType": "Select",
        "maxValueCount": 1,
        "options": ["Yes", "No"],
        "required": true
    }))
    .unwrap();
    event.set_annotation_types(std::slice::from_ref(&event_type)).unwrap();
    let annotation = event.annotation("at-7").unwrap().clone();

    let api = MockTransport::with_replies([json!({
        "id": "ce1",
        "slug": "visit-1",
        "version": 3,
        "participantId": "p1",
        "collectionEventTypeId": "cet1",
        "visitNumber": 1,
        "annotations": []
    })]);
    let updated = event.remove_annotation(&api, &annotation).await.unwrap();

    assert_eq!(updated.version, 3);
    assert_eq!(api.calls()[0].path, "participants/cevents/annot/ce1/2/at-7");
}
