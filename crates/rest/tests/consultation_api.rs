//! Consultation REST API tests.
//!
//! Exercises the HTTP surface end to end against an in-memory SQLite
//! service, and against a recording service double where the test needs
//! to see which service calls were made.

mod common;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{Value, json};

use ayoos_persistence::types::ConsultationDto;
use ayoos_rest::ServerConfig;

use common::{
    RecordingService, file_server, recording_server, sqlite_server, sqlite_server_with_config,
};

const ALERT: HeaderName = HeaderName::from_static("x-consultationapp-alert");
const PARAMS: HeaderName = HeaderName::from_static("x-consultationapp-params");
const ERROR: HeaderName = HeaderName::from_static("x-consultationapp-error");
const TOTAL_COUNT: HeaderName = HeaderName::from_static("x-total-count");
const TOTAL_PAGES: HeaderName = HeaderName::from_static("x-total-pages");
const LINK: HeaderName = HeaderName::from_static("link");
const LOCATION: HeaderName = HeaderName::from_static("location");
const CONTENT_TYPE: HeaderName = HeaderName::from_static("content-type");

/// Creates a consultation and returns its id.
async fn create(server: &TestServer, body: Value) -> i64 {
    let response = server.post("/api/consultations").json(&body).await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()["id"]
        .as_i64()
        .expect("created record has an id")
}

fn header(response: &axum_test::TestResponse, name: HeaderName) -> String {
    response
        .header(name)
        .to_str()
        .expect("header is ASCII")
        .to_string()
}

// =============================================================================
// Full lifecycle
// =============================================================================

mod lifecycle {
    use super::*;

    #[tokio::test]
    async fn test_create_update_read_delete_scenario() {
        let server = sqlite_server();

        // Create
        let response = server
            .post("/api/consultations")
            .json(&json!({"name": "x"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let created = response.json::<Value>();
        let id = created["id"].as_i64().expect("id assigned");
        assert_eq!(created["name"], "x");
        assert_eq!(
            header(&response, LOCATION),
            format!("/api/consultations/{}", id)
        );

        // Update
        let response = server
            .put("/api/consultations")
            .json(&json!({"id": id, "name": "y"}))
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["name"], "y");

        // Read
        let response = server.get(&format!("/api/consultations/{}", id)).await;
        response.assert_status_ok();
        let read = response.json::<Value>();
        assert_eq!(read["id"], id);
        assert_eq!(read["name"], "y");

        // Delete
        let response = server.delete(&format!("/api/consultations/{}", id)).await;
        response.assert_status(StatusCode::NO_CONTENT);
        assert!(response.text().is_empty());

        // Gone
        let response = server.get(&format!("/api/consultations/{}", id)).await;
        response.assert_status(StatusCode::NOT_FOUND);
        assert!(response.text().is_empty());
    }

    #[tokio::test]
    async fn test_ids_are_sequential() {
        let server = sqlite_server();
        let first = create(&server, json!({"name": "a"})).await;
        let second = create(&server, json!({"name": "b"})).await;
        assert_eq!(first, 1);
        assert_eq!(second, 2);
    }

    #[tokio::test]
    async fn test_created_record_round_trips() {
        let server = sqlite_server();
        let body = json!({
            "name": "Follow-up",
            "durationMinutes": 15,
            "vitals": {"pulse": 72, "notes": ["stable"]},
            "completed": false
        });
        let id = create(&server, body.clone()).await;

        let read = server
            .get(&format!("/api/consultations/{}", id))
            .await
            .json::<ConsultationDto>();
        let mut expected: ConsultationDto = serde_json::from_value(body).unwrap();
        expected.id = Some(id);
        assert_eq!(read, expected);
    }

    #[tokio::test]
    async fn test_update_of_unknown_id_gets_generated_id() {
        let server = sqlite_server();

        let response = server
            .put("/api/consultations")
            .json(&json!({"id": i64::MAX, "name": "imported"}))
            .await;
        response.assert_status_ok();
        let id = response.json::<Value>()["id"].as_i64().unwrap();
        assert_ne!(id, i64::MAX);

        server
            .get(&format!("/api/consultations/{}", i64::MAX))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        server
            .get(&format!("/api/consultations/{}", id))
            .await
            .assert_status_ok();

        let created = server
            .post("/api/consultations")
            .json(&json!({"name": "next"}))
            .await;
        created.assert_status(StatusCode::CREATED);
        assert_eq!(created.json::<Value>()["id"], id + 1);
    }

    #[tokio::test]
    async fn test_delete_absent_id_is_no_content() {
        let server = sqlite_server();
        let response = server.delete("/api/consultations/12345").await;
        response.assert_status(StatusCode::NO_CONTENT);
        assert!(response.text().is_empty());
    }

    #[tokio::test]
    async fn test_non_numeric_path_id_is_bad_request() {
        let server = sqlite_server();
        server
            .get("/api/consultations/abc")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

// =============================================================================
// Identifier presence checks
// =============================================================================

mod id_validation {
    use super::*;

    #[tokio::test]
    async fn test_create_with_id_is_rejected_without_service_call() {
        let service = RecordingService::default();
        let server = recording_server(service.clone());

        let response = server
            .post("/api/consultations")
            .json(&json!({"id": 7, "name": "x"}))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["entityName"], "consultationConsultation");
        assert_eq!(body["errorKey"], "idexists");
        assert_eq!(body["message"], "error.idexists");
        assert_eq!(body["params"], "consultationConsultation");
        assert_eq!(body["status"], 400);
        assert_eq!(header(&response, ERROR), "error.idexists");
        assert_eq!(header(&response, PARAMS), "consultationConsultation");
        assert_eq!(header(&response, CONTENT_TYPE), "application/problem+json");

        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_without_id_is_rejected_without_service_call() {
        let service = RecordingService::default();
        let server = recording_server(service.clone());

        for body in [json!({"name": "y"}), json!({"id": null, "name": "y"})] {
            let response = server.put("/api/consultations").json(&body).await;
            response.assert_status(StatusCode::BAD_REQUEST);
            let problem = response.json::<Value>();
            assert_eq!(problem["errorKey"], "idnull");
            assert_eq!(problem["entityName"], "consultationConsultation");
            assert_eq!(header(&response, ERROR), "error.idnull");
        }

        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn test_valid_requests_reach_the_service() {
        let service = RecordingService::default();
        let server = recording_server(service.clone());

        server
            .post("/api/consultations")
            .json(&json!({"name": "x"}))
            .await
            .assert_status(StatusCode::CREATED);
        server
            .put("/api/consultations")
            .json(&json!({"id": 3, "name": "y"}))
            .await
            .assert_status_ok();
        server
            .delete("/api/consultations/3")
            .await
            .assert_status(StatusCode::NO_CONTENT);

        assert_eq!(service.calls(), vec!["save", "save", "delete"]);
    }
}

// =============================================================================
// Request bodies
// =============================================================================

mod bodies {
    use super::*;

    #[tokio::test]
    async fn test_invalid_json_is_bad_request() {
        let server = sqlite_server();
        let response = server
            .post("/api/consultations")
            .add_header(CONTENT_TYPE, HeaderValue::from_static("application/json"))
            .bytes("{not json".into())
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["status"], 400);
    }

    #[tokio::test]
    async fn test_array_body_is_bad_request() {
        let server = sqlite_server();
        server
            .post("/api/consultations")
            .json(&json!([{"name": "x"}]))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_non_json_content_type_is_unsupported() {
        let server = sqlite_server();
        server
            .post("/api/consultations")
            .add_header(CONTENT_TYPE, HeaderValue::from_static("text/plain"))
            .bytes("name=x".into())
            .await
            .assert_status(StatusCode::UNSUPPORTED_MEDIA_TYPE);
    }
}

// =============================================================================
// Alert headers
// =============================================================================

mod alerts {
    use super::*;

    #[tokio::test]
    async fn test_translation_keys() {
        let server = sqlite_server();

        let response = server
            .post("/api/consultations")
            .json(&json!({"name": "x"}))
            .await;
        assert_eq!(
            header(&response, ALERT),
            "consultationApp.consultationConsultation.created"
        );
        assert_eq!(header(&response, PARAMS), "1");

        let response = server
            .put("/api/consultations")
            .json(&json!({"id": 1, "name": "y"}))
            .await;
        assert_eq!(
            header(&response, ALERT),
            "consultationApp.consultationConsultation.updated"
        );
        assert_eq!(header(&response, PARAMS), "1");

        let response = server.delete("/api/consultations/1").await;
        assert_eq!(
            header(&response, ALERT),
            "consultationApp.consultationConsultation.deleted"
        );
        assert_eq!(header(&response, PARAMS), "1");
    }

    #[tokio::test]
    async fn test_human_messages_without_translation() {
        let server = sqlite_server_with_config(ServerConfig {
            enable_translation: false,
            ..ServerConfig::for_testing()
        });

        let response = server
            .post("/api/consultations")
            .json(&json!({"name": "x"}))
            .await;
        assert_eq!(
            header(&response, ALERT),
            "A new consultationConsultation is created with identifier 1"
        );
    }

    #[tokio::test]
    async fn test_application_name_is_configurable() {
        let server = sqlite_server_with_config(ServerConfig {
            application_name: "clinicApp".to_string(),
            ..ServerConfig::for_testing()
        });

        let response = server
            .post("/api/consultations")
            .json(&json!({"name": "x"}))
            .await;
        assert_eq!(
            header(&response, HeaderName::from_static("x-clinicapp-alert")),
            "clinicApp.consultationConsultation.created"
        );
    }
}

// =============================================================================
// Paged listing
// =============================================================================

mod listing {
    use super::*;

    #[tokio::test]
    async fn test_pagination_headers() {
        let server = sqlite_server();
        for name in ["a", "b", "c"] {
            create(&server, json!({ "name": name })).await;
        }

        let response = server
            .get("/api/consultations")
            .add_query_param("page", "0")
            .add_query_param("size", "2")
            .await;
        response.assert_status_ok();

        let body = response.json::<Vec<Value>>();
        assert_eq!(body.len(), 2);
        assert_eq!(body[0]["id"], 1);
        assert_eq!(body[1]["id"], 2);
        assert_eq!(header(&response, TOTAL_COUNT), "3");
        assert_eq!(header(&response, TOTAL_PAGES), "2");

        let link = header(&response, LINK);
        assert!(link.contains("<http://localhost/api/consultations?page=1&size=2>; rel=\"next\""));
        assert!(link.contains("<http://localhost/api/consultations?page=1&size=2>; rel=\"last\""));
        assert!(link.contains("<http://localhost/api/consultations?page=0&size=2>; rel=\"first\""));
        assert!(!link.contains("rel=\"prev\""));
    }

    #[tokio::test]
    async fn test_last_page() {
        let server = sqlite_server();
        for name in ["a", "b", "c"] {
            create(&server, json!({ "name": name })).await;
        }

        let response = server
            .get("/api/consultations")
            .add_query_param("page", "1")
            .add_query_param("size", "2")
            .await;
        let body = response.json::<Vec<Value>>();
        assert_eq!(body.len(), 1);
        assert_eq!(body[0]["name"], "c");

        let link = header(&response, LINK);
        assert!(!link.contains("rel=\"next\""));
        assert!(link.contains("page=0&size=2>; rel=\"prev\""));
    }

    #[tokio::test]
    async fn test_empty_listing() {
        let server = sqlite_server();
        let response = server.get("/api/consultations").await;
        response.assert_status_ok();
        assert!(response.json::<Vec<Value>>().is_empty());
        assert_eq!(header(&response, TOTAL_COUNT), "0");
    }

    #[tokio::test]
    async fn test_sort_by_attribute() {
        let server = sqlite_server();
        for name in ["beta", "alpha", "gamma"] {
            create(&server, json!({ "name": name })).await;
        }

        let response = server
            .get("/api/consultations")
            .add_query_param("sort", "name,desc")
            .await;
        let names: Vec<Value> = response
            .json::<Vec<Value>>()
            .into_iter()
            .map(|v| v["name"].clone())
            .collect();
        assert_eq!(names, vec![json!("gamma"), json!("beta"), json!("alpha")]);
    }

    #[tokio::test]
    async fn test_invalid_parameters_are_bad_request() {
        let server = sqlite_server();
        server
            .get("/api/consultations")
            .add_query_param("page", "first")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .get("/api/consultations")
            .add_query_param("sort", "name;drop")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_service_order_and_totals_are_preserved() {
        let records = [3, 1, 2]
            .into_iter()
            .map(|id| ConsultationDto::default().with_id(id))
            .collect();
        let service = RecordingService {
            records,
            total: 45,
            ..Default::default()
        };
        let server = recording_server(service);

        let response = server
            .get("/api/consultations")
            .add_query_param("page", "1")
            .add_query_param("size", "20")
            .await;
        let ids: Vec<Value> = response
            .json::<Vec<Value>>()
            .into_iter()
            .map(|v| v["id"].clone())
            .collect();
        assert_eq!(ids, vec![json!(3), json!(1), json!(2)]);
        assert_eq!(header(&response, TOTAL_COUNT), "45");
        assert_eq!(header(&response, TOTAL_PAGES), "3");

        let link = header(&response, LINK);
        assert!(link.contains("page=2&size=20>; rel=\"next\""));
        assert!(link.contains("page=0&size=20>; rel=\"prev\""));
    }
}

// =============================================================================
// Search
// =============================================================================

mod search {
    use super::*;

    async fn seeded() -> TestServer {
        let server = sqlite_server();
        create(&server, json!({"name": "Cardiology review", "room": "A1"})).await;
        create(&server, json!({"name": "Dermatology check"})).await;
        create(&server, json!({"name": "Cardiac follow-up"})).await;
        server
    }

    #[tokio::test]
    async fn test_prefix_search() {
        let server = seeded().await;

        let response = server
            .get("/api/_search/consultations")
            .add_query_param("query", "cardi*")
            .await;
        response.assert_status_ok();
        assert_eq!(response.json::<Vec<Value>>().len(), 2);
        assert_eq!(header(&response, TOTAL_COUNT), "2");
        assert_eq!(header(&response, TOTAL_PAGES), "1");
        assert!(header(&response, LINK).contains("/api/_search/consultations?query=cardi*&page=0&size=20"));
    }

    #[tokio::test]
    async fn test_match_all_with_paging() {
        let server = seeded().await;

        let response = server
            .get("/api/_search/consultations")
            .add_query_param("query", "*")
            .add_query_param("size", "2")
            .add_query_param("sort", "id,asc")
            .await;
        let body = response.json::<Vec<Value>>();
        assert_eq!(body.len(), 2);
        assert_eq!(body[0]["id"], 1);
        assert_eq!(header(&response, TOTAL_COUNT), "3");
        assert_eq!(header(&response, TOTAL_PAGES), "2");
    }

    #[tokio::test]
    async fn test_huge_page_is_empty() {
        let server = seeded().await;

        for path in ["/api/_search/consultations", "/api/consultations"] {
            let response = server
                .get(path)
                .add_query_param("query", "*")
                .add_query_param("page", i64::MAX.to_string())
                .await;
            response.assert_status_ok();
            assert!(response.json::<Vec<Value>>().is_empty());
            assert_eq!(header(&response, TOTAL_COUNT), "3");
        }
    }

    #[tokio::test]
    async fn test_search_follows_updates_and_deletes() {
        let server = seeded().await;

        server
            .put("/api/consultations")
            .json(&json!({"id": 2, "name": "Neurology consult"}))
            .await
            .assert_status_ok();

        let hits = server
            .get("/api/_search/consultations")
            .add_query_param("query", "dermatology")
            .await
            .json::<Vec<Value>>();
        assert!(hits.is_empty());

        let hits = server
            .get("/api/_search/consultations")
            .add_query_param("query", "neurology")
            .await
            .json::<Vec<Value>>();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["id"], 2);

        server
            .delete("/api/consultations/2")
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let response = server
            .get("/api/_search/consultations")
            .add_query_param("query", "neurology")
            .await;
        assert!(response.json::<Vec<Value>>().is_empty());
        assert_eq!(header(&response, TOTAL_COUNT), "0");
    }

    #[tokio::test]
    async fn test_missing_or_blank_query_is_bad_request() {
        let server = seeded().await;
        server
            .get("/api/_search/consultations")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
        server
            .get("/api/_search/consultations")
            .add_query_param("query", "   ")
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_query_is_passed_to_service() {
        let service = RecordingService::default();
        let server = recording_server(service.clone());

        server
            .get("/api/_search/consultations")
            .add_query_param("query", "fever cough")
            .await
            .assert_status_ok();

        assert_eq!(service.calls(), vec!["search:fever cough"]);
    }
}

// =============================================================================
// Server configuration
// =============================================================================

mod configuration {
    use super::*;

    #[tokio::test]
    async fn test_custom_api_prefix() {
        let server = sqlite_server_with_config(ServerConfig {
            api_prefix: "/v1/".to_string(),
            ..ServerConfig::for_testing()
        });

        let response = server
            .post("/v1/consultations")
            .json(&json!({"name": "x"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        assert_eq!(header(&response, LOCATION), "/v1/consultations/1");

        server
            .get("/api/consultations/1")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let server = sqlite_server_with_config(ServerConfig {
            enable_request_id: true,
            ..ServerConfig::for_testing()
        });

        let response = server.get("/_liveness").await;
        response.assert_status_ok();
        assert!(
            response
                .maybe_header(HeaderName::from_static("x-request-id"))
                .is_some()
        );

        let response = server
            .get("/_liveness")
            .add_header(
                HeaderName::from_static("x-request-id"),
                HeaderValue::from_static("abc-123"),
            )
            .await;
        assert_eq!(
            header(&response, HeaderName::from_static("x-request-id")),
            "abc-123"
        );
    }

    #[tokio::test]
    async fn test_body_limit() {
        let server = sqlite_server_with_config(ServerConfig {
            max_body_size: 64,
            ..ServerConfig::for_testing()
        });

        server
            .post("/api/consultations")
            .json(&json!({"notes": "x".repeat(200)}))
            .await
            .assert_status(StatusCode::PAYLOAD_TOO_LARGE);
    }
}

// =============================================================================
// Operational endpoints
// =============================================================================

mod operational {
    use super::*;

    #[tokio::test]
    async fn test_health() {
        let server = sqlite_server();
        let response = server.get("/health").await;
        response.assert_status_ok();

        let body = response.json::<Value>();
        assert_eq!(body["status"], "healthy");
        assert!(
            body["backend"]
                .as_str()
                .unwrap()
                .starts_with("sqlite+sqlite-")
        );
        assert!(body["timestamp"].is_string());
    }

    #[tokio::test]
    async fn test_liveness_and_readiness() {
        let server = sqlite_server();
        server.get("/_liveness").await.assert_status_ok();

        let response = server.get("/_readiness").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "ready");
    }

    #[tokio::test]
    async fn test_readiness_fails_when_storage_fails() {
        let server = recording_server(RecordingService {
            fail: true,
            ..Default::default()
        });
        server
            .get("/_readiness")
            .await
            .assert_status(StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_storage_failure_is_internal_error() {
        let server = recording_server(RecordingService {
            fail: true,
            ..Default::default()
        });

        let response = server
            .post("/api/consultations")
            .json(&json!({"name": "x"}))
            .await;
        response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
        let body = response.json::<Value>();
        assert_eq!(body["status"], 500);
        assert_eq!(body["message"], "error.http.500");
    }

    #[tokio::test]
    async fn test_records_survive_restart_on_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("consultation.db");

        let id = {
            let server = file_server(&path);
            let created = server
                .post("/api/consultations")
                .json(&json!({"name": "follow-up"}))
                .await;
            created.assert_status(StatusCode::CREATED);
            created.json::<Value>()["id"].as_i64().unwrap()
        };

        let server = file_server(&path);
        let response = server.get(&format!("/api/consultations/{}", id)).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["name"], "follow-up");

        let hits = server
            .get("/api/_search/consultations")
            .add_query_param("query", "follow*")
            .await;
        hits.assert_status_ok();
        assert_eq!(hits.json::<Vec<Value>>().len(), 1);
    }
}
