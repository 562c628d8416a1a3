mod support;

use dracin_client::{ApiError, StartScanParams};
use dracin_model::{
    ImageUpload, NotificationPayload, OrderQuery, ResourceId, UserQuery,
};
use serde_json::json;
use support::MockServer;

#[tokio::test]
async fn login_stores_the_grant() {
    let server = MockServer::start().await;
    server.reply(
        "POST /login",
        200,
        json!({
            "code": 200,
            "data": {
                "access_token": "A1",
                "refresh_token": "R1",
                "user": {"email": "admin@dracin.id"}
            }
        }),
    );

    let client = server.client();
    let grant = client.login("admin@dracin.id", "secret").await.unwrap();

    assert_eq!(grant.access_token, "A1");
    assert_eq!(client.session().access_token().as_deref(), Some("A1"));
    assert_eq!(client.session().refresh_token().as_deref(), Some("R1"));
    let body = server.requests()[0].json();
    assert_eq!(body, json!({"email": "admin@dracin.id", "password": "secret"}));
}

#[tokio::test]
async fn login_rejection_without_message_uses_credentials_text() {
    let server = MockServer::start().await;
    server.reply_raw("POST /login", 401, "text/plain", "");

    let client = server.client();
    let err = client.login("admin@dracin.id", "wrong").await.unwrap_err();

    assert_eq!(err.to_string(), "Kredensial tidak valid");
    assert!(client.session().access_token().is_none());
}

#[tokio::test]
async fn unauthenticated_calls_never_leave_the_process() {
    let server = MockServer::start().await;
    let client = server.client();

    let err = client.list_users(&UserQuery::default()).await.unwrap_err();

    assert!(matches!(err, ApiError::NotAuthenticated));
    assert!(err.requires_login());
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn rejected_token_is_refreshed_once_and_replayed() {
    let server = MockServer::start().await;
    server.reply("GET /users", 401, json!({"code": 401, "message": "expired"}));
    server.reply(
        "GET /users",
        200,
        json!({"code": 200, "data": [{"id": 7, "email": "a@b.c"}]}),
    );
    server.reply(
        "POST /refresh",
        200,
        json!({"code": 200, "data": {"access_token": "fresh"}}),
    );

    let client = server.signed_in_client("stale", "R1");
    let page = client.list_users(&UserQuery::default()).await.unwrap();

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, ResourceId::Int(7));
    assert_eq!(
        server.lines(),
        ["GET /users", "POST /refresh", "GET /users"]
    );
    let requests = server.requests();
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer stale"));
    assert_eq!(requests[1].json(), json!({"refresh_token": "R1"}));
    assert_eq!(requests[2].authorization.as_deref(), Some("Bearer fresh"));

    assert_eq!(client.session().access_token().as_deref(), Some("fresh"));
    assert_eq!(client.session().refresh_token().as_deref(), Some("R1"));
}

#[tokio::test]
async fn token_invalid_message_counts_as_unauthorized() {
    let server = MockServer::start().await;
    server.reply(
        "GET /scan/realtime",
        200,
        json!({"code": 400, "message": "Token tidak valid"}),
    );
    server.reply(
        "GET /scan/realtime",
        200,
        json!({"code": 200, "data": {"is_running": false}}),
    );
    server.reply(
        "POST /refresh",
        200,
        json!({"code": 200, "data": {"access_token": "fresh"}}),
    );

    let client = server.signed_in_client("stale", "R1");
    let realtime = client.scan_realtime().await.unwrap();

    assert!(!realtime.is_running);
    assert_eq!(server.requests().len(), 3);
}

#[tokio::test]
async fn failed_refresh_ends_the_session() {
    let server = MockServer::start().await;
    server.reply("GET /users", 401, json!({"code": 401}));
    server.reply("POST /refresh", 401, json!({"code": 401}));

    let client = server.signed_in_client("stale", "R1");
    let err = client.list_users(&UserQuery::default()).await.unwrap_err();

    assert!(matches!(err, ApiError::SessionExpired));
    assert_eq!(server.lines(), ["GET /users", "POST /refresh"]);
    assert!(client.session().access_token().is_none());
    assert!(client.session().refresh_token().is_none());
}

#[tokio::test]
async fn second_rejection_after_refresh_ends_the_session() {
    let server = MockServer::start().await;
    server.reply("GET /users", 401, json!({"code": 401}));
    server.reply(
        "POST /refresh",
        200,
        json!({"code": 200, "data": {"access_token": "fresh"}}),
    );

    let client = server.signed_in_client("stale", "R1");
    let err = client.list_users(&UserQuery::default()).await.unwrap_err();

    assert!(matches!(err, ApiError::SessionExpired));
    assert_eq!(
        server.lines(),
        ["GET /users", "POST /refresh", "GET /users"]
    );
    assert!(client.session().access_token().is_none());
}

#[tokio::test]
async fn search_term_routes_to_search_endpoint() {
    let server = MockServer::start().await;
    server.reply("GET /users/search", 200, json!({"code": 200, "data": []}));

    let client = server.signed_in_client("A1", "R1");
    let query = UserQuery {
        q: Some("budi".into()),
        page: Some(2),
        ..Default::default()
    };
    client.list_users(&query).await.unwrap();

    let request = &server.requests()[0];
    assert_eq!(request.path, "/users/search");
    assert_eq!(request.query.as_deref(), Some("page=2&q=budi"));
}

#[tokio::test]
async fn non_array_list_payload_is_a_decode_error() {
    let server = MockServer::start().await;
    server.reply(
        "GET /users",
        200,
        json!({"code": 200, "data": {"items": []}}),
    );

    let client = server.signed_in_client("A1", "R1");
    let err = client.list_users(&UserQuery::default()).await.unwrap_err();

    assert!(matches!(err, ApiError::Decode(_)));
}

#[tokio::test]
async fn envelope_failure_carries_server_message() {
    let server = MockServer::start().await;
    server.reply(
        "DELETE /users/7",
        200,
        json!({"code": 409, "message": "User masih aktif"}),
    );

    let client = server.signed_in_client("A1", "R1");
    let err = client.delete_user(&ResourceId::Int(7)).await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::Rejected { status: 200, code: Some(409), ref message } if message == "User masih aktif"
    ));
}

#[tokio::test]
async fn start_scan_posts_the_validated_body() {
    let server = MockServer::start().await;
    server.reply_raw("POST /scan/start", 204, "application/json", "");

    let client = server.signed_in_client("A1", "R1");
    let request = StartScanParams::from_text(" ANIME_A\n \nANIME_B ", "5", "0", "1000")
        .validate()
        .unwrap();
    let ack = client.start_scan(&request).await.unwrap();

    assert_eq!(ack.message, "Scan dimulai");
    let sent = server.requests()[0].json();
    assert_eq!(
        sent,
        json!({
            "top_folders": ["ANIME_A", "ANIME_B"],
            "batch_size": 5,
            "pause_ms": 0,
            "interval_ms": 1000
        })
    );
}

#[tokio::test]
async fn summary_report_reads_flat_counts() {
    let server = MockServer::start().await;
    server.reply(
        "GET /scan/report/summary",
        200,
        json!({
            "code": 200,
            "data": {
                "series_total": 10,
                "episodes_total": 40,
                "tags_total": 5,
                "storage_total_size": 123456789
            }
        }),
    );

    let client = server.signed_in_client("A1", "R1");
    let summary = client.summary_report().await.unwrap();

    assert_eq!(summary.totals.series_total, 10);
    assert_eq!(summary.totals.episodes_total, 40);
    assert_eq!(summary.totals.tags_total, 5);
    assert_eq!(summary.storage_total_size, Some(123_456_789));
}

#[tokio::test]
async fn order_export_returns_raw_csv() {
    let server = MockServer::start().await;
    server.reply_raw(
        "GET /payments/orders/export",
        200,
        "text/csv",
        "id,status\nORD-1,paid\n",
    );

    let client = server.signed_in_client("A1", "R1");
    let query = OrderQuery {
        status: Some("paid".into()),
        page: Some(3),
        ..Default::default()
    };
    let csv = client.export_orders(&query).await.unwrap();

    assert_eq!(csv, b"id,status\nORD-1,paid\n");
    assert_eq!(server.requests()[0].query.as_deref(), Some("status=paid"));
}

#[tokio::test]
async fn failed_export_surfaces_plain_text_error() {
    let server = MockServer::start().await;
    server.reply_raw(
        "GET /payments/orders/export",
        500,
        "text/plain",
        "export worker down",
    );

    let client = server.signed_in_client("A1", "R1");
    let err = client.export_orders(&OrderQuery::default()).await.unwrap_err();

    assert_eq!(err.to_string(), "export worker down");
}

#[tokio::test]
async fn setting_keys_are_one_escaped_segment() {
    let server = MockServer::start().await;
    server.reply(
        "GET /settings/feature%2Fads%20top",
        200,
        json!({"code": 200, "data": true}),
    );

    let client = server.signed_in_client("A1", "R1");
    let setting = client.get_setting("feature/ads top").await.unwrap();

    assert_eq!(setting.key, "feature/ads top");
    assert_eq!(setting.value, json!(true));
    assert_eq!(server.requests()[0].path, "/settings/feature%2Fads%20top");
}

#[tokio::test]
async fn notification_without_image_is_refused_locally() {
    let server = MockServer::start().await;
    let client = server.signed_in_client("A1", "R1");

    let payload = NotificationPayload {
        unit_name: Some("Promo".into()),
        ..Default::default()
    };
    let err = client.create_notification(&payload).await.unwrap_err();

    assert_eq!(err.to_string(), "Gambar wajib diisi");
    assert!(server.requests().is_empty());
}

#[tokio::test]
async fn notification_with_image_is_sent_as_multipart() {
    let server = MockServer::start().await;
    server.reply(
        "POST /app/notifications",
        200,
        json!({"code": 201, "message": "Tersimpan"}),
    );

    let client = server.signed_in_client("A1", "R1");
    let payload = NotificationPayload {
        unit_name: Some("Promo".into()),
        image: Some(ImageUpload {
            file_name: "promo.png".into(),
            mime: "image/png".into(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        }),
        ..Default::default()
    };
    let ack = client.create_notification(&payload).await.unwrap();

    assert_eq!(ack.message, "Tersimpan");
    let body = String::from_utf8_lossy(&server.requests()[0].body).into_owned();
    assert!(body.contains("name=\"unit_name\""));
    assert!(body.contains("filename=\"promo.png\""));
}
