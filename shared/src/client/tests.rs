use super::*;
use crate::models::Room;
use crate::protocol::{
    ApproveBookingRequest, ListRoomsRequest, LoginRequest, OcrIdCardRequest,
    ReadAllNotificationsRequest, UploadFile,
};
use crate::session::{MemoryStorage, PersistedToken, SessionStore};

const BASE: &str = "http://api.test";

fn client_with_token(
    token: Option<&str>,
) -> (std::rc::Rc<MockHttpClient>, ApiClient<std::rc::Rc<MockHttpClient>, Option<String>>) {
    let http = std::rc::Rc::new(MockHttpClient::new());
    let client = ApiClient::new(
        ClientConfig::new(BASE),
        http.clone(),
        token.map(str::to_string),
    );
    (http, client)
}

#[tokio::test]
async fn attaches_bearer_token_when_present() {
    let (http, client) = client_with_token(Some("abc"));
    http.mock_response(HttpMethod::Get, "http://api.test/rooms/", 200, "[]");

    let rooms = client.send(&ListRoomsRequest).await.unwrap();
    assert!(rooms.is_empty());

    let req = http.last_request().unwrap();
    assert_eq!(req.url, "http://api.test/rooms/");
    assert_eq!(req.header("Authorization"), Some("Bearer abc"));
}

#[tokio::test]
async fn omits_authorization_without_token() {
    let (http, client) = client_with_token(None);
    http.mock_response(HttpMethod::Get, "http://api.test/rooms/", 200, "[]");
    client.send(&ListRoomsRequest).await.unwrap();
    assert_eq!(http.last_request().unwrap().header("Authorization"), None);
}

#[tokio::test]
async fn token_is_read_from_session_storage_on_every_call() {
    let storage = MemoryStorage::new();
    let http = std::rc::Rc::new(MockHttpClient::new());
    let client = ApiClient::new(
        ClientConfig::new(BASE),
        http.clone(),
        PersistedToken::new(storage.clone()),
    );
    http.mock_response(HttpMethod::Get, "http://api.test/rooms/", 200, "[]");

    client.send(&ListRoomsRequest).await.unwrap();
    assert_eq!(http.last_request().unwrap().header("Authorization"), None);

    let mut store = SessionStore::new(storage);
    store.login("fresh", "tenant", "Anna", "a@example.com", None);
    client.send(&ListRoomsRequest).await.unwrap();
    assert_eq!(
        http.last_request().unwrap().header("Authorization"),
        Some("Bearer fresh")
    );

    store.logout();
    client.send(&ListRoomsRequest).await.unwrap();
    assert_eq!(http.last_request().unwrap().header("Authorization"), None);
}

#[tokio::test]
async fn login_is_form_encoded() {
    let (http, client) = client_with_token(None);
    http.mock_response(
        HttpMethod::Post,
        "http://api.test/auth/login",
        200,
        r#"{"access_token":"t","user_role":"admin","user_name":"Boss"}"#,
    );

    let resp = client
        .send(&LoginRequest {
            username: "boss".into(),
            password: "pw".into(),
        })
        .await
        .unwrap();
    assert_eq!(resp.access_token, "t");
    assert_eq!(resp.user_role, "admin");

    let req = http.last_request().unwrap();
    assert_eq!(
        req.header("Content-Type"),
        Some("application/x-www-form-urlencoded")
    );
    assert_eq!(
        req.body,
        RequestBody::Form(vec![
            ("username".into(), "boss".into()),
            ("password".into(), "pw".into())
        ])
    );
}

#[tokio::test]
async fn multipart_requests_leave_content_type_to_the_browser() {
    let (http, client) = client_with_token(Some("abc"));
    http.mock_response(
        HttpMethod::Post,
        "http://api.test/ai/ocr/id-card",
        200,
        r#"{"detected_id_card":"1101700230760","id_type":"thai_id"}"#,
    );

    let resp = client
        .send(&OcrIdCardRequest {
            image: UploadFile::new("id.jpg", "image/jpeg", vec![0xff, 0xd8]),
        })
        .await
        .unwrap();
    assert_eq!(resp.detected_id_card.as_deref(), Some("1101700230760"));

    let req = http.last_request().unwrap();
    assert_eq!(req.header("Content-Type"), None);
    assert!(matches!(req.body, RequestBody::Multipart(_)));
}

#[tokio::test]
async fn json_requests_set_content_type() {
    let (http, client) = client_with_token(Some("abc"));
    http.mock_response(HttpMethod::Post, "http://api.test/bookings/5/approve", 200, "{}");
    client
        .send(&ApproveBookingRequest {
            id: 5,
            contract_text: "deposit 9000".into(),
        })
        .await
        .unwrap();
    assert_eq!(
        http.last_request().unwrap().header("Content-Type"),
        Some("application/json")
    );
}

#[tokio::test]
async fn empty_success_body_is_accepted() {
    let (http, client) = client_with_token(Some("abc"));
    http.mock_response(HttpMethod::Post, "http://api.test/notifications/read-all", 204, "");
    assert!(client.send(&ReadAllNotificationsRequest).await.is_ok());
}

#[tokio::test]
async fn server_errors_carry_status_and_detail() {
    let (http, client) = client_with_token(Some("abc"));
    http.mock_response(
        HttpMethod::Get,
        "http://api.test/rooms/",
        401,
        r#"{"detail":"Could not validate credentials"}"#,
    );

    let err = client.send(&ListRoomsRequest).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(err.message, "Could not validate credentials");
}

#[tokio::test]
async fn network_and_decode_failures_are_distinguished() {
    let (http, client) = client_with_token(None);
    http.offline.set(true);
    let err = client.send(&ListRoomsRequest).await.unwrap_err();
    assert_eq!(err.kind, crate::error::PortalErrorKind::Network);

    http.offline.set(false);
    http.mock_response(HttpMethod::Get, "http://api.test/rooms/", 200, r#"{"rooms":[]}"#);
    let err = client.send(&ListRoomsRequest).await.unwrap_err();
    assert_eq!(err.kind, crate::error::PortalErrorKind::Decode);
}

#[tokio::test]
async fn decodes_room_list() {
    let (http, client) = client_with_token(None);
    http.mock_response(
        HttpMethod::Get,
        "http://api.test/rooms/",
        200,
        r#"[{"id":1,"room_number":"A-101","building":"A","floor":1,"room_type":"Studio",
            "price":4500,"amenities":["wifi"],"status":"available"}]"#,
    );
    let rooms: Vec<Room> = client.send(&ListRoomsRequest).await.unwrap();
    assert_eq!(rooms.len(), 1);
    assert!(rooms[0].is_available());
    assert_eq!(rooms[0].image_url, None);
}
