//! API 协议定义
//!
//! 每个后端接口对应一个实现了 [`ApiRequest`] 的请求类型，
//! 由它声明路径、方法、请求体编码和响应类型。

use serde::de::{DeserializeOwned, IgnoredAny};
use serde::{Deserialize, Serialize};

use crate::calendar::{CalendarEvent, EventPayload};
use crate::error::PortalResult;
use crate::models::{
    Announcement, BookingRequest, Contract, ContractLink, LastReadingRow, MeterDevice,
    MeterStatus, MeterType, MyRoom, Notification, Payment, Room, Tenant, UnreadCount,
};

/// HTTP Methods for API Requests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }
}

// =========================================================
// 请求体
// =========================================================

/// 待上传的文件（证件照、转账凭证、房间/水表图片、头像）
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, mime: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            mime: mime.into(),
            bytes,
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime.starts_with("image/")
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// multipart/form-data 请求体
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultipartForm {
    pub fields: Vec<(String, String)>,
    pub files: Vec<(String, UploadFile)>,
}

impl MultipartForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, name: &str, value: impl ToString) -> Self {
        self.fields.push((name.to_string(), value.to_string()));
        self
    }

    pub fn file(mut self, name: &str, file: UploadFile) -> Self {
        self.files.push((name.to_string(), file));
        self
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    Json(String),
    /// application/x-www-form-urlencoded 键值对
    Form(Vec<(String, String)>),
    Multipart(MultipartForm),
}

impl RequestBody {
    pub fn json<T: Serialize>(value: &T) -> PortalResult<Self> {
        Ok(RequestBody::Json(serde_json::to_string(value)?))
    }

    /// 需要显式设置的 Content-Type
    ///
    /// multipart 由浏览器自动生成带 boundary 的头，不能手动设置。
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            RequestBody::Json(_) => Some("application/json"),
            RequestBody::Form(_) => Some("application/x-www-form-urlencoded"),
            RequestBody::Empty | RequestBody::Multipart(_) => None,
        }
    }
}

/// A trait that defines the request-response relationship and metadata for an API endpoint.
pub trait ApiRequest {
    /// The response type returned by this request.
    type Response: DeserializeOwned;
    /// The HTTP method.
    const METHOD: HttpMethod;
    /// The URL path (relative to the API base).
    fn path(&self) -> String;
    /// The encoded request body.
    fn body(&self) -> PortalResult<RequestBody> {
        Ok(RequestBody::Empty)
    }
}

/// 为 JSON 请求体的类型实现 `ApiRequest`
macro_rules! json_request {
    ($ty:ty, $method:ident, $resp:ty, |$s:ident| $path:expr) => {
        impl ApiRequest for $ty {
            type Response = $resp;
            const METHOD: HttpMethod = HttpMethod::$method;
            fn path(&self) -> String {
                let $s = self;
                $path
            }
            fn body(&self) -> PortalResult<RequestBody> {
                RequestBody::json(self)
            }
        }
    };
}

/// 为没有请求体的类型实现 `ApiRequest`
macro_rules! empty_request {
    ($ty:ty, $method:ident, $resp:ty, |$s:ident| $path:expr) => {
        impl ApiRequest for $ty {
            type Response = $resp;
            const METHOD: HttpMethod = HttpMethod::$method;
            fn path(&self) -> String {
                #[allow(unused_variables)]
                let $s = self;
                $path
            }
        }
    };
}

// =========================================================
// 认证 /auth
// =========================================================

/// OAuth2 密码模式登录（表单编码），username 可以是用户名或邮箱
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub user_role: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub profile_image: Option<String>,
}

impl ApiRequest for LoginRequest {
    type Response = LoginResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/auth/login".into()
    }
    fn body(&self) -> PortalResult<RequestBody> {
        Ok(RequestBody::Form(vec![
            ("username".into(), self.username.clone()),
            ("password".into(), self.password.clone()),
        ]))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

json_request!(RegisterRequest, Post, IgnoredAny, |_r| "/auth/register".into());

/// 请求重置验证码，`email` 字段也接受手机号
#[derive(Debug, Clone, Serialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

json_request!(ForgotPasswordRequest, Post, IgnoredAny, |_r| "/auth/forgot-password".into());

#[derive(Debug, Clone, Serialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub code: String,
    pub new_password: String,
}

json_request!(ResetPasswordRequest, Post, IgnoredAny, |_r| "/auth/reset-password".into());

/// 修改个人资料 (multipart PATCH)
#[derive(Debug, Clone)]
pub struct UpdateProfileRequest {
    pub first_name: String,
    pub last_name: String,
    pub image: Option<UploadFile>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ProfileResponse {
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub profile_image: Option<String>,
}

impl ProfileResponse {
    pub fn display_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

impl ApiRequest for UpdateProfileRequest {
    type Response = ProfileResponse;
    const METHOD: HttpMethod = HttpMethod::Patch;
    fn path(&self) -> String {
        "/auth/me".into()
    }
    fn body(&self) -> PortalResult<RequestBody> {
        let mut form = MultipartForm::new()
            .text("first_name", &self.first_name)
            .text("last_name", &self.last_name);
        if let Some(image) = &self.image {
            form = form.file("file", image.clone());
        }
        Ok(RequestBody::Multipart(form))
    }
}

// =========================================================
// 房间 /rooms
// =========================================================

#[derive(Debug, Clone, Default)]
pub struct ListRoomsRequest;

empty_request!(ListRoomsRequest, Get, Vec<Room>, |_r| "/rooms/".into());

#[derive(Debug, Clone)]
pub struct CreateRoomRequest {
    pub room_number: String,
    pub room_type: String,
    pub price: String,
    pub promotion: String,
    pub building: String,
    pub floor: String,
    pub amenities: Vec<String>,
    pub image: UploadFile,
}

impl ApiRequest for CreateRoomRequest {
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/rooms/".into()
    }
    fn body(&self) -> PortalResult<RequestBody> {
        // 设施列表以 JSON 字符串形式放在表单字段中
        let amenities = serde_json::to_string(&self.amenities)?;
        Ok(RequestBody::Multipart(
            MultipartForm::new()
                .text("room_number", &self.room_number)
                .text("room_type", &self.room_type)
                .text("price", &self.price)
                .text("promotion", &self.promotion)
                .text("building", &self.building)
                .text("floor", &self.floor)
                .text("amenities", amenities)
                .file("file", self.image.clone()),
        ))
    }
}

#[derive(Debug, Clone)]
pub struct DeleteRoomRequest {
    pub id: i64,
}

empty_request!(DeleteRoomRequest, Delete, IgnoredAny, |r| format!("/rooms/{}", r.id));

// =========================================================
// 预订 /bookings
// =========================================================

#[derive(Debug, Clone, Default)]
pub struct ListBookingsRequest;

empty_request!(ListBookingsRequest, Get, Vec<BookingRequest>, |_r| "/bookings/".into());

/// 审批通过：服务端生成押金合同 PDF 并创建租户
#[derive(Debug, Clone, Serialize)]
pub struct ApproveBookingRequest {
    #[serde(skip)]
    pub id: i64,
    pub contract_text: String,
}

json_request!(ApproveBookingRequest, Post, IgnoredAny, |r| format!(
    "/bookings/{}/approve",
    r.id
));

#[derive(Debug, Clone)]
pub struct RejectBookingRequest {
    pub id: i64,
}

empty_request!(RejectBookingRequest, Post, IgnoredAny, |r| format!(
    "/bookings/{}/reject",
    r.id
));

/// 提交预订申请（表单字段 + 证件照）
#[derive(Debug, Clone, PartialEq)]
pub struct SubmitBookingRequest {
    pub room_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub id_card_number: String,
    pub image: UploadFile,
}

impl ApiRequest for SubmitBookingRequest {
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/bookings/submit".into()
    }
    fn body(&self) -> PortalResult<RequestBody> {
        Ok(RequestBody::Multipart(
            MultipartForm::new()
                .text("room_id", self.room_id)
                .text("first_name", &self.first_name)
                .text("last_name", &self.last_name)
                .text("phone", &self.phone)
                .text("id_card_number", &self.id_card_number)
                .file("file", self.image.clone()),
        ))
    }
}

// =========================================================
// 租户 /tenants
// =========================================================

#[derive(Debug, Clone, Default)]
pub struct ListTenantsRequest;

empty_request!(ListTenantsRequest, Get, Vec<Tenant>, |_r| "/tenants/".into());

#[derive(Debug, Clone, Serialize)]
pub struct CreateTenantRequest {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub id_card_number: String,
    pub status: String,
}

json_request!(CreateTenantRequest, Post, IgnoredAny, |_r| "/tenants/".into());

// =========================================================
// 合同 /contracts & /my-room
// =========================================================

#[derive(Debug, Clone)]
pub struct ContractByBookingRequest {
    pub booking_id: i64,
}

empty_request!(ContractByBookingRequest, Get, ContractLink, |r| format!(
    "/contracts/by-booking/{}",
    r.booking_id
));

#[derive(Debug, Clone, Default)]
pub struct MyLatestContractRequest;

empty_request!(MyLatestContractRequest, Get, Contract, |_r| "/contracts/me/latest".into());

#[derive(Debug, Clone, Default)]
pub struct MyRoomRequest;

empty_request!(MyRoomRequest, Get, MyRoom, |_r| "/my-room".into());

// =========================================================
// 付款 /payments
// =========================================================

/// 租户提交押金转账凭证（字段名为 camelCase，与后端表单一致）
#[derive(Debug, Clone, PartialEq)]
pub struct CreatePaymentRequest {
    pub contract_id: i64,
    pub bank_name: String,
    pub reference_number: String,
    pub amount_paid: f64,
    pub payer_name: String,
    pub slip: UploadFile,
}

impl ApiRequest for CreatePaymentRequest {
    type Response = IgnoredAny;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/payments/create".into()
    }
    fn body(&self) -> PortalResult<RequestBody> {
        Ok(RequestBody::Multipart(
            MultipartForm::new()
                .text("contractId", self.contract_id)
                .text("bankName", &self.bank_name)
                .text("referenceNumber", &self.reference_number)
                .text("amountPaid", self.amount_paid)
                .text("payerName", &self.payer_name)
                .file("slipImage", self.slip.clone()),
        ))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListAdminPaymentsRequest;

empty_request!(ListAdminPaymentsRequest, Get, Vec<Payment>, |_r| "/payments/admin".into());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewAction::Approve => "approve",
            ReviewAction::Reject => "reject",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReviewPaymentRequest {
    pub payment_id: i64,
    pub action: ReviewAction,
}

empty_request!(ReviewPaymentRequest, Post, Payment, |r| format!(
    "/payments/{}/{}",
    r.payment_id,
    r.action.as_str()
));

// =========================================================
// 公告 /announcements
// =========================================================

#[derive(Debug, Clone, Default)]
pub struct ListAnnouncementsRequest;

empty_request!(ListAnnouncementsRequest, Get, Vec<Announcement>, |_r| "/announcements/".into());

#[derive(Debug, Clone, Serialize)]
pub struct AnnouncementPayload {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateAnnouncementRequest(pub AnnouncementPayload);

json_request!(CreateAnnouncementRequest, Post, IgnoredAny, |_r| "/announcements/".into());

#[derive(Debug, Clone, Serialize)]
pub struct UpdateAnnouncementRequest {
    #[serde(skip)]
    pub id: i64,
    #[serde(flatten)]
    pub payload: AnnouncementPayload,
}

json_request!(UpdateAnnouncementRequest, Put, IgnoredAny, |r| format!(
    "/announcements/{}",
    r.id
));

#[derive(Debug, Clone)]
pub struct DeleteAnnouncementRequest {
    pub id: i64,
}

empty_request!(DeleteAnnouncementRequest, Delete, IgnoredAny, |r| format!(
    "/announcements/{}",
    r.id
));

// =========================================================
// 水电表 /meters
// =========================================================

#[derive(Debug, Clone, Default)]
pub struct ListMetersRequest;

empty_request!(ListMetersRequest, Get, Vec<MeterDevice>, |_r| "/meters/".into());

#[derive(Debug, Clone, Default)]
pub struct LastReadingsRequest;

empty_request!(LastReadingsRequest, Get, Vec<LastReadingRow>, |_r| "/meters/last-readings"
    .into());

#[derive(Debug, Clone)]
pub struct CreateMeterRequest {
    pub meter_code: String,
    pub meter_type: MeterType,
    pub room_id: i64,
    pub status: MeterStatus,
    pub location_note: String,
    pub installed_at: String,
    pub removed_at: String,
    pub image: Option<UploadFile>,
}

impl ApiRequest for CreateMeterRequest {
    type Response = MeterDevice;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/meters/".into()
    }
    fn body(&self) -> PortalResult<RequestBody> {
        let mut form = MultipartForm::new()
            .text("meter_code", &self.meter_code)
            .text("meter_type", self.meter_type.as_str())
            .text("room_id", self.room_id)
            .text("status", self.status.as_str());
        // 可选字段留空时不发送
        for (name, value) in [
            ("location_note", &self.location_note),
            ("installed_at", &self.installed_at),
            ("removed_at", &self.removed_at),
        ] {
            if !value.trim().is_empty() {
                form = form.text(name, value.trim());
            }
        }
        if let Some(image) = &self.image {
            form = form.file("file", image.clone());
        }
        Ok(RequestBody::Multipart(form))
    }
}

// =========================================================
// 日历 /calendar
// =========================================================

pub const ADMIN_EVENTS_PATH: &str = "/calendar/admin-events";
pub const MY_EVENTS_PATH: &str = "/calendar/my-events";

#[derive(Debug, Clone, Copy, Default)]
pub struct ListAdminEventsRequest;

empty_request!(ListAdminEventsRequest, Get, Vec<CalendarEvent>, |_r| ADMIN_EVENTS_PATH.into());

#[derive(Debug, Clone)]
pub struct CreateAdminEventRequest(pub EventPayload);

impl ApiRequest for CreateAdminEventRequest {
    type Response = CalendarEvent;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        ADMIN_EVENTS_PATH.into()
    }
    fn body(&self) -> PortalResult<RequestBody> {
        RequestBody::json(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateAdminEventRequest {
    pub id: i64,
    pub payload: EventPayload,
}

impl ApiRequest for UpdateAdminEventRequest {
    type Response = CalendarEvent;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("{}/{}", ADMIN_EVENTS_PATH, self.id)
    }
    fn body(&self) -> PortalResult<RequestBody> {
        RequestBody::json(&self.payload)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteAdminEventRequest {
    pub id: i64,
}

empty_request!(DeleteAdminEventRequest, Delete, IgnoredAny, |r| format!(
    "{}/{}",
    ADMIN_EVENTS_PATH, r.id
));

#[derive(Debug, Clone, Copy, Default)]
pub struct ListMyEventsRequest;

empty_request!(ListMyEventsRequest, Get, Vec<CalendarEvent>, |_r| MY_EVENTS_PATH.into());

#[derive(Debug, Clone)]
pub struct CreateMyEventRequest(pub EventPayload);

impl ApiRequest for CreateMyEventRequest {
    type Response = CalendarEvent;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        MY_EVENTS_PATH.into()
    }
    fn body(&self) -> PortalResult<RequestBody> {
        RequestBody::json(&self.0)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateMyEventRequest {
    pub id: i64,
    pub payload: EventPayload,
}

impl ApiRequest for UpdateMyEventRequest {
    type Response = CalendarEvent;
    const METHOD: HttpMethod = HttpMethod::Put;
    fn path(&self) -> String {
        format!("{}/{}", MY_EVENTS_PATH, self.id)
    }
    fn body(&self) -> PortalResult<RequestBody> {
        RequestBody::json(&self.payload)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteMyEventRequest {
    pub id: i64,
}

empty_request!(DeleteMyEventRequest, Delete, IgnoredAny, |r| format!(
    "{}/{}",
    MY_EVENTS_PATH, r.id
));

// =========================================================
// 通知 /notifications
// =========================================================

#[derive(Debug, Clone, Default)]
pub struct MyNotificationsRequest;

empty_request!(MyNotificationsRequest, Get, Vec<Notification>, |_r| "/notifications/me".into());

#[derive(Debug, Clone, Default)]
pub struct UnreadCountRequest;

empty_request!(UnreadCountRequest, Get, UnreadCount, |_r| "/notifications/me/unread-count"
    .into());

#[derive(Debug, Clone, Default)]
pub struct ReadAllNotificationsRequest;

empty_request!(ReadAllNotificationsRequest, Post, IgnoredAny, |_r| "/notifications/read-all"
    .into());

// =========================================================
// AI 识别 /ai
// =========================================================

/// 证件 OCR
#[derive(Debug, Clone, PartialEq)]
pub struct OcrIdCardRequest {
    pub image: UploadFile,
}

pub const ID_TYPE_THAI: &str = "thai_id";
pub const ID_TYPE_PASSPORT: &str = "passport";

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct IdCardOcrResponse {
    #[serde(default)]
    pub detected_id_card: Option<String>,
    #[serde(default)]
    pub id_type: Option<String>,
    #[serde(default)]
    pub thai_first_name: Option<String>,
    #[serde(default)]
    pub thai_last_name: Option<String>,
    #[serde(default)]
    pub eng_first_name: Option<String>,
    #[serde(default)]
    pub eng_last_name: Option<String>,
}

impl ApiRequest for OcrIdCardRequest {
    type Response = IdCardOcrResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/ai/ocr/id-card".into()
    }
    fn body(&self) -> PortalResult<RequestBody> {
        Ok(RequestBody::Multipart(
            MultipartForm::new().file("file", self.image.clone()),
        ))
    }
}

/// 转账凭证 OCR
#[derive(Debug, Clone, PartialEq)]
pub struct OcrSlipRequest {
    pub image: UploadFile,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SlipOcrResponse {
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub reference_number: Option<String>,
    /// 可能是数字也可能是字符串
    #[serde(default)]
    pub amount: Option<serde_json::Value>,
    #[serde(default)]
    pub payer_name: Option<String>,
}

impl SlipOcrResponse {
    pub fn amount_text(&self) -> Option<String> {
        match self.amount.as_ref()? {
            serde_json::Value::Number(n) => Some(n.to_string()),
            serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            _ => None,
        }
    }
}

impl ApiRequest for OcrSlipRequest {
    type Response = SlipOcrResponse;
    const METHOD: HttpMethod = HttpMethod::Post;
    fn path(&self) -> String {
        "/ai/ocr-slip".into()
    }
    fn body(&self) -> PortalResult<RequestBody> {
        Ok(RequestBody::Multipart(
            MultipartForm::new().file("file", self.image.clone()),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_carry_identifiers() {
        assert_eq!(
            ReviewPaymentRequest {
                payment_id: 4,
                action: ReviewAction::Reject
            }
            .path(),
            "/payments/4/reject"
        );
        assert_eq!(DeleteMyEventRequest { id: 9 }.path(), "/calendar/my-events/9");
        assert_eq!(
            ContractByBookingRequest { booking_id: 12 }.path(),
            "/contracts/by-booking/12"
        );
    }

    #[test]
    fn approve_body_excludes_path_id() {
        let req = ApproveBookingRequest {
            id: 3,
            contract_text: "terms".into(),
        };
        assert_eq!(req.path(), "/bookings/3/approve");
        assert_eq!(
            req.body().unwrap(),
            RequestBody::Json(r#"{"contract_text":"terms"}"#.into())
        );
    }

    #[test]
    fn room_amenities_are_json_encoded() {
        let req = CreateRoomRequest {
            room_number: "A-201".into(),
            room_type: "Studio Standard".into(),
            price: "4500".into(),
            promotion: String::new(),
            building: "A".into(),
            floor: "2".into(),
            amenities: vec!["wifi".into(), "air".into()],
            image: UploadFile::new("room.jpg", "image/jpeg", vec![1, 2]),
        };
        let RequestBody::Multipart(form) = req.body().unwrap() else {
            panic!("room creation must be multipart");
        };
        assert_eq!(form.field("amenities"), Some(r#"["wifi","air"]"#));
        assert_eq!(form.files.len(), 1);
        assert_eq!(form.files[0].0, "file");
    }

    #[test]
    fn meter_form_skips_blank_optional_fields() {
        let req = CreateMeterRequest {
            meter_code: "W-01".into(),
            meter_type: MeterType::Electric,
            room_id: 5,
            status: MeterStatus::Maintenance,
            location_note: "  ".into(),
            installed_at: "2025-01-01".into(),
            removed_at: String::new(),
            image: None,
        };
        let RequestBody::Multipart(form) = req.body().unwrap() else {
            panic!("meter creation must be multipart");
        };
        assert_eq!(form.field("meter_type"), Some("electric"));
        assert_eq!(form.field("status"), Some("maintenance"));
        assert_eq!(form.field("installed_at"), Some("2025-01-01"));
        assert_eq!(form.field("location_note"), None);
        assert_eq!(form.field("removed_at"), None);
        assert!(form.files.is_empty());
    }

    #[test]
    fn slip_amount_accepts_number_or_text() {
        let parsed: SlipOcrResponse = serde_json::from_str(r#"{"amount": 4500}"#).unwrap();
        assert_eq!(parsed.amount_text().as_deref(), Some("4500"));
        let parsed: SlipOcrResponse = serde_json::from_str(r#"{"amount": " 4,500.00 "}"#).unwrap();
        assert_eq!(parsed.amount_text().as_deref(), Some("4,500.00"));
        let parsed: SlipOcrResponse = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(parsed.amount_text(), None);
    }
}
