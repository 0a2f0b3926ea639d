//! 领域模型
//!
//! 与后端 REST API 的 JSON 结构一一对应（字段均为 snake_case）。
//! 时间字段保持为 ISO-8601 字符串，需要排序或格式化时再用 `chrono` 解析。

use serde::{Deserialize, Serialize};

use crate::date::parse_datetime;

// =========================================================
// 会话与角色
// =========================================================

/// 用户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Tenant,
    #[default]
    Guest,
}

impl Role {
    /// 解析登录接口返回的角色字符串
    ///
    /// 空字符串视为 `tenant`，未知字符串视为 `guest`。
    pub fn from_login(raw: &str) -> Self {
        match raw.trim() {
            "" | "tenant" => Role::Tenant,
            "admin" => Role::Admin,
            _ => Role::Guest,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Tenant => "tenant",
            Role::Guest => "guest",
        }
    }
}

/// 当前登录用户（持久化到 LocalStorage 的 `user` 键）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub user_name: String,
    pub user_role: Role,
    pub email: String,
    #[serde(default)]
    pub profile_image: Option<String>,
}

impl AuthUser {
    /// 头像占位字母
    pub fn initial(&self) -> String {
        self.user_name
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}

// =========================================================
// 房间
// =========================================================

pub const ROOM_STATUS_AVAILABLE: &str = "available";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub room_number: String,
    pub building: String,
    pub floor: i32,
    pub room_type: String,
    pub price: f64,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default)]
    pub promotion: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    pub status: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl Room {
    pub fn is_available(&self) -> bool {
        self.status == ROOM_STATUS_AVAILABLE
    }

    pub fn has_amenities(&self, wanted: &[String]) -> bool {
        wanted.iter().all(|a| self.amenities.contains(a))
    }
}

/// 设施选项：(后端存储值, 显示名)
pub const AMENITIES: &[(&str, &str)] = &[
    ("แอร์", "Air conditioning"),
    ("เฟอร์นิเจอร์", "Furniture"),
    ("เครื่องทำน้ำอุ่น", "Water heater"),
    ("Wifi", "Wi-Fi"),
    ("ที่จอดรถ", "Parking"),
    ("TV", "TV"),
    ("ตู้เย็น", "Refrigerator"),
];

/// 设施显示名，未知值原样显示
pub fn amenity_label(value: &str) -> &str {
    AMENITIES
        .iter()
        .find(|(v, _)| *v == value)
        .map(|(_, label)| *label)
        .unwrap_or(value)
}

/// 勾选或取消一个设施
pub fn toggle_amenity(selected: &mut Vec<String>, value: &str) {
    if let Some(pos) = selected.iter().position(|a| a == value) {
        selected.remove(pos);
    } else {
        selected.push(value.to_string());
    }
}

/// 公共首页的房间筛选：仅可预订的房间，且包含所有选中的设施
pub fn filter_rooms<'a>(rooms: &'a [Room], amenities: &[String]) -> Vec<&'a Room> {
    rooms
        .iter()
        .filter(|r| r.is_available())
        .filter(|r| r.has_amenities(amenities))
        .collect()
}

/// 我的房间 (`/my-room`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MyRoom {
    pub room_id: i64,
    #[serde(default)]
    pub building: Option<String>,
    #[serde(default)]
    pub floor: Option<i32>,
    #[serde(default)]
    pub status: Option<String>,
}

// =========================================================
// 预订申请
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

/// AI 证件识别结论（仅供参考，不能替代管理员审批）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AiStatus {
    Pass,
    Fail,
    Pending,
    Warning,
    Error,
    #[serde(other)]
    Unknown,
}

/// 徽章色调
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Warning,
    Error,
    Info,
    Neutral,
}

impl Tone {
    /// DaisyUI badge class
    pub fn badge_class(&self) -> &'static str {
        match self {
            Tone::Success => "badge badge-success",
            Tone::Warning => "badge badge-warning",
            Tone::Error => "badge badge-error",
            Tone::Info => "badge badge-info",
            Tone::Neutral => "badge badge-ghost",
        }
    }
}

pub const AI_CONFIDENCE_THRESHOLD: f64 = 80.0;

impl AiStatus {
    pub fn tone(&self, confidence: f64) -> Tone {
        match self {
            AiStatus::Pass if confidence >= AI_CONFIDENCE_THRESHOLD => Tone::Success,
            AiStatus::Fail | AiStatus::Error => Tone::Error,
            _ => Tone::Warning,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingRequest {
    pub id: i64,
    pub room_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub id_card_number: String,
    pub ai_status: AiStatus,
    #[serde(default)]
    pub ai_confidence: f64,
    #[serde(default)]
    pub ai_remark: String,
    pub status: BookingStatus,
    pub created_at: String,
    #[serde(default)]
    pub id_image_url: Option<String>,
    #[serde(default)]
    pub contract_pdf_url: Option<String>,
    #[serde(default)]
    pub agreed_monthly_rent: Option<f64>,
    #[serde(default)]
    pub deposit_amount: Option<f64>,
}

impl BookingRequest {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn is_pending(&self) -> bool {
        self.status == BookingStatus::Pending
    }
}

/// 按创建时间倒序排列（最新的在前），无法解析的时间排在最后
pub fn sort_newest_first(bookings: &mut [BookingRequest]) {
    bookings.sort_by(|a, b| {
        let ta = parse_datetime(&a.created_at);
        let tb = parse_datetime(&b.created_at);
        tb.cmp(&ta)
    });
}

// =========================================================
// 租户 & 合同
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tenant {
    #[serde(default)]
    pub id: Option<i64>,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub id_card_number: String,
    pub status: String,
}

impl Tenant {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// 押金状态
///
/// `pending_review` 只属于押金合同，与付款单状态是两个不同的枚举。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositStatus {
    Pending,
    PendingReview,
    Paid,
    Overdue,
    #[serde(other)]
    Unknown,
}

impl DepositStatus {
    pub fn label(&self) -> &'static str {
        match self {
            DepositStatus::Paid => "Deposit paid",
            DepositStatus::Overdue => "Deposit overdue",
            DepositStatus::PendingReview => "Payment under review",
            DepositStatus::Pending | DepositStatus::Unknown => "Awaiting deposit",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            DepositStatus::Paid => Tone::Success,
            DepositStatus::Overdue => Tone::Error,
            DepositStatus::PendingReview => Tone::Info,
            DepositStatus::Pending | DepositStatus::Unknown => Tone::Warning,
        }
    }

    /// 是否还允许提交押金转账凭证
    pub fn accepts_payment(&self) -> bool {
        matches!(self, DepositStatus::Pending | DepositStatus::Overdue)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contract {
    pub contract_id: i64,
    pub room_id: i64,
    pub deposit_status: DepositStatus,
    pub deposit_amount: f64,
    #[serde(default)]
    pub deposit_due_date: Option<String>,
    #[serde(default)]
    pub contract_pdf_url: Option<String>,
    #[serde(default)]
    pub deposit_slip_url: Option<String>,
}

/// `/contracts/by-booking/{id}` 的响应
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractLink {
    pub contract_id: i64,
    #[serde(default)]
    pub contract_pdf_url: Option<String>,
}

// =========================================================
// 付款
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Approved,
    Rejected,
    #[serde(other)]
    Unknown,
}

impl PaymentStatus {
    pub fn label(&self) -> &'static str {
        match self {
            PaymentStatus::Approved => "Approved",
            PaymentStatus::Rejected => "Rejected",
            PaymentStatus::Pending => "Awaiting review",
            PaymentStatus::Unknown => "Unknown",
        }
    }

    pub fn tone(&self) -> Tone {
        match self {
            PaymentStatus::Approved => Tone::Success,
            PaymentStatus::Rejected => Tone::Error,
            PaymentStatus::Pending => Tone::Warning,
            PaymentStatus::Unknown => Tone::Neutral,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub payment_id: i64,
    pub contract_id: i64,
    #[serde(default)]
    pub tenant_name: Option<String>,
    pub payer_name: String,
    pub amount_paid: f64,
    pub payment_status: PaymentStatus,
    pub created_at: String,
    #[serde(default)]
    pub room_no: Option<i64>,
    #[serde(default)]
    pub slip_image_url: Option<String>,
}

// =========================================================
// 公告
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Announcement {
    #[serde(default)]
    pub id: Option<i64>,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub created_at: Option<String>,
}

// =========================================================
// 水电表
// =========================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MeterType {
    #[default]
    Water,
    Electric,
}

impl MeterType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeterType::Water => "water",
            MeterType::Electric => "electric",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MeterStatus {
    #[default]
    Active,
    Maintenance,
    Inactive,
}

impl MeterStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeterStatus::Active => "active",
            MeterStatus::Maintenance => "maintenance",
            MeterStatus::Inactive => "inactive",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeterDevice {
    #[serde(default)]
    pub id: Option<i64>,
    pub meter_code: String,
    pub meter_type: MeterType,
    pub room_id: i64,
    #[serde(default)]
    pub room_label: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub location_note: Option<String>,
    pub status: MeterStatus,
    #[serde(default)]
    pub installed_at: Option<String>,
    #[serde(default)]
    pub removed_at: Option<String>,
}

/// 最近一期抄表记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastReadingRow {
    pub room_label: String,
    pub period_label: String,
    #[serde(default)]
    pub water_reading: Option<f64>,
    #[serde(default)]
    pub electric_reading: Option<f64>,
    pub status: String,
}

// =========================================================
// 通知
// =========================================================

pub const NOTIFICATION_DEPOSIT_DUE: &str = "deposit_due";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub is_read: bool,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

/// `deposit_due` 通知附带的押金信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepositNotice {
    pub contract_id: i64,
    pub room_id: i64,
    pub deposit_status: DepositStatus,
}

/// 从通知列表中取出第一条押金到期提醒
pub fn deposit_notice(notifications: &[Notification]) -> Option<DepositNotice> {
    notifications
        .iter()
        .find(|n| n.kind == NOTIFICATION_DEPOSIT_DUE)
        .and_then(|n| n.data.clone())
        .and_then(|data| serde_json::from_value(data).ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct UnreadCount {
    #[serde(default)]
    pub unread_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn room(id: i64, status: &str, amenities: &[&str]) -> Room {
        Room {
            id,
            room_number: format!("A-{id}"),
            building: "A".into(),
            floor: 2,
            room_type: "Studio Standard".into(),
            price: 4500.0,
            amenities: amenities.iter().map(|s| s.to_string()).collect(),
            promotion: None,
            image_url: None,
            status: status.into(),
            description: None,
        }
    }

    #[test]
    fn filter_keeps_available_rooms_with_every_selected_amenity() {
        let rooms = vec![
            room(1, "available", &["wifi", "air"]),
            room(2, "available", &["wifi"]),
            room(3, "occupied", &["wifi", "air"]),
        ];

        let all: Vec<i64> = filter_rooms(&rooms, &[]).iter().map(|r| r.id).collect();
        assert_eq!(all, vec![1, 2]);

        let wanted = vec!["wifi".to_string(), "air".to_string()];
        let picked: Vec<i64> = filter_rooms(&rooms, &wanted).iter().map(|r| r.id).collect();
        assert_eq!(picked, vec![1]);
    }

    #[test]
    fn amenity_toggle_and_labels() {
        let mut selected = Vec::new();
        toggle_amenity(&mut selected, "Wifi");
        toggle_amenity(&mut selected, "TV");
        toggle_amenity(&mut selected, "Wifi");
        assert_eq!(selected, vec!["TV".to_string()]);
        assert_eq!(amenity_label("แอร์"), "Air conditioning");
        assert_eq!(amenity_label("Sauna"), "Sauna");
    }

    #[test]
    fn ai_tone_requires_confidence_for_success() {
        assert_eq!(AiStatus::Pass.tone(95.0), Tone::Success);
        assert_eq!(AiStatus::Pass.tone(60.0), Tone::Warning);
        assert_eq!(AiStatus::Fail.tone(99.0), Tone::Error);
        assert_eq!(AiStatus::Error.tone(0.0), Tone::Error);
        assert_eq!(AiStatus::Warning.tone(90.0), Tone::Warning);
    }

    #[test]
    fn unknown_status_values_do_not_break_decoding() {
        let status: DepositStatus = serde_json::from_str("\"refunded\"").unwrap();
        assert_eq!(status, DepositStatus::Unknown);
        let status: DepositStatus = serde_json::from_str("\"pending_review\"").unwrap();
        assert_eq!(status, DepositStatus::PendingReview);
        let status: PaymentStatus = serde_json::from_str("\"pending_review\"").unwrap();
        assert_eq!(status, PaymentStatus::Unknown);
    }

    #[test]
    fn bookings_sort_newest_first() {
        let raw = json!([
            {"id": 1, "room_id": 1, "first_name": "a", "last_name": "b", "phone": "0",
             "id_card_number": "x", "ai_status": "pass", "ai_confidence": 90.0, "ai_remark": "",
             "status": "pending", "created_at": "2025-01-01T08:00:00"},
            {"id": 2, "room_id": 1, "first_name": "a", "last_name": "b", "phone": "0",
             "id_card_number": "x", "ai_status": "warning", "ai_confidence": 40.0, "ai_remark": "",
             "status": "approved", "created_at": "2025-03-01T08:00:00Z"},
            {"id": 3, "room_id": 1, "first_name": "a", "last_name": "b", "phone": "0",
             "id_card_number": "x", "ai_status": "fail", "ai_confidence": 0.0, "ai_remark": "",
             "status": "rejected", "created_at": "garbage"}
        ]);
        let mut bookings: Vec<BookingRequest> = serde_json::from_value(raw).unwrap();
        sort_newest_first(&mut bookings);
        let ids: Vec<i64> = bookings.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }

    #[test]
    fn deposit_notice_is_read_from_notification_payload() {
        let list = vec![
            Notification {
                id: 1,
                title: "news".into(),
                message: "".into(),
                kind: "announcement".into(),
                is_read: false,
                data: None,
            },
            Notification {
                id: 2,
                title: "deposit".into(),
                message: "".into(),
                kind: NOTIFICATION_DEPOSIT_DUE.into(),
                is_read: false,
                data: Some(json!({"contract_id": 7, "room_id": 3, "deposit_status": "overdue"})),
            },
        ];
        let notice = deposit_notice(&list).unwrap();
        assert_eq!(notice.contract_id, 7);
        assert_eq!(notice.deposit_status, DepositStatus::Overdue);
    }

    #[test]
    fn login_role_defaults_to_tenant_when_blank() {
        assert_eq!(Role::from_login(""), Role::Tenant);
        assert_eq!(Role::from_login("admin"), Role::Admin);
        assert_eq!(Role::from_login("guest"), Role::Guest);
    }
}
