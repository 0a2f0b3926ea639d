//! 日历：可见性与归属规则
//!
//! 管理员日历与租户日历共用同一套事件模型，区别在于：
//! - 管理员只能创建 `admin_only` / `shared` 事件，所有者恒为 admin
//! - 租户只能创建自己可见的 `tenant_only` 事件，所有者恒为 tenant
//! - 事件只能在创建者所在的页面编辑，另一方只能看到只读详情
//!
//! 后端返回的未知类别、可见性或所有者会落到 `Unknown`，不会让整个列表解析失败。

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::date::{display_datetime, parse_datetime};
use crate::error::{PortalError, PortalResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Task,
    #[default]
    Event,
    Appointment,
    #[serde(other)]
    Unknown,
}

impl EventCategory {
    pub const ALL: [EventCategory; 3] = [
        EventCategory::Task,
        EventCategory::Event,
        EventCategory::Appointment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventCategory::Task => "task",
            EventCategory::Appointment => "appointment",
            EventCategory::Event | EventCategory::Unknown => "event",
        }
    }

    pub fn from_value(raw: &str) -> Self {
        match raw {
            "task" => EventCategory::Task,
            "appointment" => EventCategory::Appointment,
            _ => EventCategory::Event,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EventCategory::Task => "Task",
            EventCategory::Event => "Event",
            EventCategory::Appointment => "Appointment",
            EventCategory::Unknown => "Other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    AdminOnly,
    TenantOnly,
    Shared,
    #[serde(other)]
    Unknown,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::AdminOnly => "admin_only",
            Visibility::TenantOnly => "tenant_only",
            Visibility::Shared => "shared",
            Visibility::Unknown => "unknown",
        }
    }

    pub fn from_value(raw: &str) -> Self {
        match raw {
            "admin_only" => Visibility::AdminOnly,
            "tenant_only" => Visibility::TenantOnly,
            _ => Visibility::Shared,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Visibility::AdminOnly => "Admins only",
            Visibility::TenantOnly => "Only me",
            Visibility::Shared => "Shared with tenants",
            Visibility::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnerRole {
    Admin,
    Tenant,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start: String,
    #[serde(default)]
    pub end: Option<String>,
    pub category: EventCategory,
    pub visibility: Visibility,
    pub owner_role: OwnerRole,
    #[serde(default)]
    pub room_id: Option<i64>,
    #[serde(default)]
    pub room_label: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

/// 创建/更新事件时发送的请求体
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventPayload {
    pub title: String,
    pub description: String,
    pub start: String,
    pub end: Option<String>,
    pub category: EventCategory,
    pub visibility: Visibility,
    pub owner_role: OwnerRole,
    pub room_id: Option<i64>,
}

/// 日历所在的页面
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CalendarSurface {
    Admin,
    Tenant,
}

impl CalendarSurface {
    pub fn owner(&self) -> OwnerRole {
        match self {
            CalendarSurface::Admin => OwnerRole::Admin,
            CalendarSurface::Tenant => OwnerRole::Tenant,
        }
    }

    /// 该页面可选择的可见性
    pub fn visibility_options(&self) -> &'static [Visibility] {
        match self {
            CalendarSurface::Admin => &[Visibility::Shared, Visibility::AdminOnly],
            CalendarSurface::Tenant => &[Visibility::TenantOnly],
        }
    }

    /// 强制执行归属规则
    pub fn coerce_visibility(&self, requested: Visibility) -> Visibility {
        match (self, requested) {
            (CalendarSurface::Tenant, _) => Visibility::TenantOnly,
            (CalendarSurface::Admin, Visibility::TenantOnly) => Visibility::Shared,
            (CalendarSurface::Admin, Visibility::Unknown) => Visibility::AdminOnly,
            (CalendarSurface::Admin, v) => v,
        }
    }

    /// 事件标题：管理员视图在前面加上房间号
    pub fn display_title(&self, event: &CalendarEvent) -> String {
        match (self, event.room_label.as_deref().filter(|l| !l.is_empty())) {
            (CalendarSurface::Admin, Some(room)) => format!("{} • {}", room, event.title),
            _ => event.title.clone(),
        }
    }

    /// 事件颜色：管理员视图按类别着色，租户视图按所有者着色
    pub fn color(&self, event: &CalendarEvent) -> &'static str {
        match self {
            CalendarSurface::Admin => match event.category {
                EventCategory::Task => "#0ea5e9",
                EventCategory::Appointment => "#22c55e",
                EventCategory::Event | EventCategory::Unknown => "#6366f1",
            },
            CalendarSurface::Tenant => match event.owner_role {
                OwnerRole::Tenant => "#22c55e",
                OwnerRole::Admin | OwnerRole::Unknown => "#0ea5e9",
            },
        }
    }
}

// =========================================================
// 编辑草稿
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct EventDraft {
    /// `None` 表示新建
    pub id: Option<i64>,
    pub title: String,
    pub description: String,
    pub start: String,
    pub end: String,
    pub category: EventCategory,
    pub visibility: Visibility,
    pub room_id: Option<i64>,
}

impl EventDraft {
    /// 从选中的日期区间新建，未给出结束时间时与开始时间相同
    pub fn from_selection(surface: CalendarSurface, start: &str, end: Option<&str>) -> Self {
        let end = end.filter(|e| !e.trim().is_empty()).unwrap_or(start);
        Self {
            id: None,
            title: String::new(),
            description: String::new(),
            start: start.to_string(),
            end: end.to_string(),
            category: EventCategory::Event,
            visibility: surface.coerce_visibility(Visibility::Shared),
            room_id: None,
        }
    }

    pub fn from_event(event: &CalendarEvent) -> Self {
        Self {
            id: Some(event.id),
            title: event.title.clone(),
            description: event.description.clone().unwrap_or_default(),
            start: event.start.clone(),
            end: event.end.clone().unwrap_or_default(),
            category: event.category,
            visibility: event.visibility,
            room_id: event.room_id,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn validate(&self) -> PortalResult<()> {
        if self.title.trim().is_empty() {
            return Err(PortalError::validation("Please enter a title"));
        }
        if self.start.trim().is_empty() {
            return Err(PortalError::validation("Please choose a start time"));
        }
        Ok(())
    }

    /// 按页面规则生成请求体
    pub fn to_payload(&self, surface: CalendarSurface) -> PortalResult<EventPayload> {
        self.validate()?;
        let description = self.description.trim().to_string();
        let end = Some(self.end.trim())
            .filter(|e| !e.is_empty())
            .map(str::to_string);
        Ok(EventPayload {
            title: self.title.trim().to_string(),
            description,
            start: self.start.trim().to_string(),
            end,
            category: match self.category {
                EventCategory::Unknown => EventCategory::Event,
                c => c,
            },
            visibility: surface.coerce_visibility(self.visibility),
            owner_role: surface.owner(),
            room_id: match surface {
                CalendarSurface::Admin => self.room_id,
                CalendarSurface::Tenant => None,
            },
        })
    }
}

/// 只读事件详情（查看对方创建的事件）
#[derive(Debug, Clone, PartialEq)]
pub struct EventDetail {
    pub owner: OwnerRole,
    pub title: String,
    pub description: Option<String>,
    pub start: String,
    pub end: Option<String>,
}

impl EventDetail {
    pub fn lines(&self) -> Vec<String> {
        let source = match self.owner {
            OwnerRole::Admin => "From management",
            OwnerRole::Tenant => "Tenant note",
            OwnerRole::Unknown => "Event",
        };
        let mut lines = vec![format!("{}: {}", source, self.title)];
        if let Some(desc) = &self.description {
            lines.push(format!("Details: {}", desc));
        }
        lines.push(format!("Starts: {}", self.start));
        if let Some(end) = &self.end {
            lines.push(format!("Ends: {}", end));
        }
        lines
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum EventAccess {
    Edit(EventDraft),
    ReadOnly(EventDetail),
}

/// 点击事件时决定打开编辑框还是只读详情
pub fn open_event(surface: CalendarSurface, event: &CalendarEvent) -> EventAccess {
    if event.owner_role != surface.owner() {
        return EventAccess::ReadOnly(EventDetail {
            owner: event.owner_role,
            title: event.title.clone(),
            description: event.description.clone().filter(|d| !d.trim().is_empty()),
            start: display_datetime(Some(event.start.as_str())),
            end: event
                .end
                .as_deref()
                .filter(|e| !e.trim().is_empty())
                .map(|e| display_datetime(Some(e))),
        });
    }
    EventAccess::Edit(EventDraft::from_event(event))
}

/// 租户日历可见的事件
///
/// - 管理员的 `shared` 事件
/// - 管理员针对本房间的 `admin_only` 事件
/// - 租户自己的 `tenant_only` 事件
pub fn tenant_feed(events: &[CalendarEvent], my_room: Option<i64>) -> Vec<CalendarEvent> {
    events
        .iter()
        .filter(|e| match (e.owner_role, e.visibility) {
            (OwnerRole::Admin, Visibility::Shared) => true,
            (OwnerRole::Admin, Visibility::AdminOnly) => {
                my_room.is_some() && e.room_id == my_room
            }
            (OwnerRole::Tenant, Visibility::TenantOnly) => true,
            _ => false,
        })
        .cloned()
        .collect()
}

/// 保存后更新本地列表：已存在则替换，否则追加
pub fn upsert_event(events: &mut Vec<CalendarEvent>, saved: CalendarEvent) {
    match events.iter_mut().find(|e| e.id == saved.id) {
        Some(slot) => *slot = saved,
        None => events.push(saved),
    }
}

// =========================================================
// 月视图
// =========================================================

/// 月视图的 6 × 7 日期网格，从包含当月 1 号的那一周的周日开始
pub fn month_grid(year: i32, month: u32) -> Option<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let offset = i64::from(first.weekday().num_days_from_sunday());
    let start = first - Duration::days(offset);
    Some((0..42).map(|i| start + Duration::days(i)).collect())
}

/// 上一个/下一个月
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

/// 覆盖某一天的事件（包含开始与结束日期）
pub fn events_on(events: &[CalendarEvent], day: NaiveDate) -> Vec<&CalendarEvent> {
    events
        .iter()
        .filter(|e| {
            let Some(start) = parse_datetime(&e.start).map(|dt| dt.date()) else {
                return false;
            };
            let end = e
                .end
                .as_deref()
                .and_then(parse_datetime)
                .map(|dt| dt.date())
                .filter(|end| *end >= start)
                .unwrap_or(start);
            start <= day && day <= end
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(id: i64, owner: OwnerRole, visibility: Visibility, room: Option<i64>) -> CalendarEvent {
        CalendarEvent {
            id,
            title: format!("event {id}"),
            description: None,
            start: "2025-03-01T09:00:00".into(),
            end: None,
            category: EventCategory::Event,
            visibility,
            owner_role: owner,
            room_id: room,
            room_label: room.map(|r| format!("A-{r}")),
            color: None,
        }
    }

    #[test]
    fn tenant_payloads_are_always_private() {
        for requested in [
            Visibility::AdminOnly,
            Visibility::Shared,
            Visibility::TenantOnly,
        ] {
            let mut draft =
                EventDraft::from_selection(CalendarSurface::Tenant, "2025-03-01T09:00", None);
            draft.title = "Laundry".into();
            draft.visibility = requested;
            draft.room_id = Some(7);
            let payload = draft.to_payload(CalendarSurface::Tenant).unwrap();
            assert_eq!(payload.visibility, Visibility::TenantOnly);
            assert_eq!(payload.owner_role, OwnerRole::Tenant);
            assert_eq!(payload.room_id, None);
        }
    }

    #[test]
    fn admin_payloads_never_use_tenant_only() {
        let mut draft = EventDraft::from_selection(CalendarSurface::Admin, "2025-03-01", None);
        draft.title = "  Water shutoff ".into();
        draft.visibility = Visibility::TenantOnly;
        let payload = draft.to_payload(CalendarSurface::Admin).unwrap();
        assert_eq!(payload.visibility, Visibility::Shared);
        assert_eq!(payload.owner_role, OwnerRole::Admin);
        assert_eq!(payload.title, "Water shutoff");

        draft.visibility = Visibility::AdminOnly;
        draft.room_id = Some(3);
        let payload = draft.to_payload(CalendarSurface::Admin).unwrap();
        assert_eq!(payload.visibility, Visibility::AdminOnly);
        assert_eq!(payload.room_id, Some(3));
    }

    #[test]
    fn selection_end_defaults_to_start() {
        let draft = EventDraft::from_selection(CalendarSurface::Admin, "2025-03-01", None);
        assert_eq!(draft.end, "2025-03-01");
        assert!(draft.is_new());
        let draft =
            EventDraft::from_selection(CalendarSurface::Tenant, "2025-03-01", Some("2025-03-03"));
        assert_eq!(draft.end, "2025-03-03");
        assert_eq!(draft.visibility, Visibility::TenantOnly);
    }

    #[test]
    fn drafts_require_title_and_start() {
        let draft = EventDraft::from_selection(CalendarSurface::Admin, "2025-03-01", None);
        assert!(draft.to_payload(CalendarSurface::Admin).unwrap_err().is_validation());

        let mut draft = EventDraft::from_selection(CalendarSurface::Admin, " ", None);
        draft.title = "x".into();
        assert!(draft.validate().is_err());
    }

    #[test]
    fn tenant_cannot_edit_admin_events() {
        let admin_event = event(1, OwnerRole::Admin, Visibility::Shared, None);
        match open_event(CalendarSurface::Tenant, &admin_event) {
            EventAccess::ReadOnly(detail) => {
                assert_eq!(detail.lines()[0], "From management: event 1");
                assert_eq!(detail.start, "2025-03-01 09:00");
            }
            EventAccess::Edit(_) => panic!("tenant must not edit admin events"),
        }

        let own = event(2, OwnerRole::Tenant, Visibility::TenantOnly, None);
        assert!(matches!(
            open_event(CalendarSurface::Tenant, &own),
            EventAccess::Edit(EventDraft { id: Some(2), .. })
        ));
        assert!(matches!(
            open_event(CalendarSurface::Admin, &admin_event),
            EventAccess::Edit(_)
        ));
    }

    #[test]
    fn admin_cannot_edit_tenant_events() {
        let note = event(3, OwnerRole::Tenant, Visibility::TenantOnly, Some(5));
        match open_event(CalendarSurface::Admin, &note) {
            EventAccess::ReadOnly(detail) => {
                assert_eq!(detail.owner, OwnerRole::Tenant);
                assert_eq!(detail.lines()[0], "Tenant note: event 3");
            }
            EventAccess::Edit(draft) => {
                let payload = draft.to_payload(CalendarSurface::Admin).unwrap();
                panic!(
                    "admin got an editor for a tenant note, save would send {:?} as {:?}",
                    payload.visibility, payload.owner_role
                );
            }
        }

        let mut orphan = event(4, OwnerRole::Admin, Visibility::Shared, None);
        orphan.owner_role = OwnerRole::Unknown;
        assert!(matches!(
            open_event(CalendarSurface::Admin, &orphan),
            EventAccess::ReadOnly(_)
        ));
        assert!(matches!(
            open_event(CalendarSurface::Tenant, &orphan),
            EventAccess::ReadOnly(_)
        ));
    }

    #[test]
    fn unexpected_backend_values_still_parse() {
        let raw = serde_json::json!([
            {
                "id": 1,
                "title": "Inspection",
                "start": "2025-03-01T09:00:00",
                "category": "maintenance",
                "visibility": "building_only",
                "owner_role": "staff"
            },
            {
                "id": 2,
                "title": "Party",
                "start": "2025-03-02T18:00:00",
                "category": "event",
                "visibility": "shared",
                "owner_role": "admin"
            }
        ]);
        let events: Vec<CalendarEvent> = serde_json::from_value(raw).unwrap();
        assert_eq!(events[0].category, EventCategory::Unknown);
        assert_eq!(events[0].visibility, Visibility::Unknown);
        assert_eq!(events[0].owner_role, OwnerRole::Unknown);

        let ids: Vec<i64> = tenant_feed(&events, Some(5)).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2]);

        let mut draft = EventDraft::from_event(&events[0]);
        draft.id = None;
        let payload = draft.to_payload(CalendarSurface::Admin).unwrap();
        assert_eq!(payload.category, EventCategory::Event);
        assert_eq!(payload.visibility, Visibility::AdminOnly);
    }

    #[test]
    fn tenant_feed_rules() {
        let events = vec![
            event(1, OwnerRole::Admin, Visibility::Shared, None),
            event(2, OwnerRole::Admin, Visibility::AdminOnly, Some(5)),
            event(3, OwnerRole::Admin, Visibility::AdminOnly, Some(6)),
            event(4, OwnerRole::Admin, Visibility::AdminOnly, None),
            event(5, OwnerRole::Tenant, Visibility::TenantOnly, None),
        ];
        let ids: Vec<i64> = tenant_feed(&events, Some(5)).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 5]);
        let ids: Vec<i64> = tenant_feed(&events, None).iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 5]);
    }

    #[test]
    fn display_rules_per_surface() {
        let mut ev = event(1, OwnerRole::Admin, Visibility::Shared, Some(5));
        ev.category = EventCategory::Task;
        assert_eq!(CalendarSurface::Admin.display_title(&ev), "A-5 • event 1");
        assert_eq!(CalendarSurface::Tenant.display_title(&ev), "event 1");
        assert_eq!(CalendarSurface::Admin.color(&ev), "#0ea5e9");
        assert_eq!(CalendarSurface::Tenant.color(&ev), "#0ea5e9");
        ev.owner_role = OwnerRole::Tenant;
        assert_eq!(CalendarSurface::Tenant.color(&ev), "#22c55e");
    }

    #[test]
    fn month_grid_starts_on_sunday() {
        // 2025-03-01 是周六
        let grid = month_grid(2025, 3).unwrap();
        assert_eq!(grid.len(), 42);
        assert_eq!(grid[0], NaiveDate::from_ymd_opt(2025, 2, 23).unwrap());
        assert_eq!(grid[6], NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert!(month_grid(2025, 13).is_none());
        assert_eq!(shift_month(2025, 1, -1), (2024, 12));
        assert_eq!(shift_month(2025, 12, 1), (2026, 1));
    }

    #[test]
    fn multi_day_events_cover_each_day() {
        let mut ev = event(1, OwnerRole::Admin, Visibility::Shared, None);
        ev.end = Some("2025-03-03T10:00:00".into());
        let events = vec![ev];
        let day = |d| NaiveDate::from_ymd_opt(2025, 3, d).unwrap();
        assert_eq!(events_on(&events, day(1)).len(), 1);
        assert_eq!(events_on(&events, day(3)).len(), 1);
        assert!(events_on(&events, day(4)).is_empty());
    }

    #[test]
    fn upsert_replaces_or_appends() {
        let mut events = vec![event(1, OwnerRole::Admin, Visibility::Shared, None)];
        let mut changed = events[0].clone();
        changed.title = "renamed".into();
        upsert_event(&mut events, changed);
        upsert_event(&mut events, event(2, OwnerRole::Admin, Visibility::Shared, None));
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "renamed");
    }
}
