//! 管理员录入表单：房间、租户、水电表
//!
//! 与页面无关的校验与请求组装，页面只负责输入框与文件选择。

use crate::error::{PortalError, PortalResult};
use crate::models::{MeterStatus, MeterType};
use crate::payment::{MSG_IMAGE_ONLY, parse_amount};
use crate::protocol::{
    CreateMeterRequest, CreateRoomRequest, CreateTenantRequest, IdCardOcrResponse, UploadFile,
};

pub const DEFAULT_ROOM_TYPE: &str = "Studio Standard";
pub const ROOM_TYPES: [&str; 3] = ["Studio Standard", "Studio Deluxe", "Suite"];

// =========================================================
// 房间
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct RoomForm {
    pub room_number: String,
    pub room_type: String,
    pub price: String,
    pub promotion: String,
    pub building: String,
    pub floor: String,
    pub amenities: Vec<String>,
}

impl Default for RoomForm {
    fn default() -> Self {
        Self {
            room_number: String::new(),
            room_type: DEFAULT_ROOM_TYPE.to_string(),
            price: String::new(),
            promotion: String::new(),
            building: String::new(),
            floor: String::new(),
            amenities: Vec::new(),
        }
    }
}

impl RoomForm {
    /// 房间照片必填；房号、价格、楼栋、楼层必填
    pub fn to_request(&self, image: Option<&UploadFile>) -> PortalResult<CreateRoomRequest> {
        let image = image.ok_or_else(|| PortalError::validation("Please upload a room photo"))?;
        if !image.is_image() {
            return Err(PortalError::validation(MSG_IMAGE_ONLY));
        }
        let room_number = self.room_number.trim();
        let building = self.building.trim();
        let floor = self.floor.trim();
        let price = self.price.trim();
        if [room_number, building, floor, price].iter().any(|v| v.is_empty()) {
            return Err(PortalError::validation(
                "Please fill in the room number, price, building and floor",
            ));
        }
        let price = parse_amount(price)
            .filter(|p| *p > 0.0)
            .ok_or_else(|| PortalError::validation("Price must be greater than 0"))?;
        if floor.parse::<i32>().is_err() {
            return Err(PortalError::validation("Floor must be a number"));
        }
        Ok(CreateRoomRequest {
            room_number: room_number.to_string(),
            room_type: self.room_type.trim().to_string(),
            price: price.to_string(),
            promotion: self.promotion.trim().to_string(),
            building: building.to_string(),
            floor: floor.to_string(),
            amenities: self.amenities.clone(),
            image: image.clone(),
        })
    }
}

// =========================================================
// 租户
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TenantForm {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub id_card_number: String,
}

impl TenantForm {
    /// 用证件 OCR 结果预填，返回识别出的证件号
    ///
    /// 只有证件号会被覆盖；姓名仅在为空时填入。
    pub fn apply_ocr(&mut self, resp: &IdCardOcrResponse) -> Option<String> {
        let pick = |thai: &Option<String>, eng: &Option<String>| {
            thai.iter()
                .chain(eng.iter())
                .map(|v| v.trim())
                .find(|v| !v.is_empty())
                .map(str::to_string)
        };
        if self.first_name.trim().is_empty() {
            if let Some(v) = pick(&resp.thai_first_name, &resp.eng_first_name) {
                self.first_name = v;
            }
        }
        if self.last_name.trim().is_empty() {
            if let Some(v) = pick(&resp.thai_last_name, &resp.eng_last_name) {
                self.last_name = v;
            }
        }
        let id = resp
            .detected_id_card
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())?
            .to_string();
        self.id_card_number = id.clone();
        Some(id)
    }

    pub fn to_request(&self) -> PortalResult<CreateTenantRequest> {
        let fields = [
            self.first_name.trim(),
            self.last_name.trim(),
            self.phone.trim(),
            self.id_card_number.trim(),
        ];
        if fields.iter().any(|v| v.is_empty()) {
            return Err(PortalError::validation("Please fill in every field"));
        }
        let [first_name, last_name, phone, id_card_number] = fields.map(str::to_string);
        Ok(CreateTenantRequest {
            first_name,
            last_name,
            phone,
            id_card_number,
            status: "active".to_string(),
        })
    }
}

// =========================================================
// 水电表
// =========================================================

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MeterForm {
    pub meter_code: String,
    pub meter_type: MeterType,
    pub room_id: String,
    pub status: MeterStatus,
    pub location_note: String,
    pub installed_at: String,
    pub removed_at: String,
}

impl MeterForm {
    pub fn to_request(&self, image: Option<&UploadFile>) -> PortalResult<CreateMeterRequest> {
        if self.meter_code.trim().is_empty() {
            return Err(PortalError::validation("Please enter the meter code"));
        }
        let room_id = self
            .room_id
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|id| *id > 0)
            .ok_or_else(|| PortalError::validation("Please enter the room id"))?;
        if let Some(image) = image {
            if !image.is_image() {
                return Err(PortalError::validation(MSG_IMAGE_ONLY));
            }
        }
        Ok(CreateMeterRequest {
            meter_code: self.meter_code.trim().to_string(),
            meter_type: self.meter_type,
            room_id,
            status: self.status,
            location_note: self.location_note.clone(),
            installed_at: self.installed_at.clone(),
            removed_at: self.removed_at.clone(),
            image: image.cloned(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ApiRequest, RequestBody};

    fn photo() -> UploadFile {
        UploadFile::new("room.jpg", "image/jpeg", vec![1, 2])
    }

    fn room() -> RoomForm {
        RoomForm {
            room_number: "204".into(),
            price: "4,500".into(),
            building: "A".into(),
            floor: "2".into(),
            amenities: vec!["Wifi".into(), "แอร์".into()],
            ..RoomForm::default()
        }
    }

    #[test]
    fn room_form_requires_photo_and_core_fields() {
        assert_eq!(
            room().to_request(None).unwrap_err().message,
            "Please upload a room photo"
        );
        let mut form = room();
        form.building = " ".into();
        assert!(form.to_request(Some(&photo())).is_err());
        let mut form = room();
        form.floor = "second".into();
        assert_eq!(
            form.to_request(Some(&photo())).unwrap_err().message,
            "Floor must be a number"
        );
    }

    #[test]
    fn room_amenities_travel_as_json_text() {
        let req = room().to_request(Some(&photo())).unwrap();
        assert_eq!(req.price, "4500");
        assert_eq!(req.room_type, DEFAULT_ROOM_TYPE);
        let RequestBody::Multipart(form) = req.body().unwrap() else {
            panic!("room form must be multipart");
        };
        assert_eq!(form.field("amenities"), Some(r#"["Wifi","แอร์"]"#));
    }

    #[test]
    fn tenant_ocr_overwrites_id_but_keeps_typed_names() {
        let mut form = TenantForm {
            first_name: "Typed".into(),
            ..TenantForm::default()
        };
        let found = form.apply_ocr(&IdCardOcrResponse {
            detected_id_card: Some(" 1101700230767 ".into()),
            thai_first_name: Some("สมชาย".into()),
            eng_last_name: Some("Jaidee".into()),
            ..IdCardOcrResponse::default()
        });
        assert_eq!(found.as_deref(), Some("1101700230767"));
        assert_eq!(form.first_name, "Typed");
        assert_eq!(form.last_name, "Jaidee");
        assert_eq!(form.id_card_number, "1101700230767");

        assert_eq!(form.apply_ocr(&IdCardOcrResponse::default()), None);
        assert_eq!(form.id_card_number, "1101700230767");
    }

    #[test]
    fn tenant_request_is_active_and_trimmed() {
        let form = TenantForm {
            first_name: " Anna ".into(),
            last_name: "Smith".into(),
            phone: "0812345678".into(),
            id_card_number: "AA1234567".into(),
        };
        let req = form.to_request().unwrap();
        assert_eq!(req.first_name, "Anna");
        assert_eq!(req.status, "active");
        assert!(TenantForm::default().to_request().is_err());
    }

    #[test]
    fn meter_form_needs_code_and_room() {
        let mut form = MeterForm {
            meter_code: "W-204".into(),
            room_id: "abc".into(),
            ..MeterForm::default()
        };
        assert_eq!(
            form.to_request(None).unwrap_err().message,
            "Please enter the room id"
        );
        form.room_id = "12".into();
        let req = form.to_request(None).unwrap();
        assert_eq!(req.room_id, 12);
        assert_eq!(req.meter_type, MeterType::Water);
        let pdf = UploadFile::new("m.pdf", "application/pdf", vec![1]);
        assert!(form.to_request(Some(&pdf)).is_err());
    }
}
