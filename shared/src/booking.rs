//! 预订证件采集流程
//!
//! 状态机：
//!
//! ```text
//! Idle ─(选择相机)→ Capturing ─(拍照/上传)→ OcrPending ─┬→ OcrDone
//!                                                      └→ OcrFailed
//! OcrDone / OcrFailed ─(提交)→ Submitting ─┬→ Submitted
//!                                           └→ SubmitFailed (表单保留，可重试)
//! ```
//!
//! 这里只负责状态与校验；摄像头、Object URL 与网络请求由前端组件处理。
//! 被替换的预览 URL 会作为返回值交还给调用方释放。

use std::fmt;

use crate::error::{PortalError, PortalResult};
use crate::identity::{IdentityCheck, inline_error, normalize_identity_input, validate_identity};
use crate::protocol::{
    ID_TYPE_PASSPORT, ID_TYPE_THAI, IdCardOcrResponse, OcrIdCardRequest, SubmitBookingRequest,
    UploadFile,
};

#[cfg(test)]
mod tests;

pub const CAMERA_FILE_NAME: &str = "webcam-capture.jpg";
pub const MSG_NO_ID_DETECTED: &str =
    "The ID number could not be read from the image. Please type it in.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaptureSource {
    #[default]
    Upload,
    Camera,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BookingPhase {
    /// 尚未选择图片
    #[default]
    Idle,
    /// 摄像头已打开，等待拍照
    Capturing,
    /// 图片已发送到 OCR 服务
    OcrPending,
    OcrDone,
    /// OCR 失败，用户可以手动输入证件号
    OcrFailed(String),
    Submitting,
    Submitted,
    SubmitFailed(String),
}

impl BookingPhase {
    pub fn is_busy(&self) -> bool {
        matches!(self, BookingPhase::OcrPending | BookingPhase::Submitting)
    }
}

/// 已采集的证件图片及其预览地址（Object URL 或 data URL）
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    pub file: UploadFile,
    pub preview_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BookingForm {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub id_card_number: String,
}

/// 阻止提交的原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitBlocker {
    MissingIdNumber,
    InvalidIdNumber(String),
    MissingImage,
    Busy,
}

impl fmt::Display for SubmitBlocker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubmitBlocker::MissingIdNumber => write!(f, "Enter an ID card or passport number"),
            SubmitBlocker::InvalidIdNumber(msg) => write!(f, "Cannot book: {}", msg),
            SubmitBlocker::MissingImage => {
                write!(f, "Upload or take a photo of your ID card or passport first")
            }
            SubmitBlocker::Busy => write!(f, "Please wait for the current request to finish"),
        }
    }
}

// =========================================================
// 流程
// =========================================================

#[derive(Debug, Clone, PartialEq)]
pub struct BookingFlow {
    source: CaptureSource,
    phase: BookingPhase,
    form: BookingForm,
    image: Option<CapturedImage>,
    id_check: IdentityCheck,
    id_error: Option<String>,
    /// OCR 识别出的证件号
    detected_id: Option<String>,
}

impl BookingFlow {
    /// 名字默认填入当前登录用户名
    pub fn new(prefill_first_name: &str) -> Self {
        Self {
            source: CaptureSource::Upload,
            phase: BookingPhase::Idle,
            form: BookingForm {
                first_name: prefill_first_name.to_string(),
                ..BookingForm::default()
            },
            image: None,
            id_check: IdentityCheck::default(),
            id_error: None,
            detected_id: None,
        }
    }

    // --- 只读访问 ---

    pub fn source(&self) -> CaptureSource {
        self.source
    }

    pub fn phase(&self) -> &BookingPhase {
        &self.phase
    }

    pub fn form(&self) -> &BookingForm {
        &self.form
    }

    pub fn image(&self) -> Option<&CapturedImage> {
        self.image.as_ref()
    }

    pub fn preview_url(&self) -> Option<&str> {
        self.image.as_ref().map(|i| i.preview_url.as_str())
    }

    pub fn id_check(&self) -> &IdentityCheck {
        &self.id_check
    }

    pub fn id_error(&self) -> Option<&str> {
        self.id_error.as_deref()
    }

    pub fn detected_id(&self) -> Option<&str> {
        self.detected_id.as_deref()
    }

    /// 是否需要显示实时摄像头画面
    pub fn camera_live(&self) -> bool {
        self.source == CaptureSource::Camera && self.image.is_none()
    }

    // --- 采集 ---

    /// 切换上传/拍照标签，请求进行中时拒绝切换
    pub fn select_source(&mut self, source: CaptureSource) -> bool {
        if self.phase.is_busy() {
            return false;
        }
        self.source = source;
        if self.image.is_none() {
            self.phase = match source {
                CaptureSource::Camera => BookingPhase::Capturing,
                CaptureSource::Upload => BookingPhase::Idle,
            };
        }
        true
    }

    /// 重新打开摄像头（重拍），返回需要释放的旧预览
    pub fn begin_capture(&mut self) -> Option<String> {
        if self.phase.is_busy() {
            return None;
        }
        self.source = CaptureSource::Camera;
        self.phase = BookingPhase::Capturing;
        self.detected_id = None;
        self.image.take().map(|i| i.preview_url)
    }

    /// 得到一张新图片：返回要发送的 OCR 请求，以及被替换的旧预览 URL
    pub fn acquire_image(
        &mut self,
        image: CapturedImage,
    ) -> PortalResult<(OcrIdCardRequest, Option<String>)> {
        if self.phase.is_busy() {
            return Err(PortalError::validation(SubmitBlocker::Busy.to_string()));
        }
        if !image.file.is_image() {
            return Err(PortalError::validation("Please choose an image file"));
        }

        let request = OcrIdCardRequest {
            image: image.file.clone(),
        };
        let superseded = self
            .image
            .replace(image)
            .map(|old| old.preview_url)
            .filter(|old| Some(old.as_str()) != self.preview_url());
        self.detected_id = None;
        self.phase = BookingPhase::OcrPending;
        Ok((request, superseded))
    }

    /// 应用 OCR 结果
    ///
    /// 身份证使用泰文姓名，护照使用英文姓名；空值不会覆盖已有输入。
    /// 没有识别出证件号时进入 `OcrFailed`，仍可手动输入后提交。
    pub fn apply_ocr(&mut self, resp: IdCardOcrResponse) {
        if self.phase != BookingPhase::OcrPending {
            return;
        }

        let detected = resp
            .detected_id_card
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        let Some(detected) = detected else {
            self.phase = BookingPhase::OcrFailed(MSG_NO_ID_DETECTED.to_string());
            return;
        };

        let (first, last) = match resp.id_type.as_deref() {
            Some(ID_TYPE_THAI) => (resp.thai_first_name, resp.thai_last_name),
            Some(ID_TYPE_PASSPORT) => (resp.eng_first_name, resp.eng_last_name),
            _ => (None, None),
        };
        if let Some(first) = non_empty(first) {
            self.form.first_name = first;
        }
        if let Some(last) = non_empty(last) {
            self.form.last_name = last;
        }

        self.detected_id = Some(detected.to_string());
        self.form.id_card_number = detected.to_string();
        // OCR 结果直接校验，不受最少字符数限制
        self.id_check = validate_identity(detected);
        self.id_error = self.id_check.error_text();
        self.phase = BookingPhase::OcrDone;
    }

    /// OCR 请求失败（网络或服务端错误）
    pub fn ocr_failed(&mut self, reason: impl Into<String>) {
        if self.phase == BookingPhase::OcrPending {
            self.phase = BookingPhase::OcrFailed(reason.into());
        }
    }

    // --- 表单编辑 ---

    /// 输入证件号：规范化后重新校验，返回规范化的值
    pub fn edit_id_number(&mut self, raw: &str) -> String {
        let normalized = normalize_identity_input(raw);
        self.id_check = validate_identity(&normalized);
        self.id_error = inline_error(&normalized);
        self.form.id_card_number = normalized.clone();
        normalized
    }

    pub fn set_first_name(&mut self, value: &str) {
        self.form.first_name = value.to_string();
    }

    pub fn set_last_name(&mut self, value: &str) {
        self.form.last_name = value.to_string();
    }

    pub fn set_phone(&mut self, value: &str) {
        self.form.phone = value.to_string();
    }

    // --- 提交 ---

    pub fn submit_blockers(&self) -> Vec<SubmitBlocker> {
        let mut blockers = Vec::new();
        if self.form.id_card_number.is_empty() {
            blockers.push(SubmitBlocker::MissingIdNumber);
        } else if !self.id_check.is_valid {
            blockers.push(SubmitBlocker::InvalidIdNumber(
                self.id_check.message.to_string(),
            ));
        }
        if self.image.is_none() {
            blockers.push(SubmitBlocker::MissingImage);
        }
        if self.phase.is_busy() {
            blockers.push(SubmitBlocker::Busy);
        }
        blockers
    }

    pub fn can_submit(&self) -> bool {
        self.submit_blockers().is_empty()
    }

    /// 打包提交请求并进入 `Submitting`
    pub fn begin_submit(&mut self, room_id: i64) -> PortalResult<SubmitBookingRequest> {
        if let Some(blocker) = self.submit_blockers().into_iter().next() {
            return Err(PortalError::validation(blocker.to_string()));
        }
        let Some(image) = &self.image else {
            return Err(PortalError::validation(SubmitBlocker::MissingImage.to_string()));
        };

        let request = SubmitBookingRequest {
            room_id,
            first_name: self.form.first_name.trim().to_string(),
            last_name: self.form.last_name.trim().to_string(),
            phone: self.form.phone.trim().to_string(),
            id_card_number: self.form.id_card_number.clone(),
            image: image.file.clone(),
        };
        self.phase = BookingPhase::Submitting;
        Ok(request)
    }

    /// 提交成功：清除图片与识别结果，返回需要释放的预览 URL
    pub fn submit_succeeded(&mut self) -> Option<String> {
        self.phase = BookingPhase::Submitted;
        self.detected_id = None;
        self.id_error = None;
        self.image.take().map(|i| i.preview_url)
    }

    /// 提交失败：保留表单以便重试
    pub fn submit_failed(&mut self, reason: impl Into<String>) {
        if self.phase == BookingPhase::Submitting {
            self.phase = BookingPhase::SubmitFailed(reason.into());
        }
    }

    /// 丢弃当前图片，回到选择状态
    pub fn reset_capture(&mut self) -> Option<String> {
        if self.phase.is_busy() {
            return None;
        }
        self.detected_id = None;
        self.phase = match self.source {
            CaptureSource::Camera => BookingPhase::Capturing,
            CaptureSource::Upload => BookingPhase::Idle,
        };
        self.image.take().map(|i| i.preview_url)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
