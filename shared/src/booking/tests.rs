use super::*;
use crate::protocol::{ApiRequest, RequestBody};

const VALID_THAI: &str = "1101700230767";

fn image(url: &str) -> CapturedImage {
    CapturedImage {
        file: UploadFile::new("id.jpg", "image/jpeg", vec![0xff, 0xd8, 0xff]),
        preview_url: url.to_string(),
    }
}

fn thai_ocr(id: &str) -> IdCardOcrResponse {
    IdCardOcrResponse {
        detected_id_card: Some(id.to_string()),
        id_type: Some(ID_TYPE_THAI.to_string()),
        thai_first_name: Some("สมชาย".into()),
        thai_last_name: Some("ใจดี".into()),
        eng_first_name: Some("Somchai".into()),
        eng_last_name: Some("Jaidee".into()),
    }
}

/// 一个可以提交的流程：已上传图片、OCR 完成、证件号有效
fn ready_flow() -> BookingFlow {
    let mut flow = BookingFlow::new("Anna");
    flow.acquire_image(image("blob:1")).unwrap();
    flow.apply_ocr(thai_ocr(VALID_THAI));
    flow.set_phone("0812345678");
    assert!(flow.can_submit(), "{:?}", flow.submit_blockers());
    flow
}

// =========================================================
// 提交条件：四个阻止条件各自独立生效
// =========================================================

#[test]
fn empty_id_blocks_submission() {
    let mut flow = ready_flow();
    flow.edit_id_number("");
    assert!(!flow.can_submit());
    assert_eq!(flow.submit_blockers(), vec![SubmitBlocker::MissingIdNumber]);
}

#[test]
fn invalid_id_blocks_submission() {
    let mut flow = ready_flow();
    flow.edit_id_number("1101700230761");
    assert!(!flow.can_submit());
    assert_eq!(
        flow.submit_blockers(),
        vec![SubmitBlocker::InvalidIdNumber("check digit mismatch".into())]
    );
}

#[test]
fn missing_image_blocks_submission() {
    let mut flow = ready_flow();
    assert_eq!(flow.reset_capture().as_deref(), Some("blob:1"));
    assert!(!flow.can_submit());
    assert_eq!(flow.submit_blockers(), vec![SubmitBlocker::MissingImage]);
}

#[test]
fn in_flight_request_blocks_submission() {
    let mut flow = ready_flow();
    flow.begin_submit(3).unwrap();
    assert!(!flow.can_submit());
    assert_eq!(flow.submit_blockers(), vec![SubmitBlocker::Busy]);

    // OCR 进行中同样不可提交
    let mut flow = BookingFlow::new("Anna");
    flow.edit_id_number(VALID_THAI);
    flow.acquire_image(image("blob:2")).unwrap();
    assert_eq!(flow.phase(), &BookingPhase::OcrPending);
    assert_eq!(flow.submit_blockers(), vec![SubmitBlocker::Busy]);
}

#[test]
fn begin_submit_reports_first_blocker() {
    let mut flow = BookingFlow::new("Anna");
    let err = flow.begin_submit(1).unwrap_err();
    assert!(err.is_validation());
    assert_eq!(err.message, SubmitBlocker::MissingIdNumber.to_string());
    assert_eq!(flow.phase(), &BookingPhase::Idle);
}

// =========================================================
// OCR
// =========================================================

#[test]
fn thai_ocr_fills_thai_names() {
    let flow = ready_flow();
    assert_eq!(flow.phase(), &BookingPhase::OcrDone);
    assert_eq!(flow.form().id_card_number, VALID_THAI);
    assert_eq!(flow.form().first_name, "สมชาย");
    assert_eq!(flow.form().last_name, "ใจดี");
    assert_eq!(flow.detected_id(), Some(VALID_THAI));
    assert_eq!(flow.id_error(), None);
}

#[test]
fn passport_ocr_fills_english_names_without_blanking() {
    let mut flow = BookingFlow::new("Anna");
    flow.set_last_name("Smith");
    flow.acquire_image(image("blob:1")).unwrap();
    flow.apply_ocr(IdCardOcrResponse {
        detected_id_card: Some("AA1234567".into()),
        id_type: Some(ID_TYPE_PASSPORT.into()),
        eng_first_name: Some("Joanna".into()),
        eng_last_name: Some("  ".into()),
        ..IdCardOcrResponse::default()
    });
    assert_eq!(flow.form().first_name, "Joanna");
    assert_eq!(flow.form().last_name, "Smith");
    assert_eq!(flow.id_check().kind, "Passport");
}

#[test]
fn ocr_with_invalid_number_shows_error_immediately() {
    let mut flow = BookingFlow::new("Anna");
    flow.acquire_image(image("blob:1")).unwrap();
    flow.apply_ocr(thai_ocr("1101700230761"));
    assert_eq!(flow.id_error(), Some("Thai ID: check digit mismatch"));
    assert!(!flow.can_submit());
}

#[test]
fn ocr_without_number_fails_but_manual_entry_still_submits() {
    let mut flow = BookingFlow::new("Anna");
    flow.acquire_image(image("blob:1")).unwrap();
    flow.apply_ocr(IdCardOcrResponse::default());
    assert_eq!(
        flow.phase(),
        &BookingPhase::OcrFailed(MSG_NO_ID_DETECTED.to_string())
    );
    assert_eq!(flow.form().first_name, "Anna");

    flow.edit_id_number("aa-123 4567");
    assert_eq!(flow.form().id_card_number, "AA1234567");
    assert!(flow.can_submit());
}

#[test]
fn ocr_transport_failure_is_recoverable() {
    let mut flow = BookingFlow::new("Anna");
    flow.acquire_image(image("blob:1")).unwrap();
    flow.ocr_failed("Could not reach the AI service");
    assert!(matches!(flow.phase(), BookingPhase::OcrFailed(_)));
    flow.edit_id_number(VALID_THAI);
    assert!(flow.can_submit());
}

#[test]
fn late_ocr_result_is_ignored_after_reset() {
    let mut flow = BookingFlow::new("Anna");
    flow.acquire_image(image("blob:1")).unwrap();
    flow.ocr_failed("timeout");
    flow.apply_ocr(thai_ocr(VALID_THAI));
    assert_eq!(flow.form().id_card_number, "");
}

// =========================================================
// 采集与预览资源
// =========================================================

#[test]
fn replacing_image_returns_old_preview_for_revocation() {
    let mut flow = BookingFlow::new("Anna");
    let (req, old) = flow.acquire_image(image("blob:1")).unwrap();
    assert_eq!(old, None);
    assert_eq!(req.path(), "/ai/ocr/id-card");

    flow.apply_ocr(thai_ocr(VALID_THAI));
    let (_, old) = flow.acquire_image(image("blob:2")).unwrap();
    assert_eq!(old.as_deref(), Some("blob:1"));
    assert_eq!(flow.preview_url(), Some("blob:2"));
}

#[test]
fn non_image_files_are_rejected_before_ocr() {
    let mut flow = BookingFlow::new("Anna");
    let err = flow
        .acquire_image(CapturedImage {
            file: UploadFile::new("id.pdf", "application/pdf", vec![1]),
            preview_url: "blob:x".into(),
        })
        .unwrap_err();
    assert!(err.is_validation());
    assert_eq!(flow.phase(), &BookingPhase::Idle);
    assert!(flow.image().is_none());
}

#[test]
fn source_switch_is_refused_while_busy() {
    let mut flow = BookingFlow::new("Anna");
    assert!(flow.select_source(CaptureSource::Camera));
    assert_eq!(flow.phase(), &BookingPhase::Capturing);
    assert!(flow.camera_live());

    flow.acquire_image(image("data:image/jpeg;base64,AAAA")).unwrap();
    assert!(!flow.camera_live());
    assert!(!flow.select_source(CaptureSource::Upload));
    assert_eq!(flow.source(), CaptureSource::Camera);
    assert!(flow.acquire_image(image("blob:2")).is_err());
}

#[test]
fn switching_to_upload_while_camera_starts_releases_it() {
    let mut flow = BookingFlow::new("Anna");
    assert!(flow.select_source(CaptureSource::Camera));
    assert!(flow.camera_live());

    // 授权弹窗还没返回时切到上传，返回的画面不应再保留
    assert!(flow.select_source(CaptureSource::Upload));
    assert!(!flow.camera_live());
    assert_eq!(flow.phase(), &BookingPhase::Idle);

    assert!(flow.select_source(CaptureSource::Camera));
    assert!(flow.camera_live());
}

#[test]
fn retake_reopens_camera_and_releases_preview() {
    let mut flow = ready_flow();
    assert_eq!(flow.begin_capture().as_deref(), Some("blob:1"));
    assert_eq!(flow.phase(), &BookingPhase::Capturing);
    assert!(flow.camera_live());
}

// =========================================================
// 提交
// =========================================================

#[test]
fn submit_packages_multipart_form() {
    let mut flow = ready_flow();
    let req = flow.begin_submit(42).unwrap();
    assert_eq!(flow.phase(), &BookingPhase::Submitting);
    assert_eq!(req.path(), "/bookings/submit");

    let RequestBody::Multipart(form) = req.body().unwrap() else {
        panic!("booking submission must be multipart");
    };
    assert_eq!(form.field("room_id"), Some("42"));
    assert_eq!(form.field("first_name"), Some("สมชาย"));
    assert_eq!(form.field("phone"), Some("0812345678"));
    assert_eq!(form.field("id_card_number"), Some(VALID_THAI));
    assert_eq!(form.files[0].0, "file");
}

#[test]
fn submit_success_clears_transient_state() {
    let mut flow = ready_flow();
    flow.begin_submit(1).unwrap();
    assert_eq!(flow.submit_succeeded().as_deref(), Some("blob:1"));
    assert_eq!(flow.phase(), &BookingPhase::Submitted);
    assert!(flow.image().is_none());
    assert_eq!(flow.detected_id(), None);
}

#[test]
fn submit_failure_keeps_form_for_retry() {
    let mut flow = ready_flow();
    flow.begin_submit(1).unwrap();
    flow.submit_failed("Room already booked");
    assert_eq!(
        flow.phase(),
        &BookingPhase::SubmitFailed("Room already booked".into())
    );
    assert_eq!(flow.form().id_card_number, VALID_THAI);
    assert!(flow.image().is_some());
    assert!(flow.can_submit());
}

#[test]
fn inline_error_waits_for_seven_characters() {
    let mut flow = BookingFlow::new("");
    flow.edit_id_number("12345");
    assert_eq!(flow.id_error(), None);
    assert!(!flow.id_check().is_valid);
    flow.edit_id_number("12345678901");
    assert_eq!(
        flow.id_error(),
        Some("Unknown: must be 13-digit ID or passport format")
    );
}
