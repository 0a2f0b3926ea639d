//! 押金转账凭证表单
//!
//! 凭证只接受图片；金额必须大于 0，且在已知押金金额时必须与之相等。

use crate::error::{PortalError, PortalResult};
use crate::protocol::{CreatePaymentRequest, SlipOcrResponse, UploadFile};

pub const MSG_IMAGE_ONLY: &str = "Only image files (JPG / PNG) are accepted";
pub const MSG_INCOMPLETE: &str = "Please fill in every field and attach the slip";
pub const MSG_AMOUNT_POSITIVE: &str = "Amount must be greater than 0";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SlipForm {
    pub bank_name: String,
    pub reference_number: String,
    pub amount_paid: String,
    pub payer_name: String,
}

impl SlipForm {
    /// 用 OCR 结果填充非空字段，返回是否有字段被填充
    pub fn apply_ocr(&mut self, resp: &SlipOcrResponse) -> bool {
        let mut filled = false;
        let mut fill = |slot: &mut String, value: Option<String>| {
            if let Some(v) = value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty()) {
                *slot = v;
                filled = true;
            }
        };
        fill(&mut self.bank_name, resp.bank_name.clone());
        fill(&mut self.reference_number, resp.reference_number.clone());
        fill(&mut self.amount_paid, resp.amount_text());
        fill(&mut self.payer_name, resp.payer_name.clone());
        filled
    }

    /// 校验并打包提交请求
    pub fn to_request(
        &self,
        contract_id: i64,
        deposit_amount: Option<f64>,
        slip: Option<&UploadFile>,
    ) -> PortalResult<CreatePaymentRequest> {
        let bank_name = self.bank_name.trim();
        let reference_number = self.reference_number.trim();
        let payer_name = self.payer_name.trim();
        let amount_raw = self.amount_paid.trim();

        let slip = match slip {
            Some(slip)
                if !bank_name.is_empty()
                    && !reference_number.is_empty()
                    && !payer_name.is_empty()
                    && !amount_raw.is_empty() =>
            {
                slip
            }
            _ => return Err(PortalError::validation(MSG_INCOMPLETE)),
        };
        check_slip_file(slip)?;

        let amount = parse_amount(amount_raw)
            .filter(|a| *a > 0.0)
            .ok_or_else(|| PortalError::validation(MSG_AMOUNT_POSITIVE))?;

        if let Some(deposit) = deposit_amount.filter(|d| *d > 0.0) {
            if (amount - deposit).abs() > 0.005 {
                return Err(PortalError::validation(format!(
                    "Transferred amount ({} THB) does not match the deposit ({} THB)",
                    format_baht(amount),
                    format_baht(deposit)
                )));
            }
        }

        Ok(CreatePaymentRequest {
            contract_id,
            bank_name: bank_name.to_string(),
            reference_number: reference_number.to_string(),
            amount_paid: amount,
            payer_name: payer_name.to_string(),
            slip: slip.clone(),
        })
    }
}

pub fn check_slip_file(file: &UploadFile) -> PortalResult<()> {
    if file.is_image() {
        Ok(())
    } else {
        Err(PortalError::validation(MSG_IMAGE_ONLY))
    }
}

/// 解析金额，允许千位分隔符
pub fn parse_amount(raw: &str) -> Option<f64> {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|a| a.is_finite())
}

/// `4500` → `4,500`，`1234.5` → `1,234.50`
pub fn format_baht(amount: f64) -> String {
    let cents = (amount * 100.0).round() as i64;
    let (whole, frac) = (cents.abs() / 100, cents.abs() % 100);
    let digits = whole.to_string();
    let mut grouped = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    let sign = if cents < 0 { "-" } else { "" };
    if frac == 0 {
        format!("{sign}{grouped}")
    } else {
        format!("{sign}{grouped}.{frac:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{ApiRequest, RequestBody};

    fn slip() -> UploadFile {
        UploadFile::new("slip.png", "image/png", vec![1, 2, 3])
    }

    fn filled() -> SlipForm {
        SlipForm {
            bank_name: "KBank".into(),
            reference_number: "REF123".into(),
            amount_paid: "9,000".into(),
            payer_name: "Anna".into(),
        }
    }

    #[test]
    fn complete_form_builds_camel_case_multipart() {
        let req = filled().to_request(7, Some(9000.0), Some(&slip())).unwrap();
        assert_eq!(req.amount_paid, 9000.0);
        let RequestBody::Multipart(form) = req.body().unwrap() else {
            panic!("payment must be multipart");
        };
        assert_eq!(form.field("contractId"), Some("7"));
        assert_eq!(form.field("amountPaid"), Some("9000"));
        assert_eq!(form.files[0].0, "slipImage");
    }

    #[test]
    fn missing_fields_or_slip_are_rejected() {
        let mut form = filled();
        form.payer_name = "  ".into();
        let err = form.to_request(7, None, Some(&slip())).unwrap_err();
        assert_eq!(err.message, MSG_INCOMPLETE);
        let err = filled().to_request(7, None, None).unwrap_err();
        assert_eq!(err.message, MSG_INCOMPLETE);
    }

    #[test]
    fn amount_must_be_positive_and_match_deposit() {
        let mut form = filled();
        form.amount_paid = "0".into();
        assert_eq!(
            form.to_request(7, None, Some(&slip())).unwrap_err().message,
            MSG_AMOUNT_POSITIVE
        );
        form.amount_paid = "abc".into();
        assert!(form.to_request(7, None, Some(&slip())).is_err());

        form.amount_paid = "4500".into();
        let err = form.to_request(7, Some(9000.0), Some(&slip())).unwrap_err();
        assert_eq!(
            err.message,
            "Transferred amount (4,500 THB) does not match the deposit (9,000 THB)"
        );
        // 押金未知时不比较
        assert!(form.to_request(7, None, Some(&slip())).is_ok());
    }

    #[test]
    fn pdf_slips_are_rejected() {
        let pdf = UploadFile::new("slip.pdf", "application/pdf", vec![1]);
        assert_eq!(
            filled().to_request(7, None, Some(&pdf)).unwrap_err().message,
            MSG_IMAGE_ONLY
        );
    }

    #[test]
    fn ocr_fills_only_present_values() {
        let mut form = SlipForm {
            payer_name: "Typed".into(),
            ..SlipForm::default()
        };
        let filled = form.apply_ocr(&SlipOcrResponse {
            bank_name: Some("SCB".into()),
            amount: Some(serde_json::json!(9000)),
            payer_name: Some("".into()),
            ..SlipOcrResponse::default()
        });
        assert!(filled);
        assert_eq!(form.bank_name, "SCB");
        assert_eq!(form.amount_paid, "9000");
        assert_eq!(form.payer_name, "Typed");
        assert!(!form.apply_ocr(&SlipOcrResponse::default()));
    }

    #[test]
    fn baht_formatting() {
        assert_eq!(format_baht(4500.0), "4,500");
        assert_eq!(format_baht(1234567.5), "1,234,567.50");
        assert_eq!(format_baht(999.0), "999");
        assert_eq!(parse_amount(" 1,000.25 "), Some(1000.25));
    }
}
