//! 证件号校验
//!
//! 泰国身份证号（13 位数字，末位为校验位）或护照号（7-9 位大写字母/数字）。

pub const KIND_THAI_ID: &str = "Thai ID";
pub const KIND_PASSPORT: &str = "Passport";
pub const KIND_UNKNOWN: &str = "Unknown";

pub const MSG_CHECK_DIGIT: &str = "check digit mismatch";
pub const MSG_BAD_FORMAT: &str = "must be 13-digit ID or passport format";

/// 输入框开始提示错误所需的最少字符数
pub const INLINE_ERROR_MIN_LEN: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IdentityCheck {
    pub is_valid: bool,
    /// `"Thai ID"` / `"Passport"` / `"Unknown"`，空输入时为空字符串
    pub kind: &'static str,
    pub message: &'static str,
}

impl IdentityCheck {
    fn valid(kind: &'static str) -> Self {
        Self {
            is_valid: true,
            kind,
            message: "",
        }
    }

    fn invalid(kind: &'static str, message: &'static str) -> Self {
        Self {
            is_valid: false,
            kind,
            message,
        }
    }

    /// 界面展示用的错误文案
    pub fn error_text(&self) -> Option<String> {
        if self.is_valid || self.message.is_empty() {
            None
        } else {
            Some(format!("{}: {}", self.kind, self.message))
        }
    }
}

pub fn validate_identity(raw: &str) -> IdentityCheck {
    if raw.is_empty() {
        return IdentityCheck::invalid("", "");
    }

    let bytes = raw.as_bytes();
    if bytes.len() == 13 && bytes.iter().all(u8::is_ascii_digit) {
        return if thai_checksum_ok(bytes) {
            IdentityCheck::valid(KIND_THAI_ID)
        } else {
            IdentityCheck::invalid(KIND_THAI_ID, MSG_CHECK_DIGIT)
        };
    }

    if (7..=9).contains(&bytes.len())
        && bytes
            .iter()
            .all(|b| b.is_ascii_uppercase() || b.is_ascii_digit())
    {
        return IdentityCheck::valid(KIND_PASSPORT);
    }

    IdentityCheck::invalid(KIND_UNKNOWN, MSG_BAD_FORMAT)
}

/// 校验位：(11 - (Σ d[i] * (13 - i)) mod 11) mod 10 == d[12]
fn thai_checksum_ok(digits: &[u8]) -> bool {
    let d = |i: usize| u32::from(digits[i] - b'0');
    let sum: u32 = (0..12).map(|i| d(i) * (13 - i as u32)).sum();
    (11 - sum % 11) % 10 == d(12)
}

/// 规范化输入：转大写并去掉非字母数字字符
pub fn normalize_identity_input(raw: &str) -> String {
    raw.chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_uppercase())
        .collect()
}

/// 输入过程中显示的错误，少于 7 个字符时不打扰用户
pub fn inline_error(raw: &str) -> Option<String> {
    if raw.chars().count() < INLINE_ERROR_MIN_LEN {
        return None;
    }
    validate_identity(raw).error_text()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thai_id_checksum() {
        let ok = validate_identity("1101700230767");
        assert!(ok.is_valid);
        assert_eq!(ok.kind, "Thai ID");

        // sum = 158, 158 % 11 = 4, 期望校验位为 7
        let zero = validate_identity("1101700230760");
        assert!(!zero.is_valid);
        assert_eq!(zero.message, "check digit mismatch");

        let bad = validate_identity("1101700230761");
        assert!(!bad.is_valid);
        assert_eq!(bad.kind, "Thai ID");
        assert_eq!(bad.message, "check digit mismatch");
    }

    #[test]
    fn checksum_wraps_remainders_zero_and_one() {
        // 3-1000-00000-00-? : sum = 3*13 + 1*12 = 51, 51 % 11 = 7, 11-7 = 4
        assert!(validate_identity("3100000000004").is_valid);
        // sum = 1*13 + 1*9 = 22, 22 % 11 = 0 -> 11 % 10 = 1
        assert!(validate_identity("1000100000001").is_valid);
        // sum = 1*13 + 1*10 = 23, 23 % 11 = 1 -> 10 % 10 = 0
        assert!(validate_identity("1001000000000").is_valid);
    }

    #[test]
    fn passport_format() {
        let ok = validate_identity("AA1234567");
        assert!(ok.is_valid);
        assert_eq!(ok.kind, "Passport");
        assert!(validate_identity("1234567").is_valid);
        assert!(!validate_identity("aa1234567").is_valid);
    }

    #[test]
    fn everything_else_is_unknown() {
        for raw in ["12345", "toolongpassport123", "AB-12345", "12345678901234"] {
            let check = validate_identity(raw);
            assert!(!check.is_valid, "{raw}");
            assert_eq!(check.kind, "Unknown");
            assert_eq!(check.message, "must be 13-digit ID or passport format");
        }
    }

    #[test]
    fn empty_input_has_no_kind() {
        assert_eq!(validate_identity(""), IdentityCheck::default());
        assert_eq!(inline_error(""), None);
    }

    #[test]
    fn input_is_normalized_and_errors_wait_for_seven_chars() {
        assert_eq!(normalize_identity_input("1-1017 0023 076-7"), "1101700230767");
        assert_eq!(normalize_identity_input("aa 123-4567"), "AA1234567");
        assert_eq!(inline_error("12345"), None);
        assert_eq!(
            inline_error("1101700230761").as_deref(),
            Some("Thai ID: check digit mismatch")
        );
        assert_eq!(inline_error("1101700230767"), None);
    }
}
