//! 账户表单：注册、找回密码、个人资料
//!
//! 校验都在发请求之前完成，失败返回 `Validation` 错误。

use crate::error::{PortalError, PortalResult};
use crate::payment::MSG_IMAGE_ONLY;
use crate::protocol::{
    ForgotPasswordRequest, RegisterRequest, ResetPasswordRequest, UpdateProfileRequest, UploadFile,
};

pub const MSG_PASSWORD_MISMATCH: &str = "Passwords do not match";
pub const MSG_REQUIRED: &str = "Please fill in every required field";

/// 用户头像大小上限
pub const PROFILE_IMAGE_MAX_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegisterForm {
    pub username: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
}

impl RegisterForm {
    /// 同意 PDPA 之前的检查
    pub fn validate(&self) -> PortalResult<()> {
        let required = [
            &self.username,
            &self.email,
            &self.password,
            &self.first_name,
            &self.last_name,
        ];
        if required.iter().any(|v| v.trim().is_empty()) {
            return Err(PortalError::validation(MSG_REQUIRED));
        }
        if self.password != self.confirm_password {
            return Err(PortalError::validation(MSG_PASSWORD_MISMATCH));
        }
        Ok(())
    }

    pub fn to_request(&self) -> PortalResult<RegisterRequest> {
        self.validate()?;
        Ok(RegisterRequest {
            username: self.username.trim().to_string(),
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone: self.phone.trim().to_string(),
        })
    }
}

/// 找回密码的两个步骤
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResetStep {
    /// 输入邮箱或手机号，请求验证码
    #[default]
    RequestCode,
    /// 验证码已发送到该联系方式
    EnterCode { contact: String },
}

impl ResetStep {
    pub fn request_code(contact: &str) -> PortalResult<ForgotPasswordRequest> {
        let contact = contact.trim();
        if contact.is_empty() {
            return Err(PortalError::validation("Enter your email or phone number"));
        }
        Ok(ForgotPasswordRequest {
            email: contact.to_string(),
        })
    }

    /// 验证码请求成功后进入第二步
    pub fn code_sent(contact: &str) -> Self {
        ResetStep::EnterCode {
            contact: contact.trim().to_string(),
        }
    }

    pub fn reset(
        &self,
        code: &str,
        new_password: &str,
        confirm_password: &str,
    ) -> PortalResult<ResetPasswordRequest> {
        let ResetStep::EnterCode { contact } = self else {
            return Err(PortalError::validation("Request a verification code first"));
        };
        if code.trim().is_empty() || new_password.is_empty() {
            return Err(PortalError::validation(MSG_REQUIRED));
        }
        if new_password != confirm_password {
            return Err(PortalError::validation(MSG_PASSWORD_MISMATCH));
        }
        Ok(ResetPasswordRequest {
            email: contact.clone(),
            code: code.trim().to_string(),
            new_password: new_password.to_string(),
        })
    }
}

/// 显示名拆分为 (名, 姓)：第一个词是名，其余是姓
pub fn split_display_name(name: &str) -> (String, String) {
    let mut parts = name.split_whitespace();
    let first = parts.next().unwrap_or_default().to_string();
    let last = parts.collect::<Vec<_>>().join(" ");
    (first, last)
}

/// 头像必须是图片且不超过 2 MB
pub fn check_profile_image(file: &UploadFile) -> PortalResult<()> {
    if !file.is_image() {
        return Err(PortalError::validation(MSG_IMAGE_ONLY));
    }
    if file.size() > PROFILE_IMAGE_MAX_BYTES {
        return Err(PortalError::validation("Image must be 2 MB or smaller"));
    }
    Ok(())
}

/// 个人资料修改，头像可选
pub fn profile_request(
    first_name: &str,
    last_name: &str,
    image: Option<&UploadFile>,
) -> PortalResult<UpdateProfileRequest> {
    if first_name.trim().is_empty() {
        return Err(PortalError::validation("First name is required"));
    }
    if let Some(image) = image {
        check_profile_image(image)?;
    }
    Ok(UpdateProfileRequest {
        first_name: first_name.trim().to_string(),
        last_name: last_name.trim().to_string(),
        image: image.cloned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> RegisterForm {
        RegisterForm {
            username: "anna".into(),
            email: "anna@example.com".into(),
            password: "secret1".into(),
            confirm_password: "secret1".into(),
            first_name: " Anna ".into(),
            last_name: "K".into(),
            phone: "0812345678".into(),
        }
    }

    #[test]
    fn register_checks_password_confirmation() {
        let mut f = form();
        f.confirm_password = "other".into();
        assert_eq!(f.to_request().unwrap_err().message, MSG_PASSWORD_MISMATCH);
        assert_eq!(form().to_request().unwrap().first_name, "Anna");
    }

    #[test]
    fn register_requires_identity_fields() {
        let mut f = form();
        f.username = " ".into();
        assert_eq!(f.validate().unwrap_err().message, MSG_REQUIRED);
        // 电话可选
        let mut f = form();
        f.phone.clear();
        assert!(f.validate().is_ok());
    }

    #[test]
    fn reset_flow_carries_contact_into_second_step() {
        assert!(ResetStep::request_code("  ").is_err());
        let req = ResetStep::request_code(" a@b.c ").unwrap();
        assert_eq!(req.email, "a@b.c");

        assert!(ResetStep::RequestCode.reset("1", "x", "x").is_err());
        let step = ResetStep::code_sent(" a@b.c ");
        assert_eq!(
            step.reset("123456", "new", "nope").unwrap_err().message,
            MSG_PASSWORD_MISMATCH
        );
        let req = step.reset(" 123456 ", "new", "new").unwrap();
        assert_eq!(req.email, "a@b.c");
        assert_eq!(req.code, "123456");
    }

    #[test]
    fn display_name_splits_on_first_word() {
        assert_eq!(split_display_name("Anna Maria K"), ("Anna".into(), "Maria K".into()));
        assert_eq!(split_display_name("Anna"), ("Anna".into(), String::new()));
        assert_eq!(split_display_name(""), (String::new(), String::new()));
    }

    #[test]
    fn profile_image_is_optional_but_limited() {
        assert!(profile_request("Anna", "", None).unwrap().image.is_none());
        assert!(profile_request(" ", "K", None).is_err());
        let big = UploadFile::new("a.png", "image/png", vec![0; PROFILE_IMAGE_MAX_BYTES + 1]);
        assert!(profile_request("Anna", "K", Some(&big)).is_err());
    }

    #[test]
    fn profile_image_must_be_small_image() {
        let photo = UploadFile::new("me.jpg", "image/jpeg", vec![0; PROFILE_IMAGE_MAX_BYTES]);
        assert!(check_profile_image(&photo).is_ok());
        let pdf = UploadFile::new("me.pdf", "application/pdf", vec![1]);
        assert_eq!(check_profile_image(&pdf).unwrap_err().message, MSG_IMAGE_ONLY);
    }
}
