//! 预订审批：押金合同默认文本
//!
//! 管理员在审批前可以修改这段文本，服务端据此生成合同 PDF。

use chrono::NaiveDate;

use crate::models::{BookingRequest, Contract, ContractLink};
use crate::payment::format_baht;

pub const CONTRACT_PREFIX: &str = "DEP";
pub const APARTMENT_NAME: &str = "Somkid Apartment";

const CLAUSES: [&str; 4] = [
    "1. The tenant agrees to rent the room above, to pay the deposit in the stated amount, and to pay the monthly rent on time.",
    "2. The tenant agrees to follow the building rules, including keeping noise down, keeping the premises clean and observing notices issued by the landlord.",
    "3. If the tenant damages property in the room or in common areas, the landlord may deduct the cost of the damage from the deposit as appropriate.",
    "4. If the tenant terminates the contract early without force majeure, the landlord may withhold part or all of the deposit at the landlord's discretion.",
];

fn money(amount: Option<f64>) -> String {
    amount.map(format_baht).unwrap_or_default()
}

/// 根据预订申请生成默认押金合同文本
pub fn default_contract_text(booking: &BookingRequest, today: NaiveDate) -> String {
    let mut text = format!(
        "Room Rental Deposit Contract ({APARTMENT_NAME})\n\
         Document type: {CONTRACT_PREFIX} – Deposit Contract\n\
         Made on {} between the following parties\n\
         Tenant: {} ID card / Passport {} Phone {}\n\
         Room: number {} monthly rent {} THB deposit {} THB\n\n",
        today.format("%d/%m/%Y"),
        booking.full_name(),
        booking.id_card_number,
        booking.phone,
        booking.room_id,
        money(booking.agreed_monthly_rent),
        money(booking.deposit_amount),
    );
    for clause in CLAUSES {
        text.push_str(clause);
        text.push_str("\n\n");
    }
    text.push_str(
        "*** Administrators may edit or extend this text before approving. \
         The system then generates the file and sends it to the tenant. ***",
    );
    text
}

/// 合同 PDF 的路径，数据库中没有记录时使用约定的位置
fn pdf_path(contract_id: i64, recorded: Option<&str>) -> String {
    recorded
        .filter(|p| !p.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("/media/contracts/contract_{}.pdf", contract_id))
}

impl Contract {
    pub fn pdf_path(&self) -> String {
        pdf_path(self.contract_id, self.contract_pdf_url.as_deref())
    }
}

impl ContractLink {
    pub fn pdf_path(&self) -> String {
        pdf_path(self.contract_id, self.contract_pdf_url.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AiStatus, BookingStatus, DepositStatus};

    fn booking() -> BookingRequest {
        BookingRequest {
            id: 1,
            room_id: 204,
            first_name: "Anna".into(),
            last_name: "Smith".into(),
            phone: "0812345678".into(),
            id_card_number: "AA1234567".into(),
            ai_status: AiStatus::Pass,
            ai_confidence: 92.0,
            ai_remark: String::new(),
            status: BookingStatus::Pending,
            created_at: "2025-03-01T08:00:00".into(),
            id_image_url: None,
            contract_pdf_url: None,
            agreed_monthly_rent: Some(4500.0),
            deposit_amount: Some(9000.0),
        }
    }

    #[test]
    fn contract_text_names_tenant_room_and_amounts() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 2).unwrap();
        let text = default_contract_text(&booking(), today);
        assert!(text.starts_with("Room Rental Deposit Contract (Somkid Apartment)"));
        assert!(text.contains("Made on 02/03/2025"));
        assert!(text.contains("Tenant: Anna Smith ID card / Passport AA1234567 Phone 0812345678"));
        assert!(text.contains("Room: number 204 monthly rent 4,500 THB deposit 9,000 THB"));
        assert!(text.contains("4. If the tenant terminates"));
    }

    #[test]
    fn missing_amounts_are_left_blank() {
        let mut b = booking();
        b.deposit_amount = None;
        let text = default_contract_text(&b, NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
        assert!(text.contains("deposit  THB"));
    }

    #[test]
    fn contract_pdf_falls_back_to_conventional_path() {
        let mut contract = Contract {
            contract_id: 12,
            room_id: 3,
            deposit_status: DepositStatus::Pending,
            deposit_amount: 9000.0,
            deposit_due_date: None,
            contract_pdf_url: None,
            deposit_slip_url: None,
        };
        assert_eq!(contract.pdf_path(), "/media/contracts/contract_12.pdf");
        contract.contract_pdf_url = Some("/media/contracts/DEP-1.pdf".into());
        assert_eq!(contract.pdf_path(), "/media/contracts/DEP-1.pdf");
    }

    #[test]
    fn booking_contract_link_uses_same_fallback() {
        let link = ContractLink {
            contract_id: 5,
            contract_pdf_url: Some("  ".into()),
        };
        assert_eq!(link.pdf_path(), "/media/contracts/contract_5.pdf");
    }
}
