//! Settlement notifier over SMTP.
//!
//! Formats the settlement totals into a plain-text summary and mails it to
//! the configured recipients. Consolidation treats this as best-effort: a
//! failed send is reported to the orchestrator, which logs and moves on.

use caja_core::cashbox::PettyCashBox;
use caja_core::consolidation::{NotifyError, Settlement, SettlementNotifier};
use caja_shared::EmailService;

/// Email-backed settlement notifier.
pub struct EmailNotifier {
    email: EmailService,
    recipients: Vec<String>,
}

impl EmailNotifier {
    /// Create a notifier for the given recipients.
    #[must_use]
    pub fn new(email: EmailService, recipients: Vec<String>) -> Self {
        Self { email, recipients }
    }
}

impl SettlementNotifier for EmailNotifier {
    async fn send(
        &self,
        cashbox: &PettyCashBox,
        settlement: &Settlement,
        document_ref: &str,
    ) -> Result<(), NotifyError> {
        if self.recipients.is_empty() {
            return Ok(());
        }

        let subject = format!("Petty cash consolidated - {}", cashbox.custodian);
        let body = settlement_body(cashbox, settlement, document_ref);

        for recipient in &self.recipients {
            self.email
                .send_email(recipient, &subject, &body)
                .await
                .map_err(|e| NotifyError::Failed(e.to_string()))?;
        }

        Ok(())
    }
}

/// Plain-text settlement summary.
fn settlement_body(cashbox: &PettyCashBox, settlement: &Settlement, document_ref: &str) -> String {
    format!(
        r"The petty cash fund has been consolidated.

Custodian:          {custodian}
Period opened:      {opened_at}
Initial amount:     {initial}
Total legalized:    {legalized}
Balance to return:  {to_return}
Custodian owes:     {owes}

Settlement document: {document_ref}
",
        custodian = cashbox.custodian,
        opened_at = cashbox.opened_at,
        initial = cashbox.initial_amount,
        legalized = settlement.total_legalized,
        to_return = settlement.balance_to_return,
        owes = settlement.custodian_owes,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use caja_core::cashbox::BoxState;
    use caja_shared::BoxId;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_settlement_body_contains_totals() {
        let cashbox = PettyCashBox {
            id: BoxId::new(),
            custodian: "Maria Lopez".to_string(),
            external_id: "CC-1019283".to_string(),
            concept: "Office petty cash".to_string(),
            initial_amount: dec!(2_000_000),
            opened_at: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
            state: BoxState::Consolidated,
            consolidated_at: NaiveDate::from_ymd_opt(2026, 3, 31),
            document_ref: Some("s3://settlements/03_2026_pettycash.pdf".to_string()),
            version: 4,
        };
        let settlement = Settlement {
            total_legalized: dec!(1_700_000),
            balance_to_return: dec!(300_000),
            custodian_owes: dec!(0),
        };

        let body = settlement_body(
            &cashbox,
            &settlement,
            "s3://settlements/03_2026_pettycash.pdf",
        );

        assert!(body.contains("Maria Lopez"));
        assert!(body.contains("2026-03-01"));
        assert!(body.contains("1700000"));
        assert!(body.contains("300000"));
        assert!(body.contains("s3://settlements/03_2026_pettycash.pdf"));
    }
}
