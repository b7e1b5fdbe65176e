//! Wire format of the external record store.
//!
//! Records travel as an envelope of `{id, version, fields}`; the store bumps
//! `version` on every accepted write and rejects conditional updates whose
//! expected version is stale.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use caja_core::cashbox::{BoxPatch, BoxState, Expense, PettyCashBox, RepoError};
use caja_shared::{BoxId, ExpenseId};

/// Generic record envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordEnvelope<T> {
    /// Record identifier.
    pub id: Uuid,
    /// Optimistic-lock version.
    pub version: i64,
    /// Domain fields.
    pub fields: T,
}

/// Listing response.
#[derive(Debug, Deserialize)]
pub struct RecordList<T> {
    /// Matching records.
    pub records: Vec<RecordEnvelope<T>>,
}

/// Box record fields as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoxFields {
    /// Person accountable for the fund.
    pub custodian: String,
    /// External tax/ID reference.
    pub external_id: String,
    /// Free-text purpose.
    pub concept: String,
    /// Opening amount.
    pub initial_amount: Decimal,
    /// Period start date.
    pub opened_at: NaiveDate,
    /// Lifecycle state string.
    pub state: String,
    /// Consolidation date, when Consolidated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consolidated_at: Option<NaiveDate>,
    /// Archive reference, when Consolidated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_ref: Option<String>,
}

/// Expense record fields as stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseFields {
    /// Owning box id.
    pub box_id: Uuid,
    /// Disbursement date.
    pub date: NaiveDate,
    /// Who was paid.
    pub payee: String,
    /// External tax/ID reference.
    pub external_id: String,
    /// Free-text purpose.
    pub concept: String,
    /// Optional cost center.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_center: Option<String>,
    /// Disbursed amount.
    pub amount: Decimal,
    /// Optional receipt pointer.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voucher_ref: Option<String>,
}

/// Conditional update request body.
#[derive(Debug, Serialize)]
pub struct ConditionalUpdate {
    /// The version the writer read.
    pub expected_version: i64,
    /// Sparse field changes.
    pub fields: serde_json::Value,
}

impl BoxFields {
    /// Build wire fields from a domain box.
    #[must_use]
    pub fn from_domain(cashbox: &PettyCashBox) -> Self {
        Self {
            custodian: cashbox.custodian.clone(),
            external_id: cashbox.external_id.clone(),
            concept: cashbox.concept.clone(),
            initial_amount: cashbox.initial_amount,
            opened_at: cashbox.opened_at,
            state: cashbox.state.as_str().to_string(),
            consolidated_at: cashbox.consolidated_at,
            document_ref: cashbox.document_ref.clone(),
        }
    }
}

/// Convert a box envelope into the domain type.
///
/// # Errors
///
/// Returns `RepoError::Malformed` if the stored state string is not a known
/// lifecycle state.
pub fn box_from_envelope(envelope: RecordEnvelope<BoxFields>) -> Result<PettyCashBox, RepoError> {
    let state = BoxState::parse(&envelope.fields.state).ok_or_else(|| {
        RepoError::Malformed(format!(
            "box {} has unknown state '{}'",
            envelope.id, envelope.fields.state
        ))
    })?;

    Ok(PettyCashBox {
        id: BoxId::from_uuid(envelope.id),
        custodian: envelope.fields.custodian,
        external_id: envelope.fields.external_id,
        concept: envelope.fields.concept,
        initial_amount: envelope.fields.initial_amount,
        opened_at: envelope.fields.opened_at,
        state,
        consolidated_at: envelope.fields.consolidated_at,
        document_ref: envelope.fields.document_ref,
        version: envelope.version,
    })
}

impl ExpenseFields {
    /// Build wire fields from a domain expense.
    #[must_use]
    pub fn from_domain(expense: &Expense) -> Self {
        Self {
            box_id: expense.box_id.into_inner(),
            date: expense.date,
            payee: expense.payee.clone(),
            external_id: expense.external_id.clone(),
            concept: expense.concept.clone(),
            cost_center: expense.cost_center.clone(),
            amount: expense.amount,
            voucher_ref: expense.voucher_ref.clone(),
        }
    }
}

/// Convert an expense envelope into the domain type.
#[must_use]
pub fn expense_from_envelope(envelope: RecordEnvelope<ExpenseFields>) -> Expense {
    Expense {
        id: ExpenseId::from_uuid(envelope.id),
        box_id: BoxId::from_uuid(envelope.fields.box_id),
        date: envelope.fields.date,
        payee: envelope.fields.payee,
        external_id: envelope.fields.external_id,
        concept: envelope.fields.concept,
        cost_center: envelope.fields.cost_center,
        amount: envelope.fields.amount,
        voucher_ref: envelope.fields.voucher_ref,
    }
}

/// Sparse JSON body for a box patch. Only set fields are serialized, so the
/// store leaves everything else untouched.
#[must_use]
pub fn patch_to_fields(patch: &BoxPatch) -> serde_json::Value {
    let mut fields = serde_json::Map::new();
    if let Some(state) = patch.state {
        fields.insert("state".to_string(), state.as_str().into());
    }
    if let Some(date) = patch.consolidated_at {
        fields.insert("consolidated_at".to_string(), date.to_string().into());
    }
    if let Some(ref doc) = patch.document_ref {
        fields.insert("document_ref".to_string(), doc.clone().into());
    }
    serde_json::Value::Object(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn sample_envelope(state: &str) -> RecordEnvelope<BoxFields> {
        RecordEnvelope {
            id: Uuid::now_v7(),
            version: 3,
            fields: BoxFields {
                custodian: "Maria Lopez".to_string(),
                external_id: "CC-1019283".to_string(),
                concept: "Office petty cash".to_string(),
                initial_amount: dec!(2_000_000),
                opened_at: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
                state: state.to_string(),
                consolidated_at: None,
                document_ref: None,
            },
        }
    }

    #[test]
    fn test_box_from_envelope_carries_version() {
        let envelope = sample_envelope("open");
        let cashbox = box_from_envelope(envelope).unwrap();
        assert_eq!(cashbox.version, 3);
        assert_eq!(cashbox.state, BoxState::Open);
        assert_eq!(cashbox.initial_amount, dec!(2_000_000));
    }

    #[test]
    fn test_box_from_envelope_rejects_unknown_state() {
        let envelope = sample_envelope("archived");
        let result = box_from_envelope(envelope);
        assert!(matches!(result, Err(RepoError::Malformed(_))));
    }

    #[test]
    fn test_box_fields_roundtrip() {
        let envelope = sample_envelope("consolidating");
        let cashbox = box_from_envelope(envelope.clone()).unwrap();
        let fields = BoxFields::from_domain(&cashbox);
        assert_eq!(fields.state, "consolidating");
        assert_eq!(fields.custodian, envelope.fields.custodian);
    }

    #[test]
    fn test_patch_to_fields_is_sparse() {
        let patch = BoxPatch::touch();
        assert_eq!(patch_to_fields(&patch), serde_json::json!({}));

        let patch = BoxPatch::freeze();
        assert_eq!(
            patch_to_fields(&patch),
            serde_json::json!({"state": "consolidating"})
        );

        let patch = BoxPatch::commit(
            NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
            "s3://settlements/03_2026_pettycash.pdf".to_string(),
        );
        let fields = patch_to_fields(&patch);
        assert_eq!(fields["state"], "consolidated");
        assert_eq!(fields["consolidated_at"], "2026-03-31");
        assert_eq!(fields["document_ref"], "s3://settlements/03_2026_pettycash.pdf");
    }
}
