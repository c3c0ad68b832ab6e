//! Validation and normalization of submitted ledger entry forms.

use serde::{Deserialize, Serialize};

use crate::Error;

use super::TransactionKind;

/// The form data for recording a ledger entry.
///
/// The `form_type` field selects which of the three entry forms was
/// submitted: `income`, `expense`, or `adjustment`. The amount is taken as
/// raw text so that unparsable input can be reported back to the user
/// instead of failing form extraction.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EntryForm {
    /// Which operation was submitted.
    pub form_type: String,
    /// The value of the entry in dollars.
    pub amount: String,
    /// The truck the entry relates to.
    #[serde(default)]
    pub truck_id: Option<String>,
    /// A free-text expense category, e.g. "Fuel".
    #[serde(default)]
    pub expense_type: Option<String>,
    /// A free-text annotation.
    #[serde(default)]
    pub note: Option<String>,
}

/// A validated entry, ready to be stamped with a timestamp and stored.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ValidatedEntry {
    pub(crate) kind: TransactionKind,
    pub(crate) truck_id: Option<String>,
    pub(crate) amount: f64,
    pub(crate) expense_type: Option<String>,
    pub(crate) note: Option<String>,
}

/// Check a submitted entry form and normalize it into a [ValidatedEntry].
///
/// The checks run in order and the first failure wins:
/// the operation must be recognized, the amount must parse as a finite
/// number, income and expense amounts must be strictly positive, and
/// adjustment amounts must be non-zero. An adjustment's sign selects the
/// direction of the stored entry and its magnitude is the absolute value.
///
/// Empty optional fields normalize to `None`.
///
/// # Errors
/// Returns an [Error::UnknownOperation], [Error::InvalidAmount],
/// [Error::AmountNotPositive], or [Error::ZeroAdjustment] describing the
/// first rule the form broke. Nothing is persisted by this function.
pub(crate) fn validate_entry(form: EntryForm) -> Result<ValidatedEntry, Error> {
    match form.form_type.as_str() {
        "income" => {
            let amount = parse_positive_amount(&form.amount)?;

            Ok(ValidatedEntry {
                kind: TransactionKind::Income,
                truck_id: normalize_optional(form.truck_id),
                amount,
                expense_type: None,
                note: normalize_optional(form.note),
            })
        }
        "expense" => {
            let amount = parse_positive_amount(&form.amount)?;

            Ok(ValidatedEntry {
                kind: TransactionKind::Expense,
                truck_id: normalize_optional(form.truck_id),
                amount,
                expense_type: normalize_optional(form.expense_type),
                note: normalize_optional(form.note),
            })
        }
        "adjustment" => {
            let amount = parse_amount(&form.amount)?;

            if amount == 0.0 {
                return Err(Error::ZeroAdjustment);
            }

            let kind = if amount > 0.0 {
                TransactionKind::AdjustmentIn
            } else {
                TransactionKind::AdjustmentOut
            };

            Ok(ValidatedEntry {
                kind,
                truck_id: None,
                amount: amount.abs(),
                expense_type: None,
                note: normalize_optional(form.note),
            })
        }
        _ => Err(Error::UnknownOperation),
    }
}

fn parse_amount(raw: &str) -> Result<f64, Error> {
    let text = raw.trim();

    text.parse::<f64>()
        .ok()
        .filter(|amount| amount.is_finite())
        .ok_or_else(|| Error::InvalidAmount(text.to_owned()))
}

fn parse_positive_amount(raw: &str) -> Result<f64, Error> {
    let amount = parse_amount(raw)?;

    if amount <= 0.0 {
        return Err(Error::AmountNotPositive);
    }

    Ok(amount)
}

fn normalize_optional(field: Option<String>) -> Option<String> {
    field.filter(|text| !text.trim().is_empty())
}

#[cfg(test)]
mod validate_entry_tests {
    use crate::Error;

    use super::{EntryForm, TransactionKind, ValidatedEntry, validate_entry};

    fn form(form_type: &str, amount: &str) -> EntryForm {
        EntryForm {
            form_type: form_type.to_owned(),
            amount: amount.to_owned(),
            truck_id: None,
            expense_type: None,
            note: None,
        }
    }

    #[test]
    fn accepts_income() {
        let want = ValidatedEntry {
            kind: TransactionKind::Income,
            truck_id: Some("truck-7".to_owned()),
            amount: 1250.0,
            expense_type: None,
            note: Some("Napier haul".to_owned()),
        };

        let got = validate_entry(EntryForm {
            truck_id: Some("truck-7".to_owned()),
            note: Some("Napier haul".to_owned()),
            ..form("income", "1250")
        })
        .unwrap();

        assert_eq!(got, want);
    }

    #[test]
    fn accepts_expense_with_category() {
        let got = validate_entry(EntryForm {
            truck_id: Some("truck-7".to_owned()),
            expense_type: Some("Fuel".to_owned()),
            ..form("expense", "89.90")
        })
        .unwrap();

        assert_eq!(got.kind, TransactionKind::Expense);
        assert_eq!(got.expense_type, Some("Fuel".to_owned()));
        assert_eq!(got.amount, 89.90);
    }

    #[test]
    fn rejects_unknown_operation() {
        let result = validate_entry(form("refund", "10"));

        assert_eq!(result, Err(Error::UnknownOperation));
    }

    #[test]
    fn rejects_unparsable_amount() {
        let result = validate_entry(form("income", "ten dollars"));

        assert_eq!(
            result,
            Err(Error::InvalidAmount("ten dollars".to_owned()))
        );
    }

    #[test]
    fn rejects_non_finite_amount() {
        let result = validate_entry(form("income", "NaN"));

        assert_eq!(result, Err(Error::InvalidAmount("NaN".to_owned())));
    }

    #[test]
    fn rejects_zero_income() {
        assert_eq!(
            validate_entry(form("income", "0")),
            Err(Error::AmountNotPositive)
        );
    }

    #[test]
    fn rejects_negative_expense() {
        assert_eq!(
            validate_entry(form("expense", "-5")),
            Err(Error::AmountNotPositive)
        );
    }

    #[test]
    fn rejects_zero_adjustment() {
        assert_eq!(
            validate_entry(form("adjustment", "0")),
            Err(Error::ZeroAdjustment)
        );
    }

    #[test]
    fn negative_adjustment_becomes_outward_magnitude() {
        let got = validate_entry(form("adjustment", "-50")).unwrap();

        assert_eq!(got.kind, TransactionKind::AdjustmentOut);
        assert_eq!(got.amount, 50.0);
    }

    #[test]
    fn positive_adjustment_becomes_inward() {
        let got = validate_entry(form("adjustment", "75.5")).unwrap();

        assert_eq!(got.kind, TransactionKind::AdjustmentIn);
        assert_eq!(got.amount, 75.5);
    }

    #[test]
    fn empty_optional_fields_normalize_to_none() {
        let got = validate_entry(EntryForm {
            truck_id: Some("".to_owned()),
            expense_type: Some("  ".to_owned()),
            note: Some("".to_owned()),
            ..form("expense", "12")
        })
        .unwrap();

        assert_eq!(got.truck_id, None);
        assert_eq!(got.expense_type, None);
        assert_eq!(got.note, None);
    }

    #[test]
    fn amount_with_surrounding_whitespace_parses() {
        let got = validate_entry(form("income", " 42.0 ")).unwrap();

        assert_eq!(got.amount, 42.0);
    }
}
