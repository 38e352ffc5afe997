//! Payment ledger: payment methods and the over-payment guard.

use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use inventra_shared::types::InvoiceId;

use super::error::{LedgerError, ensure_money};
use super::invoice::{InvoiceBalance, InvoiceStatus};

/// How a payment was made.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Cash.
    Cash,
    /// Bank transfer.
    BankTransfer,
    /// Credit card.
    CreditCard,
    /// Check.
    Check,
    /// Anything else.
    Other,
}

impl PaymentMethod {
    /// Returns the string representation of the method.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cash => "cash",
            Self::BankTransfer => "bank_transfer",
            Self::CreditCard => "credit_card",
            Self::Check => "check",
            Self::Other => "other",
        }
    }

    /// Parses a method from a string, ignoring case and `-`/`_`/space separators.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized: String = s
            .trim()
            .chars()
            .filter(|c| !matches!(c, '_' | '-' | ' '))
            .collect::<String>()
            .to_lowercase();
        match normalized.as_str() {
            "cash" => Some(Self::Cash),
            "banktransfer" => Some(Self::BankTransfer),
            "creditcard" => Some(Self::CreditCard),
            "check" | "cheque" => Some(Self::Check),
            "other" => Some(Self::Other),
            _ => None,
        }
    }

    /// Parses a method, failing with a validation error for unknown values.
    pub fn parse_or_err(s: &str) -> Result<Self, LedgerError> {
        Self::parse(s).ok_or_else(|| LedgerError::InvalidPaymentMethod(s.to_string()))
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of accepting a payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PaymentOutcome {
    /// Invoice balance once the payment is recorded.
    pub balance_after: InvoiceBalance,
    /// Invoice status to persist.
    pub new_status: InvoiceStatus,
}

/// Stateless service guarding payment creation.
pub struct PaymentService;

impl PaymentService {
    /// Validates a payment against the invoice's current balance.
    ///
    /// `balance` must be computed from payments read under the invoice lock.
    ///
    /// # Errors
    ///
    /// `NonPositiveAmount` when `amount <= 0`, `InvalidPrecision` for
    /// fractions of a cent, `Overpayment` when it exceeds the remaining
    /// balance.
    pub fn validate(
        invoice_id: InvoiceId,
        amount: Decimal,
        balance: &InvoiceBalance,
    ) -> Result<PaymentOutcome, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NonPositiveAmount(amount));
        }
        ensure_money("amount", amount)?;
        if amount > balance.remaining {
            return Err(LedgerError::Overpayment {
                invoice_id,
                amount,
                remaining: balance.remaining,
            });
        }

        let total_paid = balance.total_paid + amount;
        let balance_after = InvoiceBalance::compute(balance.total_amount, [total_paid]);
        Ok(PaymentOutcome {
            new_status: balance_after.status(),
            balance_after,
        })
    }
}
