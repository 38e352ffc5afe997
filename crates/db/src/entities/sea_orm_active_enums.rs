//! `SeaORM` active enums, stored as short strings.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use inventra_core::ledger;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "in_progress")]
    InProgress,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
    #[sea_orm(string_value = "rejected")]
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    #[sea_orm(string_value = "pending")]
    Pending,
    #[sea_orm(string_value = "partially_paid")]
    PartiallyPaid,
    #[sea_orm(string_value = "paid")]
    Paid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[sea_orm(string_value = "cash")]
    Cash,
    #[sea_orm(string_value = "bank_transfer")]
    BankTransfer,
    #[sea_orm(string_value = "credit_card")]
    CreditCard,
    #[sea_orm(string_value = "check")]
    Check,
    #[sea_orm(string_value = "other")]
    Other,
}

impl From<OrderStatus> for ledger::OrderStatus {
    fn from(status: OrderStatus) -> Self {
        match status {
            OrderStatus::Pending => Self::Pending,
            OrderStatus::InProgress => Self::InProgress,
            OrderStatus::Completed => Self::Completed,
            OrderStatus::Cancelled => Self::Cancelled,
            OrderStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<ledger::OrderStatus> for OrderStatus {
    fn from(status: ledger::OrderStatus) -> Self {
        match status {
            ledger::OrderStatus::Pending => Self::Pending,
            ledger::OrderStatus::InProgress => Self::InProgress,
            ledger::OrderStatus::Completed => Self::Completed,
            ledger::OrderStatus::Cancelled => Self::Cancelled,
            ledger::OrderStatus::Rejected => Self::Rejected,
        }
    }
}

impl From<InvoiceStatus> for ledger::InvoiceStatus {
    fn from(status: InvoiceStatus) -> Self {
        match status {
            InvoiceStatus::Pending => Self::Pending,
            InvoiceStatus::PartiallyPaid => Self::PartiallyPaid,
            InvoiceStatus::Paid => Self::Paid,
        }
    }
}

impl From<ledger::InvoiceStatus> for InvoiceStatus {
    fn from(status: ledger::InvoiceStatus) -> Self {
        match status {
            ledger::InvoiceStatus::Pending => Self::Pending,
            ledger::InvoiceStatus::PartiallyPaid => Self::PartiallyPaid,
            ledger::InvoiceStatus::Paid => Self::Paid,
        }
    }
}

impl From<PaymentMethod> for ledger::PaymentMethod {
    fn from(method: PaymentMethod) -> Self {
        match method {
            PaymentMethod::Cash => Self::Cash,
            PaymentMethod::BankTransfer => Self::BankTransfer,
            PaymentMethod::CreditCard => Self::CreditCard,
            PaymentMethod::Check => Self::Check,
            PaymentMethod::Other => Self::Other,
        }
    }
}

impl From<ledger::PaymentMethod> for PaymentMethod {
    fn from(method: ledger::PaymentMethod) -> Self {
        match method {
            ledger::PaymentMethod::Cash => Self::Cash,
            ledger::PaymentMethod::BankTransfer => Self::BankTransfer,
            ledger::PaymentMethod::CreditCard => Self::CreditCard,
            ledger::PaymentMethod::Check => Self::Check,
            ledger::PaymentMethod::Other => Self::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveEnum;

    #[test]
    fn test_db_values_match_core_names() {
        for status in ledger::OrderStatus::ALL {
            assert_eq!(OrderStatus::from(status).to_value(), status.as_str());
        }
        assert_eq!(
            InvoiceStatus::from(ledger::InvoiceStatus::PartiallyPaid).to_value(),
            "partially_paid"
        );
        assert_eq!(
            PaymentMethod::from(ledger::PaymentMethod::BankTransfer).to_value(),
            "bank_transfer"
        );
    }
}
