//! Errors raised while creating entities or operating the registry.
use thiserror::Error;

use crate::bank::{AccountNumber, BankId, ClientId, Money, format_money};

/// Malformed entity fields, detected at construction time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Bank full name must not be blank")]
    BlankBankFullName,
    #[error("Bank short name must not be blank")]
    BlankBankShortName,
    #[error("Bank interest rate {0} is outside 0.1..=2.0")]
    BankRateOutOfRange(f64),
    #[error("Client full name must have at least 5 characters")]
    ClientNameTooShort,
    #[error("Tax id must contain exactly 12 digits")]
    InvalidTaxId,
    #[error("Passport number must contain exactly 6 digits")]
    InvalidPassportNumber,
    #[error("Passport series must contain exactly 4 digits")]
    InvalidPassportSeries,
    #[error("Deposit term must be at least 3 months, got {0}")]
    DepositTermTooShort(u32),
    #[error("Deposit term of {0} months runs past the calendar")]
    DepositTermTooLong(u32),
    #[error("Deposit annual rate {0} is outside 18.0..=25.0")]
    AnnualRateOutOfRange(f64),
    #[error("Credit rate must be positive, got {0}")]
    NonPositiveCreditRate(f64),
    #[error("Amount must be positive")]
    InvalidAmount,
    #[error("Amount would overflow the balance")]
    AmountTooLarge,
}

/// Coarse classification of registry failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    DuplicateEntity,
    UnregisteredEntity,
    ConstraintViolation,
}

/// Errors returned by registry creation and mutation calls.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("A bank named {full_name:?} or {short_name:?} already exists")]
    DuplicateBank {
        full_name: String,
        short_name: String,
    },
    #[error("A client with tax id {0} already exists")]
    DuplicateClient(String),
    #[error("Client {0} is not registered")]
    UnregisteredClient(ClientId),
    #[error("Bank {0} is not registered")]
    UnregisteredBank(BankId),
    #[error("Client already holds {limit} current accounts at this bank")]
    AccountLimitExceeded { limit: usize },
    #[error("Client already holds a deposit account at this bank")]
    DuplicateDepositAccount,
    #[error("Initial balance {} is below the minimum balance {}", format_money(.initial.to_owned()), format_money(.minimum.to_owned()))]
    BelowMinimumBalance { initial: Money, minimum: Money },
    #[error("Credit limit must be positive")]
    InvalidCreditLimit,
    #[error("Could not generate a free account number after {attempts} attempts (last: {last})")]
    AccountNumberCollision {
        attempts: u32,
        last: AccountNumber,
    },
}

impl RegistryError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            RegistryError::Validation(_) => ErrorKind::Validation,
            RegistryError::DuplicateBank { .. } | RegistryError::DuplicateClient(_) => {
                ErrorKind::DuplicateEntity
            }
            RegistryError::UnregisteredClient(_) | RegistryError::UnregisteredBank(_) => {
                ErrorKind::UnregisteredEntity
            }
            RegistryError::AccountLimitExceeded { .. }
            | RegistryError::DuplicateDepositAccount
            | RegistryError::BelowMinimumBalance { .. }
            | RegistryError::InvalidCreditLimit
            | RegistryError::AccountNumberCollision { .. } => ErrorKind::ConstraintViolation,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kinds() {
        assert_eq!(
            RegistryError::from(ValidationError::InvalidTaxId).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            RegistryError::DuplicateClient("123456789012".into()).kind(),
            ErrorKind::DuplicateEntity
        );
        assert_eq!(
            RegistryError::UnregisteredBank(7).kind(),
            ErrorKind::UnregisteredEntity
        );
        assert_eq!(
            RegistryError::DuplicateDepositAccount.kind(),
            ErrorKind::ConstraintViolation
        );
    }

    #[test]
    fn test_below_minimum_message() {
        let err = RegistryError::BelowMinimumBalance {
            initial: 9_999_900,
            minimum: 10_000_000,
        };
        assert_eq!(
            err.to_string(),
            "Initial balance 999.99 is below the minimum balance 1000.00"
        );
    }
}
