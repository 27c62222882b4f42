//! Immutable records for banks and their clients.
use std::fmt;

use crate::bank::{BankId, ClientId, ValidationError};

const MIN_BANK_RATE: f64 = 0.1;
const MAX_BANK_RATE: f64 = 2.0;
const MIN_CLIENT_NAME_LEN: usize = 5;
const TAX_ID_DIGITS: usize = 12;
const PASSPORT_NUMBER_DIGITS: usize = 6;
const PASSPORT_SERIES_DIGITS: usize = 4;

/// A financial institution and the interest rate it pays on current balances.
#[derive(Debug, Clone, PartialEq)]
pub struct Bank {
    /// Registry-assigned ID.
    id: BankId,
    /// Full name, unique ignoring case.
    full_name: String,
    /// Short name, unique ignoring case.
    short_name: String,
    /// Percentage, within `0.1..=2.0`.
    interest_rate: f64,
}

impl Bank {
    /// Validates the fields and builds a bank.
    pub fn new(
        id: BankId,
        full_name: impl Into<String>,
        short_name: impl Into<String>,
        interest_rate: f64,
    ) -> Result<Self, ValidationError> {
        let full_name = full_name.into();
        let short_name = short_name.into();
        if full_name.trim().is_empty() {
            return Err(ValidationError::BlankBankFullName);
        }
        if short_name.trim().is_empty() {
            return Err(ValidationError::BlankBankShortName);
        }
        if !(MIN_BANK_RATE..=MAX_BANK_RATE).contains(&interest_rate) {
            return Err(ValidationError::BankRateOutOfRange(interest_rate));
        }
        Ok(Bank {
            id,
            full_name,
            short_name,
            interest_rate,
        })
    }

    /// Gets the bank ID.
    pub fn id(&self) -> BankId {
        self.id
    }

    /// Gets the full name.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Gets the short name.
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Gets the interest rate paid on current balances, in percent.
    pub fn interest_rate(&self) -> f64 {
        self.interest_rate
    }

    /// Whether `name` matches either the full or the short name, ignoring case.
    pub fn is_named(&self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.full_name.to_lowercase() == name || self.short_name.to_lowercase() == name
    }
}

impl fmt::Display for Bank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) - {}%",
            self.short_name, self.full_name, self.interest_rate
        )
    }
}

/// A natural person holding accounts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Client {
    /// Registry-assigned ID.
    id: ClientId,
    /// At least 5 characters once trimmed.
    full_name: String,
    /// Exactly 12 digits, unique across clients.
    tax_id: String,
    /// Exactly 6 digits.
    passport_number: String,
    /// Exactly 4 digits.
    passport_series: String,
}

fn is_digits(value: &str, len: usize) -> bool {
    value.len() == len && value.bytes().all(|b| b.is_ascii_digit())
}

impl Client {
    /// Validates the fields and builds a client.
    pub fn new(
        id: ClientId,
        full_name: impl Into<String>,
        tax_id: impl Into<String>,
        passport_number: impl Into<String>,
        passport_series: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let full_name = full_name.into();
        let tax_id = tax_id.into();
        let passport_number = passport_number.into();
        let passport_series = passport_series.into();
        if full_name.trim().chars().count() < MIN_CLIENT_NAME_LEN {
            return Err(ValidationError::ClientNameTooShort);
        }
        if !is_digits(&tax_id, TAX_ID_DIGITS) {
            return Err(ValidationError::InvalidTaxId);
        }
        if !is_digits(&passport_number, PASSPORT_NUMBER_DIGITS) {
            return Err(ValidationError::InvalidPassportNumber);
        }
        if !is_digits(&passport_series, PASSPORT_SERIES_DIGITS) {
            return Err(ValidationError::InvalidPassportSeries);
        }
        Ok(Client {
            id,
            full_name,
            tax_id,
            passport_number,
            passport_series,
        })
    }

    /// Gets the client ID.
    pub fn id(&self) -> ClientId {
        self.id
    }

    /// Gets the full name.
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Gets the 12-digit tax id.
    pub fn tax_id(&self) -> &str {
        &self.tax_id
    }

    /// Gets the 6-digit passport number.
    pub fn passport_number(&self) -> &str {
        &self.passport_number
    }

    /// Gets the 4-digit passport series.
    pub fn passport_series(&self) -> &str {
        &self.passport_series
    }
}

impl fmt::Display for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (tax id: {})", self.full_name, self.tax_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_rate_bounds() {
        assert!(Bank::new(1, "Alpha Bank", "Alpha", 0.1).is_ok());
        assert!(Bank::new(1, "Alpha Bank", "Alpha", 2.0).is_ok());
        assert_eq!(
            Bank::new(1, "Alpha Bank", "Alpha", 0.09),
            Err(ValidationError::BankRateOutOfRange(0.09))
        );
        assert_eq!(
            Bank::new(1, "Alpha Bank", "Alpha", 2.01),
            Err(ValidationError::BankRateOutOfRange(2.01))
        );
        assert!(Bank::new(1, "Alpha Bank", "Alpha", f64::NAN).is_err());
    }

    #[test]
    fn test_bank_blank_names() {
        assert_eq!(
            Bank::new(1, "   ", "Alpha", 1.0),
            Err(ValidationError::BlankBankFullName)
        );
        assert_eq!(
            Bank::new(1, "Alpha Bank", "", 1.0),
            Err(ValidationError::BlankBankShortName)
        );
    }

    #[test]
    fn test_bank_display_and_names() {
        let bank = Bank::new(1, "Alpha Bank", "Alpha", 1.5).unwrap();
        assert_eq!(bank.to_string(), "Alpha (Alpha Bank) - 1.5%");
        assert!(bank.is_named("ALPHA"));
        assert!(bank.is_named("alpha bank"));
        assert!(!bank.is_named("Beta"));
    }

    #[test]
    fn test_client_tax_id() {
        assert!(Client::new(1, "Jane Q Public", "000000000012", "123456", "1234").is_ok());
        assert_eq!(
            Client::new(1, "Jane Q Public", "12345678901", "123456", "1234"),
            Err(ValidationError::InvalidTaxId)
        );
        assert_eq!(
            Client::new(1, "Jane Q Public", "1234567890123", "123456", "1234"),
            Err(ValidationError::InvalidTaxId)
        );
        assert_eq!(
            Client::new(1, "Jane Q Public", "12345678901a", "123456", "1234"),
            Err(ValidationError::InvalidTaxId)
        );
    }

    #[test]
    fn test_client_name_and_passport() {
        assert_eq!(
            Client::new(1, "  Jane  ", "123456789012", "123456", "1234"),
            Err(ValidationError::ClientNameTooShort)
        );
        assert_eq!(
            Client::new(1, "Jane Q Public", "123456789012", "12345", "1234"),
            Err(ValidationError::InvalidPassportNumber)
        );
        assert_eq!(
            Client::new(1, "Jane Q Public", "123456789012", "123456", "123"),
            Err(ValidationError::InvalidPassportSeries)
        );
        let client = Client::new(1, "Jane Q Public", "123456789012", "123456", "1234").unwrap();
        assert_eq!(client.to_string(), "Jane Q Public (tax id: 123456789012)");
    }
}
