//! Operation records read from a CSV script and applied to the registry in order.
use std::io;

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, de};
use thiserror::Error;

use crate::bank::{InterestCalculation, Money, RegistryError, checked_money_from_f64};

/// Enum representing the type of operation.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    AddBank,
    AddClient,
    OpenCurrent,
    OpenDeposit,
    OpenCredit,
    Deposit,
    Withdraw,
    Close,
}

/// Custom deserializer for monetary values to handle fixed-point representation.
fn deserialize_money<'de, D>(deserializer: D) -> Result<Option<Money>, D::Error>
where
    D: de::Deserializer<'de>,
{
    let value: Option<f64> = Option::deserialize(deserializer)?;
    value
        .map(|v| {
            checked_money_from_f64(v)
                .ok_or_else(|| <D::Error as de::Error>::custom(format!("amount {v} is out of range")))
        })
        .transpose()
}

/// One row of an operation script. Columns not used by an operation are left empty.
#[derive(Deserialize, Debug, Clone)]
pub struct Operation {
    #[serde(rename = "op")]
    op_type: OperationType,

    /// Script-local alias of the account an operation opens or targets.
    #[serde(rename = "ref", default)]
    reference: Option<String>,

    /// Full name of a bank or client.
    #[serde(default)]
    name: Option<String>,

    /// Short name of a bank.
    #[serde(default)]
    short: Option<String>,

    /// Bank interest rate, deposit annual rate or credit rate, depending on the operation.
    #[serde(default)]
    rate: Option<f64>,

    #[serde(default)]
    tax_id: Option<String>,

    #[serde(default)]
    passport_number: Option<String>,

    #[serde(default)]
    passport_series: Option<String>,

    /// Owner's tax id.
    #[serde(default)]
    client: Option<String>,

    /// Bank full or short name.
    #[serde(default)]
    bank: Option<String>,

    #[serde(default, deserialize_with = "deserialize_money")]
    amount: Option<Money>,

    /// Deposit or credit term in months.
    #[serde(default)]
    term: Option<u32>,

    #[serde(default, deserialize_with = "deserialize_money")]
    min_balance: Option<Money>,

    #[serde(default)]
    withdrawable: Option<bool>,

    #[serde(default)]
    interest: Option<InterestCalculation>,

    #[serde(default)]
    prolongable: Option<bool>,

    /// Credit limit.
    #[serde(default, deserialize_with = "deserialize_money")]
    limit: Option<Money>,
}

/// Errors that can occur while applying an operation.
#[derive(Error, Debug)]
pub enum OperationError {
    #[error("Missing column `{0}`")]
    MissingField(&'static str),
    #[error("Unknown account reference {0:?}")]
    UnknownReference(String),
    #[error("Account reference {0:?} is already in use")]
    DuplicateReference(String),
    #[error("No client with tax id {0}")]
    UnknownClient(String),
    #[error("No bank named {0:?}")]
    UnknownBank(String),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

fn required<T>(value: Option<T>, field: &'static str) -> Result<T, OperationError> {
    value.ok_or(OperationError::MissingField(field))
}

impl Operation {
    /// Gets the type of the operation.
    pub fn get_type(&self) -> OperationType {
        self.op_type
    }

    /// Gets the account alias.
    pub fn reference(&self) -> Result<&str, OperationError> {
        required(self.reference.as_deref(), "ref")
    }

    /// Gets the bank or client full name.
    pub fn name(&self) -> Result<&str, OperationError> {
        required(self.name.as_deref(), "name")
    }

    /// Gets the bank short name.
    pub fn short(&self) -> Result<&str, OperationError> {
        required(self.short.as_deref(), "short")
    }

    /// Gets the rate column.
    pub fn rate(&self) -> Result<f64, OperationError> {
        required(self.rate, "rate")
    }

    /// Gets the new client's tax id.
    pub fn tax_id(&self) -> Result<&str, OperationError> {
        required(self.tax_id.as_deref(), "tax_id")
    }

    /// Gets the new client's passport number.
    pub fn passport_number(&self) -> Result<&str, OperationError> {
        required(self.passport_number.as_deref(), "passport_number")
    }

    /// Gets the new client's passport series.
    pub fn passport_series(&self) -> Result<&str, OperationError> {
        required(self.passport_series.as_deref(), "passport_series")
    }

    /// Gets the owner's tax id.
    pub fn client(&self) -> Result<&str, OperationError> {
        required(self.client.as_deref(), "client")
    }

    /// Gets the bank name.
    pub fn bank(&self) -> Result<&str, OperationError> {
        required(self.bank.as_deref(), "bank")
    }

    /// Gets the amount of the operation.
    pub fn amount(&self) -> Result<Money, OperationError> {
        required(self.amount, "amount")
    }

    /// Opening balance; an empty column means zero.
    pub fn opening_balance(&self) -> Money {
        self.amount.unwrap_or_default()
    }

    /// Gets the term in months.
    pub fn term(&self) -> Result<u32, OperationError> {
        required(self.term, "term")
    }

    /// Gets the deposit minimum balance.
    pub fn min_balance(&self) -> Result<Money, OperationError> {
        required(self.min_balance, "min_balance")
    }

    /// Whether the deposit allows withdrawals; defaults to `false`.
    pub fn withdrawable(&self) -> bool {
        self.withdrawable.unwrap_or(false)
    }

    /// Gets the interest calculation; defaults to monthly.
    pub fn interest(&self) -> InterestCalculation {
        self.interest.unwrap_or(InterestCalculation::Monthly)
    }

    /// Whether the deposit is prolongable; defaults to `false`.
    pub fn prolongable(&self) -> bool {
        self.prolongable.unwrap_or(false)
    }

    /// Gets the credit limit.
    pub fn limit(&self) -> Result<Money, OperationError> {
        required(self.limit, "limit")
    }
}

/// CSV reader configured for operation scripts.
pub fn operation_reader<R: io::Read>(source: R) -> csv::Reader<R> {
    ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(source)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = "\
op,ref,name,short,rate,tax_id,passport_number,passport_series,client,bank,amount,term,min_balance,withdrawable,interest,prolongable,limit
add_bank,,Alpha Bank,Alpha,1.0,,,,,,,,,,,,
open_deposit,dep,,,20.5,,,,123456789012,Alpha,1500.25,6,1000,true,daily,false,
withdraw,dep,,,,,,,,,0.29,,,,,,
";

    fn parse(script: &str) -> Vec<Operation> {
        operation_reader(script.as_bytes())
            .deserialize()
            .collect::<Result<Vec<Operation>, _>>()
            .unwrap()
    }

    #[test]
    fn test_parse_script() {
        let operations = parse(SCRIPT);
        assert_eq!(operations.len(), 3);

        let bank = &operations[0];
        assert_eq!(bank.get_type(), OperationType::AddBank);
        assert_eq!(bank.name().unwrap(), "Alpha Bank");
        assert_eq!(bank.short().unwrap(), "Alpha");
        assert_eq!(bank.rate().unwrap(), 1.0);
        assert!(matches!(
            bank.reference(),
            Err(OperationError::MissingField("ref"))
        ));

        let deposit = &operations[1];
        assert_eq!(deposit.get_type(), OperationType::OpenDeposit);
        assert_eq!(deposit.amount().unwrap(), 15_002_500);
        assert_eq!(deposit.min_balance().unwrap(), 10_000_000);
        assert_eq!(deposit.term().unwrap(), 6);
        assert!(deposit.withdrawable());
        assert!(!deposit.prolongable());
        assert_eq!(deposit.interest(), InterestCalculation::Daily);
        assert!(deposit.limit().is_err());

        let withdraw = &operations[2];
        assert_eq!(withdraw.reference().unwrap(), "dep");
        assert_eq!(withdraw.amount().unwrap(), 2900);
    }

    #[test]
    fn test_unknown_operation_is_rejected() {
        let script = "op,ref\ntransfer,a\n";
        let result: Result<Vec<Operation>, _> = operation_reader(script.as_bytes())
            .deserialize()
            .collect();
        assert!(result.is_err());
    }

    #[test]
    fn test_unrepresentable_amounts_are_rejected() {
        for amount in ["NaN", "inf", "-inf", "1e15", "-1e16"] {
            let script = format!("op,ref,amount\ndeposit,cur,{amount}\n");
            let result: Result<Vec<Operation>, _> = operation_reader(script.as_bytes())
                .deserialize()
                .collect();
            assert!(result.is_err(), "{amount} should not parse");
        }
        let operations = parse("op,ref,amount\ndeposit,cur,1e14\n");
        assert_eq!(operations[0].amount().unwrap(), 1_000_000_000_000_000_000);
    }

    #[test]
    fn test_defaults_for_empty_columns() {
        let operations = parse("op,ref,client,bank,amount\nopen_current,cur,123456789012,Alpha,\n");
        let open = &operations[0];
        assert_eq!(open.opening_balance(), 0);
        assert_eq!(open.interest(), InterestCalculation::Monthly);
        assert!(!open.withdrawable());
    }
}
