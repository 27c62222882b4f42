//! Account variants and their balance-mutation rules.
use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::bank::{
    AccountNumber, Bank, BankId, Client, ClientId, ClosePolicy, DECIMAL_PRECISION, Money,
    RegistryError, ValidationError, format_money,
};

const MIN_DEPOSIT_TERM_MONTHS: u32 = 3;
const MIN_ANNUAL_RATE: f64 = 18.0;
const MAX_ANNUAL_RATE: f64 = 25.0;

fn serialize_money<S>(money: &Money, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    (*money as f64 / DECIMAL_PRECISION).serialize(serializer)
}

/// The closed set of account products.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Current,
    Deposit,
    Credit,
}

impl AccountType {
    /// Three-letter tag that starts every account number of this type.
    pub fn prefix(self) -> &'static str {
        match self {
            AccountType::Current => "CUR",
            AccountType::Deposit => "DEP",
            AccountType::Credit => "CRD",
        }
    }
}

/// How often deposit interest is credited.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum InterestCalculation {
    Daily,
    Monthly,
}

/// Caller-supplied parameters of a deposit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepositPlan {
    pub term_months: u32,
    pub min_balance: Money,
    pub is_withdrawable: bool,
    /// Percentage, within `18.0..=25.0`.
    pub annual_rate: f64,
    pub interest_calculation: InterestCalculation,
    pub is_prolongable: bool,
}

/// Terms of an opened deposit.
#[derive(Debug, Clone, PartialEq)]
pub struct DepositTerms {
    pub term_months: u32,
    pub min_balance: Money,
    /// Always true: deposits accept top-ups.
    pub is_replenishable: bool,
    pub is_withdrawable: bool,
    pub annual_rate: f64,
    pub interest_calculation: InterestCalculation,
    pub is_prolongable: bool,
    /// Open date plus `term_months`.
    pub end_date: NaiveDate,
}

impl DepositTerms {
    /// Whether the deposit term has run out on `today`.
    pub fn is_term_completed(&self, today: NaiveDate) -> bool {
        today >= self.end_date
    }
}

/// Terms of a credit line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreditTerms {
    pub credit_limit: Money,
    pub credit_rate: f64,
    pub credit_term: u32,
}

/// Variant-specific payload of an account.
#[derive(Debug, Clone, PartialEq)]
pub enum AccountKind {
    Current,
    Deposit(DepositTerms),
    Credit(CreditTerms),
}

/// A balance holder owned by a client at a bank.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Type tag followed by a generated token.
    number: AccountNumber,
    /// The client holding the account.
    owner: ClientId,
    /// The bank the account is opened at.
    bank: BankId,
    /// For credit accounts a negative balance is drawn credit.
    balance: Money,
    /// Set from the registry clock at creation.
    open_date: NaiveDate,
    /// Unset while the account is active.
    close_date: Option<NaiveDate>,
    kind: AccountKind,
}

impl Account {
    /// Creates a current account.
    pub fn current(
        number: AccountNumber,
        owner: ClientId,
        bank: BankId,
        balance: Money,
        open_date: NaiveDate,
    ) -> Self {
        Account {
            number,
            owner,
            bank,
            balance,
            open_date,
            close_date: None,
            kind: AccountKind::Current,
        }
    }

    /// Creates a deposit account. The initial balance must cover the minimum balance.
    pub fn deposit_account(
        number: AccountNumber,
        owner: ClientId,
        bank: BankId,
        balance: Money,
        open_date: NaiveDate,
        plan: DepositPlan,
    ) -> Result<Self, RegistryError> {
        if plan.term_months < MIN_DEPOSIT_TERM_MONTHS {
            return Err(ValidationError::DepositTermTooShort(plan.term_months).into());
        }
        if !(MIN_ANNUAL_RATE..=MAX_ANNUAL_RATE).contains(&plan.annual_rate) {
            return Err(ValidationError::AnnualRateOutOfRange(plan.annual_rate).into());
        }
        if balance < plan.min_balance {
            return Err(RegistryError::BelowMinimumBalance {
                initial: balance,
                minimum: plan.min_balance,
            });
        }
        let end_date = open_date
            .checked_add_months(Months::new(plan.term_months))
            .ok_or(ValidationError::DepositTermTooLong(plan.term_months))?;
        Ok(Account {
            number,
            owner,
            bank,
            balance,
            open_date,
            close_date: None,
            kind: AccountKind::Deposit(DepositTerms {
                term_months: plan.term_months,
                min_balance: plan.min_balance,
                is_replenishable: true,
                is_withdrawable: plan.is_withdrawable,
                annual_rate: plan.annual_rate,
                interest_calculation: plan.interest_calculation,
                is_prolongable: plan.is_prolongable,
                end_date,
            }),
        })
    }

    /// Creates a credit account.
    pub fn credit(
        number: AccountNumber,
        owner: ClientId,
        bank: BankId,
        balance: Money,
        open_date: NaiveDate,
        terms: CreditTerms,
    ) -> Result<Self, RegistryError> {
        if terms.credit_limit <= 0 {
            return Err(RegistryError::InvalidCreditLimit);
        }
        if terms.credit_rate.is_nan() || terms.credit_rate <= 0.0 {
            return Err(ValidationError::NonPositiveCreditRate(terms.credit_rate).into());
        }
        Ok(Account {
            number,
            owner,
            bank,
            balance,
            open_date,
            close_date: None,
            kind: AccountKind::Credit(terms),
        })
    }

    /// Gets the account number.
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Gets the owning client's ID.
    pub fn owner(&self) -> ClientId {
        self.owner
    }

    /// Gets the ID of the bank holding the account.
    pub fn bank(&self) -> BankId {
        self.bank
    }

    /// Gets the current balance.
    pub fn balance(&self) -> Money {
        self.balance
    }

    /// Gets the date the account was opened.
    pub fn open_date(&self) -> NaiveDate {
        self.open_date
    }

    /// Gets the close date, if the account has been closed.
    pub fn close_date(&self) -> Option<NaiveDate> {
        self.close_date
    }

    /// Gets the variant-specific payload.
    pub fn kind(&self) -> &AccountKind {
        &self.kind
    }

    /// Gets the variant tag.
    pub fn account_type(&self) -> AccountType {
        match self.kind {
            AccountKind::Current => AccountType::Current,
            AccountKind::Deposit(_) => AccountType::Deposit,
            AccountKind::Credit(_) => AccountType::Credit,
        }
    }

    /// An account is active until its close date is set.
    pub fn is_active(&self) -> bool {
        self.close_date.is_none()
    }

    /// Deposit end date, for deposit accounts.
    pub fn end_date(&self) -> Option<NaiveDate> {
        match &self.kind {
            AccountKind::Deposit(terms) => Some(terms.end_date),
            _ => None,
        }
    }

    /// `credit_limit + balance`, for credit accounts.
    pub fn available_credit(&self) -> Option<Money> {
        match &self.kind {
            AccountKind::Credit(terms) => Some(terms.credit_limit.saturating_add(self.balance)),
            _ => None,
        }
    }

    /// Whether the product rules allow closing the account on `today`.
    pub fn can_close(&self, today: NaiveDate) -> bool {
        match &self.kind {
            AccountKind::Current | AccountKind::Credit(_) => self.balance == 0,
            AccountKind::Deposit(terms) => {
                terms.is_term_completed(today) && self.balance >= terms.min_balance
            }
        }
    }

    /// Adds funds. Every variant accepts any positive amount the balance can still hold.
    pub fn deposit(&mut self, amount: Money) -> Result<(), ValidationError> {
        if amount <= 0 {
            return Err(ValidationError::InvalidAmount);
        }
        self.balance = self
            .balance
            .checked_add(amount)
            .ok_or(ValidationError::AmountTooLarge)?;
        Ok(())
    }

    /// Removes funds if the variant's rule allows it. A rejected withdrawal leaves the balance untouched.
    pub fn withdraw(&mut self, amount: Money) -> bool {
        if amount <= 0 {
            return false;
        }
        let floor = match &self.kind {
            AccountKind::Current => 0,
            AccountKind::Deposit(terms) => {
                if !terms.is_withdrawable {
                    return false;
                }
                terms.min_balance
            }
            AccountKind::Credit(terms) => -terms.credit_limit,
        };
        match self.balance.checked_sub(amount) {
            Some(remaining) if remaining >= floor => {
                self.balance = remaining;
                true
            }
            _ => false,
        }
    }

    /// Closes the account when `can_close` holds. Under `CheckOnly` only the rule is reported.
    /// Closed accounts stay closed and report `false`.
    pub fn close(&mut self, today: NaiveDate, policy: ClosePolicy) -> bool {
        if !self.is_active() || !self.can_close(today) {
            return false;
        }
        if policy == ClosePolicy::SetCloseDate {
            self.close_date = Some(today);
        }
        true
    }

    /// Human-readable summary including the variant's derived fields.
    pub fn describe(&self) -> String {
        let mut text = match &self.kind {
            AccountKind::Current => format!(
                "Current account {}, balance: {}",
                self.number,
                format_money(self.balance)
            ),
            AccountKind::Deposit(terms) => format!(
                "Deposit account {}, balance: {}, until {}, rate: {}%",
                self.number,
                format_money(self.balance),
                terms.end_date,
                terms.annual_rate
            ),
            AccountKind::Credit(terms) => format!(
                "Credit account {}, balance: {}, available: {}, limit: {}",
                self.number,
                format_money(self.balance),
                format_money(terms.credit_limit.saturating_add(self.balance)),
                format_money(terms.credit_limit)
            ),
        };
        if let Some(closed) = self.close_date {
            text.push_str(&format!(", closed {closed}"));
        }
        text
    }
}

/// Flat view of an account for CSV output.
#[derive(Serialize, Debug)]
pub struct AccountSummary {
    account: AccountNumber,
    #[serde(rename = "type")]
    account_type: AccountType,
    bank: String,
    client: String,
    #[serde(serialize_with = "serialize_money")]
    balance: Money,
    active: bool,
}

impl AccountSummary {
    pub fn new(account: &Account, bank: &Bank, client: &Client) -> Self {
        AccountSummary {
            account: account.number.clone(),
            account_type: account.account_type(),
            bank: bank.short_name().to_string(),
            client: client.tax_id().to_string(),
            balance: account.balance,
            active: account.is_active(),
        }
    }
}
