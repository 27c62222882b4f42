//! The `Registry` owns every bank, client and account and enforces the rules that span them.
use std::collections::{BTreeMap, HashMap};

use tracing::{debug, info, warn};

use crate::bank::{
    Account, AccountNumber, AccountNumberGenerator, AccountSummary, AccountType, Bank, BankId,
    Client, ClientId, Clock, CreditTerms, DepositPlan, Money, RandomTokens, RegistryConfig,
    RegistryError, SystemClock,
};

/// In-memory store of banks, clients and accounts.
pub struct Registry {
    config: RegistryConfig,
    clock: Box<dyn Clock>,
    numbers: Box<dyn AccountNumberGenerator>,
    banks: BTreeMap<BankId, Bank>,
    clients: BTreeMap<ClientId, Client>,
    /// Tax id to client, for uniqueness checks and lookup.
    tax_ids: HashMap<String, ClientId>,
    /// Accounts in opening order.
    accounts: Vec<Account>,
    account_index: HashMap<AccountNumber, usize>,
    next_bank_id: BankId,
    next_client_id: ClientId,
}

impl Default for Registry {
    fn default() -> Self {
        Registry::new(RegistryConfig::default())
    }
}

impl Registry {
    /// Creates an empty registry using the system clock and random account numbers.
    pub fn new(config: RegistryConfig) -> Self {
        Registry::with_sources(config, SystemClock, RandomTokens)
    }

    /// Creates an empty registry with explicit date and account-number sources.
    pub fn with_sources(
        config: RegistryConfig,
        clock: impl Clock + 'static,
        numbers: impl AccountNumberGenerator + 'static,
    ) -> Self {
        Registry {
            config,
            clock: Box::new(clock),
            numbers: Box::new(numbers),
            banks: BTreeMap::new(),
            clients: BTreeMap::new(),
            tax_ids: HashMap::new(),
            accounts: Vec::new(),
            account_index: HashMap::new(),
            next_bank_id: 1,
            next_client_id: 1,
        }
    }

    /// Gets the active policy.
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Registers a bank. Both names must be unique, ignoring case.
    pub fn add_bank(
        &mut self,
        full_name: &str,
        short_name: &str,
        interest_rate: f64,
    ) -> Result<&Bank, RegistryError> {
        let full_lower = full_name.to_lowercase();
        let short_lower = short_name.to_lowercase();
        if self.banks.values().any(|bank| {
            bank.full_name().to_lowercase() == full_lower
                || bank.short_name().to_lowercase() == short_lower
        }) {
            debug!(full_name, short_name, "duplicate bank rejected");
            return Err(RegistryError::DuplicateBank {
                full_name: full_name.to_string(),
                short_name: short_name.to_string(),
            });
        }

        let id = self.next_bank_id;
        let bank = Bank::new(id, full_name, short_name, interest_rate)?;
        self.next_bank_id += 1;
        info!(id, bank = %bank, "bank registered");
        Ok(self.banks.entry(id).or_insert(bank))
    }

    /// Registers a client. The tax id must be unique.
    pub fn add_client(
        &mut self,
        full_name: &str,
        tax_id: &str,
        passport_number: &str,
        passport_series: &str,
    ) -> Result<&Client, RegistryError> {
        if self.tax_ids.contains_key(tax_id) {
            debug!(tax_id, "duplicate client rejected");
            return Err(RegistryError::DuplicateClient(tax_id.to_string()));
        }

        let id = self.next_client_id;
        let client = Client::new(id, full_name, tax_id, passport_number, passport_series)?;
        self.next_client_id += 1;
        info!(id, client = %client, "client registered");
        self.tax_ids.insert(client.tax_id().to_string(), id);
        Ok(self.clients.entry(id).or_insert(client))
    }

    /// Opens a current account, at most `max_current_accounts_per_bank` per client and bank.
    pub fn open_current_account(
        &mut self,
        client: ClientId,
        bank: BankId,
        initial_balance: Money,
    ) -> Result<&Account, RegistryError> {
        self.require_registered(client, bank)?;
        let limit = self.config.max_current_accounts_per_bank;
        if self.count_accounts(client, bank, AccountType::Current) >= limit {
            debug!(client, bank, limit, "current account limit reached");
            return Err(RegistryError::AccountLimitExceeded { limit });
        }

        let number = self.allocate_number(AccountType::Current)?;
        let today = self.clock.today();
        Ok(self.insert(Account::current(
            number,
            client,
            bank,
            initial_balance,
            today,
        )))
    }

    /// Opens a deposit account, at most `max_deposit_accounts_per_bank` per client and bank.
    pub fn open_deposit_account(
        &mut self,
        client: ClientId,
        bank: BankId,
        initial_balance: Money,
        plan: DepositPlan,
    ) -> Result<&Account, RegistryError> {
        self.require_registered(client, bank)?;
        if self.count_accounts(client, bank, AccountType::Deposit)
            >= self.config.max_deposit_accounts_per_bank
        {
            debug!(client, bank, "deposit account already held");
            return Err(RegistryError::DuplicateDepositAccount);
        }
        if initial_balance < plan.min_balance {
            return Err(RegistryError::BelowMinimumBalance {
                initial: initial_balance,
                minimum: plan.min_balance,
            });
        }

        let number = self.allocate_number(AccountType::Deposit)?;
        let today = self.clock.today();
        let account = Account::deposit_account(number, client, bank, initial_balance, today, plan)?;
        Ok(self.insert(account))
    }

    /// Opens a credit account.
    pub fn open_credit_account(
        &mut self,
        client: ClientId,
        bank: BankId,
        terms: CreditTerms,
        initial_balance: Money,
    ) -> Result<&Account, RegistryError> {
        self.require_registered(client, bank)?;
        if terms.credit_limit <= 0 {
            return Err(RegistryError::InvalidCreditLimit);
        }

        let number = self.allocate_number(AccountType::Credit)?;
        let today = self.clock.today();
        let account = Account::credit(number, client, bank, initial_balance, today, terms)?;
        Ok(self.insert(account))
    }

    /// Finds an account by number.
    pub fn find_account(&self, number: &str) -> Option<&Account> {
        self.account_index
            .get(number)
            .map(|&index| &self.accounts[index])
    }

    /// Finds a client by tax id.
    pub fn find_client_by_tax_id(&self, tax_id: &str) -> Option<&Client> {
        self.tax_ids.get(tax_id).and_then(|id| self.clients.get(id))
    }

    /// Finds a bank by its full or short name, ignoring case.
    pub fn find_bank_by_name(&self, name: &str) -> Option<&Bank> {
        self.banks.values().find(|bank| bank.is_named(name))
    }

    /// Gets a bank by ID.
    pub fn bank(&self, id: BankId) -> Option<&Bank> {
        self.banks.get(&id)
    }

    /// Gets a client by ID.
    pub fn client(&self, id: ClientId) -> Option<&Client> {
        self.clients.get(&id)
    }

    /// Deposits into an active account. Returns `Ok(false)` when the account is absent or closed.
    pub fn deposit_to(&mut self, number: &str, amount: Money) -> Result<bool, RegistryError> {
        let Some(account) = self.active_account_mut(number) else {
            return Ok(false);
        };
        account.deposit(amount)?;
        debug!(account = number, amount, balance = account.balance(), "deposit applied");
        Ok(true)
    }

    /// Withdraws from an active account. Returns `false` when the account is absent, closed,
    /// or its rules decline the withdrawal.
    pub fn withdraw_from(&mut self, number: &str, amount: Money) -> bool {
        let Some(account) = self.active_account_mut(number) else {
            return false;
        };
        let accepted = account.withdraw(amount);
        if accepted {
            debug!(account = number, amount, balance = account.balance(), "withdrawal applied");
        } else {
            debug!(account = number, amount, "withdrawal declined");
        }
        accepted
    }

    /// Closes an account when its close rule holds, following the configured policy.
    pub fn close_account(&mut self, number: &str) -> bool {
        let today = self.clock.today();
        let policy = self.config.close_policy;
        let Some(account) = self.active_account_mut(number) else {
            return false;
        };
        let closed = account.close(today, policy);
        if closed {
            info!(account = number, ?policy, "account closed");
        } else {
            debug!(account = number, "account cannot be closed yet");
        }
        closed
    }

    /// Whether the account's close rule holds today.
    pub fn can_close(&self, number: &str) -> Option<bool> {
        let today = self.clock.today();
        self.find_account(number).map(|account| account.can_close(today))
    }

    /// Account description prefixed with the bank's short name.
    pub fn describe_account(&self, number: &str) -> Option<String> {
        let account = self.find_account(number)?;
        let bank = self.banks.get(&account.bank())?;
        Some(format!("{}: {}", bank.short_name(), account.describe()))
    }

    /// All banks in registration order.
    pub fn banks(&self) -> impl Iterator<Item = &Bank> {
        self.banks.values()
    }

    /// All clients in registration order.
    pub fn clients(&self) -> impl Iterator<Item = &Client> {
        self.clients.values()
    }

    /// All accounts in opening order.
    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }

    /// Accounts held by a client.
    pub fn accounts_by_client(&self, client: ClientId) -> Vec<&Account> {
        self.accounts
            .iter()
            .filter(|account| account.owner() == client)
            .collect()
    }

    /// Accounts opened at a bank.
    pub fn accounts_by_bank(&self, bank: BankId) -> Vec<&Account> {
        self.accounts
            .iter()
            .filter(|account| account.bank() == bank)
            .collect()
    }

    /// Number of accounts, closed ones included.
    pub fn total_accounts(&self) -> usize {
        self.accounts.len()
    }

    /// Number of accounts without a close date.
    pub fn active_accounts(&self) -> usize {
        self.accounts.iter().filter(|account| account.is_active()).count()
    }

    /// Sum of all balances, saturating at the `Money` range.
    pub fn total_balance(&self) -> Money {
        self.accounts
            .iter()
            .map(Account::balance)
            .fold(0, Money::saturating_add)
    }

    /// One flat row per account, in opening order.
    pub fn summaries(&self) -> Vec<AccountSummary> {
        self.accounts
            .iter()
            .filter_map(|account| {
                let bank = self.banks.get(&account.bank())?;
                let client = self.clients.get(&account.owner())?;
                Some(AccountSummary::new(account, bank, client))
            })
            .collect()
    }

    fn require_registered(&self, client: ClientId, bank: BankId) -> Result<(), RegistryError> {
        if !self.clients.contains_key(&client) {
            return Err(RegistryError::UnregisteredClient(client));
        }
        if !self.banks.contains_key(&bank) {
            return Err(RegistryError::UnregisteredBank(bank));
        }
        Ok(())
    }

    fn count_accounts(&self, client: ClientId, bank: BankId, account_type: AccountType) -> usize {
        self.accounts
            .iter()
            .filter(|account| {
                account.owner() == client
                    && account.bank() == bank
                    && account.account_type() == account_type
            })
            .count()
    }

    /// Draws tokens until the resulting number is not already taken.
    fn allocate_number(&mut self, account_type: AccountType) -> Result<AccountNumber, RegistryError> {
        let attempts = self.config.account_number_attempts.max(1);
        let mut last = String::new();
        for _ in 0..attempts {
            last = format!("{}{}", account_type.prefix(), self.numbers.next_token());
            if !self.account_index.contains_key(&last) {
                return Ok(last);
            }
            warn!(account = %last, "account number collision, retrying");
        }
        Err(RegistryError::AccountNumberCollision { attempts, last })
    }

    fn insert(&mut self, account: Account) -> &Account {
        info!(
            account = account.number(),
            client = account.owner(),
            bank = account.bank(),
            balance = account.balance(),
            "account opened"
        );
        let index = self.accounts.len();
        self.account_index.insert(account.number().to_string(), index);
        self.accounts.push(account);
        &self.accounts[index]
    }

    fn active_account_mut(&mut self, number: &str) -> Option<&mut Account> {
        let index = *self.account_index.get(number)?;
        let account = &mut self.accounts[index];
        account.is_active().then_some(account)
    }
}
