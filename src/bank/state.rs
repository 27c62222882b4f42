//! The `State` module owns the registry and applies operations arriving over a channel.
use std::collections::HashMap;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::bank::{
    AccountNumber, Bank, BankId, Client, ClientId, CreditTerms, DepositPlan, Operation,
    OperationError, OperationType, Registry, format_money,
};

/// Single writer over the registry, fed by an operation channel.
pub struct State {
    registry: Registry,
    /// Script aliases of opened accounts.
    references: HashMap<String, AccountNumber>,
    /// A channel receiver for processing incoming operations.
    receiver: mpsc::Receiver<Operation>,
}

impl State {
    /// Creates a new instance of `State` around an existing registry.
    pub fn new(registry: Registry, receiver: mpsc::Receiver<Operation>) -> Self {
        State {
            registry,
            references: HashMap::new(),
            receiver,
        }
    }

    /// Gets the registry being driven.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Account number bound to a script alias.
    pub fn account_number(&self, reference: &str) -> Option<&str> {
        self.references.get(reference).map(String::as_str)
    }

    fn resolve_reference(&self, operation: &Operation) -> Result<AccountNumber, OperationError> {
        let reference = operation.reference()?;
        self.references
            .get(reference)
            .cloned()
            .ok_or_else(|| OperationError::UnknownReference(reference.to_string()))
    }

    fn resolve_owner(&self, operation: &Operation) -> Result<(ClientId, BankId), OperationError> {
        let tax_id = operation.client()?;
        let client = self
            .registry
            .find_client_by_tax_id(tax_id)
            .map(Client::id)
            .ok_or_else(|| OperationError::UnknownClient(tax_id.to_string()))?;
        let name = operation.bank()?;
        let bank = self
            .registry
            .find_bank_by_name(name)
            .map(Bank::id)
            .ok_or_else(|| OperationError::UnknownBank(name.to_string()))?;
        Ok((client, bank))
    }

    fn free_reference(&self, operation: &Operation) -> Result<String, OperationError> {
        let reference = operation.reference()?;
        if self.references.contains_key(reference) {
            return Err(OperationError::DuplicateReference(reference.to_string()));
        }
        Ok(reference.to_string())
    }

    /// Applies one operation. `Ok(false)` means an account rule declined it.
    pub fn process_operation(&mut self, operation: Operation) -> Result<bool, OperationError> {
        match operation.get_type() {
            OperationType::AddBank => {
                self.registry
                    .add_bank(operation.name()?, operation.short()?, operation.rate()?)?;
            }
            OperationType::AddClient => {
                self.registry.add_client(
                    operation.name()?,
                    operation.tax_id()?,
                    operation.passport_number()?,
                    operation.passport_series()?,
                )?;
            }
            OperationType::OpenCurrent => {
                let reference = self.free_reference(&operation)?;
                let (client, bank) = self.resolve_owner(&operation)?;
                let number = self
                    .registry
                    .open_current_account(client, bank, operation.opening_balance())?
                    .number()
                    .to_string();
                self.references.insert(reference, number);
            }
            OperationType::OpenDeposit => {
                let reference = self.free_reference(&operation)?;
                let (client, bank) = self.resolve_owner(&operation)?;
                let plan = DepositPlan {
                    term_months: operation.term()?,
                    min_balance: operation.min_balance()?,
                    is_withdrawable: operation.withdrawable(),
                    annual_rate: operation.rate()?,
                    interest_calculation: operation.interest(),
                    is_prolongable: operation.prolongable(),
                };
                let number = self
                    .registry
                    .open_deposit_account(client, bank, operation.amount()?, plan)?
                    .number()
                    .to_string();
                self.references.insert(reference, number);
            }
            OperationType::OpenCredit => {
                let reference = self.free_reference(&operation)?;
                let (client, bank) = self.resolve_owner(&operation)?;
                let terms = CreditTerms {
                    credit_limit: operation.limit()?,
                    credit_rate: operation.rate()?,
                    credit_term: operation.term()?,
                };
                let number = self
                    .registry
                    .open_credit_account(client, bank, terms, operation.opening_balance())?
                    .number()
                    .to_string();
                self.references.insert(reference, number);
            }
            OperationType::Deposit => {
                let number = self.resolve_reference(&operation)?;
                return self
                    .registry
                    .deposit_to(&number, operation.amount()?)
                    .map_err(OperationError::from);
            }
            OperationType::Withdraw => {
                let number = self.resolve_reference(&operation)?;
                return Ok(self.registry.withdraw_from(&number, operation.amount()?));
            }
            OperationType::Close => {
                let number = self.resolve_reference(&operation)?;
                return Ok(self.registry.close_account(&number));
            }
        }
        Ok(true)
    }

    /// Runs the state management loop, processing operations from the receiver.
    pub async fn run(&mut self) {
        while let Some(operation) = self.receiver.recv().await {
            let op_type = operation.get_type();
            match self.process_operation(operation) {
                Ok(true) => {}
                Ok(false) => warn!(?op_type, "operation declined"),
                Err(e) => warn!(?op_type, "error processing operation: {e}"),
            }
        }
        info!(
            accounts = self.registry.total_accounts(),
            active = self.registry.active_accounts(),
            total_balance = %format_money(self.registry.total_balance()),
            "operation stream finished"
        );
    }
}
