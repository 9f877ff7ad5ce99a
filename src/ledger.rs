use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, RwLock};

use chrono::{NaiveDateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;

use crate::domain::{
    Account, AccountKind, Customer, LedgerError, LedgerStore, Transaction, TransactionKind,
};

const LOCK_MSG: &str = "ledger lock poisoned";

/// A read-only view of one customer, safe to hand to the shell.
#[derive(Debug, Clone)]
pub struct CustomerSummary {
    pub account_number: String,
    pub name: String,
    pub kind: AccountKind,
    pub balance: Decimal,
    pub active: bool,
    pub created_at: NaiveDateTime,
}

/// The central registry of customers and the append-only transaction log.
///
/// Each customer sits behind its own mutex so balance read-modify-write
/// cycles on different accounts do not serialize against each other; the
/// registry map and the transaction log each have their own coarser lock.
/// Every mutating operation flushes to the store before returning; a failed
/// flush is logged and does not roll back the in-memory change.
pub struct Ledger<S: LedgerStore> {
    customers: RwLock<HashMap<String, Arc<Mutex<Customer>>>>,
    transactions: Mutex<Vec<Transaction>>,
    store: S,
}

impl<S: LedgerStore> Ledger<S> {
    /// Builds the ledger from whatever the store currently holds.
    pub fn load(store: S) -> Result<Self, LedgerError> {
        let snapshot = store.load()?;
        let customers = snapshot
            .customers
            .into_iter()
            .map(|customer| {
                let key = customer.account().account_number().to_string();
                (key, Arc::new(Mutex::new(customer)))
            })
            .collect();
        Ok(Self {
            customers: RwLock::new(customers),
            transactions: Mutex::new(snapshot.transactions),
            store,
        })
    }

    /// Creates a customer plus their account and returns the new account
    /// number. A positive opening deposit is recorded as the account's
    /// first transaction.
    pub fn register_customer(
        &self,
        name: &str,
        password: &str,
        kind_text: &str,
        initial_deposit: Decimal,
    ) -> Result<String, LedgerError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LedgerError::Validation("customer name must not be empty".into()));
        }
        if name.contains('|') {
            // the persisted record is pipe-delimited
            return Err(LedgerError::Validation(
                "customer name must not contain '|'".into(),
            ));
        }
        if password.trim().is_empty() {
            return Err(LedgerError::Validation("password must not be empty".into()));
        }
        let kind = AccountKind::parse(kind_text).ok_or_else(|| {
            LedgerError::Validation(format!("unrecognized account type: {kind_text}"))
        })?;
        if initial_deposit < Decimal::ZERO {
            return Err(LedgerError::Validation(
                "initial deposit must not be negative".into(),
            ));
        }

        let now = Utc::now().naive_utc();
        let account_number = generate_account_number();
        {
            let mut registry = self.customers.write().expect(LOCK_MSG);
            if registry.contains_key(&account_number) {
                return Err(LedgerError::DuplicateAccount(account_number));
            }
            let account = Account::open(
                account_number.clone(),
                name.to_string(),
                kind,
                initial_deposit,
                now,
            );
            registry.insert(
                account_number.clone(),
                Arc::new(Mutex::new(Customer::new(name.to_string(), password, account))),
            );
        }

        if initial_deposit > Decimal::ZERO {
            self.append_transaction(Transaction {
                id: generate_transaction_id(),
                account_number: account_number.clone(),
                kind: TransactionKind::Deposit,
                amount: initial_deposit,
                timestamp: now,
                description: "Initial deposit".into(),
                balance_after: initial_deposit,
            });
        }
        self.persist();
        Ok(account_number)
    }

    /// Validates a customer's credentials and returns their summary.
    pub fn authenticate(
        &self,
        account_number: &str,
        password: &str,
    ) -> Result<CustomerSummary, LedgerError> {
        let handle = self.authenticate_handle(account_number, password)?;
        let customer = handle.lock().expect(LOCK_MSG);
        Ok(summary_of(&customer))
    }

    /// Authenticated balance inquiry. Interest accrual runs first, so the
    /// returned figure is current.
    pub fn balance_of(&self, account_number: &str, password: &str) -> Result<Decimal, LedgerError> {
        let handle = self.authenticate_handle(account_number, password)?;
        let now = Utc::now().naive_utc();
        let (balance, accrued) = {
            let mut customer = handle.lock().expect(LOCK_MSG);
            let account = customer.account_mut();
            let accrued = account.accrue_interest(now);
            (account.balance(), accrued)
        };
        if accrued.is_some() {
            report_accrual(accrued, account_number);
            self.persist();
        }
        Ok(balance)
    }

    /// Credits the account and records a `DEPOSIT` transaction. Returns the
    /// new balance.
    pub fn deposit(
        &self,
        account_number: &str,
        password: &str,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::Validation("deposit amount must be positive".into()));
        }
        let handle = self.authenticate_handle(account_number, password)?;
        let now = Utc::now().naive_utc();
        let balance_after = {
            let mut customer = handle.lock().expect(LOCK_MSG);
            let account = customer.account_mut();
            report_accrual(account.accrue_interest(now), account_number);
            account.deposit(amount)?;
            account.balance()
        };
        self.append_transaction(Transaction {
            id: generate_transaction_id(),
            account_number: account_number.to_string(),
            kind: TransactionKind::Deposit,
            amount,
            timestamp: now,
            description: "Cash deposit".into(),
            balance_after,
        });
        self.persist();
        Ok(balance_after)
    }

    /// Debits the account and records a `WITHDRAWAL` transaction. No
    /// transaction is recorded unless the debit succeeded.
    pub fn withdraw(
        &self,
        account_number: &str,
        password: &str,
        amount: Decimal,
    ) -> Result<Decimal, LedgerError> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::Validation(
                "withdrawal amount must be positive".into(),
            ));
        }
        let handle = self.authenticate_handle(account_number, password)?;
        let now = Utc::now().naive_utc();
        let balance_after = {
            let mut customer = handle.lock().expect(LOCK_MSG);
            let account = customer.account_mut();
            report_accrual(account.accrue_interest(now), account_number);
            if amount > account.balance() {
                return Err(LedgerError::InsufficientFunds {
                    required: amount,
                    available: account.balance(),
                });
            }
            account.withdraw(amount)?;
            account.balance()
        };
        self.append_transaction(Transaction {
            id: generate_transaction_id(),
            account_number: account_number.to_string(),
            kind: TransactionKind::Withdrawal,
            amount,
            timestamp: now,
            description: "Cash withdrawal".into(),
            balance_after,
        });
        self.persist();
        Ok(balance_after)
    }

    /// Moves funds between two accounts. Only the source authenticates; the
    /// destination just has to exist and be active. The deposit side runs
    /// only after the withdrawal has succeeded, so a failure can never leave
    /// a half-applied transfer. Exactly two transactions are recorded, the
    /// `TRANSFER_OUT` before the `TRANSFER_IN`.
    pub fn transfer(
        &self,
        from: &str,
        password: &str,
        to: &str,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        if from == to {
            return Err(LedgerError::Validation(
                "cannot transfer to the same account".into(),
            ));
        }
        if amount <= Decimal::ZERO {
            return Err(LedgerError::Validation("transfer amount must be positive".into()));
        }
        let from_handle = self.authenticate_handle(from, password)?;
        let to_handle = self.customer_handle(to)?;
        let now = Utc::now().naive_utc();

        let (from_after, to_after) = {
            // lock order: lexicographic by account number, so two transfers
            // running in opposite directions cannot deadlock
            let (mut low, mut high) = if from < to {
                (
                    from_handle.lock().expect(LOCK_MSG),
                    to_handle.lock().expect(LOCK_MSG),
                )
            } else {
                (
                    to_handle.lock().expect(LOCK_MSG),
                    from_handle.lock().expect(LOCK_MSG),
                )
            };
            let (source, dest) = if from < to {
                (&mut *low, &mut *high)
            } else {
                (&mut *high, &mut *low)
            };

            if !dest.account().is_active() {
                return Err(LedgerError::AccountSuspended);
            }

            let source_account = source.account_mut();
            report_accrual(source_account.accrue_interest(now), from);
            if amount > source_account.balance() {
                return Err(LedgerError::InsufficientFunds {
                    required: amount,
                    available: source_account.balance(),
                });
            }
            source_account.withdraw(amount)?;
            let from_after = source_account.balance();

            let dest_account = dest.account_mut();
            report_accrual(dest_account.accrue_interest(now), to);
            dest_account.deposit(amount)?;
            (from_after, dest_account.balance())
        };

        self.append_transaction(Transaction {
            id: generate_transaction_id(),
            account_number: from.to_string(),
            kind: TransactionKind::TransferOut,
            amount,
            timestamp: now,
            description: format!("Transfer to {to}"),
            balance_after: from_after,
        });
        self.append_transaction(Transaction {
            id: generate_transaction_id(),
            account_number: to.to_string(),
            kind: TransactionKind::TransferIn,
            amount,
            timestamp: now,
            description: format!("Transfer from {from}"),
            balance_after: to_after,
        });
        self.persist();
        Ok(())
    }

    /// Admin: flips the account between active and suspended. Returns the
    /// new state.
    pub fn toggle_status(&self, account_number: &str) -> Result<bool, LedgerError> {
        let handle = self.customer_handle(account_number)?;
        let now_active = {
            let mut customer = handle.lock().expect(LOCK_MSG);
            let active = !customer.account().is_active();
            customer.account_mut().set_active(active);
            active
        };
        self.persist();
        Ok(now_active)
    }

    /// Admin: removes the customer and their account. The account's
    /// transaction history is retained.
    pub fn delete_customer(&self, account_number: &str) -> Result<(), LedgerError> {
        {
            let mut registry = self.customers.write().expect(LOCK_MSG);
            registry
                .remove(account_number)
                .ok_or_else(|| LedgerError::NotFound(account_number.to_string()))?;
        }
        self.persist();
        Ok(())
    }

    /// Admin: clears the lockout state left by failed login attempts.
    pub fn unlock_customer(&self, account_number: &str) -> Result<(), LedgerError> {
        let handle = self.customer_handle(account_number)?;
        handle.lock().expect(LOCK_MSG).unlock();
        self.persist();
        Ok(())
    }

    /// Admin: drops the entire transaction log. Returns how many records
    /// were purged.
    pub fn purge_transactions(&self) -> usize {
        let purged = {
            let mut log = self.transactions.lock().expect(LOCK_MSG);
            let count = log.len();
            log.clear();
            count
        };
        self.persist();
        purged
    }

    /// All customers, ordered by account number.
    pub fn customers(&self) -> Vec<CustomerSummary> {
        let registry = self.customers.read().expect(LOCK_MSG);
        let mut rows: Vec<CustomerSummary> = registry
            .values()
            .map(|handle| summary_of(&handle.lock().expect(LOCK_MSG)))
            .collect();
        rows.sort_by(|a, b| a.account_number.cmp(&b.account_number));
        rows
    }

    pub fn customers_by_kind(&self, kind: AccountKind) -> Vec<CustomerSummary> {
        self.customers()
            .into_iter()
            .filter(|row| row.kind == kind)
            .collect()
    }

    pub fn customers_by_status(&self, active: bool) -> Vec<CustomerSummary> {
        self.customers()
            .into_iter()
            .filter(|row| row.active == active)
            .collect()
    }

    /// The whole log in insertion order.
    pub fn all_transactions(&self) -> Vec<Transaction> {
        self.transactions.lock().expect(LOCK_MSG).clone()
    }

    /// One account's transactions, newest first. The sort is stable, so
    /// records sharing a timestamp stay in insertion order.
    pub fn history(&self, account_number: &str) -> Vec<Transaction> {
        let log = self.transactions.lock().expect(LOCK_MSG);
        let mut rows: Vec<Transaction> = log
            .iter()
            .filter(|tx| tx.account_number == account_number)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        rows
    }

    /// The `n` transactions with the largest timestamps for the account.
    pub fn recent(&self, account_number: &str, n: usize) -> Vec<Transaction> {
        let mut rows = self.history(account_number);
        rows.truncate(n);
        rows
    }

    pub fn total_deposits(&self, account_number: &str) -> Decimal {
        self.sum_for(account_number, true)
    }

    pub fn total_withdrawals(&self, account_number: &str) -> Decimal {
        self.sum_for(account_number, false)
    }

    pub fn transaction_count(&self, account_number: &str) -> usize {
        self.transactions
            .lock()
            .expect(LOCK_MSG)
            .iter()
            .filter(|tx| tx.account_number == account_number)
            .count()
    }

    pub fn export_csv(&self, path: &Path) -> Result<(), LedgerError> {
        self.store.export_csv(path, &self.customer_snapshot())
    }

    pub fn backup(&self) -> Result<PathBuf, LedgerError> {
        self.store.backup()
    }

    fn sum_for(&self, account_number: &str, inflow: bool) -> Decimal {
        self.transactions
            .lock()
            .expect(LOCK_MSG)
            .iter()
            .filter(|tx| tx.account_number == account_number && tx.kind.is_inflow() == inflow)
            .map(|tx| tx.amount)
            .sum()
    }

    fn customer_handle(&self, account_number: &str) -> Result<Arc<Mutex<Customer>>, LedgerError> {
        self.customers
            .read()
            .expect(LOCK_MSG)
            .get(account_number)
            .cloned()
            .ok_or_else(|| LedgerError::NotFound(account_number.to_string()))
    }

    fn authenticate_handle(
        &self,
        account_number: &str,
        password: &str,
    ) -> Result<Arc<Mutex<Customer>>, LedgerError> {
        let handle = self.customer_handle(account_number)?;
        let outcome = {
            let mut customer = handle.lock().expect(LOCK_MSG);
            if !customer.validate_password(password) {
                Err(LedgerError::Unauthorized)
            } else if !customer.account().is_active() {
                Err(LedgerError::AccountSuspended)
            } else {
                Ok(())
            }
        };
        match outcome {
            Ok(()) => Ok(handle),
            Err(LedgerError::Unauthorized) => {
                // the failed-attempt counter and lock flag are durable state
                self.persist();
                Err(LedgerError::Unauthorized)
            }
            Err(err) => Err(err),
        }
    }

    fn append_transaction(&self, transaction: Transaction) {
        self.transactions.lock().expect(LOCK_MSG).push(transaction);
    }

    /// Snapshot of every customer, ordered by account number so the
    /// persisted file is deterministic.
    fn customer_snapshot(&self) -> Vec<Customer> {
        let registry = self.customers.read().expect(LOCK_MSG);
        let mut rows: Vec<Customer> = registry
            .values()
            .map(|handle| handle.lock().expect(LOCK_MSG).clone())
            .collect();
        rows.sort_by(|a, b| a.account().account_number().cmp(b.account().account_number()));
        rows
    }

    /// Synchronous flush of both files. Failures are reported and the
    /// in-memory state stands; the operation that triggered the flush is
    /// still considered successful.
    fn persist(&self) {
        if let Err(err) = self.try_persist() {
            tracing::error!(%err, "failed to persist ledger state");
        }
    }

    fn try_persist(&self) -> Result<(), LedgerError> {
        self.store.save_customers(&self.customer_snapshot())?;
        let log = self.transactions.lock().expect(LOCK_MSG);
        self.store.save_transactions(&log)
    }
}

fn summary_of(customer: &Customer) -> CustomerSummary {
    let account = customer.account();
    CustomerSummary {
        account_number: account.account_number().to_string(),
        name: customer.name().to_string(),
        kind: account.kind(),
        balance: account.balance(),
        active: account.is_active(),
        created_at: account.created_at(),
    }
}

fn report_accrual(accrued: Option<Decimal>, account_number: &str) {
    if let Some(credit) = accrued {
        tracing::info!(account = account_number, %credit, "monthly interest credited");
    }
}

fn generate_account_number() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("ACC{millis}{suffix:04}")
}

fn generate_transaction_id() -> String {
    let millis = Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..10_000);
    format!("TXN{millis}{suffix:04}")
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::thread;

    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use crate::domain::LedgerSnapshot;

    use super::*;

    struct NullStore;

    impl LedgerStore for NullStore {
        fn load(&self) -> Result<LedgerSnapshot, LedgerError> {
            Ok(LedgerSnapshot {
                customers: Vec::new(),
                transactions: Vec::new(),
            })
        }

        fn save_customers(&self, _customers: &[Customer]) -> Result<(), LedgerError> {
            Ok(())
        }

        fn save_transactions(&self, _transactions: &[Transaction]) -> Result<(), LedgerError> {
            Ok(())
        }

        fn backup(&self) -> Result<PathBuf, LedgerError> {
            Ok(PathBuf::new())
        }

        fn export_csv(&self, _path: &Path, _customers: &[Customer]) -> Result<(), LedgerError> {
            Ok(())
        }
    }

    fn ledger() -> Ledger<NullStore> {
        Ledger::load(NullStore).unwrap()
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn tx(account: &str, kind: TransactionKind, amount: Decimal, timestamp: chrono::NaiveDateTime, id: &str) -> Transaction {
        Transaction {
            id: id.to_string(),
            account_number: account.to_string(),
            kind,
            amount,
            timestamp,
            description: String::new(),
            balance_after: Decimal::ZERO,
        }
    }

    #[test]
    fn register_records_the_initial_deposit() {
        let ledger = ledger();
        let account = ledger
            .register_customer("Alice Santos", "correct horse", "SAVINGS", dec!(100))
            .unwrap();
        assert!(account.starts_with("ACC"));

        let history = ledger.history(&account);
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, TransactionKind::Deposit);
        assert_eq!(history[0].amount, dec!(100));
        assert_eq!(history[0].description, "Initial deposit");
        assert_eq!(
            ledger.balance_of(&account, "correct horse").unwrap(),
            dec!(100)
        );
    }

    #[test]
    fn register_with_zero_deposit_records_nothing() {
        let ledger = ledger();
        let account = ledger
            .register_customer("Bob Reyes", "pw123456", "CHECKING", dec!(0))
            .unwrap();
        assert!(ledger.history(&account).is_empty());
    }

    #[test]
    fn register_validates_its_inputs() {
        let ledger = ledger();
        assert!(matches!(
            ledger.register_customer("", "pw", "SAVINGS", dec!(0)),
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(
            ledger.register_customer("A|B", "pw", "SAVINGS", dec!(0)),
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(
            ledger.register_customer("Carol", "  ", "SAVINGS", dec!(0)),
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(
            ledger.register_customer("Carol", "pw", "PREMIUM", dec!(0)),
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(
            ledger.register_customer("Carol", "pw", "SAVINGS", dec!(-1)),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn savings_end_to_end_scenario() {
        let ledger = ledger();
        let account = ledger
            .register_customer("Dana Cruz", "pw123456", "SAVINGS", dec!(100))
            .unwrap();

        assert_eq!(ledger.withdraw(&account, "pw123456", dec!(40)).unwrap(), dec!(60));

        // 60 - 20 = 40 would breach the 50 minimum
        assert!(matches!(
            ledger.withdraw(&account, "pw123456", dec!(20)),
            Err(LedgerError::BelowMinimumBalance { .. })
        ));
        assert_eq!(ledger.balance_of(&account, "pw123456").unwrap(), dec!(60));

        // rejected withdrawal leaves no transaction behind
        let history = ledger.history(&account);
        assert_eq!(history.len(), 2);
        assert_eq!(history.iter().filter(|t| t.kind == TransactionKind::Withdrawal).count(), 1);
    }

    #[test]
    fn deposit_requires_a_positive_amount() {
        let ledger = ledger();
        let account = ledger
            .register_customer("Evan Lim", "pw123456", "CHECKING", dec!(200))
            .unwrap();
        assert!(matches!(
            ledger.deposit(&account, "pw123456", dec!(0)),
            Err(LedgerError::Validation(_))
        ));
        assert_eq!(ledger.transaction_count(&account), 1);
    }

    #[test]
    fn transfer_moves_funds_and_records_a_pair() {
        let ledger = ledger();
        let from = ledger
            .register_customer("Fay Ocampo", "pw123456", "SAVINGS", dec!(500))
            .unwrap();
        let to = ledger
            .register_customer("Gil Bautista", "pw654321", "CHECKING", dec!(200))
            .unwrap();

        ledger.transfer(&from, "pw123456", &to, dec!(120)).unwrap();

        assert_eq!(ledger.balance_of(&from, "pw123456").unwrap(), dec!(380));
        assert_eq!(ledger.balance_of(&to, "pw654321").unwrap(), dec!(320));

        let out: Vec<Transaction> = ledger
            .history(&from)
            .into_iter()
            .filter(|t| t.kind == TransactionKind::TransferOut)
            .collect();
        let into: Vec<Transaction> = ledger
            .history(&to)
            .into_iter()
            .filter(|t| t.kind == TransactionKind::TransferIn)
            .collect();
        assert_eq!(out.len(), 1);
        assert_eq!(into.len(), 1);
        assert_eq!(out[0].amount, into[0].amount);
        assert_eq!(out[0].description, format!("Transfer to {to}"));
        assert_eq!(into[0].description, format!("Transfer from {from}"));
    }

    #[test]
    fn failed_transfer_leaves_no_trace() {
        let ledger = ledger();
        let from = ledger
            .register_customer("Hana Velasco", "pw123456", "SAVINGS", dec!(100))
            .unwrap();
        let to = ledger
            .register_customer("Ivan Torres", "pw654321", "CHECKING", dec!(200))
            .unwrap();

        let before = ledger.transaction_count(&from) + ledger.transaction_count(&to);
        assert!(matches!(
            ledger.transfer(&from, "pw123456", &to, dec!(1000)),
            Err(LedgerError::InsufficientFunds { .. })
        ));
        assert_eq!(ledger.balance_of(&from, "pw123456").unwrap(), dec!(100));
        assert_eq!(ledger.balance_of(&to, "pw654321").unwrap(), dec!(200));
        assert_eq!(
            ledger.transaction_count(&from) + ledger.transaction_count(&to),
            before
        );
    }

    #[test]
    fn transfer_rejects_self_and_suspended_destination() {
        let ledger = ledger();
        let from = ledger
            .register_customer("Joan Diaz", "pw123456", "SAVINGS", dec!(500))
            .unwrap();
        let to = ledger
            .register_customer("Karl Reyes", "pw654321", "CHECKING", dec!(200))
            .unwrap();

        assert!(matches!(
            ledger.transfer(&from, "pw123456", &from, dec!(10)),
            Err(LedgerError::Validation(_))
        ));

        ledger.toggle_status(&to).unwrap();
        assert!(matches!(
            ledger.transfer(&from, "pw123456", &to, dec!(10)),
            Err(LedgerError::AccountSuspended)
        ));
        assert_eq!(ledger.balance_of(&from, "pw123456").unwrap(), dec!(500));
    }

    #[test]
    fn authenticate_distinguishes_failure_modes() {
        let ledger = ledger();
        let account = ledger
            .register_customer("Lena Cruz", "pw123456", "SAVINGS", dec!(100))
            .unwrap();

        assert!(matches!(
            ledger.authenticate("ACC0", "pw123456"),
            Err(LedgerError::NotFound(_))
        ));
        assert!(matches!(
            ledger.authenticate(&account, "nope"),
            Err(LedgerError::Unauthorized)
        ));

        ledger.toggle_status(&account).unwrap();
        assert!(matches!(
            ledger.authenticate(&account, "pw123456"),
            Err(LedgerError::AccountSuspended)
        ));
    }

    #[test]
    fn lockout_after_three_failures_and_admin_unlock() {
        let ledger = ledger();
        let account = ledger
            .register_customer("Mia Flores", "pw123456", "SAVINGS", dec!(100))
            .unwrap();

        for _ in 0..3 {
            assert!(matches!(
                ledger.authenticate(&account, "wrong"),
                Err(LedgerError::Unauthorized)
            ));
        }
        // fourth attempt fails even with the right password
        assert!(matches!(
            ledger.authenticate(&account, "pw123456"),
            Err(LedgerError::Unauthorized)
        ));

        ledger.unlock_customer(&account).unwrap();
        assert!(ledger.authenticate(&account, "pw123456").is_ok());
    }

    #[test]
    fn history_is_newest_first_with_stable_ties() {
        let ledger = ledger();
        let t1 = at(2024, 5, 1, 9);
        let t2 = at(2024, 5, 2, 9);
        ledger.transactions.lock().unwrap().extend([
            tx("ACC9", TransactionKind::Deposit, dec!(10), t1, "TXN1"),
            tx("ACC9", TransactionKind::Deposit, dec!(20), t2, "TXN2"),
            tx("ACC9", TransactionKind::Withdrawal, dec!(5), t2, "TXN3"),
            tx("ACC8", TransactionKind::Deposit, dec!(99), t2, "TXN4"),
        ]);

        let history = ledger.history("ACC9");
        let ids: Vec<&str> = history.iter().map(|t| t.id.as_str()).collect();
        // newest first; the two t2 records keep their insertion order
        assert_eq!(ids, ["TXN2", "TXN3", "TXN1"]);

        let recent = ledger.recent("ACC9", 2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, "TXN2");
    }

    #[test]
    fn totals_split_inflow_and_outflow() {
        let ledger = ledger();
        let t = at(2024, 5, 1, 9);
        ledger.transactions.lock().unwrap().extend([
            tx("ACC9", TransactionKind::Deposit, dec!(100), t, "TXN1"),
            tx("ACC9", TransactionKind::TransferIn, dec!(50), t, "TXN2"),
            tx("ACC9", TransactionKind::Withdrawal, dec!(30), t, "TXN3"),
            tx("ACC9", TransactionKind::TransferOut, dec!(20), t, "TXN4"),
        ]);
        assert_eq!(ledger.total_deposits("ACC9"), dec!(150));
        assert_eq!(ledger.total_withdrawals("ACC9"), dec!(50));
        assert_eq!(ledger.transaction_count("ACC9"), 4);
    }

    #[test]
    fn delete_customer_retains_history() {
        let ledger = ledger();
        let account = ledger
            .register_customer("Nora Salazar", "pw123456", "SAVINGS", dec!(100))
            .unwrap();
        ledger.delete_customer(&account).unwrap();

        assert!(matches!(
            ledger.authenticate(&account, "pw123456"),
            Err(LedgerError::NotFound(_))
        ));
        assert_eq!(ledger.history(&account).len(), 1);

        assert!(matches!(
            ledger.delete_customer(&account),
            Err(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn purge_transactions_empties_the_log() {
        let ledger = ledger();
        let account = ledger
            .register_customer("Omar Lazaro", "pw123456", "SAVINGS", dec!(100))
            .unwrap();
        ledger.deposit(&account, "pw123456", dec!(10)).unwrap();

        assert_eq!(ledger.purge_transactions(), 2);
        assert!(ledger.all_transactions().is_empty());
    }

    #[test]
    fn concurrent_deposits_do_not_lose_updates() {
        let ledger = Arc::new(ledger());
        let account = ledger
            .register_customer("Pia Mercado", "pw123456", "CHECKING", dec!(100))
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..4 {
            let ledger = Arc::clone(&ledger);
            let account = account.clone();
            handles.push(thread::spawn(move || {
                for _ in 0..50 {
                    ledger.deposit(&account, "pw123456", dec!(1)).unwrap();
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(
            ledger.balance_of(&account, "pw123456").unwrap(),
            dec!(300)
        );
        assert_eq!(ledger.transaction_count(&account), 201);
    }
}
