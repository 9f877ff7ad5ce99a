use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::money;
use crate::domain::{
    Account, AccountKind, Customer, LedgerError, LedgerSnapshot, LedgerStore, Transaction,
    TransactionKind,
};

/// Timestamp text format shared by both data files.
pub const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const CUSTOMERS_FILE: &str = "customers.txt";
const TRANSACTIONS_FILE: &str = "transactions.txt";

/// Line-oriented key-value store over a data directory.
///
/// Customers and transactions each live in one pipe-delimited text file,
/// rewritten whole on every save. A malformed line is skipped with a
/// warning; it never aborts loading the rest of the file.
pub struct TextFileStore {
    data_dir: PathBuf,
}

impl TextFileStore {
    /// Opens the store, creating the data directory if needed.
    pub fn new(data_dir: impl Into<PathBuf>) -> Result<Self, LedgerError> {
        let data_dir = data_dir.into();
        fs::create_dir_all(&data_dir)?;
        Ok(Self { data_dir })
    }

    fn customers_path(&self) -> PathBuf {
        self.data_dir.join(CUSTOMERS_FILE)
    }

    fn transactions_path(&self) -> PathBuf {
        self.data_dir.join(TRANSACTIONS_FILE)
    }

    fn load_customers(&self) -> Result<Vec<Customer>, LedgerError> {
        let mut customers = Vec::new();
        for line in read_lines(&self.customers_path())? {
            if line.trim().is_empty() {
                continue;
            }
            match decode_customer(&line) {
                Some(customer) => customers.push(customer),
                None => tracing::warn!(%line, "skipping malformed customer record"),
            }
        }
        Ok(customers)
    }

    fn load_transactions(&self) -> Result<Vec<Transaction>, LedgerError> {
        let mut transactions = Vec::new();
        for line in read_lines(&self.transactions_path())? {
            if line.trim().is_empty() {
                continue;
            }
            match decode_transaction(&line) {
                Some(transaction) => transactions.push(transaction),
                None => tracing::warn!(%line, "skipping malformed transaction record"),
            }
        }
        Ok(transactions)
    }
}

impl LedgerStore for TextFileStore {
    fn load(&self) -> Result<LedgerSnapshot, LedgerError> {
        Ok(LedgerSnapshot {
            customers: self.load_customers()?,
            transactions: self.load_transactions()?,
        })
    }

    fn save_customers(&self, customers: &[Customer]) -> Result<(), LedgerError> {
        let mut contents = String::new();
        for customer in customers {
            contents.push_str(&encode_customer(customer));
            contents.push('\n');
        }
        fs::write(self.customers_path(), contents)?;
        Ok(())
    }

    fn save_transactions(&self, transactions: &[Transaction]) -> Result<(), LedgerError> {
        let mut contents = String::new();
        for transaction in transactions {
            contents.push_str(&encode_transaction(transaction));
            contents.push('\n');
        }
        fs::write(self.transactions_path(), contents)?;
        Ok(())
    }

    fn backup(&self) -> Result<PathBuf, LedgerError> {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S");
        let backup_dir = self.data_dir.join(format!("backup_{stamp}"));
        fs::create_dir_all(&backup_dir)?;
        for name in [CUSTOMERS_FILE, TRANSACTIONS_FILE] {
            let source = self.data_dir.join(name);
            if source.exists() {
                fs::copy(&source, backup_dir.join(name))?;
            }
        }
        Ok(backup_dir)
    }

    fn export_csv(&self, path: &Path, customers: &[Customer]) -> Result<(), LedgerError> {
        let mut writer = csv::Writer::from_path(path).map_err(io::Error::other)?;
        for customer in customers {
            let account = customer.account();
            writer
                .serialize(CsvRow {
                    account_number: account.account_number(),
                    customer_name: customer.name(),
                    account_type: account.kind().as_str(),
                    balance: money::fixed2(account.balance()),
                    status: if account.is_active() { "Active" } else { "Suspended" },
                    created_date: account.created_at().format("%Y-%m-%d").to_string(),
                })
                .map_err(io::Error::other)?;
        }
        writer.flush()?;
        Ok(())
    }
}

/// Shape used only for CSV serialization; field names become the header.
#[derive(Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Account_Number")]
    account_number: &'a str,
    #[serde(rename = "Customer_Name")]
    customer_name: &'a str,
    #[serde(rename = "Account_Type")]
    account_type: &'static str,
    #[serde(rename = "Balance")]
    balance: String,
    #[serde(rename = "Status")]
    status: &'static str,
    #[serde(rename = "Created_Date")]
    created_date: String,
}

fn read_lines(path: &Path) -> Result<Vec<String>, LedgerError> {
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = File::open(path)?;
    let lines: Result<Vec<String>, io::Error> = BufReader::new(file).lines().collect();
    Ok(lines?)
}

/// `name|hash|number|type|balance|active|created|rate|last_interest|failed|locked`
fn encode_customer(customer: &Customer) -> String {
    let account = customer.account();
    format!(
        "{}|{}|{}|{}|{}|{}|{}|{}|{}|{}|{}",
        customer.name(),
        customer.password_hash(),
        account.account_number(),
        account.kind(),
        money::fixed2(account.balance()),
        account.is_active(),
        account.created_at().format(DATE_FORMAT),
        account.interest_rate(),
        account.last_interest_at().format(DATE_FORMAT),
        customer.failed_attempts(),
        customer.is_locked(),
    )
}

fn decode_customer(line: &str) -> Option<Customer> {
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() != 11 {
        return None;
    }
    let name = parts[0].to_string();
    let password_hash = parts[1].to_string();
    let account_number = parts[2].to_string();
    let kind = AccountKind::parse(parts[3])?;
    let balance: Decimal = parts[4].parse().ok()?;
    let active: bool = parts[5].parse().ok()?;
    let created_at = NaiveDateTime::parse_from_str(parts[6], DATE_FORMAT).ok()?;
    let interest_rate: Decimal = parts[7].parse().ok()?;
    let last_interest_at = NaiveDateTime::parse_from_str(parts[8], DATE_FORMAT).ok()?;
    let failed_attempts: u32 = parts[9].parse().ok()?;
    let locked: bool = parts[10].parse().ok()?;

    let account = Account::from_parts(
        account_number,
        name.clone(),
        kind,
        balance,
        active,
        created_at,
        interest_rate,
        last_interest_at,
    );
    Some(Customer::from_parts(
        name,
        password_hash,
        account,
        failed_attempts,
        locked,
    ))
}

/// `id|number|type|amount|timestamp|description|balance_after`
fn encode_transaction(transaction: &Transaction) -> String {
    format!(
        "{}|{}|{}|{}|{}|{}|{}",
        transaction.id,
        transaction.account_number,
        transaction.kind,
        transaction.amount,
        transaction.timestamp.format(DATE_FORMAT),
        transaction.description,
        money::fixed2(transaction.balance_after),
    )
}

fn decode_transaction(line: &str) -> Option<Transaction> {
    let parts: Vec<&str> = line.split('|').collect();
    if parts.len() != 7 {
        return None;
    }
    Some(Transaction {
        id: parts[0].to_string(),
        account_number: parts[1].to_string(),
        kind: TransactionKind::parse(parts[2])?,
        amount: parts[3].parse().ok()?,
        timestamp: NaiveDateTime::parse_from_str(parts[4], DATE_FORMAT).ok()?,
        description: parts[5].to_string(),
        balance_after: parts[6].parse().ok()?,
    })
}
