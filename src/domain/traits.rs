use std::path::{Path, PathBuf};

use crate::domain::{Customer, LedgerError, Transaction};

/// Everything the ledger holds in memory, as loaded from or written to
/// durable storage.
pub struct LedgerSnapshot {
    pub customers: Vec<Customer>,
    pub transactions: Vec<Transaction>,
}

/// The persistence seam. The ledger core only ever talks to storage through
/// this trait; tests may substitute an in-memory implementation.
pub trait LedgerStore {
    /// Loads the full data set. A missing backing file is an empty data
    /// set, not an error.
    fn load(&self) -> Result<LedgerSnapshot, LedgerError>;

    fn save_customers(&self, customers: &[Customer]) -> Result<(), LedgerError>;

    fn save_transactions(&self, transactions: &[Transaction]) -> Result<(), LedgerError>;

    /// Copies the backing files into a timestamped location and returns it.
    fn backup(&self) -> Result<PathBuf, LedgerError>;

    fn export_csv(&self, path: &Path, customers: &[Customer]) -> Result<(), LedgerError>;
}
