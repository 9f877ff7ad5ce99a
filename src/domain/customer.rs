use sha2::{Digest, Sha256};

use crate::domain::Account;

/// Consecutive failed validations before the customer is locked out.
pub const MAX_FAILED_ATTEMPTS: u32 = 3;

/// A customer and the single account they own. The raw password is hashed
/// at construction and never stored.
#[derive(Debug, Clone)]
pub struct Customer {
    name: String,
    password_hash: String,
    account: Account,
    failed_attempts: u32,
    locked: bool,
}

impl Customer {
    pub fn new(name: String, password: &str, account: Account) -> Self {
        Self {
            name,
            password_hash: hash_password(password),
            account,
            failed_attempts: 0,
            locked: false,
        }
    }

    /// Reconstructs a customer from persisted state; the credential is
    /// already a hash.
    pub fn from_parts(
        name: String,
        password_hash: String,
        account: Account,
        failed_attempts: u32,
        locked: bool,
    ) -> Self {
        Self {
            name,
            password_hash,
            account,
            failed_attempts,
            locked,
        }
    }

    /// Checks a password attempt. A locked customer always fails without
    /// consuming an attempt; the third consecutive failure locks the
    /// customer until [`Customer::unlock`].
    pub fn validate_password(&mut self, password: &str) -> bool {
        if self.locked {
            return false;
        }
        if hash_password(password) == self.password_hash {
            self.failed_attempts = 0;
            true
        } else {
            self.failed_attempts += 1;
            if self.failed_attempts >= MAX_FAILED_ATTEMPTS {
                self.locked = true;
            }
            false
        }
    }

    pub fn unlock(&mut self) {
        self.locked = false;
        self.failed_attempts = 0;
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn account_mut(&mut self) -> &mut Account {
        &mut self.account
    }

    pub fn failed_attempts(&self) -> u32 {
        self.failed_attempts
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }
}

fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}
