use chrono::{Months, NaiveDateTime};
use rust_decimal::Decimal;

use crate::domain::LedgerError;

/// The account product. `CURRENT` is accepted as a legacy spelling of
/// `CHECKING` when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountKind {
    Savings,
    Checking,
}

impl AccountKind {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_uppercase().as_str() {
            "SAVINGS" => Some(Self::Savings),
            "CHECKING" | "CURRENT" => Some(Self::Checking),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Savings => "SAVINGS",
            Self::Checking => "CHECKING",
        }
    }

    /// The floor a withdrawal may not breach.
    pub fn minimum_balance(self) -> Decimal {
        match self {
            Self::Savings => Decimal::from(50),
            Self::Checking => Decimal::from(100),
        }
    }

    /// Annual interest rate, fixed at account creation.
    pub fn annual_rate(self) -> Decimal {
        match self {
            Self::Savings => Decimal::new(3, 2),  // 0.03
            Self::Checking => Decimal::new(1, 2), // 0.01
        }
    }
}

impl core::fmt::Display for AccountKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.pad(self.as_str())
    }
}

/// A single customer account.
///
/// All balance mutation goes through [`Account::deposit`] and
/// [`Account::withdraw`]; both validate before touching the balance, so a
/// failed call leaves the account untouched. Interest is applied only by an
/// explicit [`Account::accrue_interest`] call — reading the balance never
/// mutates state.
#[derive(Debug, Clone)]
pub struct Account {
    account_number: String,
    owner_name: String,
    kind: AccountKind,
    balance: Decimal,
    active: bool,
    created_at: NaiveDateTime,
    interest_rate: Decimal,
    last_interest_at: NaiveDateTime,
}

impl Account {
    /// Opens a new account. The interest rate is derived from the kind and
    /// never changes afterwards.
    pub fn open(
        account_number: String,
        owner_name: String,
        kind: AccountKind,
        initial_balance: Decimal,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            account_number,
            owner_name,
            kind,
            balance: initial_balance,
            active: true,
            created_at: now,
            interest_rate: kind.annual_rate(),
            last_interest_at: now,
        }
    }

    /// Reconstructs an account from persisted state.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        account_number: String,
        owner_name: String,
        kind: AccountKind,
        balance: Decimal,
        active: bool,
        created_at: NaiveDateTime,
        interest_rate: Decimal,
        last_interest_at: NaiveDateTime,
    ) -> Self {
        Self {
            account_number,
            owner_name,
            kind,
            balance,
            active,
            created_at,
            interest_rate,
            last_interest_at,
        }
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn owner_name(&self) -> &str {
        &self.owner_name
    }

    pub fn kind(&self) -> AccountKind {
        self.kind
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    pub fn interest_rate(&self) -> Decimal {
        self.interest_rate
    }

    pub fn last_interest_at(&self) -> NaiveDateTime {
        self.last_interest_at
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    /// Credits the account. Fails without mutating on a non-positive amount
    /// or a suspended account.
    pub fn deposit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if !self.active {
            return Err(LedgerError::AccountSuspended);
        }
        if amount <= Decimal::ZERO {
            return Err(LedgerError::Validation(
                "deposit amount must be positive".into(),
            ));
        }
        self.balance += amount;
        Ok(())
    }

    /// Debits the account. The balance may not drop below the kind's
    /// minimum; a failed call reports the precise cause and leaves the
    /// balance unchanged.
    pub fn withdraw(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        if !self.active {
            return Err(LedgerError::AccountSuspended);
        }
        if amount <= Decimal::ZERO {
            return Err(LedgerError::Validation(
                "withdrawal amount must be positive".into(),
            ));
        }
        if amount > self.balance {
            return Err(LedgerError::InsufficientFunds {
                required: amount,
                available: self.balance,
            });
        }
        let minimum = self.kind.minimum_balance();
        if self.balance - amount < minimum {
            return Err(LedgerError::BelowMinimumBalance { minimum });
        }
        self.balance -= amount;
        Ok(())
    }

    /// Applies monthly interest for every whole calendar month elapsed since
    /// the last accrual. Only savings accounts accrue; the marker advances
    /// whenever at least one month has passed. Returns the credited amount
    /// when it is positive.
    pub fn accrue_interest(&mut self, now: NaiveDateTime) -> Option<Decimal> {
        if self.kind != AccountKind::Savings {
            return None;
        }
        let months = whole_months_between(self.last_interest_at, now);
        if months < 1 {
            return None;
        }
        let credit = self.balance * (self.interest_rate / Decimal::from(12)) * Decimal::from(months);
        self.balance += credit;
        self.last_interest_at = now;
        (credit > Decimal::ZERO).then_some(credit)
    }
}

/// Whole calendar months between two instants, clamping month-end days the
/// way calendar arithmetic does (Jan 31 + 1 month = Feb 28).
fn whole_months_between(from: NaiveDateTime, to: NaiveDateTime) -> u32 {
    use chrono::Datelike;

    if to <= from {
        return 0;
    }
    let approx =
        (to.year() - from.year()) * 12 + (to.month() as i32 - from.month() as i32);
    let mut months = approx.max(0) as u32;
    while months > 0 {
        match from.checked_add_months(Months::new(months)) {
            Some(reached) if reached <= to => break,
            _ => months -= 1,
        }
    }
    months
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn savings(balance: Decimal) -> Account {
        Account::open(
            "ACC1".into(),
            "Test Owner".into(),
            AccountKind::Savings,
            balance,
            at(2024, 1, 15),
        )
    }

    #[test]
    fn deposit_rejects_non_positive_amounts() {
        let mut account = savings(dec!(100));
        assert!(matches!(
            account.deposit(dec!(0)),
            Err(LedgerError::Validation(_))
        ));
        assert!(matches!(
            account.deposit(dec!(-5)),
            Err(LedgerError::Validation(_))
        ));
        assert_eq!(account.balance(), dec!(100));
    }

    #[test]
    fn suspended_account_rejects_mutation() {
        let mut account = savings(dec!(100));
        account.set_active(false);
        assert!(matches!(
            account.deposit(dec!(10)),
            Err(LedgerError::AccountSuspended)
        ));
        assert!(matches!(
            account.withdraw(dec!(10)),
            Err(LedgerError::AccountSuspended)
        ));
        assert_eq!(account.balance(), dec!(100));
    }

    #[test]
    fn withdrawal_may_not_breach_savings_minimum() {
        let mut account = savings(dec!(60));
        assert!(matches!(
            account.withdraw(dec!(20)),
            Err(LedgerError::BelowMinimumBalance { minimum }) if minimum == dec!(50)
        ));
        assert_eq!(account.balance(), dec!(60));

        account.withdraw(dec!(5)).unwrap();
        assert_eq!(account.balance(), dec!(55));
    }

    #[test]
    fn checking_minimum_is_one_hundred() {
        let mut account = Account::open(
            "ACC2".into(),
            "Test Owner".into(),
            AccountKind::Checking,
            dec!(150),
            at(2024, 1, 15),
        );
        assert!(account.withdraw(dec!(60)).is_err());
        account.withdraw(dec!(50)).unwrap();
        assert_eq!(account.balance(), dec!(100));
    }

    #[test]
    fn overdraw_reports_insufficient_funds() {
        let mut account = savings(dec!(60));
        assert!(matches!(
            account.withdraw(dec!(80)),
            Err(LedgerError::InsufficientFunds { available, .. }) if available == dec!(60)
        ));
        assert_eq!(account.balance(), dec!(60));
    }

    #[test]
    fn savings_accrues_monthly_interest() {
        let mut account = savings(dec!(1000));
        // exactly two months later: 1000 * (0.03 / 12) * 2 = 5.00
        let now = at(2024, 3, 15);
        let credit = account.accrue_interest(now).unwrap();
        assert_eq!(credit, dec!(5.00));
        assert_eq!(account.balance(), dec!(1005.00));
        assert_eq!(account.last_interest_at(), now);
    }

    #[test]
    fn no_accrual_under_one_month() {
        let mut account = savings(dec!(1000));
        assert_eq!(account.accrue_interest(at(2024, 2, 14)), None);
        assert_eq!(account.balance(), dec!(1000));
        // the marker only advances on an actual accrual
        assert_eq!(account.last_interest_at(), at(2024, 1, 15));
    }

    #[test]
    fn checking_never_accrues() {
        let mut account = Account::open(
            "ACC3".into(),
            "Test Owner".into(),
            AccountKind::Checking,
            dec!(1000),
            at(2024, 1, 15),
        );
        assert_eq!(account.accrue_interest(at(2024, 6, 15)), None);
        assert_eq!(account.balance(), dec!(1000));
    }

    #[test]
    fn whole_months_counts_calendar_months() {
        assert_eq!(whole_months_between(at(2024, 1, 15), at(2024, 1, 20)), 0);
        assert_eq!(whole_months_between(at(2024, 1, 15), at(2024, 2, 15)), 1);
        assert_eq!(whole_months_between(at(2024, 1, 15), at(2024, 2, 14)), 0);
        assert_eq!(whole_months_between(at(2024, 1, 15), at(2024, 3, 16)), 2);
        assert_eq!(whole_months_between(at(2024, 3, 15), at(2024, 1, 15)), 0);
    }

    #[test]
    fn kind_parses_legacy_current_spelling() {
        assert_eq!(AccountKind::parse("savings"), Some(AccountKind::Savings));
        assert_eq!(AccountKind::parse("CHECKING"), Some(AccountKind::Checking));
        assert_eq!(AccountKind::parse("current"), Some(AccountKind::Checking));
        assert_eq!(AccountKind::parse("premium"), None);
    }
}
