use std::io::{self, Write as _};
use std::path::Path;

use rust_decimal::Decimal;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::domain::{AccountKind, LedgerStore, Transaction, money};
use crate::ledger::{CustomerSummary, Ledger};

const ADMIN_PASSWORD: &str = "admin123";

/// Interactive menu shell. Translates stdin lines into ledger calls and
/// formats whatever comes back; every error is printed and the loop
/// continues. Typing `back` at any prompt returns to the previous menu.
pub struct Shell<S: LedgerStore> {
    ledger: Ledger<S>,
    input: Lines<BufReader<Stdin>>,
}

impl<S: LedgerStore> Shell<S> {
    pub fn new(ledger: Ledger<S>) -> Self {
        Self {
            ledger,
            input: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    pub async fn run(mut self) -> io::Result<()> {
        println!("{}", "=".repeat(50));
        println!("          COMMUNITY BANK LEDGER");
        println!("{}", "=".repeat(50));

        loop {
            println!();
            println!("{}", "=".repeat(40));
            println!("           MAIN MENU");
            println!("{}", "=".repeat(40));
            println!("1. Admin Login");
            println!("2. Customer Interface");
            println!("3. Exit");

            let Some(choice) = self.prompt("Choose an option: ").await? else {
                break;
            };
            match choice.as_str() {
                "1" => self.admin_interface().await?,
                "2" => self.customer_interface().await?,
                "3" => break,
                _ => println!("Invalid option! Please try again."),
            }
        }
        println!("Goodbye!");
        Ok(())
    }

    // ----- admin -----

    async fn admin_interface(&mut self) -> io::Result<()> {
        println!("\n=== ADMIN LOGIN ===");
        let Some(password) = self
            .prompt_back("Enter admin password (or 'back' to return): ")
            .await?
        else {
            return Ok(());
        };
        if password != ADMIN_PASSWORD {
            println!("Invalid admin password!");
            return Ok(());
        }
        println!("Admin login successful!");
        self.admin_menu().await
    }

    async fn admin_menu(&mut self) -> io::Result<()> {
        loop {
            println!();
            println!("{}", "=".repeat(40));
            println!("          ADMIN MENU");
            println!("{}", "=".repeat(40));
            println!(" 1. View Customers");
            println!(" 2. View All Transactions");
            println!(" 3. Create Customer Account");
            println!(" 4. Delete Customer Account");
            println!(" 5. Toggle Account Status");
            println!(" 6. View Customer Transaction History");
            println!(" 7. Unlock Customer");
            println!(" 8. Export Accounts To CSV");
            println!(" 9. Backup Data Files");
            println!("10. Purge Transaction Log");
            println!("11. Logout");

            let Some(choice) = self.prompt("Choose an option: ").await? else {
                return Ok(());
            };
            match choice.as_str() {
                "1" => self.admin_list_customers().await?,
                "2" => print_transaction_table(&self.ledger.all_transactions(), true),
                "3" => self.admin_create_account().await?,
                "4" => self.admin_delete_account().await?,
                "5" => self.admin_toggle_status().await?,
                "6" => self.admin_view_history().await?,
                "7" => self.admin_unlock().await?,
                "8" => self.admin_export_csv().await?,
                "9" => self.admin_backup(),
                "10" => self.admin_purge().await?,
                "11" => {
                    println!("Admin logged out.");
                    return Ok(());
                }
                _ => println!("Invalid option! Please try again."),
            }
        }
    }

    async fn admin_list_customers(&mut self) -> io::Result<()> {
        let Some(filter) = self
            .prompt_back("Filter (all/savings/checking/active/suspended): ")
            .await?
        else {
            return Ok(());
        };
        let rows = match filter.to_ascii_lowercase().as_str() {
            "" | "all" => self.ledger.customers(),
            "savings" => self.ledger.customers_by_kind(AccountKind::Savings),
            "checking" | "current" => self.ledger.customers_by_kind(AccountKind::Checking),
            "active" => self.ledger.customers_by_status(true),
            "suspended" => self.ledger.customers_by_status(false),
            other => {
                println!("Unknown filter: {other}");
                return Ok(());
            }
        };
        print_customer_table(&rows);
        Ok(())
    }

    async fn admin_create_account(&mut self) -> io::Result<()> {
        println!("\n=== CREATE CUSTOMER ACCOUNT ===");
        let Some(name) = self.prompt_back("Enter customer name: ").await? else {
            return Ok(());
        };
        let Some(password) = self.prompt_back("Enter customer password: ").await? else {
            return Ok(());
        };
        let Some(kind) = self
            .prompt_back("Enter account type (SAVINGS/CHECKING): ")
            .await?
        else {
            return Ok(());
        };
        let Some(deposit) = self.prompt_amount("Enter initial deposit amount: $").await? else {
            return Ok(());
        };

        match self
            .ledger
            .register_customer(&name, &password, &kind, deposit)
        {
            Ok(account_number) => {
                println!("Account created successfully!");
                println!("Account Number: {account_number}");
            }
            Err(err) => println!("Error creating account: {err}"),
        }
        Ok(())
    }

    async fn admin_delete_account(&mut self) -> io::Result<()> {
        println!("\n=== DELETE CUSTOMER ACCOUNT ===");
        let Some(account) = self.prompt_back("Enter account number to delete: ").await? else {
            return Ok(());
        };
        let Some(confirm) = self
            .prompt_back("Are you sure you want to delete this account? (yes/no): ")
            .await?
        else {
            return Ok(());
        };
        if !confirm.eq_ignore_ascii_case("yes") {
            println!("Delete operation cancelled.");
            return Ok(());
        }
        match self.ledger.delete_customer(&account) {
            Ok(()) => println!("Account deleted successfully!"),
            Err(err) => println!("Error: {err}"),
        }
        Ok(())
    }

    async fn admin_toggle_status(&mut self) -> io::Result<()> {
        let Some(account) = self.prompt_back("Enter account number: ").await? else {
            return Ok(());
        };
        match self.ledger.toggle_status(&account) {
            Ok(true) => println!("Account is now active."),
            Ok(false) => println!("Account is now suspended."),
            Err(err) => println!("Error: {err}"),
        }
        Ok(())
    }

    async fn admin_view_history(&mut self) -> io::Result<()> {
        let Some(account) = self.prompt_back("Enter account number: ").await? else {
            return Ok(());
        };
        print_transaction_table(&self.ledger.history(&account), false);
        Ok(())
    }

    async fn admin_unlock(&mut self) -> io::Result<()> {
        let Some(account) = self.prompt_back("Enter account number to unlock: ").await? else {
            return Ok(());
        };
        match self.ledger.unlock_customer(&account) {
            Ok(()) => println!("Customer unlocked."),
            Err(err) => println!("Error: {err}"),
        }
        Ok(())
    }

    async fn admin_export_csv(&mut self) -> io::Result<()> {
        let Some(file) = self.prompt_back("Export file name: ").await? else {
            return Ok(());
        };
        match self.ledger.export_csv(Path::new(&file)) {
            Ok(()) => println!("Accounts exported to {file}"),
            Err(err) => println!("Error exporting: {err}"),
        }
        Ok(())
    }

    fn admin_backup(&self) {
        match self.ledger.backup() {
            Ok(dir) => println!("Data backed up to: {}", dir.display()),
            Err(err) => println!("Error creating backup: {err}"),
        }
    }

    async fn admin_purge(&mut self) -> io::Result<()> {
        let Some(confirm) = self
            .prompt_back("Purge the entire transaction log? (yes/no): ")
            .await?
        else {
            return Ok(());
        };
        if confirm.eq_ignore_ascii_case("yes") {
            let purged = self.ledger.purge_transactions();
            println!("Purged {purged} transaction(s).");
        } else {
            println!("Purge cancelled.");
        }
        Ok(())
    }

    // ----- customer -----

    async fn customer_interface(&mut self) -> io::Result<()> {
        loop {
            println!();
            println!("{}", "=".repeat(40));
            println!("        CUSTOMER INTERFACE");
            println!("{}", "=".repeat(40));
            println!("1. Create New Account");
            println!("2. Login to Existing Account");
            println!("3. Back to Main Menu");

            let Some(choice) = self.prompt("Choose an option: ").await? else {
                return Ok(());
            };
            match choice.as_str() {
                "1" => self.customer_create_account().await?,
                "2" => self.customer_login().await?,
                "3" => return Ok(()),
                _ => println!("Invalid option! Please try again."),
            }
        }
    }

    async fn customer_create_account(&mut self) -> io::Result<()> {
        println!("\n=== CREATE NEW ACCOUNT ===");
        let Some(name) = self.prompt_back("Enter your full name: ").await? else {
            return Ok(());
        };

        let password = loop {
            let Some(password) = self.prompt_back("Create a password: ").await? else {
                return Ok(());
            };
            let Some(confirm) = self.prompt_back("Confirm your password: ").await? else {
                return Ok(());
            };
            if password == confirm {
                break password;
            }
            println!("Passwords do not match! Please try again.");
        };

        let kind = loop {
            println!("\nAccount Types:");
            println!("1. SAVINGS  - standard savings account (3% annual interest)");
            println!("2. CHECKING - current account for daily transactions");
            let Some(choice) = self.prompt_back("Choose account type (1-2): ").await? else {
                return Ok(());
            };
            match choice.as_str() {
                "1" => break "SAVINGS",
                "2" => break "CHECKING",
                _ => println!("Invalid choice! Please select 1 or 2."),
            }
        };

        let minimum_opening = Decimal::from(50);
        let deposit = loop {
            let Some(amount) = self
                .prompt_amount("Enter initial deposit amount (minimum $50): $")
                .await?
            else {
                return Ok(());
            };
            if amount >= minimum_opening {
                break amount;
            }
            println!("Minimum initial deposit is $50.00");
        };

        match self.ledger.register_customer(&name, &password, kind, deposit) {
            Ok(account_number) => {
                println!("\n{}", "=".repeat(50));
                println!("ACCOUNT CREATED SUCCESSFULLY!");
                println!("Account Number: {account_number}");
                println!("Account Holder: {name}");
                println!("Account Type: {kind}");
                println!("Initial Balance: {}", money::format_usd(deposit));
                println!("Keep your account number and password safe.");
                println!("{}", "=".repeat(50));
            }
            Err(err) => println!("Error creating account: {err}"),
        }
        Ok(())
    }

    async fn customer_login(&mut self) -> io::Result<()> {
        println!("\n=== CUSTOMER LOGIN ===");
        let Some(account) = self.prompt_back("Enter your account number: ").await? else {
            return Ok(());
        };
        let Some(password) = self.prompt_back("Enter your password: ").await? else {
            return Ok(());
        };
        match self.ledger.authenticate(&account, &password) {
            Ok(summary) => self.customer_menu(account, password, summary.name).await,
            Err(err) => {
                println!("Login failed: {err}");
                Ok(())
            }
        }
    }

    async fn customer_menu(
        &mut self,
        account: String,
        password: String,
        name: String,
    ) -> io::Result<()> {
        loop {
            println!();
            println!("{}", "=".repeat(50));
            println!("Welcome, {name}!");
            println!("Account: {account}");
            println!("{}", "=".repeat(50));
            println!("1. Check Balance");
            println!("2. Deposit Money");
            println!("3. Withdraw Money");
            println!("4. Transfer Money");
            println!("5. View Recent Transactions (Last 5)");
            println!("6. View All Transaction History");
            println!("7. Account Information");
            println!("8. Logout");

            let Some(choice) = self.prompt("Choose an option: ").await? else {
                return Ok(());
            };
            match choice.as_str() {
                "1" => self.show_balance(&account, &password),
                "2" => self.customer_deposit(&account, &password).await?,
                "3" => self.customer_withdraw(&account, &password).await?,
                "4" => self.customer_transfer(&account, &password).await?,
                "5" => print_transaction_table(&self.ledger.recent(&account, 5), false),
                "6" => print_transaction_table(&self.ledger.history(&account), false),
                "7" => self.show_account_info(&account, &password),
                "8" => {
                    println!("Logged out successfully. Stay safe!");
                    return Ok(());
                }
                _ => println!("Invalid option! Please try again."),
            }
        }
    }

    fn show_balance(&self, account: &str, password: &str) {
        match self.ledger.balance_of(account, password) {
            Ok(balance) => println!("Current Balance: {}", money::format_usd(balance)),
            Err(err) => println!("Error: {err}"),
        }
    }

    async fn customer_deposit(&mut self, account: &str, password: &str) -> io::Result<()> {
        println!("\n=== DEPOSIT MONEY ===");
        let Some(amount) = self.prompt_amount("Enter deposit amount: $").await? else {
            return Ok(());
        };
        match self.ledger.deposit(account, password, amount) {
            Ok(balance) => println!("Deposit successful. New balance: {}", money::format_usd(balance)),
            Err(err) => println!("Deposit failed: {err}"),
        }
        Ok(())
    }

    async fn customer_withdraw(&mut self, account: &str, password: &str) -> io::Result<()> {
        println!("\n=== WITHDRAW MONEY ===");
        self.show_balance(account, password);
        let Some(amount) = self.prompt_amount("Enter withdrawal amount: $").await? else {
            return Ok(());
        };
        match self.ledger.withdraw(account, password, amount) {
            Ok(balance) => println!(
                "Withdrawal successful. New balance: {}",
                money::format_usd(balance)
            ),
            Err(err) => println!("Withdrawal failed: {err}"),
        }
        Ok(())
    }

    async fn customer_transfer(&mut self, account: &str, password: &str) -> io::Result<()> {
        println!("\n=== TRANSFER MONEY ===");
        self.show_balance(account, password);
        let Some(to) = self.prompt_back("Enter destination account number: ").await? else {
            return Ok(());
        };
        let Some(amount) = self.prompt_amount("Enter transfer amount: $").await? else {
            return Ok(());
        };
        let Some(confirm) = self
            .prompt_back(&format!(
                "Confirm transfer of {} to account {to}? (yes/no): ",
                money::format_usd(amount)
            ))
            .await?
        else {
            return Ok(());
        };
        if !confirm.eq_ignore_ascii_case("yes") {
            println!("Transfer cancelled.");
            return Ok(());
        }
        match self.ledger.transfer(account, password, &to, amount) {
            Ok(()) => println!("Transfer successful."),
            Err(err) => println!("Transfer failed: {err}"),
        }
        Ok(())
    }

    fn show_account_info(&self, account: &str, password: &str) {
        match self.ledger.authenticate(account, password) {
            Ok(summary) => {
                println!("\n=== ACCOUNT INFORMATION ===");
                println!("Account Number: {}", summary.account_number);
                println!("Account Holder: {}", summary.name);
                println!("Account Type: {}", summary.kind);
                println!("Current Balance: {}", money::format_usd(summary.balance));
                println!(
                    "Account Status: {}",
                    if summary.active { "Active" } else { "Suspended" }
                );
                println!("Opened: {}", summary.created_at.format("%Y-%m-%d"));
                println!(
                    "Total Deposits: {}",
                    money::format_usd(self.ledger.total_deposits(account))
                );
                println!(
                    "Total Withdrawals: {}",
                    money::format_usd(self.ledger.total_withdrawals(account))
                );
                println!(
                    "Transactions Recorded: {}",
                    self.ledger.transaction_count(account)
                );
            }
            Err(err) => println!("Error: {err}"),
        }
    }

    // ----- input helpers -----

    /// One trimmed line; `None` means stdin is closed.
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        Ok(self.input.next_line().await?.map(|line| line.trim().to_string()))
    }

    async fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        print!("{text}");
        io::stdout().flush()?;
        self.read_line().await
    }

    /// Like [`Shell::prompt`], but `back` also yields `None`.
    async fn prompt_back(&mut self, text: &str) -> io::Result<Option<String>> {
        match self.prompt(text).await? {
            Some(line) if line.eq_ignore_ascii_case("back") => {
                println!("Returning to previous menu...");
                Ok(None)
            }
            other => Ok(other),
        }
    }

    /// Re-prompts until the input parses as a decimal amount.
    async fn prompt_amount(&mut self, text: &str) -> io::Result<Option<Decimal>> {
        loop {
            let Some(line) = self.prompt_back(text).await? else {
                return Ok(None);
            };
            match money::parse_amount(&line) {
                Some(amount) => return Ok(Some(amount)),
                None => println!("Invalid input! Please enter a valid amount or 'back' to return."),
            }
        }
    }
}

fn print_customer_table(rows: &[CustomerSummary]) {
    if rows.is_empty() {
        println!("No customers found.");
        return;
    }
    println!(
        "{:<18} {:<20} {:<10} {:<14} {:<10}",
        "Account No", "Name", "Type", "Balance", "Status"
    );
    println!("{}", "=".repeat(80));
    for row in rows {
        println!(
            "{:<18} {:<20} {:<10} {:<14} {:<10}",
            row.account_number,
            row.name,
            row.kind,
            money::format_usd(row.balance),
            if row.active { "Active" } else { "Suspended" }
        );
    }
}

fn print_transaction_table(rows: &[Transaction], with_account: bool) {
    if rows.is_empty() {
        println!("No transactions found.");
        return;
    }
    if with_account {
        println!(
            "{:<18} {:<17} {:<13} {:<14} {:<30}",
            "Account No", "Date/Time", "Type", "Amount", "Description"
        );
    } else {
        println!(
            "{:<17} {:<13} {:<14} {:<30}",
            "Date/Time", "Type", "Amount", "Description"
        );
    }
    println!("{}", "=".repeat(90));
    for row in rows {
        let when = row.timestamp.format("%Y-%m-%d %H:%M").to_string();
        if with_account {
            println!(
                "{:<18} {:<17} {:<13} {:<14} {:<30}",
                row.account_number,
                when,
                row.kind,
                money::format_usd(row.amount),
                row.description
            );
        } else {
            println!(
                "{:<17} {:<13} {:<14} {:<30}",
                when,
                row.kind,
                money::format_usd(row.amount),
                row.description
            );
        }
    }
}
