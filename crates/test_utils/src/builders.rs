//! Test Data Builders
//!
//! Builders for accounts and tellers with sensible defaults, so tests name
//! only the fields they care about.

use core_kernel::{BranchId, Currency, MemberId, Money, OperationType};
use domain_ledger::Account;
use domain_teller::{Teller, TellerKind};
use rust_decimal::Decimal;

/// Builder for member accounts carrying an opening balance
pub struct MemberAccountBuilder {
    member_id: MemberId,
    branch_id: BranchId,
    currency: Currency,
    opening_balance: Decimal,
    active: bool,
}

impl MemberAccountBuilder {
    /// Creates a builder for an active, empty account at the branch
    pub fn new(branch_id: BranchId) -> Self {
        Self {
            member_id: MemberId::new(),
            branch_id,
            currency: Currency::TZS,
            opening_balance: Decimal::ZERO,
            active: true,
        }
    }

    /// Sets the member holding the account
    pub fn with_member(mut self, member_id: MemberId) -> Self {
        self.member_id = member_id;
        self
    }

    /// Sets the account currency
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    /// Sets the opening balance
    pub fn with_balance(mut self, opening_balance: Decimal) -> Self {
        self.opening_balance = opening_balance;
        self
    }

    /// Marks the account inactive
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Builds the account, crediting the opening balance first
    pub fn build(self) -> Account {
        let mut account = Account::member(self.member_id, self.branch_id, self.currency);
        if !self.opening_balance.is_zero() {
            account
                .credit(&Money::new(self.opening_balance, self.currency))
                .expect("opening balance credit");
        }
        account.active = self.active;
        account
    }
}

/// Builder for configured tellers
pub struct TellerBuilder {
    branch_id: BranchId,
    name: String,
    kind: TellerKind,
    rights: Option<Vec<OperationType>>,
    active: bool,
}

impl TellerBuilder {
    /// Creates a builder for a sub till at the branch
    pub fn new(branch_id: BranchId) -> Self {
        Self {
            branch_id,
            name: "Counter 1".to_string(),
            kind: TellerKind::Sub,
            rights: None,
            active: true,
        }
    }

    /// Creates a builder for the branch's primary till
    pub fn primary(branch_id: BranchId) -> Self {
        Self {
            name: "Primary Till".to_string(),
            kind: TellerKind::Primary,
            ..Self::new(branch_id)
        }
    }

    /// Creates a builder for a none-cash operating point
    pub fn none_cash(branch_id: BranchId) -> Self {
        Self {
            name: "Back Office".to_string(),
            kind: TellerKind::NoneCash,
            ..Self::new(branch_id)
        }
    }

    /// Sets the display name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replaces the kind's default rights with an explicit set
    pub fn with_rights(mut self, rights: Vec<OperationType>) -> Self {
        self.rights = Some(rights);
        self
    }

    /// Marks the teller inactive
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Builds the teller
    pub fn build(self) -> Teller {
        let mut teller = Teller::new(self.branch_id, self.name, self.kind);
        if let Some(rights) = self.rights {
            teller = teller.with_rights(rights);
        }
        if !self.active {
            teller.deactivate();
        }
        teller
    }
}
