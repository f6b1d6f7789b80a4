//! Umbrella crate for the teller cash-custody and ledger-posting core.
//!
//! Re-exports the workspace members so downstream consumers and the
//! end-to-end test suite can depend on a single crate.

pub use app_services;
pub use core_kernel;
pub use domain_approval;
pub use domain_ledger;
pub use domain_teller;
pub use infra_store;
