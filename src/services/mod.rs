pub mod catalog;
pub mod clock;
pub mod eligibility;
pub mod ledger;
pub mod qr;
pub mod schedule;
pub mod users;
pub mod verification;
