pub mod meal;
pub mod opt_in;
pub mod schedule;
pub mod token;
pub mod user;
