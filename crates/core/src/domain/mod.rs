pub mod expense;
pub mod session;
