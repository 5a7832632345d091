pub mod docs;
pub mod employee;
pub mod schemas;
