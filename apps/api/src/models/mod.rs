pub mod benchmark;
pub mod employee;
