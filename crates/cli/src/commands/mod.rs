pub mod average;
pub mod calc;
pub mod corr;
pub mod grid;
