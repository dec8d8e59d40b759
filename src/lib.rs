//! Gift-money ledger OCR
//!
//! Reads a photographed 축의금/부조금 ledger with two OCR engines and turns the
//! recognized text into name / amount / guest-count rows.

pub mod config;
pub mod engine;
pub mod engines;
pub mod error;
pub mod export;
pub mod ledger;
pub mod preprocessing;
pub mod processor;
