//! Tidewater Settlement - payout reconciliation.
//!
//! After the gateway settles a charge, this crate reconstructs what the
//! merchant actually cleared: it reads paid orders for a UTC date window,
//! recovers per-line wholesale cost through the same variation price
//! resolver checkout used, folds in the gateway's reported figures, and
//! aggregates the result per order and per SKU.
//!
//! Computation only. The structured [`report::PayoutReport`] goes to an
//! external report consumer for rendering and delivery; no templates here.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod report;

pub use report::{
    OrderPayout, PayoutLine, PayoutReport, PayoutSummary, ReconciliationEngine, ReportError,
    SettlementConfig, SkuRow,
};
