//! Foundry Core -- time-stepped manufacturing for base-management games.
//!
//! A base commits to a [`manufacture::ManufactureRule`] and gets a
//! [`production::Production`] order. Every hour the owning loop calls
//! [`base::Base::step_productions`], which steps each staffed order once:
//! engineers add labor, finished units apply their effects (items, crafts,
//! personnel, score), and the next unit's resources are checked and consumed.
//!
//! # Tick Pipeline
//!
//! For one order, [`production::Production::step`] runs:
//!
//! 1. **Advance** -- add the assigned engineers to the accumulated time.
//! 2. **Complete** -- apply effects for every unit whose time threshold was
//!    crossed, checking resources between units of the same batch.
//! 3. **Restart** -- admit and pay for the next unit (funds, living space,
//!    materials, in that order).
//!
//! Blocked starts are reported through [`production::ProductionProgress`],
//! never as errors. Nothing is consumed for a blocked start.
//!
//! # Key Types
//!
//! - [`registry::Registry`] -- Immutable catalog of items, crafts, soldiers,
//!   and manufacture rules (frozen at startup).
//! - [`base::Base`] -- One base: its [`base::BaseLedger`] plus active orders.
//! - [`campaign::Campaign`] -- Campaign-wide funds, score, and serial numbers.
//! - [`reward`] -- Weighted random outcome selection.
//! - [`serialize`] -- Save records and binary base snapshots.

pub mod base;
pub mod campaign;
pub mod craft;
pub mod fixed;
pub mod id;
pub mod item;
pub mod language;
pub mod manufacture;
pub mod production;
pub mod registry;
pub mod reward;
pub mod rng;
pub mod serialize;
pub mod soldier;
pub mod transfer;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
