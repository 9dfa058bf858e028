//! Pure quest-engine logic for StackQuest.
//!
//! This crate contains all game logic that is independent of any renderer,
//! host runtime, or I/O. Functions take plain data and return results, making
//! them unit-testable and portable across the native engine, the headless
//! simtest harness, and any future host.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`collect`] | Ordered-token collection, gate unlocking, CRUD tracking |
//! | [`collision`] | Stateless rectangle/circle/point overlap predicates |
//! | [`constants`] | Geometry bands, damage/score values, timing |
//! | [`level`] | Deterministic procedural level generation |
//! | [`quest`] | Quest/layer/challenge data model and structural validation |
//! | [`rng`] | Seeded linear-congruential generator for level building |
//! | [`theme`] | Collectible theme catalog (tcp, http, auth, api, none) |

pub mod collect;
pub mod collision;
pub mod constants;
pub mod level;
pub mod quest;
pub mod rng;
pub mod theme;
