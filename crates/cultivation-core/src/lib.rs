//! World clock, configuration, simulation state, and the tick/gathering
//! engines that drive the cultivation-fiction world simulator.
//!
//! # Modules
//!
//! - [`clock`] -- [`clock::WorldClock`], a monotonic month counter with
//!   derived year/month.
//! - [`config`] -- Layered configuration loading into [`config::SimulationConfig`].
//! - [`error`] -- [`error::TickError`] and [`error::StartupError`].
//! - [`gathering`] -- The [`gathering::Gathering`] trait and the
//!   sect-teaching gathering built on it.
//! - [`init_state`] -- The startup state machine (§6 "Initialization state
//!   machine"): [`init_state::InitStatus`] and [`init_state::InitPhase`].
//! - [`state`] -- [`state::SimulationState`], the aggregate the tick and
//!   gathering engines operate on.
//! - [`tick`] -- [`tick::run_tick`], the ten ordered phases of one simulator
//!   tick.

pub mod clock;
pub mod config;
pub mod error;
pub mod gathering;
pub mod init_state;
pub mod state;
pub mod tick;
