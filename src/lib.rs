// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                |           tree / check / diff
//!                +----------+----------+
//!                           v
//!              ,---------------------------,
//!              |          config           |
//!              |   TOML, layered settings  |
//!              '-------------+-------------'
//!                            v
//!                         loader   ---> modconfig
//!                 JoinSet fan-out       Mod, ModParser
//!                            |
//!                            v
//!                          lock
//!                 read, scan, reconcile
//!                            |
//!                            v
//!                        versions
//!            constraints, resolved entries, maps
//!
//!   +-----------------------------------------+
//!   |  foundation   error, logging, utility   |
//!   +-----------------------------------------+
//! ```

pub mod cli;
pub mod cmd;
pub mod config;
pub mod error;
pub mod loader;
pub mod lock;
pub mod logging;
pub mod modconfig;
pub mod utility;
pub mod versions;
