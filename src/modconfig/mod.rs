// modlock: Mod dependency lock engine
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Mod definitions, resources and the parser seam.
//!
//! ```text
//! ModParser (trait) ---- parse_mod_definition(dir)   -> Parsed<Option<Mod>>
//!        |         \---- parse_mod_resources(files)  -> Parsed<ResourceMap>
//!        v
//! TomlModParser          mod.toml + resource tables
//! ```

pub mod diagnostic;
pub mod parser;
pub mod types;


pub use diagnostic::{Diagnostic, Diagnostics, Parsed, Severity};
pub use parser::{ModParser, TomlModParser};
pub use types::{Mod, Require, Resource, ResourceMap};
