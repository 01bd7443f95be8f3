// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! ## Module Organization
//!
//! - `config`: Per-organization rotation, billing and season configuration
//! - `rotation`: Family groups, rotation order, usage, selection windows and notifications
//! - `season`: Reservations, payments and check-in sessions

pub mod config;
pub mod rotation;
pub mod season;
