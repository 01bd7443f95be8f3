// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! Every mutation that touches more than one row runs inside a single
//! `IMMEDIATE` transaction so the write lock is taken before the first read.
//!
//! ## Module Organization
//!
//! - `config`: Configuration upserts
//! - `rotation`: Family groups, rotation order, turn changes, usage and notifications
//! - `season`: Reservations, payments, occupancy and check-in sessions

pub mod config;
pub mod rotation;
pub mod season;
