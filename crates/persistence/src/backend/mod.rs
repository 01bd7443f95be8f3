// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Backend-specific connection setup.
//!
//! Only `SQLite` is supported. Code here is limited to what Diesel's DSL
//! cannot express: PRAGMA statements, `last_insert_rowid()` and
//! migration execution. Queries and mutations live in `queries/` and
//! `mutations/`.

pub mod sqlite;
