// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::{ORG, family};
use crate::{Persistence, PersistenceError};

#[test]
fn test_persistence_initialization() {
    let result: Result<Persistence, PersistenceError> = Persistence::new_in_memory();
    assert!(result.is_ok());
}

#[test]
fn test_foreign_keys_are_enforced() {
    let mut persistence = Persistence::new_in_memory().unwrap();
    assert!(persistence.verify_foreign_key_enforcement().is_ok());
}

#[test]
fn test_multiple_in_memory_instances_are_isolated() {
    let mut db1 = Persistence::new_in_memory().unwrap();
    let mut db2 = Persistence::new_in_memory().unwrap();

    db1.create_family_group(&family("A")).unwrap();

    assert_eq!(db1.list_family_groups(ORG).unwrap().len(), 1);
    assert!(db2.list_family_groups(ORG).unwrap().is_empty());
}

#[test]
fn test_file_database_survives_reopen() {
    let path = std::env::temp_dir().join(format!(
        "cabin_rotation_init_{}.db",
        std::process::id()
    ));
    let _ = std::fs::remove_file(&path);

    {
        let mut persistence = Persistence::new_with_file(&path).unwrap();
        persistence.create_family_group(&family("A")).unwrap();
    }

    let mut reopened = Persistence::new_with_file(&path).unwrap();
    let names: Vec<String> = reopened
        .list_family_groups(ORG)
        .unwrap()
        .into_iter()
        .map(|fg| fg.name)
        .collect();
    assert_eq!(names, vec![String::from("A")]);

    drop(reopened);
    let _ = std::fs::remove_file(&path);
}
