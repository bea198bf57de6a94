use todo_core::{
    DbError, DbHandle, LaunchFlag, NewTodo, RepoError, SqliteLaunchFlag, SqliteTodoRepository,
    Todo, TodoId, TodoRepository,
};

fn repo() -> (DbHandle, SqliteTodoRepository) {
    let db = DbHandle::open_in_memory().unwrap();
    (db.clone(), SqliteTodoRepository::new(db))
}

fn todo_at(id: TodoId, title: &str, created_at: i64) -> Todo {
    Todo {
        id,
        title: title.to_string(),
        description: String::new(),
        created_at,
        is_completed: false,
    }
}

fn exec(db: &DbHandle, sql: &str) {
    db.with_conn(|conn| -> Result<(), DbError> {
        conn.execute_batch(sql)?;
        Ok(())
    })
    .unwrap();
}

fn ids(todos: &[Todo]) -> Vec<TodoId> {
    todos.iter().map(|todo| todo.id).collect()
}

#[test]
fn create_then_fetch_roundtrips_every_field() {
    let (_db, repo) = repo();
    let todo = Todo {
        id: 4,
        title: "Buy milk".to_string(),
        description: "2 liters".to_string(),
        created_at: 1_700_000_000_123,
        is_completed: true,
    };

    repo.create(&todo).unwrap();

    assert_eq!(repo.fetch_all().unwrap(), vec![todo]);
}

#[test]
fn fetch_all_on_empty_store_is_empty() {
    let (_db, repo) = repo();
    assert!(repo.fetch_all().unwrap().is_empty());
}

#[test]
fn fetch_all_orders_by_created_at_descending() {
    let (_db, repo) = repo();
    repo.create(&todo_at(1, "old", 100)).unwrap();
    repo.create(&todo_at(2, "new", 300)).unwrap();
    repo.create(&todo_at(3, "middle", 200)).unwrap();

    assert_eq!(ids(&repo.fetch_all().unwrap()), vec![2, 3, 1]);
}

#[test]
fn created_at_ties_are_stable() {
    let (_db, repo) = repo();
    repo.create_batch(&[todo_at(1, "a", 50), todo_at(2, "b", 50), todo_at(3, "c", 50)])
        .unwrap();

    let first = ids(&repo.fetch_all().unwrap());
    let second = ids(&repo.fetch_all().unwrap());
    assert_eq!(first, second);
    assert_eq!(first.len(), 3);
}

#[test]
fn create_with_duplicate_id_is_a_storage_failure() {
    let (_db, repo) = repo();
    repo.create(&todo_at(1, "first", 1)).unwrap();

    let err = repo.create(&todo_at(1, "again", 2)).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));
    assert_eq!(repo.fetch_all().unwrap()[0].title, "first");
}

#[test]
fn create_batch_is_all_or_nothing() {
    let (_db, repo) = repo();
    repo.create(&todo_at(3, "existing", 1)).unwrap();

    let batch = [todo_at(1, "a", 10), todo_at(2, "b", 20), todo_at(3, "clash", 30)];
    let err = repo.create_batch(&batch).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));

    let stored = repo.fetch_all().unwrap();
    assert_eq!(ids(&stored), vec![3]);
    assert_eq!(stored[0].title, "existing");
}

#[test]
fn create_batch_accepts_empty_input() {
    let (_db, repo) = repo();
    repo.create_batch(&[]).unwrap();
    assert!(repo.fetch_all().unwrap().is_empty());
}

#[test]
fn update_replaces_mutable_fields() {
    let (_db, repo) = repo();
    let mut todo = todo_at(1, "draft", 100);
    repo.create(&todo).unwrap();

    todo.title = "final".to_string();
    todo.description = "with details".to_string();
    todo.created_at = 500;
    todo.is_completed = true;
    repo.update(&todo).unwrap();

    assert_eq!(repo.fetch_all().unwrap(), vec![todo]);
}

#[test]
fn update_missing_id_returns_not_found_and_changes_nothing() {
    let (_db, repo) = repo();
    let existing = todo_at(1, "keep", 100);
    repo.create(&existing).unwrap();

    let err = repo.update(&todo_at(2, "ghost", 100)).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(2)));
    assert_eq!(repo.fetch_all().unwrap(), vec![existing]);
}

#[test]
fn delete_removes_permanently() {
    let (_db, repo) = repo();
    repo.create(&todo_at(1, "a", 1)).unwrap();
    repo.create(&todo_at(2, "b", 2)).unwrap();

    repo.delete(1).unwrap();

    assert_eq!(ids(&repo.fetch_all().unwrap()), vec![2]);
    assert!(matches!(repo.delete(1).unwrap_err(), RepoError::NotFound(1)));
}

#[test]
fn delete_missing_id_returns_not_found_and_changes_nothing() {
    let (_db, repo) = repo();
    repo.create(&todo_at(1, "a", 1)).unwrap();

    let err = repo.delete(42).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(42)));
    assert_eq!(ids(&repo.fetch_all().unwrap()), vec![1]);
}

#[test]
fn fetch_all_reflects_net_effect_of_mixed_operations() {
    let (_db, repo) = repo();
    repo.create(&todo_at(1, "one", 10)).unwrap();
    repo.create(&todo_at(2, "two", 20)).unwrap();
    repo.create(&todo_at(3, "three", 30)).unwrap();
    repo.delete(2).unwrap();
    let mut three = todo_at(3, "three v2", 30);
    three.is_completed = true;
    repo.update(&three).unwrap();
    repo.create(&todo_at(4, "four", 5)).unwrap();
    let _ = repo.delete(99);

    let stored = repo.fetch_all().unwrap();
    assert_eq!(ids(&stored), vec![3, 1, 4]);
    assert_eq!(stored[0], three);
}

#[test]
fn search_empty_query_matches_fetch_all() {
    let (_db, repo) = repo();
    repo.create(&todo_at(1, "a", 10)).unwrap();
    repo.create(&todo_at(2, "b", 20)).unwrap();

    assert_eq!(repo.search("").unwrap(), repo.fetch_all().unwrap());
}

#[test]
fn search_is_case_insensitive_substring() {
    let (_db, repo) = repo();
    repo.create(&todo_at(1, "Buy milk", 10)).unwrap();
    repo.create(&todo_at(2, "Walk dog", 20)).unwrap();

    let hits = repo.search("MILK").unwrap();
    assert_eq!(ids(&hits), vec![1]);

    let hits = repo.search("ilk").unwrap();
    assert_eq!(ids(&hits), vec![1]);
}

#[test]
fn search_matches_title_or_description_in_created_order() {
    let (_db, repo) = repo();
    let mut by_description = todo_at(1, "Groceries", 10);
    by_description.description = "eggs and Milk".to_string();
    repo.create(&by_description).unwrap();
    repo.create(&todo_at(2, "milkshake", 30)).unwrap();
    repo.create(&todo_at(3, "unrelated", 20)).unwrap();

    assert_eq!(ids(&repo.search("milk").unwrap()), vec![2, 1]);
}

#[test]
fn search_ignores_diacritics() {
    let (_db, repo) = repo();
    repo.create(&todo_at(1, "Café meeting", 10)).unwrap();
    let mut plain = todo_at(2, "Standup", 20);
    plain.description = "at the cafe".to_string();
    repo.create(&plain).unwrap();
    repo.create(&todo_at(3, "Tea break", 30)).unwrap();

    assert_eq!(ids(&repo.search("cafe").unwrap()), vec![2, 1]);
    assert_eq!(ids(&repo.search("CAFÉ").unwrap()), vec![2, 1]);
}

#[test]
fn search_without_matches_is_empty() {
    let (_db, repo) = repo();
    repo.create(&todo_at(1, "Buy milk", 10)).unwrap();

    assert!(repo.search("bread").unwrap().is_empty());
}

#[test]
fn search_treats_like_wildcards_literally() {
    let (_db, repo) = repo();
    repo.create(&todo_at(1, "100% done", 10)).unwrap();
    repo.create(&todo_at(2, "100 items", 20)).unwrap();

    assert_eq!(ids(&repo.search("0%").unwrap()), vec![1]);
    assert!(repo.search("_").unwrap().is_empty());
}

#[test]
fn next_id_is_one_on_empty_store() {
    let (_db, repo) = repo();
    assert_eq!(repo.next_id(), 1);
}

#[test]
fn next_id_is_max_plus_one() {
    let (_db, repo) = repo();
    repo.create_batch(&[todo_at(1, "a", 1), todo_at(3, "b", 2), todo_at(7, "c", 3)])
        .unwrap();

    assert_eq!(repo.next_id(), 8);
}

#[test]
fn next_id_falls_back_to_one_on_read_failure() {
    let (db, repo) = repo();
    repo.create(&todo_at(5, "a", 1)).unwrap();
    exec(&db, "DROP TABLE todos;");

    assert_eq!(repo.next_id(), 1);
    assert!(matches!(repo.fetch_all().unwrap_err(), RepoError::Db(_)));
}

#[test]
fn create_next_allocates_monotonic_ids() {
    let (_db, repo) = repo();
    repo.create(&todo_at(10, "seeded", 1)).unwrap();

    let first = repo.create_next(&NewTodo::new("one", ""), 100).unwrap();
    let second = repo.create_next(&NewTodo::new("two", "desc"), 200).unwrap();

    assert_eq!(first.id, 11);
    assert_eq!(second.id, 12);
    assert_eq!(second.description, "desc");
    assert!(!second.is_completed);
    assert_eq!(ids(&repo.fetch_all().unwrap()), vec![12, 11, 10]);
}

#[test]
fn create_next_after_max_id_fails_without_poisoning_store() {
    let (_db, repo) = repo();
    repo.create(&todo_at(i64::MAX, "last", 1)).unwrap();

    let err = repo.create_next(&NewTodo::new("overflow", ""), 2).unwrap_err();

    assert!(matches!(err, RepoError::IdOverflow));
    assert_eq!(repo.next_id(), 1);
    assert_eq!(ids(&repo.fetch_all().unwrap()), vec![i64::MAX]);
}

#[test]
fn concurrent_create_next_never_reuses_ids() {
    let (_db, repo) = repo();

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let repo = repo.clone();
            scope.spawn(move || {
                for n in 0..10 {
                    repo.create_next(&NewTodo::new(format!("w{worker}-{n}"), ""), n)
                        .unwrap();
                }
            });
        }
    });

    let mut stored = ids(&repo.fetch_all().unwrap());
    stored.sort_unstable();
    assert_eq!(stored, (1..=40).collect::<Vec<_>>());
}

#[test]
fn store_accepts_empty_title() {
    let (_db, repo) = repo();
    repo.create(&todo_at(1, "", 1)).unwrap();
    assert_eq!(repo.fetch_all().unwrap()[0].title, "");
}

#[test]
fn null_text_columns_read_back_as_empty_strings() {
    let (db, repo) = repo();
    exec(
        &db,
        "INSERT INTO todos (id, title, description, created_at, is_completed)
         VALUES (1, NULL, NULL, 10, 0);",
    );

    let stored = repo.fetch_all().unwrap();
    assert_eq!(stored[0].title, "");
    assert_eq!(stored[0].description, "");
}

#[test]
fn seed_batch_stores_items_and_sets_flag_together() {
    let (db, repo) = repo();
    let flag = SqliteLaunchFlag::new(db);

    repo.create_seed_batch(&[todo_at(1, "a", 5), todo_at(2, "b", 5)])
        .unwrap();

    assert_eq!(ids(&repo.fetch_all().unwrap()), vec![2, 1]);
    assert!(!flag.is_first_launch().unwrap());
}

#[test]
fn seed_batch_rolls_back_items_when_flag_write_fails() {
    let (db, repo) = repo();
    let flag = SqliteLaunchFlag::new(db.clone());
    exec(
        &db,
        "CREATE TRIGGER block_flag BEFORE INSERT ON app_flags
         BEGIN SELECT RAISE(ABORT, 'flag write blocked'); END;",
    );

    let err = repo.create_seed_batch(&[todo_at(1, "a", 5)]).unwrap_err();

    assert!(matches!(err, RepoError::Db(_)));
    assert!(repo.fetch_all().unwrap().is_empty());
    assert!(flag.is_first_launch().unwrap());
}
