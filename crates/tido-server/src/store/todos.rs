use anyhow::Result;
use redb::ReadableTable;
use tracing::debug;

use super::db::{decode, encode, Store, COUNTERS, TODOS, TODO_SEQ_KEY};
use super::model::TodoRecord;

impl Store {
    /// Insert a todo item, assigning the next sequence id. The counter bump
    /// and the record land in one transaction: the item is either fully
    /// written or not written at all.
    pub fn create_todo(&self, todo: &str, owner: &str) -> Result<TodoRecord> {
        let write_txn = self.db.begin_write()?;
        let record = {
            let mut counters = write_txn.open_table(COUNTERS)?;
            let next = counters.get(TODO_SEQ_KEY)?.map(|g| g.value()).unwrap_or(0) + 1;
            counters.insert(TODO_SEQ_KEY, next)?;

            let record = TodoRecord {
                id: next,
                todo: todo.to_owned(),
                owner: owner.to_owned(),
                created_at: Self::now(),
            };
            let bytes = encode(&record)?;
            let mut todos = write_txn.open_table(TODOS)?;
            todos.insert(record.id, bytes.as_slice())?;
            record
        };
        write_txn.commit()?;

        debug!(todo_id = record.id, "created todo");
        Ok(record)
    }

    pub fn get_todo(&self, id: u64) -> Result<Option<TodoRecord>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(TODOS)?;
        match table.get(id)? {
            Some(guard) => Ok(Some(decode(guard.value())?)),
            None => Ok(None),
        }
    }
}
