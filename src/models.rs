use diesel::sql_types::{BigInt, Binary, Text};
use diesel::QueryableByName;

/// A stored upload. `id` is assigned by SQLite and never reused.
#[derive(QueryableByName, Debug, Clone, PartialEq)]
pub struct Record {
    #[diesel(sql_type = BigInt)]
    pub id: i64,
    #[diesel(sql_type = Binary)]
    pub image: Vec<u8>,
    #[diesel(sql_type = Text)]
    pub name: String,
    #[diesel(sql_type = Text)]
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewRecord {
    pub image: Vec<u8>,
    pub name: String,
    pub timestamp: String,
}

#[derive(QueryableByName, Debug)]
pub(crate) struct RowId {
    #[diesel(sql_type = BigInt)]
    pub id: i64,
}

#[derive(QueryableByName, Debug)]
pub(crate) struct RowCount {
    #[diesel(sql_type = BigInt)]
    pub count: i64,
}
