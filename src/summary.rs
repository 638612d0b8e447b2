use serde::Serialize;

/// An ID in the database.
pub type Id = i32;

/// The minimal view of a venue or an artist, as used in listings and
/// search results.
#[derive(Clone, Debug, PartialEq, Serialize, sqlx::FromRow)]
pub struct Summary {
    pub id: Id,
    pub name: String,
}

impl Summary {
    pub fn new(id: Id, name: impl Into<String>) -> Self {
        Summary {
            id,
            name: name.into(),
        }
    }
}
