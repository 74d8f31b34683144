use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// A billable entity. `name` is unique across the collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Company {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
}

impl Company {
    pub fn new(name: String) -> Self {
        Self {
            id: ObjectId::new(),
            name,
        }
    }
}
