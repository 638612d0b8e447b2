use serde::Serialize;

use crate::summary::{Id, Summary};

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SuccessResponse<'a> {
    Deleted {
        state: &'static str,
    },
    Flash {
        message: String,
        category: &'static str,
        #[serde(skip_serializing_if = "Option::is_none")]
        id: Option<Id>,
    },
    Healthz {
        revision: Option<&'a str>,
        timestamp: Option<&'a str>,
        version: &'a str,
        database: &'a str,
    },
    Home {
        venues: String,
        artists: String,
        shows: String,
    },
    Search {
        count: usize,
        data: Vec<Summary>,
    },
}

impl<'a> SuccessResponse<'a> {
    pub fn deleted() -> Self {
        SuccessResponse::Deleted { state: "success" }
    }

    pub fn flash(message: String, id: Option<Id>) -> Self {
        SuccessResponse::Flash {
            message,
            category: "success",
            id,
        }
    }

    pub fn search(data: Vec<Summary>) -> Self {
        SuccessResponse::Search {
            count: data.len(),
            data,
        }
    }
}
