use serde::{Deserialize, Serialize};

/// JSON body of `POST /create`, used for link and text entries.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
    pub kind: String,
    pub payload: String,
}

#[derive(Debug, Serialize)]
pub struct CreateResponse {
    pub id: String,
    pub url: String,
}
