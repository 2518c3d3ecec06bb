//! `<table>_mutation_response`

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationResponse<R> {
    pub affected_rows: i64,
    #[serde(default = "Vec::new")]
    pub returning: Vec<R>,
}

impl<R> MutationResponse<R> {
    pub fn is_noop(&self) -> bool {
        self.affected_rows == 0
    }
}
