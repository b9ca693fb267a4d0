use serde::{Deserialize, Serialize};

fn first_page() -> u32 {
    1
}

/// `{data, current_page, last_page, per_page, total}` list envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default = "first_page")]
    pub last_page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total: u64,
}

impl<T> Paginated<T> {
    /// Repairs page counters the backend may send inconsistently.
    pub fn normalized(mut self) -> Self {
        self.current_page = self.current_page.max(1);
        self.last_page = self.last_page.max(self.current_page);
        if self.per_page == 0 {
            self.per_page = u32::try_from(self.data.len()).unwrap_or(u32::MAX).max(1);
        }
        self.total = self.total.max(self.data.len() as u64);
        self
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Machine {
        id: u32,
        name: String,
    }

    #[test]
    fn decodes_typed_rows() {
        let page: Paginated<Machine> = serde_json::from_value(json!({
            "data": [{"id": 1, "name": "TW-01"}, {"id": 2, "name": "TW-02"}],
            "current_page": 1,
            "last_page": 3,
            "per_page": 2,
            "total": 6
        }))
        .unwrap();

        assert_eq!(page.data[1].name, "TW-02");
        assert!(page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn missing_counters_default_and_normalize() {
        let page: Paginated<Machine> = serde_json::from_value(json!({
            "data": [{"id": 1, "name": "TW-01"}],
            "current_page": 4,
            "last_page": 2
        }))
        .unwrap();
        let page = page.normalized();

        assert_eq!(page.current_page, 4);
        assert_eq!(page.last_page, 4);
        assert_eq!(page.per_page, 1);
        assert_eq!(page.total, 1);
        assert!(!page.has_next());
    }

    #[test]
    fn rows_of_wrong_shape_are_rejected() {
        let result: Result<Paginated<Machine>, _> =
            serde_json::from_value(json!({"data": [{"id": "one"}]}));
        assert!(result.is_err());
    }
}
