use serde::Serialize;

/// One catalog entry as stored in the `medicines` table.
///
/// `name_lower` is derived from `name` at import time and only used for
/// prefix filtering, so it never leaves the service.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MedicineRecord {
    pub id: i64,
    pub name: String,
    pub price: Option<f64>,
    pub is_discontinued: bool,
    pub manufacturer_name: String,
    #[serde(rename = "type")]
    pub medicine_type: String,
    pub pack_size_label: String,
    pub composition1: Option<String>,
    pub composition2: Option<String>,
    #[serde(skip)]
    pub name_lower: String,
}

impl MedicineRecord {
    /// Create a live record with the required fields; `name_lower` is derived.
    pub fn new(id: i64, name: impl Into<String>) -> Self {
        let name = name.into();
        let name_lower = name.to_lowercase();
        Self {
            id,
            name,
            price: None,
            is_discontinued: false,
            manufacturer_name: String::new(),
            medicine_type: String::new(),
            pack_size_label: String::new(),
            composition1: None,
            composition2: None,
            name_lower,
        }
    }

    /// Non-absent composition values, in column order.
    pub fn compositions(&self) -> impl Iterator<Item = &str> {
        self.composition1
            .as_deref()
            .into_iter()
            .chain(self.composition2.as_deref())
    }
}

/// A catalog entry annotated with how it entered the suggestion list.
///
/// `match_score` is the fuzzy score (>= the minimum) for direct matches
/// and 0 for medicines related by composition.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredMedicine {
    #[serde(flatten)]
    pub medicine: MedicineRecord,
    pub match_score: u8,
}

impl ScoredMedicine {
    pub fn direct(medicine: MedicineRecord, score: u8) -> Self {
        Self {
            medicine,
            match_score: score,
        }
    }

    pub fn related(medicine: MedicineRecord) -> Self {
        Self {
            medicine,
            match_score: 0,
        }
    }

    pub fn is_related(&self) -> bool {
        self.match_score == 0
    }
}

pub const NO_RESULTS_MESSAGE: &str = "No medicines found. Try a different keyword.";

/// Per-request suggestion result; never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryResult {
    pub query: String,
    pub suggestions: Vec<ScoredMedicine>,
    /// Suggestion count before truncation to the requested limit.
    pub total: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
