use std::collections::HashMap;

use once_cell::sync::Lazy;
use serde::Serialize;

/// One entry of the ICD-10 quick reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Icd10Entry {
    pub code: &'static str,
    pub description: &'static str,
}

impl Icd10Entry {
    /// Value stored in the diagnosis form: `CODE - description`
    pub fn label(&self) -> String {
        format!("{} - {}", self.code, self.description)
    }

    fn matches(&self, needle: &str) -> bool {
        self.code.to_lowercase().contains(needle)
            || self.description.to_lowercase().contains(needle)
    }
}

/// Codes offered by the diagnosis lookup
pub const COMMON_ICD10: &[Icd10Entry] = &[
    Icd10Entry {
        code: "I10",
        description: "Hipertensión esencial (primaria)",
    },
    Icd10Entry {
        code: "E11.9",
        description: "Diabetes mellitus tipo 2, sin complicaciones",
    },
    Icd10Entry {
        code: "J06.9",
        description: "Infección aguda de las vías respiratorias superiores, no especificada",
    },
    Icd10Entry {
        code: "R51",
        description: "Cefalea",
    },
    Icd10Entry {
        code: "K30",
        description: "Dispepsia",
    },
    Icd10Entry {
        code: "Z00.0",
        description: "Examen médico general",
    },
];

static BY_CODE: Lazy<HashMap<String, &'static Icd10Entry>> = Lazy::new(|| {
    COMMON_ICD10
        .iter()
        .map(|entry| (entry.code.to_uppercase(), entry))
        .collect()
});

/// Case-insensitive substring match on code or description; blank matches nothing
pub fn search_icd10(term: &str) -> Vec<&'static Icd10Entry> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    COMMON_ICD10
        .iter()
        .filter(|entry| entry.matches(&needle))
        .collect()
}

/// Exact lookup by code, ignoring case
pub fn find_icd10(code: &str) -> Option<&'static Icd10Entry> {
    BY_CODE.get(&code.trim().to_uppercase()).copied()
}
