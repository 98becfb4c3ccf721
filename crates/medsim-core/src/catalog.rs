//! Case catalog.
//!
//! Cases are JSON documents validated once at load time. Every request
//! path after that assumes a well-formed case: known vital names, answer
//! indices in range, a positive death threshold.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::error::{CatalogError, SimError};
use crate::models::case::{Case, CaseSummary};
use crate::models::delta::DeltaSpec;
use crate::models::vitals::VitalField;

const BUNDLED_CASES: [(&str, &str); 3] = [
    ("mi-001.json", include_str!("../cases/mi-001.json")),
    ("sepsis-002.json", include_str!("../cases/sepsis-002.json")),
    ("anaphylaxis-003.json", include_str!("../cases/anaphylaxis-003.json")),
];

/// Immutable table of case definitions keyed by id.
#[derive(Debug, Clone, Default)]
pub struct CaseCatalog {
    cases: BTreeMap<String, Arc<Case>>,
}

impl CaseCatalog {
    /// Build a catalog from already-parsed cases, validating each one.
    pub fn from_cases(cases: impl IntoIterator<Item = Case>) -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for case in cases {
            catalog.insert(case)?;
        }
        Ok(catalog)
    }

    /// The cases compiled into the binary.
    pub fn bundled() -> Result<Self, CatalogError> {
        let mut catalog = Self::default();
        for (_name, json) in BUNDLED_CASES {
            catalog.insert(serde_json::from_str(json)?)?;
        }
        info!(count = catalog.len(), "loaded bundled cases");
        Ok(catalog)
    }

    /// Parse a single case document.
    pub fn parse_case(json: &str) -> Result<Case, CatalogError> {
        let case: Case = serde_json::from_str(json)?;
        validate_case(&case)?;
        Ok(case)
    }

    /// Load every `*.json` file in `dir`, one case per file, in name order.
    pub fn load_dir(&mut self, dir: &Path) -> Result<usize, CatalogError> {
        let io_err = |source| CatalogError::Io {
            path: dir.display().to_string(),
            source,
        };

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                paths.push(path);
            }
        }
        paths.sort();

        for path in &paths {
            let contents = std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
                path: path.display().to_string(),
                source,
            })?;
            self.insert(serde_json::from_str(&contents)?)?;
        }

        info!(dir = %dir.display(), count = paths.len(), "loaded cases from directory");
        Ok(paths.len())
    }

    fn insert(&mut self, case: Case) -> Result<(), CatalogError> {
        validate_case(&case)?;
        if self.cases.contains_key(&case.id) {
            return Err(CatalogError::Duplicate(case.id));
        }
        self.cases.insert(case.id.clone(), Arc::new(case));
        Ok(())
    }

    pub fn get(&self, case_id: &str) -> Result<Arc<Case>, SimError> {
        self.cases
            .get(case_id)
            .cloned()
            .ok_or_else(|| SimError::CaseNotFound {
                case_id: case_id.to_string(),
            })
    }

    pub fn summaries(&self) -> Vec<CaseSummary> {
        self.cases.values().map(|c| c.summary()).collect()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

/// Reject malformed cases before they can reach a request path.
pub fn validate_case(case: &Case) -> Result<(), CatalogError> {
    let id = case.id.as_str();
    if id.trim().is_empty() {
        return Err(CatalogError::invalid("<empty>", "case id must not be empty"));
    }

    if let Some(name) = case.initial_vitals.extra.keys().next() {
        return Err(CatalogError::invalid(id, format!("unknown vital sign {name:?}")));
    }
    for field in VitalField::ALL {
        if !case.initial_vitals.field(field).is_finite() {
            return Err(CatalogError::invalid(
                id,
                format!("initial {} must be a finite number", field.as_str()),
            ));
        }
    }

    let mut question_ids = HashSet::new();
    for mcq in &case.mcqs {
        if !question_ids.insert(mcq.id.as_str()) {
            return Err(CatalogError::invalid(id, format!("duplicate question id {:?}", mcq.id)));
        }
        if mcq.options.len() < 2 {
            return Err(CatalogError::invalid(
                id,
                format!("question {:?} needs at least two options", mcq.id),
            ));
        }
        if mcq.correct_answer_index >= mcq.options.len() {
            return Err(CatalogError::invalid(
                id,
                format!(
                    "question {:?} has correct_answer_index {} but only {} options",
                    mcq.id,
                    mcq.correct_answer_index,
                    mcq.options.len()
                ),
            ));
        }
    }

    if case.triggers.keys().any(|k| k.trim().is_empty()) {
        return Err(CatalogError::invalid(id, "conversation trigger keys must not be empty"));
    }

    let progression = &case.progression;
    if progression.max_consecutive_wrong == 0 {
        return Err(CatalogError::invalid(id, "max_consecutive_wrong must be at least 1"));
    }
    validate_delta(id, "on_wrong_mcq", progression.on_wrong_mcq.as_ref())?;
    validate_delta(
        id,
        "on_correct_diagnosis",
        progression.on_correct_diagnosis.as_ref(),
    )?;

    Ok(())
}

fn validate_delta(case_id: &str, label: &str, spec: Option<&DeltaSpec>) -> Result<(), CatalogError> {
    let Some(spec) = spec else {
        return Ok(());
    };
    for field in spec.fields() {
        if VitalField::parse(field).is_none() {
            return Err(CatalogError::invalid(
                case_id,
                format!("{label} names unknown vital sign {field:?}"),
            ));
        }
    }
    Ok(())
}
