//! Reference candidate extraction.
//!
//! Different event types echo different subsets of reference fields, so a
//! delivery is matched by trying a fixed, ordered list of
//! (payload field, stored reference column) pairs.

use crate::domain::transaction::ReferenceField;

/// Reference-bearing fields of an event payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PayloadReferences {
    pub reference: Option<String>,
    pub id: Option<String>,
    pub transfer_code: Option<String>,
}

impl PayloadReferences {
    pub fn is_empty(&self) -> bool {
        self.candidates().is_empty()
    }

    /// Candidates in lookup order, skipping absent and blank values.
    pub fn candidates(&self) -> Vec<ReferenceCandidate> {
        EXTRACTORS
            .iter()
            .filter_map(|extractor| {
                let value = (extractor.source)(self)?.trim();
                if value.is_empty() {
                    return None;
                }
                Some(ReferenceCandidate {
                    source: extractor.name,
                    field: extractor.field,
                    value: value.to_owned(),
                })
            })
            .collect()
    }

    /// First present reference, used as the log correlation key.
    pub fn primary_hint(&self) -> Option<&str> {
        EXTRACTORS
            .iter()
            .filter_map(|extractor| (extractor.source)(self))
            .map(str::trim)
            .find(|value| !value.is_empty())
    }
}

/// One lookup attempt: a payload value matched against a stored column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceCandidate {
    /// Payload field the value came from.
    pub source: &'static str,
    pub field: ReferenceField,
    pub value: String,
}

struct Extractor {
    name: &'static str,
    field: ReferenceField,
    source: fn(&PayloadReferences) -> Option<&str>,
}

const EXTRACTORS: [Extractor; 4] = [
    Extractor {
        name: "data.reference",
        field: ReferenceField::Primary,
        source: reference,
    },
    Extractor {
        name: "data.reference",
        field: ReferenceField::Gateway,
        source: reference,
    },
    Extractor {
        name: "data.id",
        field: ReferenceField::Gateway,
        source: gateway_id,
    },
    Extractor {
        name: "data.transfer_code",
        field: ReferenceField::Provider,
        source: transfer_code,
    },
];

fn reference(p: &PayloadReferences) -> Option<&str> {
    p.reference.as_deref()
}

fn gateway_id(p: &PayloadReferences) -> Option<&str> {
    p.id.as_deref()
}

fn transfer_code(p: &PayloadReferences) -> Option<&str> {
    p.transfer_code.as_deref()
}
