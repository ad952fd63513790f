use std::collections::{BTreeSet, HashMap};

use rentmatch_core::{InvalidCandidateError, RentCallCandidate};

use crate::util::{name_tokens, token_chars, word_tokens};

/// Identifiers shorter than this are too likely to occur by accident inside a
/// free-text reference.
const MIN_IDENTIFIER_LEN: usize = 3;

/// A rent call with the derived fields the scorer needs, computed once per run.
#[derive(Debug, Clone)]
pub struct IndexedCandidate<'a> {
    /// Position in the caller's input; the final tie-breaker.
    pub position: usize,
    pub rent_call: &'a RentCallCandidate,
    pub name_tokens: BTreeSet<String>,
    /// Word tokens of the rent-call, lease and unit ids, longest first.
    pub identifiers: Vec<Vec<String>>,
}

/// Read-only view over the open rent calls of a matching run.
#[derive(Debug)]
pub struct CandidateIndex<'a> {
    entries: Vec<IndexedCandidate<'a>>,
    by_lease: HashMap<&'a str, Vec<usize>>,
    by_unit: HashMap<&'a str, Vec<usize>>,
}

impl<'a> CandidateIndex<'a> {
    pub fn build(candidates: &'a [RentCallCandidate]) -> Result<Self, InvalidCandidateError> {
        let mut entries = Vec::with_capacity(candidates.len());
        let mut by_lease: HashMap<&'a str, Vec<usize>> = HashMap::new();
        let mut by_unit: HashMap<&'a str, Vec<usize>> = HashMap::new();

        for (position, rent_call) in candidates.iter().enumerate() {
            let name = rent_call.display_name().ok_or_else(|| InvalidCandidateError {
                candidate_id: rent_call.id.clone(),
            })?;

            let mut identifiers: Vec<Vec<String>> = [&rent_call.id, &rent_call.lease_id, &rent_call.unit_id]
                .into_iter()
                .map(|id| word_tokens(id))
                .filter(|id| token_chars(id) >= MIN_IDENTIFIER_LEN)
                .collect();
            identifiers.sort_by(|a, b| token_chars(b).cmp(&token_chars(a)).then_with(|| a.cmp(b)));
            identifiers.dedup();

            by_lease.entry(rent_call.lease_id.as_str()).or_default().push(position);
            by_unit.entry(rent_call.unit_id.as_str()).or_default().push(position);

            entries.push(IndexedCandidate {
                position,
                rent_call,
                name_tokens: name_tokens(&name),
                identifiers,
            });
        }

        Ok(Self {
            entries,
            by_lease,
            by_unit,
        })
    }

    /// Every candidate, in input order.
    pub fn all(&self) -> &[IndexedCandidate<'a>] {
        &self.entries
    }

    pub fn candidates(&self) -> impl Iterator<Item = &'a RentCallCandidate> + '_ {
        self.entries.iter().map(|e| e.rent_call)
    }

    pub fn by_lease(&self, lease_id: &str) -> Vec<&'a RentCallCandidate> {
        self.lookup(&self.by_lease, lease_id)
    }

    pub fn by_unit(&self, unit_id: &str) -> Vec<&'a RentCallCandidate> {
        self.lookup(&self.by_unit, unit_id)
    }

    pub fn name_tokens(&self, position: usize) -> Option<&BTreeSet<String>> {
        self.entries.get(position).map(|e| &e.name_tokens)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, map: &HashMap<&'a str, Vec<usize>>, key: &str) -> Vec<&'a RentCallCandidate> {
        map.get(key)
            .map(|positions| positions.iter().map(|&p| self.entries[p].rent_call).collect())
            .unwrap_or_default()
    }
}
