use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::count::MatchCount;
use crate::error::TypeError;

/// A pattern together with the count the service is expected to return.
///
/// The expectation never crosses the wire; only the load driver uses it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryCase {
    pub pattern: String,
    pub expected: MatchCount,
}

impl QueryCase {
    pub fn new(pattern: impl Into<String>, expected: u64) -> Self {
        Self {
            pattern: pattern.into(),
            expected: MatchCount::new(expected),
        }
    }

    /// Whether `observed` equals the expectation.
    pub fn matches(&self, observed: MatchCount) -> bool {
        self.expected == observed
    }
}

/// Fixed, read-only table of query cases. Never empty.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<QueryCase>", into = "Vec<QueryCase>")]
pub struct QueryTable {
    cases: Vec<QueryCase>,
}

impl QueryTable {
    pub fn new(cases: Vec<QueryCase>) -> Result<Self, TypeError> {
        if cases.is_empty() {
            return Err(TypeError::EmptyQueryTable);
        }
        Ok(Self { cases })
    }

    /// Expected line counts over the public Shakespeare corpus
    /// (`gs://dataflow-samples/shakespeare/`).
    pub fn shakespeare() -> Self {
        Self {
            cases: vec![
                QueryCase::new("love", 3040),
                QueryCase::new("friend", 1036),
                QueryCase::new("hello", 349),
                QueryCase::new("world", 728),
                QueryCase::new("sweet", 958),
                QueryCase::new("tear", 463),
                QueryCase::new("faith", 484),
                QueryCase::new("to be, or not to be", 1),
                QueryCase::new("what's past is prologue", 1),
                QueryCase::new("insolence", 14),
            ],
        }
    }

    /// Pick one case uniformly at random, with replacement.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> &QueryCase {
        &self.cases[rng.gen_range(0..self.cases.len())]
    }

    pub fn cases(&self) -> &[QueryCase] {
        &self.cases
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }
}

impl Default for QueryTable {
    fn default() -> Self {
        Self::shakespeare()
    }
}

impl TryFrom<Vec<QueryCase>> for QueryTable {
    type Error = TypeError;

    fn try_from(cases: Vec<QueryCase>) -> Result<Self, Self::Error> {
        Self::new(cases)
    }
}

impl From<QueryTable> for Vec<QueryCase> {
    fn from(table: QueryTable) -> Self {
        table.cases
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn empty_table_rejected() {
        assert_eq!(QueryTable::new(vec![]), Err(TypeError::EmptyQueryTable));
    }

    #[test]
    fn shakespeare_table_contents() {
        let table = QueryTable::default();
        assert_eq!(table.len(), 10);
        let love = table.cases().iter().find(|c| c.pattern == "love").unwrap();
        assert_eq!(love.expected, MatchCount::new(3040));
        let hamlet = table
            .cases()
            .iter()
            .find(|c| c.pattern == "to be, or not to be")
            .unwrap();
        assert!(hamlet.matches(MatchCount::new(1)));
        assert!(!hamlet.matches(MatchCount::new(2)));
    }

    #[test]
    fn sampling_reaches_every_case() {
        let table = QueryTable::shakespeare();
        let mut rng = StdRng::seed_from_u64(7);
        let seen: HashSet<&str> = (0..2_000)
            .map(|_| table.sample(&mut rng).pattern.as_str())
            .collect();
        assert_eq!(seen.len(), table.len());
    }

    #[test]
    fn deserialize_rejects_empty_list() {
        let err = serde_json::from_str::<QueryTable>("[]");
        assert!(err.is_err());
    }

    #[test]
    fn serde_roundtrip_keeps_cases() {
        let json = r#"[{"pattern":"love","expected":3}]"#;
        let table: QueryTable = serde_json::from_str(json).unwrap();
        assert_eq!(table.cases(), &[QueryCase::new("love", 3)]);
        assert_eq!(serde_json::to_string(&table).unwrap(), json);
    }

    proptest! {
        #[test]
        fn sample_always_in_table(seed in any::<u64>(), n in 1usize..20) {
            let cases: Vec<QueryCase> = (0..n).map(|i| QueryCase::new(format!("p{i}"), i as u64)).collect();
            let table = QueryTable::new(cases.clone()).unwrap();
            let mut rng = StdRng::seed_from_u64(seed);
            let picked = table.sample(&mut rng);
            prop_assert!(cases.contains(picked));
        }
    }
}
