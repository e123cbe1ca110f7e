//! Per-container change counters.

use std::collections::{BTreeSet, HashMap, HashSet};

/// An unordered pair of entity ids, stored with the smaller id first.
pub type Pair = (String, String);

/// Normalize `(a, b)` so that the lexicographically smaller id comes first.
///
/// # Examples
///
/// ```
/// use srb_history::tally::normalize_pair;
///
/// assert_eq!(normalize_pair("b()", "a()"), ("a()".to_string(), "b()".to_string()));
/// ```
pub fn normalize_pair(a: &str, b: &str) -> Pair {
    if a <= b {
        (a.to_string(), b.to_string())
    } else {
        (b.to_string(), a.to_string())
    }
}

/// Number of revisions that touched each entity, grouped by container.
///
/// # Examples
///
/// ```
/// use srb_history::ChangeTally;
///
/// let tally = ChangeTally::default();
/// assert_eq!(tally.count("Main.java", "Main.java:run()"), 0);
/// assert!(tally.is_empty());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeTally {
    by_container: HashMap<String, HashMap<String, u32>>,
}

impl ChangeTally {
    /// Change count of `id` within `container`, 0 when never counted.
    pub fn count(&self, container: &str, id: &str) -> u32 {
        self.by_container
            .get(container)
            .and_then(|counts| counts.get(id))
            .copied()
            .unwrap_or(0)
    }

    /// All counts of one container.
    pub fn container(&self, container: &str) -> Option<&HashMap<String, u32>> {
        self.by_container.get(container)
    }

    /// Whether any container still counts `id`.
    pub fn contains(&self, id: &str) -> bool {
        self.by_container.values().any(|counts| counts.contains_key(id))
    }

    /// Ids of every container holding counts.
    pub fn containers(&self) -> impl Iterator<Item = &str> {
        self.by_container.keys().map(String::as_str)
    }

    /// Whether nothing has been counted.
    pub fn is_empty(&self) -> bool {
        self.by_container.values().all(HashMap::is_empty)
    }

    pub(crate) fn increment(&mut self, container: &str, id: &str) {
        *self
            .by_container
            .entry(container.to_string())
            .or_default()
            .entry(id.to_string())
            .or_default() += 1;
    }

    /// Forget `ids` in `containers`, and drop containers that are themselves removed.
    pub(crate) fn purge(&mut self, containers: &BTreeSet<String>, ids: &HashSet<String>) {
        for container in containers {
            if let Some(counts) = self.by_container.get_mut(container) {
                counts.retain(|id, _| !ids.contains(id));
            }
        }
        self.by_container
            .retain(|container, counts| !ids.contains(container) && !counts.is_empty());
    }
}

/// Number of revisions that touched both entities of a pair, grouped by container.
///
/// # Examples
///
/// ```
/// use srb_history::JointChangeTally;
///
/// let tally = JointChangeTally::default();
/// assert_eq!(tally.count("Main.java", "a()", "b()"), 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JointChangeTally {
    by_container: HashMap<String, HashMap<Pair, u32>>,
}

impl JointChangeTally {
    /// Joint change count of the unordered pair `(a, b)` within `container`.
    pub fn count(&self, container: &str, a: &str, b: &str) -> u32 {
        self.by_container
            .get(container)
            .and_then(|pairs| pairs.get(&normalize_pair(a, b)))
            .copied()
            .unwrap_or(0)
    }

    /// All pair counts of one container.
    pub fn container(&self, container: &str) -> Option<&HashMap<Pair, u32>> {
        self.by_container.get(container)
    }

    /// Whether any pair in any container mentions `id`.
    pub fn mentions(&self, id: &str) -> bool {
        self.by_container
            .values()
            .flat_map(HashMap::keys)
            .any(|(a, b)| a == id || b == id)
    }

    /// Ids of every container holding pair counts.
    pub fn containers(&self) -> impl Iterator<Item = &str> {
        self.by_container.keys().map(String::as_str)
    }

    /// Whether no pair has been counted.
    pub fn is_empty(&self) -> bool {
        self.by_container.values().all(HashMap::is_empty)
    }

    /// Count one joint change for every unordered pair of distinct `ids`.
    pub(crate) fn increment_pairs(&mut self, container: &str, ids: &[String]) {
        if ids.len() < 2 {
            return;
        }
        let pairs = self.by_container.entry(container.to_string()).or_default();
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                if ids[i] == ids[j] {
                    continue;
                }
                *pairs.entry(normalize_pair(&ids[i], &ids[j])).or_default() += 1;
            }
        }
    }

    /// Forget every pair mentioning `ids` in `containers`, and drop removed containers.
    pub(crate) fn purge(&mut self, containers: &BTreeSet<String>, ids: &HashSet<String>) {
        for container in containers {
            if let Some(pairs) = self.by_container.get_mut(container) {
                pairs.retain(|(a, b), _| !ids.contains(a) && !ids.contains(b));
            }
        }
        self.by_container
            .retain(|container, pairs| !ids.contains(container) && !pairs.is_empty());
    }
}

/// Both tallies left behind by a replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tallies {
    /// Per-entity change counts.
    pub changes: ChangeTally,
    /// Per-pair joint change counts.
    pub joint_changes: JointChangeTally,
}

impl Tallies {
    /// Every container with at least one counted entity, in ascending order.
    pub fn containers(&self) -> Vec<&str> {
        let containers: BTreeSet<&str> = self.changes.containers().collect();
        containers.into_iter().collect()
    }
}
