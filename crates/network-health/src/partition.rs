//! Partition identity and resolution from `network-status`.

use std::fmt;

use accumulate_ledger_api::{NetworkStatus, PartitionType, SequenceEntry};
use tracing::debug;

use crate::error::HealthFailure;

const DIRECTORY_URL: &str = "dn.acme";
const ACC_SCHEME: &str = "acc://";

/// One consensus group of the network.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Partition {
    id: String,
    kind: PartitionType,
    normalized_url: String,
}

impl Partition {
    /// Creates a partition and derives its normalized URL.
    pub fn new(id: impl Into<String>, kind: PartitionType) -> Self {
        let id = id.into();
        let normalized_url = match kind {
            PartitionType::Directory => DIRECTORY_URL.to_string(),
            PartitionType::BlockValidator => format!("bvn-{id}.acme").to_lowercase(),
        };

        Self {
            id,
            kind,
            normalized_url,
        }
    }

    /// Canonical partition name, e.g. `BVN0`.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Partition type.
    #[must_use]
    pub const fn kind(&self) -> PartitionType {
        self.kind
    }

    /// Lowercase address used to match sequence entries, e.g. `bvn-bvn0.acme`.
    #[must_use]
    pub fn normalized_url(&self) -> &str {
        &self.normalized_url
    }

    /// Whether this is the directory partition.
    #[must_use]
    pub fn is_directory(&self) -> bool {
        self.kind == PartitionType::Directory
    }

    /// Scope of this partition's anchor ledger.
    #[must_use]
    pub fn anchors_scope(&self) -> String {
        format!("{}/anchors", self.normalized_url)
    }

    /// Scope of this partition's synthetic ledger.
    #[must_use]
    pub fn synthetic_scope(&self) -> String {
        format!("{}/synthetic", self.normalized_url)
    }
}

impl fmt::Display for Partition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.normalized_url)
    }
}

/// How a sequence entry's URL is correlated with a partition.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PartitionMatch {
    /// Case-insensitive substring containment of the normalized URL.
    ///
    /// Matches what explorers have always done, but any URL embedding the
    /// normalized URL also matches, e.g. `acc://x.bvn-bvn1.acme` for `BVN1`.
    #[default]
    Contains,

    /// Case-insensitive equality of the entry URL's authority with the
    /// normalized URL.
    Authority,
}

impl PartitionMatch {
    /// Whether `counterpart_url` refers to `partition`.
    #[must_use]
    pub fn matches(self, counterpart_url: &str, partition: &Partition) -> bool {
        match self {
            Self::Contains => counterpart_url
                .to_lowercase()
                .contains(partition.normalized_url()),
            Self::Authority => {
                authority(counterpart_url).eq_ignore_ascii_case(partition.normalized_url())
            }
        }
    }

    /// Returns the first entry of `sequence` referring to `partition`.
    #[must_use]
    pub fn find<'a>(
        self,
        sequence: &'a [SequenceEntry],
        partition: &Partition,
    ) -> Option<&'a SequenceEntry> {
        sequence
            .iter()
            .find(|entry| self.matches(&entry.counterpart_url, partition))
    }
}

fn authority(url: &str) -> &str {
    let rest = url
        .get(..ACC_SCHEME.len())
        .filter(|scheme| scheme.eq_ignore_ascii_case(ACC_SCHEME))
        .map_or(url, |_| &url[ACC_SCHEME.len()..]);

    rest.split('/').next().unwrap_or(rest)
}

/// Builds the partition list from a `network-status` result.
///
/// # Errors
///
/// Fails if no partitions are reported, or if the reported partitions do not
/// contain exactly one directory.
pub fn resolve_partitions(status: &NetworkStatus) -> Result<Vec<Partition>, HealthFailure> {
    let partitions: Vec<Partition> = status
        .partitions()
        .iter()
        .map(|info| Partition::new(info.id.clone(), info.kind))
        .collect();

    if partitions.is_empty() {
        return Err(HealthFailure::NoPartitions);
    }

    let directories = partitions.iter().filter(|p| p.is_directory()).count();
    if directories != 1 {
        return Err(HealthFailure::DirectoryCount(directories));
    }

    debug!(
        partitions = ?partitions.iter().map(Partition::id).collect::<Vec<_>>(),
        "resolved partitions"
    );

    Ok(partitions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use accumulate_ledger_api::{NetworkDefinition, PartitionInfo};

    fn status(partitions: &[(&str, PartitionType)]) -> NetworkStatus {
        NetworkStatus {
            network: Some(NetworkDefinition {
                network_name: None,
                partitions: partitions
                    .iter()
                    .map(|(id, kind)| PartitionInfo {
                        id: (*id).to_string(),
                        kind: *kind,
                    })
                    .collect(),
            }),
        }
    }

    #[test]
    fn test_normalized_urls() {
        let dn = Partition::new("Directory", PartitionType::Directory);
        let bvn = Partition::new("Apollo", PartitionType::BlockValidator);

        assert_eq!(dn.normalized_url(), "dn.acme");
        assert_eq!(bvn.normalized_url(), "bvn-apollo.acme");
        assert_eq!(bvn.anchors_scope(), "bvn-apollo.acme/anchors");
        assert_eq!(bvn.synthetic_scope(), "bvn-apollo.acme/synthetic");
        assert_eq!(bvn.to_string(), "Apollo (bvn-apollo.acme)");
    }

    #[test]
    fn test_contains_match_is_case_insensitive() {
        let bvn = Partition::new("BVN0", PartitionType::BlockValidator);

        assert!(PartitionMatch::Contains.matches("acc://bvn-BVN0.acme", &bvn));
        assert!(!PartitionMatch::Contains.matches("acc://dn.acme", &bvn));
    }

    #[test]
    fn test_contains_match_has_prefix_false_positive() {
        let bvn1 = Partition::new("BVN1", PartitionType::BlockValidator);

        // "bvn-bvn10.acme" does not contain "bvn-bvn1.acme", but a URL with a
        // longer authority sharing the prefix and suffix does.
        assert!(PartitionMatch::Contains.matches("acc://x.bvn-bvn1.acme", &bvn1));
        assert!(!PartitionMatch::Authority.matches("acc://x.bvn-bvn1.acme", &bvn1));
    }

    #[test]
    fn test_authority_match() {
        let dn = Partition::new("Directory", PartitionType::Directory);

        assert!(PartitionMatch::Authority.matches("acc://DN.acme/anchors", &dn));
        assert!(PartitionMatch::Authority.matches("dn.acme", &dn));
        assert!(!PartitionMatch::Authority.matches("acc://bvn-dn.acme", &dn));
    }

    #[test]
    fn test_find_returns_first_match() {
        let dn = Partition::new("Directory", PartitionType::Directory);
        let sequence = vec![
            SequenceEntry::new("acc://bvn-bvn0.acme").with_delivered(1),
            SequenceEntry::new("acc://dn.acme").with_delivered(2),
            SequenceEntry::new("acc://dn.acme/anchors").with_delivered(3),
        ];

        let entry = PartitionMatch::Contains.find(&sequence, &dn).unwrap();
        assert_eq!(entry.delivered, 2);
    }

    #[test]
    fn test_resolve_partitions_preserves_order() {
        let partitions = resolve_partitions(&status(&[
            ("Directory", PartitionType::Directory),
            ("BVN0", PartitionType::BlockValidator),
            ("BVN1", PartitionType::BlockValidator),
        ]))
        .unwrap();

        let ids: Vec<_> = partitions.iter().map(Partition::id).collect();
        assert_eq!(ids, vec!["Directory", "BVN0", "BVN1"]);
    }

    #[test]
    fn test_resolve_partitions_rejects_empty() {
        assert_eq!(
            resolve_partitions(&NetworkStatus::default()),
            Err(HealthFailure::NoPartitions)
        );
    }

    #[test]
    fn test_resolve_partitions_requires_one_directory() {
        let result = resolve_partitions(&status(&[
            ("BVN0", PartitionType::BlockValidator),
            ("BVN1", PartitionType::BlockValidator),
        ]));
        assert_eq!(result, Err(HealthFailure::DirectoryCount(0)));

        let result = resolve_partitions(&status(&[
            ("Directory", PartitionType::Directory),
            ("Directory2", PartitionType::Directory),
        ]));
        assert_eq!(result, Err(HealthFailure::DirectoryCount(2)));
    }
}
