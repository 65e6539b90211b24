//! Bounded structural complexity estimation

use crate::config::{Thresholds, TraversalConfig};
use crate::provider::RepositoryProvider;
use crate::types::{EntryKind, RepositoryMetadata, TreeEntry};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use tracing::{debug, warn};

/// How the traversal ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase", tag = "outcome", content = "reason")]
pub enum TraversalOutcome {
    /// The whole (non-excluded) tree was walked
    Complete,
    /// A budget was exhausted with work left in the queue
    Truncated,
    /// The provider failed; counts are partial and must not be trusted
    Unavailable(String),
}

/// File and directory counts gathered by one traversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplexityEstimate {
    pub files: u32,
    pub directories: u32,
    pub outcome: TraversalOutcome,
}

impl ComplexityEstimate {
    /// Whether the counts meet both minimums. Unavailable estimates never do.
    pub fn meets(&self, thresholds: &Thresholds) -> bool {
        !matches!(self.outcome, TraversalOutcome::Unavailable(_))
            && self.files >= thresholds.min_files
            && self.directories >= thresholds.min_directories
    }
}

/// Breadth-first tree walker with hard file and listing budgets
pub struct ComplexityEstimator<'a> {
    file_budget: u32,
    max_listings: u32,
    excluded: &'a [String],
}

impl<'a> ComplexityEstimator<'a> {
    pub fn new(traversal: &'a TraversalConfig) -> Self {
        Self {
            file_budget: traversal.file_budget,
            max_listings: traversal.max_listings,
            excluded: &traversal.excluded_dirs,
        }
    }

    fn is_excluded(&self, path: &str) -> bool {
        path.split('/')
            .any(|component| self.excluded.iter().any(|e| e == component))
    }

    pub async fn estimate(
        &self,
        provider: &dyn RepositoryProvider,
        repo: &RepositoryMetadata,
    ) -> ComplexityEstimate {
        let mut files = 0u32;
        let mut directories = 0u32;
        let mut visited: HashSet<String> = HashSet::new();
        let mut listings = 1u32;

        let mut queue: VecDeque<TreeEntry> = match provider.list_tree(repo, "").await {
            Ok(root) => root.into(),
            Err(e) => {
                warn!("Could not list root of {}: {}", repo.full_name, e);
                return ComplexityEstimate {
                    files,
                    directories,
                    outcome: TraversalOutcome::Unavailable(e.to_string()),
                };
            }
        };

        while files < self.file_budget {
            let Some(entry) = queue.pop_front() else {
                break;
            };
            if !visited.insert(entry.path.clone()) || self.is_excluded(&entry.path) {
                continue;
            }

            match entry.kind {
                EntryKind::File => files += 1,
                EntryKind::Dir => {
                    if listings >= self.max_listings {
                        // Left in the queue so the outcome reads as truncated
                        queue.push_front(entry);
                        break;
                    }
                    directories += 1;
                    listings += 1;
                    match provider.list_tree(repo, &entry.path).await {
                        Ok(children) => queue.extend(children),
                        Err(e) => {
                            warn!("Could not list '{}' in {}: {}", entry.path, repo.full_name, e);
                            return ComplexityEstimate {
                                files,
                                directories,
                                outcome: TraversalOutcome::Unavailable(e.to_string()),
                            };
                        }
                    }
                }
            }
        }

        let outcome = if queue.is_empty() {
            TraversalOutcome::Complete
        } else {
            TraversalOutcome::Truncated
        };
        debug!(
            "Traversal of {}: {} files, {} directories ({:?})",
            repo.full_name, files, directories, outcome
        );

        ComplexityEstimate {
            files,
            directories,
            outcome,
        }
    }
}
