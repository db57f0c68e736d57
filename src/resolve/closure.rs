//! Breadth-first walk over a package's dependency closure.
//!
//! The walk keeps one visited set for the whole traversal and expands names
//! from an explicit frontier queue, so cyclic dependency graphs terminate and
//! every distinct name is resolved at most once per top-level call.

use crate::model::PackageRecord;
use crate::resolve::resolver::{PackageResolver, ResolveError};
use crate::wheel::normalize;
use indexmap::IndexMap;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Records of every package reached by a walk, in visit order, keyed by
/// normalized name.
pub type Closure = IndexMap<String, PackageRecord>;

/// True iff every package in `closure` other than `root` installs on both
/// tracked platforms.
pub fn all_dependencies_supported(root: &str, closure: &Closure) -> bool {
    closure
        .iter()
        .filter(|(name, _)| name.as_str() != root)
        .all(|(_, record)| record.is_acceptable())
}

pub struct ClosureWalker {
    resolver: Arc<PackageResolver>,
    depth: u32,
}

impl ClosureWalker {
    /// Creates a walker resolving up to `depth` levels; `1` means the root only.
    pub fn new(resolver: Arc<PackageResolver>, depth: u32) -> Self {
        Self { resolver, depth }
    }

    /// Resolves `name` and its dependencies.
    ///
    /// Only a failure to resolve the root itself is an error. Dependencies
    /// that fail are logged and left out of the closure.
    #[instrument(skip(self), fields(depth = self.depth))]
    pub async fn walk(&self, name: &str) -> Result<Closure, ResolveError> {
        self.walk_from(name).await.map(|(closure, _)| closure)
    }

    /// Resolves the root record with its dependency summary attached.
    ///
    /// With a depth of 1 no dependencies are walked and the summary fields
    /// stay empty.
    pub async fn check(&self, name: &str) -> Result<Option<PackageRecord>, ResolveError> {
        let root = normalize(name);
        let (closure, direct) = self.walk_from(&root).await?;

        let Some(mut record) = closure.get(&root).cloned() else {
            return Ok(None);
        };
        if self.depth > 1 {
            record.all_dependencies_supported = Some(all_dependencies_supported(&root, &closure));
            record.dependencies = Some(direct);
        }
        Ok(Some(record))
    }

    async fn walk_from(&self, name: &str) -> Result<(Closure, Vec<String>), ResolveError> {
        let root = normalize(name);
        let mut visited: HashSet<String> = HashSet::new();
        let mut closure = Closure::new();
        let mut root_dependencies = Vec::new();
        let mut frontier = VecDeque::from([(root.clone(), self.depth)]);

        while let Some((current, depth)) = frontier.pop_front() {
            if depth == 0 || !visited.insert(current.clone()) {
                continue;
            }

            let record = match self.resolver.resolve(&current).await {
                Ok(Some(record)) => record,
                Ok(None) => continue,
                Err(e) if current == root => return Err(e),
                Err(e) => {
                    warn!(package = %current, error = %e, "Dependency could not be resolved");
                    continue;
                }
            };
            closure.entry(current.clone()).or_insert(record);

            if depth > 1 {
                let dependencies = self.resolver.dependencies(&current).await;
                debug!(package = %current, count = dependencies.len(), "Expanding dependencies");
                for dependency in &dependencies {
                    if !visited.contains(dependency) {
                        frontier.push_back((dependency.clone(), depth - 1));
                    }
                }
                if current == root {
                    root_dependencies = dependencies;
                }
            }
        }

        Ok((closure, root_dependencies))
    }
}
