//! Version resolution
//!
//! Picks one concrete version for a dependency from the candidates its
//! strategy listed. Each dependency is resolved on its own; there is no
//! cross-dependency constraint solving.

use crate::core::spec::{DependencySpec, VersionSelector};
use crate::core::version::DependencyVersion;
use crate::error::ResolveError;

/// Apply the selector of `spec` to the available versions
///
/// - `exact(v)` succeeds only when `v` is among `versions`
/// - `latest` picks the greatest version, pre-releases included
pub fn resolve(
    spec: &DependencySpec,
    versions: &[DependencyVersion],
) -> Result<DependencyVersion, ResolveError> {
    match &spec.selector {
        VersionSelector::Exact(wanted) => versions
            .iter()
            .find(|candidate| *candidate == wanted)
            .cloned()
            .ok_or_else(|| ResolveError::VersionNotFound {
                name: spec.name.clone(),
                version: wanted.to_string(),
            }),
        VersionSelector::Latest => {
            versions
                .iter()
                .max()
                .cloned()
                .ok_or_else(|| ResolveError::NoMatchingVersion {
                    name: spec.name.clone(),
                })
        }
    }
}
