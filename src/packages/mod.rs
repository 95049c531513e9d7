//! Subsystem package reconciliation.
//!
//! [`reconcile`] walks the declared package list once, installing only what
//! the package manager reports as missing. A failed install does not stop the
//! pass; failures are collected in the [`ReconcileReport`] and turned into a
//! single error once every package has been considered.
//!
//! # Example
//!
//! ```
//! use forgeline::packages::{reconcile, DependencySpec, PackageManager};
//! use forgeline::Result;
//!
//! struct Everything;
//!
//! impl PackageManager for Everything {
//!     fn is_installed(&mut self, _package: &DependencySpec) -> Result<bool> {
//!         Ok(true)
//!     }
//!     fn install(&mut self, _package: &DependencySpec) -> Result<()> {
//!         unreachable!()
//!     }
//! }
//!
//! let declared = DependencySpec::list(["make", "autoconf"]);
//! let report = reconcile(&declared, &mut Everything);
//! assert_eq!(report.already_present.len(), 2);
//! report.into_result().unwrap();
//! ```

pub mod pacman;

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, info, warn};

use crate::config::ForgelineConfig;
use crate::environment::EnvironmentProfile;
use crate::error::{ForgelineError, Result};

pub use pacman::Pacman;

/// A package name understood by the subsystem package manager.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DependencySpec(String);

impl DependencySpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }

    /// Build a list from package names.
    pub fn list<I, S>(names: I) -> Vec<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        names.into_iter().map(Self::new).collect()
    }
}

impl fmt::Display for DependencySpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Packages a build needs: the configured list plus the packages of every
/// feature present in `profile`.
pub fn declared_packages(
    config: &ForgelineConfig,
    profile: &EnvironmentProfile,
) -> Vec<DependencySpec> {
    let feature_packages = config
        .features
        .iter()
        .filter(|f| profile.feature(&f.name).is_some())
        .flat_map(|f| f.packages.iter());

    config
        .packages
        .iter()
        .chain(feature_packages)
        .map(DependencySpec::new)
        .collect()
}

/// Query and install primitives of a package manager.
pub trait PackageManager {
    /// Whether `package` is already installed.
    fn is_installed(&mut self, package: &DependencySpec) -> Result<bool>;

    /// Install `package`. Returns an error if the install did not succeed.
    fn install(&mut self, package: &DependencySpec) -> Result<()>;
}

/// A package that could not be brought into place.
#[derive(Debug)]
pub struct PackageFault {
    pub package: DependencySpec,
    pub error: ForgelineError,
}

/// Outcome of one reconciliation pass.
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// Packages left untouched because they were already installed.
    pub already_present: Vec<DependencySpec>,
    /// Packages installed during this pass.
    pub installed: Vec<DependencySpec>,
    /// Packages whose query or install failed.
    pub faults: Vec<PackageFault>,
}

impl ReconcileReport {
    pub fn is_success(&self) -> bool {
        self.faults.is_empty()
    }

    /// Fail with `DependencyInstallFailed` naming every faulty package.
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ForgelineError::DependencyInstallFailed {
                packages: self
                    .faults
                    .iter()
                    .map(|f| f.package.name().to_string())
                    .collect(),
            })
        }
    }
}

/// Install every declared package the manager reports as missing.
///
/// Packages are handled one at a time in declaration order; duplicates are
/// considered once.
pub fn reconcile(declared: &[DependencySpec], manager: &mut dyn PackageManager) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    let mut seen = HashSet::new();

    for package in declared {
        if !seen.insert(package) {
            continue;
        }

        match manager.is_installed(package) {
            Ok(true) => {
                debug!("{} already installed", package);
                report.already_present.push(package.clone());
            }
            Ok(false) => {
                info!("installing {}", package);
                match manager.install(package) {
                    Ok(()) => report.installed.push(package.clone()),
                    Err(error) => {
                        warn!("failed to install {}: {}", package, error);
                        report.faults.push(PackageFault {
                            package: package.clone(),
                            error,
                        });
                    }
                }
            }
            Err(error) => {
                warn!("could not query {}: {}", package, error);
                report.faults.push(PackageFault {
                    package: package.clone(),
                    error,
                });
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FeatureConfig;
    use crate::environment::{FeatureLocation, FeatureStatus, LocationSource};
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Records every call and answers from fixed tables.
    #[derive(Default)]
    struct MockManager {
        installed: HashSet<String>,
        failing: HashSet<String>,
        unqueryable: HashSet<String>,
        queries: Vec<String>,
        installs: HashMap<String, usize>,
    }

    impl MockManager {
        fn with_installed(names: &[&str]) -> Self {
            Self {
                installed: names.iter().map(|s| s.to_string()).collect(),
                ..Default::default()
            }
        }

        fn install_calls(&self) -> usize {
            self.installs.values().sum()
        }
    }

    impl PackageManager for MockManager {
        fn is_installed(&mut self, package: &DependencySpec) -> Result<bool> {
            self.queries.push(package.name().to_string());
            if self.unqueryable.contains(package.name()) {
                return Err(ForgelineError::CommandFailed {
                    command: format!("pacman -Q {}", package),
                    code: None,
                });
            }
            Ok(self.installed.contains(package.name()))
        }

        fn install(&mut self, package: &DependencySpec) -> Result<()> {
            *self.installs.entry(package.name().to_string()).or_default() += 1;
            if self.failing.contains(package.name()) {
                return Err(ForgelineError::CommandFailed {
                    command: format!("pacman -S {}", package),
                    code: Some(1),
                });
            }
            self.installed.insert(package.name().to_string());
            Ok(())
        }
    }

    #[test]
    fn installs_only_the_missing_package() {
        let mut manager = MockManager::with_installed(&["A"]);
        let report = reconcile(&DependencySpec::list(["A", "B"]), &mut manager);

        assert_eq!(manager.install_calls(), 1);
        assert_eq!(manager.installs.get("B"), Some(&1));
        assert_eq!(report.installed, DependencySpec::list(["B"]));
        assert_eq!(report.already_present, DependencySpec::list(["A"]));
    }

    #[test]
    fn never_installs_what_is_present() {
        let mut manager = MockManager::with_installed(&["make", "autoconf", "libtool"]);
        let report = reconcile(
            &DependencySpec::list(["make", "autoconf", "libtool"]),
            &mut manager,
        );

        assert_eq!(manager.install_calls(), 0);
        assert_eq!(manager.queries.len(), 3);
        assert!(report.is_success());
    }

    #[test]
    fn installs_each_missing_package_once_regardless_of_outcome() {
        let mut manager = MockManager {
            failing: ["B".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let report = reconcile(&DependencySpec::list(["A", "B", "C"]), &mut manager);

        assert_eq!(manager.installs.get("A"), Some(&1));
        assert_eq!(manager.installs.get("B"), Some(&1));
        assert_eq!(manager.installs.get("C"), Some(&1));
        assert_eq!(report.installed, DependencySpec::list(["A", "C"]));
        assert_eq!(report.faults.len(), 1);
    }

    #[test]
    fn failure_is_reported_after_the_full_pass() {
        let mut manager = MockManager {
            failing: ["A".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let report = reconcile(&DependencySpec::list(["A", "B"]), &mut manager);

        assert_eq!(manager.queries, vec!["A", "B"]);
        let err = report.into_result().unwrap_err();
        match err {
            ForgelineError::DependencyInstallFailed { packages } => {
                assert_eq!(packages, vec!["A".to_string()])
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn query_failure_is_a_fault_without_install() {
        let mut manager = MockManager {
            unqueryable: ["A".to_string()].into_iter().collect(),
            ..Default::default()
        };
        let report = reconcile(&DependencySpec::list(["A", "B"]), &mut manager);

        assert_eq!(manager.installs.get("A"), None);
        assert_eq!(manager.installs.get("B"), Some(&1));
        assert_eq!(report.faults[0].package.name(), "A");
    }

    #[test]
    fn duplicates_are_considered_once() {
        let mut manager = MockManager::default();
        reconcile(&DependencySpec::list(["make", "make"]), &mut manager);

        assert_eq!(manager.queries.len(), 1);
        assert_eq!(manager.install_calls(), 1);
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let mut manager = MockManager::default();
        let declared = DependencySpec::list(["A", "B"]);
        reconcile(&declared, &mut manager);
        let report = reconcile(&declared, &mut manager);

        assert_eq!(manager.install_calls(), 2);
        assert_eq!(report.already_present.len(), 2);
    }

    fn profile_with(features: Vec<FeatureStatus>) -> EnvironmentProfile {
        EnvironmentProfile::new(
            PathBuf::from(r"C:\msys64"),
            PathBuf::from(r"C:\msys64\usr\bin\bash.exe"),
            PathBuf::from(r"C:\msys64\mingw64\bin\gcc.exe"),
            2,
            features,
        )
    }

    fn config_with_feature_packages() -> ForgelineConfig {
        let mut feature = FeatureConfig::winfsp();
        feature.packages = vec!["mingw-w64-x86_64-dlfcn".into()];
        ForgelineConfig {
            packages: vec!["make".into()],
            features: vec![feature],
            ..Default::default()
        }
    }

    #[test]
    fn declared_packages_skip_absent_features() {
        let profile = profile_with(vec![FeatureStatus {
            name: "fuse".into(),
            location: None,
        }]);
        let declared = declared_packages(&config_with_feature_packages(), &profile);
        assert_eq!(declared, DependencySpec::list(["make"]));
    }

    #[test]
    fn declared_packages_include_present_features() {
        let root = PathBuf::from(r"C:\WinFsp");
        let profile = profile_with(vec![FeatureStatus {
            name: "fuse".into(),
            location: Some(FeatureLocation {
                include_dir: root.join("inc"),
                lib_dir: root.join("lib"),
                root,
                include_subdir: "inc".into(),
                lib_subdir: "lib".into(),
                source: LocationSource::Conventional,
            }),
        }]);
        let declared = declared_packages(&config_with_feature_packages(), &profile);
        assert_eq!(
            declared,
            DependencySpec::list(["make", "mingw-w64-x86_64-dlfcn"])
        );
    }
}
