//! Demo packages.
//!
//! Each package is a function that builds a fully registered `ToolServer`.
//! The binary picks one by name at startup.

pub mod base;
pub mod fixtures;

use crate::core::error::Result;
use crate::core::server::ToolServer;

/// A buildable package.
#[derive(Debug, Clone, Copy)]
pub struct Package {
    pub name: &'static str,
    pub version: &'static str,
    pub build: fn() -> Result<ToolServer>,
}

/// Known packages; versions of one package are listed oldest first.
pub const PACKAGES: &[Package] = &[
    Package {
        name: "base_pkg_1",
        version: "1.2.0",
        build: base::v1_2_0,
    },
    Package {
        name: "base_pkg_1",
        version: "1.3.0",
        build: base::v1_3_0,
    },
    Package {
        name: "docker_dep_pkg",
        version: "1.0.0",
        build: fixtures::docker_dep_pkg,
    },
    Package {
        name: "file_path_dep_pkg",
        version: "1.0.0",
        build: fixtures::file_path_dep_pkg,
    },
    Package {
        name: "nonexistent_repo_dep_pkg",
        version: "1.0.0",
        build: fixtures::nonexistent_repo_dep_pkg,
    },
    Package {
        name: "repo_prefix_dep_pkg",
        version: "1.0.0",
        build: fixtures::repo_prefix_dep_pkg,
    },
    Package {
        name: "system_dep_pkg",
        version: "1.0.0",
        build: fixtures::system_dep_pkg,
    },
];

/// Look up a package by `name` (latest version) or `name@version`.
pub fn find(spec: &str) -> Option<&'static Package> {
    match spec.split_once('@') {
        Some((name, version)) => PACKAGES
            .iter()
            .find(|p| p.name == name && p.version == version),
        None => PACKAGES.iter().rev().find(|p| p.name == spec),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_resolves_latest_and_pinned_versions() {
        assert_eq!(find("base_pkg_1").unwrap().version, "1.3.0");
        assert_eq!(find("base_pkg_1@1.2.0").unwrap().version, "1.2.0");
        assert!(find("base_pkg_1@9.9.9").is_none());
        assert!(find("unknown_pkg").is_none());
    }

    #[test]
    fn every_package_builds_under_its_own_name() {
        for package in PACKAGES {
            let server = (package.build)().unwrap();
            assert_eq!(server.name(), package.name);
            assert!(!server.list_tools().is_empty(), "{} has no tools", package.name);
        }
    }
}
