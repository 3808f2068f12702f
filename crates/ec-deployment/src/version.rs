//! Version gates deciding between legacy node types and node roles.

use semver::Version;
use snafu::{ResultExt, Snafu};

/// Node roles replace the legacy node type flags starting with this version.
pub const NODE_ROLES_MIN_VERSION: Version = Version::new(7, 10, 0);

type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("failed to parse version {input:?}"))]
    Parse {
        source: semver::Error,
        input: String,
    },
}

pub fn parse(input: &str) -> Result<Version> {
    Version::parse(input).context(ParseSnafu { input })
}

/// Returns whether a deployment at `version` describes its topology with
/// node roles.
pub fn compatible_with_node_roles(version: &str) -> Result<bool> {
    Ok(parse(version)? >= NODE_ROLES_MIN_VERSION)
}

/// Returns whether an update from `old_version` to `new_version` may send node
/// roles.
///
/// The API refuses an upgrade across [`NODE_ROLES_MIN_VERSION`] combined with
/// a switch to node roles, and refuses a version change while existing
/// topology elements are still described by node types. In both cases the
/// update has to stay on node types and the migration happens on a later
/// apply.
pub fn legacy_to_node_roles(
    old_version: &str,
    new_version: &str,
    has_legacy_node_types: bool,
) -> Result<bool> {
    if old_version.is_empty() || old_version == new_version {
        return Ok(true);
    }

    let old = parse(old_version)?;
    let new = parse(new_version)?;

    if old < NODE_ROLES_MIN_VERSION && new >= NODE_ROLES_MIN_VERSION {
        return Ok(false);
    }

    Ok(!has_legacy_node_types)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("7.9.3", false)]
    #[case("7.10.0", true)]
    #[case("7.10.0-SNAPSHOT", false)]
    #[case("8.12.1", true)]
    fn node_roles_compatibility(#[case] version: &str, #[case] expected: bool) {
        assert_eq!(
            compatible_with_node_roles(version).expect("valid version"),
            expected
        );
    }

    #[test]
    fn invalid_version_is_an_error() {
        assert!(compatible_with_node_roles("7.x").is_err());
        assert!(legacy_to_node_roles("7.9.0", "latest", false).is_err());
    }

    #[rstest]
    #[case::unchanged("7.10.1", "7.10.1", true, true)]
    #[case::new_resource("", "8.0.0", true, true)]
    #[case::crossing_threshold("7.9.2", "7.10.0", false, false)]
    #[case::below_threshold("7.8.0", "7.9.0", false, true)]
    #[case::above_threshold("7.10.0", "8.1.0", false, true)]
    #[case::legacy_flags_with_upgrade("7.10.0", "8.1.0", true, false)]
    #[case::legacy_flags_below_threshold("7.8.0", "7.9.0", true, false)]
    fn node_roles_migration_gate(
        #[case] old_version: &str,
        #[case] new_version: &str,
        #[case] has_legacy_node_types: bool,
        #[case] expected: bool,
    ) {
        assert_eq!(
            legacy_to_node_roles(old_version, new_version, has_legacy_node_types)
                .expect("valid versions"),
            expected
        );
    }
}
