use std::collections::BTreeSet;
use std::str::FromStr;

/// Capability flags a component can be deployed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Feature {
    ContainerRootUser,
    DevMappingAllowed,
    DevBranchJobBlocked,
    DevBranchConfigurationUnsafe,
    NoSwap,
    AllowUseFileStorageOnly,
    SnowflakeKeyPairAuth,
    ContainerTcpKeepalive60sOverride,
}

impl Feature {
    pub const ALL: [Feature; 8] = [
        Feature::ContainerRootUser,
        Feature::DevMappingAllowed,
        Feature::DevBranchJobBlocked,
        Feature::DevBranchConfigurationUnsafe,
        Feature::NoSwap,
        Feature::AllowUseFileStorageOnly,
        Feature::SnowflakeKeyPairAuth,
        Feature::ContainerTcpKeepalive60sOverride,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Feature::ContainerRootUser => "container-root-user",
            Feature::DevMappingAllowed => "dev-mapping-allowed",
            Feature::DevBranchJobBlocked => "dev-branch-job-blocked",
            Feature::DevBranchConfigurationUnsafe => "dev-branch-configuration-unsafe",
            Feature::NoSwap => "no-swap",
            Feature::AllowUseFileStorageOnly => "allow-use-file-storage-only",
            Feature::SnowflakeKeyPairAuth => "snowflake-key-pair-auth",
            Feature::ContainerTcpKeepalive60sOverride => "container-tcpkeepalive-60s-override",
        }
    }
}

impl FromStr for Feature {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Feature::ALL
            .into_iter()
            .find(|feature| feature.as_str() == s)
            .ok_or(())
    }
}

/// Feature flags resolved once; names this crate does not know are kept verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Features {
    known: BTreeSet<Feature>,
    names: Vec<String>,
}

impl Features {
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let known = names.iter().filter_map(|name| name.parse().ok()).collect();
        Self { known, names }
    }

    pub fn contains(&self, feature: Feature) -> bool {
        self.known.contains(&feature)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}
