use serde::Deserialize;

/// Runtime configuration for the resolver. Every field has a default, so a config file only
/// needs to name the fields it changes.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// If `false`, the resolver doesn't look at any tables and never selects a port. Builds that
    /// shouldn't have a debug console set this instead of compiling the resolver out.
    pub enabled: bool,

    /// Skip tables whose checksum is incorrect. If this is `false`, a bad checksum is only
    /// reported.
    pub verify_checksums: bool,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        ResolverConfig { enabled: true, verify_checksums: true }
    }
}
