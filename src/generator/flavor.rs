//! Flavor registry.
//!
//! A flavor names a set of artifacts rendered from one parsed schema. The
//! built-in flavors are `server` (the full service crate), `client` (client
//! plus payload types) and `validator` (validators only). Callers can
//! register their own.

use std::collections::BTreeMap;

use super::artifact::ArtifactKind;
use super::render::{render_artifact, RenderContext};
use crate::parser::{parse, ParseResult};
use crate::schema::HyperSchema;
use crate::validator::ValidatorBuilder;

/// A named artifact set with its parse and render steps
pub trait Flavor: Send + Sync {
    /// Registry tag, e.g. `server`
    fn tag(&self) -> &'static str;

    /// Artifacts this flavor renders
    fn artifacts(&self) -> &'static [ArtifactKind];

    /// Parse the document. The shared parser unless overridden.
    ///
    /// # Errors
    ///
    /// Returns schema and validator errors.
    fn parse(&self, doc: &HyperSchema, builder: &dyn ValidatorBuilder) -> anyhow::Result<ParseResult> {
        parse(doc, builder)
    }

    /// Render one of this flavor's artifacts.
    ///
    /// # Errors
    ///
    /// Returns render errors.
    fn render(&self, kind: ArtifactKind, ctx: &RenderContext<'_>) -> anyhow::Result<String> {
        render_artifact(kind, ctx)
    }
}

/// Full service crate: routes, client, stubs, validators, entry point, tests
#[derive(Debug, Clone, Copy, Default)]
pub struct ServerFlavor;

impl Flavor for ServerFlavor {
    fn tag(&self) -> &'static str {
        "server"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[
            ArtifactKind::Lib,
            ArtifactKind::Server,
            ArtifactKind::Client,
            ArtifactKind::Handlers,
            ArtifactKind::Types,
            ArtifactKind::Validators,
            ArtifactKind::Main,
            ArtifactKind::Manifest,
            ArtifactKind::Tests,
        ]
    }
}

/// Client library only
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientFlavor;

impl Flavor for ClientFlavor {
    fn tag(&self) -> &'static str {
        "client"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::Lib, ArtifactKind::Client, ArtifactKind::Types]
    }
}

/// Validator registration only
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatorFlavor;

impl Flavor for ValidatorFlavor {
    fn tag(&self) -> &'static str {
        "validator"
    }

    fn artifacts(&self) -> &'static [ArtifactKind] {
        &[ArtifactKind::Lib, ArtifactKind::Validators]
    }
}

/// Maps flavor tags to implementations
#[derive(Default)]
pub struct FlavorRegistry {
    flavors: BTreeMap<&'static str, Box<dyn Flavor>>,
}

impl FlavorRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `server`, `client` and `validator`
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(ServerFlavor));
        registry.register(Box::new(ClientFlavor));
        registry.register(Box::new(ValidatorFlavor));
        registry
    }

    /// Add or replace a flavor under its tag
    pub fn register(&mut self, flavor: Box<dyn Flavor>) {
        self.flavors.insert(flavor.tag(), flavor);
    }

    /// Registered tags, sorted
    pub fn tags(&self) -> Vec<&'static str> {
        self.flavors.keys().copied().collect()
    }

    /// Look up a flavor.
    ///
    /// # Errors
    ///
    /// Fails for unknown tags, listing the registered ones.
    pub fn get(&self, tag: &str) -> anyhow::Result<&dyn Flavor> {
        self.flavors
            .get(tag.trim())
            .map(|f| f.as_ref())
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "unknown flavor '{}' (available: {})",
                    tag,
                    self.tags().join(", ")
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tags() {
        assert_eq!(FlavorRegistry::builtin().tags(), vec!["client", "server", "validator"]);
    }

    #[test]
    fn test_unknown_flavor_lists_tags() {
        let registry = FlavorRegistry::builtin();
        let err = registry.get("grpc").err().unwrap().to_string();
        assert!(err.contains("grpc"));
        assert!(err.contains("client, server, validator"));
    }

    #[test]
    fn test_flavor_artifacts() {
        let registry = FlavorRegistry::builtin();
        assert_eq!(
            registry.get("validator").unwrap().artifacts(),
            &[ArtifactKind::Lib, ArtifactKind::Validators]
        );
        assert_eq!(registry.get("server").unwrap().artifacts().len(), 9);
    }
}
