use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Who owns a generated file once it exists
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// Fully generator-controlled; regenerated whenever overwrite is on
    System,
    /// Meant for hand edits; only regenerated when explicitly forced
    User,
}

/// One kind of generated file
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// `src/lib.rs`
    Lib,
    /// `src/server.rs`
    Server,
    /// `src/<client_module>.rs`
    Client,
    /// `src/handlers.rs`
    Handlers,
    /// `src/types.rs`
    Types,
    /// `src/<validator_module>.rs`
    Validators,
    /// `src/main.rs`
    Main,
    /// `Cargo.toml`
    Manifest,
    /// `tests/<crate>.rs`
    Tests,
}

impl ArtifactKind {
    /// Every kind, in render order
    pub const ALL: [ArtifactKind; 9] = [
        ArtifactKind::Lib,
        ArtifactKind::Server,
        ArtifactKind::Client,
        ArtifactKind::Handlers,
        ArtifactKind::Types,
        ArtifactKind::Validators,
        ArtifactKind::Main,
        ArtifactKind::Manifest,
        ArtifactKind::Tests,
    ];

    /// Overwrite class of the kind
    pub fn ownership(self) -> Ownership {
        match self {
            ArtifactKind::Lib
            | ArtifactKind::Server
            | ArtifactKind::Client
            | ArtifactKind::Validators => Ownership::System,
            ArtifactKind::Handlers
            | ArtifactKind::Types
            | ArtifactKind::Main
            | ArtifactKind::Manifest
            | ArtifactKind::Tests => Ownership::User,
        }
    }

    /// Whether the artifact is Rust source and goes through the formatter
    pub fn is_rust(self) -> bool {
        self != ArtifactKind::Manifest
    }

    /// Module name declared in `lib.rs`, for kinds that are library modules
    pub fn module_name(self, names: &ModuleNames) -> Option<String> {
        match self {
            ArtifactKind::Server => Some("server".to_string()),
            ArtifactKind::Client => Some(names.client.clone()),
            ArtifactKind::Handlers => Some("handlers".to_string()),
            ArtifactKind::Types => Some("types".to_string()),
            ArtifactKind::Validators => Some(names.validators.clone()),
            ArtifactKind::Lib | ArtifactKind::Main | ArtifactKind::Manifest | ArtifactKind::Tests => {
                None
            }
        }
    }

    /// Path of the artifact relative to the output directory
    pub fn relative_path(self, names: &ModuleNames) -> PathBuf {
        match self {
            ArtifactKind::Lib => PathBuf::from("src/lib.rs"),
            ArtifactKind::Main => PathBuf::from("src/main.rs"),
            ArtifactKind::Manifest => PathBuf::from("Cargo.toml"),
            ArtifactKind::Tests => PathBuf::from(format!("tests/{}.rs", names.crate_ident)),
            other => match other.module_name(names) {
                Some(module) => PathBuf::from(format!("src/{module}.rs")),
                None => PathBuf::from("src/lib.rs"),
            },
        }
    }

    /// Kind for a lower-case tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        ArtifactKind::ALL.into_iter().find(|k| k.tag() == tag)
    }

    /// Lower-case tag used in config files and on the command line
    pub fn tag(self) -> &'static str {
        match self {
            ArtifactKind::Lib => "lib",
            ArtifactKind::Server => "server",
            ArtifactKind::Client => "client",
            ArtifactKind::Handlers => "handlers",
            ArtifactKind::Types => "types",
            ArtifactKind::Validators => "validators",
            ArtifactKind::Main => "main",
            ArtifactKind::Manifest => "manifest",
            ArtifactKind::Tests => "tests",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Names that decide where artifacts land and how they refer to each other
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNames {
    /// Crate identifier of the generated package (`-` replaced by `_`)
    pub crate_ident: String,
    /// Module holding the validator registration
    pub validators: String,
    /// Module holding the client
    pub client: String,
}
