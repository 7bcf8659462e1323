use crate::cli::CliArgs;
use crate::config::RuntimeConfig;
use crate::error::PeekError;
use crate::model::{ContinueToken, NamespaceScope, OutputFormat, PeekMode, ResourceIdentifier};
use std::num::NonZeroU32;

pub const DEFAULT_PEEK_LIMIT: i64 = 10;

/// Validated command-line options. Nothing here has touched the cluster yet.
#[derive(Debug, Clone)]
pub struct PeekOptions {
    pub resource: String,
    pub limit: NonZeroU32,
    pub mode: PeekMode,
    pub selector: Option<String>,
    pub format: OutputFormat,
    pub all_namespaces: bool,
    pub namespace: Option<String>,
}

impl PeekOptions {
    pub fn from_args(args: &CliArgs, config: &RuntimeConfig) -> Result<Self, PeekError> {
        let limit = args.limit.or(config.limit).unwrap_or(DEFAULT_PEEK_LIMIT);
        if limit <= 0 {
            return Err(PeekError::configuration("--limit must be a positive number"));
        }
        let limit = u32::try_from(limit)
            .ok()
            .and_then(NonZeroU32::new)
            .ok_or_else(|| {
                PeekError::configuration(format!("--limit must not exceed {}", u32::MAX))
            })?;

        let format = args
            .output
            .as_deref()
            .or(config.output.as_deref())
            .unwrap_or_default()
            .parse::<OutputFormat>()
            .map_err(PeekError::Configuration)?;

        let continue_token = args
            .continue_token
            .clone()
            .and_then(ContinueToken::from_server);

        let mode = if args.interactive {
            if continue_token.is_some() {
                return Err(PeekError::configuration(
                    "cannot use --interactive and --continue flags together",
                ));
            }
            if !format.is_tabular() {
                return Err(PeekError::configuration(
                    "interactive mode is only supported for standard and wide table output",
                ));
            }
            PeekMode::Interactive
        } else {
            PeekMode::SinglePass {
                resume_from: continue_token,
            }
        };

        Ok(Self {
            resource: args.resource.clone(),
            limit,
            mode,
            selector: args.selector.clone().filter(|selector| !selector.is_empty()),
            format,
            all_namespaces: args.all_namespaces,
            namespace: args.namespace.clone(),
        })
    }

    /// `--all-namespaces` beats `--namespace`, which beats the context default.
    pub fn namespace_scope(&self, default_namespace: &str) -> NamespaceScope {
        if self.all_namespaces {
            NamespaceScope::All
        } else if let Some(namespace) = &self.namespace {
            NamespaceScope::Named(namespace.clone())
        } else {
            NamespaceScope::Named(default_namespace.to_string())
        }
    }
}

/// Everything one invocation needs, fixed before the first page is fetched.
#[derive(Debug, Clone)]
pub struct PeekContext {
    pub resource: ResourceIdentifier,
    pub scope: NamespaceScope,
    pub limit: NonZeroU32,
    pub selector: Option<String>,
    pub format: OutputFormat,
    pub mode: PeekMode,
}

impl PeekContext {
    pub fn new(options: PeekOptions, resource: ResourceIdentifier, scope: NamespaceScope) -> Self {
        Self {
            resource,
            scope,
            limit: options.limit,
            selector: options.selector,
            format: options.format,
            mode: options.mode,
        }
    }
}
