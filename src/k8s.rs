use anyhow::{Context, Result};
use futures::future::join_all;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::APIGroup;
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::{Client, Config};
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::resolver::RestMapper;

/// Which kubeconfig entries to connect with. Unset fields fall back to the
/// kubeconfig's current context.
#[derive(Debug, Clone, Default)]
pub struct KubeSelection {
    pub kubeconfig: Option<PathBuf>,
    pub context: Option<String>,
    pub cluster: Option<String>,
    pub user: Option<String>,
}

#[derive(Clone)]
pub struct KubeGateway {
    client: Client,
    context: String,
    default_namespace: String,
}

impl KubeGateway {
    pub async fn connect(selection: &KubeSelection) -> Result<Self> {
        let kubeconfig = match &selection.kubeconfig {
            Some(path) => Some(
                Kubeconfig::read_from(path)
                    .with_context(|| format!("failed to read kubeconfig {}", path.display()))?,
            ),
            None => Kubeconfig::read().ok(),
        };

        let config = if let Some(kubeconfig_value) = kubeconfig.clone() {
            let options = KubeConfigOptions {
                context: selection.context.clone(),
                cluster: selection.cluster.clone(),
                user: selection.user.clone(),
            };
            Config::from_custom_kubeconfig(kubeconfig_value, &options)
                .await
                .context("failed to infer Kubernetes configuration")?
        } else {
            if selection.context.is_some() || selection.cluster.is_some() || selection.user.is_some()
            {
                anyhow::bail!(
                    "kubeconfig not found; --context, --cluster and --user are unavailable in this environment"
                );
            }
            Config::infer()
                .await
                .context("failed to infer Kubernetes configuration")?
        };

        let default_namespace = config.default_namespace.clone();
        let client = Client::try_from(config).context("failed to initialize Kubernetes client")?;
        let context = selection
            .context
            .clone()
            .or_else(|| kubeconfig.and_then(|cfg| cfg.current_context))
            .unwrap_or_else(|| "in-cluster".to_string());

        debug!(context = %context, namespace = %default_namespace, "connected");
        Ok(Self {
            client,
            context,
            default_namespace,
        })
    }

    pub fn context(&self) -> &str {
        &self.context
    }

    pub fn default_namespace(&self) -> &str {
        &self.default_namespace
    }

    pub fn client(&self) -> Client {
        self.client.clone()
    }

    /// Builds the type registry from the discovery documents: the core group
    /// first, then every named group in server order, preferred versions ahead
    /// of the rest. Group versions that fail to answer are skipped; aggregated
    /// APIs are often unavailable and should not block unrelated lookups.
    pub async fn discover_rest_mapper(&self) -> Result<RestMapper> {
        let mut mapper = RestMapper::new();

        let core = self
            .client
            .list_core_api_versions()
            .await
            .context("failed to discover core API versions")?;
        for version in &core.versions {
            let resources = self
                .client
                .list_core_api_resources(version)
                .await
                .with_context(|| format!("failed to discover resources for {version}"))?;
            mapper.add_group_version("", version, &resources.resources);
        }

        let groups = self
            .client
            .list_api_groups()
            .await
            .context("failed to discover API groups")?;
        let group_versions = groups
            .groups
            .iter()
            .flat_map(ordered_group_versions)
            .collect::<Vec<_>>();

        let lookups = group_versions.iter().map(|(_, _, group_version)| {
            self.client.list_api_group_resources(group_version)
        });
        let results = join_all(lookups).await;

        for ((group, version, group_version), result) in group_versions.iter().zip(results) {
            match result {
                Ok(list) => mapper.add_group_version(group, version, &list.resources),
                Err(error) => {
                    warn!(group_version = %group_version, error = %error, "skipping unavailable API group version");
                }
            }
        }

        debug!(resources = mapper.len(), "discovered resource types");
        Ok(mapper)
    }
}

/// (group, version, group/version) triples, preferred version first.
fn ordered_group_versions(group: &APIGroup) -> Vec<(String, String, String)> {
    let preferred = group
        .preferred_version
        .as_ref()
        .map(|preferred| preferred.version.as_str());

    let mut versions = group.versions.iter().collect::<Vec<_>>();
    versions.sort_by_key(|version| Some(version.version.as_str()) != preferred);

    versions
        .into_iter()
        .map(|version| {
            (
                group.name.clone(),
                version.version.clone(),
                version.group_version.clone(),
            )
        })
        .collect()
}
