use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(
    name = "kubectl-peek",
    version,
    about = "Efficiently peek at the first N resources from the API server",
    long_about = "Retrieve just the first N items of a resource list, avoiding the memory and \
network cost of listing everything on clusters with many resources. Page through the rest \
interactively, or hand the printed continue token back with --continue.",
    after_help = "Examples:
  # Peek at the first 10 pods in the current namespace
  kubectl peek pods

  # Peek at the first 5 deployments in wide format
  kubectl peek deployments.apps --limit 5 -o wide

  # Interactively page through all services, 20 at a time
  kubectl peek services --limit 20 -i

  # Get the second page of pods, using a token from a previous run
  kubectl peek pods --limit 10 --continue \"eyJhbGciOi...\""
)]
pub struct CliArgs {
    /// Resource type to list (e.g. pods, deploy, deployments.apps)
    pub resource: String,

    /// Number of items to return per page [default: 10]
    #[arg(long, allow_negative_numbers = true)]
    pub limit: Option<i64>,

    /// Token from a previous run; resumes listing right after that page
    #[arg(long = "continue", value_name = "TOKEN")]
    pub continue_token: Option<String>,

    /// Page through results, waiting for a key press between pages
    #[arg(short, long)]
    pub interactive: bool,

    /// Label selector passed to the API server (e.g. -l key1=value1,key2!=value2)
    #[arg(short = 'l', long)]
    pub selector: Option<String>,

    /// List across all namespaces, ignoring the current context's namespace
    #[arg(short = 'A', long)]
    pub all_namespaces: bool,

    /// Namespace to list from
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Output format: wide, json, yaml or name
    #[arg(short, long)]
    pub output: Option<String>,

    /// Kubeconfig context to use
    #[arg(long)]
    pub context: Option<String>,

    /// Kubeconfig cluster to use
    #[arg(long)]
    pub cluster: Option<String>,

    /// Kubeconfig user to use
    #[arg(long)]
    pub user: Option<String>,

    /// Path to the kubeconfig file
    #[arg(long)]
    pub kubeconfig: Option<PathBuf>,

    /// tracing filter (for example: warn,debug,kubectl_peek=trace)
    #[arg(long, default_value = "warn")]
    pub log_filter: String,
}

#[cfg(test)]
mod tests {
    use super::CliArgs;
    use clap::Parser;

    #[test]
    fn short_flags_map_to_options() {
        let args = CliArgs::try_parse_from([
            "kubectl-peek",
            "pods",
            "-i",
            "-A",
            "-l",
            "app=web",
            "-o",
            "wide",
            "--limit",
            "5",
        ])
        .expect("valid arguments");

        assert_eq!(args.resource, "pods");
        assert!(args.interactive);
        assert!(args.all_namespaces);
        assert_eq!(args.selector.as_deref(), Some("app=web"));
        assert_eq!(args.output.as_deref(), Some("wide"));
        assert_eq!(args.limit, Some(5));
    }

    #[test]
    fn negative_limit_reaches_validation() {
        let args = CliArgs::try_parse_from(["kubectl-peek", "pods", "--limit", "-3"])
            .expect("negative limit parses");
        assert_eq!(args.limit, Some(-3));
    }

    #[test]
    fn exactly_one_resource_is_required() {
        assert!(CliArgs::try_parse_from(["kubectl-peek"]).is_err());
        assert!(CliArgs::try_parse_from(["kubectl-peek", "pods", "services"]).is_err());
    }
}
