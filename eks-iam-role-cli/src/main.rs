//! # eks-iam-role
//!
//! Ensures an IAM role exists for a Kubernetes service account on EKS, trusts the
//! cluster's OIDC provider, and has a managed policy with the given document attached.
//!
//! ```bash
//! eks-iam-role --role-name my-app --policy-file-path policy.json \
//!     --aws-region eu-west-1 --cluster-name prod \
//!     --namespace default --service-account my-app
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{ArgGroup, Parser};
use eks_iam_role_core::{
    EksIamRoleService, IssuerSource, PolicyOutcome, ReconcileConfig, ReconcileReport,
};
use log::{error, info};

#[derive(Parser, Debug)]
#[command(name = "eks-iam-role", version, about)]
#[command(group(
    ArgGroup::new("issuer_source")
        .required(true)
        .args(["cluster_name", "oidc_issuer"]),
))]
struct Cli {
    /// Name of the IAM role to reconcile
    #[arg(long, env = "ROLE_NAME")]
    role_name: String,

    /// Name of the managed policy (defaults to the role name)
    #[arg(long, env = "POLICY_NAME")]
    policy_name: Option<String>,

    /// Path to the JSON policy document
    #[arg(long, env = "POLICY_FILE_PATH", value_name = "FILE")]
    policy_file_path: PathBuf,

    /// AWS region to use
    #[arg(long, env = "AWS_REGION")]
    aws_region: String,

    /// Override the AWS service endpoint
    #[arg(long, env = "AWS_ENDPOINT")]
    aws_endpoint: Option<String>,

    /// EKS cluster whose OIDC issuer the role should trust
    #[arg(long, env = "CLUSTER_NAME")]
    cluster_name: Option<String>,

    /// OIDC issuer the role should trust, used verbatim
    #[arg(long, env = "OIDC_ISSUER")]
    oidc_issuer: Option<String>,

    /// Kubernetes namespace of the service account
    #[arg(long, env = "NAMESPACE")]
    namespace: String,

    /// Kubernetes service account allowed to assume the role
    #[arg(long, env = "SERVICE_ACCOUNT")]
    service_account: String,
}

impl Cli {
    fn into_config(self) -> Result<(ReconcileConfig, String, Option<String>)> {
        let policy_document = std::fs::read(&self.policy_file_path).with_context(|| {
            format!(
                "Reading policy file {}",
                self.policy_file_path.display()
            )
        })?;

        // The argument group guarantees exactly one of the two is set.
        let issuer_source = match (self.cluster_name, self.oidc_issuer) {
            (Some(cluster), _) => IssuerSource::Cluster(cluster),
            (None, Some(issuer)) => IssuerSource::Issuer(issuer),
            (None, None) => anyhow::bail!("one of --cluster-name or --oidc-issuer is required"),
        };

        let config = ReconcileConfig {
            policy_name: self.policy_name.unwrap_or_else(|| self.role_name.clone()),
            role_name: self.role_name,
            policy_document,
            namespace: self.namespace,
            service_account: self.service_account,
            issuer_source,
        };
        Ok((config, self.aws_region, self.aws_endpoint))
    }
}

fn describe(report: &ReconcileReport) -> String {
    let policy = match &report.policy {
        PolicyOutcome::Created => "created".to_string(),
        PolicyOutcome::Unchanged => "unchanged".to_string(),
        PolicyOutcome::Updated { new_version, .. } => format!("updated to {new_version}"),
    };
    let role = if report.role.created {
        "created"
    } else if report.role.trust_updated {
        "trust updated"
    } else {
        "unchanged"
    };
    let attachment = if report.role.policy_attached {
        "attached"
    } else {
        "already attached"
    };
    format!(
        "policy {} {}, role {}, policy {}",
        report.policy_arn, policy, role, attachment
    )
}

async fn run(cli: Cli) -> Result<ReconcileReport> {
    let (config, region, endpoint) = cli.into_config()?;
    let service = EksIamRoleService::new(&region, endpoint.as_deref()).await;
    let report = service.reconcile(&config).await?;
    Ok(report)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(report) => {
            info!("Success: {}", describe(&report));
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Reconciliation failed");
            eprintln!("Error: {e:#}");
            ExitCode::from(1)
        }
    }
}
