use std::sync::Arc;

use anyhow::Context;
use log::info;
use serde::Serialize;
use snat_adjuster_core::{
    desired::build_desired_state,
    reconciler::{
        action::SnatAction, context::ReconcilerContext, reconcile_egress, ActionRecord, PassReport,
        PassSummary,
    },
    resources::egress::PodEgressSpec,
};
use snat_adjuster_macros::TableOutputRow;

use crate::{
    cli::OutputFormat,
    config::AdjusterConfig,
    operations::kubernetes::{create_client, list_tagged_pods},
    output::{CliPrint, SerializableOutputDisplay, TableCellOption},
    volcengine::VolcengineNatGateway,
};

pub async fn reconcile(config: AdjusterConfig, output: OutputFormat) -> anyhow::Result<()> {
    let client = create_client(&config.kube)
        .await
        .context("Couldn't initialize k8s API client!")?;
    let pods = list_tagged_pods(&client, config.namespace.as_deref()).await?;

    if pods.is_empty() {
        info!("No pods carry the enable label, nothing to do");
        return Ok(());
    }

    let desired = build_desired_state(pods.iter().filter_map(PodEgressSpec::from_pod));
    let gateway = VolcengineNatGateway::new(&config.gateway)
        .context("Couldn't initialize NAT gateway API client!")?;
    let context = ReconcilerContext {
        gateway: Arc::new(gateway),
        dry_run: config.dry_run,
    };

    let report = reconcile_egress(&context, desired).await?;

    match output {
        OutputFormat::Json => report_view(&report).print_json()?,
        OutputFormat::JsonPretty => report_view(&report).print_json_pretty()?,
        OutputFormat::Yaml => report_view(&report).print_yaml()?,
        table_format => action_views(&report).print(table_format)?,
    }

    Ok(())
}

fn action_views(report: &PassReport) -> Vec<ActionView> {
    report.actions.iter().map(|record| record.into()).collect()
}

fn report_view(report: &PassReport) -> ReportView {
    ReportView {
        summary: &report.summary,
        actions: action_views(report),
    }
}

/// Structured output carries the pass summary next to the action rows
#[derive(Serialize)]
struct ReportView<'a> {
    summary: &'a PassSummary,
    actions: Vec<ActionView<'a>>,
}

#[derive(Serialize, TableOutputRow)]
#[serde(rename_all = "camelCase")]
struct ActionView<'a> {
    pub gateway: &'a str,
    #[name_column]
    pub pod: &'a str,
    pub action: &'static str,
    pub eip: &'a str,
    pub source_cidr: &'a str,
    /// unknown for creations in dry runs
    pub rule_id: TableCellOption<&'a str>,
}

impl<'a> From<&'a ActionRecord> for ActionView<'a> {
    fn from(value: &'a ActionRecord) -> Self {
        let (action, rule_id) = match &value.action {
            SnatAction::Create(_) => (
                "create",
                value.outcome.as_ref().map(|outcome| outcome.rule_id()),
            ),
            SnatAction::Delete(request) => ("delete", Some(request.rule_id.as_str())),
        };

        ActionView {
            gateway: value.action.gateway_id(),
            pod: value.action.pod_name(),
            action,
            eip: value.action.eip_id(),
            source_cidr: value.action.source_cidr(),
            rule_id: rule_id.into(),
        }
    }
}
