use anyhow::{anyhow, Context};
use k8s_openapi::api::core::v1::Pod;
use kube::{
    config::{KubeConfigOptions, Kubeconfig},
    Api, Client, Config,
};
use log::debug;
use snat_adjuster_core::resources::labels::get_enabled_pods_listparams;

use crate::config::KubeConfigSource;

pub async fn create_client(source: &KubeConfigSource) -> anyhow::Result<Client> {
    let config = match source.prefer_in_cluster {
        true => match Config::incluster() {
            Ok(config) => {
                debug!("Using in-cluster service account credentials");
                config
            }
            Err(error) => {
                debug!("In-cluster configuration unavailable ({error}), falling back to kubeconfig");
                load_kubeconfig(source).await?
            }
        },
        false => load_kubeconfig(source).await?,
    };

    let client = Client::try_from(config)?;

    Ok(client)
}

async fn load_kubeconfig(source: &KubeConfigSource) -> anyhow::Result<Config> {
    let path = source
        .kube_config
        .as_ref()
        .ok_or_else(|| anyhow!("Not running in a cluster and no kubeconfig is available!"))?;
    let config_options = KubeConfigOptions {
        context: source.kube_context.to_owned(),
        ..Default::default()
    };

    debug!("Using kubeconfig at {}", path.display());

    let kubeconfig = Kubeconfig::read_from(path)
        .with_context(|| format!("Couldn't load kubeconfig from {}!", path.display()))?;
    let config = Config::from_custom_kubeconfig(kubeconfig, &config_options).await?;

    Ok(config)
}

/// Lists the pods carrying the enable label, cluster-wide unless a namespace is given.
pub async fn list_tagged_pods(client: &Client, namespace: Option<&str>) -> anyhow::Result<Vec<Pod>> {
    let pod_api: Api<Pod> = match namespace {
        Some(namespace) => Api::namespaced(client.clone(), namespace),
        None => Api::all(client.clone()),
    };

    let pods = pod_api
        .list(&get_enabled_pods_listparams())
        .await
        .context("Couldn't retrieve pods from the cluster!")?;

    Ok(pods.items)
}
