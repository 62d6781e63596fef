use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::Pod;
use log::debug;

use crate::helpers::OrEmpty;

use super::{
    annotations::{get_eip_candidates_annotation, get_gateway_id_annotation, parse_eip_candidates},
    labels::{get_enable_label, ENABLE_LABEL_VALUE},
};

/// Egress configuration declared on a single pod
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PodEgressSpec {
    pub pod_name: String,
    pub namespace: Option<String>,
    /// empty until the pod gets scheduled
    pub pod_ip: String,
    pub enabled: bool,
    pub gateway_id: String,
    pub eip_candidates: Vec<String>,
}

impl PodEgressSpec {
    /// Extracts the egress configuration of a pod.
    ///
    /// Returns `None` for pods that don't opt in through the enable label, or that are
    /// missing the gateway or EIP annotations. Such pods are left alone, this is not an error.
    pub fn from_pod(pod: &Pod) -> Option<Self> {
        let pod_name = pod.metadata.name.as_deref()?;
        let pod_ip = pod
            .status
            .as_ref()
            .map(|status| status.pod_ip.or_empty())
            .unwrap_or("");

        let mut spec = Self::from_metadata(
            pod_name,
            pod_ip,
            pod.metadata.labels.as_ref()?,
            pod.metadata.annotations.as_ref()?,
        )?;
        spec.namespace = pod.metadata.namespace.clone();

        Some(spec)
    }

    pub fn from_metadata(
        pod_name: &str,
        pod_ip: &str,
        labels: &BTreeMap<String, String>,
        annotations: &BTreeMap<String, String>,
    ) -> Option<Self> {
        let enabled = labels
            .get(&get_enable_label())
            .is_some_and(|value| value == ENABLE_LABEL_VALUE);

        if !enabled {
            debug!("Skipping '{pod_name}', egress adjustment isn't enabled");
            return None;
        }

        let Some(gateway_id) = annotations.get(&get_gateway_id_annotation()) else {
            debug!("Skipping '{pod_name}', it doesn't declare a NAT gateway");
            return None;
        };

        let Some(eip_candidates) = annotations.get(&get_eip_candidates_annotation()) else {
            debug!("Skipping '{pod_name}', it doesn't declare any EIP candidates");
            return None;
        };

        let spec = Self {
            pod_name: pod_name.to_owned(),
            namespace: None,
            pod_ip: pod_ip.to_owned(),
            enabled,
            gateway_id: gateway_id.trim().to_owned(),
            eip_candidates: parse_eip_candidates(eip_candidates),
        };

        if !spec.is_participating() {
            debug!("Skipping '{pod_name}', its gateway or EIP annotation is empty");
            return None;
        }

        Some(spec)
    }

    /// Only enabled pods with a gateway and at least one non-blank candidate take part in a pass.
    pub fn is_participating(&self) -> bool {
        self.enabled
            && !self.gateway_id.is_empty()
            && self.eip_candidates.iter().any(|eip| !eip.is_empty())
    }

    pub fn source_cidr(&self) -> String {
        format!("{}{}", self.pod_ip, crate::POD_CIDR_SUFFIX)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use k8s_openapi::api::core::v1::{Pod, PodStatus};
    use kube::core::ObjectMeta;

    use crate::testing::egress_annotations;

    use super::*;

    fn enabled_labels() -> BTreeMap<String, String> {
        BTreeMap::from([(get_enable_label(), "true".to_owned())])
    }

    #[test]
    fn parses_enabled_pod() {
        let spec = PodEgressSpec::from_metadata(
            "web-a",
            "10.1.1.2",
            &enabled_labels(),
            &egress_annotations("ngw-1", &["eip-1", "eip-2"]),
        )
        .unwrap();

        assert_eq!(spec.pod_name, "web-a");
        assert_eq!(spec.pod_ip, "10.1.1.2");
        assert!(spec.enabled);
        assert_eq!(spec.gateway_id, "ngw-1");
        assert_eq!(spec.eip_candidates, vec!["eip-1", "eip-2"]);
        assert_eq!(spec.source_cidr(), "10.1.1.2/32");
    }

    #[test]
    fn skips_pods_without_exact_enable_value() {
        let annotations = egress_annotations("ngw-1", &["eip-1"]);
        let labels = BTreeMap::from([(get_enable_label(), "True".to_owned())]);

        assert!(PodEgressSpec::from_metadata("web-a", "", &labels, &annotations).is_none());
        assert!(PodEgressSpec::from_metadata("web-a", "", &BTreeMap::new(), &annotations).is_none());
    }

    #[test]
    fn skips_pods_missing_annotations() {
        let mut annotations = egress_annotations("ngw-1", &["eip-1"]);
        annotations.remove(&get_eip_candidates_annotation());

        assert!(
            PodEgressSpec::from_metadata("web-a", "", &enabled_labels(), &annotations).is_none()
        );

        let mut annotations = egress_annotations("ngw-1", &["eip-1"]);
        annotations.remove(&get_gateway_id_annotation());

        assert!(
            PodEgressSpec::from_metadata("web-a", "", &enabled_labels(), &annotations).is_none()
        );
    }

    #[test]
    fn skips_pods_with_blank_annotations() {
        let annotations = egress_annotations("", &["eip-1"]);
        assert!(
            PodEgressSpec::from_metadata("web-a", "", &enabled_labels(), &annotations).is_none()
        );

        let annotations = egress_annotations("ngw-1", &["", ""]);
        assert!(
            PodEgressSpec::from_metadata("web-a", "", &enabled_labels(), &annotations).is_none()
        );
    }

    #[test]
    fn keeps_empty_candidate_slots() {
        let spec = PodEgressSpec::from_metadata(
            "web-a",
            "",
            &enabled_labels(),
            &egress_annotations("ngw-1", &["", "eip-2"]),
        )
        .unwrap();

        assert_eq!(spec.eip_candidates, vec!["", "eip-2"]);
    }

    #[test]
    fn reads_pod_resource() {
        let pod = Pod {
            metadata: ObjectMeta {
                name: Some("web-b".to_owned()),
                namespace: Some("shop".to_owned()),
                labels: Some(enabled_labels()),
                annotations: Some(egress_annotations("ngw-1", &["eip-1"])),
                ..Default::default()
            },
            status: Some(PodStatus {
                pod_ip: Some("10.1.1.3".to_owned()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let spec = PodEgressSpec::from_pod(&pod).unwrap();

        assert_eq!(spec.pod_name, "web-b");
        assert_eq!(spec.namespace.as_deref(), Some("shop"));
        assert_eq!(spec.pod_ip, "10.1.1.3");
    }

    #[test]
    fn unscheduled_pod_has_empty_ip() {
        let pod = Pod {
            metadata: ObjectMeta {
                name: Some("web-c".to_owned()),
                labels: Some(enabled_labels()),
                annotations: Some(egress_annotations("ngw-1", &["eip-1"])),
                ..Default::default()
            },
            ..Default::default()
        };

        assert_eq!(PodEgressSpec::from_pod(&pod).unwrap().pod_ip, "");
    }

    #[test]
    fn skips_pod_without_name() {
        let pod = Pod {
            metadata: ObjectMeta {
                name: None,
                generate_name: Some("web-".to_owned()),
                labels: Some(enabled_labels()),
                annotations: Some(egress_annotations("ngw-1", &["eip-1"])),
                ..Default::default()
            },
            status: Some(PodStatus {
                pod_ip: Some("10.1.1.4".to_owned()),
                ..Default::default()
            }),
            ..Default::default()
        };

        assert!(PodEgressSpec::from_pod(&pod).is_none());
    }
}
