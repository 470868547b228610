//! Well-known Kubernetes kinds
//!
//! Centralizes the built-in kinds the graph builder has rules for, so
//! registries, link generation and the CLI don't repeat kind strings.

use super::GroupVersionKind;
use std::fmt;
use std::str::FromStr;

/// Built-in kinds with relationship or status rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownKind {
    // Workloads
    Pod,
    ReplicaSet,
    ReplicationController,
    Deployment,
    StatefulSet,
    DaemonSet,
    Job,
    CronJob,
    // Discovery and load balancing
    Service,
    Endpoints,
    Ingress,
    // Config and storage
    ServiceAccount,
    ConfigMap,
    Secret,
}

impl KnownKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            KnownKind::Pod => "Pod",
            KnownKind::ReplicaSet => "ReplicaSet",
            KnownKind::ReplicationController => "ReplicationController",
            KnownKind::Deployment => "Deployment",
            KnownKind::StatefulSet => "StatefulSet",
            KnownKind::DaemonSet => "DaemonSet",
            KnownKind::Job => "Job",
            KnownKind::CronJob => "CronJob",
            KnownKind::Service => "Service",
            KnownKind::Endpoints => "Endpoints",
            KnownKind::Ingress => "Ingress",
            KnownKind::ServiceAccount => "ServiceAccount",
            KnownKind::ConfigMap => "ConfigMap",
            KnownKind::Secret => "Secret",
        }
    }

    pub fn api_version(&self) -> &'static str {
        match self {
            KnownKind::ReplicaSet
            | KnownKind::Deployment
            | KnownKind::StatefulSet
            | KnownKind::DaemonSet => "apps/v1",
            KnownKind::Job | KnownKind::CronJob => "batch/v1",
            KnownKind::Ingress => "networking.k8s.io/v1",
            KnownKind::Pod
            | KnownKind::ReplicationController
            | KnownKind::Service
            | KnownKind::Endpoints
            | KnownKind::ServiceAccount
            | KnownKind::ConfigMap
            | KnownKind::Secret => "v1",
        }
    }

    pub fn gvk(&self) -> GroupVersionKind {
        GroupVersionKind::from_api_version(self.api_version(), self.as_str())
    }

    /// Lowercase plural resource name (`ingresses`, `endpoints`)
    pub fn plural(&self) -> &'static str {
        match self {
            KnownKind::Pod => "pods",
            KnownKind::ReplicaSet => "replicasets",
            KnownKind::ReplicationController => "replicationcontrollers",
            KnownKind::Deployment => "deployments",
            KnownKind::StatefulSet => "statefulsets",
            KnownKind::DaemonSet => "daemonsets",
            KnownKind::Job => "jobs",
            KnownKind::CronJob => "cronjobs",
            KnownKind::Service => "services",
            KnownKind::Endpoints => "endpoints",
            KnownKind::Ingress => "ingresses",
            KnownKind::ServiceAccount => "serviceaccounts",
            KnownKind::ConfigMap => "configmaps",
            KnownKind::Secret => "secrets",
        }
    }

    /// Dashboard section the kind is listed under
    pub fn section(&self) -> &'static str {
        match self {
            KnownKind::Pod
            | KnownKind::ReplicaSet
            | KnownKind::ReplicationController
            | KnownKind::Deployment
            | KnownKind::StatefulSet
            | KnownKind::DaemonSet
            | KnownKind::Job
            | KnownKind::CronJob => "workloads",
            KnownKind::Service | KnownKind::Endpoints | KnownKind::Ingress => {
                "discovery-and-load-balancing"
            }
            KnownKind::ServiceAccount | KnownKind::ConfigMap | KnownKind::Secret => {
                "config-and-storage"
            }
        }
    }

    pub fn all() -> &'static [Self] {
        &[
            KnownKind::Pod,
            KnownKind::ReplicaSet,
            KnownKind::ReplicationController,
            KnownKind::Deployment,
            KnownKind::StatefulSet,
            KnownKind::DaemonSet,
            KnownKind::Job,
            KnownKind::CronJob,
            KnownKind::Service,
            KnownKind::Endpoints,
            KnownKind::Ingress,
            KnownKind::ServiceAccount,
            KnownKind::ConfigMap,
            KnownKind::Secret,
        ]
    }

    /// Find the known kind for an `(apiVersion, kind)` pair
    pub fn from_type(api_version: &str, kind: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.api_version() == api_version && k.as_str() == kind)
    }

    /// Parse a kind name or kubectl-style alias (case-insensitive)
    pub fn from_str_case_insensitive(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pod" | "pods" | "po" => Some(KnownKind::Pod),
            "replicaset" | "replicasets" | "rs" => Some(KnownKind::ReplicaSet),
            "replicationcontroller" | "replicationcontrollers" | "rc" => {
                Some(KnownKind::ReplicationController)
            }
            "deployment" | "deployments" | "deploy" => Some(KnownKind::Deployment),
            "statefulset" | "statefulsets" | "sts" => Some(KnownKind::StatefulSet),
            "daemonset" | "daemonsets" | "ds" => Some(KnownKind::DaemonSet),
            "job" | "jobs" => Some(KnownKind::Job),
            "cronjob" | "cronjobs" | "cj" => Some(KnownKind::CronJob),
            "service" | "services" | "svc" => Some(KnownKind::Service),
            "endpoints" | "ep" => Some(KnownKind::Endpoints),
            "ingress" | "ingresses" | "ing" => Some(KnownKind::Ingress),
            "serviceaccount" | "serviceaccounts" | "sa" => Some(KnownKind::ServiceAccount),
            "configmap" | "configmaps" | "cm" => Some(KnownKind::ConfigMap),
            "secret" | "secrets" => Some(KnownKind::Secret),
            _ => None,
        }
    }
}

impl fmt::Display for KnownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for KnownKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("Unknown kind: {}", s))
    }
}
