//! Per-component version resolution.
//!
//! The same logical component may live in different artifacts depending on
//! the product line. [`ComponentKind::source`] is the strategy table mapping
//! every (component, product) pair to the matcher and key that read it, or to
//! [`Source::Unavailable`] when the product line does not ship it.

use serde::{Deserialize, Serialize};

use crate::changelog::error::ChangelogError;
use crate::changelog::files::RepoFiles;
use crate::changelog::product::Product;
use crate::changelog::repo::Repo;

/// One dependency's resolved version for a specific release.
///
/// An empty `version` means "not available" for this product line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Component {
    /// Component name.
    pub name: String,
    /// Resolved version, empty when unavailable.
    pub version: String,
    /// Deep link to the upstream release notes.
    pub url: String,
    /// Built from a FIPS-validated hardened image.
    pub fips_compliant: bool,
}

impl Component {
    /// Whether a version was resolved.
    pub fn is_available(&self) -> bool {
        !self.version.is_empty()
    }
}

/// Where a component's version is read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Tag from the image manifest.
    Image(&'static str),
    /// Variable in the version script.
    BuildVersion(&'static str),
    /// `FROM` layer in the build descriptor.
    DockerfileLayer(&'static str),
    /// Chart built by the build descriptor.
    DockerfileChart(&'static str),
    /// Go module dependency.
    GoDependency(&'static str),
    /// SQLite binding header.
    Sqlite,
    /// Major-minor of the release itself.
    ReleaseVersion,
    /// Not shipped by this product line.
    Unavailable,
}

impl Source {
    /// Lookup key, if the source uses one.
    pub fn key(self) -> Option<&'static str> {
        match self {
            Self::Image(key)
            | Self::BuildVersion(key)
            | Self::DockerfileLayer(key)
            | Self::DockerfileChart(key)
            | Self::GoDependency(key) => Some(key),
            Self::Sqlite | Self::ReleaseVersion | Self::Unavailable => None,
        }
    }

    fn read(self, files: &RepoFiles, release: &str) -> Result<String, ChangelogError> {
        match self {
            Self::Image(key) => files.image(key),
            Self::BuildVersion(key) => files.build_version(key),
            Self::DockerfileLayer(key) => files.dockerfile_layer(key),
            Self::DockerfileChart(key) => files.dockerfile_chart(key),
            Self::GoDependency(key) => files.go_dependency(key),
            Self::Sqlite => files.sqlite(),
            Self::ReleaseVersion => major_minor(release),
            Self::Unavailable => Ok(String::new()),
        }
    }
}

/// Logical components tracked in release notes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Calico CNI.
    Calico,
    /// Canal (Calico + Flannel) CNI.
    Canal,
    /// Cilium CNI.
    Cilium,
    /// Container runtime.
    Containerd,
    /// Cluster DNS.
    CoreDns,
    /// Cluster database.
    Etcd,
    /// Flannel CNI.
    Flannel,
    /// Helm chart controller.
    HelmController,
    /// Ingress controller.
    IngressNginx,
    /// etcd shim for alternative datastores.
    Kine,
    /// Upstream Kubernetes.
    Kubernetes,
    /// Local path storage provisioner.
    LocalPathProvisioner,
    /// Release line of the product itself.
    MajorMinor,
    /// Resource metrics server.
    MetricsServer,
    /// Multus meta CNI.
    Multus,
    /// Low-level container runtime.
    Runc,
    /// Embedded SQLite.
    Sqlite,
    /// Traefik ingress.
    Traefik,
}

impl ComponentKind {
    /// Every component, in report order.
    pub const ALL: [Self; 18] = [
        Self::Kubernetes,
        Self::MajorMinor,
        Self::Kine,
        Self::Sqlite,
        Self::Etcd,
        Self::Containerd,
        Self::Runc,
        Self::Flannel,
        Self::Calico,
        Self::Canal,
        Self::Cilium,
        Self::Multus,
        Self::Traefik,
        Self::IngressNginx,
        Self::CoreDns,
        Self::MetricsServer,
        Self::HelmController,
        Self::LocalPathProvisioner,
    ];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Calico => "calico",
            Self::Canal => "canal",
            Self::Cilium => "cilium",
            Self::Containerd => "containerd",
            Self::CoreDns => "coredns",
            Self::Etcd => "etcd",
            Self::Flannel => "flannel",
            Self::HelmController => "helm-controller",
            Self::IngressNginx => "ingress-nginx",
            Self::Kine => "kine",
            Self::Kubernetes => "kubernetes",
            Self::LocalPathProvisioner => "local-path-provisioner",
            Self::MajorMinor => "major-minor",
            Self::MetricsServer => "metrics-server",
            Self::Multus => "multus",
            Self::Runc => "runc",
            Self::Sqlite => "sqlite",
            Self::Traefik => "traefik",
        }
    }

    /// CNI plugins shipped by `product`.
    pub fn cnis(product: Product) -> &'static [Self] {
        match product {
            Product::K3s => &[Self::Flannel],
            Product::Rke2 => &[Self::Canal, Self::Calico, Self::Cilium, Self::Multus],
        }
    }

    /// Where `product` declares this component's version.
    pub fn source(self, product: Product) -> Source {
        use Product::{K3s, Rke2};
        use Source::{
            BuildVersion, DockerfileChart, DockerfileLayer, GoDependency, Image, ReleaseVersion,
            Unavailable,
        };

        match (self, product) {
            (Self::Calico, Rke2) => Image("calico-node"),
            (Self::Canal, Rke2) => DockerfileChart("rke2-canal"),
            (Self::Cilium, Rke2) => Image("cilium-cilium"),
            (Self::Containerd, K3s) => BuildVersion("VERSION_CONTAINERD"),
            (Self::Containerd, Rke2) => DockerfileLayer("hardened-containerd"),
            (Self::CoreDns, K3s) => Image("coredns-coredns"),
            (Self::CoreDns, Rke2) => Image("hardened-coredns"),
            (Self::Etcd, K3s) => GoDependency("etcd/api/v3"),
            (Self::Etcd, Rke2) => BuildVersion("ETCD_VERSION"),
            (Self::Flannel, K3s) => GoDependency("flannel-io/flannel"),
            (Self::HelmController, _) => GoDependency("helm-controller"),
            (Self::IngressNginx, Rke2) => DockerfileChart("rke2-ingress-nginx"),
            (Self::Kine, K3s) => GoDependency("k3s-io/kine"),
            (Self::Kubernetes, _) => GoDependency("k8s.io/kubernetes"),
            (Self::LocalPathProvisioner, K3s) => Image("local-path-provisioner"),
            (Self::MajorMinor, _) => ReleaseVersion,
            (Self::MetricsServer, K3s) => Image("metrics-server"),
            (Self::MetricsServer, Rke2) => DockerfileChart("rke2-metrics-server"),
            (Self::Multus, Rke2) => DockerfileChart("rke2-multus"),
            (Self::Runc, K3s) => BuildVersion("VERSION_RUNC"),
            (Self::Sqlite, K3s) => Source::Sqlite,
            (Self::Traefik, K3s) => Image("traefik"),
            (
                Self::Calico
                | Self::Canal
                | Self::Cilium
                | Self::Flannel
                | Self::IngressNginx
                | Self::Kine
                | Self::LocalPathProvisioner
                | Self::Multus
                | Self::Runc
                | Self::Sqlite
                | Self::Traefik,
                _,
            ) => Unavailable,
        }
    }

    /// Builds the release notes link for `version` read from `source`.
    fn link(self, product: Product, source: Source, version: &str) -> Result<String, ChangelogError> {
        if let Source::DockerfileChart(chart) = source {
            return Ok(format!(
                "https://github.com/rancher/rke2-charts/tree/main-source/packages/{chart}"
            ));
        }

        let url = match self {
            Self::Calico | Self::Canal => format!(
                "https://projectcalico.docs.tigera.io/archive/{}/release-notes/#{}",
                major_minor(version)?,
                version.replace('.', "")
            ),
            Self::Cilium => format!("https://github.com/cilium/cilium/releases/tag/{version}"),
            Self::Containerd => {
                format!("https://github.com/k3s-io/containerd/releases/tag/{version}")
            }
            Self::CoreDns => format!(
                "https://github.com/coredns/coredns/releases/tag/{}",
                with_v(version)
            ),
            Self::Etcd => format!("https://github.com/k3s-io/etcd/releases/tag/{version}"),
            Self::Flannel => {
                format!("https://github.com/flannel-io/flannel/releases/tag/{version}")
            }
            Self::HelmController => {
                format!("https://github.com/k3s-io/helm-controller/releases/tag/{version}")
            }
            Self::IngressNginx => format!(
                "https://github.com/kubernetes/ingress-nginx/releases/tag/controller-{}",
                with_v(version)
            ),
            Self::Kine => format!("https://github.com/k3s-io/kine/releases/tag/{version}"),
            Self::Kubernetes => {
                let upstream = version.split('-').next().unwrap_or(version);
                format!(
                    "https://github.com/kubernetes/kubernetes/blob/master/CHANGELOG/CHANGELOG-{}.md#{}",
                    major_minor(version)?.trim_start_matches('v'),
                    upstream.replace('.', "")
                )
            }
            Self::LocalPathProvisioner => format!(
                "https://github.com/rancher/local-path-provisioner/releases/tag/{version}"
            ),
            Self::MajorMinor => match product {
                Product::K3s => format!("https://docs.k3s.io/release-notes/{version}.X"),
                Product::Rke2 => format!("https://docs.rke2.io/release-notes/{version}.X"),
            },
            Self::MetricsServer => format!(
                "https://github.com/kubernetes-sigs/metrics-server/releases/tag/{version}"
            ),
            Self::Multus => format!(
                "https://github.com/k8snetworkplumbingwg/multus-cni/releases/tag/{version}"
            ),
            Self::Runc => format!("https://github.com/opencontainers/runc/releases/tag/{version}"),
            Self::Sqlite => format!(
                "https://sqlite.org/releaselog/{}.html",
                version.replace('.', "_")
            ),
            Self::Traefik => format!(
                "https://github.com/traefik/traefik/releases/tag/{}",
                with_v(version)
            ),
        };
        Ok(url)
    }
}

/// Resolves `kind` for `product` from the bundle.
///
/// `release` is the product version being reported; only the major-minor
/// component reads it. Unavailable components resolve to an empty
/// [`Component`] without error.
pub fn resolve(
    files: &RepoFiles,
    product: Product,
    release: &str,
    kind: ComponentKind,
) -> Result<Component, ChangelogError> {
    let source = kind.source(product);
    if source == Source::Unavailable {
        return Ok(Component::default());
    }

    let version = source.read(files, release)?;
    let url = kind.link(product, source, &version)?;
    let fips_compliant =
        product == Product::Rke2 && source.key().is_some_and(|key| key.starts_with("hardened-"));

    Ok(Component {
        name: kind.name().to_string(),
        version,
        url,
        fips_compliant,
    })
}

/// Returns `vMAJOR.MINOR` for a `v`-prefixed semantic version.
///
/// The shorthands `vMAJOR` and `vMAJOR.MINOR` are accepted when they carry no
/// pre-release or build suffix, so `v3` yields `v3.0`.
pub fn major_minor(version: &str) -> Result<String, ChangelogError> {
    let invalid = || ChangelogError::InvalidVersion(version.to_string());
    let bare = version.strip_prefix('v').ok_or_else(invalid)?;

    let full = match bare.split('.').count() {
        1 if !bare.contains(['-', '+']) => format!("{bare}.0.0"),
        2 if !bare.contains(['-', '+']) => format!("{bare}.0"),
        _ => bare.to_string(),
    };
    let parsed = semver::Version::parse(&full).map_err(|_| invalid())?;
    Ok(format!("v{}.{}", parsed.major, parsed.minor))
}

fn with_v(version: &str) -> String {
    if version.starts_with('v') {
        version.to_string()
    } else {
        format!("v{version}")
    }
}

impl Repo {
    /// Resolves one component for this release.
    pub fn component(&self, kind: ComponentKind) -> Result<Component, ChangelogError> {
        resolve(&self.files, self.product, &self.version, kind)
    }

    /// Resolves every component, each independently failable.
    pub fn components(&self) -> Vec<(ComponentKind, Result<Component, ChangelogError>)> {
        ComponentKind::ALL
            .iter()
            .map(|&kind| (kind, self.component(kind)))
            .collect()
    }

    /// Calico CNI.
    pub fn calico(&self) -> Result<Component, ChangelogError> {
        self.component(ComponentKind::Calico)
    }

    /// Canal's Calico version.
    pub fn canal_calico(&self) -> Result<Component, ChangelogError> {
        self.component(ComponentKind::Canal)
    }

    /// Cilium CNI.
    pub fn cilium(&self) -> Result<Component, ChangelogError> {
        self.component(ComponentKind::Cilium)
    }

    /// Container runtime.
    pub fn containerd(&self) -> Result<Component, ChangelogError> {
        self.component(ComponentKind::Containerd)
    }

    /// Cluster DNS.
    pub fn coredns(&self) -> Result<Component, ChangelogError> {
        self.component(ComponentKind::CoreDns)
    }

    /// Cluster database.
    pub fn etcd(&self) -> Result<Component, ChangelogError> {
        self.component(ComponentKind::Etcd)
    }

    /// Flannel CNI.
    pub fn flannel(&self) -> Result<Component, ChangelogError> {
        self.component(ComponentKind::Flannel)
    }

    /// Helm chart controller.
    pub fn helm_controller(&self) -> Result<Component, ChangelogError> {
        self.component(ComponentKind::HelmController)
    }

    /// Ingress controller.
    pub fn ingress_nginx(&self) -> Result<Component, ChangelogError> {
        self.component(ComponentKind::IngressNginx)
    }

    /// Datastore shim.
    pub fn kine(&self) -> Result<Component, ChangelogError> {
        self.component(ComponentKind::Kine)
    }

    /// Upstream Kubernetes.
    pub fn kubernetes(&self) -> Result<Component, ChangelogError> {
        self.component(ComponentKind::Kubernetes)
    }

    /// Local path provisioner.
    pub fn local_path_provisioner(&self) -> Result<Component, ChangelogError> {
        self.component(ComponentKind::LocalPathProvisioner)
    }

    /// Release line of the product.
    pub fn major_minor(&self) -> Result<Component, ChangelogError> {
        self.component(ComponentKind::MajorMinor)
    }

    /// Metrics server.
    pub fn metrics_server(&self) -> Result<Component, ChangelogError> {
        self.component(ComponentKind::MetricsServer)
    }

    /// Multus meta CNI.
    pub fn multus(&self) -> Result<Component, ChangelogError> {
        self.component(ComponentKind::Multus)
    }

    /// Low-level container runtime.
    pub fn runc(&self) -> Result<Component, ChangelogError> {
        self.component(ComponentKind::Runc)
    }

    /// Embedded SQLite.
    pub fn sqlite(&self) -> Result<Component, ChangelogError> {
        self.component(ComponentKind::Sqlite)
    }

    /// Traefik ingress.
    pub fn traefik(&self) -> Result<Component, ChangelogError> {
        self.component(ComponentKind::Traefik)
    }

    /// CNI plugins shipped by this product line.
    pub fn cnis(&self) -> Result<Vec<Component>, ChangelogError> {
        ComponentKind::cnis(self.product)
            .iter()
            .map(|&kind| self.component(kind))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changelog::test_utils::{k3s_files, rke2_files};

    fn k3s_repo() -> Repo {
        Repo::from_parts(Product::K3s, "k3s-io", "v1.27.3+k3s1", Vec::new(), k3s_files())
    }

    fn rke2_repo() -> Repo {
        Repo::from_parts(Product::Rke2, "rancher", "v1.27.3+rke2r1", Vec::new(), rke2_files())
    }

    #[test]
    fn calico_link_uses_major_minor() {
        let calico = rke2_repo().calico().unwrap();
        assert_eq!(calico.name, "calico");
        assert_eq!(calico.version, "v3.25.1");
        assert_eq!(
            calico.url,
            "https://projectcalico.docs.tigera.io/archive/v3.25/release-notes/#v3251"
        );
        assert!(!calico.fips_compliant);
    }

    #[test]
    fn containerd_differs_per_product() {
        let k3s = k3s_repo().containerd().unwrap();
        assert_eq!(k3s.version, "v0.0.0");
        assert!(!k3s.fips_compliant);

        let rke2 = rke2_repo().containerd().unwrap();
        assert_eq!(rke2.version, "v1.7.1");
        assert_eq!(
            rke2.url,
            "https://github.com/k3s-io/containerd/releases/tag/v1.7.1"
        );
        assert!(rke2.fips_compliant);
    }

    #[test]
    fn etcd_differs_per_product() {
        let k3s = k3s_repo().etcd().unwrap();
        assert_eq!(k3s.name, "etcd");
        assert_eq!(k3s.version, "v3.5.7-k3s1");

        let rke2 = rke2_repo().etcd().unwrap();
        assert_eq!(rke2.version, "v3.5.7-k3s1");
        assert_eq!(
            rke2.url,
            "https://github.com/k3s-io/etcd/releases/tag/v3.5.7-k3s1"
        );
    }

    #[test]
    fn unavailable_components_are_empty() {
        let rke2 = rke2_repo();
        assert_eq!(rke2.kine().unwrap(), Component::default());
        assert_eq!(rke2.sqlite().unwrap(), Component::default());
        assert!(!rke2.traefik().unwrap().is_available());

        let k3s = k3s_repo();
        assert_eq!(k3s.multus().unwrap(), Component::default());
        assert_eq!(k3s.canal_calico().unwrap(), Component::default());
    }

    #[test]
    fn k3s_components() {
        let repo = k3s_repo();
        assert_eq!(repo.kine().unwrap().version, "v0.10.1");
        assert_eq!(repo.flannel().unwrap().version, "v0.22.0");
        assert_eq!(repo.helm_controller().unwrap().version, "v0.15.2");
        assert_eq!(repo.coredns().unwrap().version, "1.10.1");
        assert_eq!(
            repo.coredns().unwrap().url,
            "https://github.com/coredns/coredns/releases/tag/v1.10.1"
        );
        assert_eq!(repo.traefik().unwrap().version, "2.9.10");
        assert_eq!(repo.local_path_provisioner().unwrap().version, "v0.0.24");
        assert_eq!(repo.metrics_server().unwrap().version, "v0.6.3");
        assert_eq!(repo.runc().unwrap().version, "v0.0.0");

        let sqlite = repo.sqlite().unwrap();
        assert_eq!(sqlite.version, "3.42.0");
        assert_eq!(sqlite.url, "https://sqlite.org/releaselog/3_42_0.html");
    }

    #[test]
    fn rke2_components() {
        let repo = rke2_repo();
        assert_eq!(repo.cilium().unwrap().version, "v1.13.2");
        assert_eq!(repo.helm_controller().unwrap().version, "v0.15.0");

        let coredns = repo.coredns().unwrap();
        assert_eq!(coredns.version, "v1.10.1");
        assert!(coredns.fips_compliant);

        let nginx = repo.ingress_nginx().unwrap();
        assert_eq!(nginx.version, "4.6.100");
        assert_eq!(
            nginx.url,
            "https://github.com/rancher/rke2-charts/tree/main-source/packages/rke2-ingress-nginx"
        );
        assert_eq!(repo.metrics_server().unwrap().version, "2.11.100");
        assert_eq!(repo.multus().unwrap().version, "v3.9.3");
        assert_eq!(repo.canal_calico().unwrap().version, "v3.25.1");
    }

    #[test]
    fn kubernetes_link() {
        let k8s = k3s_repo().kubernetes().unwrap();
        assert_eq!(k8s.version, "v1.27.3-k3s1");
        assert_eq!(
            k8s.url,
            "https://github.com/kubernetes/kubernetes/blob/master/CHANGELOG/CHANGELOG-1.27.md#v1273"
        );
    }

    #[test]
    fn major_minor_of_release() {
        let k3s = k3s_repo().major_minor().unwrap();
        assert_eq!(k3s.version, "v1.27");
        assert_eq!(k3s.url, "https://docs.k3s.io/release-notes/v1.27.X");

        let rke2 = rke2_repo().major_minor().unwrap();
        assert_eq!(rke2.url, "https://docs.rke2.io/release-notes/v1.27.X");
    }

    #[test]
    fn invalid_release_version() {
        let repo = Repo::from_parts(Product::K3s, "k3s-io", "master", Vec::new(), k3s_files());
        assert_eq!(
            repo.major_minor().unwrap_err(),
            ChangelogError::InvalidVersion("master".to_string())
        );
    }

    #[test]
    fn calico_with_unparseable_version() {
        let mut files = rke2_files();
        files.image_list = b"rancher/mirrored-calico-node:latest\n".to_vec();
        let repo = Repo::from_parts(Product::Rke2, "rancher", "v1.27.3+rke2r1", Vec::new(), files);
        assert_eq!(
            repo.calico().unwrap_err(),
            ChangelogError::InvalidVersion("latest".to_string())
        );
    }

    #[test]
    fn missing_component_is_not_found() {
        let mut files = k3s_files();
        files.image_list = Vec::new();
        let repo = Repo::from_parts(Product::K3s, "k3s-io", "v1.27.3+k3s1", Vec::new(), files);
        assert!(repo.traefik().unwrap_err().is_not_found());
        // Other resolvers are unaffected.
        assert_eq!(repo.kine().unwrap().version, "v0.10.1");
    }

    #[test]
    fn cnis_per_product() {
        let k3s: Vec<_> = k3s_repo()
            .cnis()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(k3s, vec!["flannel"]);

        let rke2: Vec<_> = rke2_repo()
            .cnis()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(rke2, vec!["canal", "calico", "cilium", "multus"]);
    }

    #[test]
    fn components_covers_catalogue() {
        let results = rke2_repo().components();
        assert_eq!(results.len(), ComponentKind::ALL.len());
        assert!(results.iter().all(|(_, r)| r.is_ok()));
    }

    #[test]
    fn major_minor_parsing() {
        assert_eq!(major_minor("v3.25.1").unwrap(), "v3.25");
        assert_eq!(major_minor("v1.27.3+k3s1").unwrap(), "v1.27");
        assert_eq!(major_minor("v1.27.3-rc1+rke2r1").unwrap(), "v1.27");
        assert_eq!(major_minor("v3.25").unwrap(), "v3.25");
        assert_eq!(major_minor("v3").unwrap(), "v3.0");
        assert!(major_minor("3.25.1").is_err());
        assert!(major_minor("v3.25-rc1").is_err());
        assert!(major_minor("v3.x").is_err());
        assert!(major_minor("v").is_err());
    }
}
