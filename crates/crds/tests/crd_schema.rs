use crds::{Static, StaticSpec};
use kube::CustomResourceExt;
use serde_json::json;

#[test]
fn crd_identity() {
    let crd = Static::crd();
    assert_eq!(crd.metadata.name.as_deref(), Some("statics.website.example.com"));
    assert_eq!(crd.spec.group, "website.example.com");
    assert_eq!(crd.spec.names.kind, "Static");
    assert_eq!(crd.spec.scope, "Namespaced");

    let version = &crd.spec.versions[0];
    assert_eq!(version.name, "v1alpha1");
    let subresources = version.subresources.as_ref().unwrap();
    assert!(subresources.status.is_some());
}

#[test]
fn spec_roundtrip() {
    let original = StaticSpec {
        disk_size: "1Mi".into(),
        source: "gs://my-bucket/".into(),
        min_replicas: 2,
        max_replicas: 4,
    };
    let j = serde_json::to_value(&original).unwrap();
    assert_eq!(
        j,
        json!({"diskSize": "1Mi", "source": "gs://my-bucket/", "minReplicas": 2, "maxReplicas": 4})
    );
    let back: StaticSpec = serde_json::from_value(j).unwrap();
    assert_eq!(back, original);
}

#[test]
fn api_version() {
    let site = Static::new("my-static", StaticSpec {
        disk_size: "1Mi".into(),
        source: "gs://my-bucket/".into(),
        min_replicas: 1,
        max_replicas: 1,
    });
    let j = serde_json::to_value(&site).unwrap();
    assert_eq!(j["apiVersion"], "website.example.com/v1alpha1");
    assert_eq!(j["kind"], "Static");
}
