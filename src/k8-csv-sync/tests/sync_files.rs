use std::fs;
use std::path::Path;
use std::path::PathBuf;

use tempfile::TempDir;

use k8_csv_sync::locate_manifest;
use k8_csv_sync::sync_files;
use k8_csv_sync::SyncConfig;
use k8_csv_sync::SyncError;
use k8_olm_types::ClusterServiceVersion;

const CRD: &str = include_str!("../data/crd.yaml");
const CRD_BAR: &str = include_str!("../data/crd-bar.yaml");
const CSV: &str = include_str!("../data/csv.yaml");

const EMPTY_CSV: &str = r#"apiVersion: operators.coreos.com/v1alpha1
kind: ClusterServiceVersion
metadata:
  name: csi-scale-operator.v1.0.0
spec:
  customresourcedefinitions:
    owned: []
"#;

fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("mkdir");
    }
    fs::write(&path, content).expect("write");
    path
}

fn read_csv(path: &Path) -> ClusterServiceVersion {
    serde_yaml::from_str(&fs::read_to_string(path).expect("read")).expect("csv")
}

#[test]
fn test_sync_files_in_place() {
    fluvio_future::subscriber::init_tracer(None);

    //given
    let dir = TempDir::new().expect("tmp");
    let crd = write(dir.path(), "crd.yaml", CRD);
    let csv = write(dir.path(), "operator.clusterserviceversion.yaml", CSV);

    //when
    let written = sync_files(&crd, &csv, &SyncConfig::default()).expect("sync");

    //then
    assert!(written);
    let synced = read_csv(&csv);
    let owned = synced
        .find_owned("csiscaleoperators.csi.example.com")
        .expect("owned");
    assert_eq!(owned.version.as_deref(), Some("v1"));
    let specs = owned.spec_descriptors.as_ref().expect("spec");
    assert_eq!(specs.len(), 10);
    assert!(specs.iter().all(|d| d.path != "oldField"));

    let first_pass = fs::read_to_string(&csv).expect("read");
    assert!(sync_files(&crd, &csv, &SyncConfig::default()).expect("sync again"));
    assert_eq!(fs::read_to_string(&csv).expect("read"), first_pass);
}

#[test]
fn test_curation_survives_resync() {
    //given
    let dir = TempDir::new().expect("tmp");
    let crd = write(dir.path(), "crd.yaml", CRD);
    let csv = write(dir.path(), "csv.yaml", CSV);
    sync_files(&crd, &csv, &SyncConfig::default()).expect("sync");

    // curate a freshly derived descriptor by hand
    let mut curated = read_csv(&csv);
    let descriptor = curated.owned_mut()[0]
        .spec_descriptors
        .as_mut()
        .expect("spec")
        .iter_mut()
        .find(|d| d.path == "clusters.restApi.guiHost")
        .expect("guiHost");
    descriptor.display_name = Some("GUI Host".to_owned());
    descriptor.x_descriptors = Some(vec!["urn:alm:descriptor:com.tectonic.ui:text".to_owned()]);
    fs::write(&csv, serde_yaml::to_string(&curated).expect("yaml")).expect("write");

    //when
    sync_files(&crd, &csv, &SyncConfig::default()).expect("resync");

    //then
    let synced = read_csv(&csv);
    let specs = synced.owned()[0].spec_descriptors.as_ref().expect("spec");
    let gui_host = specs
        .iter()
        .find(|d| d.path == "clusters.restApi.guiHost")
        .expect("guiHost");
    assert_eq!(gui_host.display_name.as_deref(), Some("GUI Host"));
    assert_eq!(
        gui_host.x_descriptors,
        Some(vec!["urn:alm:descriptor:com.tectonic.ui:text".to_owned()])
    );
    let attacher = specs.iter().find(|d| d.path == "attacher").expect("attacher");
    assert_eq!(attacher.display_name.as_deref(), Some("Attacher Image"));
}

#[test]
fn test_new_resource_is_appended() {
    let dir = TempDir::new().expect("tmp");
    let crd = write(dir.path(), "crd-bar.yaml", CRD_BAR);
    let csv = write(dir.path(), "csv.yaml", EMPTY_CSV);

    sync_files(&crd, &csv, &SyncConfig::default()).expect("sync");

    let synced = read_csv(&csv);
    assert_eq!(synced.owned().len(), 1);
    let owned = &synced.owned()[0];
    assert_eq!(owned.name, "scalebackups.csi.example.com");
    assert_eq!(owned.kind.as_deref(), Some("ScaleBackup"));
    assert_eq!(owned.version.as_deref(), Some("v1beta1"));
    assert_eq!(owned.display_name.as_deref(), Some("scalebackups.csi.example.com"));
    let status = owned.status_descriptors.as_ref().expect("status");
    assert_eq!(status[0].path, "lastRun");
}

#[test]
fn test_missing_input() {
    let dir = TempDir::new().expect("tmp");
    let csv = write(dir.path(), "csv.yaml", CSV);
    let missing = dir.path().join("no-crd.yaml");

    let err = sync_files(&missing, &csv, &SyncConfig::default()).expect_err("missing");

    match err {
        SyncError::MissingInput(path) => assert_eq!(path, missing),
        other => panic!("unexpected error: {}", other),
    }
    assert_eq!(fs::read_to_string(&csv).expect("read"), CSV);
}

#[test]
fn test_empty_schema_leaves_manifest() {
    let dir = TempDir::new().expect("tmp");
    let crd = write(dir.path(), "crd.yaml", "");
    let csv = write(dir.path(), "csv.yaml", CSV);

    let written = sync_files(&crd, &csv, &SyncConfig::default()).expect("sync");

    assert!(!written);
    assert_eq!(fs::read_to_string(&csv).expect("read"), CSV);
}

#[test]
fn test_locate_manifest() {
    let dir = TempDir::new().expect("tmp");
    let expected = write(
        dir.path(),
        "1.0.0/manifests/csi-scale-operator.v1.0.0.clusterserviceversion.yaml",
        CSV,
    );
    write(dir.path(), "1.0.0/manifests/crd.yaml", CRD);

    assert_eq!(locate_manifest(dir.path(), "1.0.0").expect("locate"), expected);
    assert!(matches!(
        locate_manifest(dir.path(), "2.0.0"),
        Err(SyncError::MissingInput(_))
    ));

    write(
        dir.path(),
        "1.0.0/csi-scale-operator.clusterserviceversion.yaml",
        CSV,
    );
    assert!(matches!(
        locate_manifest(dir.path(), "1.0.0"),
        Err(SyncError::AmbiguousManifest(found)) if found.len() == 2
    ));
}
