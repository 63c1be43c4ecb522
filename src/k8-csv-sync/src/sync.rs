use tracing::debug;
use tracing::info;

use k8_olm_types::ClusterServiceVersion;
use k8_olm_types::CustomResourceDefinition;
use k8_olm_types::OwnedCrd;

use crate::derive_descriptors;
use crate::Curation;
use crate::SyncConfig;

pub const SPEC: &str = "spec";
pub const STATUS: &str = "status";

/// Replace the descriptors of the owned record matching the CRD's name with
/// descriptors derived from its schema. A record is appended when none
/// matches. Records of other resources are left alone.
///
/// A CRD without a name can't be matched and leaves the manifest as is.
pub fn synchronize(
    crd: &CustomResourceDefinition,
    mut csv: ClusterServiceVersion,
    config: &SyncConfig,
) -> ClusterServiceVersion {
    let name = match crd.declared_name() {
        Some(name) => name,
        None => {
            info!("schema declares no resource name, nothing to synchronize");
            return csv;
        }
    };

    let position = csv.owned_index().get(name).copied();

    let (spec_descriptors, status_descriptors) = {
        let existing = position.map(|position| &csv.owned()[position]);
        let spec_curation = Curation::new(existing.and_then(|owned| owned.spec_descriptors.as_deref()));
        let status_curation =
            Curation::new(existing.and_then(|owned| owned.status_descriptors.as_deref()));
        debug!(
            resource = name,
            spec_curated = spec_curation.len(),
            status_curated = status_curation.len(),
            "curated descriptors"
        );
        (
            derive_descriptors(crd.sub_tree(SPEC), &spec_curation),
            derive_descriptors(crd.sub_tree(STATUS), &status_curation),
        )
    };

    let version = crd
        .declared_version()
        .unwrap_or(config.default_version.as_str())
        .to_owned();

    info!(
        resource = name,
        %version,
        spec = spec_descriptors.len(),
        status = status_descriptors.len(),
        "synchronizing descriptors"
    );

    let owned = csv.owned_mut();
    match position {
        Some(position) => {
            let record = &mut owned[position];
            record.spec_descriptors = Some(spec_descriptors);
            record.status_descriptors = Some(status_descriptors);
            record.version = Some(version);
        }
        None => {
            debug!(resource = name, "no owned record, appending");
            owned.push(OwnedCrd {
                name: name.to_owned(),
                kind: Some(
                    crd.declared_kind()
                        .unwrap_or(config.placeholder_kind.as_str())
                        .to_owned(),
                ),
                version: Some(version),
                display_name: Some(name.to_owned()),
                description: Some(config.placeholder_description.clone()),
                spec_descriptors: Some(spec_descriptors),
                status_descriptors: config
                    .insert_status_descriptors
                    .then_some(status_descriptors),
                ..Default::default()
            });
        }
    }

    csv
}
