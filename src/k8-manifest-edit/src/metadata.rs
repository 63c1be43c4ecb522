use serde_yaml::Mapping;
use serde_yaml::Value;
use tracing::trace;

const METADATA: &str = "metadata";
const LABELS: &str = "labels";
const FINALIZERS: &str = "finalizers";

/// mapping under `key`, replaced with an empty one if missing or not a mapping
fn child_mapping<'a>(parent: &'a mut Mapping, key: &str) -> Option<&'a mut Mapping> {
    let child = parent
        .entry(Value::from(key))
        .or_insert(Value::Mapping(Mapping::new()));
    if !child.is_mapping() {
        *child = Value::Mapping(Mapping::new());
    }
    child.as_mapping_mut()
}

/// Set labels in `metadata.labels` of a Kubernetes object.
/// Documents without a `kind` are not objects and are left alone.
/// Returns true if any label was added or changed.
pub fn add_labels(document: &mut Value, labels: &[(String, String)]) -> bool {
    if document.get("kind").is_none() {
        return false;
    }
    let labels_map = match document
        .as_mapping_mut()
        .and_then(|root| child_mapping(root, METADATA))
        .and_then(|metadata| child_mapping(metadata, LABELS))
    {
        Some(map) => map,
        None => return false,
    };

    let mut changed = false;
    for (key, value) in labels {
        let value = Value::from(value.as_str());
        let previous = labels_map.insert(Value::from(key.as_str()), value.clone());
        if previous.as_ref() != Some(&value) {
            trace!(%key, "label set");
            changed = true;
        }
    }
    changed
}

/// Remove `metadata.finalizers`. Returns true if there were any.
pub fn strip_finalizers(document: &mut Value) -> bool {
    let metadata = match document.get_mut(METADATA).and_then(Value::as_mapping_mut) {
        Some(metadata) => metadata,
        None => return false,
    };
    let before = metadata.len();
    // rebuilt to keep the order of the remaining keys
    *metadata = std::mem::take(metadata)
        .into_iter()
        .filter(|(key, _)| key.as_str() != Some(FINALIZERS))
        .collect();
    metadata.len() != before
}
