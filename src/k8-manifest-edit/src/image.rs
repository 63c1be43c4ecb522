use serde_yaml::Value;
use tracing::debug;

const IMAGE: &str = "image";
const CONTAINER_IMAGE: &str = "containerImage";
/// lists whose entries carry an `image` reference
const IMAGE_LISTS: [&str; 3] = ["containers", "initContainers", "relatedImages"];

/// move image references from one registry to another, optionally with a new tag
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageRetarget {
    pub from_registry: String,
    pub to_registry: String,
    pub tag: Option<String>,
}

/// split reference into repository and `:tag` / `@digest` suffix
fn split_reference(reference: &str) -> (&str, &str) {
    if let Some(at) = reference.find('@') {
        return reference.split_at(at);
    }
    let name_start = reference.rfind('/').map_or(0, |slash| slash + 1);
    match reference[name_start..].find(':') {
        Some(colon) => reference.split_at(name_start + colon),
        None => (reference, ""),
    }
}

impl ImageRetarget {
    pub fn new<F, T>(from_registry: F, to_registry: T, tag: Option<String>) -> Self
    where
        F: Into<String>,
        T: Into<String>,
    {
        Self {
            from_registry: from_registry.into(),
            to_registry: to_registry.into(),
            tag,
        }
    }

    /// new reference if this one is under `from_registry` and would change
    pub fn retarget(&self, reference: &str) -> Option<String> {
        let from = self.from_registry.trim_end_matches('/');
        if from.is_empty() {
            return None;
        }
        let rest = reference.strip_prefix(from)?.strip_prefix('/')?;
        let (repository, suffix) = split_reference(rest);
        let suffix = match &self.tag {
            Some(tag) => format!(":{}", tag),
            None => suffix.to_owned(),
        };
        let retargeted = format!(
            "{}/{}{}",
            self.to_registry.trim_end_matches('/'),
            repository,
            suffix
        );
        (retargeted != reference).then_some(retargeted)
    }

    fn apply(&self, value: &mut Value) -> usize {
        let retargeted = match value.as_str().and_then(|reference| self.retarget(reference)) {
            Some(retargeted) => retargeted,
            None => return 0,
        };
        debug!(from = ?value.as_str(), to = %retargeted, "image retargeted");
        *value = Value::String(retargeted);
        1
    }

    fn apply_list(&self, list: &mut Value) -> usize {
        list.as_sequence_mut()
            .map(|entries| {
                entries
                    .iter_mut()
                    .filter_map(|entry| entry.get_mut(IMAGE))
                    .map(|image| self.apply(image))
                    .sum::<usize>()
            })
            .unwrap_or(0)
    }
}

/// Rewrite every image reference of a document: `image` of container,
/// init container and related image entries, plus `containerImage` annotations.
/// Returns the number of references changed.
pub fn retarget_images(document: &mut Value, retarget: &ImageRetarget) -> usize {
    match document {
        Value::Mapping(map) => map
            .iter_mut()
            .map(|(key, value)| match key.as_str() {
                Some(key) if IMAGE_LISTS.contains(&key) => retarget.apply_list(value),
                Some(CONTAINER_IMAGE) => retarget.apply(value),
                _ => retarget_images(value, retarget),
            })
            .sum(),
        Value::Sequence(entries) => entries
            .iter_mut()
            .map(|entry| retarget_images(entry, retarget))
            .sum(),
        _ => 0,
    }
}
