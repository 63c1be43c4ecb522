use std::collections::HashMap;
use std::collections::HashSet;
use std::collections::VecDeque;

use tracing::debug;
use tracing::trace;

use k8_olm_types::Descriptor;
use k8_olm_types::Properties;
use k8_olm_types::SchemaProps;

/// curated descriptors of an existing owned record, by path
#[derive(Debug, Default)]
pub struct Curation<'a> {
    by_path: HashMap<&'a str, &'a Descriptor>,
}

impl<'a> Curation<'a> {
    pub fn new(descriptors: Option<&'a [Descriptor]>) -> Self {
        let by_path = descriptors
            .unwrap_or_default()
            .iter()
            .map(|descriptor| (descriptor.path.as_str(), descriptor))
            .collect();
        Self { by_path }
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    /// build descriptor for path, carrying forward display name and x-descriptors
    pub fn descriptor(&self, path: &str, description: &str) -> Descriptor {
        let curated = self.by_path.get(path);
        let display_name = curated
            .and_then(|descriptor| descriptor.curated_display_name())
            .unwrap_or_else(|| last_segment(path));
        let x_descriptors = curated
            .and_then(|descriptor| descriptor.x_descriptors.clone())
            .unwrap_or_default();

        Descriptor::new(path, description, display_name.to_owned(), x_descriptors)
    }
}

fn last_segment(path: &str) -> &str {
    path.rsplit('.').next().unwrap_or(path)
}

/// walk dotted path from the sub tree's own properties
fn resolve<'a>(properties: &'a Properties, path: &str) -> Option<&'a SchemaProps> {
    let mut segments = path.split('.');
    let mut node = properties.get(segments.next()?)?;
    for segment in segments {
        node = node.nested_properties()?.get(segment)?;
    }
    Some(node)
}

/// Flatten a schema sub tree (`spec` or `status`) into descriptors.
///
/// Paths are visited breadth first: the sub tree's properties in document
/// order, then for every array of objects its item properties as `parent.child`.
/// The output order is the visiting order.
pub fn derive_descriptors(sub_tree: Option<&SchemaProps>, curation: &Curation) -> Vec<Descriptor> {
    let properties = match sub_tree.and_then(|node| node.properties.as_ref()) {
        Some(properties) => properties,
        None => return vec![],
    };

    let mut queue: VecDeque<String> = properties.keys().cloned().collect();
    let mut seen = HashSet::new();
    let mut descriptors = vec![];

    while let Some(path) = queue.pop_front() {
        let node = match resolve(properties, &path) {
            Some(node) => node,
            None => {
                debug!(%path, "property can't be resolved, skipping");
                continue;
            }
        };

        if let Some(nested) = node.nested_properties() {
            queue.extend(nested.keys().map(|child| format!("{}.{}", path, child)));
        }

        if !seen.insert(path.clone()) {
            continue;
        }

        trace!(%path, "descriptor");
        let description = node.description.as_deref().unwrap_or_default();
        descriptors.push(curation.descriptor(&path, description));
    }

    descriptors
}
