use std::collections::HashMap;

use serde::Deserialize;
use serde::Serialize;
use serde_yaml::Mapping;

/// ClusterServiceVersion of an operator bundle.
/// Only the parts touched by the tooling are typed, every other key is kept
/// in `other` so the document survives a read/write cycle.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClusterServiceVersion {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CsvMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<CsvSpec>,
    #[serde(flatten)]
    pub other: Mapping,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct CsvMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub other: Mapping,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct CsvSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customresourcedefinitions: Option<CustomResourceDefinitions>,
    #[serde(flatten)]
    pub other: Mapping,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct CustomResourceDefinitions {
    #[serde(default)]
    pub owned: Vec<OwnedCrd>,
    #[serde(flatten)]
    pub other: Mapping,
}

/// entry of `spec.customresourcedefinitions.owned`
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OwnedCrd {
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec_descriptors: Option<Vec<Descriptor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_descriptors: Option<Vec<Descriptor>>,
    #[serde(flatten)]
    pub other: Mapping,
}

/// UI descriptor of a single property, keyed by dotted `path`
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    #[serde(default)]
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(rename = "x-descriptors", skip_serializing_if = "Option::is_none")]
    pub x_descriptors: Option<Vec<String>>,
    #[serde(flatten)]
    pub other: Mapping,
}

impl Descriptor {
    pub fn new<S, D>(path: S, description: D, display_name: String, x_descriptors: Vec<String>) -> Self
    where
        S: Into<String>,
        D: Into<String>,
    {
        Self {
            path: path.into(),
            description: Some(description.into()),
            display_name: Some(display_name),
            x_descriptors: Some(x_descriptors),
            other: Mapping::new(),
        }
    }

    /// display name, if one was set and is not blank
    pub fn curated_display_name(&self) -> Option<&str> {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
    }
}

impl ClusterServiceVersion {
    pub fn name(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|meta| meta.name.as_deref())
    }

    /// owned records, empty if the manifest has none
    pub fn owned(&self) -> &[OwnedCrd] {
        self.spec
            .as_ref()
            .and_then(|spec| spec.customresourcedefinitions.as_ref())
            .map(|crds| crds.owned.as_slice())
            .unwrap_or_default()
    }

    /// owned records, creating the enclosing sections when missing
    pub fn owned_mut(&mut self) -> &mut Vec<OwnedCrd> {
        &mut self
            .spec
            .get_or_insert_with(CsvSpec::default)
            .customresourcedefinitions
            .get_or_insert_with(CustomResourceDefinitions::default)
            .owned
    }

    /// position of each owned record by name, first one wins on duplicates
    pub fn owned_index(&self) -> HashMap<&str, usize> {
        let mut index = HashMap::new();
        for (position, owned) in self.owned().iter().enumerate() {
            index.entry(owned.name.as_str()).or_insert(position);
        }
        index
    }

    pub fn find_owned(&self, name: &str) -> Option<&OwnedCrd> {
        self.owned().iter().find(|owned| owned.name == name)
    }
}
