use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use crate::TYPE_ARRAY;

/// ordered property map, document order drives descriptor order
pub type Properties = IndexMap<String, SchemaProps>;

/// CustomResourceDefinition as read from a bundle.
/// Both `apiextensions.k8s.io/v1beta1` (single `spec.validation`) and
/// `apiextensions.k8s.io/v1` (per version `schema`) layouts are accepted.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CustomResourceDefinition {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<CrdMetadata>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<CrdSpec>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct CrdMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CrdSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub names: Option<CrdNames>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation: Option<CrdValidation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub versions: Vec<CrdVersion>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct CrdNames {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plural: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub singular: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct CrdValidation {
    #[serde(rename = "openAPIV3Schema", skip_serializing_if = "Option::is_none")]
    pub open_api_v3_schema: Option<SchemaProps>,
}

#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct CrdVersion {
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub served: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<CrdValidation>,
}

/// OpenAPI v3 schema node. Keys other than these are ignored.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq)]
pub struct SchemaProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<SchemaProps>>,
}

impl SchemaProps {
    pub fn is_array(&self) -> bool {
        self.type_.as_deref() == Some(TYPE_ARRAY)
    }

    /// direct child property
    pub fn property(&self, name: &str) -> Option<&SchemaProps> {
        self.properties.as_ref().and_then(|props| props.get(name))
    }

    /// children reachable through an array of objects.
    /// Looks at `items.properties` first, then the node's own `properties`.
    /// Nodes that are not arrays have no nested children.
    pub fn nested_properties(&self) -> Option<&Properties> {
        if !self.is_array() {
            return None;
        }
        self.items
            .as_ref()
            .and_then(|items| items.properties.as_ref())
            .or(self.properties.as_ref())
    }
}

impl CustomResourceDefinition {
    /// resource name, `metadata.name`
    pub fn declared_name(&self) -> Option<&str> {
        self.metadata.as_ref().and_then(|meta| meta.name.as_deref())
    }

    /// `spec.version`, then the version flagged as storage
    pub fn declared_version(&self) -> Option<&str> {
        let spec = self.spec.as_ref()?;
        spec.version.as_deref().or_else(|| {
            spec.versions
                .iter()
                .find(|version| version.storage == Some(true))
                .map(|version| version.name.as_str())
        })
    }

    /// `spec.names.kind`, then the top level kind
    pub fn declared_kind(&self) -> Option<&str> {
        self.spec
            .as_ref()
            .and_then(|spec| spec.names.as_ref())
            .and_then(|names| names.kind.as_deref())
            .or(self.kind.as_deref())
    }

    /// root `openAPIV3Schema` of the declared version
    pub fn root_schema(&self) -> Option<&SchemaProps> {
        let spec = self.spec.as_ref()?;
        if let Some(schema) = spec
            .validation
            .as_ref()
            .and_then(|validation| validation.open_api_v3_schema.as_ref())
        {
            return Some(schema);
        }

        let version = match self.declared_version() {
            Some(declared) => spec
                .versions
                .iter()
                .find(|version| version.name == declared),
            None => None,
        }
        .or_else(|| spec.versions.first())?;

        version
            .schema
            .as_ref()
            .and_then(|validation| validation.open_api_v3_schema.as_ref())
    }

    /// top level sub tree such as `spec` or `status`
    pub fn sub_tree(&self, name: &str) -> Option<&SchemaProps> {
        self.root_schema().and_then(|root| root.property(name))
    }
}

#[cfg(test)]
mod test {

    use super::CustomResourceDefinition;

    const LEGACY_CRD: &str = r#"
apiVersion: apiextensions.k8s.io/v1beta1
kind: CustomResourceDefinition
metadata:
  name: scaleclusters.csi.example.com
spec:
  group: csi.example.com
  names:
    kind: ScaleCluster
    plural: scaleclusters
  version: v1alpha1
  validation:
    openAPIV3Schema:
      properties:
        spec:
          properties:
            clusters:
              type: array
              items:
                type: object
                properties:
                  id:
                    description: cluster id
                  primary:
                    type: boolean
            attacher:
              description: attacher image
"#;

    const V1_CRD: &str = r#"
apiVersion: apiextensions.k8s.io/v1
kind: CustomResourceDefinition
metadata:
  name: scaleclusters.csi.example.com
spec:
  names:
    kind: ScaleCluster
  versions:
  - name: v1alpha1
    served: true
    storage: false
    schema:
      openAPIV3Schema:
        properties:
          spec:
            description: old
  - name: v1
    served: true
    storage: true
    schema:
      openAPIV3Schema:
        properties:
          spec:
            description: current
"#;

    #[test]
    fn test_decode_legacy_crd() {
        let crd: CustomResourceDefinition = serde_yaml::from_str(LEGACY_CRD).expect("parse");

        assert_eq!(crd.declared_name(), Some("scaleclusters.csi.example.com"));
        assert_eq!(crd.declared_version(), Some("v1alpha1"));
        assert_eq!(crd.declared_kind(), Some("ScaleCluster"));

        let spec = crd.sub_tree("spec").expect("spec");
        let names: Vec<&String> = spec.properties.as_ref().expect("props").keys().collect();
        assert_eq!(names, vec!["clusters", "attacher"]);

        let clusters = spec.property("clusters").expect("clusters");
        let nested = clusters.nested_properties().expect("nested");
        assert_eq!(nested.keys().collect::<Vec<_>>(), vec!["id", "primary"]);
        assert_eq!(nested["id"].description.as_deref(), Some("cluster id"));

        assert!(crd.sub_tree("status").is_none());
    }

    #[test]
    fn test_plain_object_has_no_nested_properties() {
        let crd: CustomResourceDefinition = serde_yaml::from_str(LEGACY_CRD).expect("parse");
        let root = crd.root_schema().expect("root");
        let spec = root.property("spec").expect("spec");
        assert!(spec.nested_properties().is_none());
    }

    #[test]
    fn test_v1_crd_uses_storage_version() {
        let crd: CustomResourceDefinition = serde_yaml::from_str(V1_CRD).expect("parse");

        assert_eq!(crd.declared_version(), Some("v1"));
        let spec = crd.sub_tree("spec").expect("spec");
        assert_eq!(spec.description.as_deref(), Some("current"));
    }

    #[test]
    fn test_kind_falls_back_to_top_level() {
        let crd: CustomResourceDefinition =
            serde_yaml::from_str("kind: Widget\nmetadata:\n  name: widgets\n").expect("parse");

        assert_eq!(crd.declared_kind(), Some("Widget"));
        assert!(crd.declared_version().is_none());
        assert!(crd.root_schema().is_none());
    }
}
