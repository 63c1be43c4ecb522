use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde_yaml::Value;
use tracing::debug;

use crate::EditError;

const SEPARATOR: &str = "---\n";

/// read all documents of a `---` separated stream, empty documents are dropped
pub fn read_documents(text: &str) -> Result<Vec<Value>, EditError> {
    let mut documents = vec![];
    for document in serde_yaml::Deserializer::from_str(text) {
        let value = Value::deserialize(document)?;
        if !value.is_null() {
            documents.push(value);
        }
    }
    Ok(documents)
}

pub fn write_documents(documents: &[Value]) -> Result<String, EditError> {
    let mut out = String::new();
    for (index, document) in documents.iter().enumerate() {
        if index > 0 {
            out.push_str(SEPARATOR);
        }
        out.push_str(&serde_yaml::to_string(document)?);
    }
    Ok(out)
}

/// `<kind>_<name>` in lower case, if the document has both
fn document_stem(document: &Value) -> Option<String> {
    let kind = document.get("kind").and_then(Value::as_str)?;
    let name = document
        .get("metadata")
        .and_then(|meta| meta.get("name"))
        .and_then(Value::as_str)?;
    Some(format!("{}_{}", kind, name).to_lowercase())
}

/// pair each document with a file name, repeated names get a numeric suffix
pub fn split_documents(documents: Vec<Value>) -> Vec<(String, Value)> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    documents
        .into_iter()
        .enumerate()
        .map(|(index, document)| {
            let stem = document_stem(&document).unwrap_or_else(|| format!("document-{}", index));
            let count = seen.entry(stem.clone()).or_insert(0);
            *count += 1;
            let file_name = if *count == 1 {
                format!("{}.yaml", stem)
            } else {
                format!("{}-{}.yaml", stem, count)
            };
            (file_name, document)
        })
        .collect()
}

/// write each document of the stream into its own file under `dir`
pub fn write_split<P: AsRef<Path>>(text: &str, dir: P) -> Result<Vec<PathBuf>, EditError> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut written = vec![];
    for (file_name, document) in split_documents(read_documents(text)?) {
        let path = dir.join(file_name);
        fs::write(&path, serde_yaml::to_string(&document)?)?;
        debug!(path = %path.display(), "document written");
        written.push(path);
    }
    Ok(written)
}
