use serde::Deserialize;

/// Exporters disagree on the key, so all three spellings are accepted.
#[derive(Debug, Default, Deserialize)]
struct Metadata {
    labels: Option<Vec<String>>,
    #[serde(rename = "classNames")]
    class_names: Option<Vec<String>>,
    classes: Option<Vec<String>>,
}

/// Class names from a metadata document, or `None` when the document is not
/// valid JSON or carries no labels.
pub fn parse_labels(json: &str) -> Result<Option<Vec<String>>, serde_json::Error> {
    let metadata: Metadata = serde_json::from_str(json)?;

    let labels = [metadata.labels, metadata.class_names, metadata.classes]
        .into_iter()
        .flatten()
        .find(|labels| !labels.is_empty());

    Ok(labels)
}
