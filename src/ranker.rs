use std::borrow::Cow;
use std::sync::Arc;

/// Ordered class names, shared read-only once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelSet {
    labels: Arc<[String]>,
}

impl Default for LabelSet {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl LabelSet {
    pub fn new(labels: Vec<String>) -> Self {
        Self {
            labels: labels.into(),
        }
    }

    /// `"Class 0"`, `"Class 1"`, ... for models shipped without metadata.
    pub fn synthesized(count: usize) -> Self {
        Self::new((0..count).map(placeholder).collect())
    }

    /// Metadata labels when there are any, otherwise one placeholder per
    /// model output.
    pub fn resolve(labels: Option<Vec<String>>, output_width: usize) -> Self {
        match labels {
            Some(labels) if !labels.is_empty() => Self::new(labels),
            _ => Self::synthesized(output_width),
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn label(&self, index: usize) -> Cow<'_, str> {
        match self.labels.get(index) {
            Some(label) => Cow::Borrowed(label.as_str()),
            None => Cow::Owned(placeholder(index)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.labels.iter().map(String::as_str)
    }
}

fn placeholder(index: usize) -> String {
    format!("Class {}", index)
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub label: String,
    pub probability: f32,
}

/// Predictions sorted by probability, highest first. Read-only once built.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RankedPredictions(Vec<Prediction>);

impl RankedPredictions {
    pub fn top(&self) -> Option<&Prediction> {
        self.0.first()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Prediction> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[Prediction] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a RankedPredictions {
    type Item = &'a Prediction;
    type IntoIter = std::slice::Iter<'a, Prediction>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Pairs every score with its label and sorts descending. Equal scores keep
/// their index order.
pub fn rank(probabilities: &[f32], labels: &LabelSet) -> RankedPredictions {
    let mut predictions: Vec<Prediction> = probabilities
        .iter()
        .enumerate()
        .map(|(index, &probability)| Prediction {
            label: labels.label(index).into_owned(),
            probability,
        })
        .collect();

    predictions.sort_by(|a, b| b.probability.total_cmp(&a.probability));

    RankedPredictions(predictions)
}
