//! Gold-standard datasets and their descriptive metadata.

use crate::{Error, Marking, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A gold-standard dataset: document texts with index-aligned gold markings.
///
/// `document_texts()` and `gold_markings()` must have the same length as
/// `size()`. The task runner checks this before evaluating and reports a
/// configuration failure otherwise.
pub trait Dataset: Send + Sync {
    /// Dataset name.
    fn name(&self) -> &str;

    /// Number of documents.
    fn size(&self) -> usize;

    /// Document texts in dataset order.
    fn document_texts(&self) -> Vec<&str>;

    /// Gold markings, one set per document, in dataset order.
    fn gold_markings(&self) -> Vec<&[Marking]>;

    /// Texts and gold sets, checked to both hold exactly `size()` entries.
    fn aligned_documents(&self) -> Result<(Vec<&str>, Vec<&[Marking]>)> {
        let texts = self.document_texts();
        let gold = self.gold_markings();
        if texts.len() != self.size() || gold.len() != self.size() {
            return Err(Error::DatasetMismatch {
                dataset: self.name().to_string(),
                size: self.size(),
                texts: texts.len(),
                gold: gold.len(),
            });
        }
        Ok((texts, gold))
    }
}

/// A document with its gold markings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Document text.
    pub text: String,
    /// Gold markings (or recorded system output).
    #[serde(default)]
    pub markings: Vec<Marking>,
}

impl Document {
    /// Create a document.
    #[must_use]
    pub fn new(text: impl Into<String>, markings: Vec<Marking>) -> Self {
        Self {
            text: text.into(),
            markings,
        }
    }
}

/// On-disk JSON layout shared by gold datasets and recorded system output.
///
/// ```json
/// {
///   "name": "KORE50",
///   "documents": [
///     {"text": "David and Victoria named their children ...",
///      "markings": [{"start": 0, "length": 5, "entity": "David_Beckham"}]}
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentFile {
    /// Dataset or system name.
    pub name: String,
    /// Documents in order.
    pub documents: Vec<Document>,
}

impl DocumentFile {
    /// Parse from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&content)
    }
}

/// A dataset held entirely in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataset {
    name: String,
    documents: Vec<Document>,
}

impl InMemoryDataset {
    /// Create from documents.
    #[must_use]
    pub fn new(name: impl Into<String>, documents: Vec<Document>) -> Self {
        Self {
            name: name.into(),
            documents,
        }
    }

    /// Load from a JSON document file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = DocumentFile::load(path)?;
        Ok(Self::new(file.name, file.documents))
    }

    /// Borrow the documents.
    pub fn documents(&self) -> &[Document] {
        &self.documents
    }
}

impl Dataset for InMemoryDataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn size(&self) -> usize {
        self.documents.len()
    }

    fn document_texts(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.text.as_str()).collect()
    }

    fn gold_markings(&self) -> Vec<&[Marking]> {
        self.documents.iter().map(|d| d.markings.as_slice()).collect()
    }
}

/// A numeric descriptor of a dataset, used as a correlation axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetadataDimension {
    /// Number of documents.
    NumberOfDocuments,
    /// Average document length in characters.
    AvgDocumentLength,
    /// Number of gold entities.
    NumberOfEntities,
    /// Gold entities per document.
    EntitiesPerDocument,
    /// Gold entities per whitespace token.
    EntitiesPerToken,
    /// Number of person entities.
    AmountOfPersons,
    /// Number of organization entities.
    AmountOfOrganizations,
    /// Number of location entities.
    AmountOfLocations,
    /// Number of other entities.
    AmountOfOthers,
}

impl MetadataDimension {
    /// All dimensions, in table column order.
    pub fn all() -> &'static [MetadataDimension] {
        &[
            MetadataDimension::NumberOfDocuments,
            MetadataDimension::AvgDocumentLength,
            MetadataDimension::NumberOfEntities,
            MetadataDimension::EntitiesPerDocument,
            MetadataDimension::EntitiesPerToken,
            MetadataDimension::AmountOfPersons,
            MetadataDimension::AmountOfOrganizations,
            MetadataDimension::AmountOfLocations,
            MetadataDimension::AmountOfOthers,
        ]
    }

    /// Column heading used in correlation tables.
    #[must_use]
    pub fn heading(&self) -> &'static str {
        match self {
            MetadataDimension::NumberOfDocuments => "number of documents",
            MetadataDimension::AvgDocumentLength => "avg. document length",
            MetadataDimension::NumberOfEntities => "number of entities",
            MetadataDimension::EntitiesPerDocument => "entities per document",
            MetadataDimension::EntitiesPerToken => "entities per token",
            MetadataDimension::AmountOfPersons => "amount of persons",
            MetadataDimension::AmountOfOrganizations => "amount of organizations",
            MetadataDimension::AmountOfLocations => "amount of locations",
            MetadataDimension::AmountOfOthers => "amount of others",
        }
    }
}

/// Descriptive statistics of a dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatasetMetaData {
    /// Number of documents
    pub number_of_documents: usize,
    /// Average document length (characters)
    pub avg_document_length: f64,
    /// Number of gold entities
    pub number_of_entities: usize,
    /// Entities per document
    pub entities_per_doc: f64,
    /// Entities per whitespace token
    pub entities_per_token: f64,
    /// Person entities
    #[serde(default)]
    pub amount_of_persons: usize,
    /// Organization entities
    #[serde(default)]
    pub amount_of_organizations: usize,
    /// Location entities
    #[serde(default)]
    pub amount_of_locations: usize,
    /// Other entities
    #[serde(default)]
    pub amount_of_others: usize,
}

impl DatasetMetaData {
    /// Value along one dimension.
    #[must_use]
    pub fn value(&self, dimension: MetadataDimension) -> f64 {
        match dimension {
            MetadataDimension::NumberOfDocuments => self.number_of_documents as f64,
            MetadataDimension::AvgDocumentLength => self.avg_document_length,
            MetadataDimension::NumberOfEntities => self.number_of_entities as f64,
            MetadataDimension::EntitiesPerDocument => self.entities_per_doc,
            MetadataDimension::EntitiesPerToken => self.entities_per_token,
            MetadataDimension::AmountOfPersons => self.amount_of_persons as f64,
            MetadataDimension::AmountOfOrganizations => self.amount_of_organizations as f64,
            MetadataDimension::AmountOfLocations => self.amount_of_locations as f64,
            MetadataDimension::AmountOfOthers => self.amount_of_others as f64,
        }
    }

    /// Derive the size-based descriptors from a dataset.
    ///
    /// Entity type counts are not recoverable from markings and stay zero.
    /// Returns an error if the texts or gold sets disagree with `size()`.
    pub fn describe(dataset: &dyn Dataset) -> Result<Self> {
        let (texts, gold) = dataset.aligned_documents()?;

        let docs = texts.len();
        let total_chars: usize = texts.iter().map(|t| t.chars().count()).sum();
        let total_tokens: usize = texts.iter().map(|t| t.split_whitespace().count()).sum();
        let entities: usize = gold.iter().map(|g| g.len()).sum();

        let ratio = |num: usize, den: usize| if den > 0 { num as f64 / den as f64 } else { 0.0 };

        Ok(Self {
            number_of_documents: docs,
            avg_document_length: ratio(total_chars, docs),
            number_of_entities: entities,
            entities_per_doc: ratio(entities, docs),
            entities_per_token: ratio(entities, total_tokens),
            ..Default::default()
        })
    }
}
