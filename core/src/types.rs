//! Core data types for Vinculo

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Attribute map carried by an edge
pub type Attributes = serde_json::Map<String, serde_json::Value>;

/// Identifier of the investigation case that owns the ingested edges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CaseId(pub i64);

impl CaseId {
    /// Create a new CaseId
    pub fn new(id: i64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for CaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for CaseId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Closed set of relationship types produced by the source formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    /// Funds moved from a titular account holder to a counterparty
    Transferiu,
    /// One call participant called another
    LigouPara,
    /// Registered subscriber of a terminal
    EAssinanteDe,
    /// Person the terminal is assigned to
    Utiliza,
    /// Subscriber registered under a tax identifier
    TemCpfCnpj,
    /// Party listed in a financial-intelligence report
    EnvolvidoNoRif,
}

impl RelationType {
    pub const ALL: [RelationType; 6] = [
        RelationType::Transferiu,
        RelationType::LigouPara,
        RelationType::EAssinanteDe,
        RelationType::Utiliza,
        RelationType::TemCpfCnpj,
        RelationType::EnvolvidoNoRif,
    ];

    /// Graph label of this relationship type
    pub fn as_str(&self) -> &'static str {
        match self {
            RelationType::Transferiu => "TRANSFERIU",
            RelationType::LigouPara => "LIGOU_PARA",
            RelationType::EAssinanteDe => "E_ASSINANTE_DE",
            RelationType::Utiliza => "UTILIZA",
            RelationType::TemCpfCnpj => "TEM_CPF_CNPJ",
            RelationType::EnvolvidoNoRif => "ENVOLVIDO_NO_RIF",
        }
    }
}

impl std::fmt::Display for RelationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RelationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RelationType::ALL
            .iter()
            .copied()
            .find(|relation| relation.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Unknown relation type: {}", s))
    }
}

/// Source format of an ingested extract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SourceFormat {
    /// Bank transaction extract (SIMBA)
    TransactionExtract,
    /// Telecom call detail records (SITTEL DRT)
    CallDetail,
    /// Telecom subscriber registry (SITTEL cadastro)
    SubscriberRegistry,
    /// Financial-intelligence report involvement list (RIF envolvidos)
    InvolvementReport,
}

impl SourceFormat {
    pub const ALL: [SourceFormat; 4] = [
        SourceFormat::TransactionExtract,
        SourceFormat::CallDetail,
        SourceFormat::SubscriberRegistry,
        SourceFormat::InvolvementReport,
    ];

    /// Canonical name used on the command line and in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::TransactionExtract => "transaction-extract",
            SourceFormat::CallDetail => "call-detail",
            SourceFormat::SubscriberRegistry => "subscriber-registry",
            SourceFormat::InvolvementReport => "involvement-report",
        }
    }

    /// Name of the source system the extract comes from
    pub fn source_alias(&self) -> &'static str {
        match self {
            SourceFormat::TransactionExtract => "simba-extrato",
            SourceFormat::CallDetail => "sittel-drt",
            SourceFormat::SubscriberRegistry => "sittel-cadastro",
            SourceFormat::InvolvementReport => "rif-envolvidos",
        }
    }

    /// Relationship types this format can emit, in emission order
    pub fn relation_types(&self) -> &'static [RelationType] {
        match self {
            SourceFormat::TransactionExtract => &[RelationType::Transferiu],
            SourceFormat::CallDetail => &[
                RelationType::LigouPara,
                RelationType::EAssinanteDe,
                RelationType::Utiliza,
            ],
            SourceFormat::SubscriberRegistry => &[RelationType::TemCpfCnpj, RelationType::EAssinanteDe],
            SourceFormat::InvolvementReport => &[RelationType::EnvolvidoNoRif],
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('_', "-");
        SourceFormat::ALL
            .iter()
            .copied()
            .find(|format| format.as_str() == wanted || format.source_alias() == wanted)
            .ok_or_else(|| format!("Unknown source format: {}", s))
    }
}

/// A directed, typed relationship between two entities, scoped to a case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Identifier of the origin entity
    pub source_entity_id: String,
    /// Identifier of the destination entity
    pub target_entity_id: String,
    /// Relationship type
    pub relation_type: RelationType,
    /// Scalar attributes of the relationship
    #[serde(default)]
    pub attributes: Attributes,
    /// Case the relationship was ingested for
    pub case_id: CaseId,
}

impl Edge {
    /// Create a new edge without attributes
    pub fn new(
        source_entity_id: impl Into<String>,
        target_entity_id: impl Into<String>,
        relation_type: RelationType,
        case_id: CaseId,
    ) -> Self {
        Self {
            source_entity_id: source_entity_id.into(),
            target_entity_id: target_entity_id.into(),
            relation_type,
            attributes: Attributes::new(),
            case_id,
        }
    }

    /// Add a single attribute to this edge
    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Identity of the edge for upsert purposes (attributes excluded)
    pub fn key(&self) -> EdgeKey {
        EdgeKey {
            case_id: self.case_id,
            source_entity_id: self.source_entity_id.clone(),
            target_entity_id: self.target_entity_id.clone(),
            relation_type: self.relation_type,
        }
    }
}

/// Upsert identity of an edge
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EdgeKey {
    pub case_id: CaseId,
    pub source_entity_id: String,
    pub target_entity_id: String,
    pub relation_type: RelationType,
}

/// Intermediate record produced by a format adapter.
///
/// Both endpoints are guaranteed present; rows that could not fill them were
/// dropped during adaptation.
#[derive(Debug, Clone, PartialEq)]
pub struct CanonicalRow {
    pub source: String,
    pub target: String,
    pub attributes: Attributes,
    /// Line of the first input row that produced this record
    pub line: u64,
}

impl CanonicalRow {
    pub fn new(source: impl Into<String>, target: impl Into<String>, line: u64) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            attributes: Attributes::new(),
            line,
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }
}

/// A run of consecutive canonical rows sharing one relationship type
#[derive(Debug, Clone, PartialEq)]
pub struct RelationRows {
    pub relation: RelationType,
    pub rows: Vec<CanonicalRow>,
}

impl RelationRows {
    pub fn new(relation: RelationType) -> Self {
        Self {
            relation,
            rows: Vec::new(),
        }
    }
}

/// Output of a format adapter.
///
/// Rows are kept in emission order as runs of one relationship type, so a
/// source row yielding several relationships keeps them side by side.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdaptedTable {
    /// Runs in emission order; neighbouring runs never share a relation
    pub groups: Vec<RelationRows>,
    /// Input rows that contributed nothing
    pub dropped_rows: usize,
}

impl AdaptedTable {
    /// Append a row after everything emitted so far
    pub fn push(&mut self, relation: RelationType, row: CanonicalRow) {
        match self.groups.last_mut() {
            Some(run) if run.relation == relation => run.rows.push(row),
            _ => {
                let mut run = RelationRows::new(relation);
                run.rows.push(row);
                self.groups.push(run);
            }
        }
    }

    /// Append every row of another table, keeping its order
    pub fn append(&mut self, other: AdaptedTable) {
        for run in other.groups {
            for row in run.rows {
                self.push(run.relation, row);
            }
        }
        self.dropped_rows += other.dropped_rows;
    }

    /// Total number of canonical rows
    pub fn row_count(&self) -> usize {
        self.groups.iter().map(|group| group.rows.len()).sum()
    }

    /// Rows and their relation, in emission order
    pub fn iter(&self) -> impl Iterator<Item = (RelationType, &CanonicalRow)> {
        self.groups
            .iter()
            .flat_map(|run| run.rows.iter().map(move |row| (run.relation, row)))
    }

    /// Rows of one relation, in emission order
    pub fn rows_of(&self, relation: RelationType) -> Vec<&CanonicalRow> {
        self.iter()
            .filter(|(r, _)| *r == relation)
            .map(|(_, row)| row)
            .collect()
    }
}
