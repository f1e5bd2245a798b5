use serde::{Deserialize, Serialize};

/// Sampling granularity of a return series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resolution {
    Daily,
    Monthly,
}

impl Resolution {
    /// The discriminator value stored in the `pnl_records.resolution` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            Resolution::Daily => "daily",
            Resolution::Monthly => "monthly",
        }
    }
}

impl std::fmt::Display for Resolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What kind of entity a return series belongs to.
///
/// Benchmarks are reference markets analyzed alongside trading programs but
/// held in a dedicated logical account, not the program ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Program,
    Benchmark,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Program => f.write_str("program"),
            EntityKind::Benchmark => f.write_str("benchmark"),
        }
    }
}
