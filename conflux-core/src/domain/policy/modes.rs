// conflux-core/src/domain/policy/modes.rs
//
// Discrete mode attributes. Each has a canonical stored form (what the persistence
// layer keeps, lower-case) and a display form (what the console shows and what the
// Selection State holds). Serde uses the stored form.

use serde::{Deserialize, Serialize};

pub trait ModeValue: Sized + Copy + PartialEq + 'static {
    const ALL: &'static [Self];

    fn stored(&self) -> &'static str;
    fn display(&self) -> &'static str;

    /// Accepts either form, case-insensitively.
    fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.iter().copied().find(|v| {
            v.stored().eq_ignore_ascii_case(raw) || v.display().eq_ignore_ascii_case(raw)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionLayer {
    Bronze,
    Silver,
    Gold,
}

impl ModeValue for ExecutionLayer {
    const ALL: &'static [Self] = &[Self::Bronze, Self::Silver, Self::Gold];

    fn stored(&self) -> &'static str {
        match self {
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
        }
    }

    fn display(&self) -> &'static str {
        match self {
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadType {
    #[serde(rename = "truncate_load")]
    Truncate,
    #[serde(rename = "incremental_load")]
    Incremental,
    #[serde(rename = "scd1")]
    Scd1,
    #[serde(rename = "scd2")]
    Scd2,
}

impl LoadType {
    pub fn is_scd(&self) -> bool {
        matches!(self, Self::Scd1 | Self::Scd2)
    }
}

impl ModeValue for LoadType {
    const ALL: &'static [Self] = &[Self::Truncate, Self::Incremental, Self::Scd1, Self::Scd2];

    fn stored(&self) -> &'static str {
        match self {
            Self::Truncate => "truncate_load",
            Self::Incremental => "incremental_load",
            Self::Scd1 => "scd1",
            Self::Scd2 => "scd2",
        }
    }

    fn display(&self) -> &'static str {
        match self {
            Self::Truncate => "Truncate",
            Self::Incremental => "Incremental",
            Self::Scd1 => "SCD1",
            Self::Scd2 => "SCD2",
        }
    }
}

/// Source/target type: a database table or a flat file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    #[default]
    Table,
    File,
}

impl ModeValue for EndpointKind {
    const ALL: &'static [Self] = &[Self::Table, Self::File];

    fn stored(&self) -> &'static str {
        match self {
            Self::Table => "table",
            Self::File => "file",
        }
    }

    fn display(&self) -> &'static str {
        match self {
            Self::Table => "Table",
            Self::File => "File",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReconType {
    CountCheck,
    AmountCheck,
}

impl ModeValue for ReconType {
    const ALL: &'static [Self] = &[Self::CountCheck, Self::AmountCheck];

    fn stored(&self) -> &'static str {
        match self {
            Self::CountCheck => "count_check",
            Self::AmountCheck => "amount_check",
        }
    }

    fn display(&self) -> &'static str {
        match self {
            Self::CountCheck => "Count Check",
            Self::AmountCheck => "Amount Check",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationType {
    NullCheck,
    DuplicateCheck,
    RangeCheck,
    PatternCheck,
    Reference,
    ReferentialIntegrity,
}

impl ValidationType {
    pub fn needs_reference(&self) -> bool {
        matches!(self, Self::Reference | Self::ReferentialIntegrity)
    }
}

impl ModeValue for ValidationType {
    const ALL: &'static [Self] = &[
        Self::NullCheck,
        Self::DuplicateCheck,
        Self::RangeCheck,
        Self::PatternCheck,
        Self::Reference,
        Self::ReferentialIntegrity,
    ];

    fn stored(&self) -> &'static str {
        match self {
            Self::NullCheck => "null_check",
            Self::DuplicateCheck => "duplicate_check",
            Self::RangeCheck => "range_check",
            Self::PatternCheck => "pattern_check",
            Self::Reference => "reference",
            Self::ReferentialIntegrity => "referential_integrity",
        }
    }

    fn display(&self) -> &'static str {
        match self {
            Self::NullCheck => "Null Check",
            Self::DuplicateCheck => "Duplicate Check",
            Self::RangeCheck => "Range Check",
            Self::PatternCheck => "Pattern Check",
            Self::Reference => "Reference",
            Self::ReferentialIntegrity => "Referential Integrity",
        }
    }
}

/// Y/N switches (active flag, dynamic schema).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Flag {
    #[serde(rename = "Y")]
    #[default]
    Yes,
    #[serde(rename = "N")]
    No,
}

impl ModeValue for Flag {
    const ALL: &'static [Self] = &[Self::Yes, Self::No];

    fn stored(&self) -> &'static str {
        match self {
            Self::Yes => "Y",
            Self::No => "N",
        }
    }

    fn display(&self) -> &'static str {
        self.stored()
    }
}
