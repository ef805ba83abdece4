//! Closed clinical vocabularies used by the knowledge base.
//!
//! Every enum here serialises in kebab-case (`rare-but-serious`, `self-care`) so the YAML
//! content reads the way clinicians write it. The ordered vocabularies (`Urgency`,
//! `Timeframe`, `InvolvementType`) implement `Ord` so that *greater* always means *more
//! urgent* or *more severe*.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use utoipa::ToSchema;

// ============================================================================
// Unordered vocabularies
// ============================================================================

/// Clinical category of a diagnosis.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosisCategory {
    Cardiovascular,
    Respiratory,
    Gastrointestinal,
    Neurologic,
    Musculoskeletal,
    Infectious,
    Endocrine,
    Hematologic,
    Renal,
    Rheumatologic,
    Psychiatric,
    Dermatologic,
}

impl DiagnosisCategory {
    /// All categories in declaration order.
    pub const ALL: [DiagnosisCategory; 12] = [
        DiagnosisCategory::Cardiovascular,
        DiagnosisCategory::Respiratory,
        DiagnosisCategory::Gastrointestinal,
        DiagnosisCategory::Neurologic,
        DiagnosisCategory::Musculoskeletal,
        DiagnosisCategory::Infectious,
        DiagnosisCategory::Endocrine,
        DiagnosisCategory::Hematologic,
        DiagnosisCategory::Renal,
        DiagnosisCategory::Rheumatologic,
        DiagnosisCategory::Psychiatric,
        DiagnosisCategory::Dermatologic,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosisCategory::Cardiovascular => "cardiovascular",
            DiagnosisCategory::Respiratory => "respiratory",
            DiagnosisCategory::Gastrointestinal => "gastrointestinal",
            DiagnosisCategory::Neurologic => "neurologic",
            DiagnosisCategory::Musculoskeletal => "musculoskeletal",
            DiagnosisCategory::Infectious => "infectious",
            DiagnosisCategory::Endocrine => "endocrine",
            DiagnosisCategory::Hematologic => "hematologic",
            DiagnosisCategory::Renal => "renal",
            DiagnosisCategory::Rheumatologic => "rheumatologic",
            DiagnosisCategory::Psychiatric => "psychiatric",
            DiagnosisCategory::Dermatologic => "dermatologic",
        }
    }
}

impl std::fmt::Display for DiagnosisCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for DiagnosisCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == wanted)
            .ok_or_else(|| format!("unknown diagnosis category: {s}"))
    }
}

/// A-priori probability/severity class of a diagnosis.
///
/// This is independent of the per-query rank a diagnosis receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Likelihood {
    MostLikely,
    Likely,
    LessLikely,
    RareButSerious,
}

impl Likelihood {
    pub fn as_str(&self) -> &'static str {
        match self {
            Likelihood::MostLikely => "most-likely",
            Likelihood::Likely => "likely",
            Likelihood::LessLikely => "less-likely",
            Likelihood::RareButSerious => "rare-but-serious",
        }
    }
}

impl std::fmt::Display for Likelihood {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body system an anatomical structure belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum BodySystem {
    Cardiovascular,
    Respiratory,
    Digestive,
    Nervous,
    Musculoskeletal,
    Urinary,
    Reproductive,
    Endocrine,
    Immune,
    Integumentary,
    Lymphatic,
}

// ============================================================================
// Ordered vocabularies
// ============================================================================

/// How a structure is involved in a disease process.
///
/// Ordering: `Primary > Secondary > Complication`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum InvolvementType {
    Primary,
    Secondary,
    Complication,
}

impl InvolvementType {
    /// Clinical severity of the involvement; higher is more severe.
    pub fn severity(self) -> u8 {
        match self {
            InvolvementType::Primary => 3,
            InvolvementType::Secondary => 2,
            InvolvementType::Complication => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InvolvementType::Primary => "primary",
            InvolvementType::Secondary => "secondary",
            InvolvementType::Complication => "complication",
        }
    }
}

impl std::fmt::Display for InvolvementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Ord for InvolvementType {
    fn cmp(&self, other: &Self) -> Ordering {
        self.severity().cmp(&other.severity())
    }
}

impl PartialOrd for InvolvementType {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Care-seeking urgency.
///
/// Ordering: `Emergency > Urgent > Soon > Routine > SelfCare`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Urgency {
    Emergency,
    Urgent,
    Soon,
    Routine,
    SelfCare,
}

impl Urgency {
    /// Position on the urgency scale; higher is more urgent.
    pub fn level(self) -> u8 {
        match self {
            Urgency::Emergency => 5,
            Urgency::Urgent => 4,
            Urgency::Soon => 3,
            Urgency::Routine => 2,
            Urgency::SelfCare => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Emergency => "emergency",
            Urgency::Urgent => "urgent",
            Urgency::Soon => "soon",
            Urgency::Routine => "routine",
            Urgency::SelfCare => "self-care",
        }
    }
}

impl Ord for Urgency {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level().cmp(&other.level())
    }
}

impl PartialOrd for Urgency {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How quickly an alarm symptom must be acted on.
///
/// Ordering: `Immediate > WithinHours > Within24To48Hours > WithinDays > WithinWeeks`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum Timeframe {
    Immediate,
    WithinHours,
    #[serde(rename = "within-24-48-hours")]
    Within24To48Hours,
    WithinDays,
    WithinWeeks,
}

impl Timeframe {
    /// Position on the timeframe scale; higher is more urgent.
    pub fn level(self) -> u8 {
        match self {
            Timeframe::Immediate => 5,
            Timeframe::WithinHours => 4,
            Timeframe::Within24To48Hours => 3,
            Timeframe::WithinDays => 2,
            Timeframe::WithinWeeks => 1,
        }
    }

    /// Human-readable label, e.g. "Within 24-48 hours".
    pub fn label(&self) -> &'static str {
        match self {
            Timeframe::Immediate => "Immediate",
            Timeframe::WithinHours => "Within hours",
            Timeframe::Within24To48Hours => "Within 24-48 hours",
            Timeframe::WithinDays => "Within days",
            Timeframe::WithinWeeks => "Within weeks",
        }
    }
}

impl Ord for Timeframe {
    fn cmp(&self, other: &Self) -> Ordering {
        self.level().cmp(&other.level())
    }
}

impl PartialOrd for Timeframe {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

// ============================================================================
// Presentation hints
// ============================================================================

/// A `#RRGGBB` highlight colour for anatomy overlays.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct HighlightColor(String);

impl HighlightColor {
    /// Parses a `#RRGGBB` colour; hex digits are normalised to lowercase.
    pub fn new(input: impl AsRef<str>) -> Result<Self, String> {
        let s = input.as_ref().trim();
        let valid = s.len() == 7
            && s.starts_with('#')
            && s[1..].bytes().all(|b| b.is_ascii_hexdigit());
        if !valid {
            return Err(format!("invalid highlight colour '{s}' (expected #RRGGBB)"));
        }
        Ok(Self(s.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for HighlightColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for HighlightColor {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for HighlightColor {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        HighlightColor::new(s).map_err(serde::de::Error::custom)
    }
}

impl<'s> ToSchema<'s> for HighlightColor {
    fn schema() -> (
        &'s str,
        utoipa::openapi::RefOr<utoipa::openapi::schema::Schema>,
    ) {
        (
            "HighlightColor",
            utoipa::openapi::ObjectBuilder::new()
                .schema_type(utoipa::openapi::SchemaType::String)
                .pattern(Some("^#[0-9a-f]{6}$"))
                .into(),
        )
    }
}
