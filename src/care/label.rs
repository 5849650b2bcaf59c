use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::CareError;

/// Closed set of classifier outputs, in the model's output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    #[serde(rename = "COVID19")]
    Covid19,
    #[serde(rename = "NORMAL")]
    Normal,
    #[serde(rename = "PNEUMONIA")]
    Pneumonia,
    /// The training set spells this class `TURBERCULOSIS`; the model emits it
    /// under that name.
    #[serde(rename = "TURBERCULOSIS", alias = "TUBERCULOSIS")]
    Tuberculosis,
}

impl Label {
    /// All labels in the classifier's enumeration order.
    pub const ALL: [Label; 4] = [
        Label::Covid19,
        Label::Normal,
        Label::Pneumonia,
        Label::Tuberculosis,
    ];

    /// Position of this label in the probability vector.
    pub fn index(self) -> usize {
        match self {
            Self::Covid19 => 0,
            Self::Normal => 1,
            Self::Pneumonia => 2,
            Self::Tuberculosis => 3,
        }
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Name as emitted by the classifier.
    pub fn wire_name(self) -> &'static str {
        match self {
            Self::Covid19 => "COVID19",
            Self::Normal => "NORMAL",
            Self::Pneumonia => "PNEUMONIA",
            Self::Tuberculosis => "TURBERCULOSIS",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

impl FromStr for Label {
    type Err = CareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "COVID19" | "COVID-19" => Ok(Self::Covid19),
            "NORMAL" => Ok(Self::Normal),
            "PNEUMONIA" => Ok(Self::Pneumonia),
            "TURBERCULOSIS" | "TUBERCULOSIS" => Ok(Self::Tuberculosis),
            _ => Err(CareError::InvalidLabel(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_enumeration_order() {
        for (i, label) in Label::ALL.iter().enumerate() {
            assert_eq!(label.index(), i);
            assert_eq!(Label::from_index(i), Some(*label));
        }
        assert_eq!(Label::from_index(4), None);
    }

    #[test]
    fn parses_wire_names_case_insensitively() {
        assert_eq!("pneumonia".parse::<Label>().unwrap(), Label::Pneumonia);
        assert_eq!(" COVID19 ".parse::<Label>().unwrap(), Label::Covid19);
        assert_eq!("Normal".parse::<Label>().unwrap(), Label::Normal);
    }

    #[test]
    fn accepts_both_tuberculosis_spellings() {
        assert_eq!("TURBERCULOSIS".parse::<Label>().unwrap(), Label::Tuberculosis);
        assert_eq!("tuberculosis".parse::<Label>().unwrap(), Label::Tuberculosis);
    }

    #[test]
    fn unknown_label_is_rejected() {
        let err = "FRACTURE".parse::<Label>().unwrap_err();
        assert_eq!(err, CareError::InvalidLabel("FRACTURE".into()));
    }

    #[test]
    fn display_uses_wire_name() {
        assert_eq!(Label::Tuberculosis.to_string(), "TURBERCULOSIS");
    }

    #[test]
    fn serde_uses_wire_name() {
        let json = serde_json::to_string(&Label::Pneumonia).unwrap();
        assert_eq!(json, "\"PNEUMONIA\"");
        let back: Label = serde_json::from_str("\"TUBERCULOSIS\"").unwrap();
        assert_eq!(back, Label::Tuberculosis);
    }
}
