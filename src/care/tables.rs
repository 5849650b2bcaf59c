use std::collections::HashMap;
use std::sync::Arc;

use super::{CareError, Label};
use crate::lookup::FallbackHospitalTable;

/// Static care tables: specialist and explanation per label, plus the
/// locality → hospitals fallback. Built once and shared read-only.
#[derive(Debug, Clone)]
pub struct CareTables {
    specialists: [String; 4],
    explanations: [String; 4],
    fallback: Arc<FallbackHospitalTable>,
}

impl CareTables {
    /// Build from caller-supplied maps. Every label must have a non-blank
    /// specialist and explanation.
    pub fn new(
        specialists: HashMap<Label, String>,
        explanations: HashMap<Label, String>,
        fallback: FallbackHospitalTable,
    ) -> Result<Self, CareError> {
        Ok(Self {
            specialists: total_table(&specialists)?,
            explanations: total_table(&explanations)?,
            fallback: Arc::new(fallback),
        })
    }

    /// Production tables.
    pub fn standard() -> Self {
        Self {
            specialists: Label::ALL.map(|l| standard_specialist(l).to_string()),
            explanations: Label::ALL.map(|l| standard_explanation(l).to_string()),
            fallback: Arc::new(FallbackHospitalTable::standard()),
        }
    }

    pub fn specialist(&self, label: Label) -> &str {
        &self.specialists[label.index()]
    }

    pub fn explanation(&self, label: Label) -> &str {
        &self.explanations[label.index()]
    }

    pub fn fallback(&self) -> Arc<FallbackHospitalTable> {
        Arc::clone(&self.fallback)
    }
}

fn total_table(map: &HashMap<Label, String>) -> Result<[String; 4], CareError> {
    let mut out: [String; 4] = Default::default();
    for label in Label::ALL {
        match map.get(&label).map(|s| s.trim()) {
            Some(value) if !value.is_empty() => out[label.index()] = value.to_string(),
            _ => return Err(CareError::IncompleteTable(label)),
        }
    }
    Ok(out)
}

fn standard_specialist(label: Label) -> &'static str {
    match label {
        Label::Covid19 => "Infectious Disease Specialist",
        Label::Normal => "General Physician",
        Label::Pneumonia => "Pulmonologist",
        Label::Tuberculosis => "Pulmonologist (TB Specialist)",
    }
}

fn standard_explanation(label: Label) -> &'static str {
    match label {
        Label::Covid19 => {
            "COVID-19 is a respiratory illness caused by the SARS-CoV-2 virus. \
             Chest X-rays often show patchy ground-glass opacities in both lungs. \
             Isolate, monitor oxygen saturation and consult a doctor promptly."
        }
        Label::Normal => {
            "No signs of COVID-19, pneumonia or tuberculosis were detected. \
             The lung fields appear clear. See a general physician if symptoms persist."
        }
        Label::Pneumonia => {
            "Pneumonia is an infection that inflames the air sacs in one or both lungs, \
             which may fill with fluid or pus. X-rays typically show areas of consolidation. \
             Treatment depends on the cause and usually needs medical supervision."
        }
        Label::Tuberculosis => {
            "Tuberculosis is a bacterial infection caused by Mycobacterium tuberculosis \
             that mainly affects the lungs. X-rays may show cavities, nodules or upper-lobe \
             infiltrates. It is curable with a full course of prescribed antibiotics."
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_map(value: &str) -> HashMap<Label, String> {
        Label::ALL.iter().map(|l| (*l, format!("{value} {l}"))).collect()
    }

    #[test]
    fn standard_tables_are_total() {
        let tables = CareTables::standard();
        for label in Label::ALL {
            assert!(!tables.specialist(label).is_empty(), "{label}");
            assert!(!tables.explanation(label).is_empty(), "{label}");
        }
    }

    #[test]
    fn pneumonia_goes_to_pulmonologist() {
        assert_eq!(CareTables::standard().specialist(Label::Pneumonia), "Pulmonologist");
    }

    #[test]
    fn custom_tables_accepted_when_total() {
        let tables = CareTables::new(
            full_map("spec"),
            full_map("expl"),
            FallbackHospitalTable::default(),
        )
        .unwrap();
        assert_eq!(tables.specialist(Label::Normal), "spec NORMAL");
        assert_eq!(tables.explanation(Label::Covid19), "expl COVID19");
    }

    #[test]
    fn missing_label_rejected() {
        let mut specialists = full_map("spec");
        specialists.remove(&Label::Tuberculosis);
        let err = CareTables::new(specialists, full_map("expl"), FallbackHospitalTable::default())
            .unwrap_err();
        assert_eq!(err, CareError::IncompleteTable(Label::Tuberculosis));
    }

    #[test]
    fn blank_entry_rejected() {
        let mut explanations = full_map("expl");
        explanations.insert(Label::Covid19, "   ".into());
        let err = CareTables::new(full_map("spec"), explanations, FallbackHospitalTable::default())
            .unwrap_err();
        assert_eq!(err, CareError::IncompleteTable(Label::Covid19));
    }
}
