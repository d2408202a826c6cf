//! Static department → doctor catalog, injected at boot so tests can
//! substitute their own roster.

/// Ordered mapping from department key to doctor display labels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorCatalog {
    entries: Vec<(String, Vec<String>)>,
}

impl DoctorCatalog {
    pub fn new<K, D>(entries: impl IntoIterator<Item = (K, Vec<D>)>) -> Self
    where
        K: Into<String>,
        D: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(key, doctors)| {
                    (
                        key.into(),
                        doctors.into_iter().map(Into::into).collect(),
                    )
                })
                .collect(),
        }
    }

    /// Doctors for a department, in catalog order. Unknown departments get
    /// an empty roster rather than an error.
    pub fn doctors(&self, department: &str) -> &[String] {
        self.entries
            .iter()
            .find(|(key, _)| key == department)
            .map(|(_, doctors)| doctors.as_slice())
            .unwrap_or(&[])
    }

    pub fn departments(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for DoctorCatalog {
    fn default() -> Self {
        Self::new([
            ("general", vec!["Dr. Vikram Singh - General Physician"]),
            ("pediatrics", vec!["Dr. Priya Mehta - Pediatrician"]),
            ("cardiology", vec!["Dr. Rakesh Sharma - Cardiologist"]),
            ("dentistry", vec!["Dr. Aarav Kapoor - Dentist"]),
            ("orthopedics", vec!["Dr. Arjun Thakur - Orthopedic Surgeon"]),
            ("dermatology", vec!["Dr. Anjali Patel - Dermatologist"]),
            ("neurology", vec!["Dr. Meera Joshi - Neurologist"]),
            ("gynecology", vec!["Dr. Neha Gupta - Gynecologist"]),
        ])
    }
}

/// Option value for a doctor label: lowercased, every whitespace run
/// replaced by a hyphen, so `"Dr. A B - C"` becomes `"dr.-a-b---c"`.
pub fn option_value(label: &str) -> String {
    label
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_catalog_has_eight_departments() {
        let catalog = DoctorCatalog::default();
        assert_eq!(catalog.departments().count(), 8);
        assert_eq!(
            catalog.doctors("cardiology"),
            ["Dr. Rakesh Sharma - Cardiologist"]
        );
    }

    #[test]
    fn unknown_department_has_empty_roster() {
        let catalog = DoctorCatalog::default();
        assert!(catalog.doctors("astrology").is_empty());
        assert!(catalog.doctors("").is_empty());
    }

    #[test]
    fn option_value_collapses_whitespace_runs() {
        assert_eq!(
            option_value("Dr. Vikram Singh - General Physician"),
            "dr.-vikram-singh---general-physician"
        );
        assert_eq!(option_value("  Two   Words "), "two-words");
    }
}
