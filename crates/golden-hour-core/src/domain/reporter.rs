//! Reporter profile: the person who raised the SOS.

uuid_id!(
    /// Unique identifier for a reporter
    ReporterId
);

/// Emergency contact of a reporter
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EmergencyContact {
    /// Contact name
    pub name: String,
    /// Contact phone
    pub phone: String,
}

/// Profile of the user reporting accidents
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Reporter {
    /// Reporter identifier
    #[cfg_attr(feature = "serde", serde(default))]
    pub id: ReporterId,
    /// Full name
    pub full_name: String,
    /// Phone number
    pub phone: String,
    /// Blood group, forwarded to the receiving hospital
    #[cfg_attr(feature = "serde", serde(default))]
    pub blood_group: Option<String>,
    /// Who to inform when an accident is reported
    #[cfg_attr(feature = "serde", serde(default))]
    pub emergency_contact: EmergencyContact,
}

impl Reporter {
    /// Create a new reporter with a fresh identifier
    pub fn new(full_name: impl Into<String>, phone: impl Into<String>) -> Self {
        Self {
            id: ReporterId::new(),
            full_name: full_name.into(),
            phone: phone.into(),
            blood_group: None,
            emergency_contact: EmergencyContact::default(),
        }
    }

    /// Set blood group
    pub fn with_blood_group(mut self, blood_group: impl Into<String>) -> Self {
        self.blood_group = Some(blood_group.into());
        self
    }

    /// Set emergency contact
    pub fn with_emergency_contact(mut self, name: impl Into<String>, phone: impl Into<String>) -> Self {
        self.emergency_contact = EmergencyContact {
            name: name.into(),
            phone: phone.into(),
        };
        self
    }

    /// Name to address family notifications to
    pub fn family_recipient(&self) -> &str {
        if self.emergency_contact.name.is_empty() {
            &self.full_name
        } else {
            &self.emergency_contact.name
        }
    }
}

impl Default for Reporter {
    fn default() -> Self {
        Self::new("Anonymous", "")
    }
}
