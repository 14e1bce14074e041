//! Work-location assignment model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Declared work location for one employee-day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentKind {
    /// Working on a construction/client site.
    Site,
    /// Working from home.
    Home,
    /// Working at the office.
    Office,
    /// Split between a site and the office.
    SiteAndOffice,
}

impl AssignmentKind {
    /// Parses a free-text assignment label.
    ///
    /// # Example
    ///
    /// ```
    /// use attendance_engine::models::AssignmentKind;
    ///
    /// assert_eq!(AssignmentKind::parse_label("Chantier"), Some(AssignmentKind::Site));
    /// assert_eq!(AssignmentKind::parse_label("Chantier et Bureau"), Some(AssignmentKind::SiteAndOffice));
    /// assert_eq!(AssignmentKind::parse_label("Domicile"), Some(AssignmentKind::Home));
    /// assert_eq!(AssignmentKind::parse_label("???"), None);
    /// ```
    pub fn parse_label(label: &str) -> Option<Self> {
        let lowered = label.trim().to_lowercase();
        let site = lowered.contains("chantier") || lowered.contains("site");
        let office = lowered.contains("bureau") || lowered.contains("office");
        let home = lowered.contains("domicile")
            || lowered.contains("home")
            || lowered.contains("télétravail")
            || lowered.contains("teletravail");

        match (site, office, home) {
            (true, true, _) => Some(AssignmentKind::SiteAndOffice),
            (true, false, _) => Some(AssignmentKind::Site),
            (false, _, true) => Some(AssignmentKind::Home),
            (false, true, false) => Some(AssignmentKind::Office),
            (false, false, false) => None,
        }
    }
}

impl std::fmt::Display for AssignmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignmentKind::Site => write!(f, "Site"),
            AssignmentKind::Home => write!(f, "Home"),
            AssignmentKind::Office => write!(f, "Office"),
            AssignmentKind::SiteAndOffice => write!(f, "Site and office"),
        }
    }
}

/// A declared assignment for one employee on one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    /// Employee identifier (matricule).
    pub employee_id: String,
    /// Assignment date.
    pub date: NaiveDate,
    /// Where the employee works that day.
    pub assignment_kind: AssignmentKind,
    /// Site name, for site assignments.
    #[serde(default)]
    pub site_name: Option<String>,
    /// Project worked on, for home assignments.
    #[serde(default)]
    pub home_project: Option<String>,
}
