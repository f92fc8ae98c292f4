//! Company - The tenant every schedule hangs off
//!
//! Company is an Entity (has identity). The id never changes; name,
//! week start and timezone can be updated in place.
//!
//! The `version` field is NOT persisted state. It is stamped from the
//! local cache entry when a company is handed out, so two replicas can
//! report different versions for the same company.

/// Unique identifier for a Company
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompanyId(String);

impl CompanyId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for CompanyId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// First day of the scheduling week
///
/// Wire value is the integer 0..=6, Sunday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DayOfWeek {
    #[default]
    Sunday,
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
}

impl DayOfWeek {
    /// Parse the wire value, `None` when out of range
    pub fn from_index(index: i64) -> Option<Self> {
        match index {
            0 => Some(DayOfWeek::Sunday),
            1 => Some(DayOfWeek::Monday),
            2 => Some(DayOfWeek::Tuesday),
            3 => Some(DayOfWeek::Wednesday),
            4 => Some(DayOfWeek::Thursday),
            5 => Some(DayOfWeek::Friday),
            6 => Some(DayOfWeek::Saturday),
            _ => None,
        }
    }

    pub fn index(&self) -> u8 {
        *self as u8
    }

    pub fn name(&self) -> &'static str {
        match self {
            DayOfWeek::Sunday => "sunday",
            DayOfWeek::Monday => "monday",
            DayOfWeek::Tuesday => "tuesday",
            DayOfWeek::Wednesday => "wednesday",
            DayOfWeek::Thursday => "thursday",
            DayOfWeek::Friday => "friday",
            DayOfWeek::Saturday => "saturday",
        }
    }
}

impl core::fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Company record as held by the canonical store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    id: CompanyId,
    name: String,
    default_day_week_starts: DayOfWeek,
    default_timezone: String,
    version: u64,
}

impl Company {
    /// Create a new Company at version 0
    pub fn new(
        id: CompanyId,
        name: impl Into<String>,
        default_day_week_starts: DayOfWeek,
        default_timezone: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            default_day_week_starts,
            default_timezone: default_timezone.into(),
            version: 0,
        }
    }

    /// Builder: stamp a local cache version
    pub fn with_version(mut self, version: u64) -> Self {
        self.version = version;
        self
    }

    // ========== Getters ==========

    pub fn id(&self) -> &CompanyId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn default_day_week_starts(&self) -> DayOfWeek {
        self.default_day_week_starts
    }

    pub fn default_timezone(&self) -> &str {
        &self.default_timezone
    }

    pub fn version(&self) -> u64 {
        self.version
    }
}
