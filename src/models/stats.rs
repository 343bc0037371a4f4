use serde::Serialize;

/// Row of a GROUP BY count. `value` is NULL when the grouped column is NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupCount {
    pub value: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationCount {
    pub location: Option<String>,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComputerCount {
    pub computer_name: Option<String>,
    pub count: i64,
}

impl From<GroupCount> for LocationCount {
    fn from(g: GroupCount) -> Self {
        Self {
            location: g.value,
            count: g.count,
        }
    }
}

impl From<GroupCount> for ComputerCount {
    fn from(g: GroupCount) -> Self {
        Self {
            computer_name: g.value,
            count: g.count,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LatestEntry {
    pub id: i64,
    pub computer_name: String,
    pub location: String,
    pub timestamp: String,
}

/// Response body of `GET /stats`.
#[derive(Debug, Clone, Serialize)]
pub struct Stats {
    pub total_screenshots: i64,
    pub by_location: Vec<LocationCount>,
    pub by_computer: Vec<ComputerCount>,
    pub latest_entries: Vec<LatestEntry>,
}
