//! Data models for database seeding configuration.

use hallpass_models::{UserId, UserRole};

/// Every seeded account uses this domain, which is how `clear-seed` finds them.
pub const SEED_EMAIL_DOMAIN: &str = "seed.hallpass.test";

/// Password shared by every seeded account.
pub const SEED_PASSWORD: &str = "password123";

/// Seed data for creating a user.
pub struct UserSeed {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: UserRole,
    pub department: String,
    pub hostel: Option<String>,
    pub student_number: Option<String>,
}

/// How many people to create in each department and hostel.
#[derive(Clone)]
pub struct Headcount {
    pub faculty_per_department: usize,
    pub students_per_department: usize,
    pub wardens_per_hostel: usize,
}

impl Default for Headcount {
    fn default() -> Self {
        Self {
            faculty_per_department: 4,
            students_per_department: 40,
            wardens_per_hostel: 1,
        }
    }
}

/// Complete configuration for database seeding.
#[derive(Clone)]
pub struct SeedConfig {
    pub departments: Vec<String>,
    pub hostels: Vec<String>,
    pub headcount: Headcount,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            departments: ["CS", "EE", "ME", "CE"].map(String::from).to_vec(),
            hostels: ["H1", "H2", "H3"].map(String::from).to_vec(),
            headcount: Headcount::default(),
        }
    }
}

impl SeedConfig {
    /// Blank and duplicate names are dropped.
    pub fn new(departments: Vec<String>, hostels: Vec<String>) -> Self {
        Self {
            departments: dedup(departments),
            hostels: dedup(hostels),
            ..Default::default()
        }
    }

    pub fn with_headcount(mut self, headcount: Headcount) -> Self {
        self.headcount = headcount;
        self
    }

    pub fn total_faculty(&self) -> usize {
        self.departments.len() * self.headcount.faculty_per_department
    }

    pub fn total_students(&self) -> usize {
        self.departments.len() * self.headcount.students_per_department
    }

    pub fn total_wardens(&self) -> usize {
        self.hostels.len() * self.headcount.wardens_per_hostel
    }

    pub fn total_users(&self) -> usize {
        self.total_faculty() + self.total_students() + self.total_wardens()
    }
}

fn dedup(names: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim().to_string();
        if !name.is_empty() && !out.contains(&name) {
            out.push(name);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_totals() {
        let config = SeedConfig::new(vec!["CS".into(), "EE".into()], vec!["H1".into()])
            .with_headcount(Headcount {
                faculty_per_department: 2,
                students_per_department: 10,
                wardens_per_hostel: 3,
            });

        assert_eq!(config.total_faculty(), 4);
        assert_eq!(config.total_students(), 20);
        assert_eq!(config.total_wardens(), 3);
        assert_eq!(config.total_users(), 27);
    }

    #[test]
    fn test_names_are_trimmed_and_deduplicated() {
        let config = SeedConfig::new(
            vec![" CS ".into(), "CS".into(), "".into(), "EE".into()],
            vec![],
        );
        assert_eq!(config.departments, vec!["CS", "EE"]);
        assert!(config.hostels.is_empty());
    }
}
