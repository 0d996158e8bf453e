//! User seeding functionality.
//!
//! Provides functions for generating and inserting fake faculty, wardens and
//! students into the database.

use fake::Fake;
use fake::faker::name::en::*;
use hallpass_models::{UserId, UserRole};
use rayon::prelude::*;
use sqlx::{PgPool, Postgres, Transaction};
use std::time::Instant;

use super::models::{Headcount, SEED_EMAIL_DOMAIN, SeedConfig, UserSeed};

/// Generates faculty for each department
pub fn generate_faculty(
    departments: &[String],
    per_department: usize,
    password_hash: &str,
) -> Vec<UserSeed> {
    departments
        .par_iter()
        .enumerate()
        .flat_map(|(dept_idx, department)| {
            (0..per_department)
                .map(|idx| {
                    generate_user(
                        UserRole::Faculty,
                        department,
                        None,
                        dept_idx * 1000 + idx,
                        password_hash,
                    )
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Generates wardens for each hostel. Wardens sit in the `HOSTEL` department.
pub fn generate_wardens(
    hostels: &[String],
    per_hostel: usize,
    password_hash: &str,
) -> Vec<UserSeed> {
    hostels
        .par_iter()
        .enumerate()
        .flat_map(|(hostel_idx, hostel)| {
            (0..per_hostel)
                .map(|idx| {
                    generate_user(
                        UserRole::Warden,
                        "HOSTEL",
                        Some(hostel),
                        hostel_idx * 1000 + idx,
                        password_hash,
                    )
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Generates students for each department.
///
/// Residents are spread round-robin over the hostels; every third student is
/// a day scholar with no hostel.
pub fn generate_students(
    departments: &[String],
    hostels: &[String],
    per_department: usize,
    password_hash: &str,
) -> Vec<UserSeed> {
    departments
        .par_iter()
        .enumerate()
        .flat_map(|(dept_idx, department)| {
            (0..per_department)
                .map(|idx| {
                    let hostel = if hostels.is_empty() || idx % 3 == 2 {
                        None
                    } else {
                        Some(hostels[idx % hostels.len()].as_str())
                    };
                    let mut user = generate_user(
                        UserRole::Student,
                        department,
                        hostel,
                        dept_idx * 1000 + idx,
                        password_hash,
                    );
                    user.student_number = Some(format!(
                        "{}-{}",
                        department,
                        &user.id.into_inner().simple().to_string()[..8]
                    ));
                    user
                })
                .collect::<Vec<_>>()
        })
        .collect()
}

fn generate_user(
    role: UserRole,
    department: &str,
    hostel: Option<&str>,
    seq: usize,
    password_hash: &str,
) -> UserSeed {
    let first_name: String = FirstName().fake();
    let last_name: String = LastName().fake();

    let email = format!(
        "{}.{}+{}{}@{}",
        first_name.to_lowercase().replace(' ', ""),
        last_name.to_lowercase().replace(' ', ""),
        role.as_str(),
        seq,
        SEED_EMAIL_DOMAIN
    );

    UserSeed {
        id: UserId::new(),
        name: format!("{} {}", first_name, last_name),
        email,
        password_hash: password_hash.to_string(),
        role,
        department: department.to_string(),
        hostel: hostel.map(str::to_string),
        student_number: None,
    }
}

/// Generates and inserts everyone described by `config`
pub async fn seed_users(
    db: &PgPool,
    config: &SeedConfig,
    password_hash: &str,
) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    let Headcount {
        faculty_per_department,
        students_per_department,
        wardens_per_hostel,
    } = config.headcount;

    println!(
        "👥 Seeding {} users ({} faculty, {} wardens, {} students)...",
        config.total_users(),
        config.total_faculty(),
        config.total_wardens(),
        config.total_students()
    );

    let mut users = generate_faculty(&config.departments, faculty_per_department, password_hash);
    users.extend(generate_wardens(
        &config.hostels,
        wardens_per_hostel,
        password_hash,
    ));
    users.extend(generate_students(
        &config.departments,
        &config.hostels,
        students_per_department,
        password_hash,
    ));

    let inserted = insert_users_batch(db, &users).await?;

    println!(
        "   ✓ Inserted {} users in {:?}",
        inserted,
        start_time.elapsed()
    );
    if inserted < users.len() as u64 {
        println!(
            "   ! Skipped {} users whose email was already taken",
            users.len() as u64 - inserted
        );
    }

    Ok(inserted)
}

/// Inserts users in batches inside one transaction; returns rows inserted
pub async fn insert_users_batch(
    db: &PgPool,
    users: &[UserSeed],
) -> Result<u64, Box<dyn std::error::Error>> {
    let mut tx = db.begin().await?;

    // 8 params per user
    const BATCH_SIZE: usize = 800;

    let mut inserted = 0;
    for chunk in users.chunks(BATCH_SIZE) {
        inserted += insert_users_chunk(&mut tx, chunk).await?;
    }

    tx.commit().await?;
    Ok(inserted)
}

async fn insert_users_chunk(
    tx: &mut Transaction<'_, Postgres>,
    users: &[UserSeed],
) -> Result<u64, Box<dyn std::error::Error>> {
    if users.is_empty() {
        return Ok(0);
    }

    let mut query = String::from(
        "INSERT INTO users (id, name, email, password_hash, role, department, hostel, student_number) VALUES ",
    );

    for i in 0..users.len() {
        if i > 0 {
            query.push_str(", ");
        }
        let p = i * 8;
        query.push_str(&format!(
            "(${}, ${}, ${}, ${}, ${}, ${}, ${}, ${})",
            p + 1,
            p + 2,
            p + 3,
            p + 4,
            p + 5,
            p + 6,
            p + 7,
            p + 8
        ));
    }

    query.push_str(" ON CONFLICT DO NOTHING");

    let mut q = sqlx::query(&query);
    for user in users {
        q = q
            .bind(user.id)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role)
            .bind(&user.department)
            .bind(&user.hostel)
            .bind(&user.student_number);
    }

    Ok(q.execute(&mut **tx).await?.rows_affected())
}

/// Clears seeded users and everything that references them.
///
/// Accounts created with `create-admin` or through the API are kept.
pub async fn clear_users(db: &PgPool) -> Result<u64, Box<dyn std::error::Error>> {
    let start_time = Instant::now();
    println!("🗑️  Clearing seeded users...");

    let pattern = format!("%@{}", SEED_EMAIL_DOMAIN);
    let seeded = "SELECT id FROM users WHERE email LIKE $1";
    let mut tx = db.begin().await?;

    for statement in [
        format!("DELETE FROM notifications WHERE user_id IN ({seeded})"),
        format!(
            "DELETE FROM attendance_records WHERE student_id IN ({seeded}) OR marked_by IN ({seeded})"
        ),
        format!(
            "DELETE FROM leave_requests WHERE student_id IN ({seeded}) OR approved_by IN ({seeded})"
        ),
    ] {
        sqlx::query(&statement)
            .bind(&pattern)
            .execute(&mut *tx)
            .await?;
    }

    let result = sqlx::query("DELETE FROM users WHERE email LIKE $1")
        .bind(&pattern)
        .execute(&mut *tx)
        .await?
        .rows_affected();

    tx.commit().await?;

    println!(
        "   ✓ Deleted {} users in {:?}",
        result,
        start_time.elapsed()
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_faculty_per_department() {
        let faculty = generate_faculty(&names(&["CS", "EE"]), 3, "digest");
        assert_eq!(faculty.len(), 6);
        assert!(faculty.iter().all(|u| u.role == UserRole::Faculty));
        assert!(faculty.iter().all(|u| u.hostel.is_none()));
        assert_eq!(faculty.iter().filter(|u| u.department == "EE").count(), 3);
    }

    #[test]
    fn test_wardens_are_assigned_a_hostel() {
        let wardens = generate_wardens(&names(&["H1", "H2"]), 1, "digest");
        assert_eq!(wardens.len(), 2);
        assert!(wardens.iter().all(|u| u.hostel.is_some()));
        assert!(wardens.iter().all(|u| u.department == "HOSTEL"));
    }

    #[test]
    fn test_students_mix_residents_and_day_scholars() {
        let students = generate_students(&names(&["CS"]), &names(&["H1", "H2"]), 9, "digest");
        assert_eq!(students.len(), 9);
        assert_eq!(students.iter().filter(|u| u.hostel.is_none()).count(), 3);
        assert!(students.iter().all(|u| u.student_number.is_some()));
        assert!(
            students
                .iter()
                .all(|u| u.email.ends_with(SEED_EMAIL_DOMAIN))
        );
    }

    #[test]
    fn test_students_without_hostels() {
        let students = generate_students(&names(&["CS"]), &[], 4, "digest");
        assert!(students.iter().all(|u| u.hostel.is_none()));
    }
}
