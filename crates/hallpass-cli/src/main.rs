use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;
use hallpass_cli::seeder::{self, Headcount, SeedConfig};
use hallpass_core::hash_password;
use hallpass_models::{UserId, UserRole};
use sqlx::PgPool;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(name = "hallpass-cli")]
#[command(about = "Hallpass CLI - Administrative tools for Hallpass", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an administrator account (admins cannot self-register)
    CreateAdmin {
        /// Full name
        #[arg(short = 'n', long)]
        name: Option<String>,

        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Department recorded on the account
        #[arg(short = 'd', long, default_value = "ADMIN")]
        department: String,

        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,
    },
    /// Seed the database with fake faculty, wardens and students
    Seed {
        /// Comma-separated department codes
        #[arg(long, value_delimiter = ',', default_value = "CS,EE,ME,CE")]
        departments: Vec<String>,

        /// Comma-separated hostel names; pass an empty string for none
        #[arg(long, value_delimiter = ',', default_value = "H1,H2,H3")]
        hostels: Vec<String>,

        /// Number of faculty per department
        #[arg(long, default_value = "4")]
        faculty: usize,

        /// Number of students per department
        #[arg(long, default_value = "40")]
        students: usize,

        /// Number of wardens per hostel
        #[arg(long, default_value = "1")]
        wardens: usize,
    },
    /// Clear all seeded users and their leave, attendance and notifications
    ClearSeed,
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("\n❌ {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    let database_url =
        std::env::var("DATABASE_URL").map_err(|_| "DATABASE_URL must be set")?;

    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .map_err(|e| format!("Failed to connect to database: {}", e))?;

    match cli.command {
        Commands::CreateAdmin {
            name,
            email,
            department,
            password,
        } => handle_create_admin(&pool, name, email, department, password).await,
        Commands::Seed {
            departments,
            hostels,
            faculty,
            students,
            wardens,
        } => {
            let config = SeedConfig::new(departments, hostels).with_headcount(Headcount {
                faculty_per_department: faculty,
                students_per_department: students,
                wardens_per_hostel: wardens,
            });
            seeder::seed_all(&pool, config)
                .await
                .map_err(|e| format!("Error seeding database: {}", e).into())
        }
        Commands::ClearSeed => seeder::clear_all(&pool)
            .await
            .map_err(|e| format!("Error clearing seeded data: {}", e).into()),
    }
}

async fn handle_create_admin(
    pool: &PgPool,
    name: Option<String>,
    email: Option<String>,
    department: String,
    password: Option<String>,
) -> CliResult<()> {
    let name = match name {
        Some(name) => name,
        None => Input::<String>::new().with_prompt("Full name").interact_text()?,
    };

    let email = match email {
        Some(email) => email,
        None => Input::<String>::new().with_prompt("Email address").interact_text()?,
    };

    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()?,
    };

    let name = name.trim();
    let email = email.trim().to_lowercase();
    let department = department.trim();

    if name.len() < 2 {
        return Err("Name must be at least 2 characters".into());
    }
    if !email.contains('@') {
        return Err("Invalid email address".into());
    }
    if password.len() < 6 {
        return Err("Password must be at least 6 characters".into());
    }
    if department.is_empty() {
        return Err("Department is required".into());
    }

    create_admin_internal(pool, name, &email, department, &password).await?;

    println!("\n✅ Admin created successfully!");
    println!("   Email: {}", email);
    println!("   Name: {}", name);
    Ok(())
}

async fn create_admin_internal(
    db: &PgPool,
    name: &str,
    email: &str,
    department: &str,
    password: &str,
) -> CliResult<UserId> {
    let hashed_password =
        hash_password(password).map_err(|e| format!("Failed to hash password: {}", e.error))?;

    let user_id = sqlx::query_scalar::<_, UserId>(
        "INSERT INTO users (id, name, email, password_hash, role, department)
         VALUES ($1, $2, $3, $4, $5, $6)
         ON CONFLICT (email) DO NOTHING
         RETURNING id",
    )
    .bind(UserId::new())
    .bind(name)
    .bind(email)
    .bind(&hashed_password)
    .bind(UserRole::Admin)
    .bind(department)
    .fetch_optional(db)
    .await?;

    user_id.ok_or_else(|| "User with this email already exists".into())
}
