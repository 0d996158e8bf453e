//! Record-level authorization.
//!
//! Role guards decide whether a caller may use an endpoint at all; this
//! module decides whether they may see or act on one particular record.
//!
//! | role    | view                         | act (approve / reject)  |
//! |---------|------------------------------|-------------------------|
//! | admin   | everything                   | everything              |
//! | student | own records                  | never                   |
//! | faculty | same department              | same department         |
//! | warden  | same hostel, both set        | same hostel, both set   |
//!
//! Every function here is pure: no storage access, no logging.

use hallpass_core::AppError;
use hallpass_models::{LeaveRequest, User, UserId, UserRole};

/// The authenticated caller with the profile fields scoping depends on.
///
/// Built from the stored user on every request, so department and hostel
/// changes apply without re-issuing tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    pub department: String,
    pub hostel: Option<String>,
}

impl From<User> for Actor {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            department: user.department,
            hostel: user.hostel,
        }
    }
}

/// Anything owned by a student and placed in a department and hostel.
pub trait ScopedRecord {
    fn student_id(&self) -> UserId;
    fn department(&self) -> &str;
    fn hostel(&self) -> Option<&str>;
}

/// Leave requests answer with the department and hostel captured when they
/// were filed, not the student's current ones.
impl ScopedRecord for LeaveRequest {
    fn student_id(&self) -> UserId {
        self.student_id
    }

    fn department(&self) -> &str {
        &self.department
    }

    fn hostel(&self) -> Option<&str> {
        self.hostel.as_deref()
    }
}

/// Scopes attendance data through the owning student's current profile.
#[derive(Debug, Clone, Copy)]
pub struct StudentScope<'a>(pub &'a User);

impl ScopedRecord for StudentScope<'_> {
    fn student_id(&self) -> UserId {
        self.0.id
    }

    fn department(&self) -> &str {
        &self.0.department
    }

    fn hostel(&self) -> Option<&str> {
        self.0.hostel.as_deref()
    }
}

fn same_hostel(actor: &Actor, record: &impl ScopedRecord) -> bool {
    match (actor.hostel.as_deref(), record.hostel()) {
        (Some(mine), Some(theirs)) => mine == theirs,
        _ => false,
    }
}

pub fn can_view(actor: &Actor, record: &impl ScopedRecord) -> bool {
    match actor.role {
        UserRole::Admin => true,
        UserRole::Student => actor.id == record.student_id(),
        UserRole::Faculty => actor.department == record.department(),
        UserRole::Warden => same_hostel(actor, record),
    }
}

pub fn can_act_on(actor: &Actor, record: &impl ScopedRecord) -> bool {
    match actor.role {
        UserRole::Admin => true,
        UserRole::Student => false,
        UserRole::Faculty => actor.department == record.department(),
        UserRole::Warden => same_hostel(actor, record),
    }
}

pub fn ensure_can_view(actor: &Actor, record: &impl ScopedRecord) -> Result<(), AppError> {
    if can_view(actor, record) {
        Ok(())
    } else {
        Err(AppError::forbidden("You do not have access to this record"))
    }
}

pub fn ensure_can_act_on(actor: &Actor, record: &impl ScopedRecord) -> Result<(), AppError> {
    if can_act_on(actor, record) {
        return Ok(());
    }
    let message = match actor.role {
        UserRole::Student => "Students cannot approve or reject leave requests",
        _ => "You can only decide leave requests within your scope",
    };
    Err(AppError::forbidden(message))
}
