use hallpass_core::{AppError, PaginationMeta, hash_password, verify_password};
use hallpass_db::{CampusStore, UserQuery};
use hallpass_models::UserId;
use tracing::{info, instrument};

use super::model::{
    ChangePasswordDto, DashboardResponse, PaginatedUsersResponse, User, UserFilterParams,
    UserResponse, UserRole,
};
use crate::middleware::scope::Actor;
use crate::modules::leaves::service::LeaveService;

pub struct UserService;

impl UserService {
    async fn load(store: &dyn CampusStore, id: UserId) -> Result<User, AppError> {
        store
            .find_user(id)
            .await?
            .ok_or_else(|| AppError::not_found(anyhow::anyhow!("User not found")))
    }

    #[instrument(skip(store))]
    pub async fn get_profile(
        store: &dyn CampusStore,
        id: UserId,
    ) -> Result<UserResponse, AppError> {
        Ok(Self::load(store, id).await?.into())
    }

    #[instrument(skip(store))]
    pub async fn list_users(
        store: &dyn CampusStore,
        params: &UserFilterParams,
    ) -> Result<PaginatedUsersResponse, AppError> {
        let query = UserQuery {
            role: params.role,
            department: params
                .department
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
        };
        let pagination = &params.pagination;
        let (users, total) = store
            .list_users(&query, pagination.limit(), pagination.offset())
            .await?;

        Ok(PaginatedUsersResponse {
            data: users.into_iter().map(UserResponse::from).collect(),
            meta: PaginationMeta::from_params(pagination, total),
        })
    }

    /// Replaces the password digest after re-checking the current password.
    #[instrument(skip(store, dto))]
    pub async fn change_password(
        store: &dyn CampusStore,
        id: UserId,
        dto: ChangePasswordDto,
    ) -> Result<(), AppError> {
        let user = Self::load(store, id).await?;

        if !verify_password(&dto.current_password, &user.password_hash)? {
            return Err(AppError::invalid_field(
                "current_password",
                "Current password is incorrect",
            ));
        }

        let digest = hash_password(&dto.new_password)?;
        store.update_password(id, &digest).await?;
        info!(user_id = %id, "password changed");
        Ok(())
    }

    /// Welcome payload for a role dashboard, with the actor's pending queue size.
    #[instrument(skip(store))]
    pub async fn dashboard(
        store: &dyn CampusStore,
        actor: &Actor,
    ) -> Result<DashboardResponse, AppError> {
        let message = match actor.role {
            UserRole::Admin => "Welcome to the admin dashboard".to_string(),
            UserRole::Faculty => format!("Welcome to the {} faculty dashboard", actor.department),
            UserRole::Warden => match &actor.hostel {
                Some(hostel) => format!("Welcome to the {hostel} warden dashboard"),
                None => "Welcome to the warden dashboard".to_string(),
            },
            UserRole::Student => "Welcome to the student dashboard".to_string(),
        };

        let pending_leaves = LeaveService::pending_count(store, actor).await?;

        Ok(DashboardResponse {
            message,
            role: actor.role,
            pending_leaves,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hallpass_core::PaginationParams;
    use hallpass_db::MemoryStore;
    use hallpass_models::NewUser;

    async fn seed(store: &MemoryStore, email: &str, role: UserRole, department: &str) -> User {
        store
            .create_user(NewUser {
                name: email.to_string(),
                email: email.to_string(),
                password_hash: hash_password("password123").unwrap(),
                role,
                department: department.to_string(),
                hostel: None,
                phone: None,
                student_number: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_change_password_requires_current() {
        let store = MemoryStore::new();
        let user = seed(&store, "a@campus.edu", UserRole::Student, "CS").await;

        let err = UserService::change_password(
            &store,
            user.id,
            ChangePasswordDto {
                current_password: "wrong-one".into(),
                new_password: "fresh-secret".into(),
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, 400);
        assert!(err.details.unwrap().get("current_password").is_some());

        UserService::change_password(
            &store,
            user.id,
            ChangePasswordDto {
                current_password: "password123".into(),
                new_password: "fresh-secret".into(),
            },
        )
        .await
        .unwrap();

        let stored = store.find_user(user.id).await.unwrap().unwrap();
        assert!(verify_password("fresh-secret", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_list_users_filters_role_and_department() {
        let store = MemoryStore::new();
        seed(&store, "s1@campus.edu", UserRole::Student, "CS").await;
        seed(&store, "s2@campus.edu", UserRole::Student, "EE").await;
        seed(&store, "f1@campus.edu", UserRole::Faculty, "CS").await;

        let students = UserService::list_users(
            &store,
            &UserFilterParams {
                role: Some(UserRole::Student),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(students.meta.total, 2);

        let cs = UserService::list_users(
            &store,
            &UserFilterParams {
                department: Some("CS".into()),
                pagination: PaginationParams {
                    limit: Some(1),
                    offset: None,
                    page: None,
                },
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(cs.meta.total, 2);
        assert_eq!(cs.data.len(), 1);
        assert!(cs.meta.has_more);
    }

    #[tokio::test]
    async fn test_missing_profile_is_404() {
        let store = MemoryStore::new();
        let err = UserService::get_profile(&store, UserId::new())
            .await
            .unwrap_err();
        assert_eq!(err.status, 404);
    }

    #[tokio::test]
    async fn test_dashboard_counts_scoped_pending() {
        let store = MemoryStore::new();
        let faculty = seed(&store, "f@campus.edu", UserRole::Faculty, "CS").await;
        let actor = Actor::from(faculty);

        let dashboard = UserService::dashboard(&store, &actor).await.unwrap();
        assert_eq!(dashboard.role, UserRole::Faculty);
        assert_eq!(dashboard.pending_leaves, 0);
        assert!(dashboard.message.contains("CS"));
    }
}
