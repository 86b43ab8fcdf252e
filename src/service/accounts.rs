use super::TicketService;
use crate::auth::{hash_password, verify_password};
use crate::core::access::authorize_staff;
use crate::core::{Caller, Identity, NewUser, Registration, Role, User};
use crate::error::{OfficeTicketError, Result};
use serde::Serialize;

/// Department given to self-registered employees who leave it blank
const DEFAULT_DEPARTMENT: &str = "General";

/// Accounts created by `bootstrap` when missing: (name, email, password, role, department)
const SEED_ACCOUNTS: [(&str, &str, &str, Role, &str); 2] = [
    ("Admin", "admin@office.com", "admin123", Role::Admin, "IT"),
    (
        "Manager",
        "manager@office.com",
        "manager123",
        Role::Manager,
        "Foundation",
    ),
];

/// Successful login
#[derive(Debug, Clone, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
}

impl TicketService {
    /// Create an account with any role (admin and IT only)
    pub async fn register_user(&self, caller: &Caller, registration: Registration) -> Result<User> {
        authorize_staff(caller.identity()?, "register users")?;
        let registration = registration.validate()?;
        let role = registration.role.unwrap_or_default();
        self.insert_account(registration, role).await
    }

    /// Self-service sign-up; always creates an employee
    pub async fn register_employee(&self, registration: Registration) -> Result<User> {
        let mut registration = registration.validate()?;
        registration
            .department
            .get_or_insert_with(|| DEFAULT_DEPARTMENT.to_string());
        self.insert_account(registration, Role::Employee).await
    }

    async fn insert_account(&self, registration: Registration, role: Role) -> Result<User> {
        let password = registration.password;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| OfficeTicketError::Custom(format!("Hashing task failed: {e}")))??;

        let user = self
            .store
            .insert_user(&NewUser {
                name: registration.name,
                email: registration.email,
                password_hash,
                role,
                department: registration.department,
                created_at: self.clock.utc(),
            })
            .await?;
        tracing::info!(email = %user.email, role = %user.role, "User registered");
        Ok(user)
    }

    /// Check credentials and issue a bearer token
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse> {
        let email = email.trim().to_lowercase();
        let user = self
            .store
            .find_user(&email)
            .await?
            .ok_or(OfficeTicketError::InvalidCredentials)?;

        let password = password.to_string();
        let stored_hash = user.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
            .await
            .map_err(|e| OfficeTicketError::Custom(format!("Verification task failed: {e}")))?;
        if !valid {
            tracing::debug!(email = %email, "Rejected login");
            return Err(OfficeTicketError::InvalidCredentials);
        }

        // Token expiry is checked against the system clock on verification.
        let token = self.tokens.issue(&user, chrono::Utc::now())?;
        Ok(LoginResponse { token, user })
    }

    /// Turn a bearer token into the caller's current identity
    ///
    /// Role and department come from the user record, not the token, so a
    /// department change takes effect on the next request.
    pub async fn identify(&self, token: &str) -> Result<Identity> {
        let claims = self.tokens.verify(token)?;
        let user = self
            .store
            .find_user(&claims.sub)
            .await?
            .ok_or(OfficeTicketError::InvalidToken)?;
        Ok(Identity::from(&user))
    }

    /// `Caller::Anonymous` without a token, otherwise the verified identity
    pub async fn caller(&self, token: Option<&str>) -> Result<Caller> {
        match token.map(str::trim).filter(|t| !t.is_empty()) {
            Some(token) => Ok(Caller::User(self.identify(token).await?)),
            None => Ok(Caller::Anonymous),
        }
    }

    /// Every account (admin and IT only)
    pub async fn list_users(&self, caller: &Caller) -> Result<Vec<User>> {
        authorize_staff(caller.identity()?, "list users")?;
        self.store.list_users().await
    }

    /// Create the default admin and manager accounts if they are missing
    ///
    /// Returns the emails that were created.
    pub async fn bootstrap(&self) -> Result<Vec<String>> {
        let mut created = Vec::new();
        for (name, email, password, role, department) in SEED_ACCOUNTS {
            if self.store.find_user(email).await?.is_some() {
                continue;
            }
            let registration = Registration {
                name: name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
                role: Some(role),
                department: Some(department.to_string()),
            };
            match self.insert_account(registration, role).await {
                Ok(user) => created.push(user.email),
                Err(OfficeTicketError::DuplicateEmail { .. }) => {},
                Err(e) => return Err(e),
            }
        }
        if !created.is_empty() {
            tracing::warn!(
                "Seeded default accounts {:?}; change their passwords",
                created
            );
        }
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use crate::core::{Caller, Registration, Role};
    use crate::error::OfficeTicketError;
    use crate::test_utils::{TestService, admin, employee};

    fn registration(email: &str, role: Option<Role>) -> Registration {
        Registration {
            name: "Sam Lee".to_string(),
            email: email.to_string(),
            password: "secret".to_string(),
            role,
            department: None,
        }
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let fixture = TestService::new().await;
        let created = fixture.service.bootstrap().await.unwrap();
        assert_eq!(created, vec!["admin@office.com", "manager@office.com"]);
        assert!(fixture.service.bootstrap().await.unwrap().is_empty());

        let users = fixture.service.list_users(&admin()).await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[1].role, Role::Manager);
        assert_eq!(users[1].department.as_deref(), Some("Foundation"));
    }

    #[tokio::test]
    async fn test_login_and_identify() {
        let fixture = TestService::new().await;
        fixture.service.bootstrap().await.unwrap();

        let login = fixture
            .service
            .login(" Admin@Office.com ", "admin123")
            .await
            .unwrap();
        assert_eq!(login.user.role, Role::Admin);

        let identity = fixture.service.identify(&login.token).await.unwrap();
        assert_eq!(identity.email, "admin@office.com");
        assert_eq!(identity.department.as_deref(), Some("IT"));

        let caller = fixture.service.caller(Some(&login.token)).await.unwrap();
        assert!(matches!(caller, Caller::User(_)));
        assert_eq!(fixture.service.caller(None).await.unwrap(), Caller::Anonymous);
    }

    #[tokio::test]
    async fn test_bad_credentials() {
        let fixture = TestService::new().await;
        fixture.service.bootstrap().await.unwrap();

        assert!(matches!(
            fixture.service.login("admin@office.com", "wrong").await,
            Err(OfficeTicketError::InvalidCredentials)
        ));
        assert!(matches!(
            fixture.service.login("nobody@office.com", "admin123").await,
            Err(OfficeTicketError::InvalidCredentials)
        ));
        assert!(matches!(
            fixture.service.identify("not-a-token").await,
            Err(OfficeTicketError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_self_registration_is_always_employee() {
        let fixture = TestService::new().await;
        let user = fixture
            .service
            .register_employee(registration("Sam@Office.com", Some(Role::Admin)))
            .await
            .unwrap();
        assert_eq!(user.email, "sam@office.com");
        assert_eq!(user.role, Role::Employee);
        assert_eq!(user.department.as_deref(), Some("General"));

        let err = fixture
            .service
            .register_employee(registration("sam@office.com", None))
            .await
            .unwrap_err();
        assert!(matches!(err, OfficeTicketError::DuplicateEmail { .. }));
    }

    #[tokio::test]
    async fn test_privileged_registration() {
        let fixture = TestService::new().await;
        let user = fixture
            .service
            .register_user(&admin(), registration("it@office.com", Some(Role::It)))
            .await
            .unwrap();
        assert_eq!(user.role, Role::It);

        let err = fixture
            .service
            .register_user(
                &employee("sam@office.com"),
                registration("boss@office.com", Some(Role::Admin)),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, OfficeTicketError::Forbidden { .. }));
    }
}
