use crate::database::SharedStore;
use crate::error::AppResult;
use crate::models::*;
use crate::services::VerificationService;
use crate::utils::JwtService;
use actix_web::cookie::{Cookie, SameSite, time::OffsetDateTime};

/// Result of a successful sign-in.
#[derive(Debug, Clone)]
pub struct SignIn {
    pub token: String,
    pub session: SessionCredential,
    pub user: UserAccount,
    pub is_new_user: bool,
}

#[derive(Clone)]
pub struct AuthService {
    store: SharedStore,
    verification: VerificationService,
    jwt_service: JwtService,
    secure_cookies: bool,
}

impl AuthService {
    pub fn new(
        store: SharedStore,
        verification: VerificationService,
        jwt_service: JwtService,
        secure_cookies: bool,
    ) -> Self {
        Self {
            store,
            verification,
            jwt_service,
            secure_cookies,
        }
    }

    pub async fn request_code(&self, email: &str) -> AppResult<()> {
        self.verification.issue_code(email).await
    }

    /// Confirms the emailed code, then signs in the matching account, creating
    /// it (with an empty profile) on first use.
    pub async fn sign_in(&self, email: &str, code: &str) -> AppResult<SignIn> {
        let email = self.verification.confirm_code(email, code).await?;

        let (user, is_new_user) = match self.store.find_user_by_email(&email).await? {
            Some(user) => (user, false),
            None => {
                let user = self.store.create_user_if_absent(&UserAccount::new(email)).await?;
                self.store.create_profile_if_absent(user.id).await?;
                log::info!("Created account {} for {}", user.id, user.email);
                (user, true)
            }
        };

        let (token, session) = self.jwt_service.mint(user.id, &user.email)?;
        log::info!(
            "Session created for user {}, expires at {}",
            user.id,
            session.expires_at
        );

        Ok(SignIn {
            token,
            session,
            user,
            is_new_user,
        })
    }

    /// Cookie carrying `token`, expiring together with the session.
    pub fn session_cookie(&self, token: &str, session: &SessionCredential) -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, token.to_string())
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(SameSite::Lax)
            .path("/")
            .finish();
        if let Ok(expires) = OffsetDateTime::from_unix_timestamp(session.expires_at.timestamp()) {
            cookie.set_expires(expires);
        }
        cookie
    }

    /// Cookie that makes the browser drop the session.
    pub fn logout_cookie(&self) -> Cookie<'static> {
        let mut cookie = Cookie::build(SESSION_COOKIE, "")
            .http_only(true)
            .secure(self.secure_cookies)
            .same_site(SameSite::Lax)
            .path("/")
            .finish();
        cookie.make_removal();
        cookie
    }

    pub fn verify_session(&self, token: &str) -> Option<SessionCredential> {
        self.jwt_service.verify(token)
    }
}
