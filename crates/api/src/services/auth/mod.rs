//! Authentication service.
//!
//! Owns the registration chain (account, customer profile, cart) and
//! credential verification. Registration either provisions all three
//! records or, via compensating deletions, leaves none of them behind.

mod error;

pub use error::AuthError;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};

use brightspoke_core::{AccountId, CartId, CustomerId, Email, Role};

use crate::services::sessions::SessionIssuer;
use crate::store::{
    Account, AccountStore, CartStore, CustomerStore, DocumentStore, NewAccountRecord,
    NewCustomerRecord, StoreError,
};

/// Registration input, as collected from a client or operator.
///
/// The raw password stays wrapped until the moment it is hashed; `Debug`
/// output redacts it.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password: SecretString,
    pub first_name: String,
    pub last_name: String,
}

/// Everything created by a successful registration.
#[derive(Debug, Clone)]
pub struct ProvisionedAccount {
    pub account: Account,
    pub customer_id: CustomerId,
    pub cart_id: CartId,
}

/// A minted session: the opaque token plus the account it belongs to.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession {
    pub token: String,
    pub account: Account,
}

/// Authentication service.
///
/// Handles customer registration and login against the document store.
pub struct AuthService<'a> {
    accounts: AccountStore<'a>,
    customers: CustomerStore<'a>,
    carts: CartStore<'a>,
    sessions: &'a SessionIssuer,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub fn new(store: &'a DocumentStore, sessions: &'a SessionIssuer) -> Self {
        Self {
            accounts: store.accounts(),
            customers: store.customers(),
            carts: store.carts(),
            sessions,
        }
    }

    // =========================================================================
    // Registration
    // =========================================================================

    /// Create a bare account with an explicit role.
    ///
    /// Operator tooling uses this directly for non-customer roles; customer
    /// signup goes through [`AuthService::register`], which adds the profile
    /// and cart.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` or `AuthError::InvalidEmail` if the
    /// input is incomplete and `AuthError::EmailExists` if the email is
    /// already registered.
    pub async fn create_account(
        &self,
        input: NewAccount,
        role: Role,
    ) -> Result<Account, AuthError> {
        // Validate field presence
        let username = required("username", &input.username)?;
        let first_name = required("firstname", &input.first_name)?;
        let last_name = required("lastname", &input.last_name)?;
        if input.password.expose_secret().is_empty() {
            return Err(AuthError::MissingField("password"));
        }

        // Validate email
        let email = Email::parse(input.email.trim())?;

        // Fast duplicate check; the insert below is the authoritative gate
        if self.accounts.find_by_email(&email).await.is_some() {
            return Err(AuthError::EmailExists);
        }

        // Hash password
        let password_hash = hash_password(input.password.expose_secret())?;

        // Create account
        self.accounts
            .create(NewAccountRecord {
                email,
                username,
                password_hash,
                first_name,
                last_name,
                role,
            })
            .await
            .map_err(|e| match e {
                StoreError::Conflict(_) => AuthError::EmailExists,
                other => AuthError::Store(other),
            })
    }

    /// Register a new customer: account, linked profile, linked empty cart.
    ///
    /// The account insert is the authoritative uniqueness gate; if a later
    /// step fails, the records created before it are deleted again before
    /// the error is reported.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingField` or `AuthError::InvalidEmail` if the
    /// input is incomplete, `AuthError::EmailExists` if the email is already
    /// registered, and a store error if persistence fails.
    pub async fn register(&self, input: NewAccount) -> Result<ProvisionedAccount, AuthError> {
        let account = self.create_account(input, Role::Customer).await?;

        // Create linked profile; roll the account back on failure
        let profile = match self
            .customers
            .create(NewCustomerRecord {
                account_id: account.id,
                first_name: account.first_name.clone(),
                last_name: account.last_name.clone(),
                email: account.email.clone(),
            })
            .await
        {
            Ok(profile) => profile,
            Err(e) => {
                self.unwind(account.id, None).await;
                return Err(e.into());
            }
        };

        // Create linked cart; roll the profile and account back on failure
        let cart = match self.carts.create(profile.id).await {
            Ok(cart) => cart,
            Err(e) => {
                self.unwind(account.id, Some(profile.id)).await;
                return Err(e.into());
            }
        };

        tracing::info!(
            account_id = %account.id,
            customer_id = %profile.id,
            cart_id = %cart.id,
            "customer provisioned"
        );

        Ok(ProvisionedAccount {
            account,
            customer_id: profile.id,
            cart_id: cart.id,
        })
    }

    /// Compensating deletions for a partially provisioned chain.
    ///
    /// Failures here are logged and swallowed; the caller reports the error
    /// that triggered the rollback, not the rollback's own.
    async fn unwind(&self, account_id: AccountId, customer_id: Option<CustomerId>) {
        if let Some(customer_id) = customer_id {
            if let Err(error) = self.customers.remove(customer_id).await {
                tracing::error!(
                    error = %error,
                    customer_id = %customer_id,
                    "rollback could not remove customer profile"
                );
            }
        }
        if let Err(error) = self.accounts.remove(account_id).await {
            tracing::error!(
                error = %error,
                account_id = %account_id,
                "rollback could not remove account"
            );
        }
    }

    // =========================================================================
    // Login
    // =========================================================================

    /// Login with email and password, minting a fresh session token.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::UserNotFound` if no account matches the email and
    /// `AuthError::InvalidPassword` if the password does not verify.
    pub async fn login(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthenticatedSession, AuthError> {
        // An address that does not parse cannot belong to any account
        let Ok(email) = Email::parse(email.trim()) else {
            return Err(AuthError::UserNotFound);
        };

        let account = self
            .accounts
            .find_by_email(&email)
            .await
            .ok_or(AuthError::UserNotFound)?;

        // Verify password
        verify_password(password.expose_secret(), &account.password_hash)?;

        // Mint session
        let token = self.sessions.issue(account.id).await;

        Ok(AuthenticatedSession { token, account })
    }
}

/// Reject blank required fields, trimming surrounding whitespace.
fn required(field: &'static str, value: &str) -> Result<String, AuthError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AuthError::MissingField(field));
    }
    Ok(value.to_owned())
}

/// Hash a password using Argon2id.
fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a stored hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidPassword)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidPassword)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;

    fn input(email: &str) -> NewAccount {
        NewAccount {
            username: "ada".to_owned(),
            email: email.to_owned(),
            password: SecretString::from("correct horse battery staple"),
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
        }
    }

    async fn open(dir: &std::path::Path) -> (DocumentStore, SessionIssuer) {
        let store = DocumentStore::open(dir).await.unwrap();
        (store, SessionIssuer::new())
    }

    #[tokio::test]
    async fn register_provisions_account_profile_and_cart() {
        let dir = tempfile::tempdir().unwrap();
        let (store, sessions) = open(dir.path()).await;
        let auth = AuthService::new(&store, &sessions);

        let out = auth.register(input("ada@example.com")).await.unwrap();

        assert_eq!(out.account.email.as_str(), "ada@example.com");
        assert_eq!(out.account.role, Role::Customer);
        assert_ne!(out.account.password_hash, "correct horse battery staple");
        assert!(out.account.password_hash.starts_with("$argon2"));

        let profile = store
            .customers()
            .find_by_account(out.account.id)
            .await
            .unwrap();
        assert_eq!(profile.id, out.customer_id);
        assert_eq!(profile.email.as_str(), "ada@example.com");

        let cart = store.carts().find_by_customer(profile.id).await.unwrap();
        assert_eq!(cart.id, out.cart_id);
        assert!(cart.items.is_empty());

        assert_eq!(store.accounts().count().await, 1);
        assert_eq!(store.customers().count().await, 1);
        assert_eq!(store.carts().count().await, 1);
    }

    #[tokio::test]
    async fn create_account_with_admin_role_skips_the_customer_chain() {
        let dir = tempfile::tempdir().unwrap();
        let (store, sessions) = open(dir.path()).await;
        let auth = AuthService::new(&store, &sessions);

        let account = auth
            .create_account(input("ops@example.com"), Role::Admin)
            .await
            .unwrap();

        assert_eq!(account.role, Role::Admin);
        assert_eq!(store.accounts().count().await, 1);
        assert_eq!(store.customers().count().await, 0);
        assert_eq!(store.carts().count().await, 0);

        // The email gate covers operator-created accounts too
        assert!(matches!(
            auth.register(input("ops@example.com")).await.unwrap_err(),
            AuthError::EmailExists
        ));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_without_side_effects() {
        let dir = tempfile::tempdir().unwrap();
        let (store, sessions) = open(dir.path()).await;
        let auth = AuthService::new(&store, &sessions);

        auth.register(input("ada@example.com")).await.unwrap();

        let mut second = input("ada@example.com");
        second.username = "other".to_owned();
        let err = auth.register(second).await.unwrap_err();

        assert!(matches!(err, AuthError::EmailExists));
        assert_eq!(store.accounts().count().await, 1);
        assert_eq!(store.customers().count().await, 1);
        assert_eq!(store.carts().count().await, 1);
    }

    #[tokio::test]
    async fn incomplete_input_is_rejected_before_any_write() {
        let dir = tempfile::tempdir().unwrap();
        let (store, sessions) = open(dir.path()).await;
        let auth = AuthService::new(&store, &sessions);

        let mut missing_username = input("ada@example.com");
        missing_username.username = "  ".to_owned();
        assert!(matches!(
            auth.register(missing_username).await.unwrap_err(),
            AuthError::MissingField("username")
        ));

        let mut blank_password = input("ada@example.com");
        blank_password.password = SecretString::from("");
        assert!(matches!(
            auth.register(blank_password).await.unwrap_err(),
            AuthError::MissingField("password")
        ));

        assert!(matches!(
            auth.register(input("not-an-email")).await.unwrap_err(),
            AuthError::InvalidEmail(_)
        ));

        assert_eq!(store.accounts().count().await, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registers_with_one_email_pick_one_winner() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(DocumentStore::open(dir.path()).await.unwrap());
        let sessions = Arc::new(SessionIssuer::new());

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            let sessions = Arc::clone(&sessions);
            handles.push(tokio::spawn(async move {
                let auth = AuthService::new(&store, &sessions);
                let mut form = input("shared@example.com");
                form.username = format!("user-{i}");
                auth.register(form).await
            }));
        }

        let mut wins = 0;
        let mut conflicts = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => wins += 1,
                Err(AuthError::EmailExists) => conflicts += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(conflicts, 7);
        assert_eq!(store.accounts().count().await, 1);
        assert_eq!(store.customers().count().await, 1);
        assert_eq!(store.carts().count().await, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registers_with_distinct_emails_all_win() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(DocumentStore::open(dir.path()).await.unwrap());
        let sessions = Arc::new(SessionIssuer::new());

        let mut handles = Vec::new();
        for i in 0..8 {
            let store = Arc::clone(&store);
            let sessions = Arc::clone(&sessions);
            handles.push(tokio::spawn(async move {
                let auth = AuthService::new(&store, &sessions);
                auth.register(input(&format!("user-{i}@example.com"))).await
            }));
        }

        let mut account_ids = Vec::new();
        let mut cart_ids = Vec::new();
        for handle in handles {
            let out = handle.await.unwrap().unwrap();
            account_ids.push(out.account.id.as_i64());
            cart_ids.push(out.cart_id.as_i64());
        }

        account_ids.sort_unstable();
        cart_ids.sort_unstable();
        let expected: Vec<i64> = (1..=8).collect();
        assert_eq!(account_ids, expected);
        assert_eq!(cart_ids, expected);
    }

    #[tokio::test]
    async fn failed_cart_insert_rolls_back_profile_and_account() {
        let dir = tempfile::tempdir().unwrap();
        let (store, sessions) = open(dir.path()).await;
        let auth = AuthService::new(&store, &sessions);

        // Occupy the carts tmp path so the third step of the chain fails.
        std::fs::create_dir(dir.path().join("carts.json.tmp")).unwrap();

        let err = auth.register(input("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::Store(StoreError::Unavailable(_))));

        assert_eq!(store.accounts().count().await, 0);
        assert_eq!(store.customers().count().await, 0);
        assert_eq!(store.carts().count().await, 0);

        // Once the store recovers the chain provisions cleanly. The rolled
        // back attempt burned account and customer ids but no cart id.
        std::fs::remove_dir(dir.path().join("carts.json.tmp")).unwrap();
        let out = auth.register(input("ada@example.com")).await.unwrap();
        assert_eq!(out.account.id, AccountId::new(2));
        assert_eq!(out.customer_id, CustomerId::new(2));
        assert_eq!(out.cart_id, CartId::new(1));
    }

    #[tokio::test]
    async fn failed_profile_insert_rolls_back_the_account() {
        let dir = tempfile::tempdir().unwrap();
        let (store, sessions) = open(dir.path()).await;
        let auth = AuthService::new(&store, &sessions);

        std::fs::create_dir(dir.path().join("customers.json.tmp")).unwrap();

        let err = auth.register(input("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, AuthError::Store(StoreError::Unavailable(_))));

        assert_eq!(store.accounts().count().await, 0);
        assert_eq!(store.customers().count().await, 0);
        assert_eq!(store.carts().count().await, 0);
    }

    #[tokio::test]
    async fn login_mints_a_resolvable_token() {
        let dir = tempfile::tempdir().unwrap();
        let (store, sessions) = open(dir.path()).await;
        let auth = AuthService::new(&store, &sessions);

        let registered = auth.register(input("ada@example.com")).await.unwrap();

        let session = auth
            .login(
                "ada@example.com",
                &SecretString::from("correct horse battery staple"),
            )
            .await
            .unwrap();

        assert_eq!(session.account.id, registered.account.id);
        let claims = sessions.resolve(&session.token).await.unwrap();
        assert_eq!(claims.account_id, registered.account.id);
    }

    #[tokio::test]
    async fn each_login_mints_a_distinct_token() {
        let dir = tempfile::tempdir().unwrap();
        let (store, sessions) = open(dir.path()).await;
        let auth = AuthService::new(&store, &sessions);

        auth.register(input("ada@example.com")).await.unwrap();
        let password = SecretString::from("correct horse battery staple");

        let first = auth.login("ada@example.com", &password).await.unwrap();
        let second = auth.login("ada@example.com", &password).await.unwrap();

        assert_ne!(first.token, second.token);
        assert!(sessions.resolve(&first.token).await.is_some());
        assert!(sessions.resolve(&second.token).await.is_some());
    }

    #[tokio::test]
    async fn login_failures_are_distinguished() {
        let dir = tempfile::tempdir().unwrap();
        let (store, sessions) = open(dir.path()).await;
        let auth = AuthService::new(&store, &sessions);

        auth.register(input("ada@example.com")).await.unwrap();
        let password = SecretString::from("correct horse battery staple");

        assert!(matches!(
            auth.login("nobody@example.com", &password).await.unwrap_err(),
            AuthError::UserNotFound
        ));
        assert!(matches!(
            auth.login("not-an-email", &password).await.unwrap_err(),
            AuthError::UserNotFound
        ));
        assert!(matches!(
            auth.login("ada@example.com", &SecretString::from("wrong"))
                .await
                .unwrap_err(),
            AuthError::InvalidPassword
        ));
    }
}
