//! Account management commands.

use secrecy::SecretString;

use brightspoke_api::config::ApiConfig;
use brightspoke_api::services::auth::{AuthService, NewAccount};
use brightspoke_api::services::sessions::SessionIssuer;
use brightspoke_api::store::DocumentStore;
use brightspoke_core::Role;

use super::CliError;

/// Create a new account.
///
/// Customers get the full provisioning chain (account, profile, empty
/// cart); admins get a bare account.
pub async fn create(
    email: &str,
    username: &str,
    password: &str,
    first_name: &str,
    last_name: &str,
    role: &str,
) -> Result<(), CliError> {
    let role: Role = role
        .parse()
        .map_err(|_| CliError::InvalidRole(role.to_owned()))?;

    let config = ApiConfig::from_env()?;
    let store = DocumentStore::open(&config.data_dir).await?;
    let sessions = SessionIssuer::new();
    let auth = AuthService::new(&store, &sessions);

    let input = NewAccount {
        username: username.to_owned(),
        email: email.to_owned(),
        password: SecretString::from(password.to_owned()),
        first_name: first_name.to_owned(),
        last_name: last_name.to_owned(),
    };

    match role {
        Role::Customer => {
            let provisioned = auth.register(input).await?;
            tracing::info!(
                account_id = %provisioned.account.id,
                customer_id = %provisioned.customer_id,
                cart_id = %provisioned.cart_id,
                email = %provisioned.account.email,
                "Customer account created"
            );
        }
        Role::Admin => {
            let account = auth.create_account(input, Role::Admin).await?;
            tracing::info!(
                account_id = %account.id,
                email = %account.email,
                "Admin account created"
            );
        }
    }

    Ok(())
}
