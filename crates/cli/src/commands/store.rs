//! Document store management commands.

use secrecy::SecretString;

use brightspoke_api::config::ApiConfig;
use brightspoke_api::services::auth::{AuthError, AuthService, NewAccount};
use brightspoke_api::services::sessions::SessionIssuer;
use brightspoke_api::store::DocumentStore;

use super::CliError;

/// Create the data directory and materialize the collection files.
///
/// Safe to run against an existing store; records are left untouched.
pub async fn init() -> Result<(), CliError> {
    let config = ApiConfig::from_env()?;
    let store = DocumentStore::open(&config.data_dir).await?;
    store.flush_all().await?;

    tracing::info!(
        dir = %store.dir().display(),
        accounts = store.accounts().count().await,
        customers = store.customers().count().await,
        carts = store.carts().count().await,
        "Document store initialized"
    );

    Ok(())
}

/// Provision the demo customer through the real registration chain.
///
/// Running it twice is fine; the second run reports the existing account.
pub async fn seed() -> Result<(), CliError> {
    let config = ApiConfig::from_env()?;
    let store = DocumentStore::open(&config.data_dir).await?;
    let sessions = SessionIssuer::new();
    let auth = AuthService::new(&store, &sessions);

    let demo = NewAccount {
        username: "demo".to_owned(),
        email: "demo@brightspoke.dev".to_owned(),
        password: SecretString::from("brightspoke-demo"),
        first_name: "Demo".to_owned(),
        last_name: "Customer".to_owned(),
    };

    match auth.register(demo).await {
        Ok(provisioned) => {
            tracing::info!(
                account_id = %provisioned.account.id,
                customer_id = %provisioned.customer_id,
                cart_id = %provisioned.cart_id,
                "Seeded demo customer (demo@brightspoke.dev / brightspoke-demo)"
            );
            Ok(())
        }
        Err(AuthError::EmailExists) => {
            tracing::info!("Demo customer already seeded");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
