use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use uuid::Uuid;

use payroll_graphql_client::documents::notes::add_note;
use payroll_graphql_client::{ClientConfig, EntityRef, GraphQLClient, NoteWithUser, Subscription};

/// Optional id of an existing `users` row that live specs may attribute
/// notes to.
pub const ENV_AUTHOR_ID: &str = "E2E_AUTHOR_ID";

/// How long a spec waits for a subscription to deliver a matching item.
pub const SUBSCRIPTION_WAIT: Duration = Duration::from_secs(15);

/// Holds the client and shared fixtures for a test run.
pub struct TestContext {
    pub client: GraphQLClient,
    /// A user known to exist on the endpoint, when one is available.
    pub author: Option<Uuid>,
}

impl TestContext {
    pub fn new(client: GraphQLClient, author: Option<Uuid>) -> Self {
        Self { client, author }
    }

    /// Client configured from the `HASURA_*` variables; author from
    /// [`ENV_AUTHOR_ID`].
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env()?;
        let client = GraphQLClient::new(&config)?;
        let author = match std::env::var(ENV_AUTHOR_ID) {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse()
                    .with_context(|| format!("{ENV_AUTHOR_ID} is not a uuid: {raw}"))?,
            ),
            _ => None,
        };
        Ok(Self::new(client, author))
    }

    /// Author required by a spec; errors when none is configured.
    pub fn require_author(&self) -> Result<Uuid> {
        self.author
            .ok_or_else(|| anyhow!("spec needs a seeded author ({ENV_AUTHOR_ID})"))
    }

    /// Insert a plain note on `entity`.
    pub async fn add_note(&self, entity: &EntityRef, content: &str) -> Result<NoteWithUser> {
        let note = self
            .client
            .add_note(add_note::Variables::new(entity.clone(), content))
            .await
            .with_context(|| format!("add note {content:?}"))?;
        Ok(note)
    }

    pub async fn add_important_note(
        &self,
        entity: &EntityRef,
        content: &str,
    ) -> Result<NoteWithUser> {
        let note = self
            .client
            .add_note(add_note::Variables::new(entity.clone(), content).important(true))
            .await
            .with_context(|| format!("add important note {content:?}"))?;
        Ok(note)
    }

    /// Drop every note a spec created on `entity`.
    pub async fn cleanup(&self, entity: &EntityRef) -> Result<()> {
        self.client.bulk_delete_notes(entity.clone()).await?;
        Ok(())
    }
}

/// Pull items from `subscription` until one satisfies `accept`, or fail after
/// [`SUBSCRIPTION_WAIT`].
pub async fn wait_for<T>(
    subscription: &mut Subscription<T>,
    what: &str,
    mut accept: impl FnMut(&T) -> bool,
) -> Result<T> {
    let deadline = tokio::time::Instant::now() + SUBSCRIPTION_WAIT;
    loop {
        let item = tokio::time::timeout_at(deadline, subscription.next())
            .await
            .map_err(|_| anyhow!("timed out waiting for {what}"))?
            .ok_or_else(|| anyhow!("subscription ended before {what}"))??;
        if accept(&item) {
            return Ok(item);
        }
    }
}
