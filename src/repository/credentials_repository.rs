use sqlx::{query, query_as, FromRow, Pool, Sqlite};

use crate::models::Credentials;

#[derive(Debug, Clone)]
pub struct CredentialsRepository {
    pool: Pool<Sqlite>,
}

impl CredentialsRepository {
    pub fn new(pool: Pool<Sqlite>) -> CredentialsRepository {
        CredentialsRepository { pool }
    }

    pub async fn load(&self) -> Result<Option<Credentials>, anyhow::Error> {
        let row = query_as::<_, SqlCredentials>(
            r#"
                SELECT token, account_id, target_repository
                FROM credentials
                WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Credentials::from))
    }

    pub async fn save(&self, credentials: &Credentials) -> Result<(), anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        query(
            r#"
                INSERT INTO credentials (id, token, account_id, target_repository)
                VALUES (1, $1, $2, $3)
                ON CONFLICT (id) DO UPDATE SET
                    token = $1,
                    account_id = $2,
                    target_repository = $3
            "#,
        )
        .bind(&credentials.token)
        .bind(&credentials.account_id)
        .bind(&credentials.target_repository)
        .execute(&mut *transaction)
        .await?;

        transaction.commit().await?;

        Ok(())
    }

    /// Wipes every persisted record: credentials and history alike.
    pub async fn logout(&self) -> Result<(), anyhow::Error> {
        let mut transaction = self.pool.begin().await?;

        query("DELETE FROM credentials")
            .execute(&mut *transaction)
            .await?;
        query("DELETE FROM publish_history")
            .execute(&mut *transaction)
            .await?;

        transaction.commit().await?;

        Ok(())
    }
}

#[derive(FromRow)]
struct SqlCredentials {
    token: String,
    account_id: String,
    target_repository: String,
}

impl From<SqlCredentials> for Credentials {
    fn from(value: SqlCredentials) -> Self {
        Credentials {
            token: value.token,
            account_id: value.account_id,
            target_repository: value.target_repository,
        }
    }
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::CredentialsRepository;
    use crate::{
        models::{types::EpochMillis, Credentials, Platform, PublishRecord, Submission},
        repository::{test_pool, HistoryRepository},
    };

    fn credentials(repo: &str) -> Credentials {
        Credentials {
            token: "ghp_token".to_string(),
            account_id: "octocat".to_string(),
            target_repository: repo.to_string(),
        }
    }

    #[test(tokio::test)]
    async fn empty_by_default() {
        let repository = CredentialsRepository::new(test_pool().await);
        assert_eq!(repository.load().await.unwrap(), None);
    }

    #[test(tokio::test)]
    async fn save_replaces_previous() {
        let repository = CredentialsRepository::new(test_pool().await);

        repository.save(&credentials("octocat/first")).await.unwrap();
        repository.save(&credentials("octocat/second")).await.unwrap();

        assert_eq!(
            repository.load().await.unwrap(),
            Some(credentials("octocat/second"))
        );
    }

    #[test(tokio::test)]
    async fn logout_wipes_credentials_and_history() {
        let pool = test_pool().await;
        let repository = CredentialsRepository::new(pool.clone());
        let history = HistoryRepository::new(pool);

        repository.save(&credentials("octocat/solutions")).await.unwrap();
        history
            .append(&PublishRecord {
                submission: Submission::new(
                    Platform::LeetCode,
                    "Two Sum",
                    "python",
                    "print(1)",
                    "",
                    EpochMillis(1),
                ),
                remote_url: "https://github.com/octocat/solutions".to_string(),
                published_at: EpochMillis(2),
            })
            .await
            .unwrap();

        repository.logout().await.unwrap();

        assert_eq!(repository.load().await.unwrap(), None);
        assert!(history.list(10).await.unwrap().is_empty());
    }
}
