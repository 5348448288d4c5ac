use messaging::ChangeNotifier;
use std::sync::Arc;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{UserError, UserResult};
use crate::models::{CreateUser, UpdateUser, User, UserPage, normalize_country};
use crate::password::hash_password;
use crate::repository::UserRepository;

/// Orchestrates user mutations: builds entities, persists them, and
/// announces successful updates.
///
/// Inputs are expected to have passed validation already.
pub struct UserService<R: UserRepository, N: ChangeNotifier> {
    repository: Arc<R>,
    notifier: Arc<N>,
}

impl<R: UserRepository, N: ChangeNotifier> Clone for UserService<R, N> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
            notifier: Arc::clone(&self.notifier),
        }
    }
}

impl<R: UserRepository, N: ChangeNotifier> UserService<R, N> {
    pub fn new(repository: R, notifier: N) -> Self {
        Self {
            repository: Arc::new(repository),
            notifier: Arc::new(notifier),
        }
    }

    /// Create a user and return its newly assigned id
    #[instrument(skip(self, input), fields(nickname = %input.nickname))]
    pub async fn create_user(&self, input: CreateUser) -> UserResult<Uuid> {
        let id = Uuid::now_v7();
        let user = User::new(
            id,
            input.first_name,
            input.last_name,
            input.nickname,
            input.email,
            normalize_country(&input.country),
            hash_password(&input.password)?,
        );

        self.repository.add(user).await?;
        Ok(id)
    }

    /// Replace a user's mutable fields. Subscribers are notified only after
    /// the store accepted the change, and the caller never waits for delivery.
    #[instrument(skip(self, input), fields(user_id = %input.id))]
    pub async fn update_user(&self, input: UpdateUser) -> UserResult<Uuid> {
        let id = parse_id(&input.id)?;
        let user = User::new(
            id,
            input.first_name,
            input.last_name,
            input.nickname,
            input.email,
            normalize_country(&input.country),
            hash_password(&input.password)?,
        );

        self.repository.update(user).await?;
        self.notifier.notify(id);
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn delete_user(&self, id: &str) -> UserResult<Uuid> {
        let id = parse_id(id)?;
        self.repository.delete(id).await?;
        Ok(id)
    }

    pub async fn list_users(&self, page: UserPage) -> UserResult<Vec<User>> {
        self.repository
            .query(page.filter, page.offset, page.limit)
            .await
    }
}

fn parse_id(raw: &str) -> UserResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| UserError::Validation(format!("invalid id '{}': {}", raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::UniqueField;
    use crate::models::UserFilter;
    use crate::password::verify_password;
    use crate::repository::{InMemoryUserRepository, MockUserRepository};
    use async_trait::async_trait;
    use messaging::{Broker, ChangePublisher, MessagingError};
    use mockall::predicate::eq;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use validator::Validate;

    #[derive(Clone, Default)]
    struct RecordingNotifier {
        ids: Arc<Mutex<Vec<Uuid>>>,
    }

    impl RecordingNotifier {
        fn ids(&self) -> Vec<Uuid> {
            self.ids.lock().unwrap().clone()
        }
    }

    impl ChangeNotifier for RecordingNotifier {
        fn notify(&self, id: Uuid) {
            self.ids.lock().unwrap().push(id);
        }
    }

    /// Forwards every publish to a channel the test can read.
    struct ChannelBroker(mpsc::UnboundedSender<String>);

    #[async_trait]
    impl Broker for ChannelBroker {
        async fn publish(&self, payload: String) -> Result<(), MessagingError> {
            let _ = self.0.send(payload);
            Ok(())
        }
    }

    /// A broker that never answers.
    struct StalledBroker;

    #[async_trait]
    impl Broker for StalledBroker {
        async fn publish(&self, _payload: String) -> Result<(), MessagingError> {
            std::future::pending().await
        }
    }

    fn create_input(nickname: &str, email: &str, country: &str) -> CreateUser {
        CreateUser {
            first_name: "Ana".to_string(),
            last_name: "Ivanovic".to_string(),
            nickname: nickname.to_string(),
            password: "correct horse".to_string(),
            email: email.to_string(),
            country: country.to_string(),
        }
    }

    fn update_input(id: &str, nickname: &str) -> UpdateUser {
        UpdateUser {
            id: id.to_string(),
            first_name: "Ana".to_string(),
            last_name: "Ivanovic".to_string(),
            nickname: nickname.to_string(),
            password: "battery staple".to_string(),
            email: format!("{nickname}@example.com"),
            country: "rs".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_builds_normalized_hashed_user() {
        let mut repo = MockUserRepository::new();
        repo.expect_add()
            .withf(|user| {
                user.country == "RS"
                    && user.nickname == "ana"
                    && user.password_hash != "correct horse"
                    && verify_password(&user.password_hash, "correct horse").unwrap()
            })
            .times(1)
            .returning(|_| Ok(()));
        let notifier = RecordingNotifier::default();
        let service = UserService::new(repo, notifier.clone());

        let id = service
            .create_user(create_input("ana", "ana@example.com", "rs"))
            .await
            .unwrap();

        assert_eq!(id.get_version_num(), 7);
        assert!(notifier.ids().is_empty());
    }

    #[tokio::test]
    async fn test_create_propagates_conflict() {
        let mut repo = MockUserRepository::new();
        repo.expect_add()
            .returning(|_| Err(UserError::Conflict(UniqueField::Email)));
        let service = UserService::new(repo, RecordingNotifier::default());

        let err = service
            .create_user(create_input("ana", "ana@example.com", "RS"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Conflict(UniqueField::Email)));
    }

    #[tokio::test]
    async fn test_update_notifies_once_after_success() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_update()
            .withf(move |user| user.id == id && user.country == "RS")
            .times(1)
            .returning(|_| Ok(()));
        let notifier = RecordingNotifier::default();
        let service = UserService::new(repo, notifier.clone());

        let updated = service
            .update_user(update_input(&id.to_string(), "ana"))
            .await
            .unwrap();

        assert_eq!(updated, id);
        assert_eq!(notifier.ids(), vec![id]);
    }

    #[tokio::test]
    async fn test_failed_update_does_not_notify() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_update()
            .times(1)
            .returning(move |_| Err(UserError::NotFound(id)));
        let notifier = RecordingNotifier::default();
        let service = UserService::new(repo, notifier.clone());

        let err = service
            .update_user(update_input(&id.to_string(), "ana"))
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::NotFound(missing) if missing == id));
        assert!(notifier.ids().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_id_never_reaches_store() {
        let mut repo = MockUserRepository::new();
        repo.expect_update().never();
        repo.expect_delete().never();
        let service = UserService::new(repo, RecordingNotifier::default());

        assert!(matches!(
            service.update_user(update_input("not-a-uuid", "ana")).await,
            Err(UserError::Validation(_))
        ));
        assert!(matches!(
            service.delete_user("not-a-uuid").await,
            Err(UserError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_delete_passes_result_through() {
        let id = Uuid::new_v4();
        let mut repo = MockUserRepository::new();
        repo.expect_delete()
            .with(eq(id))
            .times(1)
            .returning(|_| Ok(()));
        let notifier = RecordingNotifier::default();
        let service = UserService::new(repo, notifier.clone());

        assert_eq!(service.delete_user(&id.to_string()).await.unwrap(), id);
        assert!(notifier.ids().is_empty());
    }

    #[tokio::test]
    async fn test_list_passes_page_through() {
        let filter = UserFilter {
            country: Some("RS".to_string()),
            ..Default::default()
        };
        let mut repo = MockUserRepository::new();
        repo.expect_query()
            .with(eq(Some(filter.clone())), eq(5u64), eq(10u64))
            .times(1)
            .returning(|_, _, _| Ok(vec![]));
        let service = UserService::new(repo, RecordingNotifier::default());

        let users = service
            .list_users(UserPage {
                filter: Some(filter),
                offset: 5,
                limit: 10,
            })
            .await
            .unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_nickname_or_email_is_rejected() {
        let repo = InMemoryUserRepository::new();
        let service = UserService::new(repo.clone(), RecordingNotifier::default());

        service
            .create_user(create_input("neo", "neo@example.com", "RS"))
            .await
            .unwrap();

        let err = service
            .create_user(create_input("neo", "other@example.com", "RS"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Conflict(UniqueField::Nickname)));

        let err = service
            .create_user(create_input("other", "neo@example.com", "RS"))
            .await
            .unwrap_err();
        assert!(matches!(err, UserError::Conflict(UniqueField::Email)));

        let stored = repo.query(None, 0, 0).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].nickname, "neo");
        assert_eq!(stored[0].email, "neo@example.com");
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let service = UserService::new(InMemoryUserRepository::new(), RecordingNotifier::default());
        let ghost = Uuid::new_v4().to_string();

        assert!(matches!(
            service.update_user(update_input(&ghost, "ghost")).await,
            Err(UserError::NotFound(_))
        ));
        assert!(matches!(
            service.delete_user(&ghost).await,
            Err(UserError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_update_of_unknown_id_with_taken_nickname_is_not_found() {
        let notifier = RecordingNotifier::default();
        let service = UserService::new(InMemoryUserRepository::new(), notifier.clone());
        service
            .create_user(create_input("neo", "neo@example.com", "RS"))
            .await
            .unwrap();

        let ghost = Uuid::new_v4().to_string();
        let err = service
            .update_user(update_input(&ghost, "neo"))
            .await
            .unwrap_err();

        assert!(matches!(err, UserError::NotFound(_)));
        assert!(notifier.ids().is_empty());
    }

    #[tokio::test]
    async fn test_stored_country_is_two_uppercase_letters() {
        let repo = InMemoryUserRepository::new();
        let service = UserService::new(repo.clone(), RecordingNotifier::default());

        for (n, country) in ["rs", "Rs", "rS", "RS", "de"].iter().enumerate() {
            let input = create_input(&format!("u{n}"), &format!("u{n}@example.com"), country);
            assert!(input.validate().is_ok());
            service.create_user(input).await.unwrap();
        }

        for user in repo.query(None, 0, 0).await.unwrap() {
            assert_eq!(user.country.len(), 2);
            assert!(user.country.bytes().all(|b| b.is_ascii_uppercase()));
        }
    }

    #[tokio::test]
    async fn test_country_case_is_normalized() {
        let service = UserService::new(InMemoryUserRepository::new(), RecordingNotifier::default());

        service
            .create_user(create_input("lower", "lower@example.com", "rs"))
            .await
            .unwrap();
        service
            .create_user(create_input("upper", "upper@example.com", "RS"))
            .await
            .unwrap();

        let users = service
            .list_users(UserPage {
                filter: Some(UserFilter {
                    country: Some("RS".to_string()),
                    ..Default::default()
                }),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(users.len(), 2);
        assert!(users.iter().all(|u| u.country == "RS"));
    }

    #[tokio::test]
    async fn test_page_skips_offset_rows() {
        let service = UserService::new(InMemoryUserRepository::new(), RecordingNotifier::default());
        let mut ids = Vec::new();
        for n in 0..4 {
            ids.push(
                service
                    .create_user(create_input(&format!("u{n}"), &format!("u{n}@example.com"), "DE"))
                    .await
                    .unwrap(),
            );
        }

        let page = service
            .list_users(UserPage {
                filter: None,
                offset: 1,
                limit: 2,
            })
            .await
            .unwrap();

        let page_ids: Vec<Uuid> = page.iter().map(|u| u.id).collect();
        assert_eq!(page_ids, ids[1..3]);
    }

    #[tokio::test]
    async fn test_update_publishes_exactly_one_message() {
        let (tx, mut published) = mpsc::unbounded_channel();
        let (publisher, _worker) = ChangePublisher::start(ChannelBroker(tx));
        let service = UserService::new(InMemoryUserRepository::new(), publisher);

        let id = service
            .create_user(create_input("neo", "neo@example.com", "RS"))
            .await
            .unwrap();
        service
            .update_user(update_input(&id.to_string(), "the-one"))
            .await
            .unwrap();
        let missing = Uuid::new_v4().to_string();
        assert!(service.update_user(update_input(&missing, "ghost")).await.is_err());

        let message = tokio::time::timeout(Duration::from_secs(1), published.recv())
            .await
            .expect("no notification within a second")
            .unwrap();
        assert_eq!(message, id.to_string());

        let extra = tokio::time::timeout(Duration::from_millis(100), published.recv()).await;
        assert!(extra.is_err(), "unexpected second notification");
    }

    #[tokio::test]
    async fn test_update_does_not_wait_for_stalled_broker() {
        let (publisher, _worker) = ChangePublisher::start(StalledBroker);
        let service = UserService::new(InMemoryUserRepository::new(), publisher);
        let id = service
            .create_user(create_input("neo", "neo@example.com", "RS"))
            .await
            .unwrap();

        for round in 0..3 {
            let result = tokio::time::timeout(
                Duration::from_secs(2),
                service.update_user(update_input(&id.to_string(), &format!("neo{round}"))),
            )
            .await
            .expect("update blocked on the broker");
            assert_eq!(result.unwrap(), id);
        }
    }

    #[tokio::test]
    async fn test_update_succeeds_without_broker() {
        let service = UserService::new(InMemoryUserRepository::new(), ChangePublisher::disconnected());
        let id = service
            .create_user(create_input("neo", "neo@example.com", "RS"))
            .await
            .unwrap();

        assert_eq!(
            service
                .update_user(update_input(&id.to_string(), "the-one"))
                .await
                .unwrap(),
            id
        );
        assert!(matches!(
            service
                .update_user(update_input(&Uuid::new_v4().to_string(), "ghost"))
                .await,
            Err(UserError::NotFound(_))
        ));
    }
}
