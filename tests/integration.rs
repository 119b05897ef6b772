// ABOUTME: Integration tests verifying modules work together.
// ABOUTME: Drives the public API with a scripted provider, no network.

use std::sync::Arc;
use std::time::Duration;

use dictbot::prelude::*;

fn coordinator(
    provider: &Arc<ScriptedProvider>,
    config: CoordinatorConfig,
) -> Arc<RequestCoordinator> {
    Arc::new(RequestCoordinator::new(provider.clone(), config).expect("valid config"))
}

#[tokio::test]
async fn test_both_lookups_succeed() {
    let provider = Arc::new(ScriptedProvider::new(
        Script::answer("alpha"),
        Script::answer("beta"),
    ));
    let coordinator = coordinator(&provider, CoordinatorConfig::new(10));

    let result = coordinator.handle("u1", "word").await.unwrap();

    assert_eq!(
        result,
        FanOutResult {
            definitions: "alpha".to_string(),
            synonyms: "beta".to_string(),
        }
    );
}

#[tokio::test]
async fn test_same_user_rejected_and_window_consumed() {
    let provider = Arc::new(ScriptedProvider::new(
        Script::answer("alpha").after(Duration::from_millis(150)),
        Script::answer("beta"),
    ));
    let coordinator = coordinator(&provider, CoordinatorConfig::new(1));

    let call_a = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.handle("u1", "slow").await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    // Window is already consumed by call A, so admission fails first.
    let call_c = coordinator.handle("u2", "other").await;
    assert!(matches!(
        call_c,
        Err(CoordinatorError::CapacityExceeded { .. })
    ));

    assert!(call_a.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_same_user_rejected_while_in_flight() {
    let provider = Arc::new(ScriptedProvider::new(
        Script::answer("alpha").after(Duration::from_millis(150)),
        Script::answer("beta"),
    ));
    let coordinator = coordinator(&provider, CoordinatorConfig::new(10));

    let first = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.handle("u1", "slow").await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;

    for _ in 0..3 {
        let overlapping = coordinator.handle("u1", "again").await;
        assert!(matches!(overlapping, Err(CoordinatorError::TooFast)));
    }
    // Other users are not affected by u1's gate.
    let other = {
        let coordinator = coordinator.clone();
        tokio::spawn(async move { coordinator.handle("u2", "fine").await })
    };

    assert!(first.await.unwrap().is_ok());
    assert!(other.await.unwrap().is_ok());
}

#[tokio::test]
async fn test_failure_makes_user_reusable_immediately() {
    let provider = Arc::new(ScriptedProvider::new(
        Script::fail("boom"),
        Script::answer("beta").after(Duration::from_secs(10)),
    ));
    let coordinator = coordinator(&provider, CoordinatorConfig::new(10));

    let err = coordinator.handle("u1", "word").await.unwrap_err();
    match &err {
        CoordinatorError::Downstream(LookupError::Failed(message)) => assert_eq!(message, "boom"),
        other => panic!("Expected Downstream(Failed), got {:?}", other),
    }

    // The next call is admitted through the gate right away and fails
    // the same way rather than with TooFast.
    let again = coordinator.handle("u1", "word").await.unwrap_err();
    assert!(matches!(again, CoordinatorError::Downstream(_)));
}

#[tokio::test]
async fn test_admission_resumes_after_window() {
    let provider = Arc::new(ScriptedProvider::new(
        Script::answer("alpha"),
        Script::answer("beta"),
    ));
    let config = CoordinatorConfig::new(2).window(Duration::from_millis(80));
    let coordinator = coordinator(&provider, config);

    assert!(coordinator.handle("u1", "one").await.is_ok());
    assert!(coordinator.handle("u2", "two").await.is_ok());
    for user in ["u3", "u4", "u5"] {
        assert!(matches!(
            coordinator.handle(user, "more").await,
            Err(CoordinatorError::CapacityExceeded { .. })
        ));
    }

    tokio::time::sleep(Duration::from_millis(150)).await;

    assert!(coordinator.handle("u3", "three").await.is_ok());
    assert_eq!(coordinator.admitted(), 1);
    coordinator.shutdown();
}

#[tokio::test]
async fn test_new_and_returning_users_behave_alike() {
    let provider = Arc::new(ScriptedProvider::new(
        Script::answer("alpha"),
        Script::answer("beta"),
    ));
    let coordinator = coordinator(&provider, CoordinatorConfig::new(10));

    coordinator.handle("returning", "word").await.unwrap();

    let returning = coordinator.handle("returning", "word").await.unwrap();
    let fresh = coordinator.handle("fresh", "word").await.unwrap();
    assert_eq!(returning, fresh);
    assert_eq!(coordinator.in_flight(), 0);
}

#[tokio::test]
async fn test_bot_round_trip_through_coordinator() {
    struct Collect(std::sync::Mutex<Vec<String>>);

    #[async_trait::async_trait]
    impl ReplySink for Collect {
        async fn reply(&self, _token: &str, messages: &[String]) -> Result<(), DeliveryError> {
            self.0.lock().unwrap().extend_from_slice(messages);
            Ok(())
        }
    }

    let provider = Arc::new(ScriptedProvider::new(
        Script::answer("a playing card"),
        Script::answer("expert and master"),
    ));
    let coordinator = coordinator(&provider, CoordinatorConfig::new(10));
    let sink = Arc::new(Collect(std::sync::Mutex::new(Vec::new())));
    let bot = DictBot::new(coordinator, sink.clone());

    bot.respond(&[Event::Message {
        user_id: "u1".to_string(),
        reply_token: "r1".to_string(),
        text: "ace of spades".to_string(),
    }])
    .await
    .unwrap();

    assert_eq!(
        *sink.0.lock().unwrap(),
        vec!["a playing card".to_string(), "expert and master".to_string()]
    );
    assert_eq!(provider.words(), vec!["ace", "ace"]);
}

#[test]
fn test_errors_unify_under_dict_error() {
    let err = DictError::from(CoordinatorError::TooFast);
    assert_eq!(err.to_string(), "Coordinator error: You're too fast, please slow down.");

    let err = DictError::from(ConfigError::Missing("OXFORD_API_KEY".to_string()));
    assert!(matches!(err, DictError::Config(_)));
}
