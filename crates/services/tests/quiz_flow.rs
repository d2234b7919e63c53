use std::sync::Arc;

use async_trait::async_trait;
use fakefinder_core::model::{ImagePairDraft, QuizSettings, QuizSettingsDraft, Side};
use fakefinder_core::scoring::Tier;
use fakefinder_core::time::fixed_now;
use services::{
    CatalogHandle, Clock, QuizIntent, QuizService, QuizUpdate, RestartTarget, SessionError,
    SessionState, load_catalog,
};
use storage::{CatalogDocument, CatalogSource, InMemoryCatalog, StorageError};

/// Catalog source serving a JSON document held in memory.
struct JsonText(&'static str);

#[async_trait]
impl CatalogSource for JsonText {
    async fn load_pairs(&self) -> Result<Vec<ImagePairDraft>, StorageError> {
        Ok(CatalogDocument::from_json(self.0)?.into_drafts())
    }
}

fn drafts(n: usize) -> Vec<ImagePairDraft> {
    (0..n)
        .map(|i| {
            ImagePairDraft::new(
                format!("pair_{i}"),
                format!("images/real_{i}.jpg"),
                format!("images/fake_{i}.jpg"),
            )
        })
        .collect()
}

fn settings(rounds: u32) -> QuizSettings {
    QuizSettingsDraft::new()
        .with_total_rounds(rounds)
        .validate()
        .unwrap()
}

fn synthetic_side(service: &QuizService) -> Side {
    service
        .session()
        .current_round()
        .expect("round in progress")
        .synthetic_side()
}

#[tokio::test]
async fn start_waits_for_catalog_publish() {
    let (publisher, handle) = CatalogHandle::pending();
    let mut service = QuizService::seeded(settings(5), handle, 7);

    assert_eq!(service.start().unwrap_err(), SessionError::NotReady);
    assert_eq!(service.session().state(), SessionState::Welcome);

    publisher.publish(load_catalog(&InMemoryCatalog::new(drafts(8))).await);
    let view = service.start().unwrap();
    assert_eq!(view.round_number, 1);
    assert_eq!(view.total_rounds, 5);
    assert!(service.catalog_notice().is_none());
}

#[tokio::test]
async fn catalog_without_pairs_runs_on_fallback() {
    let source = Arc::new(JsonText(
        r#"{ "metadata": { "total_images": 4 }, "images": { "real_0": "a.jpg" } }"#,
    ));
    let handle = CatalogHandle::spawn(source);
    let mut service = QuizService::seeded(settings(3), handle, 21);

    let view = service.start_when_ready().await.unwrap();
    assert_eq!(view.total_rounds, 3);

    let notice = service.catalog_notice().expect("degraded mode is flagged");
    assert!(notice.to_string().contains("insufficient image data"));

    let fallback_ids: Vec<_> = service
        .session()
        .rounds()
        .iter()
        .map(|round| round.source_pair_id().as_str().to_owned())
        .collect();
    assert!(fallback_ids.iter().all(|id| id.starts_with("fallback_")));
}

#[tokio::test]
async fn restart_then_perfect_run_scores_everything() {
    let handle = CatalogHandle::spawn(Arc::new(InMemoryCatalog::new(drafts(12))));
    let mut service =
        QuizService::seeded(settings(10), handle, 3).with_clock(Clock::fixed(fixed_now()));

    service.start_when_ready().await.unwrap();
    service.select_answer(Side::Left).unwrap();
    service.advance().unwrap();

    service.restart(RestartTarget::Welcome).unwrap();
    assert_eq!(service.session().score(), 0);
    service.start().unwrap();

    let report = loop {
        let side = synthetic_side(&service);
        let feedback = service.select_answer(side).unwrap();
        assert!(feedback.correct);
        match service.advance().unwrap() {
            QuizUpdate::Finished(report) => break report,
            QuizUpdate::Round(_) => {}
            other => panic!("unexpected update {other:?}"),
        }
    };

    assert_eq!(report.score, 10);
    assert_eq!(report.total_rounds, 10);
    assert_eq!(report.percentage, 100);
    assert_eq!(report.tier, Tier::Excellent);
    assert_eq!(report.summary.started_at(), fixed_now());

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["summary"]["started_at"], "2023-11-14T22:13:20Z");
    assert_eq!(json["tier"], "Excellent");
}

#[tokio::test]
async fn small_catalog_still_fills_every_round() {
    let handle = CatalogHandle::spawn(Arc::new(InMemoryCatalog::new(drafts(3))));
    let mut service = QuizService::seeded(settings(5), handle, 9);

    service.start_when_ready().await.unwrap();
    assert_eq!(service.session().rounds().len(), 5);

    let mut answered = 0;
    loop {
        service.apply(QuizIntent::Select(Side::Right)).unwrap();
        answered += 1;
        if let QuizUpdate::Finished(report) = service.apply(QuizIntent::Advance).unwrap() {
            assert!(report.score <= 5);
            break;
        }
    }
    assert_eq!(answered, 5);
}

#[tokio::test]
async fn intents_drive_a_full_session() {
    let handle = CatalogHandle::spawn(Arc::new(InMemoryCatalog::new(drafts(10))));
    let mut service = QuizService::seeded(settings(5), handle, 42);
    handle_ready(&service).await;

    let QuizUpdate::Round(view) = service.apply(QuizIntent::Start).unwrap() else {
        panic!("start should show the first round");
    };
    let json = serde_json::to_value(&view).unwrap();
    assert_eq!(json["round_number"], 1);

    // Wrong, then right, then wrong twice, then right.
    let mut expected_score = 0;
    for wrong in [true, false, true, true, false] {
        let synthetic = synthetic_side(&service);
        let pick = if wrong { synthetic.opposite() } else { synthetic };
        let QuizUpdate::Answered(feedback) = service.apply(QuizIntent::Select(pick)).unwrap()
        else {
            panic!("selection should produce feedback");
        };
        if !wrong {
            expected_score += 1;
        }
        assert_eq!(feedback.correct, !wrong);
        assert_eq!(feedback.score, expected_score);

        let duplicate = service.apply(QuizIntent::Select(synthetic)).unwrap_err();
        assert_eq!(duplicate, SessionError::DuplicateSelection);
        assert_eq!(service.session().score(), expected_score);
        assert_eq!(service.session().pending_selection(), Some(pick));

        service.apply(QuizIntent::Advance).unwrap();
    }

    let report = service.final_report().unwrap();
    assert_eq!(report.score, 2);
    assert_eq!(report.percentage, 40);
    assert_eq!(report.tier, Tier::Fair);

    assert_eq!(service.apply(QuizIntent::GoHome).unwrap(), QuizUpdate::Home);
    assert!(matches!(
        service.apply(QuizIntent::Restart(RestartTarget::Play)).unwrap(),
        QuizUpdate::Round(_)
    ));
    assert_eq!(service.session().state(), SessionState::InProgress);
}

async fn handle_ready(service: &QuizService) {
    while !service.is_catalog_ready() {
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
}
