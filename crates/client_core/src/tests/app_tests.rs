use super::*;
use crate::{
    controller::Outcome,
    test_support::{ash, trainer, Call, ScriptedStore},
    view::Action,
};
use shared::domain::{CreatureId, TrainerId};

#[tokio::test]
async fn launch_renders_every_trainer_once() {
    let store = Arc::new(ScriptedStore::new(vec![
        ash(),
        trainer(2, "Misty", Vec::new()),
    ]));

    let app = App::launch(store.clone()).await;

    assert_eq!(store.calls().await, vec![Call::List]);
    let view = app.view().lock().await;
    assert_eq!(view.children(view.root()).len(), 2);
    assert_eq!(view.roster_len(TrainerId(1)), Some(1));
    assert_eq!(view.roster_len(TrainerId(2)), Some(0));
}

#[tokio::test]
async fn failed_listing_leaves_empty_root() {
    let store = Arc::new(ScriptedStore::new(vec![ash()]).failing());

    let app = App::launch(store).await;

    assert_eq!(app.html().await, "<main></main>");
}

#[tokio::test]
async fn release_then_add_scenario() {
    let store = Arc::new(ScriptedStore::new(vec![ash()]));
    let app = App::launch(store.clone()).await;
    assert!(app.html().await.contains(
        "<li>Pika (Pikachu) <button class=\"release\" data-pokemon-id=\"10\">Release</button></li>"
    ));

    let added = app
        .controller()
        .dispatch(Action::AddCreature {
            trainer_id: TrainerId(1),
        })
        .await;
    assert!(matches!(added, Outcome::Added { .. }));
    assert_eq!(app.view().lock().await.roster_len(TrainerId(1)), Some(2));

    let released = app
        .controller()
        .dispatch(Action::ReleaseCreature {
            creature_id: CreatureId(10),
        })
        .await;
    assert!(matches!(released, Outcome::Released { .. }));

    let html = app.html().await;
    assert!(!html.contains("Pika (Pikachu)"));
    assert!(html.contains("Squirt (Squirtle)"));
    assert_eq!(
        store.calls().await,
        vec![
            Call::List,
            Call::Create(TrainerId(1)),
            Call::Delete(CreatureId(10))
        ]
    );
}

#[tokio::test]
async fn connect_rejects_invalid_base_url() {
    let settings = Settings {
        base_url: "not a url".into(),
        ..Settings::default()
    };
    assert!(App::connect(&settings).await.is_err());
}

#[tokio::test]
async fn outline_starts_at_root() {
    let app = App::launch(Arc::new(ScriptedStore::new(vec![ash()]))).await;
    let outline = app.outline().await;
    assert_eq!(outline.first().map(String::as_str), Some("#0 main"));
    assert!(outline.iter().any(|line| line.contains("\"Ash\"")));
}
