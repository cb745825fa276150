mod common;

use brokecoin_admin::dialog::{ConfirmOutcome, SubmitOutcome};
use brokecoin_admin::features::tasks::TasksPage;
use brokecoin_admin::models::{Currency, TaskStatus, TaskType};
use rstest::rstest;
use serde_json::Value;

use common::{context, MockBackend, USERNAME};

fn filled(page: &mut TasksPage) {
    page.open_create();
    let form = page.drawer.values_mut();
    form.title = "Follow us on X".into();
    form.description = Some("  ".into());
    form.task_type = TaskType::Social;
    form.reward_amount = 25.0;
    form.reward_type = Currency::Chips;
    form.task_link = Some("https://x.com/brokecoin".into());
}

#[rstest]
#[case::empty_title("", 10.0, "title")]
#[case::blank_title("   ", 10.0, "title")]
#[case::negative_reward("Daily spin", -1.0, "reward_amount")]
#[tokio::test]
async fn invalid_task_is_never_posted(
    #[case] title: &str,
    #[case] reward: f64,
    #[case] field: &str,
) {
    let backend = MockBackend::start().await;
    let mut page = TasksPage::new(backend.signed_in_client(), context(), 10);
    page.open_create();
    page.drawer.values_mut().title = title.into();
    page.drawer.values_mut().reward_amount = reward;

    let outcome = page.save().await;
    let SubmitOutcome::Invalid(errors) = outcome else {
        panic!("expected validation failure, got {outcome:?}");
    };
    assert!(errors.field_errors().contains_key(field));
    assert!(page.drawer.is_open());
    assert_eq!(backend.calls("POST /tasks"), 0);
}

#[tokio::test]
async fn created_task_is_stamped_with_the_signed_in_admin() {
    let backend = MockBackend::start().await;
    let ctx = context();
    let mut page = TasksPage::new(backend.signed_in_client(), ctx.clone(), 10);
    page.load().await.unwrap();

    filled(&mut page);
    assert!(page.save().await.is_saved());
    assert!(!page.drawer.is_open());
    assert_eq!(backend.calls("POST /tasks"), 1);
    assert_eq!(ctx.notifier.drain()[0].message, "Task created successfully.");

    let body = backend.last_body().unwrap();
    assert_eq!(body["created_by"]["username"], USERNAME);
    assert_eq!(body["metadata"], Value::Null);
    assert_eq!(body["description"], Value::Null);
    assert_eq!(body["task_type"], "social");
    assert_eq!(body["reward_type"], "chips");

    page.load().await.unwrap();
    assert_eq!(backend.calls("GET /tasks"), 2);
    let task = page.list.table().row(0).unwrap();
    assert_eq!(task.title, "Follow us on X");
    assert_eq!(task.creator().map(|a| a.username.as_str()), Some(USERNAME));
}

#[tokio::test]
async fn editing_puts_to_the_same_task() {
    let backend = MockBackend::start().await;
    let mut page = TasksPage::new(backend.signed_in_client(), context(), 10);
    filled(&mut page);
    assert!(page.save().await.is_saved());
    page.load().await.unwrap();

    let task = page.list.table().row(0).cloned().unwrap();
    page.open_update(&task);
    assert_eq!(page.drawer.values().title, "Follow us on X");
    page.drawer.values_mut().reward_amount = 50.0;
    assert!(page.save().await.is_saved());
    assert_eq!(backend.calls("PUT /tasks/:id"), 1);
    assert_eq!(backend.last_body().unwrap()["reward_amount"], 50.0);
}

#[tokio::test]
async fn status_comment_and_delete() {
    let backend = MockBackend::start().await;
    let ctx = context();
    let mut page = TasksPage::new(backend.signed_in_client(), ctx.clone(), 10);
    filled(&mut page);
    assert!(page.save().await.is_saved());
    page.load().await.unwrap();
    let task = page.list.table().row(0).cloned().unwrap();

    page.open_status(&task);
    page.status.values_mut().status = TaskStatus::InProgress;
    assert!(page.save_status(task.id).await.is_saved());
    assert_eq!(backend.last_body().unwrap()["status"], "in_progress");

    page.comment.open();
    page.comment.values_mut().comment = "  needs a banner  ".into();
    assert!(page.add_comment(task.id).await.is_saved());
    assert_eq!(
        backend.state.lock().comments,
        vec![(task.id, "needs a banner".to_string())]
    );

    page.request_delete(task);
    assert!(matches!(page.confirm_delete().await, ConfirmOutcome::Done(_)));
    assert_eq!(backend.calls("DELETE /tasks/:id"), 1);

    page.load().await.unwrap();
    assert_eq!(page.list.table().visible_len(), 0);
    let messages: Vec<String> = ctx.notifier.drain().into_iter().map(|n| n.message).collect();
    assert_eq!(
        messages,
        [
            "Task created successfully.",
            "Task status updated.",
            "Comment added.",
            "Task deleted successfully.",
        ]
    );
}
