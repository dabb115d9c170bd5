use std::collections::VecDeque;

use tokio::time::{Instant, sleep_until};

use crate::application::{Effect, Picklist};
use crate::message::Message;
use crate::notify::Notifier;
use crate::suggest::Suggester;

/// Run `effects` and everything they lead to until no work is left.
///
/// Delayed messages fire in deadline order; a failed suggestion call is
/// delivered as an empty result.
pub async fn drive<S: Suggester, N: Notifier>(
    app: &mut Picklist,
    effects: Vec<Effect>,
    suggester: &S,
    notifier: &N,
) {
    let mut ready: VecDeque<Effect> = effects.into();
    let mut timers: Vec<(Instant, u64, Message)> = Vec::new();
    let mut scheduled = 0u64;

    loop {
        while let Some(effect) = ready.pop_front() {
            match effect {
                Effect::After(delay, message) => {
                    scheduled += 1;
                    timers.push((Instant::now() + delay, scheduled, message));
                }
                Effect::Suggest(request) => {
                    let suggestions = match suggester.suggest(&request.prompt).await {
                        Ok(suggestions) => suggestions,
                        Err(e) => {
                            log::error!("Suggestion request failed: {}", e);
                            Vec::new()
                        }
                    };
                    ready.extend(app.update(Message::SuggestionsReady {
                        list_id: request.list_id,
                        generation: request.generation,
                        suggestions,
                    }));
                }
                Effect::Notify { title, body } => notifier.notify(&title, &body).await,
                Effect::RequestNotificationPermission => {
                    let permission = notifier.request_permission().await;
                    log::debug!("Notification permission: {:?}", permission);
                    ready.extend(app.update(Message::NotificationPermissionChanged(permission)));
                }
            }
        }

        let Some(next) = timers
            .iter()
            .enumerate()
            .min_by_key(|(_, (at, order, _))| (*at, *order))
            .map(|(idx, _)| idx)
        else {
            break;
        };
        let (at, _, message) = timers.swap_remove(next);
        sleep_until(at).await;
        ready.extend(app.update(message));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::Delays;
    use crate::core::list::ListType;
    use crate::error::{Error, Result};
    use crate::notify::NotificationPermission;
    use crate::notify::testing::RecordingNotifier;
    use crate::storage::MemoryStore;
    use crate::suggest::NoSuggester;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    struct FixedSuggester(Vec<&'static str>);

    impl Suggester for FixedSuggester {
        async fn suggest(&self, _prompt: &str) -> Result<Vec<String>> {
            Ok(self.0.iter().map(|s| s.to_string()).collect())
        }
    }

    struct FailingSuggester;

    impl Suggester for FailingSuggester {
        async fn suggest(&self, _prompt: &str) -> Result<Vec<String>> {
            Err(Error::Suggestion("offline".to_string()))
        }
    }

    fn app() -> Picklist {
        Picklist::new(Box::new(MemoryStore::default()))
            .with_rng(StdRng::seed_from_u64(3))
            .with_delays(Delays::immediate())
    }

    async fn send<S: Suggester>(
        app: &mut Picklist,
        message: Message,
        suggester: &S,
        notifier: &RecordingNotifier,
    ) {
        let effects = app.update(message);
        drive(app, effects, suggester, notifier).await;
    }

    #[tokio::test]
    async fn timer_runs_down_and_notifies() {
        let mut app = app();
        let notifier = RecordingNotifier::new(NotificationPermission::Granted);

        send(&mut app, Message::TimerSetCustom(0, 3), &NoSuggester, &notifier).await;
        send(&mut app, Message::TimerToggle, &NoSuggester, &notifier).await;

        assert_eq!(app.permission(), NotificationPermission::Granted);
        assert_eq!(app.timer().time_left(), 0);
        assert_eq!(
            notifier.sent(),
            vec![(
                "Time's up!".to_string(),
                "Your focus session is complete!".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn denied_permission_stays_quiet() {
        let mut app = app();
        let notifier = RecordingNotifier::new(NotificationPermission::Denied);

        send(&mut app, Message::TimerSetCustom(0, 1), &NoSuggester, &notifier).await;
        send(&mut app, Message::TimerToggle, &NoSuggester, &notifier).await;

        assert_eq!(app.timer().time_left(), 0);
        assert!(notifier.sent().is_empty());
    }

    #[tokio::test]
    async fn suggestions_land_in_the_list() {
        let mut app = app();
        let notifier = RecordingNotifier::new(NotificationPermission::Denied);
        let suggester = FixedSuggester(vec!["Zeus", "Hera", "Apollo"]);

        send(&mut app, Message::CreateList(ListType::Randomizer), &suggester, &notifier).await;
        let id = app.state().active_list_id.clone().unwrap();
        send(
            &mut app,
            Message::RequestSuggestions {
                list_id: id.clone(),
                topic: Some("Greek gods".into()),
            },
            &suggester,
            &notifier,
        )
        .await;

        let values: Vec<&str> = app
            .state()
            .list(&id)
            .unwrap()
            .items
            .iter()
            .map(|i| i.value.as_str())
            .collect();
        assert_eq!(values, ["Zeus", "Hera", "Apollo"]);
    }

    #[tokio::test]
    async fn question_suggestions_split_on_first_colon() {
        let mut app = app();
        let notifier = RecordingNotifier::new(NotificationPermission::Denied);
        let suggester = FixedSuggester(vec!["Capital of France: Paris", "Time: 10:30", "Orphan"]);

        send(&mut app, Message::CreateList(ListType::QuestionTest), &suggester, &notifier).await;
        let id = app.state().active_list_id.clone().unwrap();
        send(&mut app, Message::RenameList(id.clone(), "Trivia".into()), &suggester, &notifier).await;
        send(
            &mut app,
            Message::RequestSuggestions {
                list_id: id.clone(),
                topic: None,
            },
            &suggester,
            &notifier,
        )
        .await;

        let items = &app.state().list(&id).unwrap().items;
        assert_eq!(items.len(), 3);
        assert_eq!(items[1].value, "Time");
        assert_eq!(items[1].answer.as_deref(), Some("10:30"));
        assert_eq!(items[2].answer.as_deref(), Some("No answer generated."));
    }

    #[tokio::test]
    async fn failed_suggestions_change_nothing() {
        let mut app = app();
        let notifier = RecordingNotifier::new(NotificationPermission::Denied);

        send(&mut app, Message::CreateList(ListType::Todo), &FailingSuggester, &notifier).await;
        let id = app.state().active_list_id.clone().unwrap();
        send(
            &mut app,
            Message::RequestSuggestions {
                list_id: id.clone(),
                topic: Some("chores".into()),
            },
            &FailingSuggester,
            &notifier,
        )
        .await;

        assert!(app.state().list(&id).unwrap().items.is_empty());
    }

    #[tokio::test]
    async fn auto_reset_refills_after_last_pick() {
        let mut app = app();
        let notifier = RecordingNotifier::new(NotificationPermission::Denied);
        let mut settings = app.state().settings.clone();
        settings.auto_reset_pool = true;
        send(&mut app, Message::UpdateSettings(settings), &NoSuggester, &notifier).await;
        send(&mut app, Message::CreateList(ListType::Randomizer), &NoSuggester, &notifier).await;
        let id = app.state().active_list_id.clone().unwrap();
        send(&mut app, Message::AddItem(id.clone(), "solo".into()), &NoSuggester, &notifier).await;

        send(&mut app, Message::Pick(id.clone()), &NoSuggester, &notifier).await;

        assert_eq!(app.last_pick().unwrap().value, "solo");
        assert_eq!(app.state().list(&id).unwrap().available().len(), 1);
    }
}
