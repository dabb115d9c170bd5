use std::io::{BufRead, Write};

use chrono::Datelike;

use picklist::application::{Delays, Effect, Picklist, list_summary};
use picklist::config::PicklistConfig;
use picklist::core::calendar::{self, CalendarCell};
use picklist::core::exam::ExamState;
use picklist::core::list::ListType;
use picklist::core::merge::MergeMode;
use picklist::localize::Localizer;
use picklist::message::Message;
use picklist::notify::DesktopNotifier;
use picklist::runtime::drive;
use picklist::storage::FileStore;
use picklist::suggest::NoSuggester;
use picklist::suggest::anthropic::AnthropicSuggester;

const USAGE: &str = "\
Usage: picklist [ACTION]

Actions:
  (none)                          Show every list
  --new <type> [title]            Create a list (randomizer, todo, question-test)
  --add <list> <value>            Add an item
  --question <list> <q> <answer>  Add a question to a question test
  --pick <list>                   Draw a random item
  --reset <list>                  Put every item back into the pool
  --exam <list>                   Take an exam on a question test
  --calendar [YYYY-MM-DD]         Show a month of the calendar
  --task <YYYY-MM-DD> <value>     Add a calendar task
  --highlight <YYYY-MM-DD>        Toggle a calendar highlight
  --merge <a> <b> <title> [--replace]
  --suggest <list> [topic]        Ask for suggested items
  --timer [minutes]               Run a focus timer
  --set-api-key <key>             Store the suggestion API key in the keyring
  --clear-api-key                 Remove the stored API key
  --debug                         Toggle debug logging in the config file";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = PicklistConfig::default_path();
    let mut config = PicklistConfig::load(&config_path);

    // Log to the systemd user journal (`journalctl --user -t picklist -f`).
    // Wrapper filters: picklist crate at info/debug (per config), everything else at warn.
    {
        struct FilteredJournal {
            inner: systemd_journal_logger::JournalLog,
        }

        impl log::Log for FilteredJournal {
            fn enabled(&self, metadata: &log::Metadata) -> bool {
                if metadata.target().starts_with("picklist") {
                    let max = if picklist::debug_logging() {
                        log::LevelFilter::Debug
                    } else {
                        log::LevelFilter::Info
                    };
                    metadata.level() <= max
                } else {
                    metadata.level() <= log::LevelFilter::Warn
                }
            }
            fn log(&self, record: &log::Record) {
                if self.enabled(record.metadata()) {
                    self.inner.log(record);
                }
            }
            fn flush(&self) {
                self.inner.flush();
            }
        }

        picklist::set_debug_logging(config.debug_logging);

        match systemd_journal_logger::JournalLog::new() {
            Ok(journal) => {
                let journal = journal.with_syslog_identifier("picklist".to_string());
                log::set_boxed_logger(Box::new(FilteredJournal { inner: journal }))?;
                // Global max must be Debug so debug logs can pass through when enabled
                log::set_max_level(log::LevelFilter::Debug);
            }
            Err(e) => eprintln!("picklist: journal logging unavailable: {}", e),
        }
    }

    config.ensure_dirs()?;
    let store = FileStore::new(config.data_directory.clone());
    let mut app = Picklist::new(Box::new(store))
        .with_suggestion_count(config.suggestion_count)
        .with_delays(Delays {
            auto_reset: std::time::Duration::ZERO,
            exam_advance: std::time::Duration::ZERO,
            ..Delays::default()
        });
    let notifier = DesktopNotifier;

    let args: Vec<String> = std::env::args().skip(1).collect();
    let arg = |idx: usize| args.get(idx).map(String::as_str);

    match arg(0) {
        None | Some("--summary") => print_summary(&app),

        Some("--new") => {
            let kind: ListType = serde_json::from_value(serde_json::Value::String(
                arg(1).unwrap_or("randomizer").to_string(),
            ))?;
            app.update(Message::CreateList(kind));
            if let (Some(title), Some(id)) = (arg(2), app.state().active_list_id.clone()) {
                app.update(Message::RenameList(id, title.to_string()));
            }
            print_summary(&app);
        }

        Some("--add") => {
            let id = find_list(&app, arg(1))?;
            app.update(Message::AddItem(id, required(arg(2), "value")?.to_string()));
            print_summary(&app);
        }

        Some("--question") => {
            let list_id = find_list(&app, arg(1))?;
            app.update(Message::AddQuestion {
                list_id,
                question: required(arg(2), "question")?.to_string(),
                answer: arg(3).unwrap_or_default().to_string(),
            });
            print_summary(&app);
        }

        Some("--pick") => {
            let id = find_list(&app, arg(1))?;
            let effects = app.update(Message::Pick(id.clone()));
            let winner = app.last_pick().map(|i| i.value.clone());
            drive(&mut app, effects, &NoSuggester, &notifier).await;
            let l10n = Localizer::new(app.state().settings.language);
            match winner {
                Some(value) => println!("{}: {}", l10n.text("picker-winner"), value),
                None => println!("{}", l10n.text("picker-empty-pool")),
            }
            if let Some(list) = app.state().list(&id) {
                println!("{} {}", list.available().len(), l10n.text("picker-items-left"));
            }
        }

        Some("--reset") => {
            let id = find_list(&app, arg(1))?;
            app.update(Message::ResetPool(id));
            print_summary(&app);
        }

        Some("--exam") => {
            let id = find_list(&app, arg(1))?;
            run_exam(&mut app, id, &notifier).await?;
        }

        Some("--calendar") => {
            if let Some(day) = arg(1).and_then(calendar::parse_day_key) {
                app.update(Message::CalendarSelectDay(day));
                // Navigate from the current month to the selected one.
                let shown = app.calendar_view().displayed_month;
                let delta = (day.year() - shown.year()) * 12 + day.month() as i32
                    - shown.month() as i32;
                let step = if delta < 0 {
                    Message::CalendarPrevMonth
                } else {
                    Message::CalendarNextMonth
                };
                for _ in 0..delta.unsigned_abs() {
                    app.update(step.clone());
                }
            }
            print_calendar(&app);
        }

        Some("--task") => {
            let day = required(arg(1).and_then(calendar::parse_day_key), "YYYY-MM-DD")?;
            app.update(Message::CalendarSelectDay(day));
            app.update(Message::AddCalendarTask(required(arg(2), "value")?.to_string()));
            print_day(&app);
        }

        Some("--highlight") => {
            let day = required(arg(1).and_then(calendar::parse_day_key), "YYYY-MM-DD")?;
            app.update(Message::CalendarSelectDay(day));
            app.update(Message::ToggleHighlight);
            print_day(&app);
        }

        Some("--merge") => {
            let first = find_list(&app, arg(1))?;
            let second = find_list(&app, arg(2))?;
            let mode = if args.iter().any(|a| a == "--replace") {
                MergeMode::Replace
            } else {
                MergeMode::Add
            };
            app.update(Message::MergeLists {
                first,
                second,
                mode,
                title: required(arg(3), "title")?.to_string(),
            });
            print_summary(&app);
        }

        Some("--suggest") => {
            let list_id = find_list(&app, arg(1))?;
            let before = app.state().list(&list_id).map_or(0, |l| l.items.len());
            let effects = app.update(Message::RequestSuggestions {
                list_id: list_id.clone(),
                topic: arg(2).map(str::to_string),
            });
            match AnthropicSuggester::from_keyring(config.suggestion_model.clone()).await {
                Ok(suggester) => drive(&mut app, effects, &suggester, &notifier).await,
                Err(e) => {
                    log::warn!("Suggestions unavailable: {}", e);
                    drive(&mut app, effects, &NoSuggester, &notifier).await;
                }
            }
            let after = app.state().list(&list_id).map_or(0, |l| l.items.len());
            let l10n = Localizer::new(app.state().settings.language);
            if after > before {
                println!("{} {}", after - before, l10n.text("suggest-added"));
            } else {
                println!("{}", l10n.text("suggest-none"));
            }
        }

        Some("--timer") => {
            if let Some(minutes) = arg(1) {
                let minutes: u32 = minutes.parse()?;
                app.update(Message::TimerSetCustom(minutes, 0));
            }
            println!("Focus: {}", app.timer().display());
            let effects = app.update(Message::TimerToggle);
            drive(&mut app, effects, &NoSuggester, &notifier).await;
            let l10n = Localizer::new(app.state().settings.language);
            println!("{}", l10n.text("timer-finished"));
        }

        Some("--set-api-key") => {
            let key = required(arg(1), "key")?;
            let suggester = AnthropicSuggester::new(key, config.suggestion_model.clone())?;
            suggester.test_api_key().await?;
            picklist::suggest::keyring::store_api_key(key).await?;
            println!("API key stored");
        }

        Some("--clear-api-key") => {
            picklist::suggest::keyring::delete_api_key().await?;
            println!("API key removed");
        }

        Some("--debug") => {
            config.debug_logging = !config.debug_logging;
            picklist::set_debug_logging(config.debug_logging);
            config.save(&config_path)?;
            log::info!("Debug logging set to {}", config.debug_logging);
            println!(
                "Debug logging {}",
                if config.debug_logging { "on" } else { "off" }
            );
        }

        Some(_) => println!("{}", USAGE),
    }

    Ok(())
}

fn required<T>(value: Option<T>, what: &str) -> Result<T, Box<dyn std::error::Error>> {
    value.ok_or_else(|| format!("missing {}\n\n{}", what, USAGE).into())
}

/// Resolve a list by id or by case-insensitive title.
fn find_list(app: &Picklist, key: Option<&str>) -> Result<String, Box<dyn std::error::Error>> {
    let key = required(key, "list")?;
    let lists = &app.state().lists;
    lists
        .iter()
        .find(|l| l.id == key)
        .or_else(|| lists.iter().find(|l| l.title.eq_ignore_ascii_case(key)))
        .map(|l| l.id.clone())
        .ok_or_else(|| format!("no list named \"{}\"", key).into())
}

fn print_summary(app: &Picklist) {
    let active = app.state().active_list_id.as_deref();
    for list in &app.state().lists {
        let marker = if Some(list.id.as_str()) == active { '*' } else { ' ' };
        println!("{} {}  {}", marker, list_summary(list), list.id);
    }
}

fn print_calendar(app: &Picklist) {
    let Some(grid) = app.calendar_grid() else {
        return;
    };
    let l10n = Localizer::new(app.state().settings.language);
    println!("{}", l10n.month_title(grid.year, grid.month));
    let header: Vec<String> = (0..7).map(|d| format!("{:>4}", l10n.weekday_short(d))).collect();
    println!("{}", header.join(""));
    for week in grid.weeks() {
        let row: String = week
            .iter()
            .map(|cell| match cell {
                CalendarCell::Blank => "    ".to_string(),
                CalendarCell::Day(d) => {
                    let mark = if d.is_highlighted {
                        '!'
                    } else if d.has_tasks {
                        '*'
                    } else if d.is_today {
                        '.'
                    } else {
                        ' '
                    };
                    format!("{:>3}{}", d.day, mark)
                }
            })
            .collect();
        println!("{}", row.trim_end());
    }
    println!();
    print_day(app);
}

fn print_day(app: &Picklist) {
    let l10n = Localizer::new(app.state().settings.language);
    let day = app.calendar_view().selected_day;
    let highlighted = app
        .state()
        .calendar()
        .is_some_and(|l| calendar::is_highlighted(l, day));
    println!(
        "{}{}",
        calendar::format_day_key(day),
        if highlighted {
            format!(" ({})", l10n.text("calendar-highlighted"))
        } else {
            String::new()
        }
    );
    let tasks = app.selected_day_tasks();
    if tasks.is_empty() {
        println!("  {}", l10n.text("calendar-no-tasks"));
    }
    for task in tasks {
        let check = if task.is_picked { 'x' } else { ' ' };
        println!("  [{}] {}", check, task.value);
    }
}

async fn run_exam(
    app: &mut Picklist,
    list_id: String,
    notifier: &DesktopNotifier,
) -> Result<(), Box<dyn std::error::Error>> {
    app.update(Message::StartExam(list_id));
    if app.exam().is_none() {
        return Err("this list needs at least 3 questions for an exam".into());
    }
    let l10n = Localizer::new(app.state().settings.language);
    let stdin = std::io::stdin();

    while let Some(question) = app.exam().and_then(|e| e.current()).cloned() {
        println!("{}: {}", l10n.text("exam-question"), question.prompt);
        for (idx, option) in question.options.iter().enumerate() {
            println!("  {}) {}", idx + 1, option);
        }
        print!("> ");
        std::io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            app.update(Message::ExitExam);
            return Ok(());
        }
        let Some(choice) = line
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|n| question.options.get(n))
        else {
            continue;
        };

        let effects: Vec<Effect> = app.update(Message::SelectAnswer(choice.clone()));
        if *choice == question.answer {
            println!("{}", l10n.text("exam-correct"));
        } else {
            println!("{} {}", l10n.text("exam-wrong"), question.answer);
        }
        drive(app, effects, &NoSuggester, notifier).await;
    }

    if let Some(ExamState::Finished { score, total }) = app.exam().map(|e| e.state().clone()) {
        let percentage = app.exam().map_or(0, |e| e.percentage());
        println!("{}", l10n.text("exam-finished"));
        println!("{}: {}/{} ({}%)", l10n.text("exam-score"), score, total, percentage);
    }
    Ok(())
}
