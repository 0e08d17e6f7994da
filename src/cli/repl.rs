//! Line-driven session over [`TravelApp`].
//!
//! Plain lines are chat messages; lines starting with `/` are commands.

use super::output::Output;
use crate::app::{TravelApp, UiEvent};
use crate::i18n::{Language, Translations};
use crate::subscription::{plan_price, SubscriptionPlan};
use crate::surfaces::{MapEvent, MapMode, PickerLevel, PlanStatus};
use crate::types::{ActiveTab, AuthUser, DestinationKind, Location, MessageRole};
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Debug, Clone, PartialEq)]
pub enum ReplCommand {
    Ui(UiEvent),
    /// Choose the n-th (1-based) city listed by the picker
    CityPick(usize),
    Show(Panel),
    Help,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Panel {
    Status,
    Markers,
    Itinerary,
    Saved,
    Plans,
    Cities,
}

const HELP: &[(&str, &str)] = &[
    ("<text>", "chat with the assistant (also sets the travel intent)"),
    ("/quick <n>", "send quick reply n"),
    ("/regen", "re-ask the last question"),
    ("/keyword <text>", "prefill the chat input"),
    ("/tab explore|trip", "switch tabs"),
    ("/map", "list map markers"),
    ("/mode all|destination|hsr|flight|drive|hotel|museum", "map category filter"),
    ("/find [text]", "search the map (no text clears it)"),
    ("/touch", "simulate a map drag"),
    ("/open <id>", "open a destination"),
    ("/back", "leave the detail view or the map"),
    ("/exit", "return to the welcome view"),
    ("/plan", "show the itinerary"),
    ("/adjust <text>", "adjust the itinerary"),
    ("/retry | /undo", "retry a failed plan, undo the last adjustment"),
    ("/save", "save or unsave the itinerary"),
    ("/city <query>", "search departure cities"),
    ("/city-region <id> | /city-country <id> | /city-back", "browse cities"),
    ("/city-pick <n>", "choose a listed city"),
    ("/login <email> | /logout", "session"),
    ("/saved | /saved-open <id> | /saved-delete <id>", "saved itineraries"),
    ("/plans | /subscribe monthly|yearly | /cancel", "subscription"),
    ("/lang en|zh", "language"),
    ("/status | /help | /quit", ""),
];

fn arg<'a>(rest: &'a str, usage: &str) -> Result<&'a str, String> {
    let rest = rest.trim();
    if rest.is_empty() {
        Err(format!("usage: {}", usage))
    } else {
        Ok(rest)
    }
}

fn number(rest: &str, usage: &str) -> Result<usize, String> {
    arg(rest, usage)?
        .parse()
        .map_err(|_| format!("usage: {}", usage))
}

fn parse_mode(s: &str) -> Result<MapMode, String> {
    let kind = match s.trim().to_ascii_lowercase().as_str() {
        "all" => return Ok(MapMode::All),
        "destination" | "attractions" => DestinationKind::Destination,
        "hsr" => DestinationKind::Hsr,
        "flight" | "flights" => DestinationKind::Flight,
        "drive" => DestinationKind::Drive,
        "hotel" | "hotels" => DestinationKind::Hotel,
        "museum" | "museums" => DestinationKind::Museum,
        other => return Err(format!("unknown map mode '{}'", other)),
    };
    Ok(MapMode::Only(kind))
}

/// Parse one input line. `None` for a blank line.
pub fn parse_line(line: &str) -> Result<Option<ReplCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(command) = line.strip_prefix('/') else {
        return Ok(Some(ReplCommand::Ui(UiEvent::SubmitChat(line.to_string()))));
    };
    let (name, rest) = command.split_once(' ').unwrap_or((command, ""));

    let parsed = match name {
        "help" | "h" => ReplCommand::Help,
        "quit" | "q" => ReplCommand::Quit,
        "status" => ReplCommand::Show(Panel::Status),
        "map" => ReplCommand::Show(Panel::Markers),
        "plan" => ReplCommand::Show(Panel::Itinerary),
        "saved" => ReplCommand::Show(Panel::Saved),
        "plans" => ReplCommand::Show(Panel::Plans),
        "quick" => ReplCommand::Ui(UiEvent::QuickReply(
            number(rest, "/quick <n>")?.saturating_sub(1),
        )),
        // resolved against the chat history by the session loop
        "regen" => ReplCommand::Ui(UiEvent::Regenerate(String::new())),
        "keyword" => ReplCommand::Ui(UiEvent::SelectKeyword(
            arg(rest, "/keyword <text>")?.to_string(),
        )),
        "tab" => {
            let tab = match arg(rest, "/tab explore|trip")? {
                "explore" => ActiveTab::Explore,
                "trip" => ActiveTab::Trip,
                other => return Err(format!("unknown tab '{}'", other)),
            };
            ReplCommand::Ui(UiEvent::SelectTab(tab))
        }
        "mode" => ReplCommand::Ui(UiEvent::SetMapMode(parse_mode(arg(rest, "/mode <kind>")?)?)),
        "find" => ReplCommand::Ui(UiEvent::MapSearch(rest.trim().to_string())),
        "touch" => ReplCommand::Ui(UiEvent::MapInteraction(MapEvent::DragStart)),
        "open" => ReplCommand::Ui(UiEvent::MarkerClicked(arg(rest, "/open <id>")?.to_string())),
        "back" => ReplCommand::Ui(UiEvent::Back),
        "exit" => ReplCommand::Ui(UiEvent::ExitMap),
        "adjust" => ReplCommand::Ui(UiEvent::AdjustItinerary(
            arg(rest, "/adjust <text>")?.to_string(),
        )),
        "retry" => ReplCommand::Ui(UiEvent::RetryItinerary),
        "undo" => ReplCommand::Ui(UiEvent::UndoItinerary),
        "stop" => ReplCommand::Ui(UiEvent::SelectStop(
            number(rest, "/stop <n>")?.saturating_sub(1),
        )),
        "save" => ReplCommand::Ui(UiEvent::ToggleSave),
        "city" => ReplCommand::Ui(UiEvent::CitySearch(rest.trim().to_string())),
        "city-region" => ReplCommand::Ui(UiEvent::CityRegion(
            arg(rest, "/city-region <id>")?.to_string(),
        )),
        "city-country" => ReplCommand::Ui(UiEvent::CityCountry(
            arg(rest, "/city-country <id>")?.to_string(),
        )),
        "city-back" => ReplCommand::Ui(UiEvent::CityBack),
        "city-pick" => ReplCommand::CityPick(number(rest, "/city-pick <n>")?),
        "cities" => ReplCommand::Show(Panel::Cities),
        "login" => {
            let email = arg(rest, "/login <email>")?;
            ReplCommand::Ui(UiEvent::Login(AuthUser {
                id: format!("local:{}", email),
                email: email.to_string(),
                name: None,
            }))
        }
        "logout" => ReplCommand::Ui(UiEvent::Logout),
        "saved-open" => ReplCommand::Ui(UiEvent::OpenSaved(
            arg(rest, "/saved-open <id>")?.to_string(),
        )),
        "saved-delete" => ReplCommand::Ui(UiEvent::DeleteSaved(
            arg(rest, "/saved-delete <id>")?.to_string(),
        )),
        "subscribe" => {
            let plan: SubscriptionPlan = arg(rest, "/subscribe monthly|yearly")?.parse()?;
            ReplCommand::Ui(UiEvent::Subscribe(plan))
        }
        "cancel" => ReplCommand::Ui(UiEvent::CancelSubscription),
        "lang" => {
            let lang: Language = arg(rest, "/lang en|zh")?.parse()?;
            ReplCommand::Ui(UiEvent::SetLanguage(lang))
        }
        other => return Err(format!("unknown command '/{}' (try /help)", other)),
    };
    Ok(Some(parsed))
}

/// Cities the picker currently lists, in display order.
pub fn city_candidates(app: &TravelApp) -> Vec<Location> {
    match app.city_picker().level() {
        PickerLevel::Search { local, ai } => local.into_iter().chain(ai.cloned()).collect(),
        PickerLevel::Cities(country) => country.cities.clone(),
        PickerLevel::Regions(_) | PickerLevel::Countries(_) => Vec::new(),
    }
}

/// Run the session until `/quit` or end of input.
pub async fn run(app: &mut TravelApp, output: &Output) -> anyhow::Result<()> {
    output.banner();
    app.start().await;
    show(app, output, Panel::Status);
    output.hint("Type a travel wish, or /help");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        output.prompt(&app.orchestrator().view_kind().to_string());
        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                output.warning(&e);
                continue;
            }
        };
        if !step(app, output, command).await {
            break;
        }
    }
    Ok(())
}

/// Execute one command. Returns `false` to end the session.
pub async fn step(app: &mut TravelApp, output: &Output, command: ReplCommand) -> bool {
    let event = match command {
        ReplCommand::Quit => return false,
        ReplCommand::Help => {
            output.header("Commands");
            for (usage, what) in HELP {
                output.kv(usage, what);
            }
            return true;
        }
        ReplCommand::Show(panel) => {
            show(app, output, panel);
            return true;
        }
        ReplCommand::CityPick(n) => {
            match city_candidates(app).into_iter().nth(n.saturating_sub(1)) {
                Some(city) => UiEvent::CityChosen(city),
                None => {
                    output.warning("No such city in the list");
                    return true;
                }
            }
        }
        ReplCommand::Ui(UiEvent::Regenerate(_)) => {
            let last = app
                .chat()
                .messages()
                .iter()
                .rev()
                .find(|m| m.role == MessageRole::User)
                .map(|m| m.id.clone());
            match last {
                Some(id) => UiEvent::Regenerate(id),
                None => {
                    output.warning("Nothing to regenerate");
                    return true;
                }
            }
        }
        ReplCommand::Ui(event) => event,
    };

    let before = app.chat().messages().len();
    let shows_plan = matches!(
        event,
        UiEvent::MarkerClicked(_)
            | UiEvent::AdjustItinerary(_)
            | UiEvent::RetryItinerary
            | UiEvent::UndoItinerary
            | UiEvent::OpenSaved(_)
    );
    let city_event = matches!(
        event,
        UiEvent::CitySearch(_) | UiEvent::CityRegion(_) | UiEvent::CityCountry(_) | UiEvent::CityBack
    );
    let opens_picker = matches!(event, UiEvent::CitySearch(_)) && !app.city_picker().is_open();
    if opens_picker {
        if let Err(e) = app.handle(UiEvent::OpenCityPicker).await {
            output.error(&e.to_string());
        }
    }

    if let Err(e) = app.handle(event).await {
        output.error(&e.to_string());
    }

    let messages = app.chat().messages();
    for message in messages.iter().skip(before.min(messages.len())) {
        if message.role == MessageRole::Assistant {
            output.chat(message.role, &message.content);
        }
    }
    for notice in app.take_notices() {
        output.notice(&notice);
    }
    if shows_plan {
        show(app, output, Panel::Itinerary);
    }
    if city_event {
        show(app, output, Panel::Cities);
    }
    true
}

fn show(app: &TravelApp, output: &Output, panel: Panel) {
    let orch = app.orchestrator();
    let lang = orch.language();
    match panel {
        Panel::Status => {
            output.header("Status");
            output.kv("view", &orch.view_kind().to_string());
            let departure = orch.departure();
            output.kv("from", &format!("{} {} ({})", departure.flag, departure.city, departure.code));
            if !orch.intent().is_empty() {
                output.kv("intent", orch.intent());
            }
            let user = orch.user().map_or("-".to_string(), |u| u.email.clone());
            output.kv("user", &user);
            output.kv("premium", if orch.is_premium() { "yes" } else { "no" });
            if orch.view_kind() == crate::types::ViewKind::Welcome {
                let t = Translations::for_language(lang);
                output.kv("try", &t.suggestions.join(" · "));
            }
        }
        Panel::Markers => {
            output.header(app.map().mode().label(lang));
            for marker in app.map().marker_views(lang) {
                output.list_item(&format!("[{}] {} · {} · {}", marker.id, marker.name, marker.info, marker.distance));
            }
        }
        Panel::Itinerary => {
            let Some(detail) = app.detail() else {
                return;
            };
            output.header(&detail.destination().name);
            match detail.status() {
                PlanStatus::Loading => output.info(Translations::for_language(lang).thinking),
                PlanStatus::Failed => {
                    if let Some(message) = detail.failure_message() {
                        output.warning(message);
                    }
                    output.hint("/retry to try again");
                }
                PlanStatus::Idle => {}
                PlanStatus::Ready => {
                    if let Some(plan) = detail.itinerary() {
                        output.kv("budget", &plan.total_budget);
                        output.kv("transport", &plan.transport);
                        for (i, item) in plan.items.iter().enumerate() {
                            output.list_item(&format!("{}. {} {}", i + 1, item.time, item.activity));
                        }
                        if let Some(comment) = &plan.ai_comment {
                            output.hint(comment);
                        }
                        let saved = orch.is_saved(&detail.destination().id);
                        output.kv("saved", if saved { "yes" } else { "no" });
                    }
                }
            }
        }
        Panel::Saved => {
            output.header("Saved itineraries");
            if orch.user().is_none() {
                output.warning(Translations::for_language(lang).login_required);
            }
            for entry in orch.saved_itineraries() {
                output.list_item(&format!(
                    "[{}] {} · {}",
                    entry.id,
                    entry.destination_name,
                    entry.created_at.format("%Y-%m-%d")
                ));
            }
        }
        Panel::Plans => {
            output.header("Plans");
            for plan in [SubscriptionPlan::Monthly, SubscriptionPlan::Yearly] {
                if let Some(price) = plan_price(plan) {
                    output.kv(&format!("{:?}", plan).to_lowercase(), &price.format(lang));
                }
            }
            if let Some(current) = orch.subscription().current() {
                output.kv("current", &format!("{:?} ({:?})", current.plan_id, current.status));
            }
        }
        Panel::Cities => {
            let picker = app.city_picker();
            match picker.level() {
                PickerLevel::Regions(regions) => {
                    for region in regions {
                        output.list_item(&format!("[{}] {}", region.id, region.name));
                    }
                }
                PickerLevel::Countries(region) => {
                    for country in &region.countries {
                        output.list_item(&format!("[{}] {} {}", country.id, country.flag, country.name));
                    }
                }
                PickerLevel::Cities(_) | PickerLevel::Search { .. } => {
                    let cities = city_candidates(app);
                    if cities.is_empty() && picker.is_searching() {
                        output.info(Translations::for_language(lang).thinking);
                    }
                    for (i, city) in cities.iter().enumerate() {
                        output.list_item(&format!("{}. {} {}, {} ({})", i + 1, city.flag, city.city, city.country, city.code));
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("/back", ReplCommand::Ui(UiEvent::Back))]
    #[case("/quick 2", ReplCommand::Ui(UiEvent::QuickReply(1)))]
    #[case("/tab trip", ReplCommand::Ui(UiEvent::SelectTab(ActiveTab::Trip)))]
    #[case("/mode hotel", ReplCommand::Ui(UiEvent::SetMapMode(MapMode::Only(DestinationKind::Hotel))))]
    #[case("/subscribe yearly", ReplCommand::Ui(UiEvent::Subscribe(SubscriptionPlan::Yearly)))]
    #[case("/lang zh", ReplCommand::Ui(UiEvent::SetLanguage(Language::Zh)))]
    #[case("/city-pick 3", ReplCommand::CityPick(3))]
    #[case("/map", ReplCommand::Show(Panel::Markers))]
    #[case("/find great wall", ReplCommand::Ui(UiEvent::MapSearch("great wall".to_string())))]
    #[case("/find", ReplCommand::Ui(UiEvent::MapSearch(String::new())))]
    #[case("/q", ReplCommand::Quit)]
    fn test_parse_commands(#[case] line: &str, #[case] expected: ReplCommand) {
        assert_eq!(parse_line(line).unwrap(), Some(expected));
    }

    #[test]
    fn test_plain_text_is_chat() {
        assert_eq!(
            parse_line("  beach holiday ").unwrap(),
            Some(ReplCommand::Ui(UiEvent::SubmitChat("beach holiday".to_string())))
        );
        assert_eq!(parse_line("   ").unwrap(), None);
    }

    #[rstest]
    #[case("/quick")]
    #[case("/quick x")]
    #[case("/tab home")]
    #[case("/mode boats")]
    #[case("/lang fr")]
    #[case("/teleport")]
    fn test_parse_errors(#[case] line: &str) {
        assert!(parse_line(line).is_err());
    }

    #[test]
    fn test_login_builds_local_user() {
        match parse_line("/login a@b.c").unwrap() {
            Some(ReplCommand::Ui(UiEvent::Login(user))) => {
                assert_eq!(user.email, "a@b.c");
                assert_eq!(user.id, "local:a@b.c");
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
