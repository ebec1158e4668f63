use std::sync::Arc;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use lovesync::config::AppConfig;
use lovesync::flow::chat::{self, ComposeFlow};
use lovesync::flow::check_in::{self, CheckInFlow};
use lovesync::flow::cool_down::{self, CoolDownSession, PARTNER_STATEMENT};
use lovesync::flow::onboarding::{self, OnboardingFlow};
use lovesync::flow::ritual::{self, RitualFlow};
use lovesync::flow::Advance;
use lovesync::session::{initial_screen, FlagStore, InMemoryFlags, Screen};
use lovesync::store::{seed, Emotion, MemoryKind, NewMemory, RelationshipStore, Role};

type StdinLines = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env();

    // LOVESYNC_FRESH starts an empty, un-onboarded session instead of the demo
    let fresh = std::env::var("LOVESYNC_FRESH").is_ok();
    let (store, flags) = if fresh {
        (RelationshipStore::new(), InMemoryFlags::new(false, false))
    } else {
        (
            RelationshipStore::with_state(seed::demo_state()),
            InMemoryFlags::new(true, true),
        )
    };

    eprintln!("💞 LoveSync v{}", env!("CARGO_PKG_VERSION"));
    eprintln!(
        "   Breathing step: {}s (LOVESYNC_BREATHING_SECS to override)",
        config.cool_down.breathing.as_secs()
    );
    eprintln!("   Type 'help' for commands. 'quit' to exit.\n");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    match initial_screen(&flags) {
        Screen::Landing => {
            if prompt(&mut lines, "Press Enter to sign in").await?.is_none() {
                return Ok(());
            }
            flags.set_authenticated(true);
            if run_onboarding(&mut lines, Arc::clone(&store)).await? {
                flags.set_onboarded(true);
            } else {
                return Ok(());
            }
        }
        Screen::Onboarding => {
            if run_onboarding(&mut lines, Arc::clone(&store)).await? {
                flags.set_onboarded(true);
            } else {
                return Ok(());
            }
        }
        _ => {}
    }

    print_status(&store).await;
    eprint!("> ");

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        let (command, rest) = line.split_once(' ').unwrap_or((line, ""));

        match command {
            "" => {}
            "help" => print_help(),
            "status" => print_status(&store).await,
            "chat" => send_message(&store, rest).await,
            "checkin" => run_check_in(&mut lines, Arc::clone(&store)).await?,
            "cooldown" => run_cool_down(&mut lines, Arc::clone(&store), &config).await?,
            "ritual" => run_ritual(&mut lines, Arc::clone(&store)).await?,
            "rituals" => list_rituals(&store).await,
            "select" => select_ritual(&store, rest).await,
            "memory" => add_memory(&store, rest).await,
            "timeline" => print_timeline(&store).await,
            "premium" => toggle_premium(&store).await,
            "quit" | "exit" => break,
            other => println!("Unknown command: {other}. Type 'help'."),
        }
        eprint!("> ");
    }

    Ok(())
}

fn print_help() {
    println!("Commands:");
    println!("  status          relationship dashboard");
    println!("  chat <message>  send a message");
    println!("  checkin         run the daily check-in");
    println!("  cooldown        start Cool Down mode");
    println!("  ritual          work on the active ritual");
    println!("  rituals         list the ritual catalog");
    println!("  select <n>      switch the active ritual");
    println!("  memory <title>  add a timeline memory");
    println!("  timeline        show memories");
    println!("  premium         toggle premium");
    println!("  quit            exit");
}

async fn prompt(lines: &mut StdinLines, text: &str) -> Result<Option<String>> {
    eprint!("{text}: ");
    Ok(lines.next_line().await?.map(|l| l.trim().to_string()))
}

async fn print_status(store: &RelationshipStore) {
    let snapshot = store.snapshot().await;
    let names = match (&snapshot.user, &snapshot.partner) {
        (Some(u), Some(p)) => format!("{} {} & {} {}", u.avatar, u.name, p.avatar, p.name),
        (Some(u), None) => format!("{} {}", u.avatar, u.name),
        _ => "(no participants)".to_string(),
    };
    println!("\n{names}");
    if let Some(start) = snapshot.metrics.start_date {
        println!("  Together since {start}");
    }
    println!(
        "  Conflicts resolved: {}   Streak: {} days   Check-in streak: {} days   Rituals: {}",
        snapshot.metrics.conflicts_resolved,
        snapshot.metrics.current_streak,
        snapshot.metrics.check_in_streak,
        snapshot.metrics.completed_rituals,
    );
    match snapshot.check_in_today(Role::User) {
        Some(entry) => println!(
            "  Today's check-in: {} {}",
            entry.emotion.emoji(),
            entry.emotion
        ),
        None => println!("  Not checked in today"),
    }
    if let Some(ritual) = &snapshot.active_ritual {
        println!(
            "  Active ritual: {} ({}) — you: {}, partner: {}",
            ritual.title,
            ritual.duration,
            if ritual.progress.user { "done" } else { "pending" },
            if ritual.progress.partner { "done" } else { "pending" },
        );
    }
    if !snapshot.messages.is_empty() {
        println!("  Last message: {}", snapshot.messages[snapshot.messages.len() - 1].content);
    }
    println!();
}

async fn run_onboarding(lines: &mut StdinLines, store: Arc<RelationshipStore>) -> Result<bool> {
    let mut flow = OnboardingFlow::start(store);

    println!("\n{}", onboarding::step_title(1));
    println!("Let's set up your shared space.");
    flow.advance().await?;

    while !flow.is_complete() {
        match flow.current_step() {
            2 => {
                println!("\n{}", onboarding::step_title(2));
                let Some(name) = prompt(lines, "Partner name").await? else {
                    return Ok(false);
                };
                flow.capture(onboarding::fields::PARTNER_NAME, name);
                let Some(email) = prompt(lines, "Partner email").await? else {
                    return Ok(false);
                };
                flow.capture(onboarding::fields::PARTNER_EMAIL, email);
            }
            3 => {
                println!("\n{}", onboarding::step_title(3));
                let Some(date) = prompt(lines, "Relationship start (YYYY-MM-DD)").await? else {
                    return Ok(false);
                };
                flow.capture(onboarding::fields::RELATIONSHIP_START, date);
            }
            4 => {
                println!("\n{}", onboarding::step_title(4));
                let Some(tz) = prompt(lines, "Your timezone").await? else {
                    return Ok(false);
                };
                flow.capture(onboarding::fields::USER_TIMEZONE, tz);
                let Some(tz) = prompt(lines, "Partner timezone").await? else {
                    return Ok(false);
                };
                flow.capture(onboarding::fields::PARTNER_TIMEZONE, tz);
            }
            _ => {}
        }

        match flow.advance().await {
            Ok(Advance::Held) => println!("Please fill in every field."),
            Ok(Advance::Completed) => println!("\nYou're all set! 💕"),
            Ok(Advance::Moved(_)) => {}
            Err(e) => println!("That didn't work: {e}"),
        }
    }

    Ok(true)
}

async fn send_message(store: &Arc<RelationshipStore>, draft: &str) {
    let mut flow = ComposeFlow::start(Arc::clone(store));
    flow.capture(chat::fields::CONTENT, draft);
    match flow.advance().await {
        Ok(Advance::Completed) => println!("Sent."),
        Ok(_) => println!("Usage: chat <message>"),
        Err(e) => println!("Could not send: {e}"),
    }
}

async fn run_check_in(lines: &mut StdinLines, store: Arc<RelationshipStore>) -> Result<()> {
    let mut flow = CheckInFlow::start(store);

    println!("\nHow are you feeling today?");
    for (i, emotion) in Emotion::ALL.iter().enumerate() {
        println!("  {}. {} {}", i + 1, emotion.emoji(), emotion);
    }
    let Some(choice) = prompt(lines, "Pick a number").await? else {
        return Ok(());
    };
    let emotion = choice
        .parse::<usize>()
        .ok()
        .and_then(|n| Emotion::ALL.get(n.wrapping_sub(1)).copied());
    let Some(emotion) = emotion else {
        println!("No such emotion.");
        return Ok(());
    };
    flow.capture(check_in::fields::EMOTION, emotion.to_string());
    flow.advance().await?;

    let Some(note) = prompt(lines, "Anything you want to add? (optional)").await? else {
        return Ok(());
    };
    flow.capture(check_in::fields::NOTE, note);
    match flow.advance().await {
        Ok(Advance::Completed) => println!("Checked in as {} {}.", emotion.emoji(), emotion),
        Ok(other) => println!("Check-in did not complete: {other:?}"),
        Err(e) => println!("Check-in failed: {e}"),
    }
    Ok(())
}

async fn run_cool_down(
    lines: &mut StdinLines,
    store: Arc<RelationshipStore>,
    config: &AppConfig,
) -> Result<()> {
    println!("\nCool Down Mode — let's breathe together.");
    println!("(the statement step unlocks when the breathing exercise ends)");

    let session = CoolDownSession::begin(Arc::clone(&store), &config.cool_down);
    let flow = session.flow();
    let mut display = session.display();

    // Show the breathing circle until the auto-advance opens the gate
    loop {
        if flow.lock().await.current_step() > 1 {
            break;
        }
        if display.changed().await.is_err() {
            break;
        }
        let current = *display.borrow();
        eprint!("\r   {} ({}s)   ", current.phase, current.seconds_remaining);
    }
    eprintln!();

    println!("Express your feelings with an \"I\" statement.");
    loop {
        let Some(statement) = prompt(lines, "I feel").await? else {
            return Ok(());
        };
        if statement.is_empty() {
            println!("Take your time — the statement can't be empty.");
            continue;
        }
        let mut flow = flow.lock().await;
        flow.capture(cool_down::fields::STATEMENT, format!("I feel {statement}"));
        match flow.advance().await? {
            Advance::Moved(_) => break,
            _ => println!("Take your time — the statement can't be empty."),
        }
    }

    println!("\nYour partner shared: \"{PARTNER_STATEMENT}\"");
    let Some(_) = prompt(lines, "Press Enter when you understand why they feel this way").await?
    else {
        return Ok(());
    };

    let mut flow = flow.lock().await;
    match flow.advance().await {
        Ok(Advance::Completed) => {
            let metrics = store.snapshot().await.metrics;
            println!(
                "🎉 Conflict resolved! That's {} together.",
                metrics.conflicts_resolved
            );
        }
        Ok(other) => println!("Cool down did not complete: {other:?}"),
        Err(e) => println!("Completing failed (try again): {e}"),
    }
    Ok(())
}

async fn run_ritual(lines: &mut StdinLines, store: Arc<RelationshipStore>) -> Result<()> {
    let Some(active) = store.snapshot().await.active_ritual else {
        println!("No active ritual — use 'rituals' and 'select <n>' first.");
        return Ok(());
    };

    let mut flow = RitualFlow::start(Arc::clone(&store));
    println!("\n{} — {}", active.title, active.description);
    println!(
        "  {} · {} · {:?}",
        active.duration, active.category, active.difficulty
    );
    for benefit in &active.benefits {
        println!("  ✦ {benefit}");
    }
    let Some(_) = prompt(lines, "Press Enter to see the instructions").await? else {
        return Ok(());
    };
    flow.advance().await?;

    loop {
        println!("\nFollow these steps:");
        for (i, instruction) in active.instructions.iter().enumerate() {
            println!("  {}. {instruction}", i + 1);
        }
        let Some(answer) = prompt(lines, "'done' to complete, 'back' for the overview").await?
        else {
            return Ok(());
        };
        match answer.as_str() {
            "back" => {
                flow.retreat();
                let Some(_) = prompt(lines, "Press Enter to return to the instructions").await?
                else {
                    return Ok(());
                };
                flow.advance().await?;
            }
            "done" => {
                match flow.advance().await {
                    Ok(Advance::Completed) => {
                        store.mark_ritual_progress(Role::User).await?;
                        let metrics = store.snapshot().await.metrics;
                        println!("Ritual complete! {} finished so far.", metrics.completed_rituals);
                    }
                    Ok(other) => println!("Ritual did not complete: {other:?}"),
                    Err(e) => println!("Completing failed: {e}"),
                }
                return Ok(());
            }
            _ => {}
        }
    }
}

async fn list_rituals(store: &RelationshipStore) {
    let active = store.snapshot().await.active_ritual;
    for (i, ritual) in ritual::catalog().iter().enumerate() {
        let marker = match &active {
            Some(a) if a.title == ritual.title => "●",
            _ => " ",
        };
        println!(
            "{marker} {}. {} — {} ({}, {:?})",
            i + 1,
            ritual.title,
            ritual.description,
            ritual.duration,
            ritual.difficulty,
        );
    }
}

async fn select_ritual(store: &RelationshipStore, arg: &str) {
    let mut catalog = ritual::catalog();
    let Some(index) = arg
        .trim()
        .parse::<usize>()
        .ok()
        .filter(|n| (1..=catalog.len()).contains(n))
    else {
        println!("Usage: select <1-{}>", catalog.len());
        return;
    };
    let ritual = catalog.remove(index - 1);
    let title = ritual.title.clone();
    store.select_ritual(ritual).await;
    println!("Active ritual is now '{title}'.");
}

async fn add_memory(store: &RelationshipStore, title: &str) {
    let title = title.trim();
    if title.is_empty() {
        println!("Usage: memory <title>");
        return;
    }
    store
        .add_memory(NewMemory {
            title: title.to_string(),
            date: chrono::Utc::now().date_naive(),
            kind: MemoryKind::Milestone,
            image: None,
            description: None,
        })
        .await;
    println!("Added to your timeline.");
}

async fn print_timeline(store: &RelationshipStore) {
    let snapshot = store.snapshot().await;
    if snapshot.memories.is_empty() {
        println!("No memories yet.");
        return;
    }
    for memory in &snapshot.memories {
        let kind = match memory.kind {
            MemoryKind::Milestone => "milestone",
            MemoryKind::Achievement => "achievement",
            MemoryKind::Photo => "photo",
        };
        print!("  {} [{kind}] {}", memory.date, memory.title);
        if let Some(description) = &memory.description {
            print!(" — {description}");
        }
        println!();
    }
}

async fn toggle_premium(store: &RelationshipStore) {
    let premium = !store.snapshot().await.premium;
    store.set_premium(premium).await;
    if premium {
        println!("Premium unlocked. ✨");
    } else {
        println!("Back on the free plan.");
    }
}
