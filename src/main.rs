mod tui;

use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use cadence::models::JsonOutput;
use cadence::{format_interval, Config, Database, Error, Rating, Result, Scheduler};

#[derive(Parser)]
#[command(name = "cadence")]
#[command(about = "Spaced-repetition flashcards with an Anki-style scheduler")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Learner whose progress to use (defaults to config / CADENCE_LEARNER)
    #[arg(long, global = true)]
    learner: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Manage collections
    #[command(subcommand)]
    Collection(CollectionCommands),

    /// Manage cards
    #[command(subcommand)]
    Card(CardCommands),

    /// Start learning a collection (creates review records for its cards)
    Learn {
        /// Collection ID
        collection: i64,
    },

    /// List cards due for review
    Due {
        /// Collection ID
        collection: i64,

        /// Maximum number of cards (0 = all)
        #[arg(long, short, default_value_t = 0)]
        limit: usize,
    },

    /// Rate a card and schedule its next review
    Review {
        /// Card ID
        card: i64,

        /// Rating: again/hard/good/easy or 0-3
        #[arg(long, short)]
        rating: String,
    },

    /// Show what each rating would do to a card
    Preview {
        /// Card ID
        card: i64,
    },

    /// Show learning statistics for a collection
    Stats {
        /// Collection ID
        collection: i64,
    },

    /// Show the rating history of a card
    History {
        /// Card ID
        card: i64,
    },

    /// Delete all learning progress in a collection
    Clear {
        /// Collection ID
        collection: i64,
    },

    /// Launch interactive terminal UI for a collection
    Tui {
        /// Collection ID
        collection: i64,
    },
}

#[derive(Subcommand)]
enum CollectionCommands {
    /// List all collections
    List,

    /// Add a new collection
    Add {
        /// Collection name
        name: String,

        /// Collection description
        #[arg(long, short)]
        description: Option<String>,
    },

    /// Show collection details
    Show {
        /// Collection ID
        id: i64,
    },

    /// Rename a collection or change its description
    Edit {
        /// Collection ID
        id: i64,

        /// New name
        #[arg(long, short)]
        name: Option<String>,

        /// New description (empty to clear)
        #[arg(long, short)]
        description: Option<String>,
    },

    /// Delete a collection and its cards
    Delete {
        /// Collection ID
        id: i64,
    },
}

#[derive(Subcommand)]
enum CardCommands {
    /// List cards in a collection
    List {
        /// Collection ID
        collection: i64,
    },

    /// Add a card to a collection
    Add {
        /// Collection ID
        collection: i64,

        /// Front of the card
        question: String,

        /// Back of the card
        answer: String,
    },

    /// Change the text of a card (progress is kept)
    Edit {
        /// Card ID
        id: i64,

        /// New front of the card
        #[arg(long, short)]
        question: Option<String>,

        /// New back of the card
        #[arg(long, short)]
        answer: Option<String>,
    },

    /// Delete a card
    Delete {
        /// Card ID
        id: i64,
    },
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    let result = Config::load().and_then(|config| {
        init_logging(&config.log_level);
        run(cli, config)
    });

    if let Err(e) = result {
        if json {
            let out = serde_json::to_string(&JsonOutput::<()>::err(e.to_string()))
                .unwrap_or_else(|_| format!("{{\"success\":false,\"error\":\"{}\"}}", e));
            println!("{}", out);
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli, mut config: Config) -> Result<()> {
    config.set_learner(cli.learner.clone());
    let db_path = config.db_path();
    let db = Database::open(&db_path)?;
    let learner = config.learner.clone();
    let scheduler = Scheduler::new(config.scheduler.clone());
    let now = Utc::now();

    match cli.command {
        Commands::Init => {
            db.init()?;
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
            } else {
                println!("Database initialized at: {}", db_path.display());
            }
        }

        Commands::Collection(collection_cmd) => match collection_cmd {
            CollectionCommands::List => {
                let collections = db.list_collections()?;
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&collections))?);
                } else if collections.is_empty() {
                    println!("No collections found.");
                } else {
                    println!("{:<5} {:<40} CARDS", "ID", "NAME");
                    println!("{}", "-".repeat(55));
                    for summary in collections {
                        println!(
                            "{:<5} {:<40} {}",
                            summary.collection.id,
                            truncate(&summary.collection.name, 38),
                            summary.card_count
                        );
                    }
                }
            }

            CollectionCommands::Add { name, description } => {
                let id = db.add_collection(&name, description.as_deref())?;
                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                            "id": id,
                            "name": name
                        })))?
                    );
                } else {
                    println!("Added collection '{}' with ID: {}", name, id);
                }
            }

            CollectionCommands::Show { id } => {
                let collection = db
                    .get_collection(id)?
                    .ok_or_else(|| Error::NotFound(format!("Collection {}", id)))?;
                let cards = db.list_cards(id)?;
                let stats = db.collection_stats(&learner, id, now)?;

                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                            "collection": collection,
                            "card_count": cards.len(),
                            "stats": stats
                        })))?
                    );
                } else {
                    println!("Collection: {}", collection.name);
                    println!("ID: {}", collection.id);
                    if let Some(desc) = &collection.description {
                        println!("Description: {}", desc);
                    }
                    println!("Cards: {}", cards.len());
                    println!("Created: {}", collection.created_at);
                    println!();
                    println!("--- Progress ({}) ---", learner);
                    println!(
                        "New: {}  Learning: {}  Review: {}  Due: {}",
                        stats.new_cards, stats.learning_cards, stats.review_cards, stats.due_cards
                    );
                }
            }

            CollectionCommands::Edit {
                id,
                name,
                description,
            } => {
                let collection =
                    db.update_collection(id, name.as_deref(), description.as_deref(), now)?;
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&collection))?);
                } else {
                    println!("Updated collection {} ('{}').", id, collection.name);
                }
            }

            CollectionCommands::Delete { id } => {
                if !db.delete_collection(id)? {
                    return Err(Error::NotFound(format!("Collection {}", id)));
                }
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
                } else {
                    println!("Collection {} deleted.", id);
                }
            }
        },

        Commands::Card(card_cmd) => match card_cmd {
            CardCommands::List { collection } => {
                let cards = db.list_cards(collection)?;
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&cards))?);
                } else if cards.is_empty() {
                    println!("No cards in collection {}.", collection);
                } else {
                    println!("{:<5} {:<35} ANSWER", "ID", "QUESTION");
                    println!("{}", "-".repeat(70));
                    for card in cards {
                        println!(
                            "{:<5} {:<35} {}",
                            card.id,
                            truncate(&card.question, 33),
                            truncate(&card.answer, 30)
                        );
                    }
                }
            }

            CardCommands::Add {
                collection,
                question,
                answer,
            } => {
                let id = db.add_card(collection, &question, &answer)?;
                if cli.json {
                    println!(
                        "{}",
                        serde_json::to_string(&JsonOutput::ok(serde_json::json!({ "id": id })))?
                    );
                } else {
                    println!("Added card {} to collection {}.", id, collection);
                }
            }

            CardCommands::Edit {
                id,
                question,
                answer,
            } => {
                let card = db.update_card(id, question.as_deref(), answer.as_deref(), now)?;
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&card))?);
                } else {
                    println!("Updated card {}.", id);
                }
            }

            CardCommands::Delete { id } => {
                if !db.delete_card(id)? {
                    return Err(Error::NotFound(format!("Card {}", id)));
                }
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
                } else {
                    println!("Card {} deleted.", id);
                }
            }
        },

        Commands::Learn { collection } => {
            let created = db.start_learning(&learner, collection, now)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "created": created
                    })))?
                );
            } else {
                println!("Started learning {} new card(s).", created);
            }
        }

        Commands::Due { collection, limit } => {
            let due = db.list_due(&learner, collection, now, limit)?;
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&due))?);
            } else if due.is_empty() {
                println!("Nothing due. Come back later!");
            } else {
                println!("{:<5} {:<40} {:<11} INTERVAL", "ID", "QUESTION", "STATUS");
                println!("{}", "-".repeat(70));
                for item in due {
                    println!(
                        "{:<5} {:<40} {:<11} {}",
                        item.card.id,
                        truncate(&item.card.question, 38),
                        item.review.record.status.label(),
                        format_interval(item.review.record.interval_minutes)
                    );
                }
            }
        }

        Commands::Review { card, rating } => {
            let rating = Rating::parse(&rating)?;
            let review = db.record_review(&learner, card, rating, &scheduler, now)?;

            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&review))?);
            } else {
                let record = &review.record;
                println!("Rated card {} as {}.", card, rating.label());
                println!("Status: {}", record.status.label());
                println!(
                    "Next review in {} ({})",
                    format_interval(record.interval_minutes),
                    record.due_at.format("%Y-%m-%d %H:%M UTC")
                );
                println!("Ease: {:.2}", record.ease_factor);
            }
        }

        Commands::Preview { card } => {
            if db.get_card(card)?.is_none() {
                return Err(Error::NotFound(format!("Card {}", card)));
            }
            // A card the learner has not started previews as new
            let review = db
                .get_review(&learner, card)?
                .map(|r| r.record)
                .unwrap_or_else(|| cadence::ReviewRecord::new(now));
            let preview = scheduler.preview(&review, now)?;

            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&preview))?);
            } else {
                println!("Card {} ({})", card, review.status.label());
                for rating in Rating::ALL {
                    let next = preview.get(rating);
                    println!(
                        "  {} {:<6} -> {:<6} {:<11} ({})",
                        rating.as_i64(),
                        rating.label(),
                        format_interval(next.interval_minutes),
                        next.status.label(),
                        rating.description()
                    );
                }
            }
        }

        Commands::Stats { collection } => {
            let stats = db.collection_stats(&learner, collection, now)?;
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&stats))?);
            } else {
                println!("=== Learning Statistics ===");
                println!("Total cards: {}", stats.total_cards);
                println!("New: {}", stats.new_cards);
                println!("Learning: {}", stats.learning_cards);
                println!("Review: {}", stats.review_cards);
                println!("Due now: {}", stats.due_cards);
                println!("Mature (21d+): {}", stats.mature_cards);
                println!("Average ease: {:.2}", stats.average_ease);
                println!("Total reviews: {}", stats.total_reviews);
                println!("Total lapses: {}", stats.total_lapses);
            }
        }

        Commands::History { card } => {
            let history = db.review_history(&learner, card)?;
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&history))?);
            } else if history.is_empty() {
                println!("No reviews recorded for card {}.", card);
            } else {
                println!("{:<26} {:<7} {:<24} INTERVAL", "WHEN", "RATING", "STATUS");
                println!("{}", "-".repeat(70));
                for entry in history {
                    println!(
                        "{:<26} {:<7} {:<24} {} -> {}",
                        entry.reviewed_at,
                        entry.rating.label(),
                        format!(
                            "{} -> {}",
                            entry.status_before.label(),
                            entry.status_after.label()
                        ),
                        format_interval(entry.interval_before),
                        format_interval(entry.interval_after)
                    );
                }
            }
        }

        Commands::Clear { collection } => {
            let deleted = db.clear_progress(&learner, collection)?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "deleted": deleted
                    })))?
                );
            } else {
                println!("Cleared progress on {} card(s).", deleted);
            }
        }

        Commands::Tui { collection } => {
            tui::run(db, scheduler, learner, collection)?;
        }
    }

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    mod truncate_tests {
        use super::*;

        #[test]
        fn truncate_short_string() {
            assert_eq!(truncate("hello", 10), "hello");
        }

        #[test]
        fn truncate_exact_length() {
            assert_eq!(truncate("hello", 5), "hello");
        }

        #[test]
        fn truncate_long_string() {
            assert_eq!(truncate("hello world", 8), "hello...");
        }

        #[test]
        fn truncate_multibyte() {
            assert_eq!(truncate("¿cómo estás hoy?", 8), "¿cómo...");
        }

        #[test]
        fn truncate_empty_string() {
            assert_eq!(truncate("", 10), "");
        }
    }

    mod cli_parsing_tests {
        use super::*;

        #[test]
        fn parse_init_command() {
            let cli = Cli::try_parse_from(["cadence", "init"]).unwrap();
            assert!(!cli.json);
            assert!(cli.learner.is_none());
            assert!(matches!(cli.command, Commands::Init));
        }

        #[test]
        fn parse_global_flags_anywhere() {
            let cli =
                Cli::try_parse_from(["cadence", "stats", "3", "--json", "--learner", "ada"])
                    .unwrap();
            assert!(cli.json);
            assert_eq!(cli.learner.as_deref(), Some("ada"));
        }

        #[test]
        fn parse_collection_add_with_description() {
            let cli = Cli::try_parse_from([
                "cadence",
                "collection",
                "add",
                "Spanish",
                "-d",
                "Basic vocabulary",
            ])
            .unwrap();
            match cli.command {
                Commands::Collection(CollectionCommands::Add { name, description }) => {
                    assert_eq!(name, "Spanish");
                    assert_eq!(description, Some("Basic vocabulary".to_string()));
                }
                _ => panic!("Expected Collection Add command"),
            }
        }

        #[test]
        fn parse_card_add() {
            let cli =
                Cli::try_parse_from(["cadence", "card", "add", "2", "hola", "hello"]).unwrap();
            match cli.command {
                Commands::Card(CardCommands::Add {
                    collection,
                    question,
                    answer,
                }) => {
                    assert_eq!(collection, 2);
                    assert_eq!(question, "hola");
                    assert_eq!(answer, "hello");
                }
                _ => panic!("Expected Card Add command"),
            }
        }

        #[test]
        fn parse_collection_edit() {
            let cli = Cli::try_parse_from(["cadence", "collection", "edit", "3", "-n", "Verbs"])
                .unwrap();
            match cli.command {
                Commands::Collection(CollectionCommands::Edit {
                    id,
                    name,
                    description,
                }) => {
                    assert_eq!(id, 3);
                    assert_eq!(name.as_deref(), Some("Verbs"));
                    assert!(description.is_none());
                }
                _ => panic!("Expected Collection Edit command"),
            }
        }

        #[test]
        fn parse_card_edit() {
            let cli =
                Cli::try_parse_from(["cadence", "card", "edit", "9", "--answer", "hi"]).unwrap();
            match cli.command {
                Commands::Card(CardCommands::Edit {
                    id,
                    question,
                    answer,
                }) => {
                    assert_eq!(id, 9);
                    assert!(question.is_none());
                    assert_eq!(answer.as_deref(), Some("hi"));
                }
                _ => panic!("Expected Card Edit command"),
            }
        }

        #[test]
        fn parse_review_command() {
            let cli = Cli::try_parse_from(["cadence", "review", "7", "--rating", "good"]).unwrap();
            match cli.command {
                Commands::Review { card, rating } => {
                    assert_eq!(card, 7);
                    assert_eq!(rating, "good");
                }
                _ => panic!("Expected Review command"),
            }
        }

        #[test]
        fn parse_review_short_flag() {
            let cli = Cli::try_parse_from(["cadence", "review", "1", "-r", "0"]).unwrap();
            assert!(matches!(cli.command, Commands::Review { card: 1, .. }));
        }

        #[test]
        fn parse_due_default_limit() {
            let cli = Cli::try_parse_from(["cadence", "due", "4"]).unwrap();
            match cli.command {
                Commands::Due { collection, limit } => {
                    assert_eq!(collection, 4);
                    assert_eq!(limit, 0);
                }
                _ => panic!("Expected Due command"),
            }
        }

        #[test]
        fn parse_due_with_limit() {
            let cli = Cli::try_parse_from(["cadence", "due", "4", "-l", "20"]).unwrap();
            assert!(matches!(
                cli.command,
                Commands::Due {
                    collection: 4,
                    limit: 20
                }
            ));
        }

        #[test]
        fn parse_learn_clear_and_tui() {
            let cli = Cli::try_parse_from(["cadence", "learn", "1"]).unwrap();
            assert!(matches!(cli.command, Commands::Learn { collection: 1 }));
            let cli = Cli::try_parse_from(["cadence", "clear", "1"]).unwrap();
            assert!(matches!(cli.command, Commands::Clear { collection: 1 }));
            let cli = Cli::try_parse_from(["cadence", "tui", "1"]).unwrap();
            assert!(matches!(cli.command, Commands::Tui { collection: 1 }));
        }

        #[test]
        fn parse_missing_required_arg_fails() {
            assert!(Cli::try_parse_from(["cadence", "review"]).is_err());
            assert!(Cli::try_parse_from(["cadence", "review", "1"]).is_err());
            assert!(Cli::try_parse_from(["cadence", "card", "add", "1", "q"]).is_err());
        }

        #[test]
        fn parse_invalid_command_fails() {
            assert!(Cli::try_parse_from(["cadence", "invalid"]).is_err());
        }
    }
}
