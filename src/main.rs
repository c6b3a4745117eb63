//! Command-line front end over the vault. Each invocation opens the store
//! chosen by the settings file (or flags), loads the cache, runs one command
//! and exits.
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use passvault::password::generate_password;
use passvault::seed::demo_entries;
use passvault::{Entry, EntryField, Settings, StorageMode, Vault};

#[derive(Parser, Debug)]
#[command(name = "passvault")]
#[command(about = "Store and search password entries in a local SQLite file")]
struct Args {
    /// Use a throwaway in-memory database instead of the configured file.
    #[arg(long, global = true, conflicts_with = "database")]
    memory: bool,

    /// Path to the database file, overriding the settings file.
    #[arg(short, long, global = true)]
    database: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List every entry title in alphabetical order.
    List,
    /// Show entries whose title contains the query.
    Search { query: String },
    /// Print one entry.
    Show { title: String },
    /// Add a new entry.
    Add {
        title: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        secondary_email: Option<String>,
        #[arg(long, conflicts_with = "generate")]
        password: Option<String>,
        /// Fill the password with a generated one.
        #[arg(long)]
        generate: bool,
        #[arg(long)]
        username: Option<String>,
        #[arg(long)]
        phone_number: Option<String>,
        #[arg(long)]
        link: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// Change one field of an entry.
    Edit {
        title: String,
        field: EntryField,
        value: String,
    },
    /// Delete an entry.
    Remove { title: String },
    /// List the distinct categories.
    Groups,
    /// List the distinct email addresses.
    Emails,
    /// Open the entry's link in the default browser.
    Open { title: String },
    /// Insert randomly generated demo entries.
    Seed {
        #[arg(default_value_t = 25)]
        count: usize,
    },
    /// Print a generated password.
    Generate,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("passvault=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Command::Generate = args.command {
        println!("{}", generate_password());
        return Ok(());
    }

    let mut settings = Settings::load()?;
    if args.memory {
        settings.mode = StorageMode::Memory;
    }
    if let Some(path) = args.database {
        settings.mode = StorageMode::File;
        settings.database_path = Some(path);
    }

    let mut vault = Vault::open(&settings)?;

    run(&mut vault, args.command)
}

fn run(vault: &mut Vault, command: Command) -> Result<()> {
    match command {
        Command::List => {
            for entry in vault.cache().entries() {
                println!("{}", entry.title);
            }
        }
        Command::Search { query } => {
            for unit in vault.index().filter(&query) {
                println!(
                    "{}\t{}\t{}",
                    unit.title(),
                    unit.email(),
                    unit.username().unwrap_or("-")
                );
            }
        }
        Command::Show { title } => {
            let entry = vault.store().get(&title)?;
            print!("{entry}");
        }
        Command::Add {
            title,
            email,
            secondary_email,
            password,
            generate,
            username,
            phone_number,
            link,
            category,
        } => {
            let password = if generate { Some(generate_password()) } else { password };
            let fields = [
                (EntryField::Email, email),
                (EntryField::SecondaryEmail, secondary_email),
                (EntryField::Password, password),
                (EntryField::Username, username),
                (EntryField::PhoneNumber, phone_number),
                (EntryField::Link, link),
                (EntryField::Category, category),
            ];
            let entry = fields
                .into_iter()
                .fold(Entry::builder(title), |builder, (field, value)| match value {
                    Some(value) => builder.field(field, value),
                    None => builder,
                })
                .build();
            vault.add(&entry)?;
            println!("Added {}", entry.title);
        }
        Command::Edit {
            title,
            field,
            value,
        } => {
            vault.edit(&title, field, &value)?;
            println!("Updated {field} on {title}");
        }
        Command::Remove { title } => {
            vault.remove(&title)?;
            println!("Removed {title}");
        }
        Command::Groups => {
            for group in vault.cache().groups() {
                println!("{group}");
            }
        }
        Command::Emails => {
            for email in vault.cache().unique_emails() {
                println!("{email}");
            }
        }
        Command::Open { title } => {
            let entry = vault.store().get(&title)?;
            let Some(link) = entry.link.filter(|link| !link.trim().is_empty()) else {
                bail!("{title} has no link");
            };
            open::that(&link).with_context(|| format!("failed to open {link}"))?;
        }
        Command::Seed { count } => {
            let mut added = 0;
            for entry in demo_entries(count, &mut rand::thread_rng()) {
                if vault.cache().contains(&entry.title) {
                    continue;
                }
                vault.store().create(&entry)?;
                added += 1;
            }
            vault.sync()?;
            println!("Seeded {added} entries");
        }
        Command::Generate => println!("{}", generate_password()),
    }
    Ok(())
}
