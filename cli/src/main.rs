use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use dotenv::dotenv;
use log::error;

use db::models::ParsedReference;
use db::passage::DEFAULT_TRANSLATION;
use db::seed::initialize_data;
use db::{
    build_pool, establish_connection, run_migrations, AliasTable, PassageAssembler, SwordDrill,
    SwordDrillable, TextJoin,
};

/// CLI for looking up Bible verses
#[derive(Parser, Debug)]
#[command(name = "scripture", version, about)]
struct Cli {
    /// SQLite database to read from
    #[arg(long, env = "DATABASE_URL", default_value = "/tmp/scripture.db")]
    database_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up a reference, e.g. "John 3:16" or "Genesis 1:1-5"
    Lookup {
        reference: String,

        /// Translation id
        #[arg(short, long, env = "DEFAULT_TRANSLATION", default_value = DEFAULT_TRANSLATION)]
        translation: String,

        /// How verse texts are joined: "space" or "none"
        #[arg(long, env = "TEXT_JOIN", default_value_t = TextJoin::Space)]
        join: TextJoin,
    },
    /// Search verse texts
    Search { query: String },
    /// List books
    Books,
    /// List translations
    Translations,
    /// Create and seed the database
    Seed {
        /// Directory of chapterN.json files for the Book of Jachanan Ben Kathryn
        #[arg(long, env = "CHAPTERS_DIR")]
        chapters_dir: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = io::stdout().lock();
    let drill = || build_pool(&cli.database_url, 1).map(SwordDrill::new);

    match &cli.command {
        Command::Lookup {
            reference,
            translation,
            join,
        } => {
            let drill = drill()?;
            let assembler = PassageAssembler::new(AliasTable::default(), DEFAULT_TRANSLATION, *join);
            let parsed: ParsedReference = assembler.parse(reference)?;
            let passage = assembler.assemble(reference, &parsed, translation, &drill, &drill)?;

            writeln!(out, "{} ({})", parsed, passage.translation_name)?;
            for v in &passage.verses {
                writeln!(out, "{} {}", v.verse, v.text)?;
            }
        }
        Command::Search { query } => {
            for v in drill()?.search(query)? {
                writeln!(out, "{} {}:{} {}", v.book_id, v.chapter, v.verse, v.text)?;
            }
        }
        Command::Books => {
            for b in drill()?.all_books()? {
                writeln!(out, "{}\t{}\t{}", b.id, b.name, b.chapters)?;
            }
        }
        Command::Translations => {
            for t in drill()?.all_translations()? {
                writeln!(out, "{}\t{}\t{}", t.id, t.name, t.note)?;
            }
        }
        Command::Seed { chapters_dir } => {
            let mut conn = establish_connection(&cli.database_url)?;
            run_migrations(&mut conn)?;
            let report = initialize_data(&mut conn, chapters_dir.as_deref())?;
            writeln!(
                out,
                "Seeded {} translations, {} books, {} verses",
                report.translations, report.books, report.verses
            )?;
        }
    }

    Ok(())
}
