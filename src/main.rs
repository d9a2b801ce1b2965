use clap::Parser;
use qamatch::{app, cli, qa::QuestionSubmission, web};
use tracing_subscriber::EnvFilter;

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    init_logging();

    let paths = app::AppFactory::get_paths()?;
    let (config, service) = app::AppFactory::create_service(&paths)?;

    match args.command {
        cli::Command::Daemon { addr } => {
            let addr = addr.unwrap_or_else(|| config.listen_addr.clone());
            web::start_daemon(web::SharedState::new(config, service), &addr)
        }

        cli::Command::Ask {
            mentor,
            mentee,
            summary,
            origin,
        } => {
            let submission = QuestionSubmission {
                mentor_nickname: mentor,
                mentee_nickname: mentee,
                question_origin: origin.unwrap_or_else(|| summary.clone()),
                question_summary: summary,
            };

            let similar = service.submit(submission)?;
            println!("{}", serde_json::to_string_pretty(&similar)?);
            Ok(())
        }

        cli::Command::Answer { id, answer } => {
            let doc = service.answer(id, &answer)?;
            println!("{}", serde_json::to_string_pretty(&doc)?);
            Ok(())
        }

        cli::Command::History { mentor } => {
            let docs = service.history(&mentor)?;
            println!("{}", serde_json::to_string_pretty(&docs)?);
            Ok(())
        }
    }
}
