use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start qamatch as a service.
    Daemon {
        /// Address to listen on. Overrides `listen_addr` from config.yaml
        #[clap(long)]
        addr: Option<String>,
    },
    /// Submit a question and print the most similar answered ones
    Ask {
        /// Mentor the question is addressed to
        #[clap(long)]
        mentor: String,

        /// Mentee asking the question
        #[clap(long)]
        mentee: String,

        /// Summarized question
        #[clap(short, long)]
        summary: String,

        /// Full original question. Defaults to the summary
        #[clap(short, long)]
        origin: Option<String>,
    },
    /// Record the answer to a stored question
    Answer {
        /// Question id
        id: u64,

        /// Answer text
        answer: String,
    },
    /// List a mentor's answered questions
    History {
        /// Mentor nickname
        mentor: String,
    },
}
