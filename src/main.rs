use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use transcript_gpa::grading::what_if;
use transcript_gpa::grading::GpaSummary;
use transcript_gpa::grading::Outlook;
use transcript_gpa::grading::WhatIf;
use transcript_gpa::transcript::fallback_term;
use transcript_gpa::CourseRecord;
use transcript_gpa::FileKind;
use transcript_gpa::IngestOptions;
use transcript_gpa::Payload;
use transcript_gpa::Snapshot;
use transcript_gpa::TranscriptIngestor;

/// Command-line arguments for transcript-gpa
#[derive(Parser, Debug)]
#[command(name = "transcript-gpa")]
#[command(about = "Parse an academic transcript and compute its GPA")]
#[command(version)]
struct Args {
    /// Transcript file (.csv, .xlsx, .txt or .pdf)
    file: PathBuf,

    /// Declared media type; takes precedence over the file extension
    #[arg(long)]
    media_type: Option<String>,

    /// Term assigned to courses whose source names none
    #[arg(long, env = "TRANSCRIPT_GPA_TERM", default_value_t = fallback_term().to_owned())]
    term: String,

    /// Largest file accepted, in bytes
    #[arg(long, env = "TRANSCRIPT_GPA_MAX_SIZE", default_value_t = 10 * 1024 * 1024)]
    max_size: u64,

    /// Print the JSON snapshot instead of a table
    #[arg(long)]
    json: bool,

    /// Target cumulative GPA for a projection
    #[arg(long, requires = "what_if_credits")]
    what_if_target: Option<f64>,

    /// Credits still to be taken for the projection
    #[arg(long, requires = "what_if_target")]
    what_if_credits: Option<f64>,
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "transcript_gpa=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let file_name = args.file.to_string_lossy().to_string();

    let kind = FileKind::detect(args.media_type.as_deref(), &file_name)?;
    let size = fs::metadata(&args.file)
        .with_context(|| format!("Failed to stat {}", file_name))?
        .len();
    if size > args.max_size {
        bail!("{} is {} bytes, larger than the {} byte limit", file_name, size, args.max_size);
    }
    let bytes = fs::read(&args.file).with_context(|| format!("Failed to read {}", file_name))?;
    debug!(%kind, size, "read transcript file");

    let options = IngestOptions { fallback_term: args.term, ..IngestOptions::default() };
    let ingestion = TranscriptIngestor::new(options)
        .ingest(kind, Payload::Bytes(&bytes))
        .with_context(|| format!("Failed to parse {}", file_name))?;
    let summary = GpaSummary::from_records(&ingestion.records);

    if args.json {
        println!("{}", Snapshot::capture(&ingestion.records, &summary).to_json_pretty()?);
    } else {
        println!("{}", ingestion.status);
        print_records(&ingestion.records);
        print_summary(&summary);
    }

    if let (Some(target), Some(credits)) = (args.what_if_target, args.what_if_credits) {
        let projection = what_if(&summary, target, credits)
            .context("What-if credits must be a positive number")?;
        println!("{}", describe_projection(&projection));
    }
    Ok(())
}

fn describe_projection(projection: &WhatIf) -> String {
    let target = projection.target_gpa;
    let credits = projection.additional_credits;
    match projection.outlook {
        Outlook::Reachable => {
            let needed = match projection.required_percentage {
                Some(floor) => format!(" (about {}% or higher)", floor),
                None => String::new(),
            };
            format!(
                "To reach {:.2} you need an average of {:.2}{} over the next {} credits",
                target, projection.required_grade_point, needed, credits
            )
        }
        Outlook::Unreachable => format!(
            "A GPA of {:.2} cannot be reached with {} more credits (needs {:.2})",
            target, credits, projection.required_grade_point
        ),
        Outlook::Secured => format!("A GPA of {:.2} is already secured", target),
    }
}

fn print_records(records: &[CourseRecord]) {
    if records.is_empty() {
        return;
    }
    println!();
    println!("{:>4}  {:<12}  {:<32}  {:>6}  {:>7}  {:>4}  {:<2}", "id", "term", "course", "%", "credits", "gp", "");
    for record in records {
        let grade_point = record.grade_point().map(|gp| format!("{:.1}", gp)).unwrap_or_default();
        println!(
            "{:>4}  {:<12}  {:<32}  {:>6}  {:>7}  {:>4}  {:<2}",
            record.id,
            record.term,
            record.name,
            record.percentage,
            record.credits,
            grade_point,
            record.letter().unwrap_or(""),
        );
    }
}

fn print_summary(summary: &GpaSummary) {
    let Some(gpa) = summary.gpa else {
        return;
    };
    println!();
    for term in &summary.terms {
        println!("{:<12}  GPA {:.2}  ({} credits)", term.term, term.gpa, term.credits);
    }
    println!(
        "Cumulative GPA {:.2} over {} credits, average {:.1}%",
        gpa,
        summary.total_credits,
        summary.average_percentage.unwrap_or_default(),
    );
}
