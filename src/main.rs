//! Exam annotator - entry point

use anyhow::Context;
use clap::{Parser, Subcommand};
use exam_annotator::pdf::{
    create_pdfium, parse_page_range, validate_pdf_header, DocumentSurface, PdfiumSurface,
};
use exam_annotator::text::{segment_answers, Normalizer};
use exam_annotator::{annotate_pdf, AnnotationConfig};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "exam-annotator", version, about = "Annotate graded exam scripts")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write scores, comments, ticks, and underlines onto a script
    Annotate {
        /// Student script PDF
        #[arg(long)]
        input: PathBuf,
        /// Grades CSV produced by the grading stage
        #[arg(long)]
        grades: PathBuf,
        /// Student name; lower-cased for the output layout
        #[arg(long)]
        student: String,
        /// Directory receiving <student>/<student>_annotated.pdf
        #[arg(long, default_value = "annotations")]
        output_dir: PathBuf,
        /// Model-answer JSON; questions it allocates marks to but the
        /// grades table misses are zero-filled
        #[arg(long)]
        model_answers: Option<PathBuf>,
        /// Override the comment band width in points
        #[arg(long)]
        comment_width: Option<f32>,
    },
    /// Extract normalized, question-segmented answer text as JSON
    Extract {
        /// Student script PDF
        #[arg(long)]
        input: PathBuf,
        /// Pages holding the answer, e.g. "1,2" or "1-3" (1-indexed)
        #[arg(long)]
        pages: String,
        /// Question number the chunks belong to
        #[arg(long)]
        question: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "exam_annotator=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Annotate {
            input,
            grades,
            student,
            output_dir,
            model_answers,
            comment_width,
        } => {
            let mut config = AnnotationConfig::default();
            if let Some(width) = comment_width {
                config.comment_width = width;
            }

            let outcome = annotate_pdf(
                &input,
                &grades,
                &student,
                &output_dir,
                model_answers.as_deref(),
                &config,
            )
            .with_context(|| format!("annotating {}", input.display()))?;

            tracing::info!(
                scores = outcome.report.scores_placed,
                comments = outcome.report.comments_placed,
                ticks = outcome.report.ticks_placed,
                underlines = outcome.report.underlines_drawn,
                unmatched_lines = outcome.report.lines_unmatched,
                "run summary"
            );
            println!("{}", outcome.output_path.display());
            Ok(())
        }
        Command::Extract {
            input,
            pages,
            question,
        } => extract(&input, &pages, &question),
    }
}

fn extract(input: &PathBuf, page_selection: &str, question: &str) -> anyhow::Result<()> {
    let data = std::fs::read(input).with_context(|| format!("reading {}", input.display()))?;
    validate_pdf_header(&data)?;

    let pdfium = create_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(&data, None)
        .map_err(exam_annotator::pdf::pdfium::map_pdfium_error)?;
    let surface = PdfiumSurface::new(document)?;

    let pages = parse_page_range(page_selection, surface.page_count())?;
    let normalizer = Normalizer::default();

    let mut sections = Vec::new();
    for page in &pages {
        let text = surface.page_text(page - 1)?;
        let cleaned = normalizer.normalize(&text);
        if !cleaned.is_empty() {
            sections.push(format!("--- Page {} ---\n{}", page, cleaned));
        }
    }

    let chunks = segment_answers(&sections.join("\n\n"), question);
    serde_json::to_writer_pretty(std::io::stdout(), &chunks)?;
    println!();
    Ok(())
}
