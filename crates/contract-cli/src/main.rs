mod config;
mod telemetry;
mod wizard;

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use contract_spec::{
    AnswerSet, AnswerSource, AnswerType, FlowCursor, PromptRenderer, QuestionCatalog,
    QuestionDescriptor, ValidationResult, answers_schema, build_render_payload, is_eligible,
    render_json_ui, render_text, resolve_visibility, section_progress, validate,
    validate::validate_value, validate_section,
};
use serde_json::{Number, Value};
use tracing::{debug, info};

use config::{CliConfig, load_answers};
use wizard::{AnswerParseError, PromptContext, Verbosity, WizardPresenter};

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Purchase-contract questionnaire CLI",
    long_about = "Walks, inspects and validates purchase-contract questionnaires \
                  built from a question catalog"
)]
struct Cli {
    /// Catalog JSON to use (defaults to CONTRACT_QA_CATALOG or the bundled purchase contract).
    #[arg(long, global = true, value_name = "CATALOG")]
    catalog: Option<PathBuf>,
    /// Log filter such as `info` or `contract_spec=debug` (defaults to CONTRACT_QA_LOG or `warn`).
    #[arg(long, global = true, value_name = "FILTER")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum RenderMode {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// List the catalog sections in traversal order.
    Sections,
    /// Load the catalog and report configuration problems.
    Check,
    /// Show the questions of one section against the current answers.
    Questions {
        /// Section identifier, e.g. `finance`.
        #[arg(long, value_name = "SECTION")]
        section: String,
        /// Optional JSON file containing collected answers.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        /// Output format.
        #[arg(long, value_enum, default_value_t = RenderMode::Text)]
        format: RenderMode,
    },
    /// Validate collected answers against the catalog.
    Validate {
        /// JSON file containing collected answers.
        #[arg(long, value_name = "ANSWERS")]
        answers: PathBuf,
        /// Restrict validation to a single section.
        #[arg(long, value_name = "SECTION")]
        section: Option<String>,
    },
    /// Print the catalog JSON schema, or the answers schema of one section.
    Schema {
        /// Section whose answers schema should be printed.
        #[arg(long, value_name = "SECTION")]
        section: Option<String>,
        /// Answers used to decide which questions are visible.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
    },
    /// Walk through every section in a text shell.
    Wizard {
        /// Optional JSON file containing initial answers.
        #[arg(long, value_name = "ANSWERS")]
        answers: Option<PathBuf>,
        /// Section to start from instead of the first one.
        #[arg(long, value_name = "SECTION")]
        start_section: Option<String>,
        /// Write the final answer set to this file.
        #[arg(long, value_name = "OUT")]
        out: Option<PathBuf>,
        /// Show verbose output (statuses, option values, parse expectations).
        #[arg(long, alias = "debug")]
        verbose: bool,
        /// Also emit answer JSON when finished.
        #[arg(long)]
        answers_json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    let config = CliConfig::resolve(cli.catalog, cli.log_level);
    if let Err(err) = telemetry::init(&config.log_level) {
        eprintln!("{err}");
        std::process::exit(2);
    }
    if let Err(err) = run(cli.command, &config) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run(command: Command, config: &CliConfig) -> CliResult<()> {
    let catalog = config.load_catalog()?;
    match command {
        Command::Sections => run_sections(&catalog),
        Command::Check => run_check(&catalog),
        Command::Questions {
            section,
            answers,
            format,
        } => run_questions(&catalog, &section, answers, format),
        Command::Validate { answers, section } => run_validate(&catalog, answers, section),
        Command::Schema { section, answers } => run_schema(&catalog, section, answers),
        Command::Wizard {
            answers,
            start_section,
            out,
            verbose,
            answers_json,
        } => run_wizard(
            &catalog,
            WizardOptions {
                answers,
                start_section,
                out,
                verbose,
                answers_json,
            },
            &mut io::stdin().lock(),
        ),
    }
}

fn run_sections(catalog: &QuestionCatalog) -> CliResult<()> {
    for (index, section) in catalog.sections().iter().enumerate() {
        println!(
            "{:>2}. {:<24} {} ({} questions)",
            index,
            section.id,
            section.title,
            section.questions.len()
        );
    }
    Ok(())
}

fn run_check(catalog: &QuestionCatalog) -> CliResult<()> {
    let conditional = catalog
        .sections()
        .iter()
        .flat_map(|section| section.questions.iter())
        .filter(|question| question.has_dependencies())
        .count();
    println!(
        "Catalog {} v{} is valid: {} sections, {} questions ({} conditional)",
        catalog.id(),
        catalog.version(),
        catalog.section_count(),
        catalog.question_count(),
        conditional
    );
    Ok(())
}

fn run_questions(
    catalog: &QuestionCatalog,
    section: &str,
    answers_path: Option<PathBuf>,
    format: RenderMode,
) -> CliResult<()> {
    let answers = load_answers(answers_path.as_ref(), catalog)?;
    let payload = build_render_payload(catalog, section, &answers)?;
    match format {
        RenderMode::Text => println!("{}", render_text(&payload)),
        RenderMode::Json => {
            let ui = render_json_ui(&payload);
            println!("{}", serde_json::to_string_pretty(&ui)?);
        }
    }
    Ok(())
}

fn run_validate(
    catalog: &QuestionCatalog,
    answers_path: PathBuf,
    section: Option<String>,
) -> CliResult<()> {
    let answers = load_answers(Some(&answers_path), catalog)?;
    let result = match section {
        Some(section) => validate_section(catalog, &section, &answers.answers)?,
        None => validate(catalog, &answers.answers),
    };
    println!(
        "Validation result: {}",
        if result.valid { "valid" } else { "invalid" }
    );
    describe_validation(&result);

    if result.valid {
        Ok(())
    } else {
        Err("validation failed".into())
    }
}

fn describe_validation(result: &ValidationResult) {
    if !result.errors.is_empty() {
        println!("Errors:");
        for error in &result.errors {
            println!(
                "  {}/{} - {}",
                error.section_id.as_deref().unwrap_or("<unknown>"),
                error.field_id.as_deref().unwrap_or("<unknown>"),
                error.message
            );
        }
    }
    if !result.missing_required.is_empty() {
        println!(
            "Missing required answers: {}",
            result.missing_required.join(", ")
        );
    }
    if !result.unknown_fields.is_empty() {
        println!(
            "Unknown answer fields: {}",
            result.unknown_fields.join(", ")
        );
    }
    if !result.stale_fields.is_empty() {
        println!(
            "Answers for hidden questions: {}",
            result.stale_fields.join(", ")
        );
    }
}

fn run_schema(
    catalog: &QuestionCatalog,
    section: Option<String>,
    answers_path: Option<PathBuf>,
) -> CliResult<()> {
    let schema = match section {
        Some(section) => {
            let answers = load_answers(answers_path.as_ref(), catalog)?;
            let visibility = resolve_visibility(catalog, &section, &answers)?;
            answers_schema(catalog, &section, &visibility)?
        }
        None => serde_json::to_value(QuestionCatalog::config_schema())?,
    };
    println!("{}", serde_json::to_string_pretty(&schema)?);
    Ok(())
}

struct WizardOptions {
    answers: Option<PathBuf>,
    start_section: Option<String>,
    out: Option<PathBuf>,
    verbose: bool,
    answers_json: bool,
}

/// What the user asked for after a section was walked.
#[derive(Debug, PartialEq, Eq)]
enum SectionOutcome {
    Next,
    Back,
}

enum Reply {
    Answer(Value),
    Keep,
    Back,
}

fn run_wizard<R: BufRead>(
    catalog: &QuestionCatalog,
    options: WizardOptions,
    input: &mut R,
) -> CliResult<()> {
    let mut answers = load_answers(options.answers.as_ref(), catalog)?;
    let mut presenter =
        WizardPresenter::new(Verbosity::from_verbose(options.verbose), options.answers_json);
    let renderer = PromptRenderer::for_catalog(catalog);
    let mut cursor = FlowCursor::new(catalog.navigator());
    match &options.start_section {
        Some(section) => {
            cursor.jump_to(section)?;
        }
        None => {
            cursor.advance();
        }
    }

    presenter.show_header(catalog.title(), catalog.description());
    let mut revisit = false;
    while let Some(section_id) = cursor.current_section().map(str::to_string) {
        debug!(section = %section_id, revisit, "entering section");
        let payload = build_render_payload(catalog, &section_id, &answers)?;
        presenter.show_section(&payload);

        let outcome = walk_section(
            catalog,
            &section_id,
            &mut answers,
            &presenter,
            &renderer,
            input,
            revisit,
        )?;
        match outcome {
            SectionOutcome::Next => {
                let payload = build_render_payload(catalog, &section_id, &answers)?;
                presenter.show_side_effects(&payload.side_effects);
                cursor.advance();
                revisit = false;
            }
            SectionOutcome::Back => {
                cursor.retreat();
                if cursor.current_section().is_none() {
                    println!("Already at the first section.");
                    cursor.advance();
                }
                revisit = true;
            }
        }
    }

    info!(answers = answers.len(), "wizard finished");
    presenter.show_completion(&answers);
    if let Some(path) = options.out {
        fs::write(&path, answers.to_json_pretty()?)?;
        println!("Saved answers to {}", path.display());
    }
    Ok(())
}

/// Asks every eligible question of the section in order. Eligibility is
/// re-evaluated as each answer lands, so later questions see earlier ones.
fn walk_section<R: BufRead>(
    catalog: &QuestionCatalog,
    section_id: &str,
    answers: &mut AnswerSet,
    presenter: &WizardPresenter,
    renderer: &PromptRenderer,
    input: &mut R,
    revisit: bool,
) -> CliResult<SectionOutcome> {
    for question in catalog.questions_for_section(section_id)? {
        if !is_eligible(question, &*answers) {
            continue;
        }
        if !question.is_answerable() {
            if let Some(narrative) = &question.narrative {
                presenter.show_narrative(narrative);
            }
            continue;
        }
        if answers.has_answer(&question.field_id) && !revisit {
            continue;
        }
        let current = answers
            .get(&question.field_id)
            .filter(|value| !value.is_null())
            .cloned();

        let progress = section_progress(catalog, section_id, &*answers)?;
        let prompt_text = renderer
            .prompt_for(question, &*answers)
            .unwrap_or_else(|| question.field_id.clone());
        let prompt = PromptContext::new(question, prompt_text, &progress, current.as_ref());

        match ask(question, &prompt, current.as_ref(), presenter, input)? {
            Reply::Answer(value) => {
                answers.insert(question.field_id.clone(), value);
            }
            Reply::Keep => {}
            Reply::Back => return Ok(SectionOutcome::Back),
        }
    }
    Ok(SectionOutcome::Next)
}

fn ask<R: BufRead>(
    question: &QuestionDescriptor,
    prompt: &PromptContext,
    current: Option<&Value>,
    presenter: &WizardPresenter,
    input: &mut R,
) -> CliResult<Reply> {
    loop {
        presenter.show_prompt(prompt);
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Err("input ended before the wizard finished".into());
        }

        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("exit") {
            return Err("wizard aborted by user".into());
        }
        if trimmed.eq_ignore_ascii_case("back") {
            return Ok(Reply::Back);
        }
        if trimmed.is_empty() {
            if current.is_some() || !question.is_required() {
                return Ok(Reply::Keep);
            }
            presenter.show_parse_error(&AnswerParseError::new(
                "This question requires an answer.",
                None,
            ));
            continue;
        }

        match parse_answer(question, trimmed) {
            Ok(value) => return Ok(Reply::Answer(value)),
            Err(err) => presenter.show_parse_error(&err),
        }
    }
}

fn parse_answer(question: &QuestionDescriptor, raw: &str) -> Result<Value, AnswerParseError> {
    let value = match question.answer_type {
        Some(AnswerType::Boolean) | Some(AnswerType::ReferralLink) => parse_boolean(raw)?,
        Some(AnswerType::Number) => parse_number(raw)?,
        Some(AnswerType::Currency) => parse_currency(raw)?,
        Some(AnswerType::SingleSelect) => parse_select(question, raw)?,
        Some(AnswerType::Text)
        | Some(AnswerType::Phone)
        | Some(AnswerType::Date)
        | None => Value::String(raw.to_string()),
    };

    match validate_value(question, &value) {
        None => Ok(value),
        Some(error) => Err(AnswerParseError::new(
            error.message,
            error.code.map(|code| format!("{} ({})", code, question.field_id)),
        )),
    }
}

fn parse_boolean(raw: &str) -> Result<Value, AnswerParseError> {
    match raw.to_lowercase().as_str() {
        "true" | "t" | "yes" | "y" | "1" => Ok(Value::Bool(true)),
        "false" | "f" | "no" | "n" | "0" => Ok(Value::Bool(false)),
        _ => Err(AnswerParseError::new(
            "Please enter yes or no.",
            Some("expected boolean (y/n/true/false)".to_string()),
        )),
    }
}

fn parse_number(raw: &str) -> Result<Value, AnswerParseError> {
    if let Ok(value) = raw.parse::<i64>() {
        return Ok(Value::Number(Number::from(value)));
    }
    raw.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| {
            AnswerParseError::new(
                "Please enter a number.",
                Some("expected finite number".to_string()),
            )
        })
}

fn parse_currency(raw: &str) -> Result<Value, AnswerParseError> {
    let cleaned: String = raw
        .trim()
        .trim_start_matches('$')
        .chars()
        .filter(|ch| *ch != ',')
        .collect();
    parse_number(&cleaned).map_err(|_| {
        AnswerParseError::new(
            "Please enter an amount such as 250000 or $1,500.50.",
            Some("expected currency".to_string()),
        )
    })
}

fn parse_select(question: &QuestionDescriptor, raw: &str) -> Result<Value, AnswerParseError> {
    if let Ok(position) = raw.parse::<usize>()
        && let Some(option) = position
            .checked_sub(1)
            .and_then(|index| question.options.get(index))
    {
        return Ok(Value::String(option.value.clone()));
    }
    question
        .options
        .iter()
        .find(|option| {
            option.value.eq_ignore_ascii_case(raw) || option.label.eq_ignore_ascii_case(raw)
        })
        .map(|option| Value::String(option.value.clone()))
        .ok_or_else(|| {
            let labels = question
                .options
                .iter()
                .map(|option| option.label.as_str())
                .collect::<Vec<_>>();
            AnswerParseError::new(
                format!("Choose one of: {}.", labels.join(", ")),
                Some(format!("{} options", question.options.len())),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use contract_spec::default_catalog;
    use serde_json::json;
    use std::io::Cursor;

    fn question(kind: AnswerType) -> QuestionDescriptor {
        QuestionDescriptor::new("field", kind).with_prompt("Field?")
    }

    #[test]
    fn parse_answer_boolean_accepts_yes() {
        assert_eq!(
            parse_answer(&question(AnswerType::Boolean), "yes").unwrap(),
            Value::Bool(true)
        );
        assert!(parse_answer(&question(AnswerType::Boolean), "maybe").is_err());
    }

    #[test]
    fn parse_answer_currency_strips_symbols() {
        let currency = question(AnswerType::Currency);
        assert_eq!(parse_answer(&currency, "$325,000").unwrap(), json!(325000));
        assert_eq!(parse_answer(&currency, "1,500.50").unwrap(), json!(1500.5));
        assert!(parse_answer(&currency, "12.345").is_err());
        assert!(parse_answer(&currency, "lots").is_err());
    }

    #[test]
    fn parse_answer_select_accepts_index_value_or_label() {
        let select = question(AnswerType::SingleSelect)
            .with_option("CONVENTIONAL", "Conventional")
            .with_option("FHA", "FHA");
        assert_eq!(parse_answer(&select, "2").unwrap(), json!("FHA"));
        assert_eq!(parse_answer(&select, "conventional").unwrap(), json!("CONVENTIONAL"));
        assert!(parse_answer(&select, "3").is_err());
        assert!(parse_answer(&select, "VA").is_err());
    }

    #[test]
    fn parse_answer_checks_phone_and_date() {
        assert_eq!(
            parse_answer(&question(AnswerType::Phone), "(555) 123-4567").unwrap(),
            json!("(555) 123-4567")
        );
        assert!(parse_answer(&question(AnswerType::Phone), "12345").is_err());
        assert!(parse_answer(&question(AnswerType::Date), "2025-06-31").is_err());
        assert_eq!(
            parse_answer(&question(AnswerType::Date), "2025-06-30").unwrap(),
            json!("2025-06-30")
        );
    }

    #[test]
    fn walk_section_skips_hidden_questions() {
        let catalog = default_catalog().expect("catalog");
        let presenter = WizardPresenter::new(Verbosity::Clean, false);
        let renderer = PromptRenderer::new();
        let mut answers = AnswerSet::new(catalog.id(), catalog.version());
        let mut input = Cursor::new("no\n");

        let outcome = walk_section(
            &catalog,
            "homeownersAssociation",
            &mut answers,
            &presenter,
            &renderer,
            &mut input,
            false,
        )
        .expect("walk");
        assert_eq!(outcome, SectionOutcome::Next);
        assert_eq!(answers.len(), 1);
        assert_eq!(answers.get("hasHomeownersAssociation"), Some(&json!(false)));
    }

    #[test]
    fn walk_section_returns_back_on_request() {
        let catalog = default_catalog().expect("catalog");
        let presenter = WizardPresenter::new(Verbosity::Clean, false);
        let renderer = PromptRenderer::new();
        let mut answers = AnswerSet::new(catalog.id(), catalog.version());
        let mut input = Cursor::new("yes\nback\n");

        let outcome = walk_section(
            &catalog,
            "homeownersAssociation",
            &mut answers,
            &presenter,
            &renderer,
            &mut input,
            false,
        )
        .expect("walk");
        assert_eq!(outcome, SectionOutcome::Back);
        assert_eq!(answers.get("hasHomeownersAssociation"), Some(&json!(true)));
    }

    #[test]
    fn wizard_fails_when_input_runs_out() {
        let catalog = default_catalog().expect("catalog");
        let options = WizardOptions {
            answers: None,
            start_section: Some("closing".into()),
            out: None,
            verbose: false,
            answers_json: false,
        };
        let mut input = Cursor::new("2025-07-15\n");
        assert!(run_wizard(&catalog, options, &mut input).is_err());
    }

    #[test]
    fn walk_section_asks_again_for_null_answers() {
        let catalog = default_catalog().expect("catalog");
        let presenter = WizardPresenter::new(Verbosity::Clean, false);
        let renderer = PromptRenderer::for_catalog(&catalog);
        let mut answers = AnswerSet::new(catalog.id(), catalog.version());
        answers.insert("hasHomeownersAssociation", Value::Null);
        let mut input = Cursor::new("no\n");

        let outcome = walk_section(
            &catalog,
            "homeownersAssociation",
            &mut answers,
            &presenter,
            &renderer,
            &mut input,
            false,
        )
        .expect("walk");
        assert_eq!(outcome, SectionOutcome::Next);
        assert_eq!(answers.get("hasHomeownersAssociation"), Some(&json!(false)));
    }
}
