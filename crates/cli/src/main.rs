use clap::{Parser, Subcommand};
use ddx_core::content::{ConceptId, DifferentialDiagnosis};
use ddx_core::{
    resolve_knowledge_base_dir, DdxError, DifferentialExplorer, DifferentialExplorerResult,
    KnowledgeBase, Sex, SymptomModifiers, UserSymptomInput, EDUCATIONAL_DISCLAIMER,
};
use std::fmt::Write as _;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "ddx")]
#[command(about = "Differential diagnosis explorer (educational use only)")]
struct Cli {
    /// Directory containing diagnoses.yaml and symptoms.yaml
    #[arg(long, global = true, env = "DDX_KNOWLEDGE_BASE_DIR")]
    knowledge_base: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Rank the differential for a symptom
    Explore {
        /// Symptom id, e.g. chest-pain
        symptom: ConceptId,
        /// Associated symptoms (repeatable)
        #[arg(long = "associated")]
        associated: Vec<String>,
        /// Aggravating factors (repeatable)
        #[arg(long = "aggravating")]
        aggravating: Vec<String>,
        /// Relieving factors (repeatable)
        #[arg(long = "relieving")]
        relieving: Vec<String>,
        /// Medical history items (repeatable)
        #[arg(long = "history")]
        history: Vec<String>,
        /// Age in years
        #[arg(long)]
        age: Option<u8>,
        /// female, male or other
        #[arg(long)]
        sex: Option<Sex>,
        /// Severity from 0 to 10
        #[arg(long)]
        severity: Option<u8>,
        /// Free-text duration, e.g. "2 days"
        #[arg(long)]
        duration: Option<String>,
        /// Attach the full record of this diagnosis
        #[arg(long)]
        select: Option<String>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Show a diagnosis
    Diagnosis {
        /// Diagnosis id, e.g. appendicitis
        id: String,
        /// Print only this explanation level (1-5)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        level: Option<u8>,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// List symptoms, optionally filtered by a search
    Symptoms {
        /// Search by name, id or alias
        #[arg(long)]
        search: Option<String>,
    },
    /// Find symptoms whose candidate diagnoses carry a matching red flag
    RedFlags {
        /// Alarm text or tag, e.g. "neck stiffness"
        query: String,
    },
    /// Load the knowledge base and report what it contains
    Validate,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive("ddx=warn".parse()?))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use 'ddx --help' for commands");
        return Ok(());
    };

    let dir = resolve_knowledge_base_dir(cli.knowledge_base)?;
    let kb = KnowledgeBase::load_from_dir(&dir)?;

    let json = command.wants_json();
    match run(command, kb) {
        Ok(output) => {
            print!("{output}");
            Ok(())
        }
        Err(err) if err.is_not_found() => {
            print!("{}", render_not_found(&err, json));
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

impl Commands {
    fn wants_json(&self) -> bool {
        matches!(
            self,
            Commands::Explore { json: true, .. } | Commands::Diagnosis { json: true, .. }
        )
    }
}

fn render_not_found(err: &DdxError, json: bool) -> String {
    if json {
        to_json(&serde_json::json!({
            "error": err.to_string(),
            "disclaimer": EDUCATIONAL_DISCLAIMER,
        }))
    } else {
        format!("No information available: {err}\n\n{EDUCATIONAL_DISCLAIMER}\n")
    }
}

fn run(command: Commands, kb: KnowledgeBase) -> Result<String, DdxError> {
    match command {
        Commands::Explore {
            symptom,
            associated,
            aggravating,
            relieving,
            history,
            age,
            sex,
            severity,
            duration,
            select,
            json,
        } => {
            let modifiers = SymptomModifiers {
                duration,
                severity,
                associated_symptoms: associated,
                aggravating_factors: aggravating,
                relieving_factors: relieving,
                medical_history: history,
                age,
                sex,
            };
            let mut input = UserSymptomInput::new(symptom);
            if modifiers != SymptomModifiers::default() {
                input = input.with_modifiers(modifiers);
            }

            let explorer = DifferentialExplorer::new(Arc::new(kb));
            let result = explorer.explore_with_selection(&input, select.as_deref())?;
            if json {
                Ok(to_json(&result))
            } else {
                Ok(render_explore(&result))
            }
        }
        Commands::Diagnosis { id, level, json } => {
            if let Some(level) = level {
                let text = kb.explanation(&id, level)?;
                return Ok(format!("{text}\n\n{EDUCATIONAL_DISCLAIMER}\n"));
            }
            let diagnosis = kb.require_diagnosis(&id)?;
            if json {
                Ok(to_json(&serde_json::json!({
                    "diagnosis": diagnosis,
                    "disclaimer": EDUCATIONAL_DISCLAIMER,
                })))
            } else {
                Ok(render_diagnosis(diagnosis))
            }
        }
        Commands::Symptoms { search } => {
            let mut out = String::new();
            let hits = kb.search_symptoms(search.as_deref().unwrap_or_default());
            if hits.is_empty() {
                out.push_str("No matching symptoms.\n");
            }
            for (list, _) in hits {
                let _ = writeln!(
                    out,
                    "{:<24} {} ({} candidates)",
                    list.symptom_id,
                    list.symptom_name,
                    list.entries.len()
                );
            }
            Ok(out)
        }
        Commands::RedFlags { query } => Ok(render_red_flag_search(&kb, &query)),
        Commands::Validate => Ok(format!(
            "Knowledge base {} OK: {} diagnoses, {} symptoms\n",
            kb.version(),
            kb.diagnoses().len(),
            kb.symptoms().len()
        )),
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(json) => format!("{json}\n"),
        Err(err) => format!("{{\"error\": \"{err}\"}}\n"),
    }
}

fn render_explore(result: &DifferentialExplorerResult) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", result.symptom_name, result.symptom_id);
    let _ = writeln!(out);

    let _ = writeln!(out, "Ranked differential:");
    for item in &result.ranked {
        let marker = if item.entry.must_not_miss {
            "  MUST NOT MISS"
        } else {
            ""
        };
        let _ = writeln!(
            out,
            "  {:>2}. {} [{}] score {}{}",
            item.position, item.diagnosis_name, item.entry.likelihood, item.score, marker
        );
        for reason in &item.reasons {
            let _ = writeln!(
                out,
                "        +{} {} ({})",
                reason.weight, reason.matched, reason.input
            );
        }
    }

    if !result.red_flags_present.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Red flags:");
        for flag in &result.red_flags_present {
            let _ = writeln!(
                out,
                "  ! [{}] {}: {} -> {}",
                flag.alarm.timeframe, flag.diagnosis_name, flag.alarm.symptom, flag.alarm.action
            );
        }
    }

    let action = &result.recommended_action;
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Recommended action: {} ({}) based on {}",
        action.urgency, action.setting, result.guidance_source
    );
    let _ = writeln!(out, "  {}", action.reasoning);
    for step in &action.immediate_actions {
        let _ = writeln!(out, "  - {step}");
    }

    if !result.anatomy_highlights.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Anatomy:");
        for highlight in &result.anatomy_highlights {
            let _ = writeln!(
                out,
                "  {} [{}] {} from {}",
                highlight.anatomy.structure_name,
                highlight.anatomy.involvement_type,
                highlight.anatomy.highlight_color,
                highlight.diagnosis_id
            );
        }
    }

    if let Some(selected) = &result.selected_diagnosis {
        let _ = writeln!(out);
        out.push_str(&render_diagnosis_body(selected));
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}", result.disclaimer);
    out
}

fn render_diagnosis(diagnosis: &DifferentialDiagnosis) -> String {
    let mut out = render_diagnosis_body(diagnosis);
    let _ = writeln!(out);
    let _ = writeln!(out, "{EDUCATIONAL_DISCLAIMER}");
    out
}

fn render_diagnosis_body(dx: &DifferentialDiagnosis) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", dx.name, dx.diagnosis_id);
    let _ = writeln!(out, "Category: {}  Likelihood: {}", dx.category, dx.likelihood);
    let _ = writeln!(out, "Mechanism: {}", dx.pathophysiology.mechanism);
    let _ = writeln!(out, "Presentation: {}", dx.clinical_features.typical_presentation);

    if !dx.pathophysiology.risk_factors.is_empty() {
        let factors: Vec<&str> = dx
            .pathophysiology
            .risk_factors
            .iter()
            .map(|f| f.as_str())
            .collect();
        let _ = writeln!(out, "Risk factors: {}", factors.join(", "));
    }
    for alarm in &dx.red_flags {
        let _ = writeln!(out, "Red flag [{}]: {} ({})", alarm.timeframe, alarm.symptom, alarm.concern);
    }
    let _ = writeln!(
        out,
        "Care: {} in {}",
        dx.care_guidance.urgency, dx.care_guidance.setting
    );
    let _ = writeln!(out, "Treatment: {}", dx.treatment_overview);
    let _ = writeln!(out, "Prognosis: {}", dx.prognosis);
    let _ = writeln!(out, "In short: {}", dx.explanations.level1);
    out
}

fn render_red_flag_search(kb: &KnowledgeBase, query: &str) -> String {
    let mut out = String::new();
    let matches = kb.search_red_flags(query);
    if matches.is_empty() {
        let _ = writeln!(out, "No red flags match '{query}'.");
    }
    for m in matches {
        let symptoms: Vec<&str> = kb
            .symptoms_for_diagnosis(m.diagnosis.diagnosis_id.as_str())
            .map(|lists| lists.iter().map(|l| l.symptom_id.as_str()).collect())
            .unwrap_or_default();
        let _ = writeln!(
            out,
            "[{}] {}: {} (symptoms: {})",
            m.alarm.timeframe,
            m.diagnosis.name,
            m.alarm.symptom,
            symptoms.join(", ")
        );
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "{EDUCATIONAL_DISCLAIMER}");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> KnowledgeBase {
        let dir = resolve_knowledge_base_dir(None).expect("bundled knowledge base");
        KnowledgeBase::load_from_dir(&dir).expect("loads")
    }

    #[test]
    fn parses_explore_modifiers() {
        let cli = Cli::try_parse_from([
            "ddx",
            "explore",
            "headache",
            "--associated",
            "thunderclap onset",
            "--associated",
            "nausea",
            "--sex",
            "female",
            "--age",
            "34",
        ])
        .expect("parses");

        match cli.command {
            Some(Commands::Explore {
                symptom,
                associated,
                sex,
                age,
                ..
            }) => {
                assert_eq!(symptom.as_str(), "headache");
                assert_eq!(associated, vec!["thunderclap onset", "nausea"]);
                assert_eq!(sex, Some(Sex::Female));
                assert_eq!(age, Some(34));
            }
            _ => panic!("expected explore"),
        }
    }

    #[test]
    fn rejects_malformed_symptom_id_and_level() {
        assert!(Cli::try_parse_from(["ddx", "explore", "Chest Pain"]).is_err());
        assert!(Cli::try_parse_from(["ddx", "diagnosis", "migraine", "--level", "6"]).is_err());
    }

    #[test]
    fn explore_output_carries_red_flags_and_disclaimer() {
        let output = run(
            Commands::Explore {
                symptom: ConceptId::new("headache").expect("valid id"),
                associated: vec!["thunderclap onset".into()],
                aggravating: vec![],
                relieving: vec![],
                history: vec![],
                age: None,
                sex: None,
                severity: None,
                duration: None,
                select: None,
                json: false,
            },
            seed(),
        )
        .expect("explores");

        assert!(output.contains("Red flags:"));
        assert!(output.contains("Subarachnoid hemorrhage"));
        assert!(output.contains("Recommended action: emergency"));
        assert!(output.ends_with(&format!("{EDUCATIONAL_DISCLAIMER}\n")));
    }

    #[test]
    fn unknown_diagnosis_is_not_found() {
        let err = run(
            Commands::Diagnosis {
                id: "nonexistent-dx".into(),
                level: None,
                json: false,
            },
            seed(),
        )
        .expect_err("unknown");
        assert!(err.is_not_found());
    }

    #[test]
    fn not_found_follows_the_requested_output_format() {
        let command = Commands::Diagnosis {
            id: "nonexistent-dx".into(),
            level: None,
            json: true,
        };
        assert!(command.wants_json());
        let err = run(command, seed()).expect_err("unknown");

        let value: serde_json::Value =
            serde_json::from_str(&render_not_found(&err, true)).expect("json");
        assert_eq!(value["disclaimer"], EDUCATIONAL_DISCLAIMER);
        assert!(value["error"].as_str().is_some_and(|e| e.contains("nonexistent-dx")));

        let text = render_not_found(&err, false);
        assert!(text.starts_with("No information available"));
        assert!(text.contains(EDUCATIONAL_DISCLAIMER));
    }

    #[test]
    fn diagnosis_json_includes_disclaimer() {
        let output = run(
            Commands::Diagnosis {
                id: "appendicitis".into(),
                level: None,
                json: true,
            },
            seed(),
        )
        .expect("renders");
        let value: serde_json::Value = serde_json::from_str(&output).expect("json");
        assert_eq!(value["disclaimer"], EDUCATIONAL_DISCLAIMER);
        assert_eq!(value["diagnosis"]["diagnosis_id"], "appendicitis");
    }

    #[test]
    fn red_flag_search_lists_symptoms() {
        let output = render_red_flag_search(&seed(), "neck stiffness");
        assert!(output.contains("Bacterial meningitis"));
        assert!(output.contains("symptoms: headache"));
    }
}
