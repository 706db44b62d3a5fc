use crate::infra::{in_memory_service, InMemoryEvaluationService, Snapshot};
use clap::Args;
use intern_eval::config::AppConfig;
use intern_eval::error::AppError;
use intern_eval::evaluations::domain::standard_fields;
use intern_eval::evaluations::{
    EvaluationServiceError, EvaluationSubmission, FieldDefinition, FormDraft, FormId, FormStatus,
    InternId, InternRegistration, RankingQuery, RawFieldInput, RawSubScore, StudentAnalytics,
    TutorId,
};
use std::path::PathBuf;

const DEMO_CUSTOM_FIELD: &str = "Presentation Skills";

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// JSON snapshot with `interns`, `forms` and `evaluations`
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Restrict the ranking to one form's evaluations
    #[arg(long)]
    pub(crate) form: Option<String>,
    /// Sort by this metric's average instead of the overall average
    #[arg(long)]
    pub(crate) metric: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Sort the demo ranking by this metric instead of the overall average
    #[arg(long)]
    pub(crate) metric: Option<String>,
    /// Print the ranking as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

pub(crate) fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let RankArgs {
        snapshot,
        form,
        metric,
    } = args;

    let config = AppConfig::load()?;
    let snapshot = Snapshot::load(&snapshot)?;
    if let Some(generated_at) = snapshot.generated_at {
        println!("Snapshot generated {}", generated_at.format("%Y-%m-%d %H:%M UTC"));
    }
    let service = snapshot.hydrate(config.scoring)?;

    let query = RankingQuery {
        form_id: form.map(FormId),
        metric,
    };
    let students = service.rankings(&query)?;
    render_rankings(&students, query.metric.as_deref());
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { metric, json } = args;

    let config = AppConfig::load()?;
    let service = in_memory_service(config.scoring);

    println!("Intern evaluation demo");
    seed_demo(&service)?;

    let query = RankingQuery {
        form_id: None,
        metric,
    };
    let students = service.rankings(&query)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&students)?);
    } else {
        render_rankings(&students, query.metric.as_deref());
    }
    Ok(())
}

fn seed_demo(service: &InMemoryEvaluationService) -> Result<(), EvaluationServiceError> {
    let tutor = TutorId::from("tutor-demo");
    let sprint_one = service.create_form(FormDraft {
        name: "Sprint 1 Review".to_string(),
        tutor: tutor.clone(),
        custom_fields: vec![FieldDefinition::simple(DEMO_CUSTOM_FIELD, 10.0)],
        status: FormStatus::Active,
    })?;
    let sprint_two = service.create_form(FormDraft {
        name: "Sprint 2 Review".to_string(),
        tutor: tutor.clone(),
        custom_fields: Vec::new(),
        status: FormStatus::Active,
    })?;
    println!(
        "- Forms: {} ({} fields), {} ({} fields)",
        sprint_one.name,
        sprint_one.fields.len(),
        sprint_two.name,
        sprint_two.fields.len()
    );

    let mut roster = Vec::new();
    for (name, email) in [
        ("Ada Lovelace", "ada@interns.example"),
        ("Grace Hopper", "grace@interns.example"),
        ("Linus Torvalds", "linus@interns.example"),
    ] {
        roster.push(service.register_intern(InternRegistration {
            name: name.to_string(),
            email: email.to_string(),
        })?);
    }
    println!("- Registered {} interns", roster.len());

    let (ada, grace) = (&roster[0].id, &roster[1].id);
    let submissions = [
        (&sprint_one.id, demo_submission(ada, [5.0, 3.0, 3.0, 3.0, 3.0], Some(8.0))),
        (&sprint_one.id, demo_submission(grace, [5.0; 5], Some(10.0))),
        (&sprint_two.id, demo_submission(ada, [4.0; 5], None)),
        (&sprint_two.id, demo_submission(grace, [4.0, 4.0, 3.5, 4.0, 5.0], None)),
    ];
    for (form_id, submission) in submissions {
        let stored = service.submit(form_id, tutor.clone(), submission)?;
        println!(
            "  - {} on {}: {:.1} ({})",
            stored.intern,
            stored.form,
            stored.final_score,
            stored.final_grade.label()
        );
    }

    match service.submit(
        &sprint_one.id,
        tutor,
        demo_submission(ada, [5.0; 5], Some(10.0)),
    ) {
        Err(err) => println!("- Second submission for {ada} rejected: {err}"),
        Ok(stored) => println!("- Unexpectedly stored duplicate {}", stored.id),
    }
    Ok(())
}

fn demo_submission(
    intern: &InternId,
    per_field: [f64; 5],
    custom: Option<f64>,
) -> EvaluationSubmission {
    let mut field_scores: Vec<RawFieldInput> = standard_fields()
        .into_iter()
        .zip(per_field)
        .map(|(field, score)| {
            let subs = field
                .sub_fields
                .iter()
                .map(|sub| RawSubScore::new(sub.name.clone(), score))
                .collect();
            RawFieldInput::with_sub_scores(field.name, subs)
        })
        .collect();
    if let Some(score) = custom {
        field_scores.push(RawFieldInput::direct(DEMO_CUSTOM_FIELD, score));
    }
    EvaluationSubmission {
        intern: intern.clone(),
        comment: String::new(),
        field_scores,
    }
}

pub(crate) fn render_rankings(students: &[StudentAnalytics], metric: Option<&str>) {
    if students.is_empty() {
        println!("No interns matched the ranking filters.");
        return;
    }

    let sort_label = metric.unwrap_or("average score");
    println!("\nRanking by {sort_label}");
    println!(
        "{:>4}  {:<24} {:>7}  {:<20} {:>5}",
        "Rank", "Intern", "Score", "Grade", "Forms"
    );
    for student in students {
        let score = match metric {
            Some(name) => student.metric(name),
            None => student.average_score,
        };
        println!(
            "{:>4}  {:<24} {:>7.1}  {:<20} {:>5}",
            student.rank,
            student.name,
            score,
            student.grade.label(),
            student.total_forms
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use intern_eval::evaluations::{Grade, ScoringConfig};

    #[test]
    fn demo_seed_produces_the_expected_leaderboard() {
        let service = in_memory_service(ScoringConfig::default());

        seed_demo(&service).expect("demo seeds");
        let students = service
            .rankings(&RankingQuery::default())
            .expect("rankings");

        let names: Vec<&str> = students.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Grace Hopper", "Ada Lovelace", "Linus Torvalds"]);
        assert_eq!(students[1].evaluations[0].final_score, 6.8);
        assert_eq!(students[1].evaluations[0].final_grade, Grade::Average);
        assert_eq!(students[1].metric(DEMO_CUSTOM_FIELD), 8.0);
        assert_eq!(students[2].average_score, 0.0);
    }

    #[test]
    fn demo_submission_covers_every_standard_sub_field() {
        let submission = demo_submission(&InternId::from("intern-x"), [5.0; 5], Some(9.0));

        assert_eq!(submission.field_scores.len(), 6);
        assert!(submission.field_scores[..5].iter().all(|field| field
            .sub_scores
            .as_ref()
            .is_some_and(|subs| subs.len() == 3)));
        assert_eq!(submission.field_scores[5].score, Some(9.0));
    }
}
