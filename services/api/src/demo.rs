use crate::infra::{
    InMemoryAssessmentRepository, InMemoryQuestionnaireRepository, OrganizationAccessPolicy,
    RecordingAuditLog,
};
use clap::Args;
use safety_review::assessments::{
    ActorRef, AnswerValue, AssessmentService, AssessmentStatus, BreakdownAxis, ComplianceValue,
    MaturityLevel, NewAssessment, OrganizationId, QuestionnaireId, ResponseInput, ScoringConfig,
    WeightMode,
};
use safety_review::error::AppError;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Organization the demo assessment is opened for
    #[arg(long, default_value = "ansp-demo")]
    pub(crate) organization: String,
    /// Restrict the compliance assessment to these audit areas (repeatable).
    /// Empty means the full protocol.
    #[arg(long = "audit-area")]
    pub(crate) audit_areas: Vec<String>,
    /// Use priority-weighted scoring when reporting results
    #[arg(long)]
    pub(crate) weighted: bool,
    /// Also walk the maturity questionnaire through the same flow
    #[arg(long)]
    pub(crate) include_maturity: bool,
}

type DemoService = AssessmentService<
    InMemoryQuestionnaireRepository,
    InMemoryAssessmentRepository,
    RecordingAuditLog,
>;

fn build_service() -> (Arc<DemoService>, Arc<RecordingAuditLog>) {
    let audit_log = Arc::new(RecordingAuditLog::default());
    let service = Arc::new(AssessmentService::new(
        Arc::new(InMemoryQuestionnaireRepository::seeded()),
        Arc::new(InMemoryAssessmentRepository::default()),
        audit_log.clone(),
        Arc::new(OrganizationAccessPolicy),
        ScoringConfig::default(),
    ));
    (service, audit_log)
}

fn print_json<T: serde::Serialize>(label: &str, value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{label}:\n{json}"),
        Err(err) => println!("{label} unavailable: {err}"),
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        organization,
        audit_areas,
        weighted,
        include_maturity,
    } = args;

    let (service, audit_log) = build_service();
    let actor = ActorRef {
        user_id: "demo-inspector".to_string(),
        organization_id: OrganizationId(organization),
    };
    let mode = if weighted {
        WeightMode::PriorityWeighted
    } else {
        WeightMode::Unweighted
    };

    println!("Assessment scoring demo");
    if audit_areas.is_empty() {
        println!("Scope: full ANS protocol");
    } else {
        println!("Scope: audit areas {}", audit_areas.join(", "));
    }

    let created = service.create(
        &actor,
        NewAssessment {
            questionnaire_id: QuestionnaireId("ans-protocol-v3".to_string()),
            organization_id: actor.organization_id.clone(),
            selected_audit_areas: audit_areas,
        },
    )?;
    print_json("\nDraft assessment", &created.status_view());

    let check = service.validate_for_submission(&created.id)?;
    print_json("\nSubmission check before answering", &check);

    // Mark the CNS question not applicable, answer everything else
    // satisfactory. Not-applicable answers count as answered but leave the
    // effective-implementation denominator untouched.
    for question_id in created.in_scope.iter() {
        let value = if question_id.0 == "q-cns-001" {
            ComplianceValue::NotApplicable
        } else {
            ComplianceValue::Satisfactory
        };
        let saved = service.save_response(
            &actor,
            &created.id,
            question_id,
            ResponseInput {
                value: Some(AnswerValue::Compliance(value)),
                notes: None,
                evidence_refs: Vec::new(),
            },
        )?;
        println!(
            "Answered {} -> progress {}%",
            question_id.0, saved.progress.percent
        );
    }

    let report = service.scores(&created.id, mode, Some(BreakdownAxis::AuditArea))?;
    print_json("\nScore report by audit area", &report);

    let submitted = service.submit(&actor, &created.id)?;
    print_json("\nSubmitted assessment (frozen snapshot)", &submitted.status_view());

    service.transition(&actor, &created.id, AssessmentStatus::UnderReview)?;
    let completed = service.transition(&actor, &created.id, AssessmentStatus::Completed)?;
    println!(
        "\nLifecycle advanced to {} (completed at {:?})",
        completed.status.label(),
        completed.completed_at
    );

    if include_maturity {
        run_maturity_demo(service.as_ref(), &actor)?;
    }

    println!("\nAudit trail");
    for event in audit_log.events() {
        println!(
            "- {}: {} -> {} by {}",
            event.assessment_id.0,
            event.from.label(),
            event.to.label(),
            event.actor
        );
    }

    Ok(())
}

fn run_maturity_demo(service: &DemoService, actor: &ActorRef) -> Result<(), AppError> {
    println!("\nMaturity assessment demo");

    let created = service.create(
        actor,
        NewAssessment {
            questionnaire_id: QuestionnaireId("sms-maturity-v2".to_string()),
            organization_id: actor.organization_id.clone(),
            selected_audit_areas: Vec::new(),
        },
    )?;

    // Policy questions land at level D, assurance at level B.
    for question_id in created.in_scope.iter() {
        let level = if question_id.0.starts_with("q-pol") {
            MaturityLevel::D
        } else {
            MaturityLevel::B
        };
        service.save_response(
            actor,
            &created.id,
            question_id,
            ResponseInput {
                value: Some(AnswerValue::Maturity(level)),
                notes: None,
                evidence_refs: Vec::new(),
            },
        )?;
    }

    let report = service.scores(
        &created.id,
        WeightMode::Unweighted,
        Some(BreakdownAxis::MaturityComponent),
    )?;
    print_json("Maturity report by component", &report);

    let submitted = service.submit(actor, &created.id)?;
    print_json(
        "Submitted maturity assessment (frozen snapshot)",
        &submitted.status_view(),
    );

    Ok(())
}
