use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use super::analytics::{ComparisonQuery, RankingQuery};
use super::domain::{
    EvaluationId, EvaluationSubmission, FormDraft, FormId, FormStatus, InternId,
    InternRegistration, TutorId,
};
use super::repository::{EvaluationRepository, RosterRepository};
use super::service::{ErrorKind, EvaluationService, EvaluationServiceError};

type SharedService<E, R> = State<Arc<EvaluationService<E, R>>>;

/// Submission body plus the authoring tutor.
#[derive(Debug, Deserialize)]
pub struct SubmitEvaluationRequest {
    pub tutor: TutorId,
    #[serde(flatten)]
    pub submission: EvaluationSubmission,
}

#[derive(Debug, Deserialize)]
pub struct FormStatusRequest {
    pub status: FormStatus,
}

/// Router builder exposing forms, roster, evaluations and analytics.
pub fn evaluation_router<E, R>(service: Arc<EvaluationService<E, R>>) -> Router
where
    E: EvaluationRepository + 'static,
    R: RosterRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/forms",
            post(create_form_handler::<E, R>).get(list_forms_handler::<E, R>),
        )
        .route("/api/v1/forms/active", get(active_forms_handler::<E, R>))
        .route(
            "/api/v1/forms/:form_id",
            axum::routing::delete(delete_form_handler::<E, R>),
        )
        .route(
            "/api/v1/forms/:form_id/status",
            put(form_status_handler::<E, R>),
        )
        .route(
            "/api/v1/forms/:form_id/evaluations",
            post(submit_handler::<E, R>).get(form_evaluations_handler::<E, R>),
        )
        .route(
            "/api/v1/evaluations/:evaluation_id",
            get(evaluation_handler::<E, R>)
                .put(update_handler::<E, R>)
                .delete(delete_handler::<E, R>),
        )
        .route(
            "/api/v1/interns",
            post(register_intern_handler::<E, R>).get(list_interns_handler::<E, R>),
        )
        .route(
            "/api/v1/interns/:intern_id",
            get(intern_handler::<E, R>),
        )
        .route(
            "/api/v1/analytics/rankings",
            get(rankings_handler::<E, R>),
        )
        .route(
            "/api/v1/analytics/comparison",
            post(comparison_handler::<E, R>),
        )
        .with_state(service)
}

pub(crate) fn error_response(error: EvaluationServiceError) -> Response {
    let status = match error.kind() {
        ErrorKind::Validation => StatusCode::UNPROCESSABLE_ENTITY,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Unavailable => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": error.to_string() });
    (status, Json(payload)).into_response()
}

fn respond<T: serde::Serialize>(
    status: StatusCode,
    result: Result<T, EvaluationServiceError>,
) -> Response {
    match result {
        Ok(body) => (status, Json(body)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn create_form_handler<E, R>(
    State(service): SharedService<E, R>,
    Json(draft): Json<FormDraft>,
) -> Response
where
    E: EvaluationRepository + 'static,
    R: RosterRepository + 'static,
{
    respond(StatusCode::CREATED, service.create_form(draft))
}

pub(crate) async fn list_forms_handler<E, R>(State(service): SharedService<E, R>) -> Response
where
    E: EvaluationRepository + 'static,
    R: RosterRepository + 'static,
{
    respond(StatusCode::OK, service.forms())
}

pub(crate) async fn active_forms_handler<E, R>(State(service): SharedService<E, R>) -> Response
where
    E: EvaluationRepository + 'static,
    R: RosterRepository + 'static,
{
    respond(StatusCode::OK, service.active_forms())
}

pub(crate) async fn form_status_handler<E, R>(
    State(service): SharedService<E, R>,
    Path(form_id): Path<String>,
    Json(request): Json<FormStatusRequest>,
) -> Response
where
    E: EvaluationRepository + 'static,
    R: RosterRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.set_form_status(&FormId(form_id), request.status),
    )
}

pub(crate) async fn delete_form_handler<E, R>(
    State(service): SharedService<E, R>,
    Path(form_id): Path<String>,
) -> Response
where
    E: EvaluationRepository + 'static,
    R: RosterRepository + 'static,
{
    let result = service
        .delete_form(&FormId(form_id))
        .map(|removed| json!({ "removedEvaluations": removed }));
    respond(StatusCode::OK, result)
}

pub(crate) async fn submit_handler<E, R>(
    State(service): SharedService<E, R>,
    Path(form_id): Path<String>,
    Json(request): Json<SubmitEvaluationRequest>,
) -> Response
where
    E: EvaluationRepository + 'static,
    R: RosterRepository + 'static,
{
    respond(
        StatusCode::CREATED,
        service.submit(&FormId(form_id), request.tutor, request.submission),
    )
}

pub(crate) async fn form_evaluations_handler<E, R>(
    State(service): SharedService<E, R>,
    Path(form_id): Path<String>,
) -> Response
where
    E: EvaluationRepository + 'static,
    R: RosterRepository + 'static,
{
    respond(StatusCode::OK, service.evaluations_for_form(&FormId(form_id)))
}

pub(crate) async fn evaluation_handler<E, R>(
    State(service): SharedService<E, R>,
    Path(evaluation_id): Path<String>,
) -> Response
where
    E: EvaluationRepository + 'static,
    R: RosterRepository + 'static,
{
    respond(StatusCode::OK, service.get(&EvaluationId(evaluation_id)))
}

pub(crate) async fn update_handler<E, R>(
    State(service): SharedService<E, R>,
    Path(evaluation_id): Path<String>,
    Json(submission): Json<EvaluationSubmission>,
) -> Response
where
    E: EvaluationRepository + 'static,
    R: RosterRepository + 'static,
{
    respond(
        StatusCode::OK,
        service.update(&EvaluationId(evaluation_id), submission),
    )
}

pub(crate) async fn delete_handler<E, R>(
    State(service): SharedService<E, R>,
    Path(evaluation_id): Path<String>,
) -> Response
where
    E: EvaluationRepository + 'static,
    R: RosterRepository + 'static,
{
    match service.delete(&EvaluationId(evaluation_id)) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn register_intern_handler<E, R>(
    State(service): SharedService<E, R>,
    Json(registration): Json<InternRegistration>,
) -> Response
where
    E: EvaluationRepository + 'static,
    R: RosterRepository + 'static,
{
    respond(StatusCode::CREATED, service.register_intern(registration))
}

pub(crate) async fn list_interns_handler<E, R>(State(service): SharedService<E, R>) -> Response
where
    E: EvaluationRepository + 'static,
    R: RosterRepository + 'static,
{
    respond(StatusCode::OK, service.interns())
}

pub(crate) async fn intern_handler<E, R>(
    State(service): SharedService<E, R>,
    Path(intern_id): Path<String>,
) -> Response
where
    E: EvaluationRepository + 'static,
    R: RosterRepository + 'static,
{
    respond(StatusCode::OK, service.intern(&InternId(intern_id)))
}

pub(crate) async fn rankings_handler<E, R>(
    State(service): SharedService<E, R>,
    Query(query): Query<RankingQuery>,
) -> Response
where
    E: EvaluationRepository + 'static,
    R: RosterRepository + 'static,
{
    respond(StatusCode::OK, service.rankings(&query))
}

pub(crate) async fn comparison_handler<E, R>(
    State(service): SharedService<E, R>,
    Json(query): Json<ComparisonQuery>,
) -> Response
where
    E: EvaluationRepository + 'static,
    R: RosterRepository + 'static,
{
    respond(StatusCode::OK, service.compare_forms(&query))
}
