use crate::{
    error::AppError,
    models::{CreateTaskRequest, NewTask, TaskChanges, UpdateTaskRequest},
    store::TaskStore,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use validator::Validate;

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

// Reads go through `web::block` as well; writers hold the store lock across
// the snapshot fsync.

/// Lists every task.
///
/// ## Responses:
/// - `200 OK`: JSON array of tasks.
#[get("")]
pub async fn list_tasks(store: web::Data<TaskStore>) -> Result<impl Responder, AppError> {
    let tasks = web::block(move || store.get_all()).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Lists tasks whose status is `pending`.
///
/// ## Responses:
/// - `200 OK`: JSON array of tasks.
#[get("/pending")]
pub async fn list_pending_tasks(store: web::Data<TaskStore>) -> Result<impl Responder, AppError> {
    let tasks = web::block(move || store.get_pending()).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Retrieves a specific task by its ID.
///
/// ## Responses:
/// - `200 OK`: the task.
/// - `400 Bad Request`: the ID is not a number.
/// - `404 Not Found`: no task with that ID.
#[get("/{id}")]
pub async fn get_task(
    store: web::Data<TaskStore>,
    task_id: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    let id = task_id.into_inner();
    let task = web::block(move || store.get(id))
        .await?
        .ok_or_else(task_not_found)?;
    Ok(HttpResponse::Ok().json(task))
}

/// Creates a new task.
///
/// Requires a valid `X-API-Token`. The new task starts as `pending`; an
/// omitted priority becomes `medium`.
///
/// ## Request Body:
/// - `title`: required, not blank.
/// - `description`, `due_date`, `priority` (optional): free text.
///
/// ## Responses:
/// - `201 Created`: the new task.
/// - `400 Bad Request`: malformed JSON or blank title.
/// - `401 Unauthorized`: missing or invalid token.
/// - `500 Internal Server Error`: no task IDs left.
#[post("")]
pub async fn create_task(
    store: web::Data<TaskStore>,
    task_data: web::Json<CreateTaskRequest>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let new_task: NewTask = task_data.into_inner().into();
    let task = web::block(move || store.add(new_task)).await??;

    Ok(HttpResponse::Created().json(task))
}

/// Updates an existing task.
///
/// Requires a valid `X-API-Token`. Every mutable field is replaced with the
/// value from the body; `priority` and `status` accept any string.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `400 Bad Request`: non-numeric ID, malformed JSON or blank title.
/// - `401 Unauthorized`: missing or invalid token.
/// - `404 Not Found`: no task with that ID.
#[put("/{id}")]
pub async fn update_task(
    store: web::Data<TaskStore>,
    task_id: web::Path<u64>,
    task_data: web::Json<UpdateTaskRequest>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let id = task_id.into_inner();
    let changes: TaskChanges = task_data.into_inner().into();
    let task = web::block(move || store.update(id, changes))
        .await?
        .ok_or_else(task_not_found)?;

    Ok(HttpResponse::Ok().json(task))
}

/// Deletes a task by its ID.
///
/// ## Responses:
/// - `204 No Content`: the task was removed.
/// - `400 Bad Request`: non-numeric ID.
/// - `401 Unauthorized`: missing or invalid token.
/// - `404 Not Found`: no task with that ID.
#[delete("/{id}")]
pub async fn delete_task(
    store: web::Data<TaskStore>,
    task_id: web::Path<u64>,
) -> Result<impl Responder, AppError> {
    let id = task_id.into_inner();
    if !web::block(move || store.delete(id)).await? {
        return Err(task_not_found());
    }

    Ok(HttpResponse::NoContent().finish())
}
