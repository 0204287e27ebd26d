//! Error handling for the Bakery Back-Office Platform
//!
//! Provides consistent error responses in English and Spanish

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use shared::{SaleShortfall, Shortfall, UnconvertibleUnits};

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Insufficient permissions")]
    InsufficientPermissions,

    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
        message_es: String,
    },

    // Validation errors
    #[error("Validation error: {message}")]
    Validation {
        field: String,
        message: String,
        message_es: String,
    },

    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    #[error("Conflict: {message}")]
    Conflict {
        resource: String,
        message: String,
        message_es: String,
    },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Business logic errors
    #[error("Invalid state transition: {0}")]
    InvalidStateTransition(String),

    #[error(transparent)]
    UnconvertibleUnits(#[from] UnconvertibleUnits),

    #[error("Insufficient stock of {material}")]
    InsufficientStock { material: String },

    #[error("Insufficient ingredients to produce the requested quantity")]
    InsufficientIngredients { shortfalls: Vec<Shortfall> },

    #[error("Insufficient inventory to fulfill the requested sale")]
    InsufficientInventory { shortfalls: Vec<SaleShortfall> },

    // Database errors
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Internal errors
    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Internal server error")]
    InternalError(#[from] anyhow::Error),
}

/// Error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message_en: String,
    pub message_es: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Complete deficiency report for insufficient-ingredient rejections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_ingredients: Option<Vec<Shortfall>>,
    /// Complete deficiency report for insufficient-inventory rejections
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_recipes: Option<Vec<SaleShortfall>>,
}

impl ErrorDetail {
    fn new(code: &str, message_en: String, message_es: String) -> Self {
        Self {
            code: code.to_string(),
            message_en,
            message_es,
            field: None,
            missing_ingredients: None,
            missing_recipes: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_detail) = match &self {
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new(
                    "INVALID_CREDENTIALS",
                    "Invalid email or password".to_string(),
                    "Correo o contraseña incorrectos".to_string(),
                ),
            ),
            AppError::TokenExpired => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new(
                    "TOKEN_EXPIRED",
                    "Token has expired".to_string(),
                    "El token ha expirado".to_string(),
                ),
            ),
            AppError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new(
                    "INVALID_TOKEN",
                    "Invalid token".to_string(),
                    "Token inválido".to_string(),
                ),
            ),
            AppError::InsufficientPermissions => (
                StatusCode::FORBIDDEN,
                ErrorDetail::new(
                    "INSUFFICIENT_PERMISSIONS",
                    "You do not have permission to perform this action".to_string(),
                    "No tiene permisos para realizar esta acción".to_string(),
                ),
            ),
            AppError::Unauthorized { message, message_es } => (
                StatusCode::UNAUTHORIZED,
                ErrorDetail::new("UNAUTHORIZED", message.clone(), message_es.clone()),
            ),
            AppError::Validation { field, message, message_es } => {
                let mut detail =
                    ErrorDetail::new("VALIDATION_ERROR", message.clone(), message_es.clone());
                detail.field = Some(field.clone());
                (StatusCode::BAD_REQUEST, detail)
            }
            AppError::DuplicateEntry(field) => {
                let mut detail = ErrorDetail::new(
                    "DUPLICATE_ENTRY",
                    format!("A record with this {} already exists", field),
                    format!("Ya existe un registro con este {}", field),
                );
                detail.field = Some(field.clone());
                (StatusCode::CONFLICT, detail)
            }
            AppError::Conflict { resource, message, message_es } => {
                let mut detail = ErrorDetail::new("CONFLICT", message.clone(), message_es.clone());
                detail.field = Some(resource.clone());
                (StatusCode::CONFLICT, detail)
            }
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                ErrorDetail::new(
                    "NOT_FOUND",
                    format!("{} not found", resource),
                    format!("No se encontró {}", resource),
                ),
            ),
            AppError::InvalidStateTransition(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new(
                    "INVALID_STATE_TRANSITION",
                    msg.clone(),
                    format!("No se puede cambiar el estado: {}", msg),
                ),
            ),
            AppError::UnconvertibleUnits(err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new(
                    "UNCONVERTIBLE_UNITS",
                    format!(
                        "Cannot convert between {} and {}",
                        err.from.label_es(),
                        err.to.label_es()
                    ),
                    format!(
                        "No se puede convertir entre {} y {}",
                        err.from.label_es(),
                        err.to.label_es()
                    ),
                ),
            ),
            AppError::InsufficientStock { material } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                ErrorDetail::new(
                    "INSUFFICIENT_STOCK",
                    format!("Insufficient stock of {}", material),
                    format!("Stock insuficiente de {}", material),
                ),
            ),
            AppError::InsufficientIngredients { shortfalls } => {
                let mut detail = ErrorDetail::new(
                    "INSUFFICIENT_INGREDIENTS",
                    "Insufficient ingredients to produce the requested quantity".to_string(),
                    "Ingredientes insuficientes para producir la cantidad solicitada".to_string(),
                );
                detail.missing_ingredients = Some(shortfalls.clone());
                (StatusCode::UNPROCESSABLE_ENTITY, detail)
            }
            AppError::InsufficientInventory { shortfalls } => {
                let mut detail = ErrorDetail::new(
                    "INSUFFICIENT_INVENTORY",
                    "Insufficient inventory to fulfill the requested sale".to_string(),
                    "Inventario insuficiente para completar la venta solicitada".to_string(),
                );
                detail.missing_recipes = Some(shortfalls.clone());
                (StatusCode::UNPROCESSABLE_ENTITY, detail)
            }
            AppError::DatabaseError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                    "Ocurrió un error en la base de datos".to_string(),
                ),
            ),
            AppError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "INTERNAL_ERROR",
                    msg.clone(),
                    "Ocurrió un error interno del servidor".to_string(),
                ),
            ),
            AppError::InternalError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorDetail::new(
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                    "Ocurrió un error interno del servidor".to_string(),
                ),
            ),
        };

        // Log the error for debugging
        tracing::error!("Error: {:?}", self);

        (status, Json(ErrorResponse { error: error_detail })).into_response()
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
