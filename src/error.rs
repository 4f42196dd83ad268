use thiserror::Error;

use crate::storage::StorageError;

/// Errors surfaced by catalog lookups, intake and seeding.
///
/// Each variant maps to exactly one HTTP outcome in `api::rejection`.
#[derive(Debug, Error)]
pub enum RomiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    InvalidInput(String),
    #[error("Nivel de dolor no válido")]
    InvalidRange { symptom_id: i64, pain_level: i64 },
    #[error("error de almacenamiento: {0}")]
    Storage(#[from] StorageError),
}

impl RomiError {
    pub fn symptom_not_found() -> Self {
        RomiError::NotFound("Síntoma no encontrado".to_string())
    }

    pub fn missing_search_term() -> Self {
        RomiError::InvalidInput("Debes enviar un parámetro 'nombre'".to_string())
    }

    pub fn no_search_matches() -> Self {
        RomiError::NotFound("No se encontraron síntomas con ese nombre".to_string())
    }
}

pub type Result<T> = std::result::Result<T, RomiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_spanish_and_short() {
        assert_eq!(RomiError::symptom_not_found().to_string(), "Síntoma no encontrado");
        let err = RomiError::InvalidRange { symptom_id: 1, pain_level: 11 };
        assert_eq!(err.to_string(), "Nivel de dolor no válido");
        assert_eq!(
            RomiError::missing_search_term().to_string(),
            "Debes enviar un parámetro 'nombre'"
        );
        assert_eq!(
            RomiError::no_search_matches().to_string(),
            "No se encontraron síntomas con ese nombre"
        );
    }

    #[test]
    fn storage_errors_convert() {
        let err: RomiError = StorageError::Unavailable("offline".to_string()).into();
        assert!(matches!(err, RomiError::Storage(_)));
        assert_eq!(err.to_string(), "error de almacenamiento: store unavailable: offline");
    }
}
