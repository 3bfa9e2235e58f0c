// src/common/validate.rs

use chrono::{DateTime, NaiveDateTime, Utc};
use uuid::Uuid;

use crate::common::error::AppError;

/// Valida um parâmetro de rota que deve ser um UUID no formato canônico
/// com hífens (8-4-4-4-12). Roda ANTES de qualquer consulta ao banco:
/// um path malformado não endereça recurso nenhum.
pub fn parse_uuid_param(value: &str, field: &str) -> Result<Uuid, AppError> {
    let bytes = value.as_bytes();
    let shape_ok = bytes.len() == 36
        && bytes.iter().enumerate().all(|(i, b)| match i {
            8 | 13 | 18 | 23 => *b == b'-',
            _ => b.is_ascii_hexdigit(),
        });

    if !shape_ok {
        return Err(AppError::BadRequest(format!(
            "O parâmetro '{}' não é um UUID válido.",
            field
        )));
    }

    Uuid::parse_str(value)
        .map_err(|_| AppError::BadRequest(format!("O parâmetro '{}' não é um UUID válido.", field)))
}

/// Valida uma data no prefixo ISO-8601 `YYYY-MM-DDTHH:MM:SS` e a converte
/// para UTC. Sufixos (fração de segundo, offset) são tolerados, desde que o
/// prefixo seja exato.
pub fn parse_iso_datetime(value: &str, field: &str) -> Result<DateTime<Utc>, AppError> {
    let invalid = || {
        AppError::BadRequest(format!(
            "O campo '{}' deve ser uma data ISO-8601 (YYYY-MM-DDTHH:MM:SS).",
            field
        ))
    };

    if value.len() < 19 || !value.is_char_boundary(19) {
        return Err(invalid());
    }

    let naive =
        NaiveDateTime::parse_from_str(&value[..19], "%Y-%m-%dT%H:%M:%S").map_err(|_| invalid())?;

    Ok(naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aceita_uuid_canonico() {
        let id = parse_uuid_param("550e8400-e29b-41d4-a716-446655440000", "postId").unwrap();
        assert_eq!(id.to_string(), "550e8400-e29b-41d4-a716-446655440000");
    }

    #[test]
    fn aceita_uuid_maiusculo() {
        assert!(parse_uuid_param("550E8400-E29B-41D4-A716-446655440000", "postId").is_ok());
    }

    #[test]
    fn rejeita_uuid_sem_hifens() {
        // Uuid::parse_str aceitaria; o contrato da API, não.
        assert!(parse_uuid_param("550e8400e29b41d4a716446655440000", "postId").is_err());
    }

    #[test]
    fn rejeita_uuid_truncado_e_lixo() {
        assert!(parse_uuid_param("550e8400-e29b", "postId").is_err());
        assert!(parse_uuid_param("not-a-uuid-at-all-but-36-chars-long!", "postId").is_err());
        assert!(parse_uuid_param("", "postId").is_err());
    }

    #[test]
    fn rejeita_erro_nomeando_o_campo() {
        let err = parse_uuid_param("xxx", "attachmentId").unwrap_err();
        match err {
            AppError::BadRequest(msg) => assert!(msg.contains("attachmentId")),
            other => panic!("esperava BadRequest, veio {:?}", other),
        }
    }

    #[test]
    fn aceita_data_iso_com_prefixo_exato() {
        let dt = parse_iso_datetime("2025-03-01T12:30:00", "due_date").unwrap();
        assert_eq!(dt.to_rfc3339(), "2025-03-01T12:30:00+00:00");
    }

    #[test]
    fn aceita_sufixo_apos_o_prefixo() {
        assert!(parse_iso_datetime("2025-03-01T12:30:00.123Z", "due_date").is_ok());
    }

    #[test]
    fn rejeita_data_sem_hora() {
        assert!(parse_iso_datetime("2025-03-01", "due_date").is_err());
        assert!(parse_iso_datetime("01/03/2025 12:30", "due_date").is_err());
    }
}
